//! Client payloads exchanged with the target API
//!
//! `ClientRecord` is the creation payload, `ClientPatch` the partial update,
//! and `ClientId` the server-assigned `codcli` pulled out of a creation
//! response.

use crate::{Result, ScenarioError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Creation payload for a client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientRecord {
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub genre: Option<String>,
    pub adresse: String,
    #[serde(default)]
    pub complement_adresse: Option<String>,
    #[serde(default)]
    pub tel: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Newsletter opt-in, 0 or 1
    #[serde(default)]
    pub newsletter: u8,
}

impl ClientRecord {
    /// Record sent by the CRUD scenario for one iteration.
    ///
    /// The email embeds both identifiers so concurrent VUs never collide.
    pub fn for_iteration(vu: u32, iteration: u64) -> Self {
        Self {
            nom: "Durand".to_string(),
            prenom: "Alice".to_string(),
            genre: Some("F".to_string()),
            adresse: "12 rue des Lilas".to_string(),
            complement_adresse: Some("Bâtiment B".to_string()),
            tel: Some("0601020304".to_string()),
            email: Some(format!("alice{}_{}@example.com", vu, iteration)),
            newsletter: 1,
        }
    }

    pub fn subscribed(&self) -> bool {
        self.newsletter != 0
    }
}

/// Partial update; unset fields are left out of the JSON body
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prenom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement_adresse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<u8>,
}

impl ClientPatch {
    /// Patch that only renames the first name
    pub fn prenom(prenom: impl Into<String>) -> Self {
        Self {
            prenom: Some(prenom.into()),
            ..Self::default()
        }
    }

    /// Patch sent by the CRUD scenario
    pub fn scenario_default() -> Self {
        Self::prenom("Alicia")
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite the fields of `record` that are set in this patch
    pub fn apply_to(&self, record: &mut ClientRecord) {
        if let Some(nom) = &self.nom {
            record.nom = nom.clone();
        }
        if let Some(prenom) = &self.prenom {
            record.prenom = prenom.clone();
        }
        if let Some(adresse) = &self.adresse {
            record.adresse = adresse.clone();
        }
        if self.complement_adresse.is_some() {
            record.complement_adresse = self.complement_adresse.clone();
        }
        if self.genre.is_some() {
            record.genre = self.genre.clone();
        }
        if self.tel.is_some() {
            record.tel = self.tel.clone();
        }
        if self.email.is_some() {
            record.email = self.email.clone();
        }
        if let Some(newsletter) = self.newsletter {
            record.newsletter = newsletter;
        }
    }
}

/// Server-assigned client identifier (`codcli`)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract `codcli` from a creation response body.
    ///
    /// The body must be a JSON object whose `codcli` is an integer or a
    /// non-empty string; strings are kept exactly as sent. An empty body is
    /// a parse failure.
    pub fn from_creation_body(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(ScenarioError::MalformedBody)?;

        match value.get("codcli") {
            Some(serde_json::Value::Number(n)) if n.is_i64() || n.is_u64() => {
                Ok(Self(n.to_string()))
            }
            Some(serde_json::Value::String(s)) if !s.is_empty() => Ok(Self(s.clone())),
            _ => Err(ScenarioError::MissingClientId),
        }
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_record_fields() {
        let record = ClientRecord::for_iteration(3, 7);
        assert_eq!(record.nom, "Durand");
        assert_eq!(record.prenom, "Alice");
        assert_eq!(record.email.as_deref(), Some("alice3_7@example.com"));
        assert!(record.subscribed());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["newsletter"], serde_json::json!(1));
        assert_eq!(json["complement_adresse"], "Bâtiment B");
    }

    #[test]
    fn test_emails_unique_across_vu_iteration_pairs() {
        let mut seen = HashSet::new();
        for vu in 1..=50 {
            for iteration in 0..40 {
                let email = ClientRecord::for_iteration(vu, iteration).email.unwrap();
                assert!(seen.insert(email), "duplicate email for vu={vu} iter={iteration}");
            }
        }
        assert_eq!(seen.len(), 50 * 40);
    }

    #[test]
    fn test_patch_serializes_only_set_fields() {
        let body = serde_json::to_string(&ClientPatch::scenario_default()).unwrap();
        assert_eq!(body, r#"{"prenom":"Alicia"}"#);
        assert!(ClientPatch::default().is_empty());
    }

    #[test]
    fn test_patch_apply() {
        let mut record = ClientRecord::for_iteration(1, 0);
        ClientPatch::prenom("Alicia").apply_to(&mut record);
        assert_eq!(record.prenom, "Alicia");
        assert_eq!(record.nom, "Durand");
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: std::result::Result<ClientPatch, _> =
            serde_json::from_str(r#"{"truc":"invalide"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_id_extraction() {
        let id = ClientId::from_creation_body(br#"{"codcli": 42, "nom": "Durand"}"#).unwrap();
        assert_eq!(id.as_str(), "42");

        let id = ClientId::from_creation_body(br#"{"codcli": "abc-1"}"#).unwrap();
        assert_eq!(id.to_string(), "abc-1");

        let id = ClientId::from_creation_body(br#"{"codcli": " 7 "}"#).unwrap();
        assert_eq!(id.as_str(), " 7 ");
    }

    #[test]
    fn test_client_id_parse_failures() {
        assert!(matches!(
            ClientId::from_creation_body(b""),
            Err(ScenarioError::MalformedBody(_))
        ));
        assert!(matches!(
            ClientId::from_creation_body(b"<html>oops</html>"),
            Err(ScenarioError::MalformedBody(_))
        ));
        assert!(matches!(
            ClientId::from_creation_body(br#"{"detail": "error"}"#),
            Err(ScenarioError::MissingClientId)
        ));
        assert!(matches!(
            ClientId::from_creation_body(br#"{"codcli": null}"#),
            Err(ScenarioError::MissingClientId)
        ));
    }
}
