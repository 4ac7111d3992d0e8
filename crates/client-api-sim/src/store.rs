//! In-memory client store

use parking_lot::RwLock;
use scenarios::{ClientPatch, ClientRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// A stored client as returned by the API
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StoredClient {
    pub codcli: i64,
    #[serde(flatten)]
    pub record: ClientRecord,
}

#[derive(Debug, Default)]
struct StoreState {
    last_id: i64,
    clients: BTreeMap<i64, ClientRecord>,
}

/// Thread-safe client table with auto-increment ids starting at 1
#[derive(Debug, Default)]
pub struct ClientStore {
    state: RwLock<StoreState>,
}

impl ClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All clients ordered by id
    pub fn list(&self) -> Vec<StoredClient> {
        self.state
            .read()
            .clients
            .iter()
            .map(|(codcli, record)| StoredClient {
                codcli: *codcli,
                record: record.clone(),
            })
            .collect()
    }

    pub fn get(&self, codcli: i64) -> Option<StoredClient> {
        self.state
            .read()
            .clients
            .get(&codcli)
            .map(|record| StoredClient {
                codcli,
                record: record.clone(),
            })
    }

    pub fn create(&self, record: ClientRecord) -> StoredClient {
        let mut state = self.state.write();
        state.last_id += 1;
        let codcli = state.last_id;
        state.clients.insert(codcli, record.clone());
        StoredClient { codcli, record }
    }

    /// Apply a partial update; `None` if the client does not exist
    pub fn patch(&self, codcli: i64, patch: &ClientPatch) -> Option<StoredClient> {
        let mut state = self.state.write();
        let record = state.clients.get_mut(&codcli)?;
        patch.apply_to(record);
        Some(StoredClient {
            codcli,
            record: record.clone(),
        })
    }

    pub fn delete(&self, codcli: i64) -> Option<StoredClient> {
        self.state
            .write()
            .clients
            .remove(&codcli)
            .map(|record| StoredClient { codcli, record })
    }

    pub fn len(&self) -> usize {
        self.state.read().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
