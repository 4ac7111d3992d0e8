//! In-memory simulator of the client management REST API
//!
//! Serves the same routes and response shapes as the real service so the
//! load generator can be exercised locally without a database.

pub mod server;
pub mod store;

pub use server::{router, serve, spawn_local, SimConfig, COLLECTION_PATH, NOT_FOUND_DETAIL};
pub use store::{ClientStore, StoredClient};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
