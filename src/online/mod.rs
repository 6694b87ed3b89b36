//! Authoritative remote statistics.
//!
//! The reconciler talks to the server through [`RemoteStatsClient`] and
//! learns whether it may do so from an explicit [`OnlineContext`].

pub mod api;
pub mod client;

pub use api::{RemoteModeStats, RemoteUser, RemoteUserSnapshot};
pub use client::HttpStatsClient;

use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Connectivity state for one reconciliation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnlineContext {
    /// Id of the authenticated user on the server.
    pub self_user_id: i64,
    /// Whether the connection to the server is established.
    pub connected: bool,
}

impl OnlineContext {
    pub fn connected(self_user_id: i64) -> Self {
        Self {
            self_user_id,
            connected: true,
        }
    }

    pub fn offline() -> Self {
        Self {
            self_user_id: 0,
            connected: false,
        }
    }
}

/// Source of full per-mode statistics snapshots.
pub trait RemoteStatsClient: Send + Sync {
    /// Fetches every mode of a user in one request.
    fn fetch_full(
        &self,
        user_id: i64,
    ) -> impl Future<Output = Result<RemoteUserSnapshot, RemoteError>> + Send;
}
