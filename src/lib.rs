//! Player statistics for rVsrg.
//!
//! - [`reconcile`] merges the local statistics cache with the remote snapshot.
//! - [`session`] keeps the live judgement tally of the current play.
//! - [`display`] throttles HUD readouts derived from live state.

pub mod database;
pub mod display;
pub mod models;
pub mod online;
pub mod reconcile;
pub mod session;

pub use database::{Database, StatsBackend, StoreError};
pub use display::{DEFAULT_PROJECTION_INTERVAL_MS, ThrottledProjection};
pub use models::{GameMode, Judgement, JudgementCounts, ModeStats, Profile, StatKeyedStore, StatsConfig};
pub use online::{HttpStatsClient, OnlineContext, RemoteError, RemoteStatsClient};
pub use reconcile::{ProfileReconciler, StatsManager};
pub use session::{JudgementTally, PlaySession};
