//! Merging the local statistics cache with the remote snapshot.
//!
//! Reconciliation always refreshes from the local cache first. When the
//! profile is the authenticated online self and the connection is up, one
//! full snapshot is requested and overwrites the server-owned fields of
//! every mode. Remote failures are logged and leave the local data in place.

pub mod manager;

pub use manager::{SharedProfile, StatsCommand, StatsManager, StatsState, StatsStatus};

use crate::database::StatsBackend;
use crate::models::mode::GameMode;
use crate::models::profile::{Freshness, ModeStats, Profile, StatsSource};
use crate::online::{
    OnlineContext, RemoteError, RemoteModeStats, RemoteStatsClient, RemoteUser,
    RemoteUserSnapshot,
};
use std::time::Duration;

/// How a mode's snapshot section was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeResolution {
    /// The snapshot carries a section for this mode.
    Direct,
    /// The section is missing and [`GameMode::DEFAULT`]'s data was used.
    Fallback,
}

type SnapshotAccessor = for<'a> fn(&'a RemoteUser) -> Option<&'a RemoteModeStats>;

fn keys4_section(user: &RemoteUser) -> Option<&RemoteModeStats> {
    user.keys4.as_ref()
}

fn keys7_section(user: &RemoteUser) -> Option<&RemoteModeStats> {
    user.keys7.as_ref()
}

/// Mode to snapshot section.
pub const SNAPSHOT_FIELDS: &[(GameMode, SnapshotAccessor)] = &[
    (GameMode::Keys4, keys4_section as SnapshotAccessor),
    (GameMode::Keys7, keys7_section as SnapshotAccessor),
];

fn snapshot_section(user: &RemoteUser, mode: GameMode) -> Option<&RemoteModeStats> {
    SNAPSHOT_FIELDS
        .iter()
        .find(|(m, _)| *m == mode)
        .and_then(|(_, accessor)| accessor(user))
}

/// Locates the snapshot section for `mode`.
///
/// Modes the snapshot does not cover borrow [`GameMode::DEFAULT`]'s section
/// so the profile stays populated. Those numbers belong to another mode, so
/// every fallback is logged and reported as [`ModeResolution::Fallback`].
pub fn resolve_snapshot_mode(
    user: &RemoteUser,
    mode: GameMode,
) -> Option<(&RemoteModeStats, ModeResolution)> {
    if let Some(section) = snapshot_section(user, mode) {
        return Some((section, ModeResolution::Direct));
    }

    if mode == GameMode::DEFAULT {
        return None;
    }

    let fallback = snapshot_section(user, GameMode::DEFAULT)?;
    log::warn!(
        "STATS: Snapshot has no {} section, showing {} statistics instead",
        mode,
        GameMode::DEFAULT
    );
    Some((fallback, ModeResolution::Fallback))
}

/// Overwrites the server-owned fields of `stats` with a snapshot section.
pub fn apply_remote_mode(stats: &mut ModeStats, remote: &RemoteModeStats) {
    stats.global_rank = remote.global_rank;
    stats.country_rank = remote.country_rank;
    stats.overall_rating = remote.stats.overall_performance_rating;
    stats.overall_accuracy = remote.stats.overall_accuracy;
    stats.total_score = remote.stats.ranked_score;
    stats.max_combo = remote.stats.max_combo;
    stats.play_count = remote.stats.play_count;
    stats.fail_count = remote.stats.fail_count;
    // Snapshots carry no history.
    stats.scores = Vec::new();
    stats.judgement_counts = remote.stats.judgement_counts();
}

/// Populates profile statistics from the local cache and the remote server.
pub struct ProfileReconciler<B, R> {
    backend: B,
    remote: R,
    timeout: Duration,
}

impl<B: StatsBackend, R: RemoteStatsClient> ProfileReconciler<B, R> {
    pub fn new(backend: B, remote: R, timeout: Duration) -> Self {
        Self {
            backend,
            remote,
            timeout,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Refreshes every mode of `profile` and returns the same profile.
    ///
    /// Never fails: remote and cache errors are logged and the affected
    /// records keep their local values. `profile.last_updated` tells which
    /// source won. When neither source could be read the previous marker is
    /// kept.
    pub async fn reconcile<'p>(
        &self,
        profile: &'p mut Profile,
        ctx: &OnlineContext,
    ) -> &'p mut Profile {
        let refreshed = self.refresh_local(profile).await;

        let mut source = refreshed.then_some(StatsSource::Local);
        if profile.is_online && ctx.connected {
            match self.fetch_snapshot(ctx.self_user_id).await {
                Ok(snapshot) => {
                    self.apply_snapshot(profile, &snapshot.user).await;
                    source = Some(StatsSource::Remote);
                }
                Err(e) => {
                    log::warn!(
                        "STATS: Remote statistics for {} unavailable, keeping local data: {}",
                        profile.username,
                        e
                    );
                }
            }
        }

        match source {
            Some(source) => profile.last_updated = Some(Freshness::now(source)),
            None => log::warn!(
                "STATS: Nothing could be read for {}, statistics may be stale",
                profile.username
            ),
        }
        profile
    }

    /// Returns true when at least one mode was read from the cache.
    async fn refresh_local(&self, profile: &mut Profile) -> bool {
        let mut refreshed = false;
        for mode in GameMode::ALL {
            let existed = profile.stats.contains(mode);
            profile.stats.ensure_created(mode);

            // The online self keeps already loaded records; the snapshot
            // replaces them right after.
            if existed && profile.is_online {
                continue;
            }

            match profile.stats.refresh(mode, &self.backend).await {
                Ok(()) => refreshed = true,
                Err(e) => log::warn!(
                    "STATS: Local refresh of {} for {} failed: {}",
                    mode,
                    profile.username,
                    e
                ),
            }
        }
        refreshed
    }

    async fn fetch_snapshot(&self, user_id: i64) -> Result<RemoteUserSnapshot, RemoteError> {
        match tokio::time::timeout(self.timeout, self.remote.fetch_full(user_id)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(self.timeout)),
        }
    }

    async fn apply_snapshot(&self, profile: &mut Profile, user: &RemoteUser) {
        for mode in GameMode::ALL {
            let Some((section, resolution)) = resolve_snapshot_mode(user, mode) else {
                log::warn!(
                    "STATS: Snapshot for {} has no usable {} data",
                    profile.username,
                    mode
                );
                continue;
            };

            let stats = profile.stats.ensure_created(mode);
            apply_remote_mode(stats, section);

            // Borrowed numbers stay out of the cache.
            if resolution == ModeResolution::Fallback {
                continue;
            }

            if let Err(e) = self.backend.save_mode_stats(profile.id, stats).await {
                log::warn!(
                    "STATS: Could not cache {} statistics for {}: {}",
                    mode,
                    profile.username,
                    e
                );
            }
        }
    }
}
