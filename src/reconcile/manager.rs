//! Background reconciliation.
//!
//! Remote requests must never stall the render loop, so reconciliations run
//! on a dedicated thread with its own tokio runtime. Each request works on a
//! copy of the shared profile and publishes it back when done; the render
//! loop simply reads the shared profile on its next frame.

use crate::database::StatsBackend;
use crate::models::profile::Profile;
use crate::online::{OnlineContext, RemoteStatsClient};
use crate::reconcile::ProfileReconciler;
use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Profile handle shared between the render loop and the manager.
pub type SharedProfile = Arc<RwLock<Profile>>;

#[derive(Debug, Clone, PartialEq)]
pub enum StatsStatus {
    Idle,
    Reconciling { in_flight: usize },
    Error(String),
}

#[derive(Debug, Clone)]
pub struct StatsState {
    pub status: StatsStatus,
    /// Reconciliations published so far.
    pub completed: u64,
    /// Reconciliations aborted before publishing.
    pub cancelled: u64,
}

impl StatsState {
    pub fn new() -> Self {
        Self {
            status: StatsStatus::Idle,
            completed: 0,
            cancelled: 0,
        }
    }
}

impl Default for StatsState {
    fn default() -> Self {
        Self::new()
    }
}

pub enum StatsCommand {
    Reconcile {
        profile: SharedProfile,
        ctx: OnlineContext,
    },
    Cancel {
        profile_id: i64,
    },
    Shutdown,
}

pub struct StatsManager {
    state: Arc<Mutex<StatsState>>,
    command_sender: Sender<StatsCommand>,
    handle: Option<thread::JoinHandle<()>>,
}

fn lock_state(state: &Mutex<StatsState>) -> std::sync::MutexGuard<'_, StatsState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Aborts the tracked task of `profile_id`.
///
/// Returns true only when a still running task was aborted; a task that
/// already published is dropped without counting as cancelled.
fn abort_in_flight(in_flight: &mut HashMap<i64, JoinHandle<()>>, profile_id: i64) -> bool {
    match in_flight.remove(&profile_id) {
        Some(task) if !task.is_finished() => {
            task.abort();
            true
        }
        _ => false,
    }
}

impl StatsManager {
    pub fn new<B, R>(reconciler: ProfileReconciler<B, R>) -> Self
    where
        B: StatsBackend + 'static,
        R: RemoteStatsClient + 'static,
    {
        let state = Arc::new(Mutex::new(StatsState::new()));
        let (tx, rx) = unbounded();

        let state_clone = Arc::clone(&state);
        let handle = thread::Builder::new()
            .name("Stats Thread".to_string())
            .spawn(move || match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(Self::stats_thread(
                    Arc::new(reconciler),
                    state_clone,
                    rx,
                )),
                Err(e) => {
                    log::error!("STATS: Unable to start runtime: {}", e);
                    lock_state(&state_clone).status = StatsStatus::Error(e.to_string());
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("STATS: Unable to spawn thread: {}", e);
                lock_state(&state).status = StatsStatus::Error(e.to_string());
                None
            }
        };

        Self {
            state,
            command_sender: tx,
            handle,
        }
    }

    async fn stats_thread<B, R>(
        reconciler: Arc<ProfileReconciler<B, R>>,
        state: Arc<Mutex<StatsState>>,
        rx: Receiver<StatsCommand>,
    ) where
        B: StatsBackend + 'static,
        R: RemoteStatsClient + 'static,
    {
        log::info!("STATS: Thread started");
        let mut in_flight: HashMap<i64, JoinHandle<()>> = HashMap::new();

        loop {
            match rx.try_recv() {
                Ok(StatsCommand::Reconcile { profile, ctx }) => {
                    let profile_id = match profile.read() {
                        Ok(guard) => guard.id,
                        Err(poisoned) => poisoned.into_inner().id,
                    };

                    // Latest request for a profile wins.
                    if abort_in_flight(&mut in_flight, profile_id) {
                        lock_state(&state).cancelled += 1;
                    }

                    let task = tokio::spawn(Self::reconcile_task(
                        Arc::clone(&reconciler),
                        Arc::clone(&state),
                        profile,
                        ctx,
                    ));
                    in_flight.insert(profile_id, task);
                }
                Ok(StatsCommand::Cancel { profile_id }) => {
                    if abort_in_flight(&mut in_flight, profile_id) {
                        lock_state(&state).cancelled += 1;
                        log::info!("STATS: Reconciliation of profile {} cancelled", profile_id);
                    }
                }
                Ok(StatsCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    for (_, task) in in_flight.drain() {
                        task.abort();
                    }
                    lock_state(&state).status = StatsStatus::Idle;
                    log::info!("STATS: Thread stopped");
                    break;
                }
                Err(TryRecvError::Empty) => {}
            }

            in_flight.retain(|_, task| !task.is_finished());
            {
                let mut s = lock_state(&state);
                if !matches!(s.status, StatsStatus::Error(_)) {
                    s.status = if in_flight.is_empty() {
                        StatsStatus::Idle
                    } else {
                        StatsStatus::Reconciling {
                            in_flight: in_flight.len(),
                        }
                    };
                }
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    async fn reconcile_task<B, R>(
        reconciler: Arc<ProfileReconciler<B, R>>,
        state: Arc<Mutex<StatsState>>,
        profile: SharedProfile,
        ctx: OnlineContext,
    ) where
        B: StatsBackend + 'static,
        R: RemoteStatsClient + 'static,
    {
        let mut working = match profile.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        reconciler.reconcile(&mut working, &ctx).await;

        match profile.write() {
            Ok(mut guard) => *guard = working,
            Err(poisoned) => *poisoned.into_inner() = working,
        }
        lock_state(&state).completed += 1;
    }

    pub fn get_state(&self) -> Arc<Mutex<StatsState>> {
        Arc::clone(&self.state)
    }

    pub fn send_command(
        &self,
        cmd: StatsCommand,
    ) -> Result<(), crossbeam_channel::SendError<StatsCommand>> {
        self.command_sender.send(cmd)
    }

    /// Queues a background reconciliation of `profile`.
    pub fn reconcile(&self, profile: &SharedProfile, ctx: OnlineContext) {
        let _ = self.send_command(StatsCommand::Reconcile {
            profile: Arc::clone(profile),
            ctx,
        });
    }

    /// Aborts the in-flight reconciliation of a profile, leaving it untouched.
    pub fn cancel(&self, profile_id: i64) {
        let _ = self.send_command(StatsCommand::Cancel { profile_id });
    }

    pub fn shutdown(&mut self) {
        let _ = self.send_command(StatsCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("STATS: Thread panicked during shutdown");
            }
        }
    }
}

impl Drop for StatsManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mode::GameMode;
    use crate::models::profile::StatsSource;
    use crate::reconcile::testing::*;
    use std::time::Instant;

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_background_reconcile_publishes_into_shared_profile() {
        let reconciler = ProfileReconciler::new(
            MemoryBackend::default(),
            FakeRemote::new(Behaviour::Respond(snapshot(
                Some(remote_mode(1, 25.3)),
                Some(remote_mode(5, 18.0)),
            ))),
            Duration::from_secs(1),
        );
        let mut manager = StatsManager::new(reconciler);
        let state = manager.get_state();

        let profile: SharedProfile = Arc::new(RwLock::new(Profile::online(1, "self")));
        manager.reconcile(&profile, OnlineContext::connected(1));

        assert!(wait_until(|| lock_state(&state).completed == 1));

        let guard = profile.read().unwrap();
        assert_eq!(guard.last_updated.unwrap().source, StatsSource::Remote);
        assert_eq!(guard.stats.get(GameMode::Keys7).unwrap().global_rank, 5);
        drop(guard);

        assert!(wait_until(|| lock_state(&state).status == StatsStatus::Idle));
        manager.shutdown();
    }

    #[test]
    fn test_cancel_leaves_profile_untouched() {
        let reconciler = ProfileReconciler::new(
            MemoryBackend::default(),
            FakeRemote::new(Behaviour::Hang),
            Duration::from_secs(60),
        );
        let mut manager = StatsManager::new(reconciler);
        let state = manager.get_state();

        let profile: SharedProfile = Arc::new(RwLock::new(Profile::online(9, "self")));
        manager.reconcile(&profile, OnlineContext::connected(9));

        assert!(wait_until(|| matches!(
            lock_state(&state).status,
            StatsStatus::Reconciling { in_flight: 1 }
        )));

        manager.cancel(9);
        assert!(wait_until(|| lock_state(&state).cancelled == 1));
        assert!(wait_until(|| lock_state(&state).status == StatsStatus::Idle));

        let guard = profile.read().unwrap();
        assert!(guard.last_updated.is_none());
        assert!(guard.stats.is_empty());
        assert_eq!(lock_state(&state).completed, 0);
        drop(guard);

        manager.shutdown();
    }

    #[tokio::test]
    async fn test_finished_task_is_not_counted_as_cancelled() {
        let mut in_flight: HashMap<i64, JoinHandle<()>> = HashMap::new();

        let done = tokio::spawn(async {});
        while !done.is_finished() {
            tokio::task::yield_now().await;
        }
        in_flight.insert(1, done);
        assert!(!abort_in_flight(&mut in_flight, 1));
        assert!(in_flight.is_empty());

        in_flight.insert(2, tokio::spawn(std::future::pending::<()>()));
        assert!(abort_in_flight(&mut in_flight, 2));
        assert!(!abort_in_flight(&mut in_flight, 2));
    }
}
