//! Heartbeat timer lifecycle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::agent::heartbeat::HeartbeatRunner;
use crate::error::{AgentError, HeartbeatError};

/// Spawn the heartbeat loop.
///
/// Sleeps for the configured interval, runs one tick, and repeats until
/// `cancel` fires. Ticks never overlap: the next sleep starts only after the
/// previous tick (agent call included) has finished. Cancellation interrupts
/// the sleep immediately; a tick already in flight runs to completion.
pub fn spawn_heartbeat(runner: Arc<HeartbeatRunner>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run_heartbeat(runner, cancel))
}

async fn run_heartbeat(runner: Arc<HeartbeatRunner>, cancel: CancellationToken) {
    let interval = runner.config().interval;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        let report = runner.tick().await;
        tracing::debug!(?report, "Heartbeat tick finished");
    }

    tracing::info!("Heartbeat stopped");
}

enum SchedulerState {
    Stopped,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
    /// Cancelled, but the loop may still be finishing a tick.
    Stopping { handle: JoinHandle<()> },
}

/// Owns the heartbeat loop and its start/stop transitions.
pub struct HeartbeatScheduler {
    runner: Arc<HeartbeatRunner>,
    state: Mutex<SchedulerState>,
}

impl HeartbeatScheduler {
    /// Create a stopped scheduler.
    pub fn new(runner: HeartbeatRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            state: Mutex::new(SchedulerState::Stopped),
        }
    }

    /// Start the heartbeat loop.
    ///
    /// Returns `Ok(false)` without spawning anything when the heartbeat is
    /// disabled, [`HeartbeatError::AlreadyRunning`] if it is already running,
    /// and [`HeartbeatError::NoRuntime`] outside a Tokio runtime.
    ///
    /// If a previous loop was stopped mid-tick, the new loop waits for it to
    /// exit before its first sleep.
    pub fn start(&self) -> Result<bool, HeartbeatError> {
        let config = self.runner.config();
        if !config.enabled {
            tracing::info!("Heartbeat disabled");
            return Ok(false);
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| HeartbeatError::NoRuntime)?;

        let mut state = self.state();
        let previous = match std::mem::replace(&mut *state, SchedulerState::Stopped) {
            running @ SchedulerState::Running { .. } => {
                *state = running;
                return Err(HeartbeatError::AlreadyRunning);
            }
            SchedulerState::Stopping { handle } if !handle.is_finished() => Some(handle),
            SchedulerState::Stopping { .. } | SchedulerState::Stopped => None,
        };

        let cancel = CancellationToken::new();
        let runner = Arc::clone(&self.runner);
        let loop_cancel = cancel.clone();
        let handle = runtime.spawn(async move {
            if let Some(previous) = previous {
                tracing::debug!("Waiting for the previous heartbeat loop to exit");
                if let Err(e) = previous.await {
                    tracing::warn!(error = %e, "Previous heartbeat task ended abnormally");
                }
            }
            run_heartbeat(runner, loop_cancel).await;
        });
        *state = SchedulerState::Running { cancel, handle };

        tracing::info!(
            interval_secs = config.interval.as_secs_f64(),
            proactive = config.proactive_active(),
            "Heartbeat started"
        );
        Ok(true)
    }

    /// Stop the heartbeat loop without waiting for it to exit.
    ///
    /// A tick in flight keeps running. Returns whether the scheduler was
    /// running.
    pub fn stop(&self) -> bool {
        let mut state = self.state();
        match std::mem::replace(&mut *state, SchedulerState::Stopped) {
            SchedulerState::Running { cancel, handle } => {
                cancel.cancel();
                *state = SchedulerState::Stopping { handle };
                true
            }
            other => {
                *state = other;
                false
            }
        }
    }

    /// Stop the heartbeat loop and wait until it has exited.
    ///
    /// If a tick is in flight, this waits for it to finish.
    pub async fn shutdown(&self) {
        let handle = match std::mem::replace(&mut *self.state(), SchedulerState::Stopped) {
            SchedulerState::Running { cancel, handle } => {
                cancel.cancel();
                handle
            }
            SchedulerState::Stopping { handle } => handle,
            SchedulerState::Stopped => return,
        };

        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Heartbeat task ended abnormally");
        }
    }

    /// Whether the loop is currently running.
    pub fn is_running(&self) -> bool {
        match &*self.state() {
            SchedulerState::Running { handle, .. } => !handle.is_finished(),
            SchedulerState::Stopping { .. } | SchedulerState::Stopped => false,
        }
    }

    /// Run the instructions prompt immediately, outside the timer cadence.
    pub async fn trigger_now(&self) -> Result<Option<String>, AgentError> {
        self.runner.trigger_now().await
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HeartbeatScheduler {
    fn drop(&mut self) {
        if let SchedulerState::Running { cancel, .. } = &*self.state() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::agent::callback::testing::{Call, RecordingAgent};
    use crate::agent::callback::{AgentCallback, PromptAgent};
    use crate::config::HeartbeatConfig;

    #[derive(Default)]
    struct Overlap {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    /// Agent that answers slowly and records how many calls overlap.
    struct SlowAgent {
        overlap: Arc<Overlap>,
    }

    #[async_trait]
    impl PromptAgent for SlowAgent {
        async fn respond(&self, _prompt: &str) -> Result<String, AgentError> {
            self.overlap.calls.fetch_add(1, Ordering::SeqCst);
            let active = self.overlap.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.overlap.peak.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(300)).await;
            self.overlap.active.fetch_sub(1, Ordering::SeqCst);
            Ok("HEARTBEAT_OK".to_string())
        }
    }

    fn scheduler(
        interval: Duration,
        heartbeat: Option<&str>,
    ) -> (TempDir, HeartbeatScheduler, Arc<Mutex<Vec<Call>>>) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(content) = heartbeat {
            std::fs::write(dir.path().join("HEARTBEAT.md"), content).unwrap();
        }
        let (agent, calls) = RecordingAgent::replying("HEARTBEAT_OK");
        let config = HeartbeatConfig::new(dir.path()).with_interval(interval);
        let runner = HeartbeatRunner::new(config).with_callback(AgentCallback::prompt_only(agent));
        (dir, HeartbeatScheduler::new(runner), calls)
    }

    #[tokio::test]
    async fn test_disabled_start_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = HeartbeatConfig::new(dir.path()).with_enabled(false);
        let scheduler = HeartbeatScheduler::new(HeartbeatRunner::new(config));

        assert!(!scheduler.start().unwrap());
        assert!(!scheduler.is_running());
        assert!(!scheduler.stop());
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let (_dir, scheduler, _calls) = scheduler(Duration::from_secs(60), None);

        assert!(scheduler.start().unwrap());
        assert!(matches!(
            scheduler.start(),
            Err(HeartbeatError::AlreadyRunning)
        ));
        assert!(scheduler.is_running());

        scheduler.shutdown().await;
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_ticks_repeat_on_interval() {
        let (_dir, scheduler, calls) =
            scheduler(Duration::from_millis(20), Some("Check the inbox\n"));

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        scheduler.shutdown().await;

        let count = calls.lock().unwrap().len();
        assert!(count >= 2, "expected at least two ticks, got {}", count);
    }

    #[tokio::test]
    async fn test_absent_heartbeat_file_never_invokes_agent() {
        let (_dir, scheduler, calls) = scheduler(Duration::from_millis(10), None);

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.shutdown().await;

        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stop_mid_sleep_prevents_next_tick() {
        let (_dir, scheduler, calls) =
            scheduler(Duration::from_secs(60), Some("Check the inbox\n"));

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(scheduler.stop());
        assert!(!scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(calls.lock().unwrap().is_empty());
        assert!(!scheduler.stop());
    }

    #[tokio::test]
    async fn test_shutdown_returns_promptly() {
        let (_dir, scheduler, _calls) = scheduler(Duration::from_secs(3600), None);

        scheduler.start().unwrap();
        tokio::time::timeout(Duration::from_secs(1), scheduler.shutdown())
            .await
            .expect("shutdown should not wait for the interval");
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let (_dir, scheduler, _calls) = scheduler(Duration::from_secs(60), None);

        assert!(scheduler.start().unwrap());
        scheduler.shutdown().await;
        assert!(scheduler.start().unwrap());
        assert!(scheduler.is_running());
        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_restart_during_tick_does_not_overlap() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("HEARTBEAT.md"), "Check the inbox\n").unwrap();
        let overlap = Arc::new(Overlap::default());
        let config = HeartbeatConfig::new(dir.path()).with_interval(Duration::from_millis(20));
        let runner = HeartbeatRunner::new(config).with_callback(AgentCallback::prompt_only(
            SlowAgent {
                overlap: Arc::clone(&overlap),
            },
        ));
        let scheduler = HeartbeatScheduler::new(runner);

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(scheduler.stop());
        assert!(scheduler.start().unwrap());
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_millis(450)).await;
        scheduler.shutdown().await;

        assert_eq!(overlap.peak.load(Ordering::SeqCst), 1);
        assert!(overlap.calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(overlap.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shutdown_after_stop_waits_for_tick() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("HEARTBEAT.md"), "Check the inbox\n").unwrap();
        let overlap = Arc::new(Overlap::default());
        let config = HeartbeatConfig::new(dir.path()).with_interval(Duration::from_millis(20));
        let runner = HeartbeatRunner::new(config).with_callback(AgentCallback::prompt_only(
            SlowAgent {
                overlap: Arc::clone(&overlap),
            },
        ));
        let scheduler = HeartbeatScheduler::new(runner);

        scheduler.start().unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        scheduler.shutdown().await;

        assert_eq!(overlap.calls.load(Ordering::SeqCst), 1);
        assert_eq!(overlap.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_start_outside_runtime_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let scheduler =
            HeartbeatScheduler::new(HeartbeatRunner::new(HeartbeatConfig::new(dir.path())));

        assert!(matches!(scheduler.start(), Err(HeartbeatError::NoRuntime)));
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn test_trigger_now_bypasses_timer() {
        let (_dir, scheduler, calls) = scheduler(Duration::from_secs(60), None);

        let reply = scheduler.trigger_now().await.unwrap();
        assert_eq!(reply.as_deref(), Some("HEARTBEAT_OK"));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
