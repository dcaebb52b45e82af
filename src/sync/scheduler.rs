//! Periodic driver for the sync pipeline.
//!
//! The scheduler owns its run state. `start` spawns a loop that runs the pipeline immediately and
//! then on every interval tick; `stop` only stops scheduling new runs and never waits for one in
//! flight. `trigger_once` runs the pipeline on the caller's task regardless of state.

use super::{RunReport, SyncError, SyncPipeline};

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
	Stopped,
	Running,
}

enum Inner {
	Stopped,
	Running { shutdown: oneshot::Sender<()> },
}

pub struct SyncScheduler {
	pipeline: Arc<SyncPipeline>,
	interval: Duration,
	inner: Mutex<Inner>,
}

impl SyncScheduler {
	pub fn new(pipeline: Arc<SyncPipeline>, interval: Duration) -> Self {
		Self {
			pipeline,
			interval: interval.max(MIN_INTERVAL),
			inner: Mutex::new(Inner::Stopped),
		}
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	pub async fn state(&self) -> SchedulerState {
		match *self.inner.lock().await {
			Inner::Stopped => SchedulerState::Stopped,
			Inner::Running { .. } => SchedulerState::Running,
		}
	}

	/// Start periodic runs. The first run begins immediately on a background task.
	///
	/// # Returns
	/// `false` if the scheduler was already running.
	pub async fn start(&self) -> bool {
		let mut inner = self.inner.lock().await;
		if matches!(*inner, Inner::Running { .. }) {
			debug!("Scheduler already running");
			return false;
		}

		let (shutdown, shutdown_rx) = oneshot::channel();
		tokio::spawn(run_loop(self.pipeline.clone(), self.interval, shutdown_rx));
		*inner = Inner::Running { shutdown };

		info!("Sync scheduler started with interval {:?}", self.interval);
		true
	}

	/// Stop scheduling runs. A run already in progress is left to finish.
	///
	/// # Returns
	/// `false` if the scheduler was already stopped.
	pub async fn stop(&self) -> bool {
		let mut inner = self.inner.lock().await;
		match std::mem::replace(&mut *inner, Inner::Stopped) {
			Inner::Running { shutdown } => {
				// the loop may already have exited
				let _ = shutdown.send(());
				info!("Sync scheduler stopped");
				true
			}
			Inner::Stopped => false,
		}
	}

	/// Run the pipeline once on the calling task and return its outcome.
	pub async fn trigger_once(&self) -> Result<RunReport, SyncError> {
		info!("Manual sync triggered");
		self.pipeline.run().await
	}
}

async fn run_loop(
	pipeline: Arc<SyncPipeline>,
	period: Duration,
	mut shutdown: oneshot::Receiver<()>,
) {
	let mut ticker = tokio::time::interval(period);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	loop {
		tokio::select! {
			biased;
			_ = &mut shutdown => break,
			_ = ticker.tick() => run_tick(&pipeline).await,
		}
	}
	debug!("Sync loop exited");
}

async fn run_tick(pipeline: &SyncPipeline) {
	match pipeline.run().await {
		Ok(_) => {}
		Err(SyncError::RunInProgress) => {
			warn!("Skipping scheduled sync: a run is already in progress")
		}
		Err(e) => error!("Scheduled sync failed: {}", e),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::{ImagePolicy, MemoryPropertyStore, Reconciler};
	use crate::sync::testing::*;

	fn scheduler(source: Arc<FakeSource>, interval: Duration) -> SyncScheduler {
		let store = Arc::new(MemoryPropertyStore::new());
		let pipeline = SyncPipeline::new(
			source,
			Arc::new(FakeResolver::default()),
			Reconciler::new(store, ImagePolicy::Overwrite),
			program_id(),
		);
		SyncScheduler::new(Arc::new(pipeline), interval)
	}

	async fn wait_for_calls(source: &FakeSource, at_least: usize) {
		for _ in 0..100 {
			if source.calls() >= at_least {
				return;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		panic!("expected at least {at_least} runs, saw {}", source.calls());
	}

	#[tokio::test]
	async fn start_runs_immediately_and_is_idempotent() {
		let source = Arc::new(FakeSource::with_accounts(vec![property_account(1)]));
		let scheduler = scheduler(source.clone(), Duration::from_secs(3600));

		assert_eq!(scheduler.state().await, SchedulerState::Stopped);
		assert!(scheduler.start().await);
		assert!(!scheduler.start().await);
		assert_eq!(scheduler.state().await, SchedulerState::Running);

		wait_for_calls(&source, 1).await;
		tokio::time::sleep(Duration::from_millis(50)).await;
		assert_eq!(source.calls(), 1);

		assert!(scheduler.stop().await);
	}

	#[tokio::test]
	async fn stop_halts_ticks_and_restart_resumes() {
		let source = Arc::new(FakeSource::with_accounts(vec![property_account(1)]));
		let scheduler = scheduler(source.clone(), Duration::from_millis(20));

		scheduler.start().await;
		wait_for_calls(&source, 3).await;

		assert!(scheduler.stop().await);
		assert!(!scheduler.stop().await);
		assert_eq!(scheduler.state().await, SchedulerState::Stopped);

		tokio::time::sleep(Duration::from_millis(50)).await;
		let after_stop = source.calls();
		tokio::time::sleep(Duration::from_millis(100)).await;
		assert_eq!(source.calls(), after_stop);

		assert!(scheduler.start().await);
		wait_for_calls(&source, after_stop + 1).await;
		scheduler.stop().await;
	}

	#[tokio::test]
	async fn stop_does_not_wait_for_an_in_flight_run() {
		let source = Arc::new(FakeSource {
			delay: Some(Duration::from_secs(5)),
			..FakeSource::with_accounts(vec![property_account(1)])
		});
		let scheduler = scheduler(source.clone(), Duration::from_secs(3600));

		scheduler.start().await;
		wait_for_calls(&source, 1).await;

		let stopped = tokio::time::timeout(Duration::from_millis(100), scheduler.stop()).await;
		assert_eq!(stopped.ok(), Some(true));
	}

	#[tokio::test]
	async fn trigger_once_runs_regardless_of_state() {
		let source = Arc::new(FakeSource::with_accounts(vec![property_account(1)]));
		let scheduler = scheduler(source.clone(), Duration::from_secs(3600));

		let report = scheduler.trigger_once().await.unwrap();
		assert_eq!(report.persisted, 1);
		assert_eq!(scheduler.state().await, SchedulerState::Stopped);
	}

	#[tokio::test]
	async fn trigger_once_surfaces_scan_failures() {
		let source = Arc::new(FakeSource {
			fail: true,
			..Default::default()
		});
		let scheduler = scheduler(source, Duration::from_secs(3600));

		assert!(matches!(
			scheduler.trigger_once().await,
			Err(SyncError::LedgerError(_))
		));
	}
}
