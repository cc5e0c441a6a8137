use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use common::{GetSubmissionRequest, Submission, Verdict};
use dashmap::DashSet;
use futures::future::join_all;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api;
use crate::error::ClientError;
use crate::notify::NotificationDispatcher;
use crate::request::RequestClient;
use crate::tracker::SubmissionTracker;

/// Where the poller reads current verdicts from.
#[async_trait]
pub trait VerdictSource: Send + Sync {
    /// Current state of one submission. `Ok(None)` if the backend returned
    /// no matching record.
    async fn fetch(&self, submission_id: i64) -> Result<Option<Submission>, ClientError>;
}

#[async_trait]
impl VerdictSource for RequestClient {
    async fn fetch(&self, submission_id: i64) -> Result<Option<Submission>, ClientError> {
        let envelope = api::submissions::get(self, &GetSubmissionRequest::by_id(submission_id))
            .await?;
        Ok(envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .find(|s| s.id == submission_id))
    }
}

/// Process-level state of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    Idle,
    Polling,
}

/// What one poll cycle observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Ids that reached a terminal verdict and were notified.
    pub resolved: Vec<(i64, Verdict)>,
    /// Ids still pending.
    pub pending: Vec<i64>,
    /// Ids whose query failed; they stay tracked.
    pub failed: Vec<i64>,
    /// Ids skipped because an earlier query was still in flight.
    pub skipped: Vec<i64>,
    /// Results dropped because the poller was stopped or the id was
    /// already untracked.
    pub discarded: Vec<i64>,
}

impl CycleReport {
    pub fn queried(&self) -> usize {
        self.resolved.len() + self.pending.len() + self.failed.len() + self.discarded.len()
    }
}

enum QueryOutcome {
    Resolved(Verdict),
    Pending,
    Failed,
    Discarded,
}

enum Phase {
    Idle,
    Polling { run: u64, cancel: CancellationToken },
}

struct Shared {
    tracker: Arc<SubmissionTracker>,
    source: Arc<dyn VerdictSource>,
    dispatcher: NotificationDispatcher,
    cadence: Duration,
    phase: Mutex<Phase>,
    in_flight: DashSet<i64>,
    /// Bumped by `stop`; results of queries issued under an older epoch are dropped.
    epoch: AtomicU64,
    runs: AtomicU64,
}

/// Removes an id from the in-flight set when its query ends or is dropped.
struct InFlightGuard<'a> {
    in_flight: &'a DashSet<i64>,
    id: i64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.id);
    }
}

/// Background process resolving tracked submissions to verdicts.
///
/// While the tracker is non-empty the poller queries every tracked id once
/// per cadence tick. A terminal verdict removes the id and shows exactly one
/// notification; `Pending` and failed queries leave it tracked for the next
/// tick. The timer task exists only while polling.
#[derive(Clone)]
pub struct VerdictPoller {
    shared: Arc<Shared>,
}

impl VerdictPoller {
    pub fn new(
        tracker: Arc<SubmissionTracker>,
        source: Arc<dyn VerdictSource>,
        dispatcher: NotificationDispatcher,
        cadence: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                tracker,
                source,
                dispatcher,
                cadence,
                phase: Mutex::new(Phase::Idle),
                in_flight: DashSet::new(),
                epoch: AtomicU64::new(0),
                runs: AtomicU64::new(0),
            }),
        }
    }

    pub fn tracker(&self) -> &Arc<SubmissionTracker> {
        &self.shared.tracker
    }

    pub fn cadence(&self) -> Duration {
        self.shared.cadence
    }

    pub fn state(&self) -> PollerState {
        match *self.shared.phase() {
            Phase::Idle => PollerState::Idle,
            Phase::Polling { .. } => PollerState::Polling,
        }
    }

    /// Track a submission and make sure the poller is running.
    ///
    /// Must be called inside a tokio runtime.
    pub fn track(&self, submission_id: i64) {
        if self.shared.tracker.add(submission_id) {
            debug!(submission_id, "Tracking submission");
        }
        self.start();
    }

    /// Stop tracking a submission. A verdict arriving later is not notified.
    pub fn untrack(&self, submission_id: i64) -> bool {
        self.shared.tracker.remove(submission_id)
    }

    /// Enter `Polling` if there is anything to poll. No-op when already polling.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(&self) {
        let mut phase = self.shared.phase();
        if matches!(*phase, Phase::Polling { .. }) || self.shared.tracker.is_empty() {
            return;
        }

        let run = self.shared.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        let cancel = CancellationToken::new();
        *phase = Phase::Polling {
            run,
            cancel: cancel.clone(),
        };
        drop(phase);

        info!(
            run,
            tracked = self.shared.tracker.len(),
            cadence_ms = self.shared.cadence.as_millis() as u64,
            "Verdict poller started"
        );
        tokio::spawn(Shared::run(self.shared.clone(), run, epoch, cancel));
    }

    /// Force the poller to `Idle`. Queries already in flight finish, but
    /// their results are discarded. Tracked ids are kept.
    pub fn stop(&self) {
        let mut phase = self.shared.phase();
        if let Phase::Polling { run, cancel } = &*phase {
            cancel.cancel();
            self.shared.epoch.fetch_add(1, Ordering::SeqCst);
            info!(run = *run, "Verdict poller stopped");
        }
        *phase = Phase::Idle;
    }

    /// Run one poll cycle over a snapshot of the tracked ids.
    ///
    /// Resolves once every query issued by this cycle has completed; each id
    /// is dispatched as soon as its own query completes.
    pub async fn poll_once(&self) -> CycleReport {
        let epoch = self.shared.epoch.load(Ordering::SeqCst);
        self.shared.cycle(epoch).await
    }
}

impl Shared {
    fn phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(self: Arc<Self>, run: u64, epoch: u64, cancel: CancellationToken) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.cadence, self.cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if self.idle_if_drained(run) {
                break;
            }

            // Cycles run detached so a slow query never delays the next tick.
            let shared = self.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let report = shared.cycle(epoch).await;
                if !report.resolved.is_empty() || !report.failed.is_empty() {
                    debug!(
                        run,
                        queried = report.queried(),
                        resolved = report.resolved.len(),
                        pending = report.pending.len(),
                        failed = report.failed.len(),
                        skipped = report.skipped.len(),
                        "Poll cycle finished"
                    );
                }
                // Release the timer as soon as the last id resolves.
                if shared.idle_if_drained(run) {
                    cancel.cancel();
                }
            });
        }
    }

    /// Switch to `Idle` when nothing is tracked. Returns true if this run
    /// must end, either because it went idle or because it was superseded.
    fn idle_if_drained(&self, run: u64) -> bool {
        let mut phase = self.phase();
        match &*phase {
            Phase::Polling { run: current, .. } if *current == run => {
                if self.tracker.is_empty() {
                    *phase = Phase::Idle;
                    info!(run, "Verdict poller idle");
                    true
                } else {
                    false
                }
            }
            _ => true,
        }
    }

    async fn cycle(&self, epoch: u64) -> CycleReport {
        let mut report = CycleReport::default();
        let mut queries = Vec::new();

        for id in self.tracker.snapshot() {
            if !self.in_flight.insert(id) {
                report.skipped.push(id);
                continue;
            }
            queries.push(self.query(id, epoch));
        }

        for (id, outcome) in join_all(queries).await {
            match outcome {
                QueryOutcome::Resolved(verdict) => report.resolved.push((id, verdict)),
                QueryOutcome::Pending => report.pending.push(id),
                QueryOutcome::Failed => report.failed.push(id),
                QueryOutcome::Discarded => report.discarded.push(id),
            }
        }
        report
    }

    /// Query one id and apply its result. The caller has marked it in flight.
    async fn query(&self, id: i64, epoch: u64) -> (i64, QueryOutcome) {
        let _guard = InFlightGuard {
            in_flight: &self.in_flight,
            id,
        };
        let result = self.source.fetch(id).await;

        if self.epoch.load(Ordering::SeqCst) != epoch {
            debug!(submission_id = id, "Poller stopped, discarding late result");
            return (id, QueryOutcome::Discarded);
        }

        let outcome = match result {
            Ok(Some(submission)) if submission.status.is_terminal() => {
                // Only the completion that actually removes the id notifies.
                if self.tracker.remove(id) {
                    info!(submission_id = id, status = %submission.status, "Submission resolved");
                    self.dispatcher.notify(id, submission.status);
                    QueryOutcome::Resolved(submission.status)
                } else {
                    QueryOutcome::Discarded
                }
            }
            Ok(Some(_)) => QueryOutcome::Pending,
            Ok(None) => {
                debug!(submission_id = id, "Submission not returned, retrying next cycle");
                QueryOutcome::Failed
            }
            Err(e) => {
                warn!(
                    submission_id = id,
                    kind = %e.kind(),
                    error = %e,
                    "Verdict query failed, retrying next cycle"
                );
                QueryOutcome::Failed
            }
        };
        (id, outcome)
    }
}
