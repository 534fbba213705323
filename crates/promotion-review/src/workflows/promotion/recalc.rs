//! Background recalculation after grading or level criteria edits.
//!
//! Saves enqueue a job and return immediately. A single worker drains the queue in order,
//! running each job on the blocking pool with a bounded number of attempts. Jobs are not
//! deduplicated; two saves in quick succession produce two passes and the last one wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::repository::PromotionRepository;
use super::service::{PromotionSelectionService, SelectionSummary};
use crate::config::PromotionConfig;

/// What caused a recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecalculationTrigger {
    GradeCriteriaChanged,
    LevelCriteriaChanged { year: i32 },
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(250),
        }
    }
}

impl From<&PromotionConfig> for RetrySettings {
    fn from(config: &PromotionConfig) -> Self {
        Self {
            max_attempts: config.recalc_max_attempts.max(1),
            retry_delay: config.recalc_retry_delay,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecalculationJob {
    id: u64,
    trigger: RecalculationTrigger,
    year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecalculationOutcome {
    Completed { summary: SelectionSummary },
    Failed { error: String },
}

/// Emitted once per finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub job_id: u64,
    pub trigger: RecalculationTrigger,
    pub year: i32,
    pub attempts: u32,
    pub outcome: RecalculationOutcome,
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("recalculation queue is closed")]
    Closed,
}

/// Handle for submitting recalculation jobs. Cheap to clone.
#[derive(Clone)]
pub struct RecalculationQueue {
    sender: mpsc::UnboundedSender<RecalculationJob>,
    reports: broadcast::Sender<RecalculationReport>,
    next_id: Arc<AtomicU64>,
}

impl RecalculationQueue {
    /// Start the worker on the current tokio runtime.
    pub fn spawn<R>(
        service: Arc<PromotionSelectionService<R>>,
        settings: RetrySettings,
    ) -> (Self, JoinHandle<()>)
    where
        R: PromotionRepository + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (reports, _) = broadcast::channel(64);

        let worker = tokio::spawn(run_worker(service, settings, receiver, reports.clone()));

        let queue = Self {
            sender,
            reports,
            next_id: Arc::new(AtomicU64::new(1)),
        };
        (queue, worker)
    }

    /// Enqueue a job without waiting for it. Returns the job id.
    pub fn submit(&self, trigger: RecalculationTrigger, year: i32) -> Result<u64, QueueError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sender
            .send(RecalculationJob { id, trigger, year })
            .map_err(|_| QueueError::Closed)?;
        Ok(id)
    }

    /// Enqueue and log instead of failing; for callers whose own result must not change.
    pub fn notify(&self, trigger: RecalculationTrigger, year: i32) {
        match self.submit(trigger, year) {
            Ok(job_id) => info!(job_id, ?trigger, year, "recalculation queued"),
            Err(err) => error!(?trigger, year, error = %err, "recalculation not queued"),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RecalculationReport> {
        self.reports.subscribe()
    }
}

async fn run_worker<R>(
    service: Arc<PromotionSelectionService<R>>,
    settings: RetrySettings,
    mut receiver: mpsc::UnboundedReceiver<RecalculationJob>,
    reports: broadcast::Sender<RecalculationReport>,
) where
    R: PromotionRepository + 'static,
{
    while let Some(job) = receiver.recv().await {
        let report = run_job(&service, settings, job).await;
        // No subscribers is the normal case outside tests.
        let _ = reports.send(report);
    }
    info!("recalculation queue drained and closed");
}

async fn run_job<R>(
    service: &Arc<PromotionSelectionService<R>>,
    settings: RetrySettings,
    job: RecalculationJob,
) -> RecalculationReport
where
    R: PromotionRepository + 'static,
{
    let max_attempts = settings.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let worker_service = Arc::clone(service);
        let year = job.year;
        let result =
            tokio::task::spawn_blocking(move || worker_service.recalculate_and_select(year)).await;

        let error = match result {
            Ok(Ok(summary)) => {
                info!(
                    job_id = job.id,
                    trigger = ?job.trigger,
                    year,
                    attempt,
                    added = summary.added,
                    total = summary.total,
                    "recalculation finished"
                );
                return RecalculationReport {
                    job_id: job.id,
                    trigger: job.trigger,
                    year,
                    attempts: attempt,
                    outcome: RecalculationOutcome::Completed { summary },
                };
            }
            Ok(Err(err)) => err.to_string(),
            Err(join_err) => format!("recalculation task aborted: {join_err}"),
        };

        if attempt >= max_attempts {
            error!(
                job_id = job.id,
                trigger = ?job.trigger,
                year,
                attempt,
                %error,
                "recalculation failed"
            );
            return RecalculationReport {
                job_id: job.id,
                trigger: job.trigger,
                year,
                attempts: attempt,
                outcome: RecalculationOutcome::Failed { error },
            };
        }

        warn!(job_id = job.id, year, attempt, %error, "recalculation attempt failed; retrying");
        tokio::time::sleep(settings.retry_delay).await;
    }
}
