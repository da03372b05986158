use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::foundation::config::MixerConfig;
use crate::foundation::core::Matrix;
use crate::foundation::error::{MixerError, MixerResult};
use crate::mixing::engine::{MixInputs, MixingEngine};

/// Progress published once a job's worker has started.
pub const PROGRESS_STARTED: f64 = 0.1;
/// Progress published alongside a successful result.
pub const PROGRESS_DONE: f64 = 1.0;
/// Progress sentinel for a failed job.
pub const PROGRESS_ERROR: f64 = -1.0;

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Snapshot of the runner's latest job.
#[derive(Clone, Debug, PartialEq)]
pub enum JobStatus {
    /// Nothing submitted, or the last job was cancelled before publishing.
    Idle,
    /// Worker still running; carries the last published progress.
    Running(f64),
    /// A result is available.
    Completed,
    /// The job failed; carries the logged error message.
    Failed(String),
}

#[derive(Debug, Default)]
struct JobSlot {
    generation: u64,
    progress: f64,
    result: Option<Matrix>,
    error: Option<String>,
}

#[derive(Debug)]
struct LiveJob {
    generation: u64,
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Runs at most one mixing job at a time on a background thread, with polled progress.
///
/// Every submission bumps a generation counter under the runner's lock and resets progress
/// and result in the same critical section. A worker publishes only while its generation is
/// still current and its cancel flag is clear, so a superseded job can never overwrite the
/// state of the job that replaced it. Cancellation is cooperative: a running FFT is not
/// interrupted.
#[derive(Debug)]
pub struct JobRunner {
    slot: Arc<Mutex<JobSlot>>,
    live: Option<LiveJob>,
    engine: MixingEngine,
    join_timeout: Duration,
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new(&MixerConfig::default())
    }
}

impl JobRunner {
    /// Idle runner using `config` for the engine and the cancel wait bound.
    pub fn new(config: &MixerConfig) -> Self {
        Self {
            slot: Arc::new(Mutex::new(JobSlot::default())),
            live: None,
            engine: MixingEngine::new(config),
            join_timeout: config.cancel_join_timeout(),
        }
    }

    /// Start mixing `inputs` in the background, superseding any live job.
    ///
    /// Returns as soon as the worker is spawned; failures inside the mix surface only through
    /// [`poll_progress`](Self::poll_progress) returning [`PROGRESS_ERROR`].
    #[tracing::instrument(skip(self, inputs), fields(mode = %inputs.mode, images = inputs.images.len()))]
    pub fn submit(&mut self, inputs: MixInputs) -> MixerResult<()> {
        let engine = self.engine.clone();
        self.submit_task(move || engine.mix(&inputs))
    }

    /// Run an arbitrary matrix-producing task under the same supersession and progress
    /// contract as [`submit`](Self::submit).
    pub fn submit_task<F>(&mut self, task: F) -> MixerResult<()>
    where
        F: FnOnce() -> MixerResult<Matrix> + Send + 'static,
    {
        self.cancel_running();

        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.progress = 0.0;
            slot.result = None;
            slot.error = None;
            slot.generation
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let worker = Worker {
            slot: Arc::clone(&self.slot),
            cancel: Arc::clone(&cancel),
            generation,
        };
        let thread = std::thread::Builder::new()
            .name("fourier-mix-job".into())
            .spawn(move || worker.run(task))
            .context("spawn mixing job thread")?;

        tracing::info!(generation, "mix job submitted");
        self.live = Some(LiveJob {
            generation,
            cancel,
            thread,
        });
        Ok(())
    }

    /// Raise the live job's cancel flag and wait up to the configured bound for it to exit.
    ///
    /// A job that does not stop in time stays tracked by [`is_running`](Self::is_running)
    /// until its thread exits, but it can no longer publish. The next submission detaches it.
    pub fn cancel_running(&mut self) {
        let Some(job) = self.live.take() else {
            return;
        };
        job.cancel.store(true, Ordering::SeqCst);

        let deadline = Instant::now() + self.join_timeout;
        while !job.thread.is_finished() && Instant::now() < deadline {
            std::thread::sleep(JOIN_POLL_INTERVAL);
        }
        if job.thread.is_finished() {
            // Panics are caught inside the worker, so join only reaps the thread.
            let _ = job.thread.join();
            tracing::debug!(generation = job.generation, "cancelled job joined");
        } else {
            tracing::warn!(
                generation = job.generation,
                timeout_ms = self.join_timeout.as_millis() as u64,
                "cancelled job still running"
            );
            self.live = Some(job);
        }
    }

    /// Last published progress: `0.0..=1.0`, or [`PROGRESS_ERROR`].
    pub fn poll_progress(&self) -> f64 {
        lock(&self.slot).progress
    }

    /// Copy of the last published result, if any.
    pub fn poll_result(&self) -> Option<Matrix> {
        lock(&self.slot).result.clone()
    }

    /// Take the last published result, leaving none behind.
    pub fn take_result(&self) -> Option<Matrix> {
        lock(&self.slot).result.take()
    }

    /// Whether the live job's worker has not yet terminated.
    pub fn is_running(&self) -> bool {
        self.live
            .as_ref()
            .is_some_and(|job| !job.thread.is_finished())
    }

    /// Consistent snapshot of progress, result and error.
    pub fn status(&self) -> JobStatus {
        let running = self.is_running();
        let slot = lock(&self.slot);
        if let Some(err) = &slot.error {
            JobStatus::Failed(err.clone())
        } else if slot.result.is_some() {
            JobStatus::Completed
        } else if running {
            JobStatus::Running(slot.progress)
        } else {
            JobStatus::Idle
        }
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        if let Some(job) = &self.live {
            job.cancel.store(true, Ordering::SeqCst);
        }
    }
}

struct Worker {
    slot: Arc<Mutex<JobSlot>>,
    cancel: Arc<AtomicBool>,
    generation: u64,
}

impl Worker {
    fn run<F>(self, task: F)
    where
        F: FnOnce() -> MixerResult<Matrix>,
    {
        if !self.publish(|slot| slot.progress = PROGRESS_STARTED) {
            return;
        }

        let outcome = catch_unwind(AssertUnwindSafe(task)).unwrap_or_else(|panic| {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "mixing task panicked".to_string());
            Err(MixerError::job(msg))
        });

        match outcome {
            Ok(result) => {
                let published = self.publish(|slot| {
                    slot.progress = PROGRESS_DONE;
                    slot.result = Some(result);
                });
                if published {
                    tracing::info!(generation = self.generation, "mix job finished");
                }
            }
            Err(err) => {
                tracing::warn!(generation = self.generation, error = %err, "mix job failed");
                let message = err.to_string();
                self.publish(|slot| {
                    slot.progress = PROGRESS_ERROR;
                    slot.result = None;
                    slot.error = Some(message);
                });
            }
        }
    }

    /// Apply `update` if this job is still current; returns whether it was applied.
    fn publish(&self, update: impl FnOnce(&mut JobSlot)) -> bool {
        let mut slot = lock(&self.slot);
        if self.cancel.load(Ordering::SeqCst) || slot.generation != self.generation {
            tracing::debug!(generation = self.generation, "superseded job skipped publish");
            return false;
        }
        update(&mut slot);
        true
    }
}

fn lock(slot: &Mutex<JobSlot>) -> MutexGuard<'_, JobSlot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "../../tests/unit/jobs/runner.rs"]
mod tests;
