//! Background job runner for one media track
//!
//! The worker holds a single job slot rather than a queue. Submitting while
//! a previous job is still waiting replaces it; a job submitted while
//! another is executing runs once that one finishes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::config::TrackWorkerConfig;
use crate::error::{Result, TrackWorkerError};
use crate::media_type::MediaType;

/// A unit of work for a track worker
pub type Job = Box<dyn FnOnce() + Send + 'static>;

struct JobSlot {
    job: Option<Job>,
    /// Set on submit, cleared when the worker has finished all submitted work
    available: bool,
    stop: bool,
}

struct Shared {
    media_type: MediaType,
    slot: Mutex<JobSlot>,
    job_ready: Condvar,
    job_done: Condvar,
}

/// Runs submitted jobs one at a time on a dedicated thread
///
/// Dropping the worker stops and joins its thread. A job that is executing
/// at that point is allowed to finish; one that has not started is dropped.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use aamp_track_worker::{MediaType, TrackWorker};
///
/// let worker = TrackWorker::new(MediaType::Video);
/// let fetched = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&fetched);
/// worker.submit_job(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// worker.wait_for_completion();
///
/// assert_eq!(fetched.load(Ordering::SeqCst), 1);
/// ```
pub struct TrackWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl TrackWorker {
    /// Start a worker with the default configuration
    pub fn new(media_type: MediaType) -> Self {
        Self::with_config(media_type, &TrackWorkerConfig::default())
    }

    /// Start a worker with a custom configuration
    ///
    /// Never fails: if the configuration is invalid or the thread cannot be
    /// created the error is logged and the worker stays stopped, silently
    /// dropping every job. Use [`TrackWorker::spawn`] to observe the error.
    pub fn with_config(media_type: MediaType, config: &TrackWorkerConfig) -> Self {
        match Self::spawn(media_type, config) {
            Ok(worker) => worker,
            Err(e) => {
                tracing::error!("Track worker for media type {} not started: {}", media_type, e);
                Self {
                    shared: Arc::new(Shared::new(media_type, true)),
                    handle: None,
                }
            }
        }
    }

    /// Start a worker, reporting configuration and thread creation errors
    pub fn spawn(media_type: MediaType, config: &TrackWorkerConfig) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new(media_type, false));
        let name = config.thread_name(media_type.name());

        let mut builder = thread::Builder::new().name(name.clone());
        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        let worker_shared = Arc::clone(&shared);
        let handle = builder
            .spawn(move || worker_shared.process_jobs())
            .map_err(|source| TrackWorkerError::Spawn { name, source })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn media_type(&self) -> MediaType {
        self.shared.media_type
    }

    /// Whether the worker thread was started and has not been asked to stop
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.shared.slot.lock().stop
    }

    /// Hand a job to the worker without waiting for it
    pub fn submit_job<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let mut slot = self.shared.slot.lock();
            if slot.stop {
                tracing::debug!(
                    "Dropping job for media type {}, worker is stopped",
                    self.shared.media_type
                );
                return;
            }
            if slot.job.is_some() {
                tracing::debug!(
                    "Replacing unstarted job for media type {}",
                    self.shared.media_type
                );
            }
            slot.job = Some(Box::new(job));
            slot.available = true;
        }
        tracing::debug!("Job submitted for media type {}", self.shared.media_type);
        self.shared.job_ready.notify_one();
    }

    /// Block until the worker has no submitted work left
    ///
    /// Returns immediately when nothing was ever submitted.
    pub fn wait_for_completion(&self) {
        let mut slot = self.shared.slot.lock();
        while slot.available && !slot.stop {
            self.shared.job_done.wait(&mut slot);
        }
        tracing::debug!("Job wait completed for media type {}", self.shared.media_type);
    }
}

impl Drop for TrackWorker {
    fn drop(&mut self) {
        {
            let mut slot = self.shared.slot.lock();
            slot.stop = true;
            slot.available = true;
        }
        self.shared.job_ready.notify_all();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!(
                    "Track worker thread for media type {} panicked",
                    self.shared.media_type
                );
            }
        }
        self.shared.job_done.notify_all();
    }
}

impl std::fmt::Debug for TrackWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackWorker")
            .field("media_type", &self.shared.media_type)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Shared {
    fn new(media_type: MediaType, stopped: bool) -> Self {
        Self {
            media_type,
            slot: Mutex::new(JobSlot {
                job: None,
                available: false,
                stop: stopped,
            }),
            job_ready: Condvar::new(),
            job_done: Condvar::new(),
        }
    }

    fn process_jobs(&self) {
        tracing::info!("Process job for media type {}", self.media_type);

        loop {
            let job = {
                let mut slot = self.slot.lock();
                while !slot.available && !slot.stop {
                    self.job_ready.wait(&mut slot);
                }
                if slot.stop {
                    break;
                }
                slot.job.take()
            };

            if let Some(job) = job {
                tracing::debug!("Executing job for media type {}", self.media_type);
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    match panic_message(payload.as_ref()) {
                        Some(message) => tracing::error!(
                            "Exception caught in job for media type {}: {}",
                            self.media_type,
                            message
                        ),
                        None => tracing::error!(
                            "Unknown exception caught in job for media type {}",
                            self.media_type
                        ),
                    }
                }
            }

            {
                let mut slot = self.slot.lock();
                // Work submitted while this job ran is still outstanding
                slot.available = slot.job.is_some();
            }
            self.job_done.notify_all();
        }

        tracing::info!("Exiting job loop for media type {}", self.media_type);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_wait_without_job_returns() {
        let worker = TrackWorker::new(MediaType::Audio);
        worker.wait_for_completion();
        assert!(worker.is_running());
        assert_eq!(worker.media_type(), MediaType::Audio);
    }

    #[test]
    fn test_thread_is_named_after_media_type() {
        let config = TrackWorkerConfig::new().with_thread_name_prefix("track");
        let worker = TrackWorker::spawn(MediaType::Subtitle, &config).unwrap();

        let (tx, rx) = mpsc::channel();
        worker.submit_job(move || {
            let _ = tx.send(thread::current().name().map(str::to_string));
        });

        let name = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(name.as_deref(), Some("track-SUBTITLE"));
    }

    #[test]
    fn test_invalid_config_leaves_worker_stopped() {
        let config = TrackWorkerConfig::new().with_thread_name_prefix("bad\0");
        assert!(matches!(
            TrackWorker::spawn(MediaType::Video, &config),
            Err(TrackWorkerError::Configuration(_))
        ));

        let worker = TrackWorker::with_config(MediaType::Video, &config);
        assert!(!worker.is_running());

        let (tx, rx) = mpsc::channel::<()>();
        worker.submit_job(move || {
            let _ = tx.send(());
        });
        worker.wait_for_completion();
        // The job was dropped unrun, so its sender is gone
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_panic_message_extraction() {
        let typed: Box<dyn Any + Send> = Box::new("segment download failed");
        assert_eq!(panic_message(typed.as_ref()), Some("segment download failed"));

        let owned: Box<dyn Any + Send> = Box::new(String::from("decrypt error"));
        assert_eq!(panic_message(owned.as_ref()), Some("decrypt error"));

        let unknown: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(unknown.as_ref()), None);
    }
}
