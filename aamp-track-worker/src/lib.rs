//! # AAMP Core Track Worker
//!
//! One background thread per media track, running caller-supplied jobs one
//! at a time so the caller never blocks on submission.
//!
//! ## Usage
//!
//! ```rust
//! use aamp_track_worker::{MediaType, TrackWorker, TrackWorkerConfig};
//!
//! let config = TrackWorkerConfig::new().with_thread_name_prefix("fetch");
//! let worker = TrackWorker::with_config(MediaType::Audio, &config);
//!
//! worker.submit_job(|| {
//!     // download and inject the next fragment
//! });
//! worker.wait_for_completion();
//! ```
//!
//! ## Failure handling
//!
//! A job that panics is caught and logged; the worker keeps serving later
//! jobs. If the worker thread cannot be started, [`TrackWorker::with_config`]
//! still returns a worker, which drops every submitted job.

pub mod config;
pub mod error;
pub mod media_type;
pub mod worker;

pub use config::TrackWorkerConfig;
pub use error::{Result, TrackWorkerError};
pub use media_type::MediaType;
pub use worker::{Job, TrackWorker};
