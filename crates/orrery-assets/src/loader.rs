//! Background image decoding with a configurable thread pool.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use orrery_materials::{TextureHandle, TextureLoader};
use tracing::{debug, warn};

/// Errors raised while starting the loader.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The pool needs at least one worker.
    #[error("texture loader needs at least one worker thread")]
    NoWorkers,

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn texture worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// One queued decode.
struct DecodeJob {
    path: PathBuf,
    handle: TextureHandle,
}

/// [`TextureLoader`] that decodes image files on worker threads.
///
/// A file that is missing or fails to decode is logged and its handle is
/// never published. Dropping the loader finishes every queued job before the
/// workers exit.
pub struct ImageTextureLoader {
    job_sender: Option<Sender<DecodeJob>>,
    workers: Vec<JoinHandle<()>>,
    in_flight: Arc<AtomicU64>,
}

impl ImageTextureLoader {
    /// Start `thread_count` decode workers.
    pub fn new(thread_count: usize) -> Result<Self, LoaderError> {
        if thread_count == 0 {
            return Err(LoaderError::NoWorkers);
        }

        let (job_sender, job_receiver) = unbounded::<DecodeJob>();
        let in_flight = Arc::new(AtomicU64::new(0));
        let mut workers = Vec::with_capacity(thread_count);

        for index in 0..thread_count {
            let receiver = job_receiver.clone();
            let in_flight = Arc::clone(&in_flight);

            let worker = std::thread::Builder::new()
                .name(format!("texture-worker-{index}"))
                .spawn(move || decode_loop(&receiver, &in_flight))
                .map_err(LoaderError::Spawn)?;
            workers.push(worker);
        }

        Ok(Self {
            job_sender: Some(job_sender),
            workers,
            in_flight,
        })
    }

    /// A pool sized from the CPU count, capped at four workers.
    pub fn with_defaults() -> Result<Self, LoaderError> {
        let threads = num_cpus::get().saturating_sub(1).clamp(1, 4);
        Self::new(threads)
    }

    /// Jobs queued or being decoded.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl TextureLoader for ImageTextureLoader {
    fn load(&self, path: &str) -> TextureHandle {
        let handle = TextureHandle::pending(path);
        let job = DecodeJob {
            path: PathBuf::from(path),
            handle: handle.clone(),
        };

        self.in_flight.fetch_add(1, Ordering::AcqRel);
        let queued = self
            .job_sender
            .as_ref()
            .is_some_and(|sender| sender.send(job).is_ok());
        if !queued {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            warn!(%path, "texture workers are gone; texture will never load");
        }

        handle
    }
}

impl Drop for ImageTextureLoader {
    fn drop(&mut self) {
        // Closing the queue lets workers drain it and exit.
        self.job_sender.take();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("texture worker panicked");
            }
        }
    }
}

fn decode_loop(receiver: &Receiver<DecodeJob>, in_flight: &AtomicU64) {
    while let Ok(job) = receiver.recv() {
        let start = Instant::now();
        match image::open(&job.path) {
            Ok(decoded) => {
                let rgba = decoded.into_rgba8();
                let (width, height) = rgba.dimensions();
                job.handle.publish(rgba);
                debug!(
                    path = %job.path.display(),
                    width,
                    height,
                    elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "texture ready"
                );
            }
            Err(err) => {
                warn!(path = %job.path.display(), error = %err, "texture unavailable");
            }
        }
        in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
