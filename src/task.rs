//! Running a parse off the calling thread.
//!
//! Work goes through a [`Spawner`], so callers decide where parses run.
//! [`PoolSpawner`] uses a fixed-size thread pool; [`ImmediateSpawner`] runs
//! the job before returning, which keeps tests deterministic.

use std::io::Read;

use tracing::debug;

use crate::config::ParserConfiguration;
use crate::error::Error;
use crate::parse::parse_reader_with;
use crate::value::Map;

/// Number of threads in a default [`PoolSpawner`].
pub const DEFAULT_POOL_SIZE: usize = 4;

/// A job submitted to a [`Spawner`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a job.
pub trait Spawner {
    fn spawn(&self, job: Job);
}

/// Runs every job on the calling thread, immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateSpawner;

impl Spawner for ImmediateSpawner {
    fn spawn(&self, job: Job) {
        job()
    }
}

/// Runs jobs on a fixed-size thread pool.
pub struct PoolSpawner {
    pool: rayon::ThreadPool,
}

impl PoolSpawner {
    /// A pool with [`DEFAULT_POOL_SIZE`] threads.
    pub fn new() -> Result<Self, Error> {
        Self::with_threads(DEFAULT_POOL_SIZE)
    }

    pub fn with_threads(threads: usize) -> Result<Self, Error> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("xmlson-{}", i))
            .build()
            .map_err(|e| Error::UnsupportedOperation(format!("cannot start thread pool: {}", e)))?;
        Ok(PoolSpawner { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Spawner for PoolSpawner {
    fn spawn(&self, job: Job) {
        self.pool.spawn(job)
    }
}

/// Parse `reader` as a job on `spawner`.
///
/// Exactly one of the callbacks is called, with the parsed document or
/// with the error that stopped the parse. Nothing is returned to the
/// caller, and there is no way to cancel a submitted parse.
///
/// ```rust
/// use std::sync::mpsc;
/// use xmlson::{parse_async, ImmediateSpawner, ParserConfiguration};
///
/// let (tx, rx) = mpsc::channel();
/// let failed = tx.clone();
/// parse_async(
///     &ImmediateSpawner,
///     "<a>1</a>".as_bytes(),
///     ParserConfiguration::default(),
///     move |map| tx.send(Ok(map)).unwrap(),
///     move |e| failed.send(Err(e)).unwrap(),
/// );
/// let map = rx.recv().unwrap().unwrap();
/// assert_eq!(map.get("a"), Some(&1.into()));
/// ```
pub fn parse_async<R, F, E>(
    spawner: &impl Spawner,
    reader: R,
    config: ParserConfiguration,
    on_finish: F,
    on_error: E,
) where
    R: Read + Send + 'static,
    F: FnOnce(Map) + Send + 'static,
    E: FnOnce(Error) + Send + 'static,
{
    debug!("submitting parse");
    spawner.spawn(Box::new(move || match parse_reader_with(reader, &config) {
        Ok(map) => on_finish(map),
        Err(e) => {
            debug!(error = %e, "background parse failed");
            on_error(e)
        }
    }));
}
