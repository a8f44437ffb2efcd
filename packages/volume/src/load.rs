//! Timed load generation and cleanup.
//!
//! A load run creates one `poraload-*` file and, until its deadline passes,
//! overwrites it with a fresh 1 MiB payload, reads it back and compares.
//! The return value is the number of completed cycles, i.e. MiB written.
//!
//! A read-back mismatch stops the run and leaves the file behind for
//! inspection. [`cleanup_orphaned_load_files`] removes such leftovers.

use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Error, Phase, Result};
use crate::probe::{self, PAYLOAD};
use crate::random;

/// Name prefix shared by every load probe file.
pub const LOAD_PREFIX: &str = "poraload-";

/// Size of each payload written by the load loop.
pub const LOAD_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Wall-clock length of a default load run.
pub const LOAD_DURATION: Duration = Duration::from_secs(4);

/// File I/O used by the load loop.
///
/// Implementations can wrap the local filesystem to simulate faulty media
/// in tests.
pub trait ProbeIo: Send + Sync {
    /// Replace the contents of `path` with `data`.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    /// Read the whole of `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Remove the directory entry at `path`.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Production I/O against the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl ProbeIo for LocalFs {
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        probe::write_file(path, data)
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

/// A configured load run.
pub struct LoadTest<I = LocalFs> {
    duration: Duration,
    io: I,
}

impl<I: ProbeIo> LoadTest<I> {
    /// A run of [`LOAD_DURATION`] over the given I/O backend.
    pub fn new(io: I) -> Self {
        Self {
            duration: LOAD_DURATION,
            io,
        }
    }

    /// Override the run length.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Run the write/read/verify loop against `mount`.
    ///
    /// The deadline is checked before each cycle, so a run can overshoot it
    /// by up to one cycle.
    pub fn run(&self, mount: &Path) -> Result<u64> {
        let path = mount.join(format!("{}{}", LOAD_PREFIX, random::name()));
        debug!(path = %path.display(), duration = ?self.duration, "load run starting");

        let start = Instant::now();
        self.io
            .write(&path, PAYLOAD)
            .map_err(Error::io(Phase::WritingLoad))?;

        let mut written = 0u64;
        while start.elapsed() < self.duration {
            let payload = random::letters(LOAD_PAYLOAD_SIZE);
            self.io
                .write(&path, &payload)
                .map_err(Error::io(Phase::WritingLoad))?;
            let read_back = self
                .io
                .read(&path)
                .map_err(Error::io(Phase::ReadingLoad))?;

            if read_back != payload {
                warn!(
                    path = %path.display(),
                    iteration = written,
                    "load read-back mismatch, leaving file in place"
                );
                return Err(Error::DataIntegrity {
                    path,
                    iteration: written,
                });
            }
            written += 1;
        }

        self.io
            .remove(&path)
            .map_err(Error::io(Phase::Deleting))?;
        info!(
            mib = written,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "load run finished"
        );
        Ok(written)
    }
}

/// Run a default four second load test against `mount`.
pub fn run_load(mount: &Path) -> Result<u64> {
    LoadTest::new(LocalFs).run(mount)
}

/// Remove every `poraload-*` entry directly under `mount`.
///
/// Directories are skipped. Symlinks are removed without being followed,
/// including dangling ones.
pub fn cleanup_orphaned_load_files(mount: &Path) -> Result<u64> {
    cleanup_load_files(&LocalFs, mount)
}

/// [`cleanup_orphaned_load_files`] with removals going through `io`.
///
/// Entries are removed in name order and the first failure stops the
/// batch. Entries already removed stay removed.
pub fn cleanup_load_files<I: ProbeIo>(io: &I, mount: &Path) -> Result<u64> {
    let mut names = Vec::new();
    for entry in fs::read_dir(mount).map_err(Error::io(Phase::ListingLoad))? {
        let entry = entry.map_err(Error::io(Phase::ListingLoad))?;
        let is_dir = entry
            .file_type()
            .map_err(Error::io(Phase::ListingLoad))?
            .is_dir();
        let name = entry.file_name();
        if !is_dir && name.to_string_lossy().starts_with(LOAD_PREFIX) {
            names.push(name);
        }
    }
    names.sort();

    let mut removed = 0u64;
    for name in names {
        let path = mount.join(&name);
        if let Err(source) = io.remove(&path) {
            warn!(path = %path.display(), error = %source, "failed to remove load file");
            return Err(Error::Io {
                phase: Phase::RemovingLoad,
                source: io::Error::new(
                    source.kind(),
                    format!("{}: {}", name.to_string_lossy(), source),
                ),
            });
        }
        removed += 1;
    }

    info!(removed, mount = %mount.display(), "load cleanup finished");
    Ok(removed)
}
