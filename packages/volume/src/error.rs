//! Error types for volume probes.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The step of a probe that was running when an I/O call failed.
///
/// The display form is what gets reported back to the caller, so it reads
/// like a progress label rather than an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Writing,
    Appending,
    Reading,
    Deleting,
    WritingLoad,
    ReadingLoad,
    ListingLoad,
    RemovingLoad,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Writing => "Writing",
            Phase::Appending => "Appending",
            Phase::Reading => "Reading",
            Phase::Deleting => "Deleting",
            Phase::WritingLoad => "Writing Load",
            Phase::ReadingLoad => "Reading Load",
            Phase::ListingLoad => "Listing Load",
            Phase::RemovingLoad => "Removing Load",
        };
        f.write_str(label)
    }
}

/// Errors that can occur while probing a volume.
#[derive(Debug, Error)]
pub enum Error {
    /// The service-binding blob did not name a mount directory.
    #[error("failed to find container_dir in environment json")]
    MountNotFound,

    /// An I/O call failed during the named phase.
    #[error("{phase} \n{source}")]
    Io {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    /// A named file could not be read.
    #[error("Reading \n{name}: {source}")]
    NotFound {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Caller-supplied input could not be interpreted.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A named file could not be changed or removed.
    #[error("{name}: {source}")]
    PermissionDenied {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A load payload read back differently from how it was written.
    #[error("Data Mismatch \nread-back differs from written payload in {} (iteration {iteration})", .path.display())]
    DataIntegrity { path: PathBuf, iteration: u64 },
}

impl Error {
    pub(crate) fn io(phase: Phase) -> impl FnOnce(std::io::Error) -> Self {
        move |source| Error::Io { phase, source }
    }
}

/// Result type alias for volume operations.
pub type Result<T> = std::result::Result<T, Error>;
