//! # pora-volume
//!
//! Probes for validating a persistent volume mount.
//!
//! The mount directory is discovered from the platform's service-binding
//! blob, then exercised with one-shot file operations or a timed load run.
//!
//! ## Operations
//!
//! | Function | Effect |
//! |---|---|
//! | [`write_probe`] | write, append, read back and delete a scratch file |
//! | [`create`] | write a randomly named file and keep it |
//! | [`read`] | read a named file |
//! | [`chmod`] | apply an octal mode to a named file |
//! | [`delete`] | remove a named file |
//! | [`run_load`] | four seconds of 1 MiB write/read/verify cycles |
//! | [`cleanup_orphaned_load_files`] | remove files left by failed load runs |
//!
//! ## Example
//!
//! ```rust,ignore
//! use pora_volume::{resolve_mount_path, run_load};
//!
//! let mount = resolve_mount_path(&std::env::var("VCAP_SERVICES")?)?;
//! let mib = run_load(&mount)?;
//! println!("{} MiB written", mib);
//! ```

pub mod error;
pub mod load;
pub mod mount;
pub mod probe;
pub mod random;

pub use error::{Error, Phase, Result};
pub use load::{
    cleanup_load_files, cleanup_orphaned_load_files, run_load, LoadTest, LocalFs, ProbeIo,
};
pub use mount::{resolve_mount_path, JsonResolver, MountResolver, PatternResolver};
pub use probe::{chmod, create, delete, read, write_probe};
