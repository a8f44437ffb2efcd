//! One-shot file operations against the mount.
//!
//! None of these hold state between calls. `create`, `read`, `chmod` and
//! `delete` address files by bare name so a caller can spread one file's
//! lifecycle across several requests; cleaning up is then the caller's job.
//!
//! Names are joined onto the mount as given. There is no traversal check.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Phase, Result};
use crate::random;

/// Content of every freshly created probe file.
pub const PAYLOAD: &[u8] = b"Hello Persistent World!\n";

/// Line appended by [`write_probe`] after the initial write.
pub const APPEND_LINE: &[u8] = b"Hello Persistent World again!\n";

/// Name prefix for files created by [`write_probe`].
pub const WRITE_PROBE_PREFIX: &str = "poratest-";

/// Create or truncate `path` and write `data` to it.
pub(crate) fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    options.open(path)?.write_all(data)
}

fn append_file(path: &Path, data: &[u8]) -> io::Result<()> {
    OpenOptions::new().append(true).open(path)?.write_all(data)
}

/// Write, append, read back and remove a uniquely named file.
///
/// Returns what was read back, which on a healthy mount is [`PAYLOAD`]
/// followed by [`APPEND_LINE`].
pub fn write_probe(mount: &Path) -> Result<Vec<u8>> {
    let path = mount.join(format!("{}{}", WRITE_PROBE_PREFIX, random::name()));
    debug!(path = %path.display(), "write probe");

    write_file(&path, PAYLOAD).map_err(Error::io(Phase::Writing))?;
    append_file(&path, APPEND_LINE).map_err(Error::io(Phase::Appending))?;
    let body = fs::read(&path).map_err(Error::io(Phase::Reading))?;
    fs::remove_file(&path).map_err(Error::io(Phase::Deleting))?;

    Ok(body)
}

/// Write [`PAYLOAD`] to a new randomly named file and leave it in place.
///
/// Returns the generated name.
pub fn create(mount: &Path) -> Result<String> {
    let name = random::name();
    let path = mount.join(&name);
    debug!(path = %path.display(), "create");

    write_file(&path, PAYLOAD).map_err(Error::io(Phase::Writing))?;
    Ok(name)
}

/// Read a named file under the mount.
pub fn read(mount: &Path, name: &str) -> Result<Vec<u8>> {
    let path = mount.join(name);
    debug!(path = %path.display(), "read");

    fs::read(&path).map_err(|source| Error::NotFound {
        name: name.to_string(),
        source,
    })
}

/// Parse an octal permission string such as `"0644"` or `"755"`.
pub fn parse_mode(mode: &str) -> Result<u32> {
    let invalid = || Error::InvalidInput {
        message: format!("not an octal mode: {:?}", mode),
    };
    if mode.is_empty() || !mode.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(invalid());
    }
    u32::from_str_radix(mode, 8).map_err(|_| invalid())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, perms)
}

/// Apply an octal mode string to a named file.
///
/// The mode is validated before the file is touched. Returns the parsed mode.
pub fn chmod(mount: &Path, name: &str, mode: &str) -> Result<u32> {
    let bits = parse_mode(mode)?;
    let path = mount.join(name);
    debug!(path = %path.display(), mode, "chmod");

    set_mode(&path, bits).map_err(|source| Error::PermissionDenied {
        name: name.to_string(),
        source,
    })?;
    Ok(bits)
}

/// Remove a named file under the mount.
pub fn delete(mount: &Path, name: &str) -> Result<()> {
    let path = mount.join(name);
    debug!(path = %path.display(), "delete");

    fs::remove_file(&path).map_err(|source| Error::PermissionDenied {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn write_probe_round_trip() {
        let mount = TempDir::new().unwrap();
        let body = write_probe(mount.path()).unwrap();

        let mut expected = PAYLOAD.to_vec();
        expected.extend_from_slice(APPEND_LINE);
        assert_eq!(body, expected);
    }

    #[test]
    fn write_probe_cleans_up() {
        let mount = TempDir::new().unwrap();
        write_probe(mount.path()).unwrap();
        assert!(entries(mount.path()).is_empty());
    }

    #[test]
    fn write_probe_missing_mount() {
        let mount = TempDir::new().unwrap();
        let missing = mount.path().join("nope");
        match write_probe(&missing) {
            Err(Error::Io { phase, .. }) => assert_eq!(phase, Phase::Writing),
            other => panic!("expected write failure, got {:?}", other),
        }
    }

    #[test]
    fn create_leaves_file() {
        let mount = TempDir::new().unwrap();
        let name = create(mount.path()).unwrap();

        assert_eq!(name.len(), 10);
        assert!(name.chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(fs::read(mount.path().join(&name)).unwrap(), PAYLOAD);
    }

    #[cfg(unix)]
    #[test]
    fn create_uses_0644() {
        use std::os::unix::fs::PermissionsExt;

        let mount = TempDir::new().unwrap();
        let name = create(mount.path()).unwrap();
        let mode = fs::metadata(mount.path().join(name))
            .unwrap()
            .permissions()
            .mode();
        // umask may only clear bits
        assert_eq!(mode & !0o644 & 0o777, 0);
    }

    #[test]
    fn read_existing() {
        let mount = TempDir::new().unwrap();
        fs::write(mount.path().join("hello"), b"contents").unwrap();
        assert_eq!(read(mount.path(), "hello").unwrap(), b"contents");
    }

    #[test]
    fn read_missing() {
        let mount = TempDir::new().unwrap();
        match read(mount.path(), "missing") {
            Err(Error::NotFound { name, .. }) => assert_eq!(name, "missing"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn parse_mode_accepts_octal() {
        assert_eq!(parse_mode("644").unwrap(), 0o644);
        assert_eq!(parse_mode("0755").unwrap(), 0o755);
        assert_eq!(parse_mode("0").unwrap(), 0);
    }

    #[test]
    fn parse_mode_rejects_non_octal() {
        for bad in ["", "abc", "789", "+644", "-1", "0x1ff", "6 4"] {
            assert!(
                matches!(parse_mode(bad), Err(Error::InvalidInput { .. })),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[cfg(unix)]
    #[test]
    fn chmod_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let mount = TempDir::new().unwrap();
        let name = create(mount.path()).unwrap();
        assert_eq!(chmod(mount.path(), &name, "0600").unwrap(), 0o600);

        let mode = fs::metadata(mount.path().join(&name))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn chmod_invalid_mode_changes_nothing() {
        use std::os::unix::fs::PermissionsExt;

        let mount = TempDir::new().unwrap();
        let name = create(mount.path()).unwrap();
        let path = mount.path().join(&name);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        assert!(matches!(
            chmod(mount.path(), &name, "rwx"),
            Err(Error::InvalidInput { .. })
        ));
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn chmod_missing_file() {
        let mount = TempDir::new().unwrap();
        assert!(matches!(
            chmod(mount.path(), "missing", "644"),
            Err(Error::PermissionDenied { .. })
        ));
    }

    #[test]
    fn delete_removes_file() {
        let mount = TempDir::new().unwrap();
        let name = create(mount.path()).unwrap();
        delete(mount.path(), &name).unwrap();
        assert!(!mount.path().join(&name).exists());
    }

    #[test]
    fn delete_missing_fails() {
        let mount = TempDir::new().unwrap();
        match delete(mount.path(), "missing") {
            Err(Error::PermissionDenied { source, .. }) => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
