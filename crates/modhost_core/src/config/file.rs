//! Disk operations behind config materialization.

use super::YamlCodec;
use crate::registry::{RegistryError, RegistryResult};
use log::warn;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

pub(crate) fn exists(path: &Path) -> RegistryResult<bool> {
    path.try_exists().map_err(|source| io_error(path, source))
}

/// Creates `path` with `contents` unless it already exists.
///
/// Returns `true` when this call created the file. A failed write removes
/// the partial file so a later attempt starts clean.
pub(crate) fn seed(path: &Path, contents: &[u8]) -> RegistryResult<bool> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => return Err(io_error(path, source)),
    };

    if let Err(source) = file.write_all(contents).and_then(|()| file.sync_all()) {
        drop(file);
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(
                "event=config_seed module=config status=error path={} error_code=cleanup_failed error={}",
                path.display(),
                cleanup
            );
        }
        return Err(io_error(path, source));
    }
    Ok(true)
}

/// Reads and deserializes the whole file.
pub(crate) fn read<T: DeserializeOwned>(path: &Path, codec: &YamlCodec) -> RegistryResult<T> {
    let bytes = fs::read(path).map_err(|source| io_error(path, source))?;
    codec
        .from_slice(&bytes)
        .map_err(|source| RegistryError::ConfigFormat {
            path: path.to_path_buf(),
            source,
        })
}

fn io_error(path: &Path, source: std::io::Error) -> RegistryError {
    RegistryError::ConfigIo {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::{exists, read, seed};
    use crate::config::YamlCodec;
    use crate::registry::RegistryError;
    use std::fs;

    #[test]
    fn seed_creates_parent_directories_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/homes.yaml");

        assert!(!exists(&path).expect("exists check"));
        assert!(seed(&path, b"max: 2\n").expect("first seed"));
        assert!(!seed(&path, b"max: 9\n").expect("second seed"));
        assert_eq!(fs::read(&path).expect("read back"), b"max: 2\n");
    }

    #[test]
    fn read_maps_missing_file_to_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read::<u32>(&dir.path().join("absent.yaml"), &YamlCodec::new())
            .expect_err("missing file must fail");
        assert!(matches!(err, RegistryError::ConfigIo { .. }));
    }

    #[test]
    fn read_maps_bad_content_to_format_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "- not\n- a number\n").expect("write");
        let err = read::<u32>(&path, &YamlCodec::new()).expect_err("bad content must fail");
        assert!(matches!(err, RegistryError::ConfigFormat { .. }));
    }
}
