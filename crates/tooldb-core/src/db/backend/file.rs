use crate::{
    db::{
        backend::{BackendError, StorageBackend},
        store::StoreSnapshot,
    },
    serialize::{deserialize_snapshot, serialize},
};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

///
/// FileBackend
///
/// One CBOR snapshot file. Writes go to a sibling `.tmp` file that is then
/// renamed over the target, so a crash mid-write leaves the previous
/// snapshot intact.
///

#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> BackendError {
        BackendError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&mut self) -> Result<Option<StoreSnapshot>, BackendError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot file, starting empty");
                return Ok(None);
            }
            Err(err) => return Err(Self::io_error(&self.path, err)),
        };

        let snapshot = deserialize_snapshot::<StoreSnapshot>(&bytes)
            .map_err(|err| BackendError::Decode(err.to_string()))?;
        tracing::debug!(
            path = %self.path.display(),
            rows = snapshot.rows.len(),
            "snapshot loaded"
        );

        Ok(Some(snapshot))
    }

    fn persist(&mut self, snapshot: &StoreSnapshot) -> Result<(), BackendError> {
        let bytes = serialize(snapshot).map_err(|err| BackendError::Encode(err.to_string()))?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| Self::io_error(parent, err))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, &bytes).map_err(|err| Self::io_error(&temp, err))?;
        fs::rename(&temp, &self.path).map_err(|err| Self::io_error(&self.path, err))?;

        Ok(())
    }
}
