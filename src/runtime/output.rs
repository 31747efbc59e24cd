use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::utils::{LmiError, LmiResult};

/// The directory all output files are written to
///
/// Names are plain file names; an existing file is never opened for writing.
#[derive(Debug, Clone)]
pub struct ResponseStore {
    dir: PathBuf,
}

impl ResponseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve `name` inside the store, rejecting anything but a single normal component
    pub fn path_for(&self, name: &str) -> LmiResult<PathBuf> {
        let trimmed = name.trim();
        let mut components = Path::new(trimmed).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) if file == trimmed => Ok(self.dir.join(trimmed)),
            _ => Err(LmiError::InvalidOutputName(name.to_string())),
        }
    }

    pub fn exists(&self, name: &str) -> LmiResult<bool> {
        Ok(self.path_for(name)?.exists())
    }

    /// Create `name` for writing, creating the directory first if needed
    pub fn create(&self, name: &str) -> LmiResult<(PathBuf, File)> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => LmiError::OutputExists(path.clone()),
                _ => LmiError::IoError(e),
            })?;

        tracing::debug!("Created output file {}", path.display());
        Ok((path, file))
    }

    pub fn read(&self, name: &str) -> LmiResult<String> {
        Ok(fs::read_to_string(self.path_for(name)?)?)
    }
}
