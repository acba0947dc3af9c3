// src/source.rs

use crate::error::{Error, Result};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};

/// Supplies the raw bytes of a source file, addressed by canonical name.
pub trait RawFileProvider {
    fn open(&self, canonical_name: &str) -> Result<Box<dyn Read>>;
}

/// Lowercase a published file name: `BILLS.CSV` and `Bills.csv` both become
/// `bills.csv`. The portal is inconsistent about case, so everything
/// downstream only ever sees this form.
pub fn canonical_name(published: &str) -> String {
    published.trim().to_lowercase()
}

/// Reads canonical files from a local directory, as left behind by `fetch`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RawFileProvider for DirectoryProvider {
    fn open(&self, canonical_name: &str) -> Result<Box<dyn Read>> {
        let path = self.dir.join(canonical_name);
        let file = File::open(&path).map_err(|e| Error::io(canonical_name, e))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Fixture provider for tests: canonical name → file contents.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub(crate) struct MemoryProvider {
    files: std::collections::BTreeMap<String, Vec<u8>>,
}

#[cfg(test)]
impl MemoryProvider {
    pub(crate) fn with(mut self, name: &str, content: &str) -> Self {
        self.files.insert(name.to_string(), content.as_bytes().to_vec());
        self
    }
}

#[cfg(test)]
impl RawFileProvider for MemoryProvider {
    fn open(&self, canonical_name: &str) -> Result<Box<dyn Read>> {
        match self.files.get(canonical_name) {
            Some(bytes) => Ok(Box::new(std::io::Cursor::new(bytes.clone()))),
            None => Err(Error::io(
                canonical_name,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            )),
        }
    }
}
