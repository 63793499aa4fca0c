use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use url::Url;

use crate::errors::OutputError;


pub(crate) const MANIFEST_FILE_NAME: &str = "QUERIES.md";
const MANIFEST_HEADER: &str = "# Auto-generated list of queries\n\n";


/// The Markdown list of the queries issued during the current run.
pub(crate) struct Manifest {
    path: PathBuf,
}
impl Manifest {
    /// Replaces any manifest left over from an earlier run with one that only contains the header.
    pub fn recreate(path: PathBuf) -> Result<Self, OutputError> {
        match fs::remove_file(&path) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => return Err(OutputError::RemovingManifest(path, e)),
        }

        if let Err(e) = fs::write(&path, MANIFEST_HEADER) {
            return Err(OutputError::CreatingManifest(path, e));
        }

        Ok(Self {
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, name: &str, link: &Url) -> Result<(), OutputError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| OutputError::AppendingManifest(self.path.clone(), e))?;
        writeln!(file, "* [{}]({})", name, link)
            .map_err(|e| OutputError::AppendingManifest(self.path.clone(), e))
    }
}
