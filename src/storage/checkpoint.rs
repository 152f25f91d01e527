use crate::document::Document;
use crate::storage::{DocumentStore, StorageError, StorageResult};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Document store backed by a single pretty-printed JSON array file
///
/// Saves go to a sibling `.tmp` file which is then renamed over the
/// checkpoint, so readers only ever see a complete snapshot.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the snapshot is written to before being renamed into place
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_snapshot(&self, temp_path: &Path, documents: &[Document]) -> StorageResult<()> {
        let file = File::create(temp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, documents).map_err(StorageError::Encode)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}

impl DocumentStore for JsonCheckpointStore {
    fn load(&self) -> StorageResult<Option<Vec<Document>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let documents = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                StorageError::Io(source.into())
            } else {
                StorageError::Decode {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        Ok(Some(documents))
    }

    fn save(&self, documents: &[Document]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        let result = self
            .write_snapshot(&temp_path, documents)
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(StorageError::from));

        if result.is_err() && temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        result
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
