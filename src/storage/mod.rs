use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;
use thiserror::Error;
use tracing::info;

/// Which storage root a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tier {
    Raw,
    Processed,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error on {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The two storage roots. Both exist once `open` has returned.
#[derive(Debug, Clone)]
pub struct Storage {
    raw: PathBuf,
    processed: PathBuf,
}

impl Storage {
    /// Create (if needed) both roots.
    pub fn open(raw: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let storage = Storage {
            raw: raw.into(),
            processed: processed.into(),
        };
        for root in [&storage.raw, &storage.processed] {
            fs::create_dir_all(root).map_err(|source| StorageError::Io {
                path: root.clone(),
                source,
            })?;
        }
        Ok(storage)
    }

    pub fn root(&self, tier: Tier) -> &Path {
        match tier {
            Tier::Raw => &self.raw,
            Tier::Processed => &self.processed,
        }
    }

    pub fn path_for(&self, name: &str, tier: Tier) -> PathBuf {
        self.root(tier).join(name)
    }

    /// Write `data` as JSON to `name` under the `tier` root, replacing any
    /// existing file. `pretty` indents with four spaces; otherwise the output
    /// has no whitespace at all.
    pub fn persist<T: Serialize + ?Sized>(
        &self,
        data: &T,
        name: &str,
        tier: Tier,
        pretty: bool,
    ) -> Result<PathBuf, StorageError> {
        let path = self.path_for(name, tier);
        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = File::create(&path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        let written = if pretty {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            data.serialize(&mut ser)
        } else {
            serde_json::to_writer(&mut writer, data)
        };
        written.map_err(|source| StorageError::Json {
            path: path.clone(),
            source,
        })?;
        writer.flush().map_err(io_err)?;

        info!("Data saved to {}", path.display());
        Ok(path)
    }

    /// Read back a file written by [`Storage::persist`].
    pub fn load<T: DeserializeOwned>(&self, name: &str, tier: Tier) -> Result<T, StorageError> {
        let path = self.path_for(name, tier);
        let file = File::open(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|source| StorageError::Json { path, source })
    }
}
