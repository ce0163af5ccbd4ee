use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tracing::{debug, info};

use super::store::{TreeStore, load, save, sync_hook};
use super::store_error::{
    CompressSnafu, DecodeSnafu, DecompressSnafu, MalformedSnafu, ReadSnafu, StoreError, WriteSnafu,
};
use crate::ext::BestEffortPathExt;
use crate::tree::{Mutation, Tree};

/// First bytes of every zstd frame
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Keeps the serialized tree in one file, optionally zstd-compressed.
///
/// Loading detects compression from the file itself, so a store can switch
/// between plain and compressed files without migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
    compression: Option<i32>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            compression: None,
        }
    }

    /// Compresses saved files at the given zstd level
    pub fn with_compression(mut self, level: i32) -> Self {
        self.compression = Some(level);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A hook persisting the tree to this store after every mutation.
    pub fn sync_hook(&self) -> impl FnMut(&Mutation, &Tree) + 'static {
        sync_hook(self.clone())
    }

    fn file_path(&self) -> String {
        self.path.best_effort_path_display()
    }
}

impl TreeStore for FileStore {
    fn load(&self) -> Result<Tree, StoreError> {
        debug!("Reading store file: {}", self.file_path());
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No existing store file found, starting with an empty tree");
                return Ok(Tree::new());
            }
            Err(err) => {
                return Err(err).context(ReadSnafu {
                    file_path: self.file_path(),
                });
            }
        };

        let bytes = match bytes.starts_with(&ZSTD_MAGIC) {
            true => zstd::decode_all(bytes.as_slice()).context(DecompressSnafu {
                file_path: self.file_path(),
            })?,
            false => bytes,
        };
        let raw = String::from_utf8(bytes).context(DecodeSnafu {
            file_path: self.file_path(),
        })?;

        let tree = load(&raw).context(MalformedSnafu)?;
        info!("Loaded tree from {} ({} bytes)", self.file_path(), raw.len());
        Ok(tree)
    }

    fn save(&self, tree: &Tree) -> Result<(), StoreError> {
        let raw = save(tree);
        let bytes = match self.compression {
            Some(level) => zstd::encode_all(raw.as_bytes(), level).context(CompressSnafu)?,
            None => raw.into_bytes(),
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context(WriteSnafu {
                file_path: self.file_path(),
            })?;
        }
        fs::write(&self.path, &bytes).context(WriteSnafu {
            file_path: self.file_path(),
        })?;
        info!("Saved tree to {} ({} bytes)", self.file_path(), bytes.len());
        Ok(())
    }
}
