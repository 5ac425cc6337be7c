use std::{
    fs::Metadata,
    io,
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::ser::PrettyFormatter;
use tokio::fs;
use tracing::{debug, info};

use super::locks::LockTable;
use crate::errors::ServiceError;

/// Default base directory used by [`Driver::connect`].
pub const DEFAULT_DIR: &str = "./";

const RECORD_EXT: &str = ".json";
const TMP_EXT: &str = ".tmp";

/// Replace spaces in a resource name with underscores.
pub fn normalize_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// Filesystem-backed document store.
///
/// Layout: `<dir>/<collection>/<resource>.json`. Writes and deletes within a
/// collection are serialized through a per-collection lock; reads take no
/// lock and rely on writes landing via an atomic rename.
#[derive(Debug)]
pub struct Driver {
    dir: PathBuf,
    locks: LockTable,
}

impl Driver {
    /// Open the store rooted at `dir`, creating the directory if needed.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, ServiceError> {
        let dir = clean(dir.as_ref());
        let driver = Self { dir: dir.clone(), locks: LockTable::new() };

        if stat(&dir).await.is_some() {
            debug!(dir = %dir.display(), "using existing database directory");
            return Ok(driver);
        }

        debug!(dir = %dir.display(), "creating database directory");
        fs::create_dir_all(&dir).await.map_err(|e| ServiceError::io(&dir, e))?;
        Ok(driver)
    }

    /// Open the store in the current working directory.
    pub async fn connect() -> Result<Self, ServiceError> {
        Self::open(DEFAULT_DIR).await
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn locks(&self) -> &LockTable {
        &self.locks
    }

    /// Serialize `value` into `<collection>/<resource>.json`, replacing any previous record.
    pub async fn write<T>(&self, collection: &str, resource: &str, value: &T) -> Result<(), ServiceError>
    where
        T: Serialize + ?Sized,
    {
        if collection.is_empty() {
            return Err(ServiceError::Validation("missing collection name - no place to save data".into()));
        }
        if resource.is_empty() {
            return Err(ServiceError::Validation("missing resource name - unable to save record".into()));
        }
        let resource = normalize_name(resource);

        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock().await;

        let dir = self.dir.join(collection);
        let final_path = dir.join(format!("{resource}{RECORD_EXT}"));
        let tmp_path = with_suffix(&final_path, TMP_EXT);

        fs::create_dir_all(&dir).await.map_err(|e| ServiceError::Io { path: dir.clone(), source: e })?;

        let bytes = encode(value)?;
        fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| ServiceError::Io { path: tmp_path.clone(), source: e })?;
        fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| ServiceError::Io { path: final_path.clone(), source: e })?;

        debug!(collection, resource = %resource, bytes = bytes.len(), "record written");
        Ok(())
    }

    /// Read and decode `<collection>/<resource>.json`.
    ///
    /// Existence is checked against both the literal resource path and the
    /// `.json`-suffixed path; the content is always read from the suffixed path.
    pub async fn read<T>(&self, collection: &str, resource: &str) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
    {
        if collection.is_empty() {
            return Err(ServiceError::Validation("missing collection name - unable to read the data".into()));
        }
        if resource.is_empty() {
            return Err(ServiceError::Validation("missing resource name - unable to read record".into()));
        }
        let resource = normalize_name(resource);

        let record = self.dir.join(collection).join(&resource);
        if stat(&record).await.is_none() {
            return Err(ServiceError::not_found(&format!("{collection}/{resource}")));
        }

        let path = with_suffix(&record, RECORD_EXT);
        let bytes = fs::read(&path).await.map_err(|e| ServiceError::io(&path, e))?;
        serde_json::from_slice(&bytes).map_err(ServiceError::Decode)
    }

    /// Return the raw JSON text of every record in `collection`, in directory listing order.
    pub async fn read_all(&self, collection: &str) -> Result<Vec<String>, ServiceError> {
        if collection.is_empty() {
            return Err(ServiceError::Validation("missing collection name - unable to read data".into()));
        }

        let dir = self.dir.join(collection);
        if stat(&dir).await.is_none() {
            return Err(ServiceError::not_found(collection));
        }

        let mut entries = fs::read_dir(&dir).await.map_err(|e| ServiceError::io(&dir, e))?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| ServiceError::io(&dir, e))? {
            let path = entry.path();
            // 跳过写入中断残留的临时文件
            if path.to_string_lossy().ends_with(TMP_EXT) {
                continue;
            }
            let text = fs::read_to_string(&path).await.map_err(|e| ServiceError::io(&path, e))?;
            records.push(text);
        }
        Ok(records)
    }

    /// Delete one resource, or the whole collection when `resource` is empty.
    pub async fn delete(&self, collection: &str, resource: &str) -> Result<(), ServiceError> {
        if collection.is_empty() {
            return Err(ServiceError::Validation("missing collection name - unable to delete record".into()));
        }
        let resource = normalize_name(resource);

        let lock = self.locks.get_or_create(collection);
        let _guard = lock.lock().await;

        let target = if resource.is_empty() {
            self.dir.join(collection)
        } else {
            self.dir.join(collection).join(&resource)
        };

        let Some((found, meta)) = stat(&target).await else {
            let name = if resource.is_empty() { collection.to_owned() } else { format!("{collection}/{resource}") };
            return Err(ServiceError::not_found(&name));
        };

        if meta.is_dir() {
            fs::remove_dir_all(&found).await.map_err(|e| ServiceError::io(&found, e))?;
            info!(collection, resource = %resource, "directory removed");
            return Ok(());
        }

        let record = with_suffix(&target, RECORD_EXT);
        match fs::remove_file(&record).await {
            Ok(()) => {}
            // The literal name matched (e.g. the caller already passed `.json`).
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::remove_file(&found).await.map_err(|e| ServiceError::io(&found, e))?;
            }
            Err(e) => return Err(ServiceError::io(&record, e)),
        }
        info!(collection, resource = %resource, "record removed");
        Ok(())
    }
}

/// Look up `path`, falling back to `path.json`. Returns the path that matched.
async fn stat(path: &Path) -> Option<(PathBuf, Metadata)> {
    if let Ok(meta) = fs::metadata(path).await {
        return Some((path.to_path_buf(), meta));
    }
    let with_ext = with_suffix(path, RECORD_EXT);
    fs::metadata(&with_ext).await.ok().map(|meta| (with_ext, meta))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Drop `.` segments and redundant separators. `..` segments are kept as-is,
/// not resolved against their parent.
fn clean(dir: &Path) -> PathBuf {
    let cleaned: PathBuf = dir.components().collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

/// Tab-indented JSON with a trailing newline.
fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut ser).map_err(ServiceError::Encode)?;
    buf.push(b'\n');
    Ok(buf)
}
