// bon-client/src/storage.rs
// 本地键值存储 - 支持 JSON 文件存储与内存存储

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Well-known storage keys
pub mod keys {
    /// Cart lines (JSON array)
    pub const CART: &str = "cart";
    /// Locally remembered order ids, most recent first (JSON array)
    pub const MY_ORDERS: &str = "myOrders";
    /// Order id awaiting gateway confirmation (plain string)
    pub const PENDING_PAYMOB_ORDER: &str = "pendingPaymobOrder";
    pub const CASHIER_INSTITUTION: &str = "cashier_instId";
    pub const QUEUE_INSTITUTION: &str = "queueSettings_instId";
    pub const ADMIN_ORDERS_INSTITUTION: &str = "adminOrders_instId";
    pub const KITCHEN_INSTITUTION: &str = "kitchen_instId";
    pub const ADMIN_AUTH: &str = "adminAuth";
    pub const OWNER_AUTH: &str = "ownerAuth";
    pub const LANGUAGE: &str = "app-language";
}

/// Storage error type
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted value for key '{key}': {source}")]
    Corrupted {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Browser-style string key/value store
///
/// Values are opaque strings; structured values go through
/// [`LocalStoreExt::get_json`] / [`LocalStoreExt::set_json`].
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Shared handle used by all stores of a session
pub type SharedStore = Arc<dyn LocalStore>;

/// JSON helpers over any [`LocalStore`]
pub trait LocalStoreExt {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>>;
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()>;
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| StorageError::Corrupted {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set(key, &raw)
    }
}

fn check_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// 文件存储 - 每个键一个文件
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// 创建文件存储（目录在首次写入时创建）
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 获取路径
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.value")))
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // 先写临时文件再重命名，避免写一半
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 内存存储 - 测试与无盘场景
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning a [`SharedStore`]
    pub fn shared() -> SharedStore {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        check_key(key)?;
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        check_key(key)?;
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}
