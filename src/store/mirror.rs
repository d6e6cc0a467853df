//! Same-origin fallback storage for the settings store.
//!
//! Mirrors behave like browser local storage: flat string keys mapped to
//! string values. The store writes one serialized [`SettingsEntry`] per key.
//!
//! [`SettingsEntry`]: crate::models::SettingsEntry

use crate::error::{AppError, AppResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError, Weak};

pub trait LocalMirror: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove_item(&self, key: &str) -> AppResult<()>;
    fn keys(&self) -> AppResult<Vec<String>>;
}

/// 进程内镜像，主要用于测试与无磁盘环境
#[derive(Default)]
pub struct MemoryMirror {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalMirror for MemoryMirror {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        let items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(items.keys().cloned().collect())
    }
}

type Items = BTreeMap<String, String>;

// 同一进程内指向同一文件的镜像共享一把锁
static FILE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn file_lock(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = FILE_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| lock.strong_count() > 0);
    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }
    let lock = Arc::new(Mutex::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// 单个 JSON 文件作为镜像。
///
/// 每次读写都重新读取文件，写入时在最新内容上合并再整体重写（临时文件 + rename），
/// 因此多个打开同一路径的镜像（多个标签页）不会互相覆盖对方的 key。
pub struct FileMirror {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileMirror {
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let mirror = Self {
            lock: file_lock(&path),
            path,
        };
        // 打开时确认文件可读
        mirror.read_items()?;
        Ok(mirror)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_items(&self) -> AppResult<Items> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
                // 文件损坏视为空镜像
                log::warn!("Ignoring malformed local mirror {}: {e}", self.path.display());
                Items::new()
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Items::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_items(&self, items: &Items) -> AppResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path).map_err(|e| {
            AppError::InternalError(format!(
                "Failed to replace local mirror {}: {e}",
                self.path.display()
            ))
        })
    }
}

impl LocalMirror for FileMirror {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let _guard = self.guard();
        Ok(self.read_items()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.guard();
        let mut items = self.read_items()?;
        items.insert(key.to_string(), value.to_string());
        self.write_items(&items)
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        let _guard = self.guard();
        let mut items = self.read_items()?;
        if items.remove(key).is_some() {
            self.write_items(&items)?;
        }
        Ok(())
    }

    fn keys(&self) -> AppResult<Vec<String>> {
        let _guard = self.guard();
        Ok(self.read_items()?.into_keys().collect())
    }
}
