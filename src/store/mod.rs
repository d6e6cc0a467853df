//! Settings store: the single source of truth for named JSON documents.
//!
//! Reads are served synchronously from an in-memory cache. Writes update the
//! cache immediately, then (when the returned future is awaited) push the full
//! snapshot to the remote store, mirror the entry locally, broadcast a
//! cross-tab signal and notify in-document listeners exactly once.
//!
//! Remote failures never escape: the store degrades to the local mirror and
//! reports the outcome through [`Persisted`].

pub mod bus;
pub mod cross_tab;
pub mod document;
pub mod mirror;
pub mod remote;

pub use bus::{Change, EventBus, Subscription};
pub use cross_tab::{CrossTabChannel, StorageSignal, TabId};
pub use document::SettingsDocument;
pub use mirror::{FileMirror, LocalMirror, MemoryMirror};
pub use remote::{HttpSettingsRemote, RemoteSettings};

use crate::config::SettingsConfig;
use crate::error::{AppError, AppResult};
use crate::models::{SettingsEntry, Snapshot};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 一次写入最终落到了哪里
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// 远端保存成功（本地镜像同时备份）
    Remote,
    /// 远端不可用，仅保存在本地镜像
    LocalOnly,
    /// 远端与本地镜像都失败，仅存在于内存
    Failed,
}

pub struct SettingsStore {
    tab_id: TabId,
    cache: RwLock<BTreeMap<String, SettingsEntry>>,
    remote: Arc<dyn RemoteSettings>,
    mirror: Arc<dyn LocalMirror>,
    bus: EventBus,
    cross_tab: Option<CrossTabChannel>,
    // 远端/镜像写入串行化，每次发送写入时刻的最新快照
    write_gate: tokio::sync::Mutex<()>,
}

impl SettingsStore {
    pub fn new(remote: Arc<dyn RemoteSettings>, mirror: Arc<dyn LocalMirror>) -> Self {
        Self {
            tab_id: TabId::new(),
            cache: RwLock::new(BTreeMap::new()),
            remote,
            mirror,
            bus: EventBus::new(),
            cross_tab: None,
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// 按配置连接 HTTP 远端与文件镜像
    pub fn from_config(config: &SettingsConfig) -> AppResult<Self> {
        let remote = HttpSettingsRemote::new(&config.remote_base_url)?;
        let mirror = FileMirror::open(&config.mirror_path)?;
        log::info!(
            "Settings store using remote {} and mirror {}",
            remote.endpoint(),
            mirror.path().display()
        );
        Ok(Self::new(Arc::new(remote), Arc::new(mirror)))
    }

    pub fn with_cross_tab(mut self, channel: CrossTabChannel) -> Self {
        self.cross_tab = Some(channel);
        self
    }

    pub fn tab_id(&self) -> TabId {
        self.tab_id
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, BTreeMap<String, SettingsEntry>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, BTreeMap<String, SettingsEntry>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// 读取缓存；不存在时返回 `default`
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.read_cache()
            .get(key)
            .map(|entry| entry.value.clone())
            .unwrap_or(default)
    }

    pub fn entry(&self, key: &str) -> Option<SettingsEntry> {
        self.read_cache().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read_cache().contains_key(key)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read_cache()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// 写入一个值并返回持久化结果。
    ///
    /// 缓存在本函数返回前就已更新，随后的 `get` 立即可见；远端与镜像写入发生在
    /// 等待返回的 future 时。`Value::Null` 表示删除该 key。
    pub fn persist<'a>(&'a self, key: &str, value: Value) -> impl Future<Output = Persisted> + use<'a> {
        let key = key.to_string();
        {
            let mut cache = self.write_cache();
            if value.is_null() {
                cache.remove(&key);
            } else {
                cache.insert(key.clone(), SettingsEntry::new(key.clone(), value));
            }
        }
        async move { self.flush(key).await }
    }

    /// 与 [`persist`](Self::persist) 相同，但丢弃持久化结果
    pub fn set<'a>(&'a self, key: &str, value: Value) -> impl Future<Output = ()> + use<'a> {
        let write = self.persist(key, value);
        async move {
            write.await;
        }
    }

    async fn flush(&self, key: String) -> Persisted {
        let (outcome, serialized) = {
            let _gate = self.write_gate.lock().await;

            let snapshot = self.snapshot();
            let mut outcome = match self.remote.save(&snapshot).await {
                Ok(()) => Persisted::Remote,
                Err(e) => {
                    log::warn!("Remote settings save failed, keeping '{key}' locally: {e}");
                    Persisted::LocalOnly
                }
            };

            // 镜像写入当前缓存中的值，而不是调用时的值
            let serialized = match self.entry(&key).map(|entry| serde_json::to_string(&entry)) {
                Some(Ok(raw)) => Some(raw),
                Some(Err(e)) => {
                    log::error!("Failed to serialize settings entry '{key}': {e}");
                    None
                }
                None => None,
            };
            let mirrored = match &serialized {
                Some(raw) => self.mirror.set_item(&key, raw),
                None => self.mirror.remove_item(&key),
            };
            if let Err(e) = mirrored {
                log::error!("Failed to write '{key}' to local mirror: {e}");
                if outcome == Persisted::LocalOnly {
                    outcome = Persisted::Failed;
                }
            }
            (outcome, serialized)
        };

        if let Some(channel) = &self.cross_tab {
            channel.publish(StorageSignal {
                origin: self.tab_id,
                key: key.clone(),
                new_value: serialized,
            });
        }
        self.bus.notify(Change::Key(&key), &self.snapshot());
        outcome
    }

    /// 从远端整体加载；失败时从本地镜像加载
    pub async fn load_from_server(&self) {
        let loaded: BTreeMap<String, SettingsEntry> = match self.remote.load().await {
            Ok(snapshot) => {
                log::info!("Loaded {} settings from remote", snapshot.len());
                snapshot
                    .into_iter()
                    .filter(|(_, value)| !value.is_null())
                    .map(|(key, value)| (key.clone(), SettingsEntry::new(key, value)))
                    .collect()
            }
            Err(e) => {
                log::warn!("Failed to load remote settings, falling back to local mirror: {e}");
                self.read_mirror()
            }
        };

        *self.write_cache() = loaded;
        self.bus.notify(Change::All, &self.snapshot());
    }

    fn read_mirror(&self) -> BTreeMap<String, SettingsEntry> {
        let keys = match self.mirror.keys() {
            Ok(keys) => keys,
            Err(e) => {
                log::warn!("Failed to list local mirror keys: {e}");
                return BTreeMap::new();
            }
        };

        keys.into_iter()
            .filter_map(|key| {
                let raw = match self.mirror.get_item(&key) {
                    Ok(raw) => raw?,
                    Err(e) => {
                        log::warn!("Failed to read '{key}' from local mirror: {e}");
                        return None;
                    }
                };
                match parse_entry(&key, &raw) {
                    Ok(entry) => Some((key, entry)),
                    Err(e) => {
                        log::warn!("{e}");
                        None
                    }
                }
            })
            .collect()
    }

    pub fn subscribe(&self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) -> Subscription {
        self.bus.subscribe(listener)
    }

    /// 只关心某一个 key 的变化
    pub fn on_change(
        &self,
        key: impl Into<String>,
        callback: impl Fn(Option<&Value>) + Send + Sync + 'static,
    ) -> Subscription {
        self.bus.on_change(key, callback)
    }

    /// 处理其他标签页发出的变更信号；自己发出的信号被忽略。
    ///
    /// 只更新缓存并通知本文档的监听器，不会回写远端或镜像。
    pub fn apply_signal(&self, signal: &StorageSignal) -> bool {
        if signal.origin == self.tab_id {
            return false;
        }

        match &signal.new_value {
            None => {
                self.write_cache().remove(&signal.key);
            }
            Some(raw) => match parse_entry(&signal.key, raw) {
                Ok(entry) => {
                    self.write_cache().insert(signal.key.clone(), entry);
                }
                Err(e) => {
                    log::warn!("Ignoring cross-tab signal from {}: {e}", signal.origin);
                    return false;
                }
            },
        }

        self.bus.notify(Change::Key(&signal.key), &self.snapshot());
        true
    }
}

/// 解析镜像中的值。既接受 `SettingsEntry`，也接受直接存放的 JSON 文档（旧格式）；
/// 无法解析的内容视为不存在。
fn parse_entry(key: &str, raw: &str) -> AppResult<SettingsEntry> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::MalformedStoredValue(format!("'{key}': {e}")))?;

    let is_entry = value
        .as_object()
        .is_some_and(|o| o.len() == 3 && o.contains_key("key") && o.contains_key("timestamp") && o.contains_key("value"));
    if is_entry {
        let entry: SettingsEntry = serde_json::from_value(value)
            .map_err(|e| AppError::MalformedStoredValue(format!("'{key}': {e}")))?;
        if entry.key != key {
            return Err(AppError::MalformedStoredValue(format!(
                "entry stored under '{key}' belongs to '{}'",
                entry.key
            )));
        }
        return Ok(entry);
    }

    if value.is_null() {
        return Err(AppError::MalformedStoredValue(format!("'{key}' is null")));
    }
    Ok(SettingsEntry {
        key: key.to_string(),
        timestamp: 0,
        value,
    })
}
