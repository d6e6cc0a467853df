use tokio::sync::broadcast;
use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 64;

/// 一个 store 实例（对应一个浏览器标签页）的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(Uuid);

impl TabId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TabId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// 跨标签页的存储变更信号；`new_value` 为序列化后的 `SettingsEntry`，删除时为 `None`
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSignal {
    pub origin: TabId,
    pub key: String,
    pub new_value: Option<String>,
}

/// 跨标签页广播通道。发送方自身不会处理自己发出的信号。
#[derive(Clone)]
pub struct CrossTabChannel {
    tx: broadcast::Sender<StorageSignal>,
}

impl CrossTabChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn publish(&self, signal: StorageSignal) {
        // 没有其他标签页在监听时发送失败，忽略即可
        if self.tx.send(signal).is_err() {
            log::debug!("No cross-tab receivers for storage signal");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageSignal> {
        self.tx.subscribe()
    }
}

impl Default for CrossTabChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
