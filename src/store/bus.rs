use crate::models::Snapshot;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError, Weak};

pub type SnapshotListener = Arc<dyn Fn(&Snapshot) + Send + Sync>;
pub type KeyListener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

#[derive(Clone)]
enum Listener {
    Snapshot(SnapshotListener),
    Key { key: String, callback: KeyListener },
}

/// 本次通知涉及的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<'a> {
    Key(&'a str),
    /// 整体加载
    All,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// 同一文档内唯一的通知通道
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&Snapshot) + Send + Sync + 'static) -> Subscription {
        self.register(Listener::Snapshot(Arc::new(listener)))
    }

    pub fn on_change(
        &self,
        key: impl Into<String>,
        callback: impl Fn(Option<&Value>) + Send + Sync + 'static,
    ) -> Subscription {
        self.register(Listener::Key {
            key: key.into(),
            callback: Arc::new(callback),
        })
    }

    fn register(&self, listener: Listener) -> Subscription {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.listeners.push((id, listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn notify(&self, change: Change<'_>, snapshot: &Snapshot) {
        // 先复制出监听器再调用，回调内可以再次访问 store
        let listeners: Vec<Listener> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.iter().map(|(_, l)| l.clone()).collect()
        };

        for listener in listeners {
            match listener {
                Listener::Snapshot(callback) => callback(snapshot),
                Listener::Key { key, callback } => {
                    let relevant = match change {
                        Change::All => true,
                        Change::Key(changed) => changed == key,
                    };
                    if relevant {
                        callback(snapshot.get(&key));
                    }
                }
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.listeners.len()
    }
}

/// `subscribe` / `on_change` 的返回值。重复取消订阅是无操作。
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot_with(key: &str, value: Value) -> Snapshot {
        Snapshot::from([(key.to_string(), value)])
    }

    #[test]
    fn test_key_listener_filters_other_keys() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let _sub = bus.on_change("bannerSettings", move |value| {
            assert!(value.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let snapshot = snapshot_with("bannerSettings", json!({ "interval": 5000 }));
        bus.notify(Change::Key("members"), &snapshot);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        bus.notify(Change::Key("bannerSettings"), &snapshot);
        bus.notify(Change::All, &snapshot);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_twice_is_noop() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        let _other = bus.subscribe(|_| {});
        assert_eq!(bus.listener_count(), 2);

        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_listener_may_subscribe_during_notify() {
        let bus = EventBus::new();
        let inner_bus = bus.clone();
        let _sub = bus.subscribe(move |_| {
            let _ = inner_bus.subscribe(|_| {});
        });
        bus.notify(Change::All, &Snapshot::new());
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped() {
        let bus = EventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        sub.unsubscribe();
    }
}
