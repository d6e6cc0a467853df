use crate::models::BannerSettings;
use crate::store::{SettingsDocument, SettingsStore, Subscription};
use crate::tasks::{RotationHandle, spawn_rotation};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// 轮播状态：当前索引、张数、间隔
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Carousel {
    current: usize,
    len: usize,
    interval: Duration,
}

impl Carousel {
    pub fn new(settings: &BannerSettings) -> Self {
        Self {
            current: 0,
            len: settings.items.len(),
            interval: Duration::from_millis(settings.interval),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 定时器触发：前进一张，末尾回到第一张
    pub fn advance(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + 1) % self.len;
        }
        self.current
    }

    pub fn next(&mut self) -> usize {
        self.advance()
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.current = (self.current + self.len - 1) % self.len;
        }
        self.current
    }

    /// 跳转到指定张；越界时忽略
    pub fn jump(&mut self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        self.current = index;
        true
    }

    /// 设置变化后重置张数与间隔，当前索引截断到新的范围内
    pub fn reset(&mut self, settings: &BannerSettings) {
        self.len = settings.items.len();
        self.interval = Duration::from_millis(settings.interval);
        self.current = self.current.min(self.len.saturating_sub(1));
    }

    /// 只有一张或没有时不需要定时器
    pub fn needs_timer(&self) -> bool {
        self.len > 1 && !self.interval.is_zero()
    }
}

type RotationSlot = Arc<Mutex<Option<RotationHandle>>>;

/// 挂载在 store 上的首页横幅轮播。
///
/// `bannerSettings` 变化时先停止旧定时器再按新间隔启动；drop 时停止定时器并取消订阅。
pub struct BannerCarousel {
    state: Arc<Mutex<Carousel>>,
    rotation: RotationSlot,
    subscription: Subscription,
}

fn restart(state: &Arc<Mutex<Carousel>>, rotation: &RotationSlot) {
    let mut slot = rotation.lock().unwrap_or_else(PoisonError::into_inner);
    // 先停止旧定时器
    slot.take();

    let (needs_timer, interval) = {
        let carousel = state.lock().unwrap_or_else(PoisonError::into_inner);
        (carousel.needs_timer(), carousel.interval())
    };
    if !needs_timer {
        return;
    }
    if tokio::runtime::Handle::try_current().is_err() {
        log::warn!("No async runtime available, banner rotation not started");
        return;
    }
    *slot = Some(spawn_rotation(state.clone(), interval));
}

impl BannerCarousel {
    pub fn mount(store: &SettingsStore) -> Self {
        let settings: BannerSettings = store.load();
        let state = Arc::new(Mutex::new(Carousel::new(&settings)));
        let rotation: RotationSlot = Arc::default();
        restart(&state, &rotation);

        let subscription = {
            let state = state.clone();
            let rotation = rotation.clone();
            store.on_change(BannerSettings::KEY, move |value| {
                let settings = value
                    .and_then(|v| match serde_json::from_value::<BannerSettings>(v.clone()) {
                        Ok(settings) => Some(settings),
                        Err(e) => {
                            log::warn!("Ignoring malformed banner settings: {e}");
                            None
                        }
                    })
                    .unwrap_or_else(BannerSettings::fallback);
                state
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .reset(&settings);
                restart(&state, &rotation);
            })
        };

        Self {
            state,
            rotation,
            subscription,
        }
    }

    pub fn current(&self) -> usize {
        self.lock().current()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn next(&self) -> usize {
        self.lock().next()
    }

    pub fn prev(&self) -> usize {
        self.lock().prev()
    }

    pub fn jump(&self, index: usize) -> bool {
        self.lock().jump(index)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Carousel> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for BannerCarousel {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
        self.rotation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
