//! Background tasks for the settings store.
//!
//! - banner rotation timer (one repeating timer per mounted carousel)
//! - cross-tab listener that feeds storage signals from other tabs into a store
//!
//! Both return handles; dropping a `RotationHandle` stops its timer.

use crate::carousel::Carousel;
use crate::store::{CrossTabChannel, SettingsStore};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// 轮播定时器句柄，drop 时停止定时器
pub struct RotationHandle {
    task: JoinHandle<()>,
}

impl Drop for RotationHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 每隔 `period` 前进一张。第一次触发在一个周期之后，错过的触发顺延而不是叠加。
pub fn spawn_rotation(carousel: Arc<Mutex<Carousel>>, period: Duration) -> RotationHandle {
    let start = Instant::now() + period;
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            // 以触发时刻的索引为准
            let index = carousel
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .advance();
            log::trace!("Banner rotated to slide {index}");
        }
    });
    RotationHandle { task }
}

/// 把其他标签页的存储信号转发到 `store`
pub fn spawn_cross_tab_listener(store: Arc<SettingsStore>, channel: &CrossTabChannel) -> JoinHandle<()> {
    // 先订阅再 spawn，避免丢失 spawn 之前发出的信号
    let mut rx = channel.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(signal) => {
                    if store.apply_signal(&signal) {
                        log::debug!("Applied cross-tab change for '{}' from {}", signal.key, signal.origin);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Cross-tab listener lagged, {skipped} signals skipped");
                }
                Err(RecvError::Closed) => {
                    log::debug!("Cross-tab channel closed, listener stopped");
                    break;
                }
            }
        }
    })
}
