use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

/// 基于毫秒时间戳的单调 ID 生成器。
///
/// 同一毫秒内的连续调用会顺延到 `last + 1`，因此同一进程内生成的 ID 严格递增、不会重复。
/// 种子数据使用 1..n 的小整数，与时间戳 ID 不会冲突。
#[derive(Clone, Default)]
pub struct IdGenerator {
    last: Arc<AtomicI64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }

    /// 生成一个不在 `taken` 中的 ID
    pub fn next_unused(&self, taken: impl Fn(i64) -> bool) -> i64 {
        loop {
            let id = self.next_id();
            if !taken(id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_strictly_increase() {
        let generator = IdGenerator::new();
        let mut prev = generator.next_id();
        for _ in 0..10_000 {
            let id = generator.next_id();
            assert!(id > prev);
            prev = id;
        }
    }

    #[test]
    fn test_ids_unique_across_threads() {
        let generator = IdGenerator::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let g = generator.clone();
                std::thread::spawn(move || (0..1000).map(|_| g.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 4000);
    }

    #[test]
    fn test_next_unused_skips_taken() {
        let generator = IdGenerator::new();
        let first = generator.next_id();
        let id = generator.next_unused(|id| id == first + 1);
        assert_ne!(id, first + 1);
        assert!(id > first);
    }
}
