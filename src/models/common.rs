use crate::error::{AppError, AppResult};
use std::collections::HashSet;

/// 列表中的记录 ID 必须唯一
pub fn ensure_unique_ids<T>(items: &[T], id: impl Fn(&T) -> i64, label: &str) -> AppResult<()> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        let item_id = id(item);
        if !seen.insert(item_id) {
            return Err(AppError::ValidationError(format!(
                "Duplicate {label} id: {item_id}"
            )));
        }
    }
    Ok(())
}

pub fn ensure_not_blank(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::ValidationError(format!("{field} must not be empty")));
    }
    Ok(())
}

/// 今天的日期 (YYYY-MM-DD, UTC)
pub fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}
