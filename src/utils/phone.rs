use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static KR_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^01[016789]-\d{3,4}-\d{4}$").expect("valid phone regex"));

/// 验证韩国手机号格式 (010-1234-5678)
pub fn validate_kr_phone(phone: &str) -> AppResult<()> {
    if !KR_MOBILE.is_match(phone) {
        return Err(AppError::ValidationError(format!(
            "Invalid phone number {phone}, expected format 010-1234-5678"
        )));
    }

    Ok(())
}

/// 格式化手机号，补全连字符
pub fn format_kr_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if !digits.starts_with("01") {
        return phone.trim().to_string();
    }
    match digits.len() {
        11 => format!("{}-{}-{}", &digits[..3], &digits[3..7], &digits[7..]),
        10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => phone.trim().to_string(),
    }
}
