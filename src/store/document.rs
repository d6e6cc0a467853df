use super::{Persisted, SettingsStore};
use crate::error::AppResult;
use crate::models::{
    BannerSettings, BaseStats, Member, PaymentSettings, Portfolio, Reservation, Review,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;

/// 存放在固定 key 下的强类型文档
pub trait SettingsDocument: Serialize + DeserializeOwned {
    const KEY: &'static str;

    /// 不存在或无法解析时使用的默认值
    fn fallback() -> Self;

    fn validate(&self) -> AppResult<()> {
        Ok(())
    }
}

impl SettingsStore {
    pub fn load<T: SettingsDocument>(&self) -> T {
        let Some(entry) = self.entry(T::KEY) else {
            log::debug!("'{}' not set, using defaults", T::KEY);
            return T::fallback();
        };
        match serde_json::from_value(entry.value) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("Stored '{}' has an unexpected shape, using defaults: {e}", T::KEY);
                T::fallback()
            }
        }
    }

    /// 校验后写入。校验失败时缓存保持不变。
    pub fn save<'a, T: SettingsDocument>(
        &'a self,
        doc: &T,
    ) -> AppResult<impl Future<Output = Persisted> + use<'a, T>> {
        doc.validate()?;
        let value = serde_json::to_value(doc)?;
        Ok(self.persist(T::KEY, value))
    }
}

impl SettingsDocument for Vec<Reservation> {
    const KEY: &'static str = "reservations";

    fn fallback() -> Self {
        Reservation::seed()
    }

    fn validate(&self) -> AppResult<()> {
        Reservation::validate_list(self)
    }
}

impl SettingsDocument for Vec<Member> {
    const KEY: &'static str = "members";

    fn fallback() -> Self {
        Member::seed()
    }

    fn validate(&self) -> AppResult<()> {
        Member::validate_list(self)
    }
}

impl SettingsDocument for Vec<Review> {
    const KEY: &'static str = "reviews";

    fn fallback() -> Self {
        Review::seed()
    }

    fn validate(&self) -> AppResult<()> {
        Review::validate_list(self)
    }
}

impl SettingsDocument for Vec<Portfolio> {
    const KEY: &'static str = "portfolios";

    fn fallback() -> Self {
        Portfolio::seed()
    }

    fn validate(&self) -> AppResult<()> {
        Portfolio::validate_list(self)
    }
}

impl SettingsDocument for BannerSettings {
    const KEY: &'static str = "bannerSettings";

    fn fallback() -> Self {
        BannerSettings::seed()
    }

    fn validate(&self) -> AppResult<()> {
        BannerSettings::validate(self)
    }
}

impl SettingsDocument for PaymentSettings {
    const KEY: &'static str = "paymentSettings";

    fn fallback() -> Self {
        PaymentSettings::seed()
    }

    fn validate(&self) -> AppResult<()> {
        PaymentSettings::validate(self)
    }
}

impl SettingsDocument for BaseStats {
    const KEY: &'static str = "baseStats";

    fn fallback() -> Self {
        BaseStats::default()
    }
}
