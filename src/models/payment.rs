use super::common::{ensure_not_blank, ensure_unique_ids};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    KakaoPay,
    NaverPay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethods {
    pub card: bool,
    pub bank_transfer: bool,
    pub kakao_pay: bool,
    pub naver_pay: bool,
}

impl PaymentMethods {
    pub fn is_enabled(&self, method: PaymentMethod) -> bool {
        match method {
            PaymentMethod::Card => self.card,
            PaymentMethod::BankTransfer => self.bank_transfer,
            PaymentMethod::KakaoPay => self.kakao_pay,
            PaymentMethod::NaverPay => self.naver_pay,
        }
    }
}

/// 单个项目价格上限（韩元）
pub const MAX_PROGRAM_PRICE: u64 = 100_000_000;

/// 会员项目；价格单位为韩元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub price: u64,
    pub description: String,
    pub duration: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProgramInput {
    pub name: String,
    pub price: u64,
    pub description: String,
    pub duration: String,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettings {
    /// 价格是否已含税
    pub include_tax: bool,
    /// 税率（百分比）
    pub tax_rate: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email_notification: bool,
    pub sms_notification: bool,
    pub admin_email: String,
    pub admin_phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSettings {
    pub enabled: bool,
    pub payment_methods: PaymentMethods,
    pub programs: Vec<Program>,
    pub tax_settings: TaxSettings,
    pub notification_settings: NotificationSettings,
}

impl TaxSettings {
    /// 实际收款金额：价格未含税时按税率加价，四舍五入到元
    pub fn charge_amount(&self, price: u64) -> AppResult<u64> {
        if self.include_tax {
            return Ok(price);
        }
        price
            .checked_mul(100 + u64::from(self.tax_rate))
            .and_then(|scaled| scaled.checked_add(50))
            .map(|scaled| scaled / 100)
            .ok_or_else(|| AppError::ValidationError(format!("Price {price} is out of range")))
    }
}

impl PaymentSettings {
    pub fn validate(&self) -> AppResult<()> {
        ensure_unique_ids(&self.programs, |p| p.id, "program")?;
        self.programs
            .iter()
            .try_for_each(|p| ensure_not_blank(&p.name, "program name"))?;
        if let Some(p) = self.programs.iter().find(|p| p.price > MAX_PROGRAM_PRICE) {
            return Err(AppError::ValidationError(format!(
                "Program price must not exceed {MAX_PROGRAM_PRICE}, got {}",
                p.price
            )));
        }
        if self.tax_settings.tax_rate > 100 {
            return Err(AppError::ValidationError(format!(
                "Tax rate must be between 0 and 100, got {}",
                self.tax_settings.tax_rate
            )));
        }
        Ok(())
    }

    pub fn active_programs(&self) -> impl Iterator<Item = &Program> {
        self.programs.iter().filter(|p| p.active)
    }

    pub fn seed() -> Self {
        let program = |id: i64, name: &str, price: u64, description: &str, duration: &str| Program {
            id,
            name: name.to_string(),
            price,
            description: description.to_string(),
            duration: duration.to_string(),
            active: true,
        };
        Self {
            enabled: true,
            payment_methods: PaymentMethods {
                card: true,
                bank_transfer: true,
                kakao_pay: false,
                naver_pay: false,
            },
            programs: vec![
                program(
                    1,
                    "기본 멤버십",
                    150_000,
                    "기본 운동기구 이용, PCU 시스템 이용, 샤워시설 이용",
                    "1개월",
                ),
                program(
                    2,
                    "프리미엄 멤버십",
                    400_000,
                    "모든 운동기구 이용, AI 분석 시스템, 개인 트레이너 월 2회, 영양 상담",
                    "3개월",
                ),
                program(
                    3,
                    "VIP 멤버십",
                    800_000,
                    "모든 시설 무제한, AI 분석 시스템, 개인 트레이너 주 2회, 영양 상담, 마사지 서비스",
                    "6개월",
                ),
                program(
                    4,
                    "개인 PT 세션",
                    80_000,
                    "1:1 개인 트레이닝, AI 자세 분석, 운동 프로그램 설계",
                    "1회",
                ),
            ],
            tax_settings: TaxSettings {
                include_tax: true,
                tax_rate: 10,
            },
            notification_settings: NotificationSettings {
                email_notification: true,
                sms_notification: true,
                admin_email: "admin@infinitygym.com".to_string(),
                admin_phone: "010-1234-5678".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_amount() {
        let mut tax = TaxSettings {
            include_tax: true,
            tax_rate: 10,
        };
        assert_eq!(tax.charge_amount(150_000).unwrap(), 150_000);

        tax.include_tax = false;
        assert_eq!(tax.charge_amount(150_000).unwrap(), 165_000);
        assert_eq!(tax.charge_amount(15).unwrap(), 17);
    }

    #[test]
    fn test_charge_amount_out_of_range() {
        let tax = TaxSettings {
            include_tax: false,
            tax_rate: 10,
        };
        assert!(matches!(
            tax.charge_amount(u64::MAX / 50),
            Err(AppError::ValidationError(_))
        ));
        assert_eq!(tax.charge_amount(MAX_PROGRAM_PRICE).unwrap(), 110_000_000);
    }

    #[test]
    fn test_validate_price_bound() {
        let mut settings = PaymentSettings::seed();
        settings.programs[0].price = MAX_PROGRAM_PRICE;
        assert!(settings.validate().is_ok());
        settings.programs[0].price = MAX_PROGRAM_PRICE + 1;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(PaymentSettings::seed()).unwrap();
        assert_eq!(json["paymentMethods"]["bankTransfer"], true);
        assert_eq!(json["taxSettings"]["taxRate"], 10);
        assert_eq!(json["programs"][0]["price"], 150_000);
    }

    #[test]
    fn test_validate_tax_rate() {
        let mut settings = PaymentSettings::seed();
        assert!(settings.validate().is_ok());
        settings.tax_settings.tax_rate = 150;
        assert!(settings.validate().is_err());
    }
}
