use crate::config::PaymentConfig;
use crate::error::{AppError, AppResult};
use crate::models::{PaymentMethod, PaymentSettings};
use crate::store::SettingsStore;
use crate::utils::IdGenerator;
use actix_web::web;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
}

/// 交给支付组件的 `requestPayment` 参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub client_key: String,
    pub method: PaymentMethod,
    pub amount: u64,
    pub order_id: String,
    pub order_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub success_url: String,
    pub fail_url: String,
}

/// 支付成功后回跳地址上的参数
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccess {
    pub order_id: String,
    pub payment_key: String,
    pub amount: u64,
}

/// 支付失败回跳参数；缺失的字段使用默认值
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFailure {
    pub code: String,
    pub message: String,
    pub order_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailureQuery {
    code: Option<String>,
    message: Option<String>,
    order_id: Option<String>,
}

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<SettingsStore>,
    config: PaymentConfig,
    ids: IdGenerator,
}

impl PaymentService {
    pub fn new(store: Arc<SettingsStore>, config: PaymentConfig) -> Self {
        Self {
            store,
            config,
            ids: IdGenerator::new(),
        }
    }

    pub fn checkout(
        &self,
        program_id: i64,
        method: PaymentMethod,
        customer: CustomerInfo,
    ) -> AppResult<CheckoutRequest> {
        let settings: PaymentSettings = self.store.load();
        if !settings.enabled {
            return Err(AppError::ValidationError("Online payment is disabled".to_string()));
        }

        let program = settings
            .active_programs()
            .find(|p| p.id == program_id)
            .ok_or_else(|| AppError::NotFound(format!("Program {program_id} not available")))?;

        if !settings.payment_methods.is_enabled(method) {
            return Err(AppError::ValidationError(format!(
                "Payment method {method:?} is not enabled"
            )));
        }

        let amount = settings.tax_settings.charge_amount(program.price)?;
        let origin = self.config.site_origin.trim_end_matches('/');
        let request = CheckoutRequest {
            client_key: self.config.client_key.clone(),
            method,
            amount,
            order_id: format!("{}_{}", self.config.order_prefix, self.ids.next_id()),
            order_name: program.name.clone(),
            customer_name: customer.name,
            customer_email: customer.email,
            success_url: format!("{origin}/payment/success"),
            fail_url: format!("{origin}/payment/fail"),
        };

        log::info!(
            "Checkout prepared: order={} program={} amount={}",
            request.order_id,
            program_id,
            request.amount
        );
        Ok(request)
    }
}

pub fn parse_success_redirect(query: &str) -> AppResult<PaymentSuccess> {
    web::Query::<PaymentSuccess>::from_query(query)
        .map(web::Query::into_inner)
        .map_err(|e| AppError::ValidationError(format!("Invalid payment success parameters: {e}")))
}

pub fn parse_failure_redirect(query: &str) -> PaymentFailure {
    let parsed = web::Query::<FailureQuery>::from_query(query)
        .map(web::Query::into_inner)
        .unwrap_or(FailureQuery {
            code: None,
            message: None,
            order_id: None,
        });

    PaymentFailure {
        code: parsed.code.unwrap_or_else(|| "UNKNOWN_ERROR".to_string()),
        message: parsed
            .message
            .unwrap_or_else(|| "An unknown error occurred".to_string()),
        order_id: parsed.order_id.unwrap_or_default(),
    }
}

/// 常见失败代码的说明
pub fn describe_failure_code(code: &str) -> &'static str {
    match code {
        "PAY_PROCESS_CANCELED" => "The customer cancelled the payment",
        "PAY_PROCESS_ABORTED" => "The payment was aborted",
        "REJECT_CARD_COMPANY" => "The card company rejected the payment",
        "INSUFFICIENT_BALANCE" => "Insufficient balance",
        "INVALID_CARD_NUMBER" => "Invalid card number",
        _ => "Payment failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryMirror;
    use crate::store::testing::MemoryRemote;

    async fn service_with(settings: PaymentSettings) -> PaymentService {
        let store = Arc::new(SettingsStore::new(MemoryRemote::new(), Arc::new(MemoryMirror::new())));
        store.save(&settings).unwrap().await;
        PaymentService::new(store, PaymentConfig::default())
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "김민수".to_string(),
            email: "kim@email.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_checkout_builds_request() {
        let mut settings = PaymentSettings::seed();
        settings.tax_settings.include_tax = false;
        settings.tax_settings.tax_rate = 10;
        let program = settings.programs[0].clone();
        let service = service_with(settings).await;

        let request = service.checkout(program.id, PaymentMethod::Card, customer()).unwrap();
        assert_eq!(request.amount, program.price * 110 / 100);
        assert!(request.order_id.starts_with("infinitygym_"));
        assert_eq!(request.order_name, program.name);
        assert_eq!(request.success_url, "http://localhost:3000/payment/success");
        assert_eq!(request.fail_url, "http://localhost:3000/payment/fail");
    }

    #[tokio::test]
    async fn test_checkout_rejections() {
        let mut settings = PaymentSettings::seed();
        settings.programs[1].active = false;
        let inactive = settings.programs[1].id;
        let active = settings.programs[0].id;
        let service = service_with(settings.clone()).await;

        assert!(matches!(
            service.checkout(inactive, PaymentMethod::Card, customer()),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.checkout(active, PaymentMethod::KakaoPay, customer()),
            Err(AppError::ValidationError(_))
        ));

        settings.enabled = false;
        let service = service_with(settings).await;
        assert!(matches!(
            service.checkout(active, PaymentMethod::Card, customer()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_checkout_rejects_unvalidated_huge_price() {
        let mut settings = PaymentSettings::seed();
        settings.tax_settings.include_tax = false;
        settings.programs[0].price = u64::MAX / 50;
        let program_id = settings.programs[0].id;

        // 绕过校验直接写入，模拟远端带来的数据
        let store = Arc::new(SettingsStore::new(MemoryRemote::new(), Arc::new(MemoryMirror::new())));
        store
            .set("paymentSettings", serde_json::to_value(&settings).unwrap())
            .await;
        let service = PaymentService::new(store, PaymentConfig::default());

        assert!(matches!(
            service.checkout(program_id, PaymentMethod::Card, customer()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_parse_redirects() {
        let success =
            parse_success_redirect("orderId=infinitygym_1700000000000&paymentKey=pk_123&amount=150000")
                .unwrap();
        assert_eq!(success.order_id, "infinitygym_1700000000000");
        assert_eq!(success.amount, 150_000);
        assert!(parse_success_redirect("orderId=x&amount=1").is_err());

        let failure = parse_failure_redirect("code=PAY_PROCESS_CANCELED&orderId=infinitygym_1");
        assert_eq!(failure.code, "PAY_PROCESS_CANCELED");
        assert_eq!(failure.message, "An unknown error occurred");
        assert_eq!(describe_failure_code(&failure.code), "The customer cancelled the payment");

        let empty = parse_failure_redirect("");
        assert_eq!(empty.code, "UNKNOWN_ERROR");
        assert_eq!(empty.order_id, "");
    }
}
