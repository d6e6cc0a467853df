pub mod admin_service;
pub mod payment_service;
pub mod settings_service;
pub mod upload_service;

pub use admin_service::*;
pub use payment_service::*;
pub use settings_service::*;
pub use upload_service::*;
