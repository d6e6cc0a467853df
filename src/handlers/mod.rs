pub mod settings;
pub mod upload;

pub use settings::settings_config;
pub use upload::upload_config;
