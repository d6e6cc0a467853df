use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    /// `/api/settings` 背后的 JSON 文件；未配置时仅保存在内存
    #[serde(default)]
    pub document_path: Option<PathBuf>,
    pub remote_base_url: String,
    pub mirror_path: PathBuf,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            document_path: None,
            remote_base_url: "http://127.0.0.1:8080".to_string(),
            mirror_path: PathBuf::from("local-mirror.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// 返回 data: URI（无磁盘部署）
    #[default]
    Base64,
    /// 写入磁盘并返回相对路径
    Disk,
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base64" => Ok(UploadMode::Base64),
            "disk" => Ok(UploadMode::Disk),
            other => Err(format!("unknown upload mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_file_size_mb: u64,
    #[serde(default)]
    pub mode: UploadMode,
    pub upload_dir: PathBuf,
    pub public_prefix: String,
}

impl UploadConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 50,
            mode: UploadMode::Base64,
            upload_dir: PathBuf::from("public/uploads"),
            public_prefix: "/uploads".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    #[serde(default)]
    pub client_key: String,
    pub site_origin: String,
    pub order_prefix: String,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            client_key: String::new(),
            site_origin: "http://localhost:3000".to_string(),
            order_prefix: "infinitygym".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 没有配置文件时完全依赖环境变量与默认值
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No config file at {config_path}, using environment and defaults");
                Config::default()
            }
            Err(e) => {
                return Err(format!("Cannot read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_overrides(|name| env::var(name).ok());

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}").into())
    }

    fn apply_overrides(&mut self, get_env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = get_env("SERVER_HOST") {
            self.server.host = v;
        }
        if let Some(v) = get_env("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Some(v) = get_env("SETTINGS_DOCUMENT_PATH") {
            self.settings.document_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get_env("SETTINGS_REMOTE_BASE_URL") {
            self.settings.remote_base_url = v;
        }
        if let Some(v) = get_env("SETTINGS_MIRROR_PATH") {
            self.settings.mirror_path = PathBuf::from(v);
        }
        if let Some(v) = get_env("UPLOAD_MAX_FILE_SIZE_MB")
            && let Ok(n) = v.parse()
        {
            self.upload.max_file_size_mb = n;
        }
        if let Some(v) = get_env("UPLOAD_MODE") {
            match v.parse() {
                Ok(mode) => self.upload.mode = mode,
                Err(e) => log::warn!("Ignoring UPLOAD_MODE: {e}"),
            }
        }
        if let Some(v) = get_env("UPLOAD_DIR") {
            self.upload.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = get_env("UPLOAD_PUBLIC_PREFIX") {
            self.upload.public_prefix = v;
        }
        if let Some(v) = get_env("PAYMENT_CLIENT_KEY") {
            self.payment.client_key = v;
        }
        if let Some(v) = get_env("PAYMENT_SITE_ORIGIN") {
            self.payment.site_origin = v;
        }
        if let Some(v) = get_env("PAYMENT_ORDER_PREFIX") {
            self.payment.order_prefix = v;
        }
    }
}
