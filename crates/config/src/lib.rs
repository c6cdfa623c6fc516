//! courier-config - SMTP 配置加载

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Missing required SMTP setting: {0}")]
    Missing(&'static str),
}

/// 加密连接模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecureSocketMode {
    /// 明文连接
    #[serde(alias = "None")]
    None,
    /// 连接建立即 TLS（通常 465 端口）
    #[serde(alias = "SslOnConnect")]
    SslOnConnect,
    /// 必须 STARTTLS，服务器不支持则失败
    #[default]
    #[serde(alias = "StartTls")]
    StartTls,
    /// 服务器支持时 STARTTLS，否则保持明文
    #[serde(alias = "StartTlsWhenAvailable")]
    StartTlsWhenAvailable,
    /// 按端口决定
    #[serde(alias = "Auto")]
    Auto,
}

impl SecureSocketMode {
    /// 未配置端口时使用的默认端口
    pub fn default_port(&self) -> u16 {
        match self {
            Self::None => 25,
            Self::SslOnConnect => 465,
            Self::StartTls | Self::StartTlsWhenAvailable | Self::Auto => 587,
        }
    }

    /// 将 Auto 解析为具体模式
    pub fn resolve(self, port: u16) -> Self {
        match self {
            Self::Auto if port == 465 => Self::SslOnConnect,
            Self::Auto => Self::StartTlsWhenAvailable,
            other => other,
        }
    }
}

/// SMTP 配置
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    #[serde(default)]
    pub host: String,
    /// 缺省或 0 时按加密模式选择端口
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub username: String,
    /// 认证使用的登录名，缺省时使用 username
    #[serde(default)]
    pub usermail: Option<String>,
    #[serde(default = "empty_secret")]
    pub password: Secret<String>,
    /// false 时强制明文连接
    #[serde(default = "default_true")]
    pub use_ssl: bool,
    #[serde(default)]
    pub secure_socket_mode: SecureSocketMode,
    /// 设为 false 将接受任意服务器证书
    #[serde(default = "default_true")]
    pub validate_server_certificate: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_hello_name")]
    pub hello_name: String,
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_hello_name() -> String {
    "localhost".to_string()
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: None,
            username: String::new(),
            usermail: None,
            password: empty_secret(),
            use_ssl: true,
            secure_socket_mode: SecureSocketMode::default(),
            validate_server_certificate: true,
            timeout_secs: default_timeout_secs(),
            hello_name: default_hello_name(),
        }
    }
}

impl SmtpConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: Secret::new(password.into()),
            ..Self::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_secure_socket_mode(mut self, mode: SecureSocketMode) -> Self {
        self.secure_socket_mode = mode;
        self
    }

    /// 检查发送前必须存在的配置项，只含空白视为缺失
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Missing("host"));
        }
        if self.username.trim().is_empty() {
            return Err(ConfigError::Missing("username"));
        }
        if self.password.expose_secret().trim().is_empty() {
            return Err(ConfigError::Missing("password"));
        }
        Ok(())
    }

    fn requested_mode(&self) -> SecureSocketMode {
        if self.use_ssl {
            self.secure_socket_mode
        } else {
            SecureSocketMode::None
        }
    }

    /// 实际连接端口
    pub fn effective_port(&self) -> u16 {
        self.port
            .filter(|port| *port != 0)
            .unwrap_or_else(|| self.requested_mode().default_port())
    }

    /// 实际使用的加密模式（Auto 已解析）
    pub fn effective_mode(&self) -> SecureSocketMode {
        self.requested_mode().resolve(self.effective_port())
    }

    /// 认证登录名
    pub fn login(&self) -> &str {
        self.usermail
            .as_deref()
            .filter(|login| !login.is_empty())
            .unwrap_or(self.username.as_str())
    }

    /// 交给传输层的 I/O 超时，0 表示使用传输层默认值
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_env() -> String {
    "development".to_string()
}

impl MailerConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 依次合并 `default.toml`、`{APP_ENV}.toml`、`SMTP_*` 与 `TELEMETRY_*` 环境变量
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| default_app_env());

        let figment = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("SMTP_").map(|key| format!("smtp.{}", key).into()))
            .merge(Env::prefixed("TELEMETRY_").map(|key| format!("telemetry.{}", key).into()));

        let mut config = Self::from_figment(figment)?;
        config.app_env = env;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests;
