//! courier-errors - 邮件发送错误分类
//!
//! 每个错误都标明失败阶段，并保留底层原因，可转换为 RFC 7807 Problem Details

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 底层错误（传输库、解码器等）
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 发送流程阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailStage {
    Configure,
    Compose,
    Connect,
    Authenticate,
    Transmit,
    Disconnect,
}

impl MailStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Compose => "compose",
            Self::Connect => "connect",
            Self::Authenticate => "authenticate",
            Self::Transmit => "transmit",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for MailStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 邮件发送错误
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        /// 出错的附件文件名
        attachment: Option<String>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Transmission error: {message}")]
    Transmission {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Operation cancelled during {stage}")]
    Cancelled { stage: MailStage },

    #[error("Disconnection error: {message}")]
    Disconnection {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl MailError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
            source: None,
        }
    }

    pub fn configuration_with(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Configuration {
            message: msg.into(),
            source: Some(source.into()),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            attachment: None,
            source: None,
        }
    }

    pub fn validation_with(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Validation {
            message: msg.into(),
            attachment: None,
            source: Some(source.into()),
        }
    }

    /// 附件内容无法解码
    pub fn invalid_attachment(file_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let file_name = file_name.into();
        Self::Validation {
            message: format!("Attachment '{}' is not valid base64", file_name),
            attachment: Some(file_name),
            source: Some(source.into()),
        }
    }

    pub fn connection(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn authentication(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Authentication {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn transmission(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transmission {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn cancelled(stage: MailStage) -> Self {
        Self::Cancelled { stage }
    }

    pub fn disconnection(msg: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Disconnection {
            message: msg.into(),
            source: source.into(),
        }
    }

    /// 按传输阶段包装底层错误，消息固定以便调用方区分阶段
    pub fn at_stage(stage: MailStage, source: impl Into<BoxError>) -> Self {
        match stage {
            MailStage::Configure => {
                Self::configuration_with("Invalid SMTP configuration", source)
            }
            MailStage::Compose => Self::validation_with("Failed to compose message", source),
            MailStage::Connect => Self::connection("Failed to connect to SMTP server", source),
            MailStage::Authenticate => {
                Self::authentication("Failed to authenticate with SMTP server", source)
            }
            MailStage::Transmit => Self::transmission("Failed to send message", source),
            MailStage::Disconnect => {
                Self::disconnection("Failed to disconnect from SMTP server", source)
            }
        }
    }

    /// 错误发生的阶段
    pub fn stage(&self) -> MailStage {
        match self {
            Self::Configuration { .. } => MailStage::Configure,
            Self::Validation { .. } => MailStage::Compose,
            Self::Connection { .. } => MailStage::Connect,
            Self::Authentication { .. } => MailStage::Authenticate,
            Self::Transmission { .. } => MailStage::Transmit,
            Self::Cancelled { stage } => *stage,
            Self::Disconnection { .. } => MailStage::Disconnect,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// 转换为 HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Configuration { .. } => 500,
            Self::Validation { .. } => 400,
            Self::Connection { .. } => 503,
            Self::Authentication { .. } => 502,
            Self::Transmission { .. } => 502,
            Self::Cancelled { .. } => 499,
            Self::Disconnection { .. } => 502,
        }
    }

    /// 转换为 Problem Details
    pub fn to_problem_details(&self) -> ProblemDetails {
        ProblemDetails {
            r#type: format!("urn:courier:problems:{}", self.problem_slug()),
            title: self.problem_title().to_string(),
            status: self.status_code(),
            detail: self.to_string(),
            instance: None,
        }
    }

    fn problem_slug(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Validation { .. } => "validation",
            Self::Connection { .. } => "connection",
            Self::Authentication { .. } => "authentication",
            Self::Transmission { .. } => "transmission",
            Self::Cancelled { .. } => "cancelled",
            Self::Disconnection { .. } => "disconnection",
        }
    }

    fn problem_title(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "Configuration Error",
            Self::Validation { .. } => "Validation Error",
            Self::Connection { .. } => "Connection Error",
            Self::Authentication { .. } => "Authentication Error",
            Self::Transmission { .. } => "Transmission Error",
            Self::Cancelled { .. } => "Operation Cancelled",
            Self::Disconnection { .. } => "Disconnection Error",
        }
    }
}

/// RFC 7807 Problem Details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDetails {
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

/// Result 类型别名
pub type MailResult<T> = Result<T, MailError>;
