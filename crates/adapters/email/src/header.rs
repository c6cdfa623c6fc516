//! 优先级邮件头

use crate::types::MessagePriority;
use lettre::message::header::{Header, HeaderName, HeaderValue};
use std::error::Error as StdError;

/// RFC 2156 `Priority` 头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority(pub MessagePriority);

impl Header for Priority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let priority = match s.trim().to_ascii_lowercase().as_str() {
            "non-urgent" => MessagePriority::Low,
            "normal" => MessagePriority::Normal,
            "urgent" => MessagePriority::High,
            other => return Err(format!("unknown priority '{}'", other).into()),
        };
        Ok(Self(priority))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.header_value().to_string())
    }
}

/// 常见客户端识别的 `X-Priority` 头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XPriority(pub MessagePriority);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let level = s
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| format!("invalid X-Priority '{}'", s))?;
        let priority = match level {
            1 | 2 => MessagePriority::High,
            4 | 5 => MessagePriority::Low,
            _ => MessagePriority::Normal,
        };
        Ok(Self(priority))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.x_priority_value().to_string())
    }
}
