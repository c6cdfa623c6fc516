//! 发送请求的数据模型

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use courier_errors::{MailError, MailResult};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::Address;
use serde::{Deserialize, Serialize};

/// 显示名 + 邮箱地址
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailParty {
    name: String,
    email: String,
}

impl EmailParty {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// 转换为 MIME 邮箱，空显示名只输出地址
    pub(crate) fn to_mailbox(&self) -> MailResult<Mailbox> {
        let address: Address = self.email.trim().parse().map_err(|e| {
            MailError::validation_with(format!("Invalid email address '{}'", self.email), e)
        })?;
        let name = Some(self.name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);
        Ok(Mailbox::new(name, address))
    }
}

/// 有序收件人列表，顺序即 To 头的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientList(Vec<EmailParty>);

impl RecipientList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, party: EmailParty) {
        self.0.push(party);
    }

    pub fn with(mut self, party: EmailParty) -> Self {
        self.push(party);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmailParty> {
        self.0.iter()
    }
}

impl From<EmailParty> for RecipientList {
    fn from(party: EmailParty) -> Self {
        Self(vec![party])
    }
}

impl From<Vec<EmailParty>> for RecipientList {
    fn from(parties: Vec<EmailParty>) -> Self {
        Self(parties)
    }
}

impl FromIterator<EmailParty> for RecipientList {
    fn from_iter<I: IntoIterator<Item = EmailParty>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecipientList {
    type Item = &'a EmailParty;
    type IntoIter = std::slice::Iter<'a, EmailParty>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// base64 编码的附件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub base64_content: String,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, base64_content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            base64_content: base64_content.into(),
        }
    }

    /// 由原始字节构造
    pub fn from_bytes(file_name: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(file_name, STANDARD.encode(bytes))
    }

    /// 解码内容并按扩展名推断类型
    pub fn decode(&self) -> MailResult<DecodedAttachment> {
        // 折行的 base64 在解码前去掉空白
        let compact: String = self
            .base64_content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();

        let bytes = STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| MailError::invalid_attachment(&self.file_name, e))?;

        let mime = mime_guess::from_path(&self.file_name).first_or_octet_stream();
        let content_type = ContentType::parse(mime.essence_str())
            .or_else(|_| ContentType::parse("application/octet-stream"))
            .map_err(|e| {
                MailError::validation_with(
                    format!("Unsupported content type for '{}'", self.file_name),
                    e,
                )
            })?;

        Ok(DecodedAttachment {
            file_name: self.file_name.clone(),
            content_type,
            bytes,
        })
    }
}

/// 已解码的附件
#[derive(Debug, Clone)]
pub struct DecodedAttachment {
    pub file_name: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

/// 按顺序解码，遇到第一个无效附件立即失败
pub fn decode_attachments(attachments: &[Attachment]) -> MailResult<Vec<DecodedAttachment>> {
    attachments.iter().map(Attachment::decode).collect()
}

/// 邮件优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
}

impl MessagePriority {
    /// RFC 2156 Priority 头的取值
    pub fn header_value(&self) -> &'static str {
        match self {
            Self::Low => "non-urgent",
            Self::Normal => "normal",
            Self::High => "urgent",
        }
    }

    /// X-Priority 头的取值
    pub fn x_priority_value(&self) -> &'static str {
        match self {
            Self::Low => "5 (Lowest)",
            Self::Normal => "3 (Normal)",
            Self::High => "1 (Highest)",
        }
    }
}
