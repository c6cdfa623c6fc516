//! Email 适配器
//!
//! 提供 SMTP 邮件发送功能，支持：
//! - HTML 正文与可选的正文容器模板
//! - base64 附件，按扩展名推断类型
//! - 多种加密连接模式，每次发送独立连接
//! - 按阶段区分的错误（连接、认证、发送、断开）

mod client;
mod header;
mod message;
mod template;
mod transport;
mod types;

pub use client::{MailRequest, SmtpMailer};
pub use header::{Priority, XPriority};
pub use message::build_message;
pub use template::{BodyRenderer, EmailTemplate, PassThrough};
pub use transport::{
    LettreClientFactory, LettreSmtpClient, SmtpClient, SmtpClientFactory, SmtpEndpoint,
};
pub use types::{
    Attachment, DecodedAttachment, EmailParty, MessagePriority, RecipientList, decode_attachments,
};

pub use courier_config::{SecureSocketMode, SmtpConfig};
pub use courier_errors::{BoxError, MailError, MailResult, MailStage};
pub use tokio_util::sync::CancellationToken;

/// 邮件发送接口
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// 发送给单个收件人
    async fn send_to(
        &self,
        from: &EmailParty,
        to: &EmailParty,
        subject: &str,
        html_body: &str,
        attachments: &[Attachment],
        priority: MessagePriority,
    ) -> MailResult<()> {
        let recipients = RecipientList::from(to.clone());
        self.send(from, &recipients, subject, html_body, attachments, priority)
            .await
    }

    /// 发送给收件人列表
    async fn send(
        &self,
        from: &EmailParty,
        to: &RecipientList,
        subject: &str,
        html_body: &str,
        attachments: &[Attachment],
        priority: MessagePriority,
    ) -> MailResult<()>;
}
