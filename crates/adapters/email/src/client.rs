//! 邮件发送实现

use crate::message::build_message;
use crate::template::{BodyRenderer, PassThrough};
use crate::transport::{LettreClientFactory, SmtpClient, SmtpClientFactory, SmtpEndpoint};
use crate::types::{Attachment, EmailParty, MessagePriority, RecipientList, decode_attachments};
use crate::EmailSender;
use courier_config::SmtpConfig;
use courier_errors::{BoxError, MailError, MailResult, MailStage};
use lettre::Message;
use secrecy::ExposeSecret;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// 一次发送的全部参数
#[derive(Debug, Clone, Copy)]
pub struct MailRequest<'a> {
    pub from: &'a EmailParty,
    pub to: &'a RecipientList,
    pub subject: &'a str,
    pub html_body: &'a str,
    pub attachments: &'a [Attachment],
    pub priority: MessagePriority,
}

impl<'a> MailRequest<'a> {
    pub fn new(
        from: &'a EmailParty,
        to: &'a RecipientList,
        subject: &'a str,
        html_body: &'a str,
    ) -> Self {
        Self {
            from,
            to,
            subject,
            html_body,
            attachments: &[],
            priority: MessagePriority::Normal,
        }
    }

    pub fn attachments(mut self, attachments: &'a [Attachment]) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }
}

/// SMTP 邮件发送器
///
/// 每次发送独立建立并释放连接，配置只读
pub struct SmtpMailer {
    config: SmtpConfig,
    factory: Arc<dyn SmtpClientFactory>,
    renderer: Arc<dyn BodyRenderer>,
}

impl SmtpMailer {
    /// 使用 lettre 传输创建发送器
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            factory: Arc::new(LettreClientFactory),
            renderer: Arc::new(PassThrough),
        }
    }

    /// 替换 SMTP 客户端工厂
    pub fn with_factory(mut self, factory: impl SmtpClientFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    /// 设置正文容器
    pub fn with_renderer(mut self, renderer: impl BodyRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    /// 构建待发送的 MIME 邮件，不产生任何网络活动
    pub fn compose(&self, request: &MailRequest<'_>) -> MailResult<Message> {
        self.config
            .validate()
            .map_err(|e| MailError::configuration(e.to_string()))?;

        let attachments = decode_attachments(request.attachments)?;
        let body = self.renderer.render_container(request.html_body)?;

        build_message(
            request.from,
            request.to,
            request.subject,
            body,
            attachments,
            request.priority,
        )
    }

    /// 发送邮件，`cancel` 被触发时中止当前阶段
    pub async fn send_request(
        &self,
        request: MailRequest<'_>,
        cancel: Option<&CancellationToken>,
    ) -> MailResult<()> {
        debug!(
            recipients = request.to.len(),
            attachments = request.attachments.len(),
            subject = %request.subject,
            "Sending email"
        );

        let started = Instant::now();
        let message = self.compose(&request).inspect_err(|e| {
            warn!(stage = %e.stage(), error = %e, "Email rejected before connecting");
        })?;

        let endpoint = SmtpEndpoint::from_config(&self.config);
        if endpoint.accept_invalid_certs {
            warn!(host = %endpoint.host, "Server certificate validation is disabled");
        }

        let mut client = self.factory.create();
        let outcome = self
            .deliver(client.as_mut(), &endpoint, &message, cancel)
            .await;

        let quit = !matches!(outcome, Err(MailError::Cancelled { .. }));
        let closed = client.disconnect(quit).await;

        let result = match (outcome, closed) {
            (Err(e), Err(disconnect_error)) => {
                warn!(error = %disconnect_error, "Disconnect failed after an earlier error");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(disconnect_error)) => {
                Err(MailError::at_stage(MailStage::Disconnect, disconnect_error))
            }
            (Ok(()), Ok(())) => Ok(()),
        };

        let duration_ms = started.elapsed().as_secs_f64() * 1000.0;
        match &result {
            Ok(()) => {
                courier_telemetry::record_mail_send(MailStage::Transmit.as_str(), true, duration_ms);
                info!(
                    host = %endpoint.host,
                    recipients = request.to.len(),
                    subject = %request.subject,
                    "Email sent successfully"
                );
            }
            Err(e) => {
                courier_telemetry::record_mail_send(e.stage().as_str(), false, duration_ms);
                warn!(host = %endpoint.host, stage = %e.stage(), error = %e, "Email delivery failed");
            }
        }

        result
    }

    async fn deliver(
        &self,
        client: &mut dyn SmtpClient,
        endpoint: &SmtpEndpoint,
        message: &Message,
        cancel: Option<&CancellationToken>,
    ) -> MailResult<()> {
        run_stage(MailStage::Connect, cancel, client.connect(endpoint)).await?;

        let password = self.config.password.expose_secret();
        run_stage(
            MailStage::Authenticate,
            cancel,
            client.authenticate(self.config.login(), password),
        )
        .await?;

        run_stage(MailStage::Transmit, cancel, client.send(message)).await
    }
}

/// 执行一个传输阶段，按阶段归类错误
async fn run_stage<F>(
    stage: MailStage,
    cancel: Option<&CancellationToken>,
    operation: F,
) -> MailResult<()>
where
    F: Future<Output = Result<(), BoxError>>,
{
    let result = match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => return Err(MailError::cancelled(stage)),
            result = operation => result,
        },
        None => operation.await,
    };

    result.map_err(|source| MailError::at_stage(stage, source))
}

#[async_trait::async_trait]
impl EmailSender for SmtpMailer {
    async fn send(
        &self,
        from: &EmailParty,
        to: &RecipientList,
        subject: &str,
        html_body: &str,
        attachments: &[Attachment],
        priority: MessagePriority,
    ) -> MailResult<()> {
        let request = MailRequest::new(from, to, subject, html_body)
            .attachments(attachments)
            .priority(priority);

        self.send_request(request, None).await
    }
}
