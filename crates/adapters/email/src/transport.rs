//! SMTP 传输接缝与 lettre 实现

use async_trait::async_trait;
use courier_config::{SecureSocketMode, SmtpConfig};
use courier_errors::BoxError;
use lettre::Message;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::{ClientId, Extension};
use std::time::Duration;
use tracing::debug;

/// 解析后的连接参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    /// 已解析，不会是 Auto
    pub mode: SecureSocketMode,
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
    pub hello_name: String,
}

impl SmtpEndpoint {
    pub fn from_config(config: &SmtpConfig) -> Self {
        Self {
            host: config.host.trim().to_string(),
            port: config.effective_port(),
            mode: config.effective_mode(),
            accept_invalid_certs: !config.validate_server_certificate,
            timeout: config.timeout(),
            hello_name: config.hello_name.clone(),
        }
    }
}

/// 单次发送使用的 SMTP 客户端
///
/// 错误原样返回，由发送流程按阶段归类
#[async_trait]
pub trait SmtpClient: Send {
    async fn connect(&mut self, endpoint: &SmtpEndpoint) -> Result<(), BoxError>;

    async fn authenticate(&mut self, login: &str, password: &str) -> Result<(), BoxError>;

    async fn send(&mut self, message: &Message) -> Result<(), BoxError>;

    /// `quit` 为 false 时直接关闭套接字，不发送 QUIT 也不等待服务器
    async fn disconnect(&mut self, quit: bool) -> Result<(), BoxError>;
}

/// 每次发送创建一个新客户端
pub trait SmtpClientFactory: Send + Sync {
    fn create(&self) -> Box<dyn SmtpClient>;
}

/// 基于 lettre 的客户端
#[derive(Default)]
pub struct LettreSmtpClient {
    connection: Option<AsyncSmtpConnection>,
}

impl LettreSmtpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection(&mut self) -> Result<&mut AsyncSmtpConnection, BoxError> {
        self.connection
            .as_mut()
            .ok_or_else(|| "SMTP client is not connected".into())
    }
}

fn tls_parameters(endpoint: &SmtpEndpoint) -> Result<TlsParameters, BoxError> {
    let parameters = TlsParameters::builder(endpoint.host.clone())
        .dangerous_accept_invalid_certs(endpoint.accept_invalid_certs)
        .build()?;
    Ok(parameters)
}

#[async_trait]
impl SmtpClient for LettreSmtpClient {
    async fn connect(&mut self, endpoint: &SmtpEndpoint) -> Result<(), BoxError> {
        let hello_name = ClientId::Domain(endpoint.hello_name.clone());
        let server = (endpoint.host.as_str(), endpoint.port);

        let connection = match endpoint.mode {
            SecureSocketMode::SslOnConnect => {
                AsyncSmtpConnection::connect_tokio1(
                    server,
                    endpoint.timeout,
                    &hello_name,
                    Some(tls_parameters(endpoint)?),
                    None,
                )
                .await?
            }
            mode => {
                let mut connection = AsyncSmtpConnection::connect_tokio1(
                    server,
                    endpoint.timeout,
                    &hello_name,
                    None,
                    None,
                )
                .await?;

                let offered = connection.server_info().supports_feature(Extension::StartTls);
                let upgrade = match mode {
                    SecureSocketMode::StartTls if !offered => {
                        connection.abort().await;
                        return Err("Server does not support STARTTLS".into());
                    }
                    SecureSocketMode::StartTls => true,
                    SecureSocketMode::StartTlsWhenAvailable | SecureSocketMode::Auto => offered,
                    _ => false,
                };
                if upgrade {
                    connection
                        .starttls(tls_parameters(endpoint)?, &hello_name)
                        .await?;
                }
                connection
            }
        };

        debug!(
            host = %endpoint.host,
            port = endpoint.port,
            encrypted = connection.is_encrypted(),
            "SMTP connection established"
        );

        self.connection = Some(connection);
        Ok(())
    }

    async fn authenticate(&mut self, login: &str, password: &str) -> Result<(), BoxError> {
        let credentials = Credentials::new(login.to_string(), password.to_string());
        self.connection()?
            .auth(&[Mechanism::Plain, Mechanism::Login], &credentials)
            .await?;
        Ok(())
    }

    async fn send(&mut self, message: &Message) -> Result<(), BoxError> {
        let formatted = message.formatted();
        self.connection()?
            .send(message.envelope(), &formatted)
            .await?;
        Ok(())
    }

    async fn disconnect(&mut self, quit: bool) -> Result<(), BoxError> {
        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };

        if quit {
            connection.quit().await?;
        } else {
            // 释放连接即关闭套接字
            drop(connection);
            debug!("SMTP connection dropped without QUIT");
        }
        Ok(())
    }
}

/// 创建 [`LettreSmtpClient`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LettreClientFactory;

impl SmtpClientFactory for LettreClientFactory {
    fn create(&self) -> Box<dyn SmtpClient> {
        Box::new(LettreSmtpClient::new())
    }
}
