use crate::{ConfigError, MailerConfig, SecureSocketMode, SmtpConfig};
use figment::{
    Figment,
    providers::{Format, Toml},
};
use secrecy::ExposeSecret;
use std::time::Duration;

#[test]
fn test_config_struct_redaction() {
    let config = SmtpConfig::new("smtp.example.com", "mailer", "hunter2-password");
    let debug_output = format!("{:?}", config);
    assert!(!debug_output.contains("hunter2-password"));
    assert!(debug_output.contains("REDACTED"));
}

#[test]
fn test_validate_requires_host_username_password() {
    assert!(SmtpConfig::new("smtp.example.com", "mailer", "secret").validate().is_ok());

    let missing_host = SmtpConfig::new("  ", "mailer", "secret").validate();
    assert!(matches!(missing_host, Err(ConfigError::Missing("host"))));

    let missing_user = SmtpConfig::new("smtp.example.com", "", "secret").validate();
    assert!(matches!(missing_user, Err(ConfigError::Missing("username"))));

    let missing_password = SmtpConfig::new("smtp.example.com", "mailer", "").validate();
    assert!(matches!(missing_password, Err(ConfigError::Missing("password"))));
}

#[test]
fn test_validate_treats_blank_values_as_missing() {
    let blank_user = SmtpConfig::new("smtp.example.com", " \t", "secret").validate();
    assert!(matches!(blank_user, Err(ConfigError::Missing("username"))));

    let blank_password = SmtpConfig::new("smtp.example.com", "mailer", "   ").validate();
    assert!(matches!(blank_password, Err(ConfigError::Missing("password"))));
}

#[test]
fn test_port_defaults_follow_mode() {
    let config = SmtpConfig::new("smtp.example.com", "mailer", "secret");
    assert_eq!(config.effective_port(), 587);
    assert_eq!(config.effective_mode(), SecureSocketMode::StartTls);

    let implicit = config.clone().with_secure_socket_mode(SecureSocketMode::SslOnConnect);
    assert_eq!(implicit.effective_port(), 465);

    let zero = config.clone().with_port(0);
    assert_eq!(zero.effective_port(), 587);

    let explicit = config.with_port(2525);
    assert_eq!(explicit.effective_port(), 2525);
}

#[test]
fn test_auto_mode_resolves_by_port() {
    let config = SmtpConfig::new("smtp.example.com", "mailer", "secret")
        .with_secure_socket_mode(SecureSocketMode::Auto);
    assert_eq!(config.effective_mode(), SecureSocketMode::StartTlsWhenAvailable);

    let implicit = config.with_port(465);
    assert_eq!(implicit.effective_mode(), SecureSocketMode::SslOnConnect);
}

#[test]
fn test_use_ssl_false_forces_plaintext() {
    let mut config = SmtpConfig::new("localhost", "mailer", "secret")
        .with_secure_socket_mode(SecureSocketMode::SslOnConnect);
    config.use_ssl = false;

    assert_eq!(config.effective_mode(), SecureSocketMode::None);
    assert_eq!(config.effective_port(), 25);
}

#[test]
fn test_login_prefers_usermail() {
    let mut config = SmtpConfig::new("smtp.example.com", "mailer", "secret");
    assert_eq!(config.login(), "mailer");

    config.usermail = Some("mailer@example.com".to_string());
    assert_eq!(config.login(), "mailer@example.com");

    config.usermail = Some(String::new());
    assert_eq!(config.login(), "mailer");
}

#[test]
fn test_timeout() {
    let mut config = SmtpConfig::default();
    assert_eq!(config.timeout(), Some(Duration::from_secs(30)));

    config.timeout_secs = 0;
    assert_eq!(config.timeout(), None);
}

#[test]
fn test_from_figment_toml() {
    let figment = Figment::from(Toml::string(
        r#"
        [smtp]
        host = "smtp.example.com"
        port = 465
        username = "mailer"
        password = "secret"
        secure_socket_mode = "SslOnConnect"
        validate_server_certificate = false

        [telemetry]
        log_level = "debug"
        "#,
    ));

    let config = MailerConfig::from_figment(figment).unwrap();
    assert_eq!(config.smtp.host, "smtp.example.com");
    assert_eq!(config.smtp.port, Some(465));
    assert_eq!(config.smtp.password.expose_secret(), "secret");
    assert_eq!(config.smtp.secure_socket_mode, SecureSocketMode::SslOnConnect);
    assert!(!config.smtp.validate_server_certificate);
    assert!(config.smtp.use_ssl);
    assert_eq!(config.telemetry.log_level, "debug");
    assert_eq!(config.app_env, "development");
}

#[test]
fn test_certificate_validation_is_on_by_default() {
    let figment = Figment::from(Toml::string(
        r#"
        [smtp]
        host = "smtp.example.com"
        "#,
    ));

    let config = MailerConfig::from_figment(figment).unwrap();
    assert!(config.smtp.validate_server_certificate);
    assert_eq!(config.smtp.secure_socket_mode, SecureSocketMode::StartTls);
    assert_eq!(config.smtp.hello_name, "localhost");
}
