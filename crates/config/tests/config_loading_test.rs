use courier_config::{MailerConfig, SecureSocketMode};
use figment::Jail;
use secrecy::ExposeSecret;

#[test]
fn test_load_merges_files_and_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "default.toml",
            r#"
            [smtp]
            host = "smtp.default.local"
            username = "mailer"
            password = "default-secret"
            "#,
        )?;
        jail.create_file(
            "production.toml",
            r#"
            [smtp]
            host = "smtp.example.com"
            secure_socket_mode = "ssl_on_connect"

            [telemetry]
            json = true
            "#,
        )?;
        jail.set_env("APP_ENV", "production");
        jail.set_env("SMTP_PASSWORD", "from-env");
        jail.set_env("SMTP_USE_SSL", "true");
        jail.set_env("TELEMETRY_LOG_LEVEL", "warn");

        let config = MailerConfig::load(".").map_err(|e| e.to_string())?;

        assert_eq!(config.app_env, "production");
        assert_eq!(config.smtp.host, "smtp.example.com");
        assert_eq!(config.smtp.username, "mailer");
        assert_eq!(config.smtp.password.expose_secret(), "from-env");
        assert_eq!(config.smtp.effective_mode(), SecureSocketMode::SslOnConnect);
        assert_eq!(config.smtp.effective_port(), 465);
        assert!(config.telemetry.json);
        assert_eq!(config.telemetry.log_level, "warn");
        Ok(())
    });
}

#[test]
fn test_load_without_files_uses_defaults() {
    Jail::expect_with(|jail| {
        jail.set_env("APP_ENV", "development");

        let config = MailerConfig::load(".").map_err(|e| e.to_string())?;

        assert_eq!(config.app_env, "development");
        assert!(config.smtp.host.is_empty());
        assert!(config.smtp.validate().is_err());
        assert_eq!(config.telemetry.log_level, "info");
        Ok(())
    });
}
