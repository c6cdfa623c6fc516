//! telemetry - 可观测性库

use courier_config::TelemetryConfig;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// 按配置安装全局 tracing subscriber 与 Prometheus recorder
///
/// 进程内只能调用一次。`RUST_LOG` 优先于 `log_level`
pub fn init(config: &TelemetryConfig) -> Result<PrometheusHandle, BuildError> {
    init_tracing(&config.log_level, config.json);
    PrometheusBuilder::new().install_recorder()
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// 记录一次邮件发送
///
/// `stage` 为成功时的最后阶段或失败阶段
pub fn record_mail_send(stage: &str, success: bool, duration_ms: f64) {
    let labels = [
        ("stage", stage.to_string()),
        ("success", success.to_string()),
    ];

    counter!("mail_send_total", &labels).increment(1);
    histogram!("mail_send_duration_ms", &labels).record(duration_ms);
}
