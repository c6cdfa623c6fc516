//! 邮件正文容器

use courier_errors::{MailError, MailResult};
use std::collections::HashMap;
use tera::{Context, Tera};
use tracing::debug;

/// 正文渲染钩子，发送前包装 HTML 正文
pub trait BodyRenderer: Send + Sync {
    fn render_container(&self, body: &str) -> MailResult<String>;
}

/// 原样返回正文
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl BodyRenderer for PassThrough {
    fn render_container(&self, body: &str) -> MailResult<String> {
        Ok(body.to_string())
    }
}

/// 基于 tera 的正文容器
///
/// 容器模板通过 `{{ body | safe }}` 引用正文
pub struct EmailTemplate {
    tera: Tera,
    container: String,
}

impl EmailTemplate {
    /// 从模板目录加载
    pub fn new(template_dir: &str, container: impl Into<String>) -> MailResult<Self> {
        let pattern = format!("{}/**/*.html", template_dir);
        let tera = Tera::new(&pattern)
            .map_err(|e| MailError::configuration_with("Failed to load email templates", e))?;

        debug!(template_dir = %template_dir, "Email templates loaded");

        Self::with_tera(tera, container)
    }

    /// 从内存中的模板字符串创建
    pub fn from_strings(
        templates: HashMap<String, String>,
        container: impl Into<String>,
    ) -> MailResult<Self> {
        let mut tera = Tera::default();

        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                MailError::configuration_with(format!("Failed to add template {}", name), e)
            })?;
        }

        Self::with_tera(tera, container)
    }

    fn with_tera(tera: Tera, container: impl Into<String>) -> MailResult<Self> {
        let container = container.into();
        if !tera.get_template_names().any(|name| name == container) {
            return Err(MailError::configuration(format!(
                "Container template {} not found",
                container
            )));
        }
        Ok(Self { tera, container })
    }
}

impl BodyRenderer for EmailTemplate {
    fn render_container(&self, body: &str) -> MailResult<String> {
        let mut context = Context::new();
        context.insert("body", body);

        self.tera.render(&self.container, &context).map_err(|e| {
            MailError::configuration_with(
                format!("Failed to render container template {}", self.container),
                e,
            )
        })
    }
}
