//! HTML page rendering
//!
//! Pages are minijinja templates embedded in the binary. HTML auto-escaping is on
//! for every template, so provider messages and query parameters render as text.

use crate::Result;
use minijinja::Environment;
use serde::Serialize;
use std::sync::Arc;

pub const HOME_TEMPLATE: &str = "home.html";
pub const ERROR_TEMPLATE: &str = "error.html";

/// Template renderer for HTML pages using minijinja
#[derive(Clone)]
pub struct TemplateRenderer {
    env: Arc<Environment<'static>>,
}

impl TemplateRenderer {
    /// Create a renderer with the embedded page templates loaded
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| minijinja::AutoEscape::Html);

        env.add_template(HOME_TEMPLATE, include_str!("../../static/pages/home.html"))?;
        env.add_template(ERROR_TEMPLATE, include_str!("../../static/pages/error.html"))?;

        Ok(Self { env: Arc::new(env) })
    }

    /// Render a template with a serializable context
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(ctx)?)
    }
}
