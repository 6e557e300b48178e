//! Prompt templates for the analysis report
//!
//! - `system`: the analyst persona sent as the system message
//! - `user`: the report request assembled from prices, fundamentals and news

mod system;
mod user;

pub use system::ANALYST_SYSTEM_PROMPT;
pub use user::{ReportContext, render_report_prompt};

use crate::error::Result;
use minijinja::Environment;
use serde::Serialize;

/// Render a template string with the given context
pub(crate) fn render(template: &str, context: impl Serialize) -> Result<String> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.add_filter("trim", |s: String| s.trim().to_string());

    Ok(env.render_str(template, minijinja::Value::from_serialize(&context))?)
}
