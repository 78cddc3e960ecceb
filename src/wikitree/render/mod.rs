//! # Rendering
//!
//! Page content becomes HTML in two steps: the page type's [`Renderer`]
//! produces a body (plus optional head markup), then the [`HtmlTemplate`]
//! wraps it into a full document. [`cache::HtmlCache`] drives both and
//! skips them whenever the page's content hash is unchanged.

use crate::config::WikiConfig;
use crate::document::Document;
use crate::error::Result;
use crate::page::Page;

pub mod cache;
pub mod hash;
pub mod renderers;

pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body { font-family: sans-serif; margin: 1em 2em; }
pre { white-space: pre-wrap; }
</style>
{userhead}
</head>
<body>
{content}
</body>
</html>
"#;

pub struct RenderContext<'a> {
    pub document: &'a Document,
    pub config: &'a WikiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    /// Extra markup for the `<head>` (scripts, styles)
    pub head: String,
}

impl Rendered {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            head: String::new(),
        }
    }
}

pub trait Renderer {
    fn render(&self, ctx: &RenderContext<'_>, page: &Page, content: &str) -> Result<Rendered>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTemplate {
    template: String,
    user_style: String,
}

impl HtmlTemplate {
    pub fn from_config(config: &WikiConfig) -> Self {
        Self {
            template: config
                .template
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATE.to_string()),
            user_style: config.user_style.clone(),
        }
    }

    pub fn substitute(&self, rendered: &Rendered) -> String {
        let mut head = String::new();
        if !self.user_style.is_empty() {
            head.push_str("<style>\n");
            head.push_str(&self.user_style);
            head.push_str("\n</style>\n");
        }
        head.push_str(&rendered.head);

        // Split first so the body can never be re-substituted
        match self.template.split_once("{content}") {
            Some((before, after)) => format!(
                "{}{}{}",
                before.replace("{userhead}", &head),
                rendered.body,
                after.replace("{userhead}", &head)
            ),
            None => format!("{}{}", self.template.replace("{userhead}", &head), rendered.body),
        }
    }

    /// Text that changes whenever the template output would.
    pub fn fingerprint(&self) -> String {
        format!("{}\u{0}{}", self.template, self.user_style)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
