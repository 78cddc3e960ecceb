use super::{escape_html, RenderContext, Rendered, Renderer};
use crate::attachments::ATTACH_DIRNAME;
use crate::error::Result;
use crate::page::Page;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// Link prefix addressing a file of the page's own attachments.
pub const ATTACH_LINK_PREFIX: &str = "Attach:";
pub const PAGE_LINK_SCHEME: &str = "page://";

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, _ctx: &RenderContext<'_>, _page: &Page, content: &str) -> Result<Rendered> {
        Ok(Rendered::body(markdown_to_html(content)))
    }
}

pub fn markdown_to_html(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: resolve_attachment(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: resolve_attachment(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

// HTML is written into the page folder, so attachments resolve relatively
fn resolve_attachment(url: CowStr<'_>) -> CowStr<'_> {
    if let Some(name) = url.strip_prefix(ATTACH_LINK_PREFIX) {
        return CowStr::from(format!("{}/{}", ATTACH_DIRNAME, name));
    }
    url
}

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, _ctx: &RenderContext<'_>, _page: &Page, content: &str) -> Result<Rendered> {
        Ok(Rendered::body(format!("<pre>{}</pre>", escape_html(content))))
    }
}

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, _ctx: &RenderContext<'_>, _page: &Page, content: &str) -> Result<Rendered> {
        Ok(Rendered::body(content))
    }
}

/// Lists pages matching the query stored as the page content.
///
/// The first plain line is a phrase matched case-insensitively against titles
/// and contents; a `tags: a, b` line requires all listed tags.
pub struct SearchRenderer;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub phrase: String,
    pub tags: Vec<String>,
}

impl SearchQuery {
    pub fn parse(content: &str) -> Self {
        let mut query = SearchQuery::default();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(tags) = line.strip_prefix("tags:") {
                query.tags.extend(
                    tags.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from),
                );
            } else if query.phrase.is_empty() {
                query.phrase = line.to_lowercase();
            }
        }
        query
    }
}

impl Renderer for SearchRenderer {
    fn render(&self, ctx: &RenderContext<'_>, page: &Page, content: &str) -> Result<Rendered> {
        let query = SearchQuery::parse(content);
        let doc = ctx.document;

        let mut items = Vec::new();
        for id in doc.iter_subtree(doc.root()) {
            if id == page.id() || id == doc.root() {
                continue;
            }
            let candidate = doc.page(id)?;
            if !query.tags.iter().all(|t| candidate.tags().contains(t)) {
                continue;
            }
            if !query.phrase.is_empty()
                && !candidate.title().to_lowercase().contains(&query.phrase)
                && !doc.content(id)?.to_lowercase().contains(&query.phrase)
            {
                continue;
            }
            let title_path = doc.title_path(id)?;
            items.push(format!(
                "<li><a href=\"{}{}\">{}</a></li>",
                PAGE_LINK_SCHEME,
                escape_html(&title_path),
                escape_html(&title_path)
            ));
        }

        let body = if items.is_empty() {
            "<p>No pages found.</p>".to_string()
        } else {
            format!("<ul class=\"search-results\">\n{}\n</ul>", items.join("\n"))
        };
        Ok(Rendered::body(body))
    }
}
