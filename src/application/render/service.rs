use std::sync::Arc;

use comrak::{
    Arena, format_html,
    nodes::{AstNode, NodeHtmlBlock, NodeValue},
    parse_document,
};
use once_cell::sync::Lazy;
use syntect::{html::ClassStyle, parsing::SyntaxSet};

use crate::application::render::types::{
    RenderError, RenderOutput, RenderRequest, RenderService, RenderTarget,
};

use super::{config, highlight, normalize, stylesheet};

/// Comrak-based rendering pipeline with syntect highlighting and ammonia
/// sanitisation.
pub struct MarkdownRenderService {
    options: comrak::Options<'static>,
    syntax_set: SyntaxSet,
    class_style: ClassStyle,
    sanitizer: ammonia::Builder<'static>,
}

impl MarkdownRenderService {
    /// Construct a renderer with the GFM-style extension set and syntax
    /// highlighting configured to emit `syntax-` prefixed CSS classes.
    fn new() -> Self {
        Self {
            options: config::default_options(),
            syntax_set: SyntaxSet::load_defaults_newlines(),
            class_style: ClassStyle::SpacedPrefixed { prefix: "syntax-" },
            sanitizer: config::build_sanitizer(),
        }
    }
}

static RENDER_SERVICE: Lazy<Arc<MarkdownRenderService>> =
    Lazy::new(|| Arc::new(MarkdownRenderService::new()));

/// Access the shared render service instance, initialised on first use.
pub fn render_service() -> Arc<MarkdownRenderService> {
    Arc::clone(&RENDER_SERVICE)
}

impl Default for MarkdownRenderService {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderService for MarkdownRenderService {
    fn render(&self, request: &RenderRequest) -> Result<RenderOutput, RenderError> {
        let normalized = normalize::normalize_markdown(&request.markdown);

        let arena = Arena::new();
        let root = parse_document(&arena, &normalized, &self.options);

        let contains_code = highlight_stage(root, &self.syntax_set, &self.class_style)?;
        let rendered = render_html_stage(root, &self.options)?;
        let sanitized = self.sanitizer.clean(&rendered).to_string();
        let html = assemble_stage(sanitized, request, contains_code);

        Ok(RenderOutput {
            html,
            contains_code,
        })
    }
}

/// Replace fenced code blocks with highlighted HTML, depth first. Returns
/// whether any code block was found.
fn highlight_stage<'a>(
    node: &'a AstNode<'a>,
    syntax_set: &SyntaxSet,
    class_style: &ClassStyle,
) -> Result<bool, RenderError> {
    let mut contains_code = false;

    if let Some((info, literal)) = extract_code_block(node) {
        let language = info.split_whitespace().next();
        let html = highlight::highlight_code(language, &literal, syntax_set, class_style)?;
        let mut data = node.data.borrow_mut();
        data.value = NodeValue::HtmlBlock(NodeHtmlBlock {
            block_type: 0,
            literal: html,
        });
        contains_code = true;
    }

    let mut child = node.first_child();
    while let Some(next) = child {
        contains_code |= highlight_stage(next, syntax_set, class_style)?;
        child = next.next_sibling();
    }

    Ok(contains_code)
}

fn extract_code_block(node: &AstNode<'_>) -> Option<(String, String)> {
    let data = node.data.borrow();
    if let NodeValue::CodeBlock(block) = &data.value {
        Some((block.info.trim().to_string(), block.literal.clone()))
    } else {
        None
    }
}

fn render_html_stage<'a>(
    root: &'a AstNode<'a>,
    options: &comrak::Options<'static>,
) -> Result<String, RenderError> {
    let mut html = String::new();
    format_html(root, options, &mut html).map_err(|err| RenderError::Markdown {
        message: err.to_string(),
    })?;
    Ok(html)
}

/// Wrap sanitised content in the requested shell: a styled fragment for the
/// preview pane, or a complete page for printing. The title always leads the
/// body as an `<h1>` so preview, PDF, and DOCX agree on document structure.
fn assemble_stage(content: String, request: &RenderRequest, contains_code: bool) -> String {
    let title = escape_html(request.title.as_str());

    match request.target {
        RenderTarget::Fragment => {
            let styles = stylesheet::preview_styles(&request.settings, contains_code);
            format!(
                "<style>\n{styles}</style>\n<div class=\"markdown-body\">\n<h1>{title}</h1>\n{content}</div>"
            )
        }
        RenderTarget::Document => {
            let styles = stylesheet::document_styles(&request.settings, contains_code);
            format!(
                "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{styles}</style>\n</head>\n<body>\n<div class=\"markdown-body\">\n<h1>{title}</h1>\n{content}</div>\n</body>\n</html>\n"
            )
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{DocumentTitle, StyleSettings};

    fn fragment(markdown: &str) -> RenderOutput {
        let request = RenderRequest::new(RenderTarget::Fragment, markdown);
        render_service().render(&request).expect("render succeeds")
    }

    #[test]
    fn renders_tables_and_task_lists() {
        let output = fragment("| a | b |\n| - | - |\n| 1 | 2 |\n\n- [x] done\n- [ ] open");

        assert!(output.html.contains("<table>"));
        assert!(output.html.contains("type=\"checkbox\""));
        assert!(!output.contains_code);
    }

    #[test]
    fn strips_raw_html_from_input() {
        let output = fragment("hello <script>alert(1)</script> world");

        assert!(!output.html.contains("<script>"));
        assert!(output.html.contains("hello"));
    }

    #[test]
    fn highlights_fenced_code() {
        let output = fragment("```rust\nfn main() {}\n```");

        assert!(output.contains_code);
        assert!(output.html.contains("language-rust"));
        assert!(output.html.contains("class=\"highlight\""));
        assert!(output.html.contains("syntax-"));
    }

    #[test]
    fn fragment_embeds_title_and_settings() {
        let request = RenderRequest::new(RenderTarget::Fragment, "body text")
            .with_title(DocumentTitle::new("Launch Plan"))
            .with_settings(StyleSettings {
                h1_size: 40,
                ..Default::default()
            });
        let output = render_service().render(&request).expect("render succeeds");

        assert!(output.html.contains("<h1>Launch Plan</h1>"));
        assert!(output.html.contains("font-size: 40px"));
        assert!(output.html.starts_with("<style>"));
    }

    #[test]
    fn document_target_produces_complete_page() {
        let request = RenderRequest::new(RenderTarget::Document, "# Heading\n\ncontent");
        let output = render_service().render(&request).expect("render succeeds");

        assert!(output.html.starts_with("<!DOCTYPE html>"));
        assert!(output.html.contains("@page"));
        assert!(output.html.contains("</html>"));
    }

    #[test]
    fn titles_are_escaped() {
        let request = RenderRequest::new(RenderTarget::Fragment, "text")
            .with_title(DocumentTitle::new("<b>bold</b> & co"));
        let output = render_service().render(&request).expect("render succeeds");

        assert!(output.html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; co"));
        assert!(!output.html.contains("<h1><b>"));
    }

    #[test]
    fn glyph_bullets_render_as_list_items() {
        let output = fragment("# Notes\n• first\n• second");

        assert!(output.html.contains("<li>"));
        assert!(!output.html.contains("•"));
    }

    #[test]
    fn single_newlines_become_hard_breaks() {
        let output = fragment("first line\nsecond line");

        assert!(output.html.contains("<br"));
    }

    #[test]
    fn headings_carry_anchor_ids() {
        let output = fragment("## Usage Notes");

        assert!(output.html.contains("id=\"usage-notes\""));
    }
}
