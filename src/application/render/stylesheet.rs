//! Stylesheet templates stamped into rendered output.
//!
//! Preview fragments and printable documents share one monochrome palette so
//! the editor pane and the PDF look alike. The document variant adds page
//! geometry consumed by Chromium's print-to-pdf pass.

use crate::domain::document::StyleSettings;

const PAGE_RULES: &str = "@page { size: A4; margin: 2cm; }\n";

pub(crate) fn preview_styles(settings: &StyleSettings, contains_code: bool) -> String {
    let mut css = root_typography(".markdown-body", settings);
    css.push_str(&block_rules(".markdown-body", settings));
    if contains_code {
        css.push_str(&syntax_rules(".markdown-body"));
    }
    css
}

pub(crate) fn document_styles(settings: &StyleSettings, contains_code: bool) -> String {
    let mut css = String::from(PAGE_RULES);
    css.push_str(&root_typography("body", settings));
    css.push_str(".markdown-body { max-width: 900px; margin: 0 auto; }\n");
    css.push_str(&block_rules("body", settings));
    if contains_code {
        css.push_str(&syntax_rules("body"));
    }
    css
}

fn root_typography(scope: &str, settings: &StyleSettings) -> String {
    format!(
        "{scope} {{ font-family: {font}; line-height: 1.7; color: #111; font-size: {p}px; }}\n",
        font = settings.font_family,
        p = settings.p_size,
    )
}

fn block_rules(scope: &str, settings: &StyleSettings) -> String {
    format!(
        "\
{scope} h1, {scope} h2, {scope} h3, {scope} h4, {scope} h5, {scope} h6 {{ color: #111; margin-top: 24px; margin-bottom: 12px; page-break-after: avoid; font-weight: 600; }}
{scope} h1 {{ font-size: {h1}px; border-bottom: 2px solid #e5e7eb; padding-bottom: 10px; margin-bottom: 20px; }}
{scope} h2 {{ font-size: {h2}px; border-bottom: 1px solid #e5e7eb; padding-bottom: 8px; margin-bottom: 16px; }}
{scope} h3 {{ font-size: {h3}px; margin-bottom: 12px; }}
{scope} p {{ margin-bottom: 16px; color: #222; }}
{scope} pre {{ background-color: #f5f7fa; color: #111; border: 1px solid #e5e7eb; border-radius: 8px; padding: 16px; margin: 16px 0; font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace; font-size: {p}px; line-height: 1.6; overflow: hidden; page-break-inside: avoid; }}
{scope} code {{ background-color: #f3f4f6; padding: 2px 6px; border-radius: 4px; font-family: 'Monaco', 'Menlo', 'Ubuntu Mono', monospace; font-size: {p}px; color: #111; }}
{scope} pre code {{ background-color: transparent; padding: 0; }}
{scope} table {{ width: 100%; border-collapse: collapse; margin: 16px 0; font-size: {p}px; page-break-inside: avoid; border: 1px solid #d1d5db; }}
{scope} th, {scope} td {{ border: 1px solid #d1d5db; padding: 12px; text-align: left; vertical-align: top; }}
{scope} th {{ background-color: #f9fafb; font-weight: 600; color: #111; }}
{scope} tr:nth-child(even) {{ background-color: #fafafa; }}
{scope} ul, {scope} ol {{ margin: 12px 0; padding-left: 24px; }}
{scope} li {{ margin-bottom: 6px; line-height: 1.5; }}
{scope} blockquote {{ border-left: 4px solid #d1d5db; margin: 16px 0; padding: 12px 16px; color: #6b7280; font-style: italic; background-color: #f8f9fa; border-radius: 0 4px 4px 0; }}
{scope} a {{ color: #111; text-decoration: none; }}
{scope} hr {{ border: none; height: 2px; background: #e5e7eb; margin: 24px 0; }}
{scope} img {{ max-width: 100%; }}
",
        h1 = settings.h1_size,
        h2 = settings.h2_size,
        h3 = settings.h3_size,
        p = settings.p_size,
    )
}

fn syntax_rules(scope: &str) -> String {
    format!(
        "\
{scope} .syntax-comment {{ color: #6b7280; font-style: italic; }}
{scope} .syntax-string {{ color: #374151; }}
{scope} .syntax-keyword, {scope} .syntax-storage {{ color: #111; font-weight: 600; }}
{scope} .syntax-constant {{ color: #1f2937; }}
{scope} .syntax-entity {{ color: #111; font-weight: 600; }}
{scope} .syntax-support {{ color: #374151; }}
"
    )
}
