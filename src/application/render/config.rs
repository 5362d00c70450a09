use std::collections::HashSet;

use ammonia::Builder as AmmoniaBuilder;
use comrak::options::Options;

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

/// Sanitizer allowlist for converted documents: structural and inline tags,
/// tables, task-list checkboxes, and http(s)/mailto links. Everything else,
/// including raw HTML a user types into the editor, is stripped.
pub(crate) fn build_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "blockquote",
        "br",
        "code",
        "del",
        "div",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "img",
        "input",
        "li",
        "ol",
        "p",
        "pre",
        "s",
        "span",
        "strong",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> = HashSet::from(["class", "id"]);
    builder.generic_attributes(generic);

    builder.add_tag_attributes("a", &["href", "title"]);
    builder.add_tag_attributes("img", &["src", "alt", "title"]);
    builder.add_tag_attributes("input", &["type", "checked", "disabled"]);
    builder.add_tag_attributes("pre", &["data-language"]);
    builder.add_tag_attributes("th", &["align"]);
    builder.add_tag_attributes("td", &["align"]);

    builder.add_url_schemes(["http", "https", "mailto"].iter().copied());

    builder
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.tagfilter = false;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;
    ext.header_ids = Some(String::new());

    let render = &mut options.render;
    // Single newlines become <br>, matching how the editor treats Enter.
    render.hardbreaks = true;
    render.github_pre_lang = true;
    render.r#unsafe = true;
}

#[cfg(test)]
mod tests {
    use super::build_sanitizer;

    #[test]
    fn sanitizer_strips_scripts_and_event_handlers() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<p onclick=\"steal()\">Hi</p><script>alert(1)</script>")
            .to_string();

        assert!(html.contains("<p>Hi</p>"));
        assert!(!html.contains("script"));
        assert!(!html.contains("onclick"));
    }

    #[test]
    fn sanitizer_keeps_task_list_checkboxes() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<li><input type=\"checkbox\" checked disabled> done</li>")
            .to_string();

        assert!(html.contains("type=\"checkbox\""));
        assert!(html.contains("checked"));
    }

    #[test]
    fn sanitizer_allows_only_safe_link_schemes() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<a href=\"javascript:alert(1)\">x</a><a href=\"https://example.com\">y</a>")
            .to_string();

        assert!(!html.contains("javascript:"));
        assert!(html.contains("https://example.com"));
    }

    #[test]
    fn sanitizer_preserves_table_alignment() {
        let sanitizer = build_sanitizer();
        let html = sanitizer
            .clean("<table><thead><tr><th align=\"center\">A</th></tr></thead></table>")
            .to_string();

        assert!(html.contains("align=\"center\""));
    }
}
