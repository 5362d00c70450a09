//! Markdown preprocessing applied before parsing.
//!
//! Text pasted from word processors or chat tools often arrives with unicode
//! bullet glyphs, missing spaces after dashes, and lists glued to the heading
//! above them. CommonMark treats none of those as lists, so lines are
//! rewritten before parsing. Fenced code blocks are left untouched.

const BULLET_GLYPHS: [char; 8] = ['–', '—', '•', '◦', '▪', '∙', '·', '‣'];

pub(crate) fn normalize_markdown(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut normalized: Vec<String> = Vec::new();
    let mut inside_fence = false;
    let mut previous_raw = "";

    for raw_line in input.lines() {
        if is_fence_delimiter(raw_line) {
            inside_fence = !inside_fence;
            normalized.push(raw_line.to_string());
            previous_raw = raw_line;
            continue;
        }

        if inside_fence {
            normalized.push(raw_line.to_string());
            previous_raw = raw_line;
            continue;
        }

        let line = rewrite_list_marker(raw_line);

        // CommonMark only recognises a list after a heading when a blank
        // line separates them.
        if is_heading(previous_raw)
            && starts_list_item(&line)
            && normalized.last().is_some_and(|prev| !prev.is_empty())
        {
            normalized.push(String::new());
        }

        normalized.push(line);
        previous_raw = raw_line;
    }

    normalized.join("\n")
}

/// Convert glyph bullets to `- ` and guarantee a space after a leading dash.
fn rewrite_list_marker(raw: &str) -> String {
    let indent_len = raw.len() - raw.trim_start().len();
    let (indent, body) = raw.split_at(indent_len);

    let mut chars = body.chars();
    match chars.next() {
        Some(glyph) if BULLET_GLYPHS.contains(&glyph) => {
            let rest = chars.as_str().trim_start();
            format!("{indent}- {rest}")
        }
        Some('-') => {
            let rest = chars.as_str();
            if rest.starts_with(char::is_whitespace) {
                raw.to_string()
            } else {
                format!("{indent}- {rest}")
            }
        }
        _ => raw.to_string(),
    }
}

fn is_fence_delimiter(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn is_heading(line: &str) -> bool {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    (1..=6).contains(&hashes) && trimmed[hashes..].starts_with(char::is_whitespace)
}

fn starts_list_item(line: &str) -> bool {
    let trimmed = line.trim_start();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some('-' | '*' | '+') => matches!(chars.next(), Some(' ' | '\t')),
        Some(c) if c.is_ascii_digit() => {
            let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
            let rest = &trimmed[digits..];
            rest.strip_prefix('.')
                .is_some_and(|after| after.starts_with(' ') || after.starts_with('\t'))
        }
        _ => false,
    }
}
