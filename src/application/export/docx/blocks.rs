//! Intermediate block model between the markdown AST and the DOCX writer.
//!
//! The comrak AST carries arena lifetimes and rendering details the writer
//! does not need, so the parser flattens it into owned blocks first.

use comrak::{
    Arena,
    nodes::{AstNode, ListType, NodeValue},
    parse_document,
};

use crate::application::render::{default_options, normalize_markdown};

/// A span of text with uniform inline styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InlineRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ListBlock {
    pub ordered: bool,
    pub items: Vec<Vec<Block>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Block {
    Heading { level: u8, runs: Vec<InlineRun> },
    Paragraph(Vec<InlineRun>),
    List(ListBlock),
    CodeBlock {
        language: Option<String>,
        literal: String,
    },
    Quote(Vec<Block>),
    Table {
        rows: Vec<Vec<Vec<InlineRun>>>,
        has_header: bool,
    },
    Rule,
}

/// Parse markdown into the block model, applying the same bullet
/// normalisation the HTML pipeline uses.
pub(crate) fn parse_blocks(markdown: &str) -> Vec<Block> {
    let normalized = normalize_markdown(markdown);
    let arena = Arena::new();
    let options = default_options();
    let root = parse_document(&arena, &normalized, &options);
    collect_blocks(root)
}

fn collect_blocks<'a>(parent: &'a AstNode<'a>) -> Vec<Block> {
    let mut blocks = Vec::new();

    for node in parent.children() {
        let data = node.data.borrow();
        match &data.value {
            NodeValue::Heading(heading) => blocks.push(Block::Heading {
                level: heading.level,
                runs: collect_runs(node),
            }),
            NodeValue::Paragraph => {
                let runs = collect_runs(node);
                if !runs.is_empty() {
                    blocks.push(Block::Paragraph(runs));
                }
            }
            NodeValue::List(list) => blocks.push(Block::List(ListBlock {
                ordered: list.list_type == ListType::Ordered,
                items: collect_list_items(node),
            })),
            NodeValue::CodeBlock(block) => blocks.push(Block::CodeBlock {
                language: block
                    .info
                    .split_whitespace()
                    .next()
                    .map(|token| token.to_string()),
                literal: block.literal.clone(),
            }),
            NodeValue::BlockQuote => blocks.push(Block::Quote(collect_blocks(node))),
            NodeValue::Table(_) => blocks.push(collect_table(node)),
            NodeValue::ThematicBreak => blocks.push(Block::Rule),
            // Raw HTML has no DOCX representation and is dropped, mirroring
            // the sanitiser on the HTML path.
            NodeValue::HtmlBlock(_) => {}
            _ => {}
        }
    }

    blocks
}

fn collect_list_items<'a>(list: &'a AstNode<'a>) -> Vec<Vec<Block>> {
    let mut items = Vec::new();

    for item in list.children() {
        let marker = {
            let data = item.data.borrow();
            match &data.value {
                NodeValue::Item(_) => None,
                NodeValue::TaskItem(symbol) => Some(task_marker(symbol.symbol.is_some())),
                _ => continue,
            }
        };

        let mut blocks = collect_blocks(item);
        if let Some(marker) = marker {
            prefix_first_run(&mut blocks, marker);
        }
        items.push(blocks);
    }

    items
}

fn task_marker(checked: bool) -> &'static str {
    if checked { "\u{2611} " } else { "\u{2610} " }
}

fn prefix_first_run(blocks: &mut [Block], marker: &str) {
    let runs = match blocks.first_mut() {
        Some(Block::Paragraph(runs)) | Some(Block::Heading { runs, .. }) => runs,
        _ => return,
    };
    runs.insert(
        0,
        InlineRun {
            text: marker.to_string(),
            bold: false,
            italic: false,
            strike: false,
            code: false,
        },
    );
}

fn collect_table<'a>(table: &'a AstNode<'a>) -> Block {
    let mut rows = Vec::new();
    let mut has_header = false;

    for row in table.children() {
        let header = {
            let data = row.data.borrow();
            match &data.value {
                NodeValue::TableRow(header) => *header,
                _ => continue,
            }
        };
        has_header |= header;

        let cells: Vec<Vec<InlineRun>> = row.children().map(collect_runs).collect();
        rows.push(cells);
    }

    Block::Table { rows, has_header }
}

fn collect_runs<'a>(node: &'a AstNode<'a>) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    walk_inline(node, InlineStyle::default(), &mut runs);
    runs
}

#[derive(Debug, Clone, Copy, Default)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
}

fn walk_inline<'a>(parent: &'a AstNode<'a>, style: InlineStyle, runs: &mut Vec<InlineRun>) {
    for node in parent.children() {
        let value = {
            let data = node.data.borrow();
            match &data.value {
                NodeValue::Text(text) => InlineValue::Text(text.to_string()),
                NodeValue::Code(code) => InlineValue::Code(code.literal.clone()),
                NodeValue::SoftBreak | NodeValue::LineBreak => InlineValue::Text(" ".to_string()),
                NodeValue::Strong => InlineValue::Nested(InlineStyle {
                    bold: true,
                    ..style
                }),
                NodeValue::Emph => InlineValue::Nested(InlineStyle {
                    italic: true,
                    ..style
                }),
                NodeValue::Strikethrough => InlineValue::Nested(InlineStyle {
                    strike: true,
                    ..style
                }),
                NodeValue::Link(link) => InlineValue::Link(link.url.clone()),
                NodeValue::Image(_) => InlineValue::Nested(style),
                NodeValue::HtmlInline(_) => continue,
                _ => InlineValue::Nested(style),
            }
        };

        match value {
            InlineValue::Text(text) => push_run(runs, &text, style),
            InlineValue::Code(literal) => push_run(
                runs,
                &literal,
                InlineStyle {
                    code: true,
                    ..style
                },
            ),
            InlineValue::Nested(nested) => walk_inline(node, nested, runs),
            InlineValue::Link(url) => {
                walk_inline(node, style, runs);
                push_run(runs, &format!(" ({url})"), style);
            }
        }
    }
}

enum InlineValue {
    Text(String),
    Code(String),
    Nested(InlineStyle),
    Link(String),
}

fn push_run(runs: &mut Vec<InlineRun>, text: &str, style: InlineStyle) {
    if text.is_empty() {
        return;
    }

    // Merge into the previous run when the styling matches.
    if let Some(last) = runs.last_mut()
        && last.bold == style.bold
        && last.italic == style.italic
        && last.strike == style.strike
        && last.code == style.code
    {
        last.text.push_str(text);
        return;
    }

    runs.push(InlineRun {
        text: text.to_string(),
        bold: style.bold,
        italic: style.italic,
        strike: style.strike,
        code: style.code,
    });
}
