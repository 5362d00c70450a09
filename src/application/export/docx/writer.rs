//! Assembles the block model into an OOXML document via docx-rs.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat, Numbering,
    NumberingId, Paragraph, Run, RunFonts, SpecialIndentType, Start, Style, StyleType, Table,
    TableCell, TableRow,
};

use crate::{
    application::export::ExportError,
    domain::document::{DocumentTitle, StyleSettings},
};

use super::blocks::{Block, InlineRun, ListBlock};

const BULLET_NUMBERING_ID: usize = 1;
const DECIMAL_NUMBERING_ID: usize = 2;
const MONOSPACE_FONT: &str = "Courier New";
// Word numbering definitions cap out at nine levels.
const MAX_LIST_DEPTH: usize = 8;

/// Build a complete DOCX payload. The configured sizes are treated as points,
/// so the same numbers drive both the stylesheet and the document styles.
pub(crate) fn write_document(
    title: &DocumentTitle,
    settings: &StyleSettings,
    blocks: &[Block],
) -> Result<Vec<u8>, ExportError> {
    let mut docx = base_document(settings);

    docx = docx.add_paragraph(
        Paragraph::new()
            .style("Title")
            .add_run(Run::new().add_text(title.as_str())),
    );
    for block in blocks {
        docx = append_block(docx, block, settings, 0);
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|err| ExportError::Docx {
            message: err.to_string(),
        })?;
    Ok(buffer.into_inner())
}

fn base_document(settings: &StyleSettings) -> Docx {
    let mut bullets = AbstractNumbering::new(BULLET_NUMBERING_ID);
    let mut decimals = AbstractNumbering::new(DECIMAL_NUMBERING_ID);
    for depth in 0..=MAX_LIST_DEPTH {
        bullets = bullets.add_level(list_level(depth, "bullet", "\u{2022}".to_string()));
        decimals = decimals.add_level(list_level(depth, "decimal", format!("%{}.", depth + 1)));
    }

    Docx::new()
        .add_style(heading_style("Title", "Title", settings.h1_size + 4))
        .add_style(heading_style("Heading1", "Heading 1", settings.h1_size))
        .add_style(heading_style("Heading2", "Heading 2", settings.h2_size))
        .add_style(heading_style("Heading3", "Heading 3", settings.h3_size))
        .add_style(heading_style("Heading4", "Heading 4", settings.p_size + 2))
        .add_style(heading_style("Heading5", "Heading 5", settings.p_size + 1))
        .add_style(heading_style("Heading6", "Heading 6", settings.p_size))
        .add_abstract_numbering(bullets)
        .add_abstract_numbering(decimals)
        .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
        .add_numbering(Numbering::new(DECIMAL_NUMBERING_ID, DECIMAL_NUMBERING_ID))
}

fn heading_style(id: &str, name: &str, size_points: u32) -> Style {
    Style::new(id, StyleType::Paragraph)
        .name(name)
        .size(half_points(size_points))
        .bold()
}

fn list_level(depth: usize, format: &str, text: String) -> Level {
    Level::new(
        depth,
        Start::new(1),
        NumberFormat::new(format),
        LevelText::new(text),
        LevelJc::new("left"),
    )
    .indent(
        Some(720 * (depth as i32 + 1)),
        Some(SpecialIndentType::Hanging(320)),
        None,
        None,
    )
}

fn append_block(docx: Docx, block: &Block, settings: &StyleSettings, quote_depth: usize) -> Docx {
    match block {
        Block::Heading { level, runs } => {
            let style = format!("Heading{}", (*level).clamp(1, 6));
            docx.add_paragraph(styled_paragraph(runs, settings).style(&style))
        }
        Block::Paragraph(runs) => {
            let mut paragraph = styled_paragraph(runs, settings);
            if quote_depth > 0 {
                paragraph = quote_indent(paragraph, quote_depth);
            }
            docx.add_paragraph(paragraph)
        }
        Block::List(list) => append_list(docx, list, settings, 0),
        Block::CodeBlock { literal, .. } => append_code_block(docx, literal, settings),
        Block::Quote(inner) => {
            let mut docx = docx;
            for block in inner {
                docx = append_block(docx, block, settings, quote_depth + 1);
            }
            docx
        }
        Block::Table { rows, has_header } => {
            docx.add_table(build_table(rows, *has_header, settings))
        }
        Block::Rule => docx.add_paragraph(Paragraph::new()),
    }
}

fn append_list(docx: Docx, list: &ListBlock, settings: &StyleSettings, depth: usize) -> Docx {
    let numbering_id = if list.ordered {
        DECIMAL_NUMBERING_ID
    } else {
        BULLET_NUMBERING_ID
    };
    let level = depth.min(MAX_LIST_DEPTH);

    let mut docx = docx;
    for item in &list.items {
        for block in item {
            docx = match block {
                Block::Paragraph(runs) => docx.add_paragraph(
                    styled_paragraph(runs, settings)
                        .numbering(NumberingId::new(numbering_id), IndentLevel::new(level)),
                ),
                Block::List(nested) => append_list(docx, nested, settings, depth + 1),
                other => append_block(docx, other, settings, 0),
            };
        }
    }
    docx
}

fn append_code_block(docx: Docx, literal: &str, settings: &StyleSettings) -> Docx {
    let mut docx = docx;
    for line in literal.trim_end_matches('\n').split('\n') {
        let run = Run::new()
            .add_text(line)
            .fonts(RunFonts::new().ascii(MONOSPACE_FONT))
            .size(half_points(settings.p_size));
        docx = docx.add_paragraph(Paragraph::new().add_run(run));
    }
    docx
}

fn build_table(rows: &[Vec<Vec<InlineRun>>], has_header: bool, settings: &StyleSettings) -> Table {
    let table_rows: Vec<TableRow> = rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            let header = has_header && index == 0;
            let table_cells: Vec<TableCell> = cells
                .iter()
                .map(|runs| {
                    let mut paragraph = Paragraph::new();
                    for run in runs {
                        let mut styled = run.clone();
                        styled.bold |= header;
                        paragraph = paragraph.add_run(build_run(&styled, settings));
                    }
                    TableCell::new().add_paragraph(paragraph)
                })
                .collect();
            TableRow::new(table_cells)
        })
        .collect();

    Table::new(table_rows)
}

fn styled_paragraph(runs: &[InlineRun], settings: &StyleSettings) -> Paragraph {
    let mut paragraph = Paragraph::new();
    for run in runs {
        paragraph = paragraph.add_run(build_run(run, settings));
    }
    paragraph
}

fn quote_indent(paragraph: Paragraph, depth: usize) -> Paragraph {
    paragraph.indent(Some(720 * depth as i32), None, None, None)
}

fn build_run(run: &InlineRun, settings: &StyleSettings) -> Run {
    let mut built = Run::new()
        .add_text(run.text.as_str())
        .size(half_points(settings.p_size));
    if run.bold {
        built = built.bold();
    }
    if run.italic {
        built = built.italic();
    }
    if run.strike {
        built = built.strike();
    }
    if run.code {
        built = built.fonts(RunFonts::new().ascii(MONOSPACE_FONT));
    }
    built
}

fn half_points(size_points: u32) -> usize {
    (size_points as usize) * 2
}
