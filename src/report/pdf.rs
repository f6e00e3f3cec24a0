//! PDF rendering of composed report documents.
//!
//! Pure-Rust rendering via `genpdf`; pagination, table framing, and font
//! shaping belong to the library, this module only maps content blocks
//! onto it. Fonts are loaded from common system directories, Liberation
//! or DejaVu families.

use std::io::Cursor;

use genpdf::elements::{Break, FrameCellDecorator, Image, Paragraph, TableLayout};
use genpdf::style::{Color, Style};
use genpdf::{fonts, Alignment, Document, Element, SimplePageDecorator};

use crate::errors::{SentinelError, SentinelResult};

use super::{Block, ReportDocument, TextStyle};

/// Font directories searched on common platforms.
const FONT_DIRS: &[&str] = &[
    "./fonts",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/System/Library/Fonts",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
];

/// Font family base names tried in each directory.
const FONT_FAMILIES: &[&str] = &["LiberationSans", "DejaVuSans"];

fn find_font_family() -> SentinelResult<fonts::FontFamily<fonts::FontData>> {
    for dir in FONT_DIRS {
        if !std::path::Path::new(dir).exists() {
            continue;
        }
        for family in FONT_FAMILIES {
            if let Ok(loaded) = fonts::from_files(dir, family, None) {
                log::debug!("Loaded font family {family} from {dir}");
                return Ok(loaded);
            }
        }
    }
    Err(SentinelError::FontDiscovery {
        searched: FONT_DIRS.join(", "),
    })
}

/// Render a composed document to PDF bytes.
///
/// All-or-nothing: on any failure the buffer is dropped and only the
/// error escapes.
pub fn render(document: &ReportDocument) -> SentinelResult<Vec<u8>> {
    let family = find_font_family()?;
    let mut doc = Document::new(family);
    doc.set_title(document.title.clone());
    doc.set_minimal_conformance();
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    for block in &document.blocks {
        push_block(&mut doc, block)?;
    }

    doc.push(Break::new(1.0));
    doc.push(
        Paragraph::new("--- END OF REPORT ---").styled(
            Style::new()
                .italic()
                .with_font_size(9)
                .with_color(Color::Rgb(128, 128, 128)),
        ),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer)
        .map_err(|e| SentinelError::render(e))?;
    Ok(buffer)
}

fn push_block(doc: &mut Document, block: &Block) -> SentinelResult<()> {
    match block {
        Block::Heading { level, text } => {
            let size = match level {
                1 => 18,
                2 => 14,
                _ => 12,
            };
            if *level > 1 {
                doc.push(Break::new(1.0));
            }
            doc.push(Paragraph::new(text.clone()).styled(Style::new().bold().with_font_size(size)));
            doc.push(Break::new(0.3));
        }
        Block::Paragraph { text, style } => {
            let styled = match style {
                TextStyle::Normal => Style::new().with_font_size(11),
                TextStyle::Meta => Style::new()
                    .with_font_size(9)
                    .with_color(Color::Rgb(100, 100, 100)),
                TextStyle::Note => Style::new().italic().with_font_size(10),
            };
            doc.push(Paragraph::new(text.clone()).styled(styled));
            doc.push(Break::new(0.2));
        }
        Block::Table { headers, rows } => {
            if headers.is_empty() || rows.is_empty() {
                return Ok(());
            }
            let mut table = TableLayout::new(vec![1; headers.len()]);
            table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

            let mut header_row = table.row();
            for cell in headers {
                header_row.push_element(
                    Paragraph::new(cell.clone())
                        .styled(Style::new().bold().with_font_size(9))
                        .padded(1),
                );
            }
            header_row
                .push()
                .map_err(|e| SentinelError::render(e))?;

            for row in rows {
                let mut table_row = table.row();
                // Keep the grid rectangular even if a row runs short.
                for idx in 0..headers.len() {
                    let cell = row.get(idx).cloned().unwrap_or_default();
                    table_row.push_element(
                        Paragraph::new(cell)
                            .styled(Style::new().with_font_size(9))
                            .padded(1),
                    );
                }
                table_row.push().map_err(|e| SentinelError::render(e))?;
            }
            doc.push(table);
            doc.push(Break::new(0.5));
        }
        Block::Image { png, caption } => {
            let image = Image::from_reader(Cursor::new(png.as_slice()))
                .map_err(|e| SentinelError::render(e))?
                .with_alignment(Alignment::Center)
                .with_dpi(120.0);
            doc.push(image);
            doc.push(
                Paragraph::new(caption.clone())
                    .aligned(Alignment::Center)
                    .styled(
                        Style::new()
                            .with_font_size(9)
                            .with_color(Color::Rgb(100, 100, 100)),
                    ),
            );
            doc.push(Break::new(0.5));
        }
    }
    Ok(())
}
