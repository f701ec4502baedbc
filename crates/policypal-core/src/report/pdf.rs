//! Minimal paginated PDF output for [`ReportDocument`]s.
//!
//! Uses the standard Helvetica fonts so no font data has to be embedded.
//! Text is encoded as WinAnsi; characters outside Latin-1 are replaced.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use super::ReportDocument;
use crate::error::PolicyError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 72;
const TITLE_SIZE: i64 = 16;
const HEADING_SIZE: i64 = 12;
const BODY_SIZE: i64 = 10;
const LEADING: i64 = 14;
/// Conservative line width for 10pt Helvetica across a 468pt text column.
const WRAP_CHARS: usize = 90;

#[derive(Debug, Clone, Copy)]
enum Style {
    Title,
    Heading,
    Body,
}

impl Style {
    fn font(self) -> &'static str {
        match self {
            Self::Title | Self::Heading => "F2",
            Self::Body => "F1",
        }
    }

    fn size(self) -> i64 {
        match self {
            Self::Title => TITLE_SIZE,
            Self::Heading => HEADING_SIZE,
            Self::Body => BODY_SIZE,
        }
    }
}

/// A line of text or vertical gap, in reading order.
#[derive(Debug, Clone)]
enum Line {
    Text(Style, String),
    Gap,
}

/// Render a report as a Letter-sized PDF.
pub fn render_pdf(report: &ReportDocument) -> Result<Vec<u8>, PolicyError> {
    let lines = layout(report);
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for page in &pages {
        let page_id = add_page(&mut doc, pages_id, page)?;
        kids.push(Object::Reference(page_id));
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|err| PolicyError::Render(format!("failed to serialize PDF: {err}")))?;
    debug!(pages = count, bytes = buffer.len(), "pdf report rendered");
    Ok(buffer)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[Line]) -> Result<ObjectId, PolicyError> {
    let mut operations = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN;
    for line in lines {
        match line {
            Line::Gap => y -= LEADING / 2,
            Line::Text(style, text) => {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new(
                    "Tf",
                    vec![style.font().into(), style.size().into()],
                ));
                operations.push(Operation::new("Td", vec![MARGIN.into(), y.into()]));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(text), StringFormat::Literal)],
                ));
                operations.push(Operation::new("ET", vec![]));
                y -= if matches!(style, Style::Title) {
                    LEADING * 2
                } else {
                    LEADING
                };
            }
        }
    }
    let content = Content { operations }
        .encode()
        .map_err(|err| PolicyError::Render(format!("failed to encode page content: {err}")))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

fn layout(report: &ReportDocument) -> Vec<Line> {
    let mut lines = vec![Line::Text(Style::Title, report.title.clone())];
    for meta in &report.metadata {
        for wrapped in wrap(&format!("{}: {}", meta.label, meta.value), WRAP_CHARS) {
            lines.push(Line::Text(Style::Body, wrapped));
        }
    }
    for section in &report.sections {
        lines.push(Line::Gap);
        if let Some(heading) = &section.heading {
            lines.push(Line::Text(Style::Heading, format!("{heading}:")));
        }
        for paragraph in section.body.lines() {
            if paragraph.trim().is_empty() {
                lines.push(Line::Gap);
                continue;
            }
            for wrapped in wrap(paragraph, WRAP_CHARS) {
                lines.push(Line::Text(Style::Body, wrapped));
            }
        }
    }
    lines
}

fn paginate(lines: &[Line]) -> Vec<Vec<Line>> {
    let usable = PAGE_HEIGHT - 2 * MARGIN;
    let mut pages = vec![Vec::new()];
    let mut used = 0;
    for line in lines {
        let height = match line {
            Line::Gap => LEADING / 2,
            Line::Text(Style::Title, _) => LEADING * 2,
            Line::Text(..) => LEADING,
        };
        if used + height > usable {
            pages.push(Vec::new());
            used = 0;
            if matches!(line, Line::Gap) {
                continue;
            }
        }
        used += height;
        if let Some(page) = pages.last_mut() {
            page.push(line.clone());
        }
    }
    pages
}

/// Greedy word wrap on character counts; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let extra = if current_len == 0 { word.len() } else { word.len() + 1 };
        if current_len + extra > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if current_len > 0 || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '₹' => out.extend_from_slice(b"Rs."),
            '\u{2018}' | '\u{2019}' => out.push(b'\''),
            '\u{201c}' | '\u{201d}' => out.push(b'"'),
            '\u{2013}' | '\u{2014}' => out.push(b'-'),
            '\t' => out.push(b' '),
            c if (c as u32) >= 0x20 && (c as u32) <= 0xff && !(0x7f..0xa0).contains(&(c as u32)) => {
                out.push(c as u32 as u8)
            }
            _ => out.push(b'?'),
        }
    }
    out
}
