//! Block layout over a parsed document: title then paragraphs, stacked
//! vertically with fixed margins. Character cells are 8px wide per unit of
//! scale, which the word-wrap estimate below relies on.

use scraper::{Html, Selector};

use crate::rendering::paint::PaintCommand;
use crate::Viewport;

const CHAR_CELL: u32 = 8;
const PAGE_MARGIN: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Paragraph,
}

/// A laid-out text block ready to paint
#[derive(Debug, Clone)]
pub struct Block {
    pub rect: Rect,
    pub text: String,
    pub kind: BlockKind,
    pub scale: u32,
}

/// Compute a basic block layout for the document at the given viewport.
/// The title (first `<h1>`, else `<title>`) renders at scale 2, paragraphs
/// at scale 1. Blocks past the bottom of the viewport are dropped.
pub fn layout_document(document: &Html, viewport: Viewport) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut y = PAGE_MARGIN;
    let content_width = viewport.width.saturating_sub(PAGE_MARGIN * 2);

    let h1_sel = Selector::parse("h1").unwrap();
    let title_text = if let Some(h1) = document.select(&h1_sel).next() {
        h1.text().collect::<String>()
    } else {
        let title_sel = Selector::parse("title").unwrap();
        document
            .select(&title_sel)
            .next()
            .map(|n| n.text().collect::<String>())
            .unwrap_or_default()
    };

    if !title_text.trim().is_empty() {
        let scale = 2;
        let height = CHAR_CELL * scale + PAGE_MARGIN * 2;
        blocks.push(Block {
            rect: Rect {
                x: PAGE_MARGIN as i32,
                y: y as i32,
                width: content_width,
                height,
            },
            text: title_text.trim().to_string(),
            kind: BlockKind::Title,
            scale,
        });
        y += height + PAGE_MARGIN;
    }

    let p_sel = Selector::parse("p").unwrap();
    for p in document.select(&p_sel) {
        let raw = p.text().collect::<String>();
        let text = wrap_text(&raw, content_width);
        if text.is_empty() {
            continue;
        }
        let lines = text.lines().count().max(1) as u32;
        let height = lines * CHAR_CELL + PAGE_MARGIN;
        blocks.push(Block {
            rect: Rect {
                x: PAGE_MARGIN as i32,
                y: y as i32,
                width: content_width,
                height,
            },
            text,
            kind: BlockKind::Paragraph,
            scale: 1,
        });
        y += height + PAGE_MARGIN / 2;
        if y >= viewport.height {
            break;
        }
    }

    blocks
}

/// Lower text blocks into paint commands: a tinted backing rect for the
/// title, then a text run per block.
pub fn paint_blocks(blocks: &[Block]) -> Vec<PaintCommand> {
    let mut commands = Vec::new();
    for block in blocks {
        if block.kind == BlockKind::Title {
            commands.push(PaintCommand::SolidRect {
                x: block.rect.x,
                y: block.rect.y,
                width: block.rect.width,
                height: block.rect.height,
                rgba: (0xe8, 0xec, 0xf2, 0xff),
            });
        }
        let rgba = match block.kind {
            BlockKind::Title => (0x20, 0x28, 0x38, 0xff),
            BlockKind::Paragraph => (0x40, 0x40, 0x40, 0xff),
        };
        commands.push(PaintCommand::TextRun {
            x: block.rect.x + PAGE_MARGIN as i32 / 2,
            y: block.rect.y + PAGE_MARGIN as i32 / 2,
            text: block.text.clone(),
            scale: block.scale,
            rgba,
        });
    }
    commands
}

fn wrap_text(raw: &str, content_width: u32) -> String {
    let chars_per_line = (content_width / CHAR_CELL).max(1) as usize;
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in raw.split_whitespace() {
        if !cur.is_empty() && cur.len() + word.len() + 1 > chars_per_line {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines.join("\n")
}
