//! Rasterizer: flattens paint commands into an RGBA frame.

use crate::rendering::paint::PaintCommand;
use crate::rendering::Frame;

const CHAR_CELL: u32 = 8;
// Glyph ink occupies a 6x7 sub-cell, leaving grid gaps between characters.
const GLYPH_W: u32 = 6;
const GLYPH_H: u32 = 7;

/// Rasterize commands onto a white background of the given size.
pub fn rasterize(commands: &[PaintCommand], width: u32, height: u32) -> Frame {
    let mut frame = Frame::blank(width, height);
    for command in commands {
        match command {
            PaintCommand::SolidRect {
                x,
                y,
                width: w,
                height: h,
                rgba,
            } => {
                fill_rect(&mut frame, *x, *y, *w, *h, *rgba);
            }
            PaintCommand::TextRun {
                x,
                y,
                text,
                scale,
                rgba,
            } => {
                draw_text(&mut frame, *x, *y, text, (*scale).max(1), *rgba);
            }
        }
    }
    frame
}

fn fill_rect(frame: &mut Frame, x: i32, y: i32, w: u32, h: u32, rgba: (u8, u8, u8, u8)) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = ((x + w as i32).max(0) as u32).min(frame.width);
    let y1 = ((y + h as i32).max(0) as u32).min(frame.height);
    for py in y0..y1 {
        for px in x0..x1 {
            let i = ((py * frame.width + px) * 4) as usize;
            frame.pixels[i] = rgba.0;
            frame.pixels[i + 1] = rgba.1;
            frame.pixels[i + 2] = rgba.2;
            frame.pixels[i + 3] = rgba.3;
        }
    }
}

/// Schematic glyphs: every non-space character becomes a filled cell on an
/// 8px grid. Enough to make layout visible in captures without a font stack.
fn draw_text(frame: &mut Frame, x: i32, y: i32, text: &str, scale: u32, rgba: (u8, u8, u8, u8)) {
    let mut line_y = y;
    for line in text.lines() {
        let mut cell_x = x;
        for ch in line.chars() {
            if !ch.is_whitespace() {
                fill_rect(
                    frame,
                    cell_x,
                    line_y,
                    GLYPH_W * scale,
                    GLYPH_H * scale,
                    rgba,
                );
            }
            cell_x += (CHAR_CELL * scale) as i32;
        }
        line_y += (CHAR_CELL * scale) as i32;
    }
}
