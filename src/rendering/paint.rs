//! Paint command set produced by layout and consumed by the rasterizer

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        rgba: (u8, u8, u8, u8),
    },
    /// Schematic text: each glyph is drawn as a filled cell on an 8px-per-char
    /// grid, multiplied by `scale`. Newlines break lines.
    TextRun {
        x: i32,
        y: i32,
        text: String,
        scale: u32,
        rgba: (u8, u8, u8, u8),
    },
}
