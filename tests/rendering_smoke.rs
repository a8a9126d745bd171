#![cfg(feature = "http")]

//! Smoke and determinism checks for the schematic rendering pipeline.

use scraper::Html;
use sha2::{Digest, Sha256};

use webshot::rendering::{layout, raster};
use webshot::Viewport;

const FIXTURE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Smoke</title></head>
<body>
<h1>Heading</h1>
<p>Some paragraph text that should wrap across more than one line at narrow widths.</p>
</body>
</html>"#;

fn frame_digest(width: u32, height: u32) -> String {
    let doc = Html::parse_document(FIXTURE);
    let viewport = Viewport { width, height };
    let blocks = layout::layout_document(&doc, viewport);
    let commands = layout::paint_blocks(&blocks);
    let frame = raster::rasterize(&commands, width, height);
    hex::encode(Sha256::digest(&frame.pixels))
}

#[test]
fn smoke_rasterize_fixture() {
    let doc = Html::parse_document(FIXTURE);
    let viewport = Viewport {
        width: 256,
        height: 128,
    };
    let blocks = layout::layout_document(&doc, viewport);
    let commands = layout::paint_blocks(&blocks);
    let frame = raster::rasterize(&commands, 256, 128);
    assert_eq!(frame.width, 256);
    assert_eq!(frame.height, 128);
    assert!(frame
        .pixels
        .chunks_exact(4)
        .any(|p| p != [0xff, 0xff, 0xff, 0xff].as_slice()));
}

#[test]
fn rasterization_is_deterministic() {
    assert_eq!(frame_digest(320, 240), frame_digest(320, 240));
}

#[test]
fn viewport_changes_the_layout() {
    assert_ne!(frame_digest(320, 240), frame_digest(640, 240));
}
