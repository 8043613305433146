//! Integration tests against a real headless Chrome

#![cfg(feature = "cdp")]

use slideshot::cdp::CdpRenderer;
use slideshot::{ConvertConfig, Converter, Renderer, Selection};
use std::fs;

const DECK: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Test Deck</title>
<style>
  body { margin: 0; background: #fff; }
  .slide { display: none; width: 640px; padding: 20px; }
  .slide.tall { height: 1600px; }
</style>
</head>
<body>
<div class="slide" id="first"><h1>Hello from slide one</h1></div>
<div class="slide tall" id="second"><h1>Slide two is taller</h1></div>
</body>
</html>"#;

fn config(root: &std::path::Path) -> ConvertConfig {
    ConvertConfig {
        output_dir: root.join("output"),
        source_dir: root.join("source"),
        settle_ms: 100,
        transition_ms: 50,
        ..Default::default()
    }
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_convert_sections() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.html");
    fs::write(&input, DECK).unwrap();

    let converter = Converter::new(config(dir.path()));
    let prepared = converter.prepare(&input, Selection::AcceptAll).unwrap();

    let mut renderer = CdpRenderer::launch(&converter.config, prepared.viewport(&converter.config))
        .expect("Failed to launch Chrome");
    let conversion = converter.render(&prepared, &mut renderer).unwrap();
    renderer.close().unwrap();

    assert_eq!(conversion.files.len(), 2);
    let canvas = conversion.canvas.expect("two images are normalized");
    // Taller than the 1080px window, so it is only whole if the capture
    // reaches past the viewport.
    assert!(canvas.1 >= 1600, "tall slide was clipped: {:?}", canvas);
    for file in &conversion.files {
        assert_eq!(image::image_dimensions(file).unwrap(), canvas);
    }
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_convert_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.html");
    fs::write(&input, "<html><body><p>No slides here</p></body></html>").unwrap();

    let converter = Converter::new(config(dir.path()));
    let prepared = converter.prepare(&input, Selection::NoBreaks).unwrap();

    let mut renderer = CdpRenderer::launch(&converter.config, prepared.viewport(&converter.config))
        .expect("Failed to launch Chrome");
    let result = converter.render(&prepared, &mut renderer);
    renderer.close().unwrap();

    let conversion = result.unwrap();
    assert_eq!(conversion.files, vec![dir.path().join("output").join("plain_01.png")]);
    assert!(conversion.canvas.is_none());
    let (w, _) = image::image_dimensions(&conversion.files[0]).unwrap();
    assert!(w >= 1);
}
