use inkstamp::{Canvas, Rgba, StampError, Text};

#[test]
fn missing_source_is_source_not_found_with_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.png");
    let err = Canvas::from_path(dir.path().join("nope.png"))
        .render_to_file(&target)
        .unwrap_err();
    assert!(matches!(err, StampError::SourceNotFound(_)));
    assert!(!target.exists(), "no partial output may be written");
}

#[test]
fn unsupported_source_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("pic.bmp");
    std::fs::write(&src, b"pretend image").unwrap();
    let err = Canvas::from_path(&src).format(inkstamp::ImageKind::Png).render().unwrap_err();
    assert!(matches!(err, StampError::UnsupportedFormat(e) if e == "bmp"));
}

#[test]
fn font_not_found_is_detected_per_entry() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.png");
    // A perfectly valid first entry does not save the render: the second
    // entry's missing font fails the whole call and nothing is emitted.
    let err = Canvas::new()
        .dimensions(60, 60)
        .background(Rgba::rgb(255, 255, 255))
        .text(Text::from("fine").position(2, 2).color(0, 0, 0, 255))
        .text(Text::from("broken").font(20.0, dir.path().join("ghost.ttf")))
        .render_to_file(&target)
        .unwrap_err();
    assert!(matches!(err, StampError::FontNotFound(_)));
    assert!(!target.exists());
}

#[test]
fn empty_font_path_falls_back_to_bitmap_font() {
    // An empty path means "no font file", not "font file named ''".
    let bytes = Canvas::new()
        .dimensions(80, 30)
        .background(Rgba::rgb(255, 255, 255))
        .text(Text::from("ok").font(3.0, "").color(0, 0, 0, 255))
        .render()
        .unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert!(img.pixels().any(|p| p.0 == [0, 0, 0, 255]));
}

#[test]
fn unsupported_save_extension_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.webp");
    let err = Canvas::new().render_to_file(&target).unwrap_err();
    assert!(matches!(err, StampError::UnsupportedFormat(e) if e == "webp"));
    assert!(!target.exists());
}

#[test]
fn empty_text_content_renders_cleanly() {
    let bytes = Canvas::new()
        .dimensions(30, 30)
        .background(Rgba::rgb(1, 2, 3))
        .text(Text::from(""))
        .render()
        .unwrap();
    let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert!(img.pixels().all(|p| p.0 == [1, 2, 3, 255]));
}
