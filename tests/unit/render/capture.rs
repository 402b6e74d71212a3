use super::*;

#[test]
fn copies_clipped_rects_and_resolves_palette() {
    let mut sink = CaptureSink::new(4, 2);
    let layer = Bitmap::new(4, 2, vec![1, 1, 2, 2, 3, 3, 3, 3]);
    sink.set_palette_entry(2, Rgb::new(10, 20, 30)).unwrap();
    sink.copy_rect(Rect::new(2, 0, 8, 1), &layer).unwrap();
    assert_eq!(sink.screen().pixels, vec![0, 0, 2, 2, 0, 0, 0, 0]);

    let img = sink.to_rgba();
    assert_eq!(img.dimensions(), (4, 2));
    assert_eq!(img.get_pixel(3, 0).0, [10, 20, 30, 255]);
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
}

#[test]
fn writes_a_png() {
    let dir = std::env::temp_dir().join(format!("pixbank-capture-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("frame.png");
    let mut sink = CaptureSink::new(8, 8);
    sink.present(2).unwrap();
    sink.save_png(&path).unwrap();
    let back = image::open(&path).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (8, 8));
    assert_eq!((sink.presents(), sink.last_shake()), (1, 2));
    std::fs::remove_dir_all(&dir).unwrap();
}
