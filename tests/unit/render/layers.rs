use super::*;

#[test]
fn resize_reallocates_every_layer_blank() {
    let mut layers = Layers::new(4, 2);
    layers.front.pixels.fill(7);
    layers.save_background();

    layers.resize(6, 3);
    assert_eq!((layers.width(), layers.height()), (6, 3));
    for layer in [&layers.front, &layers.back, &layers.temp, &layers.temp2] {
        assert_eq!((layer.width, layer.height), (6, 3));
        assert!(layer.pixels.iter().all(|&p| p == 0));
    }
}

#[test]
fn resize_to_the_same_size_keeps_content() {
    let mut layers = Layers::new(4, 2);
    layers.front.pixels.fill(7);
    layers.resize(4, 2);
    assert!(layers.front.pixels.iter().all(|&p| p == 7));
}

#[test]
fn put_front_clips_wider_sources() {
    let mut layers = Layers::new(2, 2);
    let src = Bitmap::new(3, 1, vec![1, 2, 3]);
    layers.put_front(&src);
    assert_eq!(layers.front.pixels, vec![1, 2, 0, 0]);
}
