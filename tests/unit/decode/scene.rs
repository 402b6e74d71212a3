use super::*;

fn stream(entries: &[(u16, i16, i16)]) -> Vec<u8> {
    let mut out = (entries.len() as u16).to_be_bytes().to_vec();
    for &(tile, x, y) in entries {
        out.extend_from_slice(&tile.to_be_bytes());
        out.extend_from_slice(&x.to_be_bytes());
        out.extend_from_slice(&y.to_be_bytes());
    }
    out
}

fn stored_nibble_sgd() -> Vec<u8> {
    // one 16x1 tile: mask 0xC000 opens both pixels of byte 0, colour byte 0xAB
    let tile = [1, 0, 0, 2, 0xC0, 0x00, 0xAB, 0, 0, 0, 0, 0, 0, 0];
    let mut sgd = (-4i32).to_be_bytes().to_vec();
    sgd.extend_from_slice(&(tile.len() as u16).to_be_bytes());
    sgd.extend_from_slice(&tile);
    sgd
}

#[test]
fn nibble_scene_stamps_masked_pixels_with_clipping() {
    let sgd = stored_nibble_sgd();
    let scene = SceneProgram::decode(
        &stream(&[(0x8000, 3, 1), (0xFFFF, -1, 0)]),
        &sgd,
        AssetFamily::Nibble,
    )
    .unwrap();
    assert_eq!(scene.tiles().len(), 1);
    assert_eq!(scene.placements()[1].tile, 0);

    let mut dst = Bitmap::filled(8, 4, 0xEE);
    scene.stamp(&mut dst);
    assert_eq!(&dst.row(1)[3..5], &[0xA, 0xB]);
    assert_eq!(dst.row(0)[0], 0xB);
    assert_eq!(dst.row(0)[1], 0xEE);
    assert_eq!(dst.pixels.iter().filter(|&&p| p != 0xEE).count(), 3);
}

#[test]
fn planar_scene_decodes_compact_tile() {
    let tile = [
        1, 0, 0, 2, // header: 1 word, 1 row, plane size 2
        0x80, 0x01, // mask
        0x80, 0x00, 0x00, 0x01, 0x80, 0x00, 0x00, 0x00, // planes 0..3
    ];
    let mut sgd = 4i32.to_be_bytes().to_vec();
    sgd.extend_from_slice(&[0x00, 0x0F, 0x0D]);
    sgd.extend_from_slice(&tile);

    let scene = SceneProgram::decode(&stream(&[(0, 0, 0)]), &sgd, AssetFamily::Planar).unwrap();
    let mut dst = Bitmap::filled(16, 1, 0xEE);
    scene.stamp(&mut dst);
    assert_eq!(dst.pixels[0], 5);
    assert_eq!(dst.pixels[15], 2);
    assert!(dst.pixels[1..15].iter().all(|&p| p == 0xEE));
}

#[test]
fn repeat_before_any_tile_is_an_error() {
    let sgd = stored_nibble_sgd();
    assert!(SceneProgram::decode(&stream(&[(0xFFFF, 0, 0)]), &sgd, AssetFamily::Nibble).is_err());
}

#[test]
fn nibble_tile_with_inconsistent_plane_size_is_rejected() {
    let tile = [1, 0, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let mut sgd = (-4i32).to_be_bytes().to_vec();
    sgd.extend_from_slice(&(tile.len() as u16).to_be_bytes());
    sgd.extend_from_slice(&tile);
    assert!(matches!(
        SceneProgram::decode(&stream(&[(0, 0, 0)]), &sgd, AssetFamily::Nibble).unwrap_err(),
        EngineError::FormatSizeMismatch(_)
    ));
}
