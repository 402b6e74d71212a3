use super::*;

#[test]
fn decoder_matches_family() {
    for family in [AssetFamily::Planar, AssetFamily::Nibble] {
        assert_eq!(family_decoder(family).family(), family);
        assert_eq!(family_decoder(family).tile_map_order(), family.byte_order());
    }
    assert_eq!(PlanarFamily.object_layout().count_at, 8);
    assert_eq!(NibbleFamily.object_layout().frames_at, 6);
}

#[test]
fn planar_inventory_placeholders() {
    let cursor = PlanarFamily.decode_icon(&[], 76).unwrap();
    assert_eq!(cursor.pixels.iter().filter(|&&p| p == 1).count(), 10);
    assert_eq!(cursor.row(0)[..4], [1, 1, 1, 0]);
    assert_eq!(cursor.row(15)[13..], [1, 1, 1]);

    let filler = PlanarFamily.decode_icon(&[], 40).unwrap();
    assert!(filler.pixels.iter().all(|&p| p == 5));
}

#[test]
fn planar_small_icon_is_padded_to_16x16() {
    // 1 word wide, 2 rows, plane 0 set on the first row
    let mut icons = vec![1, 0, 0, 0, 0, 0];
    icons.extend_from_slice(&[0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let icon = PlanarFamily.decode_icon(&icons, 0).unwrap();
    assert_eq!((icon.width, icon.height), (16, 16));
    assert!(icon.row(0).iter().all(|&p| p == 1));
    assert!(icon.row(2).iter().all(|&p| p == 0));
}

#[test]
fn glyph_pixel_rules() {
    assert_eq!(NibbleFamily.glyph_pixel(0, 0x33), None);
    assert_eq!(NibbleFamily.glyph_pixel(15, 0x33), Some(0x33));
    assert_eq!(NibbleFamily.glyph_pixel(4, 0x33), Some(0xE4));
    assert_eq!(PlanarFamily.glyph_pixel(4, 0x33), Some(0x33));
    assert_eq!(PlanarFamily.glyph_pixel(0, 0x33), None);
}

#[test]
fn nibble_glyph_indexes_from_space() {
    let mut font = vec![0u8; 64];
    font[32] = 0xF1;
    let g = NibbleFamily.glyph(&font, b'!').unwrap();
    assert_eq!(g.row(0)[..2], [15, 1]);
    assert!(NibbleFamily.glyph(&font, b'"').is_err());
}

#[test]
fn nibble_cells_always_decode() {
    let cell = NibbleFamily.decode_cell(&[0xAB; 8], 4, 4).unwrap().unwrap();
    assert_eq!(cell.pixels[..2], [0xA, 0xB]);
}
