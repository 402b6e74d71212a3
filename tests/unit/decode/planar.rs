use super::*;

#[test]
fn planar16_combines_planes_lsb_first() {
    let src = [0x80, 0x01, 0xC0, 0x00];
    let bmp = planar16(&src, 1, 1, 2).unwrap();
    assert_eq!(bmp.width, 16);
    assert_eq!(bmp.pixels[0], 3);
    assert_eq!(bmp.pixels[1], 2);
    assert_eq!(bmp.pixels[15], 1);
    assert!(bmp.pixels[2..15].iter().all(|&p| p == 0));
}

#[test]
fn planar16_is_deterministic_for_every_depth() {
    let src: Vec<u8> = (0..2 * 2 * 3 * 5).map(|i| (i * 37 + 11) as u8).collect();
    for depth in [3, 4, 5] {
        let a = planar16(&src, 2, 3, depth).unwrap();
        let b = planar16(&src, 2, 3, depth).unwrap();
        assert_eq!(a, b);
        assert!(a.pixels.iter().all(|&p| usize::from(p) < 1 << depth));
    }
}

#[test]
fn planar16_rejects_short_input() {
    assert!(planar16(&[0u8; 7], 1, 1, 4).is_err());
}

#[test]
fn planar8_and_planar24_rows() {
    // one row, plane 0 = 0x80, plane 3 = 0x01
    let bmp = planar8(&[0x80, 0, 0, 0x01], 1).unwrap();
    assert_eq!(bmp.pixels, vec![1, 0, 0, 0, 0, 0, 0, 8]);

    let mut row = vec![0u8; 12];
    row[2] = 0x80; // plane 1 word, leftmost pixel
    row[9] = 0x01; // plane 1 byte, last pixel
    let bmp = planar24(&row, 1).unwrap();
    assert_eq!(bmp.width, 24);
    assert_eq!(bmp.pixels[0], 2);
    assert_eq!(bmp.pixels[23], 2);
}

#[test]
fn nibbles_are_high_first() {
    assert_eq!(unpack_nibbles(&[0x12, 0xAB], 4).unwrap(), vec![1, 2, 10, 11]);
    assert_eq!(unpack_nibbles(&[0x12, 0xAB], 3).unwrap(), vec![1, 2, 10]);
}

#[test]
fn unknown_planar_cell_width_is_skipped() {
    assert_eq!(decode_planar_cell(&[0u8; 64], 40, 8).unwrap(), None);
    assert_eq!(
        decode_planar_cell(&[0u8; 64], 16, 8).unwrap().unwrap().width,
        16
    );
}

#[test]
fn planar_icon_walks_records() {
    // icon 0: 1x1 word, 1 row -> 4 + 8 bytes payload; icon 1: same, plane 2 set
    let mut icons = vec![0, 0, 0, 0, 0, 0];
    icons.extend_from_slice(&[0u8; 8]);
    icons.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    icons.extend_from_slice(&[0, 0, 0, 0, 0xFF, 0xFF, 0, 0]);
    let bmp = decode_planar_icon(&icons, 1).unwrap();
    assert_eq!((bmp.width, bmp.height), (16, 1));
    assert!(bmp.pixels.iter().all(|&p| p == 4));
}

#[test]
fn nibble_icon_uses_offset_table() {
    let mut icons = vec![0u8; 4];
    icons[2..4].copy_from_slice(&4u16.to_le_bytes());
    icons.extend_from_slice(&[0xFF, 0xFF]);
    icons.extend(std::iter::repeat_n(0x3C, 128));
    let bmp = decode_nibble_icon(&icons, 1).unwrap();
    assert_eq!(bmp.pixels[0], 3);
    assert_eq!(bmp.pixels[1], 12);
    assert_eq!(bmp.pixels.len(), 256);
}

#[test]
fn spm_frame_unpacks_three_planes() {
    // w = 1 word, h = 1 row; compact stream carrying planes 0x8000, 0x0000, 0x8000
    let src = [0, 0, 0x01, 0x00, 0x07, 0x05, 0x80, 0x00, 0x00, 0x00, 0x80, 0x00];
    let bmp = decode_spm(&src).unwrap();
    assert_eq!((bmp.width, bmp.height), (16, 1));
    assert_eq!(bmp.pixels[0], 5);
    assert_eq!(bmp.pixels[1], 0);
}

#[test]
fn character_frame_runs() {
    // nibbles: 1, F 7 0 (7 x4), F F 0 1 2 (2 x (0x01 + 4)), 3
    let data = [0x1F, 0x70, 0xFF, 0x01, 0x23];
    let mut src = (data.len() as u16).to_be_bytes().to_vec();
    src.extend_from_slice(&data);
    let out = decode_character_frame(&src).unwrap();
    let mut expected = vec![1];
    expected.extend([7; 4]);
    expected.extend([2; 5]);
    expected.push(3);
    assert_eq!(out, expected);
}

#[test]
fn character_frame_truncated_run_is_an_error() {
    let src = [0x00, 0x01, 0xFF];
    assert!(decode_character_frame(&src).is_err());
}

#[test]
fn menu_bitmap_planes_start_after_the_header() {
    let plane = MENU_W / 8 * MENU_H;
    let mut src = vec![0xFFu8; 6];
    src.resize(6 + plane * 5, 0);
    src[6] = 0x80; // plane 0, leftmost pixel
    src[6 + plane * 4 + 39] = 0x01; // plane 4, rightmost pixel of row 0
    let bmp = decode_menu_bitmap(&src).unwrap();
    assert_eq!((bmp.width, bmp.height), (MENU_W, MENU_H));
    assert_eq!(bmp.pixels[0], 1);
    assert_eq!(bmp.pixels[48], 0);
    assert_eq!(bmp.pixels[319], 16);
}

#[test]
fn menu_bitmap_without_room_for_the_header_is_rejected() {
    let src = vec![0u8; MENU_W / 8 * MENU_H * 5];
    assert!(matches!(
        decode_menu_bitmap(&src).unwrap_err(),
        EngineError::FormatSizeMismatch(_)
    ));
}
