use super::*;
use crate::decode::family::{NibbleFamily, PlanarFamily};

fn room_block(map_order: ByteOrder, cell: u16) -> Vec<u8> {
    let back_at = 16u16;
    let program_at = back_at + (ROOM_COLS * ROOM_ROWS * 2) as u16;
    let mut data = vec![0u8, 0];
    for slot in [1u16, 2, 3, 4] {
        data.extend_from_slice(&slot.to_be_bytes());
    }
    data.extend_from_slice(&back_at.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&program_at.to_be_bytes());
    let mut map = vec![0u8; ROOM_COLS * ROOM_ROWS * 2];
    let word = match map_order {
        ByteOrder::Big => cell.to_be_bytes(),
        ByteOrder::Little => cell.to_le_bytes(),
    };
    map[..2].copy_from_slice(&word);
    data.extend_from_slice(&map);
    // bank 7 tiles 0 and 2, then bank 5 whole (last)
    data.extend_from_slice(&[0x00, 0x07, 0x01, 0x00, 0x02, 0x80, 0x05, 0xFF]);
    data
}

#[test]
fn layout_header_and_bank_program() {
    let room = RoomLayout::parse(room_block(ByteOrder::Little, 0x8801), ByteOrder::Little).unwrap();
    assert!(!room.scene);
    assert_eq!(room.palette_slots, [1, 2, 3, 4]);
    assert_eq!(
        room.bank_steps,
        vec![
            BankStep::Tiles {
                bank: 7,
                tiles: vec![0, 2]
            },
            BankStep::Whole { bank: 5 }
        ]
    );
    assert!(room.foreground.is_none());
    assert!(room.scene_stream().is_none());
    let back = room.background.as_ref().unwrap();
    assert_eq!(
        back.cell_at(0, 0),
        Some(TileCell {
            index: 1,
            xflip: true,
            yflip: false,
            mask: 0x80
        })
    );
    assert_eq!(back.cell_at(1, 0), None);
}

#[test]
fn nibble_tile_map_draws_flipped_tile() {
    let room = RoomLayout::parse(room_block(ByteOrder::Little, 0x8801), ByteOrder::Little).unwrap();
    let mut sheet = TileSheet::new();
    let mut chunk = vec![0u8; 32];
    chunk[..4].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);
    sheet.push(&BankStep::Whole { bank: 5 }, &chunk).unwrap();
    assert_eq!(sheet.len(), 2);

    let mut dst = Bitmap::filled(ROOM_W, ROOM_H, 0xEE);
    room.draw_maps(&mut dst, &sheet, &NibbleFamily).unwrap();
    assert_eq!(dst.row(0)[..8], [0x88, 0x87, 0x86, 0x85, 0x84, 0x83, 0x82, 0x81]);
    // background tiles are opaque, colour 0 included
    assert_eq!(dst.row(1)[0], 0x80);
    assert_eq!(dst.row(0)[8], 0xEE);
}

#[test]
fn planar_tile_adds_palette_base_and_flips_vertically() {
    // yflip, no priority bit
    let room = RoomLayout::parse(room_block(ByteOrder::Big, 0x1001), ByteOrder::Big).unwrap();
    let mut sheet = TileSheet::new();
    let mut tile = vec![0u8; 32];
    tile[0] = 0x80; // plane 0, row 0, leftmost pixel
    tile[8 + 7] = 0x01; // plane 1, row 7, rightmost pixel
    sheet.push(&BankStep::Whole { bank: 5 }, &tile).unwrap();

    let mut dst = Bitmap::filled(ROOM_W, ROOM_H, 0xEE);
    room.draw_maps(&mut dst, &sheet, &PlanarFamily).unwrap();
    assert_eq!(dst.row(7)[0], 1);
    assert_eq!(dst.row(0)[7], 2);
    assert_eq!(dst.row(0)[0], 0);
}

#[test]
fn scene_foreground_indices_are_rebased() {
    let cell = TileMap::cell(896 + 3 + 0x2000, MapLayer::Foreground, true).unwrap();
    assert_eq!(cell.map(|c| (c.index, c.mask)), Some((3, 0x10)));
    assert_eq!(TileMap::cell(896, MapLayer::Foreground, true).unwrap(), None);
    assert!(TileMap::cell(5, MapLayer::Foreground, true).is_err());
    let back = TileMap::cell(896 + 3, MapLayer::Background, true).unwrap();
    assert_eq!(back.map(|c| c.index), Some(899));
}

#[test]
fn tile_sheet_is_bounded() {
    let mut sheet = TileSheet::new();
    assert!(sheet.is_empty());
    let chunk = vec![0u8; (MAX_SHEET_TILES - 1) * 32];
    sheet.push(&BankStep::Whole { bank: 0 }, &chunk).unwrap();
    let err = sheet
        .push(&BankStep::Tiles { bank: 0, tiles: vec![0] }, &[0u8; 32])
        .unwrap_err();
    assert!(matches!(err, EngineError::AllocationFailure(_)));
    assert!(sheet.tile(MAX_SHEET_TILES as u16).is_err());
}

#[test]
fn packed_map_room_expands_four_bands() {
    let mut map = 6i32.to_le_bytes().to_vec();
    map.extend_from_slice(&[0, 0]);
    map.extend_from_slice(&[1, 2, 3, 4]);
    for band in 0..4u8 {
        let mut runs = Vec::new();
        for _ in 0..ROOM_W * MAP_BAND_H / 128 {
            runs.extend_from_slice(&[0x81, band + 10]);
        }
        map.extend_from_slice(&(runs.len() as u16).to_le_bytes());
        map.extend_from_slice(&runs);
    }
    let room = decode_map_room(&map, 1, 0).unwrap();
    assert_eq!(room.palette_slots, [1, 2, 3, 4]);
    assert_eq!(room.bitmap.row(0)[0], 10);
    assert_eq!(room.bitmap.row(ROOM_H - 1)[ROOM_W - 1], 13);
}

#[test]
fn raw_map_room_interleaves_columns() {
    let table = MAX_MAP_ROOMS * MAP_ENTRY_SIZE;
    let mut map = vec![0u8; table];
    map[60 * 6..60 * 6 + 4].copy_from_slice(&(-(table as i32)).to_le_bytes());
    map.extend_from_slice(&[1, 2, 3, 4]);
    let band = ROOM_W * MAP_BAND_H;
    for i in 0..4 {
        map.extend(std::iter::repeat_n(i as u8 + 1, band));
    }
    let room = decode_map_room(&map, 4, 60).unwrap();
    assert_eq!(room.palette_slots, [1, 2, 3, 5]);
    assert_eq!(room.bitmap.row(5)[..4], [1, 2, 3, 4]);

    assert!(matches!(
        decode_map_room(&map, 4, 0).unwrap_err(),
        EngineError::ResourceNotFound(_)
    ));
    assert!(decode_map_room(&map, 4, MAX_MAP_ROOMS).is_err());
}
