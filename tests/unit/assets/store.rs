use super::*;
use crate::{codec::pack::pack_literals, io::fs::MemoryFileSystem};

fn store(family: AssetFamily, fs: MemoryFileSystem) -> AssetStore {
    let mut s = AssetStore::new(EngineConfig::for_family(family), fs);
    s.init().unwrap();
    s
}

struct StaticArchive(Vec<(&'static str, Vec<u8>)>);

impl Archive for StaticArchive {
    fn load_entry(&self, name: &str) -> EngineResult<Option<Vec<u8>>> {
        Ok(self
            .0
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, b)| b.clone()))
    }
}

#[test]
fn missing_asset_is_not_found() {
    let mut s = store(AssetFamily::Nibble, MemoryFileSystem::new());
    let err = s.load("LEVEL1", AssetKind::Pal, None).unwrap_err();
    assert!(matches!(err, EngineError::ResourceNotFound(ref n) if n == "LEVEL1.PAL"));
}

#[test]
fn extension_override_and_replacement() {
    let fs = MemoryFileSystem::new()
        .with("LEVEL1.PAL", vec![1u8, 2])
        .with("LEVEL1.ALT", vec![3u8]);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("LEVEL1", AssetKind::Pal, None).unwrap();
    assert_eq!(s.buffer(AssetKind::Pal), Some(&[1u8, 2][..]));
    s.load("LEVEL1", AssetKind::Pal, Some("ALT")).unwrap();
    assert_eq!(s.buffer(AssetKind::Pal), Some(&[3u8][..]));
}

#[test]
fn archive_fallback_and_unsupported_category() {
    let mut s = store(AssetFamily::Nibble, MemoryFileSystem::new());
    s.set_archive(Box::new(StaticArchive(vec![
        ("DEMO.TBN", vec![5u8; 4]),
        ("DEMO.SPL", vec![0u8; 4]),
    ])));
    s.load("DEMO", AssetKind::Tbn, None).unwrap();
    assert_eq!(s.buffer(AssetKind::Tbn), Some(&[5u8; 4][..]));

    let err = s.load("DEMO", AssetKind::Spl, None).unwrap_err();
    assert!(matches!(err, EngineError::UnsupportedCategory(_)));
}

#[test]
fn icons_accumulate() {
    let fs = MemoryFileSystem::new()
        .with("A.ICN", vec![1u8, 2])
        .with("B.ICN", vec![3u8]);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("A", AssetKind::Icn, None).unwrap();
    s.load("B", AssetKind::Icn, None).unwrap();
    assert_eq!(s.icons(), &[1, 2, 3]);
}

#[test]
fn collision_table_must_unpack_to_fixed_size() {
    let good = pack_literals(&vec![0x11u8; COLLISION_TABLE_SIZE]);
    let bad = pack_literals(&[0u8; 16]);
    let fs = MemoryFileSystem::new()
        .with("GOOD.CT", good)
        .with("BAD.CT", bad);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("GOOD", AssetKind::Ct, None).unwrap();
    assert_eq!(s.collision_table().unwrap().len(), COLLISION_TABLE_SIZE);
    let err = s.load("BAD", AssetKind::Ct, None).unwrap_err();
    assert!(matches!(err, EngineError::FormatSizeMismatch(_)));
    assert_eq!(s.collision_table().unwrap()[0], 0x11);
}

#[test]
fn corrupt_packed_asset_is_a_checksum_failure() {
    let mut packed = pack_literals(b"scene tiles here");
    packed[2] ^= 0x40;
    let fs = MemoryFileSystem::new().with("LEVEL1.SGD", packed);
    let mut s = store(AssetFamily::Planar, fs);
    let err = s.load("LEVEL1", AssetKind::Sgd, None).unwrap_err();
    assert!(matches!(err, EngineError::ChecksumFailure(_)));
    assert!(s.buffer(AssetKind::Sgd).is_none());
}

#[test]
fn nibble_sgd_clears_entry_count() {
    let fs = MemoryFileSystem::new().with("LEVEL1.SGD", vec![9u8, 1, 2]);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("LEVEL1", AssetKind::Sgd, None).unwrap();
    assert_eq!(s.buffer(AssetKind::Sgd), Some(&[0u8, 1, 2][..]));
}

#[test]
fn sprite_offsets_resolve_into_sprite_data() {
    let mut spr = vec![0u8; 12];
    spr.extend_from_slice(&[10, 20, 30, 40]);
    let mut off = Vec::new();
    off.extend_from_slice(&2u16.to_le_bytes());
    off.extend_from_slice(&1u32.to_le_bytes());
    off.extend_from_slice(&0xFFFFu16.to_le_bytes());
    let fs = MemoryFileSystem::new()
        .with("PERSO.SPR", spr)
        .with("PERSO.OFF", off);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("PERSO", AssetKind::Spr, None).unwrap();
    s.load("PERSO", AssetKind::SpriteOffsets, None).unwrap();

    let r = s.sprite_ref(2).unwrap();
    assert_eq!(s.sprite_data(r).unwrap(), &[20, 30, 40]);
    assert_eq!(s.sprite_header_byte(r, 1).unwrap(), 10);
    assert!(s.sprite_ref(3).is_none());
}

#[test]
fn cutscene_pair_replaces_pol_and_cmd() {
    let cmd = b"COMMANDS".to_vec();
    let packed_cmd = pack_literals(&cmd);
    let mut data = Vec::new();
    data.extend_from_slice(&(-2i32).to_be_bytes());
    data.extend_from_slice(b"PO");
    data.extend_from_slice(&(packed_cmd.len() as u32).to_be_bytes());
    data.extend(packed_cmd);
    let fs = MemoryFileSystem::new().with("INTRO.CMP", data);
    let mut s = store(AssetFamily::Planar, fs);
    s.load("INTRO", AssetKind::Cmp, None).unwrap();
    assert_eq!(s.buffer(AssetKind::Pol), Some(&b"PO"[..]));
    assert_eq!(s.buffer(AssetKind::Cmd), Some(&cmd[..]));
}

#[test]
fn clear_level_keeps_global_buffers() {
    let fs = MemoryFileSystem::new()
        .with("L.TBN", vec![1u8])
        .with("GLOBAL.FNT", vec![2u8]);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("L", AssetKind::Tbn, None).unwrap();
    s.load("GLOBAL", AssetKind::Fnt, None).unwrap();
    let generation = s.bank_cache().generation();
    s.clear_level();
    assert!(s.buffer(AssetKind::Tbn).is_none());
    assert!(s.buffer(AssetKind::Fnt).is_some());
    assert_eq!(s.bank_cache().generation(), generation + 1);
}

#[test]
fn demo_detection() {
    let planar = store(
        AssetFamily::Planar,
        MemoryFileSystem::new().with("demo.lev", vec![0u8]),
    );
    assert!(planar.is_demo());
    let nibble = store(AssetFamily::Nibble, MemoryFileSystem::new());
    assert!(!nibble.is_demo());
}

#[test]
fn bank_helpers_use_the_selected_table() {
    let mut mbk = Vec::new();
    mbk.extend_from_slice(&6u32.to_be_bytes());
    mbk.extend_from_slice(&0x8001u16.to_be_bytes());
    mbk.extend_from_slice(&[0xAB; 32]);
    let fs = MemoryFileSystem::new().with("L.MBK", mbk);
    let mut s = store(AssetFamily::Nibble, fs);
    s.load("L", AssetKind::Mbk, None).unwrap();
    assert_eq!(s.bank_size(0).unwrap(), 32);

    let h = s.bank_handle(0).unwrap();
    assert_eq!(s.bank_data(h).unwrap(), &[0xAB; 32][..]);

    s.set_bank_source(BankSource::Bnq);
    assert!(matches!(
        s.bank_handle(0).unwrap_err(),
        EngineError::ResourceNotFound(_)
    ));
}

#[test]
fn level_room_unpacks_up_to_its_end_offset() {
    let room = vec![7u8; 40];
    let packed = pack_literals(&room);
    let mut lev = ((4 + packed.len()) as u32).to_be_bytes().to_vec();
    lev.extend_from_slice(&packed);
    let fs = MemoryFileSystem::new().with("LEVEL1.LEV", lev);
    let mut s = store(AssetFamily::Planar, fs);
    s.load("LEVEL1", AssetKind::Lev, None).unwrap();
    assert_eq!(s.level_room(0).unwrap(), room);
}
