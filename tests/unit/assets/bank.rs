use super::*;
use crate::{
    assets::formats::{BANK_UNIT, BankSizeConvention},
    codec::{pack::pack_literals, unpack::BackwardLz},
    foundation::core::AssetFamily,
};

/// Table of `chunks.len()` raw entries followed by their payloads.
fn raw_table(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut table = Vec::new();
    let mut body = Vec::new();
    let header = chunks.len() * 6;
    for c in chunks {
        assert_eq!(c.len() % BANK_UNIT, 0);
        let units = (c.len() / BANK_UNIT) as i16;
        table.extend_from_slice(&((header + body.len()) as u32).to_be_bytes());
        table.extend_from_slice(&((-units) as u16).to_be_bytes());
        body.extend_from_slice(c);
    }
    table.extend(body);
    table
}

fn planar(table: &[u8]) -> BankTable<'_> {
    BankTable::new(table, AssetFamily::Planar, BankSizeConvention::Signed)
}

#[test]
fn same_id_resolves_to_same_offset() {
    let data = raw_table(&[vec![1; 32], vec![2; 64]]);
    let table = planar(&data);
    let mut cache = BankCache::new(0x200, 50);

    let a = cache.get_or_load(1, &table, &BackwardLz).unwrap();
    let b = cache.get_or_load(1, &table, &BackwardLz).unwrap();
    assert_eq!(a, b);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.data(a).unwrap(), &[2u8; 64][..]);
}

#[test]
fn overflow_resets_and_stales_old_handles() {
    let data = raw_table(&[vec![1; 64], vec![2; 64]]);
    let table = planar(&data);
    let mut cache = BankCache::new(96, 50);

    let first = cache.load_and_cache(0, &table, &BackwardLz).unwrap();
    let second = cache.load_and_cache(1, &table, &BackwardLz).unwrap();
    assert_eq!(second.offset(), 0);
    assert!(cache.lookup(0).is_none());
    assert!(matches!(
        cache.data(first).unwrap_err(),
        EngineError::StaleHandle(_)
    ));
    assert_eq!(cache.data(second).unwrap(), &[2u8; 64][..]);
}

#[test]
fn full_entry_table_resets() {
    let data = raw_table(&[vec![1; 32], vec![2; 32], vec![3; 32]]);
    let table = planar(&data);
    let mut cache = BankCache::new(0x1000, 2);
    cache.load_and_cache(0, &table, &BackwardLz).unwrap();
    cache.load_and_cache(1, &table, &BackwardLz).unwrap();
    let gen_before = cache.generation();
    cache.load_and_cache(2, &table, &BackwardLz).unwrap();
    assert_eq!(cache.generation(), gen_before + 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn oversized_chunk_is_an_allocation_failure() {
    let data = raw_table(&[vec![0; 128]]);
    let mut cache = BankCache::new(64, 50);
    let err = cache
        .load_and_cache(0, &planar(&data), &BackwardLz)
        .unwrap_err();
    assert!(matches!(err, EngineError::AllocationFailure(_)));
    assert!(cache.is_empty());
}

#[test]
fn packed_chunk_is_unpacked_in_place() {
    let chunk: Vec<u8> = (0..64u8).collect();
    let packed = pack_literals(&chunk);
    let mut data = Vec::new();
    let end = 6 + packed.len();
    data.extend_from_slice(&(end as u32).to_be_bytes());
    data.extend_from_slice(&2u16.to_be_bytes());
    data.extend(packed);

    let mut cache = BankCache::new(0x100, 50);
    let h = cache
        .load_and_cache(0, &planar(&data), &BackwardLz)
        .unwrap();
    assert_eq!(cache.data(h).unwrap(), &chunk[..]);
}

#[test]
fn packed_chunk_with_wrong_trailer_is_rejected() {
    let packed = pack_literals(&[7u8; 32]);
    let mut data = Vec::new();
    data.extend_from_slice(&((6 + packed.len()) as u32).to_be_bytes());
    data.extend_from_slice(&2u16.to_be_bytes());
    data.extend(packed);

    let mut cache = BankCache::new(0x100, 50);
    let err = cache
        .load_and_cache(0, &planar(&data), &BackwardLz)
        .unwrap_err();
    assert!(matches!(err, EngineError::FormatSizeMismatch(_)));
    assert!(cache.is_empty());
}
