use super::*;
use crate::codec::{pack::pack_literals, unpack::BackwardLz};

fn entry(name: &str, offset: u32, packed: u32, size: u32, tag: u32) -> Vec<u8> {
    let mut out = vec![0u8; 14];
    out[..name.len()].copy_from_slice(name.as_bytes());
    for v in [offset, packed, size, tag] {
        out.extend_from_slice(&v.to_be_bytes());
    }
    out
}

fn build(payloads: &[(&str, Vec<u8>, usize)]) -> Vec<u8> {
    let header = 4 + payloads.len() * ENTRY_SIZE;
    let mut dir = Vec::new();
    dir.extend_from_slice(&(payloads.len() as u16).to_be_bytes());
    dir.extend_from_slice(&(ENTRY_SIZE as u16).to_be_bytes());
    let mut body = Vec::new();
    for (name, bytes, size) in payloads {
        let off = (header + body.len()) as u32;
        dir.extend(entry(name, off, bytes.len() as u32, *size as u32, ENTRY_TAG));
        body.extend_from_slice(bytes);
    }
    dir.extend(body);
    dir
}

#[test]
fn stored_and_packed_entries_load() {
    let plain = b"PALETTE-DATA".to_vec();
    let text: Vec<u8> = (0..40u8).collect();
    let image = build(&[
        ("DEMO.PAL", plain.clone(), plain.len()),
        ("DEMO.TBN", pack_literals(&text), text.len()),
    ]);

    let aba = AbaArchive::parse(image, Arc::new(BackwardLz)).unwrap();
    assert_eq!(aba.entries().len(), 2);
    assert!(aba.entries()[1].is_packed());
    assert_eq!(aba.load_entry("DEMO.PAL").unwrap(), Some(plain));
    assert_eq!(aba.load_entry("demo.pal").unwrap(), None);
    assert_eq!(aba.load_entry("DEMO.TBN").unwrap(), Some(text));
    assert_eq!(aba.load_entry("DEMO.MAP").unwrap(), None);
}

#[test]
fn wrong_entry_size_is_rejected() {
    let mut image = build(&[("A", vec![1], 1)]);
    image[3] = 28;
    let err = AbaArchive::parse(image, Arc::new(BackwardLz)).unwrap_err();
    assert!(matches!(err, EngineError::FormatSizeMismatch(_)));
}

#[test]
fn corrupt_packed_entry_is_a_checksum_failure() {
    let mut packed = pack_literals(&[9u8; 20]);
    packed[0] ^= 0x01;
    let image = build(&[("X.BIN", packed, 20)]);
    let aba = AbaArchive::parse(image, Arc::new(BackwardLz)).unwrap();
    let err = aba.load_entry("X.BIN").unwrap_err();
    assert!(matches!(err, EngineError::ChecksumFailure(_)));
}

#[test]
fn declared_size_must_match_the_packed_trailer() {
    let packed = pack_literals(&[5u8; 32]);
    let image = build(&[("LEVEL1.CT", packed, 64)]);
    let aba = AbaArchive::parse(image, Arc::new(BackwardLz)).unwrap();
    let err = aba.load_entry("LEVEL1.CT").unwrap_err();
    assert!(matches!(err, EngineError::FormatSizeMismatch(_)));
}

#[test]
fn oversized_entry_is_refused_before_allocating() {
    let mut packed = pack_literals(&[5u8; 8]);
    let at = packed.len() - 4;
    packed[at..].copy_from_slice(&u32::MAX.to_be_bytes());
    let image = build(&[("HUGE.BIN", packed, u32::MAX as usize)]);
    let aba = AbaArchive::parse(image, Arc::new(BackwardLz)).unwrap();
    let err = aba.load_entry("HUGE.BIN").unwrap_err();
    assert!(matches!(err, EngineError::AllocationFailure(_)));
}
