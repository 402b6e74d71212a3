use super::*;

#[test]
fn defaults_match_historical_layout() {
    let cfg = EngineConfig::default();
    assert_eq!((cfg.screen_width, cfg.screen_height), (256, 224));
    assert_eq!(cfg.bank_arena_size, 0x7000);
    assert_eq!(cfg.max_bank_entries, 50);
    cfg.validate().unwrap();
}

#[test]
fn json_fills_missing_fields_with_defaults() {
    let cfg = EngineConfig::from_json_str(r#"{ "family": "Planar", "bank_arena_size": 4096 }"#)
        .unwrap();
    assert_eq!(cfg.family, AssetFamily::Planar);
    assert_eq!(cfg.bank_arena_size, 4096);
    assert_eq!(cfg.screen_width, GAMESCREEN_W);
    assert_eq!(cfg.archive_name, "DEMO_UK.ABA");
}

#[test]
fn rejects_unaligned_block_size() {
    let cfg = EngineConfig {
        block_width: 7,
        ..EngineConfig::default()
    };
    assert!(cfg.validate().is_err());
    assert!(EngineConfig::from_json_str(r#"{ "text_palette": [1, 2] }"#).is_err());
}

#[test]
fn slot_0xf_palette_needs_sixteen_triples() {
    assert!(EngineConfig::from_json_str(r#"{ "slot_0xf_palette": [0, 0, 0] }"#).is_err());
    assert_eq!(EngineConfig::default().slot_0xf_palette.len(), 48);
}
