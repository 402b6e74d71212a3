//! Builds a one-room nibble data set in memory, decodes the room and writes it as a PNG.
//!
//! `cargo run --example render_room -- [out.png]`

use std::path::PathBuf;

use pixbank::{
    AssetFamily, AssetKind, AssetStore, CaptureSink, EngineConfig, MemoryFileSystem, Video,
    codec::pack::pack_literals,
    decode::room::{ROOM_COLS, ROOM_ROWS},
};

/// Room block: header, a checkerboard background map and a one-bank tile program.
fn room_block() -> Vec<u8> {
    let back_at = 16u16;
    let program_at = back_at + (ROOM_COLS * ROOM_ROWS * 2) as u16;
    let mut data = vec![0u8, 0];
    for slot in [0u16, 1, 0, 0] {
        data.extend_from_slice(&slot.to_be_bytes());
    }
    data.extend_from_slice(&back_at.to_be_bytes());
    data.extend_from_slice(&0u16.to_be_bytes());
    data.extend_from_slice(&program_at.to_be_bytes());
    for row in 0..ROOM_ROWS {
        for col in 0..ROOM_COLS {
            let tile: u16 = if (row + col) % 2 == 0 { 1 } else { 2 | 1 << 11 };
            data.extend_from_slice(&tile.to_le_bytes());
        }
    }
    // bank 1, whole chunk, last step
    data.extend_from_slice(&[0x80, 0x01, 0xFF]);
    data
}

fn level_files() -> MemoryFileSystem {
    let packed = pack_literals(&room_block());
    let mut lev = ((4 + packed.len()) as u32).to_be_bytes().to_vec();
    lev.extend(packed);

    let mut mbk = vec![0u8; 12];
    mbk[6..10].copy_from_slice(&12u32.to_be_bytes());
    mbk[10..12].copy_from_slice(&0x8002u16.to_be_bytes());
    mbk.extend(std::iter::repeat_n(0x11u8, 32));
    mbk.extend((0..32u8).map(|i| ((i % 4) << 4) | (15 - i % 4)));

    let mut pal = Vec::new();
    for i in 0..32u16 {
        let level = i % 16;
        let color = if i < 16 { level << 8 | level } else { level << 4 };
        pal.extend_from_slice(&color.to_be_bytes());
    }

    MemoryFileSystem::new()
        .with("DEMO1.LEV", lev)
        .with("DEMO1.MBK", mbk)
        .with("DEMO1.PAL", pal)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("target/render_room.png"));

    let config = EngineConfig::for_family(AssetFamily::Nibble);
    let mut store = AssetStore::new(config.clone(), level_files());
    store.init()?;
    for kind in [AssetKind::Lev, AssetKind::Mbk, AssetKind::Pal] {
        store.load("DEMO1", kind, None)?;
    }

    let sink = CaptureSink::new(
        config.screen_width as usize,
        config.screen_height as usize,
    );
    let mut video = Video::new(&config, sink)?;
    video.decode_level_room(&mut store, 0, 0)?;
    video.set_level_palettes(&store, 0)?;
    let report = video.present_frame()?;
    tracing::info!(rects = report.rects.len(), "presented room");

    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    video.sink().save_png(&out)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}
