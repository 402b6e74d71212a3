use crate::foundation::{
    core::AssetFamily,
    error::{EngineError, EngineResult},
};

/// Default game screen width in pixels.
pub const GAMESCREEN_W: u32 = 256;
/// Default game screen height in pixels.
pub const GAMESCREEN_H: u32 = 224;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Engine configuration injected at construction.
///
/// Holds the format constants and the static lookup tables the asset loaders and the compositor
/// need. Can be built programmatically or deserialized from JSON.
pub struct EngineConfig {
    /// Asset family of the data set.
    pub family: AssetFamily,
    /// Framebuffer layer width in pixels.
    pub screen_width: u32,
    /// Framebuffer layer height in pixels.
    pub screen_height: u32,
    /// Dirty-tracking block width in pixels.
    pub block_width: u32,
    /// Dirty-tracking block height in pixels.
    pub block_height: u32,
    /// Capacity of the bank arena in bytes.
    pub bank_arena_size: usize,
    /// Maximum number of bank chunks cached at once.
    pub max_bank_entries: usize,
    /// Filename of the archive container opened at init.
    pub archive_name: String,
    /// Sixteen little-endian packed colours used for the text palette slot.
    pub text_palette: Vec<u8>,
    /// Hero palettes (two variants, sixteen little-endian packed colours each).
    pub hero_palettes: [Vec<u8>; 2],
    /// Sixteen RGB triples loaded into palette entries 0xF0..0xFF.
    pub slot_0xf_palette: Vec<u8>,
    /// Sprite offsets for packed monster sprite sets, one per sprite slot.
    pub packed_sprite_offsets: Vec<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            family: AssetFamily::default(),
            screen_width: GAMESCREEN_W,
            screen_height: GAMESCREEN_H,
            block_width: 8,
            block_height: 8,
            bank_arena_size: 0x7000,
            max_bank_entries: 50,
            archive_name: "DEMO_UK.ABA".to_string(),
            text_palette: vec![0; 32],
            hero_palettes: [vec![0; 32], vec![0; 32]],
            slot_0xf_palette: vec![0; 48],
            packed_sprite_offsets: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Default configuration for `family`.
    pub fn for_family(family: AssetFamily) -> Self {
        Self {
            family,
            ..Self::default()
        }
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> EngineResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| EngineError::Other(anyhow::anyhow!("parse engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check internal consistency of the numeric settings.
    pub fn validate(&self) -> EngineResult<()> {
        if self.block_width == 0 || self.block_height == 0 {
            return Err(EngineError::Other(anyhow::anyhow!(
                "dirty block dimensions must be > 0"
            )));
        }
        if self.screen_width % self.block_width != 0 || self.screen_height % self.block_height != 0
        {
            return Err(EngineError::Other(anyhow::anyhow!(
                "screen {}x{} is not a multiple of the {}x{} dirty block",
                self.screen_width,
                self.screen_height,
                self.block_width,
                self.block_height
            )));
        }
        if self.max_bank_entries == 0 {
            return Err(EngineError::Other(anyhow::anyhow!(
                "max_bank_entries must be > 0"
            )));
        }
        for (name, pal) in [
            ("text_palette", &self.text_palette),
            ("hero_palettes[0]", &self.hero_palettes[0]),
            ("hero_palettes[1]", &self.hero_palettes[1]),
        ] {
            if pal.len() != 32 {
                return Err(EngineError::Other(anyhow::anyhow!(
                    "{name} must hold 16 packed colours (32 bytes), got {}",
                    pal.len()
                )));
            }
        }
        if self.slot_0xf_palette.len() != 48 {
            return Err(EngineError::Other(anyhow::anyhow!(
                "slot_0xf_palette must hold 16 RGB triples (48 bytes), got {}",
                self.slot_0xf_palette.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
