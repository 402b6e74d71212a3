/// Asset category requested from [`crate::AssetStore::load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetKind {
    /// Bank table and packed bank chunks.
    Mbk,
    /// Demo bank table (signed chunk sizes).
    Bnq,
    /// Level palettes.
    Pal,
    /// Pre-rendered room map.
    Map,
    /// Packed room layouts.
    Lev,
    /// Masked scene tile data.
    Sgd,
    /// Animation data.
    Ani,
    /// Text bank.
    Tbn,
    /// Font glyphs.
    Fnt,
    /// Cutscene commands.
    Cmd,
    /// Cutscene polygons.
    Pol,
    /// Sprite cell table for level objects.
    Spc,
    /// Icon set; cumulative across loads.
    Icn,
    /// Packed collision table.
    Ct,
    /// Object-to-bank mapping.
    Rp,
    /// Object-to-bank mapping, demo variant.
    Rpc,
    /// Primary sprite data.
    Spr,
    /// Monster sprite data.
    Sprm,
    /// Packed sprite data.
    Spm,
    /// Sprite offsets into the primary sprite data.
    SpriteOffsets,
    /// Sprite offsets into the monster sprite data.
    MonsterSpriteOffsets,
    /// Object node table.
    Obj,
    /// Packed object node table.
    Obc,
    /// Initial entity table.
    Pge,
    /// Cutscene polygon and command pair.
    Cmp,
    /// Sampled sound table.
    Spl,
    /// Delta-coded sound table.
    Fib,
    /// Column-interleaved menu bitmap.
    MenuMap,
    /// Menu palette.
    MenuPal,
    /// Packed planar menu bitmap.
    MenuCmp,
    /// Cinematic string offsets.
    CineOffsets,
    /// Cinematic strings.
    CineText,
}

impl AssetKind {
    /// Filename extension appended to the logical name.
    pub fn suffix(self) -> &'static str {
        match self {
            AssetKind::Mbk => "MBK",
            AssetKind::Bnq => "BNQ",
            AssetKind::Pal | AssetKind::MenuPal => "PAL",
            AssetKind::Map | AssetKind::MenuMap => "MAP",
            AssetKind::Lev => "LEV",
            AssetKind::Sgd => "SGD",
            AssetKind::Ani => "ANI",
            AssetKind::Tbn => "TBN",
            AssetKind::Fnt => "FNT",
            AssetKind::Cmd => "CMD",
            AssetKind::Pol => "POL",
            AssetKind::Spc => "SPC",
            AssetKind::Icn => "ICN",
            AssetKind::Ct => "CT",
            AssetKind::Rp => "RP",
            AssetKind::Rpc => "RPC",
            AssetKind::Spr | AssetKind::Sprm => "SPR",
            AssetKind::Spm => "SPM",
            AssetKind::SpriteOffsets | AssetKind::MonsterSpriteOffsets => "OFF",
            AssetKind::Obj => "OBJ",
            AssetKind::Obc => "OBC",
            AssetKind::Pge => "PGE",
            AssetKind::Cmp | AssetKind::MenuCmp => "CMP",
            AssetKind::Spl => "SPL",
            AssetKind::Fib => "FIB",
            AssetKind::CineOffsets => "BIN",
            AssetKind::CineText => "TXT",
        }
    }

    /// Full filename for `name`, honouring an explicit extension override.
    pub fn file_name(self, name: &str, ext: Option<&str>) -> String {
        format!("{name}.{}", ext.unwrap_or(self.suffix()))
    }

    /// Whether the demo archive container can supply this category.
    pub fn archive_loadable(self) -> bool {
        matches!(
            self,
            AssetKind::Mbk
                | AssetKind::Bnq
                | AssetKind::Pge
                | AssetKind::Pal
                | AssetKind::Ct
                | AssetKind::Spc
                | AssetKind::Rp
                | AssetKind::Rpc
                | AssetKind::Icn
                | AssetKind::Fnt
                | AssetKind::Obj
                | AssetKind::Ani
                | AssetKind::Tbn
                | AssetKind::Cmd
                | AssetKind::Pol
                | AssetKind::SpriteOffsets
                | AssetKind::MonsterSpriteOffsets
                | AssetKind::MenuMap
                | AssetKind::MenuPal
                | AssetKind::CineOffsets
                | AssetKind::CineText
        )
    }

    /// Whether a level change discards buffers of this category.
    pub fn level_scoped(self) -> bool {
        matches!(
            self,
            AssetKind::Tbn
                | AssetKind::Mbk
                | AssetKind::Pal
                | AssetKind::Map
                | AssetKind::Lev
                | AssetKind::Sgd
                | AssetKind::Bnq
                | AssetKind::Ani
                | AssetKind::Obj
                | AssetKind::Obc
        )
    }
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
