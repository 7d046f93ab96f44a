//! Ore vocabulary shared across editions.

use std::fmt;
use std::str::FromStr;

use super::ProfileError;

/// Ore type tag in the engine's uniform vocabulary.
///
/// Native generators speak material ids (`"diamond_ore"`,
/// `"minecraft:deepslate_gold_ore"`); the generation profile maps those
/// into this closed set before anything downstream sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OreKind {
    Diamond,
    Emerald,
    Gold,
    Iron,
    Coal,
    Redstone,
    Lapis,
    Copper,
}

impl OreKind {
    /// Every supported ore, in the order listings present them.
    pub const ALL: [OreKind; 8] = [
        OreKind::Diamond,
        OreKind::Emerald,
        OreKind::Gold,
        OreKind::Iron,
        OreKind::Coal,
        OreKind::Redstone,
        OreKind::Lapis,
        OreKind::Copper,
    ];

    /// Client-facing display name, e.g. `"Lapis Lazuli"`.
    pub fn name(&self) -> &'static str {
        match self {
            OreKind::Diamond => "Diamond",
            OreKind::Emerald => "Emerald",
            OreKind::Gold => "Gold",
            OreKind::Iron => "Iron",
            OreKind::Coal => "Coal",
            OreKind::Redstone => "Redstone",
            OreKind::Lapis => "Lapis Lazuli",
            OreKind::Copper => "Copper",
        }
    }

    /// Snake-case form used in cache keys and log fields.
    pub fn slug(&self) -> &'static str {
        match self {
            OreKind::Diamond => "diamond",
            OreKind::Emerald => "emerald",
            OreKind::Gold => "gold",
            OreKind::Iron => "iron",
            OreKind::Coal => "coal",
            OreKind::Redstone => "redstone",
            OreKind::Lapis => "lapis_lazuli",
            OreKind::Copper => "copper",
        }
    }
}

impl fmt::Display for OreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OreKind {
    type Err = ProfileError;

    /// Accepts the spellings clients use in ore filters: display names
    /// (`"Lapis Lazuli"`), snake case (`"lapis_lazuli"`) and bare stems
    /// (`"lapis"`), all case-insensitively.
    fn from_str(s: &str) -> Result<Self, ProfileError> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "_");
        match normalized.as_str() {
            "diamond" => Ok(OreKind::Diamond),
            "emerald" => Ok(OreKind::Emerald),
            "gold" => Ok(OreKind::Gold),
            "iron" => Ok(OreKind::Iron),
            "coal" => Ok(OreKind::Coal),
            "redstone" => Ok(OreKind::Redstone),
            "lapis" | "lapis_lazuli" => Ok(OreKind::Lapis),
            "copper" => Ok(OreKind::Copper),
            _ => Err(ProfileError::UnknownOre(s.to_string())),
        }
    }
}
