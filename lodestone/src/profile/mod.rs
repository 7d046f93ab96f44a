//! Generation profiles and version dispatch
//!
//! A [`GenerationProfile`] is the per-edition/version constant set the
//! rest of the engine works from: chunk size, valid vertical range, and
//! the material-to-ore mapping for that generation era. The
//! [`ProfileRegistry`] resolves an (edition, version tag) pair to its
//! profile and is the primary input-validation gate: unknown pairs fail
//! here, before any chunk enumeration or native generator work starts.
//!
//! Profiles are built once and shared read-only across all queries.
//!
//! ```ignore
//! use lodestone::profile::{Edition, ProfileRegistry};
//!
//! let registry = ProfileRegistry::builtin();
//! let profile = registry.resolve(Edition::Java, Some("1.20"))?;
//! assert_eq!(profile.chunk_size, 16);
//! ```

mod ore;
mod version;

pub use ore::OreKind;
pub use version::{Edition, JavaVersion};

use std::ops::RangeInclusive;

use thiserror::Error;

/// Errors raised while resolving or parsing profile vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// No generation profile covers the requested edition/version pair.
    #[error("no generation profile for {edition} version {version:?}")]
    UnsupportedVersion { edition: Edition, version: String },

    /// The edition requires an explicit version tag.
    #[error("{edition} edition requires a version tag")]
    VersionRequired { edition: Edition },

    /// The edition tag itself is not recognized.
    #[error("unknown edition {0:?}")]
    UnknownEdition(String),

    /// An ore filter entry is not in the supported vocabulary.
    #[error("unknown ore type {0:?}")]
    UnknownOre(String),
}

// ============================================================================
// Material tables
// ============================================================================

// Bedrock's wrapped generator reports plain material ids; the mock wire
// format uses bare stems. Both spellings route to the same ore kind.
const BEDROCK_ORE_TABLE: &[(&str, OreKind)] = &[
    ("diamond_ore", OreKind::Diamond),
    ("diamond", OreKind::Diamond),
    ("emerald_ore", OreKind::Emerald),
    ("emerald", OreKind::Emerald),
    ("gold_ore", OreKind::Gold),
    ("gold", OreKind::Gold),
    ("iron_ore", OreKind::Iron),
    ("iron", OreKind::Iron),
    ("coal_ore", OreKind::Coal),
    ("coal", OreKind::Coal),
    ("redstone_ore", OreKind::Redstone),
    ("redstone", OreKind::Redstone),
    ("lapis_ore", OreKind::Lapis),
    ("lapis_lazuli", OreKind::Lapis),
    ("copper_ore", OreKind::Copper),
    ("copper", OreKind::Copper),
];

// Java 1.18+ worlds additionally carry the deepslate variants below y=0.
const JAVA_ORE_TABLE: &[(&str, OreKind)] = &[
    ("diamond_ore", OreKind::Diamond),
    ("diamond", OreKind::Diamond),
    ("deepslate_diamond_ore", OreKind::Diamond),
    ("emerald_ore", OreKind::Emerald),
    ("emerald", OreKind::Emerald),
    ("deepslate_emerald_ore", OreKind::Emerald),
    ("gold_ore", OreKind::Gold),
    ("gold", OreKind::Gold),
    ("deepslate_gold_ore", OreKind::Gold),
    ("iron_ore", OreKind::Iron),
    ("iron", OreKind::Iron),
    ("deepslate_iron_ore", OreKind::Iron),
    ("coal_ore", OreKind::Coal),
    ("coal", OreKind::Coal),
    ("deepslate_coal_ore", OreKind::Coal),
    ("redstone_ore", OreKind::Redstone),
    ("redstone", OreKind::Redstone),
    ("deepslate_redstone_ore", OreKind::Redstone),
    ("lapis_ore", OreKind::Lapis),
    ("lapis_lazuli", OreKind::Lapis),
    ("deepslate_lapis_ore", OreKind::Lapis),
    ("copper_ore", OreKind::Copper),
    ("copper", OreKind::Copper),
    ("deepslate_copper_ore", OreKind::Copper),
];

/// Chunk edge length shared by every currently supported profile.
const DEFAULT_CHUNK_SIZE: i32 = 16;

/// Classic Bedrock world height band served by the wrapped generator.
const BEDROCK_Y_RANGE: RangeInclusive<i32> = 0..=127;

/// Java 1.18+ world height band (deepslate floor to build limit).
const JAVA_Y_RANGE: RangeInclusive<i32> = -64..=320;

// ============================================================================
// Profiles
// ============================================================================

/// Constant set describing one edition/version generation era.
#[derive(Debug, Clone)]
pub struct GenerationProfile {
    pub edition: Edition,
    pub version: Option<JavaVersion>,
    /// Block-to-chunk divisor. 16 in every known edition, but kept as
    /// profile data so the coordinate mapper never hardcodes it.
    pub chunk_size: i32,
    /// Vertical band in which this era can place blocks at all.
    pub y_range: RangeInclusive<i32>,
    ore_table: &'static [(&'static str, OreKind)],
}

impl GenerationProfile {
    /// Maps a raw generator material id to the engine's ore vocabulary.
    ///
    /// Handles the namespacing and casing differences between backends
    /// (`"minecraft:deepslate_gold_ore"` and `"GOLD_ORE"` both resolve),
    /// returning `None` for materials that are not ores in this era.
    pub fn ore_for_material(&self, raw: &str) -> Option<OreKind> {
        let lowered = raw.trim().to_ascii_lowercase();
        let material = lowered.strip_prefix("minecraft:").unwrap_or(&lowered);

        self.ore_table
            .iter()
            .find(|(name, _)| *name == material)
            .map(|(_, kind)| *kind)
    }

    /// Whether `y` lies inside this era's valid vertical band.
    pub fn contains_y(&self, y: i32) -> bool {
        self.y_range.contains(&y)
    }

    /// The version tag clients use for this profile.
    pub fn version_tag(&self) -> &'static str {
        match self.version {
            Some(version) => version.tag(),
            None => self.edition.tag(),
        }
    }
}

/// Static registry of every supported (edition, version) pair.
///
/// Resolution runs before any generation work and fails fast with
/// [`ProfileError::UnsupportedVersion`] for pairs outside the registry,
/// so a bad version tag never costs a native generator invocation.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    bedrock: GenerationProfile,
    java: Vec<GenerationProfile>,
}

impl ProfileRegistry {
    /// Builds the registry of built-in profiles.
    pub fn builtin() -> Self {
        Self {
            bedrock: GenerationProfile {
                edition: Edition::Bedrock,
                version: None,
                chunk_size: DEFAULT_CHUNK_SIZE,
                y_range: BEDROCK_Y_RANGE,
                ore_table: BEDROCK_ORE_TABLE,
            },
            java: JavaVersion::ALL
                .iter()
                .map(|&version| GenerationProfile {
                    edition: Edition::Java,
                    version: Some(version),
                    chunk_size: DEFAULT_CHUNK_SIZE,
                    y_range: JAVA_Y_RANGE,
                    ore_table: JAVA_ORE_TABLE,
                })
                .collect(),
        }
    }

    /// Resolves an (edition, version tag) pair to its generation profile.
    ///
    /// # Arguments
    ///
    /// * `edition` - Game edition of the query
    /// * `version` - Raw version tag; required for Java, ignored for
    ///   Bedrock (which has a single fixed profile)
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::VersionRequired`] for Java queries without
    /// a tag and [`ProfileError::UnsupportedVersion`] for tags outside
    /// the allow-list.
    pub fn resolve(
        &self,
        edition: Edition,
        version: Option<&str>,
    ) -> Result<&GenerationProfile, ProfileError> {
        match edition {
            Edition::Bedrock => Ok(&self.bedrock),
            Edition::Java => {
                let tag = version.ok_or(ProfileError::VersionRequired { edition })?;
                let parsed: JavaVersion = tag.parse()?;

                self.java
                    .iter()
                    .find(|profile| profile.version == Some(parsed))
                    .ok_or_else(|| ProfileError::UnsupportedVersion {
                        edition,
                        version: tag.to_string(),
                    })
            }
        }
    }

    /// The single Bedrock profile.
    pub fn bedrock_profile(&self) -> &GenerationProfile {
        &self.bedrock
    }

    /// Java profiles, oldest release first.
    pub fn java_profiles(&self) -> &[GenerationProfile] {
        &self.java
    }

    /// Every ore kind the engine can report.
    pub fn ore_kinds(&self) -> &'static [OreKind] {
        &OreKind::ALL
    }

    /// Every supported Java release, oldest first.
    pub fn java_versions(&self) -> &'static [JavaVersion] {
        &JavaVersion::ALL
    }

    /// Version tags for all registered profiles, Bedrock first.
    pub fn version_tags(&self) -> Vec<&'static str> {
        let mut tags = vec![self.bedrock.version_tag()];
        tags.extend(self.java.iter().map(|profile| profile.version_tag()));
        tags
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
