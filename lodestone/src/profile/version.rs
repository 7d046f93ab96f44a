//! Edition and version tags accepted by the resolver.

use std::fmt;
use std::str::FromStr;

use super::ProfileError;

/// Game edition a query targets.
///
/// The two editions generate worlds with structurally different
/// algorithms and are served by different native backends, so the
/// edition picks the whole generation profile family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Edition {
    Bedrock,
    Java,
}

impl Edition {
    /// Canonical lowercase tag, as used in version listings and cache keys.
    pub fn tag(&self) -> &'static str {
        match self {
            Edition::Bedrock => "bedrock",
            Edition::Java => "java",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Edition {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, ProfileError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bedrock" => Ok(Edition::Bedrock),
            "java" => Ok(Edition::Java),
            _ => Err(ProfileError::UnknownEdition(s.to_string())),
        }
    }
}

/// Java release era with its own ore generation profile.
///
/// All supported releases follow the post-1.18 world layout (deepslate
/// band, -64 floor). Earlier releases would need their own profiles and
/// are rejected by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JavaVersion {
    V1_18,
    V1_19,
    V1_20,
    V1_21,
}

impl JavaVersion {
    /// Every supported release, oldest first.
    pub const ALL: [JavaVersion; 4] = [
        JavaVersion::V1_18,
        JavaVersion::V1_19,
        JavaVersion::V1_20,
        JavaVersion::V1_21,
    ];

    /// The version tag as clients send it, e.g. `"1.18"`.
    pub fn tag(&self) -> &'static str {
        match self {
            JavaVersion::V1_18 => "1.18",
            JavaVersion::V1_19 => "1.19",
            JavaVersion::V1_20 => "1.20",
            JavaVersion::V1_21 => "1.21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for JavaVersion {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, ProfileError> {
        match s.trim() {
            "1.18" => Ok(JavaVersion::V1_18),
            "1.19" => Ok(JavaVersion::V1_19),
            "1.20" => Ok(JavaVersion::V1_20),
            "1.21" => Ok(JavaVersion::V1_21),
            _ => Err(ProfileError::UnsupportedVersion {
                edition: Edition::Java,
                version: s.to_string(),
            }),
        }
    }
}
