//! Query types and cache-key normalization.
//!
//! An [`OreQuery`] carries everything one search needs: world seed,
//! edition/version, origin block column, radius, and an optional ore
//! filter. Queries are immutable once built; [`OreQuery::key`] derives
//! the canonical [`QueryKey`] the cache indexes on, folding equivalent
//! queries (a Bedrock query with a stray version tag, a filter given in
//! a different order) onto one key.

use std::collections::BTreeSet;
use std::fmt;

use crate::profile::{Edition, OreKind};

/// Radius applied when a query does not set one, in chunk rings.
pub const DEFAULT_RADIUS: u32 = 1;

/// One ore search request.
///
/// # Example
///
/// ```
/// use lodestone::profile::{Edition, OreKind};
/// use lodestone::query::OreQuery;
///
/// let query = OreQuery::new(123456789, Edition::Bedrock, 100, 200)
///     .with_radius(2)
///     .with_ore_filter([OreKind::Gold, OreKind::Diamond]);
///
/// assert_eq!(query.radius(), 2);
/// assert_eq!(
///     query.key().to_string(),
///     "123456789_100_200_bedrock_2_diamond+gold"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OreQuery {
    seed: i64,
    edition: Edition,
    version: Option<String>,
    origin_x: i32,
    origin_z: i32,
    radius: u32,
    ore_filter: Option<BTreeSet<OreKind>>,
}

impl OreQuery {
    /// Creates a query with the default radius and no ore filter.
    ///
    /// # Arguments
    ///
    /// * `seed` - World seed
    /// * `edition` - Game edition to search
    /// * `origin_x` - Block X coordinate of the search origin
    /// * `origin_z` - Block Z coordinate of the search origin
    pub fn new(seed: i64, edition: Edition, origin_x: i32, origin_z: i32) -> Self {
        Self {
            seed,
            edition,
            version: None,
            origin_x,
            origin_z,
            radius: DEFAULT_RADIUS,
            ore_filter: None,
        }
    }

    /// Sets the version tag. Required for Java queries; ignored for
    /// Bedrock, which has a single fixed profile.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the search radius in chunk rings around the origin chunk.
    ///
    /// A radius of 0 limits the search to the origin chunk alone.
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    /// Restricts results to the given ore kinds.
    ///
    /// An empty iterator means no restriction, same as never calling
    /// this at all.
    pub fn with_ore_filter(mut self, ores: impl IntoIterator<Item = OreKind>) -> Self {
        let set: BTreeSet<OreKind> = ores.into_iter().collect();
        self.ore_filter = if set.is_empty() { None } else { Some(set) };
        self
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    /// Raw version tag, if one was supplied.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Block coordinates of the search origin.
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_z)
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn ore_filter(&self) -> Option<&BTreeSet<OreKind>> {
        self.ore_filter.as_ref()
    }

    /// Whether `kind` passes this query's ore filter.
    pub fn matches_filter(&self, kind: OreKind) -> bool {
        match &self.ore_filter {
            Some(set) => set.contains(&kind),
            None => true,
        }
    }

    /// Derives the canonical cache key for this query.
    ///
    /// Normalization rules: Bedrock queries drop any version tag (the
    /// profile is fixed), version tags are trimmed, and the ore filter
    /// is already canonical as an ordered set with "empty" folded to
    /// "absent" at construction.
    pub fn key(&self) -> QueryKey {
        let version = match self.edition {
            Edition::Bedrock => None,
            Edition::Java => self
                .version
                .as_deref()
                .map(str::trim)
                .map(str::to_string),
        };

        QueryKey {
            seed: self.seed,
            edition: self.edition,
            version,
            origin_x: self.origin_x,
            origin_z: self.origin_z,
            radius: self.radius,
            ore_filter: self.ore_filter.clone(),
        }
    }
}

/// Canonical cache key derived from a normalized query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    seed: i64,
    edition: Edition,
    version: Option<String>,
    origin_x: i32,
    origin_z: i32,
    radius: u32,
    ore_filter: Option<BTreeSet<OreKind>>,
}

impl QueryKey {
    /// Version segment used when rendering the key.
    fn version_segment(&self) -> &str {
        match &self.version {
            Some(tag) => tag,
            None => self.edition.tag(),
        }
    }
}

impl fmt::Display for QueryKey {
    /// Renders `seed_x_z_version_radius`, with a `+`-joined filter
    /// suffix when the query restricts ore kinds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}_{}_{}",
            self.seed,
            self.origin_x,
            self.origin_z,
            self.version_segment(),
            self.radius
        )?;

        if let Some(filter) = &self.ore_filter {
            let slugs: Vec<_> = filter.iter().map(|kind| kind.slug()).collect();
            write!(f, "_{}", slugs.join("+"))?;
        }

        Ok(())
    }
}
