//! Search command - resolve ore deposits around a coordinate.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::debug;

use lodestone::engine::OreEngineBuilder;
use lodestone::profile::{Edition, OreKind};
use lodestone::query::OreQuery;
use lodestone::response::SearchResponse;

use crate::error::CliError;

/// Game edition selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum EditionArg {
    /// Bedrock Edition (single fixed generation profile)
    Bedrock,
    /// Java Edition (requires --version)
    Java,
}

impl From<EditionArg> for Edition {
    fn from(arg: EditionArg) -> Self {
        match arg {
            EditionArg::Bedrock => Edition::Bedrock,
            EditionArg::Java => Edition::Java,
        }
    }
}

/// Arguments for the search command.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// World seed to search under
    #[arg(allow_negative_numbers = true)]
    pub seed: i64,

    /// Block X coordinate of the search origin
    #[arg(allow_negative_numbers = true)]
    pub x: i32,

    /// Block Z coordinate of the search origin
    #[arg(allow_negative_numbers = true)]
    pub z: i32,

    /// Game edition to search
    #[arg(long, value_enum, default_value_t = EditionArg::Bedrock)]
    pub edition: EditionArg,

    /// Java version tag, e.g. 1.21 (required with --edition java)
    #[arg(long)]
    pub version: Option<String>,

    /// Search radius in chunk rings around the origin chunk (0 = origin only)
    #[arg(long)]
    pub radius: Option<u32>,

    /// Restrict results to an ore type; repeat for several
    #[arg(long = "ore", value_name = "TYPE")]
    pub ores: Vec<String>,

    /// Bedrock generator executable
    #[arg(long, default_value = "./vanilla_generator")]
    pub bedrock_generator: PathBuf,

    /// Java generator executable
    #[arg(long, default_value = "./cubiomes")]
    pub java_generator: PathBuf,

    /// Pretty-print the JSON response
    #[arg(long)]
    pub pretty: bool,
}

/// Run the search command.
///
/// Prints the response envelope to stdout in both outcomes; a failed
/// search additionally exits non-zero.
pub async fn run(args: SearchArgs) -> Result<(), CliError> {
    let mut filter = Vec::with_capacity(args.ores.len());
    for raw in &args.ores {
        let kind: OreKind = raw
            .parse()
            .map_err(|e| CliError::InvalidArgument(format!("{e}")))?;
        filter.push(kind);
    }

    let engine = OreEngineBuilder::new()
        .bedrock_generator(&args.bedrock_generator)
        .java_generator(&args.java_generator)
        .build();

    let mut query = OreQuery::new(args.seed, args.edition.into(), args.x, args.z)
        .with_ore_filter(filter);
    if let Some(version) = &args.version {
        query = query.with_version(version);
    }
    if let Some(radius) = args.radius {
        query = query.with_radius(radius);
    }

    debug!(key = %query.key(), "Running search");

    let outcome = engine.find_ores(query.clone()).await;
    let envelope = match &outcome {
        Ok(report) => SearchResponse::from_report(report),
        Err(err) => SearchResponse::failure(&query, err),
    };

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{rendered}");

    outcome.map(|_| ()).map_err(CliError::from)
}
