//! Versions command - list the supported edition/version tags.

use clap::Args;
use lodestone::profile::ProfileRegistry;

use crate::error::CliError;

/// Arguments for the versions command.
#[derive(Debug, Args)]
pub struct VersionsArgs {
    /// Emit the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the versions command.
pub fn run(args: VersionsArgs) -> Result<(), CliError> {
    let registry = ProfileRegistry::builtin();
    let tags = registry.version_tags();

    if args.json {
        let listing = serde_json::json!({ "supported_versions": tags });
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("Supported versions:");
        for tag in tags {
            println!("  {tag}");
        }
    }

    Ok(())
}
