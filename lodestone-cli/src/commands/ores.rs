//! Ores command - list the ore types the engine can report.

use clap::Args;
use lodestone::profile::ProfileRegistry;

use crate::error::CliError;

/// Arguments for the ores command.
#[derive(Debug, Args)]
pub struct OresArgs {
    /// Emit the listing as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the ores command.
pub fn run(args: OresArgs) -> Result<(), CliError> {
    let registry = ProfileRegistry::builtin();
    let names: Vec<&str> = registry.ore_kinds().iter().map(|kind| kind.name()).collect();

    if args.json {
        let listing = serde_json::json!({ "supported_ores": names });
        println!("{}", serde_json::to_string_pretty(&listing)?);
    } else {
        println!("Supported ore types:");
        for name in names {
            println!("  {name}");
        }
    }

    Ok(())
}
