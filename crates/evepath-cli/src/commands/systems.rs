//! Systems command handler for looking up static dataset entries.

use std::path::Path;

use anyhow::{bail, Context, Result};

use evepath_lib::{StaticTopology, SystemId};

use crate::output::{OutputFormat, SystemSummary};

/// Arguments for the systems command.
#[derive(Debug, Clone, Default)]
pub struct SystemsCommandArgs {
    /// Names or ids to look up.
    pub queries: Vec<String>,
    /// List similar names instead of requiring an exact match.
    pub fuzzy: bool,
    /// Maximum matches per query in fuzzy mode.
    pub limit: usize,
}

/// Look up each query. Exact mode fails on the first unknown name.
pub fn lookup(topology: &StaticTopology, args: &SystemsCommandArgs) -> Result<Vec<SystemSummary>> {
    let mut ids: Vec<SystemId> = Vec::new();
    for query in &args.queries {
        if args.fuzzy {
            let matches = topology.fuzzy_system_matches(query, args.limit);
            if matches.is_empty() {
                bail!("No systems similar to '{}'", query);
            }
            ids.extend(
                matches
                    .iter()
                    .filter_map(|name| topology.system_id_by_name(name)),
            );
        } else {
            ids.push(topology.resolve_system(query)?);
        }
    }

    Ok(ids
        .into_iter()
        .filter_map(|id| topology.system(id))
        .map(|system| SystemSummary {
            system_id: system.solar_system_id,
            system_name: system.solar_system_name.clone(),
            security: system.security,
            region_id: system.region_id,
            connections: system.connected_systems.len(),
        })
        .collect())
}

/// Handle the systems subcommand.
pub fn handle_systems(dataset: &Path, args: &SystemsCommandArgs, format: OutputFormat) -> Result<()> {
    let topology = StaticTopology::load(dataset)
        .with_context(|| format!("failed to load dataset from {}", dataset.display()))?;
    let systems = lookup(&topology, args)?;
    format.render_systems(&systems)
}
