//! Route command handler.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use evepath_lib::{
    RoutePlanner, RouteRequest, SourceFlags, SourcesConfig, StaticTopology, SystemId,
};

use crate::output::OutputFormat;

/// Arguments for the route command.
#[derive(Debug, Clone, Default)]
pub struct RouteCommandArgs {
    /// Starting system name or id.
    pub from: String,
    /// Destination system name or id.
    pub to: String,
    /// Systems (names or ids) the route must not pass through.
    pub avoid: Vec<String>,
    /// Use only the static stargate topology.
    pub static_only: bool,
    pub no_eve_scout: bool,
    pub no_tripwire: bool,
    pub no_eve_metro: bool,
}

impl RouteCommandArgs {
    pub fn source_flags(&self) -> SourceFlags {
        if self.static_only {
            return SourceFlags::none();
        }
        SourceFlags {
            eve_scout: !self.no_eve_scout,
            tripwire: !self.no_tripwire,
            eve_metro: !self.no_eve_metro,
        }
    }

    /// Resolve every system reference against `topology`.
    pub fn to_request(&self, topology: &StaticTopology) -> Result<RouteRequest> {
        let start = topology.resolve_system(&self.from)?;
        let goal = topology.resolve_system(&self.to)?;
        let avoided = self
            .avoid
            .iter()
            .map(|name| topology.resolve_system(name))
            .collect::<Result<Vec<SystemId>, _>>()?;

        Ok(RouteRequest::new(start, goal)
            .avoiding(avoided)
            .with_sources(self.source_flags()))
    }
}

/// Handle the route subcommand.
pub async fn handle_route(
    dataset: &Path,
    sources: &SourcesConfig,
    args: &RouteCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let topology = StaticTopology::load(dataset)
        .with_context(|| format!("failed to load dataset from {}", dataset.display()))?;
    let request = args.to_request(&topology)?;

    let planner = RoutePlanner::from_config(Arc::new(topology), sources)
        .context("failed to configure connection sources")?;
    let route = planner.plan_route(&request, None).await?;

    if route.is_empty() {
        bail!(
            "No route found between {} and {}.\nTip: remove some --avoid entries or enable more connection sources.",
            args.from,
            args.to
        );
    }

    format.render_route(&route)
}
