//! Output formatting for routes and system lookups.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use evepath_lib::{EdgeSource, SecurityStatus, SystemId, SystemNode};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing.
    #[default]
    Text,
    /// The same records as JSON.
    Json,
}

/// Result of a `systems` lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSummary {
    pub system_id: SystemId,
    pub system_name: String,
    pub security: SecurityStatus,
    pub region_id: i64,
    pub connections: usize,
}

impl OutputFormat {
    pub fn render_route(self, route: &[SystemNode]) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, route)?;
                writeln!(out)?;
            }
            OutputFormat::Text => write_route_text(&mut out, route)?,
        }
        Ok(())
    }

    pub fn render_systems(self, systems: &[SystemSummary]) -> Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, systems)?;
                writeln!(out)?;
            }
            OutputFormat::Text => {
                for system in systems {
                    writeln!(
                        out,
                        "{} ({}) security {:.1}, region {}, {} gate(s)",
                        system.system_name,
                        system.system_id,
                        system.security,
                        system.region_id,
                        system.connections
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// Write a route as one line per system, annotating the hop that leads to
/// the next system with its edge source.
pub fn write_route_text<W: Write>(out: &mut W, route: &[SystemNode]) -> io::Result<()> {
    let (Some(first), Some(last)) = (route.first(), route.last()) else {
        return Ok(());
    };
    writeln!(
        out,
        "Route from {} to {} ({} jumps):",
        first.system_name,
        last.system_name,
        route.len() - 1
    )?;

    for (index, node) in route.iter().enumerate() {
        let via = route
            .get(index + 1)
            .and_then(|next| hop_source(node, next.system_id))
            .map(|source| format!(" -> via {source}"))
            .unwrap_or_default();
        writeln!(
            out,
            "- {} ({}) [{:.1}]{}",
            node.system_name, node.system_id, node.system_security_status, via
        )?;
    }
    Ok(())
}

/// Source of the edge taken from `node` to `next`. Stargates win over
/// wormholes when both exist.
fn hop_source(node: &SystemNode, next: SystemId) -> Option<EdgeSource> {
    let mut sources = node
        .system_edges
        .iter()
        .filter(|edge| edge.system_id == next)
        .map(|edge| edge.edge_source);
    let first = sources.next()?;
    if !first.is_wormhole() {
        return Some(first);
    }
    Some(
        sources
            .find(|source| !source.is_wormhole())
            .unwrap_or(first),
    )
}
