use crate::error::Result;
use crate::model::{Direction, ProtocolState, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One entry of the data generator's `packets.json` report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportEntry {
    pub protocol_id: u32,
}

/// `packets.json` from the vanilla server's data generator:
/// state -> direction -> `minecraft:<resource>` -> entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PacketReport(pub BTreeMap<String, BTreeMap<String, BTreeMap<String, ReportEntry>>>);

impl PacketReport {
    pub fn from_reader<R: Read>(r: R) -> Result<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(f)
    }
}

/// Outcome of [`apply_report`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdCorrection {
    pub updated: usize,
    /// `state/direction/resource` of report entries with no scraped packet.
    pub missing: Vec<String>,
}

/// Overwrite scraped packet ids with the authoritative ones from `report`.
///
/// The first packet in the matching bucket whose resource equals the report
/// key (without `minecraft:`) gets the new id. States and directions the
/// schema doesn't know are ignored.
pub fn apply_report(schema: &mut Schema, report: &PacketReport) -> IdCorrection {
    let mut out = IdCorrection::default();

    for (state_key, directions) in &report.0 {
        let Some(state) = report_state(state_key) else {
            continue;
        };
        for (direction_key, packets) in directions {
            let Ok(direction) = direction_key.parse::<Direction>() else {
                continue;
            };
            let bucket = schema.bucket_mut(state, direction);
            for (key, entry) in packets {
                let resource = key.strip_prefix("minecraft:").unwrap_or(key);
                match bucket.iter_mut().find(|p| p.resource == resource) {
                    Some(packet) => {
                        packet.id = format!("0x{:02X}", entry.protocol_id);
                        out.updated += 1;
                    }
                    None => out.missing.push(format!("{state}/{direction}/{resource}")),
                }
            }
        }
    }

    info!(updated = out.updated, missing = out.missing.len(), "applied packet id report");
    for m in &out.missing {
        warn!("no scraped packet for report entry {m}");
    }
    out
}

/// The report calls the first state "handshake".
fn report_state(key: &str) -> Option<ProtocolState> {
    match key {
        "handshake" => Some(ProtocolState::Handshaking),
        other => other.parse().ok(),
    }
}
