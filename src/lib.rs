//! wiki_packet_import: scrape Minecraft Java Edition packet tables
//!
//! This crate turns a saved copy of the Minecraft Wiki's
//! `Java_Edition_protocol/Packets` page into a typed [`Schema`]: every packet
//! table under the Handshaking, Status, Login, Configuration and Play sections,
//! bucketed by state and direction, with field types normalized from the
//! wiki's free text (`"Prefixed Array of VarInt"`) into a small type grammar
//! (`PrefixedArray[VarInt]`).
//!
//! The scraper is tolerant: tables that don't look like packet tables are
//! skipped and types it can't place are emitted as `Unknown // FIXME: ...`,
//! so one odd wiki edit never blocks a run. The only hard failure is a missing
//! anchor heading.
//!
//! Basic example (no-run):
//!
//! ```rust,no_run
//! use wiki_packet_import::{ImportOptions, import_packets_from_file};
//!
//! let schema = import_packets_from_file("packets.html".as_ref(), &ImportOptions::default())?;
//! println!("{}", serde_json::to_string_pretty(&schema)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assemble;
pub mod config;
pub mod error;
pub mod id_fix;
pub mod model;
pub mod naming;
pub mod projector;
pub mod table;
pub mod type_expr;
pub mod type_norm;
pub mod walker;

pub use crate::config::ImportOptions;
pub use crate::error::*;
pub use crate::model::*;
pub use crate::type_expr::{StructMember, TypeExpr};
pub use crate::walker::import_packets;

use std::fs::File;
use std::io::Read;
use std::path::Path;

pub fn import_packets_from_reader<R: Read>(mut r: R, opts: &ImportOptions) -> Result<Schema> {
    let mut s = String::new();
    r.read_to_string(&mut s)?;
    import_packets(&s, opts)
}

pub fn import_packets_from_file(path: &Path, opts: &ImportOptions) -> Result<Schema> {
    let f = File::open(path)?;
    import_packets_from_reader(f, opts)
}
