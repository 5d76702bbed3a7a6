use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Knobs for one import run.
///
/// The JSON form may omit any key; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportOptions {
    /// `id` of the `h2` heading the packet list starts after.
    pub anchor: String,
    /// Lower-case title prefixes of legacy packets that are skipped.
    pub skip_title_prefixes: Vec<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            anchor: "Handshaking".into(),
            skip_title_prefixes: vec!["legacy server list ping".into()],
        }
    }
}

impl ImportOptions {
    pub fn from_reader<R: Read>(r: R) -> Result<Self> {
        Ok(serde_json::from_reader(r)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let f = File::open(path)?;
        Self::from_reader(f)
    }

    pub fn is_skipped_title(&self, title: &str) -> bool {
        let t = title.trim().to_lowercase();
        self.skip_title_prefixes
            .iter()
            .any(|prefix| t.starts_with(prefix.as_str()))
    }
}
