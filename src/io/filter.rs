use crate::core::trade::TradeRecord;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// JSON filter configuration.
///
/// ```json
/// { "ignore_folders": ["TEST", "ARCHIVE"], "include_folders": [] }
/// ```
///
/// Both lists are optional. An empty include list accepts every folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub ignore_folders: Vec<String>,
    #[serde(default)]
    pub include_folders: Vec<String>,
}

impl FilterConfig {
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PipelineError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }
}

/// Predicate over trade records, applied before cashflow generation.
///
/// Folder names are compared after trimming whitespace. An ignored folder
/// always wins over an included one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeFilter {
    ignore_folders: BTreeSet<String>,
    include_folders: BTreeSet<String>,
}

impl TradeFilter {
    /// A filter that accepts every trade.
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            ignore_folders: clean(&config.ignore_folders),
            include_folders: clean(&config.include_folders),
        }
    }

    /// Replace the ignore list (command-line folders override the file).
    pub fn with_ignored_folders<I, S>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore_folders = clean(folders);
        self
    }

    pub fn accepts(&self, trade: &TradeRecord) -> bool {
        let folder = trade.folder().trim();
        if self.ignore_folders.contains(folder) {
            return false;
        }
        self.include_folders.is_empty() || self.include_folders.contains(folder)
    }

    pub fn ignored_folders(&self) -> impl Iterator<Item = &str> {
        self.ignore_folders.iter().map(String::as_str)
    }
}

fn clean<I, S>(folders: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    folders
        .into_iter()
        .map(|f| f.as_ref().trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}
