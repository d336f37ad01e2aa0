//! Corpus scanning and the `index.jsonl` case index.

use super::{CASE_FILE, CaseCorpus, CaseError, CaseMetadata};
use crate::types::Route;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One line of `index.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseIndexEntry {
    pub case_id: String,
    /// Folder relative to the corpus root.
    pub path: PathBuf,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Route>,
    #[serde(default)]
    pub rule_codes: Vec<String>,
    pub title: String,
    pub indexed_at: String,
}

impl CaseIndexEntry {
    fn from_case(case: &CaseMetadata, relative: PathBuf) -> Self {
        Self {
            case_id: case.case_id.clone(),
            path: relative,
            date: case.date.clone(),
            team: case.team.clone(),
            decision: case.decision,
            rule_codes: case.rule_codes.clone(),
            title: case.title.clone(),
            indexed_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}

/// Case folders are named `YYYY-MM-DD_<slug>`; hidden folders such as
/// `.templates` are skipped.
pub fn is_case_directory(name: &str) -> bool {
    if name.starts_with('.') {
        return false;
    }
    let bytes = name.as_bytes();
    bytes.len() >= 11
        && bytes[..10].iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
        && bytes[10] == b'_'
}

/// Reads `case.yaml` from a case folder.
pub fn parse_case(case_dir: &Path) -> Result<CaseMetadata, CaseError> {
    let path = case_dir.join(CASE_FILE);
    let content = fs::read_to_string(&path).map_err(CaseError::io(&path))?;
    serde_yaml_ng::from_str(&content).map_err(|source| CaseError::Parse { path, source })
}

impl CaseCorpus {
    /// Scans the corpus and builds index entries, in folder-name order.
    ///
    /// Folders whose `case.yaml` is missing or malformed are skipped with a
    /// warning.
    pub fn ingest(&self) -> Result<Vec<CaseIndexEntry>, CaseError> {
        self.ensure_exists()?;
        info!(root = %self.root().display(), "Scanning case corpus");

        let mut names: Vec<String> = fs::read_dir(self.root())
            .map_err(CaseError::io(self.root()))?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| is_case_directory(name))
            .collect();
        names.sort();

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let dir = self.root().join(&name);
            match parse_case(&dir) {
                Ok(case) => {
                    debug!(case_id = %case.case_id, "Indexed case");
                    entries.push(CaseIndexEntry::from_case(&case, PathBuf::from(&name)));
                }
                Err(e) => warn!(folder = %name, error = %e, "Skipping case"),
            }
        }

        info!(count = entries.len(), "Case scan complete");
        Ok(entries)
    }

    /// Writes `index.jsonl`, one entry per line with a trailing newline.
    pub fn save_index(&self, entries: &[CaseIndexEntry]) -> Result<PathBuf, CaseError> {
        let path = self.index_path();
        let mut content = String::new();
        for entry in entries {
            let line =
                serde_json::to_string(entry).map_err(|e| CaseError::Serialize(e.to_string()))?;
            content.push_str(&line);
            content.push('\n');
        }
        fs::write(&path, content).map_err(CaseError::io(&path))?;
        info!(path = %path.display(), count = entries.len(), "Saved case index");
        Ok(path)
    }

    /// Reads `index.jsonl`. A missing index yields no entries.
    pub fn load_index(&self) -> Result<Vec<CaseIndexEntry>, CaseError> {
        let path = self.index_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Case index not found; run 'ltr cases ingest'");
                return Ok(Vec::new());
            }
            Err(e) => return Err(CaseError::io(&path)(e)),
        };

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(number, line)| {
                serde_json::from_str(line).map_err(|source| CaseError::Index {
                    path: path.clone(),
                    line: number + 1,
                    source,
                })
            })
            .collect()
    }

    /// Looks a case up through the index.
    pub fn find_case(&self, case_id: &str) -> Result<Option<CaseMetadata>, CaseError> {
        let Some(entry) = self
            .load_index()?
            .into_iter()
            .find(|e| e.case_id == case_id)
        else {
            return Ok(None);
        };
        parse_case(&self.case_dir(&entry)).map(Some)
    }

    /// Every indexed case that still parses.
    pub fn all_cases(&self) -> Result<Vec<CaseMetadata>, CaseError> {
        let mut cases = Vec::new();
        for entry in self.load_index()? {
            match parse_case(&self.case_dir(&entry)) {
                Ok(case) => cases.push(case),
                Err(e) => warn!(case_id = %entry.case_id, error = %e, "Skipping indexed case"),
            }
        }
        Ok(cases)
    }
}
