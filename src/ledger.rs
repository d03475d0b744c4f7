use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Identifiers of feed items that have already been turned into posts.
///
/// Backed by a plain text file, one identifier per line. The file is read once
/// at startup and rewritten in full by [`Ledger::save`]. There is no locking;
/// two runs sharing a ledger file will race.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
    seen: BTreeSet<String>,
}

impl Ledger {
    /// Missing file means no history.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = match fs::read_to_string(&path) {
            Ok(text) => text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e).with_context(|| format!("read ledger {}", path.display())),
        };
        Ok(Self { path, seen })
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn contains(&self, id: &str) -> bool { self.seen.contains(id) }

    /// Returns false if the id was already present.
    pub fn add(&mut self, id: impl Into<String>) -> bool { self.seen.insert(id.into()) }

    pub fn len(&self) -> usize { self.seen.len() }

    pub fn is_empty(&self) -> bool { self.seen.is_empty() }

    /// Sorted, matching the on-disk order.
    pub fn iter(&self) -> impl Iterator<Item = &str> { self.seen.iter().map(String::as_str) }

    pub fn clear(&mut self) { self.seen.clear(); }

    /// Overwrite the ledger file with the current set, sorted.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create ledger dir {}", parent.display()))?;
        }
        let mut body = String::new();
        for id in &self.seen {
            body.push_str(id);
            body.push('\n');
        }
        fs::write(&self.path, body).with_context(|| format!("write ledger {}", self.path.display()))
    }
}
