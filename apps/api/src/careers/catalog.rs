#![allow(dead_code)]

//! Career catalog — `<name>,<code>` rows loaded from a delimited text file.
//!
//! Career names may themselves contain commas ("Manager, Quality Control"),
//! so each line splits on its *last* comma. The catalog is static for the
//! process lifetime and is loaded once at startup.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::warn;

/// One catalog row: a career name and its 1-to-6-letter RIASEC code.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub code: String,
}

/// The full career catalog, in file order.
#[derive(Debug, Clone)]
pub struct CareerCatalog {
    entries: Vec<CatalogEntry>,
}

impl CareerCatalog {
    /// Reads and parses the catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read career catalog at {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Parses catalog text. Lines without a comma are skipped with a warning
    /// rather than failing the whole catalog.
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some((name, code)) = line.rsplit_once(',') else {
                warn!(line, "skipping catalog line without a code column");
                continue;
            };
            let name = name.trim();
            let code = code.trim().to_uppercase();
            if name.is_empty() || code.is_empty() {
                warn!(line, "skipping catalog line with empty name or code");
                continue;
            }
            entries.push(CatalogEntry {
                name: name.to_string(),
                code,
            });
        }
        CareerCatalog { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
