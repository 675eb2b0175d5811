// Static language table used to tag pastes.
//
// The table maps a numeric Sourcebin language id to its display name and
// primary file extension. It is read once, validated, and never mutated.
// Entries are kept in ascending id order so extension lookups are
// deterministic when two languages share an extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::model::{extension_key, Language, LanguageId};

static BUNDLED_TABLE: &str = include_str!("../assets/languages.json");

static BUNDLED: Lazy<LanguageTable> = Lazy::new(|| {
    LanguageTable::from_json(BUNDLED_TABLE).unwrap_or_else(|err| {
        tracing::error!("bundled language table is invalid: {err:#}");
        LanguageTable::default()
    })
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub name: String,
    pub extension: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    name: String,
    extension: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageTable {
    entries: BTreeMap<LanguageId, LanguageRecord>,
}

impl LanguageTable {
    /// The table shipped with the binary.
    pub fn bundled() -> &'static LanguageTable {
        &BUNDLED
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read language table: {}", path.display()))?;
        Self::from_json(&data)
            .with_context(|| format!("invalid language table: {}", path.display()))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawRecord> =
            serde_json::from_str(contents).context("failed to parse language table JSON")?;

        let mut entries = BTreeMap::new();
        for (key, record) in raw {
            let id: u32 = key
                .trim()
                .parse()
                .with_context(|| format!("language id `{key}` is not an integer"))?;
            if record.name.trim().is_empty() {
                bail!("language {id} has an empty name");
            }
            if record.extension.trim().is_empty() {
                bail!("language {id} ({}) has an empty extension", record.name);
            }
            let previous = entries.insert(
                LanguageId(id),
                LanguageRecord {
                    name: record.name,
                    extension: record.extension,
                    aliases: record.aliases,
                },
            );
            if previous.is_some() {
                bail!("language id {id} appears more than once");
            }
        }

        if entries.is_empty() {
            bail!("language table is empty");
        }
        Ok(LanguageTable { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: LanguageId) -> Option<&LanguageRecord> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LanguageId, &LanguageRecord)> {
        self.entries.iter().map(|(id, record)| (*id, record))
    }

    /// First entry whose extension equals `extension` exactly.
    pub fn find_by_extension(&self, extension: &str) -> Option<LanguageId> {
        self.iter()
            .find(|(_, record)| record.extension == extension)
            .map(|(id, _)| id)
    }

    /// Entry whose name or alias matches `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<LanguageId> {
        self.iter()
            .find(|(_, record)| {
                record.name.eq_ignore_ascii_case(name)
                    || record.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .map(|(id, _)| id)
    }

    /// Language for a document title, falling back to `fallback` when the
    /// title is missing or its extension is unknown.
    pub fn resolve(&self, title: Option<&str>, fallback: &str) -> Language {
        title
            .map(extension_key)
            .and_then(|key| self.find_by_extension(key))
            .map(Language::Known)
            .unwrap_or_else(|| Language::Fallback(fallback.to_owned()))
    }
}
