use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Name fragments of registry entries that are not operating companies:
/// SPACs, funds, resource-development vehicles, foreign limited companies,
/// investment companies.
const EXCLUDED_NAME_FRAGMENTS: [&str; 6] = [
    "스팩",
    "펀드",
    "자원개발",
    "유한공사",
    "기업인수목적",
    "투자회사",
];

const EXCLUDED_NAME_SUFFIX: &str = "리츠";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub corp_code: String,
    pub corp_name: String,
    #[serde(default)]
    pub stock_code: String,
    #[serde(default)]
    pub modify_date: String,
}

impl CompanyEntry {
    /// Listed operating companies only.
    pub fn is_usable(&self) -> bool {
        !self.stock_code.trim().is_empty()
            && !EXCLUDED_NAME_FRAGMENTS
                .iter()
                .any(|fragment| self.corp_name.contains(fragment))
            && !self.corp_name.ends_with(EXCLUDED_NAME_SUFFIX)
    }
}

/// Looks companies up by registry code or exact name. A miss is `None`.
pub trait CompanyDirectory {
    fn find_by_code(&self, code: &str) -> Option<&CompanyEntry>;
    fn find_by_name(&self, name: &str) -> Option<&CompanyEntry>;
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(rename = "list", default)]
    list: Vec<CompanyEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct CorpRegistry {
    entries: Vec<CompanyEntry>,
}

impl CorpRegistry {
    /// Keeps the usable entries of `entries`.
    pub fn from_entries(entries: impl IntoIterator<Item = CompanyEntry>) -> Self {
        Self {
            entries: entries.into_iter().filter(CompanyEntry::is_usable).collect(),
        }
    }

    /// Parses the unzipped registry document (`<result><list>...</list></result>`).
    pub fn from_xml(content: &str) -> Result<Self> {
        let document: RegistryDocument = quick_xml::de::from_str(content)?;
        let total = document.list.len();
        let registry = Self::from_entries(document.list);
        debug!(
            "Loaded {} of {} registry entries",
            registry.entries.len(),
            total
        );
        Ok(registry)
    }

    pub fn entries(&self) -> &[CompanyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CompanyDirectory for CorpRegistry {
    fn find_by_code(&self, code: &str) -> Option<&CompanyEntry> {
        let found = self.entries.iter().find(|e| e.corp_code == code);
        if found.is_none() {
            warn!("No company with code {}", code);
        }
        found
    }

    fn find_by_name(&self, name: &str) -> Option<&CompanyEntry> {
        let found = self.entries.iter().find(|e| e.corp_name == name);
        if found.is_none() {
            warn!("No company named {}", name);
        }
        found
    }
}
