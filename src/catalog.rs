//! Language codes and the display-name catalog
//!
//! [`LanguageCode`] is a normalized short identifier ("zh", "en", "el").
//! [`LanguageCatalog`] maps codes to human-readable display names and is used
//! only for presentation: path descriptions and language listings, never
//! routing decisions.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::route::RouteTable;

/// A raw string failed to parse as a language code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid language code {code:?}: {reason}")]
pub struct InvalidLanguageCode {
    pub code: String,
    pub reason: &'static str,
}

/// A normalized language identifier.
///
/// Codes are trimmed and lowercased on parse, so two spellings differing only
/// in case compare equal. Only ASCII alphanumerics, hyphens and underscores
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and normalize a raw language code.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let code = LanguageCode::parse("ZH")?;
    /// assert_eq!(code.as_str(), "zh");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, InvalidLanguageCode> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidLanguageCode {
                code: raw.to_string(),
                reason: "code is empty",
            });
        }

        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(InvalidLanguageCode {
                code: raw.to_string(),
                reason: "only ASCII alphanumerics, '-' and '_' are allowed",
            });
        }

        Ok(LanguageCode(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only mapping from language codes to display names.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    names: BTreeMap<LanguageCode, String>,
}

impl LanguageCatalog {
    pub(crate) fn from_names(names: BTreeMap<LanguageCode, String>) -> Self {
        LanguageCatalog { names }
    }

    /// Whether the catalog declares this language.
    pub fn contains(&self, code: &LanguageCode) -> bool {
        self.names.contains_key(code)
    }

    /// Display name for a language, falling back to the raw code when the
    /// language is unknown. The fallback is presentation-only; routing never
    /// consults the catalog.
    pub fn display_name<'a>(&'a self, code: &'a LanguageCode) -> &'a str {
        self.names.get(code).map(String::as_str).unwrap_or(code.as_str())
    }

    /// Iterate over (code, display name) pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, &str)> {
        self.names.iter().map(|(code, name)| (code, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Enumerate the route table as a mapping from source display name to the
    /// display names of every reachable target, deterministically ordered.
    pub fn list_routes(&self, routes: &RouteTable) -> BTreeMap<String, Vec<String>> {
        let mut listing: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (source, target, _route) in routes.iter() {
            listing
                .entry(self.display_name(source).to_string())
                .or_default()
                .push(self.display_name(target).to_string());
        }
        listing
    }
}
