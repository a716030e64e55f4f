//! Configuration loading and validation
//!
//! The service is configured from a single JSON document: a language map
//! (code to display name) and a route map nested two levels deep (source
//! code, then target code). Hops are written as `"from-to"` strings in the
//! file and parsed into structured [`Hop`](crate::route::Hop)s here, at load
//! time. Every inconsistency is rejected with a descriptive [`ConfigError`]
//! before the service starts; nothing is deferred to request time.
//!
//! # Example
//!
//! ```ignore
//! let config = TranslationConfig::from_file("translation-config.json")?;
//! let (catalog, routes) = config.build()?;
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{LanguageCatalog, LanguageCode};
use crate::error::ConfigError;
use crate::route::{Hop, Route, RouteTable};

/// Declarative route description as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Ordered hop identifiers, each of the form `"from-to"`.
    pub path: Vec<String>,
    /// Ordered engine identifiers, one per hop.
    pub engines: Vec<String>,
}

/// The raw configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// Language code to display name.
    pub languages: BTreeMap<String, String>,
    /// Source code to target code to route.
    pub routes: BTreeMap<String, BTreeMap<String, RouteSpec>>,
}

impl TranslationConfig {
    /// Read and parse a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a configuration document from a JSON string.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The built-in configuration: Chinese, English and Greek, with direct
    /// opus-mt engines where they exist and English as the bridge for the
    /// zh<->el pairs.
    pub fn builtin() -> Self {
        fn spec(hops: &[&str], engines: &[&str]) -> RouteSpec {
            RouteSpec {
                path: hops.iter().map(|h| h.to_string()).collect(),
                engines: engines.iter().map(|e| e.to_string()).collect(),
            }
        }

        let languages = [("zh", "Chinese"), ("en", "English"), ("el", "Greek")]
            .into_iter()
            .map(|(code, name)| (code.to_string(), name.to_string()))
            .collect();

        let mut routes: BTreeMap<String, BTreeMap<String, RouteSpec>> = BTreeMap::new();
        routes.insert(
            "zh".to_string(),
            BTreeMap::from([
                (
                    "en".to_string(),
                    spec(&["zh-en"], &["Helsinki-NLP/opus-mt-zh-en"]),
                ),
                (
                    "el".to_string(),
                    spec(
                        &["zh-en", "en-el"],
                        &["Helsinki-NLP/opus-mt-zh-en", "Helsinki-NLP/opus-mt-en-el"],
                    ),
                ),
            ]),
        );
        routes.insert(
            "en".to_string(),
            BTreeMap::from([
                (
                    "zh".to_string(),
                    spec(&["en-zh"], &["Helsinki-NLP/opus-mt-en-zh"]),
                ),
                (
                    "el".to_string(),
                    spec(&["en-el"], &["Helsinki-NLP/opus-mt-en-el"]),
                ),
            ]),
        );
        routes.insert(
            "el".to_string(),
            BTreeMap::from([
                (
                    "en".to_string(),
                    spec(&["el-en"], &["Helsinki-NLP/opus-mt-tc-big-el-en"]),
                ),
                (
                    "zh".to_string(),
                    spec(
                        &["el-en", "en-zh"],
                        &[
                            "Helsinki-NLP/opus-mt-tc-big-el-en",
                            "Helsinki-NLP/opus-mt-en-zh",
                        ],
                    ),
                ),
            ]),
        );

        TranslationConfig { languages, routes }
    }

    /// Validate the document and build the runtime tables.
    ///
    /// Rejected here: invalid or duplicate language codes, empty display
    /// names, malformed hop identifiers, hop/engine length mismatches, empty
    /// or degenerate routes, references to undeclared languages, hops that do
    /// not chain from source to target, and duplicate ordered pairs.
    pub fn build(&self) -> Result<(LanguageCatalog, RouteTable), ConfigError> {
        let mut names: BTreeMap<LanguageCode, String> = BTreeMap::new();
        for (raw_code, name) in &self.languages {
            let code = LanguageCode::parse(raw_code)?;
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyDisplayName {
                    code: raw_code.clone(),
                });
            }
            // Distinct spellings may normalize to the same code ("ZH", "zh");
            // the last one would silently win, so reject outright.
            if names.insert(code, name.clone()).is_some() {
                return Err(ConfigError::Language(crate::catalog::InvalidLanguageCode {
                    code: raw_code.clone(),
                    reason: "declared more than once after normalization",
                }));
            }
        }
        let catalog = LanguageCatalog::from_names(names);

        let mut table = RouteTable::new();
        for (raw_source, targets) in &self.routes {
            let source = LanguageCode::parse(raw_source)?;
            for (raw_target, spec) in targets {
                let target = LanguageCode::parse(raw_target)?;
                let route = validate_route(&catalog, &source, &target, spec)?;
                table.insert(source.clone(), target.clone(), route)?;
            }
        }

        Ok((catalog, table))
    }
}

fn validate_route(
    catalog: &LanguageCatalog,
    source: &LanguageCode,
    target: &LanguageCode,
    spec: &RouteSpec,
) -> Result<Route, ConfigError> {
    let pair = || (source.to_string(), target.to_string());

    if source == target {
        return Err(ConfigError::DegenerateRoute {
            src: source.to_string(),
        });
    }
    if spec.path.is_empty() {
        let (source, target) = pair();
        return Err(ConfigError::EmptyRoute { src: source, target });
    }
    if spec.path.len() != spec.engines.len() {
        let (source, target) = pair();
        return Err(ConfigError::EngineCountMismatch {
            src: source,
            target,
            hops: spec.path.len(),
            engines: spec.engines.len(),
        });
    }

    let mut hops = Vec::with_capacity(spec.path.len());
    for raw_hop in &spec.path {
        let Some((raw_from, raw_to)) = raw_hop.split_once('-') else {
            let (source, target) = pair();
            return Err(ConfigError::MalformedHop {
                src: source,
                target,
                hop: raw_hop.clone(),
            });
        };
        let from = LanguageCode::parse(raw_from)?;
        let to = LanguageCode::parse(raw_to)?;
        for code in [&from, &to] {
            if !catalog.contains(code) {
                let (source, target) = pair();
                return Err(ConfigError::UnknownLanguage {
                    src: source,
                    target,
                    code: code.to_string(),
                });
            }
        }
        hops.push(Hop::new(from, to));
    }

    // The hops must form one connected chain from source to target.
    let mut expected = source;
    for (index, hop) in hops.iter().enumerate() {
        if hop.from() != expected {
            let (source, target) = pair();
            return Err(ConfigError::BrokenChain {
                src: source,
                target,
                detail: format!(
                    "hop {index} starts at {:?}, expected {:?}",
                    hop.from().as_str(),
                    expected.as_str()
                ),
            });
        }
        expected = hop.to();
    }
    if expected != target {
        let (source, target) = pair();
        return Err(ConfigError::BrokenChain {
            src: source,
            target,
            detail: format!("last hop ends at {:?}, not at the target", expected.as_str()),
        });
    }

    Ok(Route::new(hops, spec.engines.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn code(raw: &str) -> LanguageCode {
        LanguageCode::parse(raw).unwrap()
    }

    // ========== Parsing Tests ==========

    #[test]
    fn test_builtin_config_builds() {
        let (catalog, table) = TranslationConfig::builtin().build().unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(table.len(), 6);

        let route = table.resolve(&code("zh"), &code("el")).unwrap();
        assert_eq!(route.hop_count(), 2);
        assert_eq!(route.hops()[0].to(), &code("en"));
    }

    #[test]
    fn test_every_built_route_holds_the_length_invariant() {
        let (_catalog, table) = TranslationConfig::builtin().build().unwrap();
        for (_source, _target, route) in table.iter() {
            assert!(route.hop_count() >= 1);
            assert_eq!(route.hops().len(), route.engines().len());
        }
    }

    #[test]
    fn test_builtin_round_trips_through_json() {
        let config = TranslationConfig::builtin();
        let raw = serde_json::to_string(&config).unwrap();
        assert_eq!(TranslationConfig::from_json(&raw).unwrap(), config);
    }

    #[test]
    fn test_from_json_rejects_missing_keys() {
        let err = TranslationConfig::from_json(r#"{"languages": {}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = TranslationConfig::from_file("/nonexistent/translation-config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_file_reads_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = serde_json::to_string(&TranslationConfig::builtin()).unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let config = TranslationConfig::from_file(file.path()).unwrap();
        assert_eq!(config, TranslationConfig::builtin());
    }

    // ========== Validation Tests ==========

    fn config_with_route(spec: RouteSpec) -> TranslationConfig {
        let mut config = TranslationConfig::builtin();
        config
            .routes
            .get_mut("zh")
            .unwrap()
            .insert("el".to_string(), spec);
        config
    }

    #[test]
    fn test_engine_count_mismatch_is_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec!["zh-en".to_string(), "en-el".to_string()],
            engines: vec!["only-one".to_string()],
        });
        let err = config.build().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EngineCountMismatch { hops: 2, engines: 1, .. }
        ));
    }

    #[test]
    fn test_empty_route_is_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec![],
            engines: vec![],
        });
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::EmptyRoute { .. }
        ));
    }

    #[test]
    fn test_malformed_hop_is_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec!["zhen".to_string()],
            engines: vec!["m".to_string()],
        });
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::MalformedHop { .. }
        ));
    }

    #[test]
    fn test_undeclared_language_is_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec!["zh-fr".to_string(), "fr-el".to_string()],
            engines: vec!["m1".to_string(), "m2".to_string()],
        });
        let err = config.build().unwrap_err();
        match err {
            ConfigError::UnknownLanguage { code, .. } => assert_eq!(code, "fr"),
            other => panic!("expected UnknownLanguage, got {other:?}"),
        }
    }

    #[test]
    fn test_disconnected_hops_are_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec!["zh-en".to_string(), "el-en".to_string()],
            engines: vec!["m1".to_string(), "m2".to_string()],
        });
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::BrokenChain { .. }
        ));
    }

    #[test]
    fn test_route_not_reaching_target_is_fatal() {
        let config = config_with_route(RouteSpec {
            path: vec!["zh-en".to_string()],
            engines: vec!["m1".to_string()],
        });
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::BrokenChain { .. }
        ));
    }

    #[test]
    fn test_degenerate_route_is_fatal() {
        let mut config = TranslationConfig::builtin();
        config.routes.get_mut("zh").unwrap().insert(
            "zh".to_string(),
            RouteSpec {
                path: vec!["zh-zh".to_string()],
                engines: vec!["m".to_string()],
            },
        );
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::DegenerateRoute { .. }
        ));
    }

    #[test]
    fn test_duplicate_pair_after_normalization_is_fatal() {
        let mut config = TranslationConfig::builtin();
        let existing = config.routes["zh"]["en"].clone();
        config.routes.get_mut("zh").unwrap().insert("EN".to_string(), existing);
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::DuplicateRoute { .. }
        ));
    }

    #[test]
    fn test_duplicate_language_after_normalization_is_fatal() {
        let mut config = TranslationConfig::builtin();
        config
            .languages
            .insert("ZH".to_string(), "Chinese (Simplified)".to_string());
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::Language(_)
        ));
    }

    #[test]
    fn test_empty_display_name_is_fatal() {
        let mut config = TranslationConfig::builtin();
        config.languages.insert("fr".to_string(), "  ".to_string());
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::EmptyDisplayName { .. }
        ));
    }

    #[test]
    fn test_invalid_language_code_is_fatal() {
        let mut config = TranslationConfig::builtin();
        config
            .languages
            .insert("bad code".to_string(), "Bad".to_string());
        assert!(matches!(
            config.build().unwrap_err(),
            ConfigError::Language(_)
        ));
    }
}
