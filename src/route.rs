//! Route table: which hops and engines realize each ordered language pair
//!
//! Lookup is a direct two-level association (source, then target). All
//! reachability is declared in configuration and validated at load time; no
//! path search happens while serving a request.

use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::LanguageCode;
use crate::error::ConfigError;

/// One application of a single translation engine, from one language to
/// another. Hops are parsed out of the `"from-to"` configuration form once at
/// load time; nothing downstream splits strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    from: LanguageCode,
    to: LanguageCode,
}

impl Hop {
    pub(crate) fn new(from: LanguageCode, to: LanguageCode) -> Self {
        Hop { from, to }
    }

    pub fn from(&self) -> &LanguageCode {
        &self.from
    }

    pub fn to(&self) -> &LanguageCode {
        &self.to
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// An immutable translation route: an ordered sequence of hops and the engine
/// identifier realizing each one.
///
/// Invariant, enforced at configuration load: the hop list and the engine
/// list have the same non-zero length, and consecutive hops chain from the
/// route's source to its target.
#[derive(Debug, Clone)]
pub struct Route {
    path: Vec<Hop>,
    engines: Vec<String>,
}

impl Route {
    pub(crate) fn new(path: Vec<Hop>, engines: Vec<String>) -> Self {
        debug_assert!(!path.is_empty());
        debug_assert_eq!(path.len(), engines.len());
        Route { path, engines }
    }

    /// Hops in translation order.
    pub fn hops(&self) -> &[Hop] {
        &self.path
    }

    /// Engine identifiers, one per hop, in the same order.
    pub fn engines(&self) -> &[String] {
        &self.engines
    }

    pub fn hop_count(&self) -> usize {
        self.path.len()
    }

    /// Whether this route passes through a bridge language.
    pub fn is_chain(&self) -> bool {
        self.path.len() > 1
    }
}

/// Static mapping from ordered language pairs to routes. Read-only after
/// construction; at most one route exists per ordered pair.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<LanguageCode, BTreeMap<LanguageCode, Route>>,
}

impl RouteTable {
    pub(crate) fn new() -> Self {
        RouteTable::default()
    }

    pub(crate) fn insert(
        &mut self,
        source: LanguageCode,
        target: LanguageCode,
        route: Route,
    ) -> Result<(), ConfigError> {
        let targets = self.routes.entry(source.clone()).or_default();
        if targets.contains_key(&target) {
            return Err(ConfigError::DuplicateRoute {
                src: source.to_string(),
                target: target.to_string(),
            });
        }
        targets.insert(target, route);
        Ok(())
    }

    /// Look up the route for an ordered language pair. Returns `None` when
    /// either language is unknown or no configured route connects them.
    pub fn resolve(&self, source: &LanguageCode, target: &LanguageCode) -> Option<&Route> {
        self.routes.get(source)?.get(target)
    }

    /// Enumerate every configured (source, target, route) triple in
    /// deterministic code order.
    pub fn iter(&self) -> impl Iterator<Item = (&LanguageCode, &LanguageCode, &Route)> {
        self.routes.iter().flat_map(|(source, targets)| {
            targets
                .iter()
                .map(move |(target, route)| (source, target, route))
        })
    }

    /// Number of configured ordered pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> LanguageCode {
        LanguageCode::parse(raw).unwrap()
    }

    fn direct(from: &str, to: &str, engine: &str) -> Route {
        Route::new(
            vec![Hop::new(code(from), code(to))],
            vec![engine.to_string()],
        )
    }

    fn table() -> RouteTable {
        let mut table = RouteTable::new();
        table
            .insert(code("zh"), code("en"), direct("zh", "en", "opus-mt-zh-en"))
            .unwrap();
        table
            .insert(
                code("zh"),
                code("el"),
                Route::new(
                    vec![Hop::new(code("zh"), code("en")), Hop::new(code("en"), code("el"))],
                    vec!["opus-mt-zh-en".to_string(), "opus-mt-en-el".to_string()],
                ),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_resolve_direct_route() {
        let table = table();
        let route = table.resolve(&code("zh"), &code("en")).unwrap();
        assert_eq!(route.hop_count(), 1);
        assert!(!route.is_chain());
        assert_eq!(route.engines(), ["opus-mt-zh-en"]);
    }

    #[test]
    fn test_resolve_chain_route() {
        let table = table();
        let route = table.resolve(&code("zh"), &code("el")).unwrap();
        assert_eq!(route.hop_count(), 2);
        assert!(route.is_chain());
        assert_eq!(route.hops()[0].to(), &code("en"));
        assert_eq!(route.hops()[1].from(), &code("en"));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let table = table();
        let first = table.resolve(&code("zh"), &code("el")).unwrap();
        let second = table.resolve(&code("zh"), &code("el")).unwrap();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_resolve_unknown_pair() {
        let table = table();
        assert!(table.resolve(&code("en"), &code("zh")).is_none());
        assert!(table.resolve(&code("fr"), &code("en")).is_none());
        // Degenerate pairs can never be configured, so they never resolve.
        assert!(table.resolve(&code("zh"), &code("zh")).is_none());
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut table = table();
        let err = table
            .insert(code("zh"), code("en"), direct("zh", "en", "other-engine"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_iter_order_and_len() {
        let table = table();
        let pairs: Vec<(String, String)> = table
            .iter()
            .map(|(s, t, _)| (s.to_string(), t.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("zh".to_string(), "el".to_string()),
                ("zh".to_string(), "en".to_string()),
            ]
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_hop_display() {
        let hop = Hop::new(code("zh"), code("en"));
        assert_eq!(hop.to_string(), "zh-en");
    }
}
