//! Cache namespaces and deterministic key derivation

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Logical grouping of cache keys sharing a TTL and an invalidation scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    Products,
    Categories,
    Search,
    Facets,
    Stats,
    Suggestions,
}

impl Namespace {
    /// Plaintext prefix kept on every derived key so namespace-wide
    /// invalidation stays a prefix scan
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Products => "products",
            Namespace::Categories => "categories",
            Namespace::Search => "search",
            Namespace::Facets => "facets",
            Namespace::Stats => "stats",
            Namespace::Suggestions => "suggestions",
        }
    }

    /// Fixed TTL per namespace; not overridable per call except where a
    /// component documents a shorter one (degraded search results)
    pub fn ttl(&self) -> Duration {
        match self {
            Namespace::Products => Duration::from_secs(60 * 15),
            Namespace::Categories => Duration::from_secs(60 * 60),
            Namespace::Search => Duration::from_secs(60 * 5),
            Namespace::Facets => Duration::from_secs(60 * 10),
            Namespace::Stats => Duration::from_secs(60 * 30),
            Namespace::Suggestions => Duration::from_secs(60 * 10),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A fully derived cache key.
///
/// The stored form is `<namespace>_<md5 hex>`: the hash covers the
/// namespace, the positional args in order and the keyword args sorted by
/// name, so equal inputs always derive a byte-identical key while the
/// plaintext prefix keeps bulk invalidation cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: Namespace,
    value: String,
}

impl CacheKey {
    /// Derive a key from positional and keyword arguments
    pub fn derive(namespace: Namespace, args: &[&str], kwargs: &[(&str, &str)]) -> Self {
        let mut parts: Vec<String> = Vec::with_capacity(1 + args.len() + kwargs.len());
        parts.push(namespace.prefix().to_string());
        for arg in args {
            parts.push((*arg).to_string());
        }
        let mut sorted: Vec<(&str, &str)> = kwargs.to_vec();
        sorted.sort();
        for (name, value) in sorted {
            parts.push(format!("{}:{}", name, value));
        }
        let digest = md5::compute(parts.join("_").as_bytes());
        Self {
            namespace,
            value: format!("{}_{:x}", namespace.prefix(), digest),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_deterministic() {
        let a = CacheKey::derive(Namespace::Search, &["iphone"], &[("page", "1"), ("limit", "20")]);
        let b = CacheKey::derive(Namespace::Search, &["iphone"], &[("limit", "20"), ("page", "1")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_differs_per_input() {
        let a = CacheKey::derive(Namespace::Search, &["iphone"], &[]);
        let b = CacheKey::derive(Namespace::Search, &["samsung"], &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_differs_per_namespace() {
        let a = CacheKey::derive(Namespace::Search, &["iphone"], &[]);
        let b = CacheKey::derive(Namespace::Facets, &["iphone"], &[]);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("search_"));
        assert!(b.as_str().starts_with("facets_"));
    }

    #[test]
    fn test_positional_order_matters() {
        let a = CacheKey::derive(Namespace::Products, &["1", "2"], &[]);
        let b = CacheKey::derive(Namespace::Products, &["2", "1"], &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_namespace_ttl_table() {
        assert_eq!(Namespace::Search.ttl(), Duration::from_secs(300));
        assert_eq!(Namespace::Categories.ttl(), Duration::from_secs(3600));
        assert!(Namespace::Products.ttl() > Namespace::Search.ttl());
    }
}
