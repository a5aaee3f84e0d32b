//! Search configuration types

use serde::{Deserialize, Serialize};

/// Connection settings for the secondary full-text engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the engine, e.g. `http://localhost:9200`
    pub base_url: String,
    /// Index name holding listing documents
    pub index: String,
    /// Bound on any single engine request, in milliseconds
    pub timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            index: "listings".to_string(),
            timeout_ms: 2_000,
        }
    }
}

/// Orchestrator-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub engine: EngineConfig,
    /// TTL applied to results produced by the fallback strategy, in
    /// seconds; much shorter than the Search namespace TTL so degraded
    /// data ages out quickly
    pub degraded_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            degraded_ttl_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.degraded_ttl_secs, 60);
        assert!(config.engine.base_url.starts_with("http://"));
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: SearchConfig = serde_json::from_str(
            r#"{
                "engine": {"base_url": "http://search:9200", "index": "listings", "timeout_ms": 500},
                "degraded_ttl_secs": 30
            }"#,
        )
        .unwrap();
        assert_eq!(config.engine.timeout_ms, 500);
        assert_eq!(config.degraded_ttl_secs, 30);
    }
}
