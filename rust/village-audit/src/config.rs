use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub batch_size: usize,
    pub top_k: usize,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    village_data_dir: Option<String>,
    #[serde(default)]
    village_seed: Option<u64>,
    #[serde(default = "default_batch_size")]
    village_batch_size: usize,
    #[serde(default = "default_top_k")]
    village_top_k: usize,
}

const fn default_batch_size() -> usize {
    1000
}

const fn default_top_k() -> usize {
    crate::detector::DEFAULT_TOP_K
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let raw: RawConfig =
            envy::from_iter(vars).context("failed to parse VILLAGE_* environment variables")?;

        let data_dir = raw
            .village_data_dir
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| "village-data".to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            seed: raw.village_seed,
            batch_size: raw.village_batch_size.max(1),
            top_k: raw.village_top_k.max(1),
        })
    }

    /// Returns the configured seed, or draws a fresh one for this run.
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("village-data"));
        assert_eq!(config.seed, None);
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.top_k, 10);
    }

    #[test]
    fn reads_prefixed_variables() {
        let config = AppConfig::from_vars(vars(&[
            ("VILLAGE_DATA_DIR", "/tmp/village"),
            ("VILLAGE_SEED", "42"),
            ("VILLAGE_BATCH_SIZE", "250"),
            ("VILLAGE_TOP_K", "5"),
        ]))
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/village"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.resolve_seed(), 42);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let config = AppConfig::from_vars(vars(&[
            ("VILLAGE_BATCH_SIZE", "0"),
            ("VILLAGE_TOP_K", "0"),
        ]))
        .unwrap();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.top_k, 1);
    }

    #[test]
    fn rejects_non_numeric_seed() {
        assert!(AppConfig::from_vars(vars(&[("VILLAGE_SEED", "abc")])).is_err());
    }
}
