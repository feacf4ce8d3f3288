use crate::tvmaze::TVMAZE_BASE;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BIND: &str = "0.0.0.0:3147";
const DEFAULT_STORE_PATH: &str = "data/showshelf.json";
const DEFAULT_SEED_KEY: &str = "harry";
const DEFAULT_PRESETS: &str = "harry,friends,office,simpsons";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub tvmaze_base_url: String,
    pub store_path: PathBuf,
    pub seed_key: String,
    pub presets: Vec<String>,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = var("SHOWSHELF_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .with_context(|| format!("SHOWSHELF_BIND is not a socket address: {bind_raw}"))?;

        let http_timeout = match var("SHOWSHELF_HTTP_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse::<u64>().with_context(|| {
                format!("SHOWSHELF_HTTP_TIMEOUT_SECS is not a number of seconds: {raw}")
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let presets = parse_presets(
            &var("SHOWSHELF_PRESETS").unwrap_or_else(|| DEFAULT_PRESETS.to_string()),
        );

        Ok(Self {
            bind,
            tvmaze_base_url: var("TVMAZE_BASE_URL").unwrap_or_else(|| TVMAZE_BASE.to_string()),
            store_path: var("SHOWSHELF_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH)),
            seed_key: var("SHOWSHELF_SEED_KEY")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| DEFAULT_SEED_KEY.to_string()),
            presets,
            http_timeout,
        })
    }
}

/// Comma-separated names; blanks and case-insensitive repeats are dropped.
fn parse_presets(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !out.iter().any(|p| p.eq_ignore_ascii_case(name)) {
            out.push(name.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.bind.port(), 3147);
        assert_eq!(cfg.tvmaze_base_url, TVMAZE_BASE);
        assert_eq!(cfg.seed_key, "harry");
        assert_eq!(cfg.presets, vec!["harry", "friends", "office", "simpsons"]);
        assert_eq!(cfg.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn presets_drop_blanks_and_repeats() {
        let cfg = config_from(&[("SHOWSHELF_PRESETS", " lost, ,Lost,dark ")]).unwrap();
        assert_eq!(cfg.presets, vec!["lost", "dark"]);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config_from(&[("SHOWSHELF_BIND", "nowhere")]).unwrap_err();
        assert!(err.to_string().contains("SHOWSHELF_BIND"));
        let err = config_from(&[("SHOWSHELF_HTTP_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SHOWSHELF_HTTP_TIMEOUT_SECS"));
    }
}
