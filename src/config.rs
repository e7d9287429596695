use crate::common::Width;
use crate::error::{Error, Result};
use log::LevelFilter;
use std::convert::TryFrom;

pub const ENV_WIDTH: &str = "TRYOLITE_WIDTH";
pub const ENV_CHUNK_SIZE: &str = "TRYOLITE_CHUNK_SIZE";
pub const ENV_READABLE_ONLY: &str = "TRYOLITE_READABLE_ONLY";
pub const ENV_LOG: &str = "TRYOLITE_LOG";

/// Runtime settings, overridable through `TRYOLITE_*` environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Width of the searched integers
    pub width: Width,

    /// Upper bound of a single read while scanning a region
    pub chunk_size: usize,

    /// Skip regions mapped without read permission instead of failing on them
    pub readable_only: bool,

    pub log_level: LevelFilter,
}

fn default_chunk_size() -> usize {
    16 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: Width::default(),
            chunk_size: default_chunk_size(),
            readable_only: true,
            log_level: LevelFilter::Warn,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(value) = lookup(ENV_WIDTH) {
            config.width = value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|bytes| Width::try_from(bytes).ok())
                .ok_or(Error::Config {
                    key: ENV_WIDTH,
                    value,
                })?;
        }

        if let Some(value) = lookup(ENV_CHUNK_SIZE) {
            config.chunk_size = match value.trim().parse::<usize>() {
                Ok(size) if size >= config.width.bytes() => size,
                _ => {
                    return Err(Error::Config {
                        key: ENV_CHUNK_SIZE,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_READABLE_ONLY) {
            let flag = match value.trim() {
                "1" | "true" | "yes" => Some(true),
                "0" | "false" | "no" => Some(false),
                _ => None,
            };
            config.readable_only = flag.ok_or(Error::Config {
                key: ENV_READABLE_ONLY,
                value,
            })?;
        }

        if let Some(value) = lookup(ENV_LOG) {
            config.log_level = value.trim().parse().map_err(|_| Error::Config {
                key: ENV_LOG,
                value: value.clone(),
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.width, Width::DWORD);
        assert!(config.readable_only);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            (ENV_WIDTH, "8"),
            (ENV_CHUNK_SIZE, "4096"),
            (ENV_READABLE_ONLY, "false"),
            (ENV_LOG, "debug"),
        ]))
        .unwrap();
        assert_eq!(config.width, Width::QWORD);
        assert_eq!(config.chunk_size, 4096);
        assert!(!config.readable_only);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for (key, value) in &[
            (ENV_WIDTH, "3"),
            (ENV_WIDTH, "four"),
            (ENV_CHUNK_SIZE, "2"),
            (ENV_READABLE_ONLY, "maybe"),
            (ENV_LOG, "loud"),
        ] {
            match Config::from_lookup(lookup(&[(*key, *value)])) {
                Err(Error::Config { key: k, value: v }) => {
                    assert_eq!(k, *key);
                    assert_eq!(v, *value);
                }
                other => panic!("{}={} gave {:?}", key, value, other),
            }
        }
    }
}
