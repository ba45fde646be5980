//! Configuration types for geodata-dl
//!
//! A [`Config`] describes one logical acquisition request: the `parameters`
//! section addresses a dataset on a backend and shapes its output paths, and
//! the `selection` section spans the full request domain, one ordered value
//! list per axis. How the structure is produced (CLI flags, config files) is
//! the embedding application's concern; this crate only consumes it.

use crate::client::ClientKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Full request domain: ordered mapping from axis key to that axis's values.
///
/// Value lists are reference-counted so partitioning can pass untouched axes
/// through to every partition without copying them.
pub type Selection = BTreeMap<String, Arc<Vec<String>>>;

/// Dataset addressing, partitioning, and credential parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Parameters {
    /// Dataset identifier understood by the selected backend
    pub dataset: String,

    /// Which archival backend serves this dataset (default: archive)
    #[serde(default)]
    pub client: ClientKind,

    /// Axes to fan out over, in order. Each must be present in `selection`.
    pub partition_keys: Vec<String>,

    /// Output path template with one positional `{}` placeholder per
    /// partition key, filled in partition-key order
    pub target_template: String,

    /// Service endpoint URL (falls back to the backend's environment variable)
    #[serde(default)]
    pub api_url: Option<String>,

    /// Service API key (falls back to the backend's environment variable)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Account email, for backends that require one (environment fallback)
    #[serde(default)]
    pub api_email: Option<String>,
}

/// One logical acquisition request, immutable once loaded
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Dataset addressing and partitioning parameters
    pub parameters: Parameters,

    /// Full axis domain; must cover every partition key
    #[serde(default)]
    pub selection: Selection,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserializes_from_mapping_structure() {
        let config: Config = serde_json::from_str(
            r#"{
                "parameters": {
                    "dataset": "reanalysis-era5-pressure-levels",
                    "client": "cache",
                    "partition_keys": ["year", "month"],
                    "target_template": "gs://bucket/era5/{}/{}.nc",
                    "api_key": "00000:secret"
                },
                "selection": {
                    "year": ["2020", "2021"],
                    "month": ["01", "02"],
                    "variable": ["temperature"]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.parameters.dataset, "reanalysis-era5-pressure-levels");
        assert_eq!(config.parameters.client, ClientKind::Cache);
        assert_eq!(config.parameters.partition_keys, vec!["year", "month"]);
        assert_eq!(config.parameters.api_url, None);
        assert_eq!(config.selection["variable"].as_ref(), &["temperature"]);
    }

    #[test]
    fn test_client_kind_defaults_to_archive() {
        let config: Config = serde_json::from_str(
            r#"{
                "parameters": {
                    "dataset": "oper-fc-sfc",
                    "partition_keys": [],
                    "target_template": "out.grib"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.parameters.client, ClientKind::Archive);
        assert!(config.selection.is_empty());
    }
}
