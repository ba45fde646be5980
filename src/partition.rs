//! Cartesian fan-out of one acquisition request into single-valued partitions.
//!
//! A [`PartitionSet`] validates the request up front and knows its exact
//! cardinality; [`PartitionSet::iter`] walks the Cartesian product lazily,
//! in partition-key order with the last key varying fastest. Generation is
//! pure: no I/O, no side effects, restartable from the top at any time.

use crate::config::{Config, Parameters, Selection};
use crate::error::{Error, Result};
use std::sync::Arc;

/// One single-valued sub-request of a [`Config`].
///
/// Every partition key's axis is collapsed to exactly one value; all other
/// axes are shared untouched with the originating config.
#[derive(Clone, Debug)]
pub struct Partition {
    /// Parameters shared with the originating config
    pub parameters: Arc<Parameters>,
    /// Selection with a single-element value list per partition key
    pub selection: Selection,
}

impl Partition {
    /// The partition-key values pinning this partition, in key order.
    ///
    /// These are the values substituted into the target template.
    pub fn key_values(&self) -> Result<Vec<&str>> {
        self.parameters
            .partition_keys
            .iter()
            .map(|key| {
                self.selection
                    .get(key)
                    .and_then(|values| values.first())
                    .map(String::as_str)
                    .ok_or_else(|| {
                        Error::config(
                            format!("partition key `{key}` missing from partitioned selection"),
                            "partition_keys",
                        )
                    })
            })
            .collect()
    }
}

/// The validated Cartesian product of a request's partition-key axes
#[derive(Clone, Debug)]
pub struct PartitionSet {
    parameters: Arc<Parameters>,
    base: Selection,
    axes: Vec<Arc<Vec<String>>>,
}

impl PartitionSet {
    /// Validate a config for partitioning.
    ///
    /// Fails with a configuration error if any partition key is absent from
    /// the selection. Runs before any retrieval is attempted.
    pub fn new(config: &Config) -> Result<Self> {
        let mut axes = Vec::with_capacity(config.parameters.partition_keys.len());
        for key in &config.parameters.partition_keys {
            let values = config.selection.get(key).ok_or_else(|| {
                Error::config(
                    format!("partition key `{key}` is not present in selection"),
                    "partition_keys",
                )
            })?;
            axes.push(Arc::clone(values));
        }
        Ok(Self {
            parameters: Arc::new(config.parameters.clone()),
            base: config.selection.clone(),
            axes,
        })
    }

    /// Exact number of partitions: the product of each axis's length.
    ///
    /// An empty partition-key list yields the empty product, one partition.
    pub fn len(&self) -> usize {
        self.axes.iter().map(|axis| axis.len()).product()
    }

    /// Whether the product is empty (some axis has no values)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily iterate the partitions in lexicographic order:
    /// by partition-key order, then by each key's own value order.
    pub fn iter(&self) -> PartitionIter {
        PartitionIter {
            parameters: Arc::clone(&self.parameters),
            base: self.base.clone(),
            axes: self.axes.clone(),
            cursor: vec![0; self.axes.len()],
            remaining: self.len(),
        }
    }
}

/// Lazy odometer over the Cartesian product of partition-key axes
#[derive(Clone, Debug)]
pub struct PartitionIter {
    parameters: Arc<Parameters>,
    base: Selection,
    axes: Vec<Arc<Vec<String>>>,
    cursor: Vec<usize>,
    remaining: usize,
}

impl Iterator for PartitionIter {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        if self.remaining == 0 {
            return None;
        }

        // Copying the base map shares the untouched axis Arcs; only the
        // partition keys get fresh single-element lists.
        let mut selection = self.base.clone();
        for (idx, key) in self.parameters.partition_keys.iter().enumerate() {
            let value = self.axes[idx][self.cursor[idx]].clone();
            selection.insert(key.clone(), Arc::new(vec![value]));
        }

        // Advance the odometer, last key fastest.
        for idx in (0..self.cursor.len()).rev() {
            self.cursor[idx] += 1;
            if self.cursor[idx] < self.axes[idx].len() {
                break;
            }
            self.cursor[idx] = 0;
        }
        self.remaining -= 1;

        Some(Partition {
            parameters: Arc::clone(&self.parameters),
            selection,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PartitionIter {}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientKind;
    use std::collections::BTreeMap;

    fn test_config(partition_keys: &[&str], selection: &[(&str, &[&str])]) -> Config {
        Config {
            parameters: Parameters {
                dataset: "test-dataset".to_string(),
                client: ClientKind::Stub,
                partition_keys: partition_keys.iter().map(|k| k.to_string()).collect(),
                target_template: "out/{}.nc".to_string(),
                api_url: None,
                api_key: None,
                api_email: None,
            },
            selection: selection
                .iter()
                .map(|(key, values)| {
                    (
                        key.to_string(),
                        Arc::new(values.iter().map(|v| v.to_string()).collect()),
                    )
                })
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn test_cardinality_is_product_of_axis_lengths() {
        let config = test_config(
            &["year", "month", "day"],
            &[
                ("year", &["2019", "2020"]),
                ("month", &["01", "02", "03"]),
                ("day", &["01", "15"]),
                ("variable", &["temperature", "pressure"]),
            ],
        );

        let set = PartitionSet::new(&config).unwrap();
        assert_eq!(set.len(), 2 * 3 * 2);
        assert_eq!(set.iter().count(), 12, "iterator should yield len() items");
    }

    #[test]
    fn test_partition_keys_collapse_to_single_values() {
        let config = test_config(
            &["year", "month"],
            &[
                ("year", &["2020", "2021"]),
                ("month", &["01"]),
                ("variable", &["temperature"]),
            ],
        );

        let set = PartitionSet::new(&config).unwrap();
        for partition in set.iter() {
            assert_eq!(partition.selection["year"].len(), 1);
            assert_eq!(partition.selection["month"].len(), 1);
        }
    }

    #[test]
    fn test_non_partition_axes_are_shared_not_copied() {
        let config = test_config(
            &["year"],
            &[
                ("year", &["2020", "2021"]),
                ("variable", &["temperature", "pressure"]),
            ],
        );

        let set = PartitionSet::new(&config).unwrap();
        for partition in set.iter() {
            assert!(
                Arc::ptr_eq(&partition.selection["variable"], &config.selection["variable"]),
                "untouched axes should share the original allocation"
            );
        }
    }

    #[test]
    fn test_order_is_lexicographic_with_last_key_fastest() {
        let config = test_config(
            &["year", "month"],
            &[("year", &["2020", "2021"]), ("month", &["01", "02"])],
        );

        let set = PartitionSet::new(&config).unwrap();
        let coordinates: Vec<Vec<String>> = set
            .iter()
            .map(|p| p.key_values().unwrap().iter().map(|v| v.to_string()).collect())
            .collect();

        assert_eq!(
            coordinates,
            vec![
                vec!["2020".to_string(), "01".to_string()],
                vec!["2020".to_string(), "02".to_string()],
                vec!["2021".to_string(), "01".to_string()],
                vec!["2021".to_string(), "02".to_string()],
            ]
        );
    }

    #[test]
    fn test_iteration_is_restartable() {
        let config = test_config(
            &["year"],
            &[("year", &["2019", "2020", "2021"])],
        );

        let set = PartitionSet::new(&config).unwrap();
        let first: Vec<_> = set.iter().map(|p| p.key_values().unwrap().join("/")).collect();
        let second: Vec<_> = set.iter().map(|p| p.key_values().unwrap().join("/")).collect();
        assert_eq!(first, second, "a fresh iterator should replay the same sequence");
    }

    #[test]
    fn test_missing_partition_key_is_config_error() {
        let config = test_config(&["year", "level"], &[("year", &["2020"])]);

        match PartitionSet::new(&config) {
            Err(Error::Config { message, key }) => {
                assert!(message.contains("level"), "error should name the key: {message}");
                assert_eq!(key.as_deref(), Some("partition_keys"));
            }
            other => panic!("expected Config error, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_partition_keys_yield_one_partition() {
        let config = test_config(&[], &[("variable", &["temperature"])]);

        let set = PartitionSet::new(&config).unwrap();
        assert_eq!(set.len(), 1, "empty product has exactly one element");

        let partitions: Vec<_> = set.iter().collect();
        assert_eq!(partitions.len(), 1);
        assert!(
            Arc::ptr_eq(
                &partitions[0].selection["variable"],
                &config.selection["variable"]
            ),
            "the sole partition should carry the base selection unchanged"
        );
    }

    #[test]
    fn test_empty_axis_yields_no_partitions() {
        let config = test_config(&["year"], &[("year", &[])]);

        let set = PartitionSet::new(&config).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
