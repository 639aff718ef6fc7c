// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod csv;
mod json;
mod table;
mod yaml;

pub use csv::CsvFormatter;
pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use crate::cli::OutputFormat;
use crate::search::AccountDetails;

/// A columns + rows listing ready for formatting.
#[derive(Debug, Clone)]
pub struct Listing {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Listing {
    pub fn format(&self, format: &OutputFormat, no_headers: bool) -> String {
        match format {
            OutputFormat::Table => TableFormatter::format(self, no_headers),
            OutputFormat::Json => JsonFormatter::format(self),
            OutputFormat::Csv => CsvFormatter::format(self, no_headers),
            OutputFormat::Yaml => YamlFormatter::format(self),
        }
    }

    #[allow(dead_code)]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as an array of column-keyed objects (for json/yaml output)
    pub fn to_json_rows(&self) -> Vec<serde_json::Value> {
        self.rows
            .iter()
            .map(|row| {
                let map: serde_json::Map<String, serde_json::Value> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, val)| (col.clone(), serde_json::Value::String(val.clone())))
                    .collect();
                serde_json::Value::Object(map)
            })
            .collect()
    }
}

/// Candidate names for a `(kind, namespace, account)` triple.
pub fn candidates_listing(kind: &str, namespace: &str, account: &str, names: &[String]) -> Listing {
    Listing {
        columns: vec![
            "name".to_string(),
            "kind".to_string(),
            "namespace".to_string(),
            "account".to_string(),
        ],
        rows: names
            .iter()
            .map(|name| {
                vec![
                    name.clone(),
                    kind.to_string(),
                    namespace.to_string(),
                    account.to_string(),
                ]
            })
            .collect(),
    }
}

/// Accounts with their namespace and kind counts.
pub fn accounts_listing(accounts: &[AccountDetails]) -> Listing {
    Listing {
        columns: vec![
            "account".to_string(),
            "namespaces".to_string(),
            "kinds".to_string(),
        ],
        rows: accounts
            .iter()
            .map(|account| {
                vec![
                    account.name.clone(),
                    account.namespaces.len().to_string(),
                    account.kind_map.len().to_string(),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_listing_shape() {
        let names = vec!["alpha".to_string(), "beta".to_string()];
        let listing = candidates_listing("Deployment", "default", "prod", &names);
        assert_eq!(listing.row_count(), 2);
        assert_eq!(listing.rows[0], vec!["alpha", "Deployment", "default", "prod"]);
    }

    #[test]
    fn test_to_json_rows_keys_by_column() {
        let listing = candidates_listing("Deployment", "default", "prod", &["a".to_string()]);
        let rows = listing.to_json_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "a");
        assert_eq!(rows[0]["account"], "prod");
    }

    #[test]
    fn test_empty_listing() {
        let listing = candidates_listing("Deployment", "default", "prod", &[]);
        assert!(listing.is_empty());
        assert!(listing.to_json_rows().is_empty());
    }
}
