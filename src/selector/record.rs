// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! The selector record and its manifest-name encoding.
//!
//! A [`Selector`] identifies a deployable Kubernetes resource in one of two
//! ways: a static `"<kind> <name>"` manifest name, or a dynamic query over
//! `kind` + `cluster` + `criteria`. Which representation is authoritative is
//! decided by [`SelectorMode`]; the mode transition rules live in
//! `selector::modes`.

use serde::{Deserialize, Serialize};

/// Marker that a field value is a templated expression (e.g. `${account}`)
/// resolved at runtime, never at edit time.
const EXPRESSION_MARKER: &str = "${";

/// How the target resource is identified.
///
/// Records with no mode stored are treated as `Static`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectorMode {
    /// Explicit kind + name, packed into `manifestName`.
    #[default]
    Static,
    /// Kind + cluster + criteria query, resolved at execution time.
    Dynamic,
}

impl SelectorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorMode::Static => "static",
            SelectorMode::Dynamic => "dynamic",
        }
    }
}

/// User-editable record identifying a target deployable resource.
///
/// Owned by the embedding form/stage configuration; the controller mutates
/// it in place and reports every mutation through the owner callback. The
/// camelCase serde shape matches the record persisted upstream.
///
/// Invariants (enforced by the mode behaviors):
/// - `Static`: `kind`, `cluster` and `criteria` are empty; `manifest_name`
///   encodes kind and name.
/// - `Dynamic`: `manifest_name` is empty; `kind` holds the resource kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Selector {
    pub mode: SelectorMode,
    pub manifest_name: String,
    pub kind: String,
    pub account: String,
    /// Target namespace. `None` when cleared; may hold a templated
    /// expression, which is passed through untouched.
    pub location: Option<String>,
    pub cluster: String,
    pub criteria: String,
}

/// True when `value` defers to runtime evaluation (`${...}`).
pub fn is_expression(value: &str) -> bool {
    value.contains(EXPRESSION_MARKER)
}

/// A manifest name split into its kind and name portions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestName {
    pub kind: Option<String>,
    pub name: String,
}

/// Split a manifest name on the first space into `(kind, name)`.
///
/// An empty first token (`" my-name"`) yields `kind = None`; a value with
/// no space at all is a bare kind with an empty name.
pub fn parse_manifest_name(raw: &str) -> ManifestName {
    match raw.split_once(' ') {
        Some((kind, name)) => ManifestName {
            kind: (!kind.is_empty()).then(|| kind.to_string()),
            name: name.to_string(),
        },
        None => ManifestName {
            kind: (!raw.is_empty()).then(|| raw.to_string()),
            name: String::new(),
        },
    }
}

/// Reassemble a manifest name from its parts.
///
/// With a kind: `"<kind> <name>"`, or just `"<kind>"` when the name is
/// empty. Without a kind the name keeps its leading-space encoding
/// (`" <name>"`) so that parse/pack round-trips exactly.
pub fn pack_manifest_name(kind: Option<&str>, name: &str) -> String {
    match kind {
        Some(kind) if !kind.is_empty() => {
            if name.is_empty() {
                kind.to_string()
            } else {
                format!("{} {}", kind, name)
            }
        }
        _ => format!(" {}", name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_and_name() {
        let parsed = parse_manifest_name("Deployment foo");
        assert_eq!(parsed.kind.as_deref(), Some("Deployment"));
        assert_eq!(parsed.name, "foo");
    }

    #[test]
    fn test_parse_bare_kind() {
        let parsed = parse_manifest_name("Deployment");
        assert_eq!(parsed.kind.as_deref(), Some("Deployment"));
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn test_parse_leading_space_has_no_kind() {
        let parsed = parse_manifest_name(" foo");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.name, "foo");
    }

    #[test]
    fn test_parse_empty() {
        let parsed = parse_manifest_name("");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn test_parse_name_may_contain_spaces() {
        // Only the first space delimits the kind.
        let parsed = parse_manifest_name("ConfigMap my config");
        assert_eq!(parsed.kind.as_deref(), Some("ConfigMap"));
        assert_eq!(parsed.name, "my config");
    }

    #[test]
    fn test_pack_round_trip() {
        let packed = pack_manifest_name(Some("Deployment"), "foo");
        assert_eq!(packed, "Deployment foo");
        let parsed = parse_manifest_name(&packed);
        assert_eq!(parsed.kind.as_deref(), Some("Deployment"));
        assert_eq!(parsed.name, "foo");
    }

    #[test]
    fn test_pack_kind_only() {
        assert_eq!(pack_manifest_name(Some("Deployment"), ""), "Deployment");
    }

    #[test]
    fn test_pack_without_kind_keeps_leading_space() {
        let packed = pack_manifest_name(None, "foo");
        assert_eq!(packed, " foo");
        let parsed = parse_manifest_name(&packed);
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.name, "foo");
    }

    #[test]
    fn test_pack_empty_kind_and_name() {
        // The reconstruction rule is applied literally: no kind means the
        // leading-space form, even when the name is empty too.
        assert_eq!(pack_manifest_name(None, ""), " ");
        assert_eq!(pack_manifest_name(Some(""), ""), " ");
        let parsed = parse_manifest_name(" ");
        assert_eq!(parsed.kind, None);
        assert_eq!(parsed.name, "");
    }

    #[test]
    fn test_is_expression() {
        assert!(is_expression("${myAccount}"));
        assert!(is_expression("prefix-${env}"));
        assert!(!is_expression("prod-cluster"));
        assert!(!is_expression("$not-an-expression"));
    }

    #[test]
    fn test_mode_defaults_to_static() {
        let selector: Selector = serde_json::from_str("{}").unwrap();
        assert_eq!(selector.mode, SelectorMode::Static);
    }

    #[test]
    fn test_selector_serde_camel_case() {
        let selector = Selector {
            mode: SelectorMode::Dynamic,
            kind: "replicaSet".to_string(),
            account: "prod".to_string(),
            location: Some("default".to_string()),
            cluster: "app-main".to_string(),
            criteria: "newest".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&selector).unwrap();
        assert_eq!(json["mode"], "dynamic");
        assert_eq!(json["manifestName"], "");
        assert_eq!(json["cluster"], "app-main");

        let back: Selector = serde_json::from_value(json).unwrap();
        assert_eq!(back, selector);
    }
}
