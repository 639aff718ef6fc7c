// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Mode behaviors: the two interchangeable ways a target is identified.
//!
//! Each variant of [`SelectorMode`] has a [`ModeBehavior`] that knows how to
//! migrate selector state into its representation, how to store a kind
//! change, and how to read the kind back out. New modes are added by adding
//! a variant and an arm in [`behavior_for`]; callers never branch on the
//! mode themselves.

use super::record::{Selector, SelectorMode, pack_manifest_name, parse_manifest_name};

/// Per-mode editing capabilities over the shared [`Selector`].
///
/// Behaviors are stateless; they are only ever invoked by the controller,
/// which owns the record and notifies the owner after each mutation.
pub trait ModeBehavior {
    /// Whether this behavior serves the given mode.
    fn handles(&self, mode: SelectorMode) -> bool;

    /// Migrate state from the previously-active representation into this
    /// mode's representation. The selector's `mode` field has already been
    /// set when this runs.
    fn on_mode_activated(&self, selector: &mut Selector);

    /// Store a kind change using this mode's storage convention.
    fn on_kind_changed(&self, selector: &mut Selector, kind: &str);

    /// Read the kind back out using this mode's storage convention.
    fn current_kind(&self, selector: &Selector) -> Option<String>;
}

/// Kind and name packed into the single `manifest_name` field.
pub struct StaticBehavior;

impl ModeBehavior for StaticBehavior {
    fn handles(&self, mode: SelectorMode) -> bool {
        mode == SelectorMode::Static
    }

    fn on_mode_activated(&self, selector: &mut Selector) {
        // Carry the dynamic kind into the packed representation, preserving
        // any name the user had previously entered.
        let prior = parse_manifest_name(&selector.manifest_name);
        let kind = std::mem::take(&mut selector.kind);
        selector.manifest_name = pack_manifest_name(Some(kind.as_str()), &prior.name);
        selector.cluster.clear();
        selector.criteria.clear();
    }

    fn on_kind_changed(&self, selector: &mut Selector, kind: &str) {
        let prior = parse_manifest_name(&selector.manifest_name);
        selector.manifest_name = pack_manifest_name(Some(kind), &prior.name);
    }

    fn current_kind(&self, selector: &Selector) -> Option<String> {
        parse_manifest_name(&selector.manifest_name).kind
    }
}

/// Kind stored in the dedicated `kind` field; name resolved at execution
/// time from `cluster` + `criteria`.
pub struct DynamicBehavior;

impl ModeBehavior for DynamicBehavior {
    fn handles(&self, mode: SelectorMode) -> bool {
        mode == SelectorMode::Dynamic
    }

    fn on_mode_activated(&self, selector: &mut Selector) {
        let prior = parse_manifest_name(&selector.manifest_name);
        selector.kind = prior.kind.unwrap_or_default();
        selector.manifest_name.clear();
    }

    fn on_kind_changed(&self, selector: &mut Selector, kind: &str) {
        selector.kind = kind.to_string();
    }

    fn current_kind(&self, selector: &Selector) -> Option<String> {
        (!selector.kind.is_empty()).then(|| selector.kind.clone())
    }
}

static STATIC_BEHAVIOR: StaticBehavior = StaticBehavior;
static DYNAMIC_BEHAVIOR: DynamicBehavior = DynamicBehavior;

/// Resolve the behavior for a mode.
///
/// The match is exhaustive over the enum, so an unhandled mode cannot
/// compile; the assertion pins the `handles` contract to the arm it
/// resolved to.
pub fn behavior_for(mode: SelectorMode) -> &'static dyn ModeBehavior {
    let behavior: &'static dyn ModeBehavior = match mode {
        SelectorMode::Static => &STATIC_BEHAVIOR,
        SelectorMode::Dynamic => &DYNAMIC_BEHAVIOR,
    };
    debug_assert!(behavior.handles(mode));
    behavior
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dynamic_selector() -> Selector {
        Selector {
            mode: SelectorMode::Dynamic,
            kind: "Deployment".to_string(),
            account: "prod".to_string(),
            location: Some("default".to_string()),
            cluster: "app-main".to_string(),
            criteria: "newest".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_behavior_for_handles_both_modes() {
        assert!(behavior_for(SelectorMode::Static).handles(SelectorMode::Static));
        assert!(behavior_for(SelectorMode::Dynamic).handles(SelectorMode::Dynamic));
        assert!(!behavior_for(SelectorMode::Static).handles(SelectorMode::Dynamic));
    }

    #[test]
    fn test_activate_static_from_dynamic() {
        let mut selector = dynamic_selector();
        selector.mode = SelectorMode::Static;
        behavior_for(SelectorMode::Static).on_mode_activated(&mut selector);

        // The dynamic kind is packed with no name; the query fields clear.
        assert_eq!(selector.manifest_name, "Deployment");
        assert_eq!(selector.kind, "");
        assert_eq!(selector.cluster, "");
        assert_eq!(selector.criteria, "");
    }

    #[test]
    fn test_activate_static_preserves_entered_name() {
        let mut selector = Selector {
            mode: SelectorMode::Static,
            manifest_name: "ReplicaSet my-rs".to_string(),
            kind: "Deployment".to_string(),
            ..Default::default()
        };
        behavior_for(SelectorMode::Static).on_mode_activated(&mut selector);
        assert_eq!(selector.manifest_name, "Deployment my-rs");
    }

    #[test]
    fn test_activate_dynamic_from_static() {
        let mut selector = Selector {
            mode: SelectorMode::Dynamic,
            manifest_name: "Deployment foo".to_string(),
            ..Default::default()
        };
        behavior_for(SelectorMode::Dynamic).on_mode_activated(&mut selector);

        assert_eq!(selector.kind, "Deployment");
        assert_eq!(selector.manifest_name, "");
    }

    #[test]
    fn test_activate_dynamic_from_kindless_name() {
        let mut selector = Selector {
            mode: SelectorMode::Dynamic,
            manifest_name: " foo".to_string(),
            ..Default::default()
        };
        behavior_for(SelectorMode::Dynamic).on_mode_activated(&mut selector);
        assert_eq!(selector.kind, "");
    }

    #[test]
    fn test_static_kind_change_preserves_name() {
        let mut selector = Selector {
            manifest_name: "Deployment foo".to_string(),
            ..Default::default()
        };
        let behavior = behavior_for(SelectorMode::Static);
        behavior.on_kind_changed(&mut selector, "StatefulSet");
        assert_eq!(selector.manifest_name, "StatefulSet foo");
        assert_eq!(behavior.current_kind(&selector).as_deref(), Some("StatefulSet"));
    }

    #[test]
    fn test_dynamic_kind_change() {
        let mut selector = dynamic_selector();
        let behavior = behavior_for(SelectorMode::Dynamic);
        behavior.on_kind_changed(&mut selector, "Service");
        assert_eq!(selector.kind, "Service");
        assert_eq!(behavior.current_kind(&selector).as_deref(), Some("Service"));
    }

    #[test]
    fn test_current_kind_empty_when_unset() {
        let selector = Selector::default();
        assert_eq!(behavior_for(SelectorMode::Static).current_kind(&selector), None);
        assert_eq!(behavior_for(SelectorMode::Dynamic).current_kind(&selector), None);
    }
}
