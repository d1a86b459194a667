//! Platform applicability rules for libraries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

/// `os` constraint of a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of a library's `rules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<OsRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryRule {
    pub fn new(action: RuleAction, os: Option<Platform>) -> Self {
        Self {
            action,
            os: os.map(|p| OsRule {
                name: Some(p.as_str().to_string()),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// A rule without an OS name matches every platform.
    pub fn matches(&self, platform: Platform) -> bool {
        match self.os.as_ref().and_then(|os| os.name.as_deref()) {
            None => true,
            Some(name) => name == platform.as_str(),
        }
    }
}

/// Whether a library with `rules` is used on `platform`.
///
/// A matching `disallow` always excludes. Otherwise, if any `allow` rules
/// exist at least one must match. No rules at all includes.
pub fn applies_to(rules: &[LibraryRule], platform: Platform) -> bool {
    if rules
        .iter()
        .any(|r| r.action == RuleAction::Disallow && r.matches(platform))
    {
        return false;
    }

    let mut allows = rules
        .iter()
        .filter(|r| r.action == RuleAction::Allow)
        .peekable();
    if allows.peek().is_none() {
        return true;
    }
    allows.any(|r| r.matches(platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn platform() -> impl Strategy<Value = Platform> {
        prop_oneof![
            Just(Platform::Windows),
            Just(Platform::Osx),
            Just(Platform::Linux)
        ]
    }

    fn rule() -> impl Strategy<Value = LibraryRule> {
        (
            prop_oneof![Just(RuleAction::Allow), Just(RuleAction::Disallow)],
            proptest::option::of(platform()),
        )
            .prop_map(|(action, os)| LibraryRule::new(action, os))
    }

    #[test]
    fn test_no_rules_includes() {
        for platform in Platform::all() {
            assert!(applies_to(&[], platform));
        }
    }

    #[test]
    fn test_typical_lwjgl_rules() {
        let rules = vec![
            LibraryRule::new(RuleAction::Allow, None),
            LibraryRule::new(RuleAction::Disallow, Some(Platform::Osx)),
        ];
        assert!(applies_to(&rules, Platform::Linux));
        assert!(applies_to(&rules, Platform::Windows));
        assert!(!applies_to(&rules, Platform::Osx));
    }

    #[test]
    fn test_osx_only() {
        let rules = vec![LibraryRule::new(RuleAction::Allow, Some(Platform::Osx))];
        assert!(applies_to(&rules, Platform::Osx));
        assert!(!applies_to(&rules, Platform::Linux));
    }

    #[test]
    fn test_parse_rule_with_version_constraint() {
        let rule: LibraryRule = serde_json::from_str(
            r#"{"action": "disallow", "os": {"name": "osx", "version": "^10\\.5\\.\\d$"}}"#,
        )
        .unwrap();
        assert!(rule.matches(Platform::Osx));
        assert!(!rule.matches(Platform::Linux));
        assert!(rule.os.unwrap().extra.contains_key("version"));
    }

    proptest! {
        #[test]
        fn prop_matching_disallow_always_excludes(
            mut rules in proptest::collection::vec(rule(), 0..6),
            platform in platform(),
            position in 0usize..6,
        ) {
            let index = position.min(rules.len());
            rules.insert(index, LibraryRule::new(RuleAction::Disallow, Some(platform)));
            prop_assert!(!applies_to(&rules, platform));
        }

        #[test]
        fn prop_allow_rules_require_a_match(
            rules in proptest::collection::vec(rule(), 0..6),
            platform in platform(),
        ) {
            let excluded = rules
                .iter()
                .any(|r| r.action == RuleAction::Disallow && r.matches(platform));
            let allows: Vec<_> = rules.iter().filter(|r| r.action == RuleAction::Allow).collect();

            let expected = if excluded {
                false
            } else if allows.is_empty() {
                true
            } else {
                allows.iter().any(|r| r.matches(platform))
            };
            prop_assert_eq!(applies_to(&rules, platform), expected);
        }

        #[test]
        fn prop_adding_a_matching_allow_never_excludes(
            rules in proptest::collection::vec(rule(), 0..6),
            platform in platform(),
        ) {
            let before = applies_to(&rules, platform);
            let mut extended = rules.clone();
            extended.push(LibraryRule::new(RuleAction::Allow, Some(platform)));
            if before {
                prop_assert!(applies_to(&extended, platform));
            }
        }
    }
}
