// Dependency resolver.
// Walks root entity pages and fields, extracting group identifiers from free-form field configs.

use std::collections::HashSet;

use serde_json::Value;

use crate::config::DEFAULT_GROUP_KEYS;
use crate::entity::{EntityId, RootEntity};

/// One candidate location for a dependency identifier inside a field config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAccessor {
    /// Top-level key, e.g. `group_id`.
    Key(String),
    /// Key nested one level deep, e.g. `group.id`.
    Nested(String, String),
}

impl KeyAccessor {
    /// Parse a key path; a single dot splits outer and inner key.
    pub fn parse(path: &str) -> Self {
        match path.split_once('.') {
            Some((outer, inner)) => KeyAccessor::Nested(outer.to_string(), inner.to_string()),
            None => KeyAccessor::Key(path.to_string()),
        }
    }

    /// Look the accessor up in a config value. Non-object shapes never match.
    fn lookup<'a>(&self, config: &'a Value) -> Option<&'a Value> {
        match self {
            KeyAccessor::Key(key) => config.get(key),
            KeyAccessor::Nested(outer, inner) => config.get(outer)?.get(inner),
        }
    }

    /// Extract an identifier, coercing scalars to strings.
    pub fn extract(&self, config: &Value) -> Option<EntityId> {
        match self.lookup(config)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Ordered list of accessors; the first that yields an identifier wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupKeyPrecedence {
    accessors: Vec<KeyAccessor>,
}

impl GroupKeyPrecedence {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accessors: keys
                .into_iter()
                .map(|k| KeyAccessor::parse(k.as_ref()))
                .collect(),
        }
    }

    pub fn accessors(&self) -> &[KeyAccessor] {
        &self.accessors
    }

    /// Identifier referenced by a single field config, if any.
    pub fn extract(&self, config: &Value) -> Option<EntityId> {
        self.accessors.iter().find_map(|accessor| accessor.extract(config))
    }
}

impl Default for GroupKeyPrecedence {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_KEYS)
    }
}

/// Deduplicated dependency identifiers in first-seen traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    ids: Vec<EntityId>,
    seen: HashSet<EntityId>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identifier. Returns false if it was already present.
    pub fn insert(&mut self, id: EntityId) -> bool {
        if self.seen.contains(&id) {
            return false;
        }
        self.seen.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EntityId> {
        self.ids.iter()
    }

    pub fn into_vec(self) -> Vec<EntityId> {
        self.ids
    }
}

impl<'a> IntoIterator for &'a DependencySet {
    type Item = &'a EntityId;
    type IntoIter = std::slice::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// Pure resolver from a root entity tree to its dependency identifiers.
#[derive(Debug, Clone, Default)]
pub struct DependencyResolver {
    precedence: GroupKeyPrecedence,
}

impl DependencyResolver {
    pub fn new(precedence: GroupKeyPrecedence) -> Self {
        Self { precedence }
    }

    pub fn precedence(&self) -> &GroupKeyPrecedence {
        &self.precedence
    }

    /// Collect the identifiers referenced by every field, pages first then fields.
    pub fn resolve(&self, root: &RootEntity) -> DependencySet {
        let mut set = DependencySet::new();
        for field in root.fields() {
            if let Some(id) = self.precedence.extract(&field.config) {
                set.insert(id);
            }
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Field, Page};
    use serde_json::json;

    fn root_with_configs(pages: Vec<Vec<Value>>) -> RootEntity {
        RootEntity::new(
            "R",
            pages
                .into_iter()
                .map(|configs| Page::new(configs.into_iter().map(Field::with_config).collect()))
                .collect(),
        )
    }

    #[test]
    fn test_precedence_picks_first_declared() {
        let precedence = GroupKeyPrecedence::default();
        let config = json!({ "group_id": "B", "id_group": "A" });
        assert_eq!(precedence.extract(&config), Some("A".to_string()));
    }

    #[test]
    fn test_nested_accessor() {
        let precedence = GroupKeyPrecedence::default();
        assert_eq!(
            precedence.extract(&json!({ "group": { "id": "N1" } })),
            Some("N1".to_string())
        );
        // Flat keys still outrank the nested one
        assert_eq!(
            precedence.extract(&json!({ "group": { "id": "N1" }, "idGroup": "F1" })),
            Some("F1".to_string())
        );
    }

    #[test]
    fn test_null_candidate_falls_through() {
        let precedence = GroupKeyPrecedence::default();
        let config = json!({ "id_group": null, "groupId": "C" });
        assert_eq!(precedence.extract(&config), Some("C".to_string()));
    }

    #[test]
    fn test_scalars_coerced_to_string() {
        let precedence = GroupKeyPrecedence::default();
        assert_eq!(
            precedence.extract(&json!({ "group_id": 42 })),
            Some("42".to_string())
        );
        assert_eq!(
            precedence.extract(&json!({ "group_id": true })),
            Some("true".to_string())
        );
    }

    #[test]
    fn test_malformed_configs_contribute_nothing() {
        let resolver = DependencyResolver::default();
        let root = root_with_configs(vec![vec![
            json!(42),
            Value::Null,
            json!({ "unrelated": true }),
            json!("group_id"),
            json!([{ "group_id": "X" }]),
            json!({ "group": "not-an-object" }),
            json!({ "group": { "id": null } }),
            json!({ "group_id": ["X"] }),
        ]]);
        assert!(resolver.resolve(&root).is_empty());
    }

    #[test]
    fn test_missing_pages_and_fields() {
        let resolver = DependencyResolver::default();
        assert!(resolver.resolve(&RootEntity::new("R", Vec::new())).is_empty());
        assert!(
            resolver
                .resolve(&RootEntity::new("R", vec![Page::default()]))
                .is_empty()
        );
    }

    #[test]
    fn test_dedup_across_keys() {
        let resolver = DependencyResolver::default();
        let root = root_with_configs(vec![
            vec![json!({ "group_id": "G1" })],
            vec![json!({ "groupId": "G1" })],
        ]);
        let set = resolver.resolve(&root);
        assert_eq!(set.len(), 1);
        assert!(set.contains("G1"));
    }

    #[test]
    fn test_first_seen_order_and_determinism() {
        let resolver = DependencyResolver::default();
        let root = root_with_configs(vec![
            vec![json!({ "idGroup": "B" }), json!({ "id_grupo": "A" })],
            vec![json!({ "group": { "id": "C" } }), json!({ "group_id": "B" })],
        ]);

        let first = resolver.resolve(&root);
        let second = resolver.resolve(&root);
        assert_eq!(first, second);
        assert_eq!(first.into_vec(), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_custom_precedence() {
        let resolver = DependencyResolver::new(GroupKeyPrecedence::new(["catalog.ref", "lookup"]));
        let root = root_with_configs(vec![vec![
            json!({ "lookup": "L1", "catalog": { "ref": "C1" } }),
            json!({ "group_id": "ignored" }),
        ]]);
        assert_eq!(resolver.resolve(&root).into_vec(), vec!["C1"]);
    }

    #[test]
    fn test_parse_accessor() {
        assert_eq!(KeyAccessor::parse("groupId"), KeyAccessor::Key("groupId".into()));
        assert_eq!(
            KeyAccessor::parse("group.id"),
            KeyAccessor::Nested("group".into(), "id".into())
        );
    }
}
