// Entity types.
// Defines the root entity tree (pages and fields) and dependency entities as stored as JSON.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque entity identifier. Root and dependency entities share one namespace.
pub type EntityId = String;

/// Top-level resource being warmed (e.g. a form definition).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootEntity {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages: Vec<Page>,
    /// Any other attributes the store returns, kept verbatim.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RootEntity {
    pub fn new(id: impl Into<EntityId>, pages: Vec<Page>) -> Self {
        Self {
            id: id.into(),
            pages,
            attributes: Map::new(),
        }
    }

    /// Iterate every field in page order, then field order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.pages.iter().flat_map(|page| page.fields.iter())
    }
}

/// Ordered group of fields within a root entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<Field>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Page {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            attributes: Map::new(),
        }
    }
}

/// Single field carrying a loosely structured configuration blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub config: Value,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Field {
    pub fn with_config(config: Value) -> Self {
        Self {
            config,
            attributes: Map::new(),
        }
    }
}

/// Secondary resource referenced from inside a field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEntity {
    pub id: EntityId,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl DependencyEntity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Root entity plus every dependency that was fetched successfully.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmupResult {
    pub root: RootEntity,
    /// In dependency resolution order; failed or missing fetches are absent.
    pub dependencies: Vec<DependencyEntity>,
}

/// Reference to a consumer module the preloader should load ahead of time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleRef(pub String);

impl ModuleRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Treat an explicit JSON `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_without_pages() {
        let root: RootEntity = serde_json::from_value(json!({ "id": "R" })).unwrap();
        assert!(root.pages.is_empty());
        assert_eq!(root.fields().count(), 0);

        let root: RootEntity =
            serde_json::from_value(json!({ "id": "R", "pages": null })).unwrap();
        assert!(root.pages.is_empty());
    }

    #[test]
    fn test_root_keeps_extra_attributes() {
        let root: RootEntity = serde_json::from_value(json!({
            "id": "R",
            "title": "Inspection",
            "pages": [
                { "fields": [{ "config": { "group_id": "G1" }, "label": "Group" }] },
                { "fields": null },
                {}
            ]
        }))
        .unwrap();

        assert_eq!(root.attributes.get("title"), Some(&json!("Inspection")));
        assert_eq!(root.pages.len(), 3);
        let fields: Vec<&Field> = root.fields().collect();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].config, json!({ "group_id": "G1" }));
        assert_eq!(fields[0].attributes.get("label"), Some(&json!("Group")));
    }

    #[test]
    fn test_field_without_config_is_null() {
        let field: Field = serde_json::from_value(json!({ "label": "Name" })).unwrap();
        assert!(field.config.is_null());
    }

    #[test]
    fn test_dependency_serializes_flat() {
        let dep = DependencyEntity::new("G1").with_attribute("name", "Group1");
        assert_eq!(
            serde_json::to_value(&dep).unwrap(),
            json!({ "id": "G1", "name": "Group1" })
        );
    }

    #[test]
    fn test_module_ref_transparent() {
        let module: ModuleRef = serde_json::from_value(json!("forms/renderer")).unwrap();
        assert_eq!(module, ModuleRef::new("forms/renderer"));
        assert_eq!(module.to_string(), "forms/renderer");
    }
}
