//! Resource type registry
//!
//! Each domain registers the resource types it serves and their
//! relationships. Surfaces read it back when shaping responses.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use evas_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Shape of one resource type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceType {
    /// Attribute carrying the identifier
    pub id_field: String,
    /// Relationship name to related resource type
    pub relationships: BTreeMap<String, String>,
}

impl Default for ResourceType {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceType {
    pub fn new() -> Self {
        Self {
            id_field: "id".to_string(),
            relationships: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_relationship<N: Into<String>, T: Into<String>>(
        mut self,
        name: N,
        target: T,
    ) -> Self {
        self.relationships.insert(name.into(), target.into());
        self
    }
}

/// Resource types of one domain
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: Arc<DashMap<String, ResourceType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `resource` under `name`; names are unique
    pub fn register_type<S: Into<String>>(&self, name: S, resource: ResourceType) -> Result<()> {
        match self.types.entry(name.into()) {
            dashmap::mapref::entry::Entry::Occupied(slot) => {
                Err(Error::api(slot.key().clone(), "resource type already registered"))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(resource);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<ResourceType> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Relationship targets that are not registered themselves
    pub fn dangling_relationships(&self) -> Vec<(String, String)> {
        let snapshot: Vec<(String, ResourceType)> = self
            .types
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();

        let mut dangling = Vec::new();
        for (name, resource) in &snapshot {
            for (relationship, target) in &resource.relationships {
                if !snapshot.iter().any(|(known, _)| known == target) {
                    dangling.push((format!("{name}.{relationship}"), target.clone()));
                }
            }
        }
        dangling.sort();
        dangling
    }
}
