//! Release job description (`job.MF`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::property::{PropertyTree, PropertyValue};

/// Declared properties and links of one release job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Job name as declared by the release.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Template sources mapped to their destinations.
    #[serde(default)]
    pub templates: PropertyTree,
    /// Packages the job depends on.
    #[serde(default)]
    pub packages: Vec<String>,
    /// Property definitions keyed by dotted path (`a.b.c`).
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,
    /// Links this job exposes.
    #[serde(default)]
    pub provides: Vec<LinkProvider>,
    /// Links this job depends on.
    #[serde(default)]
    pub consumes: Vec<LinkConsumer>,
}

impl JobSpec {
    /// Parses a job spec from YAML.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document is malformed.
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Default value of a declared property, `null` when undeclared or
    /// declared without a default.
    #[must_use]
    pub fn default_for(&self, path: &str) -> &PropertyValue {
        static NULL: PropertyValue = PropertyValue::Null;
        self.properties.get(path).map_or(&NULL, |definition| &definition.default)
    }

    /// Tree of every declared property set to its default.
    #[must_use]
    pub fn defaults(&self) -> PropertyTree {
        let mut tree = PropertyTree::new();
        for (path, definition) in &self.properties {
            tree.insert_path(path, definition.default.clone());
        }
        tree
    }
}

/// A single property definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value; `null` when the property has none.
    #[serde(default)]
    pub default: PropertyValue,
}

/// A `provides` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkProvider {
    /// Declared link name.
    pub name: String,
    /// Link type; consumers bind by (type, name).
    #[serde(rename = "type")]
    pub link_type: String,
    /// Property paths exposed through the link.
    #[serde(default)]
    pub properties: Vec<String>,
}

/// A `consumes` declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConsumer {
    /// Declared consumer name.
    pub name: String,
    /// Link type to bind to.
    #[serde(rename = "type")]
    pub link_type: String,
    /// Whether the job tolerates the link being absent.
    #[serde(default)]
    pub optional: bool,
}
