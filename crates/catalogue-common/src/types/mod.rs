//! Catalogue record types shared across the workspace
//!
//! Assets and connectors are stored as JSON documents. The `*Draft` types are
//! the document bodies; [`Asset`] and [`Connector`] pair a body with the
//! store-assigned identifier, serialized as `_id`.

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{CatalogueError, Result};

/// Name of the identifier field on every stored document
pub const RECORD_ID_FIELD: &str = "_id";

// ============================================================================
// Parameters
// ============================================================================

/// A named connection parameter
///
/// Parameter lists are ordered and may repeat names; lookups return the first
/// match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Value of the first parameter called `name`
    pub fn find<'a>(parameters: &'a [Parameter], name: &str) -> Option<&'a str> {
        parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }
}

// ============================================================================
// Assets
// ============================================================================

/// Descriptive metadata of an asset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetModel {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub format: String,
}

/// How an asset is reached: connector, protocol and its parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    #[serde(default, alias = "name")]
    pub connector: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// Asset document body, as registered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDraft {
    #[serde(default)]
    pub model: AssetModel,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub pilot: String,
    #[serde(default, alias = "connector")]
    pub interface: Interface,
}

impl AssetDraft {
    /// Check that every required field is present and non-blank
    pub fn validate(&self) -> Result<()> {
        require(&self.model.description, "model.description")?;
        require(&self.model.kind, "model.type")?;
        require(&self.model.format, "model.format")?;
        require(&self.pilot, "pilot")?;
        require(&self.interface.connector, "interface.connector")?;
        Ok(())
    }
}

/// A registered asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub model: AssetModel,
    pub pilot: String,
    pub interface: Interface,
}

impl Asset {
    pub fn from_draft(id: Uuid, draft: AssetDraft) -> Self {
        Self {
            id,
            model: draft.model,
            pilot: draft.pilot,
            interface: draft.interface,
        }
    }

    /// Value of the first interface parameter called `name`
    pub fn parameter(&self, name: &str) -> Option<&str> {
        Parameter::find(&self.interface.parameters, name)
    }
}

// ============================================================================
// Connectors
// ============================================================================

/// Connector document body, as registered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl ConnectorDraft {
    pub fn validate(&self) -> Result<()> {
        require(&self.name, "name")?;
        require(&self.protocol, "protocol")?;
        Ok(())
    }
}

/// A registered connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub protocol: String,
    pub parameters: Vec<Parameter>,
}

impl Connector {
    pub fn from_draft(id: Uuid, draft: ConnectorDraft) -> Self {
        Self {
            id,
            name: draft.name,
            protocol: draft.protocol,
            parameters: draft.parameters,
        }
    }

    /// The interface an asset embeds when it references this connector
    pub fn to_interface(&self) -> Interface {
        Interface {
            connector: self.name.clone(),
            protocol: self.protocol.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

// ============================================================================
// By-reference registrations
// ============================================================================

/// Asset registration that names a stored connector instead of embedding it
///
/// The connector's name, protocol and parameters are copied into the asset
/// when it is created; later connector edits do not reach the asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetReference {
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub format: String,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub pilot: String,
    #[serde(default)]
    pub connector_type: Option<String>,
    #[serde(deserialize_with = "deserialize_label")]
    pub connector_id: String,
}

impl AssetReference {
    /// Key whose presence marks a by-reference payload
    pub const CONNECTOR_ID_FIELD: &'static str = "connector_id";

    pub fn into_draft(self, connector: &Connector) -> AssetDraft {
        AssetDraft {
            model: AssetModel {
                description: self.description,
                kind: self.kind,
                format: self.format,
            },
            pilot: self.pilot,
            interface: connector.to_interface(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CatalogueError::missing_field(field));
    }
    Ok(())
}

/// Accept a label given either as text or as a number
///
/// Early registrations stored pilots as numbers.
fn deserialize_label<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Label>::deserialize(deserializer)? {
        Some(Label::Text(text)) => text,
        Some(Label::Number(number)) => number.to_string(),
        None => String::new(),
    })
}
