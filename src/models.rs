//! Client Models
//!
//! Shopping-list items as the view sees them, decoded from store documents.

use doc_store::{Document, DocumentId, Fields};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{SyncError, SyncResult};

pub const FIELD_NAME: &str = "name";
pub const FIELD_PRICE: &str = "price";

/// Field names written by the older web form into the same collection
const LEGACY_FIELD_NAME: &str = "vare";
const LEGACY_FIELD_PRICE: &str = "pris";

/// A shopping-list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: DocumentId,
    pub name: String,
    pub price: f64,
}

impl Item {
    pub fn new(id: impl Into<DocumentId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }

    /// Decode a store document.
    ///
    /// `price` may be a JSON number or a string holding one; older form
    /// submissions stored the raw input text under `vare`/`pris`, which are
    /// read when `name`/`price` are absent. Non-finite prices are rejected.
    pub fn from_document(doc: &Document) -> SyncResult<Self> {
        let decode_err = |reason: &str| SyncError::Decode {
            id: doc.id.to_string(),
            reason: reason.to_string(),
        };

        let name = doc
            .get(FIELD_NAME)
            .or_else(|| doc.get(LEGACY_FIELD_NAME))
            .and_then(Value::as_str)
            .ok_or_else(|| decode_err("missing or non-string name"))?;

        let price = match doc.get(FIELD_PRICE).or_else(|| doc.get(LEGACY_FIELD_PRICE)) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|price| price.is_finite())
        .ok_or_else(|| decode_err("missing or non-numeric price"))?;

        Ok(Self::new(doc.id.clone(), name, price))
    }
}

/// Validated input for a create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    name: String,
    price: f64,
}

impl NewItem {
    /// Name must be non-blank, price finite and non-negative
    pub fn new(name: impl Into<String>, price: f64) -> SyncResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(SyncError::InvalidInput("name is required".to_string()));
        }
        if !price.is_finite() || price < 0.0 {
            return Err(SyncError::InvalidInput(format!(
                "price must be a non-negative number, got {}",
                price
            )));
        }
        Ok(Self { name, price })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// Field map sent to the store
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(FIELD_NAME.to_string(), Value::from(self.name.clone()));
        fields.insert(FIELD_PRICE.to_string(), Value::from(self.price));
        fields
    }
}

/// Field the working list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "name")]
    ByName,
    #[serde(rename = "price")]
    ByPrice,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::ByName => FIELD_NAME,
            SortKey::ByPrice => FIELD_PRICE,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            FIELD_NAME => Ok(SortKey::ByName),
            FIELD_PRICE => Ok(SortKey::ByPrice),
            other => Err(SyncError::InvalidInput(format!(
                "unknown sort key '{}', expected name or price",
                other
            ))),
        }
    }
}
