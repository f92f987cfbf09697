//! The shop record, the only entity served by the directory

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::store::INTERNAL_ID_FIELD;

/// A shop as stored in the collection.
///
/// The well-known fields are typed; anything else the store holds is kept in
/// `extra` and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The well-known fields of a [`Shop`] that queries can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopField {
    Id,
    Name,
    Category,
    Type,
    Tags,
    Services,
    Description,
}

impl ShopField {
    /// Fields searched by a free-text query
    pub const SEARCHABLE: [ShopField; 5] = [
        ShopField::Name,
        ShopField::Tags,
        ShopField::Services,
        ShopField::Type,
        ShopField::Description,
    ];

    /// Key of the field in the stored document
    pub fn key(self) -> &'static str {
        match self {
            ShopField::Id => "id",
            ShopField::Name => "name",
            ShopField::Category => "category",
            ShopField::Type => "type",
            ShopField::Tags => "tags",
            ShopField::Services => "services",
            ShopField::Description => "description",
        }
    }

    /// Whether the field holds a sequence of strings rather than a single one
    pub fn is_list(self) -> bool {
        matches!(self, ShopField::Tags | ShopField::Services)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "id" => Some(ShopField::Id),
            "name" => Some(ShopField::Name),
            "category" => Some(ShopField::Category),
            "type" => Some(ShopField::Type),
            "tags" => Some(ShopField::Tags),
            "services" => Some(ShopField::Services),
            "description" => Some(ShopField::Description),
            _ => None,
        }
    }
}

impl Shop {
    /// Every string held by `field`, one entry per element for list fields
    pub fn texts(&self, field: ShopField) -> Vec<&str> {
        fn scalar(value: &Option<String>) -> Vec<&str> {
            value.as_deref().into_iter().collect()
        }

        fn list(value: &Option<Vec<String>>) -> Vec<&str> {
            value
                .iter()
                .flat_map(|items| items.iter().map(String::as_str))
                .collect()
        }

        match field {
            ShopField::Id => vec![self.id.as_str()],
            ShopField::Name => scalar(&self.name),
            ShopField::Category => scalar(&self.category),
            ShopField::Type => scalar(&self.kind),
            ShopField::Tags => list(&self.tags),
            ShopField::Services => list(&self.services),
            ShopField::Description => scalar(&self.description),
        }
    }

    /// JSON value stored under `key`, looking through both typed and opaque fields
    pub fn field_value(&self, key: &str) -> Option<Value> {
        let Some(field) = ShopField::from_key(key) else {
            return self.extra.get(key).cloned();
        };

        match field {
            ShopField::Id => Some(Value::String(self.id.clone())),
            ShopField::Tags => self.tags.clone().map(Value::from),
            ShopField::Services => self.services.clone().map(Value::from),
            scalar => self.texts(scalar).first().map(|s| Value::from(*s)),
        }
    }

    /// Apply `incoming` on top of this record.
    ///
    /// Top-level fields present in `incoming` replace the stored ones, fields
    /// it does not mention are kept.
    pub fn merge(&mut self, incoming: Shop) {
        let Shop {
            id,
            name,
            category,
            kind,
            tags,
            services,
            description,
            extra,
        } = incoming;

        self.id = id;
        if name.is_some() {
            self.name = name;
        }
        if category.is_some() {
            self.category = category;
        }
        if kind.is_some() {
            self.kind = kind;
        }
        if tags.is_some() {
            self.tags = tags;
        }
        if services.is_some() {
            self.services = services;
        }
        if description.is_some() {
            self.description = description;
        }
        self.extra.extend(extra);
    }

    /// Drop storage-internal identifiers before the record leaves the service
    pub fn without_internal_fields(mut self) -> Self {
        self.extra.remove(INTERNAL_ID_FIELD);
        self
    }
}
