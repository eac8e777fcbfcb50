use super::{Entity, EntityKind, Row, datetime_field, id_field, put, str_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registrable product.
///
/// The category reference is weak: deleting a category leaves products
/// pointing at a dangling id, which the presentation layer degrades to
/// "none". Product names are used as a de facto lookup key during
/// registration, but uniqueness is never enforced — first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
    #[serde(
        rename = "categoryId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Products;
    const KEY_COLUMN: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            id: id_field(row, "id")?,
            name: str_field(row, "name")?,
            qrcode: str_field(row, "qr_code"),
            category_id: id_field(row, "category_id"),
            created_at: datetime_field(row, "created_at"),
            attachment: str_field(row, "attachment"),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        put(&mut row, "id", &self.id);
        put(&mut row, "name", &self.name);
        if let Some(code) = &self.qrcode {
            put(&mut row, "qr_code", code);
        }
        if let Some(category) = &self.category_id {
            put(&mut row, "category_id", category);
        }
        if let Some(created) = &self.created_at {
            put(&mut row, "created_at", &created.to_rfc3339());
        }
        if let Some(attachment) = &self.attachment {
            put(&mut row, "attachment", attachment);
        }
        row
    }

    fn seed() -> Vec<Self> {
        let product = |id: &str, name: &str, code: &str, category: &str| Self {
            id: id.to_string(),
            name: name.to_string(),
            qrcode: Some(code.to_string()),
            category_id: Some(category.to_string()),
            created_at: None,
            attachment: None,
        };
        vec![
            product("1", "Interflon Fin Super", "IFLS001", "1"),
            product("2", "Interflon Metal Clean", "IFMC002", "2"),
            product("3", "Interflon Fin Grease", "IFFG003", "1"),
            product("4", "Interflon Degreaser EM30+", "IFDE004", "2"),
        ]
    }
}
