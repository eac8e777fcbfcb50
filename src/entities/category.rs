use super::{Entity, EntityKind, Row, id_field, put, str_field};
use serde::{Deserialize, Serialize};

/// A product category. Ids are server-assigned or derived from the creation
/// instant; names should be unique but this is not enforced on the remote
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl Entity for Category {
    const KIND: EntityKind = EntityKind::Categories;
    const KEY_COLUMN: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            id: id_field(row, "id")?,
            name: str_field(row, "name")?,
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        put(&mut row, "id", &self.id);
        put(&mut row, "name", &self.name);
        row
    }

    fn seed() -> Vec<Self> {
        vec![
            Self::new("1", "Lubricants"),
            Self::new("2", "Cleaners"),
        ]
    }
}
