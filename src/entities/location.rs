use super::{Entity, EntityKind, Row, put, str_field};
use serde::{Deserialize, Serialize};

/// A place where a product can be used. Identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
}

impl Location {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Entity for Location {
    const KIND: EntityKind = EntityKind::Locations;
    const KEY_COLUMN: &'static str = "name";

    fn key(&self) -> &str {
        &self.name
    }

    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            name: str_field(row, "name")?,
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        put(&mut row, "name", &self.name);
        row
    }

    fn seed() -> Vec<Self> {
        vec![
            Self::new("Warehouse"),
            Self::new("Workshop"),
            Self::new("Production line 1"),
        ]
    }
}
