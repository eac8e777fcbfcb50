use super::{Entity, EntityKind, Row, put, str_field};
use serde::{Deserialize, Serialize};

/// A registry user. Identified by name; there is no surrogate id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
}

impl User {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::Users;
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
            Self::new("Jan Janssen"),
            Self::new("Piet"),
            Self::new("Marieke van Dijk"),
        ]
    }
}
