//! Entity definitions for the six registry collections.
//!
//! Each entity implements [`Entity`], which carries the collection kind, the
//! remote primary-key column, a total mapping from untyped remote rows, and
//! the built-in seed set substituted whenever no remote or persisted data
//! exists. Remote column names never leak past `from_row`/`to_row`.

/// Product categories (id-keyed, weakly referenced by products)
pub mod category;
/// Usage locations (name-keyed)
pub mod location;
/// Registrable products with optional scan codes
pub mod product;
/// Usage purposes (name-keyed)
pub mod purpose;
/// Immutable usage registrations
pub mod registration;
/// Registry users (name-keyed)
pub mod user;

pub use category::Category;
pub use location::Location;
pub use product::Product;
pub use purpose::Purpose;
pub use registration::Registration;
pub use user::User;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;

/// An untyped remote row, exactly as the wire delivers it.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// The six entity collections held per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Users,
    Products,
    Locations,
    Purposes,
    Categories,
    Registrations,
}

impl EntityKind {
    /// All kinds, in initial-load order.
    pub const ALL: [Self; 6] = [
        Self::Users,
        Self::Products,
        Self::Locations,
        Self::Purposes,
        Self::Categories,
        Self::Registrations,
    ];

    /// Remote table name; doubles as the local persistence key suffix.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Products => "products",
            Self::Locations => "locations",
            Self::Purposes => "purposes",
            Self::Categories => "categories",
            Self::Registrations => "registrations",
        }
    }

    /// Stable index into per-kind flag arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Users => 0,
            Self::Products => 1,
            Self::Locations => 2,
            Self::Purposes => 3,
            Self::Categories => 4,
            Self::Registrations => 5,
        }
    }

    /// Registrations are immutable once created, so they have no edit dialog
    /// and are never guarded against inbound pushes.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        !matches!(self, Self::Registrations)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Behavior shared by the six collection value types.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Which collection this type belongs to.
    const KIND: EntityKind;

    /// Column the remote store is keyed by for deletes (name for the
    /// name-keyed kinds, id for the rest).
    const KEY_COLUMN: &'static str;

    /// The value's primary key, matching [`Entity::KEY_COLUMN`].
    fn key(&self) -> &str;

    /// Total mapping from an untyped remote row. Rows missing required
    /// fields map to `None` and are skipped by the caller; nothing past
    /// this point ever trusts the boundary shape.
    fn from_row(row: &Row) -> Option<Self>;

    /// Inverse of [`Entity::from_row`]; optional fields are omitted rather
    /// than written as null.
    fn to_row(&self) -> Row;

    /// Fixed default collection substituted when no remote or persisted
    /// data exists. Never empty.
    fn seed() -> Vec<Self>;
}

/// Derives an id from a creation instant (millisecond precision).
#[must_use]
pub fn instant_id(at: DateTime<Utc>) -> String {
    at.timestamp_millis().to_string()
}

pub(crate) fn str_field(row: &Row, key: &str) -> Option<String> {
    row.get(key)
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}

/// Ids arrive as strings from the mirror but may be numbers from the remote
/// store (server-assigned keys); both are accepted.
pub(crate) fn id_field(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn datetime_field(row: &Row, key: &str) -> Option<DateTime<Utc>> {
    let raw = row.get(key).and_then(serde_json::Value::as_str)?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub(crate) fn put(row: &mut Row, key: &str, value: &str) {
    row.insert(key.to_string(), serde_json::Value::String(value.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_cover_all_kinds() {
        let tables: Vec<&str> = EntityKind::ALL.iter().map(|k| k.table()).collect();
        assert_eq!(
            tables,
            vec![
                "users",
                "products",
                "locations",
                "purposes",
                "categories",
                "registrations"
            ]
        );
    }

    #[test]
    fn indices_are_distinct() {
        let mut seen = [false; 6];
        for kind in EntityKind::ALL {
            assert!(!seen[kind.index()], "duplicate index for {kind}");
            seen[kind.index()] = true;
        }
    }

    #[test]
    fn registrations_are_not_editable() {
        assert!(!EntityKind::Registrations.is_editable());
        assert!(EntityKind::Products.is_editable());
        assert!(EntityKind::Users.is_editable());
    }

    #[test]
    fn instant_id_is_millisecond_derived() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 14, 30, 0).unwrap();
        assert_eq!(instant_id(at), at.timestamp_millis().to_string());
    }
}
