use super::{Entity, EntityKind, Row, datetime_field, id_field, instant_id, put, str_field};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single usage registration.
///
/// User, product, location and purpose names are denormalized copies taken
/// at creation time, not foreign keys; the scan code is copied from the
/// selected product. Registrations are immutable once created — the system
/// only ever creates and bulk-reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub user: String,
    pub product: String,
    pub location: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub time: String,
}

impl Registration {
    /// Builds a registration at the given instant, deriving the id and the
    /// split date/time components from it.
    #[must_use]
    pub fn new(
        user: impl Into<String>,
        product: impl Into<String>,
        location: impl Into<String>,
        purpose: impl Into<String>,
        qrcode: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: instant_id(at),
            user: user.into(),
            product: product.into(),
            location: location.into(),
            purpose: purpose.into(),
            qrcode,
            timestamp: at,
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M").to_string(),
        }
    }
}

impl Entity for Registration {
    const KIND: EntityKind = EntityKind::Registrations;
    const KEY_COLUMN: &'static str = "id";

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Option<Self> {
        let timestamp = datetime_field(row, "created_at")?;
        Some(Self {
            id: id_field(row, "id")?,
            user: str_field(row, "user_name")?,
            product: str_field(row, "product_name")?,
            location: str_field(row, "location")?,
            purpose: str_field(row, "purpose")?,
            qrcode: str_field(row, "qr_code"),
            timestamp,
            date: timestamp.format("%Y-%m-%d").to_string(),
            time: timestamp.format("%H:%M").to_string(),
        })
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        put(&mut row, "id", &self.id);
        put(&mut row, "user_name", &self.user);
        put(&mut row, "product_name", &self.product);
        put(&mut row, "location", &self.location);
        put(&mut row, "purpose", &self.purpose);
        if let Some(code) = &self.qrcode {
            put(&mut row, "qr_code", code);
        }
        put(&mut row, "created_at", &self.timestamp.to_rfc3339());
        row
    }

    fn seed() -> Vec<Self> {
        use chrono::TimeZone;
        // The fallback history shows one example entry so the table is
        // never blank on first load.
        let at = Utc
            .with_ymd_and_hms(2024, 1, 15, 9, 30, 0)
            .single()
            .unwrap_or_else(Utc::now);
        vec![Self::new(
            "Jan Janssen",
            "Interflon Fin Super",
            "Warehouse",
            "Demonstratie",
            Some("IFLS001".to_string()),
            at,
        )]
    }
}
