//! Registration form controller.
//!
//! Drives the create-registration flow: validates that all four selections
//! are present, resolves the selected product's scan code, builds the
//! timestamped record, and dispatches it to the store. The clock is passed
//! in by the caller so the flow is deterministic under test.

use crate::app::AppState;
use crate::entities::Registration;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// How long the transient success/error indicator stays visible.
pub const BANNER_TTL_MS: i64 = 3000;

/// Submission phase. The controller returns to `Idle` on both terminal
/// transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
}

/// Transient outcome indicator, auto-cleared after [`BANNER_TTL_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Success,
    Error,
}

#[derive(Default)]
pub struct RegistrationForm {
    pub user: String,
    pub product: String,
    pub location: String,
    pub purpose: String,
    /// Product search text, cleared together with the selections.
    pub search: String,
    phase: Phase,
    banner: Option<(Banner, DateTime<Utc>)>,
}

impl RegistrationForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The indicator currently visible at `now`, if its delay has not
    /// elapsed yet.
    #[must_use]
    pub fn banner(&self, now: DateTime<Utc>) -> Option<Banner> {
        self.banner
            .filter(|(_, deadline)| now < *deadline)
            .map(|(banner, _)| banner)
    }

    fn complete(&self) -> bool {
        !self.user.is_empty()
            && !self.product.is_empty()
            && !self.location.is_empty()
            && !self.purpose.is_empty()
    }

    /// Selects the product matching a scanned code (first match), leaving
    /// the selection untouched when the code is unknown.
    pub async fn scan(&mut self, state: &AppState, code: &str) {
        match state.product_by_qrcode(code).await {
            Some(product) => {
                debug!(code, product = %product.name, "scan resolved product");
                self.product = product.name;
            }
            None => debug!(code, "scan code matched no product"),
        }
    }

    /// Submits the form at the given instant.
    ///
    /// With any of the four selections empty the submit is inert: no record
    /// is created, no banner is shown, state stays `Idle`. Otherwise the
    /// scan code is resolved from the selected product by name (first
    /// match), the registration is created, and the controller returns to
    /// `Idle` with a transient banner — success clears the selections and
    /// search text, an error keeps them so the user can retry.
    pub async fn submit(&mut self, state: &AppState, now: DateTime<Utc>) -> Option<Registration> {
        if !self.complete() {
            debug!("submit ignored, selections incomplete");
            return None;
        }
        self.phase = Phase::Submitting;

        let qrcode = state
            .product_by_name(&self.product)
            .await
            .and_then(|product| product.qrcode);
        let registration = Registration::new(
            self.user.clone(),
            self.product.clone(),
            self.location.clone(),
            self.purpose.clone(),
            qrcode,
            now,
        );

        let error = state.create_registration(registration.clone()).await;
        let deadline = now + chrono::Duration::milliseconds(BANNER_TTL_MS);
        self.phase = Phase::Idle;
        match error {
            None => {
                self.user.clear();
                self.product.clear();
                self.location.clear();
                self.purpose.clear();
                self.search.clear();
                self.banner = Some((Banner::Success, deadline));
            }
            Some(error) => {
                warn!(%error, "registration submit reported a remote error");
                self.banner = Some((Banner::Error, deadline));
            }
        }
        Some(registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{failing_connected_state, init_test_tracing, local_state};
    use chrono::TimeZone;

    fn fixed_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 14, 30, 0).unwrap()
    }

    fn filled_form() -> RegistrationForm {
        let mut form = RegistrationForm::new();
        form.user = "Jan Janssen".to_string();
        form.product = "Interflon Fin Super".to_string();
        form.location = "Warehouse".to_string();
        form.purpose = "Demonstratie".to_string();
        form.search = "fin".to_string();
        form
    }

    #[tokio::test]
    async fn submit_builds_registration_and_resets_selections() {
        init_test_tracing();
        let (state, _dir) = local_state().await;
        let mut form = filled_form();
        let now = fixed_instant();

        let registration = form.submit(&state, now).await.unwrap();
        assert_eq!(registration.qrcode.as_deref(), Some("IFLS001"));
        assert_eq!(registration.date, "2024-03-07");
        assert_eq!(registration.time, "14:30");
        assert_eq!(registration.user, "Jan Janssen");

        assert!(form.user.is_empty());
        assert!(form.product.is_empty());
        assert!(form.location.is_empty());
        assert!(form.purpose.is_empty());
        assert!(form.search.is_empty());
        assert_eq!(form.phase(), Phase::Idle);
        assert_eq!(form.banner(now), Some(Banner::Success));

        let registrations = state.registrations.read().await;
        assert!(registrations.iter().any(|r| r.id == registration.id));
    }

    #[tokio::test]
    async fn submit_without_location_is_inert() {
        init_test_tracing();
        let (state, _dir) = local_state().await;
        let mut form = filled_form();
        form.location.clear();
        let before = state.registrations.read().await.len();

        assert!(form.submit(&state, fixed_instant()).await.is_none());

        assert_eq!(state.registrations.read().await.len(), before);
        assert_eq!(form.phase(), Phase::Idle);
        assert!(form.banner(fixed_instant()).is_none(), "no banner on inert submit");
        assert_eq!(form.user, "Jan Janssen", "selections unchanged");
    }

    #[tokio::test]
    async fn banner_auto_clears_after_the_delay() {
        init_test_tracing();
        let (state, _dir) = local_state().await;
        let mut form = filled_form();
        let now = fixed_instant();

        form.submit(&state, now).await;
        assert_eq!(form.banner(now), Some(Banner::Success));
        let later = now + chrono::Duration::milliseconds(BANNER_TTL_MS + 1);
        assert!(form.banner(later).is_none());
    }

    #[tokio::test]
    async fn remote_error_keeps_selections_for_retry() {
        init_test_tracing();
        let (state, _remote, _dir) = failing_connected_state().await;
        let mut form = filled_form();
        let now = fixed_instant();

        let registration = form.submit(&state, now).await;
        assert!(registration.is_some(), "write degrades to local success");
        assert_eq!(form.banner(now), Some(Banner::Error));
        assert_eq!(form.user, "Jan Janssen");
        assert_eq!(form.location, "Warehouse");
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn unknown_product_submits_without_scan_code() {
        init_test_tracing();
        let (state, _dir) = local_state().await;
        let mut form = filled_form();
        form.product = "No such product".to_string();

        let registration = form.submit(&state, fixed_instant()).await.unwrap();
        assert!(registration.qrcode.is_none());
    }

    #[tokio::test]
    async fn scan_selects_the_matching_product() {
        init_test_tracing();
        let (state, _dir) = local_state().await;
        let mut form = RegistrationForm::new();

        form.scan(&state, "IFLS001").await;
        assert_eq!(form.product, "Interflon Fin Super");

        form.scan(&state, "UNKNOWN").await;
        assert_eq!(form.product, "Interflon Fin Super", "unknown code is ignored");
    }
}
