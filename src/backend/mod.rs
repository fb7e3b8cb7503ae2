//! Remote data client.
//!
//! The rest of the application talks to the hosted backend only through the
//! two traits defined here, so screens and services can be exercised against
//! an in-memory implementation in tests.
//!
//! ```text
//! ┌──────────────────────────────┐     ┌───────────────────────────┐
//! │ BookingBackend (tables)      │     │ AuthBackend (sessions)    │
//! └──────────────┬───────────────┘     └─────────────┬─────────────┘
//!                └──────────────┬────────────────────┘
//!                               ▼
//!                ┌──────────────────────────────┐
//!                │ SupabaseClient               │
//!                │  /rest/v1/<table>  (PostgREST)│
//!                │  /auth/v1/...      (GoTrue)   │
//!                └──────────────────────────────┘
//! ```

pub mod error;
pub mod query;
pub mod supabase;

pub use error::{BackendError, NO_ROWS_CODE};
pub use query::{Direction, Query};
pub use supabase::SupabaseClient;

use crate::models::{
    AppointmentDetails, AvailabilitySlot, Barber, NewAppointment, Profile, Service, TakenSlot,
    Unit,
};
use crate::session::Session;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Result alias for backend calls.
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Table operations used by the booking flow, dashboard and history views.
#[async_trait]
pub trait BookingBackend: Send + Sync {
    /// `units`: select all, order by name.
    async fn list_units(&self) -> BackendResult<Vec<Unit>>;

    /// `services`: select all, order by name.
    async fn list_services(&self) -> BackendResult<Vec<Service>>;

    /// `barbers`: filter `unit_id`, order by name.
    async fn list_barbers(&self, unit_id: &str) -> BackendResult<Vec<Barber>>;

    /// `profiles`: single row for `user_id`.
    async fn get_profile(&self, user_id: &str) -> BackendResult<Profile>;

    /// `availability`: slots for a barber on or after `from`, ordered by date and time.
    async fn list_availability(
        &self,
        barber_id: &str,
        from: NaiveDate,
    ) -> BackendResult<Vec<AvailabilitySlot>>;

    /// `appointments`: scheduled date/time pairs for a barber on or after `from`.
    async fn list_taken_slots(&self, barber_id: &str, from: NaiveDate)
        -> BackendResult<Vec<TakenSlot>>;

    /// `appointments`: insert one row.
    async fn insert_appointment(&self, appointment: &NewAppointment) -> BackendResult<()>;

    /// `appointments`: nearest scheduled appointment on or after `today`.
    ///
    /// Returns an error carrying [`NO_ROWS_CODE`] when there is none.
    async fn next_appointment(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> BackendResult<AppointmentDetails>;

    /// `appointments`: set `status = cancelled` for one id.
    async fn cancel_appointment(&self, appointment_id: &str) -> BackendResult<()>;

    /// `appointments`: newest first, all statuses.
    async fn appointment_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> BackendResult<Vec<AppointmentDetails>>;
}

/// Outcome of a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The project auto-confirms accounts and returned a session.
    SignedIn(Session),
    /// The account exists but the email must be confirmed first.
    ConfirmationRequired,
}

/// Credential operations backing the session provider.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> BackendResult<SignUpOutcome>;

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session>;

    async fn sign_out(&self, access_token: &str) -> BackendResult<()>;
}

/// Hands out backend handles bound to the current session.
///
/// The session changes over the life of the process (sign-in, refresh,
/// sign-out), so long-lived owners keep a connector and ask it for a handle
/// per call instead of holding one authorized client.
pub trait Connector: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthBackend>;

    /// Table access as `session`'s user, or anonymous when `None`.
    fn booking(&self, session: Option<&Session>) -> Arc<dyn BookingBackend>;
}

impl Connector for SupabaseClient {
    fn auth(&self) -> Arc<dyn AuthBackend> {
        Arc::new(self.clone())
    }

    fn booking(&self, session: Option<&Session>) -> Arc<dyn BookingBackend> {
        match session {
            Some(session) => Arc::new(self.with_session(session)),
            None => Arc::new(self.clone()),
        }
    }
}
