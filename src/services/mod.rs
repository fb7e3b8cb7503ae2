//! Application services layer.
//!
//! Services run backend calls on behalf of the UI and the CLI. They hold no
//! state: the state types in [`crate::state`] decide what to fetch, services
//! do the fetching, and the [`Dispatcher`] moves the work off the UI thread.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │              UI Layer / CLI                  │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │ Dispatcher (tokio tasks → AppEvent channel)  │
//! │  ┌──────────────┐ ┌──────────────────┐       │
//! │  │BookingService│ │DashboardService  │       │
//! │  └──────────────┘ └──────────────────┘       │
//! │  ┌──────────────┐                            │
//! │  │AccountService│                            │
//! │  └──────────────┘                            │
//! └──────────────────────┬───────────────────────┘
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │   BookingBackend / AuthBackend (Supabase)    │
//! └──────────────────────────────────────────────┘
//! ```

pub mod account_service;
pub mod booking_service;
pub mod dashboard_service;
pub mod dispatcher;

pub use account_service::{validate_sign_in, validate_sign_up, AccountService, CredentialError};
pub use booking_service::BookingService;
pub use dashboard_service::DashboardService;
pub use dispatcher::{AppEvent, Dispatcher};
