//! Screen controllers.
//!
//! Each screen owns its view state, renders itself and turns key presses
//! into [`ScreenAction`]s. The app routes between them:
//!
//! ```text
//! ┌─────────────── App ────────────────┐
//! │ Loading ──▶ SignIn ──▶ Shell        │
//! │                        ├ Dashboard  │
//! │                        ├ Booking    │
//! │                        ├ History    │
//! │                        └ Profile    │
//! └─────────────────────────────────────┘
//! ```

pub mod booking;
pub mod dashboard;
pub mod history;
pub mod loading;
pub mod profile;
pub mod screen_trait;
pub mod sign_in;

pub use booking::BookingScreen;
pub use dashboard::DashboardScreen;
pub use history::HistoryScreen;
pub use loading::LoadingScreen;
pub use profile::ProfileScreen;
pub use screen_trait::{RenderContext, Screen, ScreenAction, ScreenContext};
pub use sign_in::{AuthMode, SignInScreen};
