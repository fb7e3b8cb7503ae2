//! View state, kept free of terminal and network code.
//!
//! Each state type turns user intent into commands (fetches, writes) and
//! applies their results when they come back:
//!
//! ```text
//!  key press ──▶ state.select_*()/confirm() ──▶ Command ──▶ services (async)
//!                      ▲                                        │
//!                      └────────── state.apply(Event) ◀─────────┘
//! ```

pub mod dashboard;
pub mod history;
pub mod loadable;
pub mod navigation;
pub mod wizard;

pub use dashboard::{
    DashboardCommand, DashboardEvent, DashboardNotice, DashboardState, DashboardUpdate,
    PROMOTIONS,
};
pub use history::{HistoryState, HISTORY_LIMIT};
pub use loadable::Loadable;
pub use navigation::{NavigationState, Tab, NARROW_WIDTH};
pub use wizard::{
    BookingWizard, ConfirmError, DaySlots, SubmitOutcome, WizardCommand, WizardEvent, WizardStep,
};
