//! Appointment history list.

use crate::backend::BackendError;
use crate::models::AppointmentDetails;
use crate::state::Loadable;
use tracing::warn;

/// Rows fetched for the history view.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Default)]
pub struct HistoryState {
    appointments: Loadable<Vec<AppointmentDetails>>,
}

impl HistoryState {
    /// Mark a reload as started. Returns false if one is already running.
    pub fn begin_load(&mut self) -> bool {
        if self.appointments.is_loading() {
            return false;
        }
        self.appointments = Loadable::Loading;
        true
    }

    pub fn apply(&mut self, result: Result<Vec<AppointmentDetails>, BackendError>) {
        if let Err(e) = &result {
            warn!("Failed to load appointment history: {}", e);
        }
        self.appointments = result.into();
    }

    pub fn appointments(&self) -> &Loadable<Vec<AppointmentDetails>> {
        &self.appointments
    }

    pub fn needs_load(&self) -> bool {
        matches!(self.appointments, Loadable::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_load_in_flight() {
        let mut state = HistoryState::default();
        assert!(state.needs_load());
        assert!(state.begin_load());
        assert!(!state.begin_load());
        state.apply(Ok(Vec::new()));
        assert!(!state.needs_load());
        assert!(state.begin_load());
    }

    #[test]
    fn test_failure_is_kept() {
        let mut state = HistoryState::default();
        state.begin_load();
        state.apply(Err(BackendError::Unauthorized));
        assert_eq!(state.appointments().error(), Some("not signed in"));
    }
}
