//! Dashboard service: profile, next appointment and cancellation.

use crate::backend::{BackendError, BookingBackend};
use crate::models::AppointmentDetails;
use crate::state::{DashboardCommand, DashboardEvent};
use chrono::NaiveDate;

pub struct DashboardService;

impl DashboardService {
    pub async fn execute(backend: &dyn BookingBackend, command: DashboardCommand) -> DashboardEvent {
        match command {
            DashboardCommand::FetchProfile { user_id } => {
                DashboardEvent::Profile(backend.get_profile(&user_id).await)
            }
            DashboardCommand::FetchNextAppointment {
                user_id,
                today,
                generation,
            } => DashboardEvent::NextAppointment {
                generation,
                result: Self::next_appointment(backend, &user_id, today).await,
            },
            DashboardCommand::CancelAppointment { appointment_id } => {
                let result = backend.cancel_appointment(&appointment_id).await;
                DashboardEvent::Cancelled {
                    appointment_id,
                    result,
                }
            }
        }
    }

    /// Nearest scheduled appointment on or after `today`.
    ///
    /// The backend's "no rows" error is the normal empty case and maps to
    /// `Ok(None)`.
    pub async fn next_appointment(
        backend: &dyn BookingBackend,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Option<AppointmentDetails>, BackendError> {
        match backend.next_appointment(user_id, today).await {
            Ok(appointment) => Ok(Some(appointment)),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
