//! Booking service: executes the wizard's commands against the backend.

use crate::backend::{BackendError, BookingBackend};
use crate::models::AppointmentDetails;
use crate::state::wizard::{build_schedule, DaySlots, WizardCommand, WizardEvent};
use crate::state::HISTORY_LIMIT;
use chrono::NaiveDateTime;
use tracing::{info, warn};

/// Service for booking-related backend work.
///
/// Stateless; every call gets the backend handle to use.
pub struct BookingService;

impl BookingService {
    /// Run one wizard command and produce the event to feed back.
    ///
    /// `now` bounds the availability query and hides past slots.
    pub async fn execute(
        backend: &dyn BookingBackend,
        command: WizardCommand,
        now: NaiveDateTime,
    ) -> WizardEvent {
        match command {
            WizardCommand::FetchUnits => WizardEvent::Units(backend.list_units().await),
            WizardCommand::FetchServices => WizardEvent::Services(backend.list_services().await),
            WizardCommand::FetchBarbers {
                unit_id,
                generation,
            } => WizardEvent::Barbers {
                generation,
                result: backend.list_barbers(&unit_id).await,
            },
            WizardCommand::FetchSlots {
                barber_id,
                generation,
            } => WizardEvent::Slots {
                generation,
                result: Self::free_slots(backend, &barber_id, now).await,
            },
            WizardCommand::Submit {
                appointment,
                replaces,
            } => {
                let result = backend.insert_appointment(&appointment).await;
                // Only touch the original once the replacement is stored
                let original_cancel = match (&result, replaces) {
                    (Ok(()), Some(original_id)) => {
                        info!("Cancelling rescheduled appointment {}", original_id);
                        Some(backend.cancel_appointment(&original_id).await)
                    }
                    _ => None,
                };
                WizardEvent::Submitted {
                    result,
                    original_cancel,
                }
            }
        }
    }

    /// Published slots for a barber minus the ones already booked.
    pub async fn free_slots(
        backend: &dyn BookingBackend,
        barber_id: &str,
        now: NaiveDateTime,
    ) -> Result<Vec<DaySlots>, BackendError> {
        let today = now.date();
        let slots = backend.list_availability(barber_id, today).await?;
        let taken = match backend.list_taken_slots(barber_id, today).await {
            Ok(taken) => taken,
            Err(e) => {
                // Availability alone is still usable; the insert stays the arbiter
                warn!("Could not load booked slots for {}: {}", barber_id, e);
                Vec::new()
            }
        };
        Ok(build_schedule(&slots, &taken, now))
    }

    /// The user's appointments, newest first.
    pub async fn history(
        backend: &dyn BookingBackend,
        user_id: &str,
    ) -> Result<Vec<AppointmentDetails>, BackendError> {
        backend.appointment_history(user_id, HISTORY_LIMIT).await
    }
}
