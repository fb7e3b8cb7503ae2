//! Dashboard: greeting, next appointment, promotions.

use crate::backend::BackendError;
use crate::models::{AppointmentDetails, Profile};
use crate::state::Loadable;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

/// A static promotional card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promotion {
    pub title: &'static str,
    pub description: &'static str,
    pub badge: &'static str,
}

pub const PROMOTIONS: [Promotion; 2] = [
    Promotion {
        title: "Combo Especial",
        description: "Corte + Barba por apenas R$ 45",
        badge: "25% OFF",
    },
    Promotion {
        title: "Cliente Fiel",
        description: "A cada 5 cortes, o 6º é grátis",
        badge: "Fidelidade",
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    FetchProfile { user_id: String },
    FetchNextAppointment {
        user_id: String,
        today: NaiveDate,
        generation: u64,
    },
    CancelAppointment { appointment_id: String },
}

#[derive(Debug, Clone)]
pub enum DashboardEvent {
    Profile(Result<Profile, BackendError>),
    /// `Ok(None)` is the normal "nothing scheduled" case
    NextAppointment {
        generation: u64,
        result: Result<Option<AppointmentDetails>, BackendError>,
    },
    Cancelled {
        appointment_id: String,
        result: Result<(), BackendError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardNotice {
    Cancelled,
    CancelFailed(String),
}

/// Result of applying an event: something to tell the user and a chained
/// fetch to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardUpdate {
    pub notice: Option<DashboardNotice>,
    pub follow_up: Option<DashboardCommand>,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    user_id: Option<String>,
    today: NaiveDate,
    profile: Loadable<Profile>,
    next: Loadable<Option<AppointmentDetails>>,
    /// Bumped per next-appointment fetch; older answers are dropped
    next_generation: u64,
    cancelling: Option<String>,
}

impl DashboardState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            user_id: None,
            today,
            profile: Loadable::Idle,
            next: Loadable::Idle,
            next_generation: 0,
            cancelling: None,
        }
    }

    /// Start both fetches for `user_id` as of `today`.
    pub fn load(&mut self, user_id: &str, today: NaiveDate) -> Vec<DashboardCommand> {
        self.user_id = Some(user_id.to_string());
        self.today = today;
        self.profile = Loadable::Loading;
        vec![
            DashboardCommand::FetchProfile {
                user_id: user_id.to_string(),
            },
            self.refetch_next(user_id.to_string()),
        ]
    }

    /// Re-run the next-appointment query only.
    pub fn refresh_next(&mut self) -> Option<DashboardCommand> {
        let user_id = self.user_id.clone()?;
        Some(self.refetch_next(user_id))
    }

    fn refetch_next(&mut self, user_id: String) -> DashboardCommand {
        self.next = Loadable::Loading;
        self.next_generation += 1;
        DashboardCommand::FetchNextAppointment {
            user_id,
            today: self.today,
            generation: self.next_generation,
        }
    }

    pub fn profile(&self) -> &Loadable<Profile> {
        &self.profile
    }

    pub fn next_appointment(&self) -> &Loadable<Option<AppointmentDetails>> {
        &self.next
    }

    /// The appointment currently on screen, if any.
    pub fn displayed(&self) -> Option<&AppointmentDetails> {
        self.next.loaded().and_then(Option::as_ref)
    }

    pub fn is_cancelling(&self) -> bool {
        self.cancelling.is_some()
    }

    /// First name for the greeting.
    pub fn greeting_name(&self) -> Option<&str> {
        self.profile.loaded().and_then(Profile::first_name)
    }

    /// Cancel the displayed appointment. Nothing happens while another
    /// cancel is in flight or when nothing is displayed.
    pub fn request_cancel(&mut self) -> Option<DashboardCommand> {
        if self.cancelling.is_some() {
            return None;
        }
        let appointment_id = self.displayed()?.id.clone();
        self.cancelling = Some(appointment_id.clone());
        Some(DashboardCommand::CancelAppointment { appointment_id })
    }

    pub fn apply(&mut self, event: DashboardEvent) -> DashboardUpdate {
        match event {
            DashboardEvent::Profile(result) => {
                if let Err(e) = &result {
                    warn!("Failed to load profile: {}", e);
                }
                self.profile = result.into();
                DashboardUpdate::default()
            }
            DashboardEvent::NextAppointment { generation, result } => {
                if generation != self.next_generation {
                    debug!("Dropping stale next appointment (generation {})", generation);
                    return DashboardUpdate::default();
                }
                if let Err(e) = &result {
                    warn!("Failed to load next appointment: {}", e);
                }
                self.next = result.into();
                DashboardUpdate::default()
            }
            DashboardEvent::Cancelled {
                appointment_id,
                result,
            } => {
                if self.cancelling.as_deref() != Some(appointment_id.as_str()) {
                    return DashboardUpdate::default();
                }
                self.cancelling = None;
                match result {
                    Ok(()) => {
                        info!("Cancelled appointment {}", appointment_id);
                        DashboardUpdate {
                            notice: Some(DashboardNotice::Cancelled),
                            follow_up: self.refresh_next(),
                        }
                    }
                    Err(e) => {
                        warn!("Failed to cancel appointment {}: {}", appointment_id, e);
                        DashboardUpdate {
                            notice: Some(DashboardNotice::CancelFailed(e.to_string())),
                            follow_up: None,
                        }
                    }
                }
            }
        }
    }
}
