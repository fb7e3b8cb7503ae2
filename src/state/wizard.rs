//! Booking wizard.
//!
//! A five-step linear state machine: unit, service, barber, date/time, then
//! confirmation. The wizard never talks to the backend itself. Operations
//! that need data return a [`WizardCommand`]; the caller executes it and feeds
//! the outcome back through [`BookingWizard::apply`] as a [`WizardEvent`].
//!
//! Dependent fetches carry a generation number, so a barber list that arrives
//! for a unit the user has already moved away from is dropped.

use crate::backend::BackendError;
use crate::models::{
    AppointmentDetails, AppointmentStatus, AvailabilitySlot, Barber, NewAppointment, Service,
    TakenSlot, Unit,
};
use crate::session::AuthUser;
use crate::state::Loadable;
use crate::utils::format::{format_date, format_duration, format_price, format_time};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

pub const TOTAL_STEPS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    Unit,
    Service,
    Barber,
    DateTime,
    Confirm,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::Unit,
        WizardStep::Service,
        WizardStep::Barber,
        WizardStep::DateTime,
        WizardStep::Confirm,
    ];

    /// 1-based position
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Unit => 1,
            WizardStep::Service => 2,
            WizardStep::Barber => 3,
            WizardStep::DateTime => 4,
            WizardStep::Confirm => 5,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::Unit => "Choose a unit",
            WizardStep::Service => "Choose a service",
            WizardStep::Barber => "Choose a barber",
            WizardStep::DateTime => "Pick a date and time",
            WizardStep::Confirm => "Confirm your booking",
        }
    }
}

/// The five user choices. All start unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub unit_id: Option<String>,
    pub service_id: Option<String>,
    pub barber_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

/// Free times on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub times: Vec<NaiveTime>,
}

/// Turn published availability into bookable days.
///
/// Drops slots already taken by a scheduled appointment and slots at or
/// before `now`. Days left without a free slot are omitted. Output is sorted
/// by date, times ascending and unique.
pub fn build_schedule(
    slots: &[AvailabilitySlot],
    taken: &[TakenSlot],
    now: NaiveDateTime,
) -> Vec<DaySlots> {
    let taken: BTreeSet<(NaiveDate, NaiveTime)> = taken
        .iter()
        .map(|t| (t.appointment_date, t.appointment_time))
        .collect();

    let mut days: BTreeMap<NaiveDate, BTreeSet<NaiveTime>> = BTreeMap::new();
    for slot in slots {
        let key = (slot.slot_date, slot.slot_time);
        if taken.contains(&key) || slot.slot_date.and_time(slot.slot_time) <= now {
            continue;
        }
        days.entry(slot.slot_date).or_default().insert(slot.slot_time);
    }

    days.into_iter()
        .map(|(date, times)| DaySlots {
            date,
            times: times.into_iter().collect(),
        })
        .collect()
}

/// Side effect requested by the wizard.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    FetchUnits,
    FetchServices,
    FetchBarbers {
        unit_id: String,
        generation: u64,
    },
    FetchSlots {
        barber_id: String,
        generation: u64,
    },
    /// Insert the appointment; when `replaces` is set, cancel that
    /// appointment once the insert succeeded.
    Submit {
        appointment: NewAppointment,
        replaces: Option<String>,
    },
}

/// Completed side effect, fed back into the wizard.
#[derive(Debug, Clone)]
pub enum WizardEvent {
    Units(Result<Vec<Unit>, BackendError>),
    Services(Result<Vec<Service>, BackendError>),
    Barbers {
        generation: u64,
        result: Result<Vec<Barber>, BackendError>,
    },
    Slots {
        generation: u64,
        result: Result<Vec<DaySlots>, BackendError>,
    },
    Submitted {
        result: Result<(), BackendError>,
        /// Outcome of cancelling the replaced appointment, if one was requested
        original_cancel: Option<Result<(), BackendError>>,
    },
}

/// What the parent should tell the user after a submission settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Booked,
    Rescheduled,
    /// The new booking exists but the original appointment is still scheduled
    OriginalKept(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmError {
    #[error("confirmation is only available on the last step")]
    NotOnConfirmStep,
    #[error("sign in to book an appointment")]
    NotSignedIn,
    #[error("missing {0}")]
    Incomplete(&'static str),
    #[error("booking already in progress")]
    InFlight,
    #[error("booking already completed")]
    AlreadyCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Submitting,
    Completed,
}

/// Display fields of the confirmation step. A selection whose entity is not
/// in the cached lists shows as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationSummary {
    pub unit: Option<String>,
    pub address: Option<String>,
    pub service: Option<String>,
    pub duration: Option<String>,
    pub barber: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    step: WizardStep,
    selection: Selection,
    units: Loadable<Vec<Unit>>,
    services: Loadable<Vec<Service>>,
    barbers: Loadable<Vec<Barber>>,
    schedule: Loadable<Vec<DaySlots>>,
    barbers_generation: u64,
    slots_generation: u64,
    submit: SubmitState,
    replaces: Option<String>,
}

impl Default for BookingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::Unit,
            selection: Selection::default(),
            units: Loadable::Idle,
            services: Loadable::Idle,
            barbers: Loadable::Idle,
            schedule: Loadable::Idle,
            barbers_generation: 0,
            slots_generation: 0,
            submit: SubmitState::Idle,
            replaces: None,
        }
    }

    /// A wizard that books a replacement for `original`.
    ///
    /// Unit, service and barber are carried over and the wizard opens on the
    /// date/time step. The original is cancelled only after the new booking
    /// is stored.
    pub fn rescheduling(original: &AppointmentDetails) -> Self {
        let mut wizard = Self::new();
        wizard.selection.unit_id = Some(original.unit_id.clone());
        wizard.selection.service_id = Some(original.service_id.clone());
        wizard.selection.barber_id = Some(original.barber_id.clone());
        wizard.step = WizardStep::DateTime;
        wizard.replaces = Some(original.id.clone());
        wizard
    }

    /// Initial fetches: units and services always, plus barbers and slots
    /// when the selection is pre-seeded.
    pub fn mount(&mut self) -> Vec<WizardCommand> {
        self.units = Loadable::Loading;
        self.services = Loadable::Loading;
        let mut commands = vec![WizardCommand::FetchUnits, WizardCommand::FetchServices];
        if let Some(unit_id) = self.selection.unit_id.clone() {
            commands.push(self.request_barbers(unit_id));
        }
        if let Some(barber_id) = self.selection.barber_id.clone() {
            commands.push(self.request_slots(barber_id));
        }
        commands
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn units(&self) -> &Loadable<Vec<Unit>> {
        &self.units
    }

    pub fn services(&self) -> &Loadable<Vec<Service>> {
        &self.services
    }

    pub fn barbers(&self) -> &Loadable<Vec<Barber>> {
        &self.barbers
    }

    pub fn schedule(&self) -> &Loadable<Vec<DaySlots>> {
        &self.schedule
    }

    /// Id of the appointment this booking replaces.
    pub fn replaces(&self) -> Option<&str> {
        self.replaces.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit == SubmitState::Submitting
    }

    pub fn is_completed(&self) -> bool {
        self.submit == SubmitState::Completed
    }

    /// Free times on the selected date.
    pub fn times_for_selected_date(&self) -> &[NaiveTime] {
        let Some(date) = self.selection.date else {
            return &[];
        };
        self.schedule
            .items()
            .iter()
            .find(|day| day.date == date)
            .map(|day| day.times.as_slice())
            .unwrap_or(&[])
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        let id = self.selection.unit_id.as_deref()?;
        self.units.items().iter().find(|u| u.id == id)
    }

    pub fn selected_service(&self) -> Option<&Service> {
        let id = self.selection.service_id.as_deref()?;
        self.services.items().iter().find(|s| s.id == id)
    }

    pub fn selected_barber(&self) -> Option<&Barber> {
        let id = self.selection.barber_id.as_deref()?;
        self.barbers.items().iter().find(|b| b.id == id)
    }

    // ---------------------------------------------------------------------
    // Step navigation
    // ---------------------------------------------------------------------

    /// Whether the current step's required fields are set.
    pub fn can_proceed(&self) -> bool {
        let s = &self.selection;
        match self.step {
            WizardStep::Unit => s.unit_id.is_some(),
            WizardStep::Service => s.service_id.is_some(),
            WizardStep::Barber => s.barber_id.is_some(),
            WizardStep::DateTime => s.date.is_some() && s.time.is_some(),
            WizardStep::Confirm => true,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.step != WizardStep::Unit && !self.is_submitting()
    }

    /// Advance one step. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        if !self.can_proceed() {
            return false;
        }
        match WizardStep::from_number(self.step.number() + 1) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Go back one step. Returns whether the step changed.
    pub fn previous(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        match WizardStep::from_number(self.step.number() - 1) {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    pub fn progress_percent(&self) -> u16 {
        crate::utils::format::progress_percent(self.step.number(), TOTAL_STEPS)
    }

    // ---------------------------------------------------------------------
    // Selections
    // ---------------------------------------------------------------------

    /// Select a unit. A different unit clears the barber, date and time and
    /// requests that unit's barbers; the same unit again requests nothing.
    pub fn select_unit(&mut self, unit_id: &str) -> Option<WizardCommand> {
        if self.selection.unit_id.as_deref() == Some(unit_id) {
            return None;
        }
        self.selection.unit_id = Some(unit_id.to_string());
        self.selection.barber_id = None;
        self.selection.date = None;
        self.selection.time = None;
        self.schedule = Loadable::Idle;
        // Slots still in flight belong to the old barber
        self.slots_generation += 1;
        Some(self.request_barbers(unit_id.to_string()))
    }

    pub fn select_service(&mut self, service_id: &str) {
        self.selection.service_id = Some(service_id.to_string());
    }

    /// Select a barber. A different barber clears the date and time and
    /// requests that barber's free slots.
    pub fn select_barber(&mut self, barber_id: &str) -> Option<WizardCommand> {
        if self.selection.barber_id.as_deref() == Some(barber_id) {
            return None;
        }
        self.selection.barber_id = Some(barber_id.to_string());
        self.selection.date = None;
        self.selection.time = None;
        Some(self.request_slots(barber_id.to_string()))
    }

    /// Select a date; a different date clears the time.
    pub fn select_date(&mut self, date: NaiveDate) {
        if self.selection.date != Some(date) {
            self.selection.date = Some(date);
            self.selection.time = None;
        }
    }

    pub fn select_time(&mut self, time: NaiveTime) {
        self.selection.time = Some(time);
    }

    fn request_barbers(&mut self, unit_id: String) -> WizardCommand {
        self.barbers_generation += 1;
        self.barbers = Loadable::Loading;
        WizardCommand::FetchBarbers {
            unit_id,
            generation: self.barbers_generation,
        }
    }

    fn request_slots(&mut self, barber_id: String) -> WizardCommand {
        self.slots_generation += 1;
        self.schedule = Loadable::Loading;
        WizardCommand::FetchSlots {
            barber_id,
            generation: self.slots_generation,
        }
    }

    // ---------------------------------------------------------------------
    // Confirmation
    // ---------------------------------------------------------------------

    /// Build the insert for the current selection and mark it in flight.
    pub fn confirm(&mut self, user: Option<&AuthUser>) -> Result<WizardCommand, ConfirmError> {
        if self.step != WizardStep::Confirm {
            return Err(ConfirmError::NotOnConfirmStep);
        }
        match self.submit {
            SubmitState::Submitting => return Err(ConfirmError::InFlight),
            SubmitState::Completed => return Err(ConfirmError::AlreadyCompleted),
            SubmitState::Idle => {}
        }
        let user = user.ok_or(ConfirmError::NotSignedIn)?;

        let s = &self.selection;
        let appointment = NewAppointment {
            user_id: user.id.clone(),
            unit_id: s.unit_id.clone().ok_or(ConfirmError::Incomplete("unit"))?,
            service_id: s
                .service_id
                .clone()
                .ok_or(ConfirmError::Incomplete("service"))?,
            barber_id: s
                .barber_id
                .clone()
                .ok_or(ConfirmError::Incomplete("barber"))?,
            appointment_date: s.date.ok_or(ConfirmError::Incomplete("date"))?,
            appointment_time: s.time.ok_or(ConfirmError::Incomplete("time"))?,
            status: AppointmentStatus::Scheduled,
        };

        info!(
            "Submitting booking for {} at {}",
            appointment.appointment_date, appointment.appointment_time
        );
        self.submit = SubmitState::Submitting;
        Ok(WizardCommand::Submit {
            appointment,
            replaces: self.replaces.clone(),
        })
    }

    // ---------------------------------------------------------------------
    // Results
    // ---------------------------------------------------------------------

    /// Apply a finished side effect. Returns an outcome only for the first
    /// settled submission.
    pub fn apply(&mut self, event: WizardEvent) -> Option<SubmitOutcome> {
        match event {
            WizardEvent::Units(result) => {
                log_failure("units", &result);
                self.units = result.into();
            }
            WizardEvent::Services(result) => {
                log_failure("services", &result);
                self.services = result.into();
            }
            WizardEvent::Barbers { generation, result } => {
                if generation != self.barbers_generation {
                    debug!("Dropping stale barber list (generation {})", generation);
                    return None;
                }
                log_failure("barbers", &result);
                self.barbers = result.into();
            }
            WizardEvent::Slots { generation, result } => {
                if generation != self.slots_generation {
                    debug!("Dropping stale availability (generation {})", generation);
                    return None;
                }
                log_failure("availability", &result);
                self.schedule = result.into();
                self.reconcile_date_time();
            }
            WizardEvent::Submitted {
                result,
                original_cancel,
            } => return self.settle_submission(result, original_cancel),
        }
        None
    }

    fn settle_submission(
        &mut self,
        result: Result<(), BackendError>,
        original_cancel: Option<Result<(), BackendError>>,
    ) -> Option<SubmitOutcome> {
        if self.submit != SubmitState::Submitting {
            debug!("Ignoring submission result with no booking in flight");
            return None;
        }
        match result {
            Ok(()) => {
                self.submit = SubmitState::Completed;
                Some(match original_cancel {
                    None => SubmitOutcome::Booked,
                    Some(Ok(())) => SubmitOutcome::Rescheduled,
                    Some(Err(e)) => {
                        warn!("Booked replacement but original stayed scheduled: {}", e);
                        SubmitOutcome::OriginalKept(e.to_string())
                    }
                })
            }
            Err(e) => {
                warn!("Booking failed: {}", e);
                self.submit = SubmitState::Idle;
                Some(SubmitOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Drop a chosen date or time that the fresh schedule no longer offers.
    fn reconcile_date_time(&mut self) {
        let Some(date) = self.selection.date else {
            return;
        };
        let day = self.schedule.items().iter().find(|d| d.date == date);
        match (day, self.selection.time) {
            (None, _) => {
                self.selection.date = None;
                self.selection.time = None;
            }
            (Some(day), Some(time)) if !day.times.contains(&time) => {
                self.selection.time = None;
            }
            _ => {}
        }
    }

    /// Fields shown on the confirmation step.
    pub fn summary(&self) -> ConfirmationSummary {
        let unit = self.selected_unit();
        let service = self.selected_service();
        ConfirmationSummary {
            unit: unit.map(|u| u.name.clone()),
            address: unit.map(|u| u.address.clone()),
            service: service.map(|s| s.name.clone()),
            duration: service.map(|s| format_duration(s.duration_minutes)),
            barber: self.selected_barber().map(|b| b.name.clone()),
            date: self.selection.date.map(format_date),
            time: self.selection.time.map(format_time),
            total: service.map(|s| format_price(s.price)),
        }
    }
}

fn log_failure<T>(what: &str, result: &Result<T, BackendError>) {
    if let Err(e) = result {
        warn!("Failed to load {}: {}", what, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn user() -> AuthUser {
        AuthUser {
            id: "user-1".to_string(),
            email: None,
        }
    }

    fn slot(d: u32, h: u32, m: u32) -> AvailabilitySlot {
        AvailabilitySlot {
            barber_id: "Carlos".to_string(),
            slot_date: date(d),
            slot_time: time(h, m),
        }
    }

    fn fill_to_confirm(wizard: &mut BookingWizard) {
        wizard.select_unit("Unit A");
        assert!(wizard.next());
        wizard.select_service("Cut");
        assert!(wizard.next());
        wizard.select_barber("Carlos");
        assert!(wizard.next());
        wizard.select_date(date(15));
        wizard.select_time(time(14, 30));
        assert!(wizard.next());
        assert_eq!(wizard.step(), WizardStep::Confirm);
    }

    #[test]
    fn test_step_numbers_round_trip() {
        for step in WizardStep::ALL {
            assert_eq!(WizardStep::from_number(step.number()), Some(step));
        }
        assert_eq!(WizardStep::from_number(0), None);
        assert_eq!(WizardStep::from_number(6), None);
    }

    #[test]
    fn test_next_blocked_until_step_is_complete() {
        let mut wizard = BookingWizard::new();
        assert!(!wizard.can_proceed());
        assert!(!wizard.next());
        assert_eq!(wizard.step(), WizardStep::Unit);

        wizard.select_unit("u1");
        assert!(wizard.next());
        assert!(!wizard.next());
        wizard.select_service("s1");
        assert!(wizard.next());
        assert!(!wizard.next());
        wizard.select_barber("b1");
        assert!(wizard.next());

        wizard.select_date(date(15));
        assert!(!wizard.can_proceed(), "date alone is not enough");
        wizard.select_time(time(9, 0));
        assert!(wizard.next());

        assert!(wizard.can_proceed());
        assert!(!wizard.next(), "step is capped at 5");
        assert_eq!(wizard.step().number(), 5);
    }

    #[test]
    fn test_previous_floors_at_first_step() {
        let mut wizard = BookingWizard::new();
        assert!(!wizard.can_go_back());
        assert!(!wizard.previous());
        wizard.select_unit("u1");
        wizard.next();
        assert!(wizard.can_go_back());
        assert!(wizard.previous());
        assert!(!wizard.previous());
        assert_eq!(wizard.step(), WizardStep::Unit);
        // Going back keeps the selection
        assert_eq!(wizard.selection().unit_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_mount_requests_units_and_services() {
        let mut wizard = BookingWizard::new();
        assert_eq!(
            wizard.mount(),
            vec![WizardCommand::FetchUnits, WizardCommand::FetchServices]
        );
        assert!(wizard.units().is_loading());
        assert!(wizard.services().is_loading());
    }

    #[test]
    fn test_unit_selection_fetches_barbers_once_per_change() {
        let mut wizard = BookingWizard::new();
        assert_eq!(
            wizard.select_unit("u1"),
            Some(WizardCommand::FetchBarbers {
                unit_id: "u1".to_string(),
                generation: 1
            })
        );
        assert_eq!(wizard.select_unit("u1"), None);
        assert_eq!(
            wizard.select_unit("u2"),
            Some(WizardCommand::FetchBarbers {
                unit_id: "u2".to_string(),
                generation: 2
            })
        );
    }

    #[test]
    fn test_changing_unit_clears_dependent_choices() {
        let mut wizard = BookingWizard::new();
        wizard.select_unit("u1");
        wizard.select_service("s1");
        wizard.select_barber("b1");
        wizard.select_date(date(15));
        wizard.select_time(time(10, 0));

        wizard.select_unit("u2");
        let s = wizard.selection();
        assert_eq!(s.service_id.as_deref(), Some("s1"));
        assert_eq!(s.barber_id, None);
        assert_eq!(s.date, None);
        assert_eq!(s.time, None);
    }

    #[test]
    fn test_changing_date_clears_time() {
        let mut wizard = BookingWizard::new();
        wizard.select_date(date(15));
        wizard.select_time(time(10, 0));
        wizard.select_date(date(15));
        assert_eq!(wizard.selection().time, Some(time(10, 0)));
        wizard.select_date(date(16));
        assert_eq!(wizard.selection().time, None);
    }

    #[test]
    fn test_stale_barber_list_is_dropped() {
        let mut wizard = BookingWizard::new();
        wizard.select_unit("u1");
        wizard.select_unit("u2");

        let stale = vec![Barber {
            id: "b-old".to_string(),
            name: "Old".to_string(),
            specialty: None,
            rating: None,
            unit_id: "u1".to_string(),
        }];
        wizard.apply(WizardEvent::Barbers {
            generation: 1,
            result: Ok(stale),
        });
        assert!(wizard.barbers().is_loading());

        wizard.apply(WizardEvent::Barbers {
            generation: 2,
            result: Ok(Vec::new()),
        });
        assert_eq!(wizard.barbers(), &Loadable::Loaded(Vec::new()));
    }

    #[test]
    fn test_fetch_failure_is_visible() {
        let mut wizard = BookingWizard::new();
        wizard.mount();
        wizard.apply(WizardEvent::Units(Err(BackendError::Request(
            "connection refused".to_string(),
        ))));
        assert_eq!(
            wizard.units().error(),
            Some("request failed: connection refused")
        );
        assert!(wizard.units().items().is_empty());
    }

    #[test]
    fn test_confirm_requires_user_and_last_step() {
        let mut wizard = BookingWizard::new();
        assert_eq!(
            wizard.confirm(Some(&user())),
            Err(ConfirmError::NotOnConfirmStep)
        );
        fill_to_confirm(&mut wizard);
        assert_eq!(wizard.confirm(None), Err(ConfirmError::NotSignedIn));
        assert!(!wizard.is_submitting());
    }

    #[test]
    fn test_confirm_builds_scheduled_insert() {
        let mut wizard = BookingWizard::new();
        fill_to_confirm(&mut wizard);
        let command = wizard.confirm(Some(&user())).unwrap();
        assert_eq!(
            command,
            WizardCommand::Submit {
                appointment: NewAppointment {
                    user_id: "user-1".to_string(),
                    unit_id: "Unit A".to_string(),
                    service_id: "Cut".to_string(),
                    barber_id: "Carlos".to_string(),
                    appointment_date: date(15),
                    appointment_time: time(14, 30),
                    status: AppointmentStatus::Scheduled,
                },
                replaces: None,
            }
        );
        assert!(wizard.is_submitting());
        assert_eq!(wizard.confirm(Some(&user())), Err(ConfirmError::InFlight));
        assert!(!wizard.previous(), "no going back mid-submit");
    }

    #[test]
    fn test_success_completes_exactly_once() {
        let mut wizard = BookingWizard::new();
        fill_to_confirm(&mut wizard);
        wizard.confirm(Some(&user())).unwrap();

        let ok = || WizardEvent::Submitted {
            result: Ok(()),
            original_cancel: None,
        };
        assert_eq!(wizard.apply(ok()), Some(SubmitOutcome::Booked));
        assert!(wizard.is_completed());
        assert_eq!(wizard.apply(ok()), None);
        assert_eq!(
            wizard.confirm(Some(&user())),
            Err(ConfirmError::AlreadyCompleted)
        );
    }

    #[test]
    fn test_failure_keeps_state_and_allows_retry() {
        let mut wizard = BookingWizard::new();
        fill_to_confirm(&mut wizard);
        let before = wizard.selection().clone();
        wizard.confirm(Some(&user())).unwrap();

        let outcome = wizard.apply(WizardEvent::Submitted {
            result: Err(BackendError::Request("timeout".to_string())),
            original_cancel: None,
        });
        assert_eq!(
            outcome,
            Some(SubmitOutcome::Failed("request failed: timeout".to_string()))
        );
        assert!(!wizard.is_completed());
        assert_eq!(wizard.selection(), &before);
        assert_eq!(wizard.step(), WizardStep::Confirm);
        assert!(wizard.confirm(Some(&user())).is_ok());
    }

    #[test]
    fn test_summary_lookups() {
        let mut wizard = BookingWizard::new();
        wizard.apply(WizardEvent::Units(Ok(vec![Unit {
            id: "Unit A".to_string(),
            name: "Unit A".to_string(),
            address: "Rua 1".to_string(),
        }])));
        wizard.apply(WizardEvent::Services(Ok(vec![Service {
            id: "Cut".to_string(),
            name: "Cut".to_string(),
            duration_minutes: 30,
            price: 45.0,
        }])));
        fill_to_confirm(&mut wizard);

        let summary = wizard.summary();
        assert_eq!(summary.unit.as_deref(), Some("Unit A"));
        assert_eq!(summary.total.as_deref(), Some("R$ 45"));
        assert_eq!(summary.duration.as_deref(), Some("30 min"));
        assert_eq!(summary.date.as_deref(), Some("15/01/2024"));
        assert_eq!(summary.time.as_deref(), Some("14:30"));
        // Barber list never loaded: the field is empty, not an error
        assert_eq!(summary.barber, None);
    }

    #[test]
    fn test_build_schedule_hides_taken_and_past_slots() {
        let slots = vec![
            slot(15, 9, 0),
            slot(15, 14, 30),
            slot(15, 10, 0),
            slot(16, 9, 0),
            slot(14, 9, 0),
            slot(15, 10, 0),
        ];
        let taken = vec![TakenSlot {
            appointment_date: date(16),
            appointment_time: time(9, 0),
        }];
        let now = date(15).and_time(time(9, 30));

        let schedule = build_schedule(&slots, &taken, now);
        assert_eq!(
            schedule,
            vec![DaySlots {
                date: date(15),
                times: vec![time(10, 0), time(14, 30)],
            }]
        );
    }

    #[test]
    fn test_fresh_schedule_drops_unavailable_choice() {
        let mut wizard = BookingWizard::new();
        let Some(WizardCommand::FetchSlots { generation, .. }) = wizard.select_barber("Carlos")
        else {
            panic!("barber selection should request slots");
        };
        wizard.select_date(date(15));
        wizard.select_time(time(9, 0));

        wizard.apply(WizardEvent::Slots {
            generation,
            result: Ok(vec![DaySlots {
                date: date(15),
                times: vec![time(10, 0)],
            }]),
        });
        assert_eq!(wizard.selection().date, Some(date(15)));
        assert_eq!(wizard.selection().time, None);
        assert_eq!(wizard.times_for_selected_date(), &[time(10, 0)]);
    }

    #[test]
    fn test_rescheduling_preseeds_and_links() {
        let original: AppointmentDetails = serde_json::from_str(
            r#"{"id":"a-1","user_id":"user-1","unit_id":"Unit A","service_id":"Cut",
                "barber_id":"Carlos","appointment_date":"2024-01-10",
                "appointment_time":"10:00:00","status":"scheduled"}"#,
        )
        .unwrap();
        let mut wizard = BookingWizard::rescheduling(&original);
        assert_eq!(wizard.step(), WizardStep::DateTime);
        assert_eq!(wizard.replaces(), Some("a-1"));

        let commands = wizard.mount();
        assert_eq!(commands.len(), 4);
        assert!(matches!(
            commands[2],
            WizardCommand::FetchBarbers { ref unit_id, .. } if unit_id == "Unit A"
        ));
        assert!(matches!(
            commands[3],
            WizardCommand::FetchSlots { ref barber_id, .. } if barber_id == "Carlos"
        ));

        wizard.select_date(date(15));
        wizard.select_time(time(14, 30));
        wizard.next();
        let WizardCommand::Submit { replaces, .. } = wizard.confirm(Some(&user())).unwrap() else {
            panic!("confirm should submit");
        };
        assert_eq!(replaces.as_deref(), Some("a-1"));

        let outcome = wizard.apply(WizardEvent::Submitted {
            result: Ok(()),
            original_cancel: Some(Ok(())),
        });
        assert_eq!(outcome, Some(SubmitOutcome::Rescheduled));
    }

    #[test]
    fn test_progress() {
        let mut wizard = BookingWizard::new();
        assert_eq!(wizard.progress_percent(), 20);
        fill_to_confirm(&mut wizard);
        assert_eq!(wizard.progress_percent(), 100);
    }
}
