//! Shared test utilities for workflow integration tests.
//!
//! Provides:
//! - `FakeBackend`: an in-memory stand-in for the hosted backend that
//!   implements every backend trait, counts calls and can be scripted to fail
//! - `TestEnv`: an isolated config/session directory with automatic cleanup
//!   via `TempDir`

#![allow(dead_code)]

use async_trait::async_trait;
use barberbook::backend::{
    AuthBackend, BackendError, BackendResult, BookingBackend, Connector, SignUpOutcome,
    NO_ROWS_CODE,
};
use barberbook::config::Config;
use barberbook::models::{
    AppointmentDetails, AppointmentStatus, AvailabilitySlot, Barber, NameRef, NewAppointment,
    Profile, Service, ServiceRef, TakenSlot, Unit,
};
use barberbook::session::{AuthUser, Session, SessionStore};
use chrono::{NaiveDate, NaiveTime};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

pub const USER_ID: &str = "user-1";
pub const PASSWORD: &str = "secret123";

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A session for [`USER_ID`] whose token expires at `expires_at`.
pub fn session(expires_at: i64) -> Session {
    Session {
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        expires_at,
        user: AuthUser {
            id: USER_ID.to_string(),
            email: Some("joao@example.com".to_string()),
        },
    }
}

/// A session valid for the next hour.
pub fn fresh_session() -> Session {
    session(chrono::Utc::now().timestamp() + 3600)
}

pub fn no_rows() -> BackendError {
    BackendError::Api {
        status: 406,
        code: Some(NO_ROWS_CODE.to_string()),
        message: "JSON object requested, multiple (or no) rows returned".to_string(),
    }
}

pub fn server_error() -> BackendError {
    BackendError::Api {
        status: 500,
        code: None,
        message: "internal error".to_string(),
    }
}

/// Every call the fake has seen.
#[derive(Debug, Clone, Default)]
pub struct Calls {
    pub list_units: usize,
    pub list_services: usize,
    /// Unit id per barber fetch
    pub list_barbers: Vec<String>,
    /// Barber id per availability fetch
    pub list_availability: Vec<String>,
    pub get_profile: usize,
    pub inserts: Vec<NewAppointment>,
    pub cancels: Vec<String>,
    pub next_appointment: usize,
    pub history: usize,
    pub sign_ins: usize,
    pub sign_ups: usize,
    pub refreshes: usize,
    pub sign_outs: usize,
}

/// Errors to return instead of succeeding, one slot per operation.
#[derive(Debug, Clone, Default)]
pub struct Failures {
    pub list_units: Option<BackendError>,
    pub list_barbers: Option<BackendError>,
    pub get_profile: Option<BackendError>,
    pub insert: Option<BackendError>,
    pub next_appointment: Option<BackendError>,
    /// Cancels of this appointment id fail
    pub cancel: Option<(String, BackendError)>,
    pub refresh: Option<BackendError>,
}

#[derive(Debug, Default)]
struct Inner {
    units: Vec<Unit>,
    services: Vec<Service>,
    barbers: Vec<Barber>,
    profiles: Vec<Profile>,
    availability: Vec<AvailabilitySlot>,
    appointments: Vec<AppointmentDetails>,
    calls: Calls,
    failures: Failures,
    confirm_sign_ups: bool,
    /// Sign-ins hand out tokens already inside the refresh margin
    expiring_sign_ins: bool,
    next_id: usize,
}

/// In-memory backend shared by clones.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    /// Two units, two services, barbers at each unit, and slots for Carlos
    /// (`b1`) at 09:00, 14:30 and 16:00 on `slot_date`.
    pub fn new(slot_date: NaiveDate) -> Self {
        let fake = Self::default();
        {
            let mut inner = fake.lock();
            inner.units = vec![
                Unit {
                    id: "u1".to_string(),
                    name: "Unit A".to_string(),
                    address: "Rua das Flores, 100".to_string(),
                },
                Unit {
                    id: "u2".to_string(),
                    name: "Unit B".to_string(),
                    address: "Av. Paulista, 2000".to_string(),
                },
            ];
            inner.services = vec![
                Service {
                    id: "s1".to_string(),
                    name: "Cut".to_string(),
                    duration_minutes: 30,
                    price: 45.0,
                },
                Service {
                    id: "s2".to_string(),
                    name: "Beard".to_string(),
                    duration_minutes: 20,
                    price: 30.0,
                },
            ];
            inner.barbers = vec![
                Barber {
                    id: "b1".to_string(),
                    name: "Carlos".to_string(),
                    specialty: Some("Fades".to_string()),
                    rating: Some(4.8),
                    unit_id: "u1".to_string(),
                },
                Barber {
                    id: "b2".to_string(),
                    name: "Marcos".to_string(),
                    specialty: None,
                    rating: None,
                    unit_id: "u2".to_string(),
                },
            ];
            inner.profiles = vec![Profile {
                id: "p1".to_string(),
                user_id: USER_ID.to_string(),
                full_name: Some("João Silva".to_string()),
                phone: Some("+55 11 99999-0000".to_string()),
            }];
            inner.availability = [time(9, 0), time(14, 30), time(16, 0)]
                .into_iter()
                .map(|slot_time| AvailabilitySlot {
                    barber_id: "b1".to_string(),
                    slot_date,
                    slot_time,
                })
                .collect();
        }
        fake
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Calls {
        self.lock().calls.clone()
    }

    pub fn fail(&self, script: impl FnOnce(&mut Failures)) {
        script(&mut self.lock().failures);
    }

    /// Sign-ups return no session, as when email confirmation is on.
    pub fn require_confirmation(&self) {
        self.lock().confirm_sign_ups = true;
    }

    /// Make sign-ins return a token that the app will want to refresh at once.
    pub fn issue_expiring_sessions(&self) {
        self.lock().expiring_sign_ins = true;
    }

    pub fn appointments(&self) -> Vec<AppointmentDetails> {
        self.lock().appointments.clone()
    }

    pub fn appointment(&self, id: &str) -> Option<AppointmentDetails> {
        self.lock().appointments.iter().find(|a| a.id == id).cloned()
    }

    /// Store an appointment directly, bypassing the insert counter.
    pub fn seed_appointment(
        &self,
        barber_id: &str,
        appointment_date: NaiveDate,
        appointment_time: NaiveTime,
    ) -> String {
        let mut inner = self.lock();
        let appointment = inner.details(NewAppointment {
            user_id: USER_ID.to_string(),
            unit_id: "u1".to_string(),
            service_id: "s1".to_string(),
            barber_id: barber_id.to_string(),
            appointment_date,
            appointment_time,
            status: AppointmentStatus::Scheduled,
        });
        let id = appointment.id.clone();
        inner.appointments.push(appointment);
        id
    }
}

impl Inner {
    fn details(&mut self, row: NewAppointment) -> AppointmentDetails {
        self.next_id += 1;
        let name_of = |name: Option<&String>| name.map(|n| NameRef { name: n.clone() });
        let unit = name_of(self.units.iter().find(|u| u.id == row.unit_id).map(|u| &u.name));
        let barber = name_of(
            self.barbers
                .iter()
                .find(|b| b.id == row.barber_id)
                .map(|b| &b.name),
        );
        let service = self
            .services
            .iter()
            .find(|s| s.id == row.service_id)
            .map(|s| ServiceRef {
                name: s.name.clone(),
                price: Some(s.price),
                duration_minutes: Some(s.duration_minutes),
            });
        AppointmentDetails {
            id: format!("appt-{}", self.next_id),
            user_id: row.user_id,
            unit_id: row.unit_id,
            service_id: row.service_id,
            barber_id: row.barber_id,
            appointment_date: row.appointment_date,
            appointment_time: row.appointment_time,
            status: row.status,
            unit,
            service,
            barber,
        }
    }
}

#[async_trait]
impl BookingBackend for FakeBackend {
    async fn list_units(&self) -> BackendResult<Vec<Unit>> {
        let mut inner = self.lock();
        inner.calls.list_units += 1;
        if let Some(e) = inner.failures.list_units.clone() {
            return Err(e);
        }
        Ok(inner.units.clone())
    }

    async fn list_services(&self) -> BackendResult<Vec<Service>> {
        let mut inner = self.lock();
        inner.calls.list_services += 1;
        Ok(inner.services.clone())
    }

    async fn list_barbers(&self, unit_id: &str) -> BackendResult<Vec<Barber>> {
        let mut inner = self.lock();
        inner.calls.list_barbers.push(unit_id.to_string());
        if let Some(e) = inner.failures.list_barbers.clone() {
            return Err(e);
        }
        Ok(inner
            .barbers
            .iter()
            .filter(|b| b.unit_id == unit_id)
            .cloned()
            .collect())
    }

    async fn get_profile(&self, user_id: &str) -> BackendResult<Profile> {
        let mut inner = self.lock();
        inner.calls.get_profile += 1;
        if let Some(e) = inner.failures.get_profile.clone() {
            return Err(e);
        }
        inner
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(no_rows)
    }

    async fn list_availability(
        &self,
        barber_id: &str,
        from: NaiveDate,
    ) -> BackendResult<Vec<AvailabilitySlot>> {
        let mut inner = self.lock();
        inner.calls.list_availability.push(barber_id.to_string());
        Ok(inner
            .availability
            .iter()
            .filter(|s| s.barber_id == barber_id && s.slot_date >= from)
            .cloned()
            .collect())
    }

    async fn list_taken_slots(
        &self,
        barber_id: &str,
        from: NaiveDate,
    ) -> BackendResult<Vec<TakenSlot>> {
        Ok(self
            .lock()
            .appointments
            .iter()
            .filter(|a| {
                a.barber_id == barber_id
                    && a.status == AppointmentStatus::Scheduled
                    && a.appointment_date >= from
            })
            .map(|a| TakenSlot {
                appointment_date: a.appointment_date,
                appointment_time: a.appointment_time,
            })
            .collect())
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.inserts.push(appointment.clone());
        if let Some(e) = inner.failures.insert.clone() {
            return Err(e);
        }
        let row = inner.details(appointment.clone());
        inner.appointments.push(row);
        Ok(())
    }

    async fn next_appointment(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> BackendResult<AppointmentDetails> {
        let mut inner = self.lock();
        inner.calls.next_appointment += 1;
        if let Some(e) = inner.failures.next_appointment.clone() {
            return Err(e);
        }
        inner
            .appointments
            .iter()
            .filter(|a| {
                a.user_id == user_id
                    && a.status == AppointmentStatus::Scheduled
                    && a.appointment_date >= today
            })
            .min_by_key(|a| (a.appointment_date, a.appointment_time))
            .cloned()
            .ok_or_else(no_rows)
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> BackendResult<()> {
        let mut inner = self.lock();
        inner.calls.cancels.push(appointment_id.to_string());
        if let Some((id, e)) = inner.failures.cancel.clone() {
            if id == appointment_id {
                return Err(e);
            }
        }
        match inner.appointments.iter_mut().find(|a| a.id == appointment_id) {
            Some(appointment) => {
                appointment.status = AppointmentStatus::Cancelled;
                Ok(())
            }
            None => Err(BackendError::Api {
                status: 404,
                code: None,
                message: format!("appointment {} not found", appointment_id),
            }),
        }
    }

    async fn appointment_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> BackendResult<Vec<AppointmentDetails>> {
        let mut inner = self.lock();
        inner.calls.history += 1;
        let mut rows: Vec<AppointmentDetails> = inner
            .appointments
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| std::cmp::Reverse((a.appointment_date, a.appointment_time)));
        rows.truncate(limit);
        Ok(rows)
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let expiring = {
            let mut inner = self.lock();
            inner.calls.sign_ins += 1;
            inner.expiring_sign_ins
        };
        if password != PASSWORD {
            return Err(BackendError::Api {
                status: 400,
                code: Some("invalid_credentials".to_string()),
                message: "Invalid login credentials".to_string(),
            });
        }
        let mut session = fresh_session();
        session.user.email = Some(email.to_string());
        if expiring {
            session.expires_at = chrono::Utc::now().timestamp() + 30;
        }
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        full_name: &str,
    ) -> BackendResult<SignUpOutcome> {
        let mut inner = self.lock();
        inner.calls.sign_ups += 1;
        if inner.confirm_sign_ups {
            return Ok(SignUpOutcome::ConfirmationRequired);
        }
        inner.profiles.push(Profile {
            id: "p-new".to_string(),
            user_id: USER_ID.to_string(),
            full_name: Some(full_name.to_string()),
            phone: None,
        });
        let mut session = fresh_session();
        session.user.email = Some(email.to_string());
        Ok(SignUpOutcome::SignedIn(session))
    }

    async fn refresh_session(&self, _refresh_token: &str) -> BackendResult<Session> {
        let mut inner = self.lock();
        inner.calls.refreshes += 1;
        if let Some(e) = inner.failures.refresh.clone() {
            return Err(e);
        }
        let mut session = fresh_session();
        session.access_token = "refreshed-token".to_string();
        Ok(session)
    }

    async fn sign_out(&self, _access_token: &str) -> BackendResult<()> {
        self.lock().calls.sign_outs += 1;
        Ok(())
    }
}

impl Connector for FakeBackend {
    fn auth(&self) -> Arc<dyn AuthBackend> {
        Arc::new(self.clone())
    }

    fn booking(&self, _session: Option<&Session>) -> Arc<dyn BookingBackend> {
        Arc::new(self.clone())
    }
}

/// An isolated barberbook directory: `config.toml` and `session.json` live
/// under a temp dir removed on drop.
pub struct TestEnv {
    temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("barberbook");
        std::fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        Self {
            temp_dir,
            config_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn session_path(&self) -> PathBuf {
        self.config_dir.join("session.json")
    }

    pub fn store(&self) -> SessionStore {
        SessionStore::new(self.session_path())
    }

    /// Persist `session` as if a previous run had signed in.
    pub fn with_saved_session(self, session: &Session) -> Self {
        self.store().save(session).expect("Failed to save session");
        self
    }

    pub fn config(&self) -> Config {
        Config::load_or_create(&self.config_path()).expect("Failed to load config")
    }
}
