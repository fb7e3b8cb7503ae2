//! Row types for the hosted tables the client reads and writes.
//!
//! All rows are owned by the backend; the client only ever holds transient,
//! non-authoritative copies.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical barbershop location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// A bookable offering with a fixed duration and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub duration_minutes: u32,
    pub price: f64,
}

/// A professional scoped to one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barber {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    pub unit_id: String,
}

impl Barber {
    /// Rating shown next to the barber; unrated barbers display as 5.0.
    pub fn rating_display(&self) -> String {
        format!("{:.1}", self.rating.unwrap_or(5.0))
    }
}

/// The `profiles` row for a signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Profile {
    /// First word of the full name, used for greetings.
    pub fn first_name(&self) -> Option<&str> {
        self.full_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}

/// Lifecycle of an appointment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Wire value used in filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row inserted by the wizard's confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub user_id: String,
    pub unit_id: String,
    pub service_id: String,
    pub barber_id: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
}

/// Name-only projection of an embedded row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

/// Service projection embedded in appointment selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRef {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

/// An appointment joined with the names of its unit, service and barber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: String,
    pub user_id: String,
    pub unit_id: String,
    pub service_id: String,
    pub barber_id: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default, rename = "units")]
    pub unit: Option<NameRef>,
    #[serde(default, rename = "services")]
    pub service: Option<ServiceRef>,
    #[serde(default, rename = "barbers")]
    pub barber: Option<NameRef>,
}

impl AppointmentDetails {
    pub fn unit_name(&self) -> &str {
        self.unit.as_ref().map_or("", |u| u.name.as_str())
    }

    pub fn service_name(&self) -> &str {
        self.service.as_ref().map_or("", |s| s.name.as_str())
    }

    pub fn barber_name(&self) -> &str {
        self.barber.as_ref().map_or("", |b| b.name.as_str())
    }
}

/// One bookable slot published by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub barber_id: String,
    pub slot_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub slot_time: NaiveTime,
}

/// Date/time pair of an appointment already holding a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakenSlot {
    pub appointment_date: NaiveDate,
    #[serde(with = "hhmm")]
    pub appointment_time: NaiveTime,
}

/// Serde adapter for `HH:MM` times.
///
/// Postgres `time` columns come back as `HH:MM:SS`; both forms are accepted.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parse `HH:MM` or `HH:MM:SS`.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_appointment_wire_format() {
        let row = NewAppointment {
            user_id: "user-1".to_string(),
            unit_id: "Unit A".to_string(),
            service_id: "Cut".to_string(),
            barber_id: "Carlos".to_string(),
            appointment_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            appointment_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            status: AppointmentStatus::Scheduled,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["appointment_date"], "2024-01-15");
        assert_eq!(value["appointment_time"], "14:30");
        assert_eq!(value["status"], "scheduled");
    }

    #[test]
    fn test_appointment_details_with_embedded_names() {
        let json = r#"{
            "id": "a1", "user_id": "u1", "unit_id": "un1", "service_id": "s1",
            "barber_id": "b1", "appointment_date": "2024-01-15",
            "appointment_time": "14:30:00", "status": "scheduled",
            "units": {"name": "Centro"},
            "services": {"name": "Corte + Barba", "price": 45},
            "barbers": {"name": "Carlos Silva"}
        }"#;
        let details: AppointmentDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.appointment_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(details.unit_name(), "Centro");
        assert_eq!(details.service_name(), "Corte + Barba");
        assert_eq!(details.barber_name(), "Carlos Silva");
    }

    #[test]
    fn test_missing_embeds_render_empty() {
        let json = r#"{
            "id": "a1", "user_id": "u1", "unit_id": "un1", "service_id": "s1",
            "barber_id": "b1", "appointment_date": "2024-01-15",
            "appointment_time": "09:00", "status": "cancelled"
        }"#;
        let details: AppointmentDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.status, AppointmentStatus::Cancelled);
        assert_eq!(details.barber_name(), "");
    }

    #[test]
    fn test_barber_rating_defaults_to_five() {
        let barber = Barber {
            id: "b1".to_string(),
            name: "Carlos".to_string(),
            specialty: None,
            rating: None,
            unit_id: "u1".to_string(),
        };
        assert_eq!(barber.rating_display(), "5.0");
    }

    #[test]
    fn test_profile_first_name() {
        let profile = Profile {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            full_name: Some("João da Silva".to_string()),
            phone: None,
        };
        assert_eq!(profile.first_name(), Some("João"));
    }
}
