//! Integration tests for the booking wizard against an in-memory backend.
//!
//! Covers the full five-step flow, the barber re-fetch rules, failure
//! handling on insert, taken-slot filtering and the non-interactive
//! `book` path used by the CLI.

mod common;

use barberbook::cli::{book_with_wizard, BookRequest};
use barberbook::models::AppointmentStatus;
use barberbook::services::{AppEvent, BookingService, Dispatcher};
use barberbook::state::{BookingWizard, SubmitOutcome, WizardCommand, WizardEvent, WizardStep};
use chrono::NaiveDateTime;
use common::{date, fresh_session, server_error, time, FakeBackend};
use std::sync::Arc;
use std::time::Duration;

fn now() -> NaiveDateTime {
    date(2024, 1, 10).and_time(time(9, 0))
}

fn fake() -> FakeBackend {
    FakeBackend::new(date(2024, 1, 15))
}

async fn run(fake: &FakeBackend, wizard: &mut BookingWizard, command: WizardCommand) -> Option<SubmitOutcome> {
    let event = BookingService::execute(fake, command, now()).await;
    wizard.apply(event)
}

async fn mounted(fake: &FakeBackend) -> BookingWizard {
    let mut wizard = BookingWizard::new();
    for command in wizard.mount() {
        run(fake, &mut wizard, command).await;
    }
    wizard
}

/// Walk steps 1-4 with Unit A / Cut / Carlos / 2024-01-15 14:30.
async fn ready_to_confirm(fake: &FakeBackend) -> BookingWizard {
    let mut wizard = mounted(fake).await;
    let command = wizard.select_unit("u1").expect("first unit selection fetches barbers");
    run(fake, &mut wizard, command).await;
    assert!(wizard.next());
    wizard.select_service("s1");
    assert!(wizard.next());
    let command = wizard.select_barber("b1").expect("barber selection fetches slots");
    run(fake, &mut wizard, command).await;
    assert!(wizard.next());
    wizard.select_date(date(2024, 1, 15));
    wizard.select_time(time(14, 30));
    assert!(wizard.next());
    wizard
}

// ============================================================================
// HAPPY PATH
// ============================================================================

#[tokio::test]
async fn booking_example_inserts_one_scheduled_row() {
    let fake = fake();
    let mut wizard = ready_to_confirm(&fake).await;
    assert_eq!(wizard.step(), WizardStep::Confirm);

    let summary = wizard.summary();
    assert_eq!(summary.unit.as_deref(), Some("Unit A"));
    assert_eq!(summary.service.as_deref(), Some("Cut"));
    assert_eq!(summary.barber.as_deref(), Some("Carlos"));
    assert_eq!(summary.date.as_deref(), Some("15/01/2024"));
    assert_eq!(summary.time.as_deref(), Some("14:30"));
    assert_eq!(summary.total.as_deref(), Some("R$ 45"));

    let user = fresh_session().user;
    let command = wizard.confirm(Some(&user)).unwrap();
    assert_eq!(run(&fake, &mut wizard, command).await, Some(SubmitOutcome::Booked));
    assert!(wizard.is_completed());

    let calls = fake.calls();
    assert_eq!(calls.inserts.len(), 1);
    let row = &calls.inserts[0];
    assert_eq!(row.user_id, user.id);
    assert_eq!(row.unit_id, "u1");
    assert_eq!(row.service_id, "s1");
    assert_eq!(row.barber_id, "b1");
    assert_eq!(row.appointment_date, date(2024, 1, 15));
    assert_eq!(row.appointment_time, time(14, 30));
    assert_eq!(row.status, AppointmentStatus::Scheduled);

    // Completion is signalled once; a second confirm is refused
    assert!(wizard.confirm(Some(&user)).is_err());
}

#[tokio::test]
async fn mount_loads_units_and_services_once() {
    let fake = fake();
    let wizard = mounted(&fake).await;
    let names: Vec<&str> = wizard.units().items().iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Unit A", "Unit B"]);
    assert_eq!(wizard.services().items().len(), 2);
    let calls = fake.calls();
    assert_eq!(calls.list_units, 1);
    assert_eq!(calls.list_services, 1);
    assert!(calls.list_barbers.is_empty());
}

// ============================================================================
// BARBER RE-FETCH
// ============================================================================

#[tokio::test]
async fn reselecting_same_unit_does_not_refetch_barbers() {
    let fake = fake();
    let mut wizard = mounted(&fake).await;

    let command = wizard.select_unit("u1").unwrap();
    run(&fake, &mut wizard, command).await;
    assert!(wizard.select_unit("u1").is_none());

    assert_eq!(fake.calls().list_barbers, vec!["u1".to_string()]);
}

#[tokio::test]
async fn changing_unit_refetches_and_clears_later_choices() {
    let fake = fake();
    let mut wizard = ready_to_confirm(&fake).await;
    assert!(wizard.previous());
    assert!(wizard.previous());
    assert!(wizard.previous());
    assert!(wizard.previous());
    assert_eq!(wizard.step(), WizardStep::Unit);

    let command = wizard.select_unit("u2").unwrap();
    run(&fake, &mut wizard, command).await;

    assert_eq!(fake.calls().list_barbers, vec!["u1".to_string(), "u2".to_string()]);
    let selection = wizard.selection();
    assert_eq!(selection.barber_id, None);
    assert_eq!(selection.date, None);
    assert_eq!(selection.time, None);
    let barbers: Vec<&str> = wizard.barbers().items().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(barbers, vec!["Marcos"]);
}

#[tokio::test]
async fn stale_barber_list_is_dropped() {
    let fake = fake();
    let mut wizard = mounted(&fake).await;
    let first = wizard.select_unit("u1").unwrap();
    let second = wizard.select_unit("u2").unwrap();

    // The second request lands first, then the first one straggles in
    run(&fake, &mut wizard, second).await;
    run(&fake, &mut wizard, first).await;

    let barbers: Vec<&str> = wizard.barbers().items().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(barbers, vec!["Marcos"]);
}

// ============================================================================
// FAILURES
// ============================================================================

#[tokio::test]
async fn failed_insert_keeps_wizard_state() {
    let fake = fake();
    fake.fail(|f| f.insert = Some(server_error()));
    let mut wizard = ready_to_confirm(&fake).await;
    let before = wizard.selection().clone();

    let user = fresh_session().user;
    let command = wizard.confirm(Some(&user)).unwrap();
    let outcome = run(&fake, &mut wizard, command).await;
    assert!(matches!(outcome, Some(SubmitOutcome::Failed(_))));

    assert_eq!(wizard.step(), WizardStep::Confirm);
    assert_eq!(wizard.selection(), &before);
    assert!(!wizard.is_completed());
    assert!(fake.appointments().is_empty());

    // The user may try again
    fake.fail(|f| f.insert = None);
    let command = wizard.confirm(Some(&user)).unwrap();
    assert_eq!(run(&fake, &mut wizard, command).await, Some(SubmitOutcome::Booked));
}

#[tokio::test]
async fn confirm_requires_a_signed_in_user() {
    let fake = fake();
    let mut wizard = ready_to_confirm(&fake).await;
    assert!(wizard.confirm(None).is_err());
    assert!(fake.calls().inserts.is_empty());
}

#[tokio::test]
async fn failed_unit_load_is_visible() {
    let fake = fake();
    fake.fail(|f| f.list_units = Some(server_error()));
    let wizard = mounted(&fake).await;
    assert!(wizard.units().error().is_some());
    assert!(wizard.units().items().is_empty());
}

// ============================================================================
// AVAILABILITY
// ============================================================================

#[tokio::test]
async fn taken_and_past_slots_are_hidden() {
    let fake = fake();
    fake.seed_appointment("b1", date(2024, 1, 15), time(14, 30));

    let days = BookingService::free_slots(&fake, "b1", now()).await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].times, vec![time(9, 0), time(16, 0)]);

    let late = date(2024, 1, 15).and_time(time(12, 0));
    let days = BookingService::free_slots(&fake, "b1", late).await.unwrap();
    assert_eq!(days[0].times, vec![time(16, 0)]);
}

// ============================================================================
// NON-INTERACTIVE BOOKING
// ============================================================================

fn request(time_of_day: chrono::NaiveTime) -> BookRequest {
    BookRequest {
        unit: "Unit A".to_string(),
        service: "cut".to_string(),
        barber: "b1".to_string(),
        date: date(2024, 1, 15),
        time: time_of_day,
    }
}

#[tokio::test]
async fn book_command_drives_the_wizard() {
    let fake = fake();
    let user = fresh_session().user;

    let summary = book_with_wizard(&fake, &user, &request(time(14, 30)), now())
        .await
        .unwrap();
    assert_eq!(summary.total.as_deref(), Some("R$ 45"));

    let calls = fake.calls();
    assert_eq!(calls.inserts.len(), 1);
    assert_eq!(calls.list_barbers, vec!["u1".to_string()]);
    assert_eq!(calls.inserts[0].appointment_time, time(14, 30));
}

#[tokio::test]
async fn book_command_rejects_unavailable_time() {
    let fake = fake();
    let user = fresh_session().user;

    let err = book_with_wizard(&fake, &user, &request(time(15, 0)), now())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not available"));
    assert!(fake.calls().inserts.is_empty());
}

#[tokio::test]
async fn book_command_rejects_barber_from_another_unit() {
    let fake = fake();
    let user = fresh_session().user;
    let mut req = request(time(14, 30));
    req.barber = "Marcos".to_string();

    let err = book_with_wizard(&fake, &user, &req, now()).await.unwrap_err();
    assert!(err.to_string().contains("Marcos"));
}

// ============================================================================
// DISPATCHER
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn dispatcher_tags_wizard_results_with_instance() {
    let fake = fake();
    let mut dispatcher = Dispatcher::new(tokio::runtime::Handle::current(), Arc::new(fake.clone()));

    dispatcher.wizard(None, 7, WizardCommand::FetchUnits);
    let event = tokio::time::timeout(Duration::from_secs(5), dispatcher.next_event())
        .await
        .expect("dispatcher answered in time")
        .expect("channel open");

    match event {
        AppEvent::Wizard {
            instance,
            event: WizardEvent::Units(Ok(units)),
        } => {
            assert_eq!(instance, 7);
            assert_eq!(units.len(), 2);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(fake.calls().list_units, 1);
}
