//! Integration tests for the dashboard: next appointment, cancel and
//! reschedule, run through the real services against the fake backend.

mod common;

use barberbook::models::AppointmentStatus;
use barberbook::services::{BookingService, DashboardService};
use barberbook::state::{
    BookingWizard, DashboardCommand, DashboardNotice, DashboardState, Loadable, SubmitOutcome,
    WizardStep,
};
use common::{date, fresh_session, server_error, time, FakeBackend, USER_ID};

fn today() -> chrono::NaiveDate {
    date(2024, 1, 10)
}

/// Run a dashboard command and apply its result, returning any follow-up.
async fn run(
    fake: &FakeBackend,
    state: &mut DashboardState,
    command: DashboardCommand,
) -> barberbook::state::DashboardUpdate {
    let event = DashboardService::execute(fake, command).await;
    state.apply(event)
}

async fn loaded(fake: &FakeBackend) -> DashboardState {
    let mut state = DashboardState::new(today());
    for command in state.load(USER_ID, today()) {
        run(fake, &mut state, command).await;
    }
    state
}

// ============================================================================
// NEXT APPOINTMENT
// ============================================================================

#[tokio::test]
async fn no_rows_renders_empty_state() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let state = loaded(&fake).await;

    assert!(matches!(state.next_appointment(), Loadable::Loaded(None)));
    assert!(state.displayed().is_none());
    assert_eq!(state.greeting_name(), Some("João"));
}

#[tokio::test]
async fn other_failures_are_an_error_state() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    fake.fail(|f| f.next_appointment = Some(server_error()));
    let state = loaded(&fake).await;

    assert!(state.next_appointment().error().is_some());
    // The profile fetch is independent
    assert!(state.profile().loaded().is_some());
}

#[tokio::test]
async fn nearest_upcoming_appointment_is_shown() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    fake.seed_appointment("b1", date(2024, 1, 20), time(10, 0));
    let nearest = fake.seed_appointment("b1", date(2024, 1, 15), time(16, 0));
    // In the past relative to today
    fake.seed_appointment("b1", date(2024, 1, 2), time(10, 0));

    let state = loaded(&fake).await;
    let shown = state.displayed().unwrap();
    assert_eq!(shown.id, nearest);
    assert_eq!(shown.service_name(), "Cut");
    assert_eq!(shown.barber_name(), "Carlos");
    assert_eq!(shown.unit_name(), "Unit A");
}

// ============================================================================
// CANCEL
// ============================================================================

#[tokio::test]
async fn cancel_refetches_next_appointment_exactly_once() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let id = fake.seed_appointment("b1", date(2024, 1, 15), time(14, 30));
    let mut state = loaded(&fake).await;
    assert_eq!(fake.calls().next_appointment, 1);

    let command = state.request_cancel().unwrap();
    // A second press while the first is in flight does nothing
    assert!(state.request_cancel().is_none());

    let update = run(&fake, &mut state, command).await;
    assert_eq!(update.notice, Some(DashboardNotice::Cancelled));
    let follow_up = update.follow_up.expect("a re-fetch after cancelling");
    let update = run(&fake, &mut state, follow_up).await;
    assert!(update.follow_up.is_none());

    assert_eq!(fake.calls().next_appointment, 2);
    assert_eq!(fake.calls().cancels, vec![id.clone()]);
    assert_eq!(fake.appointment(&id).unwrap().status, AppointmentStatus::Cancelled);
    assert!(matches!(state.next_appointment(), Loadable::Loaded(None)));
}

#[tokio::test]
async fn failed_cancel_notifies_without_retry() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let id = fake.seed_appointment("b1", date(2024, 1, 15), time(14, 30));
    fake.fail(|f| f.cancel = Some((id.clone(), server_error())));
    let mut state = loaded(&fake).await;

    let command = state.request_cancel().unwrap();
    let update = run(&fake, &mut state, command).await;

    assert!(matches!(update.notice, Some(DashboardNotice::CancelFailed(_))));
    assert!(update.follow_up.is_none());
    assert_eq!(fake.calls().cancels.len(), 1);
    assert_eq!(fake.calls().next_appointment, 1);
    // The card still shows the appointment
    assert_eq!(state.displayed().map(|a| a.id.as_str()), Some(id.as_str()));
}

// ============================================================================
// RESCHEDULE
// ============================================================================

#[tokio::test]
async fn reschedule_books_replacement_then_cancels_original() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let original_id = fake.seed_appointment("b1", date(2024, 1, 15), time(9, 0));
    let state = loaded(&fake).await;
    let original = state.displayed().unwrap().clone();

    let mut wizard = BookingWizard::rescheduling(&original);
    assert_eq!(wizard.step(), WizardStep::DateTime);
    let now = today().and_time(time(8, 0));
    for command in wizard.mount() {
        let event = BookingService::execute(&fake, command, now).await;
        wizard.apply(event);
    }
    // The original's slot is taken, so only the other two remain
    assert_eq!(wizard.schedule().items()[0].times, vec![time(14, 30), time(16, 0)]);

    wizard.select_date(date(2024, 1, 15));
    wizard.select_time(time(16, 0));
    assert!(wizard.next());

    let user = fresh_session().user;
    let command = wizard.confirm(Some(&user)).unwrap();
    let event = BookingService::execute(&fake, command, now).await;
    assert_eq!(wizard.apply(event), Some(SubmitOutcome::Rescheduled));

    assert_eq!(
        fake.appointment(&original_id).unwrap().status,
        AppointmentStatus::Cancelled
    );
    let scheduled: Vec<_> = fake
        .appointments()
        .into_iter()
        .filter(|a| a.status == AppointmentStatus::Scheduled)
        .collect();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].appointment_time, time(16, 0));
}

#[tokio::test]
async fn reschedule_keeps_original_when_insert_fails() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let original_id = fake.seed_appointment("b1", date(2024, 1, 15), time(9, 0));
    fake.fail(|f| f.insert = Some(server_error()));
    let state = loaded(&fake).await;
    let original = state.displayed().unwrap().clone();

    let mut wizard = BookingWizard::rescheduling(&original);
    let now = today().and_time(time(8, 0));
    for command in wizard.mount() {
        let event = BookingService::execute(&fake, command, now).await;
        wizard.apply(event);
    }
    wizard.select_date(date(2024, 1, 15));
    wizard.select_time(time(14, 30));
    assert!(wizard.next());

    let user = fresh_session().user;
    let command = wizard.confirm(Some(&user)).unwrap();
    let event = BookingService::execute(&fake, command, now).await;
    assert!(matches!(wizard.apply(event), Some(SubmitOutcome::Failed(_))));

    assert!(fake.calls().cancels.is_empty());
    assert_eq!(
        fake.appointment(&original_id).unwrap().status,
        AppointmentStatus::Scheduled
    );
}

#[tokio::test]
async fn reschedule_reports_original_left_in_place() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let original_id = fake.seed_appointment("b1", date(2024, 1, 15), time(9, 0));
    fake.fail(|f| f.cancel = Some((original_id.clone(), server_error())));
    let state = loaded(&fake).await;
    let original = state.displayed().unwrap().clone();

    let mut wizard = BookingWizard::rescheduling(&original);
    let now = today().and_time(time(8, 0));
    for command in wizard.mount() {
        let event = BookingService::execute(&fake, command, now).await;
        wizard.apply(event);
    }
    wizard.select_date(date(2024, 1, 15));
    wizard.select_time(time(14, 30));
    assert!(wizard.next());

    let user = fresh_session().user;
    let command = wizard.confirm(Some(&user)).unwrap();
    let event = BookingService::execute(&fake, command, now).await;
    assert!(matches!(wizard.apply(event), Some(SubmitOutcome::OriginalKept(_))));
    assert!(wizard.is_completed());
}

// ============================================================================
// HISTORY
// ============================================================================

#[tokio::test]
async fn history_is_newest_first_with_all_statuses() {
    let fake = FakeBackend::new(date(2024, 1, 15));
    let old = fake.seed_appointment("b1", date(2024, 1, 2), time(10, 0));
    let newer = fake.seed_appointment("b1", date(2024, 1, 20), time(10, 0));
    let cancelled = fake.seed_appointment("b1", date(2024, 1, 12), time(11, 0));
    DashboardService::execute(
        &fake,
        DashboardCommand::CancelAppointment {
            appointment_id: cancelled.clone(),
        },
    )
    .await;

    let rows = BookingService::history(&fake, USER_ID).await.unwrap();
    let ids: Vec<&str> = rows.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec![newer.as_str(), cancelled.as_str(), old.as_str()]);
    assert_eq!(rows[1].status, AppointmentStatus::Cancelled);
    assert_eq!(fake.calls().history, 1);
}
