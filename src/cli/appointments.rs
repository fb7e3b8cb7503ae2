//! Catalog listings and appointment commands.

use super::common::{print_info, print_success, print_warning, prompt_confirm, CliContext};
use crate::backend::BookingBackend;
use crate::models::{hhmm, AppointmentDetails};
use crate::services::{BookingService, DashboardService};
use crate::session::AuthUser;
use crate::state::wizard::ConfirmationSummary;
use crate::state::{BookingWizard, SubmitOutcome, WizardCommand};
use crate::utils::format::{format_day_label, format_duration};
use crate::utils::{format_date, format_price, format_time};
use anyhow::{bail, ensure, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Choices for a non-interactive booking. Ids or names are accepted.
#[derive(Debug, Clone)]
pub struct BookRequest {
    pub unit: String,
    pub service: String,
    pub barber: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Accepts `2024-01-15` or `15/01/2024`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD or DD/MM/YYYY", raw))
}

/// Accepts `14:30`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    hhmm::parse(raw).map_err(|_| format!("invalid time '{}', expected HH:MM", raw))
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Match by exact id first, then by case-insensitive name.
fn resolve<T>(
    items: &[T],
    key: &str,
    id: impl Fn(&T) -> &str,
    name: impl Fn(&T) -> &str,
) -> Option<String> {
    items
        .iter()
        .find(|item| id(item) == key)
        .or_else(|| items.iter().find(|item| name(item).eq_ignore_ascii_case(key.trim())))
        .map(|item| id(item).to_string())
}

async fn run(
    backend: &dyn BookingBackend,
    wizard: &mut BookingWizard,
    command: WizardCommand,
    now: NaiveDateTime,
) -> Option<SubmitOutcome> {
    let event = BookingService::execute(backend, command, now).await;
    wizard.apply(event)
}

/// Walk a [`BookingWizard`] through all five steps with fixed choices and
/// submit it. Returns what was booked.
pub async fn book_with_wizard(
    backend: &dyn BookingBackend,
    user: &AuthUser,
    request: &BookRequest,
    now: NaiveDateTime,
) -> Result<ConfirmationSummary> {
    let mut wizard = BookingWizard::new();
    for command in wizard.mount() {
        run(backend, &mut wizard, command, now).await;
    }
    if let Some(e) = wizard.units().error() {
        bail!("Could not load units: {}", e);
    }
    if let Some(e) = wizard.services().error() {
        bail!("Could not load services: {}", e);
    }

    // Step 1
    let unit_id = resolve(wizard.units().items(), &request.unit, |u| u.id.as_str(), |u| u.name.as_str())
        .with_context(|| format!("Unknown unit '{}'. See 'barberbook units'.", request.unit))?;
    if let Some(command) = wizard.select_unit(&unit_id) {
        run(backend, &mut wizard, command, now).await;
    }
    ensure!(wizard.next(), "Could not select unit");

    // Step 2
    let service_id = resolve(
        wizard.services().items(),
        &request.service,
        |s| s.id.as_str(),
        |s| s.name.as_str(),
    )
    .with_context(|| format!("Unknown service '{}'. See 'barberbook services'.", request.service))?;
    wizard.select_service(&service_id);
    ensure!(wizard.next(), "Could not select service");

    // Step 3
    if let Some(e) = wizard.barbers().error() {
        bail!("Could not load barbers: {}", e);
    }
    let barber_id = resolve(
        wizard.barbers().items(),
        &request.barber,
        |b| b.id.as_str(),
        |b| b.name.as_str(),
    )
    .with_context(|| format!("Barber '{}' does not work at this unit", request.barber))?;
    if let Some(command) = wizard.select_barber(&barber_id) {
        run(backend, &mut wizard, command, now).await;
    }
    ensure!(wizard.next(), "Could not select barber");

    // Step 4
    if let Some(e) = wizard.schedule().error() {
        bail!("Could not load availability: {}", e);
    }
    wizard.select_date(request.date);
    ensure!(
        wizard.times_for_selected_date().contains(&request.time),
        "{} at {} is not available. See 'barberbook slots {}'.",
        format_date(request.date),
        format_time(request.time),
        barber_id
    );
    wizard.select_time(request.time);
    ensure!(wizard.next(), "Could not select date and time");

    // Step 5
    let summary = wizard.summary();
    let command = wizard.confirm(Some(user))?;
    match run(backend, &mut wizard, command, now).await {
        Some(SubmitOutcome::Booked) => Ok(summary),
        Some(SubmitOutcome::Failed(e)) => bail!("Booking failed: {}", e),
        other => bail!("Unexpected booking outcome: {:?}", other),
    }
}

pub fn book(ctx: &mut CliContext, request: BookRequest) -> Result<()> {
    let session = ctx.require_session()?;
    let backend = ctx.booking(Some(&session));
    let summary = ctx.block_on(book_with_wizard(
        backend.as_ref(),
        &session.user,
        &request,
        now(),
    ))?;

    print_success("Appointment booked");
    let show = |label: &str, value: Option<String>| {
        println!("  {:<9}{}", label, value.unwrap_or_else(|| "-".to_string()));
    };
    show("Unit", summary.unit);
    show("Service", summary.service);
    show("Barber", summary.barber);
    show("Date", summary.date);
    show("Time", summary.time);
    show("Total", summary.total);
    Ok(())
}

pub fn cancel(ctx: &mut CliContext, appointment_id: &str, yes: bool) -> Result<()> {
    let session = ctx.require_session()?;
    if !yes && !prompt_confirm(&format!("Cancel appointment {}?", appointment_id))? {
        print_info("Nothing changed");
        return Ok(());
    }
    let backend = ctx.booking(Some(&session));
    ctx.block_on(backend.cancel_appointment(appointment_id))
        .context("Failed to cancel appointment")?;
    print_success("Appointment cancelled");
    Ok(())
}

pub fn next(ctx: &mut CliContext) -> Result<()> {
    let session = ctx.require_session()?;
    let backend = ctx.booking(Some(&session));
    let today = now().date();
    let next = ctx
        .block_on(DashboardService::next_appointment(
            backend.as_ref(),
            session.user_id(),
            today,
        ))
        .context("Failed to load next appointment")?;
    match next {
        Some(appointment) => print_appointment(&appointment),
        None => print_info("No upcoming appointments"),
    }
    Ok(())
}

pub fn history(ctx: &mut CliContext) -> Result<()> {
    let session = ctx.require_session()?;
    let backend = ctx.booking(Some(&session));
    let appointments = ctx
        .block_on(BookingService::history(backend.as_ref(), session.user_id()))
        .context("Failed to load appointment history")?;
    if appointments.is_empty() {
        print_info("No appointments yet");
        return Ok(());
    }
    for a in &appointments {
        println!(
            "{}  {}  {:<10} {:<20} {:<16} {}",
            format_date(a.appointment_date),
            format_time(a.appointment_time),
            a.status.label(),
            a.service_name(),
            a.barber_name(),
            a.id
        );
    }
    Ok(())
}

fn print_appointment(a: &AppointmentDetails) {
    println!("{}", a.service_name());
    println!("  Date     {}", format_date(a.appointment_date));
    println!("  Time     {}", format_time(a.appointment_time));
    println!("  Barber   {}", a.barber_name());
    println!("  Unit     {}", a.unit_name());
    if let Some(price) = a.service.as_ref().and_then(|s| s.price) {
        println!("  Price    {}", format_price(price));
    }
    println!("  Id       {}", a.id);
}

// Catalog reads work signed in or not

fn catalog(ctx: &mut CliContext) -> std::sync::Arc<dyn BookingBackend> {
    let session = ctx.current_session();
    ctx.booking(session.as_ref())
}

pub fn units(ctx: &mut CliContext) -> Result<()> {
    let backend = catalog(ctx);
    let units = ctx
        .block_on(backend.list_units())
        .context("Failed to load units")?;
    for unit in &units {
        println!("{:<38} {:<24} {}", unit.id, unit.name, unit.address);
    }
    Ok(())
}

pub fn services(ctx: &mut CliContext) -> Result<()> {
    let backend = catalog(ctx);
    let services = ctx
        .block_on(backend.list_services())
        .context("Failed to load services")?;
    for s in &services {
        println!(
            "{:<38} {:<24} {:>8}  {}",
            s.id,
            s.name,
            format_duration(s.duration_minutes),
            format_price(s.price)
        );
    }
    Ok(())
}

pub fn barbers(ctx: &mut CliContext, unit_id: &str) -> Result<()> {
    let backend = catalog(ctx);
    let barbers = ctx
        .block_on(backend.list_barbers(unit_id))
        .context("Failed to load barbers")?;
    if barbers.is_empty() {
        print_warning("No barbers at this unit");
    }
    for b in &barbers {
        println!(
            "{:<38} {:<24} \u{2605} {}  {}",
            b.id,
            b.name,
            b.rating_display(),
            b.specialty.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

pub fn slots(ctx: &mut CliContext, barber_id: &str) -> Result<()> {
    let backend = catalog(ctx);
    let days = ctx
        .block_on(BookingService::free_slots(backend.as_ref(), barber_id, now()))
        .context("Failed to load availability")?;
    if days.is_empty() {
        print_info("No free slots");
    }
    for day in &days {
        let times: Vec<String> = day.times.iter().map(|t| format_time(*t)).collect();
        println!("{}  {}", format_day_label(day.date), times.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15"), Ok(expected));
        assert_eq!(parse_date("15/01/2024"), Ok(expected));
        assert!(parse_date("tomorrow").is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("14:30"), Ok(NaiveTime::from_hms_opt(14, 30, 0).unwrap()));
        assert!(parse_time("2pm").is_err());
    }

    #[test]
    fn test_resolve_by_id_or_name() {
        let items = vec![("u1".to_string(), "Unit A".to_string())];
        let by_id = resolve(&items, "u1", |i| i.0.as_str(), |i| i.1.as_str());
        let by_name = resolve(&items, "unit a", |i| i.0.as_str(), |i| i.1.as_str());
        assert_eq!(by_id.as_deref(), Some("u1"));
        assert_eq!(by_name.as_deref(), Some("u1"));
        assert!(resolve(&items, "Unit B", |i| i.0.as_str(), |i| i.1.as_str()).is_none());
    }
}
