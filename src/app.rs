use crate::backend::{Connector, SignUpOutcome, SupabaseClient};
use crate::components::{Footer, Header, HelpOverlay, TabBar};
use crate::config::Config;
use crate::keymap::Action;
use crate::screens::{
    BookingScreen, DashboardScreen, HistoryScreen, LoadingScreen, ProfileScreen, RenderContext,
    Screen, ScreenAction, ScreenContext, SignInScreen,
};
use crate::services::{AppEvent, Dispatcher};
use crate::session::{Session, SessionProvider, SessionState, SessionStore};
use crate::state::{
    BookingWizard, DashboardEvent, DashboardNotice, NavigationState, SubmitOutcome, Tab,
};
use crate::tui::Tui;
use crate::widgets::{Toast, ToastManager};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

/// What fills the body of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    SignIn,
    Tab(Tab),
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Everything the UI shows, independent of the real terminal.
pub struct AppState {
    config: Config,
    config_path: String,
    dispatcher: Dispatcher,
    provider: SessionProvider,
    nav: NavigationState,
    loading: LoadingScreen,
    sign_in: SignInScreen,
    dashboard: DashboardScreen,
    booking: Option<BookingScreen>,
    history: HistoryScreen,
    profile: ProfileScreen,
    toasts: ToastManager,
    next_wizard_instance: u64,
    /// Refresh token of the refresh in flight
    refreshing: Option<String>,
    show_help: bool,
    should_quit: bool,
    /// Width of the last drawn frame
    width: u16,
}

impl AppState {
    pub fn new(
        config: Config,
        config_path: &Path,
        dispatcher: Dispatcher,
        store: SessionStore,
    ) -> Self {
        Self {
            config,
            config_path: config_path.display().to_string(),
            dispatcher,
            provider: SessionProvider::new(store),
            nav: NavigationState::default(),
            loading: LoadingScreen::new(),
            sign_in: SignInScreen::new(),
            dashboard: DashboardScreen::new(today()),
            booking: None,
            history: HistoryScreen::new(),
            profile: ProfileScreen::new(),
            toasts: ToastManager::new(),
            next_wizard_instance: 0,
            refreshing: None,
            show_help: false,
            should_quit: false,
            width: u16::MAX,
        }
    }

    /// Kick off session resolution. Until it lands only the loading view is shown.
    pub fn start(&mut self) {
        self.dispatcher.resolve_session(self.provider.store().clone());
    }

    pub fn view(&self) -> View {
        match self.provider.state() {
            SessionState::Loading => View::Loading,
            SessionState::Unauthenticated => View::SignIn,
            SessionState::Authenticated(_) => View::Tab(self.nav.active()),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn provider(&self) -> &SessionProvider {
        &self.provider
    }

    pub fn nav(&self) -> &NavigationState {
        &self.nav
    }

    pub fn booking(&self) -> Option<&BookingScreen> {
        self.booking.as_ref()
    }

    pub fn dashboard(&self) -> &DashboardScreen {
        &self.dashboard
    }

    pub fn history(&self) -> &HistoryScreen {
        &self.history
    }

    pub fn sign_in(&self) -> &SignInScreen {
        &self.sign_in
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn is_help_visible(&self) -> bool {
        self.show_help
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    // ---------------------------------------------------------------------
    // Loop hooks
    // ---------------------------------------------------------------------

    /// Drain finished background work and advance timers.
    pub fn tick(&mut self) -> Result<()> {
        while let Some(event) = self.dispatcher.try_next() {
            self.handle_app_event(event)?;
        }
        self.loading.tick();
        self.toasts.tick();
        self.refresh_if_expired();
        Ok(())
    }

    fn refresh_if_expired(&mut self) {
        if self.refreshing.is_some() {
            return;
        }
        if let Some(session) = self.provider.session() {
            if session.is_expired(chrono::Utc::now().timestamp()) {
                info!("Access token about to expire, refreshing");
                let token = session.refresh_token.clone();
                self.refreshing = Some(token.clone());
                self.dispatcher.refresh_session(token);
            }
        }
    }

    /// Whether a token refresh is waiting on the backend.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.is_some()
    }

    pub fn handle_app_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::SessionResolved(state) => {
                let signed_in = matches!(state, SessionState::Authenticated(_));
                self.provider.apply_resolved(state);
                if signed_in {
                    self.on_signed_in()?;
                }
            }
            AppEvent::SessionRefreshed(result) => {
                let sent = self.refreshing.take();
                let current = self.provider.session().map(|s| s.refresh_token.as_str());
                if sent.is_none() || sent.as_deref() != current {
                    debug!("Dropping refresh result for a session that is gone");
                    return Ok(());
                }
                match result {
                    Ok(session) => self.establish(session),
                    Err(e) => {
                        warn!("Session refresh failed: {}", e);
                        self.tear_down();
                        self.reset_views();
                        self.toasts.warning("Your session expired. Please sign in again.");
                    }
                }
            }
            AppEvent::SignedIn(result) => match result {
                Ok(session) => {
                    self.sign_in.reset();
                    self.establish(session);
                    self.on_signed_in()?;
                }
                Err(e) => {
                    warn!("Sign in failed: {}", e);
                    self.sign_in.fail(e.to_string());
                }
            },
            AppEvent::SignedUp(result) => match result {
                Ok(SignUpOutcome::SignedIn(session)) => {
                    self.sign_in.reset();
                    self.toasts.success("Account created");
                    self.establish(session);
                    self.on_signed_in()?;
                }
                Ok(SignUpOutcome::ConfirmationRequired) => self.sign_in.confirmation_required(),
                Err(e) => {
                    warn!("Sign up failed: {}", e);
                    self.sign_in.fail(e.to_string());
                }
            },
            AppEvent::Wizard { instance, event } => {
                let outcome = match self.booking.as_mut() {
                    Some(screen) if screen.instance() == instance => screen.apply(event),
                    _ => {
                        debug!("Dropping result for closed wizard {}", instance);
                        return Ok(());
                    }
                };
                if let Some(outcome) = outcome {
                    self.on_submitted(outcome)?;
                }
            }
            AppEvent::Dashboard(event) => self.on_dashboard_event(event)?,
            AppEvent::History(result) => self.history.apply(result),
        }
        Ok(())
    }

    /// Adopt `session`. A failed save is reported, not fatal.
    fn establish(&mut self, session: Session) {
        if let Err(e) = self.provider.establish(session) {
            warn!("Failed to save session: {:#}", e);
            self.toasts
                .warning("Signed in, but the session could not be saved for next time");
        }
    }

    /// Drop the session. A leftover file is reported, not fatal.
    fn tear_down(&mut self) -> Option<Session> {
        self.refreshing = None;
        let (previous, cleared) = self.provider.tear_down();
        if let Err(e) = cleared {
            warn!("{:#}", e);
            self.toasts
                .warning("Signed out, but the saved session could not be removed");
        }
        previous
    }

    fn on_signed_in(&mut self) -> Result<()> {
        let Some(user_id) = self.provider.current_user().map(|u| u.id.clone()) else {
            return Ok(());
        };
        self.reset_views();
        let action = self.dashboard.load(&user_id, today());
        self.perform(action)
    }

    /// Forget everything tied to the previous user.
    fn reset_views(&mut self) {
        self.nav = NavigationState::default();
        self.booking = None;
        self.dashboard = DashboardScreen::new(today());
        self.history.reset();
        self.profile.set_profile(None);
        self.show_help = false;
    }

    fn on_dashboard_event(&mut self, event: DashboardEvent) -> Result<()> {
        let is_profile = matches!(event, DashboardEvent::Profile(_));
        let update = self.dashboard.apply(event);
        if is_profile {
            self.profile
                .set_profile(self.dashboard.state().profile().loaded().cloned());
        }
        match update.notice {
            Some(DashboardNotice::Cancelled) => {
                self.toasts.success("Appointment cancelled");
                self.history.reset();
            }
            Some(DashboardNotice::CancelFailed(reason)) => {
                self.toasts
                    .error(format!("Could not cancel the appointment: {}", reason));
            }
            None => {}
        }
        if let Some(command) = update.follow_up {
            self.perform(ScreenAction::Dashboard(command))?;
        }
        Ok(())
    }

    fn on_submitted(&mut self, outcome: SubmitOutcome) -> Result<()> {
        match outcome {
            SubmitOutcome::Booked => self.toasts.success("Appointment booked"),
            SubmitOutcome::Rescheduled => self.toasts.success("Appointment rescheduled"),
            SubmitOutcome::OriginalKept(reason) => self.toasts.warning(format!(
                "New appointment booked, but the old one is still scheduled: {}",
                reason
            )),
            SubmitOutcome::Failed(reason) => {
                self.toasts.error(format!("Booking failed: {}", reason));
                return Ok(());
            }
        }
        self.close_booking();
        self.history.reset();
        let action = self.dashboard.refresh_next();
        self.perform(action)
    }

    // ---------------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------------

    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(key) = event else {
            return Ok(());
        };
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let action = self.config.keymap.get_action(key.code, key.modifiers);

        if self.show_help {
            if matches!(action, Some(Action::Help | Action::Cancel | Action::Quit)) {
                self.show_help = false;
            }
            return Ok(());
        }

        let view = self.view();
        if let View::Tab(_) = view {
            if self.handle_navigation(action, key.code, key.modifiers)? {
                return Ok(());
            }
        }

        let ctx = ScreenContext::new(&self.config, self.provider.current_user(), today());
        let result = match view {
            View::Loading => self.loading.handle_event(event, &ctx)?,
            View::SignIn => self.sign_in.handle_event(event, &ctx)?,
            View::Tab(Tab::Dashboard) => self.dashboard.handle_event(event, &ctx)?,
            View::Tab(Tab::Booking) => match self.booking.as_mut() {
                Some(screen) => screen.handle_event(event, &ctx)?,
                None => ScreenAction::None,
            },
            View::Tab(Tab::History) => self.history.handle_event(event, &ctx)?,
            View::Tab(Tab::Profile) => self.profile.handle_event(event, &ctx)?,
        };
        self.perform(result)
    }

    fn active_input_focused(&self) -> bool {
        match self.view() {
            View::Tab(Tab::Dashboard) => self.dashboard.is_confirming_cancel(),
            View::Tab(Tab::Booking) => self.booking.as_ref().is_some_and(|s| s.is_input_focused()),
            View::Tab(Tab::History) => self.history.is_input_focused(),
            View::Tab(Tab::Profile) => self.profile.is_input_focused(),
            View::Loading | View::SignIn => true,
        }
    }

    /// Global keys for the signed-in shell. Returns true when consumed.
    fn handle_navigation(
        &mut self,
        action: Option<Action>,
        code: KeyCode,
        modifiers: KeyModifiers,
    ) -> Result<bool> {
        let narrow = NavigationState::is_narrow(self.width);

        if self.nav.is_menu_open() {
            match action {
                Some(Action::MoveUp) => self.nav.menu_up(),
                Some(Action::MoveDown) => self.nav.menu_down(),
                Some(Action::Confirm) => {
                    let tab = self.nav.menu_choose();
                    self.switch_tab(tab)?;
                }
                Some(Action::Cancel | Action::ToggleMenu) => self.nav.toggle_menu(),
                Some(Action::Quit) => self.should_quit = true,
                _ => {}
            }
            return Ok(true);
        }

        if self.active_input_focused() {
            return Ok(false);
        }

        match action {
            Some(Action::Quit) => {
                self.should_quit = true;
                return Ok(true);
            }
            Some(Action::Help) => {
                self.show_help = true;
                return Ok(true);
            }
            _ => {}
        }

        if !self.nav.nav_visible() {
            return Ok(false);
        }

        match action {
            Some(Action::NextTab) => {
                self.switch_tab(self.nav.active().next())?;
                return Ok(true);
            }
            Some(Action::PrevTab) => {
                self.switch_tab(self.nav.active().previous())?;
                return Ok(true);
            }
            Some(Action::ToggleMenu) if narrow => {
                self.nav.toggle_menu();
                return Ok(true);
            }
            _ => {}
        }

        if let KeyCode::Char(c @ '1'..='4') = code {
            if modifiers.is_empty() && !narrow {
                let index = c as usize - '1' as usize;
                self.switch_tab(Tab::ALL[index])?;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn switch_tab(&mut self, tab: Tab) -> Result<()> {
        match tab {
            Tab::Booking => self.open_booking(BookingWizard::new()),
            Tab::History => {
                self.nav.select(tab);
                let action = self.history.on_enter();
                self.perform(action)
            }
            Tab::Dashboard | Tab::Profile => {
                self.nav.select(tab);
                Ok(())
            }
        }
    }

    fn open_booking(&mut self, wizard: BookingWizard) -> Result<()> {
        self.next_wizard_instance += 1;
        let mut screen = BookingScreen::new(self.next_wizard_instance, wizard);
        let action = screen.mount();
        self.booking = Some(screen);
        self.nav.select(Tab::Booking);
        self.perform(action)
    }

    fn close_booking(&mut self) {
        self.booking = None;
        self.nav.select(Tab::Dashboard);
    }

    fn sign_out(&mut self) -> Result<()> {
        self.toasts.info("Signed out");
        if let Some(session) = self.tear_down() {
            self.dispatcher.sign_out(session);
        }
        self.reset_views();
        self.sign_in.reset();
        Ok(())
    }

    fn perform(&mut self, action: ScreenAction) -> Result<()> {
        match action {
            ScreenAction::None => {}
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::ShowHelp => self.show_help = true,
            ScreenAction::SwitchTab(tab) => self.switch_tab(tab)?,
            ScreenAction::OpenBooking => self.open_booking(BookingWizard::new())?,
            ScreenAction::Reschedule(appointment) => {
                self.open_booking(BookingWizard::rescheduling(&appointment))?;
            }
            ScreenAction::CloseBooking => self.close_booking(),
            ScreenAction::Wizard(command) => {
                if let Some(screen) = &self.booking {
                    self.dispatcher
                        .wizard(self.provider.session(), screen.instance(), command);
                }
            }
            ScreenAction::Dashboard(command) => match self.provider.session() {
                Some(session) => self.dispatcher.dashboard(session, command),
                None => warn!("Dropping dashboard request without a session"),
            },
            ScreenAction::LoadHistory => match self.provider.session() {
                Some(session) => self.dispatcher.history(session),
                None => warn!("Dropping history request without a session"),
            },
            ScreenAction::SignIn { email, password } => self.dispatcher.sign_in(email, password),
            ScreenAction::SignUp {
                email,
                password,
                full_name,
            } => self.dispatcher.sign_up(email, password, full_name),
            ScreenAction::SignOut => self.sign_out()?,
            ScreenAction::Toast { variant, message } => {
                self.toasts.push(Toast::new(message, variant));
            }
            ScreenAction::Batch(actions) => {
                for action in actions {
                    self.perform(action)?;
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Drawing
    // ---------------------------------------------------------------------

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let area = frame.area();
        self.width = area.width;
        let view = self.view();
        let show_nav = matches!(view, View::Tab(_)) && self.nav.nav_visible();

        let [header_area, nav_area, body_area, footer_area] = Layout::vertical([
            Constraint::Length(Header::HEIGHT),
            Constraint::Length(if show_nav { TabBar::HEIGHT } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(Footer::HEIGHT),
        ])
        .areas(area);

        let title = match view {
            View::Loading => "Loading",
            View::SignIn => "Welcome",
            View::Tab(tab) => tab.title(),
        };
        let user = self
            .provider
            .current_user()
            .and_then(|u| u.email.as_deref());
        Header::render(frame, header_area, title, user);
        if show_nav {
            TabBar::render(frame, nav_area, &self.nav, &self.config.keymap);
        }

        let ctx = RenderContext::new(&self.config, self.provider.current_user());
        let hints = match view {
            View::Loading => {
                self.loading.render(frame, body_area, &ctx)?;
                self.loading.footer_hints(&ctx)
            }
            View::SignIn => {
                self.sign_in.render(frame, body_area, &ctx)?;
                self.sign_in.footer_hints(&ctx)
            }
            View::Tab(Tab::Dashboard) => {
                self.dashboard.render(frame, body_area, &ctx)?;
                self.dashboard.footer_hints(&ctx)
            }
            View::Tab(Tab::Booking) => match self.booking.as_mut() {
                Some(screen) => {
                    screen.render(frame, body_area, &ctx)?;
                    screen.footer_hints(&ctx)
                }
                None => String::new(),
            },
            View::Tab(Tab::History) => {
                self.history.render(frame, body_area, &ctx)?;
                self.history.footer_hints(&ctx)
            }
            View::Tab(Tab::Profile) => {
                self.profile.render(frame, body_area, &ctx)?;
                self.profile.footer_hints(&ctx)
            }
        };
        Footer::render(frame, footer_area, &hints);

        if show_nav && self.nav.is_menu_open() && NavigationState::is_narrow(area.width) {
            let below_bar = Rect {
                y: nav_area.y + nav_area.height,
                height: area.height.saturating_sub(nav_area.y + nav_area.height),
                ..area
            };
            TabBar::render_menu(frame, below_bar, &self.nav);
        }
        if self.show_help {
            HelpOverlay::render(frame, area, &self.config.keymap, &self.config_path);
        }
        self.toasts.render(frame, area);
        Ok(())
    }
}

/// Main application: the terminal plus the runtime backend work runs on.
pub struct App {
    tui: Tui,
    state: AppState,
    // Declared last so it outlives the dispatcher's handle
    _runtime: Runtime,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let config_path = crate::utils::get_config_path();
        let connector: Arc<dyn Connector> = Arc::new(
            SupabaseClient::new(&config.backend).with_context(|| {
                format!(
                    "Backend is not configured. Set backend.url and backend.anon_key in {}",
                    config_path.display()
                )
            })?,
        );
        let tui = Tui::new()?;
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let dispatcher = Dispatcher::new(runtime.handle().clone(), connector);
        let store = SessionStore::new(crate::utils::get_session_path());
        let state = AppState::new(config, &config_path, dispatcher, store);

        Ok(Self {
            tui,
            state,
            _runtime: runtime,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.tui.enter()?;
        self.state.start();

        let result = self.event_loop();
        if let Err(e) = &result {
            error!("TUI loop failed: {:#}", e);
        }

        self.tui.exit()?;
        result
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            self.state.tick()?;
            let mut drawn = Ok(());
            self.tui
                .terminal_mut()
                .draw(|frame| drawn = self.state.draw(frame))?;
            drawn?;

            if self.state.should_quit() {
                break;
            }

            // Poll for events with 250ms timeout
            if let Some(event) = self.tui.poll_event(Duration::from_millis(250))? {
                self.state.handle_event(event)?;
            }
        }
        Ok(())
    }
}
