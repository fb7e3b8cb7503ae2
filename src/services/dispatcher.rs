//! Runs backend work off the UI thread.
//!
//! Every request is spawned on the app's tokio runtime and its result is sent
//! back as an [`AppEvent`] over an unbounded channel. The UI loop drains the
//! channel once per tick, so nothing here ever blocks drawing.

use crate::backend::{BackendError, Connector, SignUpOutcome};
use crate::models::AppointmentDetails;
use crate::services::{AccountService, BookingService, DashboardService};
use crate::session::{resolve_session, Session, SessionState, SessionStore};
use crate::state::{DashboardCommand, DashboardEvent, WizardCommand, WizardEvent};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Result of background work, addressed to whoever asked for it.
#[derive(Debug)]
pub enum AppEvent {
    SessionResolved(SessionState),
    SessionRefreshed(Result<Session, BackendError>),
    SignedIn(Result<Session, BackendError>),
    SignedUp(Result<SignUpOutcome, BackendError>),
    /// Tagged with the wizard instance that issued the command
    Wizard {
        instance: u64,
        event: WizardEvent,
    },
    Dashboard(DashboardEvent),
    History(Result<Vec<AppointmentDetails>, BackendError>),
}

pub struct Dispatcher {
    handle: Handle,
    connector: Arc<dyn Connector>,
    sender: UnboundedSender<AppEvent>,
    receiver: UnboundedReceiver<AppEvent>,
}

impl Dispatcher {
    pub fn new(handle: Handle, connector: Arc<dyn Connector>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            handle,
            connector,
            sender,
            receiver,
        }
    }

    /// Next finished result without blocking.
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next result (used by tests and the CLI).
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.receiver.recv().await
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            // The receiver only goes away on shutdown
            let _ = sender.send(task.await);
        });
    }

    pub fn resolve_session(&self, store: SessionStore) {
        let auth = self.connector.auth();
        self.spawn(async move {
            let now = chrono::Utc::now().timestamp();
            AppEvent::SessionResolved(resolve_session(&store, auth.as_ref(), now).await)
        });
    }

    pub fn refresh_session(&self, refresh_token: String) {
        let auth = self.connector.auth();
        self.spawn(async move {
            AppEvent::SessionRefreshed(auth.refresh_session(&refresh_token).await)
        });
    }

    pub fn sign_in(&self, email: String, password: String) {
        let auth = self.connector.auth();
        self.spawn(async move {
            AppEvent::SignedIn(AccountService::sign_in(auth.as_ref(), &email, &password).await)
        });
    }

    pub fn sign_up(&self, email: String, password: String, full_name: String) {
        let auth = self.connector.auth();
        self.spawn(async move {
            AppEvent::SignedUp(
                AccountService::sign_up(auth.as_ref(), &email, &password, &full_name).await,
            )
        });
    }

    /// Best-effort remote logout; produces no event.
    pub fn sign_out(&self, session: Session) {
        let auth = self.connector.auth();
        self.handle.spawn(async move {
            AccountService::sign_out(auth.as_ref(), &session).await;
        });
    }

    pub fn wizard(&self, session: Option<&Session>, instance: u64, command: WizardCommand) {
        debug!("Wizard {} command: {:?}", instance, command);
        let backend = self.connector.booking(session);
        self.spawn(async move {
            let now = chrono::Local::now().naive_local();
            let event = BookingService::execute(backend.as_ref(), command, now).await;
            AppEvent::Wizard { instance, event }
        });
    }

    pub fn dashboard(&self, session: &Session, command: DashboardCommand) {
        debug!("Dashboard command: {:?}", command);
        let backend = self.connector.booking(Some(session));
        self.spawn(async move {
            AppEvent::Dashboard(DashboardService::execute(backend.as_ref(), command).await)
        });
    }

    pub fn history(&self, session: &Session) {
        let backend = self.connector.booking(Some(session));
        let user_id = session.user_id().to_string();
        self.spawn(async move {
            AppEvent::History(BookingService::history(backend.as_ref(), &user_id).await)
        });
    }
}
