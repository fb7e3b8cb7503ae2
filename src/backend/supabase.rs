//! HTTP client for a Supabase project.
//!
//! Thin wrapper over PostgREST (`/rest/v1/<table>`) and GoTrue
//! (`/auth/v1/...`). Response parsing lives in free functions so it can be
//! tested without a network.

use super::{
    AuthBackend, BackendError, BackendResult, BookingBackend, Direction, Query, SignUpOutcome,
};
use crate::config::BackendConfig;
use crate::models::{
    AppointmentDetails, AppointmentStatus, AvailabilitySlot, Barber, NewAppointment, Profile,
    Service, TakenSlot, Unit,
};
use crate::session::{AuthUser, Session};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const REST_PATH: &str = "rest/v1";
const AUTH_PATH: &str = "auth/v1";
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Column list for appointment reads that need display names.
pub const APPOINTMENT_DETAILS_SELECT: &str =
    "*,units(name),services(name,price,duration_minutes),barbers(name)";

/// Client for one Supabase project.
///
/// Cloning is cheap; [`SupabaseClient::with_session`] produces a copy that
/// acts on behalf of a signed-in user.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl SupabaseClient {
    /// Build a client from the backend section of the config.
    pub fn new(config: &BackendConfig) -> BackendResult<Self> {
        if config.url.trim().is_empty() {
            return Err(BackendError::NotConfigured(
                "backend.url is empty (set it in config.toml or BARBERBOOK_URL)".to_string(),
            ));
        }
        if config.anon_key.trim().is_empty() {
            return Err(BackendError::NotConfigured(
                "backend.anon_key is empty (set it in config.toml or BARBERBOOK_ANON_KEY)"
                    .to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("barberbook/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::NotConfigured(format!("HTTP client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.trim().to_string(),
            access_token: None,
        })
    }

    /// A copy of this client authorized as the session's user.
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            access_token: Some(session.access_token.clone()),
            ..self.clone()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn require_session(&self) -> BackendResult<()> {
        if self.access_token.is_some() {
            Ok(())
        } else {
            Err(BackendError::Unauthorized)
        }
    }

    fn url(&self, path: &str, params: &[(String, String)]) -> BackendResult<Url> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| BackendError::NotConfigured(format!("invalid backend URL: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(request: RequestBuilder) -> BackendResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = BackendError::from_response(status.as_u16(), &body);
            if !err.is_no_rows() {
                warn!("Backend request failed: {}", err);
            }
            return Err(err);
        }
        Ok(body)
    }

    /// GET request for `query`, asking for one object when it is `single()`.
    fn read_request(&self, query: &Query) -> BackendResult<RequestBuilder> {
        let path = format!("{}/{}", REST_PATH, query.table());
        let url = self.url(&path, &query.read_params())?;
        debug!("GET {} (accept {})", url.path(), query.accept());
        Ok(self
            .request(Method::GET, url, self.bearer())
            .header("Accept", query.accept()))
    }

    /// Read rows matching `query`.
    pub async fn select<T: DeserializeOwned>(&self, query: &Query) -> BackendResult<Vec<T>> {
        let body = Self::execute(self.read_request(query)?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Read exactly one row; no match is a `PGRST116` error.
    pub async fn select_single<T: DeserializeOwned>(&self, query: &Query) -> BackendResult<T> {
        let query = query.clone().single();
        let body = Self::execute(self.read_request(&query)?).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert one row without reading it back.
    pub async fn insert<T: Serialize + ?Sized>(&self, table: &str, row: &T) -> BackendResult<()> {
        let url = self.url(&format!("{}/{}", REST_PATH, table), &[])?;
        debug!("POST {}", url.path());
        let request = self
            .request(Method::POST, url, self.bearer())
            .header("Prefer", "return=minimal")
            .json(row);
        Self::execute(request).await.map(|_| ())
    }

    /// Patch the rows matched by `query`'s filters.
    ///
    /// Fails with a 404 when nothing matched, so a row hidden by row-level
    /// security is not reported as updated.
    pub async fn update<T: Serialize + ?Sized>(&self, query: &Query, patch: &T) -> BackendResult<()> {
        let path = format!("{}/{}", REST_PATH, query.table());
        let url = self.url(&path, &query.filter_params())?;
        debug!("PATCH {}", url.path());
        let request = self
            .request(Method::PATCH, url, self.bearer())
            .header("Prefer", "return=representation")
            .json(patch);
        let body = Self::execute(request).await?;
        let rows: Vec<serde_json::Value> = serde_json::from_str(&body)?;
        if rows.is_empty() {
            return Err(BackendError::Api {
                status: 404,
                code: None,
                message: format!("no matching row in {}", query.table()),
            });
        }
        Ok(())
    }

    async fn auth_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &[(String, String)],
        body: &B,
        bearer: &str,
    ) -> BackendResult<String> {
        let url = self.url(&format!("{}/{}", AUTH_PATH, path), params)?;
        debug!("POST {}", url.path());
        Self::execute(self.request(Method::POST, url, bearer).json(body)).await
    }
}

fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl BookingBackend for SupabaseClient {
    async fn list_units(&self) -> BackendResult<Vec<Unit>> {
        self.select(&Query::from("units").order("name")).await
    }

    async fn list_services(&self) -> BackendResult<Vec<Service>> {
        self.select(&Query::from("services").order("name")).await
    }

    async fn list_barbers(&self, unit_id: &str) -> BackendResult<Vec<Barber>> {
        self.select(&Query::from("barbers").eq("unit_id", unit_id).order("name"))
            .await
    }

    async fn get_profile(&self, user_id: &str) -> BackendResult<Profile> {
        self.require_session()?;
        self.select_single(&Query::from("profiles").eq("user_id", user_id).single())
            .await
    }

    async fn list_availability(
        &self,
        barber_id: &str,
        from: NaiveDate,
    ) -> BackendResult<Vec<AvailabilitySlot>> {
        let query = Query::from("availability")
            .eq("barber_id", barber_id)
            .gte("slot_date", from)
            .order("slot_date")
            .order("slot_time");
        self.select(&query).await
    }

    async fn list_taken_slots(
        &self,
        barber_id: &str,
        from: NaiveDate,
    ) -> BackendResult<Vec<TakenSlot>> {
        let query = Query::from("appointments")
            .select("appointment_date,appointment_time")
            .eq("barber_id", barber_id)
            .eq("status", AppointmentStatus::Scheduled)
            .gte("appointment_date", from);
        self.select(&query).await
    }

    async fn insert_appointment(&self, appointment: &NewAppointment) -> BackendResult<()> {
        self.require_session()?;
        self.insert("appointments", appointment).await
    }

    async fn next_appointment(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> BackendResult<AppointmentDetails> {
        self.require_session()?;
        let query = Query::from("appointments")
            .select(APPOINTMENT_DETAILS_SELECT)
            .eq("user_id", user_id)
            .eq("status", AppointmentStatus::Scheduled)
            .gte("appointment_date", today)
            .order("appointment_date")
            .order("appointment_time")
            .limit(1)
            .single();
        self.select_single(&query).await
    }

    async fn cancel_appointment(&self, appointment_id: &str) -> BackendResult<()> {
        self.require_session()?;
        let query = Query::from("appointments").eq("id", appointment_id);
        self.update(&query, &StatusPatch {
            status: AppointmentStatus::Cancelled,
        })
        .await
    }

    async fn appointment_history(
        &self,
        user_id: &str,
        limit: usize,
    ) -> BackendResult<Vec<AppointmentDetails>> {
        self.require_session()?;
        let query = Query::from("appointments")
            .select(APPOINTMENT_DETAILS_SELECT)
            .eq("user_id", user_id)
            .order_by("appointment_date", Direction::Desc)
            .order_by("appointment_time", Direction::Desc)
            .limit(limit);
        self.select(&query).await
    }
}

#[async_trait]
impl AuthBackend for SupabaseClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        let body = PasswordGrant { email, password };
        let params = [("grant_type".to_string(), "password".to_string())];
        let text = self
            .auth_post("token", &params, &body, &self.anon_key)
            .await?;
        parse_session(&text, now_timestamp())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> BackendResult<SignUpOutcome> {
        let body = SignUpRequest {
            email,
            password,
            data: SignUpData { full_name },
        };
        let text = self.auth_post("signup", &[], &body, &self.anon_key).await?;
        parse_sign_up(&text, now_timestamp())
    }

    async fn refresh_session(&self, refresh_token: &str) -> BackendResult<Session> {
        let body = RefreshGrant { refresh_token };
        let params = [("grant_type".to_string(), "refresh_token".to_string())];
        let text = self
            .auth_post("token", &params, &body, &self.anon_key)
            .await?;
        parse_session(&text, now_timestamp())
    }

    async fn sign_out(&self, access_token: &str) -> BackendResult<()> {
        self.auth_post("logout", &[], &serde_json::json!({}), access_token)
            .await
            .map(|_| ())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct StatusPatch {
    status: AppointmentStatus,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpData<'a>,
}

#[derive(Serialize)]
struct SignUpData<'a> {
    full_name: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

/// Parse a GoTrue token response into a session.
pub fn parse_session(body: &str, now: i64) -> BackendResult<Session> {
    let token: TokenResponse = serde_json::from_str(body)?;
    let expires_at = token
        .expires_at
        .or_else(|| token.expires_in.map(|secs| now + secs))
        .unwrap_or(now);
    Ok(Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        expires_at,
        user: token.user,
    })
}

/// Parse a sign-up response: a token response when the project
/// auto-confirms, a bare user object otherwise.
pub fn parse_sign_up(body: &str, now: i64) -> BackendResult<SignUpOutcome> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("access_token").is_some() {
        parse_session(body, now).map(SignUpOutcome::SignedIn)
    } else {
        Ok(SignUpOutcome::ConfirmationRequired)
    }
}
