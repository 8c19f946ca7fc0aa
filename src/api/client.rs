//! Admin REST API Client
//!
//! [`AdminApi`] is the seam between the dashboard and the backend;
//! [`HttpAdminClient`] implements it over HTTP with reqwest. The backend
//! keeps the admin session in a cookie, so the client owns a cookie store.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::dto::{
    Ack, ActivityEntry, AdminRecord, AuthStatus, BackupRecord, BroadcastRecord, BroadcastRequest,
    ChartData, Envelope, LoginRequest, LoginResponse, NewAdmin, Settings, SettingsUpdate,
    StartupDetail, StartupRecord, Statistics, UserRecord,
};
use super::error::{ClientError, ClientResult};

/// Users list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListQuery {
    pub page: u32,
    pub search: String,
    pub filter: String,
}

/// Startups list query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupListQuery {
    pub page: u32,
    pub search: String,
    pub status: String,
}

/// Every backend call the dashboard makes.
///
/// Methods return `Err` only for transport failures (network, undecodable
/// body). Application failures come back as an envelope with
/// `success == false`.
#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn check_auth(&self) -> ClientResult<AuthStatus>;
    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse>;
    async fn logout(&self) -> ClientResult<Ack>;

    async fn statistics(&self) -> ClientResult<Envelope<Statistics>>;
    async fn user_growth(&self, period: &str) -> ClientResult<Envelope<ChartData>>;
    async fn startup_distribution(&self) -> ClientResult<Envelope<ChartData>>;
    async fn recent_activity(&self) -> ClientResult<Envelope<Vec<ActivityEntry>>>;

    async fn users(&self, query: &UserListQuery) -> ClientResult<Envelope<Vec<UserRecord>>>;
    async fn startups(&self, query: &StartupListQuery)
        -> ClientResult<Envelope<Vec<StartupRecord>>>;
    async fn startup(&self, id: &str) -> ClientResult<Envelope<StartupDetail>>;
    async fn approve_startup(&self, id: &str) -> ClientResult<Ack>;
    async fn reject_startup(&self, id: &str) -> ClientResult<Ack>;

    async fn admins(&self) -> ClientResult<Envelope<Vec<AdminRecord>>>;
    async fn create_admin(&self, admin: &NewAdmin) -> ClientResult<Ack>;
    async fn delete_admin(&self, id: &str) -> ClientResult<Ack>;

    async fn backups(&self) -> ClientResult<Envelope<Vec<BackupRecord>>>;
    async fn create_backup(&self) -> ClientResult<Ack>;
    async fn delete_backup(&self, id: &str) -> ClientResult<Ack>;
    async fn download_backup(&self, filename: &str) -> ClientResult<Vec<u8>>;

    async fn settings(&self) -> ClientResult<Envelope<Settings>>;
    async fn save_settings(&self, settings: &SettingsUpdate) -> ClientResult<Ack>;

    async fn broadcast(&self, request: &BroadcastRequest)
        -> ClientResult<Envelope<BroadcastRecord>>;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Backend origin, e.g. "http://localhost:5000"
    pub base_url: String,
    /// Optional per-request timeout; `None` leaves requests unbounded
    pub request_timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout: None,
        }
    }
}

/// reqwest-backed [`AdminApi`]
pub struct HttpAdminClient {
    client: Client,
    base_url: String,
}

impl HttpAdminClient {
    /// Create a client with its own cookie store
    pub fn new(config: HttpClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidUrl(base_url));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "admin API request");
        self.client.request(method, self.url(path))
    }

    /// Send and decode the JSON body whatever the HTTP status: the backend
    /// reports application errors as JSON on 4xx/5xx too.
    async fn send_json<R: DeserializeOwned>(
        &self,
        path: &str,
        builder: RequestBuilder,
    ) -> ClientResult<R> {
        let response = builder.send().await.inspect_err(|err| {
            tracing::warn!(path, error = %err, "admin API transport failure");
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        serde_json::from_slice::<R>(&bytes).map_err(|err| {
            tracing::warn!(path, %status, error = %err, "admin API returned an undecodable body");
            ClientError::Decode {
                path: path.to_string(),
                message: err.to_string(),
            }
        })
    }

    async fn get<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(path, self.request(Method::GET, path)).await
    }

    async fn post<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(path, self.request(Method::POST, path)).await
    }

    async fn post_json<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<R> {
        self.send_json(path, self.request(Method::POST, path).json(body))
            .await
    }

    async fn delete<R: DeserializeOwned>(&self, path: &str) -> ClientResult<R> {
        self.send_json(path, self.request(Method::DELETE, path)).await
    }
}

fn enc(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl AdminApi for HttpAdminClient {
    async fn check_auth(&self) -> ClientResult<AuthStatus> {
        self.get("/api/check_auth").await
    }

    async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        self.post_json("/api/login", &LoginRequest { username, password })
            .await
    }

    async fn logout(&self) -> ClientResult<Ack> {
        self.post("/api/logout").await
    }

    async fn statistics(&self) -> ClientResult<Envelope<Statistics>> {
        self.get("/api/statistics").await
    }

    async fn user_growth(&self, period: &str) -> ClientResult<Envelope<ChartData>> {
        self.get(&format!("/api/analytics/user-growth?period={}", enc(period)))
            .await
    }

    async fn startup_distribution(&self) -> ClientResult<Envelope<ChartData>> {
        self.get("/api/analytics/startup-distribution").await
    }

    async fn recent_activity(&self) -> ClientResult<Envelope<Vec<ActivityEntry>>> {
        self.get("/api/activity").await
    }

    async fn users(&self, query: &UserListQuery) -> ClientResult<Envelope<Vec<UserRecord>>> {
        let path = format!(
            "/api/users?page={}&search={}&filter={}",
            query.page,
            enc(&query.search),
            enc(&query.filter)
        );
        self.get(&path).await
    }

    async fn startups(
        &self,
        query: &StartupListQuery,
    ) -> ClientResult<Envelope<Vec<StartupRecord>>> {
        let path = format!(
            "/api/startups?page={}&search={}&status={}",
            query.page,
            enc(&query.search),
            enc(&query.status)
        );
        self.get(&path).await
    }

    async fn startup(&self, id: &str) -> ClientResult<Envelope<StartupDetail>> {
        self.get(&format!("/api/startup/{}", enc(id))).await
    }

    async fn approve_startup(&self, id: &str) -> ClientResult<Ack> {
        self.post(&format!("/api/startup/{}/approve", enc(id))).await
    }

    async fn reject_startup(&self, id: &str) -> ClientResult<Ack> {
        self.post(&format!("/api/startup/{}/reject", enc(id))).await
    }

    async fn admins(&self) -> ClientResult<Envelope<Vec<AdminRecord>>> {
        self.get("/api/admins").await
    }

    async fn create_admin(&self, admin: &NewAdmin) -> ClientResult<Ack> {
        self.post_json("/api/admins", admin).await
    }

    async fn delete_admin(&self, id: &str) -> ClientResult<Ack> {
        self.delete(&format!("/api/admins/{}", enc(id))).await
    }

    async fn backups(&self) -> ClientResult<Envelope<Vec<BackupRecord>>> {
        self.get("/api/backups").await
    }

    async fn create_backup(&self) -> ClientResult<Ack> {
        self.post("/api/backups").await
    }

    async fn delete_backup(&self, id: &str) -> ClientResult<Ack> {
        self.delete(&format!("/api/backups/{}", enc(id))).await
    }

    async fn download_backup(&self, filename: &str) -> ClientResult<Vec<u8>> {
        let path = format!("/api/backups/{}/download", enc(filename));
        let response = self.request(Method::GET, &path).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Ack>()
                .await
                .ok()
                .and_then(|ack| ack.error)
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn settings(&self) -> ClientResult<Envelope<Settings>> {
        self.get("/api/settings").await
    }

    async fn save_settings(&self, settings: &SettingsUpdate) -> ClientResult<Ack> {
        self.post_json("/api/settings", settings).await
    }

    async fn broadcast(
        &self,
        request: &BroadcastRequest,
    ) -> ClientResult<Envelope<BroadcastRecord>> {
        self.post_json("/api/broadcast", request).await
    }
}
