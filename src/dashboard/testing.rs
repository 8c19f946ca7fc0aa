//! Test doubles for the controller: a scripted [`AdminApi`] and a scripted
//! [`Confirm`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{Confirm, Dashboard};
use crate::api::dto::{
    ActivityEntry, AdminRecord, AuthStatus, BackupRecord, BroadcastRecord, BroadcastRequest,
    ChartData, Identity, LoginResponse, NewAdmin, Settings, SettingsUpdate, StartupDetail,
    StartupRecord, Statistics, UserRecord,
};
use crate::api::{
    Ack, AdminApi, ClientError, ClientResult, Envelope, StartupListQuery, UserListQuery,
};
use crate::config::Config;
use crate::render::chart::MemoryChartHost;

enum Reply {
    Body(Value),
    Fail(ClientError),
}

struct Scripted {
    delay: Option<Duration>,
    reply: Reply,
}

/// Scripted admin backend.
///
/// Each endpoint key answers from its queue first, then from the value given
/// to [`FakeApi::set`], then with `{"success": true}`. Calls are recorded
/// when the request is issued, before any scripted delay.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    queued: Mutex<HashMap<String, VecDeque<Scripted>>>,
    defaults: Mutex<HashMap<String, Value>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every unscripted `key` request with `body`
    pub fn set(&self, key: &str, body: Value) {
        self.defaults.lock().unwrap().insert(key.to_string(), body);
    }

    pub fn respond(&self, key: &str, body: Value) {
        self.enqueue(key, None, Reply::Body(body));
    }

    pub fn respond_after(&self, key: &str, delay: Duration, body: Value) {
        self.enqueue(key, Some(delay), Reply::Body(body));
    }

    /// Next `key` request fails at the transport level
    pub fn fail(&self, key: &str) {
        self.fail_with(key, ClientError::Unavailable("connection refused".to_string()));
    }

    pub fn fail_after(&self, key: &str, delay: Duration) {
        self.enqueue(key, Some(delay), Reply::Fail(ClientError::Timeout));
    }

    pub fn fail_with(&self, key: &str, error: ClientError) {
        self.enqueue(key, None, Reply::Fail(error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Recorded calls starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn enqueue(&self, key: &str, delay: Option<Duration>, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_default()
            .push_back(Scripted { delay, reply });
    }

    fn next(&self, key: &str, call: String) -> Scripted {
        self.calls.lock().unwrap().push(call);

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(key)
            .and_then(|queue| queue.pop_front());
        queued.unwrap_or_else(|| Scripted {
            delay: None,
            reply: Reply::Body(
                self.defaults
                    .lock()
                    .unwrap()
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| json!({"success": true})),
            ),
        })
    }

    async fn answer(&self, scripted: Scripted) -> ClientResult<Value> {
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        match scripted.reply {
            Reply::Body(body) => Ok(body),
            Reply::Fail(error) => Err(error),
        }
    }

    async fn reply<T: DeserializeOwned>(&self, key: &str, call: String) -> ClientResult<T> {
        let path = call.clone();
        let scripted = self.next(key, call);
        let body = self.answer(scripted).await?;
        serde_json::from_value(body).map_err(|e| ClientError::Decode {
            path,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl AdminApi for FakeApi {
    async fn check_auth(&self) -> ClientResult<AuthStatus> {
        self.reply("check_auth", "GET /api/check_auth".into()).await
    }

    async fn login(&self, username: &str, _password: &str) -> ClientResult<LoginResponse> {
        self.reply("login", format!("POST /api/login {username}")).await
    }

    async fn logout(&self) -> ClientResult<Ack> {
        self.reply("logout", "POST /api/logout".into()).await
    }

    async fn statistics(&self) -> ClientResult<Envelope<Statistics>> {
        self.reply("statistics", "GET /api/statistics".into()).await
    }

    async fn user_growth(&self, period: &str) -> ClientResult<Envelope<ChartData>> {
        let call = format!("GET /api/analytics/user-growth?period={period}");
        self.reply("user_growth", call).await
    }

    async fn startup_distribution(&self) -> ClientResult<Envelope<ChartData>> {
        let call = "GET /api/analytics/startup-distribution".to_string();
        self.reply("distribution", call).await
    }

    async fn recent_activity(&self) -> ClientResult<Envelope<Vec<ActivityEntry>>> {
        self.reply("activity", "GET /api/activity".into()).await
    }

    async fn users(&self, query: &UserListQuery) -> ClientResult<Envelope<Vec<UserRecord>>> {
        let call = format!(
            "GET /api/users?page={}&search={}&filter={}",
            query.page,
            urlencoding::encode(&query.search),
            urlencoding::encode(&query.filter),
        );
        self.reply("users", call).await
    }

    async fn startups(
        &self,
        query: &StartupListQuery,
    ) -> ClientResult<Envelope<Vec<StartupRecord>>> {
        let call = format!(
            "GET /api/startups?page={}&search={}&status={}",
            query.page,
            urlencoding::encode(&query.search),
            urlencoding::encode(&query.status),
        );
        self.reply("startups", call).await
    }

    async fn startup(&self, id: &str) -> ClientResult<Envelope<StartupDetail>> {
        self.reply("startup", format!("GET /api/startup/{id}")).await
    }

    async fn approve_startup(&self, id: &str) -> ClientResult<Ack> {
        self.reply("approve", format!("POST /api/startup/{id}/approve")).await
    }

    async fn reject_startup(&self, id: &str) -> ClientResult<Ack> {
        self.reply("reject", format!("POST /api/startup/{id}/reject")).await
    }

    async fn admins(&self) -> ClientResult<Envelope<Vec<AdminRecord>>> {
        self.reply("admins", "GET /api/admins".into()).await
    }

    async fn create_admin(&self, admin: &NewAdmin) -> ClientResult<Ack> {
        let call = format!("POST /api/admins {}", admin.username);
        self.reply("create_admin", call).await
    }

    async fn delete_admin(&self, id: &str) -> ClientResult<Ack> {
        self.reply("delete_admin", format!("DELETE /api/admins/{id}")).await
    }

    async fn backups(&self) -> ClientResult<Envelope<Vec<BackupRecord>>> {
        self.reply("backups", "GET /api/backups".into()).await
    }

    async fn create_backup(&self) -> ClientResult<Ack> {
        self.reply("create_backup", "POST /api/backups".into()).await
    }

    async fn delete_backup(&self, id: &str) -> ClientResult<Ack> {
        self.reply("delete_backup", format!("DELETE /api/backups/{id}")).await
    }

    async fn download_backup(&self, filename: &str) -> ClientResult<Vec<u8>> {
        let scripted = self.next(
            "download_backup",
            format!("GET /api/backups/{filename}/download"),
        );
        match self.answer(scripted).await? {
            Value::String(text) => Ok(text.into_bytes()),
            other => Ok(other.to_string().into_bytes()),
        }
    }

    async fn settings(&self) -> ClientResult<Envelope<Settings>> {
        self.reply("settings", "GET /api/settings".into()).await
    }

    async fn save_settings(&self, settings: &SettingsUpdate) -> ClientResult<Ack> {
        let call = format!("POST /api/settings {}", settings.site_name);
        self.reply("save_settings", call).await
    }

    async fn broadcast(
        &self,
        request: &BroadcastRequest,
    ) -> ClientResult<Envelope<BroadcastRecord>> {
        let call = format!("POST /api/broadcast {}", request.recipient_type);
        self.reply("broadcast", call).await
    }
}

/// Answers confirmations from a script; refuses once the script runs out
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// Controller over `api` with default config and an inspectable chart host
pub fn dashboard(api: Arc<FakeApi>) -> (Dashboard, Arc<MemoryChartHost>) {
    dashboard_with(api, &Config::default())
}

pub fn dashboard_with(api: Arc<FakeApi>, config: &Config) -> (Dashboard, Arc<MemoryChartHost>) {
    let host = Arc::new(MemoryChartHost::default());
    let dash = Dashboard::new(api, config).with_chart_host(host.clone());
    (dash, host)
}

/// Put an `admin` / "Super Admin" session in place without a login round trip
pub fn signed_in(dash: &Dashboard) {
    dash.lock().set_session(Some(Identity {
        username: "admin".to_string(),
        full_name: "Super Admin".to_string(),
        role: "superadmin".to_string(),
        email: Some("admin@garajhub.uz".to_string()),
    }));
}
