//! Data Transfer Objects
//!
//! Request and response types of the admin REST API. The backend is
//! permissive about missing fields, so almost everything here defaults.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================
// ENVELOPES
// ============================================

/// Common response envelope.
///
/// Every endpoint except check-auth answers with a `success` flag and, on
/// success, a `data` payload; failures carry an optional human-readable
/// `error`. Error bodies produced by the backend's auth guard omit `success`
/// entirely, which reads as `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            message: None,
            data: Some(data),
            pagination: None,
            total: None,
        }
    }

    /// A failed envelope with an optional server message
    pub fn failed(error: Option<&str>) -> Self {
        Self {
            success: false,
            error: error.map(str::to_string),
            message: None,
            data: None,
            pagination: None,
            total: None,
        }
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Server-supplied error text, falling back to `fallback`
    pub fn error_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.error
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(fallback)
    }
}

/// Payload-less acknowledgement (logout, approve, settings write...)
pub type Ack = Envelope<Value>;

/// Response of `GET /api/check_auth`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: Option<Identity>,
}

/// Response of `POST /api/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Authenticated admin identity as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Pagination descriptor returned with list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            total: 0,
            total_pages: 0,
        }
    }
}

// ============================================
// REQUESTS
// ============================================

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Broadcast request body
#[derive(Debug, Clone, Serialize)]
pub struct BroadcastRequest {
    pub message: String,
    pub recipient_type: String,
}

/// Writable subset of the settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub site_name: String,
    pub admin_email: String,
    pub timezone: String,
}

/// New admin account
#[derive(Debug, Clone, Serialize)]
pub struct NewAdmin {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub password: String,
}

// ============================================
// RECORDS
// ============================================

/// Reads an explicit `null` as the field's default, the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Aggregate dashboard statistics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_users: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_startups: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_startups: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pending_startups: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_startups: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rejected_startups: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_today: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub activity_rate: f64,
    #[serde(default)]
    pub trends: Option<Trends>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trends {
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub startups: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    #[default]
    #[serde(other)]
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default)]
    pub joined_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: UserStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartupStatus {
    Active,
    Completed,
    Rejected,
    #[default]
    #[serde(other)]
    Pending,
}

impl StartupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartupStatus::Pending => "pending",
            StartupStatus::Active => "active",
            StartupStatus::Completed => "completed",
            StartupStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupRecord {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub owner_name: String,
    #[serde(default)]
    pub owner_id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StartupStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub member_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupOwner {
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupDetail {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StartupStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_text: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub ended_at: Option<String>,
    #[serde(default)]
    pub results: Option<String>,
    #[serde(default)]
    pub group_link: Option<String>,
    #[serde(default)]
    pub owner: Option<StartupOwner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRecord {
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub site_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub admin_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezone: String,
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default)]
    pub channel_username: Option<String>,
    #[serde(default)]
    pub bot_status: Option<String>,
}

impl Settings {
    pub fn to_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            site_name: self.site_name.clone(),
            admin_email: self.admin_email.clone(),
            timezone: self.timezone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Value,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_ago: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipient_type: String,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub sent_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sent_count: u64,
}

// ============================================
// CHART DATA
// ============================================

/// Chart payload handed to the charting library.
///
/// Only the fields the dashboard reads (labels, per-dataset values and
/// colours) are typed; everything else is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(
        rename = "backgroundColor",
        default,
        skip_serializing_if = "Value::is_null"
    )]
    pub background_color: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dataset {
    /// Background colour of the `index`-th segment. Accepts both a single
    /// colour and a per-segment array.
    pub fn color_at(&self, index: usize) -> Option<&str> {
        match &self.background_color {
            Value::String(s) => Some(s.as_str()),
            Value::Array(colors) => colors.get(index).and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Render a JSON scalar id the way the backend shows it (`7`, `"abc"` → `abc`)
pub fn id_text(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_without_success_is_failure() {
        let env: Ack = serde_json::from_value(json!({"error": "Unauthorized"})).unwrap();
        assert!(!env.success);
        assert_eq!(env.error_or("fallback"), "Unauthorized");
    }

    #[test]
    fn test_error_or_fallback_on_empty_message() {
        let env: Ack = serde_json::from_value(json!({"success": false, "error": ""})).unwrap();
        assert_eq!(env.error_or("Tasdiqlash xatosi"), "Tasdiqlash xatosi");
    }

    #[test]
    fn test_users_envelope_with_pagination() {
        let env: Envelope<Vec<UserRecord>> = serde_json::from_value(json!({
            "success": true,
            "data": [{
                "id": "1", "first_name": "Ali", "last_name": "Valiyev",
                "phone": "+998901234567", "joined_at": "2024-01-15", "status": "active"
            }],
            "pagination": {"page": 1, "per_page": 20, "total": 1, "total_pages": 1}
        }))
        .unwrap();

        let users = env.data.unwrap();
        assert_eq!(users[0].status, UserStatus::Active);
        assert_eq!(env.pagination.unwrap().total_pages, 1);
    }

    #[test]
    fn test_unknown_statuses_fall_back() {
        let user: UserRecord =
            serde_json::from_value(json!({"id": "9", "status": "banned"})).unwrap();
        assert_eq!(user.status, UserStatus::Inactive);

        let startup: StartupRecord =
            serde_json::from_value(json!({"id": "s", "status": "archived"})).unwrap();
        assert_eq!(startup.status, StartupStatus::Pending);
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let user: UserRecord = serde_json::from_value(json!({
            "id": "3", "first_name": "Ali", "last_name": null,
            "phone": null, "joined_at": null, "status": null
        }))
        .unwrap();
        assert_eq!(user.phone, "");
        assert_eq!(user.last_name, "");
        assert_eq!(user.status, UserStatus::Inactive);

        let detail: StartupDetail = serde_json::from_value(json!({
            "id": "s1", "name": "EduTech", "description": null,
            "status": "active", "status_text": null,
            "owner": {"first_name": "Ali", "username": null, "bio": null}
        }))
        .unwrap();
        assert_eq!(detail.status, StartupStatus::Active);
        assert_eq!(detail.status_text, "");
        assert_eq!(detail.owner.unwrap().username, "");

        let admin: AdminRecord = serde_json::from_value(json!({
            "id": 2, "username": "ops", "full_name": null, "email": null
        }))
        .unwrap();
        assert_eq!(admin.full_name, "");
    }

    #[test]
    fn test_dataset_keeps_unknown_fields() {
        let data: ChartData = serde_json::from_value(json!({
            "labels": ["Faol", "Kutilayotgan"],
            "datasets": [{
                "data": [18, 8],
                "backgroundColor": ["#000000", "#666666"],
                "borderColor": "#ffffff",
                "borderWidth": 2
            }]
        }))
        .unwrap();

        let ds = &data.datasets[0];
        assert_eq!(ds.color_at(1), Some("#666666"));
        assert_eq!(ds.extra.get("borderWidth"), Some(&json!(2)));

        let back = serde_json::to_value(&data).unwrap();
        assert_eq!(back["datasets"][0]["borderColor"], json!("#ffffff"));
    }

    #[test]
    fn test_id_text() {
        assert_eq!(id_text(&json!(2)), "2");
        assert_eq!(id_text(&json!("abc123")), "abc123");
    }
}
