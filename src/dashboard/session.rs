//! Session Gate
//!
//! Decides whether the admin sees the login form or the dashboard, and
//! owns the login and logout flows. The session itself lives in a backend
//! cookie; the controller only mirrors the identity it reports.

use super::{Dashboard, Outcome, View, SERVER_ERROR};
use crate::api::dto::Identity;
use crate::render::widgets;
use crate::theme::{self, Theme};

pub const LOGIN_SUCCESS: &str = "Muvaffaqiyatli kirildi";
pub const LOGIN_FAILED: &str = "Login xatosi";
pub const LOGOUT_SUCCESS: &str = "Muvaffaqiyatli chiqildi";
pub const LOGOUT_FAILED: &str = "Chiqish xatosi";

/// Header projection of the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

impl UserInfo {
    pub fn new(identity: &Identity, mail_domain: &str) -> Self {
        Self {
            name: identity.full_name.clone(),
            email: format!("{}@{}", identity.username, mail_domain),
            avatar_url: format!(
                "https://ui-avatars.com/api/?name={}&background=000000&color=fff",
                urlencoding::encode(&identity.full_name)
            ),
        }
    }

    pub fn markup(&self) -> String {
        widgets::user_info(&self.name, &self.email, &self.avatar_url)
    }
}

impl Dashboard {
    /// Apply the stored theme, ask the backend whether the cookie session is
    /// alive and route accordingly. Returns the view shown.
    pub async fn boot(&self) -> View {
        self.boot_into(View::Dashboard).await
    }

    /// [`boot`](Self::boot), landing on `landing` instead of the dashboard
    pub async fn boot_into(&self, landing: View) -> View {
        if self.resume().await {
            self.navigate(landing).await
        } else {
            self.navigate(View::Login).await
        }
    }

    /// Restore the session, or sign in with configured credentials, without
    /// loading any view. Returns whether an admin is signed in.
    pub async fn resume(&self) -> bool {
        self.apply_stored_theme();

        match self.api.check_auth().await {
            Ok(status) if status.authenticated => {
                let identity = status.user.unwrap_or_default();
                tracing::info!(username = %identity.username, "session restored");
                self.lock().set_session(Some(identity));
                true
            }
            Ok(_) => match self.settings.credentials.clone() {
                Some((username, password)) => {
                    tracing::debug!("no session, logging in with configured credentials");
                    self.authenticate(&username, &password).await.is_applied()
                }
                None => false,
            },
            Err(e) => {
                tracing::warn!("Auth check failed: {}", e);
                false
            }
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Outcome {
        let outcome = self.authenticate(username, password).await;
        if outcome.is_applied() {
            self.navigate(View::Dashboard).await;
        }
        outcome
    }

    async fn authenticate(&self, username: &str, password: &str) -> Outcome {
        match self.api.login(username, password).await {
            Ok(response) if response.success => {
                let identity = response.user.unwrap_or_else(|| Identity {
                    username: username.to_string(),
                    ..Default::default()
                });
                tracing::info!(username = %identity.username, "logged in");
                self.lock().set_session(Some(identity));
                self.notifications.success(LOGIN_SUCCESS);
                Outcome::Applied
            }
            Ok(response) => {
                let message = response
                    .error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED.to_string());
                self.notifications.error(message.clone());
                Outcome::Rejected(message)
            }
            Err(e) => {
                tracing::error!("Login request failed: {}", e);
                self.notifications.error(SERVER_ERROR);
                Outcome::Unreachable
            }
        }
    }

    pub async fn logout(&self) -> Outcome {
        match self.api.logout().await {
            Ok(ack) if ack.success => {
                self.end_session();
                self.notifications.success(LOGOUT_SUCCESS);
                Outcome::Applied
            }
            Ok(ack) => {
                let message = ack.error_or(LOGOUT_FAILED).to_string();
                self.notifications.error(message.clone());
                Outcome::Rejected(message)
            }
            Err(e) => {
                tracing::error!("Logout request failed: {}", e);
                if self.settings.clear_on_logout_failure {
                    self.end_session();
                }
                Outcome::Unreachable
            }
        }
    }

    fn end_session(&self) {
        self.users_search.cancel();
        self.startups_search.cancel();

        let mut state = self.lock();
        self.lock_registry().clear(self.charts.as_ref());
        state.reset_session();
        tracing::info!("session cleared");
    }

    /// Name, e-mail and avatar for the header; `None` when signed out
    pub fn user_info(&self) -> Option<UserInfo> {
        let state = self.lock();
        state
            .session()
            .map(|identity| UserInfo::new(identity, &self.settings.mail_domain))
    }

    fn apply_stored_theme(&self) {
        let theme = theme::load_or_default(self.themes.as_ref());
        tracing::debug!(theme = theme.as_str(), "theme applied");
        self.lock().set_theme(theme);
    }

    /// Flip the theme toggle: apply, persist and recolour live growth charts
    pub fn toggle_theme(&self, dark: bool) -> Theme {
        let theme = Theme::from_toggle(dark);
        if let Err(e) = self.themes.save(theme) {
            tracing::warn!("Failed to save theme: {}", e);
        }

        let mut state = self.lock();
        state.set_theme(theme);
        self.redraw_growth_charts(&state);
        theme
    }

    /// `data-theme` document attribute
    pub fn theme_attribute(&self) -> (&'static str, &'static str) {
        self.lock().theme().document_attribute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::Pagination;
    use crate::config::Config;
    use crate::dashboard::testing::{dashboard, dashboard_with, signed_in, FakeApi};
    use crate::notify::ToastKind;
    use crate::render::chart::ChartSlot;
    use crate::state::Section;
    use crate::theme::{MemoryThemeStore, ThemeStore};
    use serde_json::json;
    use std::sync::Arc;

    fn admin() -> serde_json::Value {
        json!({"username": "admin", "full_name": "Super Admin", "role": "superadmin"})
    }

    #[tokio::test]
    async fn test_boot_with_live_session_lands_on_dashboard() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": true, "user": admin()}));
        let (dash, _) = dashboard(api.clone());

        assert_eq!(dash.boot().await, View::Dashboard);
        assert_eq!(dash.state(|s| s.session().map(|i| i.username.clone())), Some("admin".into()));
        assert_eq!(api.count("GET /api/statistics"), 1);
    }

    #[tokio::test]
    async fn test_boot_without_session_lands_on_login() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": false}));
        let (dash, _) = dashboard(api.clone());

        assert_eq!(dash.boot().await, View::Login);
        assert!(!dash.is_authenticated());
        assert_eq!(api.calls(), vec!["GET /api/check_auth".to_string()]);
    }

    #[tokio::test]
    async fn test_boot_transport_failure_lands_on_login() {
        let api = Arc::new(FakeApi::new());
        api.fail("check_auth");
        let (dash, _) = dashboard(api);

        assert_eq!(dash.boot().await, View::Login);
        assert!(dash.notifications().latest().is_none());
    }

    #[tokio::test]
    async fn test_boot_logs_in_with_configured_credentials() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": false}));
        api.set("login", json!({"success": true, "user": admin()}));

        let mut config = Config::default();
        config.auth.username = Some("admin".into());
        config.auth.password = Some("admin123".into());
        let (dash, _) = dashboard_with(api.clone(), &config);

        assert_eq!(dash.boot().await, View::Dashboard);
        assert_eq!(api.count("POST /api/login admin"), 1);
    }

    #[tokio::test]
    async fn test_boot_into_skips_dashboard_load() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": true, "user": admin()}));
        let (dash, _) = dashboard(api.clone());

        assert_eq!(dash.boot_into(View::Admins).await, View::Admins);
        assert_eq!(
            api.calls(),
            vec!["GET /api/check_auth".to_string(), "GET /api/admins".to_string()]
        );
    }

    #[tokio::test]
    async fn test_resume_restores_session_without_loading() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": true, "user": admin()}));
        let (dash, _) = dashboard(api.clone());

        assert!(dash.resume().await);
        assert_eq!(dash.query_users("ali", "active", 3).await, Outcome::Applied);
        assert_eq!(
            api.calls(),
            vec![
                "GET /api/check_auth".to_string(),
                "GET /api/users?page=3&search=ali&filter=active".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_resume_without_session_or_credentials() {
        let api = Arc::new(FakeApi::new());
        api.set("check_auth", json!({"authenticated": false}));
        let (dash, _) = dashboard(api.clone());

        assert!(!dash.resume().await);
        assert_eq!(api.calls(), vec!["GET /api/check_auth".to_string()]);
        assert_eq!(dash.current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_boot_applies_stored_theme() {
        let api = Arc::new(FakeApi::new());
        let (dash, _) = dashboard(api);
        let dash = dash.with_theme_store(Arc::new(MemoryThemeStore::with(Theme::Dark)));

        dash.boot().await;
        assert_eq!(dash.theme_attribute(), ("data-theme", "dark"));
    }

    #[tokio::test]
    async fn test_login_success() {
        let api = Arc::new(FakeApi::new());
        api.set("login", json!({"success": true, "user": admin()}));
        let (dash, _) = dashboard(api);

        assert_eq!(dash.login("admin", "admin123").await, Outcome::Applied);
        assert_eq!(dash.current_view(), View::Dashboard);

        let toast = dash
            .notifications()
            .active()
            .into_iter()
            .find(|t| t.kind == ToastKind::Success)
            .unwrap();
        assert_eq!(toast.message, LOGIN_SUCCESS);
    }

    #[tokio::test]
    async fn test_login_wrong_credentials_stays_on_login() {
        let api = Arc::new(FakeApi::new());
        api.set("login", json!({"success": false, "error": "Login xatosi"}));
        let (dash, _) = dashboard(api);

        let outcome = dash.login("admin", "wrong").await;
        assert_eq!(outcome, Outcome::Rejected("Login xatosi".into()));
        assert_eq!(dash.current_view(), View::Login);
        assert!(!dash.is_authenticated());

        let toast = dash.notifications().latest().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Login xatosi");
    }

    #[tokio::test]
    async fn test_login_server_message_and_transport_failure() {
        let api = Arc::new(FakeApi::new());
        api.respond("login", json!({"success": false, "error": "Foydalanuvchi bloklangan"}));
        api.fail("login");
        let (dash, _) = dashboard(api);

        dash.login("admin", "x").await;
        assert_eq!(dash.notifications().latest().unwrap().message, "Foydalanuvchi bloklangan");

        assert_eq!(dash.login("admin", "x").await, Outcome::Unreachable);
        assert_eq!(dash.notifications().latest().unwrap().message, SERVER_ERROR);
        assert_eq!(dash.current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_charts() {
        let api = Arc::new(FakeApi::new());
        api.set("logout", json!({"success": true}));
        let (dash, host) = dashboard(api);
        signed_in(&dash);
        dash.navigate(View::Dashboard).await;
        assert_eq!(host.live_count(), 2);

        assert_eq!(dash.logout().await, Outcome::Applied);
        assert_eq!(dash.current_view(), View::Login);
        assert!(dash.user_info().is_none());
        assert_eq!(host.live_count(), 0);
        assert!(dash.markup(Section::Statistics).is_none());
        assert_eq!(dash.notifications().latest().unwrap().message, LOGOUT_SUCCESS);
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_session() {
        let api = Arc::new(FakeApi::new());
        api.respond("logout", json!({"success": false}));
        api.fail("logout");
        let (dash, _) = dashboard(api);
        signed_in(&dash);

        assert_eq!(dash.logout().await, Outcome::Rejected(LOGOUT_FAILED.into()));
        assert!(dash.is_authenticated());

        assert_eq!(dash.logout().await, Outcome::Unreachable);
        assert!(dash.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_transport_failure_can_clear_session() {
        let api = Arc::new(FakeApi::new());
        api.fail("logout");
        let mut config = Config::default();
        config.session.clear_on_logout_failure = true;
        let (dash, _) = dashboard_with(api, &config);
        signed_in(&dash);

        assert_eq!(dash.logout().await, Outcome::Unreachable);
        assert!(!dash.is_authenticated());
        assert_eq!(dash.current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_stale_response_after_logout_is_dropped() {
        let api = Arc::new(FakeApi::new());
        api.respond_after(
            "users",
            std::time::Duration::from_millis(50),
            json!({"success": true, "data": [], "pagination": Pagination::default()}),
        );
        api.set("logout", json!({"success": true}));
        let (dash, _) = dashboard(api);
        signed_in(&dash);

        let load = tokio::spawn({
            let dash = dash.clone();
            async move { dash.load_users(1).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        dash.logout().await;

        assert_eq!(load.await.unwrap(), Outcome::Stale);
        assert!(dash.markup(Section::Users).is_none());
    }

    #[test]
    fn test_user_info_projection() {
        let identity = Identity {
            username: "admin".into(),
            full_name: "Super Admin".into(),
            role: "superadmin".into(),
            email: None,
        };

        let info = UserInfo::new(&identity, "garajhub.uz");
        assert_eq!(info.email, "admin@garajhub.uz");
        assert_eq!(
            info.avatar_url,
            "https://ui-avatars.com/api/?name=Super%20Admin&background=000000&color=fff"
        );
        assert!(info.markup().contains("<div id=\"adminName\">Super Admin</div>"));
    }

    #[tokio::test]
    async fn test_toggle_theme_persists_and_recolours_charts() {
        let api = Arc::new(FakeApi::new());
        let store = Arc::new(MemoryThemeStore::default());
        let (dash, host) = dashboard(api);
        let dash = dash.with_theme_store(store.clone());
        signed_in(&dash);
        dash.navigate(View::Dashboard).await;
        let before = dash.lock_registry().handle(ChartSlot::UserGrowth);

        assert_eq!(dash.toggle_theme(true), Theme::Dark);
        assert_eq!(store.load().unwrap(), Some(Theme::Dark));
        assert_eq!(dash.theme_attribute(), ("data-theme", "dark"));

        let after = dash.lock_registry().handle(ChartSlot::UserGrowth);
        assert_ne!(before, after);
        let charts = host.live_on("userGrowthChart");
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].options["scales"]["y"]["grid"]["color"], "#333333");
    }
}
