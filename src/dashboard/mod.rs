//! Dashboard Controller
//!
//! [`Dashboard`] ties the session gate, router, loaders and actions
//! together. It is cheap to clone; every clone shares the same state, chart
//! registry and notification stack. The state lock is never held across an
//! await, so loads for one section may overlap and the request generation
//! decides which response is kept.

pub mod actions;
pub mod debounce;
pub mod loaders;
pub mod pagination;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::AdminApi;
use crate::config::Config;
use crate::notify::NotificationCenter;
use crate::render::chart::{ChartHost, ChartRegistry, MemoryChartHost};
use crate::state::{AppState, GrowthPeriod, Section};
use crate::theme::{MemoryThemeStore, ThemeStore};

pub use actions::{AssumeYes, Confirm};
pub use debounce::Debouncer;
pub use pagination::{PageWindow, PaginationControl};
pub use router::View;
pub use session::UserInfo;

/// Toast shown when a request never got an answer
pub const SERVER_ERROR: &str = "Server xatosi";

/// What a controller operation ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Response committed
    Applied,
    /// A newer request for the same section won; response dropped
    Stale,
    /// Backend answered `success: false` with this message
    Rejected(String),
    /// Transport failure
    Unreachable,
    /// The admin declined the confirmation; nothing was sent
    Declined,
    /// Refused client-side; nothing was sent
    Refused,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Config values the controller consults after construction
#[derive(Debug, Clone)]
struct ControllerSettings {
    credentials: Option<(String, String)>,
    clear_on_logout_failure: bool,
    mail_domain: String,
}

#[derive(Clone)]
pub struct Dashboard {
    api: Arc<dyn AdminApi>,
    state: Arc<Mutex<AppState>>,
    notifications: Arc<NotificationCenter>,
    charts: Arc<dyn ChartHost>,
    registry: Arc<Mutex<ChartRegistry>>,
    themes: Arc<dyn ThemeStore>,
    confirm: Arc<dyn Confirm>,
    users_search: Debouncer,
    startups_search: Debouncer,
    settings: Arc<ControllerSettings>,
}

impl Dashboard {
    /// Controller with an in-memory chart host and theme store that confirms
    /// every prompt. Swap the collaborators with the `with_*` methods.
    pub fn new(api: Arc<dyn AdminApi>, config: &Config) -> Self {
        let growth_period = config
            .dashboard
            .default_growth_period
            .parse::<GrowthPeriod>()
            .unwrap_or_else(|e| {
                tracing::warn!("{}, using month", e);
                GrowthPeriod::Month
            });
        let state = AppState::new(growth_period, config.dashboard.broadcast_history_limit);
        let debounce = config.dashboard.search_debounce();

        Self {
            api,
            state: Arc::new(Mutex::new(state)),
            notifications: Arc::new(NotificationCenter::new(config.dashboard.toast_config())),
            charts: Arc::new(MemoryChartHost::new()),
            registry: Arc::new(Mutex::new(ChartRegistry::new())),
            themes: Arc::new(MemoryThemeStore::default()),
            confirm: Arc::new(AssumeYes),
            users_search: Debouncer::new(debounce),
            startups_search: Debouncer::new(debounce),
            settings: Arc::new(ControllerSettings {
                credentials: config.auth.credentials(),
                clear_on_logout_failure: config.session.clear_on_logout_failure,
                mail_domain: config.dashboard.mail_domain.clone(),
            }),
        }
    }

    pub fn with_chart_host(mut self, host: Arc<dyn ChartHost>) -> Self {
        self.charts = host;
        self
    }

    pub fn with_theme_store(mut self, store: Arc<dyn ThemeStore>) -> Self {
        self.themes = store;
        self
    }

    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Read the state under the lock
    pub fn state<R>(&self, read: impl FnOnce(&AppState) -> R) -> R {
        read(&self.lock())
    }

    pub fn current_view(&self) -> View {
        self.lock().view()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    /// Last committed markup of a section
    pub fn markup(&self, section: Section) -> Option<String> {
        self.lock().markup(section).map(str::to_string)
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_registry(&self) -> MutexGuard<'_, ChartRegistry> {
        self.registry.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("view", &self.current_view())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
