//! # Garaj Admin
//!
//! Controller for the GarajHub admin dashboard: session gate, view router,
//! section loaders, HTML renderers, chart lifecycle, pagination, debounced
//! search, confirmed actions, toast notifications and theme preference, all
//! driven over the backend's JSON REST API.
//!
//! ## Modules
//!
//! - [`api`]: REST client and wire types
//! - [`dashboard`]: The [`Dashboard`] controller
//! - [`state`]: Session, view and per-section data with request generations
//! - [`render`]: Markup builders and the chart registry
//! - [`notify`]: Transient toast stack
//! - [`theme`]: Light/dark preference and its stores
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use garaj_admin::{Config, Dashboard, HttpAdminClient, Section, View};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let api = Arc::new(HttpAdminClient::new(config.api.client_config())?);
//!     let dashboard = Dashboard::new(api, &config);
//!
//!     if dashboard.boot().await == View::Dashboard {
//!         println!("{}", dashboard.markup(Section::Statistics).unwrap_or_default());
//!     }
//!
//!     for toast in dashboard.notifications().active() {
//!         eprintln!("{}: {}", toast.kind.as_str(), toast.message);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod notify;
pub mod render;
pub mod state;
pub mod theme;

pub use api::{
    AdminApi, ClientError, ClientResult, Envelope, HttpAdminClient, HttpClientConfig, Identity,
    Pagination,
};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig};

pub use dashboard::{
    AssumeYes, Confirm, Dashboard, Debouncer, Outcome, PageWindow, PaginationControl, UserInfo,
    View,
};

pub use notify::{NotificationCenter, Toast, ToastConfig, ToastKind};

pub use render::{ChartHost, ChartRegistry, ChartSlot, MemoryChartHost};

pub use state::{AppState, GrowthPeriod, Section};

pub use theme::{FileThemeStore, MemoryThemeStore, Theme, ThemeError, ThemeStore};
