//! View Router
//!
//! Eight views, one active at a time. Entering a view triggers its loader;
//! re-entering the current view reloads it. There is no history stack.

use std::fmt::Write;

use super::Dashboard;
use crate::render::chart::ChartSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Login,
    Dashboard,
    Users,
    Startups,
    Statistics,
    Admins,
    Backup,
    Settings,
}

impl View {
    /// Sidebar order
    pub const MENU: [View; 7] = [
        View::Dashboard,
        View::Users,
        View::Startups,
        View::Statistics,
        View::Admins,
        View::Backup,
        View::Settings,
    ];

    /// Page tag (`data-page`)
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::Dashboard => "dashboard",
            View::Users => "users",
            View::Startups => "startups",
            View::Statistics => "statistics",
            View::Admins => "admins",
            View::Backup => "backup",
            View::Settings => "settings",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Kirish",
            View::Dashboard => "Dashboard",
            View::Users => "Foydalanuvchilar",
            View::Startups => "Startaplar",
            View::Statistics => "Statistika",
            View::Admins => "Adminlar",
            View::Backup => "Backup",
            View::Settings => "Sozlamalar",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            View::Login => "fa-sign-in-alt",
            View::Dashboard => "fa-home",
            View::Users => "fa-users",
            View::Startups => "fa-rocket",
            View::Statistics => "fa-chart-bar",
            View::Admins => "fa-user-shield",
            View::Backup => "fa-database",
            View::Settings => "fa-cog",
        }
    }

    /// Every view except login needs a session
    pub fn requires_auth(&self) -> bool {
        *self != View::Login
    }

    /// Chart slot holding this view's growth chart
    pub fn growth_slot(&self) -> Option<ChartSlot> {
        match self {
            View::Dashboard => Some(ChartSlot::UserGrowth),
            View::Statistics => Some(ChartSlot::StatisticsGrowth),
            _ => None,
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(View::Login),
            "dashboard" => Ok(View::Dashboard),
            "users" => Ok(View::Users),
            "startups" => Ok(View::Startups),
            "statistics" => Ok(View::Statistics),
            "admins" => Ok(View::Admins),
            "backup" => Ok(View::Backup),
            "settings" => Ok(View::Settings),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub view: View,
    pub active: bool,
}

/// Sidebar entries with the current view marked
pub fn menu(current: View) -> Vec<MenuItem> {
    View::MENU
        .iter()
        .map(|&view| MenuItem {
            view,
            active: view == current,
        })
        .collect()
}

pub fn menu_markup(items: &[MenuItem]) -> String {
    let mut html = String::from("<ul class=\"menu\">");
    for item in items {
        let class = if item.active { " class=\"active\"" } else { "" };
        let _ = write!(
            html,
            "<li{class} data-page=\"{page}\"><i class=\"fas {icon}\"></i><span>{title}</span></li>",
            page = item.view.as_str(),
            icon = item.view.icon(),
            title = item.view.title(),
        );
    }
    html.push_str("</ul>");
    html
}

impl Dashboard {
    /// Switch to `view` and run its loader. Unauthenticated navigation to a
    /// protected view lands on login instead. Returns the view shown.
    pub async fn navigate(&self, view: View) -> View {
        let target = {
            let mut state = self.lock();
            let target = if view.requires_auth() && !state.is_authenticated() {
                tracing::debug!(requested = view.as_str(), "no session, redirecting to login");
                View::Login
            } else {
                view
            };
            state.set_view(target);
            state.set_modal(None);
            target
        };

        tracing::debug!(view = target.as_str(), "navigated");
        self.load_view(target).await;
        target
    }

    /// Reload whatever the current view shows
    pub async fn refresh(&self) {
        let view = self.current_view();
        self.load_view(view).await;
    }

    async fn load_view(&self, view: View) {
        match view {
            View::Login => {}
            View::Dashboard => {
                self.load_dashboard().await;
            }
            View::Users => {
                self.load_users(1).await;
            }
            View::Startups => {
                self.load_startups(1).await;
            }
            View::Statistics => {
                self.load_detailed_statistics().await;
            }
            View::Admins => {
                self.load_admins().await;
            }
            View::Backup => {
                self.load_backups().await;
            }
            View::Settings => {
                self.load_settings().await;
            }
        }
    }

    /// Sidebar with the current view active
    pub fn menu(&self) -> Vec<MenuItem> {
        menu(self.current_view())
    }
}
