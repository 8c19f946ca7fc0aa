//! Data Loaders
//!
//! One loader per section. A loader takes a generation ticket, performs a
//! single fetch and, if the response is successful and still the latest for
//! its section, replaces the section's data and markup wholesale. Failures
//! keep the previous render and raise a toast.

use std::future::Future;

use super::pagination::{PageCallback, PageWindow, PaginationControl};
use super::{Dashboard, Outcome};
use crate::api::dto::{Envelope, Pagination};
use crate::api::{ClientResult, StartupListQuery, UserListQuery};
use crate::render::chart::{self, ChartSlot};
use crate::render::{tables, widgets, ActivityFilter};
use crate::state::{AppState, GrowthPeriod, Modal, Section, Ticket};

pub const STATISTICS_LOAD_FAILED: &str = "Statistikani yuklashda xatolik";
pub const CHART_LOAD_FAILED: &str = "Grafik ma'lumotlarini yuklashda xatolik";
pub const ACTIVITY_LOAD_FAILED: &str = "Faollikni yuklashda xatolik";
pub const USERS_LOAD_FAILED: &str = "Foydalanuvchilarni yuklashda xatolik";
pub const STARTUPS_LOAD_FAILED: &str = "Startaplarni yuklashda xatolik";
pub const STARTUP_DETAIL_LOAD_FAILED: &str = "Startap ma'lumotlarini yuklashda xatolik";
pub const ADMINS_LOAD_FAILED: &str = "Adminlarni yuklashda xatolik";
pub const BACKUPS_LOAD_FAILED: &str = "Backuplarni yuklashda xatolik";
pub const SETTINGS_LOAD_FAILED: &str = "Sozlamalarni yuklashda xatolik";

impl Dashboard {
    /// Take a ticket for `section` and await `request`. Hands back the
    /// envelope only when the backend reported success; stale failures are
    /// dropped without a toast.
    async fn fetch<T>(
        &self,
        section: Section,
        failure: &str,
        request: impl Future<Output = ClientResult<Envelope<T>>>,
    ) -> Result<(Ticket, Envelope<T>), Outcome> {
        let ticket = self.lock().begin(section);
        let result = request.await;

        let failed = match result {
            Ok(envelope) if envelope.success => return Ok((ticket, envelope)),
            Ok(envelope) => Outcome::Rejected(envelope.error_or(failure).to_string()),
            Err(e) => {
                tracing::warn!(section = section.as_str(), "Failed to load: {}", e);
                Outcome::Unreachable
            }
        };

        if !self.lock().is_current(&ticket) {
            tracing::debug!(section = section.as_str(), "discarding stale failure");
            return Err(Outcome::Stale);
        }

        match &failed {
            Outcome::Rejected(message) => {
                self.notifications.error(message.clone());
            }
            _ => {
                self.notifications.error(failure);
            }
        }
        Err(failed)
    }

    /// Commit `update` if `ticket` is still current
    fn apply(&self, ticket: &Ticket, update: impl FnOnce(&mut AppState)) -> Outcome {
        if self.lock().commit(ticket, update) {
            Outcome::Applied
        } else {
            Outcome::Stale
        }
    }

    // ---- dashboard ------------------------------------------------------

    /// Statistics first; on success the growth chart, distribution chart and
    /// activity feed load concurrently
    pub async fn load_dashboard(&self) -> Outcome {
        let outcome = self.load_statistics().await;
        if outcome.is_applied() {
            futures_util::join!(
                self.load_growth_chart(ChartSlot::UserGrowth, Section::UserGrowth),
                self.load_distribution(),
                self.load_activity(),
            );
        }
        outcome
    }

    pub async fn load_statistics(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(Section::Statistics, STATISTICS_LOAD_FAILED, self.api.statistics())
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let stats = envelope.data.unwrap_or_default();
        let markup = widgets::stats_cards(&stats);
        self.apply(&ticket, |state| {
            state.set_statistics(stats);
            state.set_markup(Section::Statistics, markup);
        })
    }

    async fn load_growth_chart(&self, slot: ChartSlot, section: Section) -> Outcome {
        let period = self.lock().growth_period(slot);
        let (ticket, envelope) = match self
            .fetch(section, CHART_LOAD_FAILED, self.api.user_growth(period.as_str()))
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let data = envelope.data.unwrap_or_default();
        self.apply(&ticket, |state| {
            let config = chart::growth_chart(&data, state.theme());
            self.lock_registry()
                .install(self.charts.as_ref(), slot, &config);
            state.set_growth(slot, data);
        })
    }

    /// Rebuild live growth charts from their own cached data (theme change)
    pub(super) fn redraw_growth_charts(&self, state: &AppState) {
        let mut registry = self.lock_registry();
        for slot in [ChartSlot::UserGrowth, ChartSlot::StatisticsGrowth] {
            let Some(data) = state.growth(slot) else {
                continue;
            };
            if registry.handle(slot).is_some() {
                let config = chart::growth_chart(data, state.theme());
                registry.install(self.charts.as_ref(), slot, &config);
            }
        }
    }

    pub async fn load_distribution(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(
                Section::Distribution,
                CHART_LOAD_FAILED,
                self.api.startup_distribution(),
            )
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let total = envelope.total;
        let data = envelope.data.unwrap_or_default();
        let legend = widgets::distribution_legend(&data);
        self.apply(&ticket, |state| {
            let config = chart::distribution_chart(&data);
            self.lock_registry()
                .install(self.charts.as_ref(), ChartSlot::StartupDistribution, &config);
            state.set_distribution(data, total);
            state.set_markup(Section::Distribution, legend);
        })
    }

    pub async fn load_activity(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(Section::Activity, ACTIVITY_LOAD_FAILED, self.api.recent_activity())
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let entries = envelope.data.unwrap_or_default();
        self.apply(&ticket, |state| {
            let markup = widgets::activity_feed(&entries, state.activity_filter());
            state.set_activity(entries);
            state.set_markup(Section::Activity, markup);
        })
    }

    /// Narrow the activity feed; re-renders from the last fetch
    pub fn set_activity_filter(&self, filter: ActivityFilter) -> String {
        let label = match filter {
            ActivityFilter::All => "Hamma",
            other => other.as_str(),
        };

        let markup = {
            let mut state = self.lock();
            state.set_activity_filter(filter);
            let markup = widgets::activity_feed(state.activity(), filter);
            state.set_markup(Section::Activity, markup.clone());
            markup
        };

        self.notifications
            .info(format!("{label} faollik ko'rsatilmoqda"));
        markup
    }

    /// Change the period of one growth chart; reloads it when its view is
    /// showing, otherwise the next visit picks the period up
    pub async fn set_growth_period(&self, slot: ChartSlot, period: GrowthPeriod) -> Outcome {
        let showing = {
            let mut state = self.lock();
            state.set_growth_period(slot, period);
            state.view().growth_slot() == Some(slot)
        };

        if !showing {
            return Outcome::Applied;
        }
        let section = match slot {
            ChartSlot::StatisticsGrowth => Section::StatisticsGrowth,
            _ => Section::UserGrowth,
        };
        self.load_growth_chart(slot, section).await
    }

    // ---- statistics page --------------------------------------------------

    pub async fn load_detailed_statistics(&self) -> Outcome {
        let (summary, _) = futures_util::join!(
            self.load_statistics_summary(),
            self.load_growth_chart(ChartSlot::StatisticsGrowth, Section::StatisticsGrowth),
        );
        summary
    }

    async fn load_statistics_summary(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(
                Section::DetailedStatistics,
                STATISTICS_LOAD_FAILED,
                self.api.statistics(),
            )
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let stats = envelope.data.unwrap_or_default();
        let markup = format!(
            "{}{}",
            widgets::stats_cards(&stats),
            widgets::status_breakdown(&stats)
        );
        self.apply(&ticket, |state| {
            state.set_statistics(stats);
            state.set_markup(Section::DetailedStatistics, markup);
        })
    }

    // ---- users ------------------------------------------------------------

    pub async fn load_users(&self, page: u32) -> Outcome {
        let query = {
            let state = self.lock();
            let input = state.users_query();
            UserListQuery {
                page,
                search: input.search.clone(),
                filter: input.filter.clone(),
            }
        };

        let (ticket, envelope) = match self
            .fetch(Section::Users, USERS_LOAD_FAILED, self.api.users(&query))
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let pagination = envelope.pagination.unwrap_or(Pagination {
            page,
            ..Default::default()
        });
        let users = envelope.data.unwrap_or_default();
        let markup = tables::users_table(&users);
        self.apply(&ticket, |state| {
            state.set_users(users);
            state.set_markup(Section::Users, markup);
            state.set_pagination(Section::Users, pagination);
        })
    }

    /// Update the search text and reload page 1 after the debounce delay
    pub fn search_users(&self, text: &str) {
        self.lock().users_query_mut().search = text.trim().to_string();

        let dashboard = self.clone();
        self.users_search.schedule(async move {
            dashboard.load_users(1).await;
        });
    }

    pub async fn filter_users(&self, filter: &str) -> Outcome {
        self.lock().users_query_mut().filter = filter.to_string();
        self.load_users(1).await
    }

    /// Set search and filter together and load `page` without debouncing
    pub async fn query_users(&self, search: &str, filter: &str, page: u32) -> Outcome {
        {
            let mut state = self.lock();
            let query = state.users_query_mut();
            query.search = search.trim().to_string();
            query.filter = filter.to_string();
        }
        self.users_search.cancel();
        self.load_users(page).await
    }

    pub fn users_pagination(&self) -> Option<PaginationControl> {
        let dashboard = self.clone();
        self.pagination_control(Section::Users, move |page| {
            let dashboard = dashboard.clone();
            Box::pin(async move {
                dashboard.load_users(page).await;
            })
        })
    }

    // ---- startups ---------------------------------------------------------

    pub async fn load_startups(&self, page: u32) -> Outcome {
        let query = {
            let state = self.lock();
            let input = state.startups_query();
            StartupListQuery {
                page,
                search: input.search.clone(),
                status: input.status.clone(),
            }
        };

        let (ticket, envelope) = match self
            .fetch(Section::Startups, STARTUPS_LOAD_FAILED, self.api.startups(&query))
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let pagination = envelope.pagination.unwrap_or(Pagination {
            page,
            ..Default::default()
        });
        let startups = envelope.data.unwrap_or_default();
        let markup = tables::startups_table(&startups);
        self.apply(&ticket, |state| {
            state.set_startups(startups);
            state.set_markup(Section::Startups, markup);
            state.set_pagination(Section::Startups, pagination);
        })
    }

    pub fn search_startups(&self, text: &str) {
        self.lock().startups_query_mut().search = text.trim().to_string();

        let dashboard = self.clone();
        self.startups_search.schedule(async move {
            dashboard.load_startups(1).await;
        });
    }

    pub async fn filter_startups(&self, status: &str) -> Outcome {
        self.lock().startups_query_mut().status = status.to_string();
        self.load_startups(1).await
    }

    pub async fn query_startups(&self, search: &str, status: &str, page: u32) -> Outcome {
        {
            let mut state = self.lock();
            let query = state.startups_query_mut();
            query.search = search.trim().to_string();
            query.status = status.to_string();
        }
        self.startups_search.cancel();
        self.load_startups(page).await
    }

    pub fn startups_pagination(&self) -> Option<PaginationControl> {
        let dashboard = self.clone();
        self.pagination_control(Section::Startups, move |page| {
            let dashboard = dashboard.clone();
            Box::pin(async move {
                dashboard.load_startups(page).await;
            })
        })
    }

    /// Page currently shown in the startups table
    pub(super) fn startups_page(&self) -> u32 {
        self.lock()
            .pagination(Section::Startups)
            .map(|p| p.page)
            .unwrap_or(1)
    }

    fn pagination_control<F>(&self, section: Section, on_page: F) -> Option<PaginationControl>
    where
        F: Fn(u32) -> futures_util::future::BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let pagination = self.lock().pagination(section)?;
        let callback: PageCallback = std::sync::Arc::new(on_page);
        Some(PaginationControl::new(
            PageWindow::new(pagination.page, pagination.total_pages),
            callback,
        ))
    }

    /// Fetch one startup and open the detail modal
    pub async fn view_startup(&self, id: &str) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(
                Section::StartupDetail,
                STARTUP_DETAIL_LOAD_FAILED,
                self.api.startup(id),
            )
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let Some(detail) = envelope.data else {
            if !self.lock().is_current(&ticket) {
                return Outcome::Stale;
            }
            self.notifications.error(STARTUP_DETAIL_LOAD_FAILED);
            return Outcome::Rejected(STARTUP_DETAIL_LOAD_FAILED.to_string());
        };

        let markup = widgets::startup_detail(&detail);
        self.apply(&ticket, |state| {
            state.set_startup_detail(detail);
            state.set_markup(Section::StartupDetail, markup);
            state.set_modal(Some(Modal::StartupDetail));
        })
    }

    pub fn close_modal(&self) {
        self.lock().set_modal(None);
    }

    // ---- admins, backups, settings ----------------------------------------

    pub async fn load_admins(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(Section::Admins, ADMINS_LOAD_FAILED, self.api.admins())
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let admins = envelope.data.unwrap_or_default();
        self.apply(&ticket, |state| {
            let own = state.session().map(|identity| identity.username.clone());
            let markup = tables::admins_table(&admins, own.as_deref());
            state.set_admins(admins);
            state.set_markup(Section::Admins, markup);
        })
    }

    pub async fn load_backups(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(Section::Backups, BACKUPS_LOAD_FAILED, self.api.backups())
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let backups = envelope.data.unwrap_or_default();
        let markup = tables::backups_list(&backups);
        self.apply(&ticket, |state| {
            state.set_backups(backups);
            state.set_markup(Section::Backups, markup);
        })
    }

    pub async fn load_settings(&self) -> Outcome {
        let (ticket, envelope) = match self
            .fetch(Section::Settings, SETTINGS_LOAD_FAILED, self.api.settings())
            .await
        {
            Ok(fetched) => fetched,
            Err(outcome) => return outcome,
        };

        let settings = envelope.data.unwrap_or_default();
        let markup = widgets::settings_form(&settings);
        self.apply(&ticket, |state| {
            state.set_settings(settings);
            state.set_markup(Section::Settings, markup);
        })
    }
}
