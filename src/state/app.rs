//! Application State
//!
//! Everything the dashboard knows between requests. Each section's data is
//! replaced wholesale by the loader that owns it; nothing is merged, so the
//! client never holds two copies of one record.

use std::collections::{HashMap, VecDeque};

use super::generation::{RequestTracker, Section, Ticket};
use crate::api::dto::{
    ActivityEntry, AdminRecord, BackupRecord, BroadcastRecord, ChartData, Identity, Pagination,
    Settings, StartupDetail, StartupRecord, Statistics, UserRecord,
};
use crate::dashboard::router::View;
use crate::render::{ActivityFilter, ChartSlot};
use crate::theme::Theme;

/// Bucket size of the user growth chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPeriod {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl GrowthPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthPeriod::Day => "day",
            GrowthPeriod::Week => "week",
            GrowthPeriod::Month => "month",
            GrowthPeriod::Year => "year",
        }
    }
}

impl std::str::FromStr for GrowthPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "day" => Ok(GrowthPeriod::Day),
            "week" => Ok(GrowthPeriod::Week),
            "month" => Ok(GrowthPeriod::Month),
            "year" => Ok(GrowthPeriod::Year),
            other => Err(format!("unknown growth period: {other}")),
        }
    }
}

/// Search box and filter select of the users page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsersQuery {
    pub search: String,
    pub filter: String,
}

impl Default for UsersQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            filter: "all".to_string(),
        }
    }
}

/// Search box and status select of the startups page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupsQuery {
    pub search: String,
    pub status: String,
}

impl Default for StartupsQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    StartupDetail,
    AddAdmin,
}

#[derive(Debug)]
pub struct AppState {
    session: Option<Identity>,
    view: View,
    theme: Theme,
    modal: Option<Modal>,
    tracker: RequestTracker,
    rendered: HashMap<Section, String>,
    pagination: HashMap<Section, Pagination>,

    statistics: Option<Statistics>,
    growth: HashMap<ChartSlot, ChartData>,
    distribution: Option<ChartData>,
    distribution_total: Option<u64>,
    activity: Vec<ActivityEntry>,
    users: Vec<UserRecord>,
    startups: Vec<StartupRecord>,
    startup_detail: Option<StartupDetail>,
    admins: Vec<AdminRecord>,
    backups: Vec<BackupRecord>,
    settings: Option<Settings>,

    users_query: UsersQuery,
    startups_query: StartupsQuery,
    default_growth_period: GrowthPeriod,
    growth_periods: HashMap<ChartSlot, GrowthPeriod>,
    activity_filter: ActivityFilter,

    broadcasts: VecDeque<BroadcastRecord>,
    broadcast_limit: usize,
}

impl AppState {
    pub fn new(growth_period: GrowthPeriod, broadcast_limit: usize) -> Self {
        Self {
            session: None,
            view: View::Login,
            theme: Theme::default(),
            modal: None,
            tracker: RequestTracker::new(),
            rendered: HashMap::new(),
            pagination: HashMap::new(),
            statistics: None,
            growth: HashMap::new(),
            distribution: None,
            distribution_total: None,
            activity: Vec::new(),
            users: Vec::new(),
            startups: Vec::new(),
            startup_detail: None,
            admins: Vec::new(),
            backups: Vec::new(),
            settings: None,
            users_query: UsersQuery::default(),
            startups_query: StartupsQuery::default(),
            default_growth_period: growth_period,
            growth_periods: HashMap::new(),
            activity_filter: ActivityFilter::default(),
            broadcasts: VecDeque::new(),
            broadcast_limit,
        }
    }

    // ---- requests -------------------------------------------------------

    pub(crate) fn begin(&mut self, section: Section) -> Ticket {
        self.tracker.begin(section)
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.tracker.is_current(ticket)
    }

    /// Apply `update` only if `ticket` is still the latest for its section
    pub(crate) fn commit(&mut self, ticket: &Ticket, update: impl FnOnce(&mut Self)) -> bool {
        if !self.tracker.is_current(ticket) {
            tracing::debug!(
                section = ticket.section.as_str(),
                generation = ticket.generation,
                "discarding stale response"
            );
            return false;
        }
        update(self);
        true
    }

    pub(crate) fn set_markup(&mut self, section: Section, markup: String) {
        self.rendered.insert(section, markup);
    }

    /// Last committed markup of a section
    pub fn markup(&self, section: Section) -> Option<&str> {
        self.rendered.get(&section).map(String::as_str)
    }

    pub(crate) fn set_pagination(&mut self, section: Section, pagination: Pagination) {
        self.pagination.insert(section, pagination);
    }

    pub fn pagination(&self, section: Section) -> Option<Pagination> {
        self.pagination.get(&section).copied()
    }

    // ---- session and navigation -----------------------------------------

    pub fn session(&self) -> Option<&Identity> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn set_session(&mut self, identity: Option<Identity>) {
        self.session = identity;
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub(crate) fn set_view(&mut self, view: View) {
        self.view = view;
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    pub(crate) fn set_modal(&mut self, modal: Option<Modal>) {
        self.modal = modal;
    }

    // ---- section data ---------------------------------------------------

    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    pub(crate) fn set_statistics(&mut self, statistics: Statistics) {
        self.statistics = Some(statistics);
    }

    /// Last growth series drawn into `slot`
    pub fn growth(&self, slot: ChartSlot) -> Option<&ChartData> {
        self.growth.get(&slot)
    }

    pub(crate) fn set_growth(&mut self, slot: ChartSlot, data: ChartData) {
        self.growth.insert(slot, data);
    }

    pub fn distribution(&self) -> Option<&ChartData> {
        self.distribution.as_ref()
    }

    /// Total shown in the middle of the doughnut
    pub fn distribution_total(&self) -> Option<u64> {
        self.distribution_total
    }

    pub(crate) fn set_distribution(&mut self, data: ChartData, total: Option<u64>) {
        self.distribution = Some(data);
        self.distribution_total = total;
    }

    pub fn activity(&self) -> &[ActivityEntry] {
        &self.activity
    }

    pub(crate) fn set_activity(&mut self, entries: Vec<ActivityEntry>) {
        self.activity = entries;
    }

    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    pub(crate) fn set_users(&mut self, users: Vec<UserRecord>) {
        self.users = users;
    }

    pub fn startups(&self) -> &[StartupRecord] {
        &self.startups
    }

    pub(crate) fn set_startups(&mut self, startups: Vec<StartupRecord>) {
        self.startups = startups;
    }

    pub fn startup_detail(&self) -> Option<&StartupDetail> {
        self.startup_detail.as_ref()
    }

    pub(crate) fn set_startup_detail(&mut self, detail: StartupDetail) {
        self.startup_detail = Some(detail);
    }

    pub fn admins(&self) -> &[AdminRecord] {
        &self.admins
    }

    pub(crate) fn set_admins(&mut self, admins: Vec<AdminRecord>) {
        self.admins = admins;
    }

    pub fn backups(&self) -> &[BackupRecord] {
        &self.backups
    }

    pub(crate) fn set_backups(&mut self, backups: Vec<BackupRecord>) {
        self.backups = backups;
    }

    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    pub(crate) fn set_settings(&mut self, settings: Settings) {
        self.settings = Some(settings);
    }

    // ---- inputs ---------------------------------------------------------

    pub fn users_query(&self) -> &UsersQuery {
        &self.users_query
    }

    pub(crate) fn users_query_mut(&mut self) -> &mut UsersQuery {
        &mut self.users_query
    }

    pub fn startups_query(&self) -> &StartupsQuery {
        &self.startups_query
    }

    pub(crate) fn startups_query_mut(&mut self) -> &mut StartupsQuery {
        &mut self.startups_query
    }

    /// Period selected for the growth chart in `slot`
    pub fn growth_period(&self, slot: ChartSlot) -> GrowthPeriod {
        self.growth_periods
            .get(&slot)
            .copied()
            .unwrap_or(self.default_growth_period)
    }

    pub(crate) fn set_growth_period(&mut self, slot: ChartSlot, period: GrowthPeriod) {
        self.growth_periods.insert(slot, period);
    }

    pub fn activity_filter(&self) -> ActivityFilter {
        self.activity_filter
    }

    pub(crate) fn set_activity_filter(&mut self, filter: ActivityFilter) {
        self.activity_filter = filter;
    }

    // ---- broadcast history ----------------------------------------------

    /// Sent broadcasts, newest first
    pub fn broadcasts(&self) -> impl Iterator<Item = &BroadcastRecord> {
        self.broadcasts.iter()
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.len()
    }

    pub(crate) fn push_broadcast(&mut self, record: BroadcastRecord) {
        self.broadcasts.push_front(record);
        self.broadcasts.truncate(self.broadcast_limit.max(1));
    }

    /// Drop everything tied to the signed-in admin
    pub(crate) fn reset_session(&mut self) {
        let growth_periods = std::mem::take(&mut self.growth_periods);
        let theme = self.theme;
        let mut tracker = std::mem::take(&mut self.tracker);
        tracker.invalidate_all();

        *self = Self::new(self.default_growth_period, self.broadcast_limit);
        self.growth_periods = growth_periods;
        self.theme = theme;
        self.tracker = tracker;
    }
}
