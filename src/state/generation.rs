//! Per-section request generations.
//!
//! Every loader takes a [`Ticket`] before it fetches. When the response
//! arrives it is applied only if no newer ticket was issued for the same
//! section in the meantime, so the latest request always wins regardless
//! of the order responses come back in.

use std::collections::HashMap;

/// Independently loaded parts of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Statistics,
    UserGrowth,
    Distribution,
    Activity,
    Users,
    Startups,
    StartupDetail,
    DetailedStatistics,
    StatisticsGrowth,
    Admins,
    Backups,
    Settings,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Statistics => "statistics",
            Section::UserGrowth => "user_growth",
            Section::Distribution => "distribution",
            Section::Activity => "activity",
            Section::Users => "users",
            Section::Startups => "startups",
            Section::StartupDetail => "startup_detail",
            Section::DetailedStatistics => "detailed_statistics",
            Section::StatisticsGrowth => "statistics_growth",
            Section::Admins => "admins",
            Section::Backups => "backups",
            Section::Settings => "settings",
        }
    }
}

/// Proof that a request was issued for `section` as generation `generation`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub section: Section,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: HashMap<Section, u64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next ticket for `section`, superseding all earlier ones
    pub fn begin(&mut self, section: Section) -> Ticket {
        let generation = self.latest.entry(section).or_insert(0);
        *generation += 1;
        Ticket {
            section,
            generation: *generation,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.section) == Some(&ticket.generation)
    }

    /// Supersede every outstanding ticket
    pub fn invalidate_all(&mut self) {
        for generation in self.latest.values_mut() {
            *generation += 1;
        }
    }
}
