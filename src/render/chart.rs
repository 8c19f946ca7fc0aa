//! Chart Configurations and Lifecycle
//!
//! The dashboard never draws charts itself. It builds a configuration from
//! the backend's chart data and hands it to a [`ChartHost`] (the charting
//! library). [`ChartRegistry`] owns at most one live chart per slot and
//! destroys the previous instance before installing a replacement.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::api::dto::ChartData;
use crate::theme::Theme;

/// Where a chart is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    /// Dashboard line chart
    UserGrowth,
    /// Dashboard doughnut chart
    StartupDistribution,
    /// Growth chart on the statistics page
    StatisticsGrowth,
}

impl ChartSlot {
    /// Canvas element id
    pub fn canvas_id(&self) -> &'static str {
        match self {
            ChartSlot::UserGrowth => "userGrowthChart",
            ChartSlot::StartupDistribution => "startupDistributionChart",
            ChartSlot::StatisticsGrowth => "statisticsGrowthChart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
}

/// Complete chart definition handed to the charting library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: Value,
}

/// Line chart for user growth; axis colours follow the theme
pub fn growth_chart(data: &ChartData, theme: Theme) -> ChartConfig {
    let palette = theme.palette();
    let axis = json!({
        "grid": { "color": palette.border },
        "ticks": { "color": palette.text_secondary }
    });

    ChartConfig {
        kind: ChartKind::Line,
        data: data.clone(),
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": {
                    "display": true,
                    "position": "top",
                    "labels": { "color": palette.text_primary }
                }
            },
            "scales": { "x": axis.clone(), "y": axis }
        }),
    }
}

/// Doughnut chart for the startup distribution; the legend is rendered as
/// markup next to it, so the library legend is off
pub fn distribution_chart(data: &ChartData) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: data.clone(),
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "cutout": "70%",
            "plugins": { "legend": { "display": false } }
        }),
    }
}

/// Opaque handle to a live chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// The charting collaborator
pub trait ChartHost: Send + Sync {
    fn create(&self, canvas_id: &str, config: &ChartConfig) -> ChartHandle;
    fn destroy(&self, handle: ChartHandle);
}

/// Host that keeps chart configs in memory. Used headless (CLI output,
/// tests) and as a record of what would be drawn.
#[derive(Debug, Default)]
pub struct MemoryChartHost {
    inner: Mutex<MemoryHostInner>,
}

#[derive(Debug, Default)]
struct MemoryHostInner {
    next: u64,
    live: HashMap<ChartHandle, (String, ChartConfig)>,
    destroyed: HashSet<ChartHandle>,
}

impl MemoryChartHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of charts created and not yet destroyed
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Live charts mounted on `canvas_id`
    pub fn live_on(&self, canvas_id: &str) -> Vec<ChartConfig> {
        self.lock()
            .live
            .values()
            .filter(|(id, _)| id == canvas_id)
            .map(|(_, config)| config.clone())
            .collect()
    }

    pub fn destroyed_count(&self) -> usize {
        self.lock().destroyed.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryHostInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ChartHost for MemoryChartHost {
    fn create(&self, canvas_id: &str, config: &ChartConfig) -> ChartHandle {
        let mut inner = self.lock();
        inner.next += 1;
        let handle = ChartHandle(inner.next);
        inner
            .live
            .insert(handle, (canvas_id.to_string(), config.clone()));
        handle
    }

    fn destroy(&self, handle: ChartHandle) {
        let mut inner = self.lock();
        if inner.live.remove(&handle).is_some() {
            inner.destroyed.insert(handle);
        }
    }
}

/// One live chart per slot
#[derive(Debug, Default)]
pub struct ChartRegistry {
    handles: HashMap<ChartSlot, ChartHandle>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroy whatever occupies `slot`, then create the new chart there
    pub fn install(
        &mut self,
        host: &dyn ChartHost,
        slot: ChartSlot,
        config: &ChartConfig,
    ) -> ChartHandle {
        if let Some(previous) = self.handles.remove(&slot) {
            tracing::debug!(?slot, handle = previous.0, "destroying previous chart");
            host.destroy(previous);
        }

        let handle = host.create(slot.canvas_id(), config);
        self.handles.insert(slot, handle);
        handle
    }

    /// Tear down every chart (logout)
    pub fn clear(&mut self, host: &dyn ChartHost) {
        for (_, handle) in self.handles.drain() {
            host.destroy(handle);
        }
    }

    pub fn handle(&self, slot: ChartSlot) -> Option<ChartHandle> {
        self.handles.get(&slot).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::Dataset;

    fn sample() -> ChartData {
        ChartData {
            labels: vec!["01.01".to_string(), "02.01".to_string()],
            datasets: vec![Dataset {
                label: Some("Yangi foydalanuvchilar".to_string()),
                data: vec![3.0, 5.0],
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_growth_chart_follows_theme() {
        let light = growth_chart(&sample(), Theme::Light);
        let dark = growth_chart(&sample(), Theme::Dark);

        assert_eq!(light.kind, ChartKind::Line);
        assert_eq!(light.options["scales"]["x"]["grid"]["color"], "#e0e0e0");
        assert_eq!(dark.options["plugins"]["legend"]["labels"]["color"], "#ffffff");
        assert_eq!(light.data, dark.data);
    }

    #[test]
    fn test_distribution_chart_hides_legend() {
        let config = distribution_chart(&sample());
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], "doughnut");
        assert_eq!(value["options"]["cutout"], "70%");
        assert_eq!(value["options"]["plugins"]["legend"]["display"], false);
    }

    #[test]
    fn test_install_replaces_previous_chart() {
        let host = MemoryChartHost::new();
        let mut registry = ChartRegistry::new();
        let config = distribution_chart(&sample());

        let first = registry.install(&host, ChartSlot::StartupDistribution, &config);
        let second = registry.install(&host, ChartSlot::StartupDistribution, &config);
        registry.install(&host, ChartSlot::UserGrowth, &growth_chart(&sample(), Theme::Light));

        assert_ne!(first, second);
        assert_eq!(host.live_count(), 2);
        assert_eq!(host.live_on("startupDistributionChart").len(), 1);
        assert_eq!(host.destroyed_count(), 1);
        assert_eq!(registry.handle(ChartSlot::StartupDistribution), Some(second));

        registry.clear(&host);
        assert_eq!(host.live_count(), 0);
    }
}
