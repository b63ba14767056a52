use serde::Serialize;

use super::render::EMPTY_MESSAGE;
use crate::models::{ScheduleRecord, ScheduleStatus};

/// Count and share of one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: ScheduleStatus,
    pub label: &'static str,
    pub count: usize,
    pub percentage: f64,
}

impl StatusShare {
    /// Percentage with one decimal place, e.g. `33.3`.
    pub fn percentage_text(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

/// Aggregate over the whole collection, one share per known status in code
/// order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusStats {
    pub total: usize,
    pub shares: Vec<StatusShare>,
}

pub fn compute_stats(records: &[ScheduleRecord]) -> StatusStats {
    let total = records.len();
    let shares = ScheduleStatus::all()
        .map(|status| {
            let count = records.iter().filter(|r| r.status == status).count();
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            StatusShare {
                status,
                label: status.label(),
                count,
                percentage,
            }
        })
        .collect();

    StatusStats { total, shares }
}

impl StatusStats {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Total line first, then one line per status.
    pub fn render_text(&self) -> String {
        if self.is_empty() {
            return EMPTY_MESSAGE.to_string();
        }

        let mut out = format!("총 스케줄 수: {}개\n", self.total);
        for share in &self.shares {
            out.push_str(&format!(
                "{}: {}개 ({}%)\n",
                share.label,
                share.count,
                share.percentage_text()
            ));
        }
        out
    }
}

/// Data behind the status pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChart {
    pub labels: Vec<&'static str>,
    pub values: Vec<usize>,
    pub colors: Vec<&'static str>,
}

impl StatusChart {
    fn from_stats(stats: &StatusStats) -> Self {
        Self {
            labels: stats.shares.iter().map(|s| s.label).collect(),
            values: stats.shares.iter().map(|s| s.count).collect(),
            colors: stats.shares.iter().map(|s| s.status.color()).collect(),
        }
    }
}

/// Statistics panel. Holds at most one chart; a refresh always releases the
/// previous chart before drawing a new one.
#[derive(Debug, Default)]
pub struct StatsView {
    stats: Option<StatusStats>,
    chart: Option<StatusChart>,
}

impl StatsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the panel and returns the chart that was released, if any.
    pub fn refresh(&mut self, records: &[ScheduleRecord]) -> Option<StatusChart> {
        let released = self.chart.take();
        let stats = compute_stats(records);
        if !stats.is_empty() {
            self.chart = Some(StatusChart::from_stats(&stats));
        }
        self.stats = Some(stats);
        released
    }

    pub fn chart(&self) -> Option<&StatusChart> {
        self.chart.as_ref()
    }

    pub fn stats(&self) -> Option<&StatusStats> {
        self.stats.as_ref()
    }

    pub fn text(&self) -> String {
        self.stats
            .as_ref()
            .map(StatusStats::render_text)
            .unwrap_or_else(|| EMPTY_MESSAGE.to_string())
    }
}
