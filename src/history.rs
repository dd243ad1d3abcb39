//! Analysis history and action plans, persisted through the secure store.
//!
//! Both collections are single records holding an id -> entry map, the id
//! being the millisecond timestamp of the analysis.

use crate::report::{AnalysisReport, RiskScores, SeverityCounts};
use crate::storage::{KeyValueBackend, SecureStore, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const HISTORY_KEY: &str = "techrisk_history";
pub const PLANS_KEY: &str = "techrisk_plans";
pub const DEFAULT_PROJECT: &str = "Default Project";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub data: AnalysisReport,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl HistoryEntry {
    pub fn project(&self) -> &str {
        self.project_name.as_deref().unwrap_or(DEFAULT_PROJECT)
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        self.data.severity_counts()
    }
}

/// Done/not-done flag per risk index of one report.
pub type ActionPlan = BTreeMap<usize, bool>;

type History = BTreeMap<String, HistoryEntry>;
type RawHistory = BTreeMap<String, Value>;
type Plans = BTreeMap<String, ActionPlan>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    fn of(delta: f64) -> Self {
        if delta > 0.0 {
            Trend::Up
        } else if delta < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDelta {
    pub category: &'static str,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
    pub trend: Trend,
}

/// Side-by-side view of two stored analyses, `delta = b - a`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComparison {
    pub a: HistoryEntry,
    pub b: HistoryEntry,
    pub deltas: Vec<ScoreDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub id: String,
    pub timestamp: u64,
    pub scores: RiskScores,
    pub average: i64,
}

/// Chronological health scores for one project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectTrend {
    pub project: String,
    pub points: Vec<TrendPoint>,
    /// Average of the latest point minus the one before; 0 with fewer than two.
    pub delta: i64,
}

pub struct HistoryStore<'a, B> {
    store: &'a SecureStore<B>,
}

impl<'a, B: KeyValueBackend> HistoryStore<'a, B> {
    pub fn new(store: &'a SecureStore<B>) -> Self {
        Self { store }
    }

    /// The stored collection with entries left as JSON. Writes go through
    /// this so entries this version cannot read are kept as they are.
    fn raw_history(&self) -> Result<RawHistory, StorageError> {
        Ok(self.store.get_item(HISTORY_KEY)?.unwrap_or_default())
    }

    /// Readable entries only; the rest are skipped, not dropped from storage.
    fn history(&self) -> Result<History, StorageError> {
        let mut history = History::new();
        for (id, raw) in self.raw_history()? {
            match serde_json::from_value::<HistoryEntry>(raw) {
                Ok(entry) => {
                    history.insert(id, entry);
                }
                Err(e) => log::warn!("[HISTORY] Skipping unreadable entry {}: {}", id, e),
            }
        }
        Ok(history)
    }

    fn plans(&self) -> Result<Plans, StorageError> {
        Ok(self.store.get_item(PLANS_KEY)?.unwrap_or_default())
    }

    /// Store a finished analysis and return its id.
    pub fn record(
        &self,
        report: AnalysisReport,
        project_name: Option<String>,
        now_ms: u64,
    ) -> Result<String, StorageError> {
        let mut history = self.raw_history()?;
        let mut stamp = now_ms;
        while history.contains_key(&stamp.to_string()) {
            stamp += 1;
        }
        let id = stamp.to_string();
        let entry = HistoryEntry {
            data: report,
            timestamp: now_ms,
            project_name,
        };
        history.insert(id.clone(), serde_json::to_value(entry)?);
        self.store.set_item(HISTORY_KEY, &history)?;
        log::info!("[HISTORY] Saved analysis {} ({} total)", id, history.len());
        Ok(id)
    }

    pub fn get(&self, id: &str) -> Result<Option<HistoryEntry>, StorageError> {
        Ok(self.history()?.remove(id))
    }

    /// All entries, newest first.
    pub fn entries(&self) -> Result<Vec<(String, HistoryEntry)>, StorageError> {
        let mut entries: Vec<_> = self.history()?.into_iter().collect();
        entries.sort_by(|(_, a), (_, b)| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Delete an analysis together with its action plan.
    pub fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let mut history = self.raw_history()?;
        let existed = history.remove(id).is_some();
        if existed {
            self.store.set_item(HISTORY_KEY, &history)?;
        }
        let mut plans = self.plans()?;
        if plans.remove(id).is_some() {
            self.store.set_item(PLANS_KEY, &plans)?;
        }
        Ok(existed)
    }

    /// Compare two analyses. `None` if either id is unknown.
    pub fn compare(&self, id_a: &str, id_b: &str) -> Result<Option<ScoreComparison>, StorageError> {
        let history = self.history()?;
        let (Some(a), Some(b)) = (history.get(id_a), history.get(id_b)) else {
            return Ok(None);
        };

        let deltas = RiskScores::CATEGORIES
            .iter()
            .map(|&category| {
                let before = a.data.risk_scores.get(category).unwrap_or_default();
                let after = b.data.risk_scores.get(category).unwrap_or_default();
                let delta = after - before;
                ScoreDelta {
                    category,
                    before,
                    after,
                    delta,
                    trend: Trend::of(delta),
                }
            })
            .collect();

        Ok(Some(ScoreComparison {
            a: a.clone(),
            b: b.clone(),
            deltas,
        }))
    }

    /// Score progression for `project` (`None` means the default project).
    pub fn project_trend(&self, project: Option<&str>) -> Result<ProjectTrend, StorageError> {
        let project = project.unwrap_or(DEFAULT_PROJECT);
        let mut points: Vec<TrendPoint> = self
            .history()?
            .into_iter()
            .filter(|(_, entry)| entry.project() == project)
            .map(|(id, entry)| TrendPoint {
                id,
                timestamp: entry.timestamp,
                scores: entry.data.risk_scores,
                average: entry.data.risk_scores.average(),
            })
            .collect();
        points.sort_by_key(|p| p.timestamp);

        let delta = match points.as_slice() {
            [.., previous, latest] => latest.average - previous.average,
            _ => 0,
        };

        Ok(ProjectTrend {
            project: project.to_string(),
            points,
            delta,
        })
    }

    pub fn action_plan(&self, id: &str) -> Result<ActionPlan, StorageError> {
        Ok(self.plans()?.remove(id).unwrap_or_default())
    }

    /// Flip the done flag of one recommendation and return the new state.
    pub fn toggle_action_item(&self, id: &str, index: usize) -> Result<bool, StorageError> {
        let mut plans = self.plans()?;
        let plan = plans.entry(id.to_string()).or_default();
        let done = !plan.get(&index).copied().unwrap_or(false);
        plan.insert(index, done);
        self.store.set_item(PLANS_KEY, &plans)?;
        Ok(done)
    }
}
