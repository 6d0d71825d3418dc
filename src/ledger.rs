use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::classify::{CalledPitch, ZoneVerdict};
use crate::game_state::Half;
use crate::run_exp::ReContext;

/// One detected miscall, frozen at detection time. `actual` / `counterfactual`
/// are the post-transition lookup contexts; `None` means that call ended the
/// half-inning, which is worth 0.0 runs by definition.
#[derive(Debug, Clone)]
pub struct MissedCallRecord {
    pub seq: usize,
    pub inning: u16,
    pub half: Half,
    pub batting_team: String,
    pub pitcher: String,
    pub batter: String,
    pub call: CalledPitch,
    pub verdict: ZoneVerdict,
    pub px: f64,
    pub pz: f64,
    pub pre: ReContext,
    pub actual: Option<ReContext>,
    pub counterfactual: Option<ReContext>,
    pub re_actual: f64,
    pub re_counterfactual: f64,
    /// Signed favored-runs delta. Positive always means the batting team was
    /// favored; the sign convention is fixed here, never at the call site.
    pub delta: f64,
    pub at: DateTime<Utc>,
}

/// Per-game accumulator of missed calls and their signed run impact, keyed
/// by team and by pitcher. Grows monotonically; a new game gets a new ledger.
#[derive(Debug, Default)]
pub struct MiscallLedger {
    records: Vec<MissedCallRecord>,
    team_favor: HashMap<String, f64>,
    pitcher_favor: HashMap<String, f64>,
}

impl MiscallLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, rec: MissedCallRecord) {
        *self.team_favor.entry(rec.batting_team.clone()).or_insert(0.0) += rec.delta;
        if !rec.pitcher.is_empty() {
            *self.pitcher_favor.entry(rec.pitcher.clone()).or_insert(0.0) += rec.delta;
        }
        self.records.push(rec);
    }

    /// Running favored-runs total for a team; 0.0 if it has no records.
    pub fn team_favor(&self, team: &str) -> f64 {
        self.team_favor.get(team).copied().unwrap_or(0.0)
    }

    pub fn pitcher_favor(&self, pitcher: &str) -> f64 {
        self.pitcher_favor.get(pitcher).copied().unwrap_or(0.0)
    }

    /// Chronological records; the iterator restarts from the top each call.
    pub fn records(&self) -> impl Iterator<Item = &MissedCallRecord> + '_ {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
