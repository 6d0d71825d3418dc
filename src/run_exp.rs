use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::error::ScorecardError;
use crate::game_state::{BaseState, GameState};

static RED288_JSON: &str = include_str!("../assets/red288.json");

static TABLE: Lazy<RunExpectancyTable> = Lazy::new(|| {
    RunExpectancyTable::from_json(RED288_JSON).expect("embedded red288 asset parses")
});

/// Lookup key into the table: the full count/outs/baserunner context of a
/// half-inning in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReContext {
    pub outs: u8,
    pub bases: BaseState,
    pub balls: u8,
    pub strikes: u8,
}

impl ReContext {
    pub fn of(state: &GameState) -> Self {
        Self {
            outs: state.outs,
            bases: state.bases,
            balls: state.balls,
            strikes: state.strikes,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Red288Row {
    balls: u8,
    strikes: u8,
    outs: u8,
    first: bool,
    second: bool,
    third: bool,
    expected_runs: f64,
}

/// Expected runs scored in the remainder of a half-inning, keyed by
/// (outs, base configuration, balls, strikes). 3 x 8 x 4 x 3 = 288 states,
/// precomputed from historical play outcomes. Loaded once per process and
/// read-only afterwards, so it is freely shared across threads.
pub struct RunExpectancyTable {
    values: [[[[f64; 3]; 4]; 8]; 3],
}

impl RunExpectancyTable {
    pub fn global() -> &'static RunExpectancyTable {
        &TABLE
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let rows: Vec<Red288Row> =
            serde_json::from_str(raw).context("invalid red288 json")?;
        if rows.len() != 288 {
            bail!("expected 288 run-expectancy rows, got {}", rows.len());
        }

        let mut values = [[[[f64::NAN; 3]; 4]; 8]; 3];
        for row in &rows {
            if row.outs > 2 || row.balls > 3 || row.strikes > 2 {
                bail!(
                    "run-expectancy row out of range: outs={} balls={} strikes={}",
                    row.outs,
                    row.balls,
                    row.strikes
                );
            }
            let bases = BaseState::new(row.first, row.second, row.third);
            values[row.outs as usize][bases.index()][row.balls as usize]
                [row.strikes as usize] = row.expected_runs;
        }

        for outs in 0..3 {
            for bases in 0..8 {
                for balls in 0..4 {
                    for strikes in 0..3 {
                        let v = values[outs][bases][balls][strikes];
                        if !v.is_finite() || v < 0.0 {
                            bail!(
                                "missing or negative run-expectancy entry at \
                                 outs={outs} bases={bases} balls={balls} strikes={strikes}"
                            );
                        }
                    }
                }
            }
        }

        Ok(Self { values })
    }

    pub fn lookup(&self, ctx: &ReContext) -> Result<f64, ScorecardError> {
        if ctx.outs > 2 || ctx.balls > 3 || ctx.strikes > 2 {
            return Err(ScorecardError::OutOfRange {
                outs: ctx.outs,
                bases: ctx.bases.index() as u8,
                balls: ctx.balls,
                strikes: ctx.strikes,
            });
        }
        Ok(self.values[ctx.outs as usize][ctx.bases.index()][ctx.balls as usize]
            [ctx.strikes as usize])
    }
}
