use std::collections::VecDeque;

use crate::classify::ZoneVerdict;
use crate::scorecard::GameEvent;

pub const MAX_LOGS: usize = 200;
pub const MAX_TAPE: usize = 400;

#[derive(Debug, Clone, Default)]
pub struct GameMeta {
    pub gamepk: Option<u64>,
    pub away: String,
    pub home: String,
    pub venue: Option<String>,
}

/// Messages from a provider thread to the UI loop. `Event` carries raw game
/// events for the aggregator; everything else is display-only.
#[derive(Debug, Clone)]
pub enum Delta {
    Meta(GameMeta),
    Event(GameEvent),
    Log(String),
    FeedEnded,
}

#[derive(Debug, Clone)]
pub struct TapeLine {
    pub missed: bool,
    pub text: String,
}

/// Display detail for the most recent pitch, whatever its outcome.
#[derive(Debug, Clone)]
pub struct LastPitch {
    pub description: String,
    pub speed_mph: Option<f64>,
    pub pitch_type: Option<String>,
    pub verdict: Option<ZoneVerdict>,
    pub px: Option<f64>,
    pub pz: Option<f64>,
}

/// UI-side state only. Game truth lives in the `Scorecard`; this holds what
/// the terminal needs to draw around it.
#[derive(Debug)]
pub struct AppState {
    pub meta: GameMeta,
    pub last_pitch: Option<LastPitch>,
    pub tape: VecDeque<TapeLine>,
    pub tape_scroll: u16,
    pub logs: VecDeque<String>,
    pub verbose: bool,
    pub help_overlay: bool,
    pub feed_ended: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            meta: GameMeta::default(),
            last_pitch: None,
            tape: VecDeque::new(),
            tape_scroll: 0,
            logs: VecDeque::new(),
            verbose: false,
            help_overlay: false,
            feed_ended: false,
        }
    }

    pub fn push_log(&mut self, line: impl Into<String>) {
        self.logs.push_back(line.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn push_tape(&mut self, line: TapeLine) {
        self.tape.push_back(line);
        while self.tape.len() > MAX_TAPE {
            self.tape.pop_front();
        }
    }

    pub fn scroll_tape_up(&mut self) {
        self.tape_scroll = self.tape_scroll.saturating_add(1);
    }

    pub fn scroll_tape_down(&mut self) {
        self.tape_scroll = self.tape_scroll.saturating_sub(1);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies display-only deltas. `Delta::Event` is the aggregator's business
/// and is routed before this is called.
pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::Meta(meta) => state.meta = meta,
        Delta::Log(line) => state.push_log(line),
        Delta::FeedEnded => {
            state.feed_ended = true;
            state.push_log("[INFO] Feed ended");
        }
        Delta::Event(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_are_capped() {
        let mut state = AppState::new();
        for i in 0..(MAX_LOGS + 50) {
            state.push_log(format!("line {i}"));
        }
        assert_eq!(state.logs.len(), MAX_LOGS);
        assert!(state.logs.back().unwrap().ends_with(&format!("{}", MAX_LOGS + 49)));
    }

    #[test]
    fn feed_ended_sets_flag_and_logs() {
        let mut state = AppState::new();
        apply_delta(&mut state, Delta::FeedEnded);
        assert!(state.feed_ended);
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn meta_delta_replaces_meta() {
        let mut state = AppState::new();
        apply_delta(
            &mut state,
            Delta::Meta(GameMeta {
                gamepk: Some(717404),
                away: "NYY".to_string(),
                home: "BOS".to_string(),
                venue: Some("Fenway Park".to_string()),
            }),
        );
        assert_eq!(state.meta.gamepk, Some(717404));
        assert_eq!(state.meta.home, "BOS");
    }
}
