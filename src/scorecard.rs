use chrono::Utc;

use crate::classify::{self, CalledPitch, HAWKEYE_MARGIN_FT, ZoneVerdict};
use crate::error::ScorecardError;
use crate::game_state::{AdminEvent, GameState, PitchOutcome};
use crate::ledger::{MiscallLedger, MissedCallRecord};
use crate::run_exp::{ReContext, RunExpectancyTable};
use crate::zone::StrikeZone;

// Sanity bounds for plate-crossing coordinates, in feet. Anything outside
// is tracker garbage, not a real pitch.
const PX_SANE_FT: f64 = 5.0;
const PZ_SANE_FT: f64 = 10.0;

/// One pitch as delivered by a provider. Immutable once built. Coordinates
/// and batter height are optional because the feed sometimes drops tracking
/// data; they are only required for the two called outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchEvent {
    pub seq: u64,
    pub px: Option<f64>,
    pub pz: Option<f64>,
    pub batter_height_ft: Option<f64>,
    pub batter: String,
    pub outcome: PitchOutcome,
    pub description: String,
    pub speed_mph: Option<f64>,
    pub pitch_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Pitch(PitchEvent),
    Admin(AdminEvent),
}

/// Per-pitch output for presentation layers. `delta` is set only when the
/// pitch was scored as a miss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReview {
    pub seq: u64,
    pub verdict: ZoneVerdict,
    pub call: CalledPitch,
    pub disagreed: bool,
    pub delta: Option<f64>,
}

/// Orchestrates the core per pitch: resolve zone, classify, advance the
/// tracker with the umpire's actual call, and on a disagreement replay the
/// corrected call against the pre-pitch snapshot and difference the two
/// run-expectancy lookups into the ledger.
pub struct Scorecard {
    pub state: GameState,
    pub ledger: MiscallLedger,
    margin_ft: f64,
}

impl Scorecard {
    pub fn new(away: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            state: GameState::new(away, home),
            ledger: MiscallLedger::new(),
            margin_ft: HAWKEYE_MARGIN_FT,
        }
    }

    pub fn with_margin_ft(mut self, margin_ft: f64) -> Self {
        self.margin_ft = margin_ft.max(0.0);
        self
    }

    pub fn margin_ft(&self) -> f64 {
        self.margin_ft
    }

    /// Applies one event. Returns a review for taken (called) pitches,
    /// `None` for everything else. `InvalidInput` leaves the game state
    /// untouched so the caller can skip the pitch and keep going.
    pub fn apply(&mut self, event: &GameEvent) -> Result<Option<PitchReview>, ScorecardError> {
        match event {
            GameEvent::Admin(admin) => {
                self.state.apply_admin(admin);
                Ok(None)
            }
            GameEvent::Pitch(pitch) => match pitch.outcome.as_call() {
                Some(call) => self.review_called_pitch(pitch, call).map(Some),
                None => {
                    // Swings, fouls, balls in play, HBP: the tracker advances
                    // but there is no call to second-guess.
                    self.state.apply_pitch(&pitch.outcome);
                    Ok(None)
                }
            },
        }
    }

    fn review_called_pitch(
        &mut self,
        pitch: &PitchEvent,
        call: CalledPitch,
    ) -> Result<PitchReview, ScorecardError> {
        let (px, pz, height) = validate_tracking(pitch)?;
        let zone = StrikeZone::for_batter(height)?;
        let verdict = classify::classify(px, pz, &zone, self.margin_ft);

        // The game's real outcome follows the umpire, so the live tracker
        // always advances on the actual call. Counterfactuals replay against
        // a snapshot, never against the live state.
        let pre = self.state.clone();
        self.state.apply_pitch(&pitch.outcome);

        let disagreed = classify::disagrees(verdict, call);
        if !disagreed {
            return Ok(PitchReview {
                seq: pitch.seq,
                verdict,
                call,
                disagreed: false,
                delta: None,
            });
        }

        let mut corrected = pre.clone();
        corrected.apply_call(call.opposite());

        let (actual_ctx, re_actual) = context_value(&pre, &self.state)?;
        let (counter_ctx, re_counterfactual) = context_value(&pre, &corrected)?;
        // Positive favors the batting team: what the actual call left on the
        // table minus what the correct call would have.
        let delta = re_actual - re_counterfactual;

        let record = MissedCallRecord {
            seq: self.ledger.len(),
            inning: pre.inning,
            half: pre.half,
            batting_team: pre.batting_team().to_string(),
            pitcher: pre.pitcher().to_string(),
            batter: pitch.batter.clone(),
            call,
            verdict,
            px,
            pz,
            pre: ReContext::of(&pre),
            actual: actual_ctx,
            counterfactual: counter_ctx,
            re_actual,
            re_counterfactual,
            delta,
            at: Utc::now(),
        };
        self.ledger.record(record);

        Ok(PitchReview {
            seq: pitch.seq,
            verdict,
            call,
            disagreed: true,
            delta: Some(delta),
        })
    }
}

/// Post-transition lookup value. A transition that ended the half-inning is
/// worth 0.0 remaining runs by definition, not a table query.
fn context_value(
    pre: &GameState,
    post: &GameState,
) -> Result<(Option<ReContext>, f64), ScorecardError> {
    if post.half_inning_changed(pre) {
        return Ok((None, 0.0));
    }
    let ctx = ReContext::of(post);
    let value = RunExpectancyTable::global().lookup(&ctx)?;
    Ok((Some(ctx), value))
}

fn validate_tracking(pitch: &PitchEvent) -> Result<(f64, f64, f64), ScorecardError> {
    let px = pitch
        .px
        .ok_or_else(|| invalid(pitch, "missing horizontal crossing coordinate"))?;
    let pz = pitch
        .pz
        .ok_or_else(|| invalid(pitch, "missing vertical crossing coordinate"))?;
    let height = pitch
        .batter_height_ft
        .ok_or_else(|| invalid(pitch, "missing batter height"))?;

    if !px.is_finite() || !pz.is_finite() || px.abs() > PX_SANE_FT || !(0.0..=PZ_SANE_FT).contains(&pz)
    {
        return Err(invalid(pitch, "crossing coordinates out of range"));
    }
    Ok((px, pz, height))
}

fn invalid(pitch: &PitchEvent, what: &str) -> ScorecardError {
    ScorecardError::InvalidInput(format!("pitch {}: {what}", pitch.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::BaseState;

    fn taken(seq: u64, px: f64, pz: f64, outcome: PitchOutcome) -> GameEvent {
        GameEvent::Pitch(PitchEvent {
            seq,
            px: Some(px),
            pz: Some(pz),
            batter_height_ft: Some(6.0),
            batter: "Batter".to_string(),
            outcome,
            description: String::new(),
            speed_mph: None,
            pitch_type: None,
        })
    }

    #[test]
    fn center_pitch_called_ball_is_a_miss() {
        let mut card = Scorecard::new("NYY", "BOS");
        let review = card
            .apply(&taken(1, 0.0, 2.4, PitchOutcome::CalledBall))
            .unwrap()
            .unwrap();
        assert_eq!(review.verdict, ZoneVerdict::Strike);
        assert!(review.disagreed);
        assert_eq!(card.ledger.len(), 1);
        // Tracker followed the actual (wrong) call.
        assert_eq!(card.state.balls, 1);
    }

    #[test]
    fn correct_call_records_nothing() {
        let mut card = Scorecard::new("NYY", "BOS");
        let review = card
            .apply(&taken(1, 2.0, 1.0, PitchOutcome::CalledBall))
            .unwrap()
            .unwrap();
        assert_eq!(review.verdict, ZoneVerdict::Ball);
        assert!(!review.disagreed);
        assert!(card.ledger.is_empty());
    }

    #[test]
    fn missing_coordinates_skip_without_advancing() {
        let mut card = Scorecard::new("NYY", "BOS");
        let event = GameEvent::Pitch(PitchEvent {
            seq: 1,
            px: None,
            pz: Some(2.4),
            batter_height_ft: Some(6.0),
            batter: "Batter".to_string(),
            outcome: PitchOutcome::CalledStrike,
            description: String::new(),
            speed_mph: None,
            pitch_type: None,
        });
        let err = card.apply(&event).unwrap_err();
        assert!(matches!(err, ScorecardError::InvalidInput(_)));
        assert_eq!((card.state.balls, card.state.strikes), (0, 0));
    }

    #[test]
    fn insane_coordinates_are_invalid() {
        let mut card = Scorecard::new("NYY", "BOS");
        let err = card
            .apply(&taken(1, 40.0, 2.4, PitchOutcome::CalledBall))
            .unwrap_err();
        assert!(matches!(err, ScorecardError::InvalidInput(_)));
    }

    #[test]
    fn wrong_ball_four_delta_favors_batting_team() {
        let mut card = Scorecard::new("NYY", "BOS");
        card.state.outs = 1;
        card.state.balls = 3;
        card.state.strikes = 2;
        card.state.bases = BaseState::new(false, true, false);

        // Full count, pitch down the middle, called ball four.
        let review = card
            .apply(&taken(7, 0.0, 2.4, PitchOutcome::CalledBall))
            .unwrap()
            .unwrap();
        assert!(review.disagreed);
        let delta = review.delta.unwrap();
        assert!(delta > 0.0, "walk instead of strikeout must favor batters");

        let rec = card.ledger.records().next().unwrap();
        assert_eq!(rec.batting_team, "NYY");
        // Actual: walk put runners on first and second with 1 out.
        let actual = rec.actual.unwrap();
        assert_eq!(actual.outs, 1);
        assert!(actual.bases.first() && actual.bases.second());
        // Counterfactual: strikeout, runner holds at second, 2 outs.
        let counter = rec.counterfactual.unwrap();
        assert_eq!(counter.outs, 2);
        assert!(!counter.bases.first() && counter.bases.second());
    }

    #[test]
    fn counterfactual_third_out_is_worth_zero() {
        let mut card = Scorecard::new("NYY", "BOS");
        card.state.outs = 2;
        card.state.strikes = 2;
        // Strike three down the middle called ball: the correct call would
        // have ended the half-inning.
        let review = card
            .apply(&taken(3, 0.0, 2.4, PitchOutcome::CalledBall))
            .unwrap()
            .unwrap();
        assert!(review.disagreed);
        let rec = card.ledger.records().next().unwrap();
        assert!(rec.counterfactual.is_none());
        assert_eq!(rec.re_counterfactual, 0.0);
        assert!(rec.delta > 0.0);
    }

    #[test]
    fn swings_and_fouls_are_never_reviewed() {
        let mut card = Scorecard::new("NYY", "BOS");
        assert!(card
            .apply(&taken(1, 0.0, 2.4, PitchOutcome::SwingingStrike))
            .unwrap()
            .is_none());
        assert!(card
            .apply(&taken(2, 2.0, 1.0, PitchOutcome::Foul))
            .unwrap()
            .is_none());
        assert_eq!(card.state.strikes, 2);
        assert!(card.ledger.is_empty());
    }
}
