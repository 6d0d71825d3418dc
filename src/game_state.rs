use crate::classify::CalledPitch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    pub fn label(self) -> &'static str {
        match self {
            Half::Top => "Top",
            Half::Bottom => "Bot",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    First,
    Second,
    Third,
}

/// Baserunner occupancy as a fixed set over {first, second, third}. The
/// bitmask (first=1, second=2, third=4) makes the 8 configurations index
/// directly into the run-expectancy table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BaseState {
    mask: u8,
}

impl BaseState {
    pub const EMPTY: BaseState = BaseState { mask: 0 };

    pub fn new(first: bool, second: bool, third: bool) -> Self {
        let mut mask = 0u8;
        if first {
            mask |= 1;
        }
        if second {
            mask |= 2;
        }
        if third {
            mask |= 4;
        }
        Self { mask }
    }

    pub fn first(self) -> bool {
        self.mask & 1 != 0
    }

    pub fn second(self) -> bool {
        self.mask & 2 != 0
    }

    pub fn third(self) -> bool {
        self.mask & 4 != 0
    }

    pub fn occupied(self, base: Base) -> bool {
        match base {
            Base::First => self.first(),
            Base::Second => self.second(),
            Base::Third => self.third(),
        }
    }

    pub fn without(self, base: Base) -> Self {
        let bit = match base {
            Base::First => 1,
            Base::Second => 2,
            Base::Third => 4,
        };
        Self {
            mask: self.mask & !bit,
        }
    }

    pub fn index(self) -> usize {
        self.mask as usize
    }

    pub fn runner_count(self) -> u32 {
        self.mask.count_ones()
    }

    pub fn describe(self) -> &'static str {
        match self.mask {
            0 => "bases empty",
            1 => "runner on first",
            2 => "runner on second",
            3 => "runners on first and second",
            4 => "runner on third",
            5 => "runners on first and third",
            6 => "runners on second and third",
            _ => "bases loaded",
        }
    }
}

/// Terminal state of a ball put in play, as reported by the feed: how many
/// outs were recorded, how many runs scored, and where the runners ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayResult {
    pub outs_recorded: u8,
    pub runs_scored: u8,
    pub bases_after: BaseState,
    pub description: String,
}

/// Everything a single pitch can resolve to, from the tracker's point of
/// view. Only the two called outcomes are ever reviewable.
#[derive(Debug, Clone, PartialEq)]
pub enum PitchOutcome {
    CalledBall,
    CalledStrike,
    SwingingStrike,
    Foul,
    HitByPitch,
    InPlay(PlayResult),
}

impl PitchOutcome {
    pub fn as_call(&self) -> Option<CalledPitch> {
        match self {
            PitchOutcome::CalledBall => Some(CalledPitch::Ball),
            PitchOutcome::CalledStrike => Some(CalledPitch::Strike),
            _ => None,
        }
    }
}

/// Non-live-ball events. These never touch the count; a successful pickoff
/// is the only one that can record an out.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminEvent {
    MoundVisit,
    Timeout,
    PitchingChange { pitcher: String },
    PickoffAttempt { runner_out: Option<Base> },
}

/// Live per-game state, advanced exactly once per pitch or play event.
/// Between events: outs in 0..=2, balls in 0..=3, strikes in 0..=2. The
/// third out flips the half-inning instead of ever being stored.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub inning: u16,
    pub half: Half,
    pub outs: u8,
    pub balls: u8,
    pub strikes: u8,
    pub bases: BaseState,
    pub away: String,
    pub home: String,
    pub away_score: u16,
    pub home_score: u16,
    pub away_pitcher: String,
    pub home_pitcher: String,
}

impl GameState {
    pub fn new(away: impl Into<String>, home: impl Into<String>) -> Self {
        Self {
            inning: 1,
            half: Half::Top,
            outs: 0,
            balls: 0,
            strikes: 0,
            bases: BaseState::EMPTY,
            away: away.into(),
            home: home.into(),
            away_score: 0,
            home_score: 0,
            away_pitcher: String::new(),
            home_pitcher: String::new(),
        }
    }

    /// The away side bats in the top half.
    pub fn batting_team(&self) -> &str {
        match self.half {
            Half::Top => &self.away,
            Half::Bottom => &self.home,
        }
    }

    pub fn fielding_team(&self) -> &str {
        match self.half {
            Half::Top => &self.home,
            Half::Bottom => &self.away,
        }
    }

    /// The pitcher currently on the mound (the fielding side's).
    pub fn pitcher(&self) -> &str {
        match self.half {
            Half::Top => &self.home_pitcher,
            Half::Bottom => &self.away_pitcher,
        }
    }

    pub fn set_pitcher(&mut self, name: impl Into<String>) {
        match self.half {
            Half::Top => self.home_pitcher = name.into(),
            Half::Bottom => self.away_pitcher = name.into(),
        }
    }

    pub fn apply_pitch(&mut self, outcome: &PitchOutcome) {
        match outcome {
            PitchOutcome::CalledBall => self.apply_call(CalledPitch::Ball),
            PitchOutcome::CalledStrike => self.apply_call(CalledPitch::Strike),
            PitchOutcome::SwingingStrike => self.add_strike(),
            PitchOutcome::Foul => {
                // A foul never produces strike three.
                if self.strikes < 2 {
                    self.strikes += 1;
                }
            }
            PitchOutcome::HitByPitch => self.award_first(),
            PitchOutcome::InPlay(play) => self.apply_play(play),
        }
    }

    /// Shared ball/strike transition, used both by the live tracker and by
    /// counterfactual replay against a pre-pitch snapshot.
    pub fn apply_call(&mut self, call: CalledPitch) {
        match call {
            CalledPitch::Ball => {
                if self.balls == 3 {
                    self.award_first();
                } else {
                    self.balls += 1;
                }
            }
            CalledPitch::Strike => self.add_strike(),
        }
    }

    pub fn apply_admin(&mut self, event: &AdminEvent) {
        match event {
            AdminEvent::MoundVisit | AdminEvent::Timeout => {}
            AdminEvent::PitchingChange { pitcher } => self.set_pitcher(pitcher.clone()),
            AdminEvent::PickoffAttempt { runner_out } => {
                if let Some(base) = runner_out {
                    if self.bases.occupied(*base) {
                        self.bases = self.bases.without(*base);
                        self.record_out();
                    }
                }
            }
        }
    }

    fn add_strike(&mut self) {
        if self.strikes == 2 {
            // Strikeout ends the plate appearance.
            self.reset_count();
            self.record_out();
        } else {
            self.strikes += 1;
        }
    }

    /// Walk or hit-by-pitch: batter to first, runners forced only along an
    /// unbroken chain starting from first. Bases loaded forces in a run.
    fn award_first(&mut self) {
        let b = self.bases;
        let force_run = b.first() && b.second() && b.third();
        let second = b.second() || b.first();
        let third = if b.first() && b.second() { true } else { b.third() };
        self.bases = BaseState::new(true, second, third);
        if force_run {
            self.score_runs(1);
        }
        self.reset_count();
    }

    fn apply_play(&mut self, play: &PlayResult) {
        self.score_runs(play.runs_scored as u16);
        self.bases = play.bases_after;
        self.reset_count();
        for _ in 0..play.outs_recorded {
            self.record_out();
            if self.outs == 0 && self.bases == BaseState::EMPTY {
                // Half-inning already flipped; remaining outs are moot.
                break;
            }
        }
    }

    fn record_out(&mut self) {
        if self.outs == 2 {
            self.end_half_inning();
        } else {
            self.outs += 1;
        }
    }

    fn end_half_inning(&mut self) {
        self.outs = 0;
        self.bases = BaseState::EMPTY;
        self.reset_count();
        match self.half {
            Half::Top => self.half = Half::Bottom,
            Half::Bottom => {
                self.half = Half::Top;
                self.inning += 1;
            }
        }
    }

    fn reset_count(&mut self) {
        self.balls = 0;
        self.strikes = 0;
    }

    fn score_runs(&mut self, runs: u16) {
        match self.half {
            Half::Top => self.away_score += runs,
            Half::Bottom => self.home_score += runs,
        }
    }

    /// True when `self` is in a different half-inning than `since` was.
    pub fn half_inning_changed(&self, since: &GameState) -> bool {
        self.inning != since.inning || self.half != since.half
    }
}
