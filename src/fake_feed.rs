use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::classify::{self, ZoneVerdict};
use crate::game_state::{AdminEvent, BaseState, GameState, Half, PitchOutcome, PlayResult};
use crate::scorecard::{GameEvent, PitchEvent};
use crate::state::{Delta, GameMeta};
use crate::zone::StrikeZone;

const INNINGS: u16 = 9;
const PITCH_GAP_MS: u64 = 700;

const AWAY: &str = "ALP";
const HOME: &str = "OMG";

const BATTERS: &[&str] = &[
    "A. Stone", "R. Vega", "M. Holt", "J. Nox", "T. Vale", "K. Rook", "P. Vale", "S. Quinn",
    "L. Park",
];
const PITCHERS: &[(&str, &str)] = &[("D. Moss", "C. Hale"), ("V. Ash", "E. Pike")];

/// Plays out a full synthetic game so the terminal works with no network.
/// The provider keeps its own `GameState` mirror and advances it with the
/// exact events it emits, so play results always fit the current bases.
pub fn spawn_fake_provider(tx: Sender<Delta>) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();

        let _ = tx.send(Delta::Meta(GameMeta {
            gamepk: None,
            away: AWAY.to_string(),
            home: HOME.to_string(),
            venue: Some("Placeholder Park".to_string()),
        }));

        let mut sim = GameState::new(AWAY, HOME);
        let mut seq = 0u64;
        let mut batter_idx = 0usize;
        let mut last_half = (0u16, sim.half);

        loop {
            if sim.inning > INNINGS {
                let _ = tx.send(Delta::Log("[INFO] Synthetic game complete".to_string()));
                let _ = tx.send(Delta::FeedEnded);
                return;
            }

            // New fielding side means a new pitcher on the mound.
            if last_half != (sim.inning, sim.half) {
                last_half = (sim.inning, sim.half);
                let (starter_home, starter_away) = PITCHERS[(sim.inning as usize / 6) % 2];
                let pitcher = match sim.half {
                    Half::Top => starter_home,
                    Half::Bottom => starter_away,
                };
                let admin = AdminEvent::PitchingChange {
                    pitcher: pitcher.to_string(),
                };
                sim.apply_admin(&admin);
                let _ = tx.send(Delta::Event(GameEvent::Admin(admin)));
            } else if rng.gen_bool(0.01) {
                let admin = if rng.gen_bool(0.5) {
                    AdminEvent::MoundVisit
                } else {
                    AdminEvent::Timeout
                };
                sim.apply_admin(&admin);
                let _ = tx.send(Delta::Event(GameEvent::Admin(admin)));
                thread::sleep(Duration::from_millis(PITCH_GAP_MS));
                continue;
            }

            seq += 1;
            batter_idx = (batter_idx + 1) % BATTERS.len();
            let pitch = generate_pitch(&mut rng, &sim, seq, BATTERS[batter_idx]);
            sim.apply_pitch(&pitch.outcome);
            let _ = tx.send(Delta::Event(GameEvent::Pitch(pitch)));

            thread::sleep(Duration::from_millis(PITCH_GAP_MS));
        }
    });
}

fn generate_pitch(rng: &mut impl Rng, sim: &GameState, seq: u64, batter: &str) -> PitchEvent {
    let height = 6.0 + rng.gen_range(-0.3..0.4);
    let px = rng.gen_range(-1.4..1.4);
    let pz = rng.gen_range(0.8..4.2);

    // Heights here are always positive, so the zone always resolves; a
    // failure just degrades to an obvious ball.
    let (in_zone, near_edge) = match StrikeZone::for_batter(height) {
        Ok(zone) => (
            classify::classify(px, pz, &zone, 0.0) == ZoneVerdict::Strike,
            zone.edge_distance(px, pz) <= 0.25,
        ),
        Err(_) => (false, false),
    };

    let swing = if in_zone {
        rng.gen_bool(0.62)
    } else {
        rng.gen_bool(0.24)
    };

    let (outcome, description) = if swing {
        swing_outcome(rng, sim)
    } else {
        // Near the edge the synthetic umpire misses a fair amount; well off
        // the plate almost never.
        let miss_prob = if near_edge { 0.13 } else { 0.015 };
        let call_strike = if rng.gen_bool(miss_prob) { !in_zone } else { in_zone };
        if call_strike {
            (PitchOutcome::CalledStrike, "Called Strike")
        } else {
            (PitchOutcome::CalledBall, "Ball")
        }
    };

    PitchEvent {
        seq,
        px: Some(px),
        pz: Some(pz),
        batter_height_ft: Some(height),
        batter: batter.to_string(),
        outcome,
        description: description.to_string(),
        speed_mph: Some(rng.gen_range(84.0..99.0)),
        pitch_type: Some(
            ["Four-Seam Fastball", "Slider", "Changeup", "Curveball"]
                [rng.gen_range(0..4)]
            .to_string(),
        ),
    }
}

fn swing_outcome(rng: &mut impl Rng, sim: &GameState) -> (PitchOutcome, &'static str) {
    let roll: f64 = rng.gen_range(0.0..1.0);
    if roll < 0.42 {
        return (PitchOutcome::Foul, "Foul");
    }
    if roll < 0.70 {
        return (PitchOutcome::SwingingStrike, "Swinging Strike");
    }

    let bases = sim.bases;
    let contact: f64 = rng.gen_range(0.0..1.0);
    if contact < 0.62 {
        // Routine out; a runner on first can be doubled off.
        if bases.first() && sim.outs < 2 && rng.gen_bool(0.25) {
            let play = PlayResult {
                outs_recorded: 2,
                runs_scored: 0,
                bases_after: BaseState::new(false, bases.second(), bases.third()),
                description: "Grounded into double play".to_string(),
            };
            return (PitchOutcome::InPlay(play), "In play, out(s)");
        }
        let play = PlayResult {
            outs_recorded: 1,
            runs_scored: 0,
            bases_after: bases,
            description: "Flyout".to_string(),
        };
        (PitchOutcome::InPlay(play), "In play, out(s)")
    } else if contact < 0.85 {
        let runs = u8::from(bases.third());
        let play = PlayResult {
            outs_recorded: 0,
            runs_scored: runs,
            bases_after: BaseState::new(true, bases.first(), bases.second()),
            description: "Single".to_string(),
        };
        (PitchOutcome::InPlay(play), "In play, no out")
    } else if contact < 0.95 {
        let runs = u8::from(bases.second()) + u8::from(bases.third());
        let play = PlayResult {
            outs_recorded: 0,
            runs_scored: runs,
            bases_after: BaseState::new(false, true, bases.first()),
            description: "Double".to_string(),
        };
        (PitchOutcome::InPlay(play), "In play, no out")
    } else {
        let runs = 1 + bases.runner_count() as u8;
        let play = PlayResult {
            outs_recorded: 0,
            runs_scored: runs,
            bases_after: BaseState::EMPTY,
            description: "Home Run".to_string(),
        };
        (PitchOutcome::InPlay(play), "In play, run(s)")
    }
}
