use std::collections::HashMap;
use std::env;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::game_state::{AdminEvent, BaseState, PitchOutcome, PlayResult};
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::scorecard::{GameEvent, PitchEvent};
use crate::state::{Delta, GameMeta};

const STATSAPI_LIVE_URL: &str = "https://statsapi.mlb.com/api/v1.1/game";

/// Resume position inside the growing allPlays array, plus the bookkeeping
/// needed to turn statsapi's post-play counts into per-play deltas. Each
/// event is delivered exactly once across polls.
#[derive(Debug, Clone, Default)]
pub struct FeedCursor {
    play: usize,
    event: usize,
    seq: u64,
    outs_before: u8,
    pitcher_vs_away: String,
    pitcher_vs_home: String,
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub meta: GameMeta,
    pub events: Vec<GameEvent>,
    pub game_over: bool,
}

pub fn spawn_live_provider(gamepk: u64, tx: Sender<Delta>) {
    thread::spawn(move || {
        let poll = Duration::from_secs(
            env::var("UMP_POLL_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(15)
                .max(5),
        );
        let delay = Duration::from_secs(
            env::var("UMP_DELAY_SECS")
                .ok()
                .and_then(|val| val.parse::<u64>().ok())
                .unwrap_or(0),
        );

        let mut cursor = FeedCursor::default();
        let mut meta_sent = false;
        // Events wait here until `delay` has passed, so the scorecard does
        // not run ahead of the TV broadcast.
        let mut pending: Vec<(Instant, Delta)> = Vec::new();

        loop {
            match fetch_live_feed(gamepk) {
                Ok(body) => match parse_live_feed(&body, &mut cursor) {
                    Ok(parsed) => {
                        if !meta_sent {
                            let _ = tx.send(Delta::Meta(parsed.meta));
                            meta_sent = true;
                        }
                        let due = Instant::now() + delay;
                        for event in parsed.events {
                            pending.push((due, Delta::Event(event)));
                        }
                        if parsed.game_over {
                            pending.push((due, Delta::FeedEnded));
                        }
                    }
                    Err(err) => {
                        let _ = tx.send(Delta::Log(format!("[WARN] Feed parse error: {err}")));
                    }
                },
                Err(err) => {
                    let _ = tx.send(Delta::Log(format!("[WARN] Live fetch error: {err}")));
                }
            }

            // Drain due events while waiting out the poll interval.
            let next_poll = Instant::now() + poll;
            loop {
                let now = Instant::now();
                let mut ended = false;
                pending.retain(|(at, delta)| {
                    if *at <= now {
                        if matches!(delta, Delta::FeedEnded) {
                            ended = true;
                        }
                        let _ = tx.send(delta.clone());
                        false
                    } else {
                        true
                    }
                });
                if ended {
                    return;
                }
                if now >= next_poll {
                    break;
                }
                thread::sleep(Duration::from_millis(250));
            }
        }
    });
}

fn fetch_live_feed(gamepk: u64) -> Result<String> {
    let client = http_client()?;
    let url = format!("{STATSAPI_LIVE_URL}/{gamepk}/feed/live");
    fetch_json_cached(client, &url).context("live feed request failed")
}

/// Parses everything past the cursor into core events and advances the
/// cursor. Safe to call repeatedly on successive snapshots of the same game.
pub fn parse_live_feed(raw: &str, cursor: &mut FeedCursor) -> Result<ParsedFeed> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid live feed json")?;

    let meta = parse_meta(&root);
    let heights = parse_player_heights(&root);
    let game_over = root
        .pointer("/gameData/status/abstractGameState")
        .and_then(|v| v.as_str())
        .map(|s| s.eq_ignore_ascii_case("Final"))
        .unwrap_or(false);

    let mut events = Vec::new();
    let empty = Vec::new();
    let plays = root
        .pointer("/liveData/plays/allPlays")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);

    for play_idx in cursor.play..plays.len() {
        let play = &plays[play_idx];
        let complete = play
            .pointer("/about/isComplete")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let is_top = play
            .pointer("/about/isTopInning")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        let batter = play
            .pointer("/matchup/batter/fullName")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let batter_height = play
            .pointer("/matchup/batter/id")
            .and_then(|v| v.as_u64())
            .and_then(|id| heights.get(&id).copied());

        maybe_pitching_change(cursor, play, is_top, &mut events);

        let play_events = play
            .pointer("/playEvents")
            .and_then(|v| v.as_array())
            .unwrap_or(&empty);
        let start = if play_idx == cursor.play { cursor.event } else { 0 };

        for (ev_idx, ev) in play_events.iter().enumerate().skip(start) {
            let is_pitch = ev
                .pointer("/isPitch")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if !is_pitch {
                if let Some(admin) = parse_admin_event(ev) {
                    events.push(GameEvent::Admin(admin));
                }
                cursor.event = ev_idx + 1;
                continue;
            }

            let code = ev
                .pointer("/details/code")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let outcome = match code {
                "B" | "*B" | "P" | "V" => Some(PitchOutcome::CalledBall),
                "C" => Some(PitchOutcome::CalledStrike),
                "S" | "W" | "Q" | "M" => Some(PitchOutcome::SwingingStrike),
                "F" | "L" | "T" | "R" | "O" => Some(PitchOutcome::Foul),
                "H" => Some(PitchOutcome::HitByPitch),
                "X" | "D" | "E" | "J" => {
                    // In play: the at-bat result only exists once the play
                    // is complete, so hold this event until then.
                    if complete {
                        Some(PitchOutcome::InPlay(parse_play_result(play, cursor.outs_before)))
                    } else {
                        break;
                    }
                }
                _ => None,
            };

            if let Some(outcome) = outcome {
                cursor.seq += 1;
                events.push(GameEvent::Pitch(parse_pitch_event(
                    ev,
                    cursor.seq,
                    &batter,
                    batter_height,
                    outcome,
                )));
            }
            cursor.event = ev_idx + 1;
        }

        if !complete {
            // The cursor stays on this play until it settles. Stop here:
            // emitting later plays now would replay them on the next poll.
            break;
        }
        let post_outs = play
            .pointer("/count/outs")
            .and_then(|v| v.as_u64())
            .unwrap_or(cursor.outs_before as u64) as u8;
        cursor.outs_before = if post_outs >= 3 { 0 } else { post_outs };
        cursor.play = play_idx + 1;
        cursor.event = 0;
    }

    Ok(ParsedFeed {
        meta,
        events,
        game_over,
    })
}

fn parse_meta(root: &Value) -> GameMeta {
    GameMeta {
        gamepk: root.pointer("/gamePk").and_then(|v| v.as_u64()),
        away: root
            .pointer("/gameData/teams/away/abbreviation")
            .and_then(|v| v.as_str())
            .unwrap_or("AWAY")
            .to_string(),
        home: root
            .pointer("/gameData/teams/home/abbreviation")
            .and_then(|v| v.as_str())
            .unwrap_or("HOME")
            .to_string(),
        venue: root
            .pointer("/gameData/venue/name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    }
}

fn parse_player_heights(root: &Value) -> HashMap<u64, f64> {
    let mut heights = HashMap::new();
    let Some(players) = root.pointer("/gameData/players").and_then(|v| v.as_object()) else {
        return heights;
    };
    for player in players.values() {
        let Some(id) = player.get("id").and_then(|v| v.as_u64()) else {
            continue;
        };
        let Some(height) = player
            .get("height")
            .and_then(|v| v.as_str())
            .and_then(parse_height_ft)
        else {
            continue;
        };
        heights.insert(id, height);
    }
    heights
}

/// Parses heights like `6' 2"` into feet.
pub fn parse_height_ft(raw: &str) -> Option<f64> {
    let (feet_part, rest) = raw.split_once('\'')?;
    let feet = feet_part.trim().parse::<f64>().ok()?;
    let inches = rest
        .trim()
        .trim_end_matches('"')
        .trim()
        .parse::<f64>()
        .unwrap_or(0.0);
    if feet <= 0.0 {
        return None;
    }
    Some(feet + inches / 12.0)
}

fn parse_pitch_event(
    ev: &Value,
    seq: u64,
    batter: &str,
    batter_height_ft: Option<f64>,
    outcome: PitchOutcome,
) -> PitchEvent {
    PitchEvent {
        seq,
        px: ev.pointer("/pitchData/coordinates/pX").and_then(|v| v.as_f64()),
        pz: ev.pointer("/pitchData/coordinates/pZ").and_then(|v| v.as_f64()),
        batter_height_ft,
        batter: batter.to_string(),
        outcome,
        description: ev
            .pointer("/details/description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        speed_mph: ev.pointer("/pitchData/startSpeed").and_then(|v| v.as_f64()),
        pitch_type: ev
            .pointer("/details/type/description")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
    }
}

fn parse_admin_event(ev: &Value) -> Option<AdminEvent> {
    let desc = ev
        .pointer("/details/description")
        .or_else(|| ev.pointer("/details/event"))
        .and_then(|v| v.as_str())?;
    let lowered = desc.to_lowercase();
    if lowered.contains("mound visit") {
        return Some(AdminEvent::MoundVisit);
    }
    if lowered.contains("pickoff") {
        // Pickoffs that retire a runner arrive as their own play with runner
        // movement; the in-between attempts are display-only.
        return Some(AdminEvent::PickoffAttempt { runner_out: None });
    }
    if lowered.contains("timeout") || lowered.contains("delay") {
        return Some(AdminEvent::Timeout);
    }
    if lowered.contains("pitching substitution") || lowered.contains("pitching change") {
        let pitcher = desc
            .split(':')
            .nth(1)
            .map(|s| {
                s.split(" replaces ")
                    .next()
                    .unwrap_or(s)
                    .trim()
                    .to_string()
            })
            .unwrap_or_default();
        return Some(AdminEvent::PitchingChange { pitcher });
    }
    None
}

/// Emits a pitching change when the matchup pitcher differs from the one
/// last seen against this batting side, covering starters and mid-inning
/// changes the admin events miss.
fn maybe_pitching_change(
    cursor: &mut FeedCursor,
    play: &Value,
    is_top: bool,
    events: &mut Vec<GameEvent>,
) {
    let Some(pitcher) = play
        .pointer("/matchup/pitcher/fullName")
        .and_then(|v| v.as_str())
    else {
        return;
    };
    let last = if is_top {
        &mut cursor.pitcher_vs_away
    } else {
        &mut cursor.pitcher_vs_home
    };
    if last != pitcher {
        *last = pitcher.to_string();
        events.push(GameEvent::Admin(AdminEvent::PitchingChange {
            pitcher: pitcher.to_string(),
        }));
    }
}

fn parse_play_result(play: &Value, outs_before: u8) -> PlayResult {
    let post_outs = play
        .pointer("/count/outs")
        .and_then(|v| v.as_u64())
        .unwrap_or(outs_before as u64) as u8;
    let outs_recorded = post_outs.saturating_sub(outs_before);

    let mut ends: HashMap<u64, Option<String>> = HashMap::new();
    let empty = Vec::new();
    let runners = play
        .pointer("/runners")
        .and_then(|v| v.as_array())
        .unwrap_or(&empty);
    // Runners can move multiple times in one play; the last movement wins.
    for runner in runners {
        let Some(id) = runner.pointer("/details/runner/id").and_then(|v| v.as_u64()) else {
            continue;
        };
        let end = runner
            .pointer("/movement/end")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        ends.insert(id, end);
    }

    let mut runs = 0u8;
    let mut first = false;
    let mut second = false;
    let mut third = false;
    for end in ends.values() {
        match end.as_deref() {
            Some("score") => runs += 1,
            Some("1B") => first = true,
            Some("2B") => second = true,
            Some("3B") => third = true,
            _ => {}
        }
    }

    PlayResult {
        outs_recorded,
        runs_scored: runs,
        bases_after: BaseState::new(first, second, third),
        description: play
            .pointer("/result/description")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn height_strings_parse_to_feet() {
        assert_eq!(parse_height_ft("6' 0\"").unwrap(), 6.0);
        let h = parse_height_ft("6' 3\"").unwrap();
        assert!((h - 6.25).abs() < 1e-12);
        assert!(parse_height_ft("tall").is_none());
        assert!(parse_height_ft("0' 4\"").is_none());
    }
}
