use std::fs;
use std::path::PathBuf;

use ump_terminal::feed::{FeedCursor, parse_live_feed};
use ump_terminal::game_state::{AdminEvent, Half, PitchOutcome};
use ump_terminal::scorecard::{GameEvent, Scorecard};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_live_feed_fixture() {
    let raw = read_fixture("feed_live.json");
    let mut cursor = FeedCursor::default();
    let parsed = parse_live_feed(&raw, &mut cursor).expect("fixture should parse");

    assert_eq!(parsed.meta.gamepk, Some(776423));
    assert_eq!(parsed.meta.away, "SEA");
    assert_eq!(parsed.meta.home, "NYY");
    assert_eq!(parsed.meta.venue.as_deref(), Some("T-Mobile Park"));
    assert!(!parsed.game_over);

    // Starter announcement, three pitches and a mound visit in play one,
    // then the lone settled pitch of the in-progress second play.
    assert_eq!(parsed.events.len(), 6);
    assert_eq!(
        parsed.events[0],
        GameEvent::Admin(AdminEvent::PitchingChange {
            pitcher: "Carlos Rodon".to_string()
        })
    );

    let GameEvent::Pitch(first) = &parsed.events[1] else {
        panic!("expected a pitch event");
    };
    assert_eq!(first.seq, 1);
    assert_eq!(first.outcome, PitchOutcome::CalledStrike);
    assert_eq!(first.batter, "Cal Raleigh");
    let height = first.batter_height_ft.expect("height should resolve");
    assert!((height - (6.0 + 2.0 / 12.0)).abs() < 1e-9);
    assert_eq!(first.px, Some(0.12));
    assert_eq!(first.speed_mph, Some(95.8));
    assert_eq!(first.pitch_type.as_deref(), Some("Four-Seam Fastball"));

    assert_eq!(parsed.events[3], GameEvent::Admin(AdminEvent::MoundVisit));

    let GameEvent::Pitch(in_play) = &parsed.events[4] else {
        panic!("expected an in-play pitch");
    };
    let PitchOutcome::InPlay(result) = &in_play.outcome else {
        panic!("expected an in-play outcome");
    };
    assert_eq!(result.outs_recorded, 1);
    assert_eq!(result.runs_scored, 0);
    assert!(!result.bases_after.first());
    assert!(result.description.contains("grounds out"));

    let GameEvent::Pitch(held_back) = &parsed.events[5] else {
        panic!("expected a pitch event");
    };
    assert_eq!(held_back.seq, 4);
    assert_eq!(held_back.outcome, PitchOutcome::CalledBall);
    assert_eq!(held_back.batter, "Julio Rodriguez");
}

#[test]
fn reparsing_the_same_snapshot_yields_nothing_new() {
    let raw = read_fixture("feed_live.json");
    let mut cursor = FeedCursor::default();
    let first = parse_live_feed(&raw, &mut cursor).expect("fixture should parse");
    assert!(!first.events.is_empty());

    // The unfinished in-play event of play two must stay held back.
    let second = parse_live_feed(&raw, &mut cursor).expect("fixture should parse");
    assert!(second.events.is_empty());
}

fn two_play_snapshot(first_complete: bool) -> String {
    serde_json::json!({
        "gamePk": 1,
        "gameData": {
            "status": { "abstractGameState": "Live" },
            "teams": {
                "away": { "abbreviation": "SEA" },
                "home": { "abbreviation": "NYY" }
            },
            "players": {}
        },
        "liveData": { "plays": { "allPlays": [
            {
                "about": { "isComplete": first_complete, "isTopInning": true },
                "count": { "outs": 0 },
                "matchup": {
                    "batter": { "id": 1, "fullName": "First Batter" },
                    "pitcher": { "id": 9, "fullName": "The Pitcher" }
                },
                "result": { "description": "Walk" },
                "runners": [],
                "playEvents": [
                    { "isPitch": true, "details": { "code": "B", "description": "Ball" } }
                ]
            },
            {
                "about": { "isComplete": true, "isTopInning": true },
                "count": { "outs": 1 },
                "matchup": {
                    "batter": { "id": 2, "fullName": "Second Batter" },
                    "pitcher": { "id": 9, "fullName": "The Pitcher" }
                },
                "result": { "description": "Strikeout" },
                "runners": [],
                "playEvents": [
                    { "isPitch": true, "details": { "code": "C", "description": "Called Strike" } }
                ]
            }
        ] } }
    })
    .to_string()
}

#[test]
fn plays_after_an_unsettled_one_wait_their_turn() {
    // A complete play showing up behind an in-progress one must not be
    // emitted until the earlier play settles, or its events would repeat
    // on every poll.
    let mut cursor = FeedCursor::default();
    let first = parse_live_feed(&two_play_snapshot(false), &mut cursor).unwrap();
    let pitches: Vec<_> = first
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::Pitch(_)))
        .collect();
    assert_eq!(pitches.len(), 1, "only the unsettled play's ball so far");

    let again = parse_live_feed(&two_play_snapshot(false), &mut cursor).unwrap();
    assert!(again.events.is_empty(), "nothing may be delivered twice");

    // The first play settles: exactly the held-back strike arrives.
    let settled = parse_live_feed(&two_play_snapshot(true), &mut cursor).unwrap();
    assert_eq!(settled.events.len(), 1);
    let GameEvent::Pitch(pitch) = &settled.events[0] else {
        panic!("expected the second play's pitch");
    };
    assert_eq!(pitch.outcome, PitchOutcome::CalledStrike);
    assert_eq!(pitch.batter, "Second Batter");

    let after = parse_live_feed(&two_play_snapshot(true), &mut cursor).unwrap();
    assert!(after.events.is_empty());
}

#[test]
fn final_status_marks_the_feed_over() {
    let raw = read_fixture("feed_live.json").replace("\"Live\"", "\"Final\"");
    let mut cursor = FeedCursor::default();
    let parsed = parse_live_feed(&raw, &mut cursor).expect("fixture should parse");
    assert!(parsed.game_over);
}

#[test]
fn fixture_events_drive_the_scorecard() {
    let raw = read_fixture("feed_live.json");
    let mut cursor = FeedCursor::default();
    let parsed = parse_live_feed(&raw, &mut cursor).expect("fixture should parse");

    let mut card = Scorecard::new(parsed.meta.away.clone(), parsed.meta.home.clone());
    for event in &parsed.events {
        card.apply(event).expect("fixture events should apply cleanly");
    }

    // Groundout in play one, then ball one to the second batter.
    assert_eq!(card.state.inning, 1);
    assert_eq!(card.state.half, Half::Top);
    assert_eq!(card.state.outs, 1);
    assert_eq!(card.state.balls, 1);
    assert_eq!(card.state.strikes, 0);
    assert_eq!(card.state.pitcher(), "Carlos Rodon");

    // The pitch at (0.02, 2.60) was well inside the zone but called a ball.
    assert_eq!(card.ledger.len(), 1);
    let miss = card.ledger.records().next().expect("one missed call");
    assert_eq!(miss.batter, "Julio Rodriguez");
    assert_eq!(miss.pitcher, "Carlos Rodon");
    assert!(miss.delta > 0.0, "a free ball favors the batting team");
    assert!(card.ledger.team_favor("SEA") > 0.0);
    assert_eq!(card.ledger.team_favor("NYY"), 0.0);
}
