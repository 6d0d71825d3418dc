use std::env;
use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use ump_terminal::classify::{CalledPitch, HAWKEYE_MARGIN_INCHES, ZoneVerdict};
use ump_terminal::error::ScorecardError;
use ump_terminal::ledger::MissedCallRecord;
use ump_terminal::scorecard::{GameEvent, Scorecard};
use ump_terminal::state::{AppState, Delta, LastPitch, TapeLine, apply_delta};
use ump_terminal::{fake_feed, feed};

struct App {
    state: AppState,
    scorecard: Scorecard,
    margin_ft: f64,
    should_quit: bool,
}

impl App {
    fn new(margin_ft: f64, verbose: bool) -> Self {
        let mut state = AppState::new();
        state.verbose = verbose;
        Self {
            state,
            scorecard: Scorecard::new("AWAY", "HOME").with_margin_ft(margin_ft),
            margin_ft,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Char('v') => {
                self.state.verbose = !self.state.verbose;
                let label = if self.state.verbose { "on" } else { "off" };
                self.state.push_log(format!("[INFO] Verbose {label}"));
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_tape_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_tape_up(),
            _ => {}
        }
    }

    fn on_delta(&mut self, delta: Delta) -> Result<(), ScorecardError> {
        match delta {
            Delta::Meta(meta) => {
                // Team identities arrive before any event; a fresh scorecard
                // here keeps the ledger keyed by real abbreviations.
                if self.scorecard.ledger.is_empty() {
                    self.scorecard = Scorecard::new(meta.away.clone(), meta.home.clone())
                        .with_margin_ft(self.margin_ft);
                }
                apply_delta(&mut self.state, Delta::Meta(meta));
            }
            Delta::Event(event) => self.on_event(&event)?,
            other => apply_delta(&mut self.state, other),
        }
        Ok(())
    }

    fn on_event(&mut self, event: &GameEvent) -> Result<(), ScorecardError> {
        let review = match self.scorecard.apply(event) {
            Ok(review) => review,
            Err(err @ ScorecardError::InvalidInput(_)) => {
                // Skip the pitch; the tracker was left untouched.
                self.state.push_log(format!("[WARN] {err}"));
                return Ok(());
            }
            Err(fatal) => return Err(fatal),
        };

        if let GameEvent::Pitch(pitch) = event {
            self.state.last_pitch = Some(LastPitch {
                description: pitch.description.clone(),
                speed_mph: pitch.speed_mph,
                pitch_type: pitch.pitch_type.clone(),
                verdict: review.map(|r| r.verdict),
                px: pitch.px,
                pz: pitch.pz,
            });
        }

        let Some(review) = review else {
            return Ok(());
        };

        if review.disagreed {
            let Some(record) = self.scorecard.ledger.records().last() else {
                return Ok(());
            };
            let text = missed_call_line(record);
            self.state.push_log(format!("[ALERT] Missed call: {text}"));
            self.state.push_tape(TapeLine { missed: true, text });
        } else if self.state.verbose {
            let text = format!(
                "{} {} | {} (verdict {}) {}-{}",
                self.scorecard.state.half.label(),
                self.scorecard.state.inning,
                review.call.label(),
                verdict_label(review.verdict),
                self.scorecard.state.balls,
                self.scorecard.state.strikes,
            );
            self.state.push_tape(TapeLine {
                missed: false,
                text,
            });
        }
        Ok(())
    }
}

fn missed_call_line(rec: &MissedCallRecord) -> String {
    let wrong = match rec.call {
        CalledPitch::Strike => "ball called strike",
        CalledPitch::Ball => "strike called ball",
    };
    let outs_word = if rec.pre.outs == 1 { "out" } else { "outs" };
    format!(
        "#{} {} {} | {} to {} | {}-{}, {} | {} {}, {} | {:+.2} {}",
        rec.seq + 1,
        rec.half.label(),
        rec.inning,
        rec.pitcher,
        rec.batter,
        rec.pre.balls,
        rec.pre.strikes,
        wrong,
        rec.pre.outs,
        outs_word,
        rec.pre.bases.describe(),
        rec.delta,
        rec.batting_team,
    )
}

fn verdict_label(verdict: ZoneVerdict) -> &'static str {
    match verdict {
        ZoneVerdict::Ball => "ball",
        ZoneVerdict::Strike => "strike",
        ZoneVerdict::Borderline => "borderline",
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let margin_ft = env::var("UMP_MARGIN_INCHES")
        .ok()
        .and_then(|val| val.parse::<f64>().ok())
        .unwrap_or(HAWKEYE_MARGIN_INCHES)
        .max(0.0)
        / 12.0;
    let verbose = env::var("UMP_VERBOSE")
        .map(|val| val == "1" || val.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let gamepk = env::var("GAMEPK").ok().and_then(|val| val.parse::<u64>().ok());
    let feed_mode = env::var("UMP_FEED").unwrap_or_else(|_| {
        if gamepk.is_some() {
            "live".to_string()
        } else {
            "fake".to_string()
        }
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    match (feed_mode.as_str(), gamepk) {
        ("live", Some(pk)) => feed::spawn_live_provider(pk, tx),
        ("live", None) => {
            let _ = tx.send(Delta::Log(
                "[WARN] UMP_FEED=live needs GAMEPK; falling back to synthetic".to_string(),
            ));
            fake_feed::spawn_fake_provider(tx);
        }
        _ => fake_feed::spawn_fake_provider(tx),
    }

    let mut app = App::new(margin_ft, verbose);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            if let Err(fatal) = app.on_delta(delta) {
                // An impossible state key means the tracker is corrupt;
                // surface it instead of limping on with bad totals.
                return Err(io::Error::other(fatal.to_string()));
            }
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(8),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(30)])
        .split(chunks[1]);

    render_scoreboard(frame, body[0], app);
    render_tape(frame, body[1], app);
    render_logs(frame, chunks[2], app);

    let footer =
        Paragraph::new("q Quit | ? Help | v Verbose | j/k Scroll tape").style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let meta = &app.state.meta;
    let gamepk = meta
        .gamepk
        .map(|pk| format!("gamePk {pk}"))
        .unwrap_or_else(|| "synthetic feed".to_string());
    let venue = meta.venue.as_deref().unwrap_or("-");
    let ended = if app.state.feed_ended { " | FINAL" } else { "" };
    format!(
        "UMP TERMINAL | {} @ {} | {} | {}{}",
        meta.away, meta.home, venue, gamepk, ended
    )
}

fn render_scoreboard(frame: &mut Frame, area: Rect, app: &App) {
    let gs = &app.scorecard.state;
    let ledger = &app.scorecard.ledger;

    let bases = gs.bases;
    let diamond_mid = format!(
        "   {}",
        if bases.second() { "[#]" } else { "[ ]" }
    );
    let diamond_low = format!(
        " {}   {}",
        if bases.third() { "[#]" } else { "[ ]" },
        if bases.first() { "[#]" } else { "[ ]" }
    );

    let outs_word = if gs.outs == 1 { "Out" } else { "Outs" };
    let mut lines = vec![
        format!("{} {}  -  {} {}", gs.away, gs.away_score, gs.home, gs.home_score),
        format!(
            "{} {} | Count {}-{} | {} {}",
            gs.half.label(),
            gs.inning,
            gs.balls,
            gs.strikes,
            gs.outs,
            outs_word
        ),
        String::new(),
        diamond_mid,
        diamond_low,
        format!(" {}", bases.describe()),
        String::new(),
        format!("On the mound: {}", or_dash(gs.pitcher())),
        String::new(),
    ];

    if let Some(last) = &app.state.last_pitch {
        lines.push("Last pitch:".to_string());
        let speed = last
            .speed_mph
            .map(|s| format!("{s:.1} mph "))
            .unwrap_or_default();
        let kind = last.pitch_type.clone().unwrap_or_default();
        lines.push(format!("  {} {}{}", last.description, speed, kind));
        if let (Some(px), Some(pz)) = (last.px, last.pz) {
            let verdict = last
                .verdict
                .map(verdict_label)
                .unwrap_or("n/a");
            lines.push(format!("  px {px:+.2} pz {pz:.2} | verdict {verdict}"));
        }
        lines.push(String::new());
    }

    lines.push(format!("Missed calls: {}", ledger.len()));
    lines.push(format!("  {} {:+.2}", gs.away, ledger.team_favor(&gs.away)));
    lines.push(format!("  {} {:+.2}", gs.home, ledger.team_favor(&gs.home)));
    for pitcher in pitchers_with_records(app) {
        lines.push(format!("  {} {:+.2}", pitcher, ledger.pitcher_favor(&pitcher)));
    }

    let block = Block::default().borders(Borders::RIGHT);
    frame.render_widget(Paragraph::new(lines.join("\n")).block(block), area);
}

/// Pitchers that appear in the ledger, in first-miss order, deduped.
fn pitchers_with_records(app: &App) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for rec in app.scorecard.ledger.records() {
        if rec.pitcher.is_empty() || out.iter().any(|p| p == &rec.pitcher) {
            continue;
        }
        out.push(rec.pitcher.clone());
    }
    out.truncate(4);
    out
}

fn render_tape(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.state.verbose {
        "Pitch tape (verbose)"
    } else {
        "Missed calls"
    };
    let block = Block::default().borders(Borders::NONE).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.state.tape.is_empty() {
        let empty = Paragraph::new("No missed calls yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let visible = inner.height as usize;
    let total = app.state.tape.len();
    let scroll = (app.state.tape_scroll as usize).min(total.saturating_sub(visible));
    // Newest at the bottom; j/k walks back through history.
    let end = total - scroll;
    let start = end.saturating_sub(visible);

    for (row, idx) in (start..end).enumerate() {
        let line = &app.state.tape[idx];
        let style = if line.missed {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let row_area = Rect {
            x: inner.x,
            y: inner.y + row as u16,
            width: inner.width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(line.text.clone()).style(style), row_area);
    }
}

fn render_logs(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::TOP).title("Log");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visible = inner.height as usize;
    let text: Vec<String> = app
        .state
        .logs
        .iter()
        .rev()
        .take(visible)
        .rev()
        .cloned()
        .collect();
    frame.render_widget(
        Paragraph::new(text.join("\n")).style(Style::default().fg(Color::DarkGray)),
        inner,
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 52.min(area.width);
    let height = 12.min(area.height);
    let popup = Rect {
        x: (area.width - width) / 2,
        y: (area.height - height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let text = "\
  q        Quit
  ?        Toggle this help
  v        Verbose tape (every reviewed pitch)
  j / k    Scroll the tape

  Env: GAMEPK, UMP_FEED=live|fake,
       UMP_MARGIN_INCHES, UMP_POLL_SECS,
       UMP_DELAY_SECS, UMP_VERBOSE";
    let block = Block::default().borders(Borders::ALL).title("Help");
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
