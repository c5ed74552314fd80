//! Stair Climber entry point
//!
//! Native terminal front-end. Type `z`/`x` (climb/turn) and press enter; the
//! timer keeps draining in real time between lines. `--demo` lets the
//! autopilot play instead.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use stair_climber::highscores::{self, HighScores};
use stair_climber::input::InputFilter;
use stair_climber::layout::{SkyTheme, StairLayout};
use stair_climber::sim::{
    Autopilot, DecayClock, Direction, GameEvent, SessionEngine, SessionPhase, TickInput, tick,
};
use stair_climber::{Settings, Tuning};

/// Game instance holding all state
struct Game {
    engine: SessionEngine,
    clock: DecayClock,
    input: TickInput,
    filter: InputFilter,
    settings: Settings,
    tuning: Tuning,
    /// Demo runs at a fixed frame rate; interactive play only wakes on input
    frame_driven: bool,
    last_phase: SessionPhase,
}

impl Game {
    fn new(settings: Settings, tuning: Tuning, frame_driven: bool) -> Self {
        Self {
            engine: SessionEngine::with_entropy(tuning.clone(), settings.character_color),
            clock: new_clock(&tuning, frame_driven),
            input: TickInput::default(),
            filter: InputFilter::new(),
            settings,
            tuning,
            frame_driven,
            last_phase: SessionPhase::Active,
        }
    }

    /// Queue a key press (auto-repeat already filtered)
    fn key_press(&mut self, key: &str) {
        if let Some(action) = self.filter.key_down(key, false) {
            self.input.push(action);
        }
        self.filter.key_up(key);
    }

    /// Run queued input plus whatever decay ticks `dt_ms` covers
    fn update(&mut self, dt_ms: f64) {
        let ticks = self.clock.advance(dt_ms);
        tick(&mut self.engine, &self.input, ticks);

        // Clear one-shot inputs after processing
        self.input.clear_actions();

        for event in self.engine.drain_events() {
            self.play_cue(event);
        }

        let phase = self.engine.phase();
        if phase != self.last_phase {
            if phase == SessionPhase::Ended {
                self.clock.stop();
            }
            self.last_phase = phase;
        }
    }

    /// Sound is fire-and-forget; here it is just a log line
    fn play_cue(&self, event: GameEvent) {
        if self.settings.effective_volume() <= 0.0 {
            return;
        }
        let cue = match event {
            GameEvent::Climbed { .. } => "jump",
            GameEvent::Turned { .. } => "turn",
            GameEvent::Fell { .. } | GameEvent::TimedOut { .. } => "gameover",
        };
        log::debug!("sound: {cue} ({event:?})");
    }

    /// One-line HUD: score, timer bar and the next few steps
    fn hud(&self) -> String {
        let snapshot = self.engine.snapshot();
        let layout = StairLayout::from_snapshot(&snapshot);
        let filled = (snapshot.timer_fraction(self.tuning.max_time) * 20.0).round() as usize;
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(20 - filled.min(20)));
        let warn = if self.settings.effective_timer_warning()
            && snapshot.timer_critical(self.tuning.max_time)
        {
            "!"
        } else {
            " "
        };
        let steps: String = layout
            .ahead
            .iter()
            .take(6)
            .map(|t| arrow(t.dir))
            .collect();
        let sky = match layout.sky {
            SkyTheme::Day => "day",
            SkyTheme::Dusk => "dusk",
            SkyTheme::Space => "space",
        };
        format!(
            "score {:>4} [{bar}]{warn} facing {} next {steps} ({sky})",
            snapshot.score,
            arrow(snapshot.facing)
        )
    }

    /// Reset game state for restart
    fn restart(&mut self) {
        self.engine =
            SessionEngine::with_entropy(self.tuning.clone(), self.settings.character_color);
        self.clock = new_clock(&self.tuning, self.frame_driven);
        self.input = TickInput::default();
        self.filter.reset();
        self.last_phase = SessionPhase::Active;
    }
}

/// Frame-driven loops cap the per-frame backlog; input-driven loops must
/// apply the whole wait or the timer would barely move between lines
fn new_clock(tuning: &Tuning, frame_driven: bool) -> DecayClock {
    if frame_driven {
        DecayClock::new(tuning.tick_ms)
    } else {
        DecayClock::uncapped(tuning.tick_ms)
    }
}

fn arrow(dir: Direction) -> char {
    match dir {
        Direction::Left => '<',
        Direction::Right => '>',
    }
}

fn data_dir() -> PathBuf {
    std::env::var_os("STAIR_CLIMBER_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn load_tuning(path: &Path) -> Tuning {
    let Ok(json) = std::fs::read_to_string(path) else {
        return Tuning::default();
    };
    match Tuning::from_json(&json) {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path.display());
            tuning
        }
        Err(e) => {
            log::warn!("{e}; using default tuning");
            Tuning::default()
        }
    }
}

/// Hand the finished session to the leaderboard
fn record_result(game: &mut Game, scores_path: &Path) {
    let Some(result) = game.engine.take_result() else {
        return;
    };
    println!("Game over ({:?}). Final score: {}", result.cause, result.final_score);

    let mut scores = HighScores::load(scores_path);
    let name = game.settings.leaderboard_name().to_string();
    let improved = scores.is_personal_best(&name, result.final_score);
    match scores.record(&name, &result, highscores::now_ms()) {
        Some(rank) => println!("New personal best! Rank #{rank}"),
        None if improved => println!("New personal best!"),
        None => {}
    }
    if improved {
        if let Err(e) = scores.save_to(scores_path) {
            log::warn!("Failed to save high scores: {e}");
        }
    }
    let now = highscores::now_ms();
    for (i, entry) in scores.entries.iter().take(5).enumerate() {
        println!(
            "{:>2}. {:<16} {:>5}  {:<6} {}",
            i + 1,
            entry.display_name,
            entry.score,
            entry.color.as_str(),
            highscores::format_date(entry.timestamp, now)
        );
    }
}

/// Autopilot plays at a fixed press rate until it slips or the clock runs out
fn run_demo(game: &mut Game) {
    const FRAME_MS: f64 = 1000.0 / 60.0;
    const FRAMES_PER_PRESS: u32 = 5;
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    let mut pilot = Autopilot::new(0.01, Pcg32::from_rng(&mut rand::rng()));
    let mut frame = 0;
    while !game.engine.is_ended() && frame < MAX_FRAMES {
        if frame % FRAMES_PER_PRESS == 0 {
            let action = pilot.choose(game.engine.state());
            game.input.push(action);
        }
        game.update(FRAME_MS);
        if frame % 60 == 0 {
            println!("{}", game.hud());
        }
        frame += 1;
    }
}

fn run_interactive(game: &mut Game) -> io::Result<()> {
    println!("Climb: z  Turn: x  (enter to submit, q to quit)");
    println!("{}", game.hud());

    let stdin = io::stdin();
    let mut last = Instant::now();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == "q" {
            break;
        }
        // The wait happened before these keys were typed, so drain it first
        let now = Instant::now();
        game.update(now.duration_since(last).as_secs_f64() * 1000.0);
        last = now;

        for c in line.chars().filter(|c| !c.is_whitespace()) {
            game.key_press(&c.to_string());
        }
        game.update(0.0);

        println!("{}", game.hud());
        if game.engine.is_ended() {
            break;
        }
        io::stdout().flush()?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    env_logger::init();
    log::info!("Stair Climber starting...");

    let dir = data_dir();
    let settings = Settings::load(&dir.join("settings.json"));
    let tuning = load_tuning(&dir.join("tuning.json"));
    let scores_path = dir.join("highscores.json");

    let demo = std::env::args().any(|a| a == "--demo");
    let mut game = Game::new(settings, tuning, demo);

    loop {
        if demo {
            run_demo(&mut game);
        } else {
            run_interactive(&mut game)?;
        }
        record_result(&mut game, &scores_path);

        if demo || !game.engine.is_ended() {
            break;
        }
        print!("Play again? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            break;
        }
        game.restart();
    }

    Ok(())
}
