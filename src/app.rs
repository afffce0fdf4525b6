//! App: terminal init, main loop, held-key tracking and the per-frame tick.

use crate::breaker::{BreakIntents, Direction};
use crate::highscores::HighScores;
use crate::input::{key_to_action, Action};
use crate::player::{MoveIntents, Player};
use crate::sim::Simulation;
use crate::theme::Theme;
use crate::ui::{RowClearFx, View};
use crate::GameConfig;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Without release events a key counts as held this long after its last press or repeat.
const HOLD_WINDOW: Duration = Duration::from_millis(120);
/// Target frame time (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    GameOver,
}

/// Keys currently held down.
///
/// Terminals that report key releases end a hold on release. Others only send presses and
/// auto-repeats, so a hold lapses after [`HOLD_WINDOW`] of silence.
#[derive(Debug, Default)]
pub struct HeldKeys {
    last_seen: HashMap<Action, Instant>,
    releases_reported: bool,
}

impl HeldKeys {
    pub fn press(&mut self, action: Action, now: Instant) {
        if action.is_held() {
            self.last_seen.insert(action, now);
        }
    }

    pub fn release(&mut self, action: Action) {
        self.releases_reported = true;
        self.last_seen.remove(&action);
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }

    pub fn is_down(&self, action: Action, now: Instant) -> bool {
        self.last_seen.get(&action).is_some_and(|&t| {
            self.releases_reported || now.saturating_duration_since(t) <= HOLD_WINDOW
        })
    }

    pub fn move_intents(&self, now: Instant) -> MoveIntents {
        MoveIntents {
            left: self.is_down(Action::WalkLeft, now),
            right: self.is_down(Action::WalkRight, now),
            jump: self.is_down(Action::Jump, now),
        }
    }

    pub fn break_intents(&self, now: Instant) -> BreakIntents {
        BreakIntents {
            left: self.is_down(Action::Break(Direction::Left), now),
            right: self.is_down(Action::Break(Direction::Right), now),
            up: self.is_down(Action::Break(Direction::Up), now),
            down: self.is_down(Action::Break(Direction::Down), now),
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    sim: Simulation,
    player: Player,
    screen: Screen,
    paused: bool,
    held: HeldKeys,
    high_scores: HighScores,
    last_rank: Option<usize>,
    last_frame: Instant,
    row_fx: RowClearFx,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let sim = Simulation::new(&config);
        let player = Player::new(sim.dims());
        Self {
            config,
            theme,
            sim,
            player,
            screen: Screen::Playing,
            paused: false,
            held: HeldKeys::default(),
            high_scores: HighScores::new(),
            last_rank: None,
            last_frame: Instant::now(),
            row_fx: RowClearFx::default(),
        }
    }

    fn restart(&mut self) {
        self.sim.reset();
        self.player = Player::new(self.sim.dims());
        self.screen = Screen::Playing;
        self.paused = false;
        self.held.clear();
        self.last_rank = None;
        self.last_frame = Instant::now();
        self.row_fx.clear();
    }

    /// Player first, then the simulation sees the new footprint.
    fn tick(&mut self, dt: f32, now: Instant) {
        let moves = self.held.move_intents(now);
        let breaks = self.held.break_intents(now);
        self.player.step(dt, moves, self.sim.blocks());

        let snap = self.sim.advance(dt, breaks, self.player.footprint());
        let game_over = snap.game_over;
        let elapsed = snap.elapsed;
        if !snap.cleared_rows.is_empty() {
            self.row_fx.start(snap.cleared_rows);
        }

        if game_over {
            self.screen = Screen::GameOver;
            self.held.clear();
            self.last_rank = self.high_scores.record(elapsed);
        }
    }

    /// Handle one key; returns `false` when the app should exit.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        let action = key_to_action(key);
        match key.kind {
            KeyEventKind::Release => {
                self.held.release(action);
                return true;
            }
            KeyEventKind::Repeat => {
                self.held.press(action, now);
                return true;
            }
            KeyEventKind::Press => {}
        }

        match (self.screen, action) {
            (_, Action::Quit) => return false,
            (Screen::Playing, Action::Pause) => {
                self.paused = !self.paused;
                self.held.clear();
                // Time spent paused is not fed to the simulation.
                self.last_frame = now;
            }
            (Screen::GameOver, Action::Restart) => self.restart(),
            (Screen::Playing, a) if !self.paused => self.held.press(a, now),
            _ => {}
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
            execute,
            terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        // Release events where the terminal supports them; the hold window covers the rest.
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        );

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        log::info!(
            "starting {}x{} game, seed {:?}",
            self.config.cols,
            self.config.rows,
            self.config.seed
        );
        let result = self.run_loop(&mut terminal);

        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_frame = Instant::now();
        loop {
            let now = Instant::now();
            self.row_fx.finish_if_done();
            let view = View {
                screen: self.screen,
                paused: self.paused,
                player: self.player.footprint(),
                theme: &self.theme,
                dims: self.sim.dims(),
                freeze_duration: self.config.freeze_duration,
                break_cooldown: self.config.break_cooldown,
                high_scores: &self.high_scores,
                last_rank: self.last_rank,
            };
            let snap = self.sim.snapshot();
            let row_fx = &mut self.row_fx;
            terminal.draw(|f| crate::ui::draw(f, &view, &snap, row_fx, now))?;

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if !self.handle_key(key, Instant::now()) {
                            return Ok(());
                        }
                    }
                }
            }

            let now = Instant::now();
            let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
            self.last_frame = now;
            if self.screen == Screen::Playing && !self.paused {
                self.tick(dt.min(self.config.max_dt), now);
            }
        }
    }
}
