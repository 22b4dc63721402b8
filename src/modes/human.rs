use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, trace};

use crate::game::{GameConfig, GameEvent, GameSession};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Interactive play in the terminal
pub struct HumanMode {
    session: GameSession,
    events: mpsc::UnboundedReceiver<GameEvent>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    last_end: Option<GameEvent>,
}

impl HumanMode {
    /// The game waits for a start key; `seed` fixes the food sequence
    pub fn new(config: GameConfig, seed: Option<u64>) -> Self {
        let mut session = match seed {
            Some(seed) => GameSession::with_seed(config, seed),
            None => GameSession::new(config),
        };
        let events = session.subscribe();

        Self {
            session,
            events,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            last_end: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        info!(
            board_cells = self.session.engine().config().board_cells,
            tick_period_ms = self.session.engine().config().tick_period_ms,
            "waiting for start"
        );

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(err)) => return Err(err).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                // Game logic tick; only armed while a game is running
                _ = self.session.wait_tick() => {
                    let outcome = self.session.tick();
                    trace!(?outcome, "tick");
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(
                            frame,
                            self.session.state(),
                            &self.metrics,
                            self.last_end.as_ref(),
                        );
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            self.drain_events();

            if self.should_quit {
                debug!("quit requested");
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Game(command) => self.session.apply(command),
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }
    }

    /// Apply every pending engine notification to the metrics and banner
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                GameEvent::Started => {
                    self.metrics.on_game_start();
                    self.last_end = None;
                }
                GameEvent::FoodEaten { score } => {
                    trace!(score, "food eaten");
                }
                GameEvent::GameOver { score, .. } | GameEvent::BoardFilled { score } => {
                    self.metrics.on_game_over(score);
                    self.last_end = Some(event);
                }
            }
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{CollisionType, GameStatus, Position};
    use crossterm::event::{KeyCode, KeyEvent, KeyEventState, KeyModifiers};

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn edge_config() -> GameConfig {
        GameConfig {
            initial_head: Position::new(14, 7),
            ..Default::default()
        }
    }

    #[test]
    fn test_game_initialization() {
        let mode = HumanMode::new(GameConfig::default(), Some(1));
        assert_eq!(mode.session.state().status, GameStatus::Idle);
        assert!(!mode.session.is_ticking());
        assert!(mode.last_end.is_none());
    }

    #[tokio::test]
    async fn test_start_key_starts_game() {
        let mut mode = HumanMode::new(GameConfig::default(), Some(1));

        mode.handle_event(key(KeyCode::Char(' ')));
        mode.drain_events();

        assert_eq!(mode.session.state().status, GameStatus::Running);
        assert!(mode.session.is_ticking());
    }

    #[tokio::test]
    async fn test_key_release_ignored() {
        let mut mode = HumanMode::new(GameConfig::default(), Some(1));

        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        mode.handle_event(Event::Key(release));

        assert_eq!(mode.session.state().status, GameStatus::Idle);
    }

    #[tokio::test]
    async fn test_game_over_updates_metrics() {
        let mut mode = HumanMode::new(edge_config(), Some(1));

        mode.handle_event(key(KeyCode::Enter));
        mode.session.tick();
        mode.drain_events();

        assert_eq!(mode.metrics.games_played, 1);
        assert_eq!(
            mode.last_end,
            Some(GameEvent::GameOver {
                collision: CollisionType::Wall,
                score: 0
            })
        );
        assert!(!mode.session.is_ticking());

        // Restart clears the banner
        mode.handle_event(key(KeyCode::Char('r')));
        mode.drain_events();
        assert!(mode.last_end.is_none());
        assert!(mode.session.is_ticking());
    }

    #[tokio::test]
    async fn test_turn_and_quit_keys() {
        let mut mode = HumanMode::new(edge_config(), Some(1));
        mode.handle_event(key(KeyCode::Char(' ')));

        mode.handle_event(key(KeyCode::Up));
        mode.session.tick();
        assert_eq!(mode.session.state().snake.head(), Position::new(14, 6));

        mode.handle_event(key(KeyCode::Char('q')));
        assert!(mode.should_quit);
    }
}
