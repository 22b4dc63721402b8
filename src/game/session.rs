use rand::rngs::StdRng;
use rand::Rng;
use tokio::sync::mpsc;
use tracing::debug;

use super::{
    action::{Command, Direction},
    config::GameConfig,
    engine::{GameEngine, GameEvent, TickOutcome},
    scheduler::TickScheduler,
    state::GameState,
};

/// A [`GameEngine`] whose tick timer follows its lifecycle.
///
/// The timer is started whenever the game enters `Running` and stopped as soon
/// as a tick leaves it.
pub struct GameSession<R = StdRng> {
    engine: GameEngine<R>,
    scheduler: TickScheduler,
}

impl GameSession<StdRng> {
    pub fn new(config: GameConfig) -> Self {
        Self::from_engine(GameEngine::new(config))
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_engine(GameEngine::with_seed(config, seed))
    }
}

impl<R: Rng> GameSession<R> {
    pub fn from_engine(engine: GameEngine<R>) -> Self {
        let scheduler = TickScheduler::new(engine.config().tick_period());
        Self { engine, scheduler }
    }

    pub fn engine(&self) -> &GameEngine<R> {
        &self.engine
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        self.engine.subscribe()
    }

    /// Whether the tick timer is currently armed
    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_active()
    }

    pub fn start(&mut self) {
        self.engine.start();
        self.scheduler.start();
        debug!(period = ?self.scheduler.period(), "tick timer started");
    }

    pub fn request_direction(&mut self, direction: Direction) -> bool {
        self.engine.request_direction(direction)
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Turn(direction) => {
                self.request_direction(direction);
            }
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.engine.tick();

        if !self.engine.state().is_running() && self.scheduler.is_active() {
            self.scheduler.stop();
            debug!(?outcome, "tick timer stopped");
        }

        outcome
    }

    /// Wait for the next scheduled tick. Pending forever while idle.
    pub async fn wait_tick(&mut self) {
        self.scheduler.tick().await
    }
}
