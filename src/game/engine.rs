use super::{
    action::Direction,
    config::{FoodPlacement, GameConfig, TailRule},
    state::{CollisionType, GameState, GameStatus, Position, Snake},
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

/// What a single tick did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The game is not running; nothing changed
    Idle,
    /// The snake moved one cell without growing
    Moved,
    /// The snake ate and grew; `food` is the freshly placed food
    Ate { food: Position },
    /// The step collided; the last valid state is kept and the game is idle
    GameOver(CollisionType),
    /// The snake covers every free cell so no food can be placed; the game is idle
    BoardFilled,
}

/// Notifications published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Started,
    FoodEaten { score: u32 },
    GameOver { collision: CollisionType, score: u32 },
    BoardFilled { score: u32 },
}

/// The Snake state machine.
///
/// Owns the game state exclusively. All mutation goes through [`start`],
/// [`request_direction`] and [`tick`].
///
/// [`start`]: GameEngine::start
/// [`request_direction`]: GameEngine::request_direction
/// [`tick`]: GameEngine::tick
pub struct GameEngine<R = StdRng> {
    config: GameConfig,
    state: GameState,
    rng: R,
    subscribers: Vec<mpsc::UnboundedSender<GameEvent>>,
}

impl GameEngine<StdRng> {
    /// Create an idle engine with an entropy-seeded RNG
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an idle engine whose food sequence is reproducible
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, mut rng: R) -> Self {
        let snake = Snake::new(config.initial_head, config.initial_direction);
        let food = Self::place_food(&config, &mut rng, &snake);
        let state = GameState::idle(snake, food, config.board_cells);

        Self {
            config,
            state,
            rng,
            subscribers: Vec::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Observable state for rendering
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> GameStatus {
        self.state.status
    }

    /// Heading the next tick will use
    pub fn direction(&self) -> Direction {
        self.state.pending_direction
    }

    /// Heading of the last committed move
    pub fn heading(&self) -> Direction {
        self.state.snake.direction
    }

    /// Receive a [`GameEvent`] for every start, meal and game end from now on
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Reset to the initial configuration and enter `Running`, whatever the
    /// current status
    pub fn start(&mut self) {
        let snake = Snake::new(self.config.initial_head, self.config.initial_direction);
        let food = Self::place_food(&self.config, &mut self.rng, &snake);
        self.state = GameState::new(snake, food, self.config.board_cells);

        debug!(
            head = ?self.config.initial_head,
            direction = ?self.config.initial_direction,
            food = ?food,
            "game started"
        );
        self.publish(GameEvent::Started);
    }

    /// Change heading for the next tick. Reversals are ignored.
    ///
    /// Requests are checked against the heading of the last committed move,
    /// so several requests between two ticks can never fold the snake back
    /// onto its neck. The latest accepted request wins.
    ///
    /// Returns whether the request was accepted.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        let heading = self.state.snake.direction;
        if heading.is_opposite(direction) {
            trace!(?heading, requested = ?direction, "reversal rejected");
            return false;
        }

        if self.state.pending_direction != direction {
            debug!(from = ?self.state.pending_direction, to = ?direction, "direction changed");
        }
        self.state.pending_direction = direction;
        true
    }

    /// Advance the game by one cell
    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running() {
            return TickOutcome::Idle;
        }

        let direction = self.state.pending_direction;
        let ate_food = self.state.snake.head().moved_in_direction(direction) == self.state.food;
        let candidate = self.state.snake.advanced(direction, ate_food);

        if let Some(collision) = self.check_collision(&candidate) {
            self.state.status = GameStatus::Idle;

            info!(
                ?collision,
                head = ?candidate.head(),
                score = self.state.score,
                steps = self.state.steps,
                "game over"
            );
            self.publish(GameEvent::GameOver {
                collision,
                score: self.state.score,
            });
            return TickOutcome::GameOver(collision);
        }

        self.state.snake = candidate;
        self.state.steps += 1;

        if !ate_food {
            return TickOutcome::Moved;
        }

        self.state.score += 1;
        self.publish(GameEvent::FoodEaten {
            score: self.state.score,
        });

        match Self::free_food_cell(&self.config, &mut self.rng, &self.state.snake) {
            Some(food) => {
                self.state.food = food;
                TickOutcome::Ate { food }
            }
            None => {
                self.state.status = GameStatus::Idle;
                info!(score = self.state.score, "board filled");
                self.publish(GameEvent::BoardFilled {
                    score: self.state.score,
                });
                TickOutcome::BoardFilled
            }
        }
    }

    /// Check if the candidate head causes a collision
    fn check_collision(&self, candidate: &Snake) -> Option<CollisionType> {
        let head = candidate.head();

        // Check wall collision
        if !self.state.is_in_bounds(head) {
            return Some(CollisionType::Wall);
        }

        // Check self-collision
        let hit_self = match self.config.tail_rule {
            TailRule::VacateFirst => candidate.collides_with_body(head),
            TailRule::CheckFirst => self.state.snake.body.contains(&head),
        };
        if hit_self {
            return Some(CollisionType::SelfCollision);
        }

        None
    }

    /// Food for a fresh game. Falls back to any cell when the snake leaves
    /// no room, which only happens on a one-cell board.
    fn place_food(config: &GameConfig, rng: &mut R, snake: &Snake) -> Position {
        Self::free_food_cell(config, rng, snake)
            .or_else(|| Self::any_cell(config, rng))
            .unwrap_or(config.initial_head)
    }

    /// Sample a food cell according to the configured placement rule
    fn free_food_cell(config: &GameConfig, rng: &mut R, snake: &Snake) -> Option<Position> {
        let food = match config.food_placement {
            FoodPlacement::Anywhere => Self::any_cell(config, rng),
            FoodPlacement::AvoidSnake => {
                let cells = config.board_cells as i32;
                let taken: HashSet<Position> = snake.body.iter().copied().collect();
                let free: Vec<Position> = (0..cells)
                    .flat_map(|y| (0..cells).map(move |x| Position::new(x, y)))
                    .filter(|pos| !taken.contains(pos))
                    .collect();
                free.choose(rng).copied()
            }
        };

        trace!(?food, placement = ?config.food_placement, "food sampled");
        food
    }

    fn any_cell(config: &GameConfig, rng: &mut R) -> Option<Position> {
        let cells = config.board_cells as i32;
        if cells <= 0 {
            return None;
        }

        let x = rng.gen_range(0..cells);
        let y = rng.gen_range(0..cells);
        Some(Position::new(x, y))
    }

    fn publish(&mut self, event: GameEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
