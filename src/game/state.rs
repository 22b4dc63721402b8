use serde::{Deserialize, Serialize};

use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0. Never empty.
    pub body: Vec<Position>,
    /// Direction of the last committed move
    pub direction: Direction,
}

impl Snake {
    /// A single-segment snake, as placed at the start of a game
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Build a snake from explicit segments, head first. `None` if `body` is empty.
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Some(Self { body, direction })
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// The snake after one step towards `direction`, leaving `self` untouched.
    ///
    /// The new head is prepended; the tail is kept only when growing.
    pub fn advanced(&self, direction: Direction, grow: bool) -> Snake {
        let mut body = Vec::with_capacity(self.body.len() + 1);
        body.push(self.head().moved_in_direction(direction));
        body.extend_from_slice(&self.body);

        if !grow {
            body.pop();
        }

        Snake { body, direction }
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
}

/// Whether the tick loop is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    /// Waiting for a start command; the initial state and the state after a collision
    #[default]
    Idle,
    Running,
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    /// Heading requested for the next tick
    pub pending_direction: Direction,
    pub food: Position,
    pub board_cells: usize,
    pub score: u32,
    pub steps: u32,
    pub status: GameStatus,
}

impl GameState {
    /// Create a new running game state
    pub fn new(snake: Snake, food: Position, board_cells: usize) -> Self {
        Self {
            pending_direction: snake.direction,
            snake,
            food,
            board_cells,
            score: 0,
            steps: 0,
            status: GameStatus::Running,
        }
    }

    /// Same as [`GameState::new`] but waiting for a start command
    pub fn idle(snake: Snake, food: Position, board_cells: usize) -> Self {
        Self {
            status: GameStatus::Idle,
            ..Self::new(snake, food, board_cells)
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        let limit = self.board_cells as i32;
        pos.x >= 0 && pos.x < limit && pos.y >= 0 && pos.y < limit
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.body.contains(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::Up), Position::new(5, 4));
    }

    fn three_long() -> Snake {
        Snake::from_segments(
            vec![Position::new(5, 5), Position::new(4, 5), Position::new(3, 5)],
            Direction::Right,
        )
        .unwrap()
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right);
        assert_eq!(snake.body, vec![Position::new(5, 5)]);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert!(snake.body_segments().is_empty());
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(Snake::from_segments(Vec::new(), Direction::Up).is_none());
    }

    #[test]
    fn test_advanced_leaves_snake_untouched() {
        let snake = three_long();

        let moved = snake.advanced(Direction::Right, false);
        assert_eq!(
            moved.body,
            vec![Position::new(6, 5), Position::new(5, 5), Position::new(4, 5)]
        );

        let grown = snake.advanced(Direction::Up, true);
        assert_eq!(grown.body.len(), 4);
        assert_eq!(grown.head(), Position::new(5, 4));
        assert_eq!(grown.direction, Direction::Up);
        assert_eq!(grown.body.last(), Some(&Position::new(3, 5)));

        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.direction, Direction::Right);
    }

    #[test]
    fn test_single_segment_moves() {
        let snake = Snake::new(Position::new(5, 5), Direction::Down);
        let moved = snake.advanced(Direction::Down, false);
        assert_eq!(moved.body, vec![Position::new(5, 6)]);
    }

    #[test]
    fn test_collision_detection() {
        let snake = three_long();
        assert!(!snake.collides_with_body(Position::new(5, 5))); // head
        assert!(snake.collides_with_body(Position::new(4, 5))); // body
        assert!(!snake.collides_with_body(Position::new(10, 10))); // empty
    }

    #[test]
    fn test_bounds_checking() {
        let state = GameState::new(three_long(), Position::new(10, 10), 15);

        assert!(state.is_in_bounds(Position::new(0, 0)));
        assert!(state.is_in_bounds(Position::new(14, 14)));
        assert!(!state.is_in_bounds(Position::new(-1, 0)));
        assert!(!state.is_in_bounds(Position::new(0, -1)));
        assert!(!state.is_in_bounds(Position::new(15, 0)));
        assert!(!state.is_in_bounds(Position::new(0, 15)));
    }

    #[test]
    fn test_idle_state() {
        let state = GameState::idle(
            Snake::new(Position::new(5, 5), Direction::Right),
            Position::new(1, 1),
            15,
        );
        assert_eq!(state.status, GameStatus::Idle);
        assert!(!state.is_running());
        assert_eq!(state.pending_direction, Direction::Right);
        assert!(state.is_occupied_by_snake(Position::new(5, 5)));
    }
}
