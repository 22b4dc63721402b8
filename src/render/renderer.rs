use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{CollisionType, GameEvent, GameState, GameStatus, Position};
use crate::metrics::GameMetrics;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw one frame. `last_end` is how the previous game finished, if any.
    pub fn render(
        &self,
        frame: &mut Frame,
        state: &GameState,
        metrics: &GameMetrics,
        last_end: Option<&GameEvent>,
    ) {
        let board_height = u16::try_from(state.board_cells).unwrap_or(u16::MAX).saturating_add(2);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),            // Header
                Constraint::Length(board_height), // Board
                Constraint::Length(3),            // Banner
                Constraint::Min(0),               // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        // The board keeps showing the last valid state after a game ends
        frame.render_widget(self.render_grid(state), chunks[1]);

        frame.render_widget(self.render_banner(state, last_end), chunks[2]);
        frame.render_widget(self.render_controls(), chunks[3]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let mut lines = Vec::with_capacity(state.board_cells);

        for y in 0..state.board_cells {
            let spans: Vec<Span> = (0..state.board_cells)
                .map(|x| cell_span(state, Position::new(x as i32, y as i32)))
                .collect();
            lines.push(Line::from(spans));
        }

        let border_color = match state.status {
            GameStatus::Running => Color::White,
            GameStatus::Idle => Color::DarkGray,
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(border_color))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.best_score.to_string(), value),
            Span::raw("    "),
            Span::styled("Steps: ", label),
            Span::styled(state.steps.to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_banner(&self, state: &GameState, last_end: Option<&GameEvent>) -> Paragraph<'_> {
        Paragraph::new(banner_lines(state, last_end)).alignment(Alignment::Center)
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("SPACE", Style::default().fg(Color::Green)),
            Span::raw(" to start | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_span(state: &GameState, pos: Position) -> Span<'static> {
    if pos == state.snake.head() {
        Span::styled(
            "■ ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
    } else if state.snake.body.contains(&pos) {
        Span::styled("□ ", Style::default().fg(Color::Green))
    } else if pos == state.food {
        Span::styled(
            "O ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(". ", Style::default().fg(Color::DarkGray))
    }
}

fn banner_lines(state: &GameState, last_end: Option<&GameEvent>) -> Vec<Line<'static>> {
    if state.is_running() {
        return vec![Line::from("")];
    }

    let key = Span::styled(
        "SPACE",
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    );
    let prompt = Style::default().fg(Color::Gray);

    let headline = match last_end {
        Some(GameEvent::GameOver { collision, score }) => {
            let cause = match collision {
                CollisionType::Wall => "hit the wall",
                CollisionType::SelfCollision => "ran into itself",
            };
            Some(Line::from(vec![
                Span::styled(
                    "GAME OVER",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!(" - snake {cause}, final score {score}"), prompt),
            ]))
        }
        Some(GameEvent::BoardFilled { score }) => Some(Line::from(vec![
            Span::styled(
                "BOARD FILLED",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" - final score {score}"), prompt),
        ])),
        _ => None,
    };

    match headline {
        Some(headline) => vec![
            headline,
            Line::from(vec![
                Span::styled("Press ", prompt),
                key,
                Span::styled(" to play again", prompt),
            ]),
        ],
        None => vec![Line::from(vec![
            Span::styled("Press ", prompt),
            key,
            Span::styled(" to start", prompt),
        ])],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};
    use ratatui::{Terminal, backend::TestBackend};

    fn idle_state() -> GameState {
        GameState::idle(
            Snake::from_segments(
                vec![Position::new(5, 5), Position::new(4, 5)],
                Direction::Right,
            )
            .unwrap(),
            Position::new(1, 1),
            15,
        )
    }

    fn draw(state: &GameState, last_end: Option<&GameEvent>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 30)).unwrap();
        let metrics = GameMetrics::new();

        terminal
            .draw(|frame| Renderer::new().render(frame, state, &metrics, last_end))
            .unwrap();

        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_idle_prompt() {
        let screen = draw(&idle_state(), None);
        assert!(screen.contains("Press SPACE to start"));
        assert!(!screen.contains("GAME OVER"));
    }

    #[test]
    fn test_game_over_banner() {
        let end = GameEvent::GameOver {
            collision: CollisionType::Wall,
            score: 4,
        };
        let screen = draw(&idle_state(), Some(&end));

        assert!(screen.contains("GAME OVER"));
        assert!(screen.contains("final score 4"));
        assert!(screen.contains("Press SPACE to play again"));
    }

    #[test]
    fn test_running_has_no_banner() {
        let mut state = idle_state();
        state.status = GameStatus::Running;

        let screen = draw(&state, None);
        assert!(!screen.contains("Press SPACE"));
        assert!(screen.contains("Score:"));
    }

    #[test]
    fn test_cell_glyphs() {
        let state = idle_state();
        assert_eq!(cell_span(&state, Position::new(5, 5)).content, "■ ");
        assert_eq!(cell_span(&state, Position::new(4, 5)).content, "□ ");
        assert_eq!(cell_span(&state, Position::new(1, 1)).content, "O ");
        assert_eq!(cell_span(&state, Position::new(0, 0)).content, ". ");
    }
}
