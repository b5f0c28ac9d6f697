use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use std::collections::HashSet;

use crate::game::{Direction, EngineSnapshot, GameStatus};

/// Label shown for each status
pub fn status_label(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Stopped => "Stopped",
        GameStatus::Running => "Running",
        GameStatus::Paused => "Paused",
        GameStatus::GameOver => "Game Over",
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "↑",
        Direction::Down => "↓",
        Direction::Left => "←",
        Direction::Right => "→",
    }
}

/// Draws an [`EngineSnapshot`] into a terminal frame
pub struct Renderer {
    caption: String,
}

impl Renderer {
    pub fn new(caption: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
        }
    }

    pub fn render(&self, frame: &mut Frame, snap: &EngineSnapshot) {
        let chunks = Layout::default()
            .direction(LayoutDirection::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Board
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(snap), chunks[0]);

        if snap.status == GameStatus::GameOver {
            frame.render_widget(self.render_game_over(snap), chunks[1]);
        } else {
            frame.render_widget(self.render_board(snap), chunks[1]);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    /// One text line per `y`, one cell per `x`
    pub fn board_lines(snap: &EngineSnapshot) -> Vec<Line<'static>> {
        let head = snap.snake.first().map(|p| p.position());
        let body: HashSet<(i32, i32)> = snap.snake.iter().map(|p| p.position()).collect();
        let fruits: HashSet<(i32, i32)> = snap.fruits.iter().map(|p| p.position()).collect();

        let board = &snap.board;

        (0..board.y_extent())
            .map(|y| {
                let spans: Vec<Span<'static>> = (0..board.x_extent())
                    .map(|x| {
                        let cell = (x, y);
                        if Some(cell) == head {
                            Span::styled(
                                "■ ",
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else if body.contains(&cell) {
                            Span::styled("□ ", Style::default().fg(Color::Cyan))
                        } else if fruits.contains(&cell) {
                            Span::styled(
                                "● ",
                                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                            )
                        } else if board.is_wall(x, y) {
                            Span::styled("▓ ", Style::default().fg(Color::Green))
                        } else {
                            Span::styled("  ", Style::default())
                        }
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }

    fn render_board(&self, snap: &EngineSnapshot) -> Paragraph<'static> {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", self.caption));

        if snap.status == GameStatus::Paused {
            block = block.title_bottom(Line::from(" PAUSED ").centered());
        }

        Paragraph::new(Self::board_lines(snap))
            .block(block)
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, snap: &EngineSnapshot) -> Paragraph<'static> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(snap.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Board: ", label),
            Span::styled(
                format!("{}x{}", snap.board.width(), snap.board.height()),
                value,
            ),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(snap.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Tick: ", label),
            Span::styled(snap.tick.to_string(), value),
            Span::raw("    "),
            Span::styled("Heading: ", label),
            Span::styled(direction_label(snap.direction), value),
            Span::raw("    "),
            Span::styled("Status: ", label),
            Span::styled(status_label(snap.status), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_game_over(&self, snap: &EngineSnapshot) -> Paragraph<'static> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "GAME OVER",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    snap.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self) -> Paragraph<'static> {
        let key = Style::default().fg(Color::Cyan);
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", key),
            Span::raw(" or "),
            Span::styled("WASD", key),
            Span::raw(" to turn | "),
            Span::styled("Space", key),
            Span::raw(" pause | "),
            Span::styled("R", key),
            Span::raw(" restart | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, Point};
    use std::sync::Arc;

    fn snapshot() -> EngineSnapshot {
        EngineSnapshot {
            board: Arc::new(Board::new(5, 6).unwrap()),
            snake: vec![Point::snake(3, 2), Point::snake(4, 2)],
            fruits: vec![Point::fruit(1, 1)],
            direction: Direction::Up,
            status: GameStatus::Running,
            score: 0,
            tick: 0,
        }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_board_lines_layout() {
        let lines = Renderer::board_lines(&snapshot());

        // y spans the width, x spans the height
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].spans.len(), 6);
        assert_eq!(line_text(&lines[0]), "▓ ▓ ▓ ▓ ▓ ▓ ");
        assert_eq!(line_text(&lines[1]), ["▓ ", "● ", "  ", "  ", "  ", "▓ "].concat());
        assert_eq!(line_text(&lines[2]), ["▓ ", "  ", "  ", "■ ", "□ ", "▓ "].concat());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(GameStatus::GameOver), "Game Over");
        assert_eq!(status_label(GameStatus::Paused), "Paused");
    }
}
