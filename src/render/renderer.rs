use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, GraphType, Paragraph},
};

use crate::game::{GameState, Point};
use crate::metrics::RewardCurve;

/// Draws the training dashboard: game grid on the left, reward chart on the right
pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, game: Option<&GameState>, curve: &RewardCurve) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Panels
                Constraint::Length(1), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(game, curve), chunks[0]);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        match game {
            Some(state) => frame.render_widget(self.render_grid(state), panels[0]),
            None => frame.render_widget(self.render_waiting(" Snake "), panels[0]),
        }

        if curve.is_empty() {
            frame.render_widget(self.render_waiting(" Reward "), panels[1]);
        } else {
            self.render_chart(frame, panels[1], curve);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_height);

        for y in 0..state.grid_height {
            let mut spans = Vec::with_capacity(state.grid_width);

            for x in 0..state.grid_width {
                let point = Point::new(x as i32, y as i32);

                let cell = if point == head {
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.body.contains(&point) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if point == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect, curve: &RewardCurve) {
        let rewards: Vec<(f64, f64)> = curve
            .rewards
            .iter()
            .enumerate()
            .map(|(i, &r)| (i as f64, r as f64))
            .collect();
        let mean: Vec<(f64, f64)> = curve
            .mean
            .iter()
            .enumerate()
            .map(|(i, &m)| (i as f64, m as f64))
            .collect();

        let (lo, hi) = curve.bounds().unwrap_or((0.0, 1.0));
        let (lo, hi) = if (hi - lo).abs() < f32::EPSILON {
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        };
        let x_max = curve.len().saturating_sub(1).max(1) as f64;

        let datasets = vec![
            Dataset::default()
                .name("reward")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Blue))
                .data(&rewards),
            Dataset::default()
                .name(format!("mean({})", curve.window))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Yellow))
                .data(&mean),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Episode reward "),
            )
            .x_axis(
                Axis::default()
                    .title("episode")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([0.0, x_max])
                    .labels(["0".to_string(), format!("{}", curve.len())]),
            )
            .y_axis(
                Axis::default()
                    .title("reward")
                    .style(Style::default().fg(Color::Gray))
                    .bounds([lo as f64, hi as f64])
                    .labels([format!("{:.0}", lo), format!("{:.0}", hi)]),
            );

        frame.render_widget(chart, area);
    }

    fn render_stats(&self, game: Option<&GameState>, curve: &RewardCurve) -> Paragraph<'_> {
        let (score, steps) = game.map(|s| (s.score, s.steps)).unwrap_or((0, 0));
        let mean = curve
            .latest_mean()
            .map(|m| format!("{:.2}", m))
            .unwrap_or_else(|| "-".to_string());

        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Steps: ", Style::default().fg(Color::Yellow)),
            Span::styled(steps.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Episodes: ", Style::default().fg(Color::Yellow)),
            Span::styled(curve.len().to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Mean reward: ", Style::default().fg(Color::Yellow)),
            Span::styled(mean, Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" Snake DQN training "),
        )
    }

    fn render_waiting(&self, title: &'static str) -> Paragraph<'_> {
        Paragraph::new(Line::from(Span::styled(
            "waiting for data",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw("/"),
            Span::styled("Esc", Style::default().fg(Color::Red)),
            Span::raw(" close and save | "),
            Span::styled("Ctrl-C", Style::default().fg(Color::Red)),
            Span::raw(" interrupt"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
