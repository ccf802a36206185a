use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use keytempo::{
    scoring::CharacterStatus,
    session::{LoadState, Metrics, SessionState, TestSession},
};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const LOADING_MESSAGE: &str = "Loading paragraph...";
const ERROR_MESSAGE: &str = "Error connecting to server. Try again.";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;

        match session.state() {
            SessionState::Idle | SessionState::Running => render_typing(session, area, buf),
            SessionState::Finished => render_summary(session, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn stats_line(session: &TestSession, metrics: Metrics) -> String {
    let clock = if session.timer_config().is_countdown() {
        format!("{}s left", metrics.time_secs)
    } else {
        format!("{}s", metrics.time_secs)
    };
    format!(
        "{clock}   {} wpm   {}% acc   {} errors",
        metrics.wpm, metrics.accuracy, metrics.errors
    )
}

fn prompt_spans(session: &TestSession) -> Vec<Span<'static>> {
    let green_bold_style = bold().fg(Color::Green);
    let red_bold_style = bold().fg(Color::Red);
    let underlined_dim_bold_style = dim_bold().add_modifier(Modifier::UNDERLINED);

    let cursor = session.input().len();

    session
        .target()
        .chars()
        .iter()
        .zip(session.statuses())
        .enumerate()
        .map(|(idx, (expected, status))| match status {
            CharacterStatus::Correct => Span::styled(expected.to_string(), green_bold_style),
            // a missed space would be invisible otherwise
            CharacterStatus::Incorrect => Span::styled(
                match *expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            CharacterStatus::Untouched if idx == cursor => {
                Span::styled(expected.to_string(), underlined_dim_bold_style)
            }
            CharacterStatus::Untouched => Span::styled(expected.to_string(), dim_bold()),
        })
        .collect()
}

fn render_typing(session: &TestSession, area: Rect, buf: &mut Buffer) {
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt = session.target().to_string();
    let prompt_occupied_lines = if prompt.width() <= max_chars_per_line as usize {
        1
    } else {
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // duration
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Length(prompt_occupied_lines.max(2)),
            Constraint::Min(0),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let duration_hint = match session.state() {
        SessionState::Idle => format!("duration: < {} >", session.timer_config()),
        _ => format!("duration: {}", session.timer_config()),
    };
    Paragraph::new(Span::styled(
        duration_hint,
        Style::default().fg(Color::Cyan),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        stats_line(session, session.metrics()),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let body = match session.load_state() {
        LoadState::Unloaded | LoadState::Loading => Paragraph::new(Span::styled(
            LOADING_MESSAGE,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center),
        LoadState::Failed(reason) => Paragraph::new(vec![
            Line::from(Span::styled(ERROR_MESSAGE, bold().fg(Color::Red))),
            Line::from(Span::styled(reason.clone(), dim_bold())),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true }),
        LoadState::Ready => Paragraph::new(Line::from(prompt_spans(session)))
            .alignment(if prompt_occupied_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true }),
    };
    body.render(chunks[4], buf);

    let legend = match (session.state(), session.load_state()) {
        (SessionState::Idle, LoadState::Failed(_)) => "(tab) retry / (esc)ape",
        (SessionState::Idle, _) => "(↑/↓) duration / (tab) new paragraph / (esc)ape",
        _ => "(enter) stop / (tab) restart / (esc)ape",
    };
    Paragraph::new(Span::styled(
        legend,
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[6], buf);
}

fn render_summary(session: &TestSession, area: Rect, buf: &mut Buffer) {
    let Some(metrics) = session.summary() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // headline
            Constraint::Length(1), // details
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        format!("{} wpm   {}% acc", metrics.wpm, metrics.accuracy),
        bold().fg(Color::Magenta),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{} errors   {}s   {} chars typed",
            metrics.errors,
            session.elapsed_secs(),
            session.input().len()
        ),
        dim_bold(),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(enter/tab) new test / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}
