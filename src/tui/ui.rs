//! UI rendering for the TUI.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::features::focus::{ControllerState, SettlementOutcome, TimerMode};
use crate::tui::app::App;

/// Render the application UI.
pub fn render(frame: &mut Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Modes
            Constraint::Min(5),    // Timer
            Constraint::Length(3), // Progress
            Constraint::Length(4), // Rewards
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_modes(frame, app, chunks[0]);
    render_timer(frame, app, chunks[1]);
    render_progress(frame, app, chunks[2]);
    render_rewards(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);
}

fn mode_color(mode: TimerMode) -> Color {
    match mode {
        TimerMode::Focus => Color::Red,
        TimerMode::ShortBreak => Color::Green,
        TimerMode::LongBreak => Color::Blue,
    }
}

fn render_modes(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let current = app.controller.mode();
    let mut spans = Vec::new();

    for (i, mode) in TimerMode::ALL.iter().enumerate() {
        let label = format!(" {} {} ", i + 1, mode.display_name());
        let style = if *mode == current {
            Style::default()
                .fg(Color::Black)
                .bg(mode_color(*mode))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("  "));
    }

    let modes = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" poncik ")
                .border_style(Style::default().fg(Color::Cyan)),
        );

    frame.render_widget(modes, area);
}

fn render_timer(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let controller = &app.controller;
    let color = mode_color(controller.mode());

    let state_line = match (controller.state(), controller.offer()) {
        (ControllerState::Settling, Some(offer)) if offer.is_ready() => {
            Line::styled("Double credits ready", Style::default().fg(Color::Yellow))
        }
        (ControllerState::Settling, Some(offer)) => Line::styled(
            format!("Double credits in {}s", offer.remaining_secs()),
            Style::default().fg(Color::DarkGray),
        ),
        (state, _) => Line::styled(state.to_string(), Style::default().fg(Color::DarkGray)),
    };

    let lines = vec![
        Line::from(""),
        Line::styled(
            controller.countdown().format_remaining(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        state_line,
    ];

    let timer = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(timer, area);
}

fn render_progress(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let countdown = app.controller.countdown();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(mode_color(app.controller.mode())))
        .ratio(countdown.progress().clamp(0.0, 1.0));

    frame.render_widget(gauge, area);
}

fn render_rewards(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut lines = Vec::new();

    if let Some(user) = app.controller.user() {
        lines.push(Line::from(vec![
            Span::styled(format!("Lv {}", user.level), Style::default().fg(Color::Magenta)),
            Span::raw(format!("  {} credits  {} XP", user.credits, user.xp)),
        ]));
    }

    match &app.last_outcome {
        Some(SettlementOutcome::Settled(report)) => lines.push(Line::styled(
            format!(
                "Last session: {} min, +{} credits",
                report.request.elapsed_minutes, report.result.credits_earned
            ),
            Style::default().fg(Color::Green),
        )),
        Some(SettlementOutcome::Failed { .. }) => lines.push(Line::styled(
            "Last session was not settled",
            Style::default().fg(Color::Red),
        )),
        None => {}
    }

    if !app.new_bonuses.is_empty() {
        let names = app
            .new_bonuses
            .iter()
            .map(|b| format!("{} {}", b.emoji(), b.name()))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::styled(names, Style::default().fg(Color::Yellow)));
    }

    let rewards = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
    frame.render_widget(rewards, area);
}

fn render_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let hints = match app.controller.state() {
        ControllerState::Idle => "1/2/3 mode  s start  q quit",
        ControllerState::Running => "x stop  q quit",
        _ => "b accept bonus  n skip  q quit",
    };

    let status = app.status.as_deref().unwrap_or("");
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(format!(" {status} "), Style::default().fg(Color::White)),
        Span::styled(format!(" {hints} "), Style::default().fg(Color::DarkGray)),
    ]))
    .style(Style::default().bg(Color::Black));

    frame.render_widget(bar, area);
}
