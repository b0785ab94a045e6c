// Terminal rendering - Frame layout, header, cards, and key bar
use crate::domain::format::{Badge, BadgeLevel, co2_badge, fmt_value, pm_badge};
use crate::domain::history::ConnectionStatus;
use crate::domain::reading::SensorReading;
use crate::presentation::app_state::{AppState, InputMode};
use crate::presentation::chart;
use ratatui::{prelude::*, widgets::*};

// Dashboard palette
pub(crate) const BG: Color = Color::Rgb(11, 13, 18);
pub(crate) const SURFACE: Color = Color::Rgb(19, 22, 30);
pub(crate) const CARD: Color = Color::Rgb(26, 30, 42);
pub(crate) const BORDER: Color = Color::Rgb(42, 48, 66);
pub(crate) const TEXT: Color = Color::Rgb(232, 238, 255);
pub(crate) const MUTED: Color = Color::Rgb(105, 115, 148);
pub(crate) const ACCENT: Color = Color::Rgb(255, 92, 0);
pub(crate) const OK: Color = Color::Rgb(65, 196, 108);
pub(crate) const WARN: Color = Color::Rgb(255, 198, 52);
pub(crate) const DANGER: Color = Color::Rgb(255, 72, 72);

// Series colors
pub(crate) const PM25: Color = Color::Rgb(56, 145, 255);
pub(crate) const CO2: Color = Color::Rgb(255, 158, 40);
pub(crate) const TEMP: Color = Color::Rgb(255, 75, 90);
pub(crate) const HUMI: Color = Color::Rgb(40, 200, 210);
pub(crate) const VOC: Color = Color::Rgb(165, 85, 240);
pub(crate) const NOX: Color = Color::Rgb(255, 205, 60);
pub(crate) const PM1: Color = Color::Rgb(85, 210, 150);

pub fn draw(f: &mut Frame, app: &AppState) {
    // Dark canvas behind every widget.
    f.render_widget(Block::default().style(Style::default().bg(BG)), f.area());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(4), // primary cards
            Constraint::Length(4), // secondary cards
            Constraint::Min(10),   // chart
            Constraint::Length(1), // keys
        ])
        .split(f.area());

    draw_header(f, rows[0], app);
    draw_primary_cards(f, rows[1], app.latest.as_ref());
    draw_secondary_cards(f, rows[2], app.latest.as_ref());
    chart::draw_chart(f, rows[3], app);
    draw_keys(f, rows[4], app);
}

fn status_indicator(status: ConnectionStatus) -> (&'static str, Color) {
    match status {
        ConnectionStatus::Connected => ("Live", OK),
        ConnectionStatus::Error => ("Connection error", DANGER),
        ConnectionStatus::Connecting => ("Connecting…", WARN),
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &AppState) {
    let (status_label, status_color) = status_indicator(app.conn_status);

    let mut spans = vec![
        Span::styled(" ● ", Style::default().fg(status_color)),
        Span::styled(status_label, Style::default().fg(status_color)),
        Span::styled("   device: ", Style::default().fg(MUTED)),
    ];
    match app.input_mode {
        InputMode::Editing => spans.push(Span::styled(
            format!("{}▏", app.address_input),
            Style::default().bold().fg(ACCENT),
        )),
        InputMode::Normal => spans.push(Span::styled(
            app.address_input.clone(),
            Style::default().fg(TEXT),
        )),
    }
    if let Some(ts) = app.latest.as_ref().and_then(|r| r.timestamp.as_deref()) {
        spans.push(Span::styled(format!("   Updated: {}", ts), Style::default().fg(MUTED)));
    }
    if let Some(path) = &app.last_csv {
        spans.push(Span::styled(
            format!("   saved: {}", path.display()),
            Style::default().fg(OK),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(Line::from(vec![
            Span::styled(" Ambient ", Style::default().bold().fg(TEXT)),
            Span::styled(
                "Air Quality Monitor for Education ",
                Style::default().fg(MUTED),
            ),
        ]));
    let p = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(p, area);
}

struct Card {
    label: &'static str,
    unit: &'static str,
    value: String,
    badge: Option<Badge>,
}

fn badge_color(level: BadgeLevel) -> Color {
    match level {
        BadgeLevel::Ok => OK,
        BadgeLevel::Warn => WARN,
        BadgeLevel::Danger => DANGER,
    }
}

// Chip backgrounds: the level colors pre-blended toward the background,
// since terminal cells cannot alpha-blend.
fn badge_fill(level: BadgeLevel) -> Color {
    match level {
        BadgeLevel::Ok => Color::Rgb(18, 38, 30),
        BadgeLevel::Warn => Color::Rgb(44, 38, 23),
        BadgeLevel::Danger => Color::Rgb(44, 21, 25),
    }
}

fn draw_card(f: &mut Frame, area: Rect, card: &Card) {
    let value_color = if card.value == "--" { MUTED } else { TEXT };
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!(" {}", card.value),
            Style::default().bold().fg(value_color),
        ),
        Span::styled(format!(" {}", card.unit), Style::default().fg(MUTED)),
    ])];
    if let Some(badge) = &card.badge {
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!(" {} ", badge.label.to_uppercase()),
                Style::default()
                    .bold()
                    .fg(badge_color(badge.level))
                    .bg(badge_fill(badge.level)),
            ),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            format!(" {} ", card.label.to_uppercase()),
            Style::default().fg(MUTED),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_primary_cards(f: &mut Frame, area: Rect, reading: Option<&SensorReading>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let pm2p5 = reading.and_then(|r| r.pm2p5);
    let co2 = reading.and_then(|r| r.co2);
    let cards = [
        Card {
            label: "PM2.5",
            unit: "µg/m³",
            value: fmt_value(pm2p5, 1),
            badge: pm_badge(pm2p5),
        },
        Card {
            label: "CO₂",
            unit: "ppm",
            value: fmt_value(co2, 0),
            badge: co2_badge(co2),
        },
        Card {
            label: "Temperature",
            unit: "°C",
            value: fmt_value(reading.and_then(|r| r.temperature), 1),
            badge: None,
        },
        Card {
            label: "Humidity",
            unit: "%",
            value: fmt_value(reading.and_then(|r| r.humidity), 1),
            badge: None,
        },
    ];
    for (area, card) in cols.iter().zip(cards.iter()) {
        draw_card(f, *area, card);
    }
}

fn draw_secondary_cards(f: &mut Frame, area: Rect, reading: Option<&SensorReading>) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(area);

    let cards = [
        Card {
            label: "VOC Index",
            unit: "idx",
            value: fmt_value(reading.and_then(|r| r.voc_index), 0),
            badge: None,
        },
        Card {
            label: "NOx Index",
            unit: "idx",
            value: fmt_value(reading.and_then(|r| r.nox_index), 0),
            badge: None,
        },
        Card {
            label: "PM1.0",
            unit: "µg/m³",
            value: fmt_value(reading.and_then(|r| r.pm1p0), 1),
            badge: None,
        },
    ];
    // Three cards on a four column grid; the last cell stays empty.
    for (area, card) in cols.iter().zip(cards.iter()) {
        draw_card(f, *area, card);
    }
}

fn draw_keys(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.input_mode {
        InputMode::Editing => " type address  Enter: connect  Esc: done",
        InputMode::Normal => {
            " e: address  Enter: connect  l: live  a: api history  d: download csv  q: quit"
        }
    };
    let bar = Paragraph::new(text).style(Style::default().bg(SURFACE).fg(MUTED));
    f.render_widget(bar, area);
}
