// Multi-series history chart with hover tooltip
use crate::domain::history::{ChartMode, FetchStatus};
use crate::domain::reading::{HistoryRecord, SeriesId};
use crate::domain::scale::{co2_ceiling, pm_ceiling, secondary_ceiling};
use crate::presentation::app_state::AppState;
use crate::presentation::ui::{
    ACCENT, BORDER, CARD, CO2, DANGER, HUMI, MUTED, NOX, PM1, PM25, SURFACE, TEMP, TEXT, VOC,
};
use ratatui::{prelude::*, widgets::*};

// Area fill shades: the PM2.5 and CO₂ colors pre-blended toward the
// background, since terminal cells cannot alpha-blend.
const PM25_FILL: Color = Color::Rgb(18, 34, 55);
const CO2_FILL: Color = Color::Rgb(38, 29, 20);

struct SeriesSpec {
    id: SeriesId,
    label: &'static str,
    color: Color,
    decimals: usize,
    unit: &'static str,
}

const SERIES: &[SeriesSpec] = &[
    SeriesSpec {
        id: SeriesId::Pm2p5,
        label: "PM2.5",
        color: PM25,
        decimals: 1,
        unit: " µg/m³",
    },
    SeriesSpec {
        id: SeriesId::Co2,
        label: "CO₂",
        color: CO2,
        decimals: 0,
        unit: " ppm",
    },
    SeriesSpec {
        id: SeriesId::Temperature,
        label: "Temp",
        color: TEMP,
        decimals: 1,
        unit: " °C",
    },
    SeriesSpec {
        id: SeriesId::Humidity,
        label: "Humidity",
        color: HUMI,
        decimals: 1,
        unit: " %",
    },
    SeriesSpec {
        id: SeriesId::VocIndex,
        label: "VOC",
        color: VOC,
        decimals: 0,
        unit: " idx",
    },
    SeriesSpec {
        id: SeriesId::NoxIndex,
        label: "NOx",
        color: NOX,
        decimals: 0,
        unit: " idx",
    },
    SeriesSpec {
        id: SeriesId::Pm1p0,
        label: "PM1.0",
        color: PM1,
        decimals: 1,
        unit: " µg/m³",
    },
];

pub fn draw_chart(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .title(chart_title(app))
        .title(mode_toggles(app.chart_mode).right_aligned())
        .title_bottom(legend_line());

    if app.chart_mode == ChartMode::Api {
        let message = match app.api_history.status {
            FetchStatus::Loading => Some(("Loading API history…", MUTED)),
            FetchStatus::Error => Some(("Failed to load API history — press a to retry", DANGER)),
            FetchStatus::Idle => Some(("Press a to load API history", MUTED)),
            FetchStatus::Loaded => None,
        };
        if let Some((message, color)) = message {
            draw_placeholder(f, area, block, message, color);
            return;
        }
    }

    let (records, active_n) = match app.chart_mode {
        // The live window is always scaled for a full buffer, so a filling
        // buffer grows in from the left.
        ChartMode::Live => (
            app.history.records(),
            app.history.capacity().saturating_sub(1).max(1),
        ),
        ChartMode::Api => {
            let records: Vec<&HistoryRecord> = app.api_history.records.iter().collect();
            let n = records.len().saturating_sub(1).max(1);
            (records, n)
        }
    };

    if records.len() < 2 {
        draw_placeholder(f, area, block, "Collecting data…", MUTED);
        return;
    }

    let plot = plot_area(area, records[0].time_label.len() as u16);
    let ticks = tick_count(plot.width, app.chart_mode);
    let labels = tick_labels(&records, active_n, ticks);

    let point_sets: Vec<Vec<(f64, f64)>> = SERIES
        .iter()
        .map(|spec| series_points(&records, spec.id))
        .collect();

    // Both fills go under every line; CO₂ lines under PM2.5, then the
    // thin secondary traces on top.
    let mut datasets = vec![
        fill_dataset(CO2_FILL, &point_sets[1]),
        fill_dataset(PM25_FILL, &point_sets[0]),
        line_dataset(CO2, &point_sets[1]),
        line_dataset(PM25, &point_sets[0]),
    ];
    for (spec, points) in SERIES.iter().zip(point_sets.iter()).skip(2) {
        datasets.push(line_dataset(spec.color, points));
    }

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(MUTED))
                .bounds([0.0, active_n as f64])
                .labels(labels),
        )
        .y_axis(Axis::default().bounds([0.0, 1.0]));
    f.render_widget(chart, area);

    if let Some((mx, my)) = app.hover {
        if plot.width >= 2 && plot.contains(Position::new(mx, my)) {
            if let Some(idx) = hover_index(mx, plot, active_n, records.len()) {
                let frac = idx as f64 / active_n as f64;
                let snap_x = plot.x + (frac * f64::from(plot.width - 1)).round() as u16;
                let column = Rect::new(snap_x, plot.y, 1, plot.height);
                f.buffer_mut().set_style(column, Style::default().bg(CARD));
                draw_tooltip(f, area, plot, snap_x, records[idx]);
            }
        }
    }
}

fn chart_title(app: &AppState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " HISTORY — ALL SENSORS ",
        Style::default().fg(MUTED),
    )];
    if app.chart_mode == ChartMode::Api && app.api_history.status == FetchStatus::Loaded {
        spans.push(Span::styled(
            format!(
                " •  {} readings ",
                group_thousands(app.api_history.records.len())
            ),
            Style::default().fg(MUTED),
        ));
    }
    Line::from(spans)
}

// The active toggle renders as a filled accent pill, the inactive one as a
// muted pill on the surface color.
fn mode_toggles(mode: ChartMode) -> Line<'static> {
    let active = Style::default().bold().fg(TEXT).bg(ACCENT);
    let inactive = Style::default().fg(MUTED).bg(SURFACE);
    let (live_style, api_style) = match mode {
        ChartMode::Live => (active, inactive),
        ChartMode::Api => (inactive, active),
    };
    Line::from(vec![
        Span::styled(" [l] Live ", live_style),
        Span::raw(" "),
        Span::styled(" [a] API History ", api_style),
    ])
}

fn legend_line() -> Line<'static> {
    let mut spans = Vec::with_capacity(SERIES.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for spec in SERIES {
        spans.push(Span::styled("▬ ", Style::default().fg(spec.color)));
        spans.push(Span::styled(
            format!("{}  ", spec.label),
            Style::default().fg(TEXT),
        ));
    }
    Line::from(spans)
}

fn draw_placeholder(f: &mut Frame, area: Rect, block: Block, message: &str, color: Color) {
    let pad = block.inner(area).height.saturating_sub(1) / 2;
    let mut lines = vec![Line::from(""); pad as usize];
    lines.push(Line::from(message.to_string()));
    let p = Paragraph::new(lines)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(p, area);
}

fn fill_dataset<'a>(color: Color, points: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .marker(symbols::Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(color))
        .data(points)
}

fn line_dataset<'a>(color: Color, points: &'a [(f64, f64)]) -> Dataset<'a> {
    Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(points)
}

fn series_ceiling(id: SeriesId, max_value: f64) -> f64 {
    match id {
        SeriesId::Pm2p5 => pm_ceiling(max_value),
        SeriesId::Co2 => co2_ceiling(max_value),
        SeriesId::Temperature => secondary_ceiling(max_value, 10.0),
        SeriesId::Humidity => secondary_ceiling(max_value, 50.0),
        SeriesId::VocIndex => secondary_ceiling(max_value, 100.0),
        SeriesId::NoxIndex => secondary_ceiling(max_value, 10.0),
        SeriesId::Pm1p0 => secondary_ceiling(max_value, 5.0),
    }
}

/// Normalize one series to its own ceiling so all series share the
/// unlabeled [0, 1] y axis.
fn series_points(records: &[&HistoryRecord], id: SeriesId) -> Vec<(f64, f64)> {
    let max_value = records
        .iter()
        .map(|r| r.value(id))
        .fold(f64::MIN, f64::max);
    let ceiling = series_ceiling(id, max_value);
    records
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.value(id) / ceiling))
        .collect()
}

/// The cell area ratatui plots points into: the block borders, the first
/// x label left of the plot, and the bottom axis and label rows are
/// outside of it.
fn plot_area(area: Rect, first_label_width: u16) -> Rect {
    let inner = Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    };
    let indent = first_label_width.min(inner.width / 3);
    Rect {
        x: inner.x + indent,
        y: inner.y,
        width: inner.width.saturating_sub(indent),
        height: inner.height.saturating_sub(2),
    }
}

fn tick_count(plot_width: u16, mode: ChartMode) -> usize {
    let min_gap = match mode {
        ChartMode::Live => 10,
        ChartMode::Api => 5,
    };
    (plot_width as usize / min_gap).clamp(2, 8)
}

/// Evenly spaced tick labels across the x domain. Ticks that fall beyond
/// the populated extent of a filling live buffer come out empty.
fn tick_labels(records: &[&HistoryRecord], active_n: usize, ticks: usize) -> Vec<Line<'static>> {
    (0..ticks)
        .map(|t| {
            let frac = t as f64 / (ticks - 1) as f64;
            let idx = (frac * active_n as f64).round() as usize;
            match records.get(idx) {
                Some(r) => Line::from(r.time_label.clone()),
                None => Line::from(""),
            }
        })
        .collect()
}

/// Map a pointer column back to the nearest record index. Monotonic in
/// the column and clamped to the populated range.
fn hover_index(col: u16, plot: Rect, active_n: usize, len: usize) -> Option<usize> {
    if len == 0 || plot.width < 2 {
        return None;
    }
    let rel = f64::from(col.saturating_sub(plot.x)) / f64::from(plot.width - 1);
    let idx = (rel * active_n as f64).round() as usize;
    Some(idx.min(len - 1))
}

fn draw_tooltip(f: &mut Frame, area: Rect, plot: Rect, snap_x: u16, record: &HistoryRecord) {
    const TIP_W: u16 = 26;
    const TIP_H: u16 = 9;
    if plot.width < TIP_W + 6 || area.bottom().saturating_sub(plot.y) < TIP_H {
        return;
    }

    // Right of the snap column, flipped left at the plot edge.
    let x = if snap_x + 2 + TIP_W > plot.right() {
        snap_x.saturating_sub(TIP_W + 2)
    } else {
        snap_x + 2
    };
    let x = x.clamp(area.x + 1, area.right().saturating_sub(TIP_W + 1));
    let tip = Rect::new(x, plot.y, TIP_W, TIP_H);

    let lines: Vec<Line> = SERIES
        .iter()
        .map(|spec| {
            let value = format!("{:.*}{}", spec.decimals, record.value(spec.id), spec.unit);
            Line::from(vec![
                Span::styled(format!("{:<9}", spec.label), Style::default().fg(spec.color)),
                Span::styled(format!("{:>13}", value), Style::default().fg(TEXT)),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER))
        .style(Style::default().bg(SURFACE))
        .title(Span::styled(
            format!(" {} ", record.time_label),
            Style::default().fg(MUTED),
        ));
    f.render_widget(Clear, tip);
    f.render_widget(Paragraph::new(lines).block(block), tip);
}

fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
