// TUI rendering - Controls, metric cards and status bar
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, BorderType, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
    Frame,
};

use super::app::{Focus, TuiApp};
use crate::domain::dashboard::MetricCard;
use crate::presentation::page_state::{NotificationLevel, PageStatus};

pub const CARDS_PER_ROW: usize = 2;
const CARD_HEIGHT: u16 = 12;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

/// Top to bottom: title, selector controls, the card grid (or a status
/// message), and a one-line status bar.
pub fn render(frame: &mut Frame, app: &TuiApp) {
    let chunks = Layout::vertical([
        Constraint::Length(2), // Title
        Constraint::Length(3), // Controls
        Constraint::Min(4),    // Content
        Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

    render_title(frame, chunks[0]);
    render_controls(frame, app, chunks[1]);
    render_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        render_help(frame, frame.area());
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " Host Metrics",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            " Metrics reported by monitoring agents",
            Style::default().fg(MUTED),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn control_block(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
}

fn render_controls(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(35),
        Constraint::Percentage(20),
        Constraint::Percentage(30),
        Constraint::Percentage(15),
    ])
    .split(area);

    let mut device = vec![Span::raw(app.selected_device_label())];
    if app.devices_loading {
        device.push(Span::styled(" (loading devices...)", Style::default().fg(MUTED)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(device)).block(control_block("Device", app.focus == Focus::Device)),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(app.page.range().label()).block(control_block("Time Range", app.focus == Focus::Range)),
        chunks[1],
    );

    let filter = app.page.filter();
    let mut search = if filter.is_empty() && !app.filter_editing {
        vec![Span::styled("Search metric...", Style::default().fg(MUTED))]
    } else {
        vec![Span::raw(filter.to_string())]
    };
    if app.filter_editing {
        search.push(Span::styled("_", Style::default().fg(ACCENT)));
    }
    frame.render_widget(
        Paragraph::new(Line::from(search)).block(control_block("Search Metric", app.focus == Focus::Filter)),
        chunks[2],
    );

    let refresh_style = if app.page.is_loading() {
        Style::default().fg(MUTED)
    } else {
        Style::default().fg(ACCENT)
    };
    frame.render_widget(
        Paragraph::new(Span::styled("[r] Refresh", refresh_style))
            .alignment(Alignment::Center)
            .block(control_block("", false)),
        chunks[3],
    );
}

fn render_message(frame: &mut Frame, area: Rect, lines: Vec<Line>) {
    let top = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
    let centered = Rect::new(area.x, top, area.width, (lines.len() as u16).min(area.height));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), centered);
}

fn render_content(frame: &mut Frame, app: &TuiApp, area: Rect) {
    match app.page.status() {
        PageStatus::NoDeviceSelected => render_message(
            frame,
            area,
            vec![Line::from("Select a device to view metrics")],
        ),
        PageStatus::Loading => render_message(
            frame,
            area,
            vec![Line::from(Span::styled("Loading metrics...", Style::default().fg(ACCENT)))],
        ),
        PageStatus::Empty => render_message(
            frame,
            area,
            vec![
                Line::from(Span::styled(
                    "No metrics found for this device",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    "Ensure the monitoring agent is configured and sending metrics",
                    Style::default().fg(MUTED),
                )),
            ],
        ),
        PageStatus::Failed => {
            let error = app.page.error().map(|e| e.to_string()).unwrap_or_default();
            render_message(
                frame,
                area,
                vec![
                    Line::from(Span::styled(
                        "Failed to load metrics",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(error),
                    Line::from(Span::styled("Press r to retry", Style::default().fg(MUTED))),
                ],
            );
        }
        PageStatus::Populated => render_cards(frame, app, area),
    }
}

fn render_cards(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let cards = app.page.cards(&app.formatter);
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));

    let rows: Vec<&[MetricCard]> = cards.chunks(CARDS_PER_ROW).skip(app.scroll).take(visible_rows).collect();
    let row_areas = Layout::vertical(vec![Constraint::Length(CARD_HEIGHT); visible_rows]).split(area);

    for (row, row_area) in rows.iter().zip(row_areas.iter()) {
        let cells =
            Layout::horizontal(vec![Constraint::Ratio(1, CARDS_PER_ROW as u32); CARDS_PER_ROW]).split(*row_area);
        for (card, cell) in row.iter().zip(cells.iter()) {
            render_card(frame, card, *cell);
        }
    }
}

fn render_card(frame: &mut Frame, card: &MetricCard, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", card.name),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Key / kind
        Constraint::Length(1), // Current value
        Constraint::Length(1), // Last updated
        Constraint::Min(3),    // Chart
        Constraint::Length(1), // Min / Avg / Max
    ])
    .split(inner);

    let mut meta = vec![Span::styled(card.key.clone(), Style::default().fg(MUTED))];
    if let Some(kind) = card.kind {
        meta.push(Span::styled(format!(" · {}", kind.label()), Style::default().fg(MUTED)));
    }
    frame.render_widget(Paragraph::new(Line::from(meta)), chunks[0]);

    let value_color = match card.kind {
        Some(kind) if !kind.is_numeric() => Color::White,
        _ => Color::Green,
    };
    let mut value = vec![Span::styled(
        card.current_value.clone(),
        Style::default().fg(value_color).add_modifier(Modifier::BOLD),
    )];
    if !card.units.is_empty() {
        value.push(Span::raw(format!(" {}", card.units)));
    }
    frame.render_widget(Paragraph::new(Line::from(value)), chunks[1]);

    frame.render_widget(
        Paragraph::new(Span::styled(
            format!("Last updated: {}", card.last_updated),
            Style::default().fg(MUTED),
        )),
        chunks[2],
    );

    render_chart(frame, card, chunks[3]);

    if let Some(stats) = &card.stats {
        let line = Line::from(vec![
            Span::styled("Min ", Style::default().fg(MUTED)),
            Span::raw(card.format_stat(stats.min)),
            Span::styled(" │ Avg ", Style::default().fg(MUTED)),
            Span::raw(card.format_stat(stats.avg)),
            Span::styled(" │ Max ", Style::default().fg(MUTED)),
            Span::raw(card.format_stat(stats.max)),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[4]);
    }
}

/// Bounds that never collapse to a zero-width range.
fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        [0.0, 1.0]
    } else if lo == hi {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

fn render_chart(frame: &mut Frame, card: &MetricCard, area: Rect) {
    if !card.has_history() {
        render_message(
            frame,
            area,
            vec![Line::from(Span::styled("No historical data", Style::default().fg(MUTED)))],
        );
        return;
    }

    let data: Vec<(f64, f64)> = card.points.iter().map(|p| (p.timestamp as f64, p.value)).collect();
    let x_bounds = padded_bounds(data.iter().map(|&(x, _)| x));
    let y_bounds = padded_bounds(data.iter().map(|&(_, y)| y));

    let first = card.points.first().map(|p| p.display_time.clone()).unwrap_or_default();
    let last = card.points.last().map(|p| p.display_time.clone()).unwrap_or_default();

    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(ACCENT))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .bounds(x_bounds)
                .labels([Span::raw(first), Span::raw(last)])
                .style(Style::default().fg(MUTED)),
        )
        .y_axis(
            Axis::default()
                .bounds(y_bounds)
                .labels([
                    Span::raw(format!("{:.1}", y_bounds[0])),
                    Span::raw(format!("{:.1}", y_bounds[1])),
                ])
                .style(Style::default().fg(MUTED)),
        );

    frame.render_widget(chart, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    if let Some(notification) = app.page.current_notification() {
        let style = match notification.level {
            NotificationLevel::Error => Style::default().fg(Color::Red),
            NotificationLevel::Info => Style::default().fg(ACCENT),
        };
        frame.render_widget(Paragraph::new(format!(" {} ", notification.message)).style(style), area);
        return;
    }

    let controls = if app.filter_editing {
        "Type to search | Enter/Esc:done"
    } else {
        "Tab:focus ↑↓:change d:device t:range /:search r:refresh ?:help q:quit"
    };

    let status = match (app.page.status(), app.page.window()) {
        (PageStatus::Populated, Some(window)) => format!(
            " {}/{} metrics | {} → {} | {}",
            app.page.visible_metrics().len(),
            app.page.loaded_count(),
            app.formatter.date_time(window.from),
            app.formatter.date_time(window.to),
            controls
        ),
        (PageStatus::Loading, _) => format!(" Loading... | {}", controls),
        _ => format!(" {}", controls),
    };

    frame.render_widget(
        Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM)),
        area,
    );
}

fn render_help(frame: &mut Frame, area: Rect) {
    let keys = [
        ("Tab / Shift-Tab", "Move focus between controls"),
        ("↑↓ ←→", "Change the focused selector"),
        ("d / D", "Next / previous device"),
        ("x", "Clear device selection"),
        ("t / T", "Next / previous time range"),
        ("/", "Search metrics by name or key"),
        ("c", "Clear search"),
        ("r", "Refresh"),
        ("PgUp / PgDn", "Scroll cards"),
        ("q", "Quit"),
    ];

    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(keys.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("{:<16}", key), Style::default().fg(ACCENT)),
            Span::raw(*action),
        ])
    }));

    let width = 52.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT)),
        ),
        popup,
    );
}
