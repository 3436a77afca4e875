use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::date;
use crate::priority::{Priority, PRIORITIES};
use crate::task::Task;

use super::app::AppState;

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);

pub fn render(frame: &mut Frame, app: &mut AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_header(frame, app, chunks[0]);
    render_list(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = vec![
        Span::styled("tick", Style::default().fg(COLOR_ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!("{} tasks", app.filtered.len()),
            Style::default().fg(COLOR_MUTED),
        ),
    ];

    if app.filter_active || !app.filter.is_empty() {
        let label = if app.filter.is_empty() {
            "filter: _".to_string()
        } else {
            format!("filter: {}", app.filter)
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(label, Style::default().fg(COLOR_INFO)));
    }
    if let Some(category) = app.category_filter {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("category: {} {}", category.glyph(), category.label()),
            Style::default().fg(COLOR_WARNING),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;

    if app.filtered.is_empty() {
        let message = if app.filter.is_empty() && app.category_filter.is_none() {
            "No open tasks"
        } else {
            "No matches"
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(COLOR_MUTED),
        )));
    } else {
        let mut row = 0usize;
        for priority in PRIORITIES {
            let group: Vec<(usize, &Task)> = app
                .filtered
                .iter()
                .enumerate()
                .filter_map(|(position, index)| {
                    let task = app.tasks.get(*index)?;
                    (task.priority() == priority).then_some((position, task))
                })
                .collect();
            if group.is_empty() {
                continue;
            }

            lines.push(Line::from(Span::styled(
                priority.label().to_string(),
                Style::default()
                    .fg(priority_color(priority))
                    .add_modifier(Modifier::BOLD),
            )));
            row += 1;

            for (position, task) in group {
                if position == app.selected {
                    selected_line = row;
                }
                lines.push(render_row(task, position == app.selected));
                row += 1;
            }

            lines.push(Line::from(""));
            row += 1;
        }
    }

    let height = area.height.saturating_sub(2) as usize;
    let start = if lines.len() <= height {
        0
    } else {
        selected_line
            .saturating_sub(height / 2)
            .min(lines.len() - height)
    };
    let visible: Vec<Line> = lines.into_iter().skip(start).take(height.max(1)).collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_MUTED));
    frame.render_widget(Paragraph::new(visible).block(block), area);
}

fn render_row(task: &Task, selected: bool) -> Line<'static> {
    let marker = if task.is_completed() {
        Span::styled("✓ ", Style::default().fg(COLOR_SUCCESS))
    } else if task.is_pending_completion() {
        Span::styled("✓ ", Style::default().fg(COLOR_WARNING))
    } else {
        Span::styled("· ", Style::default().fg(COLOR_MUTED))
    };

    let mut spans = vec![Span::raw("  "), marker];
    spans.push(Span::styled(
        task.content().to_string(),
        Style::default().fg(COLOR_TEXT),
    ));

    if task.category() != crate::category::Category::None {
        spans.push(Span::raw("  "));
        spans.push(Span::raw(task.category().glyph().to_string()));
    }
    if let Some(due) = task.due_date() {
        let label = date::relative_label(due, date::today());
        let color = if task.is_overdue() {
            COLOR_ERROR
        } else {
            COLOR_MUTED
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(label, Style::default().fg(color)));
    }
    for project in task.projects() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("#{project}"),
            Style::default().fg(COLOR_SUCCESS),
        ));
    }
    for assignee in task.assignees() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("@{assignee}"),
            Style::default().fg(COLOR_INFO),
        ));
    }

    if selected {
        for span in &mut spans {
            span.style = span.style.add_modifier(Modifier::REVERSED);
        }
    }

    Line::from(spans)
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let message = if let Some(toast) = app.pending.as_ref() {
        let remaining = toast
            .deadline
            .saturating_duration_since(std::time::Instant::now())
            .as_secs();
        Line::from(vec![
            Span::styled(
                format!("Completed: {}", toast.content),
                Style::default().fg(COLOR_SUCCESS),
            ),
            Span::styled(
                format!("  — u to undo ({}s)", remaining + 1),
                Style::default().fg(COLOR_MUTED),
            ),
        ])
    } else if let Some(status) = app.status_message.as_ref() {
        Line::from(Span::styled(
            status.clone(),
            Style::default().fg(COLOR_INFO),
        ))
    } else {
        Line::from(Span::styled(
            app.footer_hint(),
            Style::default().fg(COLOR_MUTED),
        ))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(COLOR_MUTED));
    frame.render_widget(Paragraph::new(message).block(block), area);
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::P1 => COLOR_ERROR,
        Priority::P2 => COLOR_WARNING,
        Priority::P3 => Color::Rgb(214, 180, 98),
        Priority::P4 => COLOR_SUCCESS,
        Priority::None => COLOR_ACCENT,
    }
}
