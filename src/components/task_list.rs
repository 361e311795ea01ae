use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::schedule::ProgressSummary;
use crate::store::Task;
use crate::theme;

pub struct TaskList;

impl TaskList {
    /// `tasks` must already be in display order (the selection index in the
    /// app points into the same slice).
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        tasks: &[&Task],
        summary: ProgressSummary,
        selected_index: usize,
    ) {
        let w = area.width as usize;

        let title = if w >= 25 {
            format!(" Tasks ({}) ", tasks.len())
        } else {
            " Tasks ".to_string()
        };

        let progress_str = format!(
            " {}/{} done ({}%), {} min logged ",
            summary.completed, summary.total, summary.percent, summary.minutes_done
        );

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .title_bottom(Line::from(Span::styled(progress_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        if tasks.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No tasks").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        // Group tasks by category
        let mut current_category = String::new();
        let mut items: Vec<ListItem> = Vec::new();

        for (i, task) in tasks.iter().enumerate() {
            let category = if task.category.is_empty() {
                "uncategorized"
            } else {
                task.category.as_str()
            };
            if category != current_category {
                if !current_category.is_empty() {
                    items.push(ListItem::new(Line::from("")));
                }
                current_category = category.to_string();
                items.push(ListItem::new(Line::from(Span::styled(
                    format!(" {}", current_category),
                    Style::default()
                        .fg(theme::category_color(category))
                        .add_modifier(Modifier::BOLD),
                ))));
            }

            let checkbox = if task.completed { "[x]" } else { "[ ]" };
            let title_style = if task.completed {
                Style::default().add_modifier(Modifier::DIM | Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            let is_selected = i == selected_index;

            let mut spans = vec![
                Span::styled(
                    format!(" {} ", checkbox),
                    if is_selected {
                        theme::current().selected
                    } else {
                        Style::default()
                    },
                ),
                Span::styled(
                    format!("{:>4} ", task.priority.label().to_lowercase()),
                    Style::default().fg(theme::priority_color(task.priority)),
                ),
                Span::styled(
                    truncate(&task.title, inner_w.saturating_sub(12)),
                    if is_selected {
                        theme::current().selected
                    } else {
                        title_style
                    },
                ),
            ];

            // Due date if there's room
            let due_str = format!(" {}", task.due.format("%m/%d %H:%M"));
            if spans.iter().map(|s| s.width()).sum::<usize>() + due_str.len() < inner_w {
                spans.push(Span::styled(due_str, theme::current().dim));
            }

            items.push(ListItem::new(Line::from(spans)));
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

/// Small dashboard panel listing the next few open tasks.
pub fn render_upcoming(frame: &mut Frame, area: Rect, tasks: &[&Task]) {
    let block = Block::default()
        .title(" Upcoming ")
        .title_style(theme::HEADER_STYLE)
        .borders(Borders::ALL)
        .border_style(theme::BORDER_STYLE);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if tasks.is_empty() {
        let msg = Paragraph::new("Nothing due").style(theme::current().dim);
        frame.render_widget(msg, inner);
        return;
    }

    let inner_w = inner.width as usize;
    let lines: Vec<Line> = tasks
        .iter()
        .map(|task| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", task.due.format("%m/%d %H:%M")),
                    theme::current().dim,
                ),
                Span::styled(
                    truncate(&task.title, inner_w.saturating_sub(14)),
                    Style::default().fg(theme::priority_color(task.priority)),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    } else {
        s.chars().take(max).collect()
    }
}
