use chrono::{NaiveDate, Timelike};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::schedule::{self, ScheduleItem, DAY_END_HOUR, DAY_START_HOUR};
use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        items: &[ScheduleItem],
        selected: usize,
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", schedule::day_title(date))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let events = items.iter().filter(|i| !i.is_task).count();
        let tasks = items.len() - events;
        let mut counts = Vec::new();
        if events > 0 {
            counts.push(format!("{} event{}", events, if events == 1 { "" } else { "s" }));
        }
        if tasks > 0 {
            counts.push(format!("{} task{}", tasks, if tasks == 1 { "" } else { "s" }));
        }
        let count_str = if counts.is_empty() {
            String::new()
        } else {
            format!(" {} ", counts.join(", "))
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .title_bottom(Line::from(Span::styled(count_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if items.is_empty() {
            let msg = Paragraph::new("No events or tasks").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = inner.width as usize;
        let selected_id = items.get(selected).map(|i| i.id.as_str());
        let mut lines: Vec<Line> = Vec::new();

        for hour in DAY_START_HOUR..DAY_END_HOUR {
            let mut spans = vec![Span::styled(format!("{:>2}:00 ", hour), theme::current().dim)];

            let mut first = true;
            for item in schedule::items_for_hour(items, hour) {
                if !first {
                    // Additional items in the same slot continue on their own line
                    lines.push(Line::from(std::mem::take(&mut spans)));
                    spans.push(Span::styled("      ", theme::current().dim));
                }
                first = false;
                spans.push(item_span(item, Some(item.id.as_str()) == selected_id, inner_w));
            }
            lines.push(Line::from(spans));
        }

        // The hour grid stops at 8 PM; anything outside it is only counted,
        // not laid out.
        let outside = items
            .iter()
            .filter(|i| i.start.hour() < DAY_START_HOUR || i.start.hour() >= DAY_END_HOUR)
            .count();
        if outside > 0 {
            lines.push(Line::from(Span::styled(
                format!("+{} outside {:02}:00-{:02}:00", outside, DAY_START_HOUR, DAY_END_HOUR),
                theme::current().dim,
            )));
        }

        // Scroll in rendered lines, not item indices: crowded hours add
        // continuation lines above the selection.
        let scroll = selected_line(items, selected_id)
            .saturating_add(1)
            .saturating_sub(inner.height as usize);
        let para = Paragraph::new(lines).scroll((scroll as u16, 0));
        frame.render_widget(para, inner);
    }
}

/// Line index the selected item lands on in the hour grid.
fn selected_line(items: &[ScheduleItem], selected_id: Option<&str>) -> usize {
    let mut line = 0;
    for hour in DAY_START_HOUR..DAY_END_HOUR {
        for (i, item) in schedule::items_for_hour(items, hour).iter().enumerate() {
            if i > 0 {
                line += 1;
            }
            if Some(item.id.as_str()) == selected_id {
                return line;
            }
        }
        line += 1;
    }
    0
}

fn item_span(item: &ScheduleItem, selected: bool, max_width: usize) -> Span<'static> {
    let marker = if item.is_task { "[ ] " } else { "" };
    let text = format!("{}{} {}", marker, item.duration_display(), item.title);
    let text: String = text.chars().take(max_width.saturating_sub(6)).collect();

    let style = if selected {
        theme::current().selected
    } else {
        Style::default().fg(theme::item_color(item.priority, &item.category))
    };
    Span::styled(text, style)
}

/// Detail popup for the selected schedule item.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, item: &ScheduleItem) {
    let popup_w = area.width.min(60).max(30);
    let popup_h = area.height.min(14).max(8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let accent = if item.is_task { Color::Yellow } else { Color::Cyan };
    let block = Block::default()
        .title(format!(" {} ", item.title))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(
            "  ",
            Style::default().bg(theme::item_color(item.priority, &item.category)),
        ),
        Span::styled(
            format!(" {}", if item.is_task { "Task" } else { "Event" }),
            Style::default(),
        ),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Time: ", theme::current().dim),
        Span::styled(item.duration_display(), Style::default()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Date: ", theme::current().dim),
        Span::styled(item.start.format("%A, %B %d, %Y").to_string(), Style::default()),
    ]));

    if !item.category.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Category: ", theme::current().dim),
            Span::styled(item.category.clone(), Style::default()),
        ]));
    }

    if let Some(priority) = item.priority {
        lines.push(Line::from(vec![
            Span::styled("Priority: ", theme::current().dim),
            Span::styled(
                priority.label(),
                Style::default().fg(theme::priority_color(priority)),
            ),
        ]));
    }

    if !item.description.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes:", theme::current().dim)));
        for line in item.description.lines() {
            lines.push(Line::from(line.to_string()));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", theme::current().dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Local, TimeZone};

    use super::*;

    fn item(id: &str, hour: u32, minute: u32) -> ScheduleItem {
        let start: DateTime<Local> = Local.with_ymd_and_hms(2026, 3, 10, hour, minute, 0).unwrap();
        ScheduleItem {
            id: id.into(),
            title: id.into(),
            description: String::new(),
            category: String::new(),
            start,
            end: start,
            priority: None,
            is_task: false,
        }
    }

    #[test]
    fn crowded_hours_push_later_items_onto_continuation_lines() {
        let items = vec![item("a", 9, 0), item("b", 9, 30), item("c", 10, 0)];
        // Hour 8 takes line 0; a shares hour 9's line, b continues below it.
        assert_eq!(selected_line(&items, Some("a")), 1);
        assert_eq!(selected_line(&items, Some("b")), 2);
        assert_eq!(selected_line(&items, Some("c")), 3);
    }

    #[test]
    fn items_outside_the_grid_do_not_scroll() {
        let items = vec![item("early", 7, 0)];
        assert_eq!(selected_line(&items, Some("early")), 0);
        assert_eq!(selected_line(&items, None), 0);
    }
}
