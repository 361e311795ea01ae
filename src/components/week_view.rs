use chrono::{NaiveDate, Timelike};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::schedule::{self, ScheduleItem};
use crate::theme;

const HOUR_START: u32 = 6;
const HOUR_END: u32 = 23;

/// Cell text: the title truncated to the cell width, with a trailing `*`
/// marking tasks when there is room.
fn cell_label(item: &ScheduleItem, width: usize) -> String {
    let mut title: String = item.title.chars().take(width).collect();
    if item.is_task && title.chars().count() < width {
        title.push('*');
    }
    format!("{:<width$}", title)
}

pub struct WeekView;

impl WeekView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        week_start: NaiveDate,
        items: &[ScheduleItem],
    ) {
        let block = Block::default()
            .title(format!(" {} ", schedule::week_title(selected_date)))
            .title_style(theme::HEADER_STYLE)
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.width < 10 || inner.height < 3 {
            return;
        }

        let inner_w = inner.width as usize;
        let inner_h = inner.height as usize;

        // Time label column width
        let time_col_w: u16 = if inner_w >= 70 { 6 } else { 4 };
        let day_cols_w = inner.width.saturating_sub(time_col_w);
        let col_w = (day_cols_w / 7).max(1);

        // Layout: time label | 7 day columns
        let mut col_constraints = vec![Constraint::Length(time_col_w)];
        for _ in 0..7 {
            col_constraints.push(Constraint::Length(col_w));
        }
        col_constraints.push(Constraint::Min(0)); // absorb remainder

        let cols = Layout::horizontal(col_constraints).split(inner);

        // Determine visible hours based on height
        // Reserve 1 row for day headers
        let content_rows = inner_h.saturating_sub(1);
        let total_hours = (HOUR_END - HOUR_START) as usize;
        let rows_per_hour = (content_rows / total_hours).max(1);
        let visible_hours = (content_rows / rows_per_hour).min(total_hours);

        // Row layout: header + hour rows
        let mut row_constraints = vec![Constraint::Length(1)]; // day header
        for _ in 0..visible_hours {
            row_constraints.push(Constraint::Length(rows_per_hour as u16));
        }
        row_constraints.push(Constraint::Min(0));

        let rows = Layout::vertical(row_constraints).split(inner);

        // Render day headers
        for day_offset in 0..7u32 {
            let date = week_start + chrono::Duration::days(day_offset as i64);
            let col_idx = (day_offset + 1) as usize;
            if col_idx >= cols.len() {
                break;
            }

            let day_label = if col_w >= 10 {
                format!("{}", date.format("%a %d"))
            } else if col_w >= 5 {
                format!("{}", date.format("%a"))
            } else {
                format!("{}", date.format("%d"))
            };

            let style = if date == today && date == selected_date {
                Style::default()
                    .fg(ratatui::style::Color::Black)
                    .bg(ratatui::style::Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if date == selected_date {
                theme::current().selected
            } else if date == today {
                theme::current().today
            } else {
                theme::current().header
            };

            let label = Paragraph::new(Line::from(Span::styled(
                format!("{:^width$}", day_label, width = col_w as usize),
                style,
            )));
            frame.render_widget(label, cols[col_idx].intersection(rows[0]));
        }

        // Render time labels and grid
        for hour_idx in 0..visible_hours {
            let hour = HOUR_START + hour_idx as u32;
            let row_idx = hour_idx + 1;
            if row_idx >= rows.len() {
                break;
            }

            // Time label
            let time_label = if time_col_w >= 6 {
                format!("{:>2}:00 ", hour)
            } else {
                format!("{:>2} ", hour)
            };
            let time_para = Paragraph::new(Line::from(Span::styled(
                time_label,
                theme::current().dim,
            )));
            frame.render_widget(time_para, cols[0].intersection(rows[row_idx]));

            // Fill the cells from the schedule items of each day
            for day_offset in 0..7u32 {
                let date = week_start + chrono::Duration::days(day_offset as i64);
                let col_idx = (day_offset + 1) as usize;
                if col_idx >= cols.len() {
                    break;
                }

                let cell_area = cols[col_idx].intersection(rows[row_idx]);
                if cell_area.width == 0 || cell_area.height == 0 {
                    continue;
                }

                // Items occupying this hour on this day
                let cell_items: Vec<&ScheduleItem> = items
                    .iter()
                    .filter(|item| {
                        if item.start.date_naive() != date {
                            return false;
                        }
                        let start_hour = item.start.hour();
                        let end_hour = if item.end.minute() > 0 {
                            item.end.hour()
                        } else {
                            item.end.hour().saturating_sub(1)
                        };
                        hour >= start_hour && hour <= end_hour
                    })
                    .collect();

                if let Some(item) = cell_items.first() {
                    let display = cell_label(item, cell_area.width as usize);

                    let style = Style::default()
                        .fg(ratatui::style::Color::Black)
                        .bg(theme::item_color(item.priority, &item.category));

                    let para = Paragraph::new(Line::from(Span::styled(display, style)));
                    frame.render_widget(para, cell_area);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::*;

    fn item(title: &str, is_task: bool) -> ScheduleItem {
        let start = Local.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        ScheduleItem {
            id: "cell".into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            start,
            end: start,
            priority: None,
            is_task,
        }
    }

    #[test]
    fn task_cells_carry_a_marker_events_do_not() {
        assert_eq!(cell_label(&item("Essay", true), 8), "Essay*  ");
        assert_eq!(cell_label(&item("Essay", false), 8), "Essay   ");
    }

    #[test]
    fn marker_fits_multibyte_titles() {
        // Char count, not byte length, decides whether the marker fits.
        assert_eq!(cell_label(&item("数学", true), 8), "数学*     ");
    }

    #[test]
    fn full_cells_drop_the_marker() {
        assert_eq!(cell_label(&item("Homework", true), 3), "Hom");
    }
}
