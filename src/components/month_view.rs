use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::schedule;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        days_with_items: &HashSet<u32>,
    ) {
        let month = selected_date.month();

        let block = Block::default()
            .title(format!(" {} ", schedule::month_title(selected_date)))
            .title_style(theme::HEADER_STYLE)
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Header row
        let header_cells: Vec<Span> = DAY_NAMES
            .iter()
            .map(|d| Span::styled(format!("{:^5}", d), theme::HEADER_STYLE))
            .collect();
        let header = Line::from(header_cells);

        let grid = schedule::month_grid(selected_date.year(), month);

        let mut weeks: Vec<Line> = Vec::new();
        for week in &grid {
            let mut cells: Vec<Span> = Vec::new();
            for cell in week {
                let day = cell.date.day();
                let has_item = cell.in_month && days_with_items.contains(&day);

                let day_str = if has_item {
                    format!("{:>2}* ", day)
                } else {
                    format!("{:>2}  ", day)
                };

                let style = if cell.date == today && cell.date == selected_date {
                    Style::default()
                        .fg(ratatui::style::Color::Black)
                        .bg(ratatui::style::Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                } else if cell.date == selected_date {
                    theme::current().selected
                } else if cell.date == today {
                    theme::current().today
                } else if !cell.in_month {
                    theme::current().dim
                } else if has_item {
                    theme::current().highlight
                } else {
                    Style::default()
                };

                cells.push(Span::styled(format!(" {}", day_str), style));
            }
            weeks.push(Line::from(cells));
        }

        // Layout: header + weeks
        let mut constraints = vec![Constraint::Length(1)]; // header
        for _ in &weeks {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(0)); // fill remaining

        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.iter().enumerate() {
            frame.render_widget(Paragraph::new(week.clone()), rows[i + 1]);
        }
    }
}
