use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::store::LearningPlan;
use crate::theme;

pub struct PlanList;

impl PlanList {
    /// `plans` is paired with the progress percentage derived for each plan.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        plans: &[(&LearningPlan, u8)],
        selected_index: usize,
    ) {
        let title = format!(" Learning Plans ({}) ", plans.len());

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .borders(Borders::ALL)
            .border_style(theme::BORDER_STYLE);

        if plans.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No learning plans").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let mut items: Vec<ListItem> = Vec::new();

        for (i, (plan, percent)) in plans.iter().enumerate() {
            let is_selected = i == selected_index;

            let title_style = if is_selected {
                theme::current().selected
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            items.push(ListItem::new(Line::from(vec![
                Span::styled(format!(" {}", plan.title), title_style),
                Span::styled(
                    format!("  [{}]", plan.priority.label().to_lowercase()),
                    Style::default().fg(theme::priority_color(plan.priority)),
                ),
            ])));

            items.push(ListItem::new(Line::from(vec![
                Span::styled("   ", Style::default()),
                Span::styled(plan.date_range_display(), theme::current().dim),
            ])));

            let bar_w = inner_w.saturating_sub(12).clamp(10, 40);
            items.push(ListItem::new(Line::from(vec![
                Span::styled("   ", Style::default()),
                progress_bar(*percent, bar_w),
                Span::styled(format!(" {:>3}%", percent), Style::default()),
            ])));

            items.push(ListItem::new(Line::from("")));
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn progress_bar(percent: u8, width: usize) -> Span<'static> {
    // Stored percentages carry no invariant, so anything above 100 just
    // shows a full bar.
    let filled = (percent.min(100) as usize * width) / 100;
    let bar: String = "█".repeat(filled) + &"░".repeat(width - filled);
    Span::styled(bar, Style::default().fg(Color::Blue))
}

/// Detail popup mirroring the plan page: dates, progress, category, notes.
pub fn render_plan_detail(frame: &mut Frame, area: Rect, plan: &LearningPlan, percent: u8) {
    let popup_w = area.width.min(60).max(30);
    let popup_h = area.height.min(14).max(8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", plan.title))
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines: Vec<Line> = Vec::new();

    if !plan.description.is_empty() {
        lines.push(Line::from(plan.description.clone()));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(vec![
        Span::styled("Start: ", theme::current().dim),
        Span::styled(plan.start_date.format("%B %d, %Y").to_string(), Style::default()),
    ]));
    lines.push(Line::from(vec![
        Span::styled("End:   ", theme::current().dim),
        Span::styled(plan.end_date.format("%B %d, %Y").to_string(), Style::default()),
    ]));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Progress: ", theme::current().dim),
        progress_bar(percent, inner.width.saturating_sub(16) as usize),
        Span::styled(format!(" {}%", percent), Style::default()),
    ]));

    if !plan.category.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Category: ", theme::current().dim),
            Span::styled(
                plan.category.clone(),
                Style::default().fg(theme::category_color(&plan.category)),
            ),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("Priority: ", theme::current().dim),
        Span::styled(
            plan.priority.label(),
            Style::default().fg(theme::priority_color(plan.priority)),
        ),
    ]));

    if let Some(ref notes) = plan.notes {
        if !notes.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Notes:", theme::current().dim)));
            for line in notes.lines() {
                lines.push(Line::from(line.to_string()));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Esc to close", theme::current().dim)));

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0, 10).content, "░".repeat(10));
        assert_eq!(progress_bar(50, 10).content, format!("{}{}", "█".repeat(5), "░".repeat(5)));
        assert_eq!(progress_bar(100, 10).content, "█".repeat(10));
    }

    #[test]
    fn progress_bar_saturates_above_one_hundred() {
        // Stored plan progress is unconstrained on disk.
        assert_eq!(progress_bar(150, 20).content, "█".repeat(20));
        assert_eq!(progress_bar(u8::MAX, 1).content, "█");
    }
}
