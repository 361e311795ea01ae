mod app;
mod components;
mod event;
mod schedule;
mod store;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, ViewMode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};

use components::forms::FormField;

fn main() -> Result<()> {
    color_eyre::install()?;

    let mut app = App::new()?;

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app);
    tui::restore()?;
    result
}

fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();
            let w = area.width;

            // Main layout: content + status bar
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            let content_area = layout[0];

            match app.view_mode {
                ViewMode::Month => render_month_layout(frame, content_area, app, w),
                ViewMode::Week => {
                    components::WeekView::render(
                        frame,
                        content_area,
                        app.selected_date,
                        app.today,
                        app.week_start(),
                        &app.week_items,
                    );
                }
                ViewMode::Day => {
                    components::DayView::render(
                        frame,
                        content_area,
                        app.selected_date,
                        &app.day_items,
                        app.day_selected,
                    );
                }
                ViewMode::Tasks => {
                    components::TaskList::render(
                        frame,
                        content_area,
                        &app.sorted_tasks(),
                        app.progress_summary(),
                        app.task_selected,
                    );
                }
                ViewMode::Plans => {
                    components::PlanList::render(
                        frame,
                        content_area,
                        &app.plans_with_progress(),
                        app.plan_selected,
                    );
                }
            }

            // Render create-form overlay
            if let Some(ref form) = app.form {
                components::Form::render(frame, area, form);
            }

            // Render detail popup overlay
            if app.detail_open {
                match app.view_mode {
                    ViewMode::Plans => {
                        if let Some((plan, percent)) =
                            app.plans_with_progress().get(app.plan_selected).copied()
                        {
                            components::plan_list::render_plan_detail(frame, area, plan, percent);
                        }
                    }
                    _ => {
                        if let Some(item) = app.selected_item() {
                            components::day_view::render_detail_popup(frame, area, item);
                        }
                    }
                }
            }

            if app.show_help {
                render_help(frame, area);
            }

            render_status_bar(frame, layout[1], app, w);
        })?;

        if let Some(key) = event::next_key_event(Duration::from_millis(100))? {
            // Clear status message on any key
            app.status_message = None;

            // Help overlay takes priority
            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            // Detail popup takes priority
            if app.detail_open {
                if key.code == KeyCode::Esc || key.code == KeyCode::Enter {
                    app.detail_open = false;
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Week,
        (KeyCode::Char('3'), _) => app.view_mode = ViewMode::Day,
        (KeyCode::Char('4'), _) => app.view_mode = ViewMode::Tasks,
        (KeyCode::Char('5'), _) => app.view_mode = ViewMode::Plans,
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('r'), _) => {
            app.refresh();
            app.status_message = Some("Refreshed".to_string());
        }
        (KeyCode::Char('n'), _) => app.open_form(),
        (KeyCode::Char('a'), _) => app.open_task_form(),
        (KeyCode::Char('e'), _) => app.open_edit_form(),
        (KeyCode::Char('d'), _) => app.delete_selected(),
        (KeyCode::Char(' '), _) => app.toggle_selected_task(),
        (KeyCode::Enter, _) => app.detail_open = true,
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
            if app.view_mode == ViewMode::Week {
                app.prev_week();
            } else {
                app.select_prev();
            }
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
            if app.view_mode == ViewMode::Week {
                app.next_week();
            } else {
                app.select_next();
            }
        }
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => {
            if let Some(ref mut form) = app.form {
                form.next_field();
            }
        }
        KeyCode::BackTab => {
            if let Some(ref mut form) = app.form {
                form.prev_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(ref mut form) = app.form {
                form.backspace();
            }
        }
        KeyCode::Char(' ') => {
            // Space cycles the priority, otherwise it is plain input
            if let Some(ref mut form) = app.form {
                if form.active_field() == FormField::Priority {
                    form.cycle_priority();
                } else {
                    form.input_char(' ');
                }
            }
        }
        KeyCode::Char(c) => {
            if let Some(ref mut form) = app.form {
                form.input_char(c);
            }
        }
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App, total_width: u16) {
    if total_width < 60 {
        components::MonthView::render(
            frame,
            area,
            app.selected_date,
            app.today,
            &app.month_marks,
        );
    } else {
        let month_w = if total_width >= 100 { 44 } else { 30 };
        let content =
            Layout::horizontal([Constraint::Length(month_w), Constraint::Min(20)]).split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.selected_date,
            app.today,
            &app.month_marks,
        );

        // On roomy terminals the day panel shares its column with an
        // upcoming-tasks dashboard.
        let upcoming = app.upcoming();
        let day_area = if area.height >= 20 && !upcoming.is_empty() {
            let panel = Layout::vertical([Constraint::Min(10), Constraint::Length(5)])
                .split(content[1]);
            components::task_list::render_upcoming(frame, panel[1], &upcoming);
            panel[0]
        } else {
            content[1]
        };

        components::DayView::render(
            frame,
            day_area,
            app.selected_date,
            &app.day_items,
            app.day_selected,
        );
    }
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App, w: u16) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let w = w as usize;

    let mode_str = match app.view_mode {
        ViewMode::Month => "[1]Month",
        ViewMode::Week => "[2]Week",
        ViewMode::Day => "[3]Day",
        ViewMode::Tasks => "[4]Tasks",
        ViewMode::Plans => "[5]Plans",
    };

    let focus_indicator = match app.input_mode {
        InputMode::Form if app.form.as_ref().is_some_and(|f| f.editing_id().is_some()) => " [Edit]",
        InputMode::Form => " [New Entry]",
        InputMode::Normal => "",
    };

    // Show status message if present, otherwise show context-aware hints
    let right_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        match app.view_mode {
            ViewMode::Day | ViewMode::Month if w >= 80 => {
                " hjkl:Nav [/]:Mon t:Today Enter:Detail Sp:Toggle n:New e:Edit d:Del ?:Help q:Quit"
                    .to_string()
            }
            ViewMode::Day | ViewMode::Month if w >= 50 => {
                " jk:Select Enter:Detail Sp:Toggle n:New q:Quit".to_string()
            }
            ViewMode::Tasks | ViewMode::Plans if w >= 70 => {
                " jk:Select Sp:Toggle Enter:Detail n:New e:Edit d:Del ?:Help q:Quit".to_string()
            }
            ViewMode::Week if w >= 70 => {
                " hl:Day jk:Week [/]:Mon t:Today n:New ?:Help q:Quit".to_string()
            }
            _ => " ?:Help q:Quit".to_string(),
        }
    };

    let left = format!(" {}{} ", mode_str, focus_indicator);
    let padding_len = w.saturating_sub(left.len() + right_text.len());
    let padding = " ".repeat(padding_len);

    let line = Line::from(vec![
        Span::styled(left, theme::current().status),
        Span::styled(padding, theme::current().status),
        Span::styled(right_text, theme::current().status),
    ]);

    let bar = Paragraph::new(line).style(theme::current().status);
    frame.render_widget(bar, area);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(24).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l ", key_style),
            Span::styled("or ", theme::current().dim),
            Span::styled("\u{2190}/\u{2192}  ", key_style),
            Span::styled("Previous/next day", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  j/k       ", key_style),
            Span::styled("Move selection (week: jump week)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Views", section_style)),
        Line::from(vec![
            Span::styled("  1/2/3     ", key_style),
            Span::styled("Month / Week / Day view", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  4/5       ", key_style),
            Span::styled("Tasks / Learning plans", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Actions", section_style)),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("View details", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  Space     ", key_style),
            Span::styled("Toggle task completion", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("New entry for the current view", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  a         ", key_style),
            Span::styled("New task on the selected day", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  e         ", key_style),
            Span::styled("Edit selected entry", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete selected entry", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  r         ", key_style),
            Span::styled("Recompute schedule buckets", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::current().dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
