use baikal_core::chat::{ChatRole, SUGGESTIONS};
use baikal_core::models::{date_part, time_part, ApprovalStatus, Priority, TaskStatus};
use baikal_core::records::approvals::{self, ApprovalFilter};
use baikal_core::records::dashboard::greeting;
use baikal_core::records::schedules::{self, day_name};
use chrono::{Local, Timelike};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode, LoginField, Modal, Screen};
use crate::panel::render_result_panel;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn approval_color(status: ApprovalStatus) -> Color {
    match status {
        ApprovalStatus::Draft => Color::Gray,
        ApprovalStatus::Pending => Color::Yellow,
        ApprovalStatus::Approved => Color::Green,
        ApprovalStatus::Rejected => Color::Red,
        ApprovalStatus::Other => Color::DarkGray,
    }
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => Color::Gray,
        Priority::Medium => Color::Blue,
        Priority::High => Color::Yellow,
        Priority::Urgent => Color::Red,
        Priority::Other => Color::DarkGray,
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    if !app.is_authenticated() {
        render_login(app, frame, area);
        return;
    }

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let show_result = app.show_result && app.chat.result_panel().is_some();
    let [sidebar_area, page_area, result_area, chat_area] = Layout::horizontal([
        Constraint::Length(16),
        Constraint::Min(30),
        Constraint::Length(if show_result { 42 } else { 0 }),
        Constraint::Length(if app.show_chat { 46 } else { 0 }),
    ])
    .areas(body_area);

    render_sidebar(app, frame, sidebar_area);

    app.page_area = Some(page_area);
    match app.screen {
        Screen::Dashboard => render_dashboard(app, frame, page_area),
        Screen::Approvals => render_approvals(app, frame, page_area),
        Screen::Tasks => render_tasks(app, frame, page_area),
        Screen::Schedules => render_schedules(app, frame, page_area),
        Screen::Notices => render_notices(app, frame, page_area),
    }

    app.panel_area = None;
    if show_result {
        render_result_panel(app, frame, result_area);
    }

    app.chat_area = None;
    if app.show_chat {
        render_chat(app, frame, chat_area);
    }

    render_footer(app, frame, footer_area);

    if let Some(modal) = app.modal.clone() {
        render_modal(&modal, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let user = app
        .auth
        .user()
        .map(|u| format!("{} · {} {}", u.name, u.department, u.position))
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled(" BAIKAL ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("AI 그룹웨어 ", Style::default().fg(Color::White)),
        Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), dim()),
        Span::raw("  "),
        Span::styled(user, Style::default().fg(Color::White)),
    ];
    if app.loading {
        spans.push(Span::styled("  불러오는 중...", Style::default().fg(Color::Yellow)));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_sidebar(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = Screen::ALL
        .iter()
        .enumerate()
        .map(|(i, screen)| {
            let style = if *screen == app.screen {
                Style::default().bg(Color::Cyan).fg(Color::Black).bold()
            } else {
                Style::default()
            };
            ListItem::new(format!(" {} {} ", i + 1, screen.label())).style(style)
        })
        .collect();

    let mut chat_label = Style::default().fg(Color::Cyan);
    if app.show_chat {
        chat_label = chat_label.add_modifier(Modifier::REVERSED);
    }

    let [nav_area, ai_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    let nav = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(dim())
            .title(" 메뉴 "),
    );
    frame.render_widget(nav, nav_area);

    let ai = Paragraph::new(Line::from(Span::styled(" c AI 어시스턴트", chat_label)))
        .block(Block::default().borders(Borders::ALL).border_style(dim()));
    frame.render_widget(ai, ai_area);
}

fn page_block(app: &App, title: String) -> Block<'static> {
    let focused = app.focus == FocusPane::Page;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(title)
}

// ── Dashboard ─────────────────────────────────────────────

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect) {
    let dashboard = &app.dashboard;
    let now = Local::now();
    let name = app.auth.user().map(|u| u.name).unwrap_or_default();

    let [greet_area, stats_area, grid_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(4),
        Constraint::Min(0),
    ])
    .areas(area);

    let greet = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}, {}님", greeting(now.hour()), name),
            Style::default().bold(),
        )),
        Line::from(Span::styled(format!(" {}", now.format("%Y년 %m월 %d일")), dim())),
    ]);
    frame.render_widget(greet, greet_area);

    let stats = [
        ("결재 대기", dashboard.pending_approvals(), Color::Yellow),
        ("진행 업무", dashboard.open_tasks(), Color::Magenta),
        ("예정 일정", dashboard.upcoming_schedules(), Color::Green),
        ("공지사항", dashboard.notice_count(), Color::Blue),
    ];
    let stat_areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(stats_area);
    for ((label, count, color), stat_area) in stats.into_iter().zip(stat_areas.iter()) {
        let card = Paragraph::new(vec![
            Line::from(Span::styled(count.to_string(), Style::default().fg(color).bold())),
            Line::from(Span::styled(label, dim())),
        ])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
        frame.render_widget(card, *stat_area);
    }

    let [top, bottom] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(grid_area);
    let [approvals_area, tasks_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);
    let [schedules_area, notices_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(bottom);

    let approvals: Vec<Line> = dashboard
        .recent_approvals()
        .iter()
        .map(|a| {
            Line::from(vec![
                Span::styled(format!("[{}] ", a.status.label()), Style::default().fg(approval_color(a.status))),
                Span::raw(a.title.clone()),
            ])
        })
        .collect();
    render_section(frame, approvals_area, " 최근 결재 ", approvals, "결재 문서가 없습니다");

    let tasks: Vec<Line> = dashboard
        .recent_tasks()
        .iter()
        .map(|t| {
            Line::from(vec![
                Span::styled(format!("[{}] ", t.status.label()), Style::default().fg(Color::Magenta)),
                Span::raw(t.title.clone()),
            ])
        })
        .collect();
    render_section(frame, tasks_area, " 내 업무 ", tasks, "업무가 없습니다");

    let schedules: Vec<Line> = dashboard
        .recent_schedules()
        .iter()
        .map(|s| {
            let when = s
                .start_time
                .as_deref()
                .map(|t| format!("{} {} ", date_part(t), time_part(t)))
                .unwrap_or_default();
            Line::from(vec![Span::styled(when, dim()), Span::raw(s.title.clone())])
        })
        .collect();
    render_section(frame, schedules_area, " 다가오는 일정 ", schedules, "일정이 없습니다");

    let notices: Vec<Line> = dashboard
        .recent_notices()
        .iter()
        .map(|n| {
            let pin = if n.is_pinned { "📌 " } else { "" };
            Line::from(vec![
                Span::raw(format!("{pin}{}", n.title)),
                Span::styled(format!("  {}", date_part(&n.created_at)), dim()),
            ])
        })
        .collect();
    render_section(frame, notices_area, " 공지사항 ", notices, "공지사항이 없습니다");
}

fn render_section(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>, empty: &str) {
    let lines = if lines.is_empty() {
        vec![Line::from(Span::styled(empty.to_string(), dim()))]
    } else {
        lines
    };
    let section = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(dim()).title(title.to_string()));
    frame.render_widget(section, area);
}

// ── Approvals ─────────────────────────────────────────────

fn render_approvals(app: &mut App, frame: &mut Frame, area: Rect) {
    let [tabs_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    let titles: Vec<Line> = ApprovalFilter::TABS
        .iter()
        .map(|tab| Line::from(format!(" {} {} ", tab.label(), approvals::count(&app.approvals, *tab))))
        .collect();
    let selected = ApprovalFilter::TABS
        .iter()
        .position(|tab| *tab == app.approval_filter)
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).bold().add_modifier(Modifier::UNDERLINED))
        .divider("|");
    frame.render_widget(tabs, tabs_area);

    let items: Vec<ListItem> = app
        .visible_approvals()
        .iter()
        .map(|a| {
            let author = a.author.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", a.status.label()),
                    Style::default().fg(approval_color(a.status)),
                ),
                Span::raw(a.title.clone()),
                Span::styled(
                    format!("  {} · {} · {}", a.category, author, date_part(&a.created_at)),
                    dim(),
                ),
            ]))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(page_block(app, " 전자결재 ".to_string()))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, list_area, &mut app.approval_state);

    if empty && !app.loading {
        render_empty(frame, list_area, "결재 문서가 없습니다");
    }
}

fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let inner = centered(area, message.chars().count() as u16 * 2 + 2, 1);
    frame.render_widget(Paragraph::new(Span::styled(message.to_string(), dim())), inner);
}

// ── Tasks ─────────────────────────────────────────────────

fn render_tasks(app: &mut App, frame: &mut Frame, area: Rect) {
    let column_areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let page_focused = app.focus == FocusPane::Page;

    for (status, column_area) in TaskStatus::COLUMNS.into_iter().zip(column_areas.iter()) {
        let active = status == app.task_column;
        let column = baikal_core::records::tasks::column(&app.tasks, status);

        let items: Vec<ListItem> = column
            .iter()
            .map(|t| {
                let mut meta = Vec::new();
                if let Some(priority) = t.priority {
                    meta.push(Span::styled(
                        format!("{} ", priority.label()),
                        Style::default().fg(priority_color(priority)),
                    ));
                }
                if let Some(due) = &t.due_date {
                    meta.push(Span::styled(format!("~{} ", date_part(due)), dim()));
                }
                if let Some(assignee) = &t.assignee {
                    meta.push(Span::styled(assignee.name.clone(), dim()));
                }
                ListItem::new(vec![Line::from(t.title.clone()), Line::from(meta), Line::default()])
            })
            .collect();

        let border = if active && page_focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" {} {} ", status.label(), column.len()));

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Magenta).fg(Color::White));

        if active {
            frame.render_stateful_widget(list, *column_area, &mut app.task_state);
        } else {
            frame.render_widget(list, *column_area);
        }
    }
}

// ── Schedules ─────────────────────────────────────────────

fn render_schedules(app: &App, frame: &mut Frame, area: Rect) {
    let today = Local::now().date_naive();
    let mut lines: Vec<Line> = Vec::new();

    for (date, entries) in schedules::group_by_date(&app.schedules) {
        let heading = if date.is_empty() {
            "날짜 미정".to_string()
        } else {
            match day_name(&date) {
                Some(day) => format!("{date} ({day})"),
                None => date.clone(),
            }
        };
        let mut heading_spans = vec![Span::styled(heading, Style::default().bold())];
        if schedules::is_today(&date, today) {
            heading_spans.push(Span::styled(" 오늘 ", Style::default().bg(Color::Green).fg(Color::Black)));
        }
        lines.push(Line::from(heading_spans));

        for schedule in entries {
            let start = schedule.start_time.as_deref().map(time_part).unwrap_or("");
            let end = schedule.end_time.as_deref().map(time_part).unwrap_or("");
            let range = if end.is_empty() { start.to_string() } else { format!("{start}-{end}") };
            let mut spans = vec![
                Span::styled(format!("  {range:<11} "), Style::default().fg(Color::Green)),
                Span::raw(schedule.title.clone()),
            ];
            if !schedule.location.is_empty() {
                spans.push(Span::styled(format!("  @{}", schedule.location), dim()));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::default());
    }

    if lines.is_empty() && !app.loading {
        lines.push(Line::from(Span::styled("등록된 일정이 없습니다", dim())));
    }

    let page = Paragraph::new(lines)
        .block(page_block(app, " 일정관리 ".to_string()))
        .scroll((app.schedule_scroll, 0));
    frame.render_widget(page, area);
}

// ── Notices ───────────────────────────────────────────────

fn render_notices(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .ordered_notices()
        .iter()
        .map(|n| {
            let author = n.author.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            let title = if n.is_pinned {
                Span::styled(format!("📌 {}", n.title), Style::default().fg(Color::Yellow).bold())
            } else {
                Span::raw(n.title.clone())
            };
            ListItem::new(Line::from(vec![
                title,
                Span::styled(format!("  {} · {}", author, date_part(&n.created_at)), dim()),
            ]))
        })
        .collect();

    let empty = items.is_empty();
    let list = List::new(items)
        .block(page_block(app, " 공지사항 ".to_string()))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut app.notice_state);

    if empty && !app.loading {
        render_empty(frame, area, "공지사항이 없습니다");
    }
}

// ── Chat ──────────────────────────────────────────────────

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    app.chat_area = Some(history_area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = history_area.height.saturating_sub(2);
    app.chat_width = history_area.width.saturating_sub(2);

    let chat_focused = app.focus == FocusPane::Chat;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if chat_focused { Color::Cyan } else { Color::DarkGray }))
        .title(" AI 어시스턴트 ");

    let messages = app.chat.messages();
    let loading = app.chat.is_loading();

    if messages.is_empty() && !loading {
        render_welcome(app, frame, history_area, block);
    } else {
        let mut lines: Vec<Line> = Vec::new();
        for msg in &messages {
            let (who, color) = match msg.role {
                ChatRole::User => ("나", Color::Cyan),
                ChatRole::Assistant => ("AI", Color::Yellow),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{who}:"), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}", msg.timestamp.format("%H:%M")), dim()),
            ]));
            for line in msg.content.lines() {
                lines.push(parse_markdown_line(line));
            }
            for result in msg.tool_results.iter().flatten() {
                let (mark, color) = if result.success { ("✓", Color::Green) } else { ("✗", Color::Red) };
                lines.push(Line::from(Span::styled(
                    format!("  {mark} {}", result.summary()),
                    Style::default().fg(color),
                )));
            }
            lines.push(Line::default());
        }

        if loading {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat(app.animation_frame as usize + 1);
            lines.push(Line::from(Span::styled(
                format!("AI가 처리 중입니다{dots}"),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        let chat = Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true })
            .scroll((app.chat_scroll, 0));
        frame.render_widget(chat, history_area);
    }

    render_chat_input(app, frame, input_area);
}

fn render_welcome(app: &mut App, frame: &mut Frame, area: Rect, block: Block<'static>) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [intro_area, suggestions_area] =
        Layout::vertical([Constraint::Length(4), Constraint::Min(0)]).areas(inner);

    let intro = Paragraph::new(vec![
        Line::from(Span::styled("무엇을 도와드릴까요?", Style::default().bold())),
        Line::from(Span::styled("결재, 업무, 일정, 공지를 말로 처리하세요.", dim())),
        Line::default(),
        Line::from(Span::styled("추천 질문 (j/k 선택, Enter 입력)", dim())),
    ])
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area);

    let items: Vec<ListItem> = SUGGESTIONS.iter().map(|s| ListItem::new(format!("› {s}"))).collect();
    let list = List::new(items).highlight_style(Style::default().fg(Color::Cyan).bold());
    frame.render_stateful_widget(list, suggestions_area, &mut app.suggestion_state);
}

fn render_chat_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" 메시지 (i 입력) ");

    // Horizontal scroll keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if editing {
        let cursor_x: u16 = app
            .chat_input
            .chars()
            .skip(scroll_offset)
            .take(cursor_pos - scroll_offset)
            .map(|c| if c.is_ascii() { 1 } else { 2 })
            .sum();
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

// ── Footer ────────────────────────────────────────────────

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " INPUT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {key} "), key_style),
            Span::styled(format!(" {label} "), label_style),
        ]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];

    let pairs: Vec<(&str, &str)> = match (app.input_mode, app.focus) {
        (InputMode::Editing, _) => vec![("Enter", "전송"), ("Esc", "취소")],
        (InputMode::Normal, FocusPane::Chat) => {
            vec![("j/k", "스크롤"), ("Enter", "입력"), ("X", "대화 초기화"), ("p", "결과")]
        }
        (InputMode::Normal, FocusPane::Panel) => vec![("j/k", "스크롤"), ("x", "닫기"), ("Esc", "숨기기")],
        (InputMode::Normal, FocusPane::Page) => match app.screen {
            Screen::Dashboard => vec![("R", "새로고침")],
            Screen::Approvals => vec![
                ("h/l", "필터"),
                ("Enter", "상세"),
                ("s", "상신"),
                ("y", "승인"),
                ("n", "반려"),
            ],
            Screen::Tasks => vec![("h/l", "열"), ("j/k", "선택"), ("m", "다음 단계")],
            Screen::Schedules => vec![("j/k", "스크롤")],
            Screen::Notices => vec![("j/k", "선택"), ("Enter", "상세")],
        },
    };
    for (key, label) in pairs {
        spans.extend(hint(key, label));
    }
    if app.input_mode == InputMode::Normal {
        for (key, label) in [("1-5", "메뉴"), ("Tab", "포커스"), ("c", "AI"), ("L", "로그아웃"), ("q", "종료")] {
            spans.extend(hint(key, label));
        }
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(format!("  {status}"), Style::default().fg(Color::Green)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Login ─────────────────────────────────────────────────

fn render_login(app: &App, frame: &mut Frame, area: Rect) {
    let form = &app.login;
    let popup = centered(area, 50, 12);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(" BAIKAL 로그인 ", Style::default().fg(Color::Cyan).bold()));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let [intro, email_area, password_area, status_area, hint_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    frame.render_widget(
        Paragraph::new(Span::styled("AI 기반 그룹웨어에 오신 것을 환영합니다", dim())),
        intro,
    );

    let field = |label: &'static str, value: String, active: bool| {
        Paragraph::new(value).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if active { Color::Yellow } else { Color::DarkGray }))
                .title(label),
        )
    };
    let masked = "•".repeat(form.password.chars().count());
    frame.render_widget(
        field(" 이메일 ", form.email.clone(), form.field == LoginField::Email),
        email_area,
    );
    frame.render_widget(
        field(" 비밀번호 ", masked, form.field == LoginField::Password),
        password_area,
    );

    let status = if form.submitting {
        Span::styled("로그인 중...", Style::default().fg(Color::Yellow))
    } else if let Some(error) = &form.error {
        Span::styled(error.clone(), Style::default().fg(Color::Red))
    } else {
        Span::raw("")
    };
    frame.render_widget(Paragraph::new(status), status_area);
    frame.render_widget(
        Paragraph::new(Span::styled("Tab 이동 · Enter 로그인 · Esc 종료", dim())),
        hint_area,
    );

    if !form.submitting {
        let (target, chars) = match form.field {
            LoginField::Email => (email_area, form.email.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum::<u16>()),
            LoginField::Password => (password_area, form.password.chars().count() as u16),
        };
        frame.set_cursor_position((target.x + 1 + chars, target.y + 1));
    }
}

// ── Modals ────────────────────────────────────────────────

fn render_modal(modal: &Modal, frame: &mut Frame, area: Rect) {
    match modal {
        Modal::Alert(message) => {
            let popup = centered(area, 50, 7);
            frame.render_widget(Clear, popup);
            let text = vec![
                Line::default(),
                Line::from(Span::raw(message.clone())),
                Line::default(),
                Line::from(Span::styled("Enter 확인", dim())),
            ];
            let alert = Paragraph::new(text).wrap(Wrap { trim: true }).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" 오류 "),
            );
            frame.render_widget(alert, popup);
        }
        Modal::ApprovalDetail(approval) => {
            let popup = centered(area, 70, 24);
            frame.render_widget(Clear, popup);

            let author = approval.author.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", approval.status.label()),
                        Style::default().fg(approval_color(approval.status)),
                    ),
                    Span::styled(approval.title.clone(), Style::default().bold()),
                ]),
                Line::from(Span::styled(
                    format!("{} · {} · {}", approval.category, author, date_part(&approval.created_at)),
                    dim(),
                )),
                Line::default(),
            ];
            lines.extend(approval.content.lines().map(|l| Line::from(l.to_string())));

            if !approval.approval_lines.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("결재라인", Style::default().bold())));
                for line in &approval.approval_lines {
                    let status = ApprovalStatus::from_action(&line.action);
                    let approver = line.approver.as_ref().map(|u| u.name.clone()).unwrap_or_default();
                    let mut spans = vec![
                        Span::raw(format!("  {}. {} ", line.order, approver)),
                        Span::styled(format!("[{}]", status.label()), Style::default().fg(approval_color(status))),
                    ];
                    if !line.comment.is_empty() {
                        spans.push(Span::styled(format!("  \"{}\"", line.comment), dim()));
                    }
                    lines.push(Line::from(spans));
                }
            }

            let mut actions = vec!["Esc 닫기"];
            if approvals::can_submit(approval) {
                actions.push("s 결재 상신");
            }
            if approvals::can_decide(approval) {
                actions.push("y 승인");
                actions.push("n 반려");
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(actions.join(" · "), Style::default().fg(Color::Cyan))));

            let detail = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Blue))
                    .title(" 결재 문서 "),
            );
            frame.render_widget(detail, popup);
        }
        Modal::NoticeDetail(notice) => {
            let popup = centered(area, 70, 20);
            frame.render_widget(Clear, popup);

            let author = notice.author.as_ref().map(|u| u.name.clone()).unwrap_or_default();
            let mut lines = vec![
                Line::from(Span::styled(notice.title.clone(), Style::default().bold())),
                Line::from(Span::styled(format!("{} · {}", author, date_part(&notice.created_at)), dim())),
                Line::default(),
            ];
            lines.extend(notice.content.lines().map(|l| Line::from(l.to_string())));

            let detail = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Yellow))
                    .title(" 공지사항 "),
            );
            frame.render_widget(detail, popup);
        }
        Modal::Comment { action, input, cursor, .. } => {
            let popup = centered(area, 56, 5);
            frame.render_widget(Clear, popup);

            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(format!(" {} 코멘트 ", action.label()))
                .title_bottom(Line::from(" Enter 확인 · Esc 취소 ").alignment(Alignment::Right));
            let inner = block.inner(popup);
            frame.render_widget(block, popup);
            frame.render_widget(
                Paragraph::new(input.clone()).style(Style::default().fg(Color::Cyan)),
                inner,
            );

            let cursor_x: u16 = input
                .chars()
                .take(*cursor)
                .map(|c| if c.is_ascii() { 1 } else { 2 })
                .sum();
            frame.set_cursor_position((inner.x + cursor_x.min(inner.width), inner.y));
        }
    }
}
