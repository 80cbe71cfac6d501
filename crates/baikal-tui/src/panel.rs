//! Drawing for the AI result panel.

use baikal_core::models::{date_part, time_part};
use baikal_core::panel::{detail_body, detail_rows, row_date};
use baikal_core::{PanelContent, PanelError, PanelView, ResultKind};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, FocusPane};

pub fn kind_color(kind: ResultKind) -> Color {
    match kind {
        ResultKind::Approval | ResultKind::Approvals => Color::Blue,
        ResultKind::Task | ResultKind::Tasks => Color::Magenta,
        ResultKind::Schedule | ResultKind::Schedules => Color::Green,
        ResultKind::Notice | ResultKind::Notices => Color::Yellow,
        ResultKind::Users => Color::Gray,
    }
}

pub fn render_result_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    app.panel_area = Some(area);
    let Some(content) = app.result_content() else {
        return;
    };

    let focused = app.focus == FocusPane::Panel;
    let (title, color, text) = match content {
        Ok(content) => (
            format!(" {} ", content.kind.label()),
            kind_color(content.kind),
            panel_text(&content),
        ),
        Err(err) => (" 결과 ".to_string(), Color::Red, error_text(&err)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { color }))
        .title(Span::styled(title, Style::default().fg(color).bold()))
        .title_bottom(Line::from(" x 닫기 ").alignment(Alignment::Right));

    let panel = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.panel_scroll, 0));
    frame.render_widget(panel, area);
}

fn error_text(err: &PanelError) -> Text<'static> {
    Text::from(vec![
        Line::from(Span::styled(
            "결과를 표시할 수 없습니다",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::DarkGray))),
    ])
}

fn panel_text(content: &PanelContent) -> Text<'static> {
    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line<'static>> = Vec::new();

    if let Some(message) = &content.message {
        lines.push(Line::from(Span::styled(
            format!("✓ {message}"),
            Style::default().fg(Color::Green),
        )));
        lines.push(Line::default());
    }

    if !content.kind.is_list() {
        for (label, value) in detail_rows(&content.view) {
            lines.push(Line::from(vec![
                Span::styled(format!("{label:<6} "), label_style),
                Span::raw(value),
            ]));
        }
        if let Some((heading, body)) = detail_body(&content.view) {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(heading.to_string(), label_style)));
            lines.extend(body.lines().map(|l| Line::from(l.to_string())));
        }
        return Text::from(lines);
    }

    let before = lines.len();
    match &content.view {
        PanelView::Users(users) => {
            for user in users {
                lines.push(Line::from(vec![
                    Span::styled(user.name.clone(), Style::default().bold()),
                    Span::styled(
                        format!("  {} · {}", user.department, user.position),
                        label_style,
                    ),
                ]));
            }
        }
        PanelView::Approvals(rows) => {
            for row in rows {
                lines.push(Line::from(vec![
                    Span::styled(format!("[{}] ", row.status_label()), Style::default().fg(Color::Blue)),
                    Span::raw(row.title.clone()),
                    Span::styled(format!("  {}", row_date(row.created_at.as_ref())), label_style),
                ]));
            }
        }
        PanelView::Tasks(rows) => {
            for row in rows {
                lines.push(Line::from(vec![
                    Span::raw(row.title.clone()),
                    Span::styled(format!("  {} · {}", row.status, row.priority), label_style),
                ]));
            }
        }
        PanelView::Schedules(rows) => {
            for row in rows {
                let when = row
                    .start_time
                    .as_deref()
                    .map(|t| format!("  {} {}", date_part(t), time_part(t)))
                    .unwrap_or_default();
                lines.push(Line::from(vec![
                    Span::raw(row.title.clone()),
                    Span::styled(when, label_style),
                ]));
            }
        }
        PanelView::Notices(rows) => {
            for row in rows {
                lines.push(Line::from(vec![
                    Span::raw(row.title.clone()),
                    Span::styled(
                        format!("  {} · {}", row.author, row_date(row.created_at.as_ref())),
                        label_style,
                    ),
                ]));
            }
        }
        _ => {}
    }

    if lines.len() == before {
        lines.push(Line::from(Span::styled("결과가 없습니다", label_style)));
    }
    Text::from(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use baikal_core::ResultPanel;
    use serde_json::json;

    fn text_of(kind: &str, data: serde_json::Value) -> String {
        let panel = ResultPanel { kind: kind.to_string(), data };
        let content = PanelContent::parse(&panel).unwrap();
        panel_text(&content)
            .lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_schedule_card_lists_fields() {
        let text = text_of(
            "schedule",
            json!({
                "message": "일정 '팀 회의'이(가) 등록되었습니다.",
                "title": "팀 회의",
                "start_time": "2025-01-02 14:00:00",
                "location": ""
            }),
        );
        assert!(text.starts_with("✓ 일정 '팀 회의'이(가) 등록되었습니다."));
        assert!(text.contains("팀 회의"));
        assert!(text.contains("2025-01-02 14:00:00"));
        assert!(!text.contains("장소"));
    }

    #[test]
    fn test_empty_list_says_so() {
        let text = text_of("tasks", json!({ "tasks": [] }));
        assert_eq!(text, "결과가 없습니다");
    }
}
