use std::sync::Arc;

use baikal_core::chat::{ChatMessage, Rejected, SendOutcome};
use baikal_core::config::Config;
use baikal_core::models::{Approval, ApprovalAction, Notice, Schedule, Task, TaskStatus};
use baikal_core::records::approvals::{self, ApprovalFilter};
use baikal_core::records::dashboard::Dashboard;
use baikal_core::records::{alert_text, notices, schedules, tasks};
use baikal_core::{AuthStore, ChatStore, PanelContent, PanelError, RecordsApi};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::{AppEvent, BackendEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Approvals,
    Tasks,
    Schedules,
    Notices,
}

impl Screen {
    pub const ALL: [Screen; 5] = [
        Screen::Dashboard,
        Screen::Approvals,
        Screen::Tasks,
        Screen::Schedules,
        Screen::Notices,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Dashboard => "대시보드",
            Screen::Approvals => "전자결재",
            Screen::Tasks => "업무관리",
            Screen::Schedules => "일정관리",
            Screen::Notices => "공지사항",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Page,
    Chat,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub field: LoginField,
    pub submitting: bool,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn active_input(&mut self) -> &mut String {
        match self.field {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Modal {
    /// Blocking error popup; any key dismisses it.
    Alert(String),
    ApprovalDetail(Approval),
    NoticeDetail(Notice),
    Comment {
        approval_id: String,
        action: ApprovalAction,
        input: String,
        cursor: usize,
    },
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub login: LoginForm,
    pub modal: Option<Modal>,
    /// One-line notice in the footer, e.g. after login.
    pub status: Option<String>,

    // Services
    pub auth: Arc<AuthStore>,
    pub chat: Arc<ChatStore>,
    pub records: Arc<dyn RecordsApi>,
    events: UnboundedSender<AppEvent>,

    // Page data
    pub loading: bool,
    pub dashboard: Dashboard,
    pub approvals: Vec<Approval>,
    pub approval_filter: ApprovalFilter,
    pub approval_state: ListState,
    pub tasks: Vec<Task>,
    pub task_column: TaskStatus,
    pub task_state: ListState,
    pub schedules: Vec<Schedule>,
    pub schedule_scroll: u16,
    pub notices: Vec<Notice>,
    pub notice_state: ListState,

    // Chat state
    pub show_chat: bool,
    pub show_result: bool,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub suggestion_state: ListState,
    pub panel_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub page_area: Option<Rect>,
    pub chat_area: Option<Rect>,
    pub panel_area: Option<Rect>,
}

impl App {
    pub fn new(
        auth: Arc<AuthStore>,
        chat: Arc<ChatStore>,
        records: Arc<dyn RecordsApi>,
        events: UnboundedSender<AppEvent>,
        config: &Config,
    ) -> Self {
        let login = LoginForm {
            email: config.last_email.clone().unwrap_or_default(),
            ..LoginForm::default()
        };

        Self {
            should_quit: false,
            screen: Screen::Dashboard,
            input_mode: InputMode::Normal,
            focus: FocusPane::Page,
            login,
            modal: None,
            status: None,
            auth,
            chat,
            records,
            events,
            loading: false,
            dashboard: Dashboard::default(),
            approvals: Vec::new(),
            approval_filter: ApprovalFilter::All,
            approval_state: ListState::default(),
            tasks: Vec::new(),
            task_column: TaskStatus::Todo,
            task_state: ListState::default(),
            schedules: Vec::new(),
            schedule_scroll: 0,
            notices: Vec::new(),
            notice_state: ListState::default(),
            show_chat: false,
            show_result: false,
            chat_input: String::new(),
            chat_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            suggestion_state: ListState::default(),
            panel_scroll: 0,
            animation_frame: 0,
            page_area: None,
            chat_area: None,
            panel_area: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    /// Probe a restored session and load the landing page.
    pub fn start(&mut self) {
        if !self.is_authenticated() {
            return;
        }
        let auth = self.auth.clone();
        self.spawn(async move { BackendEvent::SessionChecked(auth.fetch_me().await) });
        self.load_screen();
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = BackendEvent> + Send + 'static,
    {
        let tx = self.events.clone();
        tokio::spawn(async move {
            let event = task.await;
            // The receiver only goes away at shutdown.
            let _ = tx.send(AppEvent::Backend(event));
        });
    }

    // ── Session ───────────────────────────────────────────

    pub fn submit_login(&mut self) {
        if self.login.submitting {
            return;
        }
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        if email.is_empty() || password.is_empty() {
            self.login.error = Some("이메일과 비밀번호를 입력하세요".to_string());
            return;
        }

        self.login.submitting = true;
        self.login.error = None;
        let auth = self.auth.clone();
        self.spawn(async move {
            let result = auth.login(&email, &password).await;
            if result.is_ok() {
                if let Err(err) = Config::save_last_email(&email) {
                    tracing::warn!(%err, "failed to remember login email");
                }
            }
            BackendEvent::LoggedIn(result.map_err(|e| {
                e.detail().unwrap_or("로그인에 실패했습니다").to_string()
            }))
        });
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.reset_after_logout();
    }

    fn reset_after_logout(&mut self) {
        self.login.password.clear();
        self.login.field = LoginField::Email;
        self.login.submitting = false;
        self.modal = None;
        self.input_mode = InputMode::Normal;
        self.focus = FocusPane::Page;
        self.screen = Screen::Dashboard;
    }

    // ── Pages ─────────────────────────────────────────────

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
        self.focus = FocusPane::Page;
        self.load_screen();
    }

    pub fn next_screen(&mut self) {
        let idx = Screen::ALL.iter().position(|s| *s == self.screen).unwrap_or(0);
        self.switch_screen(Screen::ALL[(idx + 1) % Screen::ALL.len()]);
    }

    pub fn prev_screen(&mut self) {
        let idx = Screen::ALL.iter().position(|s| *s == self.screen).unwrap_or(0);
        self.switch_screen(Screen::ALL[(idx + Screen::ALL.len() - 1) % Screen::ALL.len()]);
    }

    /// Fetch the current page's collection.
    pub fn load_screen(&mut self) {
        self.loading = true;
        let api = self.records.clone();
        match self.screen {
            Screen::Dashboard => {
                self.spawn(async move { BackendEvent::Dashboard(Dashboard::load(api.as_ref()).await) })
            }
            Screen::Approvals => self.spawn(async move {
                BackendEvent::Approvals(approvals::load(api.as_ref()).await.map_err(|e| alert_text(&e)))
            }),
            Screen::Tasks => self.spawn(async move {
                BackendEvent::Tasks(tasks::load(api.as_ref()).await.map_err(|e| alert_text(&e)))
            }),
            Screen::Schedules => self.spawn(async move {
                BackendEvent::Schedules(schedules::load(api.as_ref()).await.map_err(|e| alert_text(&e)))
            }),
            Screen::Notices => self.spawn(async move {
                BackendEvent::Notices(notices::load(api.as_ref()).await.map_err(|e| alert_text(&e)))
            }),
        }
    }

    pub fn apply_backend(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::LoggedIn(Ok(user)) => {
                self.login.submitting = false;
                self.login.password.clear();
                self.status = Some(format!("로그인 성공! {}님 환영합니다", user.name));
                self.switch_screen(Screen::Dashboard);
            }
            BackendEvent::LoggedIn(Err(message)) => {
                self.login.submitting = false;
                self.login.error = Some(message);
            }
            BackendEvent::SessionChecked(valid) => {
                if !valid {
                    self.reset_after_logout();
                    self.login.error = Some("세션이 만료되었습니다. 다시 로그인하세요".to_string());
                }
            }
            BackendEvent::Dashboard(dashboard) => {
                self.loading = false;
                self.dashboard = dashboard;
            }
            BackendEvent::Approvals(result) => {
                self.loading = false;
                match result {
                    Ok(items) => {
                        self.approvals = items;
                        self.clamp_approval_selection();
                    }
                    Err(message) => self.alert(message),
                }
            }
            BackendEvent::Tasks(result) => {
                self.loading = false;
                match result {
                    Ok(items) => {
                        self.tasks = items;
                        self.clamp_task_selection();
                    }
                    Err(message) => self.alert(message),
                }
            }
            BackendEvent::Schedules(result) => {
                self.loading = false;
                match result {
                    Ok(items) => self.schedules = items,
                    Err(message) => self.alert(message),
                }
            }
            BackendEvent::Notices(result) => {
                self.loading = false;
                match result {
                    Ok(items) => {
                        self.notices = items;
                        clamp(&mut self.notice_state, self.notices.len());
                    }
                    Err(message) => self.alert(message),
                }
            }
            BackendEvent::TransitionFailed(message) => {
                self.loading = false;
                self.alert(message);
            }
            BackendEvent::ChatSettled { outcome, text } => self.chat_settled(outcome, text),
        }
    }

    fn alert(&mut self, message: String) {
        self.modal = Some(Modal::Alert(message));
    }

    // ── Approvals ─────────────────────────────────────────

    pub fn visible_approvals(&self) -> Vec<&Approval> {
        approvals::filter(&self.approvals, self.approval_filter)
    }

    pub fn selected_approval(&self) -> Option<&Approval> {
        let idx = self.approval_state.selected()?;
        self.visible_approvals().get(idx).copied()
    }

    pub fn set_approval_filter(&mut self, filter: ApprovalFilter) {
        self.approval_filter = filter;
        self.approval_state.select(None);
        self.clamp_approval_selection();
    }

    fn clamp_approval_selection(&mut self) {
        let len = self.visible_approvals().len();
        clamp(&mut self.approval_state, len);
    }

    pub fn open_selected_approval(&mut self) {
        if let Some(approval) = self.selected_approval().cloned() {
            self.modal = Some(Modal::ApprovalDetail(approval));
        }
    }

    /// Target of an approval action: the open detail modal, else the
    /// highlighted row.
    fn approval_target(&self) -> Option<Approval> {
        match &self.modal {
            Some(Modal::ApprovalDetail(approval)) => Some(approval.clone()),
            _ => self.selected_approval().cloned(),
        }
    }

    pub fn submit_selected_approval(&mut self) {
        let Some(approval) = self.approval_target() else { return };
        if !approvals::can_submit(&approval) {
            return;
        }
        self.modal = None;
        self.loading = true;
        let api = self.records.clone();
        self.spawn(async move {
            match approvals::submit(api.as_ref(), &approval.id).await {
                Ok(items) => BackendEvent::Approvals(Ok(items)),
                Err(err) => BackendEvent::TransitionFailed(alert_text(&err)),
            }
        });
    }

    /// Ask for a comment before approving or rejecting.
    pub fn begin_decision(&mut self, action: ApprovalAction) {
        let Some(approval) = self.approval_target() else { return };
        if !approvals::can_decide(&approval) {
            return;
        }
        self.modal = Some(Modal::Comment {
            approval_id: approval.id,
            action,
            input: String::new(),
            cursor: 0,
        });
    }

    pub fn confirm_decision(&mut self) {
        let Some(Modal::Comment { approval_id, action, input, .. }) = self.modal.take() else {
            return;
        };
        self.loading = true;
        let api = self.records.clone();
        self.spawn(async move {
            match approvals::decide(api.as_ref(), &approval_id, action, input.trim()).await {
                Ok(items) => BackendEvent::Approvals(Ok(items)),
                Err(err) => BackendEvent::TransitionFailed(alert_text(&err)),
            }
        });
    }

    // ── Tasks ─────────────────────────────────────────────

    pub fn column_tasks(&self) -> Vec<&Task> {
        tasks::column(&self.tasks, self.task_column)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let idx = self.task_state.selected()?;
        self.column_tasks().get(idx).copied()
    }

    pub fn shift_task_column(&mut self, forward: bool) {
        let columns = TaskStatus::COLUMNS;
        let idx = columns.iter().position(|c| *c == self.task_column).unwrap_or(0);
        let idx = if forward {
            (idx + 1).min(columns.len() - 1)
        } else {
            idx.saturating_sub(1)
        };
        self.task_column = columns[idx];
        self.task_state.select(None);
        self.clamp_task_selection();
    }

    fn clamp_task_selection(&mut self) {
        let len = self.column_tasks().len();
        clamp(&mut self.task_state, len);
    }

    /// Move the highlighted task one column to the right.
    pub fn advance_selected_task(&mut self) {
        let Some(task) = self.selected_task() else { return };
        let Some(next) = task.status.next() else { return };
        let id = task.id.clone();
        self.loading = true;
        let api = self.records.clone();
        self.spawn(async move {
            match tasks::move_task(api.as_ref(), &id, next).await {
                Ok(items) => BackendEvent::Tasks(Ok(items)),
                Err(err) => BackendEvent::TransitionFailed(alert_text(&err)),
            }
        });
    }

    // ── Notices ───────────────────────────────────────────

    /// Notices in display order: pinned first.
    pub fn ordered_notices(&self) -> Vec<&Notice> {
        let (mut pinned, regular) = notices::partition_pinned(&self.notices);
        pinned.extend(regular);
        pinned
    }

    pub fn open_selected_notice(&mut self) {
        let Some(idx) = self.notice_state.selected() else { return };
        if let Some(notice) = self.ordered_notices().get(idx).map(|n| (*n).clone()) {
            self.modal = Some(Modal::NoticeDetail(notice));
        }
    }

    // ── Chat ──────────────────────────────────────────────

    pub fn toggle_chat(&mut self) {
        self.show_chat = !self.show_chat;
        if self.show_chat {
            self.show_result = false;
            self.focus = FocusPane::Chat;
        } else {
            self.focus = FocusPane::Page;
            self.input_mode = InputMode::Normal;
        }
    }

    pub fn toggle_result(&mut self) {
        if self.chat.result_panel().is_none() {
            self.show_result = false;
            return;
        }
        self.show_result = !self.show_result;
        self.panel_scroll = 0;
        if !self.show_result && self.focus == FocusPane::Panel {
            self.focus = FocusPane::Chat;
        }
    }

    pub fn cycle_focus(&mut self) {
        let has_panel = self.show_result && self.chat.result_panel().is_some();
        self.focus = match self.focus {
            FocusPane::Page if self.show_chat => FocusPane::Chat,
            FocusPane::Chat if has_panel => FocusPane::Panel,
            _ => FocusPane::Page,
        };
    }

    pub fn result_content(&self) -> Option<Result<PanelContent, PanelError>> {
        self.chat.result_panel().map(|panel| PanelContent::parse(&panel))
    }

    /// Send the input box contents; no-op while a reply is pending.
    pub fn submit_chat(&mut self) {
        let text = self.chat_input.trim().to_string();
        if text.is_empty() || self.chat.is_loading() {
            return;
        }
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.input_mode = InputMode::Normal;

        let chat = self.chat.clone();
        self.spawn(async move {
            let outcome = chat.send_message(&text).await;
            BackendEvent::ChatSettled { outcome, text }
        });
        self.scroll_chat_to_bottom();
    }

    pub fn use_suggestion(&mut self, suggestion: &str) {
        self.chat_input = suggestion.to_string();
        self.chat_cursor = self.chat_input.chars().count();
        self.input_mode = InputMode::Editing;
        self.focus = FocusPane::Chat;
    }

    fn chat_settled(&mut self, outcome: SendOutcome, text: String) {
        match outcome {
            SendOutcome::Replied => {
                let new_panel = self.chat.messages().last().is_some_and(ChatMessage::sets_panel);
                if new_panel {
                    self.show_result = true;
                    self.panel_scroll = 0;
                }
            }
            // Lost the race for the in-flight slot; hand the text back.
            SendOutcome::Rejected(Rejected::Busy) if self.chat_input.is_empty() => {
                self.chat_cursor = text.chars().count();
                self.chat_input = text;
            }
            _ => {}
        }
        self.scroll_chat_to_bottom();
    }

    pub fn clear_chat(&mut self) {
        self.chat.clear_messages();
        self.show_result = false;
        self.chat_scroll = 0;
        if self.focus == FocusPane::Panel {
            self.focus = FocusPane::Chat;
        }
    }

    pub fn dismiss_result(&mut self) {
        self.chat.dismiss_panel();
        self.show_result = false;
        if self.focus == FocusPane::Panel {
            self.focus = FocusPane::Chat;
        }
    }

    pub fn tick_animation(&mut self) {
        if self.chat.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 40 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            40
        };

        let mut total_lines: u16 = 0;

        for msg in self.chat.messages() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.content.lines() {
                total_lines = total_lines.saturating_add(wrapped_height(line, wrap_width));
            }
            for result in msg.tool_results.iter().flatten() {
                let rows = wrapped_height(&result.summary(), wrap_width.saturating_sub(2));
                total_lines = total_lines.saturating_add(rows);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        // "AI가 처리 중입니다..." indicator
        total_lines = total_lines.saturating_add(2);

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

/// Rows a line takes when wrapped at `width` display cells. Hangul is
/// double-width.
fn wrapped_height(line: &str, width: usize) -> u16 {
    let cells: usize = line.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    if cells == 0 || width == 0 {
        1
    } else {
        u16::try_from(cells.div_ceil(width)).unwrap_or(u16::MAX)
    }
}

/// Keep a list selection within bounds, selecting the first row when
/// there is one.
pub fn clamp(state: &mut ListState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(i), len) if i >= len => state.select(Some(len - 1)),
        _ => {}
    }
}

/// Move a list selection by one, staying within bounds.
pub fn step(state: &mut ListState, len: usize, down: bool) {
    if len == 0 {
        state.select(None);
        return;
    }
    let i = match state.selected() {
        Some(i) if down => (i + 1).min(len - 1),
        Some(i) => i.saturating_sub(1),
        None => 0,
    };
    state.select(Some(i));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use baikal_core::chat::{ChatApi, ChatReply};
    use baikal_core::{ApiClient, SessionStorage};
    use serde_json::json;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_clamp_selection() {
        let mut state = ListState::default();
        clamp(&mut state, 3);
        assert_eq!(state.selected(), Some(0));

        state.select(Some(5));
        clamp(&mut state, 3);
        assert_eq!(state.selected(), Some(2));

        clamp(&mut state, 0);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_step_stays_in_bounds() {
        let mut state = ListState::default();
        step(&mut state, 2, true);
        assert_eq!(state.selected(), Some(0));
        step(&mut state, 2, true);
        step(&mut state, 2, true);
        assert_eq!(state.selected(), Some(1));
        step(&mut state, 2, false);
        step(&mut state, 2, false);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_wrapped_height_counts_wide_chars() {
        assert_eq!(wrapped_height("", 10), 1);
        assert_eq!(wrapped_height("abcdefghij", 10), 1);
        assert_eq!(wrapped_height("abcdefghijk", 10), 2);
        // Six Hangul syllables take twelve cells.
        assert_eq!(wrapped_height("일정등록완료", 10), 2);
    }

    #[test]
    fn test_wrapped_height_saturates() {
        let line = "a".repeat(usize::from(u16::MAX) * 2 + 10);
        assert_eq!(wrapped_height(&line, 1), u16::MAX);
    }

    /// Hands out canned replies in order.
    struct Replies(Mutex<Vec<serde_json::Value>>);

    #[async_trait]
    impl ChatApi for Replies {
        async fn chat(&self, _message: &str) -> baikal_core::Result<ChatReply> {
            let body = self.0.lock().unwrap().remove(0);
            Ok(serde_json::from_value(body)?)
        }
    }

    fn app_with(replies: Vec<serde_json::Value>) -> App {
        let storage = Arc::new(SessionStorage::in_memory());
        let client = Arc::new(ApiClient::new("http://127.0.0.1:9", storage.clone()));
        let chat = Arc::new(ChatStore::new(Arc::new(Replies(Mutex::new(replies)))));
        let (tx, _rx) = unbounded_channel();
        App::new(
            Arc::new(AuthStore::restore(client.clone(), storage)),
            chat,
            client,
            tx,
            &Config::new(),
        )
    }

    async fn send(app: &mut App, text: &str) {
        let outcome = app.chat.send_message(text).await;
        app.chat_settled(outcome, text.to_string());
    }

    #[tokio::test]
    async fn test_plain_reply_leaves_hidden_panel_hidden() {
        let mut app = app_with(vec![
            json!({
                "reply": "업무를 등록했습니다",
                "tool_results": [{"success": true, "type": "task", "data": {"title": "보고서"}}]
            }),
            json!({"reply": "천만에요", "tool_results": null}),
            json!({
                "reply": "공지를 찾았습니다",
                "tool_results": [{"success": true, "type": "notice", "data": {"title": "워크숍"}}]
            }),
        ]);

        send(&mut app, "보고서 업무 등록해줘").await;
        assert!(app.show_result);

        app.toggle_result();
        assert!(!app.show_result);

        send(&mut app, "고마워").await;
        assert!(!app.show_result);
        assert_eq!(app.chat.result_panel().unwrap().kind, "task");

        send(&mut app, "워크숍 공지 보여줘").await;
        assert!(app.show_result);
        assert_eq!(app.chat.result_panel().unwrap().kind, "notice");
    }

    #[tokio::test]
    async fn test_scroll_survives_huge_conversation() {
        let long = "가".repeat(usize::from(u16::MAX));
        let mut app = app_with(vec![json!({"reply": long.clone(), "tool_results": null}); 3]);
        app.chat_width = 1;
        for _ in 0..3 {
            send(&mut app, &long).await;
        }
        assert_eq!(app.chat_scroll, u16::MAX - app.chat_height.max(20));
    }
}
