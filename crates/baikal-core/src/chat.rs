//! Conversation state for the AI assistant panel.
//!
//! The backend's `/chat` endpoint does the reasoning and tool calls; this
//! module keeps the transcript and republishes the first successful tool
//! result as the result panel.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::panel::ResultPanel;

/// Shown in place of the server's detail when a chat call fails without one.
pub const FALLBACK_ERROR: &str = "오류가 발생했습니다. 다시 시도해주세요.";

/// Example requests offered on an empty conversation.
pub const SUGGESTIONS: [&str; 6] = [
    "출장 신청서 만들어줘",
    "내일 오후 2시 회의 등록해줘",
    "김철수에게 보고서 업무 등록해줘",
    "회사 워크숍 공지 작성해줘",
    "내 결재 문서 조회해줘",
    "내 업무 목록 보여줘",
];

#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn chat(&self, message: &str) -> Result<ChatReply>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub tool_results: Option<Vec<ToolResult>>,
}

/// Outcome of one backend tool invocation. The executor reports failures
/// as a bare `{"error": ...}`, so every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default)]
    pub success: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// One-line status shown under an assistant message.
    pub fn summary(&self) -> String {
        if self.success {
            self.data
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("작업이 완료되었습니다.")
                .to_string()
        } else {
            self.error.clone().unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub tool_results: Option<Vec<ToolResult>>,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: ChatRole, content: String, tool_results: Option<Vec<ToolResult>>) -> Self {
        Self {
            role,
            content,
            tool_results,
            timestamp: Local::now(),
        }
    }

    /// Whether this reply replaced the result panel.
    pub fn sets_panel(&self) -> bool {
        panel_source(self.tool_results.as_deref()).is_some()
    }
}

/// The tool result that drives the panel: the first one, and only when it
/// succeeded.
fn panel_source(tool_results: Option<&[ToolResult]>) -> Option<&ToolResult> {
    tool_results
        .and_then(<[ToolResult]>::first)
        .filter(|first| first.success)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    Empty,
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Replied,
    /// The call failed; an error message was appended instead.
    Failed,
    /// The conversation was cleared while the call was in flight.
    Discarded,
    Rejected(Rejected),
}

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<ChatMessage>,
    result_panel: Option<ResultPanel>,
    // Bumped by every clear so late replies can tell they are stale.
    epoch: u64,
}

pub struct ChatStore {
    api: Arc<dyn ChatApi>,
    conversation: Mutex<Conversation>,
    in_flight: tokio::sync::Mutex<()>,
}

impl ChatStore {
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            conversation: Mutex::new(Conversation::default()),
            in_flight: tokio::sync::Mutex::new(()),
        }
    }

    /// Send one user message and wait for the assistant's answer.
    ///
    /// At most one send runs at a time: the in-flight lock is taken without
    /// waiting and a second caller is turned away. The user message is in
    /// the history before the backend is called.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Rejected(Rejected::Empty);
        }

        let Ok(_in_flight) = self.in_flight.try_lock() else {
            tracing::debug!("chat send rejected, another is in flight");
            return SendOutcome::Rejected(Rejected::Busy);
        };

        let epoch = {
            let mut conversation = self.conversation();
            conversation
                .messages
                .push(ChatMessage::new(ChatRole::User, text.to_string(), None));
            conversation.epoch
        };

        let result = self.api.chat(text).await;

        let mut conversation = self.conversation();
        if conversation.epoch != epoch {
            tracing::debug!("dropping reply for a cleared conversation");
            return SendOutcome::Discarded;
        }

        match result {
            Ok(ChatReply { reply, tool_results }) => {
                let panel = panel_source(tool_results.as_deref()).map(ResultPanel::from);

                tracing::info!(
                    tools = tool_results.as_ref().map_or(0, Vec::len),
                    panel = panel.as_ref().map(|p| p.kind.as_str()),
                    "assistant replied"
                );

                conversation
                    .messages
                    .push(ChatMessage::new(ChatRole::Assistant, reply, tool_results));
                if let Some(panel) = panel {
                    conversation.result_panel = Some(panel);
                }
                SendOutcome::Replied
            }
            Err(err) => {
                tracing::warn!(%err, "chat request failed");
                let detail = err.detail().unwrap_or(FALLBACK_ERROR);
                conversation.messages.push(ChatMessage::new(
                    ChatRole::Assistant,
                    format!("❌ {detail}"),
                    None,
                ));
                SendOutcome::Failed
            }
        }
    }

    /// Reset the conversation: empty history, no result panel.
    pub fn clear_messages(&self) {
        let mut conversation = self.conversation();
        conversation.messages.clear();
        conversation.result_panel = None;
        conversation.epoch += 1;
    }

    pub fn dismiss_panel(&self) {
        self.conversation().result_panel = None;
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.conversation().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.conversation().messages.len()
    }

    pub fn result_panel(&self) -> Option<ResultPanel> {
        self.conversation().result_panel.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
