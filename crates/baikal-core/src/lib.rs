pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod panel;
pub mod records;
pub mod storage;

// Re-export main types for convenience
pub use auth::{AuthApi, AuthStore, Session};
pub use chat::{ChatApi, ChatMessage, ChatRole, ChatStore, SendOutcome, ToolResult};
pub use config::Config;
pub use error::{Error, Result};
pub use http::ApiClient;
pub use panel::{PanelContent, PanelError, PanelView, ResultKind, ResultPanel};
pub use records::RecordsApi;
pub use storage::SessionStorage;
