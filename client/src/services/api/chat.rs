//! # AI Assistant & Chat Endpoints
//!
//! Natural-language command processing plus persisted chat sessions.

use serde_json::Value;
use shared::{
    AiProcessRequest, AiResponse, ChatMessage, ChatSession, CreateChatSessionRequest, Envelope,
    SendChatMessageRequest,
};

use super::client::ApiClient;
use super::request::RequestDescriptor;

pub const SESSIONS_PATH: &str = "/api/chat/sessions";

impl ApiClient {
    /// Send a command to the AI assistant.
    #[tracing::instrument(skip(self, request), fields(session = ?request.session_id))]
    pub async fn process_ai_command(&self, request: &AiProcessRequest) -> Envelope<AiResponse> {
        self.submit(RequestDescriptor::post("/api/ai/process").json(request))
            .await
    }

    pub async fn get_chat_sessions(&self) -> Envelope<Vec<ChatSession>> {
        self.fetch(RequestDescriptor::get(SESSIONS_PATH)).await
    }

    pub async fn create_chat_session(&self, request: &CreateChatSessionRequest) -> Envelope<ChatSession> {
        self.mutate(RequestDescriptor::post(SESSIONS_PATH).json(request), &[SESSIONS_PATH])
            .await
    }

    pub async fn delete_chat_session(&self, session_id: &str) -> Envelope<Value> {
        self.mutate(
            Ok(RequestDescriptor::delete(format!("{}/{}", SESSIONS_PATH, session_id))),
            &[SESSIONS_PATH],
        )
        .await
    }

    pub async fn get_chat_messages(&self, session_id: &str) -> Envelope<Vec<ChatMessage>> {
        self.fetch(RequestDescriptor::get(messages_path(session_id)))
            .await
    }

    /// Post a message; the session list is invalidated too since it shows the last message.
    pub async fn send_chat_message(&self, session_id: &str, content: &str) -> Envelope<ChatMessage> {
        let request = SendChatMessageRequest {
            content: content.to_string(),
        };
        self.mutate(
            RequestDescriptor::post(messages_path(session_id)).json(&request),
            &[SESSIONS_PATH],
        )
        .await
    }
}

fn messages_path(session_id: &str) -> String {
    format!("{}/{}/messages", SESSIONS_PATH, session_id)
}
