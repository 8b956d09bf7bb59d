use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::AppConfig;
use crate::engine::narrative_parser::parse_narrative;
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::game_state::{GameSetting, PlayerState};
use crate::model::message::{Speaker, StoryEntry};
use crate::model::narrative::NarrativeReply;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Game not started. Start a new game first.")]
    NotStarted,

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Narrator service error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Parse(String),
}

/// The narrator as seen by the session state machine.
pub trait NarrativeService {
    /// Opens a fresh conversation and returns the opening scene.
    fn start_new_game(&mut self, setting: GameSetting) -> Result<NarrativeReply, NarrativeError>;

    /// Rebuilds the conversation from a saved story log.
    fn resume_game(&mut self, setting: GameSetting, story: &[StoryEntry]);

    /// Continues the current conversation. Fails with
    /// [`NarrativeError::NotStarted`] when there is none.
    fn send_action(
        &mut self,
        action: &str,
        player: &PlayerState,
    ) -> Result<NarrativeReply, NarrativeError>;

    fn reset(&mut self);

    /// Cheap reachability check, reported in the UI.
    fn test_connection(&self) -> Result<String>;
}

/* =========================
   Wire types
   ========================= */

#[derive(Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
    pub response_format: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

/* =========================
   Transport
   ========================= */

/// Blocking HTTP access to an OpenAI-compatible server.
pub struct ChatTransport {
    http: Client,
    endpoint: String,
    api_base: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl ChatTransport {
    pub fn new(config: &AppConfig) -> Result<Self, NarrativeError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_base: config.api_base().to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }

    pub fn complete(&self, messages: &[ChatMessage]) -> Result<String, NarrativeError> {
        let req = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            response_format: response_format(),
        };

        let mut builder = self.http.post(&self.endpoint).json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send()?;
        let status = resp.status();
        let body = resp.text()?;

        if !status.is_success() {
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| NarrativeError::Parse(format!("Malformed completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| NarrativeError::Parse("The narrator returned no reply".to_string()))
    }

    pub fn test_connection(&self) -> Result<String> {
        let mut builder = self.http.get(format!("{}/models", self.api_base));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp: Value = builder.send()?.error_for_status()?.json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

fn response_format() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "narrative_reply",
            "strict": true,
            "schema": PromptBuilder::response_schema(),
        }
    })
}

/* =========================
   Narrative client
   ========================= */

#[derive(Debug, Clone)]
struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    fn new(setting: GameSetting, language: &str) -> Self {
        Self {
            messages: vec![
                ChatMessage::system(PromptBuilder::system_instruction(setting, language)),
                ChatMessage::user(PromptBuilder::opening_message()),
            ],
        }
    }
}

/// Narrator backed by a chat completions endpoint. Owns the one live
/// conversation of its session.
pub struct NarrativeClient {
    transport: ChatTransport,
    language: String,
    conversation: Option<Conversation>,
}

impl NarrativeClient {
    pub fn new(config: &AppConfig) -> Result<Self, NarrativeError> {
        Ok(Self {
            transport: ChatTransport::new(config)?,
            language: config.language.clone(),
            conversation: None,
        })
    }

    fn request(
        transport: &ChatTransport,
        conversation: &mut Conversation,
    ) -> Result<NarrativeReply, NarrativeError> {
        log::debug!(
            "Narrator request: {}",
            conversation.messages.last().map(|m| m.content.as_str()).unwrap_or("")
        );

        let raw = transport.complete(&conversation.messages)?;
        log::debug!("Narrator reply: {raw}");

        let reply = parse_narrative(&raw).map_err(NarrativeError::Parse)?;
        conversation.messages.push(ChatMessage::assistant(raw));
        Ok(reply)
    }
}

impl NarrativeService for NarrativeClient {
    fn start_new_game(&mut self, setting: GameSetting) -> Result<NarrativeReply, NarrativeError> {
        self.conversation = None;

        let mut conversation = Conversation::new(setting, &self.language);
        let reply = Self::request(&self.transport, &mut conversation)?;

        self.conversation = Some(conversation);
        Ok(reply)
    }

    fn resume_game(&mut self, setting: GameSetting, story: &[StoryEntry]) {
        self.conversation = Some(rebuild_conversation(setting, &self.language, story));
    }

    fn send_action(
        &mut self,
        action: &str,
        player: &PlayerState,
    ) -> Result<NarrativeReply, NarrativeError> {
        let conversation = self.conversation.as_mut().ok_or(NarrativeError::NotStarted)?;

        conversation
            .messages
            .push(ChatMessage::user(PromptBuilder::action_message(action, player)));

        let result = Self::request(&self.transport, conversation);
        if result.is_err() {
            // Keep the conversation as it was before the failed turn.
            conversation.messages.pop();
        }
        result
    }

    fn reset(&mut self) {
        self.conversation = None;
    }

    fn test_connection(&self) -> Result<String> {
        self.transport.test_connection()
    }
}

/// Narrator lines become assistant turns and player lines user turns;
/// system lines are UI-only and skipped.
///
/// Saves keep only the action text, not the health/inventory block that
/// `action_message` added during live play, so rebuilt user turns are the
/// bare actions. Each narrator turn already states the resulting health
/// and inventory, and the next live action carries the current state.
fn rebuild_conversation(setting: GameSetting, language: &str, story: &[StoryEntry]) -> Conversation {
    let mut conversation = Conversation::new(setting, language);

    for entry in story {
        match entry.speaker {
            Speaker::Narrator => conversation.messages.push(ChatMessage::assistant(&entry.text)),
            Speaker::User => conversation.messages.push(ChatMessage::user(&entry.text)),
            Speaker::System => {}
        }
    }

    conversation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::game_state::Emotion;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    /// Serves one canned HTTP response and hands back the request body.
    fn serve_once(status: &'static str, body: String) -> (AppConfig, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }

            let mut request = vec![0; content_length];
            reader.read_exact(&mut request).unwrap();
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        });

        let mut config = AppConfig::default();
        config.endpoint = format!("http://{addr}/v1/chat/completions");
        config.request_timeout_secs = 5;
        (config, rx)
    }

    fn completion(content: Value) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
    }

    fn complete_against(status: &'static str, body: String) -> Result<String, NarrativeError> {
        let (config, _rx) = serve_once(status, body);
        ChatTransport::new(&config)
            .unwrap()
            .complete(&[ChatMessage::user("look around")])
    }

    #[test]
    fn server_error_status_maps_to_api_error() {
        let err = complete_against("500 Internal Server Error", "model crashed".into()).unwrap_err();
        match err {
            NarrativeError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "model crashed");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_choices_is_a_parse_error() {
        let err = complete_against("200 OK", r#"{"choices":[]}"#.into()).unwrap_err();
        assert!(matches!(err, NarrativeError::Parse(_)));
    }

    #[test]
    fn null_content_is_a_parse_error() {
        let err = complete_against("200 OK", completion(Value::Null)).unwrap_err();
        assert!(matches!(err, NarrativeError::Parse(_)));
    }

    #[test]
    fn malformed_envelope_is_a_parse_error() {
        let err = complete_against("200 OK", r#"{"id":"x","object":"chat"#.into()).unwrap_err();
        assert!(matches!(err, NarrativeError::Parse(_)));
    }

    #[test]
    fn fenced_reply_starts_a_game() {
        let content = "```json\n{\"storyText\":\"A gate looms.\",\"health\":100,\"inventory\":[],\"emotion\":\"tense\"}\n```";
        let (config, _rx) = serve_once("200 OK", completion(Value::String(content.into())));
        let mut client = NarrativeClient::new(&config).unwrap();

        let reply = client.start_new_game(GameSetting::Fantasy).unwrap();

        assert_eq!(reply.story_text, "A gate looms.");
        assert_eq!(reply.emotion, Emotion::Tense);
        assert_eq!(client.conversation.unwrap().messages.len(), 3);
    }

    #[test]
    fn request_uses_strict_closed_schema() {
        let reply = json!({ "storyText": "x", "health": 100, "inventory": [], "emotion": "calm" });
        let (config, rx) = serve_once("200 OK", completion(Value::String(reply.to_string())));
        let mut client = NarrativeClient::new(&config).unwrap();
        client.start_new_game(GameSetting::Cyberpunk).unwrap();

        let body: Value = serde_json::from_str(&rx.recv().unwrap()).unwrap();
        let format = &body["response_format"]["json_schema"];
        assert_eq!(format["strict"], true);
        assert_eq!(format["schema"]["additionalProperties"], false);
        assert_eq!(body["messages"][0]["role"], "system");
    }

    fn unreachable_client() -> NarrativeClient {
        let mut config = AppConfig::default();
        config.endpoint = "http://127.0.0.1:9/v1/chat/completions".into();
        config.request_timeout_secs = 1;
        NarrativeClient::new(&config).unwrap()
    }

    #[test]
    fn send_action_before_start_is_a_precondition_error() {
        let mut client = unreachable_client();
        let err = client
            .send_action("look around", &PlayerState::default())
            .unwrap_err();
        assert!(matches!(err, NarrativeError::NotStarted));
    }

    #[test]
    fn failed_turn_leaves_conversation_untouched() {
        let mut client = unreachable_client();
        client.resume_game(GameSetting::Fantasy, &[]);
        let before = client.conversation.clone().unwrap().messages;

        let err = client
            .send_action("look around", &PlayerState::default())
            .unwrap_err();
        assert!(matches!(err, NarrativeError::Transport(_)));
        assert_eq!(client.conversation.unwrap().messages, before);
    }

    #[test]
    fn rebuilt_conversation_skips_system_lines() {
        let story = vec![
            StoryEntry::narrator(1, "You wake in a cell.", Emotion::Tense),
            StoryEntry::user(2, "pick the lock"),
            StoryEntry::system(3, "An error occurred"),
            StoryEntry::narrator(4, "The lock clicks.", Emotion::Calm),
        ];

        let conversation = rebuild_conversation(GameSetting::NoirDetective, "English", &story);
        let roles: Vec<&str> = conversation.messages.iter().map(|m| m.role.as_str()).collect();

        assert_eq!(roles, vec!["system", "user", "assistant", "user", "assistant"]);
        assert_eq!(conversation.messages[3].content, "pick the lock");
        assert_eq!(conversation.messages[4].content, "The lock clicks.");
    }

    #[test]
    fn reset_drops_conversation() {
        let mut client = unreachable_client();
        client.resume_game(GameSetting::Cyberpunk, &[]);
        client.reset();
        assert!(client.conversation.is_none());
    }

    #[test]
    fn request_carries_json_schema() {
        let format = response_format();
        assert_eq!(format["type"], "json_schema");
        assert_eq!(
            format["json_schema"]["schema"]["required"][0],
            "storyText"
        );
    }
}
