use crate::models::WillRequest;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1";
const MODEL_NAME: &str = "qwen-3-235b-a22b-instruct-2507";

#[derive(Debug, Error)]
pub enum CerebrasError {
    /// Network failure or an unreadable response body. Surfaced to the
    /// caller as a generic internal error.
    #[error("request to Cerebras failed: {0}")]
    Transport(String),
    /// Non-2xx response from the API; relayed to the caller verbatim.
    #[error("Cerebras API returned HTTP {status}")]
    Upstream { status: u16, body: String },
    /// 2xx response whose JSON matches none of the known completion shapes.
    /// Carries the raw payload for diagnostics.
    #[error("unrecognized Cerebras response shape")]
    UnrecognizedShape(Box<serde_json::Value>),
}

pub struct CerebrasClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CerebrasClient {
    /// Credential and base URL are injected here rather than read from the
    /// environment at request time; tests point `base_url` at a mock server.
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Render the fixed will template with the caller's answers. User text is
    /// substituted verbatim except for the signature, where newlines become
    /// `<br>` so multi-line signatures survive the HTML output.
    pub fn build_will_prompt(req: &WillRequest) -> String {
        let signature = req.signature.replace('\n', "<br>");
        format!(
            r#"
Act as a witty, dramatic, and funny notary public for the end of the internet.
Write a "Last Will and Digital Testament" using the user's data. The will must:
- Use HTML tags <h3>, <h4>, <p> and <strong>/<em> as shown in the example.
- Be humorous, official-sounding, and use the user's inputs in-context (do not just list them).
- Return ONLY the HTML-formatted will (no additional commentary or explanation).

User's Information:
- Full Name: {full_name}
- Their most visited website: {website}
- Their favorite playlist: {playlist}
- Their least favorite work app: {work_app}
- Their best friend's name: {best_friend}
- Their favorite social media platform: {social_platform}
- Their handle on that platform: {social_handle}
- The internet trend they hate: {trend}
- Their email signature: {signature}

EXAMPLE OUTPUT:
<h3>Last Will and Digital Testament</h3>
<p>I, <strong>{full_name}</strong>, being of questionable sanity and over-caffeinated mind, do hereby declare this document to be my final decree regarding my digital estate as the internet collapses around us.</p>
<h4>Article I: The Digital Assets</h4>
<p>To my best friend, <strong>{best_friend}</strong>, I bequeath my most visited website, <strong>{website}</strong>. May its endless scroll bring you the same comfort it brought me during countless unproductive hours. I also grant you lifetime access to my favorite playlist, "<strong>{playlist}</strong>," for all your dramatic entrances.</p>
<h4>Article II: The Burdens</h4>
<p>My eternal nemesis, the app known as <strong>{work_app}</strong>, shall be digitally exorcised from all devices. May its notifications haunt the void of cyberspace forever. Furthermore, the internet trend of <strong>'{trend}'</strong> is to be scrubbed from the memory of mankind.</p>
<h4>Article III: The Legacy</h4>
<p>My beloved {social_platform} handle, <strong>{social_handle}</strong>, shall be memorialized. A single, final post should read: "It was a weird ride. Peace out." My digital signature shall henceforth be retired:</p>
<p><em>{signature}</em></p>
<p>Signed and sealed on this, the last day of the internet.</p>
<br>
<p>_________________________</p>
<p><strong>{full_name}</strong></p>
"#,
            full_name = req.full_name,
            website = req.website,
            playlist = req.playlist,
            work_app = req.work_app,
            best_friend = req.best_friend,
            social_platform = req.social_platform,
            social_handle = req.social_handle,
            trend = req.trend,
            signature = signature,
        )
    }

    /// One chat-completion call, no retry. Returns the generated will text.
    pub async fn generate_will(&self, prompt: &str) -> Result<String, CerebrasError> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = json!({
            "model": MODEL_NAME,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.75,
            "max_completion_tokens": 20000,
            "top_p": 0.8,
        });

        info!("📤 Requesting will from Cerebras ({} chars of prompt)", prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| CerebrasError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Cerebras API error: status={} body={}", status, body);
            return Err(CerebrasError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CerebrasError::Transport(e.to_string()))?;

        match extract_content(&raw) {
            Some(will) => {
                info!("✅ Cerebras returned a will ({} chars)", will.len());
                Ok(will)
            }
            None => {
                error!("⚠️ Unexpected Cerebras response shape: {}", raw);
                Err(CerebrasError::UnrecognizedShape(Box::new(raw)))
            }
        }
    }
}

// --- Response Parsing Helpers ---

/// Known completion payload shapes, tried in this order: modern chat
/// completions, legacy text completions, then a generic output array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompletionResponse {
    Chat { choices: Vec<ChatChoice> },
    Legacy { choices: Vec<LegacyChoice> },
    Output { output: Vec<OutputItem> },
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct LegacyChoice {
    text: String,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    content: String,
}

fn extract_content(raw: &serde_json::Value) -> Option<String> {
    let parsed: CompletionResponse = serde_json::from_value(raw.clone()).ok()?;
    match parsed {
        CompletionResponse::Chat { choices } => {
            choices.into_iter().next().map(|c| c.message.content)
        }
        CompletionResponse::Legacy { choices } => choices.into_iter().next().map(|c| c.text),
        CompletionResponse::Output { output } => output.into_iter().next().map(|o| o.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_chat_completion_content() {
        let raw = json!({
            "id": "cmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "<h3>The Will</h3>" }, "finish_reason": "stop" }],
            "usage": { "total_tokens": 42 }
        });
        assert_eq!(extract_content(&raw).as_deref(), Some("<h3>The Will</h3>"));
    }

    #[test]
    fn extracts_legacy_completion_text() {
        let raw = json!({ "choices": [{ "text": "plain text will" }] });
        assert_eq!(extract_content(&raw).as_deref(), Some("plain text will"));
    }

    #[test]
    fn extracts_output_array_content() {
        let raw = json!({ "output": [{ "content": "from output array" }] });
        assert_eq!(extract_content(&raw).as_deref(), Some("from output array"));
    }

    #[test]
    fn unrecognized_shape_yields_none() {
        assert_eq!(extract_content(&json!({ "result": "nope" })), None);
        assert_eq!(extract_content(&json!({ "choices": [] })), None);
        assert_eq!(extract_content(&json!("just a string")), None);
    }

    #[test]
    fn prompt_interpolates_every_field() {
        let req: WillRequest = serde_json::from_value(json!({
            "fullName": "Ada Lovelace",
            "website": "news.ycombinator.com",
            "playlist": "Lo-fi Beats to Debug To",
            "workApp": "Jira",
            "bestFriend": "Charles",
            "socialPlatform": "Mastodon",
            "socialHandle": "@ada",
            "trend": "AI influencers",
            "signature": "Regards,\nAda"
        }))
        .unwrap();

        let prompt = CerebrasClient::build_will_prompt(&req);
        for needle in [
            "Ada Lovelace",
            "news.ycombinator.com",
            "Lo-fi Beats to Debug To",
            "Jira",
            "Charles",
            "Mastodon",
            "@ada",
            "AI influencers",
        ] {
            assert!(prompt.contains(needle), "prompt missing {needle}");
        }
        // Signature newlines become <br>; the raw newline form must be gone.
        assert!(prompt.contains("Regards,<br>Ada"));
        assert!(!prompt.contains("Regards,\nAda"));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = CerebrasClient::new("k".into(), "http://localhost:9999/".into());
        assert_eq!(client.base_url, "http://localhost:9999");
    }
}
