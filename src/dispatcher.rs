use std::sync::Arc;

use tracing::{info, warn};

use crate::extractor::{self, Extraction};
use crate::platform::{IncomingMessage, MessageKind};
use crate::shortener::Shortener;

pub const HELP_TEXT: &str = "Give an URL and I will make it shorter for you!";
pub const INTRO_TEXT: &str =
    "My goal is to make your life easier. Give me an URL and I'll short it for you";
pub const INVALID_URL_TEXT: &str = "Please, send me a valid URL";
pub const SHORTEN_FAILED_TEXT: &str =
    "Sorry, I couldn't shorten that link right now. Please try again later.";

/// Scheme prepended to every extracted link before shortening
const DEFAULT_SCHEME: &str = "https://";

/// Operator-facing record of a successful shortening
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortenedLink {
    pub sender_name: String,
    pub url: String,
}

/// Everything one message produced: replies in send order, plus the record
#[derive(Debug)]
pub struct Dispatch {
    pub replies: Vec<String>,
    pub shortened: Option<ShortenedLink>,
}

impl Dispatch {
    fn reply(text: impl Into<String>) -> Self {
        Self {
            replies: vec![text.into()],
            shortened: None,
        }
    }
}

/// Routes incoming messages to the start, help or link handler.
/// Platform-agnostic: the transport turns `replies` into chat messages.
pub struct Dispatcher {
    shortener: Arc<dyn Shortener>,
}

impl Dispatcher {
    pub fn new(shortener: Arc<dyn Shortener>) -> Self {
        Self { shortener }
    }

    /// Handle one message. Always yields at least one reply.
    pub async fn dispatch(&self, msg: &IncomingMessage) -> Dispatch {
        match &msg.kind {
            MessageKind::Command(name) => match name.as_str() {
                "start" => Self::greet(&msg.sender_name),
                "help" => Dispatch::reply(HELP_TEXT),
                other => {
                    info!("Unknown command /{} from {}", other, msg.sender_name);
                    Dispatch::reply(HELP_TEXT)
                }
            },
            MessageKind::PlainText => self.shorten_link(msg).await,
        }
    }

    fn greet(sender_name: &str) -> Dispatch {
        Dispatch {
            replies: vec![
                format!("Hi, {}! I'm a bot created by @jmbenck.", sender_name),
                INTRO_TEXT.to_string(),
            ],
            shortened: None,
        }
    }

    async fn shorten_link(&self, msg: &IncomingMessage) -> Dispatch {
        let candidate = match extractor::extract(&msg.text) {
            Extraction::Found(candidate) => candidate,
            Extraction::NotFound => return Dispatch::reply(INVALID_URL_TEXT),
        };

        let url = format!("{}{}", DEFAULT_SCHEME, candidate);

        match self.shortener.shorten(&url).await {
            Ok(short) => Dispatch {
                replies: vec![short],
                shortened: Some(ShortenedLink {
                    sender_name: msg.sender_name.clone(),
                    url,
                }),
            },
            Err(e) => {
                warn!("Failed to shorten {} for {}: {:#}", url, msg.sender_name, e);
                Dispatch::reply(SHORTEN_FAILED_TEXT)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortener::ShortenError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every URL it is asked to shorten
    struct StubShortener {
        result: Option<String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubShortener {
        fn ok(short: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Some(short.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: None,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Shortener for StubShortener {
        async fn shorten(&self, url: &str) -> Result<String, ShortenError> {
            self.seen.lock().unwrap().push(url.to_string());
            match &self.result {
                Some(short) => Ok(short.clone()),
                None => Err(ShortenError::InvalidResponse("Error".to_string())),
            }
        }
    }

    fn msg(sender: &str, text: &str) -> IncomingMessage {
        IncomingMessage::new(sender, text, "ShortyBot").unwrap()
    }

    fn dispatcher(stub: &Arc<StubShortener>) -> Dispatcher {
        Dispatcher::new(stub.clone())
    }

    #[tokio::test]
    async fn test_start_greets_in_order() {
        let stub = StubShortener::ok("unused");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "/start"))
            .await;

        assert_eq!(
            out.replies,
            vec![
                "Hi, Alice! I'm a bot created by @jmbenck.".to_string(),
                "My goal is to make your life easier. Give me an URL and I'll short it for you"
                    .to_string(),
            ]
        );
        assert!(out.shortened.is_none());
        assert!(stub.seen().is_empty());
    }

    #[tokio::test]
    async fn test_help_single_reply() {
        let stub = StubShortener::ok("unused");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "/help"))
            .await;
        assert_eq!(out.replies, vec!["Give an URL and I will make it shorter for you!"]);
    }

    #[tokio::test]
    async fn test_unknown_command_gets_help() {
        let stub = StubShortener::ok("unused");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "/settings"))
            .await;
        assert_eq!(out.replies, vec![HELP_TEXT]);
        assert!(stub.seen().is_empty());
    }

    #[tokio::test]
    async fn test_text_without_url_prompts() {
        let stub = StubShortener::ok("unused");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "no url here"))
            .await;
        assert_eq!(out.replies, vec!["Please, send me a valid URL"]);
        assert!(out.shortened.is_none());
        assert!(stub.seen().is_empty());
    }

    #[tokio::test]
    async fn test_url_is_shortened_and_recorded() {
        let stub = StubShortener::ok("https://short.url/abc");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "go to test.example.org now"))
            .await;

        assert_eq!(out.replies, vec!["https://short.url/abc"]);
        assert_eq!(
            out.shortened,
            Some(ShortenedLink {
                sender_name: "Alice".to_string(),
                url: "https://test.example.org now".to_string(),
            })
        );
        assert_eq!(stub.seen(), vec!["https://test.example.org now"]);
    }

    #[tokio::test]
    async fn test_shorten_failure_replies_with_apology() {
        let stub = StubShortener::failing();
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "example.com"))
            .await;

        assert_eq!(out.replies, vec![SHORTEN_FAILED_TEXT]);
        assert!(out.shortened.is_none());
        assert_eq!(stub.seen(), vec!["https://example.com"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_affect_next_message() {
        let stub = StubShortener::failing();
        let dispatcher = dispatcher(&stub);

        let first = dispatcher
            .dispatch(&msg("Alice", "example.com/x"))
            .await;
        assert_eq!(first.replies, vec![SHORTEN_FAILED_TEXT]);

        let second = dispatcher
            .dispatch(&msg("Alice", "/help"))
            .await;
        assert_eq!(second.replies, vec![HELP_TEXT]);
    }

    #[tokio::test]
    async fn test_command_text_is_never_shortened() {
        let stub = StubShortener::ok("https://short.url/zzz");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "/start example.com"))
            .await;
        assert_eq!(out.replies.len(), 2);
        assert!(stub.seen().is_empty());
    }

    #[tokio::test]
    async fn test_command_with_own_mention_is_handled() {
        let stub = StubShortener::ok("unused");
        let out = dispatcher(&stub)
            .dispatch(&msg("Alice", "/start@ShortyBot"))
            .await;
        assert_eq!(out.replies[0], "Hi, Alice! I'm a bot created by @jmbenck.");
        assert_eq!(out.replies.len(), 2);
    }
}
