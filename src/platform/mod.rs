pub mod telegram;

/// What kind of message arrived, decided once from the raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Bot command, lower-cased, without the leading `/` or `@botname` suffix
    Command(String),
    PlainText,
}

/// A message received from the chat platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Display name of the sender
    pub sender_name: String,
    /// The message text
    pub text: String,
    pub kind: MessageKind,
}

impl IncomingMessage {
    /// Classify `text` for the bot named `bot_username`.
    ///
    /// Returns `None` for a command explicitly addressed to another bot
    /// (`/start@OtherBot`); such messages are not ours to answer.
    pub fn new(
        sender_name: impl Into<String>,
        text: impl Into<String>,
        bot_username: &str,
    ) -> Option<Self> {
        let text = text.into();
        let kind = classify(&text, bot_username)?;
        Some(Self {
            sender_name: sender_name.into(),
            text,
            kind,
        })
    }
}

/// Commands are `/name`, optionally `/name@botname`, followed by arguments.
fn classify(text: &str, bot_username: &str) -> Option<MessageKind> {
    let Some(rest) = text.strip_prefix('/') else {
        return Some(MessageKind::PlainText);
    };

    let token = rest.split_whitespace().next().unwrap_or_default();
    if token.is_empty() || rest.starts_with(char::is_whitespace) {
        return Some(MessageKind::PlainText);
    }

    let (name, mention) = match token.split_once('@') {
        Some((name, mention)) => (name, Some(mention)),
        None => (token, None),
    };

    // Telegram usernames are case-insensitive.
    if let Some(mention) = mention {
        if !mention.eq_ignore_ascii_case(bot_username.trim_start_matches('@')) {
            return None;
        }
    }

    Some(MessageKind::Command(name.to_lowercase()))
}
