use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::prelude::*;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::platform::IncomingMessage;

/// Used when a message carries no sender (e.g. channel posts)
const UNKNOWN_SENDER: &str = "there";

/// This bot's own `@username`, used to tell our commands from other bots'
#[derive(Debug, Clone)]
struct BotUsername(String);

/// Run the Telegram platform until Ctrl-C
pub async fn run(dispatcher: Arc<Dispatcher>, bot: Bot) -> Result<()> {
    info!("Starting Telegram platform...");

    let me = bot.get_me().await.context("Failed to fetch bot info")?;
    let bot_username = BotUsername(me.username().to_string());
    info!("Running as @{}", bot_username.0);

    let handler = Update::filter_message().endpoint(handle_message);

    teloxide::dispatching::Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![dispatcher, bot_username])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Telegram platform stopped");
    Ok(())
}

async fn handle_message(
    bot: Bot,
    msg: Message,
    dispatcher: Arc<Dispatcher>,
    bot_username: BotUsername,
) -> ResponseResult<()> {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id.0);
        return Ok(());
    };

    let sender_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());

    debug!("Telegram message from {}: {}", sender_name, text);

    let Some(incoming) = IncomingMessage::new(sender_name, text, &bot_username.0) else {
        debug!("Ignoring command addressed to another bot: {}", text);
        return Ok(());
    };
    let outcome = dispatcher.dispatch(&incoming).await;

    if let Some(link) = &outcome.shortened {
        info!("{} shorted this link: {}", link.sender_name, link.url);
    }

    // Sequential sends keep replies in emission order within the chat.
    for reply in outcome.replies {
        if let Err(e) = bot.send_message(msg.chat.id, reply).await {
            error!("Failed to send reply to chat {}: {}", msg.chat.id.0, e);
        }
    }

    Ok(())
}
