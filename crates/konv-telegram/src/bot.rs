//! Bot construction and the long-polling loop.

use std::time::Duration;

use konv_service::ServiceContext;
use teloxide::{
    prelude::*,
    types::{AllowedUpdate, BotCommand, UpdateKind},
    ApiError, RequestError,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::handlers;

/// Long-polling timeout passed to `getUpdates`, in seconds
const POLL_TIMEOUT_SECS: u32 = 30;

/// Build a bot whose HTTP timeout outlasts the long-polling timeout
pub fn build_bot(token: &str) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(u64::from(POLL_TIMEOUT_SECS) + 15))
        .build()?;
    Ok(Bot::with_client(token, client))
}

/// Start polling for updates.
///
/// Verifies the token, clears any webhook and registers the command list,
/// then spawns the polling loop. The loop runs until the returned token is
/// cancelled.
pub async fn start_polling(bot: Bot, ctx: ServiceContext) -> Result<CancellationToken> {
    let me = bot.get_me().await?;
    let username = me.username.clone();

    bot.delete_webhook().send().await?;

    let commands = vec![
        BotCommand::new("help", "How to use this bot"),
        BotCommand::new("list", "List your channels"),
        BotCommand::new("channels", "Edit or activate a channel"),
        BotCommand::new("newchannel", "Create a channel"),
        BotCommand::new("stats", "Delivered message count"),
    ];
    if let Err(e) = bot.set_my_commands(commands).await {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!(username = ?username, "Telegram bot connected");

    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    tokio::spawn(async move {
        poll_loop(bot, ctx, loop_cancel).await;
    });

    Ok(cancel)
}

async fn poll_loop(bot: Bot, ctx: ServiceContext, cancel: CancellationToken) {
    info!("Starting Telegram polling loop");
    let mut offset: i32 = 0;

    loop {
        let request = bot
            .get_updates()
            .offset(offset)
            .timeout(POLL_TIMEOUT_SECS)
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .send();

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = request => result,
        };

        match result {
            Ok(updates) => {
                debug!(count = updates.len(), "Got Telegram updates");
                for update in updates {
                    offset = update.id.as_offset();
                    dispatch_update(update.kind, &bot, &ctx).await;
                }
            }
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                error!("Another instance is polling with this token, stopping");
                cancel.cancel();
                break;
            }
            Err(e) => {
                warn!(error = %e, "Telegram getUpdates failed");
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(Duration::from_secs(5)) => {}
                }
            }
        }
    }

    info!("Telegram polling stopped");
}

async fn dispatch_update(kind: UpdateKind, bot: &Bot, ctx: &ServiceContext) {
    let outcome = match kind {
        UpdateKind::Message(msg) => {
            debug!(chat_id = msg.chat.id.0, "Received message");
            handlers::handle_message(msg, bot, ctx).await
        }
        UpdateKind::CallbackQuery(query) => {
            debug!(callback_data = ?query.data, "Received callback query");
            handlers::handle_callback_query(query, bot, ctx).await
        }
        other => {
            debug!("Ignoring update: {other:?}");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        log_handler_error(&e);
    }
}

fn log_handler_error(e: &Error) {
    error!(error = %e, "Error handling Telegram update");
}
