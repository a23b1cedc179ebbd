//! Update handlers
//!
//! Translate Telegram updates into `ConversationService` calls and send the
//! resulting replies back.

use konv_core::{split_into_chunks, User, MAX_CHUNK_SIZE};
use konv_service::{BotReply, CallbackReply, ConversationService, InboundMessage, ServiceContext};
use teloxide::{
    payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
    prelude::*,
    types::{CallbackQuery, ChatId},
};
use tracing::{debug, error};

use crate::error::Result;
use crate::keyboard::reply_markup;

const FAILURE_TEXT: &str = "Something went wrong, please try again later";

/// Handle an inbound text message
pub async fn handle_message(msg: Message, bot: &Bot, ctx: &ServiceContext) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(chat_id = msg.chat.id.0, "Ignoring non-text message");
        return Ok(());
    };
    let Some(from) = msg.from.as_ref() else {
        debug!(chat_id = msg.chat.id.0, "Ignoring message without sender");
        return Ok(());
    };

    let inbound = InboundMessage::new(
        msg.chat.id.0.to_string(),
        User::new(from.id.0.to_string()),
        text,
    );
    let reply = match ConversationService::new(ctx).handle_message(&inbound).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(chat_id = msg.chat.id.0, error = %e, "Failed to handle chat message");
            BotReply::text(FAILURE_TEXT)
        }
    };

    send_reply(bot, msg.chat.id, reply).await
}

/// Handle an inline keyboard button press
pub async fn handle_callback_query(
    query: CallbackQuery,
    bot: &Bot,
    ctx: &ServiceContext,
) -> Result<()> {
    let Some(data) = query.data.as_deref() else {
        bot.answer_callback_query(&query.id).await?;
        return Ok(());
    };

    let chat_id = query.message.as_ref().map(|m| m.chat().id);
    let conversation_id = chat_id.map(|id| id.0.to_string());
    let sender = User::new(query.from.id.0.to_string());

    let CallbackReply { notice, reply } = match ConversationService::new(ctx)
        .handle_callback(conversation_id.as_deref(), &sender, data)
        .await
    {
        Ok(answer) => answer,
        Err(e) => {
            error!(callback_data = data, error = %e, "Failed to handle button press");
            CallbackReply::notice(FAILURE_TEXT)
        }
    };

    // Always answer, even without text, to dismiss the client's spinner
    let mut answer = bot.answer_callback_query(&query.id);
    if let Some(notice) = notice {
        answer = answer.text(notice);
    }
    answer.await?;

    match (reply, chat_id) {
        (Some(reply), Some(chat_id)) => send_reply(bot, chat_id, reply).await,
        (Some(_), None) => {
            debug!(callback_data = data, "No chat to reply in");
            Ok(())
        }
        (None, _) => Ok(()),
    }
}

/// Send a reply, split to the message size limit; the keyboard goes on the
/// last part
async fn send_reply(bot: &Bot, chat_id: ChatId, reply: BotReply) -> Result<()> {
    let parts = split_into_chunks(&reply.text, MAX_CHUNK_SIZE);
    let last = parts.len().saturating_sub(1);

    for (index, part) in parts.into_iter().enumerate() {
        let request = bot.send_message(chat_id, part);
        match &reply.keyboard {
            Some(keyboard) if index == last => {
                request.reply_markup(reply_markup(keyboard)).await?;
            }
            _ => {
                request.await?;
            }
        }
    }
    Ok(())
}
