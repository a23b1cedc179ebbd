//! Conversation service
//!
//! Interprets chat text and button presses. Replies are returned as
//! `BotReply` values; rendering them is up to the chat transport.

use std::fmt::Write as _;

use konv_core::{Channel, ChannelId, PendingInput, ToggleOutcome, User};
use tracing::{debug, instrument, warn};

use super::channel::ChannelService;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::reply::{BotReply, CallbackAction, CallbackReply, InlineButton, Keyboard, SUBSCRIBED_MARK};

/// An inbound chat text message
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Chat the message was posted in; replies and subscriptions use it
    pub conversation_id: String,
    pub sender: User,
    pub text: String,
}

impl InboundMessage {
    pub fn new(conversation_id: impl Into<String>, sender: User, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            sender,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Help,
    List,
    NewChannel,
    Channels,
    Stats,
    Unknown,
}

impl Command {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        // "/stats@SomeBot" in group chats
        let text = match text.strip_prefix('/') {
            Some(_) => text.split('@').next().unwrap_or(text),
            None => text,
        };
        let is = |word: &str| text.eq_ignore_ascii_case(word);

        if is("help") || is("/help") || is("/start") {
            Self::Help
        } else if is("list") || is("/list") {
            Self::List
        } else if is("new channel") || is("/newchannel") {
            Self::NewChannel
        } else if is("channels") || is("/channels") {
            Self::Channels
        } else if is("/stats") {
            Self::Stats
        } else {
            Self::Unknown
        }
    }
}

pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn channels(&self) -> ChannelService<'a> {
        ChannelService::new(self.ctx)
    }

    /// Answer a text message.
    ///
    /// A pending channel-name prompt takes precedence over commands: the
    /// marker is consumed and the whole text becomes the channel name.
    #[instrument(skip(self, msg), fields(conversation = %msg.conversation_id, sender = %msg.sender))]
    pub async fn handle_message(&self, msg: &InboundMessage) -> ServiceResult<BotReply> {
        let pending = self
            .ctx
            .channel_repo()
            .take_pending_input(&msg.conversation_id)
            .await?;
        if pending == Some(PendingInput::ChannelName) {
            return self.finish_channel_creation(msg).await;
        }

        let command = Command::parse(&msg.text);
        debug!(?command, "Handling chat message");

        match command {
            Command::Help => Ok(BotReply::text(self.help_text()).with_main_menu()),
            Command::List => self.channel_list(&msg.sender).await,
            Command::NewChannel => {
                self.ctx
                    .channel_repo()
                    .set_pending_input(&msg.conversation_id, PendingInput::ChannelName)
                    .await?;
                Ok(BotReply::text("Give me a name for the channel"))
            }
            Command::Channels => self.channel_picker(msg).await,
            Command::Stats => {
                let total = self.channels().global_message_count().await?;
                Ok(BotReply::text(format!("Messages delivered: {total}")))
            }
            Command::Unknown => {
                Ok(BotReply::text("I did not understand that. Try HELP").with_main_menu())
            }
        }
    }

    /// Answer an inline button press.
    ///
    /// `conversation_id` is the chat holding the pressed button; it is absent
    /// for buttons on inline-mode messages.
    #[instrument(skip(self), fields(sender = %sender))]
    pub async fn handle_callback(
        &self,
        conversation_id: Option<&str>,
        sender: &User,
        data: &str,
    ) -> ServiceResult<CallbackReply> {
        let action = match data.parse::<CallbackAction>() {
            Ok(action) => action,
            Err(e) => {
                warn!(error = %e, "Ignoring unknown button action");
                return Ok(CallbackReply::notice("Unknown action"));
            }
        };

        let result = match &action {
            CallbackAction::Edit(id) => self.edit_menu(sender, id).await,
            CallbackAction::Info(id) => self.channel_info(sender, id, conversation_id).await,
            CallbackAction::Activate(id) => self.toggle_here(sender, id, conversation_id).await,
            CallbackAction::Delete(id) => self.delete(sender, id).await,
        };

        match result {
            Err(e) if e.is_not_found() => {
                debug!(channel_id = %action.channel_id(), "Button for missing or foreign channel");
                Ok(CallbackReply::notice("Channel not found"))
            }
            other => other,
        }
    }

    async fn finish_channel_creation(&self, msg: &InboundMessage) -> ServiceResult<BotReply> {
        let channels = self.channels();
        match channels.create_channel(&msg.sender, &msg.text).await {
            Ok(channel) => {
                channels
                    .add_target(&channel.id, &msg.conversation_id)
                    .await?;
                Ok(BotReply::text(format!(
                    "channel {} created and activated here",
                    channel.name
                ))
                .with_main_menu())
            }
            Err(ServiceError::Domain(e)) if e.is_conflict() => Ok(BotReply::text(format!(
                "Channel name {} already present. Send New Channel to pick another one",
                msg.text.trim()
            ))
            .with_main_menu()),
            Err(ServiceError::Validation(reason)) => Ok(BotReply::text(format!(
                "{reason}. Send New Channel to try again"
            ))
            .with_main_menu()),
            Err(e) => Err(e),
        }
    }

    async fn channel_list(&self, owner: &User) -> ServiceResult<BotReply> {
        let channels = self.channels().list_channels(owner).await?;
        if channels.is_empty() {
            return Ok(BotReply::text(
                "You have no channels yet. Send New Channel to create one",
            ));
        }

        let mut text = format!("Channellist for {owner}\n");
        for channel in &channels {
            let _ = writeln!(text, "{}", channel.name);
            let _ = writeln!(text, " ID: {}", channel.id);
            let _ = writeln!(text, " messages: {}", channel.message_count);
            let _ = writeln!(text, " active in chats: {}", channel.targets().len());
            let _ = writeln!(text, " send a message: {}", self.example_link(&channel.id));
        }
        Ok(BotReply::text(text))
    }

    async fn channel_picker(&self, msg: &InboundMessage) -> ServiceResult<BotReply> {
        let channels = self.channels().list_channels(&msg.sender).await?;
        if channels.is_empty() {
            return Ok(BotReply::text(
                "You have no channels yet. Send New Channel to create one",
            )
            .with_main_menu());
        }

        let buttons = channels
            .iter()
            .map(|channel| {
                InlineButton::new(
                    picker_label(channel, &msg.conversation_id),
                    CallbackAction::Edit(channel.id.clone()),
                )
            })
            .collect();
        Ok(BotReply::text("Choose channel to edit").with_keyboard(Keyboard::inline_grid(buttons)))
    }

    async fn edit_menu(&self, owner: &User, id: &ChannelId) -> ServiceResult<CallbackReply> {
        let channel = self.channels().get_owned_channel(owner, id).await?;
        let keyboard = Keyboard::Inline(vec![vec![
            InlineButton::new("Info", CallbackAction::Info(id.clone())),
            InlineButton::new("Activate", CallbackAction::Activate(id.clone())),
            InlineButton::new("Delete", CallbackAction::Delete(id.clone())),
        ]]);
        Ok(CallbackReply {
            notice: Some("Channel edited".to_string()),
            reply: Some(
                BotReply::text(format!(
                    "what do you want to do with channel {}",
                    channel.name
                ))
                .with_keyboard(keyboard),
            ),
        })
    }

    async fn channel_info(
        &self,
        owner: &User,
        id: &ChannelId,
        conversation_id: Option<&str>,
    ) -> ServiceResult<CallbackReply> {
        let channel = self.channels().get_owned_channel(owner, id).await?;
        let here = conversation_id.is_some_and(|chat| channel.has_target(chat));

        let mut text = format!("Channel {}\n", channel.name);
        let _ = writeln!(text, " ID: {}", channel.id);
        let _ = writeln!(text, " messages: {}", channel.message_count);
        let _ = writeln!(text, " active in chats: {}", channel.targets().len());
        let _ = writeln!(text, " active here: {}", if here { "yes" } else { "no" });
        let _ = writeln!(text, " send a message: {}", self.example_link(&channel.id));
        Ok(CallbackReply::reply(BotReply::text(text)))
    }

    async fn toggle_here(
        &self,
        owner: &User,
        id: &ChannelId,
        conversation_id: Option<&str>,
    ) -> ServiceResult<CallbackReply> {
        let Some(chat) = conversation_id else {
            return Ok(CallbackReply::reply(BotReply::text(
                "unable to get current chat",
            )));
        };

        let notice = match self.channels().toggle_target(owner, id, chat).await? {
            ToggleOutcome::Added => "Channel added",
            ToggleOutcome::Removed => "Channel removed!",
        };
        Ok(CallbackReply::notice(notice))
    }

    async fn delete(&self, owner: &User, id: &ChannelId) -> ServiceResult<CallbackReply> {
        if self.channels().delete_channel(owner, id).await? {
            Ok(CallbackReply::reply(BotReply::text("Channel deleted")))
        } else {
            Ok(CallbackReply::notice("Channel not found"))
        }
    }

    fn example_link(&self, id: &ChannelId) -> String {
        format!(
            "{}/message/{id}/This%20is%20an%20example%20message",
            self.ctx.public_base_url()
        )
    }

    fn help_text(&self) -> String {
        let bot = if self.ctx.bot_name().is_empty() {
            "This bot".to_string()
        } else {
            format!("@{}", self.ctx.bot_name())
        };
        let base = self.ctx.public_base_url();
        let version = env!("CARGO_PKG_VERSION");

        format!(
            "Use this bot to receive Telegram messages from anywhere: server monitoring, \
             filled-out web forms and so on. All you need is an HTTP POST.\n\n\
             A channel is an input for messages. You can have many channels; they are bound \
             to your Telegram user.\n\n\
             Activate a channel in any chat to receive its messages. {bot} must be a member \
             of that chat. One channel can be active in many chats, and every message sent to \
             it is delivered to each of them.\n\n\
             Send a message to a channel with a POST request:\n\
             {{\"target\": \"<channel-id>\", \"message\": \"<your message>\"}}\n\n\
             channel-id: the id from your channel list\n\
             your message: the text to deliver\n\n\
             curl example:\n\
             curl -H \"Content-Type: application/json\" -X POST \
             -d '{{\"target\": \"<channel-id>\", \"message\": \"This is a telegram message\"}}' \
             {base}/message\n\n\
             Version: {version}"
        )
    }
}

fn picker_label(channel: &Channel, conversation_id: &str) -> String {
    if channel.has_target(conversation_id) {
        format!("{} {SUBSCRIBED_MARK}", channel.name)
    } else {
        channel.name.clone()
    }
}
