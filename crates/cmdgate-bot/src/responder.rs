//! Serenity side of the reply path.

use async_trait::async_trait;
use chrono::Utc;
use cmdgate_common::{snowflake_timestamp, ChannelId, GuildId, UserId};
use cmdgate_dispatch::{
    ChatInputInteraction, CommandOption, ContextMenuInteraction, ContextMenuTarget,
    InboundInteraction, InteractionMeta, InteractionResponder, InvokingUser, OptionValue, Reply,
    ResponseError, SentMessage,
};
use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandType,
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
    EditInteractionResponse, Http, Message,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Answers one command interaction through the Discord HTTP API.
pub struct SerenityResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
}

impl SerenityResponder {
    /// Creates a responder for `interaction`.
    pub const fn new(http: Arc<Http>, interaction: CommandInteraction) -> Self {
        Self { http, interaction }
    }

    fn sent(message: Message) -> SentMessage {
        SentMessage {
            id: message.id.get(),
            content: message.content,
        }
    }
}

#[async_trait]
impl InteractionResponder for SerenityResponder {
    async fn reply(&self, reply: Reply) -> Result<(), ResponseError> {
        let http: &Http = &self.http;
        let message = CreateInteractionResponseMessage::new()
            .content(reply.content())
            .ephemeral(reply.is_ephemeral());
        self.interaction
            .create_response(http, CreateInteractionResponse::Message(message))
            .await
            .map_err(ResponseError::platform)
    }

    async fn defer_reply(&self, ephemeral: bool) -> Result<(), ResponseError> {
        let http: &Http = &self.http;
        let message = CreateInteractionResponseMessage::new().ephemeral(ephemeral);
        self.interaction
            .create_response(http, CreateInteractionResponse::Defer(message))
            .await
            .map_err(ResponseError::platform)
    }

    async fn edit_reply(&self, content: &str) -> Result<SentMessage, ResponseError> {
        let http: &Http = &self.http;
        self.interaction
            .edit_response(http, EditInteractionResponse::new().content(content))
            .await
            .map(Self::sent)
            .map_err(ResponseError::platform)
    }

    async fn delete_reply(&self) -> Result<(), ResponseError> {
        let http: &Http = &self.http;
        self.interaction
            .delete_response(http)
            .await
            .map_err(ResponseError::platform)
    }

    async fn fetch_reply(&self) -> Result<SentMessage, ResponseError> {
        let http: &Http = &self.http;
        self.interaction
            .get_response(http)
            .await
            .map(Self::sent)
            .map_err(ResponseError::platform)
    }

    async fn follow_up(&self, reply: Reply) -> Result<SentMessage, ResponseError> {
        let http: &Http = &self.http;
        let followup = CreateInteractionResponseFollowup::new()
            .content(reply.content())
            .ephemeral(reply.is_ephemeral());
        self.interaction
            .create_followup(http, followup)
            .await
            .map(Self::sent)
            .map_err(ResponseError::platform)
    }
}

impl std::fmt::Debug for SerenityResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerenityResponder")
            .field("interaction_id", &self.interaction.id)
            .field("command", &self.interaction.data.name)
            .finish_non_exhaustive()
    }
}

/// Converts a serenity command interaction into the dispatcher's shape.
///
/// Returns `None` for command kinds the dispatcher does not handle.
pub fn inbound_interaction(
    http: Arc<Http>,
    interaction: CommandInteraction,
) -> Option<InboundInteraction> {
    let interaction_id = interaction.id.get();
    let meta = InteractionMeta {
        interaction_id,
        command_name: interaction.data.name.clone(),
        user: InvokingUser {
            id: UserId(interaction.user.id.get()),
            name: interaction.user.name.clone(),
        },
        guild_id: interaction.guild_id.map(|id| GuildId(id.get())),
        channel_id: ChannelId(interaction.channel_id.get()),
        created_at: snowflake_timestamp(interaction_id).unwrap_or_else(Utc::now),
        locale: interaction.locale.clone(),
    };

    let kind = interaction.data.kind;
    let target_id = interaction.data.target_id.map(|id| id.get());
    let options = convert_options(&interaction.data.options);
    let responder: Arc<dyn InteractionResponder> =
        Arc::new(SerenityResponder::new(http, interaction));

    let inbound = match kind {
        CommandType::ChatInput => InboundInteraction::ChatInput(ChatInputInteraction {
            meta,
            options,
            responder,
        }),
        CommandType::User | CommandType::Message => {
            let Some(target_id) = target_id else {
                warn!(command = %meta.command_name, "Context menu interaction without a target");
                return None;
            };
            let target = if kind == CommandType::User {
                ContextMenuTarget::User(UserId(target_id))
            } else {
                ContextMenuTarget::Message(target_id)
            };
            InboundInteraction::ContextMenu(ContextMenuInteraction {
                meta,
                target,
                responder,
            })
        }
        other => {
            debug!(kind = ?other, "Ignoring unsupported command kind");
            return None;
        }
    };

    Some(inbound)
}

fn convert_options(options: &[CommandDataOption]) -> Vec<CommandOption> {
    options.iter().filter_map(convert_option).collect()
}

fn convert_option(option: &CommandDataOption) -> Option<CommandOption> {
    let value = match &option.value {
        CommandDataOptionValue::String(value) => OptionValue::String(value.clone()),
        CommandDataOptionValue::Integer(value) => OptionValue::Integer(*value),
        CommandDataOptionValue::Number(value) => OptionValue::Number(*value),
        CommandDataOptionValue::Boolean(value) => OptionValue::Boolean(*value),
        CommandDataOptionValue::User(id) => OptionValue::User(UserId(id.get())),
        CommandDataOptionValue::Channel(id) => OptionValue::Channel(ChannelId(id.get())),
        CommandDataOptionValue::Role(id) => OptionValue::Role(id.get()),
        CommandDataOptionValue::Mentionable(id) => OptionValue::Mentionable(id.get()),
        CommandDataOptionValue::Attachment(id) => OptionValue::Attachment(id.get()),
        CommandDataOptionValue::SubCommand(options) => {
            OptionValue::SubCommand(convert_options(options))
        }
        CommandDataOptionValue::SubCommandGroup(options) => {
            OptionValue::SubCommandGroup(convert_options(options))
        }
        other => {
            debug!(option = %option.name, value = ?other, "Skipping unsupported option value");
            return None;
        }
    };

    Some(CommandOption::new(option.name.clone(), value))
}
