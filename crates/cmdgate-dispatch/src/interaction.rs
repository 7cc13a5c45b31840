//! Inbound interaction events and the platform's reply-path capability.
//!
//! Interactions arrive as one of a closed set of variants. Every variant carries
//! the same identity fields ([`InteractionMeta`]) and the same reply-path
//! operations ([`InteractionResponder`]), so the dispatcher never needs to know
//! which kind of event it is handling beyond picking the argument payload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cmdgate_common::{ChannelId, GuildId, UserId};
use std::sync::Arc;

use crate::error::ResponseError;

/// The user who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokingUser {
    /// User id.
    pub id: UserId,
    /// Username at the time of the interaction.
    pub name: String,
}

/// Identity fields shared by all interaction variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionMeta {
    /// Platform id of the interaction.
    pub interaction_id: u64,
    /// Name of the invoked command.
    pub command_name: String,
    /// Invoking user.
    pub user: InvokingUser,
    /// Guild the interaction came from, `None` in direct messages.
    pub guild_id: Option<GuildId>,
    /// Channel the interaction came from.
    pub channel_id: ChannelId,
    /// When the interaction was created.
    pub created_at: DateTime<Utc>,
    /// Locale selected by the invoking user.
    pub locale: String,
}

/// A resolved slash command option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// String option.
    String(String),
    /// Integer option.
    Integer(i64),
    /// Floating point option.
    Number(f64),
    /// Boolean option.
    Boolean(bool),
    /// User option.
    User(UserId),
    /// Channel option.
    Channel(ChannelId),
    /// Role option (role id).
    Role(u64),
    /// Mentionable option (user or role id).
    Mentionable(u64),
    /// Attachment option (attachment id).
    Attachment(u64),
    /// Subcommand with its own options.
    SubCommand(Vec<CommandOption>),
    /// Subcommand group with its subcommands.
    SubCommandGroup(Vec<CommandOption>),
}

/// A named slash command option.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOption {
    /// Option name.
    pub name: String,
    /// Option value.
    pub value: OptionValue,
}

impl CommandOption {
    /// Creates an option.
    pub fn new(name: impl Into<String>, value: OptionValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Target of a context-menu command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuTarget {
    /// A user context-menu command, targeting this user.
    User(UserId),
    /// A message context-menu command, targeting this message id.
    Message(u64),
}

/// Argument payload of an invocation. Parsing is left to the command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandArguments {
    /// Options of a chat-input (slash) command.
    Options(Vec<CommandOption>),
    /// Target of a context-menu command.
    Target(ContextMenuTarget),
}

impl CommandArguments {
    /// Looks up a top-level option by name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        match self {
            Self::Options(options) => options
                .iter()
                .find(|option| option.name == name)
                .map(|option| &option.value),
            Self::Target(_) => None,
        }
    }

    /// Looks up a string option.
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Looks up an integer option.
    pub fn get_integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Looks up a boolean option.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            OptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Context-menu target, if this is a context-menu invocation.
    pub const fn target(&self) -> Option<ContextMenuTarget> {
        match self {
            Self::Target(target) => Some(*target),
            Self::Options(_) => None,
        }
    }
}

/// An initial reply or follow-up message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    content: String,
    ephemeral: bool,
}

impl Reply {
    /// A reply visible to everyone in the channel.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    /// A reply only the invoking user can see.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::new(content).with_ephemeral(true)
    }

    /// Sets whether the reply is ephemeral.
    #[must_use]
    pub const fn with_ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether only the invoking user can see the reply.
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl From<&str> for Reply {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for Reply {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

/// A message the platform reports back after an edit, fetch or follow-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Message id.
    pub id: u64,
    /// Message content.
    pub content: String,
}

/// The platform's reply-path operations for one interaction.
///
/// Implementations forward directly to the platform; acknowledgment
/// bookkeeping lives in [`CommandContext`](crate::CommandContext).
#[async_trait]
pub trait InteractionResponder: Send + Sync {
    /// Sends the initial reply.
    async fn reply(&self, reply: Reply) -> Result<(), ResponseError>;

    /// Acknowledges the interaction, showing a loading state.
    async fn defer_reply(&self, ephemeral: bool) -> Result<(), ResponseError>;

    /// Edits the initial reply (or fills in a deferred one).
    async fn edit_reply(&self, content: &str) -> Result<SentMessage, ResponseError>;

    /// Deletes the initial reply.
    async fn delete_reply(&self) -> Result<(), ResponseError>;

    /// Fetches the initial reply.
    async fn fetch_reply(&self) -> Result<SentMessage, ResponseError>;

    /// Sends an additional message after the initial reply.
    async fn follow_up(&self, reply: Reply) -> Result<SentMessage, ResponseError>;
}

/// A chat-input (slash) command invocation.
pub struct ChatInputInteraction {
    /// Identity fields.
    pub meta: InteractionMeta,
    /// Options as sent by the platform.
    pub options: Vec<CommandOption>,
    /// Reply path.
    pub responder: Arc<dyn InteractionResponder>,
}

/// A user or message context-menu command invocation.
pub struct ContextMenuInteraction {
    /// Identity fields.
    pub meta: InteractionMeta,
    /// Targeted user or message.
    pub target: ContextMenuTarget,
    /// Reply path.
    pub responder: Arc<dyn InteractionResponder>,
}

/// An inbound command interaction.
pub enum InboundInteraction {
    /// Slash command.
    ChatInput(ChatInputInteraction),
    /// Context-menu command.
    ContextMenu(ContextMenuInteraction),
}

impl InboundInteraction {
    /// Identity fields.
    pub const fn meta(&self) -> &InteractionMeta {
        match self {
            Self::ChatInput(interaction) => &interaction.meta,
            Self::ContextMenu(interaction) => &interaction.meta,
        }
    }

    /// Name of the invoked command.
    pub fn command_name(&self) -> &str {
        &self.meta().command_name
    }

    /// Reply path.
    pub const fn responder(&self) -> &Arc<dyn InteractionResponder> {
        match self {
            Self::ChatInput(interaction) => &interaction.responder,
            Self::ContextMenu(interaction) => &interaction.responder,
        }
    }

    /// Short label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ChatInput(_) => "chat_input",
            Self::ContextMenu(ContextMenuInteraction {
                target: ContextMenuTarget::User(_),
                ..
            }) => "user_context_menu",
            Self::ContextMenu(_) => "message_context_menu",
        }
    }
}

impl std::fmt::Debug for InboundInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundInteraction")
            .field("kind", &self.kind())
            .field("meta", self.meta())
            .finish_non_exhaustive()
    }
}
