//! `/about`: version and command list.

use async_trait::async_trait;
use cmdgate_dispatch::{Command, CommandContext, CommandResult, Reply};
use serenity::all::CreateCommand;
use std::sync::Arc;

/// Command name.
pub const NAME: &str = "about";

/// Shows the bot version and its commands.
pub struct About {
    commands: Vec<String>,
}

impl About {
    /// Creates the command listing `commands`.
    pub const fn new(commands: Vec<String>) -> Self {
        Self { commands }
    }

    fn render(&self) -> String {
        format!(
            "CmdGate {}\nCommands: {}",
            env!("CARGO_PKG_VERSION"),
            self.commands.join(", ")
        )
    }
}

/// Registration payload.
pub fn definition() -> CreateCommand {
    CreateCommand::new(NAME).description("About this bot")
}

#[async_trait]
impl Command for About {
    fn name(&self) -> &str {
        NAME
    }

    async fn run(&self, ctx: Arc<CommandContext>) -> CommandResult {
        ctx.reply(Reply::ephemeral(self.render())).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_commands() {
        let about = About::new(vec!["about".to_string(), "ping".to_string()]);
        let rendered = about.render();
        assert!(rendered.starts_with("CmdGate "));
        assert!(rendered.ends_with("Commands: about, ping"));
    }
}
