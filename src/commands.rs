use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show information about you and this chat.")]
    Start,

    #[command(description = "show information about you and this chat.")]
    Info,
}
