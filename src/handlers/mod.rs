mod info;
pub mod utils;

use crate::commands::Command;
use info::info;
use teloxide::prelude::*;
use tracing::info;

// NOTE: use `Bot` (not `AutoSend<Bot>`) so the code works without enabling
// teloxide's `auto-send` feature in Cargo.toml.
pub async fn handle_command(bot: Bot, msg: Message, cmd: Command) -> ResponseResult<()> {
    info!("Update received: chat_id = {}, command = {:?}", msg.chat.id, cmd);
    match cmd {
        Command::Start | Command::Info => info(bot, msg).await,
    }
}

/// Messages carrying /start or /info go to the info pipeline; everything else is ignored.
pub fn get_update_handler() -> teloxide::dispatching::UpdateHandler<teloxide::RequestError> {
    teloxide::types::Update::filter_message().branch(
        teloxide::dptree::entry()
            .filter_command::<Command>()
            .endpoint(handle_command),
    )
}
