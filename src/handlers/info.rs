// Handler shared by /start and /info: aggregate, render, reply.

use crate::handlers::utils::reply_html;
use crate::info::{InfoRequest, aggregate, render_report};
use teloxide::prelude::*;
use tracing::{error, info};

pub async fn info(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    let Some(request) = InfoRequest::from_message(&msg) else {
        bot.send_message(msg.chat.id, "The user could not be identified.")
            .await?;
        return Ok(());
    };

    let report = aggregate(&bot, &request).await;
    info!(
        "Info collected: user_id = {}, chat_id = {}, safety_score = {}",
        report.user_id, report.chat_id, report.safety_score
    );

    if let Err(e) = reply_html(&bot, &msg, render_report(&report)).await {
        error!("Telegram send failed: {e}");
        return Err(e);
    }

    Ok(())
}
