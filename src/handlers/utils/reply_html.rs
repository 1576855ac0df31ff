// Sends an HTML reply: threaded reply in group-like chats, plain message in private ones.

use teloxide::{
    prelude::*,
    requests::Requester,
    types::{ParseMode, ReplyParameters, ThreadId},
};

pub async fn reply_html(
    bot: &Bot,
    msg: &Message,
    text: impl Into<String>,
) -> Result<Message, teloxide::RequestError> {
    let chat_id = msg.chat.id;
    let thread_id: Option<ThreadId> = msg.thread_id;

    let req = bot
        .send_message(chat_id, text.into())
        .parse_mode(ParseMode::Html);

    // Private chats have no title; there a reply quote adds nothing.
    if msg.chat.title().is_none() {
        return req.await;
    }

    // The command message may be deleted before we answer.
    let params = ReplyParameters::new(msg.id).allow_sending_without_reply();
    let req = req.reply_parameters(params);
    match thread_id {
        Some(tid) => req.message_thread_id(tid).await,
        None => req.await,
    }
}
