// Renders an InfoResult into the HTML reply.

use super::{AdminEntry, InfoResult};
use html_escape::encode_text;
use std::fmt::Display;

/// Placeholder for any field that could not be determined.
pub const UNKNOWN: &str = "N/A";

const RULE: &str = "━━━━━━━━━━━━━━";

fn or_unknown<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| encode_text(&v.to_string()).into_owned())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn admin_label(admin: &AdminEntry) -> String {
    format!("{} ({})", admin.name, admin.id)
}

fn admin_block(admins: Option<&[AdminEntry]>) -> String {
    match admins {
        Some(list) if !list.is_empty() => list
            .iter()
            .map(|a| format!("• {}", encode_text(&admin_label(a))))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => UNKNOWN.to_string(),
    }
}

/// Fixed template; group-only fields show the unknown placeholder in private chats.
pub fn render_report(info: &InfoResult) -> String {
    let username = info.username.as_ref().map(|u| format!("@{u}"));
    let user_admin = info.is_admin.map(yes_no);
    let owner = info.owner.as_ref().map(admin_label);
    let join_date = info
        .join_date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string());
    let permissions = info
        .permissions
        .as_ref()
        .and_then(|p| serde_json::to_string_pretty(p).ok());

    let mut out = String::new();
    out.push_str("<b>⚡️ Advanced Telegram Info Bot</b>\n\n");

    out.push_str(&format!("<b>👤 User Info</b>\n{RULE}\n"));
    out.push_str(&format!("<b>Name:</b> {}\n", encode_text(&info.full_name)));
    out.push_str(&format!("<b>Username:</b> {}\n", or_unknown(username)));
    out.push_str(&format!("<b>User ID:</b> <code>{}</code>\n", info.user_id));
    out.push_str(&format!("<b>Language:</b> {}\n", or_unknown(info.language.as_ref())));
    out.push_str(&format!("<b>Premium:</b> {}\n", yes_no(info.is_premium)));
    out.push_str(&format!("<b>Bot Account:</b> {}\n", yes_no(info.is_bot)));
    out.push_str(&format!("<b>Bio:</b> {}\n", or_unknown(info.bio.as_ref())));
    out.push_str(&format!("<b>Profile Photos:</b> {}\n", info.photo_count));
    out.push_str(&format!("<b>Account Age (Est):</b> {}\n", info.age.label()));
    out.push_str(&format!("<b>Safety Score:</b> {}/100\n\n", info.safety_score));

    out.push_str(&format!("<b>💬 Chat Info</b>\n{RULE}\n"));
    out.push_str(&format!("<b>Chat ID:</b> <code>{}</code>\n", info.chat_id));
    out.push_str(&format!("<b>Chat Type:</b> {}\n", info.chat_kind.as_str()));
    out.push_str(&format!("<b>Title:</b> {}\n", or_unknown(info.title.as_ref())));
    out.push_str(&format!("<b>Members:</b> {}\n", or_unknown(info.member_count)));
    out.push_str(&format!("<b>Invite Link:</b> {}\n\n", or_unknown(info.invite_link.as_ref())));

    out.push_str(&format!("<b>👮 Admin Info</b>\n{RULE}\n"));
    out.push_str(&format!("<b>User Admin:</b> {}\n", or_unknown(user_admin)));
    out.push_str(&format!("<b>Group Owner:</b> {}\n\n", or_unknown(owner)));

    out.push_str(&format!(
        "<b>👥 Admin List:</b>\n{}\n\n",
        admin_block(info.admins.as_deref())
    ));
    out.push_str(&format!("<b>⏳ Join Date:</b> {}\n\n", or_unknown(join_date)));
    out.push_str(&format!("<b>📌 Permissions:</b>\n<code>{}</code>", or_unknown(permissions)));

    out
}
