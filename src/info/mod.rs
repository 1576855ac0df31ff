// Builds the per-command info report about the requesting user and the current chat.

pub mod format;
pub mod lookup;

pub use format::render_report;
pub use lookup::{AdminEntry, ChatDetails, ChatLookup, LookupError, MemberRecord, MemberStatus};

use chrono::{DateTime, Utc};
use lookup::fallback;
use serde_json::Value;
use teloxide::types::{Chat, ChatId, Message, User, UserId};

/// Ids below this belong to the oldest generation of accounts.
pub const OLD_ACCOUNT_ID_LIMIT: u64 = 1_000_000_000;
/// Ids below this (and at least `OLD_ACCOUNT_ID_LIMIT`) are mid-generation accounts.
pub const MEDIUM_ACCOUNT_ID_LIMIT: u64 = 2_000_000_000;

/// Points contributed by each satisfied safety signal.
const SAFETY_POINTS: u8 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatKind {
    pub fn of(chat: &Chat) -> Self {
        if chat.is_private() {
            ChatKind::Private
        } else if chat.is_supergroup() {
            ChatKind::Supergroup
        } else if chat.is_channel() {
            ChatKind::Channel
        } else {
            ChatKind::Group
        }
    }

    pub fn is_private(self) -> bool {
        self == ChatKind::Private
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChatKind::Private => "private",
            ChatKind::Group => "group",
            ChatKind::Supergroup => "supergroup",
            ChatKind::Channel => "channel",
        }
    }
}

/// Rough account age, estimated from the numeric user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeBucket {
    Old,
    Medium,
    New,
}

impl AgeBucket {
    pub fn from_user_id(id: u64) -> Self {
        if id < OLD_ACCOUNT_ID_LIMIT {
            AgeBucket::Old
        } else if id < MEDIUM_ACCOUNT_ID_LIMIT {
            AgeBucket::Medium
        } else {
            AgeBucket::New
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Old => "Old (2015-2018)",
            AgeBucket::Medium => "Medium (2019-2021)",
            AgeBucket::New => "New (2022-2025)",
        }
    }
}

/// The five boolean heuristics behind the safety score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafetySignals {
    pub has_username: bool,
    pub has_photo: bool,
    pub has_bio: bool,
    pub is_premium: bool,
    pub is_old_account: bool,
}

impl SafetySignals {
    /// 0..=100 in steps of 20.
    pub fn score(self) -> u8 {
        [
            self.has_username,
            self.has_photo,
            self.has_bio,
            self.is_premium,
            self.is_old_account,
        ]
        .into_iter()
        .filter(|signal| *signal)
        .count() as u8
            * SAFETY_POINTS
    }
}

/// Who asked, and where. Everything here comes straight from the inbound update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRequest {
    pub user_id: u64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub language: Option<String>,
    pub is_premium: bool,
    pub is_bot: bool,
    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub chat_title: Option<String>,
}

impl InfoRequest {
    pub fn new(user: &User, chat: &Chat) -> Self {
        Self {
            user_id: user.id.0,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            language: user.language_code.clone(),
            is_premium: user.is_premium,
            is_bot: user.is_bot,
            chat_id: chat.id.0,
            chat_kind: ChatKind::of(chat),
            chat_title: chat.title().map(str::to_owned),
        }
    }

    /// `None` when the message carries no sender (e.g. channel posts).
    pub fn from_message(msg: &Message) -> Option<Self> {
        msg.from.as_ref().map(|user| Self::new(user, &msg.chat))
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last).trim().to_string(),
            None => self.first_name.trim().to_string(),
        }
    }
}

/// Everything the bot reports for one command. `None` means "unknown".
#[derive(Debug, Clone, PartialEq)]
pub struct InfoResult {
    pub user_id: u64,
    pub username: Option<String>,
    pub full_name: String,
    pub language: Option<String>,
    pub is_premium: bool,
    pub is_bot: bool,
    pub bio: Option<String>,
    pub photo_count: u32,

    pub chat_id: i64,
    pub chat_kind: ChatKind,
    pub title: Option<String>,
    pub member_count: Option<u32>,
    pub invite_link: Option<String>,

    pub is_admin: Option<bool>,
    pub owner: Option<AdminEntry>,
    pub admins: Option<Vec<AdminEntry>>,
    pub join_date: Option<DateTime<Utc>>,
    pub permissions: Option<Value>,

    pub age: AgeBucket,
    pub safety_score: u8,
}

#[derive(Debug, Default)]
struct GroupInfo {
    title: Option<String>,
    member_count: Option<u32>,
    invite_link: Option<String>,
    is_admin: Option<bool>,
    owner: Option<AdminEntry>,
    admins: Option<Vec<AdminEntry>>,
    join_date: Option<DateTime<Utc>>,
    permissions: Option<Value>,
}

/// First roster entry with creator status.
pub fn find_owner(admins: &[AdminEntry]) -> Option<&AdminEntry> {
    admins.iter().find(|a| a.status == MemberStatus::Creator)
}

/// Run every lookup for `requester`. Never fails: each lookup that errors
/// leaves only its own field unknown.
pub async fn aggregate<L>(lookup: &L, requester: &InfoRequest) -> InfoResult
where
    L: ChatLookup + Sync,
{
    let user = UserId(requester.user_id);
    let chat = ChatId(requester.chat_id);

    let (profile, photo_count) = tokio::join!(
        fallback("bio", lookup.chat_details(ChatId::from(user))),
        fallback("profile_photos", lookup.profile_photo_count(user)),
    );
    let bio = profile.and_then(|details| details.bio);
    let photo_count = photo_count.unwrap_or(0);

    let group = if requester.chat_kind.is_private() {
        GroupInfo::default()
    } else {
        group_info(lookup, requester, chat, user).await
    };

    let age = AgeBucket::from_user_id(requester.user_id);
    let safety_score = SafetySignals {
        has_username: requester.username.is_some(),
        has_photo: photo_count > 0,
        has_bio: bio.is_some(),
        is_premium: requester.is_premium,
        is_old_account: age == AgeBucket::Old,
    }
    .score();

    InfoResult {
        user_id: requester.user_id,
        username: requester.username.clone(),
        full_name: requester.full_name(),
        language: requester.language.clone(),
        is_premium: requester.is_premium,
        is_bot: requester.is_bot,
        bio,
        photo_count,
        chat_id: requester.chat_id,
        chat_kind: requester.chat_kind,
        title: group.title,
        member_count: group.member_count,
        invite_link: group.invite_link,
        is_admin: group.is_admin,
        owner: group.owner,
        admins: group.admins,
        join_date: group.join_date,
        permissions: group.permissions,
        age,
        safety_score,
    }
}

async fn group_info<L>(
    lookup: &L,
    requester: &InfoRequest,
    chat: ChatId,
    user: UserId,
) -> GroupInfo
where
    L: ChatLookup + Sync,
{
    let (member_count, member, admins, details) = tokio::join!(
        fallback("member_count", lookup.member_count(chat)),
        fallback("membership", lookup.chat_member(chat, user)),
        fallback("administrators", lookup.administrators(chat)),
        fallback("chat_details", lookup.chat_details(chat)),
    );

    let owner = admins.as_deref().and_then(find_owner).cloned();
    let (is_admin, join_date, permissions) = match member {
        Some(m) => (Some(m.status.is_admin()), m.until_date, Some(m.snapshot)),
        None => (None, None, None),
    };

    // The update's own title wins; getChat only fills in when it is missing.
    let (fetched_title, invite_link) = match details {
        Some(d) => (d.title, d.invite_link),
        None => (None, None),
    };

    GroupInfo {
        title: requester.chat_title.clone().or(fetched_title),
        member_count,
        invite_link,
        is_admin,
        owner,
        admins,
        join_date,
        permissions,
    }
}
