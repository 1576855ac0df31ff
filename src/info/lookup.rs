// Remote metadata lookups used to build an info report, plus the per-field fallback.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::future::Future;
use teloxide::{
    ApiError, RequestError,
    prelude::*,
    types::{ChatId, ChatMember, ChatMemberStatus, UserId},
};
use thiserror::Error;
use tracing::warn;

/// Why a single lookup could not be completed.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("not permitted: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rate limited by the platform")]
    RateLimited,
    #[error("platform rejected the request: {0}")]
    Api(String),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

impl LookupError {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Network(_) => "network",
            LookupError::Forbidden(_) => "forbidden",
            LookupError::NotFound(_) => "not_found",
            LookupError::RateLimited => "rate_limited",
            LookupError::Api(_) => "api",
            LookupError::Payload(_) => "payload",
        }
    }
}

impl From<RequestError> for LookupError {
    fn from(err: RequestError) -> Self {
        match &err {
            RequestError::Api(api) => match api {
                ApiError::ChatNotFound | ApiError::UserNotFound => {
                    LookupError::NotFound(api.to_string())
                }
                ApiError::BotBlocked | ApiError::BotKicked => {
                    LookupError::Forbidden(api.to_string())
                }
                ApiError::Unknown(text) if looks_forbidden(text) => {
                    LookupError::Forbidden(text.clone())
                }
                other => LookupError::Api(other.to_string()),
            },
            RequestError::RetryAfter(_) => LookupError::RateLimited,
            RequestError::Network(_) | RequestError::Io(_) => LookupError::Network(err.to_string()),
            _ => LookupError::Payload(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(err: serde_json::Error) -> Self {
        LookupError::Payload(err.to_string())
    }
}

/// Telegram phrasings for "the bot lacks the rights for this call".
const FORBIDDEN_PHRASES: [&str; 4] = [
    "forbidden:",
    "not enough rights",
    "chat_admin_required",
    "member list is inaccessible",
];

fn looks_forbidden(text: &str) -> bool {
    let lower = text.to_lowercase();
    FORBIDDEN_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Membership role, collapsed from the platform's member kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Banned,
}

impl MemberStatus {
    pub fn is_admin(self) -> bool {
        matches!(self, MemberStatus::Creator | MemberStatus::Administrator)
    }
}

impl From<ChatMemberStatus> for MemberStatus {
    fn from(status: ChatMemberStatus) -> Self {
        match status {
            ChatMemberStatus::Owner => MemberStatus::Creator,
            ChatMemberStatus::Administrator => MemberStatus::Administrator,
            ChatMemberStatus::Member => MemberStatus::Member,
            ChatMemberStatus::Restricted => MemberStatus::Restricted,
            ChatMemberStatus::Left => MemberStatus::Left,
            ChatMemberStatus::Banned => MemberStatus::Banned,
        }
    }
}

/// Fields read from a full chat object (`getChat`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatDetails {
    pub title: Option<String>,
    pub bio: Option<String>,
    pub invite_link: Option<String>,
}

impl ChatDetails {
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        Self {
            title: text("title"),
            bio: text("bio"),
            invite_link: text("invite_link"),
        }
    }
}

/// The requester's membership record in a chat.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRecord {
    pub status: MemberStatus,
    /// Restriction/ban expiry as reported by the platform; 0 means "none".
    pub until_date: Option<DateTime<Utc>>,
    /// Raw member object, rendered verbatim as the permission snapshot.
    pub snapshot: Value,
}

impl MemberRecord {
    pub fn from_member(member: &ChatMember) -> Result<Self, LookupError> {
        let snapshot = serde_json::to_value(member)?;
        let until_date = snapshot
            .get("until_date")
            .and_then(Value::as_i64)
            .filter(|ts| *ts > 0)
            .and_then(|ts| DateTime::from_timestamp(ts, 0));
        Ok(Self {
            status: member.kind.status().into(),
            until_date,
            snapshot,
        })
    }
}

/// One entry of a chat's administrator roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminEntry {
    pub name: String,
    pub id: u64,
    pub status: MemberStatus,
}

impl AdminEntry {
    pub fn from_member(member: &ChatMember) -> Self {
        Self {
            name: member.user.first_name.clone(),
            id: member.user.id.0,
            status: member.kind.status().into(),
        }
    }
}

/// Read-only platform queries the aggregator depends on.
pub trait ChatLookup {
    fn chat_details(
        &self,
        chat: ChatId,
    ) -> impl Future<Output = Result<ChatDetails, LookupError>> + Send;

    fn profile_photo_count(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<u32, LookupError>> + Send;

    fn member_count(
        &self,
        chat: ChatId,
    ) -> impl Future<Output = Result<u32, LookupError>> + Send;

    fn chat_member(
        &self,
        chat: ChatId,
        user: UserId,
    ) -> impl Future<Output = Result<MemberRecord, LookupError>> + Send;

    fn administrators(
        &self,
        chat: ChatId,
    ) -> impl Future<Output = Result<Vec<AdminEntry>, LookupError>> + Send;
}

impl ChatLookup for Bot {
    async fn chat_details(&self, chat: ChatId) -> Result<ChatDetails, LookupError> {
        let full = self.get_chat(chat).await?;
        let value = serde_json::to_value(&full)?;
        Ok(ChatDetails::from_json(&value))
    }

    async fn profile_photo_count(&self, user: UserId) -> Result<u32, LookupError> {
        let photos = self.get_user_profile_photos(user).limit(1).await?;
        Ok(photos.total_count)
    }

    async fn member_count(&self, chat: ChatId) -> Result<u32, LookupError> {
        Ok(self.get_chat_member_count(chat).await?)
    }

    async fn chat_member(&self, chat: ChatId, user: UserId) -> Result<MemberRecord, LookupError> {
        let member = self.get_chat_member(chat, user).await?;
        MemberRecord::from_member(&member)
    }

    async fn administrators(&self, chat: ChatId) -> Result<Vec<AdminEntry>, LookupError> {
        let admins = self.get_chat_administrators(chat).await?;
        Ok(admins.iter().map(AdminEntry::from_member).collect())
    }
}

/// Await a lookup, logging and discarding any failure.
pub async fn fallback<T>(
    field: &'static str,
    lookup: impl Future<Output = Result<T, LookupError>>,
) -> Option<T> {
    match lookup.await {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(field, kind = e.kind(), "Lookup failed, using default: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_details_reads_known_fields() {
        let value = json!({
            "id": -100123,
            "type": "supergroup",
            "title": "Rustaceans",
            "invite_link": "https://t.me/+abc",
        });
        let details = ChatDetails::from_json(&value);
        assert_eq!(details.title.as_deref(), Some("Rustaceans"));
        assert_eq!(details.invite_link.as_deref(), Some("https://t.me/+abc"));
        assert_eq!(details.bio, None);
    }

    #[test]
    fn chat_details_treats_empty_strings_as_absent() {
        let details = ChatDetails::from_json(&json!({ "bio": "" }));
        assert_eq!(details, ChatDetails::default());
    }

    #[test]
    fn forbidden_matches_known_phrases_only() {
        assert!(looks_forbidden("Bad Request: not enough rights to get chat members"));
        assert!(looks_forbidden("Bad Request: CHAT_ADMIN_REQUIRED"));
        assert!(looks_forbidden("Forbidden: bot is not a member of the supergroup chat"));
        assert!(looks_forbidden("Bad Request: member list is inaccessible"));
        assert!(!looks_forbidden("Bad Request: user is an administrator of the chat"));
        assert!(!looks_forbidden("Bad Request: invalid admin rights"));

        let err = LookupError::from(RequestError::Api(ApiError::Unknown(
            "Bad Request: CHAT_ADMIN_REQUIRED".to_string(),
        )));
        assert_eq!(err.kind(), "forbidden");
        let err = LookupError::from(RequestError::Api(ApiError::Unknown(
            "Bad Request: can't remove chat owner".to_string(),
        )));
        assert_eq!(err.kind(), "api");
    }

    #[test]
    fn admin_statuses() {
        assert!(MemberStatus::Creator.is_admin());
        assert!(MemberStatus::Administrator.is_admin());
        assert!(!MemberStatus::Member.is_admin());
        assert!(!MemberStatus::Restricted.is_admin());
    }

    #[test]
    fn chat_not_found_is_not_found() {
        let err = LookupError::from(RequestError::Api(ApiError::ChatNotFound));
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn fallback_swallows_errors() {
        let ok = fallback("count", async { Ok::<_, LookupError>(7u32) }).await;
        assert_eq!(ok, Some(7));

        let failed = fallback("count", async { Err::<u32, _>(LookupError::RateLimited) }).await;
        assert_eq!(failed, None);
    }
}
