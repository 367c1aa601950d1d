//! Entity records and request bodies exchanged with the DontBe API.

use crate::Identified;
use serde::{Deserialize, Serialize};

/// A post in a member's profile feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberContent {
    pub content_id: i64,
    pub member_id: i64,
    #[serde(default)]
    pub member_nickname: String,
    #[serde(default)]
    pub member_profile_url: String,
    #[serde(default)]
    pub content_text: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_ghost: bool,
    #[serde(default)]
    pub member_ghost: i32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub liked_number: u32,
    #[serde(default)]
    pub comment_number: u32,
}

impl Identified for MemberContent {
    fn id(&self) -> i64 {
        self.content_id
    }
}

/// A reply written by a member, shown in their profile's comment tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberComment {
    pub comment_id: i64,
    pub content_id: i64,
    pub member_id: i64,
    #[serde(default)]
    pub member_nickname: String,
    #[serde(default)]
    pub member_profile_url: String,
    #[serde(default)]
    pub comment_text: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_ghost: bool,
    #[serde(default)]
    pub member_ghost: i32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub comment_liked_number: u32,
}

impl Identified for MemberComment {
    fn id(&self) -> i64 {
        self.comment_id
    }
}

/// A reply under a post's detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostReply {
    pub comment_id: i64,
    pub member_id: i64,
    #[serde(default)]
    pub member_nickname: String,
    #[serde(default)]
    pub member_profile_url: String,
    #[serde(default)]
    pub comment_text: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_ghost: bool,
    #[serde(default)]
    pub member_ghost: i32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub comment_liked_number: u32,
}

impl Identified for PostReply {
    fn id(&self) -> i64 {
        self.comment_id
    }
}

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationType {
    ContentLiked,
    CommentLiked,
    Comment,
    BeGhost,
    ActingContinue,
    UserBan,
    #[serde(other)]
    Other,
}

impl NotificationType {
    /// Notifications that link to another member's profile.
    pub fn links_to_member(self) -> bool {
        matches!(
            self,
            NotificationType::ContentLiked | NotificationType::CommentLiked | NotificationType::Comment
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_id: i64,
    pub notification_type: NotificationType,
    #[serde(default)]
    pub member_nickname: String,
    #[serde(default)]
    pub trigger_member_id: i64,
    #[serde(default)]
    pub trigger_member_nickname: String,
    #[serde(default)]
    pub trigger_member_profile_url: String,
    #[serde(default)]
    pub notification_trigger_id: i64,
    #[serde(default)]
    pub notification_text: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_notification_checked: bool,
}

impl Identified for Notification {
    fn id(&self) -> i64 {
        self.notification_id
    }
}

/// Full view of one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub member_id: i64,
    #[serde(default)]
    pub member_nickname: String,
    #[serde(default)]
    pub member_profile_url: String,
    #[serde(default)]
    pub content_text: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub is_ghost: bool,
    #[serde(default)]
    pub member_ghost: i32,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub liked_number: u32,
    #[serde(default)]
    pub comment_number: u32,
}

/// A member's profile header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub member_id: i64,
    pub nickname: String,
    #[serde(default)]
    pub member_profile_url: String,
    #[serde(default)]
    pub member_intro: String,
    /// Transparency value; negative after other members' ghost votes.
    #[serde(default)]
    pub member_ghost: i32,
}

/// Body of a content like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLikeRequest {
    pub alarm_trigger_type: String,
}

impl Default for ContentLikeRequest {
    fn default() -> Self {
        Self {
            alarm_trigger_type: "contentLiked".to_string(),
        }
    }
}

/// Body of a comment like; the text is echoed into the author's notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentLikeRequest {
    pub notification_trigger_type: String,
    pub notification_text: String,
}

impl CommentLikeRequest {
    pub fn new(notification_text: impl Into<String>) -> Self {
        Self {
            notification_trigger_type: "commentLiked".to_string(),
            notification_text: notification_text.into(),
        }
    }
}

/// Whether a transparency vote targets a post or a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GhostTrigger {
    Content,
    Comment,
}

/// Body of a transparency ("ghost") vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhostRequest {
    pub alarm_trigger_type: GhostTrigger,
    pub target_member_id: i64,
    pub alarm_trigger_id: i64,
    pub ghost_reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn notification_from_wire() {
        let value = json!({
            "notificationId": 42,
            "notificationType": "commentLiked",
            "triggerMemberId": 7,
            "notificationText": "nice"
        });
        let notification: Notification = serde_json::from_value(value).unwrap();
        assert_eq!(notification.id(), 42);
        assert!(notification.notification_type.links_to_member());
        assert_eq!(notification.trigger_member_id, 7);
    }

    #[test]
    fn unknown_notification_type() {
        let value = json!({"notificationId": 1, "notificationType": "somethingNew"});
        let notification: Notification = serde_json::from_value(value).unwrap();
        assert_eq!(notification.notification_type, NotificationType::Other);
        assert!(!notification.notification_type.links_to_member());
    }

    #[test]
    fn ghost_request_wire_names() {
        let body = GhostRequest {
            alarm_trigger_type: GhostTrigger::Comment,
            target_member_id: 3,
            alarm_trigger_id: 99,
            ghost_reason: "spam".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "alarmTriggerType": "comment",
                "targetMemberId": 3,
                "alarmTriggerId": 99,
                "ghostReason": "spam"
            })
        );
    }

    #[test]
    fn like_bodies() {
        assert_eq!(
            serde_json::to_value(ContentLikeRequest::default()).unwrap(),
            json!({"alarmTriggerType": "contentLiked"})
        );
        assert_eq!(
            serde_json::to_value(CommentLikeRequest::new("hi")).unwrap(),
            json!({"notificationTriggerType": "commentLiked", "notificationText": "hi"})
        );
    }
}
