//! The paged lists the app keeps in sync.
//!
//! Each endpoint value carries its owner (member or post id), so one value
//! identifies one (list, owner) pair.

use crate::transport::ApiRequest;
use dontbe_core::Identified;
use dontbe_core::model::{MemberComment, MemberContent, Notification, PostReply};
use dontbe_core::Cursor;
use serde::de::DeserializeOwned;

pub trait FeedEndpoint: Send + Sync + 'static {
    type Item: Identified + DeserializeOwned + Clone + Send + Sync + 'static;

    /// Label used in logs and screen events.
    const NAME: &'static str;

    /// Request for the page after `cursor`.
    fn page_request(&self, cursor: Cursor) -> ApiRequest;
}

fn paged(path: String, cursor: Cursor) -> ApiRequest {
    let (key, value) = cursor.to_query();
    ApiRequest::get(path).query(key, value)
}

/// Posts on a member's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberContents {
    pub member_id: i64,
}

impl FeedEndpoint for MemberContents {
    type Item = MemberContent;
    const NAME: &'static str = "member-contents";

    fn page_request(&self, cursor: Cursor) -> ApiRequest {
        paged(format!("/member/{}/member-contents", self.member_id), cursor)
    }
}

/// Replies on a member's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberComments {
    pub member_id: i64,
}

impl FeedEndpoint for MemberComments {
    type Item = MemberComment;
    const NAME: &'static str = "member-comments";

    fn page_request(&self, cursor: Cursor) -> ApiRequest {
        paged(format!("/member/{}/member-comments", self.member_id), cursor)
    }
}

/// The logged-in member's notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Notifications;

impl FeedEndpoint for Notifications {
    type Item = Notification;
    const NAME: &'static str = "notifications";

    fn page_request(&self, cursor: Cursor) -> ApiRequest {
        paged("/notifications".to_string(), cursor)
    }
}

/// Replies under one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostReplies {
    pub content_id: i64,
}

impl FeedEndpoint for PostReplies {
    type Item = PostReply;
    const NAME: &'static str = "post-replies";

    fn page_request(&self, cursor: Cursor) -> ApiRequest {
        paged(format!("/content/{}/comments", self.content_id), cursor)
    }
}
