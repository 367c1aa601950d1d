//! Concrete toggles: post likes, reply likes and transparency votes.

use crate::error::ActionError;
use crate::toggle::{OptimisticToggle, ToggleAction};
use crate::transport::ApiRequest;
use dontbe_core::ReasonSelector;
use dontbe_core::model::{CommentLikeRequest, ContentLikeRequest, GhostRequest, GhostTrigger};

/// Like on a post, keyed by content id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentLike;

impl ToggleAction for ContentLike {
    type Target = i64;
    const NAME: &'static str = "content-like";

    fn target_id(target: &i64) -> i64 {
        *target
    }

    fn activate_request(&self, content_id: &i64) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(format!("/content/{}/liked", content_id)).json(&ContentLikeRequest::default())
    }

    fn deactivate_request(&self, content_id: &i64) -> Result<Option<ApiRequest>, serde_json::Error> {
        Ok(Some(ApiRequest::delete(format!("/content/{}/unliked", content_id))))
    }
}

/// A reply to like, with the text echoed into its author's notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLikeTarget {
    pub comment_id: i64,
    pub notification_text: String,
}

/// Like on a reply, keyed by comment id.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentLike;

impl ToggleAction for CommentLike {
    type Target = CommentLikeTarget;
    const NAME: &'static str = "comment-like";

    fn target_id(target: &CommentLikeTarget) -> i64 {
        target.comment_id
    }

    fn activate_request(&self, target: &CommentLikeTarget) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post(format!("/comment/{}/liked", target.comment_id))
            .json(&CommentLikeRequest::new(target.notification_text.clone()))
    }

    fn deactivate_request(
        &self,
        target: &CommentLikeTarget,
    ) -> Result<Option<ApiRequest>, serde_json::Error> {
        Ok(Some(ApiRequest::delete(format!(
            "/comment/{}/unliked",
            target.comment_id
        ))))
    }
}

/// One transparency vote against a post or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhostTarget {
    pub target_member_id: i64,
    /// Id of the post or reply being voted on.
    pub trigger_id: i64,
    /// Text of the reason picked in the reason selector.
    pub reason: String,
}

/// Transparency vote. Activate-only; the server answers 400 when the user
/// already voted on the same target.
#[derive(Debug, Clone, Copy)]
pub struct GhostVote {
    trigger: GhostTrigger,
}

impl GhostVote {
    /// Votes on posts and on replies use separate id spaces, so a screen keeps
    /// one toggle per trigger kind.
    pub fn new(trigger: GhostTrigger) -> Self {
        Self { trigger }
    }

    pub fn trigger(&self) -> GhostTrigger {
        self.trigger
    }
}

impl ToggleAction for GhostVote {
    type Target = GhostTarget;
    const NAME: &'static str = "ghost-vote";

    fn target_id(target: &GhostTarget) -> i64 {
        target.trigger_id
    }

    fn activate_request(&self, target: &GhostTarget) -> Result<ApiRequest, serde_json::Error> {
        ApiRequest::post("/ghost2").json(&GhostRequest {
            alarm_trigger_type: self.trigger,
            target_member_id: target.target_member_id,
            alarm_trigger_id: target.trigger_id,
            ghost_reason: target.reason.clone(),
        })
    }

    fn deactivate_request(&self, _target: &GhostTarget) -> Result<Option<ApiRequest>, serde_json::Error> {
        Ok(None)
    }

    fn is_already_voted(&self, status: u16) -> bool {
        status == 400
    }
}

impl OptimisticToggle<GhostVote> {
    /// Confirm the reason popup and send the vote.
    ///
    /// With nothing selected this fails with an empty-selection error, the
    /// selector raises its warning, and no request is sent.
    pub async fn vote_with_reason(
        &self,
        selector: &mut ReasonSelector,
        target_member_id: i64,
        trigger_id: i64,
    ) -> Result<(), ActionError> {
        let reason = selector.confirm()?;
        self.activate(GhostTarget {
            target_member_id,
            trigger_id,
            reason: reason.to_string(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;
    use crate::test_support::ScriptedTransport;
    use dontbe_core::{ErrorKind, GHOST_REASONS};
    use serde_json::json;

    #[test]
    fn content_like_requests() {
        let request = ContentLike.activate_request(&9).unwrap();
        assert_eq!(request.to_string(), "POST /content/9/liked");
        assert_eq!(request.body, Some(json!({"alarmTriggerType": "contentLiked"})));

        let request = ContentLike.deactivate_request(&9).unwrap().unwrap();
        assert_eq!(request.to_string(), "DELETE /content/9/unliked");
        assert_eq!(request.body, None);
    }

    #[test]
    fn ghost_vote_body() {
        let vote = GhostVote::new(GhostTrigger::Comment);
        let request = vote
            .activate_request(&GhostTarget {
                target_member_id: 12,
                trigger_id: 340,
                reason: "Spam or promotional content".to_string(),
            })
            .unwrap();
        assert_eq!(request.to_string(), "POST /ghost2");
        assert_eq!(
            request.body,
            Some(json!({
                "alarmTriggerType": "comment",
                "targetMemberId": 12,
                "alarmTriggerId": 340,
                "ghostReason": "Spam or promotional content"
            }))
        );
        assert!(vote.is_already_voted(400));
        assert!(!ContentLike.is_already_voted(400));
    }

    #[tokio::test]
    async fn comment_like_round() {
        let transport = ScriptedTransport::new();
        transport.reply_status(201, "liked");
        transport.reply_status(200, "unliked");
        let toggle = OptimisticToggle::new(
            CommentLike,
            transport.clone(),
            TokenStore::with_token("t"),
        );
        let target = CommentLikeTarget {
            comment_id: 55,
            notification_text: "great reply".to_string(),
        };

        toggle.activate(target.clone()).await.unwrap();
        assert!(toggle.is_active(55));
        toggle.deactivate(target).await.unwrap();
        assert!(!toggle.is_active(55));

        assert_eq!(
            transport.requests(),
            vec!["POST /comment/55/liked", "DELETE /comment/55/unliked"]
        );
        assert_eq!(
            transport.bodies()[0],
            Some(json!({
                "notificationTriggerType": "commentLiked",
                "notificationText": "great reply"
            }))
        );
    }

    #[tokio::test]
    async fn vote_requires_a_reason() {
        let transport = ScriptedTransport::new();
        transport.reply_status(201, "ghosted");
        let toggle = OptimisticToggle::new(
            GhostVote::new(GhostTrigger::Content),
            transport.clone(),
            TokenStore::with_token("t"),
        );
        let mut selector = ReasonSelector::new();

        let err = toggle.vote_with_reason(&mut selector, 4, 21).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyValidation);
        assert!(selector.warning_visible());
        assert_eq!(transport.call_count(), 0);

        selector.select(1).unwrap();
        toggle.vote_with_reason(&mut selector, 4, 21).await.unwrap();
        assert!(toggle.is_active(21));
        assert_eq!(selector.selected(), None);
        assert_eq!(
            transport.bodies()[0].as_ref().unwrap()["ghostReason"],
            json!(GHOST_REASONS[1])
        );
    }
}
