//! Single-record reads: profile headers and post details.

use crate::auth::{TokenStore, UserCache};
use crate::error::SyncError;
use crate::transport::{ApiRequest, Transport};
use dontbe_core::model::{PostDetail, Profile};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub struct ProfileClient {
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    users: UserCache,
}

impl ProfileClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: TokenStore, users: UserCache) -> Self {
        Self {
            transport,
            tokens,
            users,
        }
    }

    pub async fn fetch_profile(&self, member_id: i64) -> Result<Profile, SyncError> {
        let profile: Profile = self
            .fetch(ApiRequest::get(format!("/viewmember/{}", member_id)))
            .await?;
        tracing::debug!(
            "profile #{}: {} (ghost {})",
            profile.member_id,
            profile.nickname,
            profile.member_ghost
        );
        Ok(profile)
    }

    /// Post detail from the v2 API. `is_liked` should seed the screen's
    /// content-like toggle.
    pub async fn fetch_post_detail(&self, content_id: i64) -> Result<PostDetail, SyncError> {
        self.fetch(ApiRequest::get(format!("/content/{}/detail", content_id)).v2())
            .await
    }

    /// Whether a profile screen for `member_id` is the user's own page.
    pub fn is_own_profile(&self, member_id: i64) -> bool {
        self.users.is_current_user(member_id)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, SyncError> {
        let token = self.tokens.get().ok_or(SyncError::MissingToken)?;
        let envelope = self.transport.request(request, &token).await?;
        if !envelope.is_success() {
            return Err(SyncError::Rejected {
                status: envelope.status,
                message: envelope.message,
            });
        }
        let status = envelope.status;
        envelope
            .decode::<T>()?
            .data
            .ok_or_else(|| SyncError::Rejected {
                status,
                message: "empty payload".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CurrentUser;
    use crate::test_support::ScriptedTransport;
    use crate::transport::ApiVersion;
    use serde_json::json;

    fn client(transport: &Arc<ScriptedTransport>) -> ProfileClient {
        ProfileClient::new(
            transport.clone(),
            TokenStore::with_token("t"),
            UserCache::new(),
        )
    }

    #[tokio::test]
    async fn fetches_profile() {
        let transport = ScriptedTransport::new();
        transport.reply(
            200,
            json!({"memberId": 3, "nickname": "bob", "memberGhost": -20}),
        );

        let profile = client(&transport).fetch_profile(3).await.unwrap();
        assert_eq!(profile.nickname, "bob");
        assert_eq!(profile.member_ghost, -20);
        assert_eq!(transport.requests(), vec!["GET /viewmember/3"]);
    }

    #[tokio::test]
    async fn post_detail_uses_v2() {
        let transport = ScriptedTransport::new();
        transport.reply(200, json!({"memberId": 1, "isLiked": true, "likedNumber": 4}));

        let detail = client(&transport).fetch_post_detail(88).await.unwrap();
        assert!(detail.is_liked);
        assert_eq!(detail.liked_number, 4);

        let request = transport.last_request().unwrap();
        assert_eq!(request.to_string(), "GET /content/88/detail");
        assert_eq!(request.version, ApiVersion::V2);
    }

    #[tokio::test]
    async fn empty_payload_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.reply_status(200, "ok");

        let err = client(&transport).fetch_profile(3).await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { status: 200, .. }));
    }

    #[tokio::test]
    async fn not_found_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.reply_status(404, "no such member");

        let err = client(&transport).fetch_profile(999).await.unwrap_err();
        assert!(matches!(err, SyncError::Rejected { status: 404, .. }));
    }

    #[test]
    fn own_profile() {
        let users = UserCache::new();
        users.login(CurrentUser {
            member_id: 5,
            nickname: "me".to_string(),
            avatar_url: String::new(),
        });
        let client = ProfileClient::new(ScriptedTransport::new(), TokenStore::new(), users);
        assert!(client.is_own_profile(5));
        assert!(!client.is_own_profile(6));
    }
}
