//! Mock API server using HTTP (axum).

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{delete, get, post},
};
use dontbe_core::model::{
    CommentLikeRequest, ContentLikeRequest, GhostRequest, GhostTrigger, MemberComment,
    MemberContent, Notification, NotificationType, PostDetail, PostReply, Profile,
};
use dontbe_core::{Cursor, Identified, ResponseEnvelope};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

const PAGE_SIZE: usize = 15;
const VIEWER: i64 = 1;
const AUTHOR: i64 = 2;
const REPLIER: i64 = 3;
/// Transparency lost per ghost vote.
const GHOST_PENALTY: i32 = 5;

struct ServerState {
    profiles: HashMap<i64, Profile>,
    /// Newest first.
    contents: Vec<MemberContent>,
    /// Newest first.
    comments: Vec<MemberComment>,
    /// Newest first.
    notifications: Vec<Notification>,
    content_likes: HashSet<i64>,
    comment_likes: HashSet<i64>,
    ghost_votes: HashSet<(GhostTrigger, i64)>,
    next_notification_id: i64,
}

impl ServerState {
    fn seeded(posts: i64) -> Self {
        let profiles = [(VIEWER, "me"), (AUTHOR, "alice"), (REPLIER, "bob")]
            .into_iter()
            .map(|(member_id, nickname)| {
                let profile = Profile {
                    member_id,
                    nickname: nickname.to_string(),
                    member_profile_url: String::new(),
                    member_intro: format!("hi, I'm {}", nickname),
                    member_ghost: 0,
                };
                (member_id, profile)
            })
            .collect();

        let mut contents = Vec::new();
        let mut comments = Vec::new();
        let mut next_comment_id = 1;
        for content_id in 1..=posts {
            let replies = (content_id % 4) as u32;
            contents.push(MemberContent {
                content_id,
                member_id: AUTHOR,
                member_nickname: "alice".to_string(),
                member_profile_url: String::new(),
                content_text: format!("post number {}", content_id),
                time: now(),
                is_ghost: false,
                member_ghost: 0,
                is_liked: false,
                liked_number: 0,
                comment_number: replies,
            });
            for _ in 0..replies {
                comments.push(MemberComment {
                    comment_id: next_comment_id,
                    content_id,
                    member_id: REPLIER,
                    member_nickname: "bob".to_string(),
                    member_profile_url: String::new(),
                    comment_text: format!("reply {} on post {}", next_comment_id, content_id),
                    time: now(),
                    is_ghost: false,
                    member_ghost: 0,
                    is_liked: false,
                    comment_liked_number: 0,
                });
                next_comment_id += 1;
            }
        }
        contents.reverse();
        comments.reverse();

        let mut state = Self {
            profiles,
            contents,
            comments,
            notifications: Vec::new(),
            content_likes: HashSet::new(),
            comment_likes: HashSet::new(),
            ghost_votes: HashSet::new(),
            next_notification_id: 1,
        };
        for i in 0..20 {
            state.notify(NotificationType::Comment, REPLIER, i, format!("bob replied ({})", i));
        }
        state
    }

    fn notify(&mut self, kind: NotificationType, trigger_member: i64, trigger_id: i64, text: String) {
        let trigger_nickname = self
            .profiles
            .get(&trigger_member)
            .map(|p| p.nickname.clone())
            .unwrap_or_default();
        let notification = Notification {
            notification_id: self.next_notification_id,
            notification_type: kind,
            member_nickname: "me".to_string(),
            trigger_member_id: trigger_member,
            trigger_member_nickname: trigger_nickname,
            trigger_member_profile_url: String::new(),
            notification_trigger_id: trigger_id,
            notification_text: text,
            time: now(),
            is_notification_checked: false,
        };
        self.next_notification_id += 1;
        self.notifications.insert(0, notification);
    }

    fn content_view(&self, content: &MemberContent) -> MemberContent {
        MemberContent {
            is_liked: self.content_likes.contains(&content.content_id),
            ..content.clone()
        }
    }

    fn comment_view(&self, comment: &MemberComment) -> MemberComment {
        MemberComment {
            is_liked: self.comment_likes.contains(&comment.comment_id),
            ..comment.clone()
        }
    }
}

type AppState = Arc<RwLock<ServerState>>;

type Reply<T> = (StatusCode, Json<ResponseEnvelope<T>>);

fn ok<T>(status: StatusCode, message: &str, data: T) -> Reply<T> {
    (
        status,
        Json(ResponseEnvelope::new(status.as_u16(), message, Some(data))),
    )
}

fn bare<T>(status: StatusCode, message: &str) -> Reply<T> {
    (status, Json(ResponseEnvelope::bare(status.as_u16(), message)))
}

pub async fn run(port: u16, posts: i64) -> anyhow::Result<()> {
    let state = Arc::new(RwLock::new(ServerState::seeded(posts)));

    let v1 = Router::new()
        // Paged lists
        .route("/member/{id}/member-contents", get(member_contents))
        .route("/member/{id}/member-comments", get(member_comments))
        .route("/notifications", get(notifications))
        .route("/content/{id}/comments", get(post_replies))
        // Actions
        .route("/content/{id}/liked", post(like_content))
        .route("/content/{id}/unliked", delete(unlike_content))
        .route("/comment/{id}/liked", post(like_comment))
        .route("/comment/{id}/unliked", delete(unlike_comment))
        .route("/ghost2", post(ghost_vote))
        // Records
        .route("/viewmember/{id}", get(view_member));
    let v2 = Router::new().route("/content/{id}/detail", get(post_detail));

    let app = Router::new()
        .nest("/api/v1", v1)
        .nest("/api/v2", v2)
        .with_state(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Listening on http://{}/api/v1", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn now() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.is_empty())
}

#[derive(Deserialize)]
struct CursorQuery {
    cursor: Option<i64>,
}

/// Items strictly older than the cursor, newest first.
fn page_after<T: Identified>(items: impl Iterator<Item = T>, cursor: Option<i64>) -> Vec<T> {
    let cursor = cursor.unwrap_or(Cursor::START);
    items
        .filter(|item| cursor == Cursor::START || item.id() < cursor)
        .take(PAGE_SIZE)
        .collect()
}

/// GET /member/{id}/member-contents
async fn member_contents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<i64>,
    Query(query): Query<CursorQuery>,
) -> Reply<Vec<MemberContent>> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    let page = page_after(
        s.contents
            .iter()
            .filter(|c| c.member_id == member_id)
            .map(|c| s.content_view(c)),
        query.cursor,
    );
    tracing::info!("member #{} contents after {:?}: {}", member_id, query.cursor, page.len());
    ok(StatusCode::OK, "member contents", page)
}

/// GET /member/{id}/member-comments
async fn member_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<i64>,
    Query(query): Query<CursorQuery>,
) -> Reply<Vec<MemberComment>> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    let page = page_after(
        s.comments
            .iter()
            .filter(|c| c.member_id == member_id)
            .map(|c| s.comment_view(c)),
        query.cursor,
    );
    ok(StatusCode::OK, "member comments", page)
}

/// GET /notifications
async fn notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CursorQuery>,
) -> Reply<Vec<Notification>> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    let page = page_after(s.notifications.iter().cloned(), query.cursor);
    ok(StatusCode::OK, "notifications", page)
}

/// GET /content/{id}/comments
async fn post_replies(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<i64>,
    Query(query): Query<CursorQuery>,
) -> Reply<Vec<PostReply>> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    if !s.contents.iter().any(|c| c.content_id == content_id) {
        return bare(StatusCode::NOT_FOUND, "no such post");
    }
    let page = page_after(
        s.comments
            .iter()
            .filter(|c| c.content_id == content_id)
            .map(|c| {
                let view = s.comment_view(c);
                PostReply {
                    comment_id: view.comment_id,
                    member_id: view.member_id,
                    member_nickname: view.member_nickname,
                    member_profile_url: view.member_profile_url,
                    comment_text: view.comment_text,
                    time: view.time,
                    is_ghost: view.is_ghost,
                    member_ghost: view.member_ghost,
                    is_liked: view.is_liked,
                    comment_liked_number: view.comment_liked_number,
                }
            }),
        query.cursor,
    );
    ok(StatusCode::OK, "post replies", page)
}

/// POST /content/{id}/liked
async fn like_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<i64>,
    Json(_body): Json<ContentLikeRequest>,
) -> Reply<()> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let mut s = state.write().await;
    let Some(index) = s.contents.iter().position(|c| c.content_id == content_id) else {
        return bare(StatusCode::NOT_FOUND, "no such post");
    };
    if !s.content_likes.insert(content_id) {
        return bare(StatusCode::BAD_REQUEST, "already liked");
    }
    s.contents[index].liked_number += 1;

    tracing::info!("post #{} liked", content_id);
    bare(StatusCode::CREATED, "liked")
}

/// DELETE /content/{id}/unliked
async fn unlike_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<i64>,
) -> Reply<()> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let mut s = state.write().await;
    if !s.content_likes.remove(&content_id) {
        return bare(StatusCode::BAD_REQUEST, "not liked");
    }
    if let Some(content) = s.contents.iter_mut().find(|c| c.content_id == content_id) {
        content.liked_number = content.liked_number.saturating_sub(1);
    }

    tracing::info!("post #{} unliked", content_id);
    bare(StatusCode::OK, "unliked")
}

/// POST /comment/{id}/liked
async fn like_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<i64>,
    Json(body): Json<CommentLikeRequest>,
) -> Reply<()> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let mut s = state.write().await;
    let Some(index) = s.comments.iter().position(|c| c.comment_id == comment_id) else {
        return bare(StatusCode::NOT_FOUND, "no such reply");
    };
    if !s.comment_likes.insert(comment_id) {
        return bare(StatusCode::BAD_REQUEST, "already liked");
    }
    s.comments[index].comment_liked_number += 1;

    tracing::info!("reply #{} liked: {:?}", comment_id, body.notification_text);
    bare(StatusCode::CREATED, "liked")
}

/// DELETE /comment/{id}/unliked
async fn unlike_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(comment_id): Path<i64>,
) -> Reply<()> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let mut s = state.write().await;
    if !s.comment_likes.remove(&comment_id) {
        return bare(StatusCode::BAD_REQUEST, "not liked");
    }
    if let Some(comment) = s.comments.iter_mut().find(|c| c.comment_id == comment_id) {
        comment.comment_liked_number = comment.comment_liked_number.saturating_sub(1);
    }

    tracing::info!("reply #{} unliked", comment_id);
    bare(StatusCode::OK, "unliked")
}

/// POST /ghost2 - 400 when the viewer already voted on the target
async fn ghost_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(vote): Json<GhostRequest>,
) -> Reply<()> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let mut s = state.write().await;
    if !s.profiles.contains_key(&vote.target_member_id) {
        return bare(StatusCode::NOT_FOUND, "no such member");
    }
    if !s.ghost_votes.insert((vote.alarm_trigger_type, vote.alarm_trigger_id)) {
        tracing::info!("duplicate vote on #{}", vote.alarm_trigger_id);
        return bare(StatusCode::BAD_REQUEST, "already voted");
    }
    let mut ghost = 0;
    if let Some(profile) = s.profiles.get_mut(&vote.target_member_id) {
        profile.member_ghost -= GHOST_PENALTY;
        ghost = profile.member_ghost;
    }
    s.notify(
        NotificationType::BeGhost,
        VIEWER,
        vote.alarm_trigger_id,
        vote.ghost_reason.clone(),
    );

    tracing::info!(
        "member #{} voted transparent ({}), now {}",
        vote.target_member_id,
        vote.ghost_reason,
        ghost
    );
    bare(StatusCode::CREATED, "ghosted")
}

/// GET /viewmember/{id}
async fn view_member(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(member_id): Path<i64>,
) -> Reply<Profile> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    match s.profiles.get(&member_id) {
        Some(profile) => ok(StatusCode::OK, "profile", profile.clone()),
        None => bare(StatusCode::NOT_FOUND, "no such member"),
    }
}

/// GET /api/v2/content/{id}/detail
async fn post_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(content_id): Path<i64>,
) -> Reply<PostDetail> {
    if !authorized(&headers) {
        return bare(StatusCode::UNAUTHORIZED, "missing token");
    }
    let s = state.read().await;
    let Some(content) = s.contents.iter().find(|c| c.content_id == content_id) else {
        return bare(StatusCode::NOT_FOUND, "no such post");
    };
    let content = s.content_view(content);
    ok(
        StatusCode::OK,
        "post detail",
        PostDetail {
            member_id: content.member_id,
            member_nickname: content.member_nickname,
            member_profile_url: content.member_profile_url,
            content_text: content.content_text,
            time: content.time,
            is_ghost: content.is_ghost,
            member_ghost: content.member_ghost,
            is_liked: content.is_liked,
            liked_number: content.liked_number,
            comment_number: content.comment_number,
        },
    )
}
