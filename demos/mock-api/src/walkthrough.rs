//! Drives the client crate against a running mock API.
//!
//! Run the server first, then:
//!   cargo run -p dontbe-mock-api --bin walkthrough -- --member 2
//!   DONTBE_BASE_URL=http://localhost:9000/api/v1 cargo run -p dontbe-mock-api --bin walkthrough

use dontbe_client::dontbe_core::model::GhostTrigger;
use dontbe_client::dontbe_core::{ErrorKind, ReasonSelector};
use dontbe_client::{
    ClientConfig, ContentLike, CurrentUser, EventSink, GhostVote, HttpTransport, MemberContents,
    Notifications, OptimisticToggle, ProfileClient, ScreenEvent, SyncOutcome, SyncSession,
    TokenStore, Transport, UserCache,
};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("walkthrough=info".parse()?)
                .add_directive("dontbe_client=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let member_id = parse_arg(&args, "--member").unwrap_or(2);
    let config = match parse_arg_string(&args, "--config") {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    }
    .with_env_overrides()?;

    tracing::info!("Using {}", config.base_url);

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config)?);
    let tokens = TokenStore::with_token("walkthrough-token");
    let users = UserCache::new();
    users.login(CurrentUser {
        member_id: 1,
        nickname: "me".to_string(),
        avatar_url: String::new(),
    });
    let (sink, mut events) = EventSink::channel();

    // Profile feed: first page, then page until the server runs dry.
    let feed = SyncSession::from_config(
        MemberContents { member_id },
        transport.clone(),
        tokens.clone(),
        &config,
    )
    .with_events(sink.clone());

    feed.refresh().await?;
    loop {
        match feed.load_more().await? {
            SyncOutcome::Appended { added, len } => {
                tracing::info!("+{} posts ({} total)", added, len)
            }
            SyncOutcome::EndOfData { len } => {
                tracing::info!("end of feed at {} posts", len);
                break;
            }
            other => tracing::info!("load_more: {:?}", other),
        }
    }
    drain(&mut events);

    let notifications = SyncSession::new(Notifications, transport.clone(), tokens.clone());
    notifications.refresh().await?;
    tracing::info!(
        "{} notifications on the first page, cursor {}",
        notifications.len(),
        notifications.cursor()
    );

    let Some(newest) = feed.current_items().first().cloned() else {
        tracing::warn!("member #{} has no posts; nothing to act on", member_id);
        return Ok(());
    };

    // Like the newest post, seeded from its detail view.
    let profiles = ProfileClient::new(transport.clone(), tokens.clone(), users.clone());
    let detail = profiles.fetch_post_detail(newest.content_id).await?;
    let likes = OptimisticToggle::new(ContentLike, transport.clone(), tokens.clone())
        .with_events(sink.clone());
    likes.seed(newest.content_id, detail.is_liked);

    likes.activate(newest.content_id).await?;
    feed.update_item(newest.content_id, |post| {
        post.is_liked = true;
        post.liked_number += 1;
    });
    if let Err(err) = likes.activate(newest.content_id).await {
        tracing::info!("second like refused locally: {}", err);
    }
    likes.deactivate(newest.content_id).await?;
    feed.update_item(newest.content_id, |post| {
        post.is_liked = false;
        post.liked_number = post.liked_number.saturating_sub(1);
    });
    drain(&mut events);

    // Transparency vote through the reason popup.
    let votes = OptimisticToggle::new(
        GhostVote::new(GhostTrigger::Content),
        transport.clone(),
        tokens.clone(),
    )
    .with_events(sink.clone());
    let mut selector = ReasonSelector::new();

    if let Err(err) = votes
        .vote_with_reason(&mut selector, newest.member_id, newest.content_id)
        .await
    {
        tracing::info!("confirm without a reason: {} (warning shown: {})", err, selector.warning_visible());
    }
    selector.select(0)?;
    votes
        .vote_with_reason(&mut selector, newest.member_id, newest.content_id)
        .await?;

    // A second screen has no local record of the vote; the server refuses it.
    let other_screen = OptimisticToggle::new(
        GhostVote::new(GhostTrigger::Content),
        transport.clone(),
        tokens.clone(),
    )
    .with_events(sink);
    selector.select(2)?;
    match other_screen
        .vote_with_reason(&mut selector, newest.member_id, newest.content_id)
        .await
    {
        Err(err) if err.kind() == ErrorKind::AlreadyVoted => {
            tracing::info!("duplicate vote reported as: {}", err)
        }
        other => tracing::warn!("expected a duplicate vote, got {:?}", other),
    }
    drain(&mut events);

    let profile = profiles.fetch_profile(newest.member_id).await?;
    tracing::info!(
        "@{} transparency now {} (own profile: {})",
        profile.nickname,
        profile.member_ghost,
        profiles.is_own_profile(profile.member_id)
    );

    Ok(())
}

fn drain(events: &mut UnboundedReceiver<ScreenEvent>) {
    while let Ok(event) = events.try_recv() {
        tracing::info!("event: {:?}", event);
    }
}

fn parse_arg(args: &[String], flag: &str) -> Option<i64> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}

fn parse_arg_string(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
