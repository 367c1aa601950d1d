//! In-memory DontBe API.
//!
//! Serves the feed, like, vote and profile endpoints the client crate
//! talks to, with cursor paging and the same status codes as the real
//! backend. Any bearer token is accepted and acts as member 1.
//!
//! Run:
//!   cargo run -p dontbe-mock-api --bin mock-api -- --port 8080 --posts 40
//!
//! Then:
//!   curl -H 'Authorization: Bearer t' 'localhost:8080/api/v1/member/2/member-contents?cursor=-1'
//!   curl -H 'Authorization: Bearer t' -X POST localhost:8080/api/v1/content/40/liked \
//!        -H 'content-type: application/json' -d '{"alarmTriggerType":"contentLiked"}'
//!   cargo run -p dontbe-mock-api --bin walkthrough

mod server;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mock_api=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let port = parse_arg(&args, "--port").unwrap_or(8080);
    let posts = parse_arg(&args, "--posts").unwrap_or(40);

    tracing::info!("Seeding {} posts", posts);

    server::run(port, posts).await
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
