//! Client side of the DontBe sync engine.
//!
//! [`SyncSession`] keeps one cursor-paged list in step with the server and
//! [`OptimisticToggle`] flips likes and transparency votes ahead of the
//! server's answer. Both talk to the API through a [`Transport`]; the
//! production one is [`HttpTransport`].

mod actions;
mod auth;
mod config;
mod error;
mod events;
mod feed;
mod profile;
mod session;
#[cfg(test)]
mod test_support;
mod toggle;
mod transport;

pub use actions::{CommentLike, CommentLikeTarget, ContentLike, GhostTarget, GhostVote};
pub use auth::{CurrentUser, ProfileEdit, TokenStore, UserCache};
pub use config::{ClientConfig, ConfigError, DEFAULT_LOAD_MORE_THRESHOLD};
pub use error::{ActionError, SyncError};
pub use events::{EventSink, ScreenEvent};
pub use feed::{FeedEndpoint, MemberComments, MemberContents, Notifications, PostReplies};
pub use profile::ProfileClient;
pub use session::{SkipReason, SyncOutcome, SyncSession};
pub use toggle::{OptimisticToggle, ToggleAction};
pub use transport::{ApiRequest, ApiVersion, HttpTransport, Method, Transport, TransportError};

pub use dontbe_core;
