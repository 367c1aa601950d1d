//! List synchronization sessions.
//!
//! A [`SyncSession`] owns one list's cursor and accumulated items and drives
//! them through `Idle -> Fetching -> (Idle | Failed)`. At most one fetch is
//! in flight per session; calls that arrive while one is running are
//! dropped, not queued.
//!
//! The session is shared by reference (`&self`), so a screen can keep it in
//! an `Arc` and fire `load_more` from scroll callbacks while a refresh task
//! is still running. State lives behind a mutex that is never held across
//! an await point.

use crate::auth::TokenStore;
use crate::config::{ClientConfig, DEFAULT_LOAD_MORE_THRESHOLD};
use crate::error::SyncError;
use crate::events::{self, EventSink, ScreenEvent};
use crate::feed::FeedEndpoint;
use crate::transport::{ApiRequest, Transport};
use dontbe_core::{Cursor, ErrorKind, Page, PagedList, SyncPhase};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Why a call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    EndOfData,
}

/// Result of a `refresh` or `load_more` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The list was replaced by the first page.
    Replaced { len: usize },
    /// A page was appended.
    Appended { added: usize, len: usize },
    /// The server had nothing after the current cursor.
    EndOfData { len: usize },
    /// No request was sent.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy)]
enum FetchKind {
    Refresh,
    LoadMore,
}

struct State<T> {
    phase: SyncPhase,
    cursor: Cursor,
    list: PagedList<T>,
    end_of_data: bool,
    last_error: Option<ErrorKind>,
}

/// Clears `Fetching` if the fetching future is dropped before it finishes,
/// so an abandoned call cannot wedge the session.
struct InFlight<'a, T> {
    state: &'a Mutex<State<T>>,
    armed: bool,
}

impl<T> InFlight<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.phase == SyncPhase::Fetching {
                state.phase = SyncPhase::Idle;
            }
        }
    }
}

pub struct SyncSession<F: FeedEndpoint> {
    endpoint: F,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    threshold: usize,
    events: Option<EventSink>,
    state: Mutex<State<F::Item>>,
}

impl<F: FeedEndpoint> SyncSession<F> {
    pub fn new(endpoint: F, transport: Arc<dyn Transport>, tokens: TokenStore) -> Self {
        Self {
            endpoint,
            transport,
            tokens,
            threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            events: None,
            state: Mutex::new(State {
                phase: SyncPhase::Idle,
                cursor: Cursor::start(),
                list: PagedList::new(),
                end_of_data: false,
                last_error: None,
            }),
        }
    }

    pub fn from_config(
        endpoint: F,
        transport: Arc<dyn Transport>,
        tokens: TokenStore,
        config: &ClientConfig,
    ) -> Self {
        Self::new(endpoint, transport, tokens).with_threshold(config.load_more_threshold)
    }

    /// Minimum item count before scroll-triggered paging.
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn endpoint(&self) -> &F {
        &self.endpoint
    }

    /// Fetch the newest page and replace the list with it.
    ///
    /// On failure nothing local changes: items, cursor and end-of-data stay
    /// as they were and the session moves to `Failed`.
    pub async fn refresh(&self) -> Result<SyncOutcome, SyncError> {
        let (request, guard) = match self.begin(FetchKind::Refresh) {
            Ok(claimed) => claimed,
            Err(reason) => return Ok(SyncOutcome::Skipped(reason)),
        };

        let result = self.fetch(request).await;
        guard.disarm();

        let mut state = self.lock();
        match result {
            Ok(page) => {
                let last_id = page.last_id();
                let outcome = state.list.apply(page, true);
                state.cursor.reset();
                state.cursor.advance(last_id);
                state.end_of_data = outcome.is_now_empty();
                state.phase = SyncPhase::Idle;
                state.last_error = None;

                tracing::info!(
                    "{}: refreshed with {} items (cursor {})",
                    F::NAME,
                    outcome.len,
                    state.cursor
                );
                self.changed(&state);
                Ok(SyncOutcome::Replaced { len: outcome.len })
            }
            Err(err) => Err(self.fail(&mut state, err)),
        }
    }

    /// Fetch the page after the current cursor and append it.
    ///
    /// A no-op while a fetch is in flight or once end-of-data was reached.
    pub async fn load_more(&self) -> Result<SyncOutcome, SyncError> {
        let (request, guard) = match self.begin(FetchKind::LoadMore) {
            Ok(claimed) => claimed,
            Err(reason) => return Ok(SyncOutcome::Skipped(reason)),
        };

        let result = self.fetch(request).await;
        guard.disarm();

        let mut state = self.lock();
        match result {
            Ok(page) => {
                let last_id = page.last_id();
                let outcome = state.list.apply(page, false);
                state.phase = SyncPhase::Idle;
                state.last_error = None;

                let sync_outcome = if outcome.end_of_data {
                    state.end_of_data = true;
                    tracing::info!(
                        "{}: end of data at cursor {} ({} items)",
                        F::NAME,
                        state.cursor,
                        outcome.len
                    );
                    SyncOutcome::EndOfData { len: outcome.len }
                } else {
                    state.cursor.advance(last_id);
                    tracing::debug!(
                        "{}: appended {} items, cursor now {}",
                        F::NAME,
                        outcome.added,
                        state.cursor
                    );
                    SyncOutcome::Appended {
                        added: outcome.added,
                        len: outcome.len,
                    }
                };
                self.changed(&state);
                Ok(sync_outcome)
            }
            Err(err) => Err(self.fail(&mut state, err)),
        }
    }

    /// Whether the list view should call [`load_more`](Self::load_more)
    /// now that it has scrolled to the trailing edge.
    pub fn should_load_more(&self, at_trailing_edge: bool) -> bool {
        let state = self.lock();
        at_trailing_edge
            && state.list.len() >= self.threshold
            && state.phase != SyncPhase::Fetching
            && !state.end_of_data
    }

    pub fn current_items(&self) -> Vec<F::Item> {
        self.lock().list.items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().list.is_empty()
    }

    pub fn is_end_of_data(&self) -> bool {
        self.lock().end_of_data
    }

    pub fn last_error(&self) -> Option<ErrorKind> {
        self.lock().last_error
    }

    pub fn phase(&self) -> SyncPhase {
        self.lock().phase
    }

    pub fn cursor(&self) -> Cursor {
        self.lock().cursor
    }

    /// Patch accumulated items in place, e.g. a post's like state once its
    /// toggle has settled. Returns whether any item matched.
    pub fn update_item(&self, id: i64, patch: impl FnMut(&mut F::Item)) -> bool {
        let mut state = self.lock();
        if state.list.update(id, patch) == 0 {
            return false;
        }
        self.changed(&state);
        true
    }

    fn lock(&self) -> MutexGuard<'_, State<F::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the single in-flight slot and build the request.
    ///
    /// A refresh asks for the first page without touching the stored
    /// cursor; the reset is committed only once the page arrives.
    fn begin(&self, kind: FetchKind) -> Result<(ApiRequest, InFlight<'_, F::Item>), SkipReason> {
        let mut state = self.lock();
        if state.phase == SyncPhase::Fetching {
            tracing::debug!("{}: fetch already in flight, dropping call", F::NAME);
            return Err(SkipReason::InFlight);
        }
        let cursor = match kind {
            FetchKind::Refresh => Cursor::start(),
            FetchKind::LoadMore if state.end_of_data => {
                tracing::debug!("{}: end of data, not loading more", F::NAME);
                return Err(SkipReason::EndOfData);
            }
            FetchKind::LoadMore => state.cursor,
        };
        state.phase = SyncPhase::Fetching;

        let request = self.endpoint.page_request(cursor);
        tracing::debug!("{}: fetching {}", F::NAME, request);
        Ok((
            request,
            InFlight {
                state: &self.state,
                armed: true,
            },
        ))
    }

    async fn fetch(&self, request: ApiRequest) -> Result<Page<F::Item>, SyncError> {
        let token = self.tokens.get().ok_or(SyncError::MissingToken)?;
        let envelope = self.transport.request(request, &token).await?;
        if !envelope.is_success() {
            return Err(SyncError::Rejected {
                status: envelope.status,
                message: envelope.message,
            });
        }
        let envelope = envelope.decode::<Vec<F::Item>>()?;
        Ok(Page::new(envelope.data.unwrap_or_default()))
    }

    fn fail(&self, state: &mut State<F::Item>, err: SyncError) -> SyncError {
        let kind = err.kind();
        tracing::warn!("{}: fetch failed: {}", F::NAME, err);
        state.phase = SyncPhase::Failed;
        state.last_error = Some(kind);
        events::emit(
            &self.events,
            ScreenEvent::FeedFailed {
                feed: F::NAME,
                kind,
            },
        );
        err
    }

    fn changed(&self, state: &State<F::Item>) {
        events::emit(
            &self.events,
            ScreenEvent::FeedChanged {
                feed: F::NAME,
                len: state.list.len(),
                end_of_data: state.end_of_data,
            },
        );
    }
}
