//! Optimistic binary actions.
//!
//! The visible state flips as soon as the user acts and is rolled back if
//! the confirming request fails or comes back with an unexpected status.
//! Each target has at most one request in flight.

use crate::auth::TokenStore;
use crate::error::ActionError;
use crate::events::{self, EventSink, ScreenEvent};
use crate::transport::{ApiRequest, Transport};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Status that confirms an activation.
pub const CREATED: u16 = 201;
/// Status that confirms a deactivation.
pub const OK: u16 = 200;

/// Describes the requests behind one kind of toggle.
pub trait ToggleAction: Send + Sync + 'static {
    type Target: Send + Sync;

    const NAME: &'static str;

    /// Content or comment id the toggle is keyed on.
    fn target_id(target: &Self::Target) -> i64;

    fn activate_request(&self, target: &Self::Target) -> Result<ApiRequest, serde_json::Error>;

    /// `None` when the action cannot be undone.
    fn deactivate_request(
        &self,
        target: &Self::Target,
    ) -> Result<Option<ApiRequest>, serde_json::Error>;

    fn activation_confirmed(&self, status: u16) -> bool {
        status == CREATED
    }

    fn deactivation_confirmed(&self, status: u16) -> bool {
        status == OK
    }

    /// Whether a rejected activation means the user already did this.
    fn is_already_voted(&self, _status: u16) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Entry {
    active: bool,
    pending: bool,
}

type Entries = Mutex<HashMap<i64, Entry>>;

/// Rolls an optimistic flip back if the request future is dropped.
struct Pending<'a> {
    entries: &'a Entries,
    target: i64,
    desired: bool,
    armed: bool,
}

impl Pending<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get_mut(&self.target) {
                entry.pending = false;
                entry.active = !self.desired;
            }
        }
    }
}

pub struct OptimisticToggle<A: ToggleAction> {
    action: A,
    transport: Arc<dyn Transport>,
    tokens: TokenStore,
    events: Option<EventSink>,
    entries: Entries,
}

impl<A: ToggleAction> OptimisticToggle<A> {
    pub fn new(action: A, transport: Arc<dyn Transport>, tokens: TokenStore) -> Self {
        Self {
            action,
            transport,
            tokens,
            events: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_events(mut self, sink: EventSink) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    /// Record server-side state, e.g. `isLiked` from a detail fetch.
    ///
    /// Ignored while a request for the target is pending.
    pub fn seed(&self, target: i64, active: bool) {
        let mut entries = self.lock();
        let entry = entries.entry(target).or_default();
        if !entry.pending {
            entry.active = active;
        }
    }

    pub fn is_active(&self, target: i64) -> bool {
        self.lock().get(&target).is_some_and(|entry| entry.active)
    }

    pub fn is_pending(&self, target: i64) -> bool {
        self.lock().get(&target).is_some_and(|entry| entry.pending)
    }

    /// Optimistically turn the toggle on and confirm with the server.
    pub async fn activate(&self, target: A::Target) -> Result<(), ActionError> {
        let request = self.action.activate_request(&target)?;
        self.run(A::target_id(&target), true, request).await
    }

    /// Optimistically turn the toggle off and confirm with the server.
    pub async fn deactivate(&self, target: A::Target) -> Result<(), ActionError> {
        let request = self
            .action
            .deactivate_request(&target)?
            .ok_or(ActionError::NotReversible(A::NAME))?;
        self.run(A::target_id(&target), false, request).await
    }

    async fn run(&self, target: i64, desired: bool, request: ApiRequest) -> Result<(), ActionError> {
        let token = {
            let mut entries = self.lock();
            let entry = entries.entry(target).or_default();
            if entry.pending || entry.active == desired {
                tracing::debug!("{} #{}: rejected duplicate toggle", A::NAME, target);
                return Err(ActionError::AlreadyInProgress);
            }
            let token = self.tokens.get().ok_or(ActionError::MissingToken)?;
            entry.active = desired;
            entry.pending = true;
            token
        };
        let pending = Pending {
            entries: &self.entries,
            target,
            desired,
            armed: true,
        };

        tracing::debug!("{} #{}: {}", A::NAME, target, request);
        let result = self.transport.request(request, &token).await;
        pending.disarm();

        let outcome = match result {
            Ok(envelope) => {
                let confirmed = if desired {
                    self.action.activation_confirmed(envelope.status)
                } else {
                    self.action.deactivation_confirmed(envelope.status)
                };
                if confirmed {
                    Ok(())
                } else if desired && self.action.is_already_voted(envelope.status) {
                    Err(ActionError::AlreadyVoted)
                } else {
                    Err(ActionError::Rejected {
                        status: envelope.status,
                        message: envelope.message,
                    })
                }
            }
            Err(err) => Err(ActionError::Transport(err)),
        };

        let active = match &outcome {
            Ok(()) => desired,
            Err(_) => !desired,
        };
        if let Some(entry) = self.lock().get_mut(&target) {
            entry.active = active;
            entry.pending = false;
        }

        match &outcome {
            Ok(()) => tracing::debug!("{} #{}: confirmed", A::NAME, target),
            Err(ActionError::AlreadyVoted) => {
                tracing::info!("{} #{}: already voted", A::NAME, target);
                events::emit(&self.events, ScreenEvent::AlreadyVoted { target });
            }
            Err(err) => tracing::warn!("{} #{}: rolled back: {}", A::NAME, target, err),
        }
        events::emit(
            &self.events,
            ScreenEvent::ToggleSettled {
                action: A::NAME,
                target,
                active,
            },
        );
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i64, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
