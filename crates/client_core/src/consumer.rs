use shared::{
    domain::{Subscription, SubscriptionId, SwipeDirection},
    error::ClientError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{AccessToken, SubscriptionsApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    Empty,
    Idle,
    Removing,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    Kept { cursor: usize },
    Removed(Subscription),
    /// Ignored because a removal was already in flight.
    Dropped,
    Empty,
}

/// Ticket for the one removal allowed in flight. Consumed by `finish_remove`.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    id: SubscriptionId,
}

impl PendingRemoval {
    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }
}

/// Ordered subscriptions plus the card currently shown.
#[derive(Debug, Clone, Default)]
pub struct SwipeSession {
    subscriptions: Vec<Subscription>,
    cursor: usize,
    busy: bool,
    last_error: Option<ClientError>,
}

impl SwipeSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the list and resets the cursor. A removal already in flight
    /// keeps the session busy until its `finish_remove`.
    pub fn load(&mut self, subscriptions: Vec<Subscription>) {
        info!(count = subscriptions.len(), "swipe session loaded");
        *self = Self {
            subscriptions,
            busy: self.busy,
            ..Self::default()
        };
    }

    pub fn sign_out(&mut self) {
        *self = Self {
            busy: self.busy,
            ..Self::default()
        };
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&Subscription> {
        self.subscriptions.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// One-based progress, e.g. `(3, 120)` for "3 of 120".
    pub fn position(&self) -> Option<(usize, usize)> {
        self.current().map(|_| (self.cursor + 1, self.len()))
    }

    pub fn phase(&self) -> SwipePhase {
        if self.busy {
            SwipePhase::Removing
        } else if self.is_empty() {
            SwipePhase::Empty
        } else if self.last_error.is_some() {
            SwipePhase::Failed
        } else {
            SwipePhase::Idle
        }
    }

    /// Moves past the current card. Past the last card the cursor wraps to 0.
    pub fn keep(&mut self) -> SwipeOutcome {
        if self.busy {
            debug!("keep ignored while a removal is in flight");
            return SwipeOutcome::Dropped;
        }
        if self.is_empty() {
            return SwipeOutcome::Empty;
        }

        self.last_error = None;
        self.cursor = if self.cursor + 1 < self.len() {
            self.cursor + 1
        } else {
            0
        };
        SwipeOutcome::Kept {
            cursor: self.cursor,
        }
    }

    /// Marks the session busy and hands out the id to delete. `None` when busy or empty.
    pub fn begin_remove(&mut self) -> Option<PendingRemoval> {
        if self.busy {
            debug!("remove ignored while another removal is in flight");
            return None;
        }
        let id = self.current()?.id.clone();
        self.busy = true;
        Some(PendingRemoval { id })
    }

    /// Applies the delete result. On failure the list and cursor stay untouched.
    pub fn finish_remove(
        &mut self,
        pending: PendingRemoval,
        result: Result<(), ClientError>,
    ) -> Result<Option<Subscription>, ClientError> {
        self.busy = false;

        if let Err(err) = result {
            warn!(subscription_id = %pending.id, error = %err, "unsubscribe failed");
            self.last_error = Some(err.clone());
            return Err(err);
        }
        self.last_error = None;

        let Some(index) = self
            .subscriptions
            .iter()
            .position(|subscription| subscription.id == pending.id)
        else {
            debug!(subscription_id = %pending.id, "removed subscription no longer in session");
            return Ok(None);
        };

        let removed = self.subscriptions.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        self.cursor = self.cursor.min(self.len().saturating_sub(1));
        info!(
            subscription_id = %removed.id,
            name = %removed.name,
            remaining = self.len(),
            "unsubscribed"
        );
        Ok(Some(removed))
    }

    pub async fn swipe<A>(
        &mut self,
        api: &A,
        token: &AccessToken,
        direction: SwipeDirection,
    ) -> Result<SwipeOutcome, ClientError>
    where
        A: SubscriptionsApi + ?Sized,
    {
        let pending = match self.prepare(direction) {
            Prepared::Done(outcome) => return Ok(outcome),
            Prepared::Remove(pending) => pending,
        };
        let result = api.delete_subscription(token, pending.id()).await;
        Ok(removal_outcome(self.finish_remove(pending, result)?))
    }

    fn prepare(&mut self, direction: SwipeDirection) -> Prepared {
        match direction {
            SwipeDirection::Keep => Prepared::Done(self.keep()),
            SwipeDirection::Remove if self.busy => Prepared::Done(SwipeOutcome::Dropped),
            SwipeDirection::Remove => match self.begin_remove() {
                Some(pending) => Prepared::Remove(pending),
                None => Prepared::Done(SwipeOutcome::Empty),
            },
        }
    }
}

enum Prepared {
    Done(SwipeOutcome),
    Remove(PendingRemoval),
}

fn removal_outcome(removed: Option<Subscription>) -> SwipeOutcome {
    match removed {
        Some(subscription) => SwipeOutcome::Removed(subscription),
        None => SwipeOutcome::Dropped,
    }
}

/// Like [`SwipeSession::swipe`], but releases the lock while the delete call
/// is in flight. Concurrent removes are dropped by the busy flag, not queued.
pub async fn swipe_shared<A>(
    session: &Mutex<SwipeSession>,
    api: &A,
    token: &AccessToken,
    direction: SwipeDirection,
) -> Result<SwipeOutcome, ClientError>
where
    A: SubscriptionsApi + ?Sized,
{
    let pending = match session.lock().await.prepare(direction) {
        Prepared::Done(outcome) => return Ok(outcome),
        Prepared::Remove(pending) => pending,
    };
    let result = api.delete_subscription(token, pending.id()).await;
    let removed = session.lock().await.finish_remove(pending, result)?;
    Ok(removal_outcome(removed))
}

#[cfg(test)]
#[path = "tests/consumer_tests.rs"]
mod tests;
