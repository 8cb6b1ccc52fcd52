//! Mock service for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cloze_core::error::ServiceError;
use cloze_core::model::Card;
use cloze_core::traits::{ExerciseService, FetchRequest};

/// A scripted exercise service for driving sessions without a server.
///
/// Queued replies are consumed one per fetch; once the queue is empty every
/// fetch returns the default batch.
pub struct MockService {
    /// Replies handed out in order.
    replies: Mutex<VecDeque<Result<Vec<Card>, String>>>,
    /// Returned once the queue runs dry.
    default_batch: Vec<Card>,
    healthy: AtomicBool,
    /// Number of fetches made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<FetchRequest>>,
}

impl MockService {
    /// A mock that always returns the same batch.
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_batch: cards,
            healthy: AtomicBool::new(true),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Queue a batch for the next unanswered fetch.
    pub fn then_cards(self, cards: Vec<Card>) -> Self {
        self.lock_replies().push_back(Ok(cards));
        self
    }

    /// Queue a network failure for the next unanswered fetch.
    pub fn then_failure(self, message: &str) -> Self {
        self.lock_replies().push_back(Err(message.to_string()));
        self
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }

    /// Get the number of fetches made to this service.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this service.
    pub fn last_request(&self) -> Option<FetchRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Vec<Card>, String>>> {
        self.replies.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ExerciseService for MockService {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_cards(&self, request: &FetchRequest) -> anyhow::Result<Vec<Card>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(request.clone());

        let reply = self.lock_replies().pop_front();
        match reply {
            Some(Ok(cards)) => Ok(cards),
            Some(Err(message)) => Err(ServiceError::NetworkError(message).into()),
            None => Ok(self
                .default_batch
                .iter()
                .take(request.count as usize)
                .cloned()
                .collect()),
        }
    }

    async fn check_health(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
