use crate::models::{AppState, GeneratedPrompt, Provider};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DESCRIPTION_ERROR: &str = "Failed to generate description. Please try again.";
const BATCH_DESCRIPTION_ERROR_PREFIX: &str = "Failed to generate description for ";

fn batch_description_error(failures: usize, total: usize) -> String {
    format!("{}{} of {} pins.", BATCH_DESCRIPTION_ERROR_PREFIX, failures, total)
}

// A later successful description commit clears these, but never a generation error.
fn is_description_error(message: &str) -> bool {
    message == DESCRIPTION_ERROR || message.starts_with(BATCH_DESCRIPTION_ERROR_PREFIX)
}

fn error_after_descriptions(current: &Option<String>, failure: Option<String>) -> Option<String> {
    match failure {
        Some(message) => Some(message),
        None => current.clone().filter(|m| !is_description_error(m)),
    }
}

// Called with every committed snapshot, in commit order.
pub type StateListener = Arc<dyn Fn(&AppState) + Send + Sync>;

/// Identifies one generation request. Only the most recent one may commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken(u64);

/// Identifies the result list a description request was issued against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultsTicket(u64);

struct Inner {
    state: AppState,
    latest_request: u64,
    // Request that produced (or is producing) the current `results`.
    results_request: u64,
}

/// Sole owner of the session's [`AppState`].
///
/// Every transition builds a new state value and swaps it in whole; other
/// components only ever see cloned snapshots. Transitions:
///
/// * `idle -> loading` on [`begin_generation`](Self::begin_generation), clearing results and error
/// * `loading -> ready | error` on [`finish_generation`](Self::finish_generation)
/// * per pin `pending -> filled | idle` for descriptions, independent of the above
#[derive(Clone)]
pub struct StateHolder {
    inner: Arc<Mutex<Inner>>,
    listeners: Vec<StateListener>,
}

impl Default for StateHolder {
    fn default() -> Self {
        Self::new()
    }
}

impl StateHolder {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state: AppState::default(),
                latest_request: 0,
                results_request: 0,
            })),
            listeners: Vec::new(),
        }
    }

    pub fn with_listener(mut self, listener: impl Fn(&AppState) + Send + Sync + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub async fn snapshot(&self) -> AppState {
        self.inner.lock().await.state.clone()
    }

    fn publish(&self, state: &AppState) {
        for listener in &self.listeners {
            listener(state);
        }
    }

    // Swap in the state returned by `next`, if any. Listeners run under the lock so they see commits in order.
    async fn commit(&self, next: impl FnOnce(&AppState) -> Option<AppState>) -> bool {
        let mut inner = self.inner.lock().await;
        let Some(state) = next(&inner.state) else {
            return false;
        };
        if state == inner.state {
            return false;
        }
        inner.state = state;
        self.publish(&inner.state);
        true
    }

    // --- Form fields ---

    pub async fn set_provider(&self, provider: Provider) {
        self.commit(|s| Some(AppState { provider, ..s.clone() })).await;
    }

    pub async fn set_api_key(&self, api_key: String) {
        self.commit(|s| Some(AppState { api_key, ..s.clone() })).await;
    }

    pub async fn set_blog_title(&self, blog_title: String) {
        self.commit(|s| Some(AppState { blog_title, ..s.clone() })).await;
    }

    pub async fn set_blog_content(&self, blog_content: String) {
        self.commit(|s| Some(AppState { blog_content, ..s.clone() })).await;
    }

    /// Shows an error without touching results or loading flags (input validation).
    pub async fn set_error(&self, message: impl Into<String>) {
        let error = Some(message.into());
        self.commit(|s| Some(AppState { error, ..s.clone() })).await;
    }

    // --- Generation ---

    /// `idle -> loading`. Any request still in flight loses the right to commit.
    pub async fn begin_generation(&self) -> RequestToken {
        let mut inner = self.inner.lock().await;
        inner.latest_request += 1;
        inner.results_request = inner.latest_request;
        inner.state = AppState {
            is_loading: true,
            error: None,
            results: Vec::new(),
            ..inner.state.clone()
        };
        self.publish(&inner.state);
        RequestToken(inner.latest_request)
    }

    /// `loading -> ready` or `loading -> error`. Returns false when a newer request superseded this one.
    pub async fn finish_generation(
        &self,
        token: RequestToken,
        outcome: Result<Vec<GeneratedPrompt>, String>,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        if token.0 != inner.latest_request {
            log::debug!("Dropping stale generation result for request {}", token.0);
            return false;
        }
        inner.state = match outcome {
            Ok(results) => AppState {
                is_loading: false,
                error: None,
                results,
                ..inner.state.clone()
            },
            Err(message) => AppState {
                is_loading: false,
                error: Some(message),
                ..inner.state.clone()
            },
        };
        self.publish(&inner.state);
        true
    }

    // --- Descriptions ---

    /// Marks the pin at `index` as loading. `None` when there is no such pin.
    pub async fn mark_description_loading(&self, index: usize) -> Option<(ResultsTicket, GeneratedPrompt)> {
        let mut inner = self.inner.lock().await;
        let pin = inner.state.results.get(index)?.clone();
        let results = inner
            .state
            .results
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == index {
                    GeneratedPrompt { is_description_loading: true, ..p.clone() }
                } else {
                    p.clone()
                }
            })
            .collect();
        inner.state = AppState { results, ..inner.state.clone() };
        self.publish(&inner.state);
        Some((ResultsTicket(inner.results_request), pin))
    }

    /// Marks every pin as loading and returns the list the requests should be built from.
    pub async fn mark_all_descriptions_loading(&self) -> Option<(ResultsTicket, Vec<GeneratedPrompt>)> {
        let mut inner = self.inner.lock().await;
        if inner.state.results.is_empty() {
            return None;
        }
        let pins = inner.state.results.clone();
        let results = pins
            .iter()
            .map(|p| GeneratedPrompt { is_description_loading: true, ..p.clone() })
            .collect();
        inner.state = AppState { results, ..inner.state.clone() };
        self.publish(&inner.state);
        Some((ResultsTicket(inner.results_request), pins))
    }

    /// `pending -> filled` on success, `pending -> idle` plus an error message on failure.
    pub async fn apply_description(
        &self,
        ticket: ResultsTicket,
        index: usize,
        outcome: Result<String, String>,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        if ticket.0 != inner.results_request || index >= inner.state.results.len() {
            log::debug!("Dropping description for pin {} of a replaced result list", index);
            return false;
        }
        let failure = outcome.is_err().then(|| DESCRIPTION_ERROR.to_string());
        let mut results = inner.state.results.clone();
        results[index] = settle(&inner.state.results[index], outcome);
        let error = error_after_descriptions(&inner.state.error, failure);
        inner.state = AppState { results, error, ..inner.state.clone() };
        self.publish(&inner.state);
        true
    }

    /// Applies a whole batch in one commit. `outcomes` is in pin order.
    pub async fn apply_descriptions(&self, ticket: ResultsTicket, outcomes: Vec<Result<String, String>>) -> bool {
        let mut inner = self.inner.lock().await;
        if ticket.0 != inner.results_request || outcomes.len() != inner.state.results.len() {
            log::debug!("Dropping description batch for a replaced result list");
            return false;
        }
        let total = outcomes.len();
        let failures = outcomes.iter().filter(|o| o.is_err()).count();
        let results = inner
            .state
            .results
            .iter()
            .zip(outcomes)
            .map(|(p, result)| settle(p, result))
            .collect();
        let failure = (failures > 0).then(|| batch_description_error(failures, total));
        let error = error_after_descriptions(&inner.state.error, failure);
        inner.state = AppState { results, error, ..inner.state.clone() };
        self.publish(&inner.state);
        true
    }
}

// Stored as returned, even when empty. Export and the UI skip empty descriptions.
fn settle(pin: &GeneratedPrompt, outcome: Result<String, String>) -> GeneratedPrompt {
    let description = match outcome {
        Ok(text) => Some(text),
        Err(_) => pin.description.clone(),
    };
    GeneratedPrompt {
        description,
        is_description_loading: false,
        ..pin.clone()
    }
}
