//! Explicit result type for remote fetches.

use crate::backend::BackendError;

/// State of one remote fetch, as seen by a view.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// Not requested yet
    Idle,
    Loading,
    Loaded(T),
    /// Request failed; the message is shown inline
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, BackendError>> for Loadable<T> {
    fn from(result: Result<T, BackendError>) -> Self {
        match result {
            Ok(value) => Loadable::Loaded(value),
            Err(e) => Loadable::Failed(e.to_string()),
        }
    }
}

impl<T> Loadable<Vec<T>> {
    /// Loaded items, or an empty slice in every other state.
    pub fn items(&self) -> &[T] {
        self.loaded().map(Vec::as_slice).unwrap_or(&[])
    }
}
