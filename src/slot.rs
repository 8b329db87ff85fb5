//! Holder for one asynchronous operation's status and result.

/// Status of one async operation.
///
/// A value only exists in `Ready` and a message only in `Failed`, so a slot
/// can never show a result and an error at the same time.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncSlot<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

// Hand-written so `T` needs no `Default` bound.
impl<T> Default for AsyncSlot<T> {
    fn default() -> Self {
        AsyncSlot::Idle
    }
}

impl<T> AsyncSlot<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncSlot::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AsyncSlot::Ready(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncSlot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            AsyncSlot::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Settle the slot from a finished operation.
    pub fn settle(outcome: Result<T, String>) -> Self {
        match outcome {
            Ok(value) => AsyncSlot::Ready(value),
            Err(message) => AsyncSlot::Failed(message),
        }
    }
}
