/// Flash messages
///
/// A flash is a one-shot message from the server describing the outcome of a
/// mutation ("User created successfully"). It rides in the
/// [`ActionResponse`] envelope next to the optional payload. Clients push what
/// they receive into a [`FlashQueue`] and drain it when they render, so every
/// flash is shown exactly once.
///
/// # Example
///
/// ```
/// use backoffice_shared::flash::{ActionResponse, Flash, FlashQueue, Sound};
///
/// let response = ActionResponse::with_data(
///     Flash::success("User created successfully").with_sound(Sound::Create),
///     42,
/// );
///
/// let mut queue = FlashQueue::default();
/// queue.push(response.flash);
/// assert!(queue.pop().is_some());
/// assert!(queue.pop().is_none());
/// ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Outcome category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// UI sound cue played with the toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sound {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sound: Option<Sound>,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
            sound: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
            sound: None,
        }
    }

    pub fn with_sound(mut self, sound: Sound) -> Self {
        self.sound = Some(sound);
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == FlashKind::Error
    }
}

/// Envelope for mutation responses: `{ flash, data? }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub flash: Flash,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    pub fn new(flash: Flash) -> Self {
        Self { flash, data: None }
    }

    pub fn with_data(flash: Flash, data: T) -> Self {
        Self {
            flash,
            data: Some(data),
        }
    }
}

/// Client-side queue of received flashes, each yielded once
#[derive(Debug, Default)]
pub struct FlashQueue {
    pending: VecDeque<Flash>,
}

impl FlashQueue {
    pub fn push(&mut self, flash: Flash) {
        self.pending.push_back(flash);
    }

    /// Takes the oldest pending flash
    pub fn pop(&mut self) -> Option<Flash> {
        self.pending.pop_front()
    }

    /// Takes every pending flash in arrival order
    pub fn drain(&mut self) -> Vec<Flash> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
