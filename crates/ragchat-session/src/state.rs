use ragchat_types::{Conversation, Message};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// The one party currently allowed to write the message list
pub(crate) enum Writer {
    /// A send in progress, from conversation creation until the stream ends
    Stream {
        ticket: u64,
        cancel: watch::Sender<bool>,
    },
    /// A history reload after a conversation switch
    Reload { ticket: u64 },
}

#[derive(Default)]
pub(crate) struct SessionState {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
    pub conversations: Vec<Conversation>,
    pub writer: Option<Writer>,
    next_ticket: u64,
}

impl SessionState {
    pub fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.writer, Some(Writer::Stream { .. }))
    }

    /// Whether the stream identified by `ticket` still owns the message list
    pub fn owns_stream(&self, ticket: u64) -> bool {
        matches!(self.writer, Some(Writer::Stream { ticket: t, .. }) if t == ticket)
    }

    pub fn owns_reload(&self, ticket: u64) -> bool {
        matches!(self.writer, Some(Writer::Reload { ticket: t }) if t == ticket)
    }

    /// Stop the active stream, or only the one with `ticket` if given
    ///
    /// Fires the cancellation signal and gives up write access. Returns true
    /// if a stream was stopped.
    pub fn stop_stream(&mut self, ticket: Option<u64>) -> bool {
        let matches = match (&self.writer, ticket) {
            (Some(Writer::Stream { .. }), None) => true,
            (Some(Writer::Stream { ticket: t, .. }), Some(wanted)) => *t == wanted,
            _ => false,
        };
        if !matches {
            return false;
        }

        if let Some(Writer::Stream { ticket, cancel }) = self.writer.take() {
            tracing::info!(ticket, "Stopping stream");
            let _ = cancel.send(true);
        }
        true
    }

    /// Give up write access held by a finished stream
    pub fn release_stream(&mut self, ticket: u64) {
        if self.owns_stream(ticket) {
            self.writer = None;
        }
    }
}

pub(crate) fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming(state: &mut SessionState) -> (u64, watch::Receiver<bool>) {
        let ticket = state.issue_ticket();
        let (cancel, rx) = watch::channel(false);
        state.writer = Some(Writer::Stream { ticket, cancel });
        (ticket, rx)
    }

    #[test]
    fn test_tickets_are_unique() {
        let mut state = SessionState::default();
        let a = state.issue_ticket();
        let b = state.issue_ticket();
        assert_ne!(a, b);
    }

    #[test]
    fn test_stop_fires_cancel_and_releases() {
        let mut state = SessionState::default();
        let (ticket, rx) = streaming(&mut state);

        assert!(state.owns_stream(ticket));
        assert!(state.stop_stream(None));
        assert!(*rx.borrow());
        assert!(!state.is_streaming());
        assert!(!state.stop_stream(None));
    }

    #[test]
    fn test_stop_with_stale_ticket_is_ignored() {
        let mut state = SessionState::default();
        let (ticket, _rx) = streaming(&mut state);

        assert!(!state.stop_stream(Some(ticket + 100)));
        assert!(state.owns_stream(ticket));
    }

    #[test]
    fn test_release_only_by_owner() {
        let mut state = SessionState::default();
        let (ticket, _rx) = streaming(&mut state);

        state.release_stream(ticket + 1);
        assert!(state.is_streaming());

        state.release_stream(ticket);
        assert!(!state.is_streaming());
    }
}
