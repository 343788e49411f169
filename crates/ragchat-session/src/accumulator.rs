use ragchat_types::{Message, StreamEvent};

/// Lifecycle of one assistant message being streamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Placeholder appended, stream not started yet
    Idle,
    Streaming,
    Finalized,
    Errored,
}

/// What applying one event did to the message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Updated,
    Finalized,
    /// Server-signaled failure, carrying its message
    Errored(String),
    /// The message was already terminal; nothing changed
    Ignored,
}

/// Folds stream events into a single assistant message
///
/// Text and reasoning deltas are appended in arrival order, citation
/// snapshots replace each other, and the first `Finish` or `Error` freezes
/// the message. Events arriving after that are ignored so duplicate
/// terminal frames from a retried transport are harmless.
#[derive(Debug, Clone)]
pub struct MessageAccumulator {
    message: Message,
    state: AccumulatorState,
}

impl MessageAccumulator {
    pub fn new(placeholder: Message) -> Self {
        Self {
            message: placeholder,
            state: AccumulatorState::Idle,
        }
    }

    /// Begin accepting events
    pub fn start(&mut self) {
        if self.state == AccumulatorState::Idle {
            self.state = AccumulatorState::Streaming;
        }
    }

    /// Apply one event
    ///
    /// # Panics
    ///
    /// Panics if called before [`start`](Self::start). Driving events into a
    /// message that was never started is a caller bug.
    pub fn apply(&mut self, event: StreamEvent) -> Applied {
        assert!(
            self.state != AccumulatorState::Idle,
            "MessageAccumulator::apply called before start()"
        );

        if self.is_terminal() {
            tracing::debug!(message_id = %self.message.id, "Ignoring event after terminal state");
            return Applied::Ignored;
        }

        match event {
            StreamEvent::Text { delta } => {
                self.message.content.push_str(&delta);
                Applied::Updated
            }
            StreamEvent::Reasoning { delta } => {
                self.message.extra.reasoning.push_str(&delta);
                Applied::Updated
            }
            StreamEvent::Citation { chunks } => {
                self.message.extra.citations = chunks;
                Applied::Updated
            }
            StreamEvent::Finish {
                usage,
                finish_reason,
                message_id,
            } => {
                if usage.is_some() {
                    self.message.extra.usage = usage;
                }
                self.message.extra.finish_reason = finish_reason;
                if let Some(id) = message_id.filter(|id| !id.is_empty()) {
                    tracing::debug!(provisional = %self.message.id, canonical = %id, "Reconciling message id");
                    self.message.id = id;
                }
                self.state = AccumulatorState::Finalized;
                Applied::Finalized
            }
            StreamEvent::Error { message } => {
                self.message
                    .content
                    .push_str(&format!("\n\n[Error: {}]", message));
                self.message.extra.is_error = true;
                self.message.extra.error_msg = Some(message.clone());
                self.state = AccumulatorState::Errored;
                Applied::Errored(message)
            }
        }
    }

    /// The stream ended without a terminal frame; freeze what arrived
    ///
    /// Returns true if the state changed.
    pub fn close(&mut self) -> bool {
        if self.state == AccumulatorState::Streaming {
            tracing::debug!(message_id = %self.message.id, "Stream closed without finish frame");
            self.state = AccumulatorState::Finalized;
            true
        } else {
            false
        }
    }

    /// The transport failed; flag the message but keep its content
    ///
    /// Returns true if the state changed.
    pub fn fail_transport(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.message.extra.is_error = true;
        self.message.extra.error_msg = Some(error.into());
        self.state = AccumulatorState::Errored;
        true
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            AccumulatorState::Finalized | AccumulatorState::Errored
        )
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragchat_types::{Citation, TokenUsage};

    fn started() -> MessageAccumulator {
        let mut acc = MessageAccumulator::new(Message::assistant_placeholder(Some("c1".into()), 2));
        acc.start();
        acc
    }

    fn citation(id: &str) -> Citation {
        Citation {
            id: Some(id.to_string()),
            ..Citation::default()
        }
    }

    #[test]
    fn test_new_accumulator_is_idle() {
        let acc = MessageAccumulator::new(Message::assistant_placeholder(None, 1));
        assert_eq!(acc.state(), AccumulatorState::Idle);
        assert!(acc.message().content.is_empty());
    }

    #[test]
    #[should_panic(expected = "before start")]
    fn test_apply_while_idle_panics() {
        let mut acc = MessageAccumulator::new(Message::assistant_placeholder(None, 1));
        acc.apply(StreamEvent::text("x"));
    }

    #[test]
    fn test_text_deltas_concatenate_in_order() {
        let mut acc = started();
        for delta in ["The ", "answer ", "is ", "42."] {
            assert_eq!(acc.apply(StreamEvent::text(delta)), Applied::Updated);
        }

        assert_eq!(acc.message().content, "The answer is 42.");
        assert_eq!(acc.state(), AccumulatorState::Streaming);
    }

    #[test]
    fn test_reasoning_is_separate_from_content() {
        let mut acc = started();
        acc.apply(StreamEvent::reasoning("Check the "));
        acc.apply(StreamEvent::text("Yes"));
        acc.apply(StreamEvent::reasoning("policy."));

        assert_eq!(acc.message().extra.reasoning, "Check the policy.");
        assert_eq!(acc.message().content, "Yes");
    }

    #[test]
    fn test_citations_are_replaced_not_appended() {
        let mut acc = started();
        acc.apply(StreamEvent::Citation {
            chunks: vec![citation("a"), citation("b")],
        });
        acc.apply(StreamEvent::Citation {
            chunks: vec![citation("c")],
        });

        assert_eq!(acc.message().extra.citations, vec![citation("c")]);
    }

    #[test]
    fn test_finish_records_usage_and_reconciles_id() {
        let mut acc = started();
        acc.apply(StreamEvent::text("Hello"));

        let applied = acc.apply(StreamEvent::Finish {
            usage: Some(TokenUsage {
                prompt_tokens: 1,
                completion_tokens: 2,
                total_tokens: 3,
            }),
            finish_reason: Some("stop".into()),
            message_id: Some("srv-77".into()),
        });

        assert_eq!(applied, Applied::Finalized);
        assert_eq!(acc.state(), AccumulatorState::Finalized);
        assert_eq!(acc.message().id, "srv-77");
        assert_eq!(acc.message().extra.usage.as_ref().map(|u| u.total_tokens), Some(3));
        assert_eq!(acc.message().extra.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_duplicate_terminal_events_are_no_ops() {
        let mut acc = started();
        acc.apply(StreamEvent::text("Done"));
        acc.apply(StreamEvent::finish());
        let frozen = acc.message().clone();

        assert_eq!(acc.apply(StreamEvent::finish()), Applied::Ignored);
        assert_eq!(acc.apply(StreamEvent::error("late")), Applied::Ignored);
        assert_eq!(acc.apply(StreamEvent::text(" more")), Applied::Ignored);
        assert_eq!(acc.message(), &frozen);
    }

    #[test]
    fn test_error_preserves_content_and_annotates() {
        let mut acc = started();
        acc.apply(StreamEvent::text("Partial"));

        let applied = acc.apply(StreamEvent::error("rate limited"));

        assert_eq!(applied, Applied::Errored("rate limited".into()));
        assert_eq!(acc.state(), AccumulatorState::Errored);
        assert_eq!(acc.message().content, "Partial\n\n[Error: rate limited]");
        assert!(acc.message().extra.is_error);
        assert_eq!(acc.message().extra.error_msg.as_deref(), Some("rate limited"));

        let frozen = acc.message().clone();
        assert_eq!(acc.apply(StreamEvent::error("rate limited")), Applied::Ignored);
        assert_eq!(acc.message(), &frozen);
    }

    #[test]
    fn test_close_finalizes_only_while_streaming() {
        let mut acc = started();
        acc.apply(StreamEvent::text("cut off"));
        assert!(acc.close());
        assert_eq!(acc.state(), AccumulatorState::Finalized);
        assert!(!acc.close());
    }

    #[test]
    fn test_transport_failure_keeps_content_without_annotation() {
        let mut acc = started();
        acc.apply(StreamEvent::text("So far"));

        assert!(acc.fail_transport("connection reset"));
        assert_eq!(acc.message().content, "So far");
        assert!(acc.message().extra.is_error);
        assert_eq!(acc.state(), AccumulatorState::Errored);

        let mut finished = started();
        finished.apply(StreamEvent::finish());
        assert!(!finished.fail_transport("late reset"));
        assert!(!finished.message().extra.is_error);
    }
}
