use futures::StreamExt;
use ragchat_client::{ByteStream, ChatBackend};
use ragchat_stream::{parse_event_stream, ChatFrameDecoder, StreamError};
use ragchat_types::StreamEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

use crate::accumulator::{AccumulatorState, Applied, MessageAccumulator};
use crate::handle::{SessionUpdate, StreamOutcome};
use crate::session::DEFAULT_PAGE_SIZE;
use crate::state::{lock, SessionState};

enum Step {
    Event(StreamEvent),
    Failed(StreamError),
    Closed,
    Cancelled,
}

/// Background task that feeds one response stream into its placeholder
pub(crate) struct StreamTask {
    pub state: Arc<Mutex<SessionState>>,
    pub backend: Arc<dyn ChatBackend>,
    pub ticket: u64,
    /// Index of the placeholder in the message list
    pub slot: usize,
    pub accumulator: MessageAccumulator,
    pub bytes: ByteStream,
    pub cancel: watch::Receiver<bool>,
    pub updates: mpsc::UnboundedSender<SessionUpdate>,
    /// Set when this send created the conversation
    pub refresh_conversations: bool,
}

impl StreamTask {
    pub async fn drive(self) -> StreamOutcome {
        let StreamTask {
            state,
            backend,
            ticket,
            slot,
            mut accumulator,
            bytes,
            mut cancel,
            updates,
            refresh_conversations,
        } = self;

        let mut events = parse_event_stream(bytes, ChatFrameDecoder);
        accumulator.start();
        tracing::debug!(ticket, message_id = %accumulator.message().id, "Stream started");

        let outcome = loop {
            let step = tokio::select! {
                biased;
                changed = cancel.changed() => {
                    // A dropped sender means the writer slot was taken away
                    match changed {
                        Ok(()) if !*cancel.borrow() => continue,
                        _ => Step::Cancelled,
                    }
                }
                next = events.next() => match next {
                    Some(Ok(event)) => Step::Event(event),
                    Some(Err(e)) => Step::Failed(e),
                    None => Step::Closed,
                },
            };

            match step {
                Step::Event(event) => {
                    let applied = {
                        let mut guard = lock(&state);
                        if !guard.owns_stream(ticket) {
                            break StreamOutcome::Cancelled;
                        }
                        let applied = accumulator.apply(event);
                        if applied != Applied::Ignored {
                            write_slot(&mut guard, slot, &accumulator);
                        }
                        applied
                    };

                    match applied {
                        Applied::Updated => publish(&updates, &accumulator),
                        Applied::Ignored => {}
                        Applied::Finalized => {
                            publish(&updates, &accumulator);
                            break StreamOutcome::Finalized;
                        }
                        Applied::Errored(message) => {
                            tracing::warn!(ticket, "Server reported error: {}", message);
                            publish(&updates, &accumulator);
                            let _ = updates.send(SessionUpdate::Notice(message.clone()));
                            break StreamOutcome::Errored(message);
                        }
                    }
                }
                Step::Failed(e) => {
                    let message = e.to_string();
                    tracing::error!(ticket, "Stream transport failed: {}", message);
                    let mut guard = lock(&state);
                    if !guard.owns_stream(ticket) {
                        break StreamOutcome::Cancelled;
                    }
                    accumulator.fail_transport(message.clone());
                    write_slot(&mut guard, slot, &accumulator);
                    drop(guard);
                    publish(&updates, &accumulator);
                    break StreamOutcome::TransportFailed(message);
                }
                Step::Closed => {
                    let mut guard = lock(&state);
                    if !guard.owns_stream(ticket) {
                        break StreamOutcome::Cancelled;
                    }
                    if accumulator.close() {
                        write_slot(&mut guard, slot, &accumulator);
                        drop(guard);
                        publish(&updates, &accumulator);
                    }
                    break terminal_outcome(&accumulator);
                }
                Step::Cancelled => {
                    tracing::info!(ticket, "Stream cancelled");
                    break StreamOutcome::Cancelled;
                }
            }
        };

        // Dropping the event stream closes the connection
        drop(events);
        lock(&state).release_stream(ticket);

        // The conversation exists on the server even if the answer was stopped
        if refresh_conversations {
            match backend.list_conversations(1, DEFAULT_PAGE_SIZE).await {
                Ok(conversations) => lock(&state).conversations = conversations,
                Err(e) => tracing::warn!("Failed to refresh conversations: {}", e),
            }
        }

        tracing::debug!(ticket, ?outcome, "Stream finished");
        let _ = updates.send(SessionUpdate::Finished(outcome.clone()));
        outcome
    }
}

fn write_slot(state: &mut SessionState, slot: usize, accumulator: &MessageAccumulator) {
    if let Some(message) = state.messages.get_mut(slot) {
        *message = accumulator.message().clone();
    }
}

fn publish(updates: &mpsc::UnboundedSender<SessionUpdate>, accumulator: &MessageAccumulator) {
    let _ = updates.send(SessionUpdate::MessageUpdated(accumulator.message().clone()));
}

fn terminal_outcome(accumulator: &MessageAccumulator) -> StreamOutcome {
    match accumulator.state() {
        AccumulatorState::Errored => StreamOutcome::Errored(
            accumulator
                .message()
                .extra
                .error_msg
                .clone()
                .unwrap_or_default(),
        ),
        _ => StreamOutcome::Finalized,
    }
}
