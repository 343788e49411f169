use ragchat_types::Message;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::state::{lock, SessionState};

/// How a streamed answer ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Finish frame received, or the stream closed cleanly
    Finalized,
    /// The server sent an error frame
    Errored(String),
    /// Stopped by the user; the connection was closed
    Cancelled,
    TransportFailed(String),
}

/// Progress published while a response streams
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// The assistant message after applying one event
    MessageUpdated(Message),
    /// A server-signaled failure to show as a notification
    Notice(String),
    /// Last update of the stream
    Finished(StreamOutcome),
}

/// Caller's side of one in-flight response
pub struct StreamHandle {
    message_id: String,
    ticket: u64,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    task: JoinHandle<StreamOutcome>,
    state: Arc<Mutex<SessionState>>,
}

impl StreamHandle {
    pub(crate) fn new(
        message_id: String,
        ticket: u64,
        updates: mpsc::UnboundedReceiver<SessionUpdate>,
        task: JoinHandle<StreamOutcome>,
        state: Arc<Mutex<SessionState>>,
    ) -> Self {
        Self {
            message_id,
            ticket,
            updates,
            task,
            state,
        }
    }

    /// Provisional id of the assistant placeholder
    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Next update, or None once the stream has finished
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        self.updates.recv().await
    }

    /// Stop this response and close its connection
    ///
    /// Returns false if the stream had already ended or been stopped.
    pub fn cancel(&self) -> bool {
        lock(&self.state).stop_stream(Some(self.ticket))
    }

    /// Wait for the stream to end
    pub async fn wait(self) -> StreamOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Stream task failed: {}", e);
                StreamOutcome::TransportFailed(format!("stream task failed: {}", e))
            }
        }
    }
}
