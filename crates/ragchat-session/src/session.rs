use ragchat_client::{compose, compose_new_conversation, ChatBackend};
use ragchat_types::{ChatModelConfig, Conversation, Message};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

use crate::accumulator::MessageAccumulator;
use crate::driver::StreamTask;
use crate::error::{Result, SessionError};
use crate::handle::StreamHandle;
use crate::state::{lock, SessionState, Writer};

/// Page size used when refreshing the conversation list
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// One user's view of their conversations and the active message list
///
/// The message list has a single writer at a time: either the stream of
/// the response being generated, or a history reload after a switch. Any
/// operation that would introduce a second writer is rejected with an
/// error instead of being queued. Clones share the same session.
#[derive(Clone)]
pub struct ConversationSession {
    backend: Arc<dyn ChatBackend>,
    state: Arc<Mutex<SessionState>>,
}

impl ConversationSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Id of the active conversation
    ///
    /// `None` means no conversation exists yet; one is created on the next
    /// [`send`](Self::send).
    pub fn start_conversation(&self) -> Option<String> {
        lock(&self.state).conversation_id.clone()
    }

    pub fn is_streaming(&self) -> bool {
        lock(&self.state).is_streaming()
    }

    /// Snapshot of the active message list
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).messages.clone()
    }

    /// Conversations as of the last refresh
    pub fn conversations(&self) -> Vec<Conversation> {
        lock(&self.state).conversations.clone()
    }

    /// Send a user message and start streaming the answer
    ///
    /// Fails without touching the message list or the network when a
    /// response is already streaming, a history reload is in progress, or
    /// the config cannot be composed into a request. When no conversation
    /// is active one is created first; if that fails nothing is appended.
    pub async fn send(&self, text: &str, config: &ChatModelConfig) -> Result<StreamHandle> {
        let (ticket, cancel_rx, existing) = {
            let mut state = lock(&self.state);
            match state.writer {
                Some(Writer::Stream { .. }) => return Err(SessionError::AlreadyStreaming),
                Some(Writer::Reload { .. }) => return Err(SessionError::HistoryLoading),
                None => {}
            }

            let existing = state.conversation_id.clone();
            // Compose up front so a bad config never reaches the network
            match existing.as_deref() {
                Some(id) => {
                    compose(id, text, config)?;
                }
                None => {
                    compose_new_conversation(config)?;
                }
            }

            let ticket = state.issue_ticket();
            let (cancel, cancel_rx) = watch::channel(false);
            state.writer = Some(Writer::Stream { ticket, cancel });
            (ticket, cancel_rx, existing)
        };

        let (conversation_id, created) = match existing {
            Some(id) => (id, false),
            None => {
                let created = match compose_new_conversation(config) {
                    Ok(request) => self.backend.create_conversation(request).await,
                    Err(e) => Err(e),
                };
                match created {
                    Ok(id) => (id, true),
                    Err(e) => {
                        tracing::error!("Failed to create conversation: {}", e);
                        lock(&self.state).release_stream(ticket);
                        return Err(e.into());
                    }
                }
            }
        };

        let request = match compose(&conversation_id, text, config) {
            Ok(request) => request,
            Err(e) => {
                lock(&self.state).release_stream(ticket);
                return Err(e.into());
            }
        };

        let claimed = {
            let mut state = lock(&self.state);
            if state.owns_stream(ticket) {
                state.conversation_id = Some(conversation_id.clone());

                let seq = state.messages.len() as u64 + 1;
                state
                    .messages
                    .push(Message::user(Some(conversation_id.clone()), seq, text));

                let seq = state.messages.len() as u64 + 1;
                let placeholder =
                    Message::assistant_placeholder(Some(conversation_id.clone()), seq);
                state.messages.push(placeholder.clone());
                Some((state.messages.len() - 1, placeholder))
            } else {
                None
            }
        };
        let Some((slot, placeholder)) = claimed else {
            tracing::info!(ticket, "Send stopped before the stream opened");
            self.refresh_if_created(created).await;
            return Err(SessionError::Cancelled);
        };

        tracing::info!(
            conversation_id = %conversation_id,
            message_id = %placeholder.id,
            "Sending message"
        );

        let mut accumulator = MessageAccumulator::new(placeholder);

        let bytes = match self.backend.open_chat_stream(request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to open chat stream: {}", e);
                {
                    let mut state = lock(&self.state);
                    if state.owns_stream(ticket) {
                        accumulator.fail_transport(e.to_string());
                        if let Some(message) = state.messages.get_mut(slot) {
                            *message = accumulator.into_message();
                        }
                        state.release_stream(ticket);
                    }
                }
                self.refresh_if_created(created).await;
                return Err(e.into());
            }
        };

        if !lock(&self.state).owns_stream(ticket) {
            tracing::info!(ticket, "Send stopped while the stream was opening");
            self.refresh_if_created(created).await;
            return Err(SessionError::Cancelled);
        }

        let message_id = accumulator.message().id.clone();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let task = StreamTask {
            state: Arc::clone(&self.state),
            backend: Arc::clone(&self.backend),
            ticket,
            slot,
            accumulator,
            bytes,
            cancel: cancel_rx,
            updates: updates_tx,
            refresh_conversations: created,
        };
        let join = tokio::spawn(task.drive());

        Ok(StreamHandle::new(
            message_id,
            ticket,
            updates_rx,
            join,
            Arc::clone(&self.state),
        ))
    }

    /// Make `conversation_id` active and reload its history
    ///
    /// Rejected while a response is streaming. Switching to `None` clears
    /// the message list without a reload. If another switch starts before
    /// this reload returns, the older result is discarded. A failed reload
    /// puts back the conversation that was active before, or no
    /// conversation when that one was itself still loading.
    pub async fn switch_conversation(&self, conversation_id: Option<String>) -> Result<()> {
        let (ticket, previous) = {
            let mut state = lock(&self.state);
            if state.is_streaming() {
                return Err(SessionError::SwitchWhileStreaming);
            }
            let reloading = matches!(state.writer, Some(Writer::Reload { .. }));
            let current = state.conversation_id.take();
            let previous = match current {
                Some(id) if !reloading => Some((id, std::mem::take(&mut state.messages))),
                _ => None,
            };
            state.conversation_id = conversation_id.clone();
            state.messages.clear();

            match conversation_id.as_deref() {
                Some(_) => {
                    let ticket = state.issue_ticket();
                    state.writer = Some(Writer::Reload { ticket });
                    (ticket, previous)
                }
                None => {
                    state.writer = None;
                    return Ok(());
                }
            }
        };

        let Some(id) = conversation_id else {
            return Ok(());
        };
        tracing::debug!(conversation_id = %id, "Reloading history");

        let result = self.backend.list_messages(&id).await;

        let mut state = lock(&self.state);
        if !state.owns_reload(ticket) {
            tracing::debug!(conversation_id = %id, "Discarding stale history reload");
            return Ok(());
        }
        state.writer = None;

        match result {
            Ok(mut messages) => {
                messages.sort_by_key(|m| m.seq);
                state.messages = messages;
                Ok(())
            }
            Err(e) => {
                tracing::error!(conversation_id = %id, "Failed to load history: {}", e);
                // An empty list would restart sequence numbers at 1
                match previous {
                    Some((previous_id, messages)) => {
                        state.conversation_id = Some(previous_id);
                        state.messages = messages;
                    }
                    None => state.conversation_id = None,
                }
                Err(e.into())
            }
        }
    }

    /// Leave the active conversation; the next send creates a new one
    pub fn new_conversation(&self) -> Result<()> {
        let mut state = lock(&self.state);
        if state.is_streaming() {
            return Err(SessionError::SwitchWhileStreaming);
        }
        state.conversation_id = None;
        state.messages.clear();
        state.writer = None;
        Ok(())
    }

    /// Delete a conversation, then refresh the conversation list
    ///
    /// Deleting the active conversation stops its stream, if any, and
    /// leaves the session with no active conversation before the delete
    /// request goes out, so a send made meanwhile starts a new one.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        {
            let mut state = lock(&self.state);
            if state.conversation_id.as_deref() == Some(conversation_id) {
                state.stop_stream(None);
                state.conversation_id = None;
                state.messages.clear();
                if matches!(state.writer, Some(Writer::Reload { .. })) {
                    state.writer = None;
                }
            }
        }

        self.backend.delete_conversation(conversation_id).await?;

        lock(&self.state)
            .conversations
            .retain(|c| c.id != conversation_id);

        self.refresh_conversations().await?;
        Ok(())
    }

    /// Stop the streaming response and close its connection
    ///
    /// Content received so far stays in the message list. Returns false if
    /// nothing was streaming.
    pub fn stop(&self) -> bool {
        lock(&self.state).stop_stream(None)
    }

    pub async fn rename_conversation(&self, conversation_id: &str, title: &str) -> Result<()> {
        self.backend
            .rename_conversation(conversation_id, title)
            .await?;

        let mut state = lock(&self.state);
        if let Some(conversation) = state
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
        {
            conversation.title = title.to_string();
        }
        Ok(())
    }

    async fn refresh_if_created(&self, created: bool) {
        if created {
            if let Err(e) = self.refresh_conversations().await {
                tracing::warn!("Failed to refresh conversations: {}", e);
            }
        }
    }

    /// Fetch the first page of conversations
    pub async fn refresh_conversations(&self) -> Result<Vec<Conversation>> {
        let conversations = self
            .backend
            .list_conversations(1, DEFAULT_PAGE_SIZE)
            .await?;
        lock(&self.state).conversations = conversations.clone();
        Ok(conversations)
    }
}
