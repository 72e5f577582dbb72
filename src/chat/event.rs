use crate::core::message::Message;

/// Progress of one send/reply exchange, delivered on the channel returned by
/// [`super::ChatOrchestrator::send`].
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// User message persisted, reply scheduled.
    Started { session_id: String },
    /// Assistant reply appended to the originating session.
    Reply { message: Message },
    /// Pending reply cancelled by a session switch.
    Cancelled { session_id: String },
    Error { error: String },
}
