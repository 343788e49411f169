pub mod accumulator;
pub mod error;
pub mod handle;
pub mod session;

mod driver;
mod state;

pub use accumulator::{AccumulatorState, Applied, MessageAccumulator};
pub use error::{Result, SessionError};
pub use handle::{SessionUpdate, StreamHandle, StreamOutcome};
pub use session::{ConversationSession, DEFAULT_PAGE_SIZE};
