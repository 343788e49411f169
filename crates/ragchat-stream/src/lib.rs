pub mod buffer_utils;
pub mod decoder;
pub mod error;

pub use buffer_utils::{parse_event_stream, read_lines, LineBuffer, LineStream};
pub use decoder::{decode_line, ChatFrameDecoder, FrameDecoder, DATA_PREFIX, DONE_MARKER};
pub use error::{Result, StreamError};
