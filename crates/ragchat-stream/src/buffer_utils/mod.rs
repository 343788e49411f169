mod buffering;
mod line_reader;
mod sse_parser;

pub use buffering::LineBuffer;
pub use line_reader::{read_lines, LineStream};
pub use sse_parser::{parse_event_stream, EventStream};
