use futures::{Stream, StreamExt};
use ragchat_types::StreamEvent;
use std::fmt::Display;
use std::pin::Pin;

use super::line_reader::read_lines;
use crate::decoder::{decode_line, FrameDecoder};
use crate::error::Result;

pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Frame reader and event decoder chained over a raw byte stream
///
/// Events come out strictly in arrival order. Lines that decode to nothing
/// (keep-alives, `[DONE]`, malformed frames) are skipped; only the end of the
/// byte stream or a transport error ends the event stream.
pub fn parse_event_stream<S, B, E, D>(stream: S, decoder: D) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
    D: FrameDecoder + 'static,
{
    let mut lines = read_lines(stream);

    Box::pin(async_stream::stream! {
        while let Some(line_result) = lines.next().await {
            match line_result {
                Ok(line) => {
                    if let Some(event) = decode_line(&decoder, &line) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    })
}
