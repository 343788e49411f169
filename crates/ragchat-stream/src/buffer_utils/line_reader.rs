use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

use super::buffering::LineBuffer;
use crate::error::{Result, StreamError};

pub type LineStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Turn a chunked byte stream into complete lines
///
/// The returned stream is finite and cannot be restarted. The first transport
/// error is yielded once and ends the stream. At end of input any unterminated
/// trailing text is discarded, never emitted.
pub fn read_lines<S, B, E>(stream: S) -> LineStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(stream);
        let mut buffer = LineBuffer::with_capacity(8192);

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line) = buffer.next_line() {
                        yield Ok(line);
                    }
                }
                Err(e) => {
                    yield Err(StreamError::Transport(e.to_string()));
                    break;
                }
            }
        }

        let discarded = buffer.discard_remainder();
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "Discarding unterminated line at end of stream");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    async fn collect(chunks: Vec<&'static [u8]>) -> Vec<Result<String>> {
        let source = stream::iter(chunks.into_iter().map(Ok::<_, String>));
        read_lines(source).collect().await
    }

    #[tokio::test]
    async fn test_lines_across_chunks() {
        let lines = collect(vec![&b"data: a"[..], &b"bc\ndata:"[..], &b" d\n"[..]]).await;

        assert_eq!(
            lines,
            vec![Ok("data: abc".to_string()), Ok("data: d".to_string())]
        );
    }

    #[tokio::test]
    async fn test_trailing_line_is_discarded() {
        let lines = collect(vec![&b"one\ntwo"[..]]).await;
        assert_eq!(lines, vec![Ok("one".to_string())]);
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let source = stream::iter(vec![
            Ok(b"first\n".to_vec()),
            Err("connection reset".to_string()),
            Ok(b"never\n".to_vec()),
        ]);

        let lines: Vec<_> = read_lines(source).collect().await;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], Ok("first".to_string()));
        assert_eq!(
            lines[1],
            Err(StreamError::Transport("connection reset".to_string()))
        );
    }
}
