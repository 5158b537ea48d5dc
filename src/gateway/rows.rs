use std::pin::Pin;

use futures_util::stream::{self, BoxStream, Stream, StreamExt};

use crate::error::SqlMiddlewareDbError;
use crate::results::JsonRow;

/// Lazily decoded rows of one response; dropping it releases the response body.
pub type RowStream = BoxStream<'static, Result<JsonRow, SqlMiddlewareDbError>>;

// `buf[start..]` is unread; `buf[start..scanned]` is known to hold no newline.
struct LineState<S> {
    body: Pin<Box<S>>,
    buf: Vec<u8>,
    start: usize,
    scanned: usize,
    finished: bool,
}

impl<S> LineState<S> {
    // Drop consumed bytes once they make up at least half the buffer, so each byte is moved
    // a bounded number of times.
    fn compact(&mut self) {
        if self.start > 0 && self.start * 2 >= self.buf.len() {
            self.buf.drain(..self.start);
            self.scanned -= self.start;
            self.start = 0;
        }
    }
}

/// Decode a `JSONEachRow` body (one JSON object per line) as it arrives.
///
/// Chunks are only pulled from `body` when the consumer asks for the next row.
pub fn json_each_row<S, B, E>(body: S) -> RowStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<SqlMiddlewareDbError> + Send + 'static,
{
    let state = LineState {
        body: Box::pin(body),
        buf: Vec::new(),
        start: 0,
        scanned: 0,
        finished: false,
    };
    stream::try_unfold(state, next_row::<S, B, E>).boxed()
}

async fn next_row<S, B, E>(
    mut state: LineState<S>,
) -> Result<Option<(JsonRow, LineState<S>)>, SqlMiddlewareDbError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<SqlMiddlewareDbError>,
{
    loop {
        if let Some(offset) = state.buf[state.scanned..].iter().position(|b| *b == b'\n') {
            let end = state.scanned + offset;
            let line = &state.buf[state.start..end];
            let row = if line.iter().all(u8::is_ascii_whitespace) {
                None
            } else {
                Some(serde_json::from_slice::<JsonRow>(line)?)
            };
            state.start = end + 1;
            state.scanned = end + 1;
            match row {
                Some(row) => return Ok(Some((row, state))),
                None => continue,
            }
        }
        state.scanned = state.buf.len();

        if state.finished {
            let rest = &state.buf[state.start..];
            if rest.iter().all(u8::is_ascii_whitespace) {
                return Ok(None);
            }
            let row: JsonRow = serde_json::from_slice(rest)?;
            state.start = state.buf.len();
            return Ok(Some((row, state)));
        }

        match state.body.next().await {
            Some(chunk) => {
                let chunk = chunk.map_err(Into::<SqlMiddlewareDbError>::into)?;
                state.compact();
                state.buf.extend_from_slice(chunk.as_ref());
            }
            None => state.finished = true,
        }
    }
}

/// Stream over rows that are already in memory.
#[must_use]
pub fn rows_from_vec(rows: Vec<JsonRow>) -> RowStream {
    stream::iter(rows.into_iter().map(Ok)).boxed()
}
