//! Incremental JSON record decoding
//!
//! Input is either one top-level array whose elements are records, or a
//! sequence of whitespace-separated JSON values. Decoding runs on a blocking
//! thread and hands records over a bounded channel: when the consumer stops
//! polling, the channel fills and the decoder blocks, so memory stays bounded
//! regardless of input size.

use futures::Stream;
use serde::de::{Deserializer as _, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;
use std::io::{self, BufRead, BufReader, Read};
use std::pin::Pin;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to read import source: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed JSON in import source: {0}")]
    Json(#[from] serde_json::Error),
}

type Item = Result<Value, DecodeError>;

/// Records decoded from a byte source, consumed exactly once
pub struct RecordStream {
    rx: mpsc::Receiver<Item>,
    capacity: usize,
}

impl RecordStream {
    /// Number of records the decoder may run ahead of the consumer
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Stream for RecordStream {
    type Item = Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Item>> {
        self.rx.poll_recv(cx)
    }
}

impl fmt::Debug for RecordStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("capacity", &self.capacity())
            .finish()
    }
}

/// Start decoding `reader` on a blocking thread
///
/// Must be called from within a Tokio runtime. At most `capacity` decoded
/// records wait in the hand-off buffer.
pub fn decode_json_records<R>(reader: R, capacity: usize) -> RecordStream
where
    R: Read + Send + 'static,
{
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);

    tokio::task::spawn_blocking(move || {
        if let Err(e) = forward_records(BufReader::new(reader), &tx) {
            // The consumer may already be gone
            let _ = tx.blocking_send(Err(e));
        }
    });

    RecordStream { rx, capacity }
}

fn forward_records<R: BufRead>(
    mut reader: R,
    tx: &mpsc::Sender<Item>,
) -> Result<(), DecodeError> {
    match first_significant_byte(&mut reader)? {
        None => Ok(()),
        Some(b'[') => {
            let mut de = serde_json::Deserializer::from_reader(reader);
            let completed = de.deserialize_seq(ForwardElements { tx })?;
            if completed {
                de.end()?;
            }
            Ok(())
        },
        Some(_) => {
            for record in serde_json::Deserializer::from_reader(reader).into_iter::<Value>() {
                if tx.blocking_send(Ok(record?)).is_err() {
                    break;
                }
            }
            Ok(())
        },
    }
}

/// Skip leading whitespace and peek at the first byte of the document
fn first_significant_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        let (skip, found) = {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                return Ok(None);
            }
            match buf.iter().position(|b| !b.is_ascii_whitespace()) {
                Some(index) => (index, Some(buf[index])),
                None => (buf.len(), None),
            }
        };
        reader.consume(skip);
        if found.is_some() {
            return Ok(found);
        }
    }
}

/// Sends array elements one by one instead of collecting them
struct ForwardElements<'a> {
    tx: &'a mpsc::Sender<Item>,
}

impl<'de> Visitor<'de> for ForwardElements<'_> {
    /// `false` when the consumer went away before the end of the array
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of JSON records")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<bool, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(record) = seq.next_element::<Value>()? {
            if self.tx.blocking_send(Ok(record)).is_err() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use std::io::Cursor;

    async fn decode_all(input: &'static str) -> Vec<Item> {
        decode_json_records(Cursor::new(input.as_bytes()), 4).collect().await
    }

    #[tokio::test]
    async fn test_top_level_array() {
        let items = decode_all(r#"  [{"a": 1}, {"a": 2}, 3]  "#).await;
        let values: Vec<_> = items.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2}), json!(3)]);
    }

    #[tokio::test]
    async fn test_concatenated_values() {
        let items = decode_all("{\"a\": 1}\n{\"a\": 2}\n").await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_empty_input_yields_nothing() {
        assert!(decode_all("").await.is_empty());
        assert!(decode_all(" \n\t ").await.is_empty());
        assert!(decode_all("[]").await.is_empty());
    }

    #[tokio::test]
    async fn test_error_after_valid_records() {
        let items = decode_all(r#"[{"a": 1}, {"a": "#).await;
        assert!(items[0].is_ok());
        assert!(matches!(items.last(), Some(Err(DecodeError::Json(_)))));
    }

    #[tokio::test]
    async fn test_trailing_garbage_after_array() {
        let items = decode_all(r#"[{"a": 1}] x"#).await;
        assert!(items[0].is_ok());
        assert!(matches!(items.last(), Some(Err(DecodeError::Json(_)))));
    }

    #[tokio::test]
    async fn test_decoder_waits_for_consumer() {
        let input: String = (0..100).map(|i| format!("{{\"n\": {}}}\n", i)).collect();
        let mut stream = decode_json_records(Cursor::new(input.into_bytes()), 2);

        // Let the decoder run ahead as far as it can
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(stream.rx.len() <= 2);

        let mut count = 0;
        while let Some(item) = stream.next().await {
            assert_eq!(item.unwrap()["n"], json!(count));
            count += 1;
        }
        assert_eq!(count, 100);
    }
}
