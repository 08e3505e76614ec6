//! Message sinks

use super::message::Message;
use crate::error::Result;
use crate::state::SyncState;
use crate::types::{JsonValue, Record};
use std::io::Write;

/// Destination for Singer messages
///
/// The sync engine persists state only through this trait, so substituting
/// a `MemorySink` makes a whole run observable in tests.
pub trait MessageSink: Send {
    /// Write one message
    fn emit(&mut self, message: Message) -> Result<()>;

    /// Write a SCHEMA message
    fn write_schema(
        &mut self,
        stream: &str,
        schema: &JsonValue,
        key_properties: &[String],
        bookmark_properties: &[String],
    ) -> Result<()> {
        self.emit(Message::schema(
            stream,
            schema.clone(),
            key_properties.to_vec(),
            bookmark_properties.to_vec(),
        ))
    }

    /// Write a RECORD message
    fn write_record(&mut self, stream: &str, record: Record) -> Result<()> {
        self.emit(Message::record(stream, record))
    }

    /// Write a STATE message with a full snapshot
    fn write_state(&mut self, state: &SyncState) -> Result<()> {
        self.emit(Message::state(state.to_value()?))
    }
}

/// Writes each message as one JSON line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink over a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of messages written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Unwrap the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> MessageSink for JsonLinesSink<W> {
    fn emit(&mut self, message: Message) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        // Downstream targets read line by line
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Collects messages in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    messages: Vec<Message>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages in emission order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records emitted for a stream, in order
    pub fn records(&self, stream: &str) -> Vec<&Record> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::Record {
                    stream: s, record, ..
                } if s == stream => Some(record),
                _ => None,
            })
            .collect()
    }

    /// Number of SCHEMA messages emitted for a stream
    pub fn schema_count(&self, stream: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_schema() && m.stream() == Some(stream))
            .count()
    }

    /// Every STATE snapshot, in order
    pub fn states(&self) -> Vec<&JsonValue> {
        self.messages
            .iter()
            .filter_map(|m| match m {
                Message::State { value } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// The last STATE snapshot
    pub fn last_state(&self) -> Option<&JsonValue> {
        self.states().last().copied()
    }
}

impl MessageSink for MemorySink {
    fn emit(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}
