//! Output module
//!
//! Singer message types and the sinks they are written to.
//!
//! # Overview
//!
//! - `Message` - SCHEMA / RECORD / STATE messages in Singer wire format
//! - `MessageSink` - where the sync engine sends messages (stdout in the
//!   binary, memory in tests)
//! - `JsonLinesSink` - one JSON document per line on any `io::Write`
//! - `MemorySink` - collects messages for inspection

mod message;
mod sink;

pub use message::Message;
pub use sink::{JsonLinesSink, MemorySink, MessageSink};
