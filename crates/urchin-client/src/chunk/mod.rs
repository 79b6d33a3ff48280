//! Chunked transfer: splitting large outbound payloads and reassembling
//! inbound ones.

pub mod receive;
pub mod send;

pub use receive::{Reassembler, TransferError};
pub use send::{split, OutgoingChunk};
