//! Outbound splitting.

use bytes::Bytes;

/// One slice of an outbound payload.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingChunk {
    pub index: usize,
    /// Byte offset of this slice in the full payload.
    pub offset: usize,
    pub is_final: bool,
    pub payload: Bytes,
}

/// Split `data` into consecutive chunks of at most `max` bytes.
/// Empty input yields no chunks. `max == 0` means no limit.
pub fn split(data: Bytes, max: usize) -> Vec<OutgoingChunk> {
    if data.is_empty() {
        return Vec::new();
    }
    let max = if max == 0 { data.len() } else { max };
    let count = data.len().div_ceil(max);
    (0..count)
        .map(|index| {
            let offset = index * max;
            let end = (offset + max).min(data.len());
            OutgoingChunk {
                index,
                offset,
                is_final: index + 1 == count,
                payload: data.slice(offset..end),
            }
        })
        .collect()
}
