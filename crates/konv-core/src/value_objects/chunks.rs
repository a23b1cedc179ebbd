//! Message chunking
//!
//! Splits an outbound message into transport-sized pieces. Lengths are counted
//! in UTF-16 code units, the unit Telegram measures its message limit in. A
//! chunk boundary never falls inside a character, so a surrogate pair always
//! stays in one chunk.

/// Maximum chunk length accepted by the transport (Telegram message limit)
pub const MAX_CHUNK_SIZE: usize = 4096;

/// Split `message` into consecutive, non-overlapping chunks of at most
/// `max_len` UTF-16 code units, left to right.
///
/// A chunk is cut before the character that would overflow `max_len`, so a
/// chunk holding astral-plane characters may end one unit short of the limit.
/// Every chunk holds at least one character, even when that character alone
/// exceeds `max_len`. An empty message yields exactly one empty chunk; the
/// result is never empty. A `max_len` of zero is treated as one.
#[must_use]
pub fn split_into_chunks(message: &str, max_len: usize) -> Vec<&str> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::with_capacity(message.len() / max_len + 1);
    let mut start = 0;
    let mut units = 0;

    for (offset, c) in message.char_indices() {
        let width = c.len_utf16();
        if units > 0 && units + width > max_len {
            chunks.push(&message[start..offset]);
            start = offset;
            units = 0;
        }
        units += width;
    }

    // Remainder; for an empty message this is the single empty chunk
    chunks.push(&message[start..]);
    chunks
}
