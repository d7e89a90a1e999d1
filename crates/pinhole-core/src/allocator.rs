use crate::short_id::ShortId;

/// Identifier allocator for newly stored URLs.
///
/// The next identifier is derived from the number of records already stored
/// (`count + 1`), so allocation must happen inside the same critical section
/// that inserts the record. Allocation is deterministic: there is no
/// randomness and no reuse.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialAllocator;

impl SequentialAllocator {
    /// Creates a new allocator.
    pub fn new() -> Self {
        Self
    }

    /// Allocates the identifier that follows `stored` records.
    ///
    /// `is_taken` reports identifiers already in use. A contiguous store never
    /// hits a taken id; a snapshot with holes does, and the allocator then
    /// advances to the next free value.
    pub fn allocate(&self, stored: usize, is_taken: impl Fn(&ShortId) -> bool) -> ShortId {
        let mut sequence = stored as u64 + 1;
        loop {
            let candidate = ShortId::from_sequence(sequence);
            if !is_taken(&candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }
}
