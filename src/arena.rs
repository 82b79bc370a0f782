//! A bump allocator standing in for the source's `get_mem`/`get_sarray`
//! pool API (spec §6, "Arena API consumed").
//!
//! Design Note "Arena + opaque pointers -> arena + typed indices": rather
//! than handing out untyped blocks cast to record types, the arena owns
//! typed `Vec`s directly and hands back the owned value itself, since
//! Rust's ownership already gives us the "one pipeline instance owns every
//! buffer, for the instance's whole lifetime" property spec §5 requires
//! without needing index indirection. Every controller buffer that is sized
//! once at start-of-pass and never grown afterward -- PREP's scratch rows
//! and iMCU-row relay, DMAIN's sample buffer, the decompressor's output
//! buffer -- is allocated through one of these two calls, the way the
//! source's pool allocations are all grouped in each controller's
//! start-of-pass method.
pub struct Arena;

impl Arena {
    /// Equivalent of `get_mem`: a zeroed buffer of `len` elements,
    /// allocated once and never resized.
    #[must_use]
    pub fn alloc<T: Default + Clone>(len: usize) -> Vec<T> {
        vec![T::default(); len]
    }

    /// Equivalent of `get_sarray`: `height` independent rows of `width`
    /// elements each, allocated once. Callers write into existing rows by
    /// index; the returned `Vec` is never pushed to or truncated.
    #[must_use]
    pub fn alloc_rows<T: Default + Clone>(width: usize, height: usize) -> Vec<Vec<T>> {
        vec![Self::alloc(width); height]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_rows_produces_independent_rows() {
        let mut rows: Vec<Vec<u8>> = Arena::alloc_rows(4, 3);
        rows[0].copy_from_slice(&[1, 2, 3, 4]);
        rows[1].copy_from_slice(&[5, 6, 7, 8]);
        assert_eq!(rows[0], vec![1, 2, 3, 4]);
        assert_eq!(rows[1], vec![5, 6, 7, 8]);
        assert_eq!(rows[2], vec![0, 0, 0, 0]);
    }

    #[test]
    fn alloc_zeroes_the_buffer() {
        let buf: Vec<u8> = Arena::alloc(6);
        assert_eq!(buf, vec![0u8; 6]);
    }
}
