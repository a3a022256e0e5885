//! Bounded delay line that drops the last N records of a stream.
//!
//! Each pushed record displaces the one stored N pushes earlier. Whatever is
//! still resident when the stream ends is the trimmed tail and is never
//! emitted. Memory stays at N records regardless of stream length.

use crate::record::Record;

#[derive(Debug, Clone)]
pub struct TailTrimBuffer {
    slots: Vec<Option<Record>>,
    cursor: usize,
}

impl TailTrimBuffer {
    /// A buffer holding back `capacity` records. Zero disables the delay.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Records currently held back.
    pub fn resident(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Admit `record`; returns the record that is now old enough to emit.
    ///
    /// With zero capacity the record comes straight back.
    pub fn push(&mut self, record: Record) -> Option<Record> {
        if self.slots.is_empty() {
            return Some(record);
        }
        let released = self.slots[self.cursor].replace(record);
        self.cursor = (self.cursor + 1) % self.slots.len();
        released
    }

    /// Discard the held-back tail, returning how many records were dropped.
    pub fn discard(self) -> usize {
        self.resident()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rec(s: &str) -> Record {
        Record::from_fields([s])
    }

    fn run(n: usize, k: usize) -> Vec<Record> {
        let mut buffer = TailTrimBuffer::new(k);
        (0..n)
            .filter_map(|i| buffer.push(rec(&i.to_string())))
            .collect()
    }

    #[test]
    fn test_zero_capacity_passes_through() {
        let mut buffer = TailTrimBuffer::new(0);
        assert_eq!(buffer.push(rec("a")), Some(rec("a")));
        assert_eq!(buffer.discard(), 0);
    }

    #[test]
    fn test_delays_by_capacity() {
        let mut buffer = TailTrimBuffer::new(2);
        assert_eq!(buffer.push(rec("a")), None);
        assert_eq!(buffer.push(rec("b")), None);
        assert_eq!(buffer.push(rec("c")), Some(rec("a")));
        assert_eq!(buffer.push(rec("d")), Some(rec("b")));
        assert_eq!(buffer.resident(), 2);
        assert_eq!(buffer.discard(), 2);
    }

    #[test]
    fn test_keeps_first_n_minus_k_in_order() {
        let out = run(5, 2);
        assert_eq!(out, vec![rec("0"), rec("1"), rec("2")]);
    }

    #[test]
    fn test_short_stream_is_empty() {
        assert!(run(2, 3).is_empty());
        assert!(run(3, 3).is_empty());
    }

    proptest! {
        #[test]
        fn test_emits_exactly_n_minus_k(n in 0usize..60, k in 0usize..20) {
            let out = run(n, k);
            prop_assert_eq!(out.len(), n.saturating_sub(k));
            for (i, r) in out.iter().enumerate() {
                let want = i.to_string();
                prop_assert_eq!(r.field(0), Some(want.as_str()));
            }
        }
    }
}
