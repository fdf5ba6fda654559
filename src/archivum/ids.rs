//! Source identifiers.
//!
//! An id is the decimal concatenation of a node discriminator, the wall clock
//! narrowed to ten digits of Unix seconds and a three digit sequence number:
//!
//! ```text
//! node | seconds mod 10^10 | seq (000-999)
//!   1    1760000000          042          -> 11760000000042
//! ```
//!
//! The counter starts at zero in every process. Before a batch, the caller
//! reports the highest id already stored for this node with
//! [`IdGenerator::observe`]. If that id falls in the current second, the
//! sequence resumes after it, so a restart within one second cannot hand
//! out an id that is already taken.
//!
//! More than a thousand ids within one second can still collide. The
//! `sources` primary key turns such a collision into a failed upload batch
//! instead of a silent overwrite.

use chrono::Utc;

const SEQ_SPAN: i64 = 1_000;
const TIME_SPAN: i64 = 10_000_000_000;

#[derive(Debug)]
pub struct IdGenerator {
    node: u8,
    seq: i64,
    last_taken: Option<i64>,
}

impl IdGenerator {
    pub fn new(node: u8) -> Self {
        Self {
            node,
            seq: 0,
            last_taken: None,
        }
    }

    /// Inclusive id range owned by this node.
    pub fn node_range(&self) -> (i64, i64) {
        let low = compose(self.node, 0, 0);
        (low, low + TIME_SPAN * SEQ_SPAN - 1)
    }

    /// Record an id known to be in use.
    pub fn observe(&mut self, id: i64) {
        self.last_taken = Some(self.last_taken.map_or(id, |last| last.max(id)));
    }

    pub fn next_id(&mut self) -> i64 {
        self.next_at(Utc::now().timestamp())
    }

    /// Builds an id for the given Unix time. Advances the wrapping counter.
    pub fn next_at(&mut self, unix_secs: i64) -> i64 {
        if let Some(last) = self.last_taken {
            let last_seq = last.rem_euclid(SEQ_SPAN);
            let resume = last_seq + 1;
            if last - last_seq == compose(self.node, unix_secs, 0)
                && self.seq < resume
                && resume < SEQ_SPAN
            {
                self.seq = resume;
            }
        }
        let seq = self.seq;
        self.seq = (self.seq + 1) % SEQ_SPAN;
        compose(self.node, unix_secs, seq)
    }
}

fn compose(node: u8, unix_secs: i64, seq: i64) -> i64 {
    let narrowed = unix_secs.rem_euclid(TIME_SPAN);
    (i64::from(node) * TIME_SPAN + narrowed) * SEQ_SPAN + seq
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_node_time_and_sequence() {
        let mut ids = IdGenerator::new(1);
        assert_eq!(ids.next_at(1_760_000_000), 11_760_000_000_000);
        assert_eq!(ids.next_at(1_760_000_000), 11_760_000_000_001);
    }

    #[test]
    fn sequence_wraps_after_999() {
        let mut ids = IdGenerator::new(2);
        for _ in 0..999 {
            ids.next_at(5);
        }
        assert_eq!(ids.next_at(5), 20_000_000_005_999);
        assert_eq!(ids.next_at(5), 20_000_000_005_000);
    }

    #[test]
    fn ids_in_one_batch_are_distinct() {
        let mut ids = IdGenerator::new(1);
        let batch: Vec<i64> = (0..50).map(|_| ids.next_id()).collect();
        let mut deduped = batch.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), batch.len());
    }

    #[test]
    fn resumes_after_observed_id_in_same_second() {
        let mut ids = IdGenerator::new(1);
        ids.observe(11_760_000_000_004);
        assert_eq!(ids.next_at(1_760_000_000), 11_760_000_000_005);
        assert_eq!(ids.next_at(1_760_000_000), 11_760_000_000_006);
    }

    #[test]
    fn observed_id_from_another_second_is_ignored() {
        let mut ids = IdGenerator::new(1);
        ids.observe(11_759_999_999_004);
        assert_eq!(ids.next_at(1_760_000_000), 11_760_000_000_000);
    }

    #[test]
    fn node_range_covers_generated_ids() {
        let mut ids = IdGenerator::new(3);
        let (low, high) = ids.node_range();
        let id = ids.next_at(1_760_000_000);
        assert!(low <= id && id <= high);
        assert!(IdGenerator::new(2).node_range().1 < low);
    }

    #[test]
    fn largest_node_fits_in_i64() {
        let mut ids = IdGenerator::new(u8::MAX);
        assert!(ids.next_at(TIME_SPAN - 1) > 0);
    }
}
