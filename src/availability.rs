//! Free-interval computation: the complement of busy time within a window.

use chrono::{DateTime, Duration, Utc};

use crate::interval::{BusyInterval, TimeInterval};

/// Normalize busy intervals: sort by start and merge any pair that overlaps or
/// sits closer together than `min_gap`.
///
/// Ties on start break longer-interval-first, which keeps the merge stable and
/// the output deterministic for any input ordering.
pub fn merge_busy(busy: &[BusyInterval], min_gap: Duration) -> Vec<TimeInterval> {
    let mut spans: Vec<TimeInterval> = busy.iter().map(|b| b.interval).collect();
    spans.sort_by(|a, b| {
        a.start()
            .cmp(&b.start())
            .then_with(|| b.end().cmp(&a.end()))
    });

    let mut merged: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::new();
    for span in spans {
        match merged.last_mut() {
            Some((_, end)) if span.start() - *end < min_gap => {
                if span.end() > *end {
                    *end = span.end();
                }
            }
            _ => merged.push((span.start(), span.end())),
        }
    }

    merged
        .into_iter()
        .filter_map(|(start, end)| TimeInterval::new(start, end).ok())
        .collect()
}

/// The free intervals of a search window, given the busy intervals inside it.
///
/// Construction normalizes the busy set once; iteration is lazy and the value
/// is restartable — `iter()` may be called any number of times and always
/// walks the same ordered sequence.
///
/// Each free interval is shrunk by `min_gap` on any side it shares with a busy
/// neighbor, but never at the window's own bounds.
#[derive(Debug, Clone)]
pub struct FreeSlots {
    window: TimeInterval,
    busy_blocks: Vec<TimeInterval>,
    min_gap: Duration,
}

impl FreeSlots {
    pub fn new(window: TimeInterval, busy: &[BusyInterval], min_gap: Duration) -> Self {
        let busy_blocks = merge_busy(busy, min_gap)
            .into_iter()
            .filter(|b| b.overlaps(&window))
            .collect();
        Self {
            window,
            busy_blocks,
            min_gap,
        }
    }

    pub fn window(&self) -> TimeInterval {
        self.window
    }

    /// Merged busy blocks overlapping the window, in start order.
    pub fn busy_blocks(&self) -> &[TimeInterval] {
        &self.busy_blocks
    }

    pub fn iter(&self) -> FreeSlotIter<'_> {
        FreeSlotIter {
            slots: self,
            cursor: self.window.start(),
            next_block: 0,
            done: false,
        }
    }
}

impl<'a> IntoIterator for &'a FreeSlots {
    type Item = TimeInterval;
    type IntoIter = FreeSlotIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over the complement of the busy blocks.
#[derive(Debug, Clone)]
pub struct FreeSlotIter<'a> {
    slots: &'a FreeSlots,
    cursor: DateTime<Utc>,
    next_block: usize,
    done: bool,
}

impl Iterator for FreeSlotIter<'_> {
    type Item = TimeInterval;

    fn next(&mut self) -> Option<TimeInterval> {
        let window = self.slots.window;
        let min_gap = self.slots.min_gap;

        while !self.done {
            match self.slots.busy_blocks.get(self.next_block) {
                Some(block) => {
                    self.next_block += 1;
                    let lo = self.cursor;
                    // Shrink the side facing the busy block, clamp to the window.
                    let hi = (block.start() - min_gap).min(window.end());
                    self.cursor = self.cursor.max(block.end() + min_gap);
                    if let Ok(free) = TimeInterval::new(lo, hi) {
                        return Some(free);
                    }
                }
                None => {
                    self.done = true;
                    // Tail up to the window's true bound, no shrink there.
                    if let Ok(free) = TimeInterval::new(self.cursor, window.end()) {
                        return Some(free);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, h, m, 0).unwrap()
    }

    fn span(sh: u32, sm: u32, eh: u32, em: u32) -> TimeInterval {
        TimeInterval::new(at(sh, sm), at(eh, em)).unwrap()
    }

    fn busy(intervals: &[TimeInterval]) -> Vec<BusyInterval> {
        intervals
            .iter()
            .enumerate()
            .map(|(i, iv)| BusyInterval::new(*iv, format!("evt-{i}")))
            .collect()
    }

    #[test]
    fn empty_busy_list_yields_whole_window() {
        let window = span(9, 0, 17, 0);
        let free = FreeSlots::new(window, &[], Duration::minutes(15));
        let slots: Vec<_> = free.iter().collect();
        assert_eq!(slots, vec![window]);
    }

    #[test]
    fn fully_covered_window_yields_nothing() {
        let window = span(9, 0, 17, 0);
        let free = FreeSlots::new(window, &busy(&[span(8, 0, 18, 0)]), Duration::zero());
        assert_eq!(free.iter().count(), 0);
    }

    #[test]
    fn single_busy_block_splits_window_with_buffers() {
        let window = span(9, 0, 17, 0);
        let free = FreeSlots::new(window, &busy(&[span(10, 0, 11, 0)]), Duration::minutes(15));
        let slots: Vec<_> = free.iter().collect();
        assert_eq!(slots, vec![span(9, 0, 9, 45), span(11, 15, 17, 0)]);
    }

    #[test]
    fn near_touching_intervals_merge_into_one_block() {
        // Gap of 10 minutes < 15-minute minimum: one merged block.
        let blocks = merge_busy(
            &busy(&[span(10, 0, 11, 0), span(11, 10, 12, 0)]),
            Duration::minutes(15),
        );
        assert_eq!(blocks, vec![span(10, 0, 12, 0)]);
    }

    #[test]
    fn gap_at_least_min_gap_stays_split() {
        let blocks = merge_busy(
            &busy(&[span(10, 0, 11, 0), span(11, 15, 12, 0)]),
            Duration::minutes(15),
        );
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn equal_start_prefers_longer_interval_first() {
        let blocks = merge_busy(
            &busy(&[span(10, 0, 10, 30), span(10, 0, 12, 0)]),
            Duration::zero(),
        );
        assert_eq!(blocks, vec![span(10, 0, 12, 0)]);
    }

    #[test]
    fn unsorted_input_is_normalized() {
        let free = FreeSlots::new(
            span(9, 0, 17, 0),
            &busy(&[span(14, 0, 15, 0), span(10, 0, 11, 0)]),
            Duration::zero(),
        );
        let slots: Vec<_> = free.iter().collect();
        assert_eq!(
            slots,
            vec![span(9, 0, 10, 0), span(11, 0, 14, 0), span(15, 0, 17, 0)]
        );
    }

    #[test]
    fn busy_overlapping_window_edges_is_clipped() {
        let free = FreeSlots::new(
            span(9, 0, 17, 0),
            &busy(&[span(8, 0, 9, 30), span(16, 30, 18, 0)]),
            Duration::minutes(15),
        );
        let slots: Vec<_> = free.iter().collect();
        assert_eq!(slots, vec![span(9, 45, 16, 15)]);
    }

    #[test]
    fn gap_exactly_min_gap_between_blocks_produces_no_sliver() {
        // Two blocks 15 minutes apart with a 15-minute buffer on both sides:
        // the in-between free interval shrinks to nothing and is dropped.
        let free = FreeSlots::new(
            span(9, 0, 17, 0),
            &busy(&[span(10, 0, 11, 0), span(11, 15, 12, 0)]),
            Duration::minutes(15),
        );
        let slots: Vec<_> = free.iter().collect();
        assert_eq!(slots, vec![span(9, 0, 9, 45), span(12, 15, 17, 0)]);
    }

    #[test]
    fn iteration_is_restartable() {
        let free = FreeSlots::new(
            span(9, 0, 17, 0),
            &busy(&[span(10, 0, 11, 0)]),
            Duration::minutes(15),
        );
        let first: Vec<_> = free.iter().collect();
        let second: Vec<_> = free.iter().collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn no_zero_or_negative_length_output() {
        let free = FreeSlots::new(
            span(9, 0, 17, 0),
            &busy(&[span(9, 0, 10, 0), span(10, 15, 17, 0)]),
            Duration::minutes(15),
        );
        assert_eq!(free.iter().count(), 0);
    }

    #[test]
    fn zero_gap_free_plus_busy_reconstructs_window_exactly() {
        // With min_gap = 0 the free and busy intervals tile the window with no
        // gaps, no overlaps, and no lost time.
        let window = span(9, 0, 17, 0);
        let busy_set = busy(&[span(10, 0, 11, 0), span(13, 0, 14, 30)]);
        let free = FreeSlots::new(window, &busy_set, Duration::zero());

        let mut pieces: Vec<TimeInterval> = free.iter().collect();
        pieces.extend(free.busy_blocks().iter().copied());
        pieces.sort_by_key(|iv| iv.start());

        assert_eq!(pieces.first().unwrap().start(), window.start());
        assert_eq!(pieces.last().unwrap().end(), window.end());
        for pair in pieces.windows(2) {
            assert_eq!(pair[0].end(), pair[1].start());
        }
    }
}
