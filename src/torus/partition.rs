//! Row partitioning for the update and render phases.
//!
//! Both phases split `[0, height)` the same way: contiguous ranges, one per
//! worker, the last absorbing the division remainder. Each range is handed a
//! disjoint `&mut` slice of the output buffer, so workers never share a write
//! target.

/// Half-open row interval `[start, end)` owned by one worker for one phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowRange {
    pub start: usize,
    pub end: usize,
}

impl RowRange {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn rows(self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, height)` into exactly `worker_count` ranges.
///
/// When `worker_count > height` every range but the last is empty.
pub fn partition_rows(height: usize, worker_count: usize) -> Vec<RowRange> {
    assert!(worker_count > 0, "worker_count must be positive");
    let rows_per_worker = height / worker_count;
    (0..worker_count)
        .map(|i| {
            let start = i * rows_per_worker;
            let end = if i == worker_count - 1 {
                height
            } else {
                start + rows_per_worker
            };
            RowRange::new(start, end)
        })
        .collect()
}

/// Carve `buf` into one mutable slice per range, `row_len` elements per row.
///
/// `ranges` must be contiguous and start at row 0, as produced by
/// [`partition_rows`].
pub fn split_rows_mut<'a, T>(
    buf: &'a mut [T],
    row_len: usize,
    ranges: &[RowRange],
) -> Vec<(RowRange, &'a mut [T])> {
    let mut out = Vec::with_capacity(ranges.len());
    let mut rest = buf;
    let mut cursor = 0usize;
    for &range in ranges {
        debug_assert_eq!(range.start, cursor, "ranges must be contiguous");
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * row_len);
        out.push((range, head));
        rest = tail;
        cursor = range.end;
    }
    debug_assert!(rest.is_empty(), "ranges must cover the whole buffer");
    out
}

#[cfg(test)]
mod tests {
    use super::{RowRange, partition_rows, split_rows_mut};

    fn assert_exact_cover(height: usize, workers: usize) {
        let ranges = partition_rows(height, workers);
        assert_eq!(ranges.len(), workers, "height={height} workers={workers}");
        let mut covered = vec![0u32; height];
        let mut cursor = 0;
        for range in &ranges {
            assert_eq!(range.start, cursor, "height={height} workers={workers}");
            assert!(range.start <= range.end);
            for y in range.rows() {
                covered[y] += 1;
            }
            cursor = range.end;
        }
        assert_eq!(cursor, height);
        assert!(covered.iter().all(|&c| c == 1));
    }

    #[test]
    fn partition_covers_every_row_exactly_once() {
        for height in 1..=70 {
            for workers in 1..=17 {
                assert_exact_cover(height, workers);
            }
        }
        assert_exact_cover(1080, 12);
        assert_exact_cover(2160, 64);
    }

    #[test]
    fn last_range_absorbs_remainder() {
        let ranges = partition_rows(10, 3);
        assert_eq!(
            ranges,
            vec![RowRange::new(0, 3), RowRange::new(3, 6), RowRange::new(6, 10)]
        );
    }

    #[test]
    fn more_workers_than_rows_yields_empty_ranges() {
        let ranges = partition_rows(3, 8);
        assert_eq!(ranges.len(), 8);
        assert!(ranges[..7].iter().all(|r| r.is_empty()));
        assert_eq!(ranges[7], RowRange::new(0, 3));
    }

    #[test]
    #[should_panic(expected = "worker_count must be positive")]
    fn zero_workers_is_rejected() {
        partition_rows(4, 0);
    }

    #[test]
    fn split_rows_mut_hands_out_disjoint_row_slices() {
        let width = 4;
        let mut buf = vec![0u8; width * 7];
        let ranges = partition_rows(7, 3);
        for (range, chunk) in split_rows_mut(&mut buf, width, &ranges) {
            assert_eq!(chunk.len(), range.len() * width);
            chunk.fill(range.start as u8 + 1);
        }
        assert_eq!(&buf[..8], &[1; 8]);
        assert_eq!(&buf[8..16], &[3; 8]);
        assert_eq!(&buf[16..], &[5; 12]);
    }
}
