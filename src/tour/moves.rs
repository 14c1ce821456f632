//! Local moves on a circular visiting order.
//!
//! Positions are indices into the order; `a` is the city before the
//! segment `b..=c`, `d` the one after it.
//!
//! ```text
//! three-way                         reversal
//!  b-------a        b       a        c..b       c..b
//!  .       .   =>   .\     /.         \/    =>  |  |
//!  . d...e .        . e...d .         /\        |  |
//!  ./     \.        .       .        a  d       a  d
//!  c       f        c-------f
//! ```

use super::rng::TourRng;
use crate::matrix::CostMatrix;

/// A segment `start..=end` of the circular order, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment {
    pub start: usize,
    pub end: usize,
    /// Cities outside the segment.
    pub outside: usize,
}

fn before(i: usize, n: usize) -> usize {
    (i + n - 1) % n
}

fn after(i: usize, n: usize) -> usize {
    (i + 1) % n
}

/// Samples a segment leaving at least two cities on each side.
pub(crate) fn sample_segment(rng: &mut TourRng, n: usize) -> Segment {
    loop {
        let start = rng.below(n);
        let mut end = rng.below(n);
        if start == end {
            end = after(start, n);
        }
        let inside = (end + n - start) % n + 1;
        let outside = n - inside;
        if inside >= 2 && outside >= 2 {
            return Segment {
                start,
                end,
                outside,
            };
        }
    }
}

/// Samples the insertion point `e` outside `segment` for a three-way move,
/// never the city right before the segment.
pub(crate) fn sample_insertion(rng: &mut TourRng, segment: Segment, n: usize) -> usize {
    loop {
        let e = (rng.below(segment.outside) + segment.end + 1) % n;
        if segment.start != after(e, n) {
            return e;
        }
    }
}

/// Length of the closed tour.
pub(crate) fn tour_length(matrix: &CostMatrix, order: &[usize]) -> f64 {
    let n = order.len();
    (0..n).map(|i| matrix[(order[i], order[after(i, n)])]).sum()
}

/// Cost change of moving `b..=c` between `e` and `f`.
pub(crate) fn three_way_delta(matrix: &CostMatrix, order: &[usize], segment: Segment, e: usize) -> f64 {
    let n = order.len();
    let a = order[before(segment.start, n)];
    let b = order[segment.start];
    let c = order[segment.end];
    let d = order[after(segment.end, n)];
    let f = order[after(e, n)];
    let e = order[e];
    matrix[(a, d)] + matrix[(e, b)] + matrix[(c, f)]
        - (matrix[(a, b)] + matrix[(c, d)] + matrix[(e, f)])
}

/// Rewrites the order as `[b..c][f..a][d..e]`.
pub(crate) fn apply_three_way(order: &mut Vec<usize>, segment: Segment, e: usize, scratch: &mut Vec<usize>) {
    let n = order.len();
    let a = before(segment.start, n);
    let b = segment.start;
    let c = segment.end;
    let d = after(c, n);
    let f = after(e, n);

    scratch.clear();
    for (from, to) in [(b, c), (f, a), (d, e)] {
        let len = (to + n - from) % n + 1;
        scratch.extend((0..len).map(|i| order[(from + i) % n]));
    }
    std::mem::swap(order, scratch);
}

/// Cost change of reversing `b..=c`.
pub(crate) fn reverse_delta(matrix: &CostMatrix, order: &[usize], segment: Segment) -> f64 {
    let n = order.len();
    let a = order[before(segment.start, n)];
    let b = order[segment.start];
    let c = order[segment.end];
    let d = order[after(segment.end, n)];
    matrix[(a, c)] + matrix[(b, d)] - (matrix[(a, b)] + matrix[(c, d)])
}

/// Reverses `b..=c` in place, wrapping around the end of the order.
pub(crate) fn apply_reverse(order: &mut [usize], segment: Segment) {
    let n = order.len();
    let swaps = ((segment.end + n - segment.start) % n + 1) / 2;
    for i in 0..swaps {
        let first = (segment.start + i) % n;
        let last = (segment.end + n - i) % n;
        order.swap(first, last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> CostMatrix {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        CostMatrix::from_rows(rows).unwrap()
    }

    fn segment(start: usize, end: usize, n: usize) -> Segment {
        let inside = (end + n - start) % n + 1;
        Segment {
            start,
            end,
            outside: n - inside,
        }
    }

    #[test]
    fn test_reverse_wraps_and_matches_delta() {
        let matrix = line(6);
        let mut order = vec![0, 1, 2, 3, 4, 5];
        let seg = segment(4, 1, 6);
        let before_len = tour_length(&matrix, &order);
        let delta = reverse_delta(&matrix, &order, seg);
        apply_reverse(&mut order, seg);
        assert_eq!(order, vec![5, 4, 2, 3, 1, 0]);
        assert!((tour_length(&matrix, &order) - (before_len + delta)).abs() < 1e-12);
    }

    #[test]
    fn test_three_way_order_and_delta() {
        let matrix = line(7);
        let mut order = vec![0, 1, 2, 3, 4, 5, 6];
        let seg = segment(1, 2, 7);
        let before_len = tour_length(&matrix, &order);
        let delta = three_way_delta(&matrix, &order, seg, 4);
        let mut scratch = Vec::new();
        apply_three_way(&mut order, seg, 4, &mut scratch);
        // [b..c] [f..a] [d..e]
        assert_eq!(order, vec![1, 2, 5, 6, 0, 3, 4]);
        assert!((tour_length(&matrix, &order) - (before_len + delta)).abs() < 1e-12);
    }

    #[test]
    fn test_sampled_segments_leave_two_outside() {
        let mut rng = TourRng::default();
        for n in 4..12 {
            for _ in 0..200 {
                let seg = sample_segment(&mut rng, n);
                let inside = (seg.end + n - seg.start) % n + 1;
                assert!(inside >= 2 && seg.outside >= 2);
                assert_eq!(inside + seg.outside, n);
                let e = sample_insertion(&mut rng, seg, n);
                assert_ne!(after(e, n), seg.start);
            }
        }
    }
}
