// Search schemes for bidirectional approximate search
//
// A scheme splits the query into blocks, visits them in the order `pi`
// starting from block `pi[0]` and growing outwards, and bounds the errors
// accumulated after each visited block between `lower` and `upper`. Running
// every scheme of a set covers every error distribution within the total.
//
// The search state tracks the covered query range as the open interval
// (lb, rb) in 1-based query coordinates: position 0 and `len + 1` are the
// outer borders, so the whole query is covered at `lb == 0, rb == len + 1`.

use lazy_static::lazy_static;

use super::config::ErrorCounts;
use crate::index::BidirectionalCursor;

#[derive(Debug, Clone)]
pub struct Scheme {
    /// 1-based block order.
    pub pi: Vec<usize>,
    pub lower: Vec<u8>,
    pub upper: Vec<u8>,
}

impl Scheme {
    fn new(pi: &[usize], lower: &[u8], upper: &[u8]) -> Self {
        Self {
            pi: pi.to_vec(),
            lower: lower.to_vec(),
            upper: upper.to_vec(),
        }
    }

    pub fn blocks(&self) -> usize {
        self.pi.len()
    }
}

lazy_static! {
    /// Optimum schemes indexed by total error count.
    static ref OPTIMUM_SCHEMES: Vec<Vec<Scheme>> = vec![
        vec![Scheme::new(&[1], &[0], &[0])],
        vec![
            Scheme::new(&[1, 2], &[0, 0], &[0, 1]),
            Scheme::new(&[2, 1], &[0, 1], &[0, 1]),
        ],
        vec![
            Scheme::new(&[1, 2, 3, 4], &[0, 0, 1, 1], &[0, 0, 2, 2]),
            Scheme::new(&[3, 2, 1, 4], &[0, 0, 0, 0], &[0, 1, 1, 2]),
            Scheme::new(&[4, 3, 2, 1], &[0, 0, 0, 2], &[0, 1, 2, 2]),
        ],
        vec![
            Scheme::new(&[1, 2, 3, 4, 5], &[0, 0, 0, 0, 3], &[0, 2, 2, 3, 3]),
            Scheme::new(&[2, 3, 4, 5, 1], &[0, 0, 0, 2, 2], &[0, 1, 2, 2, 3]),
            Scheme::new(&[3, 4, 5, 2, 1], &[0, 0, 1, 1, 1], &[0, 1, 1, 2, 3]),
            Scheme::new(&[5, 4, 3, 2, 1], &[0, 0, 0, 0, 0], &[0, 0, 3, 3, 3]),
        ],
    ];
}

/// Scheme set for `total` errors, if one is tabulated.
pub fn optimum_schemes(total: u8) -> Option<&'static [Scheme]> {
    OPTIMUM_SCHEMES.get(total as usize).map(Vec::as_slice)
}

/// A scheme laid over one query.
struct Plan<'s> {
    scheme: &'s Scheme,
    /// Query length covered once the first `i + 1` blocks in visiting order are done.
    covered: Vec<usize>,
}

/// Split `query_len` into the scheme's blocks and return, for each scheme,
/// the covered lengths in visiting order and the 0-based start of the first block.
fn block_info(schemes: &[Scheme], query_len: usize) -> Vec<(Vec<usize>, usize)> {
    let blocks = schemes[0].blocks();
    let base = query_len / blocks;
    let rest = query_len % blocks;
    let lengths: Vec<usize> = (0..blocks).map(|i| base + usize::from(i < rest)).collect();

    schemes
        .iter()
        .map(|scheme| {
            let mut covered = Vec::with_capacity(blocks);
            let mut total = 0;
            for &block in &scheme.pi {
                total += lengths[block - 1];
                covered.push(total);
            }
            let start = lengths[..scheme.pi[0] - 1].iter().sum();
            (covered, start)
        })
        .collect()
}

struct SchemeSearch<'q, 'h, C> {
    query: &'q [usize],
    abort: bool,
    hits: &'h mut Vec<C>,
}

#[inline]
fn extend<C: BidirectionalCursor>(cursor: &C, rank: usize, go_right: bool) -> Option<C> {
    if go_right {
        cursor.extend_right(rank)
    } else {
        cursor.extend_left(rank)
    }
}

/// Run every scheme of `schemes` over `query`. The query must have at least
/// as many symbols as the schemes have blocks.
pub fn search_scheme<C: BidirectionalCursor>(
    root: C,
    schemes: &[Scheme],
    query: &[usize],
    errors: ErrorCounts,
    abort: bool,
    hits: &mut Vec<C>,
) {
    let mut search = SchemeSearch { query, abort, hits };
    for (scheme, (covered, start)) in schemes.iter().zip(block_info(schemes, query.len())) {
        let plan = Plan { scheme, covered };
        let start = start as isize;
        if search.search(root.clone(), start, start + 1, 0, 0, true, &plan, errors) {
            break;
        }
    }
}

impl<'q, 'h, C: BidirectionalCursor> SchemeSearch<'q, 'h, C> {
    #[inline]
    fn bounds(plan: &Plan<'_>, spent: u8, block: usize) -> (i32, i32) {
        let max_left = plan.scheme.upper[block] as i32 - spent as i32;
        let min_left = (plan.scheme.lower[block] as i32 - spent as i32).max(0);
        (min_left, max_left)
    }

    #[inline]
    fn next_block(plan: &Plan<'_>, block: usize) -> (usize, bool) {
        let next = (block + 1).min(plan.scheme.blocks() - 1);
        let go_right = next == 0 || plan.scheme.pi[next] > plan.scheme.pi[next - 1];
        (next, go_right)
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &mut self,
        cursor: C,
        lb: isize,
        rb: isize,
        spent: u8,
        block: usize,
        go_right: bool,
        plan: &Plan<'_>,
        left: ErrorCounts,
    ) -> bool {
        let (min_left, max_left) = Self::bounds(plan, spent, block);
        let query_len = self.query.len() as isize;
        let block_end = plan.covered[block] as isize;

        if min_left == 0 && lb == 0 && rb == query_len + 1 {
            if cursor.query_length() == 0 {
                return false;
            }
            self.hits.push(cursor);
            return self.abort;
        }
        if (max_left == 0 && rb - lb - 1 != block_end) || (left.total == 0 && min_left == 0) {
            return self.exact(cursor, lb, rb, spent, block, go_right, plan, left);
        }
        if left.total > 0 {
            if left.insertion > 0 {
                let (lb2, rb2) = if go_right { (lb, rb + 1) } else { (lb - 1, rb) };
                let next = left.spend_insertion();
                let stop = if rb - lb == block_end {
                    self.deletion(cursor.clone(), lb2, rb2, spent + 1, block, go_right, plan, next)
                } else {
                    self.search(cursor.clone(), lb2, rb2, spent + 1, block, go_right, plan, next)
                };
                if stop {
                    return true;
                }
            }
            return self.children(cursor, lb, rb, spent, block, go_right, min_left, plan, left);
        }
        false
    }

    /// Match the remainder of the current block without errors.
    #[allow(clippy::too_many_arguments)]
    fn exact(
        &mut self,
        cursor: C,
        lb: isize,
        rb: isize,
        spent: u8,
        block: usize,
        go_right: bool,
        plan: &Plan<'_>,
        left: ErrorCounts,
    ) -> bool {
        let blocks = plan.scheme.blocks();
        let next_block = (block + 1).min(blocks - 1);
        let next_right = block + 1 < blocks && plan.scheme.pi[block + 1] > plan.scheme.pi[block];
        let block_end = plan.covered[block] as isize;

        if go_right {
            let (from, to) = (rb - 1, lb + block_end - 1);
            let mut cursor = cursor;
            for i in from..=to {
                match cursor.extend_right(self.query[i as usize]) {
                    Some(next) => cursor = next,
                    None => return false,
                }
            }
            self.search(cursor, lb, to + 2, spent, next_block, next_right, plan, left)
        } else {
            let (from, to) = (rb - block_end - 1, lb - 1);
            let mut cursor = cursor;
            for i in (from..=to).rev() {
                match cursor.extend_left(self.query[i as usize]) {
                    Some(next) => cursor = next,
                    None => return false,
                }
            }
            self.search(cursor, from, rb, spent, next_block, next_right, plan, left)
        }
    }

    /// Close the current block, optionally extending by text symbols that
    /// are not in the query.
    #[allow(clippy::too_many_arguments)]
    fn deletion(
        &mut self,
        cursor: C,
        lb: isize,
        rb: isize,
        spent: u8,
        block: usize,
        go_right: bool,
        plan: &Plan<'_>,
        left: ErrorCounts,
    ) -> bool {
        let (min_left, max_left) = Self::bounds(plan, spent, block);
        if min_left == 0 {
            let (next_block, next_right) = Self::next_block(plan, block);
            if self.search(cursor.clone(), lb, rb, spent, next_block, next_right, plan, left) {
                return true;
            }
        }

        let pi = plan.scheme.pi[block];
        let at_query_end = (pi == 1 && !go_right) || (pi == plan.scheme.blocks() && go_right);
        if !at_query_end && max_left > 0 && left.total > 0 && left.deletion > 0 {
            let next = left.spend_deletion();
            for &rank in cursor.alphabet_ranks() {
                if let Some(child) = extend(&cursor, rank, go_right) {
                    if self.deletion(child, lb, rb, spent + 1, block, go_right, plan, next) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Extend by every symbol: match or substitution against the next query
    /// symbol, or a deletion that leaves the query position unchanged.
    #[allow(clippy::too_many_arguments)]
    fn children(
        &mut self,
        cursor: C,
        lb: isize,
        rb: isize,
        spent: u8,
        block: usize,
        go_right: bool,
        min_left: i32,
        plan: &Plan<'_>,
        left: ErrorCounts,
    ) -> bool {
        let query_len = self.query.len() as isize;
        let index = if go_right { rb } else { lb } - 1;
        if index < 0 || index >= query_len {
            return false;
        }
        let symbol = self.query[index as usize];
        let block_end = plan.covered[block] as isize;
        let chars_left = block_end - (rb - lb - 1);
        let (lb2, rb2) = if go_right { (lb, rb + 1) } else { (lb - 1, rb) };
        let at_edge = if go_right {
            rb == 1 || rb == query_len + 1
        } else {
            lb == 0 || lb == query_len
        };

        for &rank in cursor.alphabet_ranks() {
            let Some(child) = extend(&cursor, rank, go_right) else {
                continue;
            };
            let delta = u8::from(rank != symbol);
            if left.deletion == 0 && chars_left + (delta as isize) < min_left as isize + 1 {
                continue;
            }

            if delta == 0 || left.substitution > 0 {
                let next = ErrorCounts {
                    total: left.total - delta,
                    substitution: left.substitution - delta,
                    ..left
                };
                let stop = if rb - lb == block_end {
                    if left.deletion > 0 {
                        self.deletion(child.clone(), lb2, rb2, spent + delta, block, go_right, plan, next)
                    } else {
                        let (next_block, next_right) = Self::next_block(plan, block);
                        self.search(child.clone(), lb2, rb2, spent + delta, next_block, next_right, plan, next)
                    }
                } else {
                    self.search(child.clone(), lb2, rb2, spent + delta, block, go_right, plan, next)
                };
                if stop {
                    return true;
                }
            }

            if left.deletion > 0
                && !at_edge
                && self.search(child, lb, rb, spent + 1, block, go_right, plan, left.spend_deletion())
            {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{BiFmIndex, IndexCursor};

    #[test]
    fn blocks_split_evenly_with_remainder_first() {
        let schemes = optimum_schemes(2).unwrap();
        let info = block_info(schemes, 10);
        // lengths 3, 3, 2, 2
        assert_eq!(info[0], (vec![3, 6, 8, 10], 0));
        assert_eq!(info[1], (vec![2, 5, 8, 10], 6));
        assert_eq!(info[2], (vec![2, 4, 7, 10], 8));
    }

    #[test]
    fn every_tabulated_scheme_is_consistent() {
        for total in 0..=3u8 {
            let schemes = optimum_schemes(total).unwrap();
            let blocks = schemes[0].blocks();
            for scheme in schemes {
                assert_eq!(scheme.blocks(), blocks);
                assert_eq!(*scheme.upper.last().unwrap(), total, "scheme must reach the total");
                let mut order = scheme.pi.clone();
                order.sort_unstable();
                assert_eq!(order, (1..=blocks).collect::<Vec<_>>());
            }
        }
        assert!(optimum_schemes(4).is_none());
    }

    #[test]
    fn one_substitution_found_through_either_half() {
        let index = BiFmIndex::new(&[b"ttacgtacgatt".to_vec()]).unwrap();
        let query: Vec<usize> = b"acgtt".iter().map(|&b| b as usize).collect();
        let errors = ErrorCounts {
            total: 1,
            substitution: 1,
            insertion: 0,
            deletion: 0,
        };
        let mut hits = Vec::new();
        search_scheme(index.cursor(), optimum_schemes(1).unwrap(), &query, errors, false, &mut hits);
        let mut positions: Vec<usize> = hits.iter().flat_map(|h| h.locate()).map(|p| p.position).collect();
        positions.sort_unstable();
        positions.dedup();
        // acgta at 2 and acgat at 6 are one substitution away
        assert_eq!(positions, vec![2, 6]);
    }
}
