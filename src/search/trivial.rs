// Backtracking approximate search
//
// Walks the query left to right, extending the cursor on the right. At each
// query position the search may match, substitute, insert (skip a query
// symbol) or delete (extend by a text symbol without consuming the query).
// Redundant edit paths are cut:
// - no deletion before the first or after the last query symbol
// - with substitutions left, no insertion right after a deletion and no
//   deletion right after an insertion
// - no insertion of a symbol equal to the last extended one
// - no deletion of a symbol equal to the next query symbol

use super::config::ErrorCounts;
use crate::index::IndexCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Start,
    Match,
    Substitution,
    Insertion,
    Deletion,
}

struct Backtracking<'q, 'h, C> {
    query: &'q [usize],
    abort: bool,
    hits: &'h mut Vec<C>,
}

/// Push every cursor matching `query` within `errors` onto `hits`.
/// Stops after the first hit when `abort` is set.
pub fn search_trivial<C: IndexCursor>(root: C, query: &[usize], errors: ErrorCounts, abort: bool, hits: &mut Vec<C>) {
    let mut search = Backtracking { query, abort, hits };
    search.step(root, 0, errors, Step::Start);
}

impl<'q, 'h, C: IndexCursor> Backtracking<'q, 'h, C> {
    /// Returns true when the search must stop.
    fn step(&mut self, cursor: C, pos: usize, left: ErrorCounts, prev: Step) -> bool {
        let query = self.query;
        if pos == query.len() || left.total == 0 {
            let rest = query[pos..]
                .iter()
                .try_fold(cursor, |c, &rank| c.extend_right(rank));
            return match rest {
                Some(hit) if hit.query_length() > 0 => {
                    self.hits.push(hit);
                    self.abort
                }
                _ => false,
            };
        }

        let symbol = query[pos];
        if left.insertion > 0
            && (prev != Step::Deletion || left.substitution == 0)
            && cursor.last_rank() != Some(symbol)
            && self.step(cursor.clone(), pos + 1, left.spend_insertion(), Step::Insertion)
        {
            return true;
        }

        if (pos > 0 && left.deletion > 0) || left.substitution > 0 {
            for (rank, child) in cursor.extend_right_all() {
                let mismatch = rank != symbol;
                if left.substitution > 0 {
                    let (next, step) = if mismatch {
                        (left.spend_substitution(), Step::Substitution)
                    } else {
                        (left, Step::Match)
                    };
                    if self.step(child.clone(), pos + 1, next, step) {
                        return true;
                    }
                }
                if pos > 0 {
                    if left.substitution == 0 && !mismatch && self.step(child.clone(), pos + 1, left, Step::Match) {
                        return true;
                    }
                    if (prev != Step::Insertion || left.substitution == 0)
                        && left.deletion > 0
                        && mismatch
                        && self.step(child, pos, left.spend_deletion(), Step::Deletion)
                    {
                        return true;
                    }
                }
            }
        } else if let Some(child) = cursor.extend_right(symbol) {
            return self.step(child, pos + 1, left, Step::Match);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FmIndex;

    fn ranks(s: &[u8]) -> Vec<usize> {
        s.iter().map(|&b| b as usize).collect()
    }

    fn positions(index: &FmIndex<u8>, query: &[u8], errors: ErrorCounts) -> Vec<usize> {
        let mut hits = Vec::new();
        search_trivial(index.cursor(), &ranks(query), errors, false, &mut hits);
        let mut out: Vec<usize> = hits.iter().flat_map(|h| h.locate()).map(|p| p.position).collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    #[test]
    fn exact_budget_finds_exact_occurrences() {
        let index = FmIndex::new(&[b"acgtacgt".to_vec()]).unwrap();
        assert_eq!(positions(&index, b"gta", ErrorCounts::default()), vec![2]);
        assert!(positions(&index, b"gga", ErrorCounts::default()).is_empty());
    }

    #[test]
    fn substitution_only_keeps_query_length() {
        let index = FmIndex::new(&[b"acgtacgt".to_vec()]).unwrap();
        let errors = ErrorCounts {
            total: 1,
            substitution: 1,
            insertion: 0,
            deletion: 0,
        };
        let mut hits = Vec::new();
        search_trivial(index.cursor(), &ranks(b"gga"), errors, false, &mut hits);
        assert!(hits.iter().all(|h| h.query_length() == 3), "no indels allowed");
        assert_eq!(positions(&index, b"gga", errors), vec![2]);
    }

    #[test]
    fn abort_stops_at_first_hit() {
        let index = FmIndex::new(&[b"aaaa".to_vec()]).unwrap();
        let mut hits = Vec::new();
        search_trivial(index.cursor(), &ranks(b"aa"), ErrorCounts::default().clamped(0), true, &mut hits);
        assert_eq!(hits.len(), 1);
    }
}
