//! Hit strategies and result packaging.
//!
//! `AllBest`, `SingleBest` and `Strata` deepen the error total from 0 until
//! something is found. Every category limit is clamped to the current total,
//! so each round only reports hits that no smaller total could find.

use super::config::{ErrorCounts, HitStrategy, SearchOutput};
use super::SearchableIndex;
use crate::index::{IndexCursor, TextPosition};

/// One reported hit. Fields not selected in [`SearchOutput`] are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<C> {
    pub query_id: Option<usize>,
    pub reference_id: Option<usize>,
    pub reference_begin_position: Option<usize>,
    pub index_cursor: Option<C>,
}

/// Cursors hit by `query` under `strategy`.
pub fn collect_cursors<'a, I: SearchableIndex>(
    index: &'a I,
    query: &[usize],
    errors: ErrorCounts,
    strategy: HitStrategy,
) -> Vec<I::Cursor<'a>> {
    let mut hits = Vec::new();
    match strategy {
        HitStrategy::All => index.approximate(query, errors, false, &mut hits),
        HitStrategy::SingleBest => {
            deepen(index, query, errors, true, &mut hits);
            hits.truncate(1);
        }
        HitStrategy::AllBest => {
            deepen(index, query, errors, false, &mut hits);
        }
        HitStrategy::Strata(stratum) => {
            if let Some(best) = deepen(index, query, errors, false, &mut hits) {
                let widened = best.saturating_add(stratum).min(errors.total);
                if widened > best {
                    hits.clear();
                    index.approximate(query, errors.clamped(widened), false, &mut hits);
                }
            }
        }
    }
    hits
}

/// Search with totals 0, 1, ... up to the budget until a round hits.
/// Returns the total of that round.
fn deepen<'a, I: SearchableIndex>(
    index: &'a I,
    query: &[usize],
    errors: ErrorCounts,
    abort: bool,
    hits: &mut Vec<I::Cursor<'a>>,
) -> Option<u8> {
    for total in 0..=errors.total {
        index.approximate(query, errors.clamped(total), abort, hits);
        if !hits.is_empty() {
            log::trace!("Best stratum for query of length {} is {}", query.len(), total);
            return Some(total);
        }
    }
    None
}

/// Turn cursors into results for `query_id`.
///
/// With a position field requested, multi-hit strategies locate every
/// cursor, sort by `(reference_id, position)` and drop duplicate positions,
/// keeping the first cursor that produced each one. `SingleBest` reports the
/// first position of its only cursor.
pub fn package<C: IndexCursor>(
    query_id: usize,
    cursors: Vec<C>,
    strategy: HitStrategy,
    output: SearchOutput,
) -> Vec<SearchResult<C>> {
    let build = |position: Option<TextPosition>, cursor: C| SearchResult {
        query_id: output.query_id.then_some(query_id),
        reference_id: position.filter(|_| output.reference_id).map(|p| p.reference_id),
        reference_begin_position: position
            .filter(|_| output.reference_begin_position)
            .map(|p| p.position),
        index_cursor: output.index_cursor.then_some(cursor),
    };

    if !output.locates() {
        return cursors.into_iter().map(|cursor| build(None, cursor)).collect();
    }

    if strategy == HitStrategy::SingleBest {
        return cursors
            .into_iter()
            .next()
            .and_then(|cursor| cursor.locate().first().copied().map(|p| build(Some(p), cursor)))
            .into_iter()
            .collect();
    }

    let mut located: Vec<(TextPosition, usize)> = cursors
        .iter()
        .enumerate()
        .flat_map(|(i, cursor)| cursor.locate().into_iter().map(move |p| (p, i)))
        .collect();
    // Stable, so the earliest cursor stays first among equal positions.
    located.sort_by_key(|&(p, _)| p);
    located.dedup_by_key(|&mut (p, _)| p);

    located
        .into_iter()
        .map(|(p, i)| build(Some(p), cursors[i].clone()))
        .collect()
}
