//! Approximate string search over the FM indices.
//!
//! [`search`] and friends check the error limits once, then search every
//! query independently and report results in query order. Rate limits become
//! absolute counts per query.

pub mod config;
pub mod hits;
pub mod scheme;
pub mod trivial;

use rayon::prelude::*;

pub use config::{
    ErrorBudget, ErrorCounts, ErrorLimits, ErrorRate, HitStrategy, RateLimits, ResolvedLimits, SearchConfig, SearchOutput,
};
pub use hits::SearchResult;

use crate::alphabet::Alphabet;
use crate::defaults::MAX_SCHEME_ERRORS;
use crate::error::{Error, Result};
use crate::index::{BiFmCursor, BiFmIndex, FmCursor, FmIndex, IndexCursor};
use scheme::{optimum_schemes, search_scheme};
use trivial::search_trivial;

/// An index the search engine can walk.
pub trait SearchableIndex: Sync {
    type Alphabet: Alphabet;
    type Cursor<'a>: IndexCursor + Send
    where
        Self: 'a;

    fn root(&self) -> Self::Cursor<'_>;

    /// Largest error total this index searches with schemes.
    fn scheme_limit(&self) -> Option<u8> {
        None
    }

    /// Push every cursor matching `query` (alphabet ranks) within `errors`.
    fn approximate<'a>(&'a self, query: &[usize], errors: ErrorCounts, abort: bool, hits: &mut Vec<Self::Cursor<'a>>) {
        search_trivial(self.root(), query, errors, abort, hits);
    }
}

impl<A: Alphabet> SearchableIndex for FmIndex<A> {
    type Alphabet = A;
    type Cursor<'a> = FmCursor<'a, A>;

    fn root(&self) -> Self::Cursor<'_> {
        self.cursor()
    }
}

impl<A: Alphabet> SearchableIndex for BiFmIndex<A> {
    type Alphabet = A;
    type Cursor<'a> = BiFmCursor<'a, A>;

    fn root(&self) -> Self::Cursor<'_> {
        self.cursor()
    }

    fn scheme_limit(&self) -> Option<u8> {
        Some(MAX_SCHEME_ERRORS)
    }

    fn approximate<'a>(&'a self, query: &[usize], errors: ErrorCounts, abort: bool, hits: &mut Vec<Self::Cursor<'a>>) {
        match optimum_schemes(errors.total) {
            Some(schemes) if query.len() >= schemes[0].blocks() => {
                search_scheme(self.cursor(), schemes, query, errors, abort, hits)
            }
            _ => search_trivial(self.cursor(), query, errors, abort, hits),
        }
    }
}

/// Resolve the limits and report the search plan once per call.
fn prepare<I: SearchableIndex>(index: &I, config: &SearchConfig) -> Result<ResolvedLimits> {
    let limits = config.errors.resolve()?;
    if let (Some(limit), ResolvedLimits::Count(counts)) = (index.scheme_limit(), limits) {
        if counts.total > limit {
            log::warn!(
                "No search scheme for {} errors (limit {}); falling back to backtracking",
                counts.total,
                limit
            );
        }
    }
    log::debug!("Searching with {:?}, strategy {:?}", limits, config.hit_strategy);
    Ok(limits)
}

fn search_one<'a, I: SearchableIndex>(
    index: &'a I,
    query_id: usize,
    query: &[I::Alphabet],
    limits: ResolvedLimits,
    config: &SearchConfig,
) -> Vec<SearchResult<I::Cursor<'a>>> {
    if query.is_empty() {
        log::debug!("Query {} is empty; no hits", query_id);
        return Vec::new();
    }
    let errors = limits.counts_for(query.len());
    if let ResolvedLimits::Rate(_) = limits {
        log::trace!("Query {} of length {} searched with {:?}", query_id, query.len(), errors);
    }
    let ranks: Vec<usize> = query.iter().map(|s| s.rank()).collect();
    let cursors = hits::collect_cursors(index, &ranks, errors, config.hit_strategy);
    hits::package(query_id, cursors, config.hit_strategy, config.output)
}

/// Search every query and collect the results in query order.
///
/// # Errors
/// `Error::Configuration` when the error limits are inconsistent.
pub fn search<'a, I, Q>(index: &'a I, queries: &[Q], config: &SearchConfig) -> Result<Vec<SearchResult<I::Cursor<'a>>>>
where
    I: SearchableIndex,
    Q: AsRef<[I::Alphabet]>,
{
    let mut results = Vec::new();
    search_with(index, queries, config, |result| results.push(result))?;
    Ok(results)
}

/// Search every query, handing each result to `callback` in query order.
pub fn search_with<'a, I, Q, F>(index: &'a I, queries: &[Q], config: &SearchConfig, mut callback: F) -> Result<()>
where
    I: SearchableIndex,
    Q: AsRef<[I::Alphabet]>,
    F: FnMut(SearchResult<I::Cursor<'a>>),
{
    let limits = prepare(index, config)?;
    for (query_id, query) in queries.iter().enumerate() {
        search_one(index, query_id, query.as_ref(), limits, config)
            .into_iter()
            .for_each(&mut callback);
    }
    Ok(())
}

/// [`search`] with queries spread over rayon workers. Results keep query order.
pub fn search_parallel<'a, I, Q>(
    index: &'a I,
    queries: &[Q],
    config: &SearchConfig,
) -> Result<Vec<SearchResult<I::Cursor<'a>>>>
where
    I: SearchableIndex,
    Q: AsRef<[I::Alphabet]> + Sync,
{
    let limits = prepare(index, config)?;
    let compute = || -> Vec<Vec<SearchResult<I::Cursor<'a>>>> {
        queries
            .par_iter()
            .enumerate()
            .map(|(query_id, query)| search_one(index, query_id, query.as_ref(), limits, config))
            .collect()
    };

    let per_query = match config.threads {
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::config(format!("cannot build a {threads}-thread pool: {e}")))?;
            log::debug!("Searching {} queries on {} threads", queries.len(), threads);
            pool.install(compute)
        }
        None => compute(),
    };
    Ok(per_query.into_iter().flatten().collect())
}
