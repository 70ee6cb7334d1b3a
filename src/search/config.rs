//! Approximate search configuration.
//!
//! `ErrorBudget` (absolute counts) and `ErrorRate` (fractions of the query
//! length) are what the caller asked for; `ErrorCounts` is the resolved budget
//! the search engines consume for one query.

use crate::defaults::{MAX_TOTAL_ERRORS, STRATUM};
use crate::error::{Error, Result};

/// Requested error limits. Unset fields are derived by [`ErrorBudget::resolve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorBudget {
    pub total: Option<u8>,
    pub substitution: Option<u8>,
    pub insertion: Option<u8>,
    pub deletion: Option<u8>,
}

impl ErrorBudget {
    /// Up to `total` errors of any kind.
    pub fn total(total: u8) -> Self {
        Self {
            total: Some(total),
            ..Self::default()
        }
    }

    pub fn with_total(mut self, total: u8) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_substitution(mut self, n: u8) -> Self {
        self.substitution = Some(n);
        self
    }

    pub fn with_insertion(mut self, n: u8) -> Self {
        self.insertion = Some(n);
        self
    }

    pub fn with_deletion(mut self, n: u8) -> Self {
        self.deletion = Some(n);
        self
    }

    /// Fill in unset limits and check them against each other.
    ///
    /// With only `total` set every category may use the whole total. With
    /// only categories set the total is their sum (saturating at 255) and
    /// unset categories are 0. With both, unset categories default to the
    /// total.
    ///
    /// # Errors
    /// `Error::Configuration` when a category limit exceeds the total.
    pub fn resolve(&self) -> Result<ErrorCounts> {
        let categories = [self.substitution, self.insertion, self.deletion];
        let resolved = match self.total {
            None if categories.iter().all(Option::is_none) => ErrorCounts::default(),
            None => {
                let sum: u32 = categories.iter().map(|c| c.unwrap_or(0) as u32).sum();
                ErrorCounts {
                    total: sum.min(MAX_TOTAL_ERRORS as u32) as u8,
                    substitution: self.substitution.unwrap_or(0),
                    insertion: self.insertion.unwrap_or(0),
                    deletion: self.deletion.unwrap_or(0),
                }
            }
            Some(total) => ErrorCounts {
                total,
                substitution: self.substitution.unwrap_or(total),
                insertion: self.insertion.unwrap_or(total),
                deletion: self.deletion.unwrap_or(total),
            },
        };

        for (name, value) in [
            ("substitution", resolved.substitution),
            ("insertion", resolved.insertion),
            ("deletion", resolved.deletion),
        ] {
            if value > resolved.total {
                return Err(Error::config(format!(
                    "{name} limit {value} exceeds the total error limit {}",
                    resolved.total
                )));
            }
        }
        Ok(resolved)
    }
}

/// Requested error limits as fractions of the query length, each in `[0, 1]`.
///
/// Unset fields follow the same rules as [`ErrorBudget`], with the derived
/// total capped at 1. A query of length `n` may use `floor(rate * n)` errors.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorRate {
    pub total: Option<f64>,
    pub substitution: Option<f64>,
    pub insertion: Option<f64>,
    pub deletion: Option<f64>,
}

impl ErrorRate {
    pub fn total(total: f64) -> Self {
        Self {
            total: Some(total),
            ..Self::default()
        }
    }

    pub fn with_substitution(mut self, rate: f64) -> Self {
        self.substitution = Some(rate);
        self
    }

    pub fn with_insertion(mut self, rate: f64) -> Self {
        self.insertion = Some(rate);
        self
    }

    pub fn with_deletion(mut self, rate: f64) -> Self {
        self.deletion = Some(rate);
        self
    }

    /// # Errors
    /// `Error::Configuration` for a rate outside `[0, 1]` or a category rate
    /// above the total rate.
    pub fn resolve(&self) -> Result<RateLimits> {
        for (name, rate) in [
            ("total", self.total),
            ("substitution", self.substitution),
            ("insertion", self.insertion),
            ("deletion", self.deletion),
        ] {
            if let Some(rate) = rate {
                if !(0.0..=1.0).contains(&rate) {
                    return Err(Error::config(format!("{name} error rate {rate} is outside [0, 1]")));
                }
            }
        }

        let categories = [self.substitution, self.insertion, self.deletion];
        let resolved = match self.total {
            None if categories.iter().all(Option::is_none) => RateLimits::default(),
            None => RateLimits {
                total: categories.iter().map(|c| c.unwrap_or(0.0)).sum::<f64>().min(1.0),
                substitution: self.substitution.unwrap_or(0.0),
                insertion: self.insertion.unwrap_or(0.0),
                deletion: self.deletion.unwrap_or(0.0),
            },
            Some(total) => RateLimits {
                total,
                substitution: self.substitution.unwrap_or(total),
                insertion: self.insertion.unwrap_or(total),
                deletion: self.deletion.unwrap_or(total),
            },
        };

        for (name, rate) in [
            ("substitution", resolved.substitution),
            ("insertion", resolved.insertion),
            ("deletion", resolved.deletion),
        ] {
            if rate > resolved.total {
                return Err(Error::config(format!(
                    "{name} error rate {rate} exceeds the total error rate {}",
                    resolved.total
                )));
            }
        }
        Ok(resolved)
    }
}

/// Validated error rates; every category is at most `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RateLimits {
    pub total: f64,
    pub substitution: f64,
    pub insertion: f64,
    pub deletion: f64,
}

impl RateLimits {
    /// Absolute limits for a query of `query_length` symbols, rounded down.
    pub fn counts_for(&self, query_length: usize) -> ErrorCounts {
        let count = |rate: f64| (rate * query_length as f64).floor().min(MAX_TOTAL_ERRORS as f64) as u8;
        ErrorCounts {
            total: count(self.total),
            substitution: count(self.substitution),
            insertion: count(self.insertion),
            deletion: count(self.deletion),
        }
    }
}

/// Error limits of a search, absolute or relative to the query length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ErrorLimits {
    Count(ErrorBudget),
    Rate(ErrorRate),
}

impl Default for ErrorLimits {
    fn default() -> Self {
        ErrorLimits::Count(ErrorBudget::default())
    }
}

impl From<ErrorBudget> for ErrorLimits {
    fn from(budget: ErrorBudget) -> Self {
        ErrorLimits::Count(budget)
    }
}

impl From<ErrorRate> for ErrorLimits {
    fn from(rate: ErrorRate) -> Self {
        ErrorLimits::Rate(rate)
    }
}

impl ErrorLimits {
    /// Check the limits once, before any query is searched.
    pub fn resolve(&self) -> Result<ResolvedLimits> {
        Ok(match self {
            ErrorLimits::Count(budget) => ResolvedLimits::Count(budget.resolve()?),
            ErrorLimits::Rate(rate) => ResolvedLimits::Rate(rate.resolve()?),
        })
    }
}

/// Checked limits, turned into per-query counts by [`ResolvedLimits::counts_for`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedLimits {
    Count(ErrorCounts),
    Rate(RateLimits),
}

impl ResolvedLimits {
    pub fn counts_for(&self, query_length: usize) -> ErrorCounts {
        match self {
            ResolvedLimits::Count(counts) => *counts,
            ResolvedLimits::Rate(rates) => rates.counts_for(query_length),
        }
    }
}

/// Resolved error limits; every category is at most `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ErrorCounts {
    pub total: u8,
    pub substitution: u8,
    pub insertion: u8,
    pub deletion: u8,
}

impl ErrorCounts {
    /// Same limits with the total lowered to `total`.
    pub fn clamped(&self, total: u8) -> Self {
        let total = total.min(self.total);
        Self {
            total,
            substitution: self.substitution.min(total),
            insertion: self.insertion.min(total),
            deletion: self.deletion.min(total),
        }
    }

    pub(crate) fn spend_substitution(self) -> Self {
        Self {
            total: self.total - 1,
            substitution: self.substitution - 1,
            ..self
        }
    }

    pub(crate) fn spend_insertion(self) -> Self {
        Self {
            total: self.total - 1,
            insertion: self.insertion - 1,
            ..self
        }
    }

    pub(crate) fn spend_deletion(self) -> Self {
        Self {
            total: self.total - 1,
            deletion: self.deletion - 1,
            ..self
        }
    }
}

/// Which hits of a query are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HitStrategy {
    /// Every hit within the budget.
    #[default]
    All,
    /// Hits with the fewest errors found for the query.
    AllBest,
    /// One hit with the fewest errors.
    SingleBest,
    /// Hits with at most `min + s` errors.
    Strata(u8),
}

impl HitStrategy {
    pub fn strata() -> Self {
        HitStrategy::Strata(STRATUM)
    }
}

/// Fields filled in each search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchOutput {
    pub query_id: bool,
    pub reference_id: bool,
    pub reference_begin_position: bool,
    pub index_cursor: bool,
}

impl Default for SearchOutput {
    fn default() -> Self {
        Self {
            query_id: true,
            reference_id: true,
            reference_begin_position: true,
            index_cursor: false,
        }
    }
}

impl SearchOutput {
    /// Cursors only, no locating.
    pub const fn cursors() -> Self {
        Self {
            query_id: true,
            reference_id: false,
            reference_begin_position: false,
            index_cursor: true,
        }
    }

    pub const fn locates(&self) -> bool {
        self.reference_id || self.reference_begin_position
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchConfig {
    pub errors: ErrorLimits,
    pub hit_strategy: HitStrategy,
    pub output: SearchOutput,
    /// Worker threads for `search_parallel`; `None` uses the ambient rayon pool.
    pub threads: Option<usize>,
}

impl SearchConfig {
    pub fn errors(mut self, errors: impl Into<ErrorLimits>) -> Self {
        self.errors = errors.into();
        self
    }

    pub fn hit_strategy(mut self, strategy: HitStrategy) -> Self {
        self.hit_strategy = strategy;
        self
    }

    pub fn output(mut self, output: SearchOutput) -> Self {
        self.output = output;
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_budget_is_exact_search() {
        assert_eq!(ErrorBudget::default().resolve().unwrap(), ErrorCounts::default());
    }

    #[test]
    fn total_alone_opens_every_category() {
        let counts = ErrorBudget::total(2).resolve().unwrap();
        assert_eq!(
            counts,
            ErrorCounts {
                total: 2,
                substitution: 2,
                insertion: 2,
                deletion: 2
            }
        );
    }

    #[test]
    fn categories_alone_sum_into_total() {
        let counts = ErrorBudget::default()
            .with_substitution(1)
            .with_deletion(2)
            .resolve()
            .unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.insertion, 0, "unset category without total is closed");

        let saturated = ErrorBudget::default()
            .with_substitution(200)
            .with_insertion(200)
            .resolve()
            .unwrap();
        assert_eq!(saturated.total, 255);
    }

    #[test]
    fn category_above_total_is_rejected() {
        let err = ErrorBudget::total(1).with_deletion(2).resolve().unwrap_err();
        assert!(err.is_configuration(), "expected configuration error, got {err}");
    }

    #[test]
    fn rates_scale_with_query_length() {
        let rates = ErrorRate::total(0.25).with_substitution(0.25).with_insertion(0.0).with_deletion(0.0);
        let limits = rates.resolve().unwrap();
        assert_eq!(limits.counts_for(3).total, 0, "0.75 errors round down");
        let counts = limits.counts_for(8);
        assert_eq!(
            counts,
            ErrorCounts {
                total: 2,
                substitution: 2,
                insertion: 0,
                deletion: 0
            }
        );
        assert_eq!(ErrorRate::total(1.0).resolve().unwrap().counts_for(1000).total, 255);
    }

    #[test]
    fn rate_categories_alone_sum_into_total() {
        let limits = ErrorRate::default().with_substitution(0.1).with_deletion(0.2).resolve().unwrap();
        assert!((limits.total - 0.3).abs() < 1e-12);
        assert_eq!(limits.insertion, 0.0);
        assert_eq!(ErrorRate::default().resolve().unwrap(), RateLimits::default());
    }

    #[test]
    fn invalid_rates_are_rejected() {
        for rate in [
            ErrorRate::total(0.1).with_insertion(0.2),
            ErrorRate::total(1.5),
            ErrorRate::total(0.5).with_deletion(-0.1),
            ErrorRate::total(f64::NAN),
        ] {
            let err = ErrorLimits::from(rate).resolve().unwrap_err();
            assert!(err.is_configuration(), "expected configuration error for {rate:?}, got {err}");
        }
    }

    #[test]
    fn clamping_lowers_every_limit() {
        let counts = ErrorBudget::total(3).with_substitution(1).resolve().unwrap();
        let clamped = counts.clamped(2);
        assert_eq!(clamped.total, 2);
        assert_eq!(clamped.substitution, 1);
        assert_eq!(clamped.deletion, 2);
    }
}
