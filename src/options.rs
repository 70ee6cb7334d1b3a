use clap::{Args, ValueEnum};
use std::path::PathBuf;

// src/options.rs
//
// Command-line option bundles and their conversion into library configurations

use crate::core::alignment::{AlignmentConfig, Band, FreeEndGaps, GapScheme, MatchMismatch, Method, OutputFields};
use crate::defaults;
use crate::search::{ErrorBudget, ErrorLimits, ErrorRate, HitStrategy, SearchConfig, SearchOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlignMode {
    Global,
    /// Free leading and trailing gaps in the first sequence
    SemiGlobal,
    Local,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputLevel {
    Score,
    End,
    Begin,
    Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HitMode {
    All,
    AllBest,
    SingleBest,
    Strata,
}

#[derive(Debug, Clone, Args)]
pub struct AlignOpt {
    /// FASTA file with the first sequence of each pair
    #[arg(value_name = "A.FA")]
    pub first: PathBuf,

    /// FASTA file with the second sequence of each pair
    #[arg(value_name = "B.FA")]
    pub second: PathBuf,

    /// Align every record of B.FA against the first record of A.FA
    #[arg(long)]
    pub against_first: bool,

    // ===== Algorithm Options =====
    /// Alignment method
    #[arg(short = 'm', long, value_enum, default_value_t = AlignMode::Global)]
    pub mode: AlignMode,

    /// Lower diagonal of the band (column - row)
    #[arg(long, value_name = "INT", allow_negative_numbers = true, requires = "band_upper")]
    pub band_lower: Option<isize>,

    /// Upper diagonal of the band (column - row)
    #[arg(long, value_name = "INT", allow_negative_numbers = true, requires = "band_lower")]
    pub band_upper: Option<isize>,

    /// Report no alignment when the edit distance exceeds INT (unit costs only)
    #[arg(short = 'k', long, value_name = "INT")]
    pub max_errors: Option<usize>,

    /// Score pairs in SIMD-style batches (score output only)
    #[arg(long)]
    pub vectorised: bool,

    // ===== Scoring Options =====
    /// Score for a match
    #[arg(short = 'A', long, value_name = "INT", allow_negative_numbers = true, default_value_t = defaults::MATCH_SCORE)]
    pub match_score: i32,

    /// Score for a mismatch
    #[arg(short = 'B', long, value_name = "INT", allow_negative_numbers = true, default_value_t = defaults::MISMATCH_SCORE)]
    pub mismatch_score: i32,

    /// Score per gap character
    #[arg(short = 'E', long, value_name = "INT", allow_negative_numbers = true, default_value_t = defaults::AFFINE_GAP_SCORE)]
    pub gap: i32,

    /// Extra score for opening a gap; a gap of size k scores '{-O} + {-E}*k'
    #[arg(short = 'O', long, value_name = "INT", allow_negative_numbers = true, default_value_t = defaults::AFFINE_GAP_OPEN_SCORE)]
    pub gap_open: i32,

    // ===== Output Options =====
    /// Result fields to compute
    #[arg(short = 'o', long, value_enum, default_value_t = OutputLevel::Alignment)]
    pub output: OutputLevel,

    // ===== Processing Options =====
    /// Number of threads (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    pub threads: Option<usize>,

    /// Verbose level: 1=error, 2=warning, 3=message, 4=debug, 5+=trace
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    pub verbosity: i32,
}

impl AlignOpt {
    pub fn into_config(&self) -> AlignmentConfig<MatchMismatch> {
        let method = match self.mode {
            AlignMode::Global => Method::Global(FreeEndGaps::NONE),
            AlignMode::SemiGlobal => Method::semi_global(),
            AlignMode::Local => Method::Local,
        };
        let output = match self.output {
            OutputLevel::Score => OutputFields::Score,
            OutputLevel::End => OutputFields::ScoreEnd,
            OutputLevel::Begin => OutputFields::ScoreEndBegin,
            OutputLevel::Alignment => OutputFields::Alignment,
        };
        let mut config = AlignmentConfig::new(MatchMismatch::new(self.match_score, self.mismatch_score))
            .method(method)
            .gap(GapScheme::affine(self.gap, self.gap_open))
            .output(output)
            .vectorised(self.vectorised);
        if let (Some(lower), Some(upper)) = (self.band_lower, self.band_upper) {
            config = config.band(Band::new(lower, upper));
        }
        if let Some(k) = self.max_errors {
            config = config.max_errors(k);
        }
        config
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchOpt {
    /// Reference FASTA; every record becomes one indexed text
    #[arg(value_name = "REF.FA")]
    pub reference: PathBuf,

    /// Query FASTA
    #[arg(value_name = "QUERIES.FA")]
    pub queries: PathBuf,

    // ===== Error Budget =====
    /// Maximum total errors
    #[arg(short = 'e', long, value_name = "INT")]
    pub errors: Option<u8>,

    /// Maximum substitutions
    #[arg(short = 's', long, value_name = "INT")]
    pub substitutions: Option<u8>,

    /// Maximum insertions (query symbols missing from the text)
    #[arg(short = 'i', long, value_name = "INT")]
    pub insertions: Option<u8>,

    /// Maximum deletions (text symbols missing from the query)
    #[arg(short = 'd', long, value_name = "INT")]
    pub deletions: Option<u8>,

    /// Maximum total errors as a fraction of each query's length
    #[arg(
        short = 'r',
        long,
        value_name = "FLOAT",
        conflicts_with_all = ["errors", "substitutions", "insertions", "deletions"]
    )]
    pub error_rate: Option<f64>,

    // ===== Reporting =====
    /// Which hits to report
    #[arg(long, value_enum, default_value_t = HitMode::All)]
    pub hits: HitMode,

    /// Extra errors above the best hit reported in strata mode
    #[arg(long, value_name = "INT", default_value_t = defaults::STRATUM)]
    pub stratum: u8,

    // ===== Processing Options =====
    /// Number of threads (default: all available cores)
    #[arg(short = 't', long, value_name = "INT")]
    pub threads: Option<usize>,

    /// Verbose level: 1=error, 2=warning, 3=message, 4=debug, 5+=trace
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    pub verbosity: i32,
}

impl SearchOpt {
    pub fn into_config(&self) -> SearchConfig {
        let errors = match self.error_rate {
            Some(rate) => ErrorLimits::Rate(ErrorRate::total(rate)),
            None => ErrorLimits::Count(ErrorBudget {
                total: self.errors,
                substitution: self.substitutions,
                insertion: self.insertions,
                deletion: self.deletions,
            }),
        };
        let hit_strategy = match self.hits {
            HitMode::All => HitStrategy::All,
            HitMode::AllBest => HitStrategy::AllBest,
            HitMode::SingleBest => HitStrategy::SingleBest,
            HitMode::Strata => HitStrategy::Strata(self.stratum),
        };
        SearchConfig::default()
            .errors(errors)
            .hit_strategy(hit_strategy)
            .output(SearchOutput::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct AlignCli {
        #[command(flatten)]
        opt: AlignOpt,
    }

    #[derive(Parser)]
    struct SearchCli {
        #[command(flatten)]
        opt: SearchOpt,
    }

    #[test]
    fn align_defaults_are_affine_global() {
        let cli = AlignCli::parse_from(["align", "a.fa", "b.fa"]);
        let config = cli.opt.into_config();
        assert_eq!(config.method, Method::global());
        assert_eq!(config.gap, GapScheme::affine(-1, -10));
        assert_eq!(config.output, OutputFields::Alignment);
        assert!(config.band.is_none());
    }

    #[test]
    fn negative_scores_and_band_parse() {
        let cli = AlignCli::parse_from([
            "align", "a.fa", "b.fa", "-B", "-4", "--band-lower", "-3", "--band-upper", "2", "-m", "local",
        ]);
        let config = cli.opt.into_config();
        assert_eq!(config.scoring.mismatch_score, -4);
        assert_eq!(config.band, Some(Band::new(-3, 2)));
        assert!(config.method.is_local());
    }

    #[test]
    fn search_options_map_to_budget_and_strategy() {
        let cli = SearchCli::parse_from(["search", "ref.fa", "q.fa", "-e", "2", "-s", "1", "--hits", "strata", "--stratum", "1"]);
        let config = cli.opt.into_config();
        let ErrorLimits::Count(budget) = config.errors else {
            panic!("absolute limits expected, got {:?}", config.errors);
        };
        assert_eq!(budget.total, Some(2));
        assert_eq!(budget.substitution, Some(1));
        assert_eq!(budget.deletion, None);
        assert_eq!(config.hit_strategy, HitStrategy::Strata(1));
    }

    #[test]
    fn error_rate_replaces_absolute_limits() {
        let cli = SearchCli::parse_from(["search", "ref.fa", "q.fa", "--error-rate", "0.1"]);
        assert_eq!(cli.opt.into_config().errors, ErrorLimits::Rate(ErrorRate::total(0.1)));

        let clash = SearchCli::try_parse_from(["search", "ref.fa", "q.fa", "-r", "0.1", "-e", "2"]);
        assert!(clash.is_err(), "rate and absolute limits are exclusive");
    }
}
