use anyhow::{Context, Result};
use bio::io::fasta;
use clap::{Parser, Subcommand};
use std::path::Path;

use ferrous_pairwise::alphabet::Dna5;
use ferrous_pairwise::core::alignment::{AlignmentPositions, AlignmentResult, PairwiseAligner};
use ferrous_pairwise::index::BiFmIndex;
use ferrous_pairwise::options::{AlignOpt, SearchOpt};
use ferrous_pairwise::search;

#[derive(Parser)]
#[command(name = "ferrous-pairwise")]
#[command(about = "Pairwise sequence alignment and approximate FM-index search", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align record i of A.FA with record i of B.FA
    Align(AlignOpt),

    /// Search every query record in a bidirectional FM index of the reference
    Search(SearchOpt),
}

fn init_logging(verbosity: i32) {
    // Map verbosity (1=error, 2=warning, 3=message, 4=debug, 5+=trace) to log levels
    let log_level = match verbosity {
        v if v <= 1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn init_thread_pool(threads: Option<usize>) {
    let mut num_threads = threads.unwrap_or_else(num_cpus::get);
    if num_threads < 1 {
        log::warn!("Invalid thread count {}, using 1 thread", num_threads);
        num_threads = 1;
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(_) => log::debug!("Built global Rayon thread pool with {} threads", num_threads),
        Err(e) => log::warn!("Failed to configure thread pool: {} (may already be initialized)", e),
    }
}

/// Read every record of a FASTA file as (id, Dna5 sequence).
fn read_fasta(path: &Path) -> Result<Vec<(String, Vec<Dna5>)>> {
    let reader = fasta::Reader::from_file(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("malformed FASTA record in {}", path.display()))?;
        records.push((record.id().to_string(), Dna5::encode(record.seq())));
    }
    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

fn format_positions(positions: Option<AlignmentPositions>) -> String {
    match positions {
        Some(p) => format!("{},{}", p.sequence1, p.sequence2),
        None => "*".to_string(),
    }
}

fn print_alignment(names: &(String, String), result: &AlignmentResult<Dna5>) {
    let score = match result.score {
        Some(score) => score.to_string(),
        None => "*".to_string(),
    };
    let cigar = result
        .alignment
        .as_ref()
        .map_or_else(|| "*".to_string(), |a| a.cigar_string());
    println!(
        "{}\t{}\t{}\tbegin={}\tend={}\t{}",
        names.0,
        names.1,
        score,
        format_positions(result.begin_positions),
        format_positions(result.end_positions),
        cigar
    );
    if let Some(alignment) = &result.alignment {
        println!("{alignment}");
    }
}

fn run_align(opt: &AlignOpt) -> Result<()> {
    let first = read_fasta(&opt.first)?;
    let second = read_fasta(&opt.second)?;
    if first.is_empty() {
        anyhow::bail!("{} has no records", opt.first.display());
    }
    if !opt.against_first && first.len() != second.len() {
        anyhow::bail!(
            "{} has {} records but {} has {}; use --against-first to align all against one",
            opt.first.display(),
            first.len(),
            opt.second.display(),
            second.len()
        );
    }

    let mut names = Vec::with_capacity(second.len());
    let mut pairs = Vec::with_capacity(second.len());
    for (i, (id2, seq2)) in second.iter().enumerate() {
        let (id1, seq1) = if opt.against_first { &first[0] } else { &first[i] };
        names.push((id1.clone(), id2.clone()));
        pairs.push((seq1.as_slice(), seq2.as_slice()));
    }

    let aligner: PairwiseAligner<Dna5, _> = PairwiseAligner::bind(opt.into_config()).context("invalid alignment options")?;
    log::info!("Aligning {} pairs with the {:?} engine", pairs.len(), aligner.engine());
    aligner.align_pairs_parallel(&pairs, |result| print_alignment(&names[result.sequence1_id], &result))?;
    Ok(())
}

fn run_search(opt: &SearchOpt) -> Result<()> {
    let reference = read_fasta(&opt.reference)?;
    let queries = read_fasta(&opt.queries)?;

    let texts: Vec<&[Dna5]> = reference.iter().map(|(_, seq)| seq.as_slice()).collect();
    let index = BiFmIndex::new(&texts).context("cannot index the reference")?;
    log::info!("Indexed {} reference records", reference.len());

    let query_seqs: Vec<&[Dna5]> = queries.iter().map(|(_, seq)| seq.as_slice()).collect();
    let config = opt.into_config();
    let results = search::search_parallel(&index, &query_seqs, &config).context("invalid search options")?;
    for result in &results {
        let query = result.query_id.map_or("*", |id| queries[id].0.as_str());
        let reference_name = result.reference_id.map_or("*", |id| reference[id].0.as_str());
        let position = result
            .reference_begin_position
            .map_or_else(|| "*".to_string(), |p| p.to_string());
        println!("{query}\t{reference_name}\t{position}");
    }
    log::info!("Reported {} hits for {} queries", results.len(), queries.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Align(opt) => {
            init_logging(opt.verbosity);
            init_thread_pool(opt.threads);
            run_align(&opt)
        }
        Commands::Search(opt) => {
            init_logging(opt.verbosity);
            init_thread_pool(opt.threads);
            run_search(&opt)
        }
    }
}
