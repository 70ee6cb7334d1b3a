// Tests for the pairwise alignment driver (src/core/alignment/driver.rs)
// Scenario values and randomized properties over the dynamic-programming engine

use rand::{Rng, SeedableRng, rngs::StdRng};

use ferrous_pairwise::alphabet::{Aa20, Alphabet, Dna4};
use ferrous_pairwise::core::alignment::{
    Alignment, AlignmentConfig, AlignmentPositions, Band, FreeEndGaps, GapScheme, MatchMismatch, MatrixStorage, Method,
    OutputFields, PairwiseAligner, SubstitutionMatrix,
};

fn dna(s: &str) -> Vec<Dna4> {
    Dna4::encode(s.as_bytes()).unwrap()
}

fn random_dna(rng: &mut StdRng, min: usize, max: usize) -> Vec<Dna4> {
    let len = rng.gen_range(min..=max);
    (0..len).map(|_| Dna4::from_rank(rng.gen_range(0..4))).collect()
}

fn bind(config: AlignmentConfig<MatchMismatch>) -> PairwiseAligner<Dna4, MatchMismatch> {
    PairwiseAligner::bind(config).expect("configuration should bind")
}

fn affine_config() -> AlignmentConfig<MatchMismatch> {
    AlignmentConfig::new(MatchMismatch::new(4, -5))
        .gap(GapScheme::affine(-2, -8))
        .output(OutputFields::Alignment)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_default_global_reconstructs_leading_gap() {
    let aligner = bind(AlignmentConfig::default().output(OutputFields::Alignment));
    let result = aligner.align_pair(&dna("AAAACCCGGG"), &dna("AACCCGGG")).unwrap();
    assert_eq!(result.score, Some(-2));
    let (top, bottom) = result.alignment.expect("alignment requested").rows();
    assert_eq!(top, "AAAACCCGGG");
    assert_eq!(bottom, "--AACCCGGG");
    assert_eq!(result.begin_positions, Some(AlignmentPositions { sequence1: 0, sequence2: 0 }));
}

#[test]
fn test_affine_pair_from_three_sequence_example() {
    let config = affine_config();
    let scoring = config.scoring;
    let gap = config.gap;
    let aligner = bind(config);
    let result = aligner.align_pair(&dna("ACGGTGG"), &dna("GCCGGTGCC")).unwrap();
    assert_eq!(result.score, Some(-10));
    let alignment = result.alignment.unwrap();
    assert_eq!(alignment.rows(), ("-ACGGTG-G".to_string(), "GCCGGTGCC".to_string()));
    assert_eq!(alignment.rescore(&scoring, gap), -10, "rescoring must reproduce the score");
    assert_eq!(alignment.cigar_string(), "1I1X5=1I1X");
}

#[test]
fn test_semi_global_places_short_sequence_inside_long_one() {
    let aligner = bind(
        AlignmentConfig::new(MatchMismatch::new(4, -5))
            .gap(GapScheme::affine(-1, -10))
            .method(Method::semi_global())
            .output(OutputFields::Alignment),
    );
    let result = aligner.align_pair(&dna("ACGTTGCA"), &dna("TTGC")).unwrap();
    assert_eq!(result.score, Some(16));
    assert_eq!(result.begin_positions, Some(AlignmentPositions { sequence1: 3, sequence2: 0 }));
    assert_eq!(result.end_positions, Some(AlignmentPositions { sequence1: 7, sequence2: 4 }));
    assert_eq!(result.alignment.unwrap().rows(), ("TTGC".to_string(), "TTGC".to_string()));
}

#[test]
fn test_local_alignment_finds_shared_core() {
    let aligner = bind(
        AlignmentConfig::new(MatchMismatch::new(2, -3))
            .gap(GapScheme::affine(-2, -4))
            .method(Method::Local)
            .output(OutputFields::Alignment),
    );
    let result = aligner.align_pair(&dna("TTTACGTAAA"), &dna("CCACGTCC")).unwrap();
    assert_eq!(result.score, Some(8));
    assert_eq!(result.begin_positions, Some(AlignmentPositions { sequence1: 3, sequence2: 2 }));
    assert_eq!(result.end_positions, Some(AlignmentPositions { sequence1: 7, sequence2: 6 }));
    assert_eq!(result.alignment.unwrap().rows(), ("ACGT".to_string(), "ACGT".to_string()));
}

#[test]
fn test_protein_alignment_with_blosum62() {
    let protein = |s: &str| Aa20::encode(s.as_bytes()).unwrap();
    let config = AlignmentConfig::new(SubstitutionMatrix::blosum62())
        .gap(GapScheme::affine(-1, -10))
        .output(OutputFields::Alignment);
    let s1 = protein("HEAGAWGHEE");
    let s2 = protein("PAWHEAE");

    let global: PairwiseAligner<Aa20, _> = PairwiseAligner::bind(config.clone()).unwrap();
    let result = global.align_pair(&s1, &s2).unwrap();
    assert_eq!(result.score, Some(2));
    let alignment = result.alignment.unwrap();
    assert_eq!(alignment.rows(), ("HEAGAWGHEE".to_string(), "---PAWHEAE".to_string()));
    assert_eq!(alignment.rescore(&SubstitutionMatrix::blosum62(), GapScheme::affine(-1, -10)), 2);

    let local: PairwiseAligner<Aa20, _> = PairwiseAligner::bind(config.method(Method::Local)).unwrap();
    let result = local.align_pair(&s1, &s2).unwrap();
    assert_eq!(result.score, Some(17));
    assert_eq!(result.begin_positions, Some(AlignmentPositions { sequence1: 0, sequence2: 3 }));
    assert_eq!(result.end_positions, Some(AlignmentPositions { sequence1: 3, sequence2: 6 }));
    assert_eq!(result.alignment.unwrap().rows(), ("HEA".to_string(), "HEA".to_string()));
}

#[test]
fn test_band_around_optimum_keeps_score() {
    let s1 = dna("ACGTACGTAC");
    let s2 = dna("ACGTTACGAC");
    let full = bind(AlignmentConfig::default().output(OutputFields::Alignment).gap(GapScheme::linear(-1)));
    let banded = bind(
        AlignmentConfig::default()
            .gap(GapScheme::linear(-1))
            .band(Band::new(-1, 1))
            .output(OutputFields::Alignment),
    );
    let a = full.align_pair(&s1, &s2).unwrap();
    let b = banded.align_pair(&s1, &s2).unwrap();
    assert_eq!(a.score, Some(-2));
    assert_eq!(b.score, a.score);
    assert_eq!(
        b.alignment.unwrap().rows(),
        ("ACG-TACGTAC".to_string(), "ACGTTACG-AC".to_string())
    );

    let off_diagonal = bind(AlignmentConfig::default().gap(GapScheme::linear(-1)).band(Band::new(2, 4)));
    let c = off_diagonal.align_pair(&s1, &s2).unwrap();
    assert_eq!(c.score, None, "band misses the bottom-right cell");
    assert!(c.end_positions.is_none());
}

#[test]
fn test_unbounded_band_matches_unbanded() {
    let s1 = dna("ACGTAC");
    let s2 = dna("ACTAC");
    for output in [OutputFields::Score, OutputFields::Alignment] {
        let full = bind(affine_config().output(output));
        let unbounded = bind(affine_config().output(output).band(Band::new(isize::MIN, isize::MAX)));
        let expected = full.align_pair(&s1, &s2).unwrap();
        let got = unbounded.align_pair(&s1, &s2).unwrap();
        assert!(expected.score.is_some());
        assert_eq!(got.score, expected.score, "band covering every diagonal changed the score");
        assert_eq!(got.end_positions, expected.end_positions);
    }

    let below = bind(affine_config().output(OutputFields::Score).band(Band::new(isize::MIN, isize::MIN)));
    assert_eq!(below.align_pair(&s1, &s2).unwrap().score, None);
}

#[test]
fn test_score_only_storage_reports_score() {
    let aligner = bind(affine_config().output(OutputFields::Score).storage(MatrixStorage::ScoreOnly));
    let result = aligner.align_pair(&dna("ACGGTGG"), &dna("GCCGGTGCC")).unwrap();
    assert_eq!(result.score, Some(-10));
    assert!(result.end_positions.is_none());
    assert!(result.alignment.is_none());
}

#[test]
fn test_full_and_single_column_storage_agree() {
    let mut rng = StdRng::seed_from_u64(11);
    let full = bind(affine_config().storage(MatrixStorage::Full));
    let column = bind(affine_config().storage(MatrixStorage::SingleColumn));
    for _ in 0..50 {
        let s1 = random_dna(&mut rng, 0, 30);
        let s2 = random_dna(&mut rng, 0, 30);
        assert_eq!(
            full.align_pair(&s1, &s2).unwrap(),
            column.align_pair(&s1, &s2).unwrap(),
            "storage layout must not change the result"
        );
    }
}

// ============================================================================
// Randomized properties
// ============================================================================

#[test]
fn test_global_score_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(1);
    let aligner = bind(affine_config().output(OutputFields::Score));
    for _ in 0..200 {
        let a = random_dna(&mut rng, 0, 40);
        let b = random_dna(&mut rng, 0, 40);
        let ab = aligner.align_pair(&a, &b).unwrap().score;
        let ba = aligner.align_pair(&b, &a).unwrap().score;
        assert_eq!(ab, ba, "global score must be symmetric");
    }
}

#[test]
fn test_local_never_scores_below_global() {
    let mut rng = StdRng::seed_from_u64(2);
    let global = bind(affine_config().output(OutputFields::Score));
    let local = bind(affine_config().output(OutputFields::Score).method(Method::Local));
    for _ in 0..200 {
        let a = random_dna(&mut rng, 1, 40);
        let b = random_dna(&mut rng, 1, 40);
        let g = global.align_pair(&a, &b).unwrap().score.unwrap();
        let l = local.align_pair(&a, &b).unwrap().score.unwrap();
        assert!(l >= g, "local {l} < global {g}");
    }
}

#[test]
fn test_traceback_rescore_round_trip() {
    let mut rng = StdRng::seed_from_u64(3);
    for method in [Method::global(), Method::Local, Method::semi_global()] {
        let config = affine_config().method(method);
        let (scoring, gap) = (config.scoring, config.gap);
        let aligner = bind(config);
        for _ in 0..100 {
            let a = random_dna(&mut rng, 1, 35);
            let b = random_dna(&mut rng, 1, 35);
            let result = aligner.align_pair(&a, &b).unwrap();
            let alignment = result.alignment.expect("alignment requested");
            assert_eq!(
                Some(alignment.rescore(&scoring, gap)),
                result.score,
                "rescored alignment differs from reported score ({method:?})"
            );
        }
    }
}

#[test]
fn test_cigar_round_trip_rebuilds_alignment() {
    let mut rng = StdRng::seed_from_u64(41);
    let aligner = bind(affine_config());
    for _ in 0..100 {
        let a = random_dna(&mut rng, 0, 40);
        let b = random_dna(&mut rng, 0, 40);
        let alignment = aligner.align_pair(&a, &b).unwrap().alignment.expect("alignment requested");
        let rebuilt = Alignment::from_cigar_str(&alignment.cigar_string(), &a, &b).unwrap();
        assert_eq!(rebuilt, alignment, "CIGAR {} does not rebuild the alignment", alignment.cigar_string());
    }
}

#[test]
fn test_band_properties() {
    let mut rng = StdRng::seed_from_u64(4);
    let unbanded = bind(affine_config().output(OutputFields::Score));
    for _ in 0..100 {
        let a = random_dna(&mut rng, 1, 30);
        let b = random_dna(&mut rng, 1, 30);
        let reference = unbanded.align_pair(&a, &b).unwrap().score;

        let covering = Band::new(-(b.len() as isize), a.len() as isize);
        let wide = bind(affine_config().output(OutputFields::Score).band(covering));
        assert_eq!(wide.align_pair(&a, &b).unwrap().score, reference, "covering band changes score");

        let lower = rng.gen_range(-5..=0);
        let narrow = bind(affine_config().output(OutputFields::Score).band(Band::new(lower, lower + 2)));
        if let Some(score) = narrow.align_pair(&a, &b).unwrap().score {
            assert!(Some(score) <= reference, "narrow band beat the unbanded optimum");
        }
    }
}

#[test]
fn test_free_end_gaps_never_lower_score() {
    let mut rng = StdRng::seed_from_u64(5);
    let global = bind(affine_config().output(OutputFields::Score));
    let free = bind(affine_config().output(OutputFields::Score).method(Method::Global(FreeEndGaps::ALL)));
    for _ in 0..100 {
        let a = random_dna(&mut rng, 0, 30);
        let b = random_dna(&mut rng, 0, 30);
        let g = global.align_pair(&a, &b).unwrap().score.unwrap();
        let f = free.align_pair(&a, &b).unwrap().score.unwrap();
        assert!(f >= g, "free end gaps scored {f} below global {g}");
    }
}

// ============================================================================
// Configuration and driver behaviour
// ============================================================================

#[test]
fn test_invalid_configurations_are_rejected_at_bind() {
    let cases = vec![
        ("inverted band", AlignmentConfig::default().band(Band::new(3, -3))),
        ("positive gap", AlignmentConfig::default().gap(GapScheme::linear(1))),
        (
            "alignment without trace",
            AlignmentConfig::default()
                .output(OutputFields::Alignment)
                .storage(MatrixStorage::ScoreOnly),
        ),
        (
            "error bound with affine gaps",
            AlignmentConfig::default().gap(GapScheme::affine(-1, -3)).max_errors(2),
        ),
        (
            "vectorised traceback",
            AlignmentConfig::default().vectorised(true).output(OutputFields::Alignment),
        ),
        (
            "vectorised band",
            AlignmentConfig::default().vectorised(true).band(Band::new(-2, 2)),
        ),
    ];
    for (name, config) in cases {
        let err = PairwiseAligner::<Dna4, _>::bind(config).expect_err(name);
        assert!(err.is_configuration(), "{name}: expected configuration error, got {err}");
    }
}

#[test]
fn test_callbacks_follow_input_order() {
    let mut rng = StdRng::seed_from_u64(6);
    let pairs: Vec<(Vec<Dna4>, Vec<Dna4>)> = (0..37)
        .map(|_| (random_dna(&mut rng, 0, 25), random_dna(&mut rng, 0, 25)))
        .collect();
    let aligner = bind(affine_config().threads(3));

    let mut sequential = Vec::new();
    aligner.align_pairs(&pairs, |r| sequential.push(r)).unwrap();
    let mut parallel = Vec::new();
    aligner.align_pairs_parallel(&pairs, |r| parallel.push(r)).unwrap();

    let ids: Vec<usize> = sequential.iter().map(|r| r.sequence1_id).collect();
    assert_eq!(ids, (0..pairs.len()).collect::<Vec<_>>());
    assert_eq!(sequential, parallel, "parallel driver must match sequential results in order");
}

#[test]
fn test_vectorised_scores_match_scalar() {
    let mut rng = StdRng::seed_from_u64(7);
    let pairs: Vec<(Vec<Dna4>, Vec<Dna4>)> = (0..21)
        .map(|_| (random_dna(&mut rng, 1, 30), random_dna(&mut rng, 1, 30)))
        .collect();
    for method in [Method::global(), Method::Local] {
        let base = affine_config().output(OutputFields::ScoreEnd).method(method);
        let scalar = bind(base.clone());
        let batch = bind(base.vectorised(true));

        let mut expected = Vec::new();
        scalar.align_pairs(&pairs, |r| expected.push(r.score)).unwrap();
        let mut actual = Vec::new();
        batch.align_pairs(&pairs, |r| actual.push(r.score)).unwrap();
        assert_eq!(actual, expected, "batched scores differ ({method:?})");
    }
}

#[test]
fn test_empty_sequences_align_as_gaps() {
    let aligner = bind(affine_config());
    let result = aligner.align_pair(&dna("ACG"), &[]).unwrap();
    assert_eq!(result.score, Some(-14));
    assert_eq!(result.alignment.unwrap().rows(), ("ACG".to_string(), "---".to_string()));
    let both_empty = aligner.align_pair(&[], &[]).unwrap();
    assert_eq!(both_empty.score, Some(0));
}
