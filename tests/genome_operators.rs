use rand::rngs::StdRng;
use rand::SeedableRng;
use tierbias::engines::generation::{
    roulette_selection_gated, select_parent, GenerationStatistics, Genome, SelectionMiss,
};
use tierbias::error::GenomeError;

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

fn scored(genes: Vec<bool>, score: f64) -> Genome {
    let mut genome = Genome::from_genes(genes);
    genome.set_score(score);
    genome
}

#[test]
fn test_random_genome_has_requested_length() {
    let mut rng = rng();
    for len in [1, 2, 7, 64, 301] {
        let genome = Genome::random(len, &mut rng).unwrap();
        assert_eq!(genome.len(), len);
        assert!(genome.score().is_none());
    }
    assert!(Genome::random(0, &mut rng).is_err());
}

#[test]
fn test_clone_is_independent() {
    let mut rng = rng();
    let original = Genome::random(32, &mut rng).unwrap();
    let snapshot = original.genes().to_vec();

    let mut copy = original.try_clone().unwrap();
    copy.mutate(50, &mut rng);

    assert_eq!(original.genes(), snapshot.as_slice());
    assert_eq!(Genome::from_genes(Vec::new()).try_clone(), Err(GenomeError::Empty));
}

#[test]
fn test_crossover_rejects_unequal_lengths() {
    let mut rng = rng();
    let a = Genome::random(8, &mut rng).unwrap();
    let b = Genome::random(10, &mut rng).unwrap();
    assert_eq!(
        Genome::crossover(&a, &b, &mut rng),
        Err(GenomeError::LengthMismatch { left: 8, right: 10 })
    );

    let empty = Genome::from_genes(Vec::new());
    assert_eq!(
        Genome::crossover(&empty, &empty.clone(), &mut rng),
        Err(GenomeError::Empty)
    );
}

#[test]
fn test_crossover_swaps_one_contiguous_segment() {
    let mut rng = rng();
    let zeros = Genome::from_genes(vec![false; 20]);
    let ones = Genome::from_genes(vec![true; 20]);

    for _ in 0..200 {
        let (c1, c2) = Genome::crossover(&zeros, &ones, &mut rng).unwrap();

        // Children are complements and at least one gene moved.
        for (x, y) in c1.genes().iter().zip(c2.genes()) {
            assert_ne!(x, y);
        }
        let swapped: Vec<usize> = c1
            .genes()
            .iter()
            .enumerate()
            .filter(|(_, &g)| g)
            .map(|(i, _)| i)
            .collect();
        assert!(!swapped.is_empty());
        let first = swapped[0];
        let last = *swapped.last().unwrap();
        assert_eq!(swapped.len(), last - first + 1);
    }

    // Parents are untouched.
    assert!(zeros.genes().iter().all(|g| !g));
    assert!(ones.genes().iter().all(|&g| g));
}

#[test]
fn test_mutate_zero_is_noop() {
    let mut rng = rng();
    let mut genome = Genome::random(16, &mut rng).unwrap();
    let before = genome.clone();
    genome.mutate(0, &mut rng);
    assert_eq!(genome, before);
}

#[test]
fn test_mutate_flips_at_most_count_genes() {
    let mut rng = rng();
    let mut genome = Genome::from_genes(vec![false; 64]);
    genome.mutate(5, &mut rng);
    let flipped = genome.genes().iter().filter(|&&g| g).count();
    assert!(flipped <= 5);
    // Odd flip count means at least one gene changed.
    assert!(flipped % 2 == 1);
}

#[test]
fn test_decode_pairs() {
    let genome = Genome::from_genes(vec![false, false, false, true, true, false, true, true]);
    assert_eq!(genome.decode().unwrap(), vec![0, 1, 2, 3]);
    assert_eq!(genome.decode().unwrap(), genome.decode().unwrap());

    let odd = Genome::from_genes(vec![true, false, true]);
    assert_eq!(odd.decode(), Err(GenomeError::OddLength(3)));
}

#[test]
fn test_gated_selection_never_picks_below_average() {
    let population = vec![
        scored(vec![false, false, false, false], 10.0),
        scored(vec![false, true, false, true], 20.0),
        scored(vec![true, false, true, false], 30.0),
        scored(vec![true, true, true, true], 40.0),
    ];
    let scores: Vec<f64> = population.iter().map(Genome::fitness).collect();
    let stats = GenerationStatistics::from_scores(&scores).unwrap();
    assert_eq!(stats.average, 25.0);

    let mut rng = rng();
    let mut hits = [0usize; 4];
    let mut misses = 0;
    for _ in 0..5_000 {
        match roulette_selection_gated(&population, &stats, &mut rng) {
            Ok(idx) => hits[idx] += 1,
            Err(SelectionMiss::BelowAverage) => misses += 1,
            Err(other) => panic!("unexpected miss: {other}"),
        }
    }
    assert_eq!(hits[0], 0);
    assert_eq!(hits[1], 0);
    assert!(hits[2] > 0 && hits[3] > 0);
    assert_eq!(misses, 0);

    for _ in 0..1_000 {
        let idx = select_parent(&population, &stats, &mut rng).unwrap();
        assert!(idx >= 2);
    }
}

#[test]
fn test_selection_falls_back_when_wheel_is_empty() {
    let population = vec![
        scored(vec![false, false], 0.0),
        scored(vec![true, true], 0.0),
    ];
    let stats = GenerationStatistics::from_scores(&[0.0, 0.0]).unwrap();
    let mut rng = rng();

    assert_eq!(
        roulette_selection_gated(&population, &stats, &mut rng),
        Err(SelectionMiss::BelowAverage)
    );
    assert!(select_parent(&population, &stats, &mut rng).is_ok());
    assert_eq!(
        select_parent(&[], &stats, &mut rng),
        Err(SelectionMiss::EmptyPopulation)
    );
}
