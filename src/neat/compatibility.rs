use super::genome::Genome;

/// Genomes with fewer genes than this are not normalised by their size.
pub const SMALL_GENOME_THRESHOLD: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Compatibility {
    pub excess_coefficient: f64,
    pub disjoint_coefficient: f64,
    pub weight_coefficient: f64,
    pub threshold: f64,
}

impl Compatibility {
    pub fn distance(&self, genome_1: &Genome, genome_2: &Genome) -> f64 {
        compatibility_distance(genome_1, genome_2, self)
    }

    pub fn is_compatible(&self, genome_1: &Genome, genome_2: &Genome) -> bool {
        self.distance(genome_1, genome_2) < self.threshold
    }
}

/// `c1 * E / N + c2 * D / N + c3 * W`, with `N` the larger gene count, or 1 while
/// that count is below [`SMALL_GENOME_THRESHOLD`].
pub fn compatibility_distance(genome_1: &Genome, genome_2: &Genome, coefficients: &Compatibility) -> f64 {
    let excess_count = genome_1.count_excess_genes(genome_2) as f64;
    let disjoint_count = genome_1.count_disjoint_genes(genome_2) as f64;
    let avg_weight_diff = genome_1.average_weight_difference(genome_2);

    let larger = std::cmp::max(genome_1.len(), genome_2.len());
    let n = if larger < SMALL_GENOME_THRESHOLD { 1. } else { larger as f64 };

    let excess_term = coefficients.excess_coefficient * excess_count / n;
    let disjoint_term = coefficients.disjoint_coefficient * disjoint_count / n;
    let weight_term = coefficients.weight_coefficient * avg_weight_diff;
    excess_term + disjoint_term + weight_term
}
