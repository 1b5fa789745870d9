use rand::{seq::SliceRandom, Rng};

use super::compatibility::Compatibility;
use super::genome::Genome;

/// A cluster of genomes within compatibility distance of a shared representative.
///
/// Members are copies taken at speciation time and are replaced every generation.
/// The representative drifts: each reset picks a random member as the next anchor.
#[derive(Clone, Debug)]
pub struct Species {
    pub id: usize,
    representative: Genome,
    pub members: Vec<Genome>,
    best_fitness_ever: f64,
    stale_generations: usize,
    pub expected_offspring: usize,
    adjusted_fitness_sum: f64,
}

impl Species {
    pub fn new(id: usize, founder: Genome) -> Species {
        Species {
            id,
            representative: founder.clone(),
            best_fitness_ever: founder.fitness,
            members: vec![founder],
            stale_generations: 0,
            expected_offspring: 0,
            adjusted_fitness_sum: 0.,
        }
    }

    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    pub fn best_fitness_ever(&self) -> f64 {
        self.best_fitness_ever
    }

    pub fn stale_generations(&self) -> usize {
        self.stale_generations
    }

    pub fn is_compatible(&self, genome: &Genome, compatibility: &Compatibility) -> bool {
        compatibility.is_compatible(genome, &self.representative)
    }

    /// Does not check compatibility, callers do that first.
    pub fn add_member(&mut self, genome: Genome) {
        self.members.push(genome);
    }

    /// Explicit fitness sharing: every member's fitness is divided by the member count.
    pub fn calculate_adjusted_fitnesses(&mut self) {
        self.adjusted_fitness_sum = 0.;
        if self.members.is_empty() {
            return;
        }
        let n_members = self.members.len() as f64;
        self.adjusted_fitness_sum = self.members.iter().map(|genome| genome.fitness / n_members).sum();
    }

    pub fn average_adjusted_fitness(&self) -> f64 {
        if self.members.is_empty() {
            0.
        } else {
            self.adjusted_fitness_sum / self.members.len() as f64
        }
    }

    pub fn update_staleness_and_best_fitness(&mut self) {
        let generation_best = self
            .members
            .iter()
            .map(|genome| genome.fitness)
            .reduce(f64::max)
            .unwrap_or(0.);
        if generation_best > self.best_fitness_ever {
            self.best_fitness_ever = generation_best;
            self.stale_generations = 0;
        } else {
            self.stale_generations += 1;
        }
    }

    pub fn reset_for_next_generation<R: Rng>(&mut self, rng: &mut R) {
        if let Some(member) = self.members.choose(rng) {
            self.representative = member.clone();
        }
        self.members.clear();
        self.expected_offspring = 0;
        self.adjusted_fitness_sum = 0.;
    }

    /// Sorts members by descending fitness, keeping the current order among ties.
    pub fn sort_members(&mut self) {
        self.members.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
    }

    pub fn champion(&self) -> Option<&Genome> {
        self.members
            .iter()
            .reduce(|best, genome| if genome.fitness > best.fitness { genome } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neat::{common::Settings, genome::ConnectionGene};
    use assert_approx_eq::assert_approx_eq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn genome_with_fitness(fitness: f64) -> Genome {
        let mut genome = Genome::create(vec![ConnectionGene::create(0, 2, fitness / 10., 0, true)], 2, 1);
        genome.fitness = fitness;
        genome
    }

    fn species_with(fitnesses: &[f64]) -> Species {
        let mut species = Species::new(0, genome_with_fitness(fitnesses[0]));
        for &fitness in &fitnesses[1..] {
            species.add_member(genome_with_fitness(fitness));
        }
        species
    }

    #[test]
    fn test_new_species_has_founder() {
        let species = Species::new(3, genome_with_fitness(4.0));
        assert_eq!(species.id, 3);
        assert_eq!(species.members.len(), 1);
        assert_eq!(species.best_fitness_ever(), 4.0);
        assert_eq!(species.representative().fitness, 4.0);
    }

    #[test]
    fn test_is_compatible_uses_threshold() {
        let species = Species::new(0, genome_with_fitness(1.0));
        let compatibility = Settings::standard(2, 1).compatibility();
        assert!(species.is_compatible(&genome_with_fitness(1.0), &compatibility));

        let far = Genome::create((0..8).map(|i| ConnectionGene::create(0, 2, 0.0, i + 1, true)).collect(), 2, 1);
        assert!(!species.is_compatible(&far, &compatibility));
    }

    #[test]
    fn test_adjusted_fitness() {
        let mut species = species_with(&[4.0, 2.0, 0.0, 6.0]);
        species.calculate_adjusted_fitnesses();
        // sum of f / 4 is 3, averaged over 4 members
        assert_approx_eq!(species.average_adjusted_fitness(), 0.75);
    }

    #[test]
    fn test_adjusted_fitness_empty() {
        let mut species = species_with(&[1.0]);
        species.members.clear();
        species.calculate_adjusted_fitnesses();
        assert_eq!(species.average_adjusted_fitness(), 0.);
    }

    #[test]
    fn test_staleness() {
        let mut species = species_with(&[1.0, 2.0]);
        species.update_staleness_and_best_fitness();
        assert_eq!(species.stale_generations(), 0);
        assert_eq!(species.best_fitness_ever(), 2.0);

        species.update_staleness_and_best_fitness();
        assert_eq!(species.stale_generations(), 1);

        species.members.push(genome_with_fitness(3.0));
        species.update_staleness_and_best_fitness();
        assert_eq!(species.stale_generations(), 0);
        assert_eq!(species.best_fitness_ever(), 3.0);
    }

    #[test]
    fn test_reset_picks_member_as_representative() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut species = species_with(&[1.0, 5.0, 9.0]);
        species.expected_offspring = 7;
        let members = species.members.clone();

        species.reset_for_next_generation(&mut rng);

        assert!(members.contains(species.representative()));
        assert!(species.members.is_empty());
        assert_eq!(species.expected_offspring, 0);
    }

    #[test]
    fn test_reset_keeps_representative_when_empty() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
        let mut species = species_with(&[1.0]);
        species.members.clear();
        species.reset_for_next_generation(&mut rng);
        assert_eq!(species.representative().fitness, 1.0);
    }

    #[test]
    fn test_sort_and_champion() {
        let mut species = species_with(&[1.0, 5.0, 3.0, 5.0]);
        assert_eq!(species.champion().map(|g| g.fitness), Some(5.0));
        species.sort_members();
        let fitnesses = species.members.iter().map(|g| g.fitness).collect::<Vec<_>>();
        assert_eq!(fitnesses, vec![5.0, 5.0, 3.0, 1.0]);
    }
}
