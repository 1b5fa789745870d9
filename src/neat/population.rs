use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use rayon::iter::{IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelIterator};
use tracing::{debug, error, info, warn};

use super::common::Settings;
use super::error::SettingsError;
use super::genome::{cross_over, Genome};
use super::innovation::InnovationRegistry;
use super::network::Network;
use super::species::Species;

/// Below this total of average adjusted fitness, offspring are split evenly.
const OFFSPRING_EPSILON: f64 = 1e-5;

/// Scores one decoded network. Called from rayon workers, each owning its network.
pub trait Evaluator: Sync {
    fn evaluate(&self, network: &mut Network) -> f64;
}

/// What `next_generation` saw in the generation it just replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    /// Species left after stagnation pruning.
    pub species_count: usize,
    pub pruned_species: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
}

#[derive(Clone, Debug)]
pub struct Population {
    settings: Settings,
    genomes: Vec<Genome>,
    species: Vec<Species>,
    registry: InnovationRegistry,
    generation: usize,
    next_species_id: usize,
}

impl Population {
    pub fn init<R: Rng>(rng: &mut R, settings: &Settings) -> Result<Population, SettingsError> {
        settings.validate()?;

        let mut population = Population {
            settings: settings.clone(),
            genomes: bootstrap_genomes(settings),
            species: Vec::new(),
            registry: InnovationRegistry::new(settings.n_sensor_nodes, settings.n_output_nodes),
            generation: 0,
            next_species_id: 0,
        };
        population.speciate(rng);
        info!(
            population_size = settings.population_size,
            species = population.species.len(),
            "population initialized"
        );
        Ok(population)
    }

    /// Starts the run over in place with the same settings.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.registry.reset();
        self.species.clear();
        self.next_species_id = 0;
        self.generation = 0;
        self.genomes = bootstrap_genomes(&self.settings);
        self.speciate(rng);
        info!(population_size = self.settings.population_size, "population reset");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Fitness can be written directly; the genome count is fixed.
    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    /// Copies fitness values onto genomes by index. Genomes without a value get 0.
    pub fn assign_fitness(&mut self, fitness: &[f64]) {
        if fitness.len() != self.genomes.len() {
            error!(
                genomes = self.genomes.len(),
                values = fitness.len(),
                "fitness count does not match genome count, missing values default to 0"
            );
        }
        for (index, genome) in self.genomes.iter_mut().enumerate() {
            genome.fitness = fitness.get(index).copied().unwrap_or(0.);
        }
    }

    pub fn decode_networks(&self) -> Vec<Network> {
        self.genomes.par_iter().map(Network::from_genome).collect()
    }

    /// Decodes and scores every genome in parallel, writing the score as its fitness.
    pub fn evaluate<E: Evaluator>(&mut self, evaluator: &E) {
        self.genomes.par_iter_mut().for_each(|genome| {
            let mut network = Network::from_genome(genome);
            genome.fitness = evaluator.evaluate(&mut network);
        });
    }

    /// The fittest genome of the current generation, the first one on ties.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .reduce(|best, genome| if genome.fitness > best.fitness { genome } else { best })
    }

    /// Replaces the current genomes, whose fitness the caller has already written,
    /// with the next generation.
    pub fn next_generation<R: Rng>(&mut self, rng: &mut R) -> GenerationSummary {
        self.sanitize_fitness();
        let (best_fitness, mean_fitness) = self.fitness_stats();

        self.speciate(rng);
        debug!(generation = self.generation, species = self.species.len(), "speciated");

        for species in self.species.iter_mut() {
            species.update_staleness_and_best_fitness();
        }
        let pruned_species = self.prune_stale_species();

        self.allocate_offspring();
        let mut offspring = self.reproduce(rng);
        for genome in offspring.iter_mut() {
            genome.mutate(rng, &self.settings, &mut self.registry);
        }
        self.genomes = offspring;

        let summary = GenerationSummary {
            generation: self.generation,
            species_count: self.species.len(),
            pruned_species,
            best_fitness,
            mean_fitness,
        };
        info!(
            generation = summary.generation,
            species = summary.species_count,
            pruned = summary.pruned_species,
            best = summary.best_fitness,
            mean = summary.mean_fitness,
            "generation complete"
        );
        self.generation += 1;
        summary
    }

    fn sanitize_fitness(&mut self) {
        for (index, genome) in self.genomes.iter_mut().enumerate() {
            if !genome.fitness.is_finite() {
                warn!(genome = index, fitness = genome.fitness, "non-finite fitness replaced with 0");
                genome.fitness = 0.;
            }
        }
    }

    fn fitness_stats(&self) -> (f64, f64) {
        let best = self.genomes.iter().map(|genome| genome.fitness).reduce(f64::max).unwrap_or(0.);
        let mean = if self.genomes.is_empty() {
            0.
        } else {
            self.genomes.iter().map(|genome| genome.fitness).sum::<f64>() / self.genomes.len() as f64
        };
        (best, mean)
    }

    /// First-fit assignment against the current representatives, in species order.
    fn speciate<R: Rng>(&mut self, rng: &mut R) {
        let compatibility = self.settings.compatibility();
        for species in self.species.iter_mut() {
            species.reset_for_next_generation(rng);
        }

        for genome in &self.genomes {
            match self
                .species
                .iter_mut()
                .find(|species| species.is_compatible(genome, &compatibility))
            {
                Some(species) => species.add_member(genome.clone()),
                None => {
                    self.species.push(Species::new(self.next_species_id, genome.clone()));
                    self.next_species_id += 1;
                }
            }
        }

        self.species.retain(|species| !species.members.is_empty());
    }

    /// Drops stagnant species in order, never going below `n_species_min`.
    fn prune_stale_species(&mut self) -> usize {
        let max_stale = self.settings.max_stagnation_generations;
        let floor = self.settings.n_species_min;
        let before = self.species.len();
        let mut remaining = before;
        self.species.retain(|species| {
            if species.stale_generations() >= max_stale && remaining > floor {
                debug!(species = species.id, stale = species.stale_generations(), "pruning stagnant species");
                remaining -= 1;
                false
            } else {
                true
            }
        });
        before - remaining
    }

    fn allocate_offspring(&mut self) {
        for species in self.species.iter_mut() {
            species.calculate_adjusted_fitnesses();
        }
        let averages = self.species.iter().map(Species::average_adjusted_fitness).collect_vec();
        let quotas = offspring_quotas(&averages, self.settings.population_size);
        for (species, quota) in self.species.iter_mut().zip(quotas) {
            species.expected_offspring = quota;
        }
    }

    fn reproduce<R: Rng>(&mut self, rng: &mut R) -> Vec<Genome> {
        let settings = &self.settings;
        let mut offspring = Vec::with_capacity(settings.population_size);

        for species in self.species.iter_mut() {
            let quota = species.expected_offspring;
            if species.members.is_empty() || quota == 0 {
                continue;
            }
            debug!(
                species = species.id,
                members = species.members.len(),
                quota,
                best = species.champion().map_or(0., |genome| genome.fitness),
                "reproducing species"
            );
            species.sort_members();

            let n_members = species.members.len();
            let n_elites = settings.elitism.min(n_members).min(quota);
            offspring.extend(species.members.iter().take(n_elites).cloned());

            let pool_size = (n_members * settings.survival_threshold_percent / 100).clamp(1, n_members);
            let pool = &species.members[..pool_size];
            for _ in n_elites..quota {
                if pool.len() < 2 {
                    offspring.push(pool[0].clone());
                    continue;
                }
                let parents = (
                    tournament_select(rng, pool, settings.tournament_size),
                    tournament_select(rng, pool, settings.tournament_size),
                );
                match parents {
                    (Some(parent_1), Some(parent_2)) => {
                        offspring.push(cross_over(rng, parent_1, parent_2, settings.reenable_rate))
                    }
                    _ => {
                        error!(species = species.id, "tournament selection came back empty, using a fresh genome");
                        offspring.push(Genome::init(settings.n_sensor_nodes, settings.n_output_nodes));
                    }
                }
            }
        }

        let shortfall = settings.population_size.saturating_sub(offspring.len());
        if shortfall > 0 {
            let previous = self
                .genomes
                .iter()
                .sorted_by(|a, b| b.fitness.total_cmp(&a.fitness))
                .collect_vec();
            if previous.is_empty() {
                error!(shortfall, "no previous generation to pad from, using fresh genomes");
                offspring.extend((0..shortfall).map(|_| Genome::init(settings.n_sensor_nodes, settings.n_output_nodes)));
            } else {
                warn!(shortfall, "padding the next generation with copies of the previous one");
                offspring.extend(previous.iter().cycle().take(shortfall).map(|&genome| genome.clone()));
            }
        }
        offspring.truncate(settings.population_size);
        offspring
    }
}

fn bootstrap_genomes(settings: &Settings) -> Vec<Genome> {
    (0..settings.population_size)
        .map(|_| Genome::init(settings.n_sensor_nodes, settings.n_output_nodes))
        .collect()
}

/// Splits `population_size` across species in proportion to their average adjusted
/// fitness. The result always sums to `population_size` when `averages` is not empty.
fn offspring_quotas(averages: &[f64], population_size: usize) -> Vec<usize> {
    if averages.is_empty() {
        return Vec::new();
    }

    let total: f64 = averages.iter().sum();
    let mut quotas = if total > OFFSPRING_EPSILON {
        averages
            .iter()
            .map(|average| (average / total * population_size as f64).floor().max(0.) as usize)
            .collect_vec()
    } else {
        vec![population_size / averages.len(); averages.len()]
    };

    let strongest_first = (0..averages.len())
        .sorted_by(|&a, &b| averages[b].total_cmp(&averages[a]))
        .collect_vec();

    let mut allocated: usize = quotas.iter().sum();
    for &index in strongest_first.iter().cycle() {
        if allocated >= population_size {
            break;
        }
        quotas[index] += 1;
        allocated += 1;
    }
    // only reachable with negative fitness
    for &index in strongest_first.iter().rev() {
        let excess = allocated.saturating_sub(population_size).min(quotas[index]);
        quotas[index] -= excess;
        allocated -= excess;
    }
    quotas
}

/// Draws `tournament_size` genomes with replacement and keeps the fittest, the
/// earliest draw on ties. `None` only for an empty pool.
fn tournament_select<'a, R: Rng>(rng: &mut R, pool: &'a [Genome], tournament_size: usize) -> Option<&'a Genome> {
    (0..tournament_size)
        .filter_map(|_| pool.choose(rng))
        .reduce(|best, contender| if contender.fitness > best.fitness { contender } else { best })
}
