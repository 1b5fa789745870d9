extern crate neat_pilot;

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;
    use itertools::Itertools;
    use neat_pilot::neat::{
        common::Settings,
        genome::{ConnectionGene, Genome},
        network::Network,
        population::Population,
        seeded_rng,
    };

    fn run_generations(seed: u64, settings: &Settings, generations: usize) -> Population {
        let mut rng = seeded_rng(seed);
        let mut population = Population::init(&mut rng, settings).unwrap();
        for _ in 0..generations {
            let fitness = population
                .decode_networks()
                .iter_mut()
                .map(|network| network.predict(&[0.3, -0.7, 1.0]).map(|out| out[0] * 10.0).unwrap_or(0.))
                .collect_vec();
            population.assign_fitness(&fitness);
            population.next_generation(&mut rng);
        }
        population
    }

    #[test]
    fn test_genome_invariants_hold_over_a_run() {
        let settings = Settings {
            population_size: 60,
            ..Settings::standard(3, 2)
        };
        let population = run_generations(4, &settings, 30);

        for genome in population.genomes() {
            let innovations = genome.connections().iter().map(|gene| gene.innovation).collect_vec();
            assert!(innovations.windows(2).all(|pair| pair[0] < pair[1]));

            let hidden = genome.hidden_node_ids();
            assert!(hidden.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(hidden.iter().all(|node_id| node_id.0 >= 5));

            let declared = genome
                .input_node_ids()
                .iter()
                .chain(hidden)
                .chain(genome.output_node_ids())
                .collect_vec();
            for gene in genome.connections() {
                assert!(declared.contains(&&gene.in_node_id));
                assert!(declared.contains(&&gene.out_node_id));
                assert!(!genome.input_node_ids().contains(&gene.out_node_id));
            }
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let settings = Settings {
            population_size: 40,
            ..Settings::standard(3, 1)
        };
        let a = run_generations(99, &settings, 12);
        let b = run_generations(99, &settings, 12);
        assert_eq!(a.genomes(), b.genomes());
        assert_eq!(a.species().len(), b.species().len());
        assert_eq!(a.registry().peek_innovation(), b.registry().peek_innovation());
    }

    #[test]
    fn test_population_size_is_exact_every_generation() {
        let settings = Settings {
            population_size: 23,
            compatibility_threshold: 0.5,
            ..Settings::standard(3, 1)
        };
        let mut rng = seeded_rng(6);
        let mut population = Population::init(&mut rng, &settings).unwrap();
        for generation in 0..25 {
            let fitness = (0..23).map(|i| ((i * 7 + generation) % 11) as f64).collect_vec();
            population.assign_fitness(&fitness);
            let summary = population.next_generation(&mut rng);
            assert_eq!(summary.generation, generation);
            assert_eq!(population.genomes().len(), 23);
        }
    }

    #[test]
    fn test_four_genomes_with_one_fit_one_species() {
        let settings = Settings {
            population_size: 4,
            ..Settings::standard(2, 2)
        };
        let mut rng = seeded_rng(21);
        let mut population = Population::init(&mut rng, &settings).unwrap();
        population.assign_fitness(&[10.0, 0.0, 0.0, 0.0]);

        let summary = population.next_generation(&mut rng);

        assert_eq!(summary.species_count, 1);
        assert_eq!(summary.best_fitness, 10.0);
        assert_eq!(population.genomes().len(), 4);
        // the elite and the three copies of the only breeder carry its fitness over
        assert!(population.genomes().iter().all(|genome| genome.fitness == 10.0));
        assert!(population.genomes().iter().all(|genome| genome.output_node_ids().len() == 2));
    }

    #[test]
    fn test_single_connection_network() {
        let genome = Genome::create(vec![ConnectionGene::create(0, 2, 0.7, 0, true)], 2, 1);
        let mut network = Network::from_genome(&genome);
        let output = network.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(output.len(), 1);
        assert_approx_eq!(output[0], 1.0 / (1.0 + (-0.7f64).exp()));
    }

    #[test]
    fn test_one_extra_gene_is_excess() {
        let genes = |n: usize| (0..n).map(|i| ConnectionGene::create(0, 2, 0.5, i, true)).collect_vec();
        let shorter = Genome::create(genes(3), 2, 1);
        let longer = Genome::create(genes(4), 2, 1);
        assert_eq!(shorter.count_excess_genes(&longer), 1);
        assert_eq!(shorter.count_disjoint_genes(&longer), 0);
        assert_eq!(shorter.count_matching_genes(&longer), 3);
    }
}
