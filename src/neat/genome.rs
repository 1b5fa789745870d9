use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use rand_distr::{Distribution, Uniform};
use rustc_hash::FxHashSet;

use super::common::Settings;
use super::innovation::{InnovationNumber, InnovationRegistry, NodeId};
use super::vector::{align, align_filter_map, AlignedPair};

#[derive(Clone, Debug, PartialEq)]
pub struct ConnectionGene {
    pub in_node_id: NodeId,
    pub out_node_id: NodeId,
    pub weight: f64,
    pub enabled: bool,
    pub innovation: InnovationNumber,
}

impl ConnectionGene {
    pub fn create(in_node_id: usize, out_node_id: usize, weight: f64, innovation: usize, enabled: bool) -> ConnectionGene {
        ConnectionGene {
            in_node_id: NodeId(in_node_id),
            out_node_id: NodeId(out_node_id),
            weight,
            enabled,
            innovation: InnovationNumber(innovation),
        }
    }
}

/// The genetic encoding of one candidate network.
///
/// Connection genes are kept sorted by innovation number and hidden node ids in
/// ascending order; both are only reachable through accessors so the order cannot
/// be broken from outside. `fitness` is owned by the caller between generations.
#[derive(Clone, Debug, PartialEq)]
pub struct Genome {
    input_node_ids: Vec<NodeId>,
    output_node_ids: Vec<NodeId>,
    hidden_node_ids: Vec<NodeId>,
    connections: Vec<ConnectionGene>,
    pub fitness: f64,
}

impl Genome {
    /// A bootstrap genome: sensors `0..n`, outputs right after, nothing connected.
    pub fn init(n_sensor_nodes: usize, n_output_nodes: usize) -> Genome {
        let input_node_ids = (0..n_sensor_nodes).map(NodeId).collect();
        let output_node_ids = (n_sensor_nodes..n_sensor_nodes + n_output_nodes).map(NodeId).collect();
        Genome {
            input_node_ids,
            output_node_ids,
            hidden_node_ids: Vec::new(),
            connections: Vec::new(),
            fitness: 0.,
        }
    }

    /// Builds a genome from explicit genes. Any node id past the sensor and output
    /// block is taken to be a hidden node.
    pub fn create(genes: Vec<ConnectionGene>, n_sensor_nodes: usize, n_output_nodes: usize) -> Genome {
        let first_hidden = n_sensor_nodes + n_output_nodes;
        let hidden_node_ids = genes
            .iter()
            .flat_map(|gene| [gene.in_node_id.0, gene.out_node_id.0])
            .filter(|&node_id| node_id >= first_hidden)
            .collect();
        Genome::from_parts(genes, hidden_node_ids, n_sensor_nodes, n_output_nodes)
    }

    /// Builds a genome with an explicit hidden node list. Genes may reference ids the
    /// genome does not declare; decoding drops those.
    pub fn from_parts(genes: Vec<ConnectionGene>, hidden_node_ids: Vec<usize>, n_sensor_nodes: usize, n_output_nodes: usize) -> Genome {
        let hidden_node_ids = hidden_node_ids.into_iter().sorted().dedup().map(NodeId).collect();
        let connections = genes
            .into_iter()
            .sorted_by_key(|gene| gene.innovation)
            .dedup_by(|a, b| a.innovation == b.innovation)
            .collect();
        Genome {
            hidden_node_ids,
            connections,
            ..Genome::init(n_sensor_nodes, n_output_nodes)
        }
    }

    pub fn input_node_ids(&self) -> &[NodeId] {
        &self.input_node_ids
    }

    pub fn output_node_ids(&self) -> &[NodeId] {
        &self.output_node_ids
    }

    pub fn hidden_node_ids(&self) -> &[NodeId] {
        &self.hidden_node_ids
    }

    pub fn connections(&self) -> &[ConnectionGene] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn max_innovation(&self) -> Option<InnovationNumber> {
        self.connections.last().map(|gene| gene.innovation)
    }

    pub fn mutate<R: Rng>(&mut self, rng: &mut R, settings: &Settings, registry: &mut InnovationRegistry) {
        self.mutate_weights(
            rng,
            settings.mutate_weight_rate,
            settings.mutate_weight_replace_rate,
            settings.mutate_weight_scale,
        );
        if rng.gen::<f64>() < settings.mutate_add_connection_rate {
            self.mutate_add_connection(rng, registry);
        }
        if rng.gen::<f64>() < settings.mutate_add_node_rate {
            self.mutate_add_node(rng, registry);
        }
    }

    pub fn mutate_weights<R: Rng>(&mut self, rng: &mut R, mutation_rate: f64, replace_rate: f64, power: f64) {
        let between = Uniform::new(0.0, 1.0);
        let fresh = Uniform::new_inclusive(-1.0, 1.0);
        let perturbation = Uniform::new_inclusive(-power, power);
        for gene in self.connections.iter_mut() {
            if between.sample(rng) < mutation_rate {
                if between.sample(rng) < replace_rate {
                    gene.weight = fresh.sample(rng);
                } else {
                    gene.weight += perturbation.sample(rng);
                }
            }
        }
    }

    /// Connects a random pair of unconnected nodes with `in < out`. Returns whether
    /// a gene was added.
    pub fn mutate_add_connection<R: Rng>(&mut self, rng: &mut R, registry: &mut InnovationRegistry) -> bool {
        let existing: FxHashSet<(NodeId, NodeId)> = self
            .connections
            .iter()
            .map(|gene| (gene.in_node_id, gene.out_node_id))
            .collect();

        let sources = self.input_node_ids.iter().chain(self.hidden_node_ids.iter());
        let candidates = sources
            .cartesian_product(self.hidden_node_ids.iter().chain(self.output_node_ids.iter()))
            .map(|(&in_node_id, &out_node_id)| (in_node_id, out_node_id))
            .filter(|&(in_node_id, out_node_id)| in_node_id < out_node_id)
            .filter(|pair| !existing.contains(pair))
            .collect_vec();

        let Some(&(in_node_id, out_node_id)) = candidates.choose(rng) else {
            return false;
        };

        let weight = rng.gen_range(-1.0..=1.0);
        self.connections.push(ConnectionGene {
            in_node_id,
            out_node_id,
            weight,
            enabled: true,
            innovation: registry.next_innovation(),
        });
        true
    }

    /// Splits a random enabled connection `a -> b` into `a -> new` (weight 1) and
    /// `new -> b` (the old weight), disabling the original. Returns whether a node
    /// was added.
    pub fn mutate_add_node<R: Rng>(&mut self, rng: &mut R, registry: &mut InnovationRegistry) -> bool {
        let enabled = self
            .connections
            .iter()
            .positions(|gene| gene.enabled)
            .collect_vec();
        let Some(&gene_index) = enabled.choose(rng) else {
            return false;
        };

        let split = &mut self.connections[gene_index];
        split.enabled = false;
        let (in_node_id, out_node_id, weight) = (split.in_node_id, split.out_node_id, split.weight);

        let new_node_id = registry.next_node_id();
        self.hidden_node_ids.push(new_node_id);
        self.connections.push(ConnectionGene {
            in_node_id,
            out_node_id: new_node_id,
            weight: 1.,
            enabled: true,
            innovation: registry.next_innovation(),
        });
        self.connections.push(ConnectionGene {
            in_node_id: new_node_id,
            out_node_id,
            weight,
            enabled: true,
            innovation: registry.next_innovation(),
        });
        true
    }

    fn walk<'a, M>(&'a self, other: &'a Genome, map: M)
    where
        M: FnMut(AlignedPair<'a, ConnectionGene>),
    {
        align(&self.connections, &other.connections, |gene| gene.innovation, map);
    }

    pub fn count_excess_genes(&self, other: &Genome) -> usize {
        let (max_self, max_other) = (self.max_innovation(), other.max_innovation());
        let mut excess = 0;
        self.walk(other, |pair| match pair {
            AlignedPair::HasLeft(gene) if Some(gene.innovation) > max_other => excess += 1,
            AlignedPair::HasRight(gene) if Some(gene.innovation) > max_self => excess += 1,
            _ => {}
        });
        excess
    }

    pub fn count_disjoint_genes(&self, other: &Genome) -> usize {
        let (max_self, max_other) = (self.max_innovation(), other.max_innovation());
        let mut disjoint = 0;
        self.walk(other, |pair| match pair {
            AlignedPair::HasLeft(gene) if Some(gene.innovation) <= max_other => disjoint += 1,
            AlignedPair::HasRight(gene) if Some(gene.innovation) <= max_self => disjoint += 1,
            _ => {}
        });
        disjoint
    }

    pub fn count_matching_genes(&self, other: &Genome) -> usize {
        let mut matching = 0;
        self.walk(other, |pair| {
            if let AlignedPair::HasBoth(..) = pair {
                matching += 1;
            }
        });
        matching
    }

    /// Mean absolute weight difference over genes both genomes carry, 0 if none.
    pub fn average_weight_difference(&self, other: &Genome) -> f64 {
        let mut total_weight_diff = 0.;
        let mut matching = 0;
        self.walk(other, |pair| {
            if let AlignedPair::HasBoth(left, right) = pair {
                total_weight_diff += (left.weight - right.weight).abs();
                matching += 1;
            }
        });
        if matching > 0 {
            total_weight_diff / matching as f64
        } else {
            0.
        }
    }
}

/// Produces a child of two parents.
///
/// Matching genes come from either parent at random; a gene disabled in either
/// parent is re-enabled with probability `reenable_rate`. Genes only the fitter
/// parent carries are always inherited, genes only the weaker parent carries never
/// are. `parent_1` counts as fitter on a tie.
pub fn cross_over<R: Rng>(rng: &mut R, parent_1: &Genome, parent_2: &Genome, reenable_rate: f64) -> Genome {
    let (fitter, other) = if parent_1.fitness >= parent_2.fitness {
        (parent_1, parent_2)
    } else {
        (parent_2, parent_1)
    };

    let connections = align_filter_map(&fitter.connections, &other.connections, |gene| gene.innovation, |pair| {
        match pair {
            AlignedPair::HasBoth(from_fitter, from_other) => {
                let mut child_gene = if rng.gen_bool(0.5) {
                    from_fitter.clone()
                } else {
                    from_other.clone()
                };
                if !from_fitter.enabled || !from_other.enabled {
                    child_gene.enabled = rng.gen::<f64>() < reenable_rate;
                }
                Some(child_gene)
            }
            AlignedPair::HasLeft(from_fitter) => Some(from_fitter.clone()),
            AlignedPair::HasRight(_) => None,
        }
    });

    let hidden_node_ids = fitter
        .hidden_node_ids
        .iter()
        .merge(other.hidden_node_ids.iter())
        .dedup()
        .copied()
        .collect();

    Genome {
        input_node_ids: fitter.input_node_ids.clone(),
        output_node_ids: fitter.output_node_ids.clone(),
        hidden_node_ids,
        connections,
        fitness: 0.,
    }
}
