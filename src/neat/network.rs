use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxBuildHasher;
use tracing::warn;

use super::error::NetworkError;
use super::genome::Genome;
use super::innovation::NodeId;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum NodeType {
    Input,
    Hidden,
    Output,
}

#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub struct NodeIndex(pub usize);

#[derive(Clone, Debug)]
pub struct Link {
    pub from: NodeId,
    pub weight: f64,
    source: NodeIndex,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub node_type: NodeType,
    /// Carried for every node but not evolved, so always 0.
    pub bias: f64,
    pub activation: f64,
    pub incoming: Vec<Link>,
}

impl Node {
    fn create(id: NodeId, node_type: NodeType) -> Node {
        Node {
            id,
            node_type,
            bias: 0.,
            activation: 0.,
            incoming: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeMap(IndexMap<NodeId, Node, FxBuildHasher>);

impl NodeMap {
    fn with_capacity(capacity: usize) -> NodeMap {
        NodeMap(IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher))
    }

    fn get_or_create(&mut self, node_id: NodeId, node_type: NodeType) -> NodeIndex {
        let entry = self.0.entry(node_id);
        let index = entry.index();
        entry.or_insert_with(|| Node::create(node_id, node_type));
        NodeIndex(index)
    }

    pub fn get(&self, node_id: NodeId) -> Option<&Node> {
        self.0.get(&node_id)
    }

    pub fn get_index_of(&self, node_id: NodeId) -> Option<NodeIndex> {
        self.0.get_index_of(&node_id).map(NodeIndex)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<NodeIndex> for NodeMap {
    type Output = Node;
    fn index(&self, index: NodeIndex) -> &Self::Output {
        &self.0[index.0]
    }
}

impl IndexMut<NodeIndex> for NodeMap {
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output {
        &mut self.0[index.0]
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The executable feed-forward network decoded from a [`Genome`].
///
/// Owns copies of everything it needs; the genome can be dropped or mutated once
/// decoding returns. Nodes are evaluated hidden-ascending then outputs in declared
/// order, which is sound because hidden ids are minted in creation order above
/// every sensor and output id.
#[derive(Clone, Debug)]
pub struct Network {
    nodes: NodeMap,
    inputs: Vec<NodeIndex>,
    outputs: Vec<NodeIndex>,
    activation_order: Vec<NodeIndex>,
}

impl Network {
    pub fn from_genome(genome: &Genome) -> Network {
        let n_nodes = genome.input_node_ids().len() + genome.hidden_node_ids().len() + genome.output_node_ids().len();
        let mut nodes = NodeMap::with_capacity(n_nodes);

        let inputs = genome
            .input_node_ids()
            .iter()
            .map(|&node_id| nodes.get_or_create(node_id, NodeType::Input))
            .collect_vec();
        let hidden = genome
            .hidden_node_ids()
            .iter()
            .sorted()
            .map(|&node_id| nodes.get_or_create(node_id, NodeType::Hidden))
            .collect_vec();
        let outputs = genome
            .output_node_ids()
            .iter()
            .map(|&node_id| nodes.get_or_create(node_id, NodeType::Output))
            .collect_vec();

        for gene in genome.connections().iter().filter(|gene| gene.enabled) {
            match (nodes.get_index_of(gene.in_node_id), nodes.get_index_of(gene.out_node_id)) {
                (Some(source), Some(target)) => nodes[target].incoming.push(Link {
                    from: gene.in_node_id,
                    weight: gene.weight,
                    source,
                }),
                _ => warn!(
                    in_node = gene.in_node_id.0,
                    out_node = gene.out_node_id.0,
                    innovation = gene.innovation.0,
                    "connection gene references a node the genome does not declare; dropping it"
                ),
            }
        }

        let activation_order = hidden
            .into_iter()
            .chain(outputs.iter().copied())
            .filter(|&index| nodes[index].node_type != NodeType::Input)
            .unique()
            .collect();

        Network {
            nodes,
            inputs,
            outputs,
            activation_order,
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn predict(&mut self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.inputs.len() {
            return Err(NetworkError::InvalidInputSize {
                expected: self.inputs.len(),
                actual: inputs.len(),
            });
        }

        for index in &self.activation_order {
            self.nodes[*index].activation = 0.;
        }
        for (&index, &value) in self.inputs.iter().zip(inputs) {
            self.nodes[index].activation = value;
        }

        for &index in &self.activation_order {
            let node = &self.nodes[index];
            let active_sum = node
                .incoming
                .iter()
                .fold(node.bias, |acc, link| acc + self.nodes[link.source].activation * link.weight);
            self.nodes[index].activation = sigmoid(active_sum);
        }

        Ok(self.outputs.iter().map(|&index| self.nodes[index].activation).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neat::genome::ConnectionGene;
    use assert_approx_eq::assert_approx_eq;

    fn genome_sample_feed_forward_1() -> Genome {
        Genome::create(vec![
            ConnectionGene::create(0, 4, -0.1, 0, true),
            ConnectionGene::create(4, 3, 0.6, 1, true),
            ConnectionGene::create(1, 5, -0.8, 2, true),
            ConnectionGene::create(5, 3, -0.9, 3, true),
            ConnectionGene::create(0, 5, 0.6, 4, true),
            ConnectionGene::create(5, 2, 0.4, 5, true),
            ConnectionGene::create(1, 2, 5.0, 6, false),
        ], 2, 2)
    }

    #[test]
    fn test_network_creation() {
        let network = Network::from_genome(&genome_sample_feed_forward_1());
        assert_eq!(network.len(), 6);
        assert_eq!(network.input_count(), 2);
        assert_eq!(network.output_count(), 2);
        assert_eq!(network.node(NodeId(4)).map(|n| n.node_type), Some(NodeType::Hidden));
        let sources = network.node(NodeId(3)).map(|n| n.incoming.iter().map(|link| link.from).collect_vec());
        assert_eq!(sources, Some(vec![NodeId(4), NodeId(5)]));
        // the disabled gene is not attached
        assert_eq!(network.node(NodeId(2)).map(|n| n.incoming.len()), Some(1));
    }

    #[test]
    fn test_single_connection() {
        let genome = Genome::create(vec![ConnectionGene::create(0, 2, 0.7, 0, true)], 2, 2);
        let mut network = Network::from_genome(&genome);
        let output = network.predict(&[1.0, 0.0]).unwrap();
        assert_approx_eq!(output[0], sigmoid(0.7));
        assert_approx_eq!(output[1], 0.5);
    }

    #[test]
    fn test_feed_forward() {
        let mut network = Network::from_genome(&genome_sample_feed_forward_1());
        let output = network.predict(&[0.5, -0.2]).unwrap();

        let h4 = sigmoid(0.5 * -0.1);
        let h5 = sigmoid(-0.2 * -0.8 + 0.5 * 0.6);
        assert_approx_eq!(output[0], sigmoid(h5 * 0.4));
        assert_approx_eq!(output[1], sigmoid(h4 * 0.6 + h5 * -0.9));
    }

    #[test]
    fn test_predict_is_repeatable() {
        let mut network = Network::from_genome(&genome_sample_feed_forward_1());
        let first = network.predict(&[0.3, 0.9]).unwrap();
        network.predict(&[-1.0, 4.0]).unwrap();
        let again = network.predict(&[0.3, 0.9]).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_invalid_input_size() {
        let mut network = Network::from_genome(&Genome::init(3, 1));
        assert_eq!(
            network.predict(&[1.0, 2.0]),
            Err(NetworkError::InvalidInputSize { expected: 3, actual: 2 })
        );
    }

    #[test]
    fn test_unconnected_outputs_sit_at_half() {
        let mut network = Network::from_genome(&Genome::init(2, 3));
        assert_eq!(network.predict(&[1.0, 1.0]).unwrap(), vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_undeclared_node_is_dropped() {
        let genome = Genome::from_parts(
            vec![
                ConnectionGene::create(0, 2, 1.0, 0, true),
                ConnectionGene::create(9, 2, 3.0, 1, true),
                ConnectionGene::create(1, 8, 3.0, 2, true),
            ],
            vec![],
            2,
            1,
        );
        let mut network = Network::from_genome(&genome);
        assert_eq!(network.len(), 3);
        let sources = network.node(NodeId(2)).map(|n| n.incoming.iter().map(|link| link.from).collect_vec());
        assert_eq!(sources, Some(vec![NodeId(0)]));
        assert_approx_eq!(network.predict(&[1.0, 0.0]).unwrap()[0], sigmoid(1.0));
    }
}
