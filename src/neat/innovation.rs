#[derive(PartialEq, PartialOrd, Ord, Clone, Copy, Eq, Hash, Debug)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn inc(self) -> NodeId {
        NodeId(self.0 + 1)
    }
}

#[derive(PartialEq, PartialOrd, Ord, Clone, Copy, Eq, Hash, Debug)]
pub struct InnovationNumber(pub usize);

impl InnovationNumber {
    fn inc(self) -> InnovationNumber {
        InnovationNumber(self.0 + 1)
    }
}

/// Run-scoped counters handing out innovation numbers and hidden node ids.
///
/// Every structural mutation of a run draws from the same registry, so two genomes
/// carrying the same innovation number are known to share that gene's history.
/// Hidden node ids start right after the input and output block, which keeps
/// every hidden id above every input and output id.
#[derive(Clone, Debug)]
pub struct InnovationRegistry {
    next_innovation_number: InnovationNumber,
    next_node_id: NodeId,
    first_hidden_node_id: NodeId,
}

impl InnovationRegistry {
    pub fn new(n_sensor_nodes: usize, n_output_nodes: usize) -> InnovationRegistry {
        let first_hidden_node_id = NodeId(n_sensor_nodes + n_output_nodes);
        InnovationRegistry {
            next_innovation_number: InnovationNumber(0),
            next_node_id: first_hidden_node_id,
            first_hidden_node_id,
        }
    }

    /// Rewinds both counters to their start-of-run values.
    pub fn reset(&mut self) {
        self.next_innovation_number = InnovationNumber(0);
        self.next_node_id = self.first_hidden_node_id;
    }

    pub fn next_innovation(&mut self) -> InnovationNumber {
        let res = self.next_innovation_number;
        self.next_innovation_number = res.inc();
        res
    }

    pub fn next_node_id(&mut self) -> NodeId {
        let res = self.next_node_id;
        self.next_node_id = res.inc();
        res
    }

    pub fn peek_innovation(&self) -> InnovationNumber {
        self.next_innovation_number
    }

    pub fn peek_node_id(&self) -> NodeId {
        self.next_node_id
    }
}
