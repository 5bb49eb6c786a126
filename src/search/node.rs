//! Pooled search nodes, one per grid cell.
//!
//! The pool is allocated once for a grid and reused across planning
//! episodes. Nodes are stamped with the episode generation; a node whose
//! stamp is stale is reinitialized from the costmap on first touch, so an
//! episode never pays for cells it does not visit.

/// One search node. Lives in the pool at its own flat cell index.
#[derive(Clone, Debug)]
pub(crate) struct Node {
    /// Costmap value copied at first touch of the episode
    pub cell_cost: u8,
    /// Best known cost-to-reach (g), +∞ until relaxed
    pub accumulated: f32,
    /// Back-pointer to the predecessor on the best known path
    pub parent: Option<u32>,
    /// Closed-set membership
    pub was_visited: bool,
    /// Open-set membership
    pub is_queued: bool,
    generation: u64,
}

impl Node {
    fn stale() -> Self {
        Self {
            cell_cost: 0,
            accumulated: f32::MAX,
            parent: None,
            was_visited: false,
            is_queued: false,
            generation: 0,
        }
    }
}

/// Pre-allocated node storage addressed by flat cell index.
#[derive(Debug)]
pub(crate) struct NodePool {
    nodes: Vec<Node>,
    generation: u64,
}

impl NodePool {
    /// Allocate a pool for a grid of `cells` cells.
    pub fn new(cells: usize) -> Self {
        Self {
            nodes: vec![Node::stale(); cells],
            generation: 0,
        }
    }

    /// Start a new planning episode. Every node becomes stale; touched
    /// nodes reinitialize lazily through [`NodePool::activate`].
    pub fn begin_episode(&mut self) {
        self.generation += 1;
    }

    /// Fetch the node at `index`, reinitializing it from `cell_cost` if it
    /// has not been touched this episode.
    pub fn activate(&mut self, index: u32, cell_cost: u8) -> &mut Node {
        let generation = self.generation;
        let node = &mut self.nodes[index as usize];
        if node.generation != generation {
            *node = Node {
                cell_cost,
                accumulated: f32::MAX,
                parent: None,
                was_visited: false,
                is_queued: false,
                generation,
            };
        }
        node
    }

    /// Node at `index`, or `None` if untouched this episode.
    pub fn get(&self, index: u32) -> Option<&Node> {
        let node = &self.nodes[index as usize];
        (node.generation == self.generation).then_some(node)
    }

    /// Close a node: enters the closed set, leaves the open set.
    pub fn visit(&mut self, index: u32) {
        let node = &mut self.nodes[index as usize];
        node.was_visited = true;
        node.is_queued = false;
    }
}
