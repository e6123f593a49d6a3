use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tracing::{debug, warn};

use crate::config::IdentityConfig;
use crate::tree::{
    arena::Arena,
    document::{Statistics, TreeNode},
    error::TreeError,
    ids::{NodeIndex, NodeKey},
};

/// A document node wrapped with derived structure: depth, parent link and resolved key.
/// The parent link is an arena index, never an owning reference.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    index: NodeIndex,
    key: NodeKey,
    explicit_id: bool,
    depth: usize,
    parent: Option<NodeIndex>,
    children: Vec<NodeIndex>,
    sibling_index: usize,
    subtree_size: usize,
    state: String,
    statistics: Statistics,
    is_playout: bool,
}

impl HierarchyNode {
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Whether the key came from the document rather than the structural fallback.
    pub fn has_explicit_id(&self) -> bool {
        self.explicit_id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn parent(&self) -> Option<NodeIndex> {
        self.parent
    }

    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Position among the parent's children (0 for the root).
    pub fn sibling_index(&self) -> usize {
        self.sibling_index
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn num_visits(&self) -> u64 {
        self.statistics.num_visits
    }

    pub fn relative_visits(&self) -> f64 {
        self.statistics.relative_visits
    }

    pub fn is_playout(&self) -> bool {
        self.is_playout
    }

    /// Arena range covering this node and all of its descendants.
    fn subtree_range(&self) -> Range<usize> {
        self.index.index()..self.index.index() + self.subtree_size
    }
}

/// Addressable view over one tree document, rebuilt on every data change.
///
/// Nodes are stored in preorder, so every subtree occupies a contiguous arena
/// range. That gives O(1) descendant checks and makes the parent chain strictly
/// decreasing in index.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    arena: Arena<HierarchyNode>,
    by_key: HashMap<NodeKey, NodeIndex>,
    max_depth: usize,
}

impl Hierarchy {
    /// Wrap `root` into a hierarchy, resolving a key for every node.
    ///
    /// Explicit ids are reserved before any structural key is assigned, so a
    /// structural key never takes an id the document uses elsewhere.
    pub fn build(root: &TreeNode, identity: &IdentityConfig) -> Result<Self, TreeError> {
        let capacity = root.node_count();
        let reserved = explicit_ids(root)?;
        let mut arena: Arena<HierarchyNode> = Arena::with_capacity(capacity);
        let mut by_key: HashMap<NodeKey, NodeIndex> = HashMap::with_capacity(capacity);
        let mut structural_keys = 0;
        let mut max_depth = 0;

        // (document node, parent, sibling index, depth)
        let mut stack: Vec<(&TreeNode, Option<NodeIndex>, usize, usize)> = vec![(root, None, 0, 0)];

        while let Some((doc, parent, sibling_index, depth)) = stack.pop() {
            let (key, explicit_id) = match &doc.id {
                Some(id) => (NodeKey::new(id.clone()), true),
                None => {
                    let parent_key = match parent {
                        Some(parent) => Some(
                            arena
                                .get(parent)
                                .ok_or(TreeError::MissingNode { index: parent })?
                                .key
                                .clone(),
                        ),
                        None => None,
                    };
                    let base = structural_key(
                        parent_key.as_ref(),
                        sibling_index,
                        &doc.state,
                        identity.state_prefix_len,
                    );
                    let key = disambiguate(base, &by_key, &reserved);
                    structural_keys += 1;
                    (key, false)
                }
            };

            let index = arena.allocate(HierarchyNode {
                index: NodeIndex::from(arena.len()),
                key: key.clone(),
                explicit_id,
                depth,
                parent,
                children: Vec::with_capacity(doc.children.len()),
                sibling_index,
                subtree_size: 1,
                state: doc.state.clone(),
                statistics: doc.statistics.clone(),
                is_playout: doc.is_playout,
            });
            by_key.insert(key, index);
            max_depth = max_depth.max(depth);

            if let Some(parent) = parent {
                arena
                    .get_mut(parent)
                    .ok_or(TreeError::MissingNode { index: parent })?
                    .children
                    .push(index);
            }

            for (i, child) in doc.children.iter().enumerate().rev() {
                stack.push((child, Some(index), i, depth + 1));
            }
        }

        // Children always follow their parent in preorder, so a reverse sweep
        // accumulates subtree sizes bottom-up.
        for slot in (0..arena.len()).rev() {
            let (parent, size) = match arena.get(NodeIndex::from(slot)) {
                Some(node) => (node.parent, node.subtree_size),
                None => continue,
            };
            if let Some(parent) = parent {
                if let Some(parent_node) = arena.get_mut(parent) {
                    parent_node.subtree_size += size;
                }
            }
        }

        debug!(
            nodes = arena.len(),
            max_depth,
            structural_keys,
            "built hierarchy"
        );

        let hierarchy = Hierarchy {
            arena,
            by_key,
            max_depth,
        };
        hierarchy.check_structure()?;
        Ok(hierarchy)
    }

    pub fn root_index(&self) -> NodeIndex {
        NodeIndex::from(0)
    }

    pub fn root(&self) -> &HierarchyNode {
        // The arena always holds the root; build never returns an empty hierarchy.
        &self.arena.as_slice()[0]
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Deepest depth present in the tree (root = 0).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn get(&self, index: NodeIndex) -> Option<&HierarchyNode> {
        self.arena.get(index)
    }

    pub fn node(&self, index: NodeIndex) -> Result<&HierarchyNode, TreeError> {
        self.arena.get(index).ok_or(TreeError::MissingNode { index })
    }

    pub fn find(&self, key: &NodeKey) -> Option<&HierarchyNode> {
        self.by_key.get(key).and_then(|index| self.arena.get(*index))
    }

    pub fn index_of(&self, key: &NodeKey) -> Result<NodeIndex, TreeError> {
        self.by_key
            .get(key)
            .copied()
            .ok_or_else(|| TreeError::UnknownKey { key: key.clone() })
    }

    /// All nodes in preorder.
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.arena.iter()
    }

    pub fn parent_of(&self, index: NodeIndex) -> Option<&HierarchyNode> {
        self.get(index)?.parent.and_then(|parent| self.get(parent))
    }

    pub fn children_of(&self, index: NodeIndex) -> impl Iterator<Item = &HierarchyNode> {
        self.get(index)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(|child| self.get(*child))
    }

    /// Strict ancestors of `index`, nearest first.
    pub fn ancestors(&self, index: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: self.get(index).and_then(|node| node.parent),
        }
    }

    /// Ancestor chain from `index` up to the root, checked against the node count bound.
    pub fn ancestor_chain(&self, index: NodeIndex) -> Result<Vec<NodeIndex>, TreeError> {
        let bound = self.len();
        let mut chain = Vec::new();
        let mut current = self.node(index)?.parent;
        while let Some(parent) = current {
            if chain.len() >= bound {
                return Err(TreeError::CyclicParentChain {
                    start: index,
                    bound,
                });
            }
            chain.push(parent);
            current = self.node(parent)?.parent;
        }
        Ok(chain)
    }

    /// Whether `node` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        match self.get(ancestor) {
            Some(anc) => node != ancestor && anc.subtree_range().contains(&node.index()),
            None => false,
        }
    }

    /// Strict descendants of `index` in preorder.
    pub fn descendants(&self, index: NodeIndex) -> impl Iterator<Item = &HierarchyNode> {
        let range = self
            .get(index)
            .map(|node| node.index.index() + 1..node.index.index() + node.subtree_size)
            .unwrap_or(0..0);
        self.arena.as_slice()[range].iter()
    }

    /// Number of nodes in the subtree rooted at `index` (including it).
    pub fn subtree_size(&self, index: NodeIndex) -> usize {
        self.get(index).map(|node| node.subtree_size).unwrap_or(0)
    }

    /// Verify the depth invariant and that every parent chain terminates.
    pub fn check_structure(&self) -> Result<(), TreeError> {
        for node in self.arena.iter() {
            match node.parent {
                None if node.index.index() != 0 => {
                    return Err(TreeError::CyclicParentChain {
                        start: node.index,
                        bound: self.len(),
                    });
                }
                None => {}
                Some(parent) => {
                    // Preorder guarantees parents precede children; anything else
                    // could loop.
                    if parent >= node.index {
                        return Err(TreeError::CyclicParentChain {
                            start: node.index,
                            bound: self.len(),
                        });
                    }
                    let parent_node = self.node(parent)?;
                    if parent_node.depth + 1 != node.depth {
                        return Err(TreeError::DepthMismatch {
                            index: node.index,
                            depth: node.depth,
                            parent_depth: parent_node.depth,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

pub struct Ancestors<'a> {
    hierarchy: &'a Hierarchy,
    next: Option<NodeIndex>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a HierarchyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.hierarchy.get(self.next?)?;
        // Parents always have a smaller index, so this walk is bounded by depth.
        self.next = node.parent.filter(|parent| *parent < node.index);
        Some(node)
    }
}

/// Structural fallback key: ancestor key, sibling index and a bounded state prefix.
pub(crate) fn structural_key(
    parent_key: Option<&NodeKey>,
    sibling_index: usize,
    state: &str,
    prefix_len: usize,
) -> NodeKey {
    let prefix: String = state
        .chars()
        .take(prefix_len)
        .map(|c| if c == '-' || c.is_whitespace() { '_' } else { c })
        .collect();
    match parent_key {
        Some(parent) => NodeKey::new(format!("{parent}-{sibling_index}-{prefix}")),
        None => NodeKey::new(format!("root-{prefix}")),
    }
}

/// Every explicit id in the document. Two nodes sharing an id is an error.
fn explicit_ids(root: &TreeNode) -> Result<HashSet<NodeKey>, TreeError> {
    let mut ids = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if let Some(id) = &node.id {
            let key = NodeKey::new(id.clone());
            if !ids.insert(key.clone()) {
                return Err(TreeError::DuplicateKey { key });
            }
        }
        stack.extend(node.children.iter().rev());
    }
    Ok(ids)
}

fn disambiguate(
    base: NodeKey,
    taken: &HashMap<NodeKey, NodeIndex>,
    reserved: &HashSet<NodeKey>,
) -> NodeKey {
    let is_free = |key: &NodeKey| !taken.contains_key(key) && !reserved.contains(key);
    if is_free(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = NodeKey::new(format!("{base}~{n}"));
        if is_free(&candidate) {
            warn!(key = %base, resolved = %candidate, "structural key collision");
            return candidate;
        }
        n += 1;
    }
}

/// Write the resolved key into every document node that lacks an explicit id.
/// Returns how many ids were filled in.
pub fn backfill_ids(root: &mut TreeNode, identity: &IdentityConfig) -> Result<usize, TreeError> {
    let hierarchy = Hierarchy::build(root, identity)?;
    let mut keys = hierarchy.iter().map(|node| node.key().clone());
    let mut filled = 0;
    let mut visited = 0;

    // Same preorder as `Hierarchy::build`.
    let mut stack: Vec<&mut TreeNode> = vec![root];
    while let Some(node) = stack.pop() {
        let key = keys.next().ok_or(TreeError::MissingNode {
            index: NodeIndex::from(visited),
        })?;
        visited += 1;
        if node.id.is_none() {
            node.id = Some(key.as_str().to_string());
            filled += 1;
        }
        stack.extend(node.children.iter_mut().rev());
    }
    Ok(filled)
}
