//! Monte Carlo Tree Search (MCTS) with heuristic-guided expansion.
//!
//! Each search iteration runs four phases:
//! - Selection: descend through fully expanded nodes by UCB1, nudged by the
//!   static evaluation of each child
//! - Expansion: add the untried action whose resulting board evaluates best
//! - Simulation: a uniformly random playout to the end of the game
//! - Backpropagation: update visit and win counts up to the root
//!
//! Nodes live in an arena owned by [`SearchTree`]; children are referenced
//! by [`NodeId`] and every node keeps a non-owning id of its parent.
//! Iterations repeat until the wall-clock budget (or the optional iteration
//! cap) runs out.

use std::time::Instant;

use tracing::{debug, trace};

use crate::config::SearchConfig;
use crate::eval::evaluate_with_jitter;
use crate::playout::mcplayout;
use crate::state::{Action, Color, GameState};

/// Index of a node in the [`SearchTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node in the MCTS search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The game state at this node
    pub state: GameState,
    /// Parent node (`None` for the root)
    pub parent: Option<NodeId>,
    /// Action that led here from the parent
    pub action: Option<Action>,
    /// Number of visits
    pub n: u32,
    /// Number of wins for the side to move at this node
    pub w: u32,
    /// Static evaluation of `state` for the player who moved into it
    pub score: f64,
    /// Expanded children
    pub children: Vec<NodeId>,
    /// Actions not expanded yet with their child scores, best last.
    /// `None` until the node is first expanded.
    untried: Option<Vec<(Action, f64)>>,
}

impl TreeNode {
    fn new(state: GameState, parent: Option<NodeId>, action: Option<Action>, score: f64) -> Self {
        let untried = state.is_terminal().then(Vec::new);
        Self {
            state,
            parent,
            action,
            n: 0,
            w: 0,
            score,
            children: Vec::new(),
            untried,
        }
    }

    /// Calculate the winrate for this node.
    #[inline]
    pub fn winrate(&self) -> f64 {
        if self.n > 0 {
            self.w as f64 / self.n as f64
        } else {
            -0.1 // Indicate unvisited
        }
    }

    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.as_ref().is_some_and(Vec::is_empty)
    }

    /// Number of actions still waiting to be expanded.
    pub fn untried_count(&self) -> usize {
        match &self.untried {
            Some(untried) => untried.len(),
            None => self.state.legal_actions(self.state.turn_color()).len(),
        }
    }
}

/// Score every legal action of the side to move by the board it produces,
/// sorted so the best-scoring action is last. Equal scores keep the earlier
/// action closer to the end.
fn rank_actions(state: &GameState, rng: &mut fastrand::Rng) -> Vec<(Action, f64)> {
    let mover = state.turn_color();
    let mut ranked: Vec<(Action, f64)> = state
        .legal_actions(mover)
        .into_iter()
        .map(|action| {
            let mut child = state.clone();
            child.advance(mover, action);
            (action, evaluate_with_jitter(&child, mover, rng))
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.reverse();
    ranked
}

/// Arena holding every node of one search.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<TreeNode>,
}

impl SearchTree {
    /// Create a tree rooted at `state`, searching for the side to move.
    pub fn new(state: &GameState) -> Self {
        Self {
            nodes: vec![TreeNode::new(state.clone(), None, None, 0.0)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of `id` in expansion order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &TreeNode> + '_ {
        self.get(id).children.iter().map(move |&c| self.get(c))
    }
}

/// Index of the first maximum of `key` over `ids`.
fn first_max_by(ids: &[NodeId], mut key: impl FnMut(NodeId) -> f64) -> Option<NodeId> {
    let mut best: Option<(NodeId, f64)> = None;
    for &id in ids {
        let value = key(id);
        if best.is_none_or(|(_, b)| value > b) {
            best = Some((id, value));
        }
    }
    best.map(|(id, _)| id)
}

/// Select the child of `id` with the highest nudged UCB1 value.
///
/// `w/n + c * sqrt(2 ln(N) / n) + nudge * score / (n + 1)` where `N` is the
/// parent's visit count.
pub fn best_child(tree: &SearchTree, id: NodeId, exploration: f64, nudge: f64) -> Option<NodeId> {
    let parent = tree.get(id);
    let ln_parent = (parent.n.max(1) as f64).ln();

    first_max_by(&parent.children, |child_id| {
        let child = tree.get(child_id);
        let n = child.n.max(1) as f64;
        child.w as f64 / n
            + exploration * (2.0 * ln_parent / n).sqrt()
            + nudge * child.score / (child.n as f64 + 1.0)
    })
}

/// Expand the best-scoring untried action of `id` into a new child.
///
/// The node's actions are ranked on its first expansion. Returns `None` if
/// the node is already fully expanded.
pub fn expand(tree: &mut SearchTree, id: NodeId, rng: &mut fastrand::Rng) -> Option<NodeId> {
    let TreeNode { state, untried, .. } = tree.get_mut(id);
    let untried = untried.get_or_insert_with(|| rank_actions(state, rng));
    let (action, score) = untried.pop()?;

    let parent = tree.get(id);
    let mut state = parent.state.clone();
    state.advance(parent.state.turn_color(), action);

    let child_id = NodeId(tree.len());
    let child = TreeNode::new(state, Some(id), Some(action), score);
    tree.nodes.push(child);
    tree.get_mut(id).children.push(child_id);
    Some(child_id)
}

/// Walk from the root to the node the next playout starts from.
///
/// Descends through fully expanded nodes and expands the first node that
/// still has untried actions. Stops early at terminal nodes and at nodes
/// without any legal action.
fn tree_descend(tree: &mut SearchTree, config: &SearchConfig, rng: &mut fastrand::Rng) -> NodeId {
    let mut id = tree.root();
    loop {
        let node = tree.get(id);
        if node.state.is_terminal() {
            return id;
        }
        if !node.is_fully_expanded() {
            return expand(tree, id, rng).unwrap_or(id);
        }
        match best_child(tree, id, config.exploration, config.heuristic_nudge) {
            Some(child) => id = child,
            None => return id,
        }
    }
}

/// Propagate a playout result from `leaf` up to the root.
///
/// Every node on the path gains a visit; a node gains a win when `result`
/// is the color to move at that node.
fn tree_update(tree: &mut SearchTree, leaf: NodeId, result: Option<Color>) {
    let mut cursor = Some(leaf);
    while let Some(id) = cursor {
        let node = tree.get_mut(id);
        node.n += 1;
        if result == Some(node.state.turn_color()) {
            node.w += 1;
        }
        cursor = node.parent;
    }
}

/// Outcome of an MCTS search.
#[derive(Debug, Clone)]
pub struct MctsResult {
    /// Chosen action, `None` if the root had no legal action.
    pub action: Option<Action>,
    /// Raw win rate of the chosen child.
    pub win_rate: f64,
    /// Completed select/simulate/backpropagate cycles.
    pub iterations: usize,
    /// Nodes in the final tree.
    pub nodes: usize,
}

/// Run MCTS from `state` for the side to move.
///
/// At least one iteration always runs; after that the loop stops once
/// `config.mcts_budget` has elapsed or `config.mcts_max_iterations` is hit.
/// The chosen action is the root child with the highest raw win rate.
pub fn tree_search(state: &GameState, config: &SearchConfig, rng: &mut fastrand::Rng) -> MctsResult {
    let start = Instant::now();
    let mut tree = SearchTree::new(state);
    let mut iterations = 0usize;

    loop {
        let leaf = tree_descend(&mut tree, config, rng);
        let result = mcplayout(&tree.get(leaf).state, rng);
        tree_update(&mut tree, leaf, result);
        iterations += 1;

        let capped = config
            .mcts_max_iterations
            .is_some_and(|cap| iterations >= cap);
        if capped || start.elapsed() >= config.mcts_budget {
            break;
        }
    }

    let best = best_move(&tree);
    let (action, win_rate) = match best {
        Some(id) => (tree.get(id).action, tree.get(id).winrate()),
        None => (None, 0.0),
    };

    dump_children(&tree);
    debug!(
        color = %state.turn_color(),
        iterations,
        nodes = tree.len(),
        win_rate,
        action = ?action,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "mcts search finished"
    );

    MctsResult {
        action,
        win_rate,
        iterations,
        nodes: tree.len(),
    }
}

/// Root child with the highest raw win rate (first one on ties).
fn best_move(tree: &SearchTree) -> Option<NodeId> {
    let root = tree.get(tree.root());
    first_max_by(&root.children, |id| tree.get(id).winrate())
}

/// Trace statistics about the root's children.
pub fn dump_children(tree: &SearchTree) {
    for child in tree.children(tree.root()) {
        if let Some(action) = child.action {
            trace!(
                "move {} n={} w={} wr={:.3} score={:.2}",
                action,
                child.n,
                child.w,
                child.winrate(),
                child.score
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::HexPos;
    use crate::state::Cell;

    fn small_state() -> GameState {
        GameState::from_cells(
            [
                (HexPos::new(1, 1), Cell::new(Color::Red, 2)),
                (HexPos::new(4, 4), Cell::new(Color::Blue, 2)),
            ],
            Color::Red,
            4,
        )
        .unwrap()
    }

    #[test]
    fn test_root_is_ranked_on_first_expansion() {
        let state = small_state();
        let legal = state.legal_actions(Color::Red).len();
        let tree = SearchTree::new(&state);
        let root = tree.get(tree.root());
        assert!(root.untried.is_none());
        assert!(!root.is_fully_expanded());
        assert_eq!(root.untried_count(), legal);
        assert!(root.parent.is_none());
        assert!(root.children.is_empty());
    }

    #[test]
    fn test_expand_pops_best_scoring_action() {
        let state = small_state();
        let legal = state.legal_actions(Color::Red).len();
        let mut rng = fastrand::Rng::with_seed(3);
        let mut tree = SearchTree::new(&state);
        let root = tree.root();

        let child = expand(&mut tree, root, &mut rng).unwrap();
        let node = tree.get(child);
        let remaining = tree.get(root).untried.as_ref().unwrap();
        assert_eq!(remaining.len(), legal - 1);
        assert!(remaining.iter().all(|&(_, s)| s <= node.score));
        assert_eq!(node.parent, Some(root));
        assert!(node.untried.is_none());
        assert_eq!(node.state.turn_color(), Color::Blue);
        assert_eq!(tree.get(root).children, vec![child]);
    }

    /// Root with three expanded children whose statistics are set by hand.
    fn tree_with_stats(stats: [(u32, u32, f64); 3]) -> (SearchTree, [NodeId; 3]) {
        let mut rng = fastrand::Rng::with_seed(3);
        let mut tree = SearchTree::new(&small_state());
        let root = tree.root();
        let ids = [(); 3].map(|_| expand(&mut tree, root, &mut rng).unwrap());
        for (&id, (n, w, score)) in ids.iter().zip(stats) {
            let node = tree.get_mut(id);
            node.n = n;
            node.w = w;
            node.score = score;
        }
        tree.get_mut(root).n = 30;
        (tree, ids)
    }

    #[test]
    fn test_best_child_follows_ucb_formula() {
        let (tree, [a, _, c]) = tree_with_stats([(10, 6, 0.0), (10, 5, 0.0), (2, 1, 0.0)]);
        let root = tree.root();

        // No exploration: highest win rate
        assert_eq!(best_child(&tree, root, 0.0, 0.0), Some(a));

        // ln(30) = 3.40; a: 0.6 + 0.5 * sqrt(6.80 / 10) = 1.01,
        // c: 0.5 + 0.5 * sqrt(6.80 / 2) = 1.42
        assert_eq!(best_child(&tree, root, 0.5, 0.0), Some(c));
    }

    #[test]
    fn test_best_child_heuristic_nudge() {
        // b: 0.5 + 0.01 * 200 / 11 = 0.68 beats a: 0.6
        let (tree, [a, b, _]) = tree_with_stats([(10, 6, 0.0), (10, 5, 200.0), (2, 1, 0.0)]);
        let root = tree.root();
        assert_eq!(best_child(&tree, root, 0.0, 0.0), Some(a));
        assert_eq!(best_child(&tree, root, 0.0, 0.01), Some(b));
    }

    #[test]
    fn test_best_child_first_on_ties() {
        let (tree, [a, _, _]) = tree_with_stats([(4, 2, 1.0), (4, 2, 1.0), (4, 2, 1.0)]);
        assert_eq!(best_child(&tree, tree.root(), 0.1, 0.01), Some(a));
    }

    #[test]
    fn test_search_selects_after_full_expansion() {
        // Power cap reached: Red's lone stack has six spreads and no spawns
        let mut cells: Vec<_> = (0..7)
            .map(|q| (HexPos::new(0, q), Cell::new(Color::Blue, 6)))
            .collect();
        cells.push((HexPos::new(5, 5), Cell::new(Color::Blue, 6)));
        cells.push((HexPos::new(3, 3), Cell::new(Color::Red, 1)));
        let state = GameState::from_cells(cells, Color::Red, 10).unwrap();
        assert_eq!(state.legal_actions(Color::Red).len(), 6);

        let config = SearchConfig {
            mcts_max_iterations: Some(60),
            ..SearchConfig::for_testing()
        };
        let mut rng = fastrand::Rng::with_seed(8);
        let result = tree_search(&state, &config, &mut rng);
        assert_eq!(result.iterations, 60);

        // Reconstruct the visit spread from a fresh tree with the same seed
        let mut rng = fastrand::Rng::with_seed(8);
        let mut tree = SearchTree::new(&state);
        for _ in 0..60 {
            let leaf = tree_descend(&mut tree, &config, &mut rng);
            let result = mcplayout(&tree.get(leaf).state, &mut rng);
            tree_update(&mut tree, leaf, result);
        }
        let root = tree.get(tree.root());
        assert!(root.is_fully_expanded());
        assert_eq!(root.children.len(), 6);
        assert_eq!(root.n, 60);

        let visits: Vec<u32> = tree.children(tree.root()).map(|c| c.n).collect();
        assert_eq!(visits.iter().sum::<u32>(), 60);
        assert!(visits.iter().any(|&n| n > 1));
        assert_eq!(result.nodes, tree.len());
    }

    #[test]
    fn test_update_credits_side_to_move() {
        let state = small_state();
        let mut rng = fastrand::Rng::with_seed(3);
        let mut tree = SearchTree::new(&state);
        let root = tree.root();
        let child = expand(&mut tree, root, &mut rng).unwrap();

        // Blue is to move at the child, Red at the root
        tree_update(&mut tree, child, Some(Color::Blue));
        assert_eq!((tree.get(child).n, tree.get(child).w), (1, 1));
        assert_eq!((tree.get(root).n, tree.get(root).w), (1, 0));

        tree_update(&mut tree, child, Some(Color::Red));
        assert_eq!((tree.get(child).n, tree.get(child).w), (2, 1));
        assert_eq!((tree.get(root).n, tree.get(root).w), (2, 1));

        tree_update(&mut tree, child, None);
        assert_eq!(tree.get(child).w, 1);
        assert_eq!(tree.get(root).n, 3);
    }

    #[test]
    fn test_search_respects_iteration_cap() {
        let state = small_state();
        let config = SearchConfig {
            mcts_max_iterations: Some(10),
            ..SearchConfig::for_testing()
        };
        let mut rng = fastrand::Rng::with_seed(5);
        let result = tree_search(&state, &config, &mut rng);
        assert_eq!(result.iterations, 10);
        assert_eq!(result.nodes, 11);
        let action = result.action.unwrap();
        assert!(state.legal_actions(Color::Red).contains(&action));
    }

    #[test]
    fn test_search_on_finished_game_has_no_action() {
        let state =
            GameState::from_cells([(HexPos::new(0, 0), Cell::new(Color::Red, 5))], Color::Blue, 7)
                .unwrap();
        let mut rng = fastrand::Rng::with_seed(5);
        let result = tree_search(&state, &SearchConfig::for_testing(), &mut rng);
        assert_eq!(result.action, None);
        assert_eq!(result.nodes, 1);
    }
}
