//! Monte Carlo Tree Search (MCTS) with UCB selection.
//!
//! The search tree is an arena of [`Node`]s indexed by [`NodeId`]. Each node
//! keeps the successor boards it has not expanded yet; an iteration
//!
//! 1. descends from the root by UCB score while a node is fully expanded,
//! 2. expands one random unexamined successor as a new child,
//! 3. plays a random game from that child (see [`crate::playout`]),
//! 4. credits the result to every node back up to the root.
//!
//! The search runs until its wall-clock budget (or optional iteration cap) is
//! used up and then plays the root child with the best win ratio.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::board::{Board, GameState};
use crate::constants::{DEFAULT_TIME_SECS, DRAW_REWARD, UCB_BIAS, WIN_REWARD};
use crate::playout::playout;

/// Index of a node in the [`Tree`] arena.
pub type NodeId = usize;

/// Search parameters.
#[derive(Clone, Debug)]
pub struct MctsConfig {
    /// Wall-clock budget for the whole search.
    pub time_budget: Duration,
    /// Stop after this many iterations even if time remains.
    pub max_iterations: Option<u32>,
    /// Exploration bias in the UCB formula.
    pub bias: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs_f64(DEFAULT_TIME_SECS),
            max_iterations: None,
            bias: UCB_BIAS,
        }
    }
}

impl MctsConfig {
    pub fn with_time(seconds: f64) -> Self {
        Self {
            time_budget: Duration::try_from_secs_f64(seconds.max(0.0)).unwrap_or(Duration::MAX),
            ..Self::default()
        }
    }

    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            time_budget: Duration::MAX,
            max_iterations: Some(iterations),
            ..Self::default()
        }
    }
}

/// A node in the search tree.
#[derive(Clone, Debug)]
pub struct Node {
    pub board: Board,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Successors not yet turned into children. Their turn is not switched.
    pub unexamined: Vec<Board>,
    pub visits: u32,
    pub wins: f64,
}

impl Node {
    fn new(board: Board, parent: Option<NodeId>) -> Self {
        // Finished games are never expanded; their state is re-simulated.
        let unexamined = if board.game_state().is_over() {
            Vec::new()
        } else {
            board.legal_successors()
        };
        Self {
            board,
            parent,
            children: Vec::new(),
            unexamined,
            visits: 0,
            wins: 0.0,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub fn has_unexamined(&self) -> bool {
        !self.unexamined.is_empty()
    }

    /// Fraction of visits that were wins for the player who moved into this
    /// node.
    pub fn win_ratio(&self) -> f64 {
        if self.visits > 0 {
            self.wins / self.visits as f64
        } else {
            0.0
        }
    }

    /// Whether `result` is a win for the player this node's statistics belong to.
    ///
    /// A child belongs to the player who made the move into it, which is the
    /// side *not* to move on its board. The root has no such move and belongs
    /// to the side to move.
    fn is_win(&self, result: GameState) -> bool {
        let goats = if self.parent.is_some() {
            !self.board.goats_to_move()
        } else {
            self.board.goats_to_move()
        };
        match result {
            GameState::GoatWin => goats,
            GameState::TigerWin => !goats,
            _ => false,
        }
    }
}

/// Arena-allocated search tree for one search episode.
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub const ROOT: NodeId = 0;

    pub fn new(board: Board) -> Self {
        Self {
            nodes: vec![Node::new(board, None)],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// UCB score of `child` as seen from its parent.
    ///
    /// Unvisited children score infinity so that they are tried first.
    pub fn ucb_score(&self, child: NodeId, bias: f64) -> f64 {
        let node = &self.nodes[child];
        if node.visits == 0 {
            return f64::INFINITY;
        }
        let parent_visits = node
            .parent
            .map(|p| self.nodes[p].visits)
            .unwrap_or(node.visits) as f64;
        let visits = node.visits as f64;
        node.wins / visits * (bias * parent_visits.ln() / visits).sqrt()
    }

    fn best_ucb_child(&self, id: NodeId, bias: f64) -> Option<NodeId> {
        let mut best = None;
        let mut max = f64::NEG_INFINITY;
        for &child in &self.nodes[id].children {
            let score = self.ucb_score(child, bias);
            if score > max || best.is_none() {
                max = score;
                best = Some(child);
            }
        }
        best
    }

    /// Descend from the root to the first node that still has unexamined
    /// successors, or to a leaf.
    pub fn select(&self, bias: f64) -> NodeId {
        let mut id = Self::ROOT;
        while !self.nodes[id].has_unexamined() && !self.nodes[id].is_leaf() {
            match self.best_ucb_child(id, bias) {
                Some(child) => id = child,
                None => break,
            }
        }
        id
    }

    /// Turn one random unexamined successor of `id` into a new child and
    /// return it. Returns `id` unchanged if nothing is left to expand.
    pub fn expand(&mut self, id: NodeId, rng: &mut fastrand::Rng) -> NodeId {
        let pool = &mut self.nodes[id].unexamined;
        if pool.is_empty() {
            return id;
        }
        let mut board = pool.swap_remove(rng.usize(..pool.len()));
        board.switch_turn();

        let child = self.nodes.len();
        self.nodes.push(Node::new(board, Some(id)));
        self.nodes[id].children.push(child);
        child
    }

    /// Play a random game from `id`.
    pub fn simulate(&self, id: NodeId, rng: &mut fastrand::Rng) -> GameState {
        let node = &self.nodes[id];
        playout(&node.board, &node.unexamined, rng)
    }

    /// Credit `result` to `id` and all of its ancestors.
    pub fn backpropagate(&mut self, id: NodeId, result: GameState) {
        let mut current = Some(id);
        while let Some(id) = current {
            let node = &mut self.nodes[id];
            node.visits += 1;
            if result == GameState::Draw {
                node.wins += DRAW_REWARD;
            } else if node.is_win(result) {
                node.wins += WIN_REWARD;
            }
            current = node.parent;
        }
    }

    /// Run a single selection, expansion, simulation and backpropagation pass.
    pub fn iterate(&mut self, bias: f64, rng: &mut fastrand::Rng) {
        let selected = self.select(bias);
        let expanded = self.expand(selected, rng);
        let result = self.simulate(expanded, rng);
        self.backpropagate(expanded, result);
    }

    /// The root child with the highest win ratio.
    pub fn best_child(&self) -> Option<NodeId> {
        let mut best = None;
        let mut max = f64::NEG_INFINITY;
        for &child in &self.root().children {
            let ratio = self.nodes[child].win_ratio();
            if ratio > max {
                max = ratio;
                best = Some(child);
            }
        }
        best
    }
}

/// Result of an MCTS search.
#[derive(Clone, Debug)]
pub struct MctsResult {
    /// The chosen successor, with the turn already switched. `None` when the
    /// root has no successors.
    pub board: Option<Board>,
    /// Visits of the root, which is the number of iterations run.
    pub iterations: u32,
    /// Wins accumulated at the root for the side to move.
    pub wins: f64,
    /// Win ratio of the chosen child.
    pub win_ratio: f64,
    pub elapsed: Duration,
}

/// Search from `board` for `seconds` of wall-clock time.
pub fn search_mcts(board: &Board, seconds: f64) -> MctsResult {
    search_mcts_with(board, &MctsConfig::with_time(seconds), &mut fastrand::Rng::new())
}

/// Search from `board` with explicit parameters and random source.
pub fn search_mcts_with(board: &Board, config: &MctsConfig, rng: &mut fastrand::Rng) -> MctsResult {
    let start = Instant::now();
    let deadline = start.checked_add(config.time_budget);
    let mut tree = Tree::new(board.clone());

    let mut iterations = 0u32;
    loop {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
        if config.max_iterations.is_some_and(|max| iterations >= max) {
            break;
        }
        tree.iterate(config.bias, rng);
        iterations += 1;
    }

    log_children(&tree);
    let best = tree.best_child();
    let root = tree.root();
    let elapsed = start.elapsed();
    debug!(
        "mcts: {} iterations, {} nodes, root wins {:.1} in {:.1}ms",
        root.visits,
        tree.len(),
        root.wins,
        elapsed.as_secs_f64() * 1000.0
    );

    MctsResult {
        board: best.map(|id| tree.node(id).board.clone()),
        iterations: root.visits,
        wins: root.wins,
        win_ratio: best.map(|id| tree.node(id).win_ratio()).unwrap_or(0.0),
        elapsed,
    }
}

fn log_children(tree: &Tree) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }
    for &id in &tree.root().children {
        let child = tree.node(id);
        let action = child
            .board
            .last_action()
            .map(|a| a.to_string())
            .unwrap_or_default();
        trace!(
            "move {action} v={} w={:.1} wr={:.3}",
            child.visits,
            child.wins,
            child.win_ratio()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn test_root_visits_match_children() {
        let board = Board::new();
        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..100 {
            tree.iterate(UCB_BIAS, &mut rng);
        }
        let root = tree.root();
        assert_eq!(root.visits, 100);
        let child_visits: u32 = root.children.iter().map(|&c| tree.node(c).visits).sum();
        assert_eq!(root.visits, child_visits);
    }

    #[test]
    fn test_every_child_visited_after_full_expansion() {
        let board = Board::new();
        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..21 {
            tree.iterate(UCB_BIAS, &mut rng);
        }
        let root = tree.root();
        assert_eq!(root.children.len(), 21);
        assert!(!root.has_unexamined());
        assert!(root.children.iter().all(|&c| tree.node(c).visits == 1));
    }

    #[test]
    fn test_children_have_switched_turn() {
        let board = Board::new();
        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(9);
        let child = tree.expand(Tree::ROOT, &mut rng);
        assert_eq!(tree.node(child).parent, Some(Tree::ROOT));
        assert!(!tree.node(child).board.goats_to_move());
        assert_eq!(tree.node(child).board.goats_in_hand(), 19);
    }

    #[test]
    fn test_expand_without_successors_is_noop() {
        let mut board = Board::new();
        let hole = Position::new(2, 1);
        for pos in Position::all().filter(|&p| !p.is_corner() && p != hole) {
            assert!(board.place_piece(pos));
        }
        board.switch_turn();
        // The only empty square is out of every tiger's reach.
        assert_eq!(board.game_state(), GameState::GoatWin);
        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(2);
        assert_eq!(tree.expand(Tree::ROOT, &mut rng), Tree::ROOT);
        tree.iterate(UCB_BIAS, &mut rng);
        assert_eq!(tree.root().visits, 1);
        assert!(tree.root().children.is_empty());
    }

    #[test]
    fn test_finished_root_is_never_expanded() {
        let mut board = Board::new();
        for pos in [Position::new(1, 0), Position::new(2, 1), Position::new(3, 2)] {
            board.place_piece(pos);
        }
        for pos in [Position::new(1, 2), Position::new(2, 3)] {
            board.place_piece(pos);
            board.capture_at(pos);
        }
        for pos in [Position::new(0, 2), Position::new(4, 2), Position::new(2, 4)] {
            board.place_piece(pos);
            board.capture_at(pos);
        }
        assert_eq!(board.game_state(), GameState::TigerWin);
        assert!(!board.legal_successors().is_empty(), "goats could still place");

        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(4);
        for _ in 0..5 {
            tree.iterate(UCB_BIAS, &mut rng);
        }
        assert!(tree.root().unexamined.is_empty());
        assert!(tree.root().children.is_empty());
        assert_eq!(tree.root().visits, 5);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_backpropagate_credits_alternate() {
        let board = Board::new();
        let mut tree = Tree::new(board);
        let mut rng = fastrand::Rng::with_seed(3);
        let child = tree.expand(Tree::ROOT, &mut rng);
        tree.backpropagate(child, GameState::GoatWin);
        // The root (goats to move) and its child (a goat placement) both belong
        // to the goats.
        assert_eq!(tree.root().wins, 1.0);
        assert_eq!(tree.node(child).wins, 1.0);

        let grandchild = tree.expand(child, &mut rng);
        tree.backpropagate(grandchild, GameState::TigerWin);
        assert_eq!(tree.node(grandchild).wins, 1.0);
        assert_eq!(tree.node(child).wins, 1.0);
        assert_eq!(tree.node(child).visits, 2);

        tree.backpropagate(grandchild, GameState::Draw);
        assert_eq!(tree.node(grandchild).wins, 1.5);
        assert_eq!(tree.root().wins, 1.5);
    }

    #[test]
    fn test_search_with_iteration_cap() {
        let mut board = Board::new();
        board.place_piece(Position::new(1, 0));
        board.switch_turn();
        let mut rng = fastrand::Rng::with_seed(17);
        let result = search_mcts_with(&board, &MctsConfig::with_iterations(100), &mut rng);
        assert_eq!(result.iterations, 100);
        let next = result.board.expect("tigers have moves");
        assert!(next.goats_to_move());
        assert!((0.0..=1.0).contains(&result.win_ratio));
    }

    #[test]
    fn test_time_budget_is_respected() {
        let board = Board::new();
        let result = search_mcts(&board, 0.05);
        assert!(result.iterations > 0);
        assert!(result.elapsed < Duration::from_secs(2));
        assert!(result.board.is_some());
    }

    #[test]
    fn test_unbounded_time_saturates() {
        assert_eq!(MctsConfig::with_time(f64::INFINITY).time_budget, Duration::MAX);
        assert_eq!(MctsConfig::with_time(1e300).time_budget, Duration::MAX);
        assert_eq!(MctsConfig::with_time(-1.0).time_budget, Duration::ZERO);
    }
}
