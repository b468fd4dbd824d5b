use crate::connect4::{Board, Column, MoveScope, WIDTH};
use crate::game::Status;
use crate::report::{Event, Reporter, Verbosity};
use crate::rollout;
use crate::search::{ensure_playable, ColumnValue, SearchError};
use crate::tree::{Node, NodeId, Tree};
use rand::Rng;
use tracing::{debug, trace};

// Default UCB1 exploration constant. Equals sqrt(2).
pub const UCB1_DEFAULT_EXPLORE_CONST: f64 = std::f64::consts::SQRT_2;

/// How moves are picked inside the tree, which also fixes how the final move
/// is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionPolicy {
    /// Pure Monte Carlo game search. In-tree moves are uniform random and the
    /// final move is the root child with the best mean outcome for the player
    /// to move.
    Uniform,
    /// UCT with the given exploration constant. The final move is the most
    /// visited root child.
    Ucb1(f64),
}

/// Tree search over a single position. Each simulation selects down the tree,
/// adds exactly one node, plays a random game from it and backpropagates the
/// outcome. The board is shared by all simulations and restored after each.
pub struct Mcts {
    /// The node tree.
    tree: Tree,
    policy: SelectionPolicy,
}

impl Mcts {
    /// Constructs a search rooted at the given position.
    pub fn new(board: &Board, policy: SelectionPolicy) -> Self {
        Mcts {
            tree: Tree::new(board.turn(), board.legal_mask()),
            policy,
        }
    }

    /// Runs the given number of simulations and returns the chosen column.
    /// `board` must be the position the search was constructed with; it is
    /// left exactly as it was found.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        simulations: u32,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Column, SearchError> {
        if simulations == 0 {
            return Err(SearchError::InvalidParameter(
                "simulation count must be at least 1".to_owned(),
            ));
        }
        ensure_playable(board)?;

        debug!(policy = ?self.policy, simulations, "starting tree search");
        for sim in 0..simulations {
            let status = self.simulate(board, rng, reporter)?;
            trace!(sim, value = status.value(), "simulation complete");
        }

        let column = self.phase_action_select().ok_or(SearchError::NoLegalMove)?;
        let stats = self.tree.stats();
        debug!(
            column,
            nodes = stats.total_nodes,
            depth = stats.max_depth,
            "tree search complete"
        );
        Ok(column)
    }

    /// Per-column statistics of the root's children.
    pub fn column_values(&self, board: &Board) -> [ColumnValue; WIDTH] {
        let root = self.tree.get(self.tree.root());
        let mut values = [ColumnValue::Full; WIDTH];
        for (col, value) in values.iter_mut().enumerate() {
            if !board.is_legal(col as Column) {
                continue;
            }
            *value = match root.children[col].map(|id| self.tree.get(id)) {
                Some(child) if child.ni > 0 => ColumnValue::Visited {
                    wi: child.wi,
                    ni: child.ni,
                },
                _ => ColumnValue::Unvisited,
            };
        }
        values
    }

    /// Get the search tree (for inspection/debugging).
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Runs a single simulation and returns the outcome it backpropagated.
    fn simulate<R: Rng + ?Sized>(
        &mut self,
        board: &mut Board,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Status, SearchError> {
        let verbose = reporter.enabled(Verbosity::Verbose);
        let mut scope = board.scope();
        let mut node_id = self.tree.root();
        let mut status = Status::Ongoing;

        while !status.is_terminal() {
            let node = self.tree.get(node_id);
            if !node.is_fully_expanded() || !node.has_children() {
                break;
            }
            if verbose {
                self.report_visit(node, reporter);
            }

            let (col, child) = self.phase_selection(node_id, rng)?;
            if verbose {
                reporter.report(&Event::MoveSelected { column: col });
            }
            status = scope.play(col)?;
            node_id = child;
        }

        if !status.is_terminal() {
            if let Some((col, child, child_status)) = self.phase_expansion(node_id, &mut scope, rng)? {
                if verbose {
                    reporter.report(&Event::MoveSelected { column: col });
                    reporter.report(&Event::NodeAdded { column: col });
                }
                node_id = child;
                status = child_status;
            }
        }

        if status.is_terminal() {
            if verbose {
                reporter.report(&Event::Terminal {
                    value: status.value(),
                });
            }
        } else {
            status = self.phase_rollout(&mut scope, rng, reporter)?;
        }

        self.phase_backprop(node_id, status.value(), reporter);
        Ok(status)
    }

    // Phase fns.

    /// Selection phase. Picks the child to descend into from a fully expanded
    /// node.
    fn phase_selection<R: Rng + ?Sized>(
        &self,
        node_id: NodeId,
        rng: &mut R,
    ) -> Result<(Column, NodeId), SearchError> {
        let node = self.tree.get(node_id);
        let col = match self.policy {
            SelectionPolicy::Uniform => rollout::pick(node.child_mask(), rng),
            SelectionPolicy::Ucb1(explore) => self.select_ucb1(node_id, explore),
        }
        .ok_or(SearchError::NoLegalMove)?;

        let child = node.children[col as usize].ok_or(SearchError::NoLegalMove)?;
        Ok((col, child))
    }

    /// Expansion phase. Drops into a random untried column and creates the
    /// node for it. Returns None if the node has nothing left to try.
    fn phase_expansion<R: Rng + ?Sized>(
        &mut self,
        node_id: NodeId,
        scope: &mut MoveScope<'_>,
        rng: &mut R,
    ) -> Result<Option<(Column, NodeId, Status)>, SearchError> {
        let col = match rollout::pick(self.tree.get(node_id).untried(), rng) {
            Some(col) => col,
            None => return Ok(None),
        };

        let status = scope.play(col)?;
        let untried = if status.is_terminal() {
            0
        } else {
            scope.legal_mask()
        };
        let child = self.tree.add_child(node_id, col, scope.turn(), untried);
        Ok(Some((col, child, status)))
    }

    /// Rollout phase. Plays a random game to completion from the current
    /// position without growing the tree.
    fn phase_rollout<R: Rng + ?Sized>(
        &self,
        scope: &mut MoveScope<'_>,
        rng: &mut R,
        reporter: &mut dyn Reporter,
    ) -> Result<Status, SearchError> {
        rollout::playout(scope, rng, reporter)
    }

    /// Backprop phase. Updates the node and all of its ancestors.
    fn phase_backprop(&mut self, node_id: NodeId, value: i32, reporter: &mut dyn Reporter) {
        self.tree.backpropagate(node_id, value);

        if reporter.enabled(Verbosity::Verbose) {
            for id in self.tree.path_to_root(node_id) {
                let node = self.tree.get(id);
                reporter.report(&Event::Updated {
                    wi: node.wi,
                    ni: node.ni,
                });
            }
        }
    }

    /// Action selection phase. Ties go to the lowest column.
    fn phase_action_select(&self) -> Option<Column> {
        let root = self.tree.get(self.tree.root());
        let sign = f64::from(root.to_move.sign());

        match self.policy {
            SelectionPolicy::Uniform => self.select_max_child(root, |child| sign * child.ratio()),
            SelectionPolicy::Ucb1(_) => self.select_max_child(root, |child| f64::from(child.ni)),
        }
    }

    // Phase helper fns.

    /// Returns the column of the visited child scoring highest on `score`.
    /// Only a strictly greater score displaces the current best, so the lowest
    /// column wins ties.
    fn select_max_child<F: Fn(&Node) -> f64>(&self, node: &Node, score: F) -> Option<Column> {
        let mut best: Option<(Column, f64)> = None;
        for (col, id) in node.children() {
            let child = self.tree.get(id);
            if child.ni == 0 {
                continue;
            }
            let value = score(child);
            if best.map_or(true, |(_, top)| value > top) {
                best = Some((col, value));
            }
        }
        best.map(|(col, _)| col)
    }

    /// UCB1 selection. An unvisited child is taken immediately.
    pub(crate) fn select_ucb1(&self, node_id: NodeId, explore: f64) -> Option<Column> {
        let node = self.tree.get(node_id);
        if let Some((col, _)) = node.children().find(|&(_, id)| self.tree.get(id).ni == 0) {
            return Some(col);
        }

        let values = self.ucb_values(node, explore);
        let mut best: Option<(Column, f64)> = None;
        for (col, value) in values.iter().enumerate() {
            if let Some(value) = *value {
                if best.map_or(true, |(_, top)| value > top) {
                    best = Some((col as Column, value));
                }
            }
        }
        best.map(|(col, _)| col)
    }

    /// UCB1 value of each child, from the perspective of the player to move.
    fn ucb_values(&self, node: &Node, explore: f64) -> [Option<f64>; WIDTH] {
        let sign = f64::from(node.to_move.sign());
        let mut values = [None; WIDTH];
        for (col, id) in node.children() {
            values[col as usize] = Some(ucb1(node.ni, self.tree.get(id), sign, explore));
        }
        values
    }

    fn report_visit(&self, node: &Node, reporter: &mut dyn Reporter) {
        reporter.report(&Event::Visit {
            wi: node.wi,
            ni: node.ni,
        });
        if let SelectionPolicy::Ucb1(explore) = self.policy {
            let values = self.ucb_values(node, explore);
            reporter.report(&Event::Ucb { values: &values });
        }
    }
}

/// The standard UCB1 value with the exploitation term signed for the player
/// choosing: Yellow maximises the mean, Red maximises its negation.
fn ucb1(parent_visits: u32, child: &Node, sign: f64, explore: f64) -> f64 {
    if child.ni == 0 {
        return f64::INFINITY;
    }
    let visits = f64::from(child.ni);
    sign * child.wi as f64 / visits + explore * (f64::from(parent_visits).ln() / visits).sqrt()
}
