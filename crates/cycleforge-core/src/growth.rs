//! # Growth Engine
//!
//! Grows a graph on the periodic hypercube one step at a time.
//!
//! ## Step
//!
//! 1. **Branch/Extend**: every terminal sprouts one tip, plus a second one
//!    with probability `branch_probability`. Each tip is a Gaussian step
//!    away from its parent and is joined to it by an edge.
//! 2. **Fusion**: among the tips of this step, the first mutual triple
//!    (all three pairwise closer than `fuse_radius`) becomes a triangle,
//!    then remaining close pairs are matched greedily, nearest first. A tip
//!    takes part in at most one fusion per step.
//! 3. Unfused tips become the next terminal set; fused tips are dead ends.
//! 4. The cycle rank of the graph is appended to the genus history.

use crate::config::TrialConfig;
use crate::graph::{Graph, GraphStore};
use crate::invariant::{GenusHistory, cycle_rank};
use crate::positions::PositionStore;
use crate::primitives::TRIANGLE_FUSIONS;
use crate::space::ToroidalSpace;
use crate::{CycleforgeError, NodeId, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};

// =============================================================================
// FUSION PLANNING
// =============================================================================

/// Fusions chosen for one step, as indices into the candidate list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FusionPlan {
    /// The mutual triple, if one was found. `i < j < k`.
    pub triangle: Option<[usize; 3]>,
    /// Greedy pairwise matches in the order they were accepted.
    pub pairs: Vec<(usize, usize)>,
    consumed: Vec<bool>,
}

impl FusionPlan {
    /// Whether candidate `index` was fused this step.
    #[must_use]
    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.get(index).copied().unwrap_or(false)
    }

    /// Fusion count credited to this step (triangle counts three).
    #[must_use]
    pub fn fusion_count(&self) -> u64 {
        let triangle = if self.triangle.is_some() {
            TRIANGLE_FUSIONS
        } else {
            0
        };
        triangle + self.pairs.len() as u64
    }
}

/// Choose this step's fusions among `points`.
///
/// Candidates are identified by their index in `points`; ties in distance
/// are broken by index order.
pub fn plan_fusion(
    space: &ToroidalSpace,
    points: &[&Position],
    fuse_radius: f64,
) -> Result<FusionPlan, CycleforgeError> {
    let n = points.len();
    let mut plan = FusionPlan {
        consumed: vec![false; n],
        ..FusionPlan::default()
    };
    if n < 2 {
        return Ok(plan);
    }

    let mut dist = vec![f64::INFINITY; n * n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = space.distance(points[i], points[j])?;
            dist[i * n + j] = d;
            dist[j * n + i] = d;
        }
    }
    let close = |i: usize, j: usize| dist[i * n + j] < fuse_radius;

    'search: for i in 0..n {
        for j in (i + 1)..n {
            if !close(i, j) {
                continue;
            }
            for k in (j + 1)..n {
                if close(i, k) && close(j, k) {
                    plan.triangle = Some([i, j, k]);
                    break 'search;
                }
            }
        }
    }
    if let Some(triple) = plan.triangle {
        for i in triple {
            plan.consumed[i] = true;
        }
    }

    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            if close(i, j) {
                candidates.push((dist[i * n + j], i, j));
            }
        }
    }
    candidates.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });

    for (_, i, j) in candidates {
        if plan.consumed[i] || plan.consumed[j] {
            continue;
        }
        plan.consumed[i] = true;
        plan.consumed[j] = true;
        plan.pairs.push((i, j));
    }

    Ok(plan)
}

// =============================================================================
// REPORTS
// =============================================================================

/// What happened during one growth step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    /// 1-based index of the step.
    pub step: usize,
    /// Tips created by branch/extend.
    pub new_tips: usize,
    /// Pairwise fusions applied.
    pub pair_fusions: usize,
    /// Nodes joined into a triangle, if any.
    pub triangle: Option<[NodeId; 3]>,
    /// Size of the terminal set handed to the next step.
    pub terminals: usize,
    /// Cycle rank after the step.
    pub genus: u64,
}

/// Running totals over a trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStats {
    /// Tips created by branch/extend.
    pub new_tips: u64,
    /// Fusions credited (triangle = 3, pair = 1).
    pub fusions: u64,
    /// Pairwise fusions.
    pub pair_fusions: u64,
    /// Triangles formed.
    pub triangles: u64,
}

// =============================================================================
// ENGINE
// =============================================================================

/// Owns the graph and growth frontier of one trial.
#[derive(Debug, Clone)]
pub struct GrowthEngine {
    space: ToroidalSpace,
    fuse_radius: f64,
    branch_probability: f64,
    extend_sigma: f64,
    graph: Graph,
    positions: PositionStore,
    terminals: Vec<NodeId>,
    history: GenusHistory,
    steps_executed: usize,
    stats: GrowthStats,
}

impl GrowthEngine {
    /// Place `seed_count` terminals uniformly at random.
    ///
    /// Only the space and the seed count are checked here; `run_trial`
    /// validates the full configuration.
    pub fn seed<R: Rng + ?Sized>(
        config: &TrialConfig,
        rng: &mut R,
    ) -> Result<Self, CycleforgeError> {
        if config.seed_count == 0 {
            return Err(CycleforgeError::invalid("seed_count", "must be at least 1"));
        }
        let space = ToroidalSpace::new(config.dimension)?;

        let mut graph = Graph::new();
        let mut positions = PositionStore::new();
        let mut terminals = Vec::with_capacity(config.seed_count);
        for _ in 0..config.seed_count {
            let node = graph.add_node();
            positions.assign(node, space.sample_uniform(rng))?;
            terminals.push(node);
        }

        Ok(Self {
            space,
            fuse_radius: config.fuse_radius,
            branch_probability: config.branch_probability,
            extend_sigma: config.extend_sigma,
            graph,
            positions,
            terminals,
            history: GenusHistory::new(),
            steps_executed: 0,
            stats: GrowthStats::default(),
        })
    }

    /// Execute one branch/extend + fusion step.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepReport, CycleforgeError> {
        let parents = std::mem::take(&mut self.terminals);
        let mut new_nodes = Vec::with_capacity(parents.len().saturating_mul(2));
        for parent in parents {
            new_nodes.push(self.sprout(parent, rng)?);
            if rng.r#gen::<f64>() < self.branch_probability {
                new_nodes.push(self.sprout(parent, rng)?);
            }
        }

        let plan = {
            let points = new_nodes
                .iter()
                .map(|&n| self.positions.require(n))
                .collect::<Result<Vec<_>, _>>()?;
            plan_fusion(&self.space, &points, self.fuse_radius)?
        };

        let triangle = match plan.triangle {
            Some([i, j, k]) => {
                let (a, b, c) = (new_nodes[i], new_nodes[j], new_nodes[k]);
                self.graph.add_edge(a, b)?;
                self.graph.add_edge(a, c)?;
                self.graph.add_edge(b, c)?;
                Some([a, b, c])
            }
            None => None,
        };
        for &(i, j) in &plan.pairs {
            self.graph.add_edge(new_nodes[i], new_nodes[j])?;
        }

        self.terminals = new_nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| !plan.is_consumed(*i))
            .map(|(_, &n)| n)
            .collect();

        self.stats.new_tips = self.stats.new_tips.saturating_add(new_nodes.len() as u64);
        self.stats.fusions = self.stats.fusions.saturating_add(plan.fusion_count());
        self.stats.pair_fusions = self
            .stats
            .pair_fusions
            .saturating_add(plan.pairs.len() as u64);
        if triangle.is_some() {
            self.stats.triangles = self.stats.triangles.saturating_add(1);
        }

        let genus = cycle_rank(&self.graph);
        self.history.record(genus);
        self.steps_executed = self.steps_executed.saturating_add(1);

        Ok(StepReport {
            step: self.steps_executed,
            new_tips: new_nodes.len(),
            pair_fusions: plan.pairs.len(),
            triangle,
            terminals: self.terminals.len(),
            genus,
        })
    }

    /// Execute `steps` steps, handing each report to `observer`.
    pub fn run<R, F>(
        &mut self,
        steps: usize,
        rng: &mut R,
        mut observer: F,
    ) -> Result<(), CycleforgeError>
    where
        R: Rng + ?Sized,
        F: FnMut(&StepReport),
    {
        for _ in 0..steps {
            let report = self.step(rng)?;
            observer(&report);
        }
        Ok(())
    }

    /// Create a tip next to `parent` and join it with an edge.
    fn sprout<R: Rng + ?Sized>(
        &mut self,
        parent: NodeId,
        rng: &mut R,
    ) -> Result<NodeId, CycleforgeError> {
        let position = {
            let origin = self.positions.require(parent)?;
            self.space.jitter(origin, self.extend_sigma, rng)?
        };
        let tip = self.graph.add_node();
        self.positions.assign(tip, position)?;
        self.graph.add_edge(parent, tip)?;
        Ok(tip)
    }

    /// The space the graph lives in.
    #[must_use]
    pub fn space(&self) -> &ToroidalSpace {
        &self.space
    }

    /// The graph grown so far.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Positions of every node created so far.
    #[must_use]
    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Current growth frontier, in creation order.
    #[must_use]
    pub fn terminals(&self) -> &[NodeId] {
        &self.terminals
    }

    /// Cycle rank per step, seed entry first.
    #[must_use]
    pub fn history(&self) -> &GenusHistory {
        &self.history
    }

    /// Steps executed so far.
    #[must_use]
    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    /// Running totals.
    #[must_use]
    pub fn stats(&self) -> GrowthStats {
        self.stats
    }

    /// Consume the engine, keeping its final state.
    #[must_use]
    pub fn into_parts(self) -> (Graph, PositionStore, GenusHistory, GrowthStats) {
        (self.graph, self.positions, self.history, self.stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================
