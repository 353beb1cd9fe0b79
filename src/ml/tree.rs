//! Regression trees grown leaf-wise on histogram statistics.
//!
//! The loss is squared error, so every row contributes a gradient
//! `prediction - target` and a unit hessian; bin statistics therefore only
//! need the gradient sum and the row count.

use crate::ml::binning::{BinStorage, BinnedMatrix};

/// Row is not part of the current tree (bagged out)
const NO_LEAF: u32 = u32::MAX;

/// Relative gain below which a split is treated as round-off noise
const GAIN_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub num_leaves: usize,
    pub max_depth: Option<usize>,
    pub min_child_samples: usize,
    pub lambda_l2: f64,
    pub min_split_gain: f64,
    /// Shrinkage folded into the leaf values
    pub learning_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        /// Rows with bin <= `bin` go left during training
        bin: u16,
        /// Raw values <= `threshold` go left at inference
        threshold: f64,
        left: usize,
        right: usize,
        gain: f64,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Walk the tree with raw (encoded) feature values
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Walk the tree with the binned training representation of `row`
    pub fn predict_binned(&self, data: &BinnedMatrix, row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    bin,
                    left,
                    right,
                    ..
                } => {
                    idx = if data.feature(*feature).bin_of(row) <= *bin {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BinStat {
    grad: f64,
    count: u32,
}

impl BinStat {
    fn add(&mut self, grad: f64) {
        self.grad += grad;
        self.count += 1;
    }
}

/// Per-feature bin statistics; features outside the sampled set stay empty
type Histogram = Vec<Vec<BinStat>>;

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    gain: f64,
}

struct LeafState {
    node: usize,
    rows: Vec<u32>,
    sum_grad: f64,
    count: u32,
    depth: usize,
    hist: Histogram,
    best: Option<SplitCandidate>,
}

/// Grows one tree against fixed gradients
pub struct TreeGrower<'a> {
    data: &'a BinnedMatrix,
    grad: &'a [f64],
    params: &'a TreeParams,
    features: &'a [usize],
    leaf_of: Vec<u32>,
}

impl<'a> TreeGrower<'a> {
    pub fn new(
        data: &'a BinnedMatrix,
        grad: &'a [f64],
        params: &'a TreeParams,
        features: &'a [usize],
    ) -> Self {
        Self {
            data,
            grad,
            params,
            features,
            leaf_of: vec![NO_LEAF; data.n_rows()],
        }
    }

    /// Grow a tree over `rows` (ascending, unique)
    pub fn grow(mut self, rows: Vec<u32>) -> RegressionTree {
        for &r in &rows {
            self.leaf_of[r as usize] = 0;
        }
        let sum_grad: f64 = rows.iter().map(|&r| self.grad[r as usize]).sum();
        let count = rows.len() as u32;
        let hist = self.build_histogram(0, &rows, sum_grad, count);

        let mut root = LeafState {
            node: 0,
            rows,
            sum_grad,
            count,
            depth: 0,
            hist,
            best: None,
        };
        root.best = self.best_split(&root);

        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut leaves = vec![root];

        while leaves.len() < self.params.num_leaves {
            let Some(slot) = pick_leaf(&leaves) else {
                break;
            };
            self.split_leaf(slot, &mut leaves, &mut nodes);
        }

        for leaf in &leaves {
            nodes[leaf.node] = Node::Leaf {
                value: self.leaf_value(leaf.sum_grad, leaf.count),
            };
        }
        RegressionTree { nodes }
    }

    fn leaf_value(&self, sum_grad: f64, count: u32) -> f64 {
        let denom = count as f64 + self.params.lambda_l2;
        if denom <= 0.0 {
            return 0.0;
        }
        -sum_grad / denom * self.params.learning_rate
    }

    fn split_leaf(&mut self, slot: usize, leaves: &mut Vec<LeafState>, nodes: &mut Vec<Node>) {
        let Some(split) = leaves[slot].best.take() else {
            return;
        };
        let parent_node = leaves[slot].node;
        let depth = leaves[slot].depth + 1;
        let parent_rows = std::mem::take(&mut leaves[slot].rows);
        let parent_hist = std::mem::take(&mut leaves[slot].hist);
        let data = self.data;
        let feature = data.feature(split.feature);

        let right_slot = leaves.len() as u32;
        let mut left_rows = Vec::new();
        let mut right_rows = Vec::new();
        let (mut left_grad, mut right_grad) = (0.0, 0.0);
        for r in parent_rows {
            let g = self.grad[r as usize];
            if feature.bin_of(r as usize) as usize <= split.bin {
                left_grad += g;
                left_rows.push(r);
            } else {
                right_grad += g;
                right_rows.push(r);
                self.leaf_of[r as usize] = right_slot;
            }
        }
        let left_count = left_rows.len() as u32;
        let right_count = right_rows.len() as u32;

        // Build the smaller child directly, derive the larger by subtraction.
        let (left_hist, right_hist) = if left_rows.len() <= right_rows.len() {
            let small = self.build_histogram(slot as u32, &left_rows, left_grad, left_count);
            let large = subtract(&parent_hist, &small);
            (small, large)
        } else {
            let small = self.build_histogram(right_slot, &right_rows, right_grad, right_count);
            let large = subtract(&parent_hist, &small);
            (large, small)
        };

        let left_node = nodes.len();
        let right_node = left_node + 1;
        nodes.push(Node::Leaf { value: 0.0 });
        nodes.push(Node::Leaf { value: 0.0 });
        nodes[parent_node] = Node::Split {
            feature: split.feature,
            bin: split.bin as u16,
            threshold: feature.threshold(split.bin),
            left: left_node,
            right: right_node,
            gain: split.gain,
        };

        let mut left = LeafState {
            node: left_node,
            rows: left_rows,
            sum_grad: left_grad,
            count: left_count,
            depth,
            hist: left_hist,
            best: None,
        };
        let mut right = LeafState {
            node: right_node,
            rows: right_rows,
            sum_grad: right_grad,
            count: right_count,
            depth,
            hist: right_hist,
            best: None,
        };
        left.best = self.best_split(&left);
        right.best = self.best_split(&right);

        leaves[slot] = left;
        leaves.push(right);
    }

    fn build_histogram(&self, leaf: u32, rows: &[u32], sum_grad: f64, count: u32) -> Histogram {
        let mut hist: Histogram = vec![Vec::new(); self.data.n_features()];
        for &f in self.features {
            let feature = self.data.feature(f);
            let mut bins = vec![BinStat::default(); feature.n_bins()];
            match feature.storage() {
                BinStorage::Dense(assigned) => {
                    for &r in rows {
                        bins[assigned[r as usize] as usize].add(self.grad[r as usize]);
                    }
                }
                BinStorage::Sparse {
                    default_bin,
                    rows: sparse_rows,
                    bins: sparse_bins,
                } => {
                    let lookups = rows.len() as f64 * (sparse_rows.len().max(2) as f64).log2();
                    if lookups < sparse_rows.len() as f64 {
                        for &r in rows {
                            if let Ok(pos) = sparse_rows.binary_search(&r) {
                                bins[sparse_bins[pos] as usize].add(self.grad[r as usize]);
                            }
                        }
                    } else {
                        for (k, &r) in sparse_rows.iter().enumerate() {
                            if self.leaf_of[r as usize] == leaf {
                                bins[sparse_bins[k] as usize].add(self.grad[r as usize]);
                            }
                        }
                    }
                    let (other_grad, other_count) = bins
                        .iter()
                        .fold((0.0, 0u32), |(g, c), b| (g + b.grad, c + b.count));
                    let default = &mut bins[*default_bin as usize];
                    default.grad = sum_grad - other_grad;
                    default.count = count - other_count;
                }
            }
            hist[f] = bins;
        }
        hist
    }

    fn best_split(&self, leaf: &LeafState) -> Option<SplitCandidate> {
        let p = self.params;
        if let Some(max_depth) = p.max_depth {
            if leaf.depth >= max_depth {
                return None;
            }
        }
        let min_child = p.min_child_samples.max(1) as u32;
        if leaf.count < 2 * min_child {
            return None;
        }

        let score = |g: f64, c: u32| g * g / (c as f64 + p.lambda_l2);
        let parent_score = score(leaf.sum_grad, leaf.count);
        let floor = p.min_split_gain.max(GAIN_EPSILON * parent_score.abs().max(1.0));

        let mut best: Option<SplitCandidate> = None;
        for &f in self.features {
            let bins = &leaf.hist[f];
            if bins.len() < 2 {
                continue;
            }
            let (mut left_grad, mut left_count) = (0.0, 0u32);
            for (b, stat) in bins[..bins.len() - 1].iter().enumerate() {
                left_grad += stat.grad;
                left_count += stat.count;
                if left_count < min_child {
                    continue;
                }
                let right_count = leaf.count - left_count;
                if right_count < min_child {
                    break;
                }
                let right_grad = leaf.sum_grad - left_grad;
                let gain =
                    score(left_grad, left_count) + score(right_grad, right_count) - parent_score;
                if gain > floor && best.map_or(true, |c| gain > c.gain) {
                    best = Some(SplitCandidate {
                        feature: f,
                        bin: b,
                        gain,
                    });
                }
            }
        }
        best
    }
}

/// Leaf with the largest pending gain; earliest slot wins ties
fn pick_leaf(leaves: &[LeafState]) -> Option<usize> {
    let mut chosen: Option<(usize, f64)> = None;
    for (slot, leaf) in leaves.iter().enumerate() {
        if let Some(c) = leaf.best {
            if chosen.map_or(true, |(_, g)| c.gain > g) {
                chosen = Some((slot, c.gain));
            }
        }
    }
    chosen.map(|(slot, _)| slot)
}

fn subtract(parent: &Histogram, child: &Histogram) -> Histogram {
    parent
        .iter()
        .zip(child)
        .map(|(p, c)| {
            p.iter()
                .zip(c)
                .map(|(a, b)| BinStat {
                    grad: a.grad - b.grad,
                    count: a.count - b.count,
                })
                .collect()
        })
        .collect()
}
