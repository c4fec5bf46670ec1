// Sentra Analytics - Anomaly and trend analysis
// Copyright (c) 2026 Sentra Maintainers
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Isolation forest over per-reading feature vectors.
//!
//! Points are isolated by recursive random axis-aligned partitioning;
//! points that need fewer partitions to isolate score as more anomalous.
//! The forest is re-fit on every invocation from a fixed seed, so the
//! same window always produces the same scores.

use crate::config::ForestConfig;
use crate::stats::FEATURE_DIM;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Euler-Mascheroni constant, for the harmonic-number approximation.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average unsuccessful-search path length in a binary search tree of
/// `n` points. Normalizes raw path lengths into scores.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

enum Node {
    Internal {
        feature: usize,
        split: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl Node {
    fn path_length(&self, point: &[f64; FEATURE_DIM], depth: f64) -> f64 {
        match self {
            Node::Leaf { size } => depth + average_path_length(*size),
            Node::Internal {
                feature,
                split,
                left,
                right,
            } => {
                if point[*feature] < *split {
                    left.path_length(point, depth + 1.0)
                } else {
                    right.path_length(point, depth + 1.0)
                }
            }
        }
    }
}

/// An ensemble of isolation trees fitted over one window.
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit a forest over the feature matrix. Needs at least 2 points;
    /// callers gate on history size before fitting.
    pub fn fit(config: &ForestConfig, data: &[[f64; FEATURE_DIM]]) -> Self {
        if data.is_empty() {
            return Self {
                trees: Vec::new(),
                sample_size: 0,
            };
        }

        let sample_size = config.sample_size.min(data.len()).max(2);
        let max_depth = (sample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(config.seed);

        let mut trees = Vec::with_capacity(config.num_trees);
        for _ in 0..config.num_trees {
            let mut sample: Vec<[f64; FEATURE_DIM]> = (0..sample_size)
                .map(|_| data[rng.gen_range(0..data.len())])
                .collect();
            trees.push(build_tree(&mut sample, 0, max_depth, &mut rng));
        }

        Self { trees, sample_size }
    }

    /// Isolation score in `(0, 1]`; higher is more anomalous. Scores
    /// around 0.5 mean "as deep as an average point".
    pub fn score(&self, point: &[f64; FEATURE_DIM]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(point, 0.0))
            .sum();
        let mean_path = total / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        if norm <= 0.0 {
            return 0.5;
        }

        2.0_f64.powf(-mean_path / norm)
    }

    /// Score every row of a feature matrix.
    pub fn score_all(&self, data: &[[f64; FEATURE_DIM]]) -> Vec<f64> {
        data.iter().map(|point| self.score(point)).collect()
    }
}

fn build_tree(
    data: &mut [[f64; FEATURE_DIM]],
    depth: usize,
    max_depth: usize,
    rng: &mut StdRng,
) -> Node {
    if data.len() <= 1 || depth >= max_depth {
        return Node::Leaf { size: data.len() };
    }

    // Only features with spread can split; constant data is a leaf.
    let mut candidates = [false; FEATURE_DIM];
    let mut candidate_count = 0;
    for feature in 0..FEATURE_DIM {
        let (min, max) = feature_extent(data, feature);
        if max > min {
            candidates[feature] = true;
            candidate_count += 1;
        }
    }
    if candidate_count == 0 {
        return Node::Leaf { size: data.len() };
    }

    let mut pick = rng.gen_range(0..candidate_count);
    let mut feature = 0;
    for (f, &usable) in candidates.iter().enumerate() {
        if usable {
            if pick == 0 {
                feature = f;
                break;
            }
            pick -= 1;
        }
    }

    let (min, max) = feature_extent(data, feature);
    let split = rng.gen_range(min..max);

    // Partition in place: values below the split go left.
    let mut boundary = 0;
    for i in 0..data.len() {
        if data[i][feature] < split {
            data.swap(i, boundary);
            boundary += 1;
        }
    }

    let (left, right) = data.split_at_mut(boundary);
    Node::Internal {
        feature,
        split,
        left: Box::new(build_tree(left, depth + 1, max_depth, rng)),
        right: Box::new(build_tree(right, depth + 1, max_depth, rng)),
    }
}

fn feature_extent(data: &[[f64; FEATURE_DIM]], feature: usize) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for point in data {
        min = min.min(point[feature]);
        max = max.max(point[feature]);
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_data(n: usize) -> Vec<[f64; FEATURE_DIM]> {
        vec![[20.0, 0.0, 0.0]; n]
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(0), 0.0);
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        // Grows roughly like 2 ln(n).
        assert!(average_path_length(256) > average_path_length(64));
    }

    #[test]
    fn test_constant_data_scores_neutral() {
        let data = constant_data(32);
        let forest = IsolationForest::fit(&ForestConfig::default(), &data);
        for score in forest.score_all(&data) {
            assert!((score - 0.5).abs() < 0.05, "score was {}", score);
        }
    }

    #[test]
    fn test_outlier_scores_higher() {
        let mut data = constant_data(30);
        data.push([95.0, 1.25, 0.0]);

        let forest = IsolationForest::fit(&ForestConfig::default(), &data);
        let scores = forest.score_all(&data);
        let outlier_score = scores[30];
        let max_inlier = scores[..30]
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, f64::max);

        assert!(
            outlier_score > max_inlier,
            "outlier {} vs max inlier {}",
            outlier_score,
            max_inlier
        );
        assert!(outlier_score > 0.6);
    }

    #[test]
    fn test_same_seed_same_scores() {
        let mut data = constant_data(20);
        data.push([50.0, 0.5, 3.0]);

        let config = ForestConfig::default();
        let a = IsolationForest::fit(&config, &data).score_all(&data);
        let b = IsolationForest::fit(&config, &data).score_all(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_still_separates() {
        let mut data = constant_data(30);
        data.push([95.0, 1.25, 0.0]);

        let config = ForestConfig {
            seed: 7,
            ..Default::default()
        };
        let forest = IsolationForest::fit(&config, &data);
        let scores = forest.score_all(&data);
        assert!(scores[30] > scores[0]);
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let data: Vec<[f64; FEATURE_DIM]> = (0..50)
            .map(|i| [i as f64, (i % 5) as f64, 0.0])
            .collect();
        let forest = IsolationForest::fit(&ForestConfig::default(), &data);
        for score in forest.score_all(&data) {
            assert!(score > 0.0 && score <= 1.0);
        }
    }
}
