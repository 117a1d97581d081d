//! Single-feature regressors
//!
//! Both regressors are deterministic: fitting the same samples twice gives
//! bit-identical models, so forecasts are reproducible without a seed.

use crate::config::{BoostingParams, ForecastConfig, ModelKind};
use crate::error::{Error, Result};

/// One training point: feature `x`, target `y`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A regressor that can be fitted on one feature
pub trait Regressor: Send + Sync {
    /// Short identifier for logs
    fn name(&self) -> &'static str;

    /// Fit on at least one sample
    fn fit(&self, samples: &[Sample]) -> Result<Box<dyn FittedModel>>;
}

/// A fitted model
pub trait FittedModel: Send + Sync {
    fn predict(&self, x: f64) -> f64;
}

/// Build the regressor selected by the configuration
pub fn regressor_for(config: &ForecastConfig) -> Box<dyn Regressor> {
    match config.model {
        ModelKind::GradientBoosting => Box::new(GradientBoostedTrees::new(config.boosting.clone())),
        ModelKind::Linear => Box::new(LinearRegression),
    }
}

fn validate_samples(samples: &[Sample]) -> Result<()> {
    if samples.is_empty() {
        return Err(Error::Model("cannot fit on zero samples".into()));
    }
    if let Some(bad) = samples.iter().find(|s| !s.x.is_finite() || !s.y.is_finite()) {
        return Err(Error::Model(format!(
            "non-finite sample (x={}, y={})",
            bad.x, bad.y
        )));
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count as f64
}

// ============================================================================
// Gradient-boosted trees
// ============================================================================

/// Squared-error gradient boosting over depth-limited regression trees
///
/// Starts from the target mean and adds one tree per round, each fitted to
/// the current residuals. Leaf weights are `sum(residual) / (count + lambda)`
/// scaled by the learning rate; a node splits only when the gain exceeds
/// `min_split_gain`. There is no row or column sampling.
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    params: BoostingParams,
}

impl GradientBoostedTrees {
    pub fn new(params: BoostingParams) -> Self {
        Self { params }
    }

    fn build_node(&self, xs: &[f64], residuals: &[f64], depth: usize) -> Node {
        let n = xs.len();
        let total: f64 = residuals.iter().sum();
        let leaf = Node::Leaf(self.params.learning_rate * total / (n as f64 + self.params.lambda));

        if depth >= self.params.max_depth || n < 2 {
            return leaf;
        }

        let lambda = self.params.lambda;
        let score = |g: f64, count: usize| g * g / (count as f64 + lambda);
        let parent = score(total, n);

        // xs is sorted, so every boundary between distinct values is a candidate
        let mut best: Option<(usize, f64)> = None;
        let mut left_sum = 0.0;
        for i in 1..n {
            left_sum += residuals[i - 1];
            if xs[i - 1] == xs[i] {
                continue;
            }
            let gain = 0.5 * (score(left_sum, i) + score(total - left_sum, n - i) - parent);
            if gain > self.params.min_split_gain && best.map_or(true, |(_, g)| gain > g) {
                best = Some((i, gain));
            }
        }

        match best {
            Some((i, _)) => Node::Split {
                threshold: (xs[i - 1] + xs[i]) / 2.0,
                left: Box::new(self.build_node(&xs[..i], &residuals[..i], depth + 1)),
                right: Box::new(self.build_node(&xs[i..], &residuals[i..], depth + 1)),
            },
            None => leaf,
        }
    }
}

impl Default for GradientBoostedTrees {
    fn default() -> Self {
        Self::new(BoostingParams::default())
    }
}

impl Regressor for GradientBoostedTrees {
    fn name(&self) -> &'static str {
        "gradient_boosting"
    }

    fn fit(&self, samples: &[Sample]) -> Result<Box<dyn FittedModel>> {
        validate_samples(samples)?;

        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.x.total_cmp(&b.x));

        let xs: Vec<f64> = sorted.iter().map(|s| s.x).collect();
        let ys: Vec<f64> = sorted.iter().map(|s| s.y).collect();

        let base_score = mean(ys.iter().copied());
        let mut predictions = vec![base_score; ys.len()];
        let mut trees = Vec::with_capacity(self.params.rounds);

        for _ in 0..self.params.rounds {
            let residuals: Vec<f64> = ys
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();

            let tree = self.build_node(&xs, &residuals, 0);
            for (p, &x) in predictions.iter_mut().zip(&xs) {
                *p += tree.eval(x);
            }
            trees.push(tree);
        }

        Ok(Box::new(BoostedModel { base_score, trees }))
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn eval(&self, x: f64) -> f64 {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(value) => return *value,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => node = if x < *threshold { left } else { right },
            }
        }
    }
}

/// Fitted gradient-boosted ensemble
#[derive(Debug, Clone)]
pub struct BoostedModel {
    base_score: f64,
    trees: Vec<Node>,
}

impl FittedModel for BoostedModel {
    fn predict(&self, x: f64) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.eval(x)).sum::<f64>()
    }
}

// ============================================================================
// Linear regression
// ============================================================================

/// Ordinary least squares: y = intercept + slope * x
///
/// With fewer than two distinct x values the slope is zero and the model
/// predicts the target mean everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearRegression;

impl Regressor for LinearRegression {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn fit(&self, samples: &[Sample]) -> Result<Box<dyn FittedModel>> {
        validate_samples(samples)?;

        let mean_x = mean(samples.iter().map(|s| s.x));
        let mean_y = mean(samples.iter().map(|s| s.y));

        let sxx: f64 = samples.iter().map(|s| (s.x - mean_x).powi(2)).sum();
        let sxy: f64 = samples
            .iter()
            .map(|s| (s.x - mean_x) * (s.y - mean_y))
            .sum();

        let slope = if sxx.abs() < 1e-10 { 0.0 } else { sxy / sxx };
        let intercept = mean_y - slope * mean_x;

        Ok(Box::new(LinearModel { intercept, slope }))
    }
}

/// Fitted line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub intercept: f64,
    pub slope: f64,
}

impl FittedModel for LinearModel {
    fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}
