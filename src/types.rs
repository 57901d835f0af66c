use serde::{Deserialize, Serialize};

use crate::classifiers::Macroclassifier;

/// Named fitness view used for selection, sorting and deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComparisonMode {
    Exploration,   // Fitness seen while exploring (GA parent selection)
    Exploitation,  // Fitness seen while exploiting (inference, crossover averaging)
    Deletion,      // Deletion vote; higher means more deletable
    PureFitness,   // Raw fitness without numerosity or experience scaling
}

impl ComparisonMode {
    pub const ALL: [ComparisonMode; 4] = [
        ComparisonMode::Exploration,
        ComparisonMode::Exploitation,
        ComparisonMode::Deletion,
        ComparisonMode::PureFitness,
    ];
}

/// Defines whether a metric should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationDirection {
    Maximize,
    Minimize,
}

/// Smallest denominator used when inverting a fitness value
const INVERSE_EPSILON: f64 = 1e-9;

/// Fitness metric a selector weights individuals by
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitnessMetric {
    pub mode: ComparisonMode,
    pub direction: OptimizationDirection,
}

impl FitnessMetric {
    pub fn new(mode: ComparisonMode, direction: OptimizationDirection) -> Self {
        Self { mode, direction }
    }

    pub fn maximize(mode: ComparisonMode) -> Self {
        Self::new(mode, OptimizationDirection::Maximize)
    }

    pub fn minimize(mode: ComparisonMode) -> Self {
        Self::new(mode, OptimizationDirection::Minimize)
    }

    /// Per-individual score, higher is always preferred by the selector
    pub fn score(&self, macroclassifier: &Macroclassifier) -> f64 {
        let value = macroclassifier.classifier.comparison_value(self.mode);
        match self.direction {
            OptimizationDirection::Maximize => value,
            OptimizationDirection::Minimize => -value,
        }
    }

    /// Roulette weight of a whole slot (accounts for numerosity)
    pub fn weight(&self, macroclassifier: &Macroclassifier) -> f64 {
        let value = macroclassifier.classifier.comparison_value(self.mode).max(0.0);
        let numerosity = macroclassifier.numerosity() as f64;
        let weight = match self.direction {
            OptimizationDirection::Maximize => value * numerosity,
            OptimizationDirection::Minimize => numerosity / (value + INVERSE_EPSILON),
        };
        if weight.is_finite() {
            weight
        } else {
            0.0
        }
    }
}
