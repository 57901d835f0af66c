//! Steady-state genetic evolution of bit-string classifier populations, with
//! rule migration between independently evolving peers.

pub mod classifiers;
pub mod config;
pub mod engines;
pub mod error;
pub mod exchange;
pub mod simulation;
pub mod types;

pub use classifiers::{Chromosome, Classifier, ClassifierSet, Macroclassifier};
pub use error::{LcsError, Result};
pub use types::{ComparisonMode, FitnessMetric, OptimizationDirection};
