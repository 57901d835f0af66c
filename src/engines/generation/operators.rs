use crate::classifiers::{Chromosome, Classifier, ClassifierRepresentation};
use crate::error::{LcsError, Result};
use crate::types::ComparisonMode;
use rand::{Rng, RngCore};
use std::fmt::Debug;

/// Produces one offspring from two parents
pub trait BinaryGeneticOperator: Send + Sync + Debug {
    fn operate(
        &self,
        parent_a: &Classifier,
        parent_b: &Classifier,
        representation: &dyn ClassifierRepresentation,
        rng: &mut dyn RngCore,
    ) -> Result<Classifier>;
}

/// Modifies a classifier in place
pub trait UnaryGeneticOperator: Send + Sync + Debug {
    /// Returns the number of changed positions
    fn operate(&self, classifier: &mut Classifier, rng: &mut dyn RngCore) -> usize;
}

/// Bits `< locus` from `parent_a`, bits `>= locus` from `parent_b`
pub fn splice_at(parent_a: &Chromosome, parent_b: &Chromosome, locus: usize) -> Result<Chromosome> {
    if parent_a.size() != parent_b.size() {
        return Err(LcsError::InvalidArgument(format!(
            "Cannot cross chromosomes of length {} and {}",
            parent_a.size(),
            parent_b.size()
        )));
    }
    if locus > parent_a.size() {
        return Err(LcsError::index(locus, parent_a.size()));
    }

    let mut child = parent_a.bits()[..locus].to_vec();
    child.extend_from_slice(&parent_b.bits()[locus..]);
    Ok(Chromosome::from_bits(child))
}

/// Single-point crossover with a uniformly drawn locus
#[derive(Debug, Clone, Copy, Default)]
pub struct SinglePointCrossover;

impl SinglePointCrossover {
    /// Crossover at a fixed locus; the child averages the parents' exploitation value
    pub fn cross_at(
        &self,
        parent_a: &Classifier,
        parent_b: &Classifier,
        locus: usize,
        representation: &dyn ClassifierRepresentation,
    ) -> Result<Classifier> {
        let bits = splice_at(parent_a.chromosome(), parent_b.chromosome(), locus)?;
        let mut child = representation.create_classifier(bits);
        let exploitation = (parent_a.comparison_value(ComparisonMode::Exploitation)
            + parent_b.comparison_value(ComparisonMode::Exploitation))
            / 2.0;
        child.set_comparison_value(ComparisonMode::Exploitation, exploitation);
        Ok(child)
    }
}

impl BinaryGeneticOperator for SinglePointCrossover {
    fn operate(
        &self,
        parent_a: &Classifier,
        parent_b: &Classifier,
        representation: &dyn ClassifierRepresentation,
        rng: &mut dyn RngCore,
    ) -> Result<Classifier> {
        let len = parent_a.chromosome().size();
        let locus = if len == 0 { 0 } else { rng.gen_range(0..len) };
        self.cross_at(parent_a, parent_b, locus, representation)
    }
}

/// Flip every bit independently with probability `rate`
#[derive(Debug, Clone, Copy)]
pub struct UniformBitMutation {
    rate: f64,
}

impl UniformBitMutation {
    pub fn new(rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(LcsError::InvalidArgument(format!(
                "Mutation rate {} must be between 0 and 1",
                rate
            )));
        }
        Ok(Self { rate })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl UnaryGeneticOperator for UniformBitMutation {
    fn operate(&self, classifier: &mut Classifier, rng: &mut dyn RngCore) -> usize {
        let chromosome = classifier.chromosome_mut();
        let mut flipped = 0;
        for position in 0..chromosome.size() {
            if rng.gen_bool(self.rate) && chromosome.invert(position).is_ok() {
                flipped += 1;
            }
        }
        flipped
    }
}
