use super::PopulationControlStrategy;
use crate::classifiers::ClassifierSet;
use crate::engines::generation::{NaturalSelector, SelectionCount};
use crate::error::{LcsError, Result};
use rand::rngs::StdRng;

/// Delete one individual at a time until the population is back at its target size
///
/// Victims are drawn by the configured selector, usually weighted toward low
/// fitness through a minimizing metric or a deletion-vote mode.
pub struct FixedSizeSetWorstFitnessDeletion {
    target_size: usize,
    selector: Box<dyn NaturalSelector>,
    rng: StdRng,
}

impl FixedSizeSetWorstFitnessDeletion {
    pub fn new(target_size: usize, selector: Box<dyn NaturalSelector>, rng: StdRng) -> Self {
        Self {
            target_size,
            selector,
            rng,
        }
    }

    pub fn target_size(&self) -> usize {
        self.target_size
    }
}

impl PopulationControlStrategy for FixedSizeSetWorstFitnessDeletion {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize> {
        let mut removed = 0;
        while population.total_numerosity() > self.target_size {
            let victim = self
                .selector
                .select_indices(SelectionCount::Count(1), population, &mut self.rng)?
                .first()
                .copied()
                .ok_or_else(|| LcsError::NotFound("Deletion selector returned no victim".to_string()))?;
            population.delete_classifier(victim)?;
            removed += 1;
        }

        if removed > 0 {
            log::debug!(
                "Deleted {} individuals to hold population at {}",
                removed,
                self.target_size
            );
        }
        Ok(removed)
    }
}
