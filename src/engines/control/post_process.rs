use super::PopulationControlStrategy;
use crate::classifiers::ClassifierSet;
use crate::error::Result;
use crate::types::ComparisonMode;

/// Final clean-up after training: drop immature, uncovering or unfit rules,
/// then coalesce duplicates.
#[derive(Debug, Clone, Copy)]
pub struct PostProcessPopulationControl {
    pub min_experience: u64,
    pub min_coverage: f64,
    pub min_fitness: f64,
    pub mode: ComparisonMode,
}

impl PostProcessPopulationControl {
    pub fn new(min_experience: u64, min_coverage: f64, min_fitness: f64, mode: ComparisonMode) -> Self {
        Self {
            min_experience,
            min_coverage,
            min_fitness,
            mode,
        }
    }
}

impl PopulationControlStrategy for PostProcessPopulationControl {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize> {
        let mut removed = 0;
        for index in (0..population.number_of_macroclassifiers()).rev() {
            let classifier = population.classifier(index)?;
            let discard = classifier.experience < self.min_experience
                || classifier.coverage <= self.min_coverage
                || classifier.comparison_value(self.mode) < self.min_fitness;
            if discard {
                removed += population.delete_macroclassifier(index)?.numerosity();
            }
        }

        population.self_subsume();
        log::debug!(
            "Post-processing removed {} individuals, {} rules remain",
            removed,
            population.number_of_macroclassifiers()
        );
        Ok(removed)
    }
}
