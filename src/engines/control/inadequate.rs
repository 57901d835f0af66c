use super::PopulationControlStrategy;
use crate::classifiers::ClassifierSet;
use crate::error::Result;

/// Remove rules that had enough chances to cover something and never did
#[derive(Debug, Clone, Copy)]
pub struct InadequateClassifierDeletion {
    min_instances: u64,
}

impl InadequateClassifierDeletion {
    pub fn new(min_instances: u64) -> Self {
        Self { min_instances }
    }
}

impl PopulationControlStrategy for InadequateClassifierDeletion {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize> {
        let mut removed = 0;
        // Walk backwards so removals do not shift slots still to be visited
        for index in (0..population.number_of_macroclassifiers()).rev() {
            let classifier = population.classifier(index)?;
            if classifier.checked_instances >= self.min_instances && classifier.coverage == 0.0 {
                removed += population.delete_macroclassifier(index)?.numerosity();
            }
        }
        Ok(removed)
    }
}
