use super::PopulationControlStrategy;
use crate::classifiers::{ClassifierSet, Macroclassifier};
use crate::error::Result;
use crate::types::ComparisonMode;
use std::cmp::Ordering;

/// Experience below which a rule's fitness is not trusted for ranking
const MATURITY_EXPERIENCE: u64 = 10;

/// Reorder the population best first; contents and numerosities are unchanged
#[derive(Debug, Clone, Copy)]
pub struct SortPopulationControl {
    mode: ComparisonMode,
}

impl SortPopulationControl {
    pub fn new(mode: ComparisonMode) -> Self {
        Self { mode }
    }

    fn primary_key(&self, macroclassifier: &Macroclassifier) -> f64 {
        let classifier = &macroclassifier.classifier;
        if classifier.experience < MATURITY_EXPERIENCE {
            return 0.0;
        }
        classifier.comparison_value(self.mode) * macroclassifier.numerosity() as f64
    }

    fn compare(&self, a: &Macroclassifier, b: &Macroclassifier) -> Ordering {
        self.primary_key(b)
            .partial_cmp(&self.primary_key(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.classifier
                    .coverage
                    .partial_cmp(&a.classifier.coverage)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.classifier.experience.cmp(&a.classifier.experience))
    }
}

impl PopulationControlStrategy for SortPopulationControl {
    fn control_population(&mut self, population: &mut ClassifierSet) -> Result<usize> {
        let control = *self;
        population.sort_by(|a, b| control.compare(a, b));
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{BitStringRepresentation, Classifier};
    use std::sync::Arc;

    fn rule(bits: &str, fitness: f64, numerosity: usize, experience: u64, coverage: f64) -> Macroclassifier {
        let mut classifier = Classifier::new(bits.parse().unwrap());
        classifier.set_comparison_value(ComparisonMode::Exploitation, fitness);
        classifier.experience = experience;
        classifier.coverage = coverage;
        Macroclassifier::new(classifier, numerosity)
    }

    #[test]
    fn test_sort_order() {
        let mut set = ClassifierSet::new(Arc::new(BitStringRepresentation::new(3)));
        set.add_classifier(rule("000", 0.9, 1, 50, 0.1), false).unwrap(); // key 0.9
        set.add_classifier(rule("001", 0.5, 4, 50, 0.1), false).unwrap(); // key 2.0
        set.add_classifier(rule("010", 1.0, 9, 3, 0.9), false).unwrap(); // immature, key 0
        set.add_classifier(rule("011", 0.9, 1, 80, 0.5), false).unwrap(); // key 0.9, more coverage
        set.add_classifier(rule("100", 0.0, 1, 90, 0.9), false).unwrap(); // key 0, more experience than 010

        let before = set.total_numerosity();
        SortPopulationControl::new(ComparisonMode::Exploitation)
            .control_population(&mut set)
            .unwrap();

        let order: Vec<String> = set.iter().map(|m| m.classifier.chromosome().to_string()).collect();
        assert_eq!(order, vec!["001", "011", "000", "100", "010"]);
        assert_eq!(set.total_numerosity(), before);
    }
}
