use super::classifier::Classifier;
use super::macroclassifier::Macroclassifier;
use super::representation::ClassifierRepresentation;
use crate::error::{LcsError, Result};
use crate::types::ComparisonMode;
use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

/// Population handle shared between a peer's training loop and its rule distributer
pub type SharedPopulation = Arc<Mutex<ClassifierSet>>;

/// Ordered, numerosity-compressed collection of macroclassifier slots
///
/// `total_numerosity()` always equals the sum of slot numerosities, and every
/// slot holds numerosity >= 1. Slots are addressed by index; deleting by index
/// shifts later slots down, so callers deleting while iterating must walk from
/// the highest index to the lowest.
#[derive(Debug, Clone)]
pub struct ClassifierSet {
    macroclassifiers: Vec<Macroclassifier>,
    total_numerosity: usize,
    representation: Arc<dyn ClassifierRepresentation>,
}

impl ClassifierSet {
    pub fn new(representation: Arc<dyn ClassifierRepresentation>) -> Self {
        Self {
            macroclassifiers: Vec::new(),
            total_numerosity: 0,
            representation,
        }
    }

    /// Empty set sharing this set's representation
    pub fn empty_like(&self) -> Self {
        Self::new(Arc::clone(&self.representation))
    }

    pub fn representation(&self) -> &Arc<dyn ClassifierRepresentation> {
        &self.representation
    }

    /// Insert a macroclassifier, folding it into a domain-equal slot when
    /// `check_subsumption` is set.
    pub fn add_classifier(&mut self, macroclassifier: Macroclassifier, check_subsumption: bool) -> Result<()> {
        let numerosity = macroclassifier.numerosity();
        if numerosity == 0 {
            return Err(LcsError::InvalidArgument(
                "Cannot insert a macroclassifier with zero numerosity".to_string(),
            ));
        }

        if check_subsumption {
            if let Some(existing) = self.find_equal(&macroclassifier.classifier) {
                self.macroclassifiers[existing].add_numerosity(numerosity);
                self.total_numerosity += numerosity;
                return Ok(());
            }
        }

        self.macroclassifiers.push(macroclassifier);
        self.total_numerosity += numerosity;
        Ok(())
    }

    /// Index of the first slot whose classifier is domain-equal to `classifier`
    pub fn find_equal(&self, classifier: &Classifier) -> Option<usize> {
        self.macroclassifiers
            .iter()
            .position(|m| self.representation.is_equal(&m.classifier, classifier))
    }

    /// Index of the slot holding the individual with this serial
    pub fn position_of(&self, classifier: &Classifier) -> Option<usize> {
        self.macroclassifiers
            .iter()
            .position(|m| m.classifier.serial() == classifier.serial())
    }

    pub fn classifier(&self, index: usize) -> Result<&Classifier> {
        self.macroclassifier(index).map(|m| &m.classifier)
    }

    pub fn classifier_mut(&mut self, index: usize) -> Result<&mut Classifier> {
        let len = self.macroclassifiers.len();
        self.macroclassifiers
            .get_mut(index)
            .map(|m| &mut m.classifier)
            .ok_or_else(|| LcsError::index(index, len))
    }

    pub fn macroclassifier(&self, index: usize) -> Result<&Macroclassifier> {
        self.macroclassifiers
            .get(index)
            .ok_or_else(|| LcsError::index(index, self.macroclassifiers.len()))
    }

    pub fn numerosity(&self, index: usize) -> Result<usize> {
        self.macroclassifier(index).map(Macroclassifier::numerosity)
    }

    /// Numerosity of the slot holding this individual, 0 when absent
    pub fn numerosity_of(&self, classifier: &Classifier) -> usize {
        self.position_of(classifier)
            .map(|i| self.macroclassifiers[i].numerosity())
            .unwrap_or(0)
    }

    /// Remove one instance of the slot at `index`; the slot goes away at zero
    pub fn delete_classifier(&mut self, index: usize) -> Result<()> {
        let len = self.macroclassifiers.len();
        let slot = self
            .macroclassifiers
            .get_mut(index)
            .ok_or_else(|| LcsError::index(index, len))?;

        self.total_numerosity -= 1;
        if slot.decrement() == 0 {
            self.macroclassifiers.remove(index);
        }
        Ok(())
    }

    /// Remove one instance of this individual. Returns false, without error,
    /// when it is no longer in the set.
    pub fn delete_classifier_ref(&mut self, classifier: &Classifier) -> bool {
        match self.position_of(classifier) {
            Some(index) => self.delete_classifier(index).is_ok(),
            None => false,
        }
    }

    /// Remove a whole slot regardless of its numerosity
    pub fn delete_macroclassifier(&mut self, index: usize) -> Result<Macroclassifier> {
        if index >= self.macroclassifiers.len() {
            return Err(LcsError::index(index, self.macroclassifiers.len()));
        }
        let removed = self.macroclassifiers.remove(index);
        self.total_numerosity -= removed.numerosity();
        Ok(removed)
    }

    pub fn total_numerosity(&self) -> usize {
        self.total_numerosity
    }

    pub fn number_of_macroclassifiers(&self) -> usize {
        self.macroclassifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macroclassifiers.is_empty()
    }

    /// Fold every slot of `other` into this set with subsumption checking
    pub fn merge(&mut self, other: &ClassifierSet) {
        for macroclassifier in &other.macroclassifiers {
            // Slots of a well-formed set are never empty
            let _ = self.add_classifier(macroclassifier.clone(), true);
        }
    }

    pub fn remove_all_macroclassifiers(&mut self) {
        self.macroclassifiers.clear();
        self.total_numerosity = 0;
    }

    /// Coalesce domain-equal slots already present, keeping the first occurrence
    pub fn self_subsume(&mut self) {
        let slots = std::mem::take(&mut self.macroclassifiers);
        self.total_numerosity = 0;
        for slot in slots {
            let _ = self.add_classifier(slot, true);
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Macroclassifier> {
        self.macroclassifiers.iter()
    }

    pub fn macroclassifiers(&self) -> &[Macroclassifier] {
        &self.macroclassifiers
    }

    /// Reorder slots; contents and numerosities are untouched
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Macroclassifier, &Macroclassifier) -> Ordering,
    {
        self.macroclassifiers.sort_by(compare);
    }

    /// Indices of slots whose classifier satisfies the predicate
    pub fn niche<P>(&self, mut predicate: P) -> Vec<usize>
    where
        P: FnMut(&Classifier) -> bool,
    {
        self.macroclassifiers
            .iter()
            .enumerate()
            .filter(|(_, m)| predicate(&m.classifier))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn for_each_classifier_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Classifier),
    {
        for slot in &mut self.macroclassifiers {
            f(&mut slot.classifier);
        }
    }

    pub fn stats(&self, mode: ComparisonMode) -> PopulationStats {
        PopulationStats::from_set(self, mode)
    }
}

impl<'a> IntoIterator for &'a ClassifierSet {
    type Item = &'a Macroclassifier;
    type IntoIter = std::slice::Iter<'a, Macroclassifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.macroclassifiers.iter()
    }
}

/// Summary of a population under one comparison mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationStats {
    pub macroclassifiers: usize,
    pub numerosity: usize,
    /// Numerosity-weighted mean comparison value
    pub mean_fitness: f64,
    pub best_fitness: f64,
    pub worst_fitness: f64,
    pub mean_experience: f64,
}

impl PopulationStats {
    pub fn from_set(set: &ClassifierSet, mode: ComparisonMode) -> Self {
        if set.is_empty() {
            return Self {
                macroclassifiers: 0,
                numerosity: 0,
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                mean_experience: 0.0,
            };
        }

        let numerosity = set.total_numerosity() as f64;
        let mut weighted_fitness = 0.0;
        let mut weighted_experience = 0.0;
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;

        for slot in set {
            let value = slot.classifier.comparison_value(mode);
            let n = slot.numerosity() as f64;
            weighted_fitness += value * n;
            weighted_experience += slot.classifier.experience as f64 * n;
            best = best.max(value);
            worst = worst.min(value);
        }

        Self {
            macroclassifiers: set.number_of_macroclassifiers(),
            numerosity: set.total_numerosity(),
            mean_fitness: weighted_fitness / numerosity,
            best_fitness: best,
            worst_fitness: worst,
            mean_experience: weighted_experience / numerosity,
        }
    }
}
