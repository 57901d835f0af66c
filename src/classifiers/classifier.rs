use super::chromosome::Chromosome;
use crate::types::ComparisonMode;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Opaque per-strategy state attached to a classifier by its update algorithm
pub type UpdateData = Box<dyn Any + Send + Sync>;

/// One rule instance: a chromosome plus the bookkeeping the training loop maintains
///
/// Domain equality ("the same rule") is not defined here; it belongs to the
/// [`ClassifierRepresentation`](super::ClassifierRepresentation) in use.
pub struct Classifier {
    serial: u64,
    chromosome: Chromosome,
    pub experience: u64,
    pub timestamp: u64,
    pub coverage: f64,
    pub checked_instances: u64,
    comparison_values: BTreeMap<ComparisonMode, f64>,
    update_data: Option<UpdateData>,
}

impl Classifier {
    /// Fresh classifier with default bookkeeping and a new serial number
    pub fn new(chromosome: Chromosome) -> Self {
        Self {
            serial: NEXT_SERIAL.fetch_add(1, Ordering::Relaxed),
            chromosome,
            experience: 0,
            timestamp: 0,
            coverage: 0.0,
            checked_instances: 0,
            comparison_values: BTreeMap::new(),
            update_data: None,
        }
    }

    /// Identity of this individual; copies made by selection keep it
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn chromosome(&self) -> &Chromosome {
        &self.chromosome
    }

    pub fn chromosome_mut(&mut self) -> &mut Chromosome {
        &mut self.chromosome
    }

    /// Comparison value for the mode; 0.0 until something sets it
    pub fn comparison_value(&self, mode: ComparisonMode) -> f64 {
        self.comparison_values.get(&mode).copied().unwrap_or(0.0)
    }

    pub fn set_comparison_value(&mut self, mode: ComparisonMode, value: f64) {
        self.comparison_values.insert(mode, value);
    }

    pub fn comparison_values(&self) -> impl Iterator<Item = (ComparisonMode, f64)> + '_ {
        self.comparison_values.iter().map(|(mode, value)| (*mode, *value))
    }

    pub fn update_data(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.update_data.as_deref()
    }

    pub fn update_data_mut(&mut self) -> Option<&mut (dyn Any + Send + Sync)> {
        self.update_data.as_deref_mut()
    }

    pub fn set_update_data(&mut self, data: UpdateData) {
        self.update_data = Some(data);
    }

    pub fn take_update_data(&mut self) -> Option<UpdateData> {
        self.update_data.take()
    }
}

/// Deep copy of chromosome and bookkeeping; the update data is left for the
/// owning strategy to re-derive.
impl Clone for Classifier {
    fn clone(&self) -> Self {
        Self {
            serial: self.serial,
            chromosome: self.chromosome.clone(),
            experience: self.experience,
            timestamp: self.timestamp,
            coverage: self.coverage,
            checked_instances: self.checked_instances,
            comparison_values: self.comparison_values.clone(),
            update_data: None,
        }
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("serial", &self.serial)
            .field("chromosome", &self.chromosome.to_string())
            .field("experience", &self.experience)
            .field("timestamp", &self.timestamp)
            .field("coverage", &self.coverage)
            .field("checked_instances", &self.checked_instances)
            .field("comparison_values", &self.comparison_values)
            .field("has_update_data", &self.update_data.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let classifier = Classifier::new(Chromosome::zeros(8));
        assert_eq!(classifier.experience, 0);
        assert_eq!(classifier.timestamp, 0);
        assert_eq!(classifier.checked_instances, 0);
        assert_eq!(classifier.comparison_value(ComparisonMode::Exploitation), 0.0);
        assert!(classifier.update_data().is_none());
    }

    #[test]
    fn test_serials_are_unique() {
        let a = Classifier::new(Chromosome::zeros(2));
        let b = Classifier::new(Chromosome::zeros(2));
        assert_ne!(a.serial(), b.serial());
    }

    #[test]
    fn test_clone_deep_copies_bookkeeping_and_drops_update_data() {
        let mut original = Classifier::new("1010".parse().unwrap());
        original.experience = 7;
        original.coverage = 0.25;
        original.set_comparison_value(ComparisonMode::Exploration, 0.4);
        original.set_update_data(Box::new(42u32));

        let mut copy = original.clone();
        copy.chromosome_mut().invert(0).unwrap();
        copy.experience += 1;

        assert_eq!(copy.serial(), original.serial());
        assert_eq!(original.chromosome().to_string(), "1010");
        assert_eq!(original.experience, 7);
        assert_eq!(copy.comparison_value(ComparisonMode::Exploration), 0.4);
        assert!(copy.update_data().is_none());
        assert_eq!(
            original.update_data().and_then(|d| d.downcast_ref::<u32>()),
            Some(&42)
        );
    }
}
