use super::chromosome::Chromosome;
use super::macroclassifier::Macroclassifier;
use super::representation::ClassifierRepresentation;
use super::set::ClassifierSet;
use crate::error::Result;
use crate::types::ComparisonMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Serializable form of one macroclassifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRecord {
    pub chromosome: Chromosome,
    pub numerosity: usize,
    pub experience: u64,
    pub timestamp: u64,
    pub coverage: f64,
    pub checked_instances: u64,
    pub comparison_values: Vec<(ComparisonMode, f64)>,
}

/// Point-in-time copy of a population that can be written to disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub saved_at: DateTime<Utc>,
    pub label: String,
    pub records: Vec<ClassifierRecord>,
}

impl PopulationSnapshot {
    pub fn capture(set: &ClassifierSet, label: impl Into<String>) -> Self {
        let records = set
            .iter()
            .map(|slot| {
                let classifier = &slot.classifier;
                ClassifierRecord {
                    chromosome: classifier.chromosome().clone(),
                    numerosity: slot.numerosity(),
                    experience: classifier.experience,
                    timestamp: classifier.timestamp,
                    coverage: classifier.coverage,
                    checked_instances: classifier.checked_instances,
                    comparison_values: classifier.comparison_values().collect(),
                }
            })
            .collect();

        Self {
            saved_at: Utc::now(),
            label: label.into(),
            records,
        }
    }

    /// Rebuild a population; classifiers are re-created through the factory so
    /// representation state is re-derived.
    pub fn restore(&self, representation: Arc<dyn ClassifierRepresentation>) -> Result<ClassifierSet> {
        let mut set = ClassifierSet::new(Arc::clone(&representation));
        for record in &self.records {
            let mut classifier = representation.create_classifier(record.chromosome.clone());
            classifier.experience = record.experience;
            classifier.timestamp = record.timestamp;
            classifier.coverage = record.coverage;
            classifier.checked_instances = record.checked_instances;
            for (mode, value) in &record.comparison_values {
                classifier.set_comparison_value(*mode, *value);
            }
            set.add_classifier(Macroclassifier::new(classifier, record.numerosity), false)?;
        }
        Ok(set)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
