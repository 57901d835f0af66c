use crate::classifiers::{Chromosome, ClassifierRepresentation, ClassifierSet, Macroclassifier};
use crate::config::NumerosityPolicy;
use crate::error::Result;
use crate::types::ComparisonMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One rule in transit: its bits, how many copies the sender held, and the
/// sender's fitness view of it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigratingRule {
    pub chromosome: Chromosome,
    pub numerosity: usize,
    pub comparison_values: Vec<(ComparisonMode, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Address of the sending router, empty when it has none
    pub source: String,
    /// Send round of the sending distributer
    pub round: u64,
    pub sent_at: DateTime<Utc>,
}

impl MessageMetadata {
    pub fn new(source: impl Into<String>, round: u64) -> Self {
        Self {
            source: source.into(),
            round,
            sent_at: Utc::now(),
        }
    }
}

/// Ordered batch of rules broadcast from one peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMessage {
    pub rules: Vec<MigratingRule>,
    pub metadata: MessageMetadata,
}

impl RuleMessage {
    pub fn new(rules: Vec<MigratingRule>, metadata: MessageMetadata) -> Self {
        Self { rules, metadata }
    }

    /// Package the given slots of `set`; a slot listed twice is sent once
    pub fn from_slots(set: &ClassifierSet, slots: &[usize], metadata: MessageMetadata) -> Result<Self> {
        let mut seen = Vec::with_capacity(slots.len());
        let mut rules = Vec::with_capacity(slots.len());
        for &index in slots {
            if seen.contains(&index) {
                continue;
            }
            seen.push(index);

            let slot = set.macroclassifier(index)?;
            rules.push(MigratingRule {
                chromosome: slot.classifier.chromosome().clone(),
                numerosity: slot.numerosity(),
                comparison_values: slot.classifier.comparison_values().collect(),
            });
        }
        Ok(Self { rules, metadata })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn total_numerosity(&self) -> usize {
        self.rules.iter().map(|rule| rule.numerosity).sum()
    }

    /// Materialise the rules as a fresh set, one slot per rule, built through
    /// the receiver's classifier factory
    pub fn to_classifier_set(
        &self,
        representation: Arc<dyn ClassifierRepresentation>,
        policy: NumerosityPolicy,
    ) -> Result<ClassifierSet> {
        let mut set = ClassifierSet::new(Arc::clone(&representation));
        for rule in &self.rules {
            let mut classifier = representation.create_classifier(rule.chromosome.clone());
            for (mode, value) in &rule.comparison_values {
                classifier.set_comparison_value(*mode, *value);
            }
            let numerosity = match policy {
                NumerosityPolicy::Retain => rule.numerosity,
                NumerosityPolicy::Normalize => 1,
            };
            set.add_classifier(Macroclassifier::new(classifier, numerosity), false)?;
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{BitStringRepresentation, Classifier};

    fn population() -> ClassifierSet {
        let mut set = ClassifierSet::new(Arc::new(BitStringRepresentation::new(4)));
        let mut rule = Classifier::new("1100".parse().unwrap());
        rule.set_comparison_value(ComparisonMode::Exploitation, 0.7);
        set.add_classifier(Macroclassifier::new(rule, 3), false).unwrap();
        set.add_classifier(Macroclassifier::single(Classifier::new("0011".parse().unwrap())), false)
            .unwrap();
        set
    }

    #[test]
    fn test_from_slots_skips_repeats() {
        let set = population();
        let message = RuleMessage::from_slots(&set, &[0, 0, 1], MessageMetadata::new("A", 1)).unwrap();
        assert_eq!(message.len(), 2);
        assert_eq!(message.total_numerosity(), 4);
        assert_eq!(message.rules[0].chromosome.to_string(), "1100");
    }

    #[test]
    fn test_numerosity_policy_on_arrival() {
        let set = population();
        let message = RuleMessage::from_slots(&set, &[0, 1], MessageMetadata::new("A", 1)).unwrap();
        let representation = Arc::clone(set.representation());

        let retained = message
            .to_classifier_set(Arc::clone(&representation), NumerosityPolicy::Retain)
            .unwrap();
        assert_eq!(retained.total_numerosity(), 4);
        assert_eq!(
            retained.classifier(0).unwrap().comparison_value(ComparisonMode::Exploitation),
            0.7
        );

        let normalized = message
            .to_classifier_set(representation, NumerosityPolicy::Normalize)
            .unwrap();
        assert_eq!(normalized.total_numerosity(), 2);
    }

    #[test]
    fn test_json_wire_form() {
        let set = population();
        let message = RuleMessage::from_slots(&set, &[1], MessageMetadata::new("B", 7)).unwrap();
        let decoded = RuleMessage::from_json(&message.to_json().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }
}
