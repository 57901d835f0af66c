use crate::classifiers::{Chromosome, Classifier, ClassifierSet, Macroclassifier};
use crate::error::Result;
use crate::types::ComparisonMode;
use rand::Rng;

/// Matched-instance tally kept in a classifier's update data
#[derive(Debug, Clone, Copy, Default)]
struct MatchTally {
    matched: u64,
}

/// Toy learning problem: rules should converge on a hidden bit pattern
///
/// A rule joins an instance's niche when it lies within `match_radius` bits of
/// the instance. Fitness is the rule's similarity to the target, so the GA
/// pulls the population toward it while covering keeps niches populated.
#[derive(Debug, Clone)]
pub struct TargetTask {
    target: Chromosome,
    match_radius: usize,
}

impl TargetTask {
    pub fn new(target: Chromosome, match_radius: usize) -> Self {
        Self { target, match_radius }
    }

    pub fn random<R: Rng + ?Sized>(size: usize, match_radius: usize, rng: &mut R) -> Self {
        Self::new(Chromosome::random(size, rng), match_radius)
    }

    pub fn target(&self) -> &Chromosome {
        &self.target
    }

    pub fn match_radius(&self) -> usize {
        self.match_radius
    }

    /// Fraction of bits shared with the target
    pub fn similarity(&self, chromosome: &Chromosome) -> f64 {
        let size = self.target.size();
        if size == 0 {
            return 1.0;
        }
        1.0 - self.target.hamming_distance(chromosome) as f64 / size as f64
    }

    pub fn matches(&self, classifier: &Classifier, instance: &Chromosome) -> bool {
        classifier.chromosome().hamming_distance(instance) <= self.match_radius
    }

    /// Training instances are target bits with each bit flipped with probability `noise`
    pub fn sample_instance<R: Rng + ?Sized>(&self, noise: f64, rng: &mut R) -> Chromosome {
        let bits = self
            .target
            .bits()
            .iter()
            .map(|&bit| if rng.gen_bool(noise) { !bit } else { bit })
            .collect();
        Chromosome::from_bits(bits)
    }

    fn assess(&self, classifier: &mut Classifier) {
        let similarity = self.similarity(classifier.chromosome());
        classifier.set_comparison_value(ComparisonMode::Exploitation, similarity);
        classifier.set_comparison_value(ComparisonMode::Exploration, similarity);
        classifier.set_comparison_value(ComparisonMode::PureFitness, similarity);
        classifier.set_comparison_value(ComparisonMode::Deletion, 1.0 - similarity);
    }

    /// Rule created from an instance nobody matched
    pub fn cover(&self, instance: &Chromosome, population: &ClassifierSet, timestamp: u64) -> Classifier {
        let mut classifier = population.representation().create_classifier(instance.clone());
        classifier.timestamp = timestamp;
        self.assess(&mut classifier);
        classifier
    }

    /// Present one instance to the whole population and return its niche.
    ///
    /// Every rule is checked; matching rules gain experience. Coverage is the
    /// fraction of checked instances a rule matched. An empty niche is filled
    /// by covering, stamped with `timestamp`.
    pub fn present(&self, instance: &Chromosome, population: &mut ClassifierSet, timestamp: u64) -> Result<Vec<usize>> {
        population.for_each_classifier_mut(|classifier| {
            let mut tally = match classifier
                .update_data()
                .and_then(|data| data.downcast_ref::<MatchTally>())
            {
                Some(tally) => *tally,
                // Clones arrive without update data; rebuild the tally from coverage
                None => MatchTally {
                    matched: (classifier.coverage * classifier.checked_instances as f64).round() as u64,
                },
            };

            classifier.checked_instances += 1;
            if self.matches(classifier, instance) {
                tally.matched += 1;
                classifier.experience += 1;
            }
            classifier.coverage = tally.matched as f64 / classifier.checked_instances as f64;
            classifier.set_update_data(Box::new(tally));
            self.assess(classifier);
        });

        let niche = population.niche(|classifier| self.matches(classifier, instance));
        if !niche.is_empty() {
            return Ok(niche);
        }

        let covering = self.cover(instance, population, timestamp);
        population.add_classifier(Macroclassifier::single(covering), true)?;
        Ok(population.niche(|classifier| self.matches(classifier, instance)))
    }
}
