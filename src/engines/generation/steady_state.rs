use crate::classifiers::{Classifier, ClassifierSet, Macroclassifier};
use crate::config::GeneticConfig;
use crate::engines::generation::operators::{
    BinaryGeneticOperator, SinglePointCrossover, UnaryGeneticOperator, UniformBitMutation,
};
use crate::engines::generation::selection::{NaturalSelector, SelectionCount};
use crate::error::{LcsError, Result};
use crate::types::ComparisonMode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// What a single `evolve_set` call did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EvolutionOutcome {
    /// Trigger set had no individuals; nothing happened
    EmptyTrigger,
    /// Trigger set was activated too recently
    BelowThreshold { age: f64 },
    /// Two offspring were inserted; serials of the children
    Reproduced { offspring: [u64; 2] },
}

/// Evolves a population given the niche that triggered the step
pub trait GeneticAlgorithmStrategy: Send {
    /// `trigger` holds slot indices of `population`
    fn evolve_set(&mut self, trigger: &[usize], population: &mut ClassifierSet) -> Result<EvolutionOutcome>;
}

/// Steady-state GA: two offspring per activation, gated by the niche's mean age
pub struct SteadyStateGeneticAlgorithm {
    selector: Box<dyn NaturalSelector>,
    crossover: Box<dyn BinaryGeneticOperator>,
    mutation: Box<dyn UnaryGeneticOperator>,
    crossover_rate: f64,
    theta_ga: f64,
    timestamp: u64,
    rng: StdRng,
}

impl SteadyStateGeneticAlgorithm {
    pub fn new(
        selector: Box<dyn NaturalSelector>,
        crossover: Box<dyn BinaryGeneticOperator>,
        mutation: Box<dyn UnaryGeneticOperator>,
        crossover_rate: f64,
        theta_ga: f64,
        rng: StdRng,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&crossover_rate) {
            return Err(LcsError::InvalidArgument(format!(
                "Crossover rate {} must be between 0 and 1",
                crossover_rate
            )));
        }
        Ok(Self {
            selector,
            crossover,
            mutation,
            crossover_rate,
            theta_ga,
            timestamp: 0,
            rng,
        })
    }

    /// Roulette/tournament/best parent selection, single-point crossover and
    /// uniform bit mutation as configured
    pub fn from_config(config: &GeneticConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(
            config.parent_selector(),
            Box::new(SinglePointCrossover),
            Box::new(UniformBitMutation::new(config.mutation_rate)?),
            config.crossover_rate,
            config.theta_ga,
            rng,
        )
    }

    /// Current generation counter
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Numerosity-weighted mean activation timestamp, `None` for an empty niche
    fn mean_timestamp(trigger: &[usize], population: &ClassifierSet) -> Result<Option<f64>> {
        let mut numerosity = 0usize;
        let mut weighted = 0.0;
        for &index in trigger {
            let slot = population.macroclassifier(index)?;
            numerosity += slot.numerosity();
            weighted += slot.classifier.timestamp as f64 * slot.numerosity() as f64;
        }
        if numerosity == 0 {
            return Ok(None);
        }
        Ok(Some(weighted / numerosity as f64))
    }

    fn breed(
        &mut self,
        child_index: usize,
        parents: [&Classifier; 2],
        distinct: bool,
        population: &ClassifierSet,
    ) -> Result<Classifier> {
        let representation = population.representation().as_ref();
        let [parent_a, parent_b] = parents;

        let mut child = if self.rng.gen_bool(self.crossover_rate) && distinct {
            // Swap parent order between the two children to avoid positional bias
            let (first, second) = if child_index == 0 {
                (parent_b, parent_a)
            } else {
                (parent_a, parent_b)
            };
            self.crossover.operate(first, second, representation, &mut self.rng)?
        } else {
            let parent = parents[child_index];
            let mut clone = representation.create_classifier(parent.chromosome().clone());
            clone.set_comparison_value(
                ComparisonMode::Exploration,
                parent.comparison_value(ComparisonMode::Exploration),
            );
            clone
        };

        self.mutation.operate(&mut child, &mut self.rng);
        representation.fix_chromosome(child.chromosome_mut());
        Ok(child)
    }
}

impl GeneticAlgorithmStrategy for SteadyStateGeneticAlgorithm {
    fn evolve_set(&mut self, trigger: &[usize], population: &mut ClassifierSet) -> Result<EvolutionOutcome> {
        self.timestamp += 1;

        let mean_timestamp = match Self::mean_timestamp(trigger, population)? {
            Some(mean) => mean,
            None => {
                log::debug!("GA step {} skipped: empty trigger set", self.timestamp);
                return Ok(EvolutionOutcome::EmptyTrigger);
            }
        };

        let age = self.timestamp as f64 - mean_timestamp;
        if age < self.theta_ga {
            return Ok(EvolutionOutcome::BelowThreshold { age });
        }

        for &index in trigger {
            population.classifier_mut(index)?.timestamp = self.timestamp;
        }

        let picks = self
            .selector
            .select_from_niche(SelectionCount::Count(2), trigger, population, &mut self.rng)?;
        let (a_index, b_index) = match picks.as_slice() {
            [a, b] => (*a, *b),
            _ => {
                return Err(LcsError::NotFound(
                    "Parent selector did not return two parents".to_string(),
                ))
            }
        };
        let parent_a = population.classifier(a_index)?.clone();
        let parent_b = population.classifier(b_index)?.clone();
        let distinct = a_index != b_index;

        let mut offspring = [0u64; 2];
        for (child_index, serial) in offspring.iter_mut().enumerate() {
            let child = self.breed(child_index, [&parent_a, &parent_b], distinct, population)?;
            *serial = child.serial();
            population.add_classifier(Macroclassifier::single(child), true)?;
        }

        log::debug!(
            "GA step {}: parents {} and {} produced {:?} (age {:.1})",
            self.timestamp,
            a_index,
            b_index,
            offspring,
            age
        );
        Ok(EvolutionOutcome::Reproduced { offspring })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{BitStringRepresentation, Chromosome};
    use crate::engines::generation::selection::RouletteWheelSelector;
    use crate::types::FitnessMetric;
    use std::sync::Arc;

    fn ga(crossover_rate: f64, mutation_rate: f64, theta_ga: f64) -> SteadyStateGeneticAlgorithm {
        SteadyStateGeneticAlgorithm::new(
            Box::new(RouletteWheelSelector::new(FitnessMetric::maximize(ComparisonMode::Exploration))),
            Box::new(SinglePointCrossover),
            Box::new(UniformBitMutation::new(mutation_rate).unwrap()),
            crossover_rate,
            theta_ga,
            StdRng::seed_from_u64(17),
        )
        .unwrap()
    }

    fn population(rules: &[&str], timestamp: u64) -> ClassifierSet {
        let mut set = ClassifierSet::new(Arc::new(BitStringRepresentation::new(6)));
        for bits in rules {
            let mut classifier = Classifier::new(bits.parse().unwrap());
            classifier.timestamp = timestamp;
            classifier.set_comparison_value(ComparisonMode::Exploration, 0.5);
            set.add_classifier(Macroclassifier::single(classifier), false).unwrap();
        }
        set
    }

    #[test]
    fn test_empty_trigger_is_noop() {
        let mut engine = ga(0.8, 0.0, 0.0);
        let mut set = population(&["000000"], 0);
        assert_eq!(engine.evolve_set(&[], &mut set).unwrap(), EvolutionOutcome::EmptyTrigger);
        assert_eq!(set.total_numerosity(), 1);
    }

    #[test]
    fn test_gate_blocks_young_niche() {
        let mut engine = ga(0.8, 0.0, 25.0);
        let mut set = population(&["000000", "111111"], 100);
        engine.set_timestamp(109);

        let outcome = engine.evolve_set(&[0, 1], &mut set).unwrap();
        assert!(matches!(outcome, EvolutionOutcome::BelowThreshold { age } if (age - 10.0).abs() < 1e-9));
        assert_eq!(set.total_numerosity(), 2);
        // Members are not stamped when the gate stays shut
        assert_eq!(set.classifier(0).unwrap().timestamp, 100);
    }

    #[test]
    fn test_open_gate_stamps_and_inserts_two() {
        let mut engine = ga(0.8, 0.0, 25.0);
        let mut set = population(&["000000", "111111"], 100);
        engine.set_timestamp(129);

        let outcome = engine.evolve_set(&[0, 1], &mut set).unwrap();
        assert!(matches!(outcome, EvolutionOutcome::Reproduced { .. }));
        assert_eq!(set.total_numerosity(), 4);
        assert_eq!(set.classifier(0).unwrap().timestamp, 130);
        assert_eq!(set.classifier(1).unwrap().timestamp, 130);
    }

    #[test]
    fn test_clone_offspring_copy_exploration() {
        // No crossover and no mutation: offspring are clones merged into their parent
        let mut engine = ga(0.0, 0.0, 0.0);
        let mut set = population(&["101010"], 0);

        engine.evolve_set(&[0], &mut set).unwrap();
        assert_eq!(set.number_of_macroclassifiers(), 1);
        assert_eq!(set.numerosity(0).unwrap(), 3);
    }

    #[test]
    fn test_single_parent_never_crosses() {
        // Same parent drawn twice: crossover is skipped even at rate 1.0,
        // so full mutation yields the inverted parent twice.
        let mut engine = ga(1.0, 1.0, 0.0);
        let mut set = population(&["110000"], 0);

        engine.evolve_set(&[0], &mut set).unwrap();
        assert_eq!(set.number_of_macroclassifiers(), 2);
        let child = set.classifier(1).unwrap();
        assert_eq!(child.chromosome(), &"001111".parse::<Chromosome>().unwrap());
        assert_eq!(set.numerosity(1).unwrap(), 2);
        assert_eq!(child.comparison_value(ComparisonMode::Exploration), 0.5);
    }

    #[test]
    fn test_invalid_trigger_index() {
        let mut engine = ga(0.8, 0.0, 0.0);
        let mut set = population(&["000000"], 0);
        assert!(engine.evolve_set(&[3], &mut set).is_err());
    }
}
