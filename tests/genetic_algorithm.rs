use lcsevo::classifiers::{
    BitStringRepresentation, Classifier, ClassifierRepresentation, ClassifierSet, Macroclassifier,
};
use lcsevo::config::{GeneticConfig, SelectionMethod};
use lcsevo::engines::generation::{
    BestClassifierSelector, BinaryGeneticOperator, EvolutionOutcome, GeneticAlgorithmStrategy,
    SinglePointCrossover, SteadyStateGeneticAlgorithm, UnaryGeneticOperator, UniformBitMutation,
};
use lcsevo::{Chromosome, ComparisonMode, FitnessMetric};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

fn niche_at(generation: u64) -> ClassifierSet {
    let mut set = ClassifierSet::new(Arc::new(BitStringRepresentation::new(8)));
    for bits in ["00001111", "11110000", "10101010"] {
        let mut classifier = Classifier::new(bits.parse().unwrap());
        classifier.timestamp = generation;
        classifier.set_comparison_value(ComparisonMode::Exploration, 1.0);
        classifier.set_comparison_value(ComparisonMode::Exploitation, 0.5);
        set.add_classifier(Macroclassifier::new(classifier, 2), false).unwrap();
    }
    set
}

fn engine(selection_method: SelectionMethod) -> SteadyStateGeneticAlgorithm {
    let config = GeneticConfig {
        theta_ga: 25.0,
        selection_method,
        seed: Some(99),
        ..GeneticConfig::default()
    };
    SteadyStateGeneticAlgorithm::from_config(&config).unwrap()
}

#[test]
fn test_age_gate_closed_then_open() {
    let generation = 40;
    for method in [SelectionMethod::Roulette, SelectionMethod::Tournament, SelectionMethod::Best] {
        let mut ga = engine(method);
        let mut population = niche_at(generation);
        let trigger: Vec<usize> = (0..population.number_of_macroclassifiers()).collect();

        // Counter reaches g + 10 on this call
        ga.set_timestamp(generation + 9);
        let outcome = ga.evolve_set(&trigger, &mut population).unwrap();
        assert!(matches!(outcome, EvolutionOutcome::BelowThreshold { .. }));
        assert_eq!(population.total_numerosity(), 6);

        // Counter reaches g + 30
        ga.set_timestamp(generation + 29);
        let outcome = ga.evolve_set(&trigger, &mut population).unwrap();
        assert!(matches!(outcome, EvolutionOutcome::Reproduced { .. }), "{:?}", method);
        assert_eq!(population.total_numerosity(), 8);
        for &index in &trigger {
            assert_eq!(population.classifier(index).unwrap().timestamp, generation + 30);
        }
    }
}

/// Single-point crossover pinned to the middle of the chromosome
#[derive(Debug)]
struct MidpointCrossover;

impl BinaryGeneticOperator for MidpointCrossover {
    fn operate(
        &self,
        parent_a: &Classifier,
        parent_b: &Classifier,
        representation: &dyn ClassifierRepresentation,
        _rng: &mut dyn RngCore,
    ) -> lcsevo::Result<Classifier> {
        let locus = parent_a.chromosome().size() / 2;
        SinglePointCrossover.cross_at(parent_a, parent_b, locus, representation)
    }
}

#[test]
fn test_open_gate_inserts_two_new_macroclassifiers() {
    let mut population = ClassifierSet::new(Arc::new(BitStringRepresentation::new(8)));
    for (bits, exploration) in [("00000000", 0.9), ("11111111", 0.4)] {
        let mut classifier = Classifier::new(bits.parse().unwrap());
        classifier.set_comparison_value(ComparisonMode::Exploration, exploration);
        population.add_classifier(Macroclassifier::single(classifier), false).unwrap();
    }

    let mut ga = SteadyStateGeneticAlgorithm::new(
        Box::new(BestClassifierSelector::new(FitnessMetric::maximize(ComparisonMode::Exploration))),
        Box::new(MidpointCrossover),
        Box::new(UniformBitMutation::new(0.0).unwrap()),
        1.0,
        25.0,
        StdRng::seed_from_u64(3),
    )
    .unwrap();
    ga.set_timestamp(29);

    let before = population.number_of_macroclassifiers();
    let outcome = ga.evolve_set(&[0, 1], &mut population).unwrap();

    assert!(matches!(outcome, EvolutionOutcome::Reproduced { .. }));
    assert_eq!(population.number_of_macroclassifiers(), before + 2);
    assert_eq!(population.total_numerosity(), 4);
    let mut children: Vec<String> = (before..population.number_of_macroclassifiers())
        .map(|index| population.classifier(index).unwrap().chromosome().to_string())
        .collect();
    children.sort();
    assert_eq!(children, vec!["00001111".to_string(), "11110000".to_string()]);
}

#[test]
fn test_empty_trigger_leaves_population_alone() {
    let mut ga = engine(SelectionMethod::Roulette);
    let mut population = niche_at(0);
    assert_eq!(ga.evolve_set(&[], &mut population).unwrap(), EvolutionOutcome::EmptyTrigger);
    assert_eq!(population.total_numerosity(), 6);
    // The generation still advances
    assert_eq!(ga.timestamp(), 1);
}

#[test]
fn test_offspring_have_fresh_bookkeeping() {
    let mut ga = engine(SelectionMethod::Roulette);
    let mut population = niche_at(0);
    let trigger: Vec<usize> = (0..3).collect();
    ga.set_timestamp(100);

    if let EvolutionOutcome::Reproduced { offspring } = ga.evolve_set(&trigger, &mut population).unwrap() {
        for serial in offspring {
            // Children may have been folded into an existing slot
            if let Some(slot) = population.iter().find(|slot| slot.classifier.serial() == serial) {
                assert_eq!(slot.classifier.experience, 0);
                assert_eq!(slot.classifier.checked_instances, 0);
            }
        }
    } else {
        panic!("gate should be open");
    }
}

#[test]
fn test_mutation_flip_statistics() {
    let mut rng = StdRng::seed_from_u64(2024);
    for rate in [0.01, 0.25, 0.5] {
        let mutation = UniformBitMutation::new(rate).unwrap();
        let mut flips = 0usize;
        for _ in 0..1000 {
            let mut classifier = Classifier::new(Chromosome::zeros(1000));
            flips += mutation.operate(&mut classifier, &mut rng);
        }
        let observed = flips as f64 / 1_000_000.0;
        assert!((observed - rate).abs() < 0.02, "rate {} observed {}", rate, observed);
    }
}
