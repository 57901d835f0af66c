use crate::classifiers::{ClassifierSet, Macroclassifier};
use crate::error::{LcsError, Result};
use crate::types::{ComparisonMode, FitnessMetric};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// How many individuals a selector should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionCount {
    /// Apply the selector's own filter to every candidate
    All,
    /// Draw this many individuals, with replacement
    Count(usize),
}

/// Stochastic selection policy over a set of macroclassifiers
///
/// Selectors never own or alias population slots: they hand back slot indices
/// that are only meaningful against the set they were drawn from, or copy the
/// drawn classifiers into a caller-owned set.
pub trait NaturalSelector: Send + Sync + Debug {
    /// Draw positions into `candidates`
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>>;

    /// Draw slot indices of `from`
    fn select_indices(&self, count: SelectionCount, from: &ClassifierSet, rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        let candidates: Vec<&Macroclassifier> = from.iter().collect();
        self.select_from(count, &candidates, rng)
    }

    /// Draw from a niche given as slot indices of `population`; returns
    /// population slot indices.
    fn select_from_niche(
        &self,
        count: SelectionCount,
        niche: &[usize],
        population: &ClassifierSet,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        let candidates = niche
            .iter()
            .map(|&index| population.macroclassifier(index))
            .collect::<Result<Vec<_>>>()?;
        let picks = self.select_from(count, &candidates, rng)?;
        Ok(picks.into_iter().map(|position| niche[position]).collect())
    }

    /// Append every draw to `into` as an independent macroclassifier of numerosity 1
    fn select(
        &self,
        count: SelectionCount,
        from: &ClassifierSet,
        into: &mut ClassifierSet,
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        for index in self.select_indices(count, from, rng)? {
            let copy = from.classifier(index)?.clone();
            into.add_classifier(Macroclassifier::single(copy), false)?;
        }
        Ok(())
    }
}

fn ensure_candidates(count: SelectionCount, available: usize, selector: &str) -> Result<()> {
    match count {
        SelectionCount::Count(n) if n > 0 && available == 0 => Err(LcsError::NotFound(format!(
            "{} cannot draw {} individuals from an empty pool",
            selector, n
        ))),
        _ => Ok(()),
    }
}

/// Uniform draw over individuals (slots weighted by numerosity)
fn draw_by_numerosity(candidates: &[&Macroclassifier], rng: &mut dyn RngCore) -> usize {
    let total: usize = candidates.iter().map(|m| m.numerosity()).sum();
    if total == 0 {
        return rng.gen_range(0..candidates.len());
    }
    let mut ticket = rng.gen_range(0..total);
    for (position, candidate) in candidates.iter().enumerate() {
        if ticket < candidate.numerosity() {
            return position;
        }
        ticket -= candidate.numerosity();
    }
    candidates.len() - 1
}

/// Roulette wheel selection: probability proportional to metric weight
#[derive(Debug, Clone, Copy)]
pub struct RouletteWheelSelector {
    pub metric: FitnessMetric,
}

impl RouletteWheelSelector {
    pub fn new(metric: FitnessMetric) -> Self {
        Self { metric }
    }

    fn spin(&self, weights: &[f64], total: f64, rng: &mut dyn RngCore) -> usize {
        let mut spin = rng.gen::<f64>() * total;
        let mut last_positive = 0;
        for (position, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if spin < *weight {
                return position;
            }
            spin -= weight;
            last_positive = position;
        }
        // Floating point leftovers land on the last live slot
        last_positive
    }
}

impl NaturalSelector for RouletteWheelSelector {
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        ensure_candidates(count, candidates.len(), "Roulette selector")?;
        let n = match count {
            SelectionCount::All => return Ok((0..candidates.len()).collect()),
            SelectionCount::Count(n) => n,
        };

        let weights: Vec<f64> = candidates.iter().map(|m| self.metric.weight(m)).collect();
        let total: f64 = weights.iter().sum();

        let degenerate = !(total > 0.0 && total.is_finite());
        if degenerate {
            log::debug!("Roulette weights degenerate (total {}), falling back to uniform", total);
        }

        Ok((0..n)
            .map(|_| {
                if degenerate {
                    draw_by_numerosity(candidates, rng)
                } else {
                    self.spin(&weights, total, rng)
                }
            })
            .collect())
    }
}

/// Number of participants in each tournament
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TournamentSize {
    Fixed(usize),
    /// Fraction of the candidate pool, at least one participant
    Fraction(f64),
}

impl TournamentSize {
    fn participants(&self, pool: usize) -> usize {
        let size = match *self {
            TournamentSize::Fixed(k) => k,
            TournamentSize::Fraction(fraction) => (fraction * pool as f64).ceil() as usize,
        };
        size.max(1)
    }
}

/// Tournament selection: pick best of K random candidates
#[derive(Debug, Clone, Copy)]
pub struct TournamentSelector {
    pub metric: FitnessMetric,
    pub size: TournamentSize,
}

impl TournamentSelector {
    pub fn new(metric: FitnessMetric, size: TournamentSize) -> Self {
        Self { metric, size }
    }

    fn tournament(&self, candidates: &[&Macroclassifier], rng: &mut dyn RngCore) -> usize {
        let participants = self.size.participants(candidates.len());
        let mut best_idx = draw_by_numerosity(candidates, rng);
        let mut best_score = self.metric.score(candidates[best_idx]);

        for _ in 1..participants {
            let idx = draw_by_numerosity(candidates, rng);
            let score = self.metric.score(candidates[idx]);
            if score > best_score {
                best_idx = idx;
                best_score = score;
            }
        }

        best_idx
    }
}

impl NaturalSelector for TournamentSelector {
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        ensure_candidates(count, candidates.len(), "Tournament selector")?;
        match count {
            SelectionCount::All => Ok((0..candidates.len()).collect()),
            SelectionCount::Count(n) => Ok((0..n).map(|_| self.tournament(candidates, rng)).collect()),
        }
    }
}

/// Deterministic selection of the best individuals under a metric
///
/// With `All`, every candidate is returned ordered best first. When more draws
/// are requested than there are candidates the ranking is cycled.
#[derive(Debug, Clone, Copy)]
pub struct BestClassifierSelector {
    pub metric: FitnessMetric,
}

impl BestClassifierSelector {
    pub fn new(metric: FitnessMetric) -> Self {
        Self { metric }
    }

    fn ranking(&self, candidates: &[&Macroclassifier]) -> Vec<usize> {
        let mut ranked: Vec<usize> = (0..candidates.len()).collect();
        ranked.sort_by(|a, b| {
            self.metric
                .score(candidates[*b])
                .partial_cmp(&self.metric.score(candidates[*a]))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

impl NaturalSelector for BestClassifierSelector {
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        _rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        ensure_candidates(count, candidates.len(), "Best selector")?;
        let ranked = self.ranking(candidates);
        match count {
            SelectionCount::All => Ok(ranked),
            SelectionCount::Count(n) => Ok(ranked.iter().copied().cycle().take(n).collect()),
        }
    }
}

/// Selects individuals whose comparison value reaches a threshold
#[derive(Debug, Clone, Copy)]
pub struct ThresholdSelector {
    pub mode: ComparisonMode,
    pub min_value: f64,
}

impl ThresholdSelector {
    pub fn new(mode: ComparisonMode, min_value: f64) -> Self {
        Self { mode, min_value }
    }
}

impl NaturalSelector for ThresholdSelector {
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        let eligible: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, m)| m.classifier.comparison_value(self.mode) >= self.min_value)
            .map(|(i, _)| i)
            .collect();

        ensure_candidates(count, eligible.len(), "Threshold selector")?;
        match count {
            SelectionCount::All => Ok(eligible),
            SelectionCount::Count(n) => Ok((0..n)
                .map(|_| eligible[rng.gen_range(0..eligible.len())])
                .collect()),
        }
    }
}

/// Pass-through selector; `All` copies everything, `Count(n)` draws uniformly
#[derive(Debug, Clone, Copy, Default)]
pub struct AllSelector;

impl NaturalSelector for AllSelector {
    fn select_from(
        &self,
        count: SelectionCount,
        candidates: &[&Macroclassifier],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<usize>> {
        ensure_candidates(count, candidates.len(), "All selector")?;
        match count {
            SelectionCount::All => Ok((0..candidates.len()).collect()),
            SelectionCount::Count(n) => Ok((0..n).map(|_| draw_by_numerosity(candidates, rng)).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::{BitStringRepresentation, Classifier};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn population(values: &[f64]) -> ClassifierSet {
        let mut set = ClassifierSet::new(Arc::new(BitStringRepresentation::new(8)));
        for (i, value) in values.iter().enumerate() {
            let bits = format!("{:08b}", i);
            let mut classifier = Classifier::new(bits.parse().unwrap());
            classifier.set_comparison_value(ComparisonMode::Exploitation, *value);
            set.add_classifier(Macroclassifier::single(classifier), false).unwrap();
        }
        set
    }

    fn counts(picks: &[usize], len: usize) -> Vec<usize> {
        let mut counts = vec![0; len];
        for pick in picks {
            counts[*pick] += 1;
        }
        counts
    }

    #[test]
    fn test_roulette_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = population(&[0.1, 0.5, 0.9, 0.2]);
        let selector = RouletteWheelSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));

        let picks = selector
            .select_indices(SelectionCount::Count(2000), &set, &mut rng)
            .unwrap();
        let counts = counts(&picks, 4);
        let max_idx = counts.iter().enumerate().max_by_key(|(_, c)| **c).unwrap().0;
        assert_eq!(max_idx, 2);
    }

    #[test]
    fn test_roulette_minimize_prefers_weaker() {
        let mut rng = StdRng::seed_from_u64(7);
        let set = population(&[0.1, 0.9]);
        let selector = RouletteWheelSelector::new(FitnessMetric::minimize(ComparisonMode::Exploitation));

        let picks = selector
            .select_indices(SelectionCount::Count(1000), &set, &mut rng)
            .unwrap();
        let counts = counts(&picks, 2);
        assert!(counts[0] > counts[1]);
    }

    #[test]
    fn test_roulette_never_picks_zero_weight_when_others_live() {
        let mut rng = StdRng::seed_from_u64(3);
        let set = population(&[0.0, 1.0, 0.0]);
        let selector = RouletteWheelSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));

        let picks = selector
            .select_indices(SelectionCount::Count(200), &set, &mut rng)
            .unwrap();
        assert!(picks.iter().all(|p| *p == 1));
    }

    #[test]
    fn test_roulette_degenerate_falls_back_to_uniform() {
        let mut rng = StdRng::seed_from_u64(11);
        let set = population(&[0.0, 0.0, 0.0]);
        let selector = RouletteWheelSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));

        let picks = selector
            .select_indices(SelectionCount::Count(300), &set, &mut rng)
            .unwrap();
        assert_eq!(picks.len(), 300);
        assert!(counts(&picks, 3).iter().all(|c| *c > 50));
    }

    #[test]
    fn test_empty_pool_is_not_found() {
        let mut rng = StdRng::seed_from_u64(1);
        let set = population(&[]);
        let selector = RouletteWheelSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));

        assert!(matches!(
            selector.select_indices(SelectionCount::Count(1), &set, &mut rng),
            Err(LcsError::NotFound(_))
        ));
        assert!(selector
            .select_indices(SelectionCount::All, &set, &mut rng)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_tournament_prefers_fitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let set = population(&[0.1, 0.5, 0.9, 0.2, 0.8]);
        let selector = TournamentSelector::new(
            FitnessMetric::maximize(ComparisonMode::Exploitation),
            TournamentSize::Fixed(3),
        );

        let picks = selector
            .select_indices(SelectionCount::Count(1000), &set, &mut rng)
            .unwrap();
        let counts = counts(&picks, 5);
        let max_idx = counts.iter().enumerate().max_by_key(|(_, c)| **c).unwrap().0;
        assert_eq!(max_idx, 2);
    }

    #[test]
    fn test_tournament_fraction_of_pool() {
        assert_eq!(TournamentSize::Fraction(0.4).participants(10), 4);
        assert_eq!(TournamentSize::Fraction(0.0).participants(10), 1);
        assert_eq!(TournamentSize::Fixed(0).participants(10), 1);
    }

    #[test]
    fn test_best_selector_ranks() {
        let mut rng = StdRng::seed_from_u64(0);
        let set = population(&[0.3, 0.9, 0.1]);
        let best = BestClassifierSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));
        let worst = BestClassifierSelector::new(FitnessMetric::minimize(ComparisonMode::Exploitation));

        assert_eq!(best.select_indices(SelectionCount::All, &set, &mut rng).unwrap(), vec![1, 0, 2]);
        assert_eq!(worst.select_indices(SelectionCount::Count(1), &set, &mut rng).unwrap(), vec![2]);
        assert_eq!(
            best.select_indices(SelectionCount::Count(4), &set, &mut rng).unwrap(),
            vec![1, 0, 2, 1]
        );
    }

    #[test]
    fn test_threshold_selector_filters() {
        let mut rng = StdRng::seed_from_u64(5);
        let set = population(&[0.2, 0.7, 0.95]);
        let selector = ThresholdSelector::new(ComparisonMode::Exploitation, 0.5);

        assert_eq!(selector.select_indices(SelectionCount::All, &set, &mut rng).unwrap(), vec![1, 2]);
        let picks = selector
            .select_indices(SelectionCount::Count(50), &set, &mut rng)
            .unwrap();
        assert!(picks.iter().all(|p| *p >= 1));

        let strict = ThresholdSelector::new(ComparisonMode::Exploitation, 2.0);
        assert!(strict.select_indices(SelectionCount::Count(1), &set, &mut rng).is_err());
    }

    #[test]
    fn test_select_into_copies_with_numerosity_one() {
        let mut rng = StdRng::seed_from_u64(9);
        let set = population(&[0.5, 0.5]);
        let mut into = set.empty_like();

        AllSelector.select(SelectionCount::All, &set, &mut into, &mut rng).unwrap();
        AllSelector.select(SelectionCount::Count(3), &set, &mut into, &mut rng).unwrap();

        assert_eq!(into.number_of_macroclassifiers(), 5);
        assert!(into.iter().all(|m| m.numerosity() == 1));
        // Source population is untouched
        assert_eq!(set.total_numerosity(), 2);
    }

    #[test]
    fn test_select_from_niche_maps_back_to_population() {
        let mut rng = StdRng::seed_from_u64(21);
        let set = population(&[0.1, 0.2, 0.3, 0.4]);
        let selector = BestClassifierSelector::new(FitnessMetric::maximize(ComparisonMode::Exploitation));

        let picks = selector
            .select_from_niche(SelectionCount::Count(1), &[0, 2], &set, &mut rng)
            .unwrap();
        assert_eq!(picks, vec![2]);
        assert!(selector
            .select_from_niche(SelectionCount::Count(1), &[9], &set, &mut rng)
            .is_err());
    }
}
