use super::message::{MessageMetadata, RuleMessage};
use super::router::{RuleInbound, RuleRouter};
use crate::classifiers::{ClassifierSet, SharedPopulation};
use crate::config::{ExchangeConfig, NumerosityPolicy};
use crate::engines::generation::{AllSelector, NaturalSelector, SelectionCount};
use crate::error::Result;
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Exchange policy of one peer: what leaves the population and what is let in
pub struct RuleDistributer {
    population: SharedPopulation,
    router: Arc<dyn RuleRouter>,
    send_selector: Box<dyn NaturalSelector>,
    send_count: SelectionCount,
    receive_selector: Box<dyn NaturalSelector>,
    receive_count: SelectionCount,
    numerosity_policy: NumerosityPolicy,
    rng: Mutex<StdRng>,
    rounds: AtomicU64,
}

impl RuleDistributer {
    /// Sends and accepts everything, retaining numerosity
    pub fn new(population: SharedPopulation, router: Arc<dyn RuleRouter>, rng: StdRng) -> Self {
        Self {
            population,
            router,
            send_selector: Box::new(AllSelector),
            send_count: SelectionCount::All,
            receive_selector: Box::new(AllSelector),
            receive_count: SelectionCount::All,
            numerosity_policy: NumerosityPolicy::Retain,
            rng: Mutex::new(rng),
            rounds: AtomicU64::new(0),
        }
    }

    pub fn from_config(
        population: SharedPopulation,
        router: Arc<dyn RuleRouter>,
        config: &ExchangeConfig,
        rng: StdRng,
    ) -> Self {
        Self::new(population, router, rng)
            .with_send_selector(config.send_filter.selector(), config.send_filter.count())
            .with_receive_selector(config.receive_filter.selector(), config.receive_filter.count())
            .with_numerosity_policy(config.numerosity_policy)
    }

    pub fn with_send_selector(mut self, selector: Box<dyn NaturalSelector>, count: SelectionCount) -> Self {
        self.send_selector = selector;
        self.send_count = count;
        self
    }

    pub fn with_receive_selector(mut self, selector: Box<dyn NaturalSelector>, count: SelectionCount) -> Self {
        self.receive_selector = selector;
        self.receive_count = count;
        self
    }

    pub fn with_numerosity_policy(mut self, policy: NumerosityPolicy) -> Self {
        self.numerosity_policy = policy;
        self
    }

    /// Register as the router's inbound end; the router only keeps a weak handle
    pub fn connect(self) -> Arc<Self> {
        let distributer = Arc::new(self);
        let inbound: Arc<dyn RuleInbound> = distributer.clone();
        distributer.router.set_inbound(Arc::downgrade(&inbound));
        distributer
    }

    pub fn population(&self) -> &SharedPopulation {
        &self.population
    }

    pub fn numerosity_policy(&self) -> NumerosityPolicy {
        self.numerosity_policy
    }

    /// Send rounds completed so far
    pub fn rounds(&self) -> u64 {
        self.rounds.load(Ordering::Relaxed)
    }

    fn lock_population(&self) -> MutexGuard<'_, ClassifierSet> {
        self.population.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Build the outgoing message from the current population, or `None` when
    /// nothing is selected
    pub fn prepare_message(&self) -> Result<Option<RuleMessage>> {
        let population = self.lock_population();
        if population.is_empty() {
            return Ok(None);
        }

        let slots = {
            let mut rng = self.lock_rng();
            self.send_selector
                .select_indices(self.send_count, &population, &mut *rng)?
        };
        if slots.is_empty() {
            return Ok(None);
        }

        let round = self.rounds.fetch_add(1, Ordering::Relaxed) + 1;
        let source = self.router.local_address().unwrap_or_default();
        let message = RuleMessage::from_slots(&population, &slots, MessageMetadata::new(source, round))?;
        Ok(Some(message))
    }

    /// Select from the local population and broadcast through the router.
    /// Returns the number of peers reached.
    pub fn send_rules(&self) -> Result<usize> {
        // The population lock is released before routing so peers sending
        // back to us in the same round cannot deadlock
        let message = match self.prepare_message()? {
            Some(message) => message,
            None => {
                log::debug!("Nothing selected for sending");
                return Ok(0);
            }
        };

        let delivered = self.router.send_rules(&message)?;
        log::info!(
            "Round {} from '{}': sent {} rules ({} individuals) to {} peers",
            message.metadata.round,
            message.metadata.source,
            message.len(),
            message.total_numerosity(),
            delivered
        );
        Ok(delivered)
    }

    /// Filter incoming rules through the receive selector and merge them into
    /// the local population. Returns the merged numerosity.
    pub fn receive_rules(&self, message: &RuleMessage) -> Result<usize> {
        let representation = Arc::clone(self.lock_population().representation());
        let incoming = message.to_classifier_set(representation, self.numerosity_policy)?;
        if incoming.is_empty() {
            return Ok(0);
        }

        let picks = {
            let mut rng = self.lock_rng();
            self.receive_selector
                .select_indices(self.receive_count, &incoming, &mut *rng)?
        };

        let mut accepted = incoming.empty_like();
        let mut seen = Vec::with_capacity(picks.len());
        for index in picks {
            if seen.contains(&index) {
                continue;
            }
            seen.push(index);
            accepted.add_classifier(incoming.macroclassifier(index)?.clone(), false)?;
        }

        let merged = accepted.total_numerosity();
        self.lock_population().merge(&accepted);
        log::debug!(
            "Accepted {} of {} rules from '{}' (round {})",
            accepted.number_of_macroclassifiers(),
            message.len(),
            message.metadata.source,
            message.metadata.round
        );
        Ok(merged)
    }
}

impl RuleInbound for RuleDistributer {
    fn accept_rules(&self, message: &RuleMessage) -> Result<usize> {
        self.receive_rules(message)
    }
}
