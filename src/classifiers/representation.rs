use super::chromosome::Chromosome;
use super::classifier::Classifier;
use std::fmt::Debug;

/// Representation-specific collaborators the population engine relies on
///
/// The core never interprets chromosome bits itself. Everything that depends on
/// what the bits mean (domain equality, legality repair, initial state of a new
/// rule) is delegated to an implementation of this trait.
pub trait ClassifierRepresentation: Send + Sync + Debug {
    /// Length of every chromosome produced by this representation
    fn chromosome_size(&self) -> usize;

    /// Domain equality: do both classifiers encode the same rule?
    fn is_equal(&self, a: &Classifier, b: &Classifier) -> bool;

    /// Restore representation-specific legality after reproduction
    fn fix_chromosome(&self, chromosome: &mut Chromosome);

    /// Build a fully initialized classifier around a chromosome
    fn create_classifier(&self, chromosome: Chromosome) -> Classifier {
        Classifier::new(chromosome)
    }
}

/// Plain bit strings: every chromosome is legal and equality is bit equality
#[derive(Debug, Clone, Copy)]
pub struct BitStringRepresentation {
    size: usize,
}

impl BitStringRepresentation {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl ClassifierRepresentation for BitStringRepresentation {
    fn chromosome_size(&self) -> usize {
        self.size
    }

    fn is_equal(&self, a: &Classifier, b: &Classifier) -> bool {
        a.chromosome() == b.chromosome()
    }

    fn fix_chromosome(&self, _chromosome: &mut Chromosome) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_string_equality_ignores_bookkeeping() {
        let representation = BitStringRepresentation::new(4);
        let a = representation.create_classifier("0110".parse().unwrap());
        let mut b = representation.create_classifier("0110".parse().unwrap());
        b.experience = 12;
        let c = representation.create_classifier("0111".parse().unwrap());

        assert!(representation.is_equal(&a, &b));
        assert!(!representation.is_equal(&a, &c));
    }
}
