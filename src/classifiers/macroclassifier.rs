use super::classifier::Classifier;

/// `numerosity` logically identical individuals compressed into one record
#[derive(Debug, Clone)]
pub struct Macroclassifier {
    pub classifier: Classifier,
    numerosity: usize,
}

impl Macroclassifier {
    pub fn new(classifier: Classifier, numerosity: usize) -> Self {
        Self { classifier, numerosity }
    }

    pub fn single(classifier: Classifier) -> Self {
        Self::new(classifier, 1)
    }

    pub fn numerosity(&self) -> usize {
        self.numerosity
    }

    pub(crate) fn add_numerosity(&mut self, amount: usize) {
        self.numerosity += amount;
    }

    /// Returns the remaining numerosity
    pub(crate) fn decrement(&mut self) -> usize {
        self.numerosity = self.numerosity.saturating_sub(1);
        self.numerosity
    }
}
