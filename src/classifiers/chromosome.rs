use crate::error::{LcsError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed-length bit vector encoding a rule
///
/// The length is fixed at creation. All positions are 0-indexed and bounds-checked;
/// no domain semantics (matching, legality) live here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chromosome {
    bits: Vec<bool>,
}

impl Chromosome {
    pub fn zeros(size: usize) -> Self {
        Self { bits: vec![false; size] }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Self {
        Self {
            bits: (0..size).map(|_| rng.gen_bool(0.5)).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.bits.len()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn get_bit(&self, index: usize) -> Result<bool> {
        self.bits
            .get(index)
            .copied()
            .ok_or_else(|| LcsError::index(index, self.bits.len()))
    }

    pub fn set_bit(&mut self, index: usize, value: bool) -> Result<()> {
        let len = self.bits.len();
        let bit = self.bits.get_mut(index).ok_or_else(|| LcsError::index(index, len))?;
        *bit = value;
        Ok(())
    }

    pub fn invert(&mut self, index: usize) -> Result<()> {
        let len = self.bits.len();
        let bit = self.bits.get_mut(index).ok_or_else(|| LcsError::index(index, len))?;
        *bit = !*bit;
        Ok(())
    }

    /// Copy of bits `[pos, pos + len)`
    pub fn subset(&self, pos: usize, len: usize) -> Result<Chromosome> {
        let end = self.checked_end(pos, len)?;
        Ok(Chromosome::from_bits(self.bits[pos..end].to_vec()))
    }

    /// Replace bits `[pos, pos + bits.size())` with the supplied bits
    pub fn set_subset(&mut self, pos: usize, bits: &Chromosome) -> Result<()> {
        let end = self.checked_end(pos, bits.size())?;
        self.bits[pos..end].copy_from_slice(&bits.bits);
        Ok(())
    }

    /// Number of positions where the two chromosomes differ
    pub fn hamming_distance(&self, other: &Chromosome) -> usize {
        let common = self
            .bits
            .iter()
            .zip(&other.bits)
            .filter(|(a, b)| a != b)
            .count();
        common + self.bits.len().abs_diff(other.bits.len())
    }

    fn checked_end(&self, pos: usize, len: usize) -> Result<usize> {
        let end = pos
            .checked_add(len)
            .ok_or_else(|| LcsError::index(pos, self.bits.len()))?;
        if end > self.bits.len() {
            // Report the first position that falls outside the chromosome
            return Err(LcsError::index(end - 1, self.bits.len()));
        }
        Ok(end)
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Chromosome {
    type Err = LcsError;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(LcsError::InvalidArgument(format!(
                    "Invalid chromosome character '{}'",
                    other
                ))),
            })
            .collect::<Result<Vec<bool>>>()
            .map(Chromosome::from_bits)
    }
}
