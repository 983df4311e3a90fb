//! Pauli observables.
//!
//! Labels follow the little-endian convention: the rightmost character
//! acts on qubit 0, so `"IZ"` measures Z on qubit 0 and `"ZI"` measures Z
//! on qubit 1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IrError, IrResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli X.
    X,
    /// Pauli Y.
    Y,
    /// Pauli Z.
    Z,
}

impl Pauli {
    /// Label character.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

/// A weighted Pauli string over a fixed number of qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observable {
    /// Pauli acting on each qubit, indexed by qubit.
    paulis: Vec<Pauli>,
    /// Real coefficient.
    coeff: f64,
}

impl Observable {
    /// Parse a label such as `"ZZ"` or `"IX"` with coefficient 1.
    pub fn from_label(label: &str) -> IrResult<Self> {
        let mut paulis = Vec::with_capacity(label.len());
        for c in label.chars().rev() {
            let p = Pauli::from_char(c).ok_or_else(|| IrError::InvalidPauliLabel {
                label: label.to_string(),
                found: c,
            })?;
            paulis.push(p);
        }
        Ok(Self { paulis, coeff: 1.0 })
    }

    /// Set the coefficient.
    #[must_use]
    pub fn with_coeff(mut self, coeff: f64) -> Self {
        self.coeff = coeff;
        self
    }

    /// Number of qubits the observable is defined on.
    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// The coefficient.
    pub fn coeff(&self) -> f64 {
        self.coeff
    }

    /// Pauli on `qubit`, identity if out of range.
    pub fn pauli(&self, qubit: usize) -> Pauli {
        self.paulis.get(qubit).copied().unwrap_or(Pauli::I)
    }

    /// Non-identity terms as `(qubit, pauli)`.
    pub fn support(&self) -> impl Iterator<Item = (usize, Pauli)> + '_ {
        self.paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| **p != Pauli::I)
            .map(|(q, p)| (q, *p))
    }

    /// The label, most significant qubit first.
    pub fn label(&self) -> String {
        self.paulis.iter().rev().map(|p| p.as_char()).collect()
    }

    /// Re-express the observable on physical qubits.
    ///
    /// `layout[v]` is the physical qubit holding virtual qubit `v` at the
    /// end of the compiled circuit. The result acts on `num_physical`
    /// qubits with identity on every qubit not in the image of `layout`.
    pub fn apply_layout(&self, layout: &[u32], num_physical: usize) -> IrResult<Self> {
        if layout.len() != self.paulis.len() {
            return Err(IrError::LayoutMismatch {
                layout: layout.len(),
                observable: self.paulis.len(),
            });
        }
        let mut paulis = vec![Pauli::I; num_physical];
        for (virt, &phys) in layout.iter().enumerate() {
            let slot = paulis
                .get_mut(phys as usize)
                .ok_or(IrError::PhysicalOutOfRange {
                    physical: phys,
                    num_physical,
                })?;
            *slot = self.paulis[virt];
        }
        Ok(Self {
            paulis,
            coeff: self.coeff,
        })
    }
}

impl FromStr for Observable {
    type Err = IrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl fmt::Display for Observable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.coeff - 1.0).abs() < f64::EPSILON {
            write!(f, "{}", self.label())
        } else {
            write!(f, "{}*{}", self.coeff, self.label())
        }
    }
}

/// Cumulative Z-string labels for `n` qubits.
///
/// Label `i` (1-based) is `i` copies of `Z` followed by `n - i` copies of
/// `I`; for `n = 2` this is `["ZI", "ZZ"]`.
pub fn z_ladder_labels(n: usize) -> Vec<String> {
    (1..=n)
        .map(|i| format!("{}{}", "Z".repeat(i), "I".repeat(n - i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_label_is_little_endian() {
        let obs = Observable::from_label("IZ").unwrap();
        assert_eq!(obs.pauli(0), Pauli::Z);
        assert_eq!(obs.pauli(1), Pauli::I);
        assert_eq!(obs.label(), "IZ");
        assert_eq!(obs.support().collect::<Vec<_>>(), vec![(0, Pauli::Z)]);
    }

    #[test]
    fn test_invalid_label() {
        let err = Observable::from_label("ZQ").unwrap_err();
        assert!(matches!(err, IrError::InvalidPauliLabel { found: 'Q', .. }));
    }

    #[test]
    fn test_apply_layout() {
        // Virtual 0 -> physical 3, virtual 1 -> physical 1 on a 5-qubit device.
        let obs = Observable::from_label("XZ").unwrap();
        let mapped = obs.apply_layout(&[3, 1], 5).unwrap();
        assert_eq!(mapped.num_qubits(), 5);
        assert_eq!(mapped.label(), "IZIXI");
        assert_eq!(mapped.pauli(3), Pauli::Z);
        assert_eq!(mapped.pauli(1), Pauli::X);
        assert_eq!(mapped.pauli(0), Pauli::I);
    }

    #[test]
    fn test_apply_layout_errors() {
        let obs = Observable::from_label("ZZ").unwrap();
        assert!(matches!(
            obs.apply_layout(&[0], 3),
            Err(IrError::LayoutMismatch { .. })
        ));
        assert!(matches!(
            obs.apply_layout(&[0, 9], 3),
            Err(IrError::PhysicalOutOfRange { physical: 9, .. })
        ));
    }

    #[test]
    fn test_z_ladder_two_qubits() {
        assert_eq!(z_ladder_labels(2), vec!["ZI", "ZZ"]);
        assert_eq!(z_ladder_labels(3), vec!["ZII", "ZZI", "ZZZ"]);
        assert!(z_ladder_labels(0).is_empty());
    }

    proptest! {
        #[test]
        fn z_ladder_shape(n in 1usize..12) {
            let labels = z_ladder_labels(n);
            prop_assert_eq!(labels.len(), n);
            for (idx, label) in labels.iter().enumerate() {
                let i = idx + 1;
                prop_assert_eq!(label.len(), n);
                prop_assert!(label[..i].chars().all(|c| c == 'Z'));
                prop_assert!(label[i..].chars().all(|c| c == 'I'));
                prop_assert!(Observable::from_label(label).is_ok());
            }
        }
    }
}
