//! Quantum gate types.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Standard gates with known semantics.
///
/// Angles are concrete radians; the pipeline never carries symbolic
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate diag(1, e^{iλ}).
    P(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// Controlled phase gate.
    CP(f64),
    /// SWAP gate.
    Swap,
    /// Echoed cross-resonance gate, `(X⊗I − Y⊗X)/√2` with the first
    /// qubit on the left. Self-inverse.
    ECR,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
}

impl StandardGate {
    /// Get the name of this gate, as written in OpenQASM 3 `stdgates.inc`.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::SX => "sx",
            StandardGate::SXdg => "sxdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::CP(_) => "cp",
            StandardGate::Swap => "swap",
            StandardGate::ECR => "ecr",
            StandardGate::CCX => "ccx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX
            | StandardGate::CZ
            | StandardGate::CP(_)
            | StandardGate::Swap
            | StandardGate::ECR => 2,
            StandardGate::CCX => 3,
            _ => 1,
        }
    }

    /// The rotation angle, for parameterized gates.
    pub fn angle(&self) -> Option<f64> {
        match self {
            StandardGate::Rx(a)
            | StandardGate::Ry(a)
            | StandardGate::Rz(a)
            | StandardGate::P(a)
            | StandardGate::CP(a) => Some(*a),
            _ => None,
        }
    }

    /// Check whether the gate is diagonal in the computational basis.
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            StandardGate::I
                | StandardGate::Z
                | StandardGate::S
                | StandardGate::Sdg
                | StandardGate::T
                | StandardGate::Tdg
                | StandardGate::Rz(_)
                | StandardGate::P(_)
                | StandardGate::CZ
                | StandardGate::CP(_)
        )
    }

    /// The inverse gate.
    pub fn inverse(&self) -> StandardGate {
        match *self {
            StandardGate::S => StandardGate::Sdg,
            StandardGate::Sdg => StandardGate::S,
            StandardGate::T => StandardGate::Tdg,
            StandardGate::Tdg => StandardGate::T,
            StandardGate::SX => StandardGate::SXdg,
            StandardGate::SXdg => StandardGate::SX,
            StandardGate::Rx(a) => StandardGate::Rx(-a),
            StandardGate::Ry(a) => StandardGate::Ry(-a),
            StandardGate::Rz(a) => StandardGate::Rz(-a),
            StandardGate::P(a) => StandardGate::P(-a),
            StandardGate::CP(a) => StandardGate::CP(-a),
            other => other,
        }
    }

    /// Phase-gate angle for diagonal single-qubit gates, `diag(1, e^{iλ})`
    /// up to global phase.
    pub fn phase_angle(&self) -> Option<f64> {
        match *self {
            StandardGate::I => Some(0.0),
            StandardGate::Z => Some(PI),
            StandardGate::S => Some(PI / 2.0),
            StandardGate::Sdg => Some(-PI / 2.0),
            StandardGate::T => Some(PI / 4.0),
            StandardGate::Tdg => Some(-PI / 4.0),
            StandardGate::Rz(a) | StandardGate::P(a) => Some(a),
            _ => None,
        }
    }

    /// Label used by the text drawer.
    pub fn display_label(&self) -> String {
        match self {
            StandardGate::Rx(a) => format!("Rx({})", format_angle(*a)),
            StandardGate::Ry(a) => format!("Ry({})", format_angle(*a)),
            StandardGate::Rz(a) => format!("Rz({})", format_angle(*a)),
            StandardGate::P(a) | StandardGate::CP(a) => format!("P({})", format_angle(*a)),
            StandardGate::SX => "√X".into(),
            StandardGate::SXdg => "√Xdg".into(),
            other => other.name().to_uppercase(),
        }
    }
}

/// Format an angle as a multiple of π when it is one, otherwise with
/// four decimals.
pub fn format_angle(angle: f64) -> String {
    const EPS: f64 = 1e-9;
    for denom in [1.0, 2.0, 4.0, 8.0] {
        let ratio = angle * denom / PI;
        if (ratio - ratio.round()).abs() < EPS {
            #[allow(clippy::cast_possible_truncation)]
            let num = ratio.round() as i64;
            #[allow(clippy::cast_possible_truncation)]
            let den = denom as i64;
            return match (num, den) {
                (0, _) => "0".into(),
                (1, 1) => "π".into(),
                (-1, 1) => "-π".into(),
                (n, 1) => format!("{n}π"),
                (1, d) => format!("π/{d}"),
                (-1, d) => format!("-π/{d}"),
                (n, d) => format!("{n}π/{d}"),
            };
        }
    }
    format!("{angle:.4}")
}
