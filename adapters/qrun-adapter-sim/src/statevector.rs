//! Statevector simulation engine.
//!
//! Basis index bit `k` is qubit `k`.

use num_complex::Complex64;
use rand::Rng;
use std::f64::consts::{FRAC_1_SQRT_2, PI};

use qrun_hal::{HalError, HalResult};
use qrun_ir::{Circuit, Instruction, InstructionKind, Observable, Pauli, StandardGate};

/// A statevector representing a quantum state.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Evolve |0...0⟩ through the unitary part of `circuit`.
    ///
    /// Measurements and barriers are skipped; measurements are only
    /// allowed at the end of the circuit, which callers check.
    pub fn from_circuit(circuit: &Circuit) -> HalResult<Self> {
        let mut sv = Self::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst)?;
        }
        Ok(sv)
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitudes in basis-index order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) -> HalResult<()> {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<usize> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_gate(gate, &qubits);
                Ok(())
            }
            InstructionKind::Measure | InstructionKind::Barrier => Ok(()),
            InstructionKind::Reset => Err(HalError::Unsupported(
                "reset is not supported by the statevector simulator".into(),
            )),
        }
    }

    fn apply_gate(&mut self, gate: &StandardGate, q: &[usize]) {
        match *gate {
            StandardGate::I => {}
            StandardGate::X => self.apply_x(q[0]),
            StandardGate::Y => self.apply_y(q[0]),
            StandardGate::H => self.apply_h(q[0]),
            StandardGate::SX => self.apply_rx_up_to_phase(q[0], PI / 2.0, PI / 4.0),
            StandardGate::SXdg => self.apply_rx_up_to_phase(q[0], -PI / 2.0, -PI / 4.0),
            StandardGate::Rx(theta) => self.apply_rx_up_to_phase(q[0], theta, 0.0),
            StandardGate::Ry(theta) => self.apply_ry(q[0], theta),
            StandardGate::Rz(theta) => self.apply_rz(q[0], theta),
            StandardGate::Z
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::P(_) => {
                let lambda = gate.phase_angle().unwrap_or(0.0);
                self.apply_controlled_phase(1 << q[0], lambda);
            }
            StandardGate::CX => self.apply_mcx((1 << q[0]) | (1 << q[1]), 1 << q[1]),
            StandardGate::CZ => self.apply_controlled_phase((1 << q[0]) | (1 << q[1]), PI),
            StandardGate::CP(lambda) => {
                self.apply_controlled_phase((1 << q[0]) | (1 << q[1]), lambda);
            }
            StandardGate::Swap => self.apply_swap(q[0], q[1]),
            StandardGate::ECR => self.apply_ecr(q[0], q[1]),
            StandardGate::CCX => {
                self.apply_mcx((1 << q[0]) | (1 << q[1]) | (1 << q[2]), 1 << q[2]);
            }
        }
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        self.apply_mcx(1 << qubit, 1 << qubit);
    }

    /// Swap the target bit on every index where all `mask` bits other than
    /// the target are set.
    fn apply_mcx(&mut self, mask: usize, target: usize) {
        let controls = mask & !target;
        for i in 0..self.amplitudes.len() {
            if i & controls == controls && i & target == 0 {
                self.amplitudes.swap(i, i | target);
            }
        }
    }

    fn apply_y(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let i_val = Complex64::new(0.0, 1.0);
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let tmp = self.amplitudes[i];
                self.amplitudes[i] = -i_val * self.amplitudes[j];
                self.amplitudes[j] = i_val * tmp;
            }
        }
    }

    /// `(X⊗I − Y⊗X)/√2` with `first` carrying the `X`/`Y` factor.
    fn apply_ecr(&mut self, first: usize, second: usize) {
        let (m0, m1) = (1 << first, 1 << second);
        let i_val = Complex64::new(0.0, 1.0);
        for base in 0..self.amplitudes.len() {
            if base & (m0 | m1) != 0 {
                continue;
            }
            let idx = [base, base | m0, base | m1, base | m0 | m1];
            let [a0, a1, a2, a3] = idx.map(|i| self.amplitudes[i]);
            self.amplitudes[idx[0]] = FRAC_1_SQRT_2 * (a1 + i_val * a3);
            self.amplitudes[idx[1]] = FRAC_1_SQRT_2 * (a0 - i_val * a2);
            self.amplitudes[idx[2]] = FRAC_1_SQRT_2 * (i_val * a1 + a3);
            self.amplitudes[idx[3]] = FRAC_1_SQRT_2 * (a2 - i_val * a0);
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = FRAC_1_SQRT_2 * (a + b);
                self.amplitudes[j] = FRAC_1_SQRT_2 * (a - b);
            }
        }
    }

    /// Multiply every index with all `mask` bits set by `e^{iλ}`.
    fn apply_controlled_phase(&mut self, mask: usize, lambda: f64) {
        let phase = Complex64::from_polar(1.0, lambda);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if i & mask == mask {
                *amp *= phase;
            }
        }
    }

    fn apply_rx_up_to_phase(&mut self, qubit: usize, theta: f64, global: f64) {
        let mask = 1 << qubit;
        let g = Complex64::from_polar(1.0, global);
        let c = g * (theta / 2.0).cos();
        let neg_i_s = g * Complex64::new(0.0, -(theta / 2.0).sin());
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a + neg_i_s * b;
                self.amplitudes[j] = neg_i_s * a + c * b;
            }
        }
    }

    fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let c = (theta / 2.0).cos();
        let s = (theta / 2.0).sin();
        for i in 0..self.amplitudes.len() {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = c * a - s * b;
                self.amplitudes[j] = s * a + c * b;
            }
        }
    }

    fn apply_rz(&mut self, qubit: usize, theta: f64) {
        let mask = 1 << qubit;
        let phase_0 = Complex64::from_polar(1.0, -theta / 2.0);
        let phase_1 = Complex64::from_polar(1.0, theta / 2.0);
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            *amp *= if i & mask == 0 { phase_0 } else { phase_1 };
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..self.amplitudes.len() {
            if i & mask1 != 0 && i & mask2 == 0 {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Readout
    // =========================================================================

    /// Probability of each basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// `⟨ψ|O|ψ⟩` for a Pauli-string observable, coefficient included.
    pub fn expectation(&self, observable: &Observable) -> HalResult<f64> {
        if observable.num_qubits() != self.num_qubits {
            return Err(HalError::InvalidCircuit(format!(
                "observable {observable} spans {} qubits, state has {}",
                observable.num_qubits(),
                self.num_qubits
            )));
        }

        let mut flip = 0usize;
        for (q, p) in observable.support() {
            if matches!(p, Pauli::X | Pauli::Y) {
                flip |= 1 << q;
            }
        }

        let mut total = Complex64::new(0.0, 0.0);
        for (i, amp) in self.amplitudes.iter().enumerate() {
            // P|i⟩ = phase · |i ^ flip⟩
            let mut phase = Complex64::new(1.0, 0.0);
            for (q, p) in observable.support() {
                let bit = (i >> q) & 1 == 1;
                phase *= match (p, bit) {
                    (Pauli::Z, true) => Complex64::new(-1.0, 0.0),
                    (Pauli::Y, false) => Complex64::new(0.0, 1.0),
                    (Pauli::Y, true) => Complex64::new(0.0, -1.0),
                    _ => Complex64::new(1.0, 0.0),
                };
            }
            total += self.amplitudes[i ^ flip].conj() * phase * amp;
        }
        Ok(observable.coeff() * total.re)
    }

    /// Draw `shots` basis indices from the Born distribution.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, shots: u32) -> Vec<usize> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut acc = 0.0;
        for p in self.probabilities() {
            acc += p;
            cumulative.push(acc);
        }
        let last = self.amplitudes.len() - 1;
        (0..shots)
            .map(|_| {
                let r: f64 = rng.r#gen::<f64>() * acc;
                cumulative.partition_point(|&c| c <= r).min(last)
            })
            .collect()
    }
}
