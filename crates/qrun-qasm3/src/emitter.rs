//! QASM3 emitter for serializing circuits.

use std::f64::consts::PI;

use qrun_ir::{Circuit, ClbitId, Instruction, InstructionKind, QubitId, StandardGate};

use crate::error::{Qasm3Error, Qasm3Result};

/// Name of the emitted quantum register.
pub const QUBIT_REGISTER: &str = "q";

/// Emit a circuit as an OpenQASM 3 program.
///
/// Qubits are declared as one register `q`, classical bits as one
/// register named after the circuit's classical register (`meas` after
/// `measure_all`). Gates use `stdgates.inc` names; `sxdg`, which that
/// file lacks, is written as `inv @ sx`. `ecr` is written bare: it only
/// appears after translation to an Eagle basis, where it is native.
pub fn emit(circuit: &Circuit) -> Qasm3Result<String> {
    let mut emitter = Emitter::new(circuit.creg_name());
    emitter.emit_circuit(circuit)?;
    Ok(emitter.output)
}

struct Emitter<'a> {
    output: String,
    creg: &'a str,
}

impl<'a> Emitter<'a> {
    fn new(creg: &'a str) -> Self {
        Self {
            output: String::new(),
            creg,
        }
    }

    fn emit_circuit(&mut self, circuit: &Circuit) -> Qasm3Result<()> {
        check_contiguous("qubit", circuit.dag().qubits().iter().map(|q| q.0))?;
        check_contiguous("bit", circuit.dag().clbits().iter().map(|c| c.0))?;

        self.writeln("OPENQASM 3.0;");
        self.writeln("include \"stdgates.inc\";");

        let num_qubits = circuit.num_qubits();
        if num_qubits > 0 {
            self.writeln(&format!("qubit[{num_qubits}] {QUBIT_REGISTER};"));
        }
        let num_clbits = circuit.num_clbits();
        if num_clbits > 0 {
            self.writeln(&format!("bit[{num_clbits}] {};", self.creg));
        }

        for instruction in circuit.instructions() {
            self.emit_instruction(instruction)?;
        }
        Ok(())
    }

    fn emit_instruction(&mut self, instruction: &Instruction) -> Qasm3Result<()> {
        let qubits = emit_qubits(&instruction.qubits);
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let head = emit_gate_head(gate)?;
                self.writeln(&format!("{head} {qubits};"));
            }
            InstructionKind::Measure => {
                for (q, c) in instruction.qubits.iter().zip(&instruction.clbits) {
                    let line = format!("{} = measure {};", self.clbit(*c), qubit(*q));
                    self.writeln(&line);
                }
            }
            InstructionKind::Reset => {
                self.writeln(&format!("reset {qubits};"));
            }
            InstructionKind::Barrier => {
                if qubits.is_empty() {
                    self.writeln("barrier;");
                } else {
                    self.writeln(&format!("barrier {qubits};"));
                }
            }
        }
        Ok(())
    }

    fn clbit(&self, c: ClbitId) -> String {
        format!("{}[{}]", self.creg, c.0)
    }

    fn writeln(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }
}

fn check_contiguous(kind: &'static str, indices: impl Iterator<Item = u32>) -> Qasm3Result<()> {
    let indices: Vec<u32> = indices.collect();
    let count = indices.len();
    match indices.into_iter().find(|&i| i as usize >= count) {
        Some(index) => Err(Qasm3Error::NonContiguousWires { kind, index, count }),
        None => Ok(()),
    }
}

fn emit_gate_head(gate: &StandardGate) -> Qasm3Result<String> {
    if *gate == StandardGate::SXdg {
        return Ok("inv @ sx".into());
    }
    match gate.angle() {
        Some(value) if !value.is_finite() => Err(Qasm3Error::NonFiniteParameter {
            gate: gate.name().into(),
            value,
        }),
        Some(value) => Ok(format!("{}({})", gate.name(), emit_param(value))),
        None => Ok(gate.name().into()),
    }
}

/// Common fractions of π are written symbolically, everything else with
/// full round-trip precision.
fn emit_param(v: f64) -> String {
    const EPS: f64 = 1e-12;
    for (value, text) in [
        (PI, "pi"),
        (PI / 2.0, "pi/2"),
        (PI / 4.0, "pi/4"),
        (-PI, "-pi"),
        (-PI / 2.0, "-pi/2"),
        (-PI / 4.0, "-pi/4"),
    ] {
        if (v - value).abs() < EPS {
            return text.into();
        }
    }
    if v.abs() < EPS {
        return "0".into();
    }
    format!("{v:?}")
}

fn qubit(q: QubitId) -> String {
    format!("{QUBIT_REGISTER}[{}]", q.0)
}

fn emit_qubits(qubits: &[QubitId]) -> String {
    qubits
        .iter()
        .map(|q| qubit(*q))
        .collect::<Vec<_>>()
        .join(", ")
}
