//! Exact multi-controlled gate synthesis without ancillas.
//!
//! A phase gate with controls `c' ∪ {a}` on target `t` splits as
//!
//! ```text
//! MCP(λ)(c'+a, t) = CP(λ/2)(a, t) · MCX(c' → a) · CP(-λ/2)(a, t) · MCX(c' → a) · MCP(λ/2)(c', t)
//! ```
//!
//! While `MCX(c' → a)` runs, `t` is idle and serves as a dirty ancilla, so
//! the inner MCX costs `O(|c'|)` Toffolis (Barenco et al. 1995, lemmas 7.2
//! and 7.3) and a multi-controlled phase over `n` qubits costs `O(n²)`
//! gates.

use std::f64::consts::PI;

use qrun_ir::{Circuit, IrResult, QubitId};

/// Multi-controlled phase gate.
pub fn mcp(
    circuit: &mut Circuit,
    lambda: f64,
    controls: &[QubitId],
    target: QubitId,
) -> IrResult<()> {
    match controls {
        [] => {
            circuit.p(lambda, target)?;
        }
        [c] => {
            circuit.cp(lambda, *c, target)?;
        }
        [rest @ .., a] => {
            circuit.cp(lambda / 2.0, *a, target)?;
            mcx_dirty(circuit, rest, *a, &[target])?;
            circuit.cp(-lambda / 2.0, *a, target)?;
            mcx_dirty(circuit, rest, *a, &[target])?;
            mcp(circuit, lambda / 2.0, rest, target)?;
        }
    }
    Ok(())
}

/// Multi-controlled X gate.
pub fn mcx(circuit: &mut Circuit, controls: &[QubitId], target: QubitId) -> IrResult<()> {
    if controls.len() <= 2 {
        return mcx_dirty(circuit, controls, target, &[]);
    }
    circuit.h(target)?;
    mcp(circuit, PI, controls, target)?;
    circuit.h(target)?;
    Ok(())
}

/// Multi-controlled X borrowing `ancillas` in an arbitrary state and
/// returning them unchanged. Needs one ancilla for three or more controls.
fn mcx_dirty(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    ancillas: &[QubitId],
) -> IrResult<()> {
    let m = controls.len();
    match controls {
        [] => {
            circuit.x(target)?;
        }
        [c] => {
            circuit.cx(*c, target)?;
        }
        [c1, c2] => {
            circuit.ccx(*c1, *c2, target)?;
        }
        _ if ancillas.len() >= m - 2 => {
            toffoli_chain(circuit, controls, target, &ancillas[..m - 2])?;
        }
        _ => {
            // Split the controls so each half can borrow the other as
            // ancillas: a ^= A, t ^= B·a, a ^= A, t ^= B·a leaves t ^= A·B.
            let Some(&spare) = ancillas.first() else {
                return mcx(circuit, controls, target);
            };
            let (first, second) = controls.split_at(m.div_ceil(2));
            let mut borrowed_by_first = second.to_vec();
            borrowed_by_first.push(target);
            let mut second_controls = second.to_vec();
            second_controls.push(spare);
            for _ in 0..2 {
                mcx_dirty(circuit, first, spare, &borrowed_by_first)?;
                mcx_dirty(circuit, &second_controls, target, first)?;
            }
        }
    }
    Ok(())
}

/// Toffoli chain for `m ≥ 3` controls over `m - 2` dirty ancillas.
fn toffoli_chain(
    circuit: &mut Circuit,
    controls: &[QubitId],
    target: QubitId,
    ancillas: &[QubitId],
) -> IrResult<()> {
    let m = controls.len();
    let last = m - 3;

    let ladder = |circuit: &mut Circuit| -> IrResult<()> {
        for i in (1..=last).rev() {
            circuit.ccx(controls[i + 1], ancillas[i - 1], ancillas[i])?;
        }
        circuit.ccx(controls[0], controls[1], ancillas[0])?;
        for i in 1..=last {
            circuit.ccx(controls[i + 1], ancillas[i - 1], ancillas[i])?;
        }
        Ok(())
    };

    circuit.ccx(controls[m - 1], ancillas[last], target)?;
    ladder(circuit)?;
    circuit.ccx(controls[m - 1], ancillas[last], target)?;
    ladder(circuit)?;
    Ok(())
}

/// Flip the sign of the all-ones state of `qubits`.
pub fn mcz(circuit: &mut Circuit, qubits: &[QubitId]) -> IrResult<()> {
    match qubits {
        [] => {}
        [q] => {
            circuit.z(*q)?;
        }
        [a, b] => {
            circuit.cz(*a, *b)?;
        }
        [controls @ .., target] => mcp(circuit, PI, controls, *target)?,
    }
    Ok(())
}
