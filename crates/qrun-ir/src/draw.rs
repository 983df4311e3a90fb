//! Plain-text circuit diagrams.
//!
//! ```text
//! q0: ─H─■─
//!        │
//! q1: ───⊕─
//! ```

use std::fmt;

use crate::circuit::Circuit;
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};

/// Options for [`draw_with`].
#[derive(Debug, Clone, Copy)]
pub struct DrawOptions {
    /// Draw wires that no instruction touches.
    pub idle_wires: bool,
}

impl Default for DrawOptions {
    fn default() -> Self {
        Self { idle_wires: true }
    }
}

/// Render a circuit with default options.
pub fn draw(circuit: &Circuit) -> String {
    draw_with(circuit, &DrawOptions::default())
}

/// One column of the diagram: symbol per qubit row and the vertical span.
struct Column {
    cells: Vec<Option<String>>,
    span: Option<(usize, usize)>,
}

impl Column {
    fn new(num_qubits: usize) -> Self {
        Self {
            cells: vec![None; num_qubits],
            span: None,
        }
    }

    fn width(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(1)
    }
}

fn symbols(inst: &Instruction) -> Vec<String> {
    match &inst.kind {
        InstructionKind::Gate(gate) => match gate {
            StandardGate::CX => vec!["■".into(), "⊕".into()],
            StandardGate::CCX => vec!["■".into(), "■".into(), "⊕".into()],
            StandardGate::CZ => vec!["■".into(), "■".into()],
            StandardGate::CP(_) => vec!["■".into(), gate.display_label()],
            StandardGate::Swap => vec!["X".into(), "X".into()],
            StandardGate::ECR => vec!["ECR₀".into(), "ECR₁".into()],
            _ => vec![gate.display_label()],
        },
        InstructionKind::Measure => inst.clbits.iter().map(|c| format!("M→{}", c.0)).collect(),
        InstructionKind::Reset => vec!["|0⟩".into(); inst.qubits.len()],
        InstructionKind::Barrier => vec!["░".into(); inst.qubits.len()],
    }
}

/// Render a circuit as a text diagram, one row per qubit.
pub fn draw_with(circuit: &Circuit, options: &DrawOptions) -> String {
    let n = circuit.num_qubits();
    let mut columns: Vec<Column> = Vec::new();
    let mut next_free = vec![0usize; n];
    let mut used = vec![false; n];

    for inst in circuit.instructions() {
        if inst.qubits.is_empty() {
            continue;
        }
        let indices: Vec<usize> = inst.qubits.iter().map(|q| q.index()).collect();
        let lo = indices.iter().copied().min().unwrap_or(0);
        let hi = indices.iter().copied().max().unwrap_or(0);
        // Measurements and barriers are drawn per qubit without a connector.
        let connected = inst.is_gate() && inst.qubits.len() > 1;
        let col = (lo..=hi)
            .filter(|&q| connected || indices.contains(&q))
            .map(|q| next_free[q])
            .max()
            .unwrap_or(0);
        while columns.len() <= col {
            columns.push(Column::new(n));
        }
        for (q, sym) in indices.iter().zip(symbols(inst)) {
            columns[col].cells[*q] = Some(sym);
            used[*q] = true;
        }
        for q in lo..=hi {
            if connected || indices.contains(&q) {
                next_free[q] = col + 1;
            }
        }
        if connected {
            columns[col].span = Some((lo, hi));
        }
    }

    let rows: Vec<usize> = (0..n).filter(|&q| options.idle_wires || used[q]).collect();
    let name_width = rows
        .iter()
        .map(|q| format!("q{q}").len())
        .max()
        .unwrap_or(2);

    let mut lines = Vec::with_capacity(rows.len() * 2);
    for (row_pos, &q) in rows.iter().enumerate() {
        let mut line = format!("{:>width$}: ─", format!("q{q}"), width = name_width);
        for column in &columns {
            let width = column.width();
            let inside = column.span.is_some_and(|(lo, hi)| q > lo && q < hi);
            let cell = match (&column.cells[q], inside) {
                (Some(sym), _) => sym.clone(),
                (None, true) => "┼".into(),
                (None, false) => "─".into(),
            };
            line.push_str(&pad(&cell, width, '─'));
            line.push('─');
        }
        lines.push(line);

        if let Some(&next) = rows.get(row_pos + 1) {
            let mut connector = " ".repeat(name_width + 3);
            for column in &columns {
                let width = column.width();
                let crosses = column.span.is_some_and(|(lo, hi)| q >= lo && next <= hi);
                let cell = if crosses { "│" } else { " " };
                connector.push_str(&pad(cell, width, ' '));
                connector.push(' ');
            }
            lines.push(connector.trim_end().to_string());
        }
    }
    lines.join("\n")
}

/// Center `s` in a field of `width` characters.
fn pad(s: &str, width: usize, fill: char) -> String {
    let len = s.chars().count();
    let total = width.saturating_sub(len);
    let left = total / 2;
    let right = total - left;
    let mut out = String::with_capacity(width * 3);
    out.extend(std::iter::repeat_n(fill, left));
    out.push_str(s);
    out.extend(std::iter::repeat_n(fill, right));
    out
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&draw(self))
    }
}
