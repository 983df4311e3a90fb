//! Console output: headers, circuit diagrams, plots and count tables.

use std::fmt::Write as _;

use console::style;
use qrun_hal::{EstimatorPubResult, SamplerPubResult};
use qrun_ir::{Circuit, draw};

use crate::pipeline::{Outcome, Report};

/// Plot rows between the top and bottom of the value axis.
const PLOT_HEIGHT: usize = 11;

/// Most outcomes listed in a count table.
const MAX_OUTCOMES: usize = 16;

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print a titled circuit diagram.
pub fn print_circuit(title: &str, circuit: &Circuit) {
    print_section(title);
    for line in draw(circuit).lines() {
        println!("  {line}");
    }
}

/// Print whatever a program produced.
pub fn print_report(report: &Report) {
    match &report.outcome {
        Outcome::Estimator { labels, result } => {
            print_section("Expectation values");
            print!("{}", render_plot(labels, result));
            println!();
            print!("{}", render_table(labels, result));
        }
        Outcome::Sampler(result) => {
            print_section(&format!("Counts ({} shots)", result.shots));
            print!("{}", render_counts(result));
        }
    }
    print_success(&format!("Job {} on {} complete", report.job_id, report.backend));
}

/// ASCII line plot of expectation value against observable label.
///
/// Points are `o`, error bars `|`, and the line between neighbouring
/// points `.`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_plot(labels: &[String], result: &EstimatorPubResult) -> String {
    let n = labels.len().min(result.evs.len());
    if n == 0 {
        return String::new();
    }
    let std_of = |i: usize| result.stds.get(i).copied().unwrap_or(0.0);

    let y_max = (0..n)
        .map(|i| result.evs[i] + std_of(i))
        .fold(1.0_f64, f64::max);
    let y_min = (0..n)
        .map(|i| result.evs[i] - std_of(i))
        .fold(-1.0_f64, f64::min);
    let step = (y_max - y_min) / (PLOT_HEIGHT - 1) as f64;
    let row_of = |y: f64| (((y_max - y) / step).round() as usize).min(PLOT_HEIGHT - 1);

    let col_width = labels.iter().map(String::len).max().unwrap_or(0).max(4) + 2;
    let x_of = |i: usize| i * col_width + col_width / 2;
    let width = n * col_width;
    let mut grid = vec![vec![' '; width]; PLOT_HEIGHT];

    for i in 1..n {
        let (x0, x1) = (x_of(i - 1), x_of(i));
        let (y0, y1) = (result.evs[i - 1], result.evs[i]);
        for x in x0 + 1..x1 {
            let t = (x - x0) as f64 / (x1 - x0) as f64;
            grid[row_of(y0 + t * (y1 - y0))][x] = '.';
        }
    }
    for i in 0..n {
        let x = x_of(i);
        let ev = result.evs[i];
        let std = std_of(i);
        for row in grid.iter_mut().take(row_of(ev - std) + 1).skip(row_of(ev + std)) {
            row[x] = '|';
        }
        grid[row_of(ev)][x] = 'o';
    }

    let mut out = String::new();
    for (r, row) in grid.iter().enumerate() {
        let mut y = y_max - r as f64 * step;
        if y.abs() < 1e-9 {
            y = 0.0;
        }
        let line: String = row.iter().collect();
        let _ = writeln!(out, "{y:>7.2} │{}", line.trim_end());
    }
    let _ = writeln!(out, "{:>7} └{}", "", "─".repeat(width));
    let mut axis = String::new();
    for label in labels.iter().take(n) {
        let _ = write!(axis, "{label:^col_width$}");
    }
    let _ = writeln!(out, "{:>7}  {}", "", axis.trim_end());
    out
}

/// Table of `label  ev  ± std`.
pub fn render_table(labels: &[String], result: &EstimatorPubResult) -> String {
    let w = labels.iter().map(String::len).max().unwrap_or(0).max(5);
    let mut out = String::new();
    let _ = writeln!(out, "  {:<w$}  {:>8}  {:>8}", "label", "ev", "± std");
    for (i, label) in labels.iter().enumerate() {
        let (Some(ev), Some(std)) = (result.evs.get(i), result.stds.get(i)) else {
            break;
        };
        let _ = writeln!(out, "  {label:<w$}  {ev:>8.4}  ± {std:.4}");
    }
    out
}

/// Counts by descending count, with a percentage bar.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_counts(result: &SamplerPubResult) -> String {
    let sorted = result.counts.sorted();
    let total = result.counts.total_shots().max(1) as f64;

    let mut out = String::new();
    for (bitstring, count) in sorted.iter().take(MAX_OUTCOMES) {
        let prob = **count as f64 / total * 100.0;
        let bar = "█".repeat((prob / 2.0).round() as usize);
        let _ = writeln!(
            out,
            "  {}: {:>6} ({:>5.2}%) {}",
            style(bitstring).cyan(),
            count,
            prob,
            style(bar).green()
        );
    }
    if sorted.len() > MAX_OUTCOMES {
        let _ = writeln!(out, "  ... and {} more outcomes", sorted.len() - MAX_OUTCOMES);
    }
    out
}
