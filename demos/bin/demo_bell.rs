//! Bell state estimator demo.
//!
//! Prepares `|Φ+⟩` and estimates `IZ IX ZI XI ZZ XX` on the least busy
//! device.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use qrun_demos::present::{print_header, print_report};
use qrun_demos::{Pipeline, ServiceConfig};

#[derive(Parser)]
#[command(name = "demo-bell")]
#[command(about = "Estimate Pauli observables of a Bell state", version)]
struct Args {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    service: ServiceConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: &Args) -> anyhow::Result<()> {
    print_header("Bell State Estimator");
    let pipeline = Pipeline::from_config(args.service.connect().await?, &args.service);
    let report = pipeline.run_bell().await?;
    print_report(&report);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
