//! Grover search for a secret bitstring.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use qrun_demos::present::{print_header, print_report, print_result};
use qrun_demos::{Pipeline, ServiceConfig};

#[derive(Parser)]
#[command(name = "demo-grover")]
#[command(about = "Grover search for a secret bitstring", version)]
struct Args {
    /// Secret bitstring to search for
    #[arg(short, long, default_value = "11")]
    secret: String,

    /// Execution mode (sampler, estimator)
    #[arg(short, long, default_value = "estimator")]
    mode: String,

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
    // Reject a bad mode before connecting.
    let mode: qrun_demos::ExecutionMode = args.mode.parse()?;

    print_header("Grover's Search");
    print_result("Secret", &args.secret);
    print_result("Mode", mode);

    let pipeline = Pipeline::from_config(args.service.connect().await?, &args.service);
    let report = pipeline.run_grover(&args.secret, mode).await?;
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
