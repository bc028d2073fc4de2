use anyhow::{Context, Result};
use clap::Parser;

/// Compiles an SML source file and invokes it with up to three integer
/// arguments.
#[derive(Parser)]
#[command(name = "smlc", about = "JIT-compile and run a Source Mini-Language file")]
struct Args {
    /// Path to the .sml source file
    file: std::path::PathBuf,

    /// Up to three 32-bit integer arguments, passed as p1, p2, p3
    #[arg(num_args = 0..=3)]
    params: Vec<i32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if let Err(err) = run(&args) {
        eprintln!("smlc: {err:#}");
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let source = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to open SML file: {}", args.file.display()))?;

    let function = sml_jit::compile(&source)
        .with_context(|| format!("failed to compile SML file: {}", args.file.display()))?;

    let (p1, p2, p3) = (
        args.params.first().copied().unwrap_or(0),
        args.params.get(1).copied().unwrap_or(0),
        args.params.get(2).copied().unwrap_or(0),
    );

    let result = unsafe { function.call3(p1, p2, p3) };
    println!(
        "SML function at {} returned {result}",
        args.file.display()
    );

    function.dispose();
    Ok(())
}
