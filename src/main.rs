//! FastJuncLift CLI entry point
//!
//! Lifts splice junction records between a reference and a haploid or
//! diploid personal genome.

use clap::{Args, Parser, Subcommand};
use fast_junclift::core::ChainIndex;
use fast_junclift::formats::{self, ConversionStats, ConvertOptions, JuncRecord, Schema, SpliceSiteRecord};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fast-junclift")]
#[command(about = "Splice junction liftover between reference and personal genomes")]
#[command(version)]
#[command(author = "FastJuncLift Contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConvertArgs {
    /// Chain file (reference -> personal); the left haplotype when --right-chain is given
    chain: PathBuf,
    /// Input record file, optionally gzip/bzip2 compressed
    input: PathBuf,
    /// Output file (optional, stdout if not specified)
    output: Option<PathBuf>,
    /// Chain file of the right haplotype; makes the personal genome diploid
    #[arg(long = "right-chain")]
    right_chain: Option<PathBuf>,
    /// Convert personal genome coordinates back to the reference
    #[arg(long)]
    reverse: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert splice junction (.junc) file
    Junc(ConvertArgs),
    /// Convert STAR splice-site table (SJ.out.tab) file
    Tab(ConvertArgs),
}

fn load_index(args: &ConvertArgs) -> anyhow::Result<ChainIndex> {
    let start = Instant::now();
    eprintln!("Loading chain file: {:?}", args.chain);

    let index = ChainIndex::from_chain_files(&args.chain, args.right_chain.as_deref(), args.reverse)
        .map_err(|e| anyhow::anyhow!("Failed to load chain file: {}", e))?;

    eprintln!("Chain file loaded in {:.2}s", start.elapsed().as_secs_f64());
    Ok(index)
}

fn run<S: Schema>(args: &ConvertArgs) -> anyhow::Result<ConversionStats> {
    let index = load_index(args)?;
    let options = ConvertOptions {
        reverse: args.reverse,
        ..ConvertOptions::default()
    };

    eprintln!(
        "Converting {} file: {:?} -> {}",
        S::FORMAT,
        args.input,
        args.output
            .as_ref()
            .map(|p| format!("{:?}", p))
            .unwrap_or_else(|| "stdout".to_string())
    );
    let stats = formats::convert_file::<S>(&index, &args.input, args.output.as_deref(), options)?;
    Ok(stats)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start = Instant::now();

    let stats = match &cli.command {
        Commands::Junc(args) => run::<JuncRecord>(args)?,
        Commands::Tab(args) => run::<SpliceSiteRecord>(args)?,
    };

    eprintln!("\n=== Conversion Statistics ===");
    eprintln!("Total records:   {}", stats.total);
    eprintln!("Successful:      {}", stats.success);
    eprintln!("Failed:          {}", stats.failed);
    eprintln!("Merged:          {}", stats.merged);
    eprintln!("Time elapsed:    {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
