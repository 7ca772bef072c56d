use std::path::PathBuf;

use anyhow::{Context, Result};
use capsplice::{BlockIndex, CallTape, Config, DataDir, DumpResources, EditPlan};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "capsplice", version, about = "Patch and scan GPU capture containers")]
struct Cli {
    /// Config file (defaults to <data-dir>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for logs and config (defaults to ~/.capsplice)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a new container with the edits in an edit plan applied
    Rewrite {
        /// Source capture container
        #[arg(long)]
        source: PathBuf,
        /// Block index JSON (record offsets plus end-of-file offset)
        #[arg(long)]
        index: PathBuf,
        /// Edit plan JSON
        #[arg(long)]
        edits: PathBuf,
        /// Destination container
        #[arg(long)]
        output: PathBuf,
    },
    /// Scan a call tape for dump candidates and write dump resources JSON
    Candidates {
        /// Call tape (JSONL)
        #[arg(long)]
        tape: PathBuf,
        /// Dump resources JSON output
        #[arg(long)]
        output: PathBuf,
        /// Only keep the final draw of each candidate
        #[arg(long)]
        last_draw_only: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = DataDir::resolve(cli.data_dir.clone());

    // Initialize logging to file (<data-dir>/logs/capsplice.log)
    let log_file = data_dir
        .open_log()
        .with_context(|| format!("failed to open log in {}", data_dir.root().display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(log_file)
        .with_ansi(false) // Disable ANSI colors in log file
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load(&data_dir),
    };

    match cli.command {
        Command::Rewrite {
            source,
            index,
            edits,
            output,
        } => rewrite(&config, source, index, edits, output),
        Command::Candidates {
            tape,
            output,
            last_draw_only,
        } => {
            let last_draw_only = config.last_draw_only || last_draw_only;
            candidates(&config.with_last_draw_only(last_draw_only), tape, output)
        }
    }
}

fn rewrite(
    config: &Config,
    source: PathBuf,
    index: PathBuf,
    edits: PathBuf,
    output: PathBuf,
) -> Result<()> {
    let index = BlockIndex::read_from_path(&index)
        .with_context(|| format!("failed to read block index {}", index.display()))?;
    let mut ledger = index.build_ledger().context("invalid block index")?;

    let plan = EditPlan::read_from_path(&edits)
        .with_context(|| format!("failed to read edit plan {}", edits.display()))?;
    plan.apply(&mut ledger).context("failed to apply edit plan")?;

    ledger
        .write_container_with_chunk_size(&source, &output, config.copy_chunk_size)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "Wrote {} ({} blocks, {} modifications)",
        output.display(),
        ledger.block_count(),
        ledger.modification_count()
    );
    Ok(())
}

fn candidates(config: &Config, tape: PathBuf, output: PathBuf) -> Result<()> {
    let tape = CallTape::read_jsonl_from_path(&tape)
        .with_context(|| format!("failed to read call tape {}", tape.display()))?;

    let mut candidates = tape.scan();
    if config.last_draw_only {
        for candidate in &mut candidates {
            candidate.keep_last_draw();
        }
    }

    let resources = DumpResources::from_candidates(&candidates);
    resources
        .save_json(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!("Found {} dump candidates", resources.len());
    Ok(())
}
