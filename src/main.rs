use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::{fmt, EnvFilter};
use wikidex::storage::CONTENT_FAMILY;
use wikidex::{IndexJob, JobConfig, RecordReader, SledSink};

// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Positional and TF-IDF inverted index builder for wiki dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the positional index (term -> article -> positions)
    Index(JobArgs),
    /// Build the TF-IDF weighted index (term -> article -> weight)
    Weight {
        #[command(flatten)]
        job: JobArgs,
        /// Corpus size N; defaults to the number of pages read
        #[arg(long)]
        corpus_size: Option<u64>,
    },
    /// Print the stored row for one term as JSON
    Lookup {
        #[arg(short, long)]
        store: PathBuf,
        #[arg(short, long)]
        term: String,
        /// Decode the row as a weighted index
        #[arg(long, default_value_t = false)]
        weighted: bool,
    },
}

#[derive(Args, Debug)]
struct JobArgs {
    /// Dump file (`.gz` is decompressed)
    #[arg(short, long)]
    input: PathBuf,
    /// sled store directory
    #[arg(short, long)]
    store: PathBuf,
    /// JSON job configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    start_tag: Option<String>,
    #[arg(long)]
    end_tag: Option<String>,
    /// Worker threads (0 = one per core)
    #[arg(long)]
    threads: Option<usize>,
}

impl JobArgs {
    fn job_config(&self) -> Result<JobConfig> {
        let mut config = match &self.config {
            Some(path) => JobConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => JobConfig::default(),
        };
        if let Some(tag) = &self.start_tag {
            config.start_tag = tag.clone();
        }
        if let Some(tag) = &self.end_tag {
            config.end_tag = tag.clone();
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        Ok(config)
    }
}

type DumpRecords = RecordReader<Box<dyn std::io::BufRead + Send>>;

fn open_job(args: &JobArgs, config: &JobConfig) -> Result<(IndexJob<SledSink>, DumpRecords)> {
    let records = RecordReader::open(&args.input, &config.start_tag, &config.end_tag)
        .with_context(|| format!("Failed to open dump {}", args.input.display()))?;

    let sink = SledSink::open(&args.store)
        .with_context(|| format!("Failed to open store {}", args.store.display()))?;
    sink.clear_family(CONTENT_FAMILY)?;

    let job = IndexJob::new(sink, config)?;
    println!("Starting wikidex {} on {}", wikidex::VERSION, args.input.display());
    Ok((job, records))
}

fn lookup(store: &Path, term: &str, weighted: bool) -> Result<()> {
    let sink = SledSink::open(store)
        .with_context(|| format!("Failed to open store {}", store.display()))?;
    let term = term.to_lowercase();

    let json = if weighted {
        sink.load_weights(&term)?
            .map(|row| serde_json::to_string_pretty(&row))
            .transpose()?
    } else {
        sink.load_index(&term)?
            .map(|row| serde_json::to_string_pretty(&row))
            .transpose()?
    };

    match json {
        Some(json) => println!("{}", json),
        None => println!("No row for term \"{}\"", term),
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let start = Instant::now();
    let stats = match cli.command {
        Commands::Lookup {
            store,
            term,
            weighted,
        } => return lookup(&store, &term, weighted),
        Commands::Index(args) => {
            let (job, records) = open_job(&args, &args.job_config()?)?;
            job.run_positional(records)?
        }
        Commands::Weight { job: args, corpus_size } => {
            let mut config = args.job_config()?;
            if corpus_size.is_some() {
                config.corpus_size = corpus_size;
            }
            let (job, records) = open_job(&args, &config)?;
            job.run_weighting(records)?
        }
    };

    println!("Job finished in {:.3} seconds", start.elapsed().as_secs_f64());
    println!("{}", stats);

    Ok(())
}
