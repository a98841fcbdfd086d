use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use decision_oracle::advisor::Advisor;
use decision_oracle::analytics::TracingSink;
use decision_oracle::config::{Config, ConfigOverrides};
use decision_oracle::output::csv::{reports_to_csv, scores_to_csv, trees_to_csv};
use decision_oracle::output::table::{
    render_question, render_share_record, render_trees_table, render_validation_table,
};
use decision_oracle::output::{render_json, OutputFormat};
use decision_oracle::share::{InMemoryResultStore, ShareRecord};
use decision_oracle::tree::{load_dir, load_file, tree_files, Answer, InMemoryTreeRepository};
use decision_oracle::validate::ValidationReport;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "decision-oracle",
    about = "Answer a few questions, get a scored recommendation"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long = "trees-dir")]
    trees_dir: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the loaded decision trees.
    Trees,
    /// Lint tree files; defaults to every file in the trees directory.
    Validate { files: Vec<PathBuf> },
    /// Score a complete answer path, e.g. `--answer data_model=relational`.
    Recommend {
        #[arg(long)]
        tree: String,
        #[arg(short, long = "answer")]
        answers: Vec<Answer>,
    },
    /// Walk a tree interactively on the terminal.
    Walk {
        #[arg(long)]
        tree: String,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(config_path.as_path()))?;
    config.apply_overrides(ConfigOverrides {
        trees_dir: cli.trees_dir.clone(),
    });
    init_tracing(&config);

    match &cli.command {
        Commands::Config { init, show } => {
            handle_config_command(*init, *show, &config, &config_path)
        }
        Commands::Validate { files } => run_validate(&config, files, cli.output),
        Commands::Trees => {
            let repository = load_repository(&config)?;
            let summaries = repository.summaries();
            match cli.output {
                OutputFormat::Table => println!("{}", render_trees_table(&summaries)),
                OutputFormat::Json => println!("{}", render_json(&summaries)?),
                OutputFormat::Csv => println!("{}", trees_to_csv(&summaries)?),
            }
            Ok(())
        }
        Commands::Recommend { tree, answers } => {
            let advisor = build_advisor(&config)?;
            let record = advisor.recommend(tree, answers, cli_metadata()).await?;
            print_record(&record, cli.output)
        }
        Commands::Walk { tree } => {
            let advisor = build_advisor(&config)?;
            let record = run_walk(&advisor, tree).await?;
            print_record(&record, cli.output)
        }
    }
}

fn load_repository(config: &Config) -> Result<Arc<InMemoryTreeRepository>> {
    let trees_dir = config.resolved_trees_dir();
    let repository = load_dir(&trees_dir, config.trees.skip_invalid)?;
    if repository.is_empty() {
        warn!("no decision trees found in {}", trees_dir.display());
    }
    Ok(Arc::new(repository))
}

fn build_advisor(config: &Config) -> Result<Advisor> {
    let mut advisor = Advisor::new(
        load_repository(config)?,
        Arc::new(InMemoryResultStore::new()),
        config.share.clone(),
    );
    if config.analytics.enabled {
        advisor = advisor.with_sink(Arc::new(TracingSink));
    }
    Ok(advisor)
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn handle_config_command(
    init: bool,
    show: bool,
    config: &Config,
    config_path: &Path,
) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

fn run_validate(config: &Config, files: &[PathBuf], format: OutputFormat) -> Result<()> {
    let files = if files.is_empty() {
        tree_files(&config.resolved_trees_dir())?
    } else {
        files.to_vec()
    };
    if files.is_empty() {
        bail!("no tree files to validate");
    }

    let mut reports: Vec<(String, ValidationReport)> = Vec::new();
    for path in &files {
        let (report, _) = load_file(path)?;
        reports.push((path.display().to_string(), report));
    }

    match format {
        OutputFormat::Table => println!("{}", render_validation_table(&reports)),
        OutputFormat::Json => {
            let by_source = reports.iter().cloned().collect::<BTreeMap<_, _>>();
            println!("{}", render_json(&by_source)?);
        }
        OutputFormat::Csv => println!("{}", reports_to_csv(&reports)?),
    }

    let failed = reports.iter().filter(|(_, r)| !r.is_valid()).count();
    if failed > 0 {
        return Err(anyhow!("{failed} of {} tree files failed validation", reports.len()));
    }
    info!("validated {} tree files", reports.len());
    Ok(())
}

async fn run_walk(advisor: &Advisor, tree_id: &str) -> Result<ShareRecord> {
    let tree = advisor.start(tree_id).await?;
    println!("{}", tree.title);
    if let Some(description) = &tree.description {
        println!("{description}");
    }
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut answers: Vec<Answer> = Vec::new();
    while let Some(question) = advisor.next_question(tree_id, &answers)? {
        print!("{}", render_question(&question, answers.len() + 1));
        loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                bail!("input closed before the questionnaire was finished");
            };
            match question.option_by_choice(&line) {
                Some(option) => {
                    answers.push(Answer::new(&question.id, &option.id));
                    break;
                }
                None => println!(
                    "Pick a number between 1 and {} or an option id.",
                    question.options.len()
                ),
            }
        }
        println!();
    }
    drop(lines);

    Ok(advisor.recommend(tree_id, &answers, cli_metadata()).await?)
}

fn cli_metadata() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("source".to_string(), "cli".to_string()),
        ("version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
    ])
}

fn print_record(record: &ShareRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_share_record(record)),
        OutputFormat::Json => println!("{}", render_json(record)?),
        OutputFormat::Csv => println!("{}", scores_to_csv(&record.result)?),
    }
    Ok(())
}
