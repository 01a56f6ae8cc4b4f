//! QA command-line interface
//!
//! Run with: cargo run -p qa-system --features cli --bin qa-cli -- <command>

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;

use qa_system::{
    config::QaConfig,
    evaluation::{EvalReport, Evaluation, ExactMatchScorer},
    providers::{ElasticsearchRetriever, HuggingFaceQa, WikipediaClient, WikipediaRetriever},
    retrieval::load_corpus,
    Answer, EvalExample, QaSystem, Reader, ReaderOptions,
};

#[derive(Parser)]
#[command(name = "qa-cli", version, about = "Retriever + reader question answering")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load an evidence corpus (JSON array or JSON lines) into the index
    Index {
        /// Corpus file
        #[arg(long)]
        corpus: PathBuf,
    },
    /// Answer a question
    Ask {
        question: String,
        /// Answers to show
        #[arg(long)]
        top_k: Option<usize>,
        /// Documents to retrieve
        #[arg(long)]
        n_docs: Option<usize>,
        /// Read the top Wikipedia page instead of the index
        #[arg(long)]
        wiki: bool,
        /// Model preset name from the reader config
        #[arg(long)]
        model: Option<String>,
    },
    /// Evaluate the pipeline on a SQuAD-format file
    Evaluate {
        /// SQuAD v1.1 / v2.0 JSON file
        #[arg(long)]
        examples: PathBuf,
        /// Directory for prediction files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Prediction file name
        #[arg(long)]
        filename: Option<String>,
        /// Only evaluate the first N questions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the number of indexed documents
    Count,
}

fn progress_bar(len: usize, label: &str) -> Result<ProgressBar> {
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=> "),
    );
    bar.set_message(label.to_string());
    Ok(bar)
}

fn build_reader(config: &QaConfig, preset: Option<&str>) -> Result<Reader> {
    let client = HuggingFaceQa::new(&config.reader)?;
    let client = match preset {
        Some(name) => match config.reader.resolve_model(name) {
            Some(model) => client.with_model(model),
            None => {
                tracing::warn!("Unknown model preset {:?}, using {}", name, config.reader.model);
                client
            }
        },
        None => client,
    };
    Ok(Reader::new(Arc::new(client), ReaderOptions::from(&config.reader)))
}

fn print_answers(answers: &[Answer]) {
    if answers.is_empty() {
        println!("{}", style("No answer found.").yellow());
        return;
    }
    for (rank, answer) in answers.iter().enumerate() {
        let text = if answer.is_null() {
            style("<no answer>".to_string()).dim()
        } else {
            style(answer.answer_text.clone()).bold()
        };
        println!(
            "{:>2}. {}  ({:.3})  [{} | doc {}]",
            rank + 1,
            text,
            answer.probability,
            answer.title,
            answer.doc_id
        );
    }
}

fn print_report(report: &EvalReport) {
    let scores = &report.scores;
    println!("\n{}", style("Evaluation").bold().underlined());
    println!("  exact          {:>7.2}  ({} questions)", scores.exact, scores.total);
    println!("  has_ans_exact  {:>7.2}  ({})", scores.has_ans_exact, scores.has_ans_total);
    println!("  no_ans_exact   {:>7.2}  ({})", scores.no_ans_exact, scores.no_ans_total);
    println!("  predictions    {}", report.predictions_path.display());
    if let Some(meta) = &report.meta_path {
        println!("  meta           {}", meta.display());
    }
    if report.reused_predictions {
        println!("  {}", style("(predictions reused from an earlier run)").dim());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qa_system=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => QaConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => QaConfig::default(),
    };
    config.apply_env();

    match cli.command {
        Command::Index { corpus } => {
            let records = load_corpus(&corpus)?;
            let index = ElasticsearchRetriever::connect(&config.elasticsearch).await?;
            index.create_index().await?;

            let bar = progress_bar(records.len(), "Indexing")?;
            let report = index
                .load_index(&records, |done| bar.set_position(done as u64))
                .await?;
            bar.finish_and_clear();

            println!(
                "Loaded {} records into {} ({} failed, {} in index)",
                style(report.indexed).green(),
                index.index_name(),
                report.failed,
                report.total_in_index
            );
        }
        Command::Ask {
            question,
            top_k,
            n_docs,
            wiki,
            model,
        } => {
            let reader = build_reader(&config, model.as_deref())?;

            if wiki {
                let retriever = WikipediaRetriever::new(WikipediaClient::new(&config.wikipedia)?);
                let qa = QaSystem::new(Arc::new(retriever), reader, config.pipeline.clone());
                let result = qa.query_with(&question, Some(1), top_k).await?;
                print_answers(&result.output.answers);
                if let Some(page) = result.documents.first() {
                    println!("\nFound from this Wikipedia page: {} <{}>", style(&page.title).cyan(), page.url);
                }
            } else {
                let retriever = ElasticsearchRetriever::connect(&config.elasticsearch).await?;
                let qa = QaSystem::new(Arc::new(retriever), reader, config.pipeline.clone());
                let result = qa.query_with(&question, n_docs, top_k).await?;
                print_answers(&result.output.answers);
            }
        }
        Command::Evaluate {
            examples,
            output_dir,
            filename,
            limit,
        } => {
            let mut examples = EvalExample::load_squad(&examples)?;
            if let Some(limit) = limit {
                examples.truncate(limit);
            }

            let retriever = ElasticsearchRetriever::connect(&config.elasticsearch).await?;
            let reader = build_reader(&config, None)?;
            let qa = QaSystem::new(Arc::new(retriever), reader, config.pipeline.clone());

            let evaluation = Evaluation::new(
                output_dir.unwrap_or(config.evaluation.output_dir.clone()),
                filename.unwrap_or(config.evaluation.filename.clone()),
            );

            let bar = progress_bar(examples.len(), "Evaluating")?;
            let report = evaluation
                .run(&qa, &examples, &ExactMatchScorer, |done| bar.set_position(done as u64))
                .await?;
            bar.finish_and_clear();

            print_report(&report);
        }
        Command::Count => {
            let index = ElasticsearchRetriever::connect(&config.elasticsearch).await?;
            println!("{}: {}", index.index_name(), index.count().await?);
        }
    }

    Ok(())
}
