//! Paper valuation CLI entrypoint.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use serde::Serialize;

use paper_valuation::config::Config;
use paper_valuation::merge::merge_pages;
use paper_valuation::ocr::{OcrPage, Word};
use paper_valuation::pipeline::{PageScan, SheetImage, grader_from_config, segment_scan};
use paper_valuation::segmentation::{AnswerType, SegmentationResult, Segmenter};
use paper_valuation::valuation::{ExamRecord, GradingPlan};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Segments and grades photographed exam answer sheets.
///
/// Runtime settings come from `PAPER_*` environment variables; logs go to stderr and
/// are filtered with `RUST_LOG`.
#[derive(Debug, Parser)]
#[command(name = "paper-valuation", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Segment each page into per-question answers.
    Segment {
        #[command(flatten)]
        pages: PageArgs,
        /// Question numbers whose answers are long (paragraph) answers.
        #[arg(long = "long", value_name = "N")]
        long: Vec<u32>,
    },
    /// Segment pages and merge them into one submission.
    Merge {
        #[command(flatten)]
        pages: PageArgs,
        #[arg(long = "long", value_name = "N")]
        long: Vec<u32>,
    },
    /// Grade a submission against an exam record.
    Grade {
        /// Exam record JSON (answer key, marks, OR groups).
        #[arg(long)]
        exam: PathBuf,
        /// Grade the answers stored for this student instead of scanned pages.
        #[arg(long, conflicts_with = "words")]
        student: Option<String>,
        #[command(flatten)]
        pages: PageArgs,
    },
}

#[derive(Debug, Args)]
struct PageArgs {
    /// OCR word list (JSON) of a page; repeat in upload order.
    #[arg(long = "words", value_name = "JSON")]
    words: Vec<PathBuf>,
    /// Sheet image of a page; if given, one per word list, in the same order.
    #[arg(long = "image", value_name = "IMAGE")]
    images: Vec<PathBuf>,
}

impl PageArgs {
    fn load(&self) -> anyhow::Result<Vec<PageScan>> {
        if self.words.is_empty() {
            bail!("at least one --words file is required");
        }
        if !self.images.is_empty() && self.images.len() != self.words.len() {
            bail!(
                "got {} images for {} word lists; pass one image per page or none",
                self.images.len(),
                self.words.len()
            );
        }

        self.words
            .iter()
            .enumerate()
            .map(|(index, path)| {
                let words = load_words(path)?;
                Ok(match self.images.get(index) {
                    Some(image) => PageScan::new(SheetImage::File(image.clone()), words),
                    None => PageScan::words_only(words),
                })
            })
            .collect()
    }
}

fn load_words(path: &Path) -> anyhow::Result<Vec<Word>> {
    let page = OcrPage::from_json_path(path)
        .with_context(|| format!("failed to load word list {}", path.display()))?;
    Ok(page.words)
}

fn segmenter(config: &Config, long: &[u32]) -> anyhow::Result<Segmenter> {
    let segmentation = config
        .segmentation_config()
        .with_question_types(long.iter().map(|&q| (q, AnswerType::Long)));
    Ok(Segmenter::new(segmentation)?)
}

fn segment_all(segmenter: &Segmenter, pages: &[PageScan]) -> anyhow::Result<Vec<SegmentationResult>> {
    pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            segment_scan(segmenter, page)
                .with_context(|| format!("failed to segment page {}", index + 1))
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.validate()?;

    match cli.command {
        Command::Segment { pages, long } => {
            let pages = pages.load()?;
            let results = segment_all(&segmenter(&config, &long)?, &pages)?;
            print_json(&results)
        }
        Command::Merge { pages, long } => {
            let pages = pages.load()?;
            let results = segment_all(&segmenter(&config, &long)?, &pages)?;
            print_json(&merge_pages(&results))
        }
        Command::Grade {
            exam,
            student,
            pages,
        } => {
            let record = ExamRecord::from_json_path(&exam)
                .with_context(|| format!("failed to load exam record {}", exam.display()))?;
            let plan = GradingPlan::from_record(&record)?;
            tracing::info!(
                questions = plan.len(),
                or_groups = plan.or_groups.len(),
                model = config.uses_model(),
                "Exam loaded"
            );
            let grader = grader_from_config(&config, plan)?;

            match student {
                Some(id) => {
                    let submission = record
                        .submission(&id)
                        .with_context(|| format!("no stored submission for student '{}'", id))?;
                    let breakdown = grader.engine().evaluate(grader.plan(), &submission.answers)?;
                    print_json(&breakdown)
                }
                None => print_json(&grader.grade_pages(&pages.load()?)?),
            }
        }
    }
}
