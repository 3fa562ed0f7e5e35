use clap::{Parser, Subcommand, ValueEnum};
use lesson_plan::app::{self, Action, AppState, Step};
use lesson_plan::cache::{self, CacheStatus, PlanCache};
use lesson_plan::compose::{DocumentTree, compose};
use lesson_plan::config::{self, AppConfig};
use lesson_plan::export::{ChromeRasterizer, PdfExporter, PdfOptions, export_word};
use lesson_plan::types::{Metadata, PdfFile, Plan};
use lesson_plan::view::{self, ViewState};
use lesson_plan::{generation, output};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that call the generation service.
#[derive(clap::Args, Clone)]
struct CacheArgs {
    /// Skip the plan cache and always call the generation service
    #[arg(long)]
    no_cache: bool,
}

/// Inputs for generation.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Metadata file (.toml or .json)
    #[arg(long)]
    metadata: PathBuf,

    /// Lesson material to generate from
    #[arg(long)]
    pdf: PathBuf,
}

/// Inputs for commands that work from an existing plan.
#[derive(clap::Args, Clone)]
struct PlanArgs {
    /// Metadata file (.toml or .json)
    #[arg(long)]
    metadata: PathBuf,

    /// Generated plan (plan.json)
    #[arg(long)]
    plan: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Word,
    Pdf,
    All,
}

#[derive(Parser)]
#[command(name = "lesson-plan")]
#[command(about = "Generate multi-day math lesson plans from lesson material")]
#[command(long_about = "\
Generate multi-day math lesson plans from lesson material

A lesson PDF and the teacher's metadata go to a generative model, which
returns a structured plan: general information plus one plan per selected
day, each with the same seven blocks. The plan is rendered as an
interactive page with one tab per day and exported as PDF and Word.

Metadata file (TOML or JSON, camelCase keys):

  grade = \"Grade 8\"
  semester = \"Fall\"
  weekNumber = \"12\"
  startDate = \"2026-11-02\"
  endDate = \"2026-11-06\"
  selectedDays = [\"Monday\", \"Wednesday\"]
  lessonTitle = \"Quadratic Functions\"
  ccssCode = \"8.EE.C.7\"
  teacherName = \"A. Rivera\"
  hodName = \"J. Okafor\"
  unitName = \"Unit 4: Functions\"

Outputs (in --output):

  plan.json                        generated plan
  index.html                       interactive view
  <Title>_LessonPlan.doc           Word document
  <Title>_LessonPlan.pdf           PDF (or <Title>_LessonPlan.print.html)

The API key is read from GEMINI_API_KEY. Run 'lesson-plan gen-config' to
generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Directory for intermediate files (plan cache)
    #[arg(long, default_value = ".lesson-plan-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a plan from lesson material and metadata
    Generate {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Render the interactive page for a generated plan
    Render(PlanArgs),
    /// Export a generated plan as Word and/or PDF
    Export {
        #[command(flatten)]
        plan: PlanArgs,
        /// Which documents to write
        #[arg(long, value_enum, default_value = "all")]
        format: ExportFormat,
    },
    /// Run the full pipeline: generate → render → export
    Build {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        cache: CacheArgs,
    },
    /// Validate metadata (and optionally a plan) without generating
    Check {
        /// Metadata file (.toml or .json)
        #[arg(long)]
        metadata: PathBuf,
        /// Generated plan to check against the metadata
        #[arg(long)]
        plan: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Generate { source, cache } => {
            let config = config::load_config(&cli.config_dir)?;
            let metadata = Metadata::load(&source.metadata)?;
            run_generate(&cli, &config, metadata, &source.pdf, cache.no_cache)?;
        }
        Command::Render(args) => {
            let config = config::load_config(&cli.config_dir)?;
            let (metadata, plan) = load_plan_inputs(args)?;
            let doc = compose(&metadata, &plan);
            run_render(&cli, &config, &doc)?;
        }
        Command::Export { plan, format } => {
            let config = config::load_config(&cli.config_dir)?;
            let (metadata, plan) = load_plan_inputs(plan)?;
            let doc = compose(&metadata, &plan);
            run_export(&cli, &config, &doc, *format)?;
        }
        Command::Build { source, cache } => {
            let config = config::load_config(&cli.config_dir)?;
            let metadata = Metadata::load(&source.metadata)?;

            println!("==> Stage 1: Generating plan");
            let plan = run_generate(&cli, &config, metadata.clone(), &source.pdf, cache.no_cache)?;
            let doc = compose(&metadata, &plan);

            println!("==> Stage 2: Rendering view");
            run_render(&cli, &config, &doc)?;

            println!("==> Stage 3: Exporting");
            run_export(&cli, &config, &doc, ExportFormat::All)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check { metadata, plan } => {
            let metadata = Metadata::load(metadata)?;
            let plan = plan.as_deref().map(Plan::load).transpose()?;
            let doc = plan.as_ref().map(|p| compose(&metadata, p));
            output::print_check_output(&metadata, doc.as_ref());
            metadata.validate()?;
            println!("==> Inputs are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn load_plan_inputs(args: &PlanArgs) -> Result<(Metadata, Plan), Box<dyn Error>> {
    let metadata = Metadata::load(&args.metadata)?;
    let plan = Plan::load(&args.plan)?;
    Ok((metadata, plan))
}

/// Generate a plan through the app state machine, with the plan cache in
/// front of the generation service. Writes `plan.json` to the output dir.
#[cfg(feature = "gemini")]
fn run_generate(
    cli: &Cli,
    config: &AppConfig,
    metadata: Metadata,
    pdf_path: &Path,
    no_cache: bool,
) -> Result<Plan, Box<dyn Error>> {
    metadata.validate()?;
    let pdf = PdfFile::open(pdf_path)?;
    let model = config.generation.model.as_str();
    let plan_cache = PlanCache::new(&cli.temp_dir);
    let key = cache::plan_key(&pdf, &metadata, model)?;

    let mut status = CacheStatus::Miss;
    let mut detail = None;

    let state = AppState::with_metadata(metadata);
    let state = app::update(state, Action::Next);
    let state = app::update(state, Action::SelectFile(pdf));
    let state = app::run_generation_with(state, config.plan.day_order, |metadata, pdf| {
        let (plan, cache_status) = plan_cache
            .get_or_generate(&key, model, no_cache, || {
                let generator = generation::GeminiClient::from_config(&config.generation)?;
                generation::generate_plan(&generator, metadata, pdf)
            })
            .inspect_err(|e| detail = Some(e.to_string()))?;
        status = cache_status;
        Ok(plan)
    });

    match state {
        AppState {
            step: Step::Result,
            plan: Some(plan),
            ..
        } => {
            std::fs::create_dir_all(&cli.output)?;
            let path = cli.output.join("plan.json");
            std::fs::write(&path, serde_json::to_string_pretty(&plan)?)?;
            output::print_generate_output(&plan, status, &path);
            Ok(plan)
        }
        AppState { error, .. } => {
            let banner = error.unwrap_or_else(|| app::GENERATION_FAILED_MESSAGE.to_string());
            output::print_generation_failure(&banner, detail.as_deref());
            Err(banner.into())
        }
    }
}

#[cfg(not(feature = "gemini"))]
fn run_generate(
    _cli: &Cli,
    _config: &AppConfig,
    _metadata: Metadata,
    _pdf_path: &Path,
    _no_cache: bool,
) -> Result<Plan, Box<dyn Error>> {
    Err("plan generation needs the `gemini` feature".into())
}

fn run_render(cli: &Cli, config: &AppConfig, doc: &DocumentTree<'_>) -> Result<(), Box<dyn Error>> {
    let theme_css = config::generate_theme_css(&config.theme);
    let state = ViewState::new(doc);
    let html = view::render_view(doc, &state, &theme_css).into_string();
    std::fs::create_dir_all(&cli.output)?;
    let path = cli.output.join("index.html");
    std::fs::write(&path, html)?;
    output::print_render_output(doc.title, &path);
    Ok(())
}

fn run_export(
    cli: &Cli,
    config: &AppConfig,
    doc: &DocumentTree<'_>,
    format: ExportFormat,
) -> Result<(), Box<dyn Error>> {
    if matches!(format, ExportFormat::Word | ExportFormat::All) {
        let path = export_word(doc).write_to(&cli.output)?;
        output::print_word_output(&path);
    }
    if matches!(format, ExportFormat::Pdf | ExportFormat::All) {
        let theme_css = config::generate_theme_css(&config.theme);
        let exporter = PdfExporter::new(
            ChromeRasterizer::new(config.pdf.settle_ms),
            PdfOptions::from_config(&config.pdf),
        );
        let outcome = exporter.export(doc, &ViewState::new(doc), &theme_css, &cli.output)?;
        output::print_pdf_outcome(&outcome);
    }
    Ok(())
}
