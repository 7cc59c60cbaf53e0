use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reportview::chart::ChartJsEngine;
use reportview::client::HttpReportService;
use reportview::config::{Config, DEFAULT_CONFIG_PATH};
use reportview::directive::extract;
use reportview::markdown::PulldownEngine;
use reportview::report::page::{FollowUpExchange, render_page};
use reportview::report::{RenderState, RenderSummary, Report, ReportRenderer};
use reportview::session::SessionController;
use reportview::surface::ReportSurface;

#[derive(Parser)]
#[command(name = "reportview")]
#[command(about = "Render generated health reports with embedded charts", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a report for an area and write it as an HTML page.
    Research {
        area: String,

        /// Follow-up question, asked after the report renders. Repeatable.
        #[arg(long)]
        ask: Vec<String>,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Render a saved `/research` response.
    Render {
        payload: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// List the chart directives found in a markdown file.
    Inspect { file: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;

    match cli.cmd {
        Commands::Research { area, ask, out } => {
            research(&config, &area, &ask, out.as_deref().unwrap_or(&config.output_path)).await
        }
        Commands::Render { payload, out } => {
            render(&config, &payload, out.as_deref().unwrap_or(&config.output_path))
        }
        Commands::Inspect { file } => inspect(&file),
    }
}

fn renderer(config: &Config, engine: &ChartJsEngine) -> ReportRenderer {
    ReportRenderer::new(
        Box::new(PulldownEngine::new(config.markdown)),
        Box::new(engine.clone()),
        config.correlation,
    )
}

async fn research(config: &Config, area: &str, questions: &[String], out: &str) -> Result<()> {
    let service = HttpReportService::new(&config.base_url, config.request_timeout())
        .context("failed to build HTTP client")?;
    let engine = ChartJsEngine::new();
    let mut session = SessionController::new(service, renderer(config, &engine));

    let outcome = session.submit_research(area).await;
    if let Ok(summary) = &outcome {
        log_summary(summary);
    }

    let mut exchanges = Vec::with_capacity(questions.len());
    if outcome.is_ok() {
        for question in questions {
            if let Err(e) = session.submit_follow_up(question).await {
                warn!("Follow-up {question:?} failed: {e}");
            }
            let pane = session.follow_up();
            exchanges.push(FollowUpExchange {
                question: question.clone(),
                answer_html: pane.answer_html().to_string(),
                error: pane.error().map(str::to_string),
            });
        }
    }

    let html = render_page(session.surface(), &exchanges, &engine.bootstrap_script());
    write_page(out, &html)?;

    outcome.map(|_| ()).context("report generation failed")
}

fn render(config: &Config, payload: &str, out: &str) -> Result<()> {
    let data = std::fs::read_to_string(payload)
        .with_context(|| format!("failed to read payload: {payload}"))?;
    let report: Report = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse payload: {payload}"))?;

    let engine = ChartJsEngine::new();
    let mut renderer = renderer(config, &engine);
    let mut state = RenderState::default();
    let mut surface = ReportSurface::default();

    let outcome = renderer.render(&report, &mut state, &mut surface);
    if let Ok(summary) = &outcome {
        log_summary(summary);
    }

    let html = render_page(&surface, &[], &engine.bootstrap_script());
    write_page(out, &html)?;

    outcome.map(|_| ()).context("report rendering failed")
}

fn inspect(file: &str) -> Result<()> {
    let text =
        std::fs::read_to_string(file).with_context(|| format!("failed to read: {file}"))?;

    let mut count = 0;
    for directive in extract(&text) {
        count += 1;
        println!(
            "#{} [{}..{}] {} {:?}",
            directive.ordinal,
            directive.span.start,
            directive.span.end,
            directive.chart_type,
            directive.title
        );
        match directive.labels() {
            Ok(labels) => println!("    labels: {labels:?}"),
            Err(e) => println!("    labels: invalid ({e}): {}", directive.labels_raw),
        }
        match directive.data() {
            Ok(data) => println!("    data:   {data:?}"),
            Err(e) => println!("    data:   invalid ({e}): {}", directive.data_raw),
        }
        if let Some(source) = directive.source {
            println!("    source: {source}");
        }
    }

    info!("{count} chart directive(s) in {file}");
    Ok(())
}

fn log_summary(summary: &RenderSummary) {
    if summary.upstream_error {
        warn!("Report generation failed upstream; error shown in report body");
    }
    for (id, e) in &summary.failed {
        warn!("Chart {id} failed: {e}");
    }
    for diagnostic in &summary.diagnostics {
        warn!("{diagnostic}");
    }
}

fn write_page(out: &str, html: &str) -> Result<()> {
    let parent = std::path::Path::new(out).parent();
    if let Some(parent) = parent.filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, html).with_context(|| format!("failed to write {out}"))?;
    info!("Wrote {out}");
    Ok(())
}
