use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use depgraph_core::{
    discovery, recorder, Config, GraphvizRenderer, ImageFormat, RecordOptions, Recorder, Renderer,
};

/// depgraph - Dependency graphs from Ivy resolve reports
#[derive(Parser)]
#[command(name = "depgraph")]
#[command(version)] // Auto-pull version from Cargo.toml
#[command(about = "Draw module dependency graphs from Ivy resolve reports", long_about = None)]
struct Cli {
    /// Build workspace to search for the report and depgraph.toml
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Report to use instead of searching the workspace
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Artifact file stem (defaults to report_<build number>)
    #[arg(short, long)]
    name: Option<String>,

    /// Build number used in the artifact name
    #[arg(long, env = "BUILD_NUMBER")]
    build_number: Option<String>,

    /// Directory for the artifacts (defaults to the report's directory)
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Only draw dependencies the project declares itself
    #[arg(long, conflicts_with = "include_indirect")]
    direct_only: bool,

    /// Also draw dependencies pulled in by other dependencies
    #[arg(long)]
    include_indirect: bool,

    /// Write the DOT file only
    #[arg(long)]
    no_render: bool,

    /// Graphviz executable
    #[arg(long)]
    dot_program: Option<String>,

    /// Image format to render (repeatable)
    #[arg(short, long = "format")]
    formats: Vec<ImageFormat>,

    /// Print the DOT text and dependency count instead of writing files
    #[arg(long)]
    stdout: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    fn apply(&self, config: &mut Config) {
        if self.direct_only {
            config.include_indirect = false;
        }
        if self.include_indirect {
            config.include_indirect = true;
        }
        if self.no_render {
            config.render = false;
        }
        if let Some(program) = &self.dot_program {
            config.dot_program = program.clone();
        }
        if !self.formats.is_empty() {
            config.formats = self.formats.clone();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.workspace)?;
    cli.apply(&mut config);

    let report = match &cli.report {
        Some(path) => path.clone(),
        None => match discovery::find_report(&cli.workspace, &config.report_patterns) {
            Some(path) => path,
            None => bail!(
                "no Ivy report found in {} (patterns: {})",
                cli.workspace.display(),
                config.report_patterns.join(", ")
            ),
        },
    };

    tracing::info!(
        report = %report.display(),
        include_indirect = config.include_indirect,
        "graphing dependency report"
    );

    if cli.stdout {
        let text = std::fs::read_to_string(&report)
            .with_context(|| format!("failed to read report {}", report.display()))?;
        let serialized = recorder::transform(&text, config.include_indirect)?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&serialized)?);
        } else {
            print!("{}", serialized.text);
            eprintln!("{} dependencies", serialized.dependency_count);
        }
        return Ok(());
    }

    let name = cli
        .name
        .clone()
        .unwrap_or_else(|| recorder::artifact_name(cli.build_number.as_deref()));

    let mut options = RecordOptions::from_config(&config);
    options.output_dir = cli.out_dir.clone();

    let graphviz = GraphvizRenderer::new(&config.dot_program);
    let renderer: Option<&dyn Renderer> = if config.render {
        Some(&graphviz)
    } else {
        None
    };

    let artifacts = Recorder::new(options).record(&report, &name, renderer)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&artifacts)?);
    } else {
        println!("{}", artifacts.dot_path.display());
        for image in &artifacts.images {
            println!("{}", image.display());
        }
        println!("{} dependencies", artifacts.dependency_count);
    }

    Ok(())
}
