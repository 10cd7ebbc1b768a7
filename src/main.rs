//! Command line driver for the export pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bundle_exporter::{
    BundleTarget, ConcatMerger, DiskFileSystem, Exporter, PreviewExportOptions, Project,
    SceneDataGenerator,
};

/// Package an interactive project into a runnable bundle.
#[derive(Debug, Parser)]
#[command(name = "bundle_exporter", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Export a browser preview bundle.
    Preview {
        /// Project description JSON file.
        project: PathBuf,
        /// Directory that receives the preview bundle.
        #[arg(long)]
        out: PathBuf,
        /// Root of the runtime distribution.
        #[arg(long)]
        runtime_root: PathBuf,
        /// Cache directory for generated code; defaults next to the output.
        #[arg(long)]
        code_cache: Option<PathBuf>,
        /// Scene to run first.
        #[arg(long)]
        scene: Option<String>,
        /// Debugger server as host:port.
        #[arg(long)]
        debugger: Option<String>,
        /// Rewrite only the project data file.
        #[arg(long)]
        data_only: bool,
    },
    /// Export a packaged bundle for a deployment shell.
    Package {
        /// Project description JSON file.
        project: PathBuf,
        /// Deployment shell to package for.
        #[arg(long, value_enum)]
        target: TargetArg,
        /// Directory that receives the packaged output.
        #[arg(long)]
        out: PathBuf,
        /// Root of the runtime distribution.
        #[arg(long)]
        runtime_root: PathBuf,
        /// Merge and minify mergeable modules into one artifact.
        #[arg(long)]
        minify: bool,
    },
    /// Export only the project data file.
    Data {
        /// Project description JSON file.
        project: PathBuf,
        /// Path of the data file to write.
        #[arg(long)]
        out: PathBuf,
        /// Runtime options JSON embedded alongside the project data.
        #[arg(long, default_value = "{}")]
        options: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetArg {
    Preview,
    Mobile,
    Desktop,
    Social,
}

impl From<TargetArg> for BundleTarget {
    fn from(value: TargetArg) -> Self {
        match value {
            TargetArg::Preview => BundleTarget::Preview,
            TargetArg::Mobile => BundleTarget::MobileShell,
            TargetArg::Desktop => BundleTarget::DesktopShell,
            TargetArg::Social => BundleTarget::SocialShell,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let fs = DiskFileSystem;
    let generator = SceneDataGenerator;
    let merger = ConcatMerger;

    match cli.command {
        Command::Preview {
            project,
            out,
            runtime_root,
            code_cache,
            scene,
            debugger,
            data_only,
        } => {
            let project = load_project(&project)?;
            let code_cache = code_cache.unwrap_or_else(|| out.join(".code-cache"));
            let exporter = Exporter::new(&fs, &generator, &merger, runtime_root, code_cache);

            let mut options = PreviewExportOptions::new(&out);
            if let Some(scene) = scene {
                options = options.with_initial_scene(scene);
            }
            if let Some(endpoint) = debugger {
                let (address, port) = parse_endpoint(&endpoint)?;
                options = options.with_debugger(address, port);
            }
            if data_only {
                options = options.data_only();
            }

            let report = exporter.export_for_preview(&project, &options)?;
            println!(
                "Preview exported: {} ({} modules)",
                report.entry_point.display(),
                report.modules.len()
            );
        }
        Command::Package {
            project,
            target,
            out,
            runtime_root,
            minify,
        } => {
            let project = load_project(&project)?;
            let code_cache = out.join(".code-cache");
            let exporter = Exporter::new(&fs, &generator, &merger, runtime_root, code_cache);

            let report =
                exporter.export_for_packaged_target(target.into(), &project, &out, minify)?;
            println!(
                "Bundle exported: {} ({} modules)",
                report.entry_point.display(),
                report.modules.len()
            );
        }
        Command::Data {
            project,
            out,
            options,
        } => {
            let project = load_project(&project)?;
            let exporter = Exporter::new(&fs, &generator, &merger, ".", ".");
            exporter.export_project_data(&project, &out, &options)?;
            println!("Project data exported: {}", out.display());
        }
    }

    Ok(())
}

fn load_project(path: &PathBuf) -> Result<Project> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read project file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse project file {}", path.display()))
}

fn parse_endpoint(value: &str) -> Result<(String, u16)> {
    let (address, port) = value
        .rsplit_once(':')
        .ok_or_else(|| anyhow!("debugger endpoint must be host:port, got '{}'", value))?;
    let port = port
        .parse::<u16>()
        .with_context(|| format!("invalid debugger port in '{}'", value))?;
    Ok((address.to_string(), port))
}
