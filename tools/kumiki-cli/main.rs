use clap::{Parser, ValueEnum};
use kumiki::generator::javascript;
use kumiki::prelude::*;
use kumiki::render::svg;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Which path object variant to draw with.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum RendererCli {
    Basic,
    Geras,
}

impl From<RendererCli> for RendererKind {
    fn from(value: RendererCli) -> Self {
        match value {
            RendererCli::Basic => RendererKind::Basic,
            RendererCli::Geras => RendererKind::Geras,
        }
    }
}

/// Load, arrange, render and export block workspaces
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a saved workspace (JSON, or a binary archive with --archive-input)
    workspace_path: String,

    /// Path to a workspace options JSON file
    #[arg(short, long)]
    options: Option<String>,

    /// Extra block definitions (JSON array) to register on top of the standard library
    #[arg(long)]
    blocks: Option<String>,

    /// Treat the input as a binary archive instead of JSON
    #[arg(long)]
    archive_input: bool,

    /// Renderer variant, overriding the options file
    #[arg(short, long, value_enum)]
    renderer: Option<RendererCli>,

    /// Lay the workspace out right to left
    #[arg(long)]
    rtl: bool,

    /// Arrange the movable stacks in one column before exporting
    #[arg(short, long)]
    cleanup: bool,

    /// Zoom and scroll so all blocks are visible
    #[arg(long)]
    zoom_to_fit: bool,

    /// Write the rendered workspace as SVG
    #[arg(long)]
    svg: Option<String>,

    /// Write the workspace back out as JSON
    #[arg(long)]
    json: Option<String>,

    /// Write the workspace as a binary archive
    #[arg(long)]
    archive: Option<String>,

    /// Print generated JavaScript
    #[arg(long)]
    code: bool,

    /// Print the block tree
    #[arg(short, long)]
    tree: bool,

    /// Print every delivered change event
    #[arg(short, long)]
    events: bool,

    /// Print the measured rows of every block
    #[cfg(feature = "debug-tools")]
    #[arg(long)]
    dump_render: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("\nError: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let total_start = Instant::now();

    let mut registry = BlockRegistry::with_standard_library()?;
    if let Some(path) = &cli.blocks {
        let count = registry.define_json(&fs::read_to_string(path)?)?;
        println!("Registered {} custom block types from '{}'", count, path);
    }

    let mut options = match &cli.options {
        Some(path) => WorkspaceOptions::from_file(path)?,
        None => WorkspaceOptions::default(),
    };
    if let Some(renderer) = cli.renderer {
        options.renderer = renderer.into();
    }
    if cli.rtl {
        options.rtl = true;
    }

    let mut workspace = Workspace::builder(registry).with_options(options).build();

    let load_start = Instant::now();
    let state = if cli.archive_input {
        WorkspaceArchive::from_file(&cli.workspace_path)?.state()?
    } else {
        WorkspaceState::from_json(&fs::read_to_string(&cli.workspace_path)?)?
    };
    let stacks = workspace.load(&state)?;
    println!(
        "Loaded {} stacks ({} blocks) in {:?}",
        stacks.len(),
        workspace.block_count(),
        load_start.elapsed()
    );

    if cli.cleanup {
        workspace.cleanup();
    }
    if cli.zoom_to_fit {
        workspace.zoom_to_fit()?;
    }

    let events = workspace.flush();
    if cli.events {
        println!("\n--- Events ({}) ---", events.len());
        for event in &events {
            println!("{}", EventFormatter::format(event));
        }
    }

    if cli.tree {
        println!("\n--- Block Tree ---");
        print!("{}", DisplayWorkspace::new(&workspace));
    }

    #[cfg(feature = "debug-tools")]
    if cli.dump_render {
        for block in workspace.all_blocks() {
            if let Some(rendered) = workspace.rendered(block.id()) {
                println!("{}", kumiki::render::debug::visualize_render_info(&rendered.info));
            }
        }
    }

    if cli.code {
        let generator = javascript::builder().build();
        println!("\n--- Generated Code ---");
        print!("{}", generator.workspace_to_code(&workspace)?);
    }

    if let Some(path) = &cli.svg {
        fs::write(path, svg::export(&workspace))?;
        println!("Wrote SVG to '{}'", path);
    }
    if let Some(path) = &cli.json {
        fs::write(path, workspace.save_json())?;
        println!("Wrote JSON to '{}'", path);
    }
    if let Some(path) = &cli.archive {
        WorkspaceArchive::from_workspace(&workspace)?.save(path)?;
        println!("Wrote archive to '{}'", path);
    }

    let metrics = workspace.metrics();
    println!(
        "\nViewport: scale {:.2}, top {:.1}, left {:.1}; content {:.0}x{:.0}",
        metrics.scale,
        metrics.view.top,
        metrics.view.left,
        metrics.content.width(),
        metrics.content.height()
    );
    println!("Total time: {:?}", total_start.elapsed());
    Ok(())
}
