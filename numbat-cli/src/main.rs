//! Numbat CLI
//!
//! Lays out a JSON markup event stream and prints the resulting primitive
//! tree or display list.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use numbat_common::Fx;
use numbat_common::warning::warning_count;
use numbat_css::Rgba;
use numbat_display::{DisplayCommand, DisplayTree, PrimitiveId, PrimitiveKind};
use numbat_layout::{Event, LayoutConfig, Session};
use owo_colors::OwoColorize;

/// Numbat: incremental flow layout for small displays
#[derive(Parser, Debug)]
#[command(name = "numbat")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the primitive tree for an event stream
    numbat events.json

    # Narrow viewport, JSON output
    numbat --width 128 --height 64 --json events.json

    # Flattened drawing commands
    numbat --display-list events.json

    # Read events from stdin
    echo '[{"start":{"tag":"div"}},{"text":"Hi"},{"end":"div"},"complete"]' | numbat -
"#)]
struct Cli {
    /// JSON array of events, or `-` for stdin
    #[arg(value_name = "EVENTS")]
    events: PathBuf,

    /// Layout configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Viewport width in px
    #[arg(long)]
    width: Option<i32>,

    /// Viewport height in px
    #[arg(long)]
    height: Option<i32>,

    /// Base URL for relative image references
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Maximum number of primitives
    #[arg(long)]
    limit: Option<usize>,

    /// Print the flattened display list instead of the tree
    #[arg(long)]
    display_list: bool,

    /// Emit JSON instead of the annotated listing
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let events = load_events(&cli.events)?;
    log::info!(
        target: "numbat",
        "laying out {} events at {}x{}",
        events.len(),
        config.viewport_width,
        config.viewport_height
    );

    let mut session = Session::with_fixed_pitch(&config);
    let outcome = session.run(&events);

    if cli.display_list {
        print_display_list(&session, cli.json)?;
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&session.tree().view())?);
    } else {
        println!(
            "=== Primitive Tree (viewport: {}x{}) ===\n",
            config.viewport_width, config.viewport_height
        );
        print_children(session.tree(), None, 0);
    }

    let warnings = warning_count();
    if warnings > 0 && !cli.json {
        println!("\n{} distinct warnings, see log output", warnings.yellow());
    }

    outcome.context("layout aborted, tree above is partial")
}

/// Defaults, then the config file, then command-line overrides.
fn load_config(cli: &Cli) -> Result<LayoutConfig> {
    let mut config = match &cli.config {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    if let Some(width) = cli.width {
        config.viewport_width = Fx::from_whole(width);
    }
    if let Some(height) = cli.height {
        config.viewport_height = Fx::from_whole(height);
    }
    if cli.base_url.is_some() {
        config.base_url.clone_from(&cli.base_url);
    }
    if cli.limit.is_some() {
        config.primitive_limit = cli.limit;
    }
    config.validate()?;
    Ok(config)
}

fn load_events(path: &Path) -> Result<Vec<Event>> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        let _ = io::stdin()
            .read_to_string(&mut buf)
            .context("cannot read events from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("cannot read events from {}", path.display()))?
    };
    serde_json::from_str(&json).context("events must be a JSON array of events")
}

fn hex(color: Rgba) -> String {
    format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
}

/// Recursively print primitives with their boxes (relative to the parent).
fn print_children(tree: &DisplayTree, parent: Option<PrimitiveId>, depth: usize) {
    let indent = "  ".repeat(depth);
    for &id in tree.children(parent) {
        let Some(node) = tree.get(id) else {
            continue;
        };
        let b = node.bbox;
        let name = match &node.kind {
            PrimitiveKind::Rect { color, .. } => format!("{} {}", "rect".cyan(), hex(*color)),
            PrimitiveKind::Text(run) => {
                let preview: String = run.text.chars().take(30).collect();
                let suffix = if run.text.chars().count() > 30 { "..." } else { "" };
                format!("{} \"{preview}{suffix}\"", "text".green())
            }
            PrimitiveKind::Image(image) if image.deferred => {
                format!("{} {} (deferred)", "image".magenta(), image.url)
            }
            PrimitiveKind::Image(image) => format!("{} {}", "image".magenta(), image.url),
        };
        let tag = node
            .id_tag
            .as_ref()
            .map(|t| format!(" #{t}"))
            .unwrap_or_default();
        let runon = if node.runon { " +runon" } else { "" };
        println!("{indent}[{}] {name}{tag}{}", id.0, runon.dimmed());
        println!("{indent}  x={} y={} w={} h={}", b.x, b.y, b.w, b.h);
        print_children(tree, Some(id), depth + 1);
    }
}

fn print_display_list(session: &Session, json: bool) -> Result<()> {
    let list = session.display_list();
    if json {
        println!("{}", serde_json::to_string_pretty(list.commands())?);
        return Ok(());
    }
    println!("=== Display List ({} commands) ===\n", list.len());
    for command in list.commands() {
        match command {
            DisplayCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
                ..
            } => println!(
                "{} {x},{y} {width}x{height} {}",
                "fill".cyan(),
                hex(*color)
            ),
            DisplayCommand::DrawText {
                x,
                y,
                baseline,
                text,
                ..
            } => println!("{} {x},{y} baseline {baseline} {text:?}", "text".green()),
            DisplayCommand::DrawImage {
                x,
                y,
                width,
                height,
                src,
            } => println!("{} {x},{y} {width}x{height} {src}", "image".magenta()),
        }
    }
    Ok(())
}
