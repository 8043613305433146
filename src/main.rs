//! slideshot CLI - split HTML presentations into PNG slides

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use slideshot::{Background, BreakDetector, ConvertConfig, Converter, Selection, Viewport};

#[derive(Parser)]
#[command(name = "slideshot")]
#[command(version)]
#[command(about = "Convert HTML presentations into one PNG per slide", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every slide of an HTML presentation to PNG
    Convert {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// CSS selector marking a slide (repeatable); skips detection
        #[arg(short, long = "selector", value_name = "CSS")]
        selectors: Vec<String>,

        /// Use every detected break without asking
        #[arg(short, long, conflicts_with = "selectors")]
        yes: bool,

        /// Render the whole document as a single image
        #[arg(long, conflicts_with_all = ["selectors", "yes"])]
        no_breaks: bool,

        /// Padding color for normalized images (#rrggbb or r,g,b)
        #[arg(long, default_value = "#0a0f1a")]
        background: Background,

        /// Viewport width for section renders
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Viewport height for section renders
        #[arg(long, default_value = "1080")]
        height: u32,

        #[command(flatten)]
        dirs: DirArgs,
    },

    /// List the slide boundaries detected in an HTML file
    Detect {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print candidates as JSON
        #[arg(long)]
        json: bool,

        /// Directory searched first for relative input paths
        #[arg(long, value_name = "DIR", env = "SLIDESHOT_SOURCE_DIR", default_value = "files/source")]
        source_dir: PathBuf,
    },
}

#[derive(Args)]
struct DirArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR", env = "SLIDESHOT_OUTPUT_DIR", default_value = "files/output")]
    output: PathBuf,

    /// Directory searched first for relative input paths
    #[arg(long, value_name = "DIR", env = "SLIDESHOT_SOURCE_DIR", default_value = "files/source")]
    source_dir: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            selectors,
            yes,
            no_breaks,
            background,
            width,
            height,
            dirs,
        } => {
            let selection = if no_breaks {
                Selection::NoBreaks
            } else if !selectors.is_empty() {
                Selection::Explicit(selectors)
            } else if yes {
                Selection::AcceptAll
            } else {
                Selection::Interactive
            };
            let config = ConvertConfig {
                viewport: Viewport { width, height },
                background,
                output_dir: dirs.output,
                source_dir: dirs.source_dir,
                ..Default::default()
            };
            cmd_convert(&input, selection, config)
        }
        Commands::Detect {
            input,
            json,
            source_dir,
        } => cmd_detect(&input, json, &source_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cdp")]
fn cmd_convert(input: &Path, selection: Selection, config: ConvertConfig) -> slideshot::Result<()> {
    use slideshot::Renderer;

    let converter = Converter::new(config);
    let prepared = converter.prepare(input, selection)?;

    let mut renderer =
        slideshot::cdp::CdpRenderer::launch(&converter.config, prepared.viewport(&converter.config))?;
    // On error the renderer is dropped here, which shuts the browser down.
    let conversion = converter.render(&prepared, &mut renderer)?;
    renderer.close()?;

    println!(
        "Created {} image(s) in {}",
        conversion.files.len(),
        conversion.output_dir.display()
    );
    for file in &conversion.files {
        println!("  {}", file.display());
    }
    Ok(())
}

#[cfg(not(feature = "cdp"))]
fn cmd_convert(_input: &Path, _selection: Selection, _config: ConvertConfig) -> slideshot::Result<()> {
    Err(slideshot::Error::ConfigError(
        "slideshot was built without a rendering backend (enable the `cdp` feature)".into(),
    ))
}

fn cmd_detect(input: &Path, json: bool, source_dir: &Path) -> slideshot::Result<()> {
    let path = slideshot::resolve_input(input, source_dir)?;
    let html = std::fs::read_to_string(&path)?;
    let detector = BreakDetector::new(&html);
    let candidates = detector.detect();

    if json {
        let out = serde_json::to_string_pretty(&candidates)
            .map_err(|e| slideshot::Error::Other(format!("JSON serialization failed: {}", e)))?;
        println!("{}", out);
    } else {
        let mut stdout = std::io::stdout();
        slideshot::confirm::display_breaks(&detector, &candidates, &mut stdout)?;
    }
    Ok(())
}
