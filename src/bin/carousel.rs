use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use carousel_forge::{
    AppState, CarouselGenerator, CarouselMode, CarouselRequest, Config, CpuRenderer, FontBook,
    HttpCompletionClient, SlideRecord, SlideStore,
};

#[derive(Parser, Debug)]
#[command(name = "carousel", version)]
struct Cli {
    /// JSON config file; environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render slides to PNG files and optionally a ZIP bundle.
    Render(RenderArgs),
    /// Draft slides for a topic with the text-completion backend.
    Generate(GenerateArgs),
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Inspect or edit a persisted slide list.
    Slides(SlidesArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Slides JSON: `{"slides": [...]}`, a bare array or a single slide.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `slide-NN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Also write every slide into this ZIP file.
    #[arg(long)]
    zip: Option<PathBuf>,

    /// Output scale (1 = 1080×1080, at most 4).
    #[arg(long)]
    scale: Option<f32>,

    /// Font file to register (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    #[arg(long)]
    topic: String,

    /// listicle, educational, storytelling, tips or quotes; anything else is general.
    #[arg(long, default_value = "general")]
    mode: String,

    /// Number of slides (1..=20).
    #[arg(long, default_value_t = 5)]
    count: u32,

    #[arg(long, default_value = "professional")]
    tone: String,

    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address, e.g. `127.0.0.1:3000`.
    #[arg(long)]
    addr: Option<String>,

    /// Font file to register (repeatable).
    #[arg(long = "font")]
    fonts: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct SlidesArgs {
    /// Snapshot file; defaults to the configured persistence path.
    #[arg(long)]
    state: Option<PathBuf>,

    #[command(subcommand)]
    action: SlidesAction,
}

#[derive(Subcommand, Debug)]
enum SlidesAction {
    /// Print the slide list.
    List,
    /// Append a slide.
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    /// Duplicate the slide with `--id`.
    Duplicate {
        #[arg(long)]
        id: String,
    },
    /// Delete the slide with `--id` (the last slide is never deleted).
    Delete {
        #[arg(long)]
        id: String,
    },
}

/// `RUST_LOG` controls levels (default `info`); `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Render(args) => cmd_render(&config, args),
        Command::Generate(args) => cmd_generate(&config, args),
        Command::Serve(args) => cmd_serve(&config, args),
        Command::Slides(args) => cmd_slides(&config, args),
    }
}

fn font_book(config: &Config, extra: &[PathBuf]) -> anyhow::Result<FontBook> {
    let paths = if extra.is_empty() {
        config.render.fonts.as_slice()
    } else {
        extra
    };
    Ok(FontBook::from_paths(paths)?)
}

fn read_slides_json(path: &Path) -> anyhow::Result<Vec<SlideRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open slides '{}'", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| "parse slides JSON")?;
    let slides: Vec<SlideRecord> = match value {
        serde_json::Value::Object(mut obj) if obj.contains_key("slides") => {
            serde_json::from_value(obj.remove("slides").unwrap_or_default())?
        }
        array @ serde_json::Value::Array(_) => serde_json::from_value(array)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(slides)
}

fn cmd_render(config: &Config, args: RenderArgs) -> anyhow::Result<()> {
    let slides = read_slides_json(&args.in_path)?;
    if slides.is_empty() {
        anyhow::bail!("'{}' contains no slides", args.in_path.display());
    }
    let fonts = font_book(config, &args.fonts)?;
    let scale = args.scale.unwrap_or(config.render.scale);
    let mut renderer = CpuRenderer::new(&fonts, scale)?;

    let pngs = carousel_forge::render_pngs(&mut renderer, &slides)?;
    let written = carousel_forge::save_pngs(&pngs, &args.out_dir)?;
    for p in &written {
        eprintln!("wrote {}", p.display());
    }

    if let Some(zip_path) = &args.zip {
        let bytes = carousel_forge::zip_pngs(&pngs)?;
        if let Some(parent) = zip_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(zip_path, bytes)
            .with_context(|| format!("write zip '{}'", zip_path.display()))?;
        eprintln!("wrote {}", zip_path.display());
    }
    Ok(())
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")
}

fn cmd_generate(config: &Config, args: GenerateArgs) -> anyhow::Result<()> {
    let request = CarouselRequest {
        topic: args.topic,
        mode: CarouselMode::from_name(&args.mode),
        slide_count: args.count,
        tone: args.tone,
    };
    let generator =
        CarouselGenerator::new(Arc::new(HttpCompletionClient::new(&config.generation)));
    let slides = runtime()?.block_on(generator.generate(&request))?;

    let json = serde_json::to_vec_pretty(&serde_json::json!({ "slides": slides }))?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write slides '{}'", args.out.display()))?;
    eprintln!("wrote {} slides to {}", slides.len(), args.out.display());
    Ok(())
}

fn cmd_serve(config: &Config, args: ServeArgs) -> anyhow::Result<()> {
    let fonts = font_book(config, &args.fonts)?;
    if fonts.is_empty() {
        tracing::warn!("no fonts registered; slides with text will fail to render");
    }
    let client = HttpCompletionClient::new(&config.generation);
    if !client.is_configured() {
        tracing::warn!("no API key configured; /api/generate-carousel will return 503");
    }
    let state = AppState {
        generator: CarouselGenerator::new(Arc::new(client)),
        fonts: Arc::new(fonts),
        scale: config.render.scale,
        max_body_bytes: config.server.max_body_bytes,
    };
    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    runtime()?.block_on(carousel_forge::serve(&addr, state))?;
    Ok(())
}

fn cmd_slides(config: &Config, args: SlidesArgs) -> anyhow::Result<()> {
    let path = args
        .state
        .unwrap_or_else(|| config.persistence.path.clone());
    let mut store = carousel_forge::load_snapshot(&path)?.unwrap_or_default();

    let mutated = match args.action {
        SlidesAction::List => false,
        SlidesAction::Add { title, content } => {
            match (title, content) {
                (None, None) => store.add_blank(),
                (title, content) => store.add(SlideRecord::with_text(
                    "",
                    title.unwrap_or_default(),
                    content.unwrap_or_default(),
                )),
            };
            true
        }
        SlidesAction::Duplicate { id } => {
            require_slide(&store, &id)?;
            store.duplicate(&id);
            true
        }
        SlidesAction::Delete { id } => {
            require_slide(&store, &id)?;
            let before = store.len();
            store.delete(&id);
            if store.len() == before {
                eprintln!("kept '{id}': a carousel needs at least one slide");
            }
            true
        }
    };

    if mutated {
        carousel_forge::save_snapshot(&path, &store, config.persistence.limits())?;
    }
    print_slides(&store);
    Ok(())
}

fn require_slide(store: &SlideStore, id: &str) -> anyhow::Result<()> {
    if store.get(id).is_none() {
        anyhow::bail!("no slide with id '{id}'");
    }
    Ok(())
}

fn print_slides(store: &SlideStore) {
    for (i, s) in store.slides().iter().enumerate() {
        let marker = if i == store.current_index() { '*' } else { ' ' };
        println!("{marker} {:>2}  {:<10} {}", i + 1, s.id, s.title);
    }
}
