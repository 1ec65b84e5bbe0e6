use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use stitchview::api;
use stitchview::models::{
    AppConfig, GenerationForm, GenerationResponse, ImageUpload, Notice,
};
use stitchview::rendering::{LegendChip, PreviewRenderer, SwatchStyle};
use stitchview::server;
use stitchview::services::{
    HttpBackend, Operation, PipelineError, PreviewPipeline, PreviewSession,
};

#[derive(Parser)]
#[command(name = "stitchview")]
#[command(about = "Stitchview - needlepoint pattern previews")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the preview HTTP server
    Serve,
    /// Render a saved generation response to a PNG file
    Render {
        /// Generation response JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Length of the longer side in pixels (default from config)
        #[arg(short, long)]
        target: Option<f32>,

        /// Also write the color legend to this PNG file
        #[arg(short, long)]
        legend: Option<PathBuf>,
    },
    /// Upload an image to the generation server and render the result
    Generate {
        /// Source image
        #[arg(short, long)]
        image: PathBuf,

        /// Mesh count (stitches per inch)
        #[arg(short, long)]
        mesh: Option<String>,

        /// Canvas size in stitches, "WxH" or "fit"
        #[arg(short, long)]
        canvas: Option<String>,

        /// Maximum number of thread colors (0 = unlimited)
        #[arg(long)]
        max_colors: Option<String>,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Save the pattern on the server under this name
        #[arg(long)]
        save_as: Option<String>,

        /// Folder to save into
        #[arg(long)]
        folder: Option<String>,

        /// Create a folder with this name and save into it
        #[arg(long)]
        new_folder: Option<String>,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stitchview API",
        description = "Needlepoint pattern preview rendering",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(api::handle_preview, api::handle_preview_image),
    components(schemas(
        api::PreviewJsonResponse,
        api::preview::PreviewErrorResponse,
        stitchview::models::GenerationResponse,
        stitchview::rendering::LegendChip,
    )),
    tags((name = "Preview", description = "Pattern preview rendering"))
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Render {
            input,
            output,
            target,
            legend,
        }) => run_render_command(&input, &output, target, legend.as_deref()),
        Some(Commands::Generate {
            image,
            mesh,
            canvas,
            max_colors,
            output,
            save_as,
            folder,
            new_folder,
        }) => {
            let form = GenerateArgs {
                mesh,
                canvas,
                max_colors,
                save_as,
                folder,
                new_folder,
            };
            run_generate_command(&image, &output, form).await
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI commands
fn init_cli_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchview=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn load_config() -> AppConfig {
    let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
    AppConfig::load(config_file.as_deref())
}

fn print_legend(chips: &[LegendChip]) {
    for chip in chips {
        println!("  {} {}  ({} stitches)", chip.hex, chip.title, chip.stitches);
    }
}

/// Render a saved generation response (no server needed)
fn run_render_command(
    input: &Path,
    output: &Path,
    target: Option<f32>,
    legend: Option<&Path>,
) -> anyhow::Result<()> {
    init_cli_logging();
    let config = load_config();

    let body = std::fs::read(input)?;
    let preview = GenerationResponse::from_slice(&body)?.into_preview()?;

    let mut session = PreviewSession::new(PreviewRenderer::from_config(&config.preview)?);
    if let Some(target) = target {
        session.set_target(target)?;
    }

    let current = session.replace(preview)?;
    let stats = current.stats.clone();
    session.surface().save_png(output)?;

    println!(
        "Rendered {} ({}x{} px, {} x {} stitches, {} colors)",
        output.display(),
        session.surface().width(),
        session.surface().height(),
        stats.cols,
        stats.rows,
        stats.distinct_colors
    );
    print_legend(session.legend().chips());

    if let Some(path) = legend {
        let surface = session
            .legend()
            .render(SwatchStyle::from_config(&config.preview))?;
        surface.save_png(path)?;
        println!("Legend written to {}", path.display());
    }

    Ok(())
}

struct GenerateArgs {
    mesh: Option<String>,
    canvas: Option<String>,
    max_colors: Option<String>,
    save_as: Option<String>,
    folder: Option<String>,
    new_folder: Option<String>,
}

fn notice_error(err: PipelineError, operation: Operation) -> anyhow::Error {
    tracing::debug!(error = %err, ?operation, "Pipeline step failed");
    let notice = err.to_notice(operation);
    anyhow::anyhow!(notice.message)
}

/// Run the full generate → render → save workflow against the backend
async fn run_generate_command(
    image: &Path,
    output: &Path,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    init_cli_logging();
    let config = load_config();
    let defaults = &config.defaults;

    let mut form = GenerationForm::preset(
        defaults.mesh_count,
        defaults.canvas_size.clone(),
        defaults.max_colors,
    );
    if let Some(mesh) = args.mesh {
        form.mesh_count = mesh;
    }
    if let Some(canvas) = args.canvas {
        form.canvas_size = canvas;
    }
    if let Some(max_colors) = args.max_colors {
        form.max_colors = max_colors;
    }
    let params = form
        .validate()
        .map_err(|e| notice_error(e.into(), Operation::Generate))?;

    let bytes = std::fs::read(image)?;
    let file_name = image
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let upload = ImageUpload::new(file_name, bytes, config.upload.max_file_bytes)
        .map_err(|e| notice_error(e.into(), Operation::Generate))?;

    let backend = HttpBackend::new(&config.backend)?;
    let session = PreviewSession::new(PreviewRenderer::from_config(&config.preview)?);
    let mut pipeline = PreviewPipeline::new(backend, session);

    println!(
        "Uploading {} ({}) to {}",
        upload.file_name,
        upload.size_label(),
        pipeline.backend().base_url()
    );

    let report = pipeline
        .generate(&upload, &params)
        .await
        .map_err(|e| notice_error(e, Operation::Generate))?;
    println!("{}", report.notice);
    if let Some(canvas) = &report.canvas_size {
        println!("  canvas {canvas}, mesh {}", report.mesh_count.unwrap_or(params.mesh_count));
    }
    print_legend(&report.legend);
    if !report.audit.is_clean() {
        println!(
            "  palette mismatch: unused {:?}, missing {:?}",
            report.audit.unreferenced, report.audit.dangling
        );
    }

    let png = pipeline
        .download()
        .map_err(|e| notice_error(e, Operation::Download))?;
    std::fs::write(output, &png)?;
    println!("Rendered {} ({} bytes)", output.display(), png.len());

    let mut folder = args.folder;
    if let Some(name) = args.new_folder {
        let created = pipeline
            .create_folder(&name)
            .await
            .map_err(|e| notice_error(e, Operation::CreateFolder))?;
        println!("{}", created.notice);
        folder = Some(created.folder_id);
    }

    if let Some(name) = args.save_as {
        let saved = pipeline
            .save(&name, folder.as_deref())
            .await
            .map_err(|e| notice_error(e, Operation::Save))?;
        println!("{}", saved.notice);
        println!("  view at {}{}", pipeline.backend().base_url(), saved.saved.redirect);
    } else {
        let name = upload.default_pattern_name();
        println!("{}", Notice::info(format!("Not saved; use --save-as \"{name}\" to keep it")));
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let backend = std::env::var("STITCHVIEW_BACKEND").ok();

    println!("Stitchview v{VERSION}");
    println!("Needlepoint pattern preview renderer\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR          = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE        = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  STITCHVIEW_BACKEND = {}",
        backend.as_deref().unwrap_or("(not set)")
    );

    let config_source = match config_file {
        Some(path) if Path::new(&path).exists() => path,
        Some(_) => "defaults (file not found)".to_string(),
        None if Path::new(stitchview::models::config::DEFAULT_CONFIG_FILE).exists() => {
            stitchview::models::config::DEFAULT_CONFIG_FILE.to_string()
        }
        None => "defaults".to_string(),
    };
    println!("\nConfiguration:");
    println!("  Source:  {config_source}");

    println!("\nCommands:");
    println!("  stitchview serve      Start the preview HTTP server");
    println!("  stitchview render     Render a generation response to PNG");
    println!("  stitchview generate   Generate a pattern from an image and render it");
    println!("\nRun 'stitchview --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stitchview=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config();
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    tracing::info!(
        target_dimension = config.preview.target_dimension,
        grid = %config.preview.grid_color.to_hex(),
        "Preview settings"
    );

    let state = server::create_app_state(config)?;

    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Stitchview server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
