use anyhow::{Context, Result};
use autoscroll_core::{
    AutoscrollConfig, Command, DeviceClass, Document, FrameLoop, Input, InteractionEvent,
    PageSurface, SessionEvent, ViewingSession, Viewport,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_engine::{default_engine, OpenSource, PdfEngine};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{FolderSelection, Storage};
use tracing_subscriber::EnvFilter;

/// Overrides the settings directory; used by tests.
pub const DATA_DIR_ENV: &str = "PDF_AUTOSCROLL_DATA_DIR";

#[derive(Debug, Parser)]
#[command(name = "autoscroll-cli")]
#[command(about = "Headless driver for the PDF autoscroll viewer")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Device {
    Regular,
    Compact,
}

impl From<Device> for DeviceClass {
    fn from(value: Device) -> Self {
        match value {
            Device::Regular => DeviceClass::Regular,
            Device::Compact => DeviceClass::Compact,
        }
    }
}

#[derive(Debug, Clone, Copy, Args)]
struct DeviceArgs {
    #[arg(long, value_enum, default_value_t = Device::Regular)]
    device: Device,
    /// Pick the device class from a window width instead of --device.
    #[arg(long, value_name = "PX", conflicts_with = "device")]
    window_width: Option<f64>,
}

impl DeviceArgs {
    fn resolve(self, config: &AutoscrollConfig) -> DeviceClass {
        match self.window_width {
            Some(width_px) => DeviceClass::from_window_width(width_px, config),
            None => self.device.into(),
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the PDFs in a folder and remember it.
    List {
        #[arg(value_name = "FOLDER")]
        folder: PathBuf,
    },
    /// List the PDFs in the remembered folder.
    Last,
    /// Print the layout of a PDF as JSON.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 900.0)]
        viewport_height: f64,
        #[command(flatten)]
        device: DeviceArgs,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Autoscroll through a PDF in virtual time and report what happened.
    Simulate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, default_value_t = 1.0)]
        speed: f64,
        #[arg(long, default_value_t = 30.0)]
        seconds: f64,
        #[arg(long, default_value_t = 900.0)]
        viewport_height: f64,
        #[command(flatten)]
        device: DeviceArgs,
        /// Simulate a wheel interaction at this many seconds. Repeatable.
        #[arg(long = "interact-at", value_name = "SECS")]
        interact_at: Vec<f64>,
        #[arg(long, default_value_t = 60)]
        fps: u32,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: usize,
    device: String,
    render_scale: f32,
    content_height_px: f64,
    scrollable_extent_px: f64,
    scrollable: bool,
}

#[derive(Debug, Serialize)]
struct SimulationOutput {
    path: String,
    state: String,
    status: String,
    position_px: f64,
    scrollable_extent_px: f64,
    current_page: usize,
    page_count: usize,
    speed: String,
    rate_px_per_sec: f64,
    frames: u64,
    timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Serialize)]
struct TimelineEntry {
    at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    playing: Option<bool>,
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    match cli.command {
        Commands::List { folder } => run_list(&folder),
        Commands::Last => run_last(),
        Commands::Info { file, viewport_height, device, config } => {
            run_info(&file, viewport_height, device, config.as_deref())
        }
        Commands::Simulate {
            file,
            speed,
            seconds,
            viewport_height,
            device,
            interact_at,
            fps,
            config,
        } => {
            let plan = SimulationPlan { speed, seconds, viewport_height, interact_at, fps };
            run_simulate(&file, &plan, device, config.as_deref())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn open_storage() -> Result<Storage> {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(root) => Ok(Storage::with_root(root)),
        None => Storage::from_default_project().context("failed to locate settings directory"),
    }
}

fn run_list(folder: &Path) -> Result<()> {
    if !folder.is_dir() {
        anyhow::bail!("folder does not exist: {}", folder.display());
    }

    let storage = open_storage()?;
    let files = FolderSelection::Chosen(folder.to_path_buf())
        .apply(&storage)
        .with_context(|| format!("failed to read folder {}", folder.display()))?
        .unwrap_or_default();

    print_paths(&files);
    Ok(())
}

fn run_last() -> Result<()> {
    let storage = open_storage()?;
    print_paths(&storage.last_folder_pdfs());
    Ok(())
}

fn print_paths(files: &[PathBuf]) {
    for file in files {
        println!("{}", file.display());
    }
}

fn run_info(
    file: &Path,
    viewport_height: f64,
    device: DeviceArgs,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let device = device.resolve(&config);
    let document = load_document(file, device, &config)?;

    let viewport = Viewport::new(document.content_height_px(), viewport_height);
    let payload = InfoOutput {
        path: file.display().to_string(),
        page_count: document.page_count(),
        device: format!("{device:?}"),
        render_scale: device.render_scale(&config),
        content_height_px: viewport.content_height_px(),
        scrollable_extent_px: viewport.max_scroll_px(),
        scrollable: viewport.is_scrollable(),
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

struct SimulationPlan {
    speed: f64,
    seconds: f64,
    viewport_height: f64,
    interact_at: Vec<f64>,
    fps: u32,
}

fn run_simulate(
    file: &Path,
    plan: &SimulationPlan,
    device: DeviceArgs,
    config_path: Option<&Path>,
) -> Result<()> {
    let duration = seconds_arg("--seconds", plan.seconds)?;
    let interactions = plan
        .interact_at
        .iter()
        .map(|at| seconds_arg("--interact-at", *at))
        .collect::<Result<Vec<_>>>()?;
    if plan.fps == 0 {
        anyhow::bail!("--fps must be >= 1");
    }

    let config = load_config(config_path)?;
    let device = device.resolve(&config);
    let document = load_document(file, device, &config)?;
    let page_count = document.page_count();

    let mut session =
        ViewingSession::try_new(config, device).context("invalid autoscroll config")?;
    session.open_document(document, plan.viewport_height);
    session.set_speed(plan.speed);

    let mut frame_loop = FrameLoop::new(session)
        .with_frame_interval(Duration::from_secs_f64(1.0 / f64::from(plan.fps)));
    frame_loop.push(Input::Command(Command::Start));
    for at in interactions {
        frame_loop.schedule(at, Input::Interaction(InteractionEvent::Wheel));
    }

    frame_loop.run_for(duration);

    let timeline = frame_loop
        .timeline()
        .iter()
        .filter_map(|(at, event)| {
            let at_ms = at.as_millis() as u64;
            match event {
                SessionEvent::Status(status) => {
                    Some(TimelineEntry { at_ms, status: Some(status.to_string()), playing: None })
                }
                SessionEvent::PlayControl(playing) => {
                    Some(TimelineEntry { at_ms, status: None, playing: Some(*playing) })
                }
                SessionEvent::SpeedChanged(_) => None,
            }
        })
        .collect();

    let session = frame_loop.session();
    let payload = SimulationOutput {
        path: file.display().to_string(),
        state: format!("{:?}", session.state()),
        status: session.status().to_string(),
        position_px: session.position_px(),
        scrollable_extent_px: session.viewport().max_scroll_px(),
        current_page: session.current_page().map_or(0, |page| page + 1),
        page_count,
        speed: session.speed().display(),
        rate_px_per_sec: session.rate_px_per_sec(),
        frames: frame_loop.frames_run(),
        timeline,
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

/// Converts a seconds flag, rejecting negative, NaN and out-of-range values.
fn seconds_arg(flag: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).with_context(|| format!("{flag} is out of range: {value}"))
}

fn load_config(path: Option<&Path>) -> Result<AutoscrollConfig> {
    let Some(path) = path else {
        return Ok(AutoscrollConfig::default());
    };

    let bytes =
        fs::read(path).with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AutoscrollConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config.validate().context("invalid autoscroll config")?;

    Ok(config)
}

/// Lays out every page of `file` at the device's render scale.
pub fn load_document(
    file: &Path,
    device: DeviceClass,
    config: &AutoscrollConfig,
) -> Result<Document> {
    ensure_pdf_exists(file)?;

    let mut engine = default_engine();
    let handle = engine.open(OpenSource::from(file)).context("failed to open PDF")?;
    let scale = device.render_scale(config);

    let pages = engine
        .page_sizes(handle)?
        .into_iter()
        .map(|size| PageSurface::from_points(size.width_pt, size.height_pt, scale))
        .collect();

    engine.close(handle)?;

    Ok(Document::new(pages, config.page_margin_px))
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
