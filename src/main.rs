// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use readalong::app_config::{self, Config, StorageBackend};
use readalong::book::Book;
use readalong::collaborators::{KeyValueStore, Transport};
use readalong::console::ConsoleRenderer;
use readalong::fetch::{self, DefaultFetcher, ResourceFetcher};
use readalong::session::ReadingSession;
use readalong::store::{MemoryStore, SqliteStore};
use readalong::synchronizer::{PlaybackMode, Synchronizer};
use readalong::transcript::format_clock;
use readalong::transport::{self, SimulatedTransport};

/// Seconds of audio assumed after the last line when no duration is given
const DEFAULT_TAIL_SECS: f64 = 5.0;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for PlaybackMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPlaybackMode {
    Single,
    Continuous,
}

impl From<CliPlaybackMode> for PlaybackMode {
    fn from(cli_mode: CliPlaybackMode) -> Self {
        match cli_mode {
            CliPlaybackMode::Single => PlaybackMode::Single,
            CliPlaybackMode::Continuous => PlaybackMode::Continuous,
        }
    }
}

/// CLI Wrapper for StorageBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliStorageBackend {
    Sqlite,
    Memory,
}

impl From<CliStorageBackend> for StorageBackend {
    fn from(cli_backend: CliStorageBackend) -> Self {
        match cli_backend {
            CliStorageBackend::Sqlite => StorageBackend::Sqlite,
            CliStorageBackend::Memory => StorageBackend::Memory,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct BookArgs {
    /// Book directory or URL containing book.json (skips the catalog)
    #[arg(long)]
    book_path: Option<String>,

    /// Book key to look up in the catalog
    #[arg(short = 'k', long)]
    book_key: Option<String>,

    /// Preference storage backend
    #[arg(long, value_enum)]
    storage: Option<CliStorageBackend>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[command(flatten)]
    book: BookArgs,

    /// Unit number (1-based); defaults to the last opened unit
    #[arg(short, long)]
    unit: Option<usize>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    #[command(flatten)]
    book: BookArgs,

    /// Unit number (1-based); defaults to the last opened unit
    #[arg(short, long)]
    unit: Option<usize>,

    /// Line number (1-based) to start from; plays from the beginning when omitted
    #[arg(short = 'n', long)]
    line: Option<usize>,

    /// Playback mode
    #[arg(short, long, value_enum)]
    mode: Option<CliPlaybackMode>,

    /// Playback speed multiplier (remembered for later runs)
    #[arg(short, long)]
    rate: Option<f64>,

    /// Media length in seconds; defaults to a few seconds past the last line
    #[arg(long)]
    duration: Option<f64>,

    /// Position update interval in milliseconds (overrides the config)
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the units of a book
    Units(BookArgs),

    /// Print the transcript of a unit
    Show(ShowArgs),

    /// Play a unit against its transcript in the terminal
    Play(PlayArgs),

    /// Cycle or set the remembered playback speed
    Speed {
        /// Set this speed instead of cycling to the next one
        #[arg(long)]
        set: Option<f64>,

        /// Preference storage backend
        #[arg(long, value_enum)]
        storage: Option<CliStorageBackend>,
    },

    /// Generate shell completions for readalong
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// readalong - point-and-read for textbook audio
///
/// Loads a unit's audio transcript, highlights the line being read and plays
/// single lines or whole units.
#[derive(Parser, Debug)]
#[command(name = "readalong")]
#[command(version)]
#[command(about = "Point-and-read audio/transcript synchronizer")]
#[command(long_about = "readalong pairs a textbook unit's audio with its time-tagged transcript.

EXAMPLES:
    readalong units                              # List units of the default book
    readalong units -k YL4B                      # List units of a catalog book
    readalong show --book-path ./books/4B -u 3   # Print the transcript of unit 3
    readalong play -u 3 -n 5                     # Play line 5 of unit 3, then stop
    readalong play -u 3 -m continuous -r 1.25    # Play unit 3 through at 1.25x
    readalong speed                              # Cycle the remembered speed
    readalong completions bash > readalong.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in readalong.json by default. You can specify a
    different file with --config-path. If the file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "readalong.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Colored stderr logger
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.min(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

/// Routes renderer output through the progress bar so lines don't tear it
struct ProgressWriter {
    bar: ProgressBar,
    buffer: Vec<u8>,
}

impl ProgressWriter {
    fn new(bar: ProgressBar) -> Self {
        Self { bar, buffer: Vec::new() }
    }
}

impl Write for ProgressWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buffer.is_empty() {
            let text = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            self.bar.println(text.trim_end_matches('\n'));
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the configuration says otherwise; the filter is raised to
    // trace so later set_max_level calls take effect.
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "readalong", &mut io::stdout());
        return Ok(());
    }

    let config = load_config(&cli.config_path, cli.log_level.clone())?;
    let fetcher = DefaultFetcher::new();

    match cli.command {
        Commands::Units(args) => run_units(&config, &fetcher, &args).await,
        Commands::Show(args) => run_show(&config, &fetcher, &args).await,
        Commands::Play(args) => run_play(&config, &fetcher, &args).await,
        Commands::Speed { set, storage } => run_speed(&config, set, storage),
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration, then apply the log level
fn load_config(config_path: &str, cli_log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    if let Some(log_level) = cli_log_level {
        config.log_level = log_level.into();
    }

    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

fn open_store(config: &Config, backend: Option<CliStorageBackend>) -> Result<Box<dyn KeyValueStore>> {
    let backend = backend.map(StorageBackend::from).unwrap_or_else(|| config.storage.backend.clone());

    let store: Box<dyn KeyValueStore> = match backend {
        StorageBackend::Memory => Box::new(MemoryStore::new()),
        StorageBackend::Sqlite => match config.storage.db_path.as_deref() {
            Some(path) => Box::new(SqliteStore::new(path).context("Failed to open preference store")?),
            None => Box::new(SqliteStore::new_default().context("Failed to open preference store")?),
        },
    };

    Ok(store)
}

async fn open_book(config: &Config, fetcher: &DefaultFetcher, args: &BookArgs) -> Result<Book> {
    let explicit_path = args.book_path.as_deref().or(config.book.book_path.as_deref());
    let key = args.book_key.as_deref().unwrap_or(&config.book.book_key);

    let book_path = fetch::locate_book(
        fetcher,
        explicit_path,
        Some(key),
        &config.book.catalog_location,
        &config.book.default_book_path,
    )
    .await
    .context("Failed to locate book")?;

    debug!("Using book path: {}", book_path);

    fetch::load_book(fetcher, &book_path)
        .await
        .with_context(|| format!("Failed to load book configuration from {}", book_path))
}

fn open_session(config: &Config, book: &Book, storage: Option<CliStorageBackend>) -> Result<ReadingSession<Box<dyn KeyValueStore>>> {
    let store = open_store(config, storage)?;
    Ok(ReadingSession::with_speeds(
        book.path.clone(),
        book.units.clone(),
        store,
        config.playback.available_speeds.clone(),
        config.playback.default_rate,
    ))
}

// @returns: Zero-based unit index from a 1-based CLI number or the remembered unit
fn resolve_unit<S: KeyValueStore>(session: &ReadingSession<S>, unit: Option<usize>) -> Result<usize> {
    match unit {
        Some(0) => Err(anyhow!("Unit numbers start at 1")),
        Some(number) => Ok(number - 1),
        None => session
            .initial_unit_index()
            .ok_or_else(|| anyhow!("The book has no units")),
    }
}

async fn run_units(config: &Config, fetcher: &DefaultFetcher, args: &BookArgs) -> Result<()> {
    let book = open_book(config, fetcher, args).await?;
    let session = open_session(config, &book, args.storage.clone())?;
    let current = session.initial_unit_index();

    println!("{}", book.display_name());
    if let Some(cover) = book.config.cover_url(&book.path) {
        println!("Cover: {}", cover);
    }

    if book.units.is_empty() {
        warn!("The book has no units");
        return Ok(());
    }

    for unit in &book.units {
        let marker = if current == Some(unit.ordinal) { "*" } else { " " };
        println!("{} {:>3}. {}", marker, unit.id(), unit.title);
    }

    Ok(())
}

async fn run_show(config: &Config, fetcher: &DefaultFetcher, args: &ShowArgs) -> Result<()> {
    let book = open_book(config, fetcher, &args.book).await?;
    let mut session = open_session(config, &book, args.book.storage.clone())?;

    let index = resolve_unit(&session, args.unit)?;
    let ticket = session.select_unit(index)?;

    println!("{} - {}", book.display_name(), ticket.unit.title);

    let raw = fetcher
        .fetch_text(&ticket.unit.transcript_url)
        .await
        .context("Failed to load transcript")?;

    let mut synchronizer = Synchronizer::new(
        SimulatedTransport::new(None),
        ConsoleRenderer::stdout(true),
        config.playback.default_mode,
        session.playback_rate(),
    );
    session.commit_transcript(&ticket, &raw, &mut synchronizer);

    Ok(())
}

async fn run_play(config: &Config, fetcher: &DefaultFetcher, args: &PlayArgs) -> Result<()> {
    let book = open_book(config, fetcher, &args.book).await?;
    let mut session = open_session(config, &book, args.book.storage.clone())?;

    if let Some(rate) = args.rate {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(anyhow!("Playback rate must be a positive number, got {}", rate));
        }
        session.set_playback_rate(rate).context("Failed to remember playback rate")?;
    }

    let tick_ms = args.tick_ms.unwrap_or(config.playback.tick_interval_ms);
    if tick_ms == 0 {
        return Err(anyhow!("Tick interval must be at least 1 ms"));
    }
    let tick = Duration::from_millis(tick_ms);

    let index = resolve_unit(&session, args.unit)?;
    let ticket = session.select_unit(index)?;
    let mode = args.mode.clone().map(PlaybackMode::from).unwrap_or(config.playback.default_mode);

    info!(
        "{} - {} ({} mode, {}x)",
        book.display_name(),
        ticket.unit.title,
        mode,
        session.playback_rate()
    );
    debug!("Audio: {}", ticket.unit.audio_url);

    let raw = fetcher
        .fetch_text(&ticket.unit.transcript_url)
        .await
        .context("Failed to load transcript")?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}]")
            .context("Invalid progress bar template")?
            .progress_chars("=> "),
    );

    let mut synchronizer = Synchronizer::new(
        SimulatedTransport::new(None),
        ConsoleRenderer::new(ProgressWriter::new(bar.clone()), false),
        mode,
        session.playback_rate(),
    );
    session.commit_transcript(&ticket, &raw, &mut synchronizer);

    let Some(last_line) = synchronizer.transcript().lines().last() else {
        bar.finish_and_clear();
        warn!("Unit {} has no transcript lines to play", ticket.unit.id());
        return Ok(());
    };

    let duration = args
        .duration
        .unwrap_or_else(|| last_line.time.max(0.0) + DEFAULT_TAIL_SECS);
    if !(duration.is_finite() && duration > 0.0) {
        return Err(anyhow!("Duration must be a positive number of seconds, got {}", duration));
    }

    synchronizer.transport_mut().set_duration(Some(duration));
    synchronizer.on_metadata_loaded(duration);
    bar.set_length((duration * 1000.0) as u64);

    match args.line {
        Some(0) => return Err(anyhow!("Line numbers start at 1")),
        Some(number) => synchronizer
            .jump_to_line(number - 1)
            .context("Cannot start playback at the requested line")?,
        None => synchronizer.transport_mut().play(),
    }

    drive_playback(&mut synchronizer, &bar, duration, tick).await;

    bar.finish_and_clear();
    info!(
        "Stopped at {} / {}",
        format_clock(synchronizer.transport().position()),
        format_clock(duration)
    );

    Ok(())
}

/// Advance the simulated transport on every tick and feed its position and
/// events to the synchronizer until playback stops or Ctrl-C is pressed.
async fn drive_playback<W: Write>(
    synchronizer: &mut Synchronizer<SimulatedTransport, ConsoleRenderer<W>>,
    bar: &ProgressBar,
    duration: f64,
    tick: Duration,
) {
    let mut interval = tokio::time::interval(tick);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {},
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                synchronizer.transport_mut().pause();
                synchronizer.transport_mut().take_events();
                synchronizer.on_pause();
                break;
            }
        }

        let now = Instant::now();
        let outcome = transport::drive_tick(synchronizer, now - last_tick);
        last_tick = now;

        bar.set_position((outcome.position * 1000.0) as u64);
        bar.set_message(format!("{} / {}", format_clock(outcome.position), format_clock(duration)));

        if outcome.stopped {
            break;
        }
    }
}

fn run_speed(config: &Config, set: Option<f64>, storage: Option<CliStorageBackend>) -> Result<()> {
    let store = open_store(config, storage)?;
    let mut session = ReadingSession::with_speeds(
        String::new(),
        Vec::new(),
        store,
        config.playback.available_speeds.clone(),
        config.playback.default_rate,
    );

    let rate = match set {
        Some(rate) if rate.is_finite() && rate > 0.0 => {
            session.set_playback_rate(rate)?;
            rate
        }
        Some(rate) => return Err(anyhow!("Playback rate must be a positive number, got {}", rate)),
        None => session.cycle_playback_rate()?,
    };

    println!("Playback speed: {}x", rate);
    Ok(())
}
