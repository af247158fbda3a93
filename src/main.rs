//! Scan Wedge - barcode scanner decoding from keyboard input
//!
//! `tui` runs the interactive front-end, `listen` decodes scans from input
//! devices and prints them, `simulate` types a code like a scanner would.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::fs::OpenOptions;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use scan_wedge::{
    config::{self, Config, ListenerConfig},
    keyboard::{KeyEvent, KeyboardListener, KeystrokeTranslator},
    scanner::{BarcodeDecoder, NoFocus, ScanRecord, ScanSource},
    simulate::{ScanSimulator, DEFAULT_KEY_DELAY},
    ui::{App, AppState, AppView, EntryField, HelpPanel, HistoryPanel, StatusBar, ThemeColors},
};

#[cfg(target_os = "linux")]
use scan_wedge::keyboard::{evdev_status, EvdevListener};

#[derive(Parser)]
#[command(name = "scan-wedge", version, about = "Keyboard-wedge barcode scanner decoder")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal front-end (default)
    Tui,
    /// Decode scans from input devices and print one per line
    Listen {
        /// evdev device to read, e.g. /dev/input/by-id/usb-...-event-kbd
        #[arg(long)]
        device: Option<PathBuf>,
        /// Grab the device so scans don't reach other applications
        #[arg(long)]
        grab: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List keyboard devices the listener can open
    Devices,
    /// Type a code followed by Enter at scanner speed
    Simulate {
        code: String,
        /// Delay between keystrokes in milliseconds
        #[arg(long, default_value_t = DEFAULT_KEY_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command.unwrap_or(Command::Tui) {
        Command::Tui => {
            init_file_logging();
            run_tui(config)
        }
        Command::Listen { device, grab, format } => {
            init_stderr_logging();
            let mut config = config;
            if device.is_some() {
                config.listener.device = device;
            }
            config.listener.grab |= grab;
            run_listener(&config, format)
        }
        Command::Devices => {
            init_stderr_logging();
            list_devices();
            Ok(())
        }
        Command::Simulate { code, delay_ms } => {
            init_stderr_logging();
            let mut simulator = ScanSimulator::new(Duration::from_millis(delay_ms))?;
            simulator.send(&code)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load config"),
    }
}

fn init_stderr_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// The TUI owns the terminal, so logs go to a file in the data directory
fn init_file_logging() {
    let file = config::data_dir().ok().and_then(|dir| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("scan-wedge.log"))
            .ok()
    });
    if let Some(file) = file {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }
}

fn run_tui(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let result = run_app(&mut terminal, &mut app);

    // Cleanup terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    println!("\nScan Wedge session complete.");
    println!("Scans recorded: {}", app.history.total());
    println!("Session duration: {}", app.elapsed_formatted());
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = app.config.refresh_interval();
    let colors = ThemeColors::from_theme(app.config.ui.theme);

    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| draw(frame, app, colors))?;

        // Drain everything queued so a scanner burst keeps its real spacing
        let mut timeout = app.poll_timeout(tick_rate, Instant::now());
        while event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(&key, Instant::now());
            }
            timeout = Duration::ZERO;
        }

        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

fn draw(frame: &mut Frame, app: &App, colors: ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // History / help
            Constraint::Length(3), // Manual entry
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    match app.view {
        AppView::Help => frame.render_widget(HelpPanel::new(colors), chunks[0]),
        AppView::Scans => frame.render_widget(HistoryPanel::new(&app.history, colors), chunks[0]),
    }

    frame.render_widget(EntryField::new(&app.entry, app.entry_focused(), colors), chunks[1]);

    let stats = app.decoder.stats();
    let elapsed = app.elapsed_formatted();
    let enabled = app.decoder.is_enabled();
    let status = StatusBar::new(enabled, app.decoder.is_scanning(), &elapsed, colors)
        .counts(stats.emitted, stats.rejected_length + stats.abandoned)
        .message(app.get_status());
    frame.render_widget(status, chunks[2]);
}

/// Where the headless listener gets key events from
enum InputSource {
    #[cfg(target_os = "linux")]
    Evdev(EvdevListener),
    Polling(KeyboardListener),
}

impl InputSource {
    fn open(listener: &ListenerConfig, event_tx: mpsc::Sender<KeyEvent>) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let opened = match &listener.device {
                Some(path) => EvdevListener::open_device(path, listener.grab, event_tx.clone()),
                None => EvdevListener::open_all(event_tx.clone()),
            };
            match opened {
                Ok(evdev) => return Ok(Self::Evdev(evdev)),
                // An explicitly chosen device must not silently fall back
                Err(e) if listener.device.is_some() => return Err(e.into()),
                Err(e) => warn!("evdev unavailable ({}), falling back to polling", e),
            }
        }

        if listener.device.is_some() || listener.grab {
            warn!("device selection and grab need evdev; listening to all keyboards");
        }
        Ok(Self::Polling(KeyboardListener::new(event_tx)))
    }

    fn poll(&mut self) -> usize {
        match self {
            #[cfg(target_os = "linux")]
            Self::Evdev(evdev) => evdev.poll(),
            Self::Polling(listener) => listener.poll(),
        }
    }
}

fn run_listener(config: &Config, format: OutputFormat) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install ctrl-c handler")?;
    }

    let (event_tx, event_rx) = mpsc::channel::<KeyEvent>();
    let mut source = InputSource::open(&config.listener, event_tx)?;

    let (scan_tx, scan_rx) = mpsc::channel::<String>();
    let mut decoder = BarcodeDecoder::new(config.scanner.options(), NoFocus, move |code| {
        let _ = scan_tx.send(code.to_string());
    });
    let mut translator = KeystrokeTranslator::new();
    let poll_interval = config.listener.poll_interval();
    let mut out = io::stdout().lock();

    info!("listening for scans, ctrl-c to stop");
    while running.load(Ordering::SeqCst) {
        source.poll();
        while let Ok(event) = event_rx.try_recv() {
            if let Some(keystroke) = translator.translate(&event) {
                decoder.handle_key(keystroke, event.timestamp);
            }
        }
        decoder.poll(Instant::now());

        while let Ok(code) = scan_rx.try_recv() {
            info!("scan: {}", code);
            write_scan(&mut out, &code, format)?;
        }
        thread::sleep(poll_interval);
    }

    let stats = decoder.stats();
    info!(
        "stopped: {} scans, {} rejected by length, {} abandoned",
        stats.emitted, stats.rejected_length, stats.abandoned
    );
    Ok(())
}

fn write_scan(out: &mut impl Write, code: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", code)?,
        OutputFormat::Json => {
            let record = ScanRecord::new(code, ScanSource::Scanner);
            writeln!(out, "{}", serde_json::to_string(&record)?)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn list_devices() {
    #[cfg(target_os = "linux")]
    println!("{}", evdev_status());

    #[cfg(not(target_os = "linux"))]
    println!("Device listing needs evdev (Linux); the polling listener reads all keyboards");
}
