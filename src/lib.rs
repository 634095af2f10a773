use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

mod app;
mod completion;
mod error;
mod host;
mod keybinds;
mod layout;
mod paths;
mod scratch;
mod session;
mod settings;
mod theme;
mod types;
mod ui;
use app::App;
use keybinds::load_keybindings;
use settings::{load_settings, save_settings_to, settings_file_path};
use ui::draw;

const LOG_FILE: &str = "tabopen.log";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    inline: bool,
    log_file: Option<PathBuf>,
    write_config: bool,
    help: bool,
    paths: Vec<PathBuf>,
}

fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--inline" => out.inline = true,
            "--write-config" => out.write_config = true,
            "--help" | "-h" => out.help = true,
            "--log" => {
                let Some(path) = args.next() else {
                    return Err("--log needs a file argument".to_string());
                };
                out.log_file = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option '{other}'"));
            }
            _ => out.paths.push(PathBuf::from(arg)),
        }
    }
    Ok(out)
}

fn print_usage() {
    println!("Usage: tabopen [OPTIONS] [PATH...]");
    println!();
    println!("Arguments:");
    println!("  [PATH...]         Files to open at startup");
    println!();
    println!("Options:");
    println!("  --inline          List ambiguous completions in the status line");
    println!("  --log <FILE>      Write logs to FILE (default: tabopen.log in the temp dir)");
    println!("  --write-config    Write the effective settings file and exit");
    println!("  --help            Show this help message");
    println!();
    println!("Set RUST_LOG to change the log filter (default: info).");
}

fn init_logging(path: &Path) -> io::Result<()> {
    let log_file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}

pub fn run() -> io::Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("tabopen: {msg}");
            print_usage();
            return Ok(());
        }
    };
    if args.help {
        print_usage();
        return Ok(());
    }

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(LOG_FILE));
    if let Err(err) = init_logging(&log_path) {
        eprintln!("tabopen: logging disabled ({}): {err}", log_path.display());
    }

    let mut settings = load_settings();
    if args.inline {
        settings.use_scratch_buffer = false;
    }

    if args.write_config {
        let Some(path) = settings_file_path() else {
            eprintln!("tabopen: no config directory found");
            return Ok(());
        };
        save_settings_to(&path, &settings)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let mut app = App::new(&settings, load_keybindings());
    app.open_paths(&args.paths);
    info!(files = args.paths.len(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    // Needed to tell ctrl+letter apart from the control characters some
    // terminals send instead.
    let enhanced_keys =
        ratatui::crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        let _ = execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        );
    }

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    let result = run_app(terminal, app);

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    if enhanced_keys {
        let _ = execute!(stdout, PopKeyboardEnhancementFlags);
    }
    execute!(stdout, LeaveAlternateScreen)?;
    info!("exiting");

    result
}

fn run_app(mut terminal: Terminal<CrosstermBackend<Stdout>>, mut app: App) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(&mut app, f))?;
        if app.quit {
            return Ok(());
        }
        if event::poll(Duration::from_millis(100))? {
            // Drain everything pending so a paste is one redraw, not hundreds.
            loop {
                if let Event::Key(key) = event::read()? {
                    app.handle_key(key);
                }
                if app.quit {
                    return Ok(());
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}
