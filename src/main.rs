use anyhow::{Context, Result};
use atw::app::{App, PracticeSettings};
use atw::config::AppConfig;
use atw::models::DurationPreset;
use atw::{history, logging, prompt, ui};
use clap::builder::RangedU64ValueParser;
use clap::{ArgAction, Parser};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "atw")]
#[command(version)]
#[command(about = "Japanese typing practice with a countdown timer", long_about = None)]
// disable the default flags so they can sit under "Flags" below
#[command(disable_help_flag = true)]
#[command(disable_version_flag = true)]
#[command(help_template = "\
{name} {version}
{about-section}
{usage-heading} {usage}

{all-args}
")]
struct Cli {
    /// Custom duration in seconds; selects the custom preset (e.g. 90, 600)
    #[arg(short, long, value_parser = RangedU64ValueParser::<u64>::new().range(1..))]
    time: Option<u64>,

    /// Prompt file: JSON array of {"text", "kana"} records, the first is used
    #[arg(short, long)]
    prompts: Option<PathBuf>,

    /// Characters per prompt row
    #[arg(short, long, value_parser = RangedU64ValueParser::<usize>::new().range(1..=1000))]
    line_length: Option<usize>,

    /// Conversion mode: hide the kana line and type the kanji text
    #[arg(short, long, default_value_t = false, help_heading = "Flags")]
    conversion: bool,

    /// Show practice history
    #[arg(long, default_value_t = false, help_heading = "Flags")]
    history: bool,

    /// Print help
    #[arg(short, long, action = ArgAction::Help, help_heading = "Flags")]
    help: Option<bool>,

    /// Print version
    #[arg(short = 'V', long, action = ArgAction::Version, help_heading = "Flags")]
    version: Option<bool>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.history {
        history::show_history()?;
        return Ok(());
    }

    if let Err(e) = logging::init() {
        eprintln!("Warning: Failed to set up logging. Error: {:#}", e);
    }

    let app_config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Failed to load config, using defaults. Error: {:#}",
            e
        );
        AppConfig::default()
    });

    let practice = app_config.practice;
    let settings = PracticeSettings {
        line_length: cli.line_length.unwrap_or(practice.line_length),
        conversion_enabled: cli.conversion || practice.conversion_enabled,
        custom_seconds: cli.time.unwrap_or(practice.custom_seconds),
        preset: if cli.time.is_some() {
            DurationPreset::Custom
        } else {
            DurationPreset::OneMinute
        },
        history_path: history::history_path(),
    };

    let prompt_path = cli.prompts.or(practice.prompt_path);
    let prompt = prompt::load(prompt_path.as_deref());
    info!(
        line_length = settings.line_length,
        conversion = settings.conversion_enabled,
        "starting practice"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(prompt, settings, app_config.theme);

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|f| ui::render(f, app))
            .context("failed to draw frame")?;
        app.tick(Instant::now());

        if event::poll(app.poll_timeout(Instant::now()))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                    match key.code {
                        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                            app.cancel_session();
                            app.quit();
                        }
                        KeyCode::Esc => app.on_escape(),
                        KeyCode::Tab => app.cycle_preset(),
                        KeyCode::Backspace => app.on_backspace(),
                        KeyCode::Char(c) => app.on_key(c),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
