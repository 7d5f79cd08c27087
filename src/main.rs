use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use form_assist::{
    calc_age, clamp, format_brl, load_settings, parse_amount, Bounds, Clock, FieldError,
    FieldRegistry, FormAssist, Settings,
};

#[derive(Debug, Parser)]
#[command(name = "form-assist", version, about = "Student registration form assistant")]
struct Cli {
    /// Config file (defaults to ./form-assist.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate ages as of this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the age badge for a birthdate
    Age { date: String },
    /// Normalize an income amount the way the form's income field does
    Income {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Clamp a number into [min, max], or into a form field's declared range
    Clamp {
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Use the bounds of this form field (html id, e.g. `irmaos`)
        #[arg(long, conflicts_with_all = ["min", "max"])]
        field: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(today) = cli.today {
        settings.today = Some(today);
    }

    init_logging(&settings, cli.command.is_none())?;
    let clock = settings.clock()?;

    match cli.command {
        Some(Command::Age { date }) => {
            let badge = calc_age(&date, clock.today());
            println!("{}", badge.text(&settings.age_labels()));
        }
        Some(Command::Income { value }) => {
            let assist = FormAssist::new(FieldRegistry::student_form()?, clock, settings.age_labels());
            let normalized = assist.enter_income(&value);
            match parse_amount(&normalized) {
                Some(amount) => println!("{}\t{}", normalized, format_brl(amount)),
                None => println!("{}", normalized),
            }
        }
        Some(Command::Clamp { value, field, min, max }) => {
            let bounds = match field {
                Some(html_id) => field_bounds(&html_id)?,
                None => Bounds::new("value", min, max)?,
            };
            println!("{}", clamp(&value, &bounds).apply(&value));
        }
        None => run_ui_mode(&settings, clock)?,
    }

    Ok(())
}

/// Declared bounds of a form field looked up by its html id.
fn field_bounds(html_id: &str) -> Result<Bounds> {
    let registry = FieldRegistry::student_form()?;
    let def = registry
        .get_by_html_id(html_id)
        .ok_or_else(|| FieldError::UnknownField(html_id.to_string()))?;
    def.bounds
        .with_context(|| format!("field `{}` has no declared bounds", html_id))
}

/// Logs go to `log_file` when set. Without one, the interactive form keeps
/// logging off so the terminal is not overdrawn; one-shot commands use stderr.
fn init_logging(settings: &Settings, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));

    match &settings.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None if interactive => {}
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(settings: &Settings, clock: Box<dyn Clock>) -> Result<()> {
    use form_assist::{ui, StudentForm};

    let registry = FieldRegistry::student_form()?;
    let assist = FormAssist::new(registry, clock, settings.age_labels());
    let mut app = ui::App::new(assist, StudentForm::new());

    tracing::info!("starting form");
    ui::run_ui(&mut app)?;

    if let Some(submission) = &app.submitted {
        println!("{}", serde_json::to_string_pretty(submission)?);
    }

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_settings: &Settings, _clock: Box<dyn Clock>) -> Result<()> {
    eprintln!("❌ Interactive form not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a one-shot command: form-assist age 2000-01-01");
    std::process::exit(1);
}
