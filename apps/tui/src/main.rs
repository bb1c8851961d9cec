use clap::Parser;
use color_eyre::Result;
use sound_dna::app::actions::AppActions;
use sound_dna::app::{App, RequestOptions};
use sound_dna::cli::{CacheCommand, CliArgs, Command};
use sound_dna::{commands, event, terminal};
use sound_dna_core::RecommendRequest;

#[tokio::main]
async fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let args = CliArgs::parse();
    args.apply_env_overrides();
    dotenv::dotenv().ok();
    // Log lines would tear the full-screen UI, so it only logs errors by default
    init_logging(if args.command.is_some() { "warn" } else { "error" });

    let options = args.request_options();
    match args.command {
        Some(Command::Recommend { song, json }) => {
            let request = options.apply(RecommendRequest::new(song));
            let mut actions = AppActions::new();
            actions.initialize()?;
            commands::recommend(&actions, &request, json).await
        }
        Some(Command::Cache(command)) => {
            let mut actions = AppActions::new();
            actions.initialize()?;
            match command {
                CacheCommand::Install => commands::cache_install(&actions).await,
                CacheCommand::Get { url, output } => {
                    commands::cache_get(&actions, &url, output.as_deref()).await
                }
                CacheCommand::Status => commands::cache_status(&actions).await,
            }
        }
        None => run_interactive(options).await,
    }
}

async fn run_interactive(options: RequestOptions) -> Result<()> {
    // Check if we're running in a terminal
    if !is_terminal() {
        eprintln!("{}", CliArgs::help_text());
        return Err(color_eyre::eyre::eyre!(
            "The interactive UI needs a terminal; use a subcommand instead"
        ));
    }

    let mut app = App::new();
    app.options = options;
    app.initialize()?;

    // Setup terminal
    let mut terminal = terminal::setup()?;

    // Run the application
    let result = event::run(&mut terminal, &mut app).await;

    // Restore terminal
    terminal::cleanup(true, true);

    result
}

fn init_logging(quiet_level: &str) {
    let debug = std::env::var("DEBUG").is_ok_and(|value| !value.is_empty() && value != "0");
    let default_level = if debug { "debug" } else { quiet_level };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .target(env_logger::Target::Stderr)
    .try_init();
}

// Check if we're running in a terminal
fn is_terminal() -> bool {
    atty::is(atty::Stream::Stdout)
}
