//! main.rs
//! Entry point for fiander

use fiander::app::AppState;
use fiander::config::Config;
use fiander::core::terminal;
use fiander::utils::cli::{CliAction, handle_args};
use fiander::utils::logging::init_logging;
use fiander::utils::resolve_initial_dir;

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        terminal::restore_terminal();

        eprintln!("\n[fiander] Error occurred: {}", info);

        #[cfg(debug_assertions)]
        {
            let bt = std::backtrace::Backtrace::force_capture();
            eprintln!("\nStack Backtrace:\n{}", bt);
        }
    }));

    let action = handle_args();

    if let CliAction::Exit = action {
        return Ok(());
    }

    let (config, load_error) = Config::load();
    if let Some(err) = &load_error {
        eprintln!("[fiander] Warning: {err}. Using defaults.");
    }
    init_logging(config.general().log_level());
    if let Some(err) = load_error {
        tracing::warn!(error = %err, "config not applied");
    }

    let initial_path = match action {
        CliAction::RunAppAtPath(path_arg) => match resolve_initial_dir(&path_arg) {
            Ok(target) => Some(target),
            Err(err) => {
                eprintln!("\n[fiander] Error: Path '{}' cannot be opened: {}", path_arg, err);
                std::process::exit(1);
            }
        },
        _ => None,
    };

    let mut app = match initial_path {
        Some(path) => AppState::from_dir(&config, &path)?,
        None => AppState::new(&config)?,
    };
    tracing::info!(dir = %app.nav().current_dir().display(), "session started");
    terminal::run_terminal(&mut app)
}
