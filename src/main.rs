mod app;
mod config;
mod quiz;

use std::io::{self, BufRead, Write};

use app::App;
use config::Config;
use dotenv::dotenv;
use log::{debug, error};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn main() {
    // A missing .env file is fine, the defaults cover everything.
    dotenv().ok();
    pretty_env_logger::init();

    if let Err(err) = run() {
        error!("{}", err);
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> HandlerResult {
    let config = Config::from_env()?;
    debug!("Configuration: {:?}", config);

    let catalog = config.catalog()?;
    let rng = config.rng();
    let mut app = App::new(catalog, config, rng);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in app.greeting() {
        writeln!(stdout, "{}", line)?;
    }

    let mut input = String::new();
    while app.is_running() {
        write!(stdout, "> ")?;
        stdout.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            // End of input closes the application without the exit prompt.
            break;
        }

        for line in app.handle(&input) {
            writeln!(stdout, "{}", line)?;
        }
    }

    if let Some(session) = app.session() {
        debug!(
            "Leaving questionnaire {} at {}/{} answered",
            session.questionnaire_id(),
            session.progress(),
            session.len()
        );
    }
    Ok(())
}
