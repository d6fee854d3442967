use puzzlebot::console::{self, Command, HELP};
use puzzlebot::{init_logging, Config, JogController, MotionController, ParameterStore};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => ParameterStore::default_path()?,
    };
    let store = ParameterStore::open(&path)?;
    let config = Config::from_store(&store)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        build_date = env!("BUILD_DATE"),
        params = %path.display(),
        "Starting PuzzleBot"
    );

    let machine = MotionController::connect(
        &config.connection,
        config.coordinate_translator()?,
        config.timeouts(),
    )
    .await?;
    let jog = JogController::new(&machine, config.jog);

    let mut events = machine.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(%event, "Controller event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event log fell behind")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    println!("PuzzleBot {} ({})", env!("CARGO_PKG_VERSION"), env!("BUILD_DATE"));
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("error: {:#}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match console::execute(&machine, &jog, command).await {
            Ok(Some(output)) => println!("{}", output),
            Ok(None) => {}
            Err(e) => println!("error: {:#}", e),
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
