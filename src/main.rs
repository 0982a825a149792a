use std::io::BufRead;
use steplink::{
    init_logging, parse_line, Config, ConsoleCommand, EventFilter, MessageLevel, RunnerCommand,
    SerialTransport, Session, SessionRunner, BUILD_DATE, HELP_TEXT, VERSION,
};
use tokio::sync::mpsc;

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = Config::default();
    config.validate()?;
    tracing::info!("steplink {} (built {})", VERSION, BUILD_DATE);

    let session = Session::new(SerialTransport::new(), config.session_config());
    session
        .events()
        .subscribe(EventFilter::All, |event| match event.level() {
            MessageLevel::Info => tracing::info!("{}", event),
            MessageLevel::Error => tracing::warn!("{}", event),
        });

    let (tx, rx) = mpsc::channel(32);
    std::thread::Builder::new()
        .name("console".to_string())
        .spawn(move || read_console(tx))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(SessionRunner::new(session, config.tick_interval()).run(rx));

    Ok(())
}

/// Forward stdin lines to the runner until `quit` or end of input
fn read_console(tx: mpsc::Sender<RunnerCommand>) {
    println!("{}", HELP_TEXT);
    for line in std::io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Help)) => println!("{}", HELP_TEXT),
            Ok(Some(ConsoleCommand::Run(command))) => {
                let quit = command == RunnerCommand::Shutdown;
                if tx.blocking_send(command).is_err() || quit {
                    return;
                }
            }
            Err(err) => tracing::warn!("{}", err),
        }
    }
    // End of input; the runner may already be gone.
    let _ = tx.blocking_send(RunnerCommand::Shutdown);
}
