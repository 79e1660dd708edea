/// Muply - headless music player
use anyhow::Context;
use clap::Parser;
use muply_cli::{Action, AppConfig, Cli, CliSession, ShellLine};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so command output stays clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muply_cli=warn,muply_playback=warn,muply_audio=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }
    config.validate()?;

    let mut session = CliSession::open(&config)
        .with_context(|| format!("Failed to open {}", config.state_file.display()))?;

    match cli.command {
        Action::Shell => shell(&mut session),
        action => {
            let output = session.execute(action)?;
            print!("{}", output);
            Ok(())
        }
    }
}

fn shell(session: &mut CliSession) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print!("{}", session.start());
    prompt(&mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.first().copied() {
            None => {}
            Some("quit" | "exit") => break,
            Some(_) => match ShellLine::try_parse_from(words.iter().copied()) {
                Ok(ShellLine {
                    action: Action::Shell,
                }) => println!("Already in the shell"),
                Ok(parsed) => match session.execute(parsed.action) {
                    Ok(output) => print!("{}", output),
                    Err(e) => eprintln!("error: {}", e),
                },
                // Help and usage errors render through clap
                Err(e) => {
                    let _ = e.print();
                }
            },
        }

        prompt(&mut stdout)?;
    }

    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> io::Result<()> {
    print!("muply> ");
    stdout.flush()
}
