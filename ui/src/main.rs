mod shell;
mod transport;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use todo_core::{TodoClient, TodoView};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::shell::{Reply, Shell, HELP};
use crate::transport::UreqExchange;

/// Terminal front end for the todo API.
#[derive(Parser, Debug)]
#[command(name = "todo-ui", version)]
struct Cli {
    /// Base URL of the todo API
    #[arg(long, env = "TODO_API_URL", default_value = "http://localhost:8080")]
    base_url: String,
}

fn prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "todo> ")?;
    out.flush()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let view = TodoView::new(TodoClient::new(&cli.base_url));
    let mut shell = Shell::new(view, UreqExchange::new());

    if let Err(err) = shell.mount() {
        eprintln!("could not load todos from {}: {err}", cli.base_url);
        return ExitCode::FAILURE;
    }
    println!("{}", shell.view().render());
    println!("{HELP}");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        if let Err(err) = prompt(&mut stdout) {
            eprintln!("write failed: {err}");
            return ExitCode::FAILURE;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("read failed: {err}");
                return ExitCode::FAILURE;
            }
        }
        if line.trim().is_empty() {
            continue;
        }

        match shell.run_line(&line) {
            Ok(Reply::Show(text)) => println!("{text}"),
            Ok(Reply::Quit) => break,
            Err(err) => {
                tracing::debug!(error = ?err, "command failed");
                eprintln!("error: {err}");
            }
        }
    }
    ExitCode::SUCCESS
}
