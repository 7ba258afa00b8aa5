// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A tiny REPL on top of `readline_input`. It echoes every line, and logs the decode
//! decisions (timeouts, meta keys, matched bindings) to a file so you can watch them
//! with `tail -f` in another terminal.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ > cargo run --example repl -- --log-file /tmp/repl.log       │
//! │ > tail -f /tmp/repl.log                                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands: `history`, `mode emacs`, `mode vi`, `exit`. `Tab` completes them. Press
//! `Alt+b` quickly and slowly (`ESC`, wait, `b`) to see the keyseq timeout at work.

use clap::Parser;
use readline_input::{BasicLineEditor, GeneralIo, Hooks, Readline, ReadlineConfig,
                     ReadlineError, TerminalGate, TracingConfig,
                     try_initialize_logging_global};
use std::path::PathBuf;
use tracing_core::LevelFilter;

const COMMANDS: [&str; 3] = ["exit", "history", "mode"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Echo lines typed at a readline prompt")]
struct Cli {
    #[arg(long, default_value_t = 500, help = "How long to wait for the rest of a key sequence")]
    keyseq_timeout_ms: u64,
    #[arg(long, help = "Start in vi insert mode")]
    vi: bool,
    #[arg(long, help = "Read until a line ends with `;`")]
    multiline: bool,
    #[arg(long, help = "Write debug logs to this file")]
    log_file: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        try_initialize_logging_global(TracingConfig::new_file(
            Some(path.clone()),
            LevelFilter::DEBUG,
        ))?;
    }

    let mut config = ReadlineConfig::default()
        .with_keyseq_timeout_ms(cli.keyseq_timeout_ms)?
        .with_env_overrides()?;
    if cli.vi {
        config = config.with_editing_mode(readline_input::EditingMode::ViInsert);
    }

    #[cfg(unix)]
    if std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        let gate = readline_input::AnsiTerminal::try_new()?;
        return run_repl(Readline::try_new(gate, config)?, &cli);
    }

    run_repl(Readline::try_new(GeneralIo::stdio(), config)?, &cli)
}

fn run_repl<G: TerminalGate>(mut readline: Readline<G>, cli: &Cli) -> miette::Result<()> {
    *readline.hooks_mut() = Hooks::default()
        .with_completion_proc(complete_command)
        .with_completion_append_character(Some(" "));
    let mut editor = BasicLineEditor::new(std::io::stdout());

    loop {
        let result = if cli.multiline {
            readline.readmultiline(&mut editor, "repl* ", true, ends_with_semicolon)
        } else {
            readline.readline(&mut editor, "repl> ", true)
        };

        let line = match result {
            Ok(line) => line,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(err) => return Err(err.into()),
        };

        match line.trim() {
            "exit" => break,
            "history" => {
                for (index, entry) in readline.history().iter().enumerate() {
                    println!("{index:>4}  {entry}");
                }
            }
            "mode emacs" => readline.emacs_editing_mode(),
            "mode vi" => readline.vi_editing_mode(),
            "mode" => println!("{}", readline.editing_mode()),
            other => println!("{other}"),
        }
    }

    Ok(())
}

fn complete_command(target: &str) -> Vec<String> {
    COMMANDS
        .iter()
        .filter(|it| it.starts_with(target))
        .map(|it| (*it).to_string())
        .collect()
}

fn ends_with_semicolon(buffer: &str) -> bool { buffer.trim_end().ends_with(';') }
