use clap::Parser;
use dirs::home_dir;
use klisp::{
    cli::{Args, Commands},
    environment::ScopeStack,
    error::Result,
    parser::parse_str,
    repl::{REPLPrompt, REPLValidator, SyntaxHighlighter},
    runtime::interpret,
    system::StdoutConsole,
};
use log::{debug, info};
use nu_ansi_term::{Color, Style};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::{fs, path::PathBuf};

fn run_file(file: PathBuf) -> Result<()> {
    let source = fs::read_to_string(file)?;
    let module = parse_str(&source)?;
    debug!("parsed {} top-level forms", module.exprs.len());

    let mut env = ScopeStack::standard();
    // failures are reported by the console
    if let Ok(value) = interpret(&module, &mut env, &mut StdoutConsole) {
        println!("{}", value);
    }

    Ok(())
}

fn check_file(file: PathBuf, compact: bool) -> Result<()> {
    let source = fs::read_to_string(file)?;
    let module = parse_str(&source)?;

    println!("{}", serde_json::to_string_pretty(&module.to_json(compact)?)?);

    Ok(())
}

fn run_repl() -> Result<()> {
    let mut line_editor = Reedline::create()
        .with_hinter(Box::new(
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray)),
        ))
        .with_highlighter(Box::new(SyntaxHighlighter))
        .with_validator(Box::new(REPLValidator));

    // Add file-backed history if possible
    if let Some(history) = home_dir()
        .map(|home| home.join(".klisp_history"))
        .and_then(|path| FileBackedHistory::with_file(20, path).ok())
        .map(Box::new)
    {
        line_editor = line_editor.with_history(history);
    } else {
        eprintln!("NOTE: Failed to load history. Persistence is now disabled.")
    }

    let prompt = REPLPrompt;
    // one environment for the whole session so `let` bindings survive
    let mut env = ScopeStack::standard();

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                if let Ok(value) = klisp::run(&buffer, &mut env, &mut StdoutConsole) {
                    println!("{}", value);
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                break Ok(());
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Run { file } => {
            info!("FILE MODE");
            debug!("file: {:?}", file);

            run_file(file)
                .inspect_err(|err| {
                    eprintln!("Error: {}", err);
                })
                .ok();
        }
        Commands::Check { file, compact } => {
            info!("CHECK MODE");
            debug!("file: {:?}", file);

            check_file(file, compact)
                .inspect_err(|err| {
                    eprintln!("Error: {}", err);
                })
                .ok();
        }
        Commands::Repl => {
            info!("REPL MODE");

            run_repl()
                .inspect_err(|err| {
                    eprintln!("Error: {}", err);
                })
                .ok();
        }
    }
    Ok(())
}
