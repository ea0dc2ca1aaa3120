//! Time series processor command-line entry point
//!
//! Run with:
//! ```bash
//! cargo run -p tsproc-cli -- commands.tsp
//! cargo run -p tsproc-cli -- commands.tsp --config runner.json --set Basin=North
//! cargo run -p tsproc-cli -- --help Scale
//! ```

use std::process::ExitCode;

use tsproc_cmd::{CommandRegistry, CommandRunner, RunnerConfig, Severity};
use tsproc_processor::Processor;
use tsproc_props::PropValue;

const USAGE: &str = "usage: tsproc <script> [--config <file.json>] [--set Name=Value]... [--quiet]
       tsproc --list
       tsproc --help [Command]";

#[derive(Debug, Default, PartialEq)]
struct Options {
    script: Option<String>,
    config: Option<String>,
    properties: Vec<(String, String)>,
    quiet: bool,
    list: bool,
    help: Option<Option<String>>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut opts = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let file = args.next().ok_or("--config needs a file name")?;
                opts.config = Some(file);
            }
            "--set" | "-s" => {
                let pair = args.next().ok_or("--set needs Name=Value")?;
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("expected Name=Value, got '{}'", pair))?;
                if name.trim().is_empty() {
                    return Err(format!("empty property name in '{}'", pair));
                }
                opts.properties
                    .push((name.trim().to_string(), value.to_string()));
            }
            "--quiet" | "-q" => opts.quiet = true,
            "--list" => opts.list = true,
            "--help" | "-h" => {
                opts.help = Some(args.next());
                return Ok(opts);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option '{}'", other));
            }
            _ => {
                if opts.script.is_some() {
                    return Err(format!("unexpected argument '{}'", arg));
                }
                opts.script = Some(arg);
            }
        }
    }

    if opts.script.is_none() && !opts.list {
        return Err("no script given".to_string());
    }
    Ok(opts)
}

fn print_help(registry: &CommandRegistry, topic: Option<&str>) -> ExitCode {
    match topic {
        None => {
            println!("{}", USAGE);
            ExitCode::SUCCESS
        }
        Some(name) => match registry.get(name) {
            Some(cmd) => {
                println!("{}", cmd.help().trim());
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Unknown command: {}", name);
                ExitCode::from(2)
            }
        },
    }
}

fn run(opts: Options) -> Result<Severity, String> {
    let mut config = match &opts.config {
        Some(path) => RunnerConfig::from_json_file(path).map_err(|e| e.to_string())?,
        None => RunnerConfig::default(),
    };
    config.quiet |= opts.quiet;

    let Some(path) = opts.script.as_deref() else {
        return Err("no script given".to_string());
    };
    let script =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path, e))?;

    let mut processor = Processor::new();
    for (name, value) in &opts.properties {
        processor
            .props_mut()
            .set(name, PropValue::from(value.as_str()))
            .map_err(|e| e.to_string())?;
    }

    let mut runner = CommandRunner::new(config);
    let count = runner.load_script(&script);
    log::info!("Loaded {} command(s) from {}", count, path);

    let summary = runner.run(&mut processor);
    println!("{}", summary);
    for entry in runner.entries() {
        for record in entry.status().records() {
            if record.severity > Severity::Success {
                println!("  line {}: {}", entry.line, record);
            }
        }
    }
    Ok(summary.severity)
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opts = match parse_args(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    let registry = CommandRegistry::with_builtins();
    if let Some(topic) = &opts.help {
        return print_help(&registry, topic.as_deref());
    }
    if opts.list {
        for name in registry.names() {
            println!("{}", name);
        }
        if opts.script.is_none() {
            return ExitCode::SUCCESS;
        }
    }

    match run(opts) {
        Ok(Severity::Failure) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::from(2)
        }
    }
}
