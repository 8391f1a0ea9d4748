//! Reckon CLI
//!
//! Reads quantity literals from the command line, or one per line from
//! stdin when none are given, and prints each in its most natural unit.
//!
//! Environment:
//! - RECKON_TABLE: path to a JSON unit table replacing the built-in one
//! - RECKON_LOG: log level for stderr (off, error, warn, info, debug, trace)

use reckon::{Reckon, Rendered};
use reckon_core::ReckonError;
use reckon_units::{UnitTable, Value};
use serde_json::json;
use std::env;
use std::fs;
use std::io::{self, BufRead, IsTerminal};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};

const USAGE: &str = "\
usage: reckon [OPTIONS] [QUANTITY ...]

Prints each quantity (e.g. \"1500 m\", \"36 km/h\", \"2.5e6 bytes\") in its
most natural unit. Reads one quantity per line from stdin when none are given.

options:
  --json       print one JSON object per result
  --sum        add all quantities and print the total
  --base       print base units instead of the most natural unit
  --in UNIT    express results in UNIT (e.g. km/h)
  --units      list known units and exit
  --help       show this message";

#[derive(Debug, Default, PartialEq)]
struct Options {
    json: bool,
    sum: bool,
    base: bool,
    target: Option<String>,
    list_units: bool,
    help: bool,
    inputs: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => options.json = true,
            "--sum" => options.sum = true,
            "--base" => options.base = true,
            "--units" => options.list_units = true,
            "--help" | "-h" => options.help = true,
            "--in" => {
                let unit = args.next().ok_or("--in needs a unit")?;
                options.target = Some(unit);
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => options.inputs.push(arg),
        }
    }

    if options.base && options.target.is_some() {
        return Err("--base and --in cannot be combined".to_string());
    }
    Ok(options)
}

fn init_logging() {
    let level = env::var("RECKON_LOG")
        .ok()
        .and_then(|s| LevelFilter::from_str(&s).ok())
        .unwrap_or(LevelFilter::WARN);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_engine() -> Result<Reckon, ReckonError> {
    match env::var("RECKON_TABLE") {
        Ok(path) => {
            info!(path = %path, "loading unit table");
            let text = fs::read_to_string(&path).map_err(|e| {
                ReckonError::configuration(format!("cannot read {}: {}", path, e))
            })?;
            Reckon::new(UnitTable::from_json(&text)?)
        }
        Err(_) => Ok(Reckon::with_builtin_units()),
    }
}

/// One result line in the selected output mode
fn format_value(reckon: &Reckon, options: &Options, value: &Value) -> Result<String, ReckonError> {
    let text = match &options.target {
        Some(unit) => reckon.convert(value, unit)?,
        None => {
            let renderer = reckon.renderer();
            let renderer = if options.base { renderer.with_base_units() } else { renderer };
            renderer.text(value)?
        }
    };

    if !options.json {
        return Ok(text);
    }

    let rendered = Rendered {
        text,
        canonical: value.to_string(),
        value: value.clone(),
    };
    Ok(json!({ "ok": rendered }).to_string())
}

fn format_error(options: &Options, input: &str, err: &ReckonError) -> String {
    if options.json {
        json!({ "input": input, "error": err }).to_string()
    } else {
        format!("{}: {}", input, err)
    }
}

/// Evaluate every input; returns output lines and whether all succeeded
fn run(reckon: &Reckon, options: &Options, inputs: &[String]) -> (Vec<String>, bool) {
    let mut lines = Vec::new();
    let mut ok = true;

    if options.sum {
        let mut values = Vec::with_capacity(inputs.len());
        for input in inputs {
            match reckon.literal(input) {
                Ok(v) => values.push(v),
                Err(e) => {
                    lines.push(format_error(options, input, &e));
                    return (lines, false);
                }
            }
        }
        let line = reckon
            .sum(&values)
            .and_then(|total| format_value(reckon, options, &total))
            .unwrap_or_else(|e| {
                ok = false;
                format_error(options, "sum", &e)
            });
        lines.push(line);
        return (lines, ok);
    }

    for input in inputs {
        let line = reckon
            .literal(input)
            .and_then(|v| format_value(reckon, options, &v))
            .unwrap_or_else(|e| {
                ok = false;
                format_error(options, input, &e)
            });
        lines.push(line);
    }
    (lines, ok)
}

fn list_units(reckon: &Reckon) -> Result<Vec<String>, ReckonError> {
    let registry = reckon.units().registry()?;
    let graph = reckon.units().graph();

    Ok(registry
        .primes()
        .map(|(prime, name)| {
            let (scale, base) = graph.preferred_unit(name);
            if graph.contains(name) {
                format!("{:<12} prime {:<4} = {} {}", name.as_str(), prime, scale, base)
            } else {
                format!("{:<12} prime {:<4}", name.as_str(), prime)
            }
        })
        .collect())
}

fn read_stdin_inputs() -> io::Result<Vec<String>> {
    let mut inputs = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            inputs.push(line.to_string());
        }
    }
    Ok(inputs)
}

fn main() -> ExitCode {
    let options = match parse_args(env::args().skip(1)) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("reckon: {}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };
    if options.help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    init_logging();

    let reckon = match load_engine() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("reckon: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if options.list_units {
        return match list_units(&reckon) {
            Ok(lines) => {
                lines.iter().for_each(|l| println!("{}", l));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("reckon: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let inputs = if options.inputs.is_empty() {
        if io::stdin().is_terminal() {
            eprintln!("reading quantities from stdin, one per line (Ctrl-D to finish)");
        }
        match read_stdin_inputs() {
            Ok(inputs) => inputs,
            Err(e) => {
                eprintln!("reckon: cannot read stdin: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        options.inputs.clone()
    };
    debug!(count = inputs.len(), "evaluating inputs");

    let (lines, ok) = run(&reckon, &options, &inputs);
    for line in &lines {
        println!("{}", line);
    }

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
