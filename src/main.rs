mod debug_report;

use std::io::{self, IsTerminal, Read};
use tagwright::{Config, DelimiterRules, EventRule, ReplaceRule, parse_verbose, regex};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt().with_env_filter(log_filter(config.verbose)).with_writer(io::stderr).init();

    let mut replace: Config<ReplaceRule> = Config::new();
    let mut events: Config<EventRule<()>> = Config::new();
    if let Err(err) = register(&config, &mut replace, &mut events) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    let delimiters = if config.curly { DelimiterRules::curly() } else { DelimiterRules::angle() };
    let res = parse_verbose(&config.input, delimiters, &mut replace, &mut events, &mut ());
    debug_report::print_run(&config.input, &res, config.color);
}

/// `--verbose` shows every rule resolution; otherwise RUST_LOG decides.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose { EnvFilter::new("tagwright=trace") } else { EnvFilter::from_default_env() }
}

struct CliConfig {
    input: String,
    replaces: Vec<ReplaceOpt>,
    events: Vec<EventOpt>,
    curly: bool,
    color: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq)]
struct ReplaceOpt {
    id: String,
    text: String,
}

#[derive(Debug, PartialEq)]
enum EventArg {
    None,
    String(String),
    Float(f64),
    Bool(bool),
}

#[derive(Debug, PartialEq)]
struct EventOpt {
    id: String,
    arg: EventArg,
}

fn register(
    config: &CliConfig,
    replace: &mut Config<ReplaceRule>,
    events: &mut Config<EventRule<()>>,
) -> Result<(), tagwright::ConfigError> {
    for rule in &config.replaces {
        replace.add_replace_with(rule.id.as_str(), rule.text.as_str())?;
    }
    for rule in &config.events {
        let builder = events.add_event(rule.id.as_str())?;
        match &rule.arg {
            EventArg::None => {}
            EventArg::String(default) => {
                builder.with_string_data(default.as_str());
            }
            EventArg::Float(default) => {
                builder.with_float_data(*default);
            }
            EventArg::Bool(default) => {
                builder.with_bool_data(*default);
            }
        }
    }
    Ok(())
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut replaces = Vec::new();
    let mut events = Vec::new();
    let mut curly = false;
    let mut verbose = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("tagwright {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--curly" => curly = true,
            "-v" | "--verbose" => verbose = true,
            "--replace" => {
                let value = args.next().ok_or_else(|| "error: --replace expects a value".to_string())?;
                replaces.push(parse_replace(&value)?);
            }
            "--event" => {
                let value = args.next().ok_or_else(|| "error: --event expects a value".to_string())?;
                events.push(parse_event(&value)?);
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--replace=") => {
                replaces.push(parse_replace(arg.trim_start_matches("--replace="))?);
            }
            _ if arg.starts_with("--event=") => {
                events.push(parse_event(arg.trim_start_matches("--event="))?);
            }
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    if input.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { input, replaces, events, curly, color, verbose })
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn parse_replace(value: &str) -> Result<ReplaceOpt, String> {
    let caps = regex!(r"^([^=]+)=(.*)$")
        .captures(value)
        .ok_or_else(|| format!("error: invalid --replace '{value}' (expected ID=TEXT)"))?;
    Ok(ReplaceOpt { id: caps[1].to_string(), text: caps[2].to_string() })
}

fn parse_event(value: &str) -> Result<EventOpt, String> {
    let caps = regex!(r"^([^:]+)(?::(string|float|bool)=(.*))?$")
        .captures(value)
        .ok_or_else(|| format!("error: invalid --event '{value}' (expected ID[:string|float|bool=DEFAULT])"))?;

    let id = caps[1].to_string();
    let default = caps.get(3).map_or("", |m| m.as_str());
    let arg = match caps.get(2).map(|m| m.as_str()) {
        None => EventArg::None,
        Some("string") => EventArg::String(default.to_string()),
        Some("float") => EventArg::Float(
            default.parse().map_err(|_| format!("error: invalid float default '{default}' in --event '{value}'"))?,
        ),
        Some(_) => EventArg::Bool(
            default.parse().map_err(|_| format!("error: invalid bool default '{default}' in --event '{value}'"))?,
        ),
    };
    Ok(EventOpt { id, arg })
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "tagwright {version}

Inline markup parser CLI. Parses the input with the given rules and prints
the rich text, visible text, nodes and a trace of every tag.

Usage:
  tagwright [OPTIONS] [--] <input...>
  tagwright [OPTIONS] --input <text>

Options:
  -i, --input <text>         Input text to parse. If omitted, reads remaining args
                             or stdin when no args are provided.
  --replace <ID=TEXT>        Replace tags matching ID with TEXT. Repeatable.
  --event <ID[:KIND=DEFAULT]>
                             Emit an event for tags matching ID. KIND is one of
                             string, float, bool. Repeatable.
  --curly                    Use {{tag=data}} delimiters instead of <tag=data>.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -v, --verbose              Log rule resolution to stderr.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  Internal error.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replace_options() {
        assert_eq!(
            parse_replace("name=Dr. Who=42").unwrap(),
            ReplaceOpt { id: "name".to_string(), text: "Dr. Who=42".to_string() }
        );
        assert_eq!(parse_replace("empty=").unwrap().text, "");
        assert!(parse_replace("=text").is_err());
        assert!(parse_replace("novalue").is_err());
    }

    #[test]
    fn parses_event_options() {
        let cases: Vec<(&str, EventArg)> = vec![
            ("wait", EventArg::None),
            ("wait:float=1.5", EventArg::Float(1.5)),
            ("who:string=Narrator", EventArg::String("Narrator".to_string())),
            ("who:string=", EventArg::String(String::new())),
            ("shake:bool=true", EventArg::Bool(true)),
        ];
        for (value, arg) in cases {
            assert_eq!(parse_event(value).unwrap().arg, arg, "{value}");
        }

        assert!(parse_event("wait:float=soon").is_err());
        assert!(parse_event("shake:bool=yes").is_err());
        assert!(parse_event("wait:int=1").is_err());
    }

    #[test]
    fn verbose_enables_rule_resolution_logs() {
        assert_eq!(log_filter(true).to_string(), "tagwright=trace");
    }
}
