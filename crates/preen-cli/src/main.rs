use preen::{Dirty, SanitizeOptions, Sanitizer};
use preen_markdown::{MarkdownCompiler, MarkdownOptions, Message, render_transcript};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Json(serde_json::Error),
    Sanitize(preen::Error),
    Markdown(preen_markdown::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Sanitize(err) => write!(f, "{err}"),
            CliError::Markdown(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<preen::Error> for CliError {
    fn from(value: preen::Error) -> Self {
        Self::Sanitize(value)
    }
}

impl From<preen_markdown::Error> for CliError {
    fn from(value: preen_markdown::Error) -> Self {
        Self::Markdown(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Sanitize,
    Check,
    Transcript,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    config_file: Option<String>,
    markdown: bool,
    breaks: bool,
    smartypants: bool,
    header_ids: bool,
    report: bool,
    pretty: bool,
    positional: Vec<String>,
}

#[derive(Serialize)]
struct ReportOut<'a> {
    html: &'a str,
    removed: Vec<Value>,
}

fn usage() -> &'static str {
    "preen-cli\n\
\n\
USAGE:\n\
  preen-cli [sanitize] [--config <json>|--config-file <path>] [--markdown] [--breaks] [--smartypants] [--header-ids] [--report] [--pretty] [<path>|-]\n\
  preen-cli check [--config <json>|--config-file <path>] <tag> <attr> <value>\n\
  preen-cli transcript [--config <json>|--config-file <path>] [--breaks] [--smartypants] [--header-ids] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - --config takes DOMPurify-style options, e.g. '{\"ALLOWED_TAGS\":[\"b\"]}'.\n\
  - --markdown compiles the input as Markdown before sanitizing it.\n\
  - --report prints {\"html\": ..., \"removed\": [...]} instead of bare HTML.\n\
  - check prints true or false.\n\
  - transcript reads a JSON array of {\"role\", \"content\"} messages.\n\
  - Set RUST_LOG (e.g. RUST_LOG=preen=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut explicit_command = false;

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "sanitize" | "check" | "transcript"
                if !explicit_command && args.positional.is_empty() && args.input.is_none() =>
            {
                explicit_command = true;
                args.command = match a.as_str() {
                    "check" => Command::Check,
                    "transcript" => Command::Transcript,
                    _ => Command::Sanitize,
                };
            }
            "--markdown" => args.markdown = true,
            "--breaks" => args.breaks = true,
            "--smartypants" => args.smartypants = true,
            "--header-ids" => args.header_ids = true,
            "--report" => args.report = true,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(json) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(json.clone());
            }
            "--config-file" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config_file = Some(path.clone());
            }
            "--" => {
                args.positional.extend(it.by_ref().cloned());
            }
            "-" => args.positional.push(a.clone()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            value => args.positional.push(value.to_string()),
        }
    }

    if args.config.is_some() && args.config_file.is_some() {
        return Err(CliError::Usage(usage()));
    }

    match args.command {
        Command::Check => {
            if args.positional.len() != 3 {
                return Err(CliError::Usage(usage()));
            }
        }
        Command::Sanitize | Command::Transcript => {
            if args.positional.len() > 1 {
                return Err(CliError::Usage(usage()));
            }
            args.input = args.positional.pop();
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_options(args: &Args) -> Result<SanitizeOptions, CliError> {
    let raw = match (&args.config, &args.config_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Ok(SanitizeOptions::default()),
    };
    let value: Value = serde_json::from_str(&raw)?;
    if !value.is_object() {
        return Err(CliError::Usage("--config must be a JSON object"));
    }
    Ok(SanitizeOptions::from_value(value))
}

fn compiler(args: &Args) -> MarkdownCompiler {
    MarkdownCompiler::new(MarkdownOptions {
        breaks: args.breaks,
        smartypants: args.smartypants,
        header_ids: args.header_ids,
        ..MarkdownOptions::default()
    })
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let options = load_options(&args)?;
    let mut sanitizer = Sanitizer::new();

    match args.command {
        Command::Check => {
            sanitizer.set_config(&options)?;
            let [tag, attr, value] = [&args.positional[0], &args.positional[1], &args.positional[2]];
            println!("{}", sanitizer.is_valid_attribute(tag, attr, value));
            Ok(())
        }
        Command::Transcript => {
            let text = read_input(args.input.as_deref())?;
            let messages: Vec<Message> = serde_json::from_str(&text)?;
            sanitizer.set_config(&options)?;
            let rendered = render_transcript(&mut sanitizer, &compiler(&args), &messages)?;
            write_json(&rendered, args.pretty)
        }
        Command::Sanitize => {
            let mut text = read_input(args.input.as_deref())?;
            if args.markdown {
                text = compiler(&args).compile(&text);
            }
            let html = sanitizer
                .sanitize(Dirty::Markup(&text), Some(&options))?
                .into_html();
            tracing::debug!(removed = sanitizer.removed().len(), "sanitized input");

            if args.report {
                let out = ReportOut {
                    html: &html,
                    removed: sanitizer.removed().iter().map(|r| r.to_json()).collect(),
                };
                write_json(&out, args.pretty)
            } else {
                print!("{html}");
                Ok(())
            }
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging();

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
