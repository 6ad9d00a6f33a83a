//! Purpose: `cogcfg` CLI entry point.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (compact JSON unless pretty/TTY).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: Logs go to stderr via `tracing`; stdout carries only payloads.
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use tracing_subscriber::EnvFilter;

mod color_json;
mod command_dispatch;

use cogcfg::api::{Error, ErrorKind, load_from_file_with_max_depth, to_exit_code};
use cogcfg::json::{
    DEFAULT_MAX_DEPTH, Map, Parser as JsonParser, Value, from_slice_with_max_depth, serialize,
    to_string_pretty,
};
use cogcfg::template::Context;
use color_json::colorize_json;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                let hint = clap_error_hint(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(hint),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| {
            let replacement = arg.to_str().and_then(|value| match value {
                "---help" => Some("--help"),
                "---version" => Some("--version"),
                _ => None,
            });
            replacement.map(OsString::from).unwrap_or(arg)
        })
        .collect()
}

#[derive(Parser)]
#[command(
    name = "cogcfg",
    version,
    about = "Validate, template and format model-request JSON",
    long_about = None,
    after_help = r#"EXAMPLES
  $ cogcfg validate getDrugGeneInteractions '{"gene_ids":["COMT","HTR2A"]}'
  $ cogcfg handle '{"name":"getResearchAssociations","parameters":{}}'
  $ cogcfg resolve 'limit=${CONFIG:limit|50}' --config limit=10
  $ cogcfg build-request --prompt "Summarize COMT" --out request.json
  $ cogcfg fmt --pretty request.json

LOGGING
  Set RUST_LOG (e.g. RUST_LOG=debug) to see diagnostics on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Parse JSON and re-emit it in canonical form",
        long_about = r#"Parse a JSON document and re-emit it.

Output is compact with object keys in lexicographic order unless --pretty is set."#
    )]
    Fmt {
        #[arg(
            default_value = "-",
            help = "Input file path (use - for stdin)",
            value_hint = ValueHint::FilePath
        )]
        input: String,
        #[arg(long, help = "Indent output with two spaces")]
        pretty: bool,
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH, help = "Maximum nesting depth")]
        max_depth: usize,
    },
    #[command(
        about = "Check an endpoint's search parameters",
        after_help = r#"EXAMPLES
  $ cogcfg validate getDrugGeneInteractions '{"gene_ids":["COMT"]}'
  $ cogcfg validate getPolygeneticRiskScores -f params.json

NOTES
  - Prints a success or error envelope; exits 5 when the request is rejected"#
    )]
    Validate {
        #[arg(help = "Endpoint name")]
        endpoint: String,
        #[arg(help = "Inline JSON parameters object")]
        params: Option<String>,
        #[arg(
            short = 'f',
            long = "file",
            help = "Read parameters from a file (use - for stdin)",
            conflicts_with = "params",
            value_hint = ValueHint::FilePath
        )]
        file: Option<String>,
    },
    #[command(about = "Process a request object with a 'name' and 'parameters'")]
    Handle {
        #[arg(help = "Inline JSON request")]
        request: Option<String>,
        #[arg(
            short = 'f',
            long = "file",
            help = "Read the request from a file (use - for stdin)",
            conflicts_with = "request",
            value_hint = ValueHint::FilePath
        )]
        file: Option<String>,
    },
    #[command(
        about = "Resolve ${KIND:key} placeholders in a template",
        long_about = r#"Resolve ${KIND:key} placeholders in a template string.

Kinds: ENV (process environment), CONFIG (--config, supports key|default),
INPUT (--input). Other kinds are left as-is unless --strict is set."#
    )]
    Resolve {
        #[arg(help = "Template text")]
        template: String,
        #[arg(long = "config", value_name = "KEY=VALUE", help = "Repeatable CONFIG entry")]
        config: Vec<String>,
        #[arg(long = "input", value_name = "KEY=VALUE", help = "Repeatable INPUT entry")]
        input: Vec<String>,
        #[arg(long, help = "Fail on placeholder kinds without a substitution rule")]
        strict: bool,
    },
    #[command(about = "Build a model request document")]
    BuildRequest {
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(long, help = "Write the request to this file", value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    #[command(about = "Simulate a model call and emit its response")]
    Simulate {
        #[arg(
            long,
            help = "Request file to simulate (default: build from config flags)",
            value_hint = ValueHint::FilePath
        )]
        request: Option<PathBuf>,
        #[command(flatten)]
        config: ConfigArgs,
        #[arg(long, help = "Write the response to this file", value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
    #[command(about = "Print version info")]
    Version,
}

#[derive(Args, Debug, Default)]
struct ConfigArgs {
    #[arg(
        long = "config",
        value_name = "PATH",
        help = "Request config JSON file",
        value_hint = ValueHint::FilePath
    )]
    config_file: Option<PathBuf>,
    #[arg(long, help = "Model path")]
    model: Option<String>,
    #[arg(long, help = "Prompt text")]
    prompt: Option<String>,
    #[arg(long)]
    temperature: Option<f64>,
    #[arg(long)]
    max_tokens: Option<u32>,
    #[arg(long)]
    top_p: Option<f64>,
    #[arg(long)]
    repeat_penalty: Option<f64>,
}

fn parse_json_text(text: &str, context: &str, max_depth: usize) -> Result<Value, Error> {
    JsonParser::new(text)
        .with_max_depth(max_depth)
        .parse()
        .map_err(|err| err.into_error(context))
}

fn read_stdin() -> Result<Vec<u8>, Error> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)
    })?;
    Ok(bytes)
}

/// Reads raw bytes so invalid UTF-8 surfaces as a parse failure, not an I/O one.
fn read_json_file(path: &str, max_depth: usize) -> Result<Value, Error> {
    if path == "-" {
        return from_slice_with_max_depth(&read_stdin()?, max_depth)
            .map_err(|err| err.into_error("stdin"));
    }
    load_from_file_with_max_depth(Path::new(path), max_depth)
}

/// Inline JSON wins; otherwise `-f`; `None` when neither was given.
fn read_json_input(inline: Option<&str>, file: Option<&str>) -> Result<Option<Value>, Error> {
    match (inline, file) {
        (Some(text), _) => parse_json_text(text, "argument", DEFAULT_MAX_DEPTH).map(Some),
        (None, Some(path)) => read_json_file(path, DEFAULT_MAX_DEPTH).map(Some),
        (None, None) => Ok(None),
    }
}

fn parse_context_pairs(pairs: &[String], flag: &str) -> Result<Context, Error> {
    let mut context = Context::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid {flag} entry `{pair}`"))
                .with_hint(format!("Use {flag} KEY=VALUE, e.g. {flag} limit=50.")));
        };
        context.insert(key.to_string(), value.to_string());
    }
    Ok(context)
}

fn response_succeeded(response: &Value) -> bool {
    response.get("success").and_then(Value::as_bool) == Some(true)
}

fn response_outcome(response: &Value) -> RunOutcome {
    if response_succeeded(response) {
        RunOutcome::ok()
    } else {
        RunOutcome::with_code(to_exit_code(ErrorKind::Validation))
    }
}

fn saved_receipt(path: &Path) -> Value {
    Value::object()
        .with("saved", true)
        .with("path", path.display().to_string())
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => err.with_hint("File not found. Check the path."),
        ErrorKind::Io => err.with_hint("I/O error. Check the path, filesystem, and disk space."),
        _ => err,
    }
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("cogcfg {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            &Value::object()
                .with("name", "cogcfg")
                .with("version", env!("CARGO_PKG_VERSION")),
            false,
            color_mode,
        );
    }
}

fn emit_json(value: &Value, pretty: bool, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    let json = if pretty || is_tty {
        if use_color {
            colorize_json(value, true)
        } else {
            to_string_pretty(value)
        }
    } else {
        serialize(value)
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }
    eprintln!("{}", serialize(&error_json(err)));
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Parse => "invalid json".to_string(),
        ErrorKind::Validation => "validation failed".to_string(),
        ErrorKind::Template => "template error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), Value::from(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), Value::from(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), Value::from(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), Value::from(path.display().to_string()));
    }
    if let Some(offset) = err.offset() {
        inner.insert("offset".to_string(), Value::from(offset as f64));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert(
            "causes".to_string(),
            causes.into_iter().map(Value::from).collect(),
        );
    }

    Value::object().with("error", Value::Object(inner))
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let usage = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .map(str::trim);

    let Some(usage) = usage else {
        return "Try `cogcfg --help`.".to_string();
    };

    let tokens: Vec<&str> = usage.split_whitespace().collect();
    let Some(pos) = tokens.iter().position(|t| *t == "cogcfg") else {
        return "Try `cogcfg --help`.".to_string();
    };

    let parts: Vec<&str> = tokens
        .iter()
        .skip(pos + 1)
        .take_while(|token| {
            !(token.starts_with('-') || token.starts_with('<') || token.starts_with('['))
        })
        .copied()
        .collect();

    if parts.is_empty() {
        return "Try `cogcfg --help`.".to_string();
    }
    format!("Try `cogcfg {} --help`.", parts.join(" "))
}
