//! Command-line interface for modmail-logs
//! Renders a stored log document (JSON, or YAML by extension) to an HTML or plain-text transcript.
//!
//! Usage:
//!   modmail-logs `<path>` [--format html|text] [--config `<file>`] [--set key=value]...
//!   modmail-logs --list-kinds                  - List token kinds and whether they are enabled

use clap::{Arg, ArgAction, Command};
use modmail_logs::modmail::config::{Loader, Settings};
use modmail_logs::modmail::logging::init_logging;
use modmail_logs::modmail::token::spec_for;
use modmail_logs::modmail::{Error, LogDocument, RenderMode, TokenKind, TranscriptRenderer};
use std::path::Path;
use std::process::ExitCode;

const EXIT_FAILURE: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;

fn main() -> ExitCode {
    let matches = Command::new("modmail-logs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render archived mod-mail logs to HTML or plain text")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the stored log document (.json, .yaml, .yml)")
                .required_unless_present("list-kinds")
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: html or text")
                .value_parser(["html", "text"])
                .default_value("html"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .short('s')
                .value_name("KEY=VALUE")
                .help("Override one configuration key (e.g. transcript.timestamp_format=%H:%M)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("list-kinds")
                .long("list-kinds")
                .help("List token kinds, their precedence and whether they are enabled")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let config = matches.get_one::<String>("config");
    let overrides: Vec<&String> = matches
        .get_many::<String>("set")
        .map(|values| values.collect())
        .unwrap_or_default();
    let settings = match load_settings(config.map(String::as_str), &overrides) {
        Ok(settings) => settings,
        Err(err) => return fail(&err),
    };
    init_logging(&settings.logging.filter);

    let renderer = match TranscriptRenderer::from_settings(&settings) {
        Ok(renderer) => renderer,
        Err(err) => return fail(&err),
    };

    if matches.get_flag("list-kinds") {
        handle_list_kinds_command(&renderer);
        return ExitCode::SUCCESS;
    }

    let path = matches
        .get_one::<String>("path")
        .expect("path is required unless listing kinds");
    let mode: RenderMode = matches
        .get_one::<String>("format")
        .and_then(|format| format.parse().ok())
        .unwrap_or(RenderMode::Html);

    match handle_render_command(&renderer, Path::new(path), mode) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => fail(&err),
    }
}

fn load_settings(config: Option<&str>, overrides: &[&String]) -> Result<Settings, Error> {
    let mut loader = Loader::new();
    if let Some(path) = config {
        loader = loader.with_file(path);
    }
    for assignment in overrides {
        loader = loader.set_override_str(assignment)?;
    }
    Ok(loader.build()?)
}

/// Load and render one document
fn handle_render_command(
    renderer: &TranscriptRenderer,
    path: &Path,
    mode: RenderMode,
) -> Result<String, Error> {
    let document = LogDocument::load(path)?;
    tracing::info!(
        path = %path.display(),
        key = %document.key,
        messages = document.messages.len(),
        format = %mode,
        timestamp_format = renderer.options().timestamp_format(),
        "rendering log"
    );
    let mut output = renderer.render(&document, mode);
    if !output.ends_with('\n') && !output.is_empty() {
        output.push('\n');
    }
    Ok(output)
}

/// Handle the list-kinds command
fn handle_list_kinds_command(renderer: &TranscriptRenderer) {
    println!("{:<16} {:>10}  {:<6}  enabled", "kind", "precedence", "class");
    for kind in TokenKind::ALL {
        let spec = spec_for(kind);
        let precedence = if kind.is_structural() {
            "-".to_string()
        } else {
            spec.precedence.to_string()
        };
        let class = format!("{:?}", kind.class()).to_lowercase();
        let enabled = if renderer.dialect().enables(kind) {
            "yes"
        } else {
            "no"
        };
        println!("{:<16} {:>10}  {:<6}  {}", kind.name(), precedence, class, enabled);
    }
}

fn fail(err: &Error) -> ExitCode {
    eprintln!("Error: {err}");
    match err {
        Error::NotFound(_) => ExitCode::from(EXIT_NOT_FOUND),
        _ => ExitCode::from(EXIT_FAILURE),
    }
}
