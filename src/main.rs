//! UML Canvas CLI
//!
//! Usage:
//!   uml-canvas [OPTIONS] [FILE]
//!
//! Reads an interchange document, routes every relationship, applies the
//! requested edits in command-line order and prints the exported document.
//!
//! Options:
//!   --move <ID:DX,DY>         Move an element by a delta
//!   --resize <ID:DW,DH>       Resize an element by a delta
//!   --delete <ID>             Delete an element and everything attached to it
//!   -c, --config <FILE>       Editor configuration (TOML format)
//!   -t, --diagram-type <TYPE> Diagram type of the imported document
//!   --compact                 Print the document on a single line
//!   --log-level <LEVEL>       Log level written to stderr
//!   -h, --help                Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::{process, str::FromStr};

use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use log::{debug, error, LevelFilter};

use uml_canvas::{load, save, Action, DiagramType, EditorConfig, Error};

#[derive(Parser, Debug)]
#[command(name = "uml-canvas")]
#[command(about = "Apply edits to a UML diagram and keep its relationships routed")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Move an element: ID:DX,DY
    #[arg(long = "move", value_name = "ID:DX,DY", value_parser = parse_delta)]
    moves: Vec<(String, f64, f64)>,

    /// Resize an element: ID:DW,DH
    #[arg(long = "resize", value_name = "ID:DW,DH", value_parser = parse_delta)]
    resizes: Vec<(String, f64, f64)>,

    /// Delete an element
    #[arg(long = "delete", value_name = "ID")]
    deletes: Vec<String>,

    /// Editor configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Diagram type of the imported document
    #[arg(short = 't', long, value_enum, default_value_t = DiagramArg::Class)]
    diagram_type: DiagramArg,

    /// Print the exported document on a single line
    #[arg(long)]
    compact: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DiagramArg {
    Class,
    Object,
    Activity,
    UseCase,
    Communication,
    Deployment,
}

impl From<DiagramArg> for DiagramType {
    fn from(arg: DiagramArg) -> Self {
        match arg {
            DiagramArg::Class => DiagramType::ClassDiagram,
            DiagramArg::Object => DiagramType::ObjectDiagram,
            DiagramArg::Activity => DiagramType::ActivityDiagram,
            DiagramArg::UseCase => DiagramType::UseCaseDiagram,
            DiagramArg::Communication => DiagramType::CommunicationDiagram,
            DiagramArg::Deployment => DiagramType::DeploymentDiagram,
        }
    }
}

/// Parse `ID:A,B` into its id and two numbers
fn parse_delta(value: &str) -> Result<(String, f64, f64), String> {
    let (id, delta) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected ID:A,B, got '{}'", value))?;
    let (a, b) = delta
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated numbers, got '{}'", delta))?;
    let parse = |n: &str| {
        n.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number '{}': {}", n, e))
    };
    Ok((id.to_string(), parse(a)?, parse(b)?))
}

/// Edits from all flags, in the order they appeared on the command line
fn ordered_edits(cli: &Cli, matches: &ArgMatches) -> Vec<Action> {
    let indices = |id: &str| -> Vec<usize> {
        matches
            .indices_of(id)
            .map(|indices| indices.collect())
            .unwrap_or_default()
    };

    let mut edits: Vec<(usize, Action)> = Vec::new();
    for (index, (id, dx, dy)) in indices("moves").into_iter().zip(&cli.moves) {
        edits.push((index, Action::move_by([id.as_str()], *dx, *dy)));
    }
    for (index, (id, dw, dh)) in indices("resizes").into_iter().zip(&cli.resizes) {
        edits.push((index, Action::resize_by([id.as_str()], *dw, *dh)));
    }
    for (index, id) in indices("deletes").into_iter().zip(&cli.deletes) {
        edits.push((index, Action::delete([id.as_str()])));
    }
    edits.sort_by_key(|(index, _)| *index);
    edits.into_iter().map(|(_, action)| action).collect()
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => match EditorConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };

    // Read input
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    };

    let options = config.import_options(cli.diagram_type.into());
    let mut editor = match load(&source, &options) {
        Ok(editor) => editor,
        Err(Error::Interchange(e)) => {
            eprintln!("{}", e.format(&source, &filename));
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    for action in ordered_edits(&cli, &matches) {
        let tag = action.tag();
        match editor.dispatch(action) {
            Ok(commits) => debug!(action = tag, commits = commits.len(); "Applied edit"),
            Err(err) => {
                error!(err:err; "Edit failed");
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        }
    }

    match save(editor.state(), cli.compact) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delta() {
        assert_eq!(
            parse_delta("a:50,-10.5").unwrap(),
            ("a".to_string(), 50.0, -10.5)
        );
        assert!(parse_delta("a50,10").is_err());
        assert!(parse_delta("a:50").is_err());
        assert!(parse_delta("a:x,1").is_err());
    }

    #[test]
    fn test_edits_follow_command_line_order() {
        let args = [
            "uml-canvas", "--delete", "c", "--move", "a:1,2", "--resize", "b:3,4", "--move", "b:5,6",
        ];
        let matches = Cli::command().get_matches_from(args);
        let cli = Cli::from_arg_matches(&matches).unwrap();
        let tags: Vec<&str> = ordered_edits(&cli, &matches).iter().map(Action::tag).collect();
        assert_eq!(tags, vec!["DELETE", "MOVE", "RESIZE", "MOVE"]);
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
