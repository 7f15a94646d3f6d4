#![forbid(unsafe_code)]

//! Command-line argument parsing for `tscat`.
//!
//! Arguments are parsed by hand. Environment variables with the `TSCAT_`
//! prefix are applied first; explicit flags override them.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
tscat: inspect Qt Linguist translation catalogs

USAGE:
    tscat <COMMAND> [OPTIONS] <ARGS>...

COMMANDS:
    stats <FILE>...                    Message counts per file, lrelease style
    check <FILE>...                    Placeholder, numerus and phrase checks
    lookup <FILE> <CONTEXT> <SOURCE> [ARG]...
                                       Translate one source text
    fmt <FILE>                         Rewrite a file in lupdate layout
    coverage <TEMPLATE> <FILE>...      Share of template keys each file translates

OPTIONS:
    --json               Machine-readable output (stats, check, lookup, coverage)
    --strict             Fail on unreadable messages; check also fails on warnings
    --old-source         lookup: also match a message's previous source text
    --disambiguation=S   lookup: disambiguation comment
    --count=N            lookup: numerus count for %n
    --output=PATH        fmt: write here instead of stdout
    --help, -h           Show this help message
    --version, -V        Show version

EXIT STATUS:
    0  success
    1  check found problems, or the command line was invalid
    2  a file could not be read or parsed

ENVIRONMENT VARIABLES:
    TSCAT_LOG            Log filter directive (default: warn), e.g. debug, tscat=trace
    TSCAT_LOG_JSON       Emit logs as JSON lines (1/true)
    TSCAT_FORMAT         Output format: 'text' or 'json' (overridden by --json)
    TSCAT_STRICT         Override --strict (1/true to enable)";

/// What to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Stats {
        files: Vec<PathBuf>,
    },
    Check {
        files: Vec<PathBuf>,
    },
    Lookup {
        file: PathBuf,
        context: String,
        source: String,
        args: Vec<String>,
    },
    Fmt {
        file: PathBuf,
    },
    Coverage {
        reference: PathBuf,
        files: Vec<PathBuf>,
    },
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub command: Command,
    /// JSON instead of text output.
    pub json: bool,
    /// Strict parsing; warnings fail `check`.
    pub strict: bool,
    /// Serve translations requested by their old source text.
    pub old_source: bool,
    pub disambiguation: Option<String>,
    pub count: Option<i64>,
    /// Destination for `fmt`; stdout when absent.
    pub output: Option<PathBuf>,
    /// Log records as JSON lines.
    pub log_json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseError {
    Help,
    Version,
    MissingCommand,
    UnknownCommand(String),
    /// Wrong number of operands for the command.
    Usage(&'static str),
    InvalidValue { flag: &'static str, value: String },
    UnknownArg(String),
}

/// Flags and settings gathered before the command is assembled.
#[derive(Debug, Default)]
struct Settings {
    json: bool,
    strict: bool,
    old_source: bool,
    disambiguation: Option<String>,
    count: Option<i64>,
    output: Option<PathBuf>,
    log_json: bool,
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl Opts {
    /// Parse command-line arguments and environment variables.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        match Self::parse_from_env_and_args(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(ParseError::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Err(ParseError::Version) => {
                println!("tscat {VERSION}");
                process::exit(0);
            }
            Err(ParseError::MissingCommand) => {
                eprintln!("Missing command.");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
            Err(ParseError::UnknownCommand(name)) => {
                eprintln!("Unknown command: {name}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
            Err(ParseError::Usage(usage)) => {
                eprintln!("Usage: {usage}");
                process::exit(1);
            }
            Err(ParseError::InvalidValue { flag, value }) => {
                eprintln!("Invalid {flag} value: {value}");
                process::exit(1);
            }
            Err(ParseError::UnknownArg(arg)) => {
                eprintln!("Unknown argument: {arg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    fn parse_from_env_and_args<I, S, F>(args: I, get_env: F) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();

        // Apply environment variable defaults first
        if let Some(val) = get_env("TSCAT_FORMAT") {
            settings.json = val.trim().eq_ignore_ascii_case("json");
        }
        if let Some(val) = get_env("TSCAT_STRICT") {
            settings.strict = env_flag(&val);
        }
        if let Some(val) = get_env("TSCAT_LOG_JSON") {
            settings.log_json = env_flag(&val);
        }

        // Parse command-line args (override env vars)
        let mut positional = Vec::new();
        let mut operands_only = false;
        for arg in args {
            let arg = arg.as_ref();
            if operands_only || !arg.starts_with('-') || arg == "-" {
                positional.push(arg.to_string());
                continue;
            }
            match arg {
                "--help" | "-h" => return Err(ParseError::Help),
                "--version" | "-V" => return Err(ParseError::Version),
                "--" => operands_only = true,
                "--json" => settings.json = true,
                "--strict" => settings.strict = true,
                "--old-source" => settings.old_source = true,
                other => {
                    if let Some(val) = other.strip_prefix("--disambiguation=") {
                        settings.disambiguation = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--count=") {
                        match val.parse() {
                            Ok(n) => settings.count = Some(n),
                            Err(_) => {
                                return Err(ParseError::InvalidValue {
                                    flag: "--count",
                                    value: val.to_string(),
                                });
                            }
                        }
                    } else if let Some(val) = other.strip_prefix("--output=") {
                        if val.is_empty() {
                            return Err(ParseError::InvalidValue {
                                flag: "--output",
                                value: val.to_string(),
                            });
                        }
                        settings.output = Some(PathBuf::from(val));
                    } else {
                        return Err(ParseError::UnknownArg(other.to_string()));
                    }
                }
            }
        }

        let command = build_command(positional)?;
        Ok(Self {
            command,
            json: settings.json,
            strict: settings.strict,
            old_source: settings.old_source,
            disambiguation: settings.disambiguation,
            count: settings.count,
            output: settings.output,
            log_json: settings.log_json,
        })
    }
}

fn build_command(positional: Vec<String>) -> Result<Command, ParseError> {
    let mut operands = positional.into_iter();
    let name = operands.next().ok_or(ParseError::MissingCommand)?;
    let operands: Vec<String> = operands.collect();
    let paths = |items: &[String]| items.iter().map(PathBuf::from).collect::<Vec<_>>();

    match name.as_str() {
        "stats" if !operands.is_empty() => Ok(Command::Stats {
            files: paths(&operands),
        }),
        "stats" => Err(ParseError::Usage("tscat stats <FILE>...")),
        "check" if !operands.is_empty() => Ok(Command::Check {
            files: paths(&operands),
        }),
        "check" => Err(ParseError::Usage("tscat check <FILE>...")),
        "lookup" if operands.len() >= 3 => {
            let mut operands = operands.into_iter();
            let (Some(file), Some(context), Some(source)) =
                (operands.next(), operands.next(), operands.next())
            else {
                return Err(ParseError::Usage(
                    "tscat lookup <FILE> <CONTEXT> <SOURCE> [ARG]...",
                ));
            };
            Ok(Command::Lookup {
                file: PathBuf::from(file),
                context,
                source,
                args: operands.collect(),
            })
        }
        "lookup" => Err(ParseError::Usage(
            "tscat lookup <FILE> <CONTEXT> <SOURCE> [ARG]...",
        )),
        "fmt" if operands.len() == 1 => Ok(Command::Fmt {
            file: PathBuf::from(&operands[0]),
        }),
        "fmt" => Err(ParseError::Usage("tscat fmt <FILE> [--output=PATH]")),
        "coverage" if operands.len() >= 2 => Ok(Command::Coverage {
            reference: PathBuf::from(&operands[0]),
            files: paths(&operands[1..]),
        }),
        "coverage" => Err(ParseError::Usage("tscat coverage <TEMPLATE> <FILE>...")),
        _ => Err(ParseError::UnknownCommand(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Opts, ParseError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Opts::parse_from_env_and_args(args.iter().copied(), |key| env.get(key).cloned())
    }

    #[test]
    fn stats_with_defaults() {
        let opts = parse(&["stats", "a_de.ts", "b_fr.ts"], &[]).expect("parse");
        assert_eq!(
            opts.command,
            Command::Stats {
                files: vec![PathBuf::from("a_de.ts"), PathBuf::from("b_fr.ts")]
            }
        );
        assert!(!opts.json);
        assert!(!opts.strict);
        assert!(!opts.log_json);
    }

    #[test]
    fn lookup_with_flags_anywhere() {
        let opts = parse(
            &[
                "--count=3",
                "lookup",
                "app_de.ts",
                "MainWindow",
                "Line: %1,  Position: %2",
                "--disambiguation=status bar",
                "4",
                "10",
            ],
            &[],
        )
        .expect("parse");
        assert_eq!(
            opts.command,
            Command::Lookup {
                file: PathBuf::from("app_de.ts"),
                context: "MainWindow".into(),
                source: "Line: %1,  Position: %2".into(),
                args: vec!["4".into(), "10".into()],
            }
        );
        assert_eq!(opts.count, Some(3));
        assert_eq!(opts.disambiguation.as_deref(), Some("status bar"));
    }

    #[test]
    fn double_dash_allows_dash_operands() {
        let opts = parse(&["lookup", "app.ts", "C", "--", "-x", "--y"], &[]).expect("parse");
        assert_eq!(
            opts.command,
            Command::Lookup {
                file: PathBuf::from("app.ts"),
                context: "C".into(),
                source: "-x".into(),
                args: vec!["--y".into()],
            }
        );
    }

    #[test]
    fn env_applies_and_flags_override() {
        let env = [
            ("TSCAT_FORMAT", "json"),
            ("TSCAT_STRICT", "0"),
            ("TSCAT_LOG_JSON", "true"),
        ];
        let opts = parse(&["check", "a.ts"], &env).expect("parse");
        assert!(opts.json);
        assert!(!opts.strict);
        assert!(opts.log_json);

        let opts = parse(&["check", "a.ts", "--strict"], &env).expect("parse");
        assert!(opts.strict);
    }

    #[test]
    fn operand_counts_are_checked() {
        assert_eq!(parse(&[], &[]), Err(ParseError::MissingCommand));
        assert!(matches!(
            parse(&["check"], &[]),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(
            parse(&["lookup", "a.ts", "C"], &[]),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(
            parse(&["fmt", "a.ts", "b.ts"], &[]),
            Err(ParseError::Usage(_))
        ));
        assert!(matches!(
            parse(&["coverage", "template.ts"], &[]),
            Err(ParseError::Usage(_))
        ));
        assert_eq!(
            parse(&["compile", "a.ts"], &[]),
            Err(ParseError::UnknownCommand("compile".into()))
        );
    }

    #[test]
    fn bad_flags() {
        assert_eq!(
            parse(&["lookup", "a.ts", "C", "S", "--count=many"], &[]),
            Err(ParseError::InvalidValue {
                flag: "--count",
                value: "many".into()
            })
        );
        assert_eq!(
            parse(&["stats", "a.ts", "--verbose"], &[]),
            Err(ParseError::UnknownArg("--verbose".into()))
        );
        assert_eq!(parse(&["-h"], &[]), Err(ParseError::Help));
        assert_eq!(parse(&["stats", "-V"], &[]), Err(ParseError::Version));
    }

    #[test]
    fn fmt_output_and_coverage() {
        let opts = parse(&["fmt", "a_de.ts", "--output=out.ts"], &[]).expect("parse");
        assert_eq!(
            opts.command,
            Command::Fmt {
                file: PathBuf::from("a_de.ts")
            }
        );
        assert_eq!(opts.output, Some(PathBuf::from("out.ts")));

        let opts = parse(&["coverage", "app.ts", "app_de.ts", "app_fr.ts"], &[]).expect("parse");
        assert_eq!(
            opts.command,
            Command::Coverage {
                reference: PathBuf::from("app.ts"),
                files: vec![PathBuf::from("app_de.ts"), PathBuf::from("app_fr.ts")],
            }
        );
    }
}
