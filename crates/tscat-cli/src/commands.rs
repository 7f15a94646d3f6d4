//! Command implementations.
//!
//! Each command writes its report to `out` and returns whether it found
//! problems. Files that cannot be read or parsed abort the command.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use tscat::{
    Catalog, DocumentStats, Issue, LoadOptions, ParseMode, Parsed, Severity, Translator, TsError,
    read_file, validate, write_document, write_file,
};

use crate::cli::{Command, Opts};

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Clean,
    /// `check` reported problems.
    Findings,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Findings => 1,
        }
    }
}

#[derive(Debug)]
pub enum CliError {
    Catalog(TsError),
    Output(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Output(err) => write!(f, "cannot write output: {err}"),
            Self::Json(err) => write!(f, "cannot encode JSON: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<TsError> for CliError {
    fn from(err: TsError) -> Self {
        Self::Catalog(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Run the selected command.
pub fn run(opts: &Opts, out: &mut dyn Write) -> Result<Outcome, CliError> {
    let mode = if opts.strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };
    match &opts.command {
        Command::Stats { files } => stats(files, mode, opts.json, out),
        Command::Check { files } => check(files, opts.strict, opts.json, out),
        Command::Lookup {
            file,
            context,
            source,
            args,
        } => lookup(opts, file, context, source, args, out),
        Command::Fmt { file } => fmt_file(file, mode, opts.output.as_deref(), out),
        Command::Coverage { reference, files } => coverage(reference, files, mode, opts.json, out),
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[derive(Serialize)]
struct FileStats<'a> {
    file: &'a Path,
    language: Option<&'a str>,
    #[serde(flatten)]
    stats: DocumentStats,
}

fn stats(
    files: &[PathBuf],
    mode: ParseMode,
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let parsed: Vec<Parsed> = files
        .iter()
        .map(|file| read_file(file, mode))
        .collect::<Result<_, _>>()?;
    let rows: Vec<FileStats<'_>> = files
        .iter()
        .zip(&parsed)
        .map(|(file, parsed)| FileStats {
            file,
            language: parsed.document.language.as_deref(),
            stats: DocumentStats::of(&parsed.document),
        })
        .collect();

    if json {
        write_json(out, &rows)?;
        return Ok(Outcome::Clean);
    }
    for row in &rows {
        writeln!(
            out,
            "{} ({}): {:.1}% complete",
            row.file.display(),
            row.language.unwrap_or("no language"),
            row.stats.completion_percent()
        )?;
        for line in row.stats.to_string().lines() {
            writeln!(out, "    {line}")?;
        }
        if row.stats.retired > 0 {
            writeln!(out, "    Kept {} retired message(s)", row.stats.retired)?;
        }
    }
    Ok(Outcome::Clean)
}

#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a Path,
    issues: Vec<Issue>,
    /// Messages that could not be read.
    skipped: Vec<String>,
}

fn check(
    files: &[PathBuf],
    strict: bool,
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let parsed = read_file(file, ParseMode::Lenient)?;
        let issues = validate(&parsed.document);
        debug!(file = %file.display(), issues = issues.len(), "checked catalog");
        reports.push(FileReport {
            file,
            issues,
            skipped: parsed.skipped.iter().map(ToString::to_string).collect(),
        });
    }

    let failed = reports.iter().any(|report| {
        let errors = report
            .issues
            .iter()
            .any(|issue| issue.severity() == Severity::Error);
        errors || (strict && (!report.issues.is_empty() || !report.skipped.is_empty()))
    });

    if json {
        write_json(out, &reports)?;
    } else {
        for report in &reports {
            let file = report.file.display();
            for skipped in &report.skipped {
                let label = if strict { "error" } else { "warning" };
                writeln!(out, "{file}: {label}: {skipped}")?;
            }
            for issue in &report.issues {
                writeln!(out, "{file}: {issue}")?;
            }
        }
        let total: usize = reports
            .iter()
            .map(|r| r.issues.len() + r.skipped.len())
            .sum();
        writeln!(out, "{total} problem(s) in {} file(s)", reports.len())?;
    }

    Ok(if failed {
        Outcome::Findings
    } else {
        Outcome::Clean
    })
}

#[derive(Serialize)]
struct LookupReport<'a> {
    context: &'a str,
    source: &'a str,
    translation: &'a str,
    translated: bool,
}

fn lookup(
    opts: &Opts,
    file: &Path,
    context: &str,
    source: &str,
    args: &[String],
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let options = LoadOptions {
        match_old_source: opts.old_source,
        ..LoadOptions::default()
    };
    let catalog = if opts.strict {
        let doc = read_file(file, ParseMode::Strict)?.document;
        Catalog::from_document(&doc, &options)
    } else {
        Catalog::try_load(file, &options)?
    };

    let disambiguation = opts.disambiguation.as_deref();
    let served = catalog.translation(context, source, disambiguation, opts.count);
    let translated = served.is_some();
    let text = served.unwrap_or_else(|| catalog.translate(context, source, None, opts.count));
    let text = tscat::placeholder::substitute(&text, args);

    if opts.json {
        write_json(
            out,
            &LookupReport {
                context,
                source,
                translation: &text,
                translated,
            },
        )?;
    } else {
        writeln!(out, "{text}")?;
    }
    Ok(Outcome::Clean)
}

fn fmt_file(
    file: &Path,
    mode: ParseMode,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let parsed = read_file(file, mode)?;
    match output {
        Some(path) => {
            write_file(&parsed.document, path)?;
            info!(from = %file.display(), to = %path.display(), "formatted catalog");
        }
        None => out.write_all(write_document(&parsed.document).as_bytes())?,
    }
    Ok(Outcome::Clean)
}

fn coverage(
    reference: &Path,
    files: &[PathBuf],
    mode: ParseMode,
    json: bool,
    out: &mut dyn Write,
) -> Result<Outcome, CliError> {
    let template = read_file(reference, mode)?.document;
    let options = LoadOptions::default();
    let mut translator = Translator::new();
    // Installed last-first so the report follows argument order.
    for file in files.iter().rev() {
        let document = read_file(file, mode)?.document;
        translator.install(Catalog::from_document(&document, &options));
    }
    let report = translator.coverage_report(&template);

    if json {
        write_json(out, &report)?;
        return Ok(Outcome::Clean);
    }
    writeln!(out, "{} key(s) in {}", report.total_keys, reference.display())?;
    for (file, locale) in files.iter().zip(&report.locales) {
        writeln!(
            out,
            "{} ({}): {}/{} ({:.1}%)",
            file.display(),
            if locale.locale.is_empty() {
                "no language"
            } else {
                locale.locale.as_str()
            },
            locale.present,
            report.total_keys,
            locale.coverage_percent
        )?;
        for key in &locale.missing {
            writeln!(out, "    missing: {key}")?;
        }
    }
    Ok(Outcome::Clean)
}
