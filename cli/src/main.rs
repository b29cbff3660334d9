use std::{
    collections::HashSet,
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use console::style;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde_yaml::Value as YamlValue;
use smelt_core::{
    analyze_units, AnalysisResult, Analyzer, Config, Language, RepoReport, SmellKind, SourceUnit,
};
use walkdir::WalkDir;

/// Structural code smell detector for Python and JavaScript sources.
#[derive(Debug, Parser)]
#[command(name = "smelt", about = "Detect structural code smells and suggest refactorings.")]
struct Args {
    /// Path to config file (YAML). Defaults to smelt.yml if present.
    #[arg(long, default_value = "smelt.yml")]
    config: PathBuf,

    /// Emit the full report as JSON instead of human-readable output.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Write the JSON report to a file (implies --json formatting for it).
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Suppress per-file output.
    #[arg(long, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Strict mode: exit non-zero when any smell is found.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,

    /// Report only these smell kinds (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "KIND[,KIND]")]
    only: Vec<String>,

    /// Exclude these smell kinds (comma-separated).
    #[arg(long, value_delimiter = ',', value_name = "KIND[,KIND]")]
    disable: Vec<String>,

    /// Drop the paired refactoring examples from the output.
    #[arg(long, action = ArgAction::SetTrue)]
    no_suggestions: bool,

    /// Files or directories to analyze.
    #[arg(value_name = "PATH", default_value = ".", num_args = 0..)]
    paths: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    let (config, config_root) = load_config(&args.config)?;
    let only = parse_kinds(&args.only)?;
    let disable = parse_kinds(&args.disable)?;

    let ignore = build_ignore_set(&config.ignore_globs)?;
    let mut files = collect_files(&args.paths, ignore.as_ref())?;
    files.sort();

    let mut units = Vec::new();
    for path in &files {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let Some(language) = Language::from_path(path) else {
            continue;
        };
        let rel = pathdiff::diff_paths(path, &config_root).unwrap_or_else(|| path.clone());
        let identifier = rel.to_string_lossy().replace('\\', "/");
        units.push(SourceUnit::new(identifier, text, language));
    }

    let analyzer = Analyzer::new(config);
    let source = config_root.to_string_lossy().replace('\\', "/");
    let mut report = analyze_units(&analyzer, &units, &source);

    for result in report
        .python
        .values_mut()
        .chain(report.javascript.values_mut())
    {
        filter_result(result, &only, &disable);
        if args.no_suggestions {
            result.refactorings.clear();
        }
    }

    if let Some(out) = &args.out {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !args.quiet {
        print_human_report(&report, args.no_suggestions);
    }

    if args.strict && !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn parse_kinds(names: &[String]) -> anyhow::Result<HashSet<SmellKind>> {
    let mut kinds = HashSet::new();
    for name in names {
        let kind = SmellKind::parse(name)
            .with_context(|| format!("Unknown smell kind `{name}`"))?;
        kinds.insert(kind);
    }
    Ok(kinds)
}

/// Drop findings outside the requested kinds. Refactorings stay aligned with
/// the surviving findings.
fn filter_result(result: &mut AnalysisResult, only: &HashSet<SmellKind>, disable: &HashSet<SmellKind>) {
    if only.is_empty() && disable.is_empty() {
        return;
    }
    let mut smells = Vec::new();
    let mut refactorings = Vec::new();
    for (i, smell) in result.smells.iter().enumerate() {
        let allowed = if !only.is_empty() {
            only.contains(&smell.kind)
        } else {
            !disable.contains(&smell.kind)
        };
        if allowed {
            smells.push(smell.clone());
            if let Some(example) = result.refactorings.get(i) {
                refactorings.push(example.clone());
            }
        }
    }
    result.smells = smells;
    result.refactorings = refactorings;
}

fn build_ignore_set(patterns: &[String]) -> anyhow::Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(Some(builder.build()?))
}

fn collect_files(paths: &[PathBuf], ignore: Option<&GlobSet>) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut walker = WalkDir::new(path).into_iter();
            while let Some(entry_res) = walker.next() {
                let entry = entry_res?;
                let entry_path = entry.path();
                if let Some(set) = ignore {
                    if set.is_match(entry_path) {
                        if entry.file_type().is_dir() {
                            walker.skip_current_dir();
                        }
                        continue;
                    }
                }
                if entry.file_type().is_file() && Language::from_path(entry_path).is_some() {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else if path.is_file() && Language::from_path(path).is_some() {
            if let Some(set) = ignore {
                if set.is_match(path) {
                    continue;
                }
            }
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn load_config(path: &Path) -> anyhow::Result<(Config, PathBuf)> {
    if path.exists() {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let value: YamlValue = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML {}", path.display()))?;
        let config: Config = serde_yaml::from_value(value)
            .with_context(|| format!("Invalid config structure in {}", path.display()))?;
        let dir = match path.parent() {
            Some(p) if p.as_os_str().is_empty() => env::current_dir()?,
            Some(p) => p.to_path_buf(),
            None => env::current_dir()?,
        };
        Ok((config, dir))
    } else {
        Ok((Config::default(), env::current_dir()?))
    }
}

fn print_human_report(report: &RepoReport, no_suggestions: bool) {
    for (path, result) in report.python.iter().chain(report.javascript.iter()) {
        print_file(path, result, no_suggestions);
    }
    println!(
        "\n{} python file(s), {} javascript file(s), {} smell(s), {} skipped",
        report.metadata.python_files,
        report.metadata.javascript_files,
        report.total_smells(),
        report.metadata.skipped_files
    );
}

fn print_file(path: &str, result: &AnalysisResult, no_suggestions: bool) {
    println!(
        "{} ({} lines, {} function(s))",
        style(path).bold(),
        result.metrics.total_lines,
        result.metrics.function_count
    );
    if result.smells.is_empty() {
        println!("  {}", style("clean").green());
        return;
    }
    for (i, smell) in result.smells.iter().enumerate() {
        match smell.span {
            Some(span) => println!(
                "  [{}] {}-{} {}",
                style(smell.kind).yellow(),
                span.start_line,
                span.end_line,
                smell.message
            ),
            None => println!("  [{}] {}", style(smell.kind).yellow(), smell.message),
        }
        if !no_suggestions {
            if let Some(example) = result.refactorings.get(i) {
                if !example.is_sentinel() {
                    println!("      suggestion: {}", example.explanation);
                }
            }
        }
    }
}
