//! tcfmt - Formatter for Structured Text embedded in TwinCAT source XML files

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};

use glob::Pattern;
use rayon::prelude::*;
use walkdir::WalkDir;

use tcfmt::config;
use tcfmt::{format_lines, parse_args, split_lines, CliArgs, FormatConfig, Properties, Result};

/// Aggregate counters for one run, shared across worker threads.
#[derive(Debug, Default)]
struct RunCounters {
    /// Files read and put through the pipeline
    checked: AtomicUsize,
    /// Files that need changes
    to_alter: AtomicUsize,
    /// Files actually re-saved to disk
    resaved: AtomicUsize,
    /// Files that could not be collected, read or written
    errors: AtomicUsize,
}

fn main() -> Result<ExitCode> {
    let args = parse_args();

    // Configure thread pool if --jobs specified
    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                eprintln!("Warning: failed to configure thread pool: {e}");
            }
        }
    }

    let counters = RunCounters::default();

    let files = collect_files(&args, &counters);
    if files.is_empty() {
        if !args.silent {
            eprintln!("No TwinCAT files found to format.");
        }
        let errors = counters.errors.load(Ordering::Relaxed);
        if errors > 0 {
            eprintln!("{errors} error(s) occurred");
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Resolve options for every file before touching any of them, so an
    // invalid option aborts the run with nothing half-formatted.
    let resolved = resolve_configs(&files, &args)?;

    let use_parallel = matches!(args.jobs, Some(jobs) if jobs != 1);
    if use_parallel {
        resolved
            .par_iter()
            .for_each(|(path, config)| process_single_file(path, config, &args, &counters));
    } else {
        // Default: sequential, in the order the targets were given
        for (path, config) in &resolved {
            process_single_file(path, config, &args, &counters);
        }
    }

    Ok(summarize(&args, &counters))
}

/// Resolve the formatting options for every file up front.
///
/// An explicit `--config` file replaces auto-discovery and is read once;
/// otherwise each file gets the profile discovered from its own location.
/// CLI options override either source.
fn resolve_configs(files: &[PathBuf], args: &CliArgs) -> Result<Vec<(PathBuf, FormatConfig)>> {
    // Silent wins over debug
    let debug = args.debug && !args.silent;
    let explicit = if let Some(path) = &args.config {
        if debug {
            eprintln!("[DEBUG] Using explicit config file: {}", path.display());
        }
        Some(config::properties_from_file(path)?)
    } else {
        None
    };

    let mut resolved = Vec::with_capacity(files.len());
    for path in files {
        let mut props = if let Some(props) = &explicit {
            props.clone()
        } else {
            if debug {
                let discovered = config::discover_config_files(path);
                if discovered.is_empty() {
                    eprintln!("[DEBUG] No config files discovered for: {}", path.display());
                } else {
                    eprintln!("[DEBUG] Discovered config files for {}:", path.display());
                    for file in &discovered {
                        eprintln!("[DEBUG]   - {}", file.display());
                    }
                }
            }
            config::properties_from_discovered_files(path)
        };
        apply_cli_overrides(&mut props, args);

        let config = FormatConfig::from_properties(&props)?;
        if debug {
            eprintln!("[DEBUG] Options for {}: {config:?}", path.display());
        }
        resolved.push((path.clone(), config));
    }

    Ok(resolved)
}

/// Fold CLI options into a resolved profile; the CLI wins over config files.
fn apply_cli_overrides(props: &mut Properties, args: &CliArgs) {
    if let Some(v) = args.indent_size {
        props.insert("indent_size".to_string(), v.to_string());
    }
    if let Some(v) = args.tab_width {
        props.insert("tab_width".to_string(), v.to_string());
    }
    if let Some(v) = &args.indent_style {
        props.insert("indent_style".to_string(), v.clone());
    }
    if let Some(v) = &args.end_of_line {
        props.insert("end_of_line".to_string(), v.clone());
    }
    if let Some(v) = args.trim_trailing_whitespace {
        props.insert("trim_trailing_whitespace".to_string(), v.to_string());
    }
    if let Some(v) = args.insert_final_newline {
        props.insert("insert_final_newline".to_string(), v.to_string());
    }
    if let Some(v) = args.align_variables {
        props.insert("twincat_align_variables".to_string(), v.to_string());
    }
    if let Some(v) = args.parentheses_conditionals {
        props.insert(
            "twincat_parentheses_conditionals".to_string(),
            v.to_string(),
        );
    }
}

/// Collect all files to process, handling directories and the recursive flag
///
/// Explicit file targets are taken as-is; directory targets are searched for
/// names matching a filter pattern. Missing targets are reported and skipped.
fn collect_files(args: &CliArgs, counters: &RunCounters) -> Vec<PathBuf> {
    let filters = compile_patterns(&args.filters, "filter", counters);
    let excludes = compile_patterns(&args.exclude, "exclude", counters);

    let mut files = Vec::new();

    for target in &args.targets {
        if target.is_file() {
            if !is_excluded(target, &excludes) {
                files.push(target.clone());
            }
        } else if target.is_dir() {
            // WalkDir reports symlink loops as errors when follow_links is
            // on; those entries are skipped via filter_map(ok). max_depth
            // caps runaway traversal in pathological directory structures.
            let max_depth = if args.recursive { 256 } else { 1 };
            for entry in WalkDir::new(target)
                .follow_links(true)
                .max_depth(max_depth)
                .into_iter()
                .filter_map(std::result::Result::ok)
            {
                let path = entry.path();
                if path.is_file()
                    && matches_filter(path, &filters)
                    && !is_excluded(path, &excludes)
                {
                    files.push(path.to_path_buf());
                }
            }
        } else {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            eprintln!(
                "Error: could not find path or folder `{}`",
                target.display()
            );
        }
    }

    // Overlapping targets can collect the same file twice; keep the first
    let mut seen = HashSet::new();
    files.retain(|path| seen.insert(path.clone()));

    files
}

/// Compile glob patterns, reporting and counting the ones that do not parse.
///
/// A typo in `--filter` must not shrink the file set without a trace: under
/// `--check` that would pass with zero files inspected.
fn compile_patterns(raw: &[String], label: &str, counters: &RunCounters) -> Vec<Pattern> {
    let mut patterns = Vec::with_capacity(raw.len());
    for text in raw {
        match Pattern::new(text) {
            Ok(pattern) => patterns.push(pattern),
            Err(e) => {
                counters.errors.fetch_add(1, Ordering::Relaxed);
                eprintln!("Error: invalid {label} pattern `{text}`: {e}");
            }
        }
    }
    patterns
}

/// Check if a file name matches any of the filter patterns
fn matches_filter(path: &Path, patterns: &[Pattern]) -> bool {
    path.file_name().is_some_and(|name| {
        let name = name.to_string_lossy();
        patterns.iter().any(|pattern| pattern.matches(&name))
    })
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    for pattern in patterns {
        // Match against full path
        if pattern.matches(&path_str) {
            return true;
        }

        // Match against file name only
        if let Some(file_name) = path.file_name() {
            if pattern.matches(&file_name.to_string_lossy()) {
                return true;
            }
        }

        // Match against each path component (for directory patterns)
        for component in path.components() {
            if let std::path::Component::Normal(c) = component {
                if pattern.matches(&c.to_string_lossy()) {
                    return true;
                }
            }
        }
    }

    false
}

/// Format (or check) a single file.
///
/// Read and write failures are counted and reported without aborting the
/// batch.
fn process_single_file(path: &Path, config: &FormatConfig, args: &CliArgs, counters: &RunCounters) {
    let raw = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            eprintln!("Error reading {}: {e}", path.display());
            return;
        }
    };
    // Lossy decode, so a stray byte does not fail the whole file
    let text = String::from_utf8_lossy(&raw).into_owned();

    counters.checked.fetch_add(1, Ordering::Relaxed);

    // Silent wins over debug
    let debug = args.debug && !args.silent;
    if debug {
        eprintln!("[DEBUG] Processing {}", path.display());
    }

    let report = format_lines(split_lines(&text), config);

    if args.dry || debug {
        for entry in &report.corrections {
            let line = format!(
                "{}{}:{}\t{}",
                path.display(),
                entry.tag(),
                entry.line + 1,
                entry.message
            );
            if args.dry {
                println!("{line}");
            } else {
                eprintln!("[DEBUG] {line}");
            }
        }
    }

    if report.corrections.is_empty() {
        return;
    }
    counters.to_alter.fetch_add(1, Ordering::Relaxed);

    if args.check || args.dry {
        return;
    }

    let output = report.assemble();
    if output == text {
        return;
    }

    match write_atomic(path, &output) {
        Ok(()) => {
            counters.resaved.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            counters.errors.fetch_add(1, Ordering::Relaxed);
            eprintln!("Error writing {}: {e}", path.display());
        }
    }
}

/// Replace a file's content through a temp file and an atomic rename, so no
/// partial write is ever left on disk.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Print the per-run summary and produce the process exit code.
fn summarize(args: &CliArgs, counters: &RunCounters) -> ExitCode {
    let checked = counters.checked.load(Ordering::Relaxed);
    let to_alter = counters.to_alter.load(Ordering::Relaxed);
    let resaved = counters.resaved.load(Ordering::Relaxed);
    let errors = counters.errors.load(Ordering::Relaxed);

    if !args.silent {
        eprintln!("Checked {checked} file(s)");
    }

    let code = if args.check {
        if to_alter == 0 {
            if !args.silent {
                eprintln!("No changes to be made in checked files!");
            }
            ExitCode::SUCCESS
        } else {
            if !args.silent {
                eprintln!("{to_alter} file(s) should be altered");
            }
            ExitCode::FAILURE
        }
    } else {
        if !args.silent {
            if args.dry {
                eprintln!("{to_alter} file(s) would be re-saved");
            } else {
                eprintln!("Re-saved {resaved} file(s)");
            }
        }
        ExitCode::SUCCESS
    };

    // Errors are never silenced, but they do not change the exit code
    if errors > 0 {
        eprintln!("{errors} error(s) occurred");
    }

    code
}
