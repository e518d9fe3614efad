mod files;

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use musubi_core::metric::presets::{episode_sequence, movie_sequence};
use musubi_core::models::{Episode, MediaFile, Movie};
use musubi_core::{
    Config, IdentifierCache, Match, Matcher, MetricSequence, MusubiError, SeriesNameResolver,
};
use musubi_parse::{CancellationToken, Identifier, PatternExtractor};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, name = "musubi", about = "Match media files to episodes, movies and subtitles")]
struct Cli {
    /// Configuration file (defaults to the user config, then built-in defaults)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to daily files in this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the season/episode numbers and dates found in labels
    Parse {
        /// Only explicit season/episode markers
        #[arg(long)]
        strict: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Infer series titles from file names
    Series {
        #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
        paths: Vec<PathBuf>,
    },
    /// Match video files against catalog records
    Match {
        /// JSON array of episode or movie records
        #[arg(long, value_name = "FILE")]
        episodes: PathBuf,

        #[arg(long, value_enum, default_value_t = Kind::Episode)]
        kind: Kind,

        /// Print JSON
        #[arg(long)]
        json: bool,

        #[arg(required = true, value_hint = clap::ValueHint::AnyPath)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Episode,
    Movie,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Musubi(#[from] MusubiError),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid records in {path}: {source}")]
    Records {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON output failed: {0}")]
    Output(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.log_dir.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Console logging, plus a daily log file when `log_dir` is set. The
/// returned guard flushes the file writer on drop.
fn init_tracing(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("musubi=info")),
        1 => EnvFilter::new("musubi=debug"),
        _ => EnvFilter::new("musubi=trace"),
    };
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "musubi.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(file_layer)
        .init();
    guard
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Parse {
            strict,
            json,
            labels,
        } => parse(&config, strict, json, &labels),
        Command::Series { paths } => series(&config, &paths),
        Command::Match {
            episodes,
            kind,
            json,
            paths,
        } => match kind {
            Kind::Episode => {
                let records: Vec<Episode> = read_records(&episodes)?;
                let cache = Arc::new(IdentifierCache::new(PatternExtractor::new(
                    config.extractor_options(),
                )));
                match_files(&config, episode_sequence(cache), &records, &paths, json)
            }
            Kind::Movie => {
                let records: Vec<Movie> = read_records(&episodes)?;
                match_files(&config, movie_sequence(), &records, &paths, json)
            }
        },
    }
}

#[derive(Serialize)]
struct ParsedLabel<'a> {
    label: &'a str,
    identifiers: Vec<Identifier>,
}

fn parse(config: &Config, strict: bool, json: bool, labels: &[String]) -> Result<(), CliError> {
    let mut options = config.extractor_options();
    options.strict |= strict;
    let extractor = PatternExtractor::new(options);

    let parsed: Vec<ParsedLabel<'_>> = labels
        .iter()
        .map(|label| ParsedLabel {
            label,
            identifiers: extractor.extract(label),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }
    for entry in &parsed {
        if entry.identifiers.is_empty() {
            println!("{}: (none)", entry.label);
        } else {
            println!("{}: {}", entry.label, join(&entry.identifiers));
        }
    }
    Ok(())
}

fn series(config: &Config, paths: &[PathBuf]) -> Result<(), CliError> {
    let files = files::collect_videos(paths);
    let resolver =
        SeriesNameResolver::new(PatternExtractor::new(config.extractor_options()), config.series_options());
    let names = resolver.resolve_paths(&files);
    tracing::info!(files = files.len(), names = names.len(), "Series names resolved");
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn read_records<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Records {
        path: path.to_owned(),
        source,
    })
}

#[derive(Serialize)]
struct MatchRow<'a, C> {
    file: &'a Path,
    candidate: Option<&'a C>,
    score: f32,
    level: Option<usize>,
}

fn match_files<C>(
    config: &Config,
    metrics: MetricSequence<MediaFile, C>,
    records: &[C],
    paths: &[PathBuf],
    json: bool,
) -> Result<(), CliError>
where
    C: Serialize + Display,
{
    let files: Vec<MediaFile> = files::collect_videos(paths)
        .into_iter()
        .map(MediaFile::new)
        .collect();
    let matcher = Matcher::new(metrics, config.matcher_options())?;
    tracing::debug!(?matcher, "Matching");
    let matches = matcher.run(&files, records, &CancellationToken::new())?;

    if json {
        let rows: Vec<MatchRow<'_, C>> = matches.iter().map(row).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for m in &matches {
        match m.candidate {
            Some(candidate) => println!("{} -> {candidate} ({:.2})", m.value.path.display(), m.score),
            None => println!("{} -> (no match)", m.value.path.display()),
        }
    }
    Ok(())
}

fn row<'a, C>(m: &Match<'a, MediaFile, C>) -> MatchRow<'a, C> {
    MatchRow {
        file: m.value.path(),
        candidate: m.candidate,
        score: m.score,
        level: m.level,
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_match_args() {
        let cli = Cli::try_parse_from([
            "musubi", "-vv", "match", "--episodes", "eps.json", "--kind", "movie", "/media",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Match {
                kind: Kind::Movie,
                json: false,
                ..
            }
        ));
    }

    #[test]
    fn test_read_records() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"[{"series_name":"Greek","season":1,"episode":19,"title":"No Campus for Old Rules"}]"#,
        )
        .unwrap();
        let records: Vec<Episode> = read_records(file.path()).unwrap();
        assert_eq!(records, vec![Episode::new("Greek", 1, 19, "No Campus for Old Rules")]);

        let err = read_records::<Movie>(Path::new("/nonexistent/records.json")).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["1x02", "2010-10-24"]), "1x02, 2010-10-24");
    }
}
