//! CLI entry point for Rifmo: rhyme lookup and syllable hints from the terminal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc;

use clap::Parser;
use rifmo_core::{
    add_hints, app_data_dir, get_poems_root, line_ending_word, load_config, read_poem,
    scan_poems, set_base_url, set_poems_root, status, trim_punctuation, watch_poems, Poem,
    RhymeFetcher, Rhymes,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rifmo")]
#[command(about = "Rifmo: rhymes and syllable hints for poets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Show where Rifmo stores its config (app data directory).
    DataDir,
    /// Look up rhymes for a word.
    Rhymes {
        /// The word (or, with --line, a whole line of verse).
        #[arg(value_name = "WORD")]
        word: String,
        /// Maximum number of rhymes (default from config).
        #[arg(short, long)]
        limit: Option<usize>,
        /// Treat WORD as a line and rhyme its last word.
        #[arg(long)]
        line: bool,
        /// Print JSON instead of one rhyme per line.
        #[arg(long)]
        json: bool,
        /// Fail with the lookup error instead of printing no rhymes.
        #[arg(long)]
        strict: bool,
    },
    /// Print a poem with a syllable count after every line.
    Hints {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// List poems under a directory (default: the configured poems root).
    Scan {
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Re-list poems whenever files under the directory change.
    Watch {
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },
    /// Show or change settings.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(clap::Subcommand)]
enum ConfigCommand {
    /// Print the current config.
    Show,
    /// Remember a poems directory.
    SetRoot {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Use another rhyme service endpoint.
    SetBaseUrl {
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[derive(Serialize)]
struct PoemRow<'a> {
    path: String,
    title: &'a str,
    lines: usize,
    syllables: usize,
}

impl<'a> From<&'a Poem> for PoemRow<'a> {
    fn from(p: &'a Poem) -> Self {
        Self {
            path: p.path.display().to_string(),
            title: &p.title,
            lines: p.line_count(),
            syllables: p.syllable_count(),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("Rifmo backend");
            println!("  core: {}", status());
            ExitCode::SUCCESS
        }
        Commands::DataDir => match app_data_dir() {
            Some(p) => {
                println!("{}", p.display());
                ExitCode::SUCCESS
            }
            None => {
                eprintln!("Could not determine app data directory.");
                ExitCode::FAILURE
            }
        },
        Commands::Rhymes {
            word,
            limit,
            line,
            json,
            strict,
        } => rhymes(&word, limit, line, json, strict).await,
        Commands::Hints { path } => match read_poem(&path) {
            Ok(poem) => {
                println!("# {}", poem.title);
                println!("{}", add_hints(&poem.body));
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        Commands::Scan { path, json } => {
            let Some(root) = path.or_else(get_poems_root) else {
                eprintln!("No path given and no poems root configured (see `rifmo config set-root`).");
                return ExitCode::FAILURE;
            };
            match scan_poems(&root) {
                Ok(poems) => {
                    print_poems(&poems, json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Watch { path } => {
            let Some(root) = path.or_else(get_poems_root) else {
                eprintln!("No path given and no poems root configured (see `rifmo config set-root`).");
                return ExitCode::FAILURE;
            };
            watch(root)
        }
        Commands::Config(cmd) => config(cmd),
    }
}

async fn rhymes(word: &str, limit: Option<usize>, line: bool, json: bool, strict: bool) -> ExitCode {
    let fetcher_config = match load_config().rhymes.fetcher_config() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "invalid rhyme settings");
            eprintln!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let word = if line {
        line_ending_word(word).unwrap_or_default()
    } else {
        trim_punctuation(word)
    };
    let limit = limit.unwrap_or(fetcher_config.default_limit);
    tracing::debug!(word, limit, host = fetcher_config.base_url.host_str().unwrap_or_default(), "looking up rhymes");
    let fetcher = RhymeFetcher::new(fetcher_config);

    let rhymes = if strict {
        match fetcher.lookup(word, limit).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Lookup failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        Rhymes {
            query: word.to_string(),
            words: fetcher.fetch_rhymes(word, limit).await,
        }
    };

    if json {
        match serde_json::to_string_pretty(&rhymes) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else if rhymes.is_empty() {
        eprintln!("No rhymes found for {:?}.", rhymes.query);
    } else {
        for w in &rhymes.words {
            println!("{}", w);
        }
    }
    ExitCode::SUCCESS
}

fn print_poems(poems: &[Poem], json: bool) {
    if json {
        let rows: Vec<PoemRow> = poems.iter().map(PoemRow::from).collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Error: {}", e),
        }
        return;
    }
    println!("{} poem(s)", poems.len());
    for p in poems {
        println!(
            "  {}  {}  ({} lines, {} syllables)",
            p.path.display(),
            p.title,
            p.line_count(),
            p.syllable_count()
        );
    }
}

fn watch(root: PathBuf) -> ExitCode {
    let (tx, rx) = mpsc::channel();
    let _watcher = match watch_poems(&root, move |res| {
        tx.send(res).ok();
    }) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(root = %root.display(), "watch started");
    println!("Watching {} (Ctrl+C to stop)", root.display());
    for res in rx {
        match res {
            Ok(poems) => print_poems(&poems, false),
            Err(e) => eprintln!("Scan error: {}", e),
        }
    }
    ExitCode::SUCCESS
}

fn config(cmd: ConfigCommand) -> ExitCode {
    let res = match cmd {
        ConfigCommand::Show => {
            match serde_json::to_string_pretty(&load_config()) {
                Ok(s) => println!("{}", s),
                Err(e) => eprintln!("Error: {}", e),
            }
            return ExitCode::SUCCESS;
        }
        ConfigCommand::SetRoot { path } => set_poems_root(&path),
        ConfigCommand::SetBaseUrl { url } => set_base_url(&url),
    };
    match res {
        Ok(()) => {
            println!("Saved.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rhymes_flags() {
        let cli = Cli::try_parse_from(["rifmo", "rhymes", "кот", "--limit", "5", "--json", "--strict"])
            .unwrap();
        match cli.command {
            Some(Commands::Rhymes {
                word,
                limit,
                line,
                json,
                strict,
            }) => {
                assert_eq!(word, "кот");
                assert_eq!(limit, Some(5));
                assert!(!line);
                assert!(json && strict);
            }
            _ => panic!("expected rhymes"),
        }
    }

    #[test]
    fn no_subcommand_means_status() {
        let cli = Cli::try_parse_from(["rifmo"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn config_subcommands() {
        let cli = Cli::try_parse_from(["rifmo", "config", "set-base-url", "https://example.org/r/"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config(ConfigCommand::SetBaseUrl { ref url })) if url == "https://example.org/r/"
        ));
        assert!(Cli::try_parse_from(["rifmo", "rhymes"]).is_err());
    }
}
