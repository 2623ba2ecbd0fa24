use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::Parser;

use vietphrase_engine::config::{find_default_config, load_config, AppConfig, CONFIG_FILENAME};
use vietphrase_engine::context::EngineContext;
use vietphrase_engine::dictionary::{load_directory, parse_override_list, read_text_file};
use vietphrase_engine::progress::Progress;
use vietphrase_engine::snapshot::{load_snapshot, save_snapshot};
use vietphrase_engine::synthesize::Synthesis;
use vietphrase_engine::translate::{translate, Session};
use vietphrase_engine::Mode;

#[derive(Parser, Debug)]
#[command(name = "vietphrase-engine")]
#[command(about = "Dictionary-driven Chinese text translator (Vietphrase engine)", long_about = None)]
struct Args {
    /// Input text file (stdin when omitted)
    #[arg(value_name = "TXT")]
    input: Option<PathBuf>,

    /// Output file (default: <input_stem>_vietphrase.txt; stdout for stdin input)
    #[arg(short, long, value_name = "TXT")]
    output: Option<PathBuf>,

    /// Directory with the dictionary .txt files (default: ./data or config)
    #[arg(long, value_name = "DIR")]
    dict_dir: Option<PathBuf>,

    /// User override list file (Name List, `key=value` lines)
    #[arg(long, value_name = "TXT")]
    names: Option<PathBuf>,

    /// Config file path (default: search for vietphrase-engine.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parsed-dictionary JSON snapshot: loaded when present, written otherwise
    #[arg(long, value_name = "JSON")]
    snapshot: Option<PathBuf>,

    /// Show every candidate meaning instead of the canonical one
    #[arg(long)]
    all_meanings: bool,

    /// Print whole-phrase suggestions for a span instead of translating
    #[arg(long, value_name = "SPAN")]
    suggest: Option<String>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn default_output_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("{stem}_vietphrase.txt"))
}

fn resolve_relative(base: Option<&Path>, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        if let Some(dir) = base {
            return dir.join(path);
        }
    }
    path
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let progress = Progress::new(args.quiet);

    let workdir = args
        .input
        .as_deref()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config_path = args
        .config
        .clone()
        .or_else(|| find_default_config(&workdir, CONFIG_FILENAME));
    let config = match &config_path {
        Some(path) => {
            progress.note(format!("config: {}", path.display()));
            load_config(path)?
        }
        None => AppConfig::default(),
    };
    let config_dir = config_path.as_deref().and_then(Path::parent);

    let dict_dir = args
        .dict_dir
        .clone()
        .or_else(|| {
            config
                .dictionaries
                .dir
                .clone()
                .map(|p| resolve_relative(config_dir, p))
        })
        .unwrap_or_else(|| workdir.join("data"));

    let snapshot_path = args.snapshot.clone().or_else(|| {
        config
            .dictionaries
            .snapshot
            .clone()
            .map(|p| resolve_relative(config_dir, p))
    });

    let dictionaries = match snapshot_path.as_deref().filter(|p| p.exists()) {
        Some(path) => {
            progress.note(format!("loading snapshot: {}", path.display()));
            load_snapshot(path)?
        }
        None => {
            progress.note(format!("loading dictionaries: {}", dict_dir.display()));
            let dicts = load_directory(&dict_dir)?;
            if dicts.is_empty() {
                return Err(anyhow!(
                    "no dictionary files found in {}",
                    dict_dir.display()
                ));
            }
            if let Some(path) = snapshot_path.as_deref() {
                save_snapshot(path, &dicts)?;
                progress.note(format!("snapshot written: {}", path.display()));
            }
            dicts
        }
    };
    for dict in &dictionaries {
        progress.note(format!("  {} ({} entries)", dict.id, dict.entries.len()));
    }

    let names_path = args.names.clone().or_else(|| {
        config
            .dictionaries
            .names_file
            .clone()
            .map(|p| resolve_relative(config_dir, p))
    });
    let overrides = match names_path.as_deref() {
        Some(path) => {
            let text = read_text_file(path)?;
            let parsed = parse_override_list(&text);
            progress.note(format!("name list: {} entries", parsed.len()));
            parsed
        }
        None => Default::default(),
    };

    let ctx = EngineContext::build(dictionaries, overrides)?;
    let mut session = Session::new(config.synthesis_limits());

    if let Some(span) = args.suggest.as_deref() {
        match session.suggest(&ctx, span) {
            Synthesis::Suggestions(list) if list.is_empty() => {
                println!("(no suggestions)");
            }
            Synthesis::Suggestions(list) => {
                for phrase in list {
                    println!("{phrase}");
                }
            }
            Synthesis::SpanTooLong => println!("(span too long to suggest)"),
            Synthesis::TooManyCombinations => println!("(too many combinations)"),
        }
        return Ok(());
    }

    let text = match args.input.as_deref() {
        Some(path) => read_text_file(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    let mode = if args.all_meanings {
        Mode::AllMeanings
    } else {
        config.mode()
    };
    progress.note("translating");
    let doc = translate(&ctx, &session, &text, mode);
    let rendered = doc.to_text();

    match (args.output.as_deref(), args.input.as_deref()) {
        (Some(path), _) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("write output: {}", path.display()))?;
            progress.note(format!("written: {}", path.display()));
        }
        (None, Some(input)) => {
            let path = default_output_for(input);
            std::fs::write(&path, rendered)
                .with_context(|| format!("write output: {}", path.display()))?;
            progress.note(format!("written: {}", path.display()));
        }
        (None, None) => {
            println!("{rendered}");
        }
    }
    Ok(())
}
