//! Mochi Reel Headless Runner
//!
//! Renders captured terminal output to images without a terminal.
//! Raw ANSI captures and JSON snapshot documents become PNG screenshots or
//! GIF step sequences; output piped on stdin becomes a timed recording.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use mochi_reel::app::Config;
use mochi_reel::core::{Grid, SnapshotDocument};
use mochi_reel::reel::{save_gif, save_png, FrameSequencer, Recorder};
use mochi_reel::renderer::{load_font, Header, RasterConfig, Rasterizer};
use mochi_reel::{interpret_snapshot, Error};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often an idle recording re-checks for a due frame
const POLL_MS: u64 = 40;

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_help();
        return ExitCode::FAILURE;
    };

    let options = match Options::parse(rest) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        },
    };
    if options.show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match &options.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };

    let result = match command.as_str() {
        "snapshot" => run_snapshot(&options, &config),
        "json" => run_json(&options, &config),
        "gif" => run_gif(&options, &config),
        "record" => run_record(&options, &config),
        "-h" | "--help" | "help" => {
            print_help();
            return ExitCode::SUCCESS;
        },
        other => {
            eprintln!("Error: unknown command '{}'", other);
            print_help();
            return ExitCode::FAILURE;
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

/// Command line options shared by every subcommand
#[derive(Debug, Default)]
struct Options {
    cols: Option<usize>,
    rows: Option<usize>,
    title: Option<String>,
    label: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    frame_ms: Option<u32>,
    exit_code: Option<i32>,
    files: Vec<PathBuf>,
    show_help: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let mut value = || {
                i += 1;
                args.get(i)
                    .cloned()
                    .ok_or_else(|| format!("missing value for {}", flag))
            };
            match flag {
                "-c" | "--cols" => options.cols = Some(parse_number(flag, &value()?)?),
                "-r" | "--rows" => options.rows = Some(parse_number(flag, &value()?)?),
                "-t" | "--title" => options.title = Some(value()?),
                "-l" | "--label" => options.label = Some(value()?),
                "-i" | "--input" => options.input = Some(PathBuf::from(value()?)),
                "-o" | "--output" => options.output = Some(PathBuf::from(value()?)),
                "--config" => options.config = Some(PathBuf::from(value()?)),
                "--frame-ms" => options.frame_ms = Some(parse_number(flag, &value()?)?),
                "-e" | "--exit-code" => options.exit_code = Some(parse_number(flag, &value()?)?),
                "-h" | "--help" => options.show_help = true,
                other if other.starts_with('-') => return Err(format!("unknown option '{}'", other)),
                file => options.files.push(PathBuf::from(file)),
            }
            i += 1;
        }
        Ok(options)
    }

    fn output(&self) -> Result<&Path, Error> {
        self.output
            .as_deref()
            .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, "missing -o OUTPUT")))
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid value '{}' for {}", value, flag))
}

fn rasterizer(config: &Config, raster: RasterConfig) -> Rasterizer {
    let font = load_font(&config.font.candidates, config.font.size);
    Rasterizer::new(font, config.palette.clone(), raster)
}

fn read_input(path: Option<&Path>) -> Result<String, Error> {
    let data = match path {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut data = Vec::new();
            io::stdin().read_to_end(&mut data)?;
            data
        },
    };
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Interpret a raw capture, or parse it when it is a JSON document
fn load_grid(path: &Path, cols: usize, rows: usize, config: &Config) -> Result<Grid, Error> {
    if path.extension().is_some_and(|ext| ext == "json") {
        return SnapshotDocument::load(path)?.to_grid(&config.palette);
    }
    let text = read_input(Some(path))?;
    interpret_snapshot(&text, cols, rows, &config.palette)
}

fn run_snapshot(options: &Options, config: &Config) -> Result<(), Error> {
    let cols = options.cols.unwrap_or(config.capture.cols);
    let rows = options.rows.unwrap_or(config.capture.rows);
    let text = read_input(options.input.as_deref())?;
    let grid = interpret_snapshot(&text, cols, rows, &config.palette)?;

    let header = options.title.as_ref().map(Header::new);
    let image = rasterizer(config, config.raster.clone()).render(&grid, header.as_ref());
    save_png(&image, options.output()?)?;
    println!("wrote {}", options.output()?.display());
    Ok(())
}

fn run_json(options: &Options, config: &Config) -> Result<(), Error> {
    let input = options
        .input
        .as_deref()
        .or_else(|| options.files.first().map(PathBuf::as_path))
        .ok_or_else(|| Error::Io(io::Error::new(io::ErrorKind::InvalidInput, "missing -i INPUT")))?;
    let output = options.output()?;
    let mut raster = rasterizer(config, RasterConfig::screenshot());

    if !input.is_dir() {
        return render_json(&mut raster, input, output, config);
    }

    // A directory of snapshots renders to a directory of PNGs
    let mut sources: Vec<PathBuf> = std::fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    if sources.is_empty() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no .json snapshots found in {}", input.display()),
        )));
    }
    sources.sort();

    std::fs::create_dir_all(output)?;
    for source in &sources {
        let Some(stem) = source.file_stem() else {
            continue;
        };
        let mut name = stem.to_os_string();
        name.push(".png");
        render_json(&mut raster, source, &output.join(name), config)?;
    }
    Ok(())
}

fn render_json(raster: &mut Rasterizer, source: &Path, target: &Path, config: &Config) -> Result<(), Error> {
    let grid = SnapshotDocument::load(source)?.to_grid(&config.palette)?;
    save_png(&raster.render(&grid, None), target)?;
    println!("wrote {}", target.display());
    Ok(())
}

/// Split a `FILE:MS` step into its path and duration
fn parse_step(arg: &Path, default_ms: u32) -> (PathBuf, u32) {
    let Some((file, ms)) = arg.to_str().and_then(|text| text.rsplit_once(':')) else {
        return (arg.to_path_buf(), default_ms);
    };
    match ms.parse() {
        Ok(ms) if !file.is_empty() => (PathBuf::from(file), ms),
        _ => (arg.to_path_buf(), default_ms),
    }
}

fn run_gif(options: &Options, config: &Config) -> Result<(), Error> {
    let cols = options.cols.unwrap_or(config.capture.cols);
    let rows = options.rows.unwrap_or(config.capture.rows);
    let frame_ms = options.frame_ms.unwrap_or(config.capture.step_frame_ms);

    let mut raster = rasterizer(config, config.raster.clone());
    let mut sequencer = FrameSequencer::new(config.capture.sequencer());
    for arg in &options.files {
        let (path, duration_ms) = parse_step(arg, frame_ms);
        let grid = load_grid(&path, cols, rows, config)?;
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        sequencer.push(raster.render(&grid, Some(&Header::new(title))), duration_ms);
    }

    let output = options.output()?;
    save_gif(sequencer.frames(), output, config.gif)?;
    println!("wrote {} ({} frames)", output.display(), sequencer.len());
    Ok(())
}

fn run_record(options: &Options, config: &Config) -> Result<(), Error> {
    let mut capture = config.capture;
    if let Some(cols) = options.cols {
        capture.cols = cols;
    }
    if let Some(rows) = options.rows {
        capture.rows = rows;
    }
    let label = options.label.clone().unwrap_or_else(|| "recording".to_string());
    let output = options.output()?.to_path_buf();

    let raster = rasterizer(config, RasterConfig::recording());
    let mut recorder = Recorder::with_scrollback(label, raster, capture, config.scrollback);

    let (tx, rx) = mpsc::channel::<Vec<u8>>();
    thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = vec![0u8; 65536];
        loop {
            match stdin.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                },
            }
        }
    });

    let start = Instant::now();
    loop {
        match rx.recv_timeout(Duration::from_millis(POLL_MS)) {
            Ok(chunk) => {
                recorder.feed(&chunk, start.elapsed());
            },
            Err(RecvTimeoutError::Timeout) => {
                recorder.tick(start.elapsed());
            },
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let frames = recorder.finish(start.elapsed(), options.exit_code);
    save_gif(&frames, &output, config.gif)?;
    println!("recorded {} ({} frames)", output.display(), frames.len());
    Ok(())
}

fn print_help() {
    println!("Mochi Reel Headless Runner");
    println!();
    println!("Usage: reel-headless <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  snapshot  Render a raw ANSI capture to PNG");
    println!("  json      Render a JSON snapshot document, or a directory of them, to PNG");
    println!("  gif       Render captures or JSON snapshots as GIF steps (FILE[:MS] each)");
    println!("  record    Record output piped on stdin as a GIF");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Grid width (default: 150)");
    println!("  -r, --rows <N>       Grid height (default: 42)");
    println!("  -t, --title <TEXT>   Header title for snapshot");
    println!("  -l, --label <TEXT>   Header label for record");
    println!("  -i, --input <PATH>   Input file or snapshot directory (default: stdin)");
    println!("  -o, --output <PATH>  Output file, or directory for a snapshot directory");
    println!("  --frame-ms <N>       Step duration for gif (default: 1200)");
    println!("  -e, --exit-code <N>  Exit status shown on the last recorded frame");
    println!("  --config <PATH>      Config file (default: ~/.config/mochi-reel/config.json)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Examples:");
    println!("  tmux capture-pane -ep | reel-headless snapshot -t overview -o overview.png");
    println!("  reel-headless json -i tui_overview.json -o tui_overview.png");
    println!("  reel-headless json -i snapshots/ -o screenshots/");
    println!("  reel-headless gif -o walkthrough.gif step1.ans:1200 step2.ans:1400 step3.json");
    println!("  cargo test 2>&1 | reel-headless record -l 'cargo test' -o tests.gif");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        assert_eq!(
            parse_step(Path::new("step1.ans:1400"), 1200),
            (PathBuf::from("step1.ans"), 1400)
        );
        assert_eq!(
            parse_step(Path::new("step2.json"), 1200),
            (PathBuf::from("step2.json"), 1200)
        );
        assert_eq!(
            parse_step(Path::new("odd:name.ans"), 1200),
            (PathBuf::from("odd:name.ans"), 1200)
        );
        assert_eq!(parse_step(Path::new(":300"), 1200), (PathBuf::from(":300"), 1200));
    }

    #[test]
    fn test_options_collect_steps() {
        let args: Vec<String> = ["-o", "out.gif", "a.ans:900", "b.json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let options = Options::parse(&args).unwrap();
        assert_eq!(options.output.as_deref(), Some(Path::new("out.gif")));
        assert_eq!(options.files.len(), 2);
        assert_eq!(parse_step(&options.files[0], 1200).1, 900);
    }

    #[test]
    fn test_json_directory_renders_each_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("snapshots");
        std::fs::create_dir(&input).unwrap();
        let doc = r#"{"width": 2, "height": 1, "cells": [{"symbol": "o"}, {"symbol": "k"}]}"#;
        std::fs::write(input.join("b.json"), doc).unwrap();
        std::fs::write(input.join("a.v2.json"), doc).unwrap();
        std::fs::write(input.join("notes.txt"), "skip").unwrap();

        let output = dir.path().join("png");
        let options = Options {
            input: Some(input),
            output: Some(output.clone()),
            ..Default::default()
        };
        run_json(&options, &Config::default()).unwrap();

        assert!(output.join("a.v2.png").exists());
        assert!(output.join("b.png").exists());
        assert!(!output.join("notes.png").exists());
    }

    #[test]
    fn test_json_empty_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let options = Options {
            input: Some(dir.path().to_path_buf()),
            output: Some(dir.path().join("out")),
            ..Default::default()
        };
        assert!(run_json(&options, &Config::default()).is_err());
    }
}
