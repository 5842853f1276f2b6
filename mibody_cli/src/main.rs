use clap::Parser;
use mibody_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::NamedTempFile;

#[derive(Parser)]
#[command(name = "mibody")]
#[command(version, about = "Read Salter MiBody scale data", long_about = None)]
struct Cli {
    /// Export file written by the scale [default: BODYDATA.TXT]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// File to write to (prints to stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (csv, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Unit for height (cm, ft_in)
    #[arg(short = 'H', long)]
    height: Option<String>,

    /// Unit for weight (kg, lbs, st_lbs)
    #[arg(short, long)]
    weight: Option<String>,

    /// Fail if any record in the file could not be decoded
    #[arg(long)]
    strict: bool,

    /// Read settings from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log parser diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        mibody_core::logging::init_with_level("debug");
    } else {
        mibody_core::logging::init();
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(&expand_home(path))?,
        None => Config::load()?,
    };

    // Validate every export selection before touching input or output
    let options = ExportOptions::parse(
        cli.format.as_deref().unwrap_or(&config.export.format),
        cli.height.as_deref().unwrap_or(&config.export.height_unit),
        cli.weight.as_deref().unwrap_or(&config.export.weight_unit),
    )?;

    let input = resolve_input(cli.input.as_deref().unwrap_or(&config.input.path));
    let data = BodyData::open_with_limit(&input, config.input.max_input_bytes)?;

    report_skipped(&data);
    if cli.strict {
        data.ensure_clean()?;
    }

    match cli.output {
        Some(path) => write_to_file(&data, &options, &expand_home(&path)),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            export::write(&data, &options, &mut handle)?;
            if options.format == ExportFormat::Json {
                writeln!(handle)?;
            }
            Ok(())
        }
    }
}

/// Write through a temp file in the target directory so a failed export
/// never leaves a partial file behind
fn write_to_file(data: &BodyData, options: &ExportOptions, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let mut temp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = io::BufWriter::new(temp.as_file_mut());
        export::write(data, options, &mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Exported {} weigh-ins to {:?}", data.len(), path);
    Ok(())
}

fn report_skipped(data: &BodyData) {
    let report = data.report();
    if report.is_clean() {
        return;
    }

    eprintln!(
        "Skipped {} of {} records in '{}':",
        report.skipped.len(),
        report.blocks - report.empty_slots,
        data.source()
    );
    for skipped in &report.skipped {
        eprintln!(
            "  record {} (byte {}): {}",
            skipped.index, skipped.offset, skipped.reason
        );
    }
}

/// Expand `~`, then fall back to the program's own directory when a
/// relative input is missing from the working directory
fn resolve_input(path: &Path) -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    resolve_input_in(path, exe_dir.as_deref())
}

fn resolve_input_in(path: &Path, program_dir: Option<&Path>) -> PathBuf {
    let path = expand_home(path);
    if path.exists() || path.is_absolute() {
        return path;
    }

    match program_dir.map(|dir| dir.join(&path)) {
        Some(candidate) if candidate.exists() => {
            tracing::debug!("Reading {:?} from the program directory", candidate);
            candidate
        }
        _ => path,
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
