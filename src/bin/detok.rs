use detok::config::DetokConfig;
use detok::diagnostics::{EventRecorder, LogObserver, UnknownOpcodeReport};
use detok::output::{write_fragments, write_report, write_sources};
use detok::{ByteImage, Detokenizer, DetokError, LineEnding};
use log::{debug, info};
use std::env;
use std::path::PathBuf;

fn usage(program: &str) {
    eprintln!("Usage: {} -i <image> [-i <image> ...] -o <output> [options]", program);
    eprintln!("\nOptions:");
    eprintln!("  -i, --input <file>      Memory dump to decode; repeat to concatenate");
    eprintln!("  -o, --output <file>     Listing file; with program areas, one file per area");
    eprintln!("  -a, --address <addr>    Start offset, hex (2000, 0x2000) or decimal (0d8192)");
    eprintln!("  -c, --config <file>     TOML settings file");
    eprintln!("      --revision <rev>    Decoder revision: full (default) or early");
    eprintln!("      --crlf              End lines with CR LF");
    eprintln!("      --fragments         Also write discarded fragments");
    eprintln!("      --report            Also write a summary of unknown tokens");
    eprintln!("  -h, --help              Show this help message");
}

fn value<'a>(args: &'a [String], i: usize) -> Result<&'a str, DetokError> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| DetokError::Usage(format!("Missing value for {}", args[i])))
}

#[derive(Debug, Default)]
struct Args {
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    address: Option<String>,
    config: Option<PathBuf>,
    revision: Option<String>,
    crlf: bool,
    fragments: bool,
    report: bool,
}

fn parse_args(args: &[String]) -> Result<Args, DetokError> {
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-i" | "--input" => {
                parsed.inputs.push(PathBuf::from(value(args, i)?));
                i += 1;
            }
            "-o" | "--output" => {
                parsed.output = Some(PathBuf::from(value(args, i)?));
                i += 1;
            }
            "-a" | "--address" => {
                parsed.address = Some(value(args, i)?.to_string());
                i += 1;
            }
            "-c" | "--config" => {
                parsed.config = Some(PathBuf::from(value(args, i)?));
                i += 1;
            }
            "--revision" => {
                parsed.revision = Some(value(args, i)?.to_string());
                i += 1;
            }
            "--crlf" => parsed.crlf = true,
            "--fragments" => parsed.fragments = true,
            "--report" => parsed.report = true,
            "-h" | "--help" => {
                usage(&args[0]);
                std::process::exit(0);
            }
            other => return Err(DetokError::Usage(format!("Unknown option: {}", other))),
        }
        i += 1;
    }
    Ok(parsed)
}

fn exit_code(err: &DetokError) -> i32 {
    match err {
        DetokError::Usage(_) | DetokError::Config(_) => 1,
        DetokError::Io { .. } => 2,
        DetokError::InvalidAddress(_) => 3,
    }
}

fn run(args: &[String]) -> Result<(), DetokError> {
    let args = parse_args(args)?;

    let output = args
        .output
        .clone()
        .ok_or_else(|| DetokError::Usage("No output file given".to_string()))?;
    if args.inputs.is_empty() {
        return Err(DetokError::Usage("No input file given".to_string()));
    }

    let mut config = match &args.config {
        Some(path) => DetokConfig::load(path)?,
        None => DetokConfig::default(),
    };
    if args.address.is_some() {
        config.address = args.address.clone();
    }
    if args.revision.is_some() {
        config.revision = args.revision.clone();
    }
    if args.crlf {
        config.line_ending = Some("crlf".to_string());
    }
    config.write_fragments |= args.fragments;
    config.write_unknown_report |= args.report;

    // settings are resolved before any image is read
    let options = config.decoder_options()?;
    debug!("Options: {:?}", options);

    let image = ByteImage::from_files(&args.inputs)?;
    info!("Read {} bytes from {} file(s)", image.len(), args.inputs.len());

    let detokenizer = Detokenizer::new(&image, options);
    let mut log = LogObserver;
    let mut recorder = EventRecorder::new();
    let decoding = {
        let mut observer = (&mut log, &mut recorder);
        detokenizer.decode(&mut observer)
    };

    let line_ending: LineEnding = options.line_ending;
    let written = write_sources(
        &decoding,
        &output,
        detokenizer.has_program_areas(),
        line_ending,
    )?;
    info!(
        "{} program(s) in {} file(s)",
        decoding.program_count(),
        written.len()
    );

    if config.write_fragments {
        write_fragments(&decoding, &output, line_ending)?;
    }
    if config.write_unknown_report {
        let report = UnknownOpcodeReport::from_events(&recorder.events);
        if report.is_empty() {
            info!("No unknown tokens");
        }
        write_report(&report, &output)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if let Err(err) = run(&args) {
        eprintln!("{}", err);
        if matches!(err, DetokError::Usage(_)) {
            usage(&args[0]);
        }
        std::process::exit(exit_code(&err));
    }
}
