use detok::config::parse_address;
use detok::diagnostics::{DecodeEvent, EventRecorder, UnknownOpcodeReport};
use detok::{ByteImage, DecoderOptions, Detokenizer, Revision};
use log::debug;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    let mut options = DecoderOptions::default();
    let mut files = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-a" | "--address" if i + 1 < args.len() => {
                options.start = parse_address(&args[i + 1])?;
                i += 1;
            }
            "--early" => options.revision = Revision::Early,
            "-h" | "--help" => {
                eprintln!("Usage: {} [options] <image> [<image> ...]", args[0]);
                eprintln!("\nOptions:");
                eprintln!("  -a <addr>   Start offset (hex, or decimal with 0d prefix)");
                eprintln!("  --early     Decode with the early keyword set");
                eprintln!("  -h          Show this help message");
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => files.push(arg.to_string()),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if files.is_empty() {
        eprintln!("Usage: {} [options] <image> [<image> ...]", args[0]);
        eprintln!("Try '{} -h' for help", args[0]);
        std::process::exit(1);
    }

    let image = ByteImage::from_files(&files)?;
    debug!("Loaded {} bytes from {} file(s)", image.len(), files.len());

    let detokenizer = Detokenizer::new(&image, options);
    let mut recorder = EventRecorder::new();
    let decoding = detokenizer.decode(&mut recorder);

    let start = detokenizer.options().start;
    println!("Image: {} bytes, start {:04X}, {} revision", image.len(), start, options.revision);
    if detokenizer.has_program_areas() {
        println!("\nProgram areas:");
        for slot in detokenizer.slots() {
            println!("  {}  (record at {:04X})", slot, slot.record_offset);
        }
    } else {
        println!("No program area directory ({} record(s) found)", detokenizer.slots().len());
    }

    for block in &decoding.blocks {
        match block.slot {
            Some(n) => println!("\n== P{} ==", n),
            None => println!("\n== {:04X}.. ==", start),
        }
        for program in &block.result.programs {
            let address = program.address().unwrap_or(0);
            let numbers = program.line_numbers();
            println!(
                "  program   at {:04X}: {} line(s), {}..{}",
                address,
                numbers.len(),
                numbers.first().copied().unwrap_or(0),
                numbers.last().copied().unwrap_or(0)
            );
        }
        for fragment in block.result.fragments.iter().filter(|f| !f.is_empty()) {
            print!(
                "  fragment  at {:04X}: {} line(s)",
                fragment.address().unwrap_or(0),
                fragment.lines.len()
            );
            match &fragment.partial {
                Some(partial) => println!(", cut short in line {}", partial.number),
                None => println!(),
            }
        }
    }

    let count = |pred: fn(&DecodeEvent) -> bool| recorder.count_where(pred);
    println!("\nEvents:");
    println!(
        "  invalid line numbers  {}",
        count(|e| matches!(e, DecodeEvent::InvalidLineNumber { .. }))
    );
    println!(
        "  broken lines          {}",
        count(|e| matches!(
            e,
            DecodeEvent::InteriorTerminator { .. } | DecodeEvent::TruncatedToken { .. }
        ))
    );
    println!(
        "  unknown characters    {}",
        count(|e| matches!(e, DecodeEvent::UnknownCharacter { .. }))
    );
    println!(
        "  hidden separators     {}",
        count(|e| matches!(e, DecodeEvent::SeparatorBeforeElse { .. }))
    );

    let report = UnknownOpcodeReport::from_events(&recorder.events);
    if !report.is_empty() {
        println!("\nUnknown tokens:");
        print!("{}", report);
    }

    Ok(())
}
