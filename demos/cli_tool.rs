//! CLI Tool Example
//!
//! This example demonstrates how to build a command-line tool
//! using xlsxquote for turning a line-item spreadsheet into a quote document.
//!
//! Set `RUST_LOG=xlsxquote=debug` to see column resolution and skipped rows.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use xlsxquote::{
    title_from_stem, QuoteBuilder, QuoteDefaults, QuoteError, SheetSelector, DEFAULT_COUNTER_PATH,
    DEFAULT_PREFIX,
};

struct Options {
    input_path: String,
    sheet_selector: SheetSelector,
    counter_path: String,
    prefix: String,
    defaults_path: Option<String>,
    output_dir: Option<String>,
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <input.xlsx> [options]", args[0]);
        eprintln!("\nOptions:");
        eprintln!("  --sheet-index <n>    Select sheet by index (0-based)");
        eprintln!("  --sheet-name <name>  Select sheet by name");
        eprintln!("  --counter <path>     Quote counter file (default: {})", DEFAULT_COUNTER_PATH);
        eprintln!("  --prefix <prefix>    Quote number prefix (default: {})", DEFAULT_PREFIX);
        eprintln!("  --defaults <path>    JSON file with owner/company defaults");
        eprintln!("  --out-dir <dir>      Write <title> - <quote number>.json into dir");
        eprintln!("\nExamples:");
        eprintln!("  {} Acme_Renewal.xlsx", args[0]);
        eprintln!("  {} deal.xlsx --sheet-name \"Lines\" --prefix BOM-", args[0]);
        eprintln!("  {} deal.xlsx --defaults quote_defaults.json --out-dir out", args[0]);
        process::exit(1);
    }

    let options = parse_options(&args);

    match run(&options) {
        Ok(summary) => eprintln!("{}", summary),
        Err(e) => {
            handle_error(e);
            process::exit(1);
        }
    }
}

fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        input_path: args[1].clone(),
        sheet_selector: SheetSelector::Preferred,
        counter_path: DEFAULT_COUNTER_PATH.to_string(),
        prefix: DEFAULT_PREFIX.to_string(),
        defaults_path: None,
        output_dir: None,
    };

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = match args.get(i + 1) {
            Some(v) => v.clone(),
            None => {
                eprintln!("Error: {} requires a value", flag);
                process::exit(1);
            }
        };

        match flag {
            "--sheet-index" => {
                let index = value.parse::<usize>().unwrap_or_else(|_| {
                    eprintln!("Error: Invalid sheet index: {}", value);
                    process::exit(1);
                });
                options.sheet_selector = SheetSelector::Index(index);
            }
            "--sheet-name" => options.sheet_selector = SheetSelector::Name(value),
            "--counter" => options.counter_path = value,
            "--prefix" => options.prefix = value,
            "--defaults" => options.defaults_path = Some(value),
            "--out-dir" => options.output_dir = Some(value),
            _ => {
                eprintln!("Error: Unknown option: {}", flag);
                process::exit(1);
            }
        }
        i += 2;
    }

    options
}

fn run(options: &Options) -> Result<String, QuoteError> {
    let defaults = match &options.defaults_path {
        Some(path) => QuoteDefaults::from_path(path)?,
        None => QuoteDefaults::default(),
    };

    let engine = QuoteBuilder::new()
        .with_sheet_selector(options.sheet_selector.clone())
        .with_counter_path(&options.counter_path)
        .with_prefix(options.prefix.as_str())
        .with_defaults(defaults)
        .build()?;

    let input_path = Path::new(&options.input_path);
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let input = File::open(input_path)?;
    let document = engine.prepare(input, &title_from_stem(&stem))?;

    match &options.output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let path = Path::new(dir).join(format!("{}.json", document.file_stem()));
            document.write_json(File::create(&path)?)?;
            Ok(format!("Quote {} written to {}", document.quote_number, path.display()))
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            document.write_json(&mut handle)?;
            writeln!(handle)?;
            handle.flush()?;
            Ok(format!(
                "Quote {} ({} items, total {:.2}) -> {}",
                document.quote_number,
                document.items.len(),
                document.total,
                document.file_stem()
            ))
        }
    }
}

fn handle_error(error: QuoteError) {
    match error {
        QuoteError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        QuoteError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid spreadsheet or may be corrupted.");
        }
        QuoteError::Json(json_err) => {
            eprintln!("JSON Error: {}", json_err);
            eprintln!("Please check the defaults file.");
        }
        QuoteError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
            eprintln!("Please check your sheet selection and counter path.");
        }
        QuoteError::InputTooLarge { size, max } => {
            eprintln!("Input Too Large: {} bytes (max: {} bytes)", size, max);
        }
        QuoteError::Counter(msg) => {
            eprintln!("Quote Counter Error: {}", msg);
            eprintln!("Reset the counter file to continue issuing quote numbers.");
        }
    }
}
