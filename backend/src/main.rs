//! Salary survey CLI
//!
//! # Main Commands
//!
//! ```bash
//! salary-survey analyze survey.csv            # Dashboard report (text)
//! salary-survey analyze survey.csv -f json    # Dashboard report (JSON)
//! salary-survey summary survey.csv            # Percentile and median lines only
//! salary-survey serve                         # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! salary-survey parse survey.csv              # Raw parsed records
//! salary-survey translate survey.csv          # Canonical records
//! salary-survey tables                        # Built-in translation tables
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use salary_survey::{
    analyze_file, canonicalize_file, parse_csv_file, parse_csv_file_auto, AnalysisOptions,
    ConfigError, JsonRenderer, Renderer, TextRenderer, TranslationTables,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "salary-survey")]
#[command(about = "Translate, normalize and summarize a developer salary survey", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → canonical table → summaries and charts
    Analyze {
        /// Input CSV file
        input: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Analysis options (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Translation tables (JSON, default: built-in Norwegian tables)
        #[arg(short, long)]
        tables: Option<PathBuf>,

        /// Skip canonical value validation
        #[arg(long)]
        no_validate: bool,
    },

    /// Print the top/bottom summaries and median salary by expertise
    Summary {
        /// Input CSV file
        input: PathBuf,

        /// Analysis options (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Translation tables (JSON)
        #[arg(short, long)]
        tables: Option<PathBuf>,
    },

    /// Output the canonical table as JSON records
    Translate {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Translation tables (JSON)
        #[arg(short, long)]
        tables: Option<PathBuf>,
    },

    /// Parse a CSV file and output JSON records
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// CSV delimiter (auto-detect if not specified)
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in translation tables
    Tables {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Analysis options (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Translation tables (JSON)
        #[arg(short, long)]
        tables: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            input,
            format,
            output,
            config,
            tables,
            no_validate,
        } => cmd_analyze(
            &input,
            format,
            output.as_deref(),
            config.as_deref(),
            tables.as_deref(),
            no_validate,
        ),

        Commands::Summary {
            input,
            config,
            tables,
        } => cmd_summary(&input, config.as_deref(), tables.as_deref()),

        Commands::Translate {
            input,
            output,
            tables,
        } => cmd_translate(&input, output.as_deref(), tables.as_deref()),

        Commands::Parse {
            input,
            delimiter,
            output,
        } => cmd_parse(&input, delimiter, output.as_deref()),

        Commands::Tables { output } => cmd_tables(output.as_deref()),

        Commands::Serve {
            port,
            config,
            tables,
        } => cmd_serve(port, config.as_deref(), tables.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_options(config: Option<&Path>) -> Result<AnalysisOptions, ConfigError> {
    let options = match config {
        Some(path) => {
            eprintln!("⚙️  Options: {}", path.display());
            AnalysisOptions::from_json_file(path)?
        }
        None => AnalysisOptions::default(),
    };
    options.with_env_overrides()
}

fn load_tables(path: Option<&Path>) -> Result<TranslationTables, ConfigError> {
    match path {
        Some(p) => {
            eprintln!("🗺️  Translation tables: {}", p.display());
            TranslationTables::from_file(p)
        }
        None => Ok(TranslationTables::norwegian()),
    }
}

fn cmd_analyze(
    input: &Path,
    format: OutputFormat,
    output: Option<&Path>,
    config: Option<&Path>,
    tables: Option<&Path>,
    no_validate: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Analyzing: {}", input.display());

    let mut options = load_options(config)?;
    if no_validate {
        options.validate = false;
    }
    let tables = load_tables(tables)?;

    let outcome = analyze_file(input, &tables, &options)?;

    let rendered = match format {
        OutputFormat::Text => TextRenderer::new(options.preview_rows).render(&outcome.report)?,
        OutputFormat::Json => JsonRenderer { pretty: true }.render(&outcome.report)?,
    };
    write_output(&rendered, output)?;

    if !outcome.report.warnings.is_empty() {
        eprintln!(
            "⚠️  {} warning(s), see the report",
            outcome.report.warnings.len()
        );
    }
    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_summary(
    input: &Path,
    config: Option<&Path>,
    tables: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config)?;
    let tables = load_tables(tables)?;

    let outcome = analyze_file(input, &tables, &options)?;
    for line in &outcome.report.lines {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_translate(
    input: &Path,
    output: Option<&Path>,
    tables: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🔄 Translating: {}", input.display());

    let tables = load_tables(tables)?;
    let (csv_info, table) = canonicalize_file(input, &tables)?;
    eprintln!("   Rows: {}", csv_info.row_count);
    eprintln!("   Columns: {}", table.headers.join(", "));

    let json = serde_json::to_string_pretty(&table.to_records())?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_parse(
    input: &Path,
    delimiter: Option<char>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = match delimiter {
        Some(d) => parse_csv_file(input, d)?,
        None => parse_csv_file_auto(input)?,
    };

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'{}",
        format_delimiter(result.delimiter),
        if delimiter.is_none() { " (auto-detected)" } else { "" }
    );
    eprintln!("   Columns: {}", result.headers().join(", "));
    eprintln!("✅ Parsed {} records", result.table.len());

    let json = serde_json::to_string_pretty(&result.table.to_records())?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_tables(output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = TranslationTables::norwegian().to_json()?;
    write_output(&json, output)
}

async fn cmd_serve(
    port: u16,
    config: Option<&Path>,
    tables: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = load_options(config)?;
    let tables = load_tables(tables)?;
    salary_survey::server::start_server(port, tables, options).await
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
