use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dbmaintain_core::{validate_qualifiers, Script, ScriptConfig, ScriptFactory};
use script_locations::{ScriptCatalog, ScriptLocation};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json, Jsonl }

#[derive(Debug, Parser)]
#[command(name = "dbmaintain", version, about = "Discover and order database maintenance scripts")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./dbmaintain.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log scan details to stderr
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Args)]
struct ScanArgs {
    /// Script directories or archives (`scripts.jar` or `scripts.jar!inner/root`)
    locations: Vec<String>,
    /// Allowed script extensions, comma separated (e.g. sql,ddl)
    #[arg(long)]
    extensions: Option<String>,
    /// Script encoding (UTF-8 or ISO-8859-1)
    #[arg(long)]
    encoding: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// List scripts in execution order
    Scripts {
        #[command(flatten)]
        scan: ScanArgs,
        /// Output format: text, json, or jsonl
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Output file (overwrites)
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Write CSV instead of text/json when --out is provided
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
    /// Report scripts carrying qualifiers that are neither registered nor patch qualifiers
    Check {
        #[command(flatten)]
        scan: ScanArgs,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn script_config(base: Option<ScriptConfig>, args: &ScanArgs) -> ScriptConfig {
    let mut cfg = base.unwrap_or_default();
    if let Some(ext) = &args.extensions {
        cfg.file_extensions = ext
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(enc) = &args.encoding {
        cfg.encoding = enc.clone();
    }
    cfg
}

fn scan_all(factory: &ScriptFactory, locations: &[String]) -> Result<ScriptCatalog> {
    if locations.is_empty() {
        return Err(anyhow!("provide at least one script location (argument or `locations` in config)"));
    }
    let mut catalog = ScriptCatalog::default();
    let mut origin: HashMap<String, String> = HashMap::new();
    for loc in locations {
        let location = ScriptLocation::detect(loc);
        let descriptor = location.descriptor();
        debug!(location = %descriptor, "scanning");
        let scanned = location.scan(factory)?;
        let names: Vec<String> = scanned.iter().map(|s| s.file_name().to_string()).collect();
        for dropped in catalog.extend(scanned) {
            let kept = origin.get(&dropped).map(String::as_str).unwrap_or("-");
            warn!(file = %dropped, kept_from = %kept, dropped_from = %descriptor, "duplicate script file name across locations");
        }
        for name in names {
            origin.entry(name).or_insert_with(|| descriptor.clone());
        }
    }
    Ok(catalog)
}

/// Scripts whose qualifiers are neither registered nor patch qualifiers,
/// with the offending qualifier names.
fn unregistered(catalog: &ScriptCatalog, cfg: &ScriptConfig) -> Vec<(String, Vec<String>)> {
    catalog
        .iter()
        .filter_map(|s| {
            let unknown = validate_qualifiers(s, &cfg.qualifiers, &cfg.patch_qualifiers).err()?;
            Some((s.file_name().to_string(), unknown.iter().map(|q| q.to_string()).collect()))
        })
        .collect()
}

fn run_check(w: &mut dyn Write, catalog: &ScriptCatalog, cfg: &ScriptConfig) -> Result<()> {
    let bad = unregistered(catalog, cfg);
    for (file, names) in &bad {
        warn!(file = %file, qualifiers = %names.join(","), "unregistered qualifiers");
        writeln!(w, "{}: unregistered qualifier(s) {}", file, names.join(", "))?;
    }
    if !bad.is_empty() {
        return Err(anyhow!("{} script(s) with unregistered qualifiers", bad.len()));
    }
    writeln!(w, "{} script(s) checked, all qualifiers registered", catalog.len())?;
    Ok(())
}

fn rfc3339_ms(ms: Option<i64>) -> Option<String> {
    let ts = OffsetDateTime::from_unix_timestamp_nanos(ms? as i128 * 1_000_000).ok()?;
    ts.format(&Rfc3339).ok()
}

fn qualifier_list(s: &Script) -> Vec<String> {
    s.qualifiers().iter().map(|q| q.to_string()).collect()
}

fn script_json(s: &Script) -> serde_json::Value {
    serde_json::json!({
        "file_name": s.file_name(),
        "indexes": s.script_indexes(),
        "target_database": s.target_database_name(),
        "qualifiers": qualifier_list(s),
        "patch": s.is_patch_script(),
        "kind": s.kind(),
        "incremental": s.is_incremental(),
        "last_modified": rfc3339_ms(s.last_modified_ms()),
    })
}

fn write_listing(w: &mut dyn Write, catalog: &ScriptCatalog, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for s in catalog {
                writeln!(
                    w,
                    "{:<12} {:<14} {:<10} {:<20} {}",
                    s.script_indexes().to_string(),
                    format!("{:?}", s.kind()).to_lowercase(),
                    s.target_database_name().unwrap_or("-"),
                    if s.qualifiers().is_empty() { "-".to_string() } else { qualifier_list(s).join(",") },
                    s.file_name(),
                )?;
            }
        }
        OutputFormat::Json => {
            let all: Vec<serde_json::Value> = catalog.iter().map(script_json).collect();
            writeln!(w, "{}", serde_json::to_string_pretty(&all)?)?;
        }
        OutputFormat::Jsonl => {
            for s in catalog {
                writeln!(w, "{}", serde_json::to_string(&script_json(s))?)?;
            }
        }
    }
    Ok(())
}

fn write_csv(path: &PathBuf, catalog: &ScriptCatalog) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::fs::File::create(path)?);
    wtr.write_record(["file_name", "indexes", "target_database", "qualifiers", "patch", "kind", "last_modified"])?;
    for s in catalog {
        wtr.write_record([
            s.file_name().to_string(),
            s.script_indexes().to_string(),
            s.target_database_name().unwrap_or_default().to_string(),
            qualifier_list(s).join("|"),
            s.is_patch_script().to_string(),
            format!("{:?}", s.kind()).to_lowercase(),
            rfc3339_ms(s.last_modified_ms()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let loaded_cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Version => {
            println!("dbmaintain {}", dbmaintain_core::version());
        }
        Commands::Scripts { scan, format, out, csv } => {
            let cfg = script_config(loaded_cfg.scripts.clone(), &scan);
            let factory = ScriptFactory::new(&cfg)?;
            let locations = if scan.locations.is_empty() { loaded_cfg.locations.clone() } else { scan.locations };
            let catalog = scan_all(&factory, &locations)?;
            match out {
                Some(path) if csv => write_csv(&path, &catalog)?,
                Some(path) => {
                    let mut w = std::io::BufWriter::new(std::fs::File::create(&path)?);
                    write_listing(&mut w, &catalog, format)?;
                    w.flush()?;
                }
                None => {
                    let stdout = std::io::stdout();
                    write_listing(&mut stdout.lock(), &catalog, format)?;
                }
            }
        }
        Commands::Check { scan } => {
            let cfg = script_config(loaded_cfg.scripts.clone(), &scan);
            let factory = ScriptFactory::new(&cfg)?;
            let locations = if scan.locations.is_empty() { loaded_cfg.locations.clone() } else { scan.locations };
            let catalog = scan_all(&factory, &locations)?;
            let stdout = std::io::stdout();
            run_check(&mut stdout.lock(), &catalog, &cfg)?;
        }
    }
    Ok(())
}
