//! Quarry CLI binary.
//!
//! Fetches XBRL instance documents from SEC EDGAR and extracts
//! financial metrics into a long-form table.

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use quarry::{
    ContextRules, DocumentInfo, ExtractionConfig, LongFormTable, Provenance, RuleSpec,
    TaggedDocument, extract_facts,
};
use quarry_data::edgar::{EdgarClient, FilingQuery, pad_cik, parse_index_page, parse_search_results};
use quarry_output::{ExportFormat, Exporter};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Quarry: XBRL fact extraction from SEC EDGAR filings", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract financial metrics from filings into a long-form table
    Metrics {
        /// Companies to process, as tickers or CIK numbers
        #[arg(required = true)]
        companies: Vec<String>,

        /// Form type to search for
        #[arg(long, default_value = "10-Q")]
        form: String,

        /// Only consider filings dated before this date (YYYY-MM-DD)
        #[arg(long)]
        date_before: Option<NaiveDate>,

        /// Maximum search results per company
        #[arg(long, default_value = "40")]
        count: u32,

        /// Reporting period to select, as YYYY-MM of the filing date
        /// (defaults to the most recent filing)
        #[arg(long)]
        period: Option<String>,

        /// File with one XBRL concept per line (overrides the built-in set)
        #[arg(long)]
        concepts_file: Option<PathBuf>,

        /// JSON file with custom context decoding rules
        #[arg(long)]
        rules_file: Option<PathBuf>,

        /// Output path
        #[arg(long, default_value = "metrics.csv")]
        out: PathBuf,

        /// Output format (csv, json, or pretty-json)
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Look up a company's CIK number from its ticker
    Lookup {
        /// Stock ticker symbol
        ticker: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Metrics {
            companies,
            form,
            date_before,
            count,
            period,
            concepts_file,
            rules_file,
            out,
            format,
        } => {
            let format = parse_format(&format)?;
            let config = load_concepts(concepts_file.as_deref())?;
            let rules = load_rules(rules_file.as_deref())?;
            extract_metrics(
                &companies,
                &form,
                date_before,
                count,
                period.as_deref(),
                &config,
                &rules,
                &out,
                format,
            )
            .await?;
        }
        Commands::Lookup { ticker } => {
            let client = EdgarClient::new()?;
            let cik = client.get_company_cik(&ticker).await?;
            println!("{}", cik);
        }
    }

    Ok(())
}

fn parse_format(name: &str) -> Result<ExportFormat, Box<dyn std::error::Error>> {
    match name.to_lowercase().as_str() {
        "csv" => Ok(ExportFormat::Csv),
        "json" => Ok(ExportFormat::Json),
        "pretty-json" | "pretty_json" => Ok(ExportFormat::PrettyJson),
        _ => Err(format!("Unknown output format: {} (expected csv, json, or pretty-json)", name).into()),
    }
}

/// Read an extraction config from a file with one concept per line.
/// Blank lines and `#` comments are skipped.
fn load_concepts(path: Option<&std::path::Path>) -> Result<ExtractionConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ExtractionConfig::standard());
    };

    let text = std::fs::read_to_string(path)?;
    let concepts: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect();

    if concepts.is_empty() {
        return Err(format!("No concepts found in {}", path.display()).into());
    }

    Ok(ExtractionConfig::new(concepts))
}

/// Read context decoding rules from a JSON array of rule specs.
fn load_rules(path: Option<&std::path::Path>) -> Result<ContextRules, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(ContextRules::standard());
    };

    let text = std::fs::read_to_string(path)?;
    let specs: Vec<RuleSpec> = serde_json::from_str(&text)?;
    Ok(ContextRules::from_specs(&specs)?)
}

#[allow(clippy::too_many_arguments)]
async fn extract_metrics(
    companies: &[String],
    form: &str,
    date_before: Option<NaiveDate>,
    count: u32,
    period: Option<&str>,
    config: &ExtractionConfig,
    rules: &ContextRules,
    out: &std::path::Path,
    format: ExportFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = EdgarClient::new()?;
    let mut table = LongFormTable::new();
    let mut skipped: Vec<String> = Vec::new();

    let pb = ProgressBar::new(companies.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(StdDuration::from_millis(100));

    for company in companies {
        pb.set_message(format!("Processing {}...", company));

        match process_company(
            &client, company, form, date_before, count, period, config, rules, &mut table,
        )
        .await
        {
            Ok(n) => pb.println(format!("  {} -> {} rows", company, n)),
            Err(e) => {
                pb.println(format!("  {} skipped: {}", company, e));
                skipped.push(company.clone());
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message(format!("{} rows extracted", table.len()));

    if table.is_empty() {
        return Err("No facts extracted from any company".into());
    }

    table.export_to_file(out, format)?;
    println!("Wrote {} rows to {}", table.len(), out.display());

    if !skipped.is_empty() {
        println!("Skipped: {}", skipped.join(", "));
    }

    Ok(())
}

/// Fetch, parse, and extract one company's filing into the table.
///
/// Failures here are per-company and do not abort the whole run.
#[allow(clippy::too_many_arguments)]
async fn process_company(
    client: &EdgarClient,
    company: &str,
    form: &str,
    date_before: Option<NaiveDate>,
    count: u32,
    period: Option<&str>,
    config: &ExtractionConfig,
    rules: &ContextRules,
    table: &mut LongFormTable,
) -> Result<usize, Box<dyn std::error::Error>> {
    let cik = resolve_cik(client, company).await?;

    let mut query = FilingQuery::new(cik.clone(), form);
    query.date_before = date_before;
    query.count = count;

    let search_html = client.get(&query.search_url()).await?;
    let links = parse_search_results(&search_html)?;

    let link = match period {
        Some(p) => links.iter().find(|l| l.year_month() == p),
        None => links.first(),
    }
    .ok_or_else(|| format!("No {} filing found for {}", form, company))?;

    let index_html = client.get(&link.index_url).await?;
    let instance_url = parse_index_page(&index_html)?;
    let xml = client.get(&instance_url).await?;

    let document = TaggedDocument::parse(&xml)?;
    let info = DocumentInfo::from_document(&document);

    let filing_date = NaiveDate::parse_from_str(&link.filing_date, "%Y-%m-%d")
        .ok()
        .or(info.period_end_date)
        .unwrap_or_else(|| Utc::now().date_naive());

    let provenance = Provenance {
        company_id: info.central_index_key.unwrap_or(cik),
        filing_date,
        source_document_id: instance_url,
    };

    let facts = extract_facts(&document, config);
    Ok(table.assemble(&facts, &provenance, rules))
}

/// Interpret a company argument as a CIK when numeric, otherwise as a
/// ticker to look up.
async fn resolve_cik(
    client: &EdgarClient,
    company: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    if company.chars().all(|c| c.is_ascii_digit()) && !company.is_empty() {
        Ok(pad_cik(company))
    } else {
        Ok(client.get_company_cik(company).await?)
    }
}
