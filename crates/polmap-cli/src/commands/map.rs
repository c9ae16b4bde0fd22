//! Map command - resolve a raw extraction record into structured policy data.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use polmap_core::mapping::check_policy_conflict;
use polmap_core::models::catalog::{ExistingPolicy, MasterCatalogs};
use polmap_core::models::config::MapperConfig;
use polmap_core::models::policy::{CanonicalField, MappedPolicyData, MappingIntent};
use polmap_core::models::record::RawExtractionRecord;
use polmap_core::models::result::MappingResult;
use polmap_core::{MappingContext, PolicyMapper};

/// Arguments for the map command.
#[derive(Args)]
pub struct MapArgs {
    /// Raw extraction record (JSON object of scanned key/value pairs)
    #[arg(required = true)]
    input: PathBuf,

    /// Master catalogs file (JSON); mapping runs without reconciliation data
    /// when omitted
    #[arg(long)]
    catalogs: Option<PathBuf>,

    /// Insurance company code or name (e.g. BSE, SURA, MAPFRE)
    #[arg(short = 'C', long, default_value = "generic")]
    company: String,

    /// Mapping intent: create, modify or renew
    #[arg(short, long, default_value = "create")]
    intent: String,

    /// Existing-policy summary (JSON) from the policy-system lookup
    #[arg(long)]
    existing: Option<PathBuf>,

    /// Operator notes to append to the observations
    #[arg(long)]
    notes: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show confidence summary after mapping
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full mapping result as JSON
    Json,
    /// Field/value table as CSV
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: MapArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        MapperConfig::from_file(std::path::Path::new(path))?
    } else {
        MapperConfig::default()
    };

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let intent = MappingIntent::from_str(&args.intent)
        .ok_or_else(|| anyhow::anyhow!("Unknown intent: {} (expected create, modify or renew)", args.intent))?;

    info!("Mapping record: {}", args.input.display());

    let record: RawExtractionRecord = serde_json::from_str(&fs::read_to_string(&args.input)?)?;

    let catalogs = match &args.catalogs {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => {
            debug!("no catalogs file given, reconciliation will be skipped");
            MasterCatalogs::default()
        }
    };

    let existing: Option<ExistingPolicy> = match &args.existing {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };

    let mut context = MappingContext::new(intent, &args.company);
    if let Some(existing) = existing.clone() {
        context = context.with_existing(existing);
    }
    if let Some(notes) = &args.notes {
        context = context.with_user_notes(notes);
    }

    let mapper = PolicyMapper::with_config(config);
    let result = mapper.map(&record, &catalogs, &context)?;

    // Conflict check against the lookup outcome; advisory only
    if let Some(policy_number) = &result.data.policy_number {
        let validation = check_policy_conflict(intent, policy_number, existing.as_ref());
        if !validation.is_valid {
            if let Some(message) = &validation.error_message {
                eprintln!("{} {}", style("⚠").yellow(), message);
            }
            for action in &validation.suggested_actions {
                eprintln!("  - {:?}", action);
            }
        }
    }

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Overall confidence: {:.1}% ({:?})",
            style("ℹ").blue(),
            result.metrics.overall_confidence * 100.0,
            result.metrics.quality
        );
        println!(
            "{} Fields mapped: {}/{}, requiring attention: {}",
            style("ℹ").blue(),
            result.metrics.fields_mapped,
            result.metrics.fields_scanned,
            result.metrics.fields_requiring_attention
        );
    }

    debug!("Total mapping time: {:?}", start.elapsed());

    Ok(())
}

fn format_result(result: &MappingResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &MappingResult) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["field", "value"])?;

    for field in CanonicalField::ALL {
        writer.write_record([
            field.as_str(),
            field_value(&result.data, field).as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

fn format_text(result: &MappingResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!(
        "Company: {}  Intent: {:?}",
        result.company_code, result.intent
    ));
    lines.push(String::new());

    for field in CanonicalField::ALL {
        if let Some(value) = field_value(&result.data, field) {
            lines.push(format!("{:<18} {}", field.as_str(), value));
        }
    }

    if !result.suggestions.is_empty() {
        lines.push(String::new());
        lines.push("Catalog suggestions:".to_string());
        for suggestion in &result.suggestions {
            lines.push(format!(
                "  {} -> {} ({}) [{:.0}%, {:?}]",
                suggestion.scanned_value,
                suggestion.suggested_name,
                suggestion.suggested_code,
                suggestion.confidence * 100.0,
                suggestion.source
            ));
        }
    }

    if !result.issues.is_empty() {
        lines.push(String::new());
        lines.push("Issues:".to_string());
        for issue in &result.issues {
            match &issue.scanned_value {
                Some(scanned) => lines.push(format!(
                    "  {} ({:?}): {}",
                    issue.field, issue.kind, scanned
                )),
                None => lines.push(format!("  {} ({:?})", issue.field, issue.kind)),
            }
        }
    }

    if !result.findings.is_empty() {
        lines.push(String::new());
        lines.push("Findings:".to_string());
        for finding in &result.findings {
            lines.push(format!("  - {}", finding));
        }
    }

    lines.push(String::new());
    lines.push("Observations:".to_string());
    lines.push(result.observations.render());

    lines.join("\n")
}

/// Rendered value of a canonical field, for tabular output.
fn field_value(data: &MappedPolicyData, field: CanonicalField) -> Option<String> {
    match field {
        CanonicalField::PolicyNumber => data.policy_number.clone(),
        CanonicalField::Endorsement => Some(data.endorsement.clone()),
        CanonicalField::StartDate => data.start_date.map(|d| d.to_string()),
        CanonicalField::EndDate => data.end_date.map(|d| d.to_string()),
        CanonicalField::VehicleBrand => data.vehicle_brand.clone(),
        CanonicalField::VehicleModel => data.vehicle_model.clone(),
        CanonicalField::VehicleYear => data.vehicle_year.map(|y| y.to_string()),
        CanonicalField::VehiclePlate => data.vehicle_plate.clone(),
        CanonicalField::MotorNumber => data.motor_number.clone(),
        CanonicalField::ChassisNumber => data.chassis_number.clone(),
        CanonicalField::Premium => data.premium.map(|a| a.to_string()),
        CanonicalField::TotalAmount => data.total_amount.map(|a| a.to_string()),
        CanonicalField::InstallmentCount => Some(data.installment_count.to_string()),
        CanonicalField::PaymentMethod => data.payment_method.clone(),
        CanonicalField::Currency => Some(data.currency.clone()),
        CanonicalField::ClientName => data.client_name.clone(),
        CanonicalField::BrokerCode => data.broker_code.clone(),
        CanonicalField::Department => data.department.clone(),
        CanonicalField::FuelType => data.fuel_type.clone(),
        CanonicalField::Destination => data.destination.clone(),
        CanonicalField::Category => data.category.clone(),
        CanonicalField::Quality => data.quality.clone(),
        CanonicalField::Tariff => data.tariff.clone(),
    }
}
