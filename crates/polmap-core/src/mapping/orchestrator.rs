//! Mapping orchestrator: drives a full mapping run.
//!
//! A run is fail-soft: every per-field resolver or parser failure is
//! downgraded to an issue entry and the run always completes with a
//! best-effort [`MappingResult`]. Only a structurally invalid input (an
//! absent/empty raw record) fails hard.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::locale::{parse_amount, parse_date};
use super::observations::{automatic_findings, build_observations, ObservationContext};
use super::reconcile::{self, ReconcileOutcome};
use super::resolver;
use super::schedule::schedule_from_record;
use super::strategy::{strategy_for, MappingStrategy};
use crate::error::{PolmapError, Result};
use crate::models::catalog::{Catalog, ExistingPolicy, MasterCatalogs};
use crate::models::config::MapperConfig;
use crate::models::policy::{CanonicalField, MappedPolicyData, MappingIntent};
use crate::models::record::RawExtractionRecord;
use crate::models::result::{
    FieldMappingIssue, FieldSuggestion, MappingMetrics, MappingQuality, MappingResult, MatchSource,
};

/// Per-run inputs beyond the record and catalogs.
#[derive(Debug, Clone)]
pub struct MappingContext {
    pub intent: MappingIntent,
    pub company_code: String,

    /// Existing-policy summary from the external lookup, when available.
    pub existing: Option<ExistingPolicy>,

    /// Operator-supplied notes for the observations document.
    pub user_notes: Option<String>,

    /// "Now" for degraded-mode schedule dates and year plausibility.
    pub reference_date: NaiveDate,
}

impl MappingContext {
    pub fn new(intent: MappingIntent, company_code: impl Into<String>) -> Self {
        Self {
            intent,
            company_code: company_code.into(),
            existing: None,
            user_notes: None,
            reference_date: Utc::now().date_naive(),
        }
    }

    pub fn with_existing(mut self, existing: ExistingPolicy) -> Self {
        self.existing = Some(existing);
        self
    }

    pub fn with_user_notes(mut self, notes: impl Into<String>) -> Self {
        self.user_notes = Some(notes.into());
        self
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }
}

/// The mapping engine entry point.
///
/// Stateless between invocations; one instance can serve concurrent runs.
pub struct PolicyMapper {
    config: MapperConfig,
}

impl PolicyMapper {
    /// Create a mapper with default configuration.
    pub fn new() -> Self {
        Self {
            config: MapperConfig::default(),
        }
    }

    /// Create a mapper with explicit configuration.
    pub fn with_config(config: MapperConfig) -> Self {
        Self { config }
    }

    /// Run a full mapping over a raw extraction record.
    pub fn map(
        &self,
        record: &RawExtractionRecord,
        catalogs: &MasterCatalogs,
        context: &MappingContext,
    ) -> Result<MappingResult> {
        if record.is_empty() {
            return Err(PolmapError::Structural(
                "raw extraction record has no entries".to_string(),
            ));
        }

        let strategy = strategy_for(&context.company_code);
        info!(
            "mapping run: intent {:?}, company {} (strategy {}), {} raw entries",
            context.intent,
            context.company_code,
            strategy.company_code(),
            record.len()
        );

        let mut issues: Vec<FieldMappingIssue> = Vec::new();
        let mut suggestions: Vec<FieldSuggestion> = Vec::new();
        let mut data = MappedPolicyData::with_defaults(&self.config.defaults);
        let strategy = strategy.as_ref();

        // Identifiers
        data.policy_number =
            self.resolve_text(record, strategy, CanonicalField::PolicyNumber, &mut issues);
        if let Some(endorsement) =
            self.resolve_defaulted(record, strategy, CanonicalField::Endorsement)
        {
            data.endorsement = endorsement;
        }

        // Validity
        data.start_date =
            self.resolve_date(record, strategy, CanonicalField::StartDate, &mut issues);
        data.end_date = self.resolve_date(record, strategy, CanonicalField::EndDate, &mut issues);

        // Vehicle
        data.vehicle_brand =
            self.resolve_text(record, strategy, CanonicalField::VehicleBrand, &mut issues);
        data.vehicle_model =
            self.resolve_text(record, strategy, CanonicalField::VehicleModel, &mut issues);
        data.vehicle_year = self.resolve_year(record, strategy, context, &mut issues);
        data.vehicle_plate = self.resolve_plate(record, strategy, &mut issues);
        data.motor_number =
            self.resolve_text(record, strategy, CanonicalField::MotorNumber, &mut issues);
        data.chassis_number =
            self.resolve_text(record, strategy, CanonicalField::ChassisNumber, &mut issues);

        // Amounts and payment
        data.premium = self.resolve_amount(record, strategy, CanonicalField::Premium, &mut issues);
        data.total_amount =
            self.resolve_amount(record, strategy, CanonicalField::TotalAmount, &mut issues);
        if let Some(count) = self.resolve_count(record, strategy, &mut issues) {
            data.installment_count = count;
        }
        data.payment_method =
            self.resolve_text(record, strategy, CanonicalField::PaymentMethod, &mut issues);

        let scanned_currency = self.resolve_defaulted(record, strategy, CanonicalField::Currency);
        if let Some(raw) = &scanned_currency {
            match normalize_currency(raw) {
                Some(code) => data.currency = code,
                None => {
                    issues.push(FieldMappingIssue::invalid_format(
                        CanonicalField::Currency,
                        raw.clone(),
                    ));
                }
            }
        }

        // Reconciliation fields keep their scanned text on the mapped data;
        // structured identifiers travel as suggestions.
        data.client_name =
            self.resolve_text(record, strategy, CanonicalField::ClientName, &mut issues);
        data.broker_code =
            self.resolve_text(record, strategy, CanonicalField::BrokerCode, &mut issues);
        data.department =
            self.resolve_text(record, strategy, CanonicalField::Department, &mut issues);
        data.fuel_type = self.resolve_text(record, strategy, CanonicalField::FuelType, &mut issues);
        data.destination =
            self.resolve_text(record, strategy, CanonicalField::Destination, &mut issues);
        data.category = self.resolve_text(record, strategy, CanonicalField::Category, &mut issues);
        data.quality = self.resolve_text(record, strategy, CanonicalField::Quality, &mut issues);
        data.tariff = self.resolve_text(record, strategy, CanonicalField::Tariff, &mut issues);
        debug!("fields resolved, {} issues so far", issues.len());

        let reconcile_pairs: [(CanonicalField, Option<&String>, &Catalog); 9] = [
            (CanonicalField::ClientName, data.client_name.as_ref(), &catalogs.clients),
            (CanonicalField::BrokerCode, data.broker_code.as_ref(), &catalogs.brokers),
            (CanonicalField::Department, data.department.as_ref(), &catalogs.departments),
            (CanonicalField::FuelType, data.fuel_type.as_ref(), &catalogs.fuel_types),
            (CanonicalField::Destination, data.destination.as_ref(), &catalogs.destinations),
            (CanonicalField::Category, data.category.as_ref(), &catalogs.categories),
            (CanonicalField::Quality, data.quality.as_ref(), &catalogs.qualities),
            (CanonicalField::Tariff, data.tariff.as_ref(), &catalogs.tariffs),
            (CanonicalField::Currency, scanned_currency.as_ref(), &catalogs.currencies),
        ];

        for (field, scanned, catalog) in reconcile_pairs {
            let Some(scanned) = scanned else { continue };
            if catalog.is_empty() {
                continue;
            }
            match reconcile::suggest(field, scanned, catalog, &self.config.reconciliation) {
                ReconcileOutcome::Suggestion(suggestion) => {
                    if suggestion.source != MatchSource::Exact
                        && suggestion.confidence < self.config.reconciliation.review_confidence
                    {
                        issues.push(FieldMappingIssue::low_confidence(field, scanned.clone()));
                    }
                    suggestions.push(suggestion);
                }
                ReconcileOutcome::Issue(issue) => issues.push(issue),
            }
        }
        debug!("reconciliation produced {} suggestions", suggestions.len());

        let metrics = self.compute_metrics(&data, &issues, &suggestions);

        let schedule = data.total_amount.map(|total| {
            schedule_from_record(
                record,
                total,
                data.installment_count,
                data.start_date,
                context.reference_date,
            )
        });

        let changes = match (context.intent, &context.existing) {
            (MappingIntent::Modify, Some(existing)) => detect_changes(&data, existing),
            _ => Vec::new(),
        };

        let observations = build_observations(
            context.intent,
            &ObservationContext {
                prior_policy: data.policy_number.as_deref(),
                changes: &changes,
                schedule: schedule.as_ref(),
                currency: &data.currency,
                user_notes: context.user_notes.as_deref(),
            },
        );

        let findings = automatic_findings(&data, &self.config.findings);

        info!(
            "mapping run done: {}/{} fields, confidence {:.2} ({:?})",
            metrics.fields_mapped, metrics.fields_scanned, metrics.overall_confidence, metrics.quality
        );

        Ok(MappingResult {
            intent: context.intent,
            company_code: strategy.company_code().to_string(),
            data,
            issues,
            suggestions,
            metrics,
            schedule,
            observations,
            findings,
        })
    }

    fn resolve_text(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        field: CanonicalField,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<String> {
        match resolver::resolve(record, &strategy.candidates(field)) {
            Ok(resolved) => Some(strategy.cleanup(field, resolved.value)),
            Err(_) => {
                issues.push(FieldMappingIssue::missing(field));
                None
            }
        }
    }

    /// Like [`Self::resolve_text`] but silent on absence: the configured
    /// default applies instead of an issue.
    fn resolve_defaulted(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        field: CanonicalField,
    ) -> Option<String> {
        resolver::resolve(record, &strategy.candidates(field))
            .ok()
            .map(|resolved| strategy.cleanup(field, resolved.value))
    }

    fn resolve_amount(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        field: CanonicalField,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<Decimal> {
        let raw = self.resolve_text(record, strategy, field, issues)?;
        match parse_amount(&raw) {
            Ok(amount) => Some(amount),
            Err(_) => {
                issues.push(FieldMappingIssue::invalid_format(field, raw));
                None
            }
        }
    }

    fn resolve_date(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        field: CanonicalField,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<NaiveDate> {
        let raw = self.resolve_text(record, strategy, field, issues)?;
        match parse_date(&raw) {
            Ok(date) => Some(date),
            Err(_) => {
                issues.push(FieldMappingIssue::invalid_format(field, raw));
                None
            }
        }
    }

    fn resolve_count(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<u32> {
        let raw =
            self.resolve_defaulted(record, strategy, CanonicalField::InstallmentCount)?;
        match raw.trim().parse::<u32>() {
            Ok(count) if count >= 1 => Some(count),
            _ => {
                issues.push(FieldMappingIssue::invalid_format(
                    CanonicalField::InstallmentCount,
                    raw,
                ));
                None
            }
        }
    }

    fn resolve_year(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        context: &MappingContext,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<i32> {
        let raw = self.resolve_text(record, strategy, CanonicalField::VehicleYear, issues)?;
        let max_year = context.reference_date.year() + 1;
        match raw.trim().parse::<i32>() {
            Ok(year) if (self.config.findings.min_vehicle_year..=max_year).contains(&year) => {
                Some(year)
            }
            _ => {
                issues.push(FieldMappingIssue::invalid_format(
                    CanonicalField::VehicleYear,
                    raw,
                ));
                None
            }
        }
    }

    fn resolve_plate(
        &self,
        record: &RawExtractionRecord,
        strategy: &dyn MappingStrategy,
        issues: &mut Vec<FieldMappingIssue>,
    ) -> Option<String> {
        match resolver::resolve_plate(record, &strategy.candidates(CanonicalField::VehiclePlate)) {
            Ok(resolved) => Some(strategy.cleanup(CanonicalField::VehiclePlate, resolved.value)),
            Err(_) => {
                issues.push(FieldMappingIssue::missing(CanonicalField::VehiclePlate));
                None
            }
        }
    }

    fn compute_metrics(
        &self,
        data: &MappedPolicyData,
        issues: &[FieldMappingIssue],
        suggestions: &[FieldSuggestion],
    ) -> MappingMetrics {
        let fields_scanned = CanonicalField::ALL.len();
        let fields_mapped = CanonicalField::ALL
            .iter()
            .filter(|f| data.is_resolved(**f))
            .count();

        let fields_with_issues = issues
            .iter()
            .map(|i| i.field)
            .collect::<HashSet<_>>()
            .len();
        let fields_requiring_attention = issues
            .iter()
            .filter(|i| i.needs_attention())
            .map(|i| i.field)
            .collect::<HashSet<_>>()
            .len();

        let overall_confidence = if suggestions.is_empty() {
            0.0
        } else {
            suggestions.iter().map(|s| s.confidence).sum::<f32>() / suggestions.len() as f32
        };

        let missing_critical = CanonicalField::ALL
            .iter()
            .filter(|f| f.is_required() && !data.is_resolved(**f))
            .copied()
            .collect();

        MappingMetrics {
            fields_scanned,
            fields_mapped,
            fields_with_issues,
            fields_requiring_attention,
            overall_confidence,
            quality: MappingQuality::from_confidence(overall_confidence, &self.config.quality),
            missing_critical,
        }
    }
}

impl Default for PolicyMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize scanned currency text to a code.
fn normalize_currency(raw: &str) -> Option<String> {
    let upper = raw.trim().to_uppercase();
    if upper.contains("U$S") || upper.contains("USD") || upper.contains("DOLAR") || upper.contains("DÓLAR") {
        return Some("USD".to_string());
    }
    if upper.contains("UYU") || upper.contains("PESO") || upper == "$" {
        return Some("UYU".to_string());
    }
    if upper.len() == 3 && upper.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(upper);
    }
    None
}

/// Field-level differences between the mapped data and an existing policy,
/// rendered for the "changes detected" observations section.
fn detect_changes(data: &MappedPolicyData, existing: &ExistingPolicy) -> Vec<(String, String)> {
    let mut changes = Vec::new();

    if let (Some(new_name), Some(old_name)) = (&data.client_name, &existing.client_name) {
        if !new_name.eq_ignore_ascii_case(old_name) {
            changes.push((
                CanonicalField::ClientName.to_string(),
                format!("de {} a {}", old_name, new_name),
            ));
        }
    }

    if let (Some(new_start), Some(old_start)) = (data.start_date, existing.start_date) {
        if new_start != old_start {
            changes.push((
                CanonicalField::StartDate.to_string(),
                format!("de {} a {}", old_start, new_start),
            ));
        }
    }

    if let (Some(new_end), Some(old_end)) = (data.end_date, existing.end_date) {
        if new_end != old_end {
            changes.push((
                CanonicalField::EndDate.to_string(),
                format!("de {} a {}", old_end, new_end),
            ));
        }
    }

    if let (Some(new_total), Some(old_total)) = (data.total_amount, existing.total_amount) {
        if new_total != old_total {
            changes.push((
                CanonicalField::TotalAmount.to_string(),
                format!("de {} a {}", old_total, new_total),
            ));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogEntry;
    use std::str::FromStr;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context(intent: MappingIntent) -> MappingContext {
        MappingContext::new(intent, "GENERIC").with_reference_date(day(2024, 6, 1))
    }

    fn catalogs() -> MasterCatalogs {
        MasterCatalogs {
            clients: Catalog::new(vec![CatalogEntry {
                id: 10,
                code: "C010".to_string(),
                name: "Juan Pérez".to_string(),
            }]),
            departments: Catalog::new(vec![
                CatalogEntry {
                    id: 1,
                    code: "MVD".to_string(),
                    name: "Montevideo".to_string(),
                },
                CatalogEntry {
                    id: 2,
                    code: "CAN".to_string(),
                    name: "Canelones".to_string(),
                },
            ]),
            ..Default::default()
        }
    }

    fn full_record() -> RawExtractionRecord {
        RawExtractionRecord::from_pairs([
            ("poliza.numero", "Nº de Póliza: 1234567 Endoso: 0"),
            ("vigencia.desde", "15/01/2024"),
            ("vigencia.hasta", "15/01/2025"),
            ("vehiculo.marca", "CHEVROLET"),
            ("vehiculo.modelo", "ONIX"),
            ("vehiculo.anio", "2021"),
            ("vehiculo.matricula", "SAB1234"),
            ("vehiculo.motor", "M123456"),
            ("vehiculo.chasis", "9BGKS48U0KG123456"),
            ("pago.prima", "Prima: 25.000,00"),
            ("pago.total", "Total: 30.000,00"),
            ("pago.cuotas", "3"),
            ("pago.medio", "DEBITO"),
            ("conmoneda", "UYU"),
            ("cliente.nombre", "JUAN PEREZ"),
            ("riesgo.departamento", "MONTEVIDEO"),
        ])
    }

    #[test]
    fn test_empty_record_fails_hard() {
        let mapper = PolicyMapper::new();
        let result = mapper.map(
            &RawExtractionRecord::default(),
            &MasterCatalogs::default(),
            &context(MappingIntent::Create),
        );
        assert!(matches!(result, Err(PolmapError::Structural(_))));
    }

    #[test]
    fn test_policy_number_from_blob_and_currency_kept() {
        let record = RawExtractionRecord::from_pairs([
            ("poliza.numero", "Nº de Póliza: 1234567"),
            ("conmoneda", "USD"),
        ]);
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&record, &MasterCatalogs::default(), &context(MappingIntent::Create))
            .unwrap();

        assert_eq!(result.data.policy_number.as_deref(), Some("1234567"));
        assert_eq!(result.data.currency, "USD");
    }

    #[test]
    fn test_unresolved_field_yields_exactly_one_issue() {
        let record = RawExtractionRecord::from_pairs([("conmoneda", "USD")]);
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&record, &MasterCatalogs::default(), &context(MappingIntent::Create))
            .unwrap();

        let policy_issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.field == CanonicalField::PolicyNumber)
            .collect();
        assert_eq!(policy_issues.len(), 1);
        assert_eq!(policy_issues[0].kind, crate::models::result::IssueKind::Missing);
        assert!(result
            .metrics
            .missing_critical
            .contains(&CanonicalField::PolicyNumber));
    }

    #[test]
    fn test_full_record_end_to_end() {
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&full_record(), &catalogs(), &context(MappingIntent::Create))
            .unwrap();

        let data = &result.data;
        assert_eq!(data.policy_number.as_deref(), Some("1234567"));
        assert_eq!(data.endorsement, "0");
        assert_eq!(data.start_date, Some(day(2024, 1, 15)));
        assert_eq!(data.end_date, Some(day(2025, 1, 15)));
        assert_eq!(data.vehicle_year, Some(2021));
        assert_eq!(data.premium, Some(Decimal::from_str("25000.00").unwrap()));
        assert_eq!(data.total_amount, Some(Decimal::from_str("30000.00").unwrap()));
        assert_eq!(data.installment_count, 3);

        // Exact client and department matches
        let client = result
            .suggestions
            .iter()
            .find(|s| s.field == CanonicalField::ClientName)
            .unwrap();
        assert_eq!(client.confidence, 1.0);
        assert_eq!(client.source, MatchSource::Exact);
        assert_eq!(client.suggested_id, 10);

        assert_eq!(result.metrics.overall_confidence, 1.0);
        assert_eq!(result.metrics.quality, MappingQuality::Excellent);
        assert!(result.metrics.missing_critical.is_empty());

        // Schedule attached and exact
        let schedule = result.schedule.as_ref().unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.total(), Decimal::from_str("30000.00").unwrap());

        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_plate_blind_scan_through_orchestrator() {
        let record = RawExtractionRecord::from_pairs([
            ("vehiculo.matricula", "PATENTE"),
            ("notas", "Unidad SAB1234 al dia"),
        ]);
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&record, &MasterCatalogs::default(), &context(MappingIntent::Create))
            .unwrap();

        assert_eq!(result.data.vehicle_plate.as_deref(), Some("SAB1234"));
    }

    #[test]
    fn test_invalid_amount_preserves_raw_value() {
        let record = RawExtractionRecord::from_pairs([("pago.total", "ilegible")]);
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&record, &MasterCatalogs::default(), &context(MappingIntent::Create))
            .unwrap();

        let issue = result
            .issues
            .iter()
            .find(|i| i.field == CanonicalField::TotalAmount)
            .unwrap();
        assert_eq!(issue.kind, crate::models::result::IssueKind::InvalidFormat);
        assert_eq!(issue.scanned_value.as_deref(), Some("ilegible"));
        assert!(result.data.total_amount.is_none());
    }

    #[test]
    fn test_vehicle_year_out_of_band_is_issue() {
        let record = RawExtractionRecord::from_pairs([("vehiculo.anio", "1930")]);
        let mapper = PolicyMapper::new();
        let result = mapper
            .map(&record, &MasterCatalogs::default(), &context(MappingIntent::Create))
            .unwrap();

        assert!(result.data.vehicle_year.is_none());
        assert!(result
            .issues
            .iter()
            .any(|i| i.field == CanonicalField::VehicleYear
                && i.kind == crate::models::result::IssueKind::InvalidFormat));
    }

    #[test]
    fn test_modification_reports_detected_changes() {
        let existing = ExistingPolicy {
            id: 42,
            status: "VIGENTE".to_string(),
            start_date: Some(day(2023, 1, 15)),
            end_date: Some(day(2024, 1, 15)),
            client_name: Some("JUAN PEREZ".to_string()),
            total_amount: Some(Decimal::from_str("20000.00").unwrap()),
        };
        let ctx = context(MappingIntent::Modify).with_existing(existing);
        let mapper = PolicyMapper::new();
        let result = mapper.map(&full_record(), &catalogs(), &ctx).unwrap();

        let changes = result.observations.changes.as_deref().unwrap();
        assert!(changes.contains("Cambios detectados:"));
        assert!(changes.contains("total_amount"));
        assert!(result.observations.header.contains("Modificación de póliza 1234567"));
    }

    #[test]
    fn test_renewal_observations_and_user_notes() {
        let ctx = context(MappingIntent::Renew).with_user_notes("cliente solicita aviso previo");
        let mapper = PolicyMapper::new();
        let result = mapper.map(&full_record(), &catalogs(), &ctx).unwrap();

        assert!(result.observations.header.contains("Renovación"));
        assert!(result
            .observations
            .user_notes
            .as_deref()
            .unwrap()
            .contains("aviso previo"));
        // 3 installments: schedule section, not single-payment line
        assert!(result
            .observations
            .schedule
            .as_deref()
            .unwrap()
            .contains("Plan de pagos (3 cuotas):"));
    }
}
