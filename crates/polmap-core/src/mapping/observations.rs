//! Observation/audit-note assembly and the automatic-findings pass.

use chrono::{Months, NaiveDate};

use super::resolver::is_plate_placeholder;
use crate::models::config::FindingsConfig;
use crate::models::policy::{
    InstallmentSchedule, MappedPolicyData, MappingIntent, ObservationsDocument,
};

/// Marker prepended to system-inserted notes. User text echoing it back is
/// suppressed so boilerplate is not recorded as if it were user input.
pub const AUTO_NOTE_MARKER: &str = "[generado automaticamente]";

/// Inputs for assembling an observations document.
#[derive(Debug, Clone, Default)]
pub struct ObservationContext<'a> {
    /// Prior policy number, for renewal/modification headers.
    pub prior_policy: Option<&'a str>,

    /// Detected (field, description) changes; rendered for modifications.
    pub changes: &'a [(String, String)],

    /// Computed or literal payment schedule.
    pub schedule: Option<&'a InstallmentSchedule>,

    /// Currency code for amount rendering.
    pub currency: &'a str,

    /// Free-text notes supplied by the operator.
    pub user_notes: Option<&'a str>,
}

/// Assemble the ordered observations document for an intent.
pub fn build_observations(
    intent: MappingIntent,
    context: &ObservationContext<'_>,
) -> ObservationsDocument {
    let prior = context.prior_policy.unwrap_or("anterior");
    let header = match intent {
        MappingIntent::Create => {
            "Póliza nueva emitida a partir de documento escaneado.".to_string()
        }
        MappingIntent::Renew => format!("Renovación de póliza {}.", prior),
        MappingIntent::Modify => format!("Modificación de póliza {}.", prior),
    };

    let changes = match intent {
        MappingIntent::Modify if !context.changes.is_empty() => {
            let mut lines = vec!["Cambios detectados:".to_string()];
            lines.extend(
                context
                    .changes
                    .iter()
                    .map(|(field, description)| format!("- {}: {}", field, description)),
            );
            Some(lines.join("\n"))
        }
        _ => None,
    };

    let schedule = context.schedule.map(|s| render_schedule(s, context.currency));

    let user_notes = context
        .user_notes
        .map(str::trim)
        .filter(|notes| !notes.is_empty())
        .filter(|notes| !notes.to_lowercase().contains(AUTO_NOTE_MARKER))
        .map(|notes| format!("Observaciones del usuario:\n{}", notes));

    ObservationsDocument {
        header,
        changes,
        schedule,
        user_notes,
    }
}

fn render_schedule(schedule: &InstallmentSchedule, currency: &str) -> String {
    if schedule.len() == 1 {
        let only = &schedule.installments[0];
        return format!("Pago contado: {} {}", currency, only.amount);
    }

    let mut lines = vec![format!("Plan de pagos ({} cuotas):", schedule.len())];
    lines.extend(schedule.installments.iter().map(|i| {
        format!(
            "  Cuota {}: {} - {} {}",
            i.number,
            i.due_date.format("%d/%m/%Y"),
            currency,
            i.amount
        )
    }));
    lines.join("\n")
}

/// Inspect normalized data and emit advisory findings.
///
/// Findings never block processing; they surface conditions a reviewer
/// should look at: unresolved plate placeholders, inverted or overlong
/// validity spans, premiums outside the configured plausibility band.
pub fn automatic_findings(data: &MappedPolicyData, config: &FindingsConfig) -> Vec<String> {
    let mut findings = Vec::new();

    match &data.vehicle_plate {
        Some(plate) if is_plate_placeholder(plate) => {
            findings.push(format!(
                "La matrícula no pudo resolverse (valor escaneado: {}).",
                plate
            ));
        }
        None => findings.push("La matrícula no pudo resolverse.".to_string()),
        _ => {}
    }

    if let (Some(start), Some(end)) = (data.start_date, data.end_date) {
        if end < start {
            findings.push(format!(
                "Fechas de vigencia invertidas: desde {} hasta {}.",
                start, end
            ));
        } else if exceeds_months(start, end, config.max_validity_months) {
            findings.push(format!(
                "Vigencia mayor a {} meses: desde {} hasta {}.",
                config.max_validity_months, start, end
            ));
        }
    }

    if let Some(premium) = data.premium {
        if premium < config.premium_min || premium > config.premium_max {
            findings.push(format!(
                "Prima fuera del rango esperado [{}, {}]: {}.",
                config.premium_min, config.premium_max, premium
            ));
        }
    }

    findings
}

fn exceeds_months(start: NaiveDate, end: NaiveDate, months: u32) -> bool {
    match start.checked_add_months(Months::new(months)) {
        Some(limit) => end > limit,
        None => false,
    }
}
