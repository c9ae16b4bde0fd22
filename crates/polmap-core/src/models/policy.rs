//! Canonical policy data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::config::DefaultValues;

/// The fixed set of canonical target fields the engine populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PolicyNumber,
    Endorsement,
    StartDate,
    EndDate,
    VehicleBrand,
    VehicleModel,
    VehicleYear,
    VehiclePlate,
    MotorNumber,
    ChassisNumber,
    Premium,
    TotalAmount,
    InstallmentCount,
    PaymentMethod,
    Currency,
    ClientName,
    BrokerCode,
    Department,
    FuelType,
    Destination,
    Category,
    Quality,
    Tariff,
}

impl CanonicalField {
    /// All canonical fields, in resolution order.
    pub const ALL: [CanonicalField; 23] = [
        CanonicalField::PolicyNumber,
        CanonicalField::Endorsement,
        CanonicalField::StartDate,
        CanonicalField::EndDate,
        CanonicalField::VehicleBrand,
        CanonicalField::VehicleModel,
        CanonicalField::VehicleYear,
        CanonicalField::VehiclePlate,
        CanonicalField::MotorNumber,
        CanonicalField::ChassisNumber,
        CanonicalField::Premium,
        CanonicalField::TotalAmount,
        CanonicalField::InstallmentCount,
        CanonicalField::PaymentMethod,
        CanonicalField::Currency,
        CanonicalField::ClientName,
        CanonicalField::BrokerCode,
        CanonicalField::Department,
        CanonicalField::FuelType,
        CanonicalField::Destination,
        CanonicalField::Category,
        CanonicalField::Quality,
        CanonicalField::Tariff,
    ];

    /// Whether the field must be present for a policy request to be built.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            CanonicalField::PolicyNumber
                | CanonicalField::StartDate
                | CanonicalField::EndDate
                | CanonicalField::TotalAmount
                | CanonicalField::ClientName
        )
    }

    /// Stable identifier used in issue lists and rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::PolicyNumber => "policy_number",
            CanonicalField::Endorsement => "endorsement",
            CanonicalField::StartDate => "start_date",
            CanonicalField::EndDate => "end_date",
            CanonicalField::VehicleBrand => "vehicle_brand",
            CanonicalField::VehicleModel => "vehicle_model",
            CanonicalField::VehicleYear => "vehicle_year",
            CanonicalField::VehiclePlate => "vehicle_plate",
            CanonicalField::MotorNumber => "motor_number",
            CanonicalField::ChassisNumber => "chassis_number",
            CanonicalField::Premium => "premium",
            CanonicalField::TotalAmount => "total_amount",
            CanonicalField::InstallmentCount => "installment_count",
            CanonicalField::PaymentMethod => "payment_method",
            CanonicalField::Currency => "currency",
            CanonicalField::ClientName => "client_name",
            CanonicalField::BrokerCode => "broker_code",
            CanonicalField::Department => "department",
            CanonicalField::FuelType => "fuel_type",
            CanonicalField::Destination => "destination",
            CanonicalField::Category => "category",
            CanonicalField::Quality => "quality",
            CanonicalField::Tariff => "tariff",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intent of a mapping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingIntent {
    /// Create a new policy record.
    Create,
    /// Modify an existing policy.
    Modify,
    /// Renew an existing policy.
    Renew,
}

impl MappingIntent {
    /// Parse an intent from a user-facing string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "create" | "new" | "alta" => Some(MappingIntent::Create),
            "modify" | "modification" | "modificacion" => Some(MappingIntent::Modify),
            "renew" | "renewal" | "renovacion" => Some(MappingIntent::Renew),
            _ => None,
        }
    }
}

/// Resolved canonical field values with defaults applied.
///
/// One instance per mapping run; immutable after the orchestrator finishes
/// building it. Reconciliation fields hold the scanned text; structured
/// catalog identifiers travel separately as suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedPolicyData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,

    /// Endorsement number (default "0").
    pub endorsement: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_plate: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub motor_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,

    /// Number of installments (default 1).
    pub installment_count: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    /// Currency code (default "UYU").
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariff: Option<String>,
}

impl MappedPolicyData {
    /// Create an empty mapping with configured fallbacks applied.
    pub fn with_defaults(defaults: &DefaultValues) -> Self {
        Self {
            policy_number: None,
            endorsement: defaults.endorsement.clone(),
            start_date: None,
            end_date: None,
            vehicle_brand: None,
            vehicle_model: None,
            vehicle_year: None,
            vehicle_plate: None,
            motor_number: None,
            chassis_number: None,
            premium: None,
            total_amount: None,
            installment_count: defaults.installment_count,
            payment_method: None,
            currency: defaults.currency.clone(),
            client_name: None,
            broker_code: None,
            department: None,
            fuel_type: None,
            destination: None,
            category: None,
            quality: None,
            tariff: None,
        }
    }

    /// Whether a canonical field resolved to a value.
    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        match field {
            CanonicalField::PolicyNumber => self.policy_number.is_some(),
            CanonicalField::Endorsement => true,
            CanonicalField::StartDate => self.start_date.is_some(),
            CanonicalField::EndDate => self.end_date.is_some(),
            CanonicalField::VehicleBrand => self.vehicle_brand.is_some(),
            CanonicalField::VehicleModel => self.vehicle_model.is_some(),
            CanonicalField::VehicleYear => self.vehicle_year.is_some(),
            CanonicalField::VehiclePlate => self.vehicle_plate.is_some(),
            CanonicalField::MotorNumber => self.motor_number.is_some(),
            CanonicalField::ChassisNumber => self.chassis_number.is_some(),
            CanonicalField::Premium => self.premium.is_some(),
            CanonicalField::TotalAmount => self.total_amount.is_some(),
            CanonicalField::InstallmentCount => true,
            CanonicalField::PaymentMethod => self.payment_method.is_some(),
            CanonicalField::Currency => true,
            CanonicalField::ClientName => self.client_name.is_some(),
            CanonicalField::BrokerCode => self.broker_code.is_some(),
            CanonicalField::Department => self.department.is_some(),
            CanonicalField::FuelType => self.fuel_type.is_some(),
            CanonicalField::Destination => self.destination.is_some(),
            CanonicalField::Category => self.category.is_some(),
            CanonicalField::Quality => self.quality.is_some(),
            CanonicalField::Tariff => self.tariff.is_some(),
        }
    }
}

/// A single installment of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-based installment index.
    pub number: u32,

    /// Due date.
    pub due_date: NaiveDate,

    /// Amount due.
    pub amount: Decimal,
}

/// An ordered amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentSchedule {
    pub installments: Vec<Installment>,
}

impl InstallmentSchedule {
    /// Sum of all installment amounts.
    pub fn total(&self) -> Decimal {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// Number of installments.
    pub fn len(&self) -> usize {
        self.installments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installments.is_empty()
    }
}

/// Assembled audit-note text, section by section.
///
/// Purely derived output; persistence is the caller's concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationsDocument {
    /// Context-specific header line.
    pub header: String,

    /// "Changes detected" section (modification intent only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,

    /// Payment schedule or single-payment section.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,

    /// User-supplied notes, deduplicated against auto-generated boilerplate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_notes: Option<String>,
}

impl ObservationsDocument {
    /// Render the document as a single ordered text.
    pub fn render(&self) -> String {
        let mut sections = vec![self.header.clone()];
        if let Some(changes) = &self.changes {
            sections.push(changes.clone());
        }
        if let Some(schedule) = &self.schedule {
            sections.push(schedule.clone());
        }
        if let Some(notes) = &self.user_notes {
            sections.push(notes.clone());
        }
        sections.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let data = MappedPolicyData::with_defaults(&DefaultValues::default());
        assert_eq!(data.currency, "UYU");
        assert_eq!(data.endorsement, "0");
        assert_eq!(data.installment_count, 1);
    }

    #[test]
    fn test_intent_parsing() {
        assert_eq!(MappingIntent::from_str("create"), Some(MappingIntent::Create));
        assert_eq!(MappingIntent::from_str("Renovacion"), Some(MappingIntent::Renew));
        assert_eq!(MappingIntent::from_str("unknown"), None);
    }

    #[test]
    fn test_observations_render_order() {
        let doc = ObservationsDocument {
            header: "header".to_string(),
            changes: None,
            schedule: Some("schedule".to_string()),
            user_notes: Some("notes".to_string()),
        };
        assert_eq!(doc.render(), "header\n\nschedule\n\nnotes");
    }
}
