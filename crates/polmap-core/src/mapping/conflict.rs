//! Policy-conflict classification.
//!
//! The external policy-management system lookup (by policy number + company)
//! happens outside this engine; this check only classifies its outcome
//! against the requested intent.

use crate::models::catalog::ExistingPolicy;
use crate::models::policy::MappingIntent;
use crate::models::result::{ConflictValidation, SuggestedAction};

/// Classify a mapping intent against the result of a policy lookup.
pub fn check_policy_conflict(
    intent: MappingIntent,
    policy_number: &str,
    existing: Option<&ExistingPolicy>,
) -> ConflictValidation {
    match (intent, existing) {
        (MappingIntent::Create, Some(policy)) => ConflictValidation {
            is_valid: false,
            error_message: Some(format!(
                "La póliza {} ya existe en el sistema (estado: {}).",
                policy_number, policy.status
            )),
            existing_policy_id: Some(policy.id),
            existing_status: Some(policy.status.clone()),
            suggested_actions: vec![
                SuggestedAction::ModifyExisting,
                SuggestedAction::RenewExisting,
                SuggestedAction::ReviewPolicyNumber,
            ],
        },
        (MappingIntent::Modify | MappingIntent::Renew, None) => ConflictValidation {
            is_valid: false,
            error_message: Some(format!(
                "La póliza {} no existe en el sistema.",
                policy_number
            )),
            existing_policy_id: None,
            existing_status: None,
            suggested_actions: vec![
                SuggestedAction::CreateNew,
                SuggestedAction::ReviewPolicyNumber,
            ],
        },
        (_, existing) => ConflictValidation {
            is_valid: true,
            error_message: None,
            existing_policy_id: existing.map(|p| p.id),
            existing_status: existing.map(|p| p.status.clone()),
            suggested_actions: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> ExistingPolicy {
        ExistingPolicy {
            id: 42,
            status: "VIGENTE".to_string(),
            start_date: None,
            end_date: None,
            client_name: None,
            total_amount: None,
        }
    }

    #[test]
    fn test_create_over_existing_policy_fails() {
        let validation =
            check_policy_conflict(MappingIntent::Create, "1234567", Some(&existing()));

        assert!(!validation.is_valid);
        assert_eq!(validation.existing_policy_id, Some(42));
        assert!(validation
            .suggested_actions
            .contains(&SuggestedAction::ModifyExisting));
        assert!(validation
            .suggested_actions
            .contains(&SuggestedAction::RenewExisting));
    }

    #[test]
    fn test_modify_absent_policy_fails_with_other_actions() {
        let validation = check_policy_conflict(MappingIntent::Modify, "1234567", None);

        assert!(!validation.is_valid);
        assert!(validation.existing_policy_id.is_none());
        assert_eq!(
            validation.suggested_actions,
            vec![SuggestedAction::CreateNew, SuggestedAction::ReviewPolicyNumber]
        );
    }

    #[test]
    fn test_renew_existing_policy_passes_through_summary() {
        let validation =
            check_policy_conflict(MappingIntent::Renew, "1234567", Some(&existing()));

        assert!(validation.is_valid);
        assert_eq!(validation.existing_policy_id, Some(42));
        assert_eq!(validation.existing_status.as_deref(), Some("VIGENTE"));
    }

    #[test]
    fn test_create_fresh_policy_is_valid() {
        let validation = check_policy_conflict(MappingIntent::Create, "1234567", None);
        assert!(validation.is_valid);
        assert!(validation.suggested_actions.is_empty());
    }
}
