//! Escalation chain logic - pure transformations over the denormalized
//! `escalation_chain` JSON column, without the HTTP layer.
//!
//! A chain is an ordered ladder of roles notified in sequence, each step
//! waiting `delay_minutes` for an acknowledgement before moving on. Roles
//! sharing an identical ladder are grouped into one display unit.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStep {
    pub target_role_id: i32,
    pub delay_minutes: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChainError {
    /// A role cannot appear twice in the same ladder.
    DuplicateTarget(i32),
    /// A role cannot escalate to itself.
    SelfTarget,
    /// Target does not exist in this hospital.
    UnknownTarget(i32),
    NegativeDelay,
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::DuplicateTarget(id) => {
                write!(f, "Role {} appears more than once in the chain", id)
            }
            ChainError::SelfTarget => write!(f, "A role cannot escalate to itself"),
            ChainError::UnknownTarget(id) => write!(f, "Unknown target role {}", id),
            ChainError::NegativeDelay => write!(f, "Delay must not be negative"),
        }
    }
}

/// Parse a stored chain column. Stored chains are validated on write, so a
/// malformed value is treated as an empty ladder rather than an error.
pub fn parse_chain(raw: &str) -> Vec<ChainStep> {
    serde_json::from_str(raw).unwrap_or_default()
}

pub fn serialize_chain(steps: &[ChainStep]) -> String {
    serde_json::to_string(steps).unwrap_or_else(|_| "[]".to_string())
}

/// Canonical signature of a ladder: ordered `target@delay` pairs. Two roles
/// with the same signature belong to the same display group.
pub fn chain_signature(steps: &[ChainStep]) -> String {
    steps
        .iter()
        .map(|s| format!("{}@{}", s.target_role_id, s.delay_minutes))
        .collect::<Vec<_>>()
        .join("|")
}

/// Validate a ladder submitted for `role_id` against the hospital's role set.
/// Duplicate targets block saving, as do self-targets, unknown targets and
/// negative delays.
pub fn validate_chain(
    role_id: i32,
    steps: &[ChainStep],
    known_roles: &HashSet<i32>,
) -> Result<(), ChainError> {
    let mut seen = HashSet::new();
    for step in steps {
        if step.delay_minutes < 0 {
            return Err(ChainError::NegativeDelay);
        }
        if step.target_role_id == role_id {
            return Err(ChainError::SelfTarget);
        }
        if !known_roles.contains(&step.target_role_id) {
            return Err(ChainError::UnknownTarget(step.target_role_id));
        }
        if !seen.insert(step.target_role_id) {
            return Err(ChainError::DuplicateTarget(step.target_role_id));
        }
    }
    Ok(())
}

/// Drop `removed_role_id` from a ladder, preserving the order of the
/// remaining steps. Used when a role is deleted so no chain dangles.
pub fn strip_target(steps: Vec<ChainStep>, removed_role_id: i32) -> Vec<ChainStep> {
    steps
        .into_iter()
        .filter(|s| s.target_role_id != removed_role_id)
        .collect()
}

#[derive(Debug, Serialize)]
pub struct RoleRef {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ChainStepView {
    pub target_role_id: i32,
    pub target_role_name: String,
    pub delay_minutes: i64,
}

/// One display unit: the roles sharing a ladder plus the resolved steps.
#[derive(Debug, Serialize)]
pub struct ChainGroup {
    pub signature: String,
    pub roles: Vec<RoleRef>,
    pub steps: Vec<ChainStepView>,
    pub is_empty: bool,
}

/// Group a hospital's roles by identical chain signature, in order of first
/// appearance. Re-derived on every request from the JSON columns alone.
pub fn group_chains(roles: &[role::Model]) -> Vec<ChainGroup> {
    let names: HashMap<i32, String> = roles.iter().map(|r| (r.id, r.name.clone())).collect();

    let mut groups: Vec<ChainGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for r in roles {
        let steps = parse_chain(&r.escalation_chain);
        let signature = chain_signature(&steps);

        let member = RoleRef {
            id: r.id,
            name: r.name.clone(),
        };

        if let Some(&i) = index.get(&signature) {
            groups[i].roles.push(member);
            continue;
        }

        let views = steps
            .iter()
            .map(|s| ChainStepView {
                target_role_id: s.target_role_id,
                target_role_name: names
                    .get(&s.target_role_id)
                    .cloned()
                    .unwrap_or_else(|| format!("role {}", s.target_role_id)),
                delay_minutes: s.delay_minutes,
            })
            .collect();

        index.insert(signature.clone(), groups.len());
        groups.push(ChainGroup {
            is_empty: steps.is_empty(),
            signature,
            roles: vec![member],
            steps: views,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(target: i32, delay: i64) -> ChainStep {
        ChainStep {
            target_role_id: target,
            delay_minutes: delay,
        }
    }

    fn role_model(id: i32, name: &str, chain: &[ChainStep]) -> role::Model {
        role::Model {
            id,
            hospital_id: 1,
            name: name.to_string(),
            escalation_chain: serialize_chain(chain),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn signature_is_order_sensitive() {
        let a = chain_signature(&[step(2, 0), step(3, 15)]);
        let b = chain_signature(&[step(3, 15), step(2, 0)]);
        assert_eq!(a, "2@0|3@15");
        assert_ne!(a, b);
        assert_eq!(chain_signature(&[]), "");
    }

    #[test]
    fn parse_tolerates_malformed_column() {
        assert!(parse_chain("not json").is_empty());
        assert!(parse_chain("").is_empty());
        let steps = parse_chain(r#"[{"target_role_id":7,"delay_minutes":30}]"#);
        assert_eq!(steps, vec![step(7, 30)]);
    }

    #[test]
    fn duplicate_target_blocks_saving() {
        let known: HashSet<i32> = [2, 3].into_iter().collect();
        let err = validate_chain(1, &[step(2, 0), step(3, 10), step(2, 20)], &known);
        assert_eq!(err, Err(ChainError::DuplicateTarget(2)));
    }

    #[test]
    fn self_target_rejected() {
        let known: HashSet<i32> = [1, 2].into_iter().collect();
        assert_eq!(
            validate_chain(1, &[step(1, 0)], &known),
            Err(ChainError::SelfTarget)
        );
    }

    #[test]
    fn unknown_target_rejected() {
        let known: HashSet<i32> = [2].into_iter().collect();
        assert_eq!(
            validate_chain(1, &[step(9, 0)], &known),
            Err(ChainError::UnknownTarget(9))
        );
    }

    #[test]
    fn negative_delay_rejected() {
        let known: HashSet<i32> = [2].into_iter().collect();
        assert_eq!(
            validate_chain(1, &[step(2, -5)], &known),
            Err(ChainError::NegativeDelay)
        );
    }

    #[test]
    fn valid_chain_accepted() {
        let known: HashSet<i32> = [2, 3, 4].into_iter().collect();
        assert!(validate_chain(1, &[step(2, 0), step(3, 15), step(4, 30)], &known).is_ok());
        assert!(validate_chain(1, &[], &known).is_ok());
    }

    #[test]
    fn grouping_merges_identical_ladders_only() {
        let ladder = [step(10, 0), step(11, 15)];
        let other = [step(11, 15), step(10, 0)];
        let roles = vec![
            role_model(1, "Physician on-call", &ladder),
            role_model(2, "Charge nurse", &ladder),
            role_model(3, "Supervisor", &other),
            role_model(4, "CEO", &[]),
        ];

        let groups = group_chains(&roles);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].roles.len(), 2);
        assert_eq!(groups[0].roles[0].id, 1);
        assert_eq!(groups[0].roles[1].id, 2);

        assert_eq!(groups[1].roles.len(), 1);
        assert_eq!(groups[1].roles[0].id, 3);

        assert!(groups[2].is_empty);
        assert_eq!(groups[2].roles[0].name, "CEO");
    }

    #[test]
    fn grouping_resolves_target_names() {
        let roles = vec![
            role_model(1, "Physician on-call", &[step(2, 20)]),
            role_model(2, "Supervisor", &[]),
        ];

        let groups = group_chains(&roles);
        assert_eq!(groups[0].steps[0].target_role_name, "Supervisor");
        assert_eq!(groups[0].steps[0].delay_minutes, 20);
    }

    #[test]
    fn strip_target_preserves_order() {
        let steps = vec![step(2, 0), step(3, 10), step(4, 20)];
        let stripped = strip_target(steps, 3);
        assert_eq!(stripped, vec![step(2, 0), step(4, 20)]);
    }
}
