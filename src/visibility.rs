//! Assignment scoping and visibility rules.
//!
//! An assignment is either general (visible to everyone its role rules
//! allow) or scoped by a team selector, an individual target list, or both.
//! A scoped assignment is visible when EITHER selector matches. Targeting
//! input arrives in a few historical shapes, all normalized here before
//! they reach the database.

use serde_json::Value;

use crate::auth::Role;

/// Who an assignment is addressed to, derived from the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentScope {
    /// No selectors; visible to everyone the role rules allow.
    General,
    /// At least one selector set; visible when either matches.
    Scoped {
        team_id: Option<i32>,
        target_ids: Vec<i32>,
    },
}

impl AssignmentScope {
    /// Builds a scope from the raw payload fields.
    ///
    /// No team and no targets collapses to [`AssignmentScope::General`].
    pub fn from_payload(team_id: Option<i32>, employee_ids: Option<&Value>) -> Self {
        let target_ids = normalize_employee_ids(employee_ids);
        if team_id.is_none() && target_ids.is_empty() {
            Self::General
        } else {
            Self::Scoped {
                team_id,
                target_ids,
            }
        }
    }

    pub fn is_general(&self) -> bool {
        matches!(self, Self::General)
    }

    pub fn team_id(&self) -> Option<i32> {
        match self {
            Self::General => None,
            Self::Scoped { team_id, .. } => *team_id,
        }
    }

    /// The individually targeted user ids, empty for general assignments.
    pub fn target_ids(&self) -> &[i32] {
        match self {
            Self::General => &[],
            Self::Scoped { target_ids, .. } => target_ids,
        }
    }
}

/// Normalizes an `employee_ids` payload field into a list of user ids.
///
/// Accepted shapes:
/// - a JSON array of integers or numeric strings (`[1, "2", 3]`)
/// - a comma-separated string (`"3,4"`)
/// - absent or null
///
/// Entries that do not parse as non-negative integers are dropped rather
/// than rejected, and duplicates are removed preserving first occurrence.
pub fn normalize_employee_ids(raw: Option<&Value>) -> Vec<i32> {
    let mut ids = match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
                Value::String(s) => parse_id(s),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s.split(',').filter_map(parse_id).collect(),
        Some(_) => Vec::new(),
    };

    dedupe_preserving_order(&mut ids);
    ids
}

fn parse_id(s: &str) -> Option<i32> {
    let trimmed = s.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse().ok()
}

fn dedupe_preserving_order(ids: &mut Vec<i32>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(*id));
}

/// Facts about a viewer's relationship to one assignment, precomputed by
/// the repository layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerRelation {
    /// The assignment's creator belongs to the viewer's organization.
    pub same_org: bool,
    pub is_general: bool,
    /// The viewer is individually targeted.
    pub is_target: bool,
    /// The viewer manages the assignment's team.
    pub manages_team: bool,
    /// The viewer is a member of the assignment's team.
    pub in_team: bool,
}

/// Whether a viewer may see an assignment. The same rule gates reads,
/// submission listings and file submission.
pub fn can_view_assignment(role: Role, relation: ViewerRelation) -> bool {
    if !relation.same_org {
        return false;
    }
    match role {
        Role::OrgAdmin | Role::SuperAdmin => true,
        Role::TeamManager => relation.is_general || relation.manages_team,
        Role::Employee => relation.is_general || relation.is_target || relation.in_team,
    }
}
