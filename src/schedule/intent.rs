//! Outbound change intents.
//!
//! The engine does not persist anything. Every committed mutation is
//! recorded as an [`AssignmentIntent`] that the persistence collaborator
//! applies in order. Provisional suggestions never produce intents until
//! they are accepted.

use serde::{Deserialize, Serialize};

use crate::models::ShiftAssignment;

/// A change to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "data")]
pub enum AssignmentIntent {
    /// A new committed assignment.
    Create(ShiftAssignment),
    /// An existing assignment with a new template or area.
    Update(ShiftAssignment),
    /// An assignment to remove.
    Delete { id: String },
}

impl AssignmentIntent {
    /// Identifier of the affected assignment.
    pub fn assignment_id(&self) -> &str {
        match self {
            Self::Create(a) | Self::Update(a) => &a.id,
            Self::Delete { id } => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_intent_serialization() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let a = ShiftAssignment::new("E1", "T1", date, "BU1").with_id("A1");

        let json = serde_json::to_value(AssignmentIntent::Create(a)).unwrap();
        assert_eq!(json["op"], "Create");
        assert_eq!(json["data"]["employee_id"], "E1");
        assert_eq!(json["data"]["date"], "2024-06-10");

        let delete = AssignmentIntent::Delete { id: "A1".into() };
        assert_eq!(delete.assignment_id(), "A1");
        let json = serde_json::to_value(&delete).unwrap();
        assert_eq!(json["data"]["id"], "A1");
    }
}
