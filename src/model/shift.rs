use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShiftType {
    DayShift,
    NightShift,
    Routine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "date": "2026-03-02",
        "shift_type": "day_shift",
        "nurse_group": "3-4",
        "assigned_users": [1, 4, 7],
        "created_at": "2026-03-01T12:00:00Z"
    })
)]
pub struct Shift {
    pub id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub shift_type: ShiftType,
    pub nurse_group: Option<String>,
    #[schema(value_type = Vec<u64>)]
    pub assigned_users: BTreeSet<u64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct NewShift {
    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "day_shift")]
    pub shift_type: ShiftType,
    #[schema(example = "3-4")]
    pub nurse_group: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<u64>, example = json!([1, 4]))]
    pub assigned_users: BTreeSet<u64>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ShiftChanges {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub shift_type: Option<ShiftType>,
    pub nurse_group: Option<String>,
    #[schema(value_type = Option<Vec<u64>>)]
    pub assigned_users: Option<BTreeSet<u64>>,
}

impl Shift {
    pub fn apply(&mut self, changes: ShiftChanges) {
        if let Some(date) = changes.date {
            self.date = date;
        }
        if let Some(shift_type) = changes.shift_type {
            self.shift_type = shift_type;
        }
        if let Some(group) = changes.nurse_group {
            self.nurse_group = Some(group);
        }
        if let Some(users) = changes.assigned_users {
            self.assigned_users = users;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift() -> Shift {
        Shift {
            id: 1,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            shift_type: ShiftType::DayShift,
            nurse_group: Some("3-4".into()),
            assigned_users: BTreeSet::from([3, 1]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn apply_keeps_absent_fields() {
        let mut s = shift();
        s.apply(ShiftChanges {
            shift_type: Some(ShiftType::NightShift),
            ..Default::default()
        });

        assert_eq!(s.shift_type, ShiftType::NightShift);
        assert_eq!(s.nurse_group.as_deref(), Some("3-4"));
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn assignees_deduplicate_and_serialize_in_order() {
        let payload: NewShift = serde_json::from_str(
            r#"{"date":"2026-03-02","shift_type":"night_shift","nurse_group":null,"assigned_users":[7,2,7]}"#,
        )
        .unwrap();

        assert_eq!(
            serde_json::to_string(&payload.assigned_users).unwrap(),
            "[2,7]"
        );
    }
}
