use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    /// Plantonista: staff working the 12-hour on-call shifts
    #[strum(to_string = "on_call", serialize = "plantonista")]
    OnCall,
    /// Rotina: routine daytime staff
    #[strum(to_string = "routine", serialize = "rotina")]
    Routine,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        *self == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_english_and_legacy_names() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("on_call").unwrap(), Role::OnCall);
        assert_eq!(Role::from_str("plantonista").unwrap(), Role::OnCall);
        assert_eq!(Role::from_str("rotina").unwrap(), Role::Routine);
        assert!(Role::from_str("nurse").is_err());
    }

    #[test]
    fn stores_as_snake_case() {
        assert_eq!(Role::OnCall.as_ref(), "on_call");
        assert_eq!(Role::Routine.to_string(), "routine");
    }
}
