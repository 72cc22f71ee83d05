use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Who is logged in. Same two values as `Role`, but kept apart: one gates
// access, the other picks a summary partition.
str_enum!(UserType {
    Doctor => "doctor",
    Patient => "patient",
});

str_enum!(Role {
    Doctor => "doctor",
    Patient => "patient",
});

impl Role {
    pub const ALL: [Role; 2] = [Role::Doctor, Role::Patient];

    /// Vector store collection holding this role's summaries.
    pub fn collection_name(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor_summaries",
            Role::Patient => "patient_summaries",
        }
    }
}

impl From<UserType> for Role {
    fn from(user_type: UserType) -> Self {
        match user_type {
            UserType::Doctor => Role::Doctor,
            UserType::Patient => Role::Patient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trip() {
        for (variant, s) in [(Role::Doctor, "doctor"), (Role::Patient, "patient")] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Role::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn collections_are_distinct_per_role() {
        assert_eq!(Role::Doctor.collection_name(), "doctor_summaries");
        assert_eq!(Role::Patient.collection_name(), "patient_summaries");
    }

    #[test]
    fn user_type_maps_to_matching_role() {
        assert_eq!(Role::from(UserType::Doctor), Role::Doctor);
        assert_eq!(Role::from(UserType::Patient), Role::Patient);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(Role::from_str("nurse").is_err());
        assert!(UserType::from_str("").is_err());
    }

    #[test]
    fn serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&UserType::Doctor).unwrap(), "\"doctor\"");
        let parsed: Role = serde_json::from_str("\"patient\"").unwrap();
        assert_eq!(parsed, Role::Patient);
    }
}
