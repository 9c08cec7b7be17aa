use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
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

str_enum!(ImportStatus {
    Uploaded => "UPLOADED",
    Extracted => "EXTRACTED",
    AiSuggested => "AI_SUGGESTED",
    FinalApproved => "FINAL_APPROVED",
});

str_enum!(WorkflowStatus {
    Draft => "DRAFT",
    Submitted => "SUBMITTED",
    Approved => "APPROVED",
    Rejected => "REJECTED",
    Published => "PUBLISHED",
});

str_enum!(DifficultyTier {
    Basic => "basic",
    Intermediate => "intermediate",
    Advanced => "advanced",
    Expert => "expert",
});

impl DifficultyTier {
    /// Fixed XP award per tier.
    pub fn xp(&self) -> u32 {
        match self {
            Self::Basic => 10,
            Self::Intermediate => 20,
            Self::Advanced => 30,
            Self::Expert => 50,
        }
    }
}

str_enum!(ReviewDecision {
    Approved => "approved",
    Rejected => "rejected",
});

str_enum!(ApplySource {
    Final => "final",
    Ai => "ai",
});
