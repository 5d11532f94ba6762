use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Macro to generate enum with wire names, as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = StoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(StoreError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(EnvelopeType {
    Question => "QUESTION",
    Result => "RESULT",
    Emergency => "EMERGENCY",
    SameDay => "SAME_DAY",
    Error => "ERROR",
});

str_enum!(AnswerType {
    YesNo => "yes_no",
    FreeText => "free_text",
    Number => "number",
    MultiChoice => "multi_choice",
});

str_enum!(Urgency {
    Emergency => "EMERGENCY",
    ErNow => "ER_NOW",
    SameDay => "SAME_DAY",
    WithinThreeDays => "WITHIN_3_DAYS",
    Routine => "ROUTINE",
});

str_enum!(StopReason {
    EmergencyDetected => "emergency_detected",
    MaxQuestions => "max_questions",
    MinExpectedGain => "min_expected_gain",
    NoQuestionAvailable => "no_question_available",
});

str_enum!(ErrorCode {
    EmptyInput => "EMPTY_INPUT",
    BadSession => "BAD_SESSION",
    BadState => "BAD_STATE",
    CatalogError => "CATALOG_ERROR",
    Internal => "INTERNAL",
});

/// Time-of-day classification produced by the free-text parser.
/// Wire values are the catalog's Turkish tokens.
str_enum!(Timing {
    Morning => "sabah",
    Evening => "akşam",
    Night => "gece",
    Day => "gündüz",
});

str_enum!(RiskLevel {
    Low => "LOW",
    Medium => "MEDIUM",
    High => "HIGH",
});
