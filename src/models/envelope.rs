use serde::{Deserialize, Serialize};

use super::enums::{AnswerType, EnvelopeType, ErrorCode, StopReason, Urgency};
use super::session::Profile;
use crate::facility::FacilityHint;

/// One triage turn as received from the transport layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub locale: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerIn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Structured answer to a previously asked question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerIn {
    pub canonical: String,
    pub value: String,
}

/// The single discriminated return value of a turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub envelope_type: EnvelopeType,
    pub session_id: String,
    pub turn_index: u32,
    pub payload: EnvelopePayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

/// Envelope payload; the variant always matches `envelope_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvelopePayload {
    Question(QuestionPayload),
    Emergency(EmergencyPayload),
    Result(ResultPayload),
    Error(ErrorPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionPayload {
    pub question_id: String,
    pub canonical: String,
    pub question_tr: String,
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices_tr: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_asking_tr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyRef {
    pub id: String,
    pub name_tr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionOut {
    pub disease_label: String,
    pub score_0_1: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPayload {
    pub urgency: Urgency,
    pub recommended_specialty: SpecialtyRef,
    pub top_conditions: Vec<ConditionOut>,
    pub doctor_ready_summary_tr: Vec<String>,
    pub safety_notes_tr: Vec<String>,
    pub confidence_0_1: f64,
    pub confidence_label_tr: String,
    pub confidence_explain_tr: String,
    pub why_specialty_tr: Vec<String>,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyPayload {
    pub urgency: Urgency,
    pub reason_tr: String,
    pub instructions_tr: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message_tr: String,
    pub retryable: bool,
}

/// Same-day banner riding along a non-emergency envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SameDayNotice {
    pub rule_id: String,
    pub message_tr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub disclaimer_tr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_day: Option<SameDayNotice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facility: Option<FacilityHint>,
}

impl Envelope {
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.payload).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_envelope_serializes_discriminator() {
        let env = Envelope {
            envelope_type: EnvelopeType::Question,
            session_id: "abc".into(),
            turn_index: 1,
            payload: EnvelopePayload::Question(QuestionPayload {
                question_id: "q_ateş".into(),
                canonical: "ateş".into(),
                question_tr: "Ateşiniz var mı?".into(),
                answer_type: AnswerType::YesNo,
                choices_tr: Some(vec!["Evet".into(), "Hayır".into()]),
                why_asking_tr: None,
            }),
            meta: None,
        };
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["envelope_type"], "QUESTION");
        assert_eq!(json["payload"]["canonical"], "ateş");
        assert_eq!(json["payload"]["answer_type"], "yes_no");
        assert!(json["payload"].get("why_asking_tr").is_none());
    }

    #[test]
    fn error_envelope_round_trips() {
        let env = Envelope {
            envelope_type: EnvelopeType::Error,
            session_id: "unknown".into(),
            turn_index: 0,
            payload: EnvelopePayload::Error(ErrorPayload {
                code: ErrorCode::EmptyInput,
                message_tr: "Semptomunu biraz daha tarif eder misin?".into(),
                retryable: true,
            }),
            meta: None,
        };
        let json = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        match back.payload {
            EnvelopePayload::Error(e) => {
                assert_eq!(e.code, ErrorCode::EmptyInput);
                assert!(e.retryable);
            }
            other => panic!("expected error payload, got {other:?}"),
        }
    }

    #[test]
    fn turn_request_accepts_minimal_json() {
        let req: TurnRequest = serde_json::from_str(
            r#"{"locale": "tr-TR", "user_message": "başım ağrıyor"}"#,
        )
        .unwrap();
        assert!(req.session_id.is_none());
        assert!(req.answer.is_none());
        assert_eq!(req.user_message, "başım ağrıyor");
    }
}
