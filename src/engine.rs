use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::facility::FacilityDirectory;
use crate::models::{
    AnswerType, ConditionOut, Envelope, EnvelopePayload, EnvelopeType, ErrorCode, ErrorPayload,
    EmergencyPayload, Meta, ResultPayload, Session, SpecialtyRef, StopReason, TurnRequest, Urgency,
};
use crate::pii;
use crate::pipeline::candidates::{self, Candidate};
use crate::pipeline::decision;
use crate::pipeline::explain;
use crate::pipeline::free_text;
use crate::pipeline::interpret::interpret;
use crate::pipeline::normalize::normalize;
use crate::pipeline::safety::{self, EmergencyMatch, SameDayMatch};
use crate::pipeline::selector::{self, SelectedQuestion};
use crate::pipeline::specialty;
use crate::pipeline::stop;
use crate::store::SessionStore;

/// The turn handler: one call = one envelope.
///
/// Per-session turns are serialized through an in-flight set; catalogs are
/// shared immutable state. A deadline, when given, is honored by abandoning
/// the turn before anything is persisted.
pub struct TriageEngine<S: SessionStore> {
    catalog: Arc<Catalog>,
    store: S,
    in_flight: Mutex<HashSet<Uuid>>,
}

/// Buffered event, written only when the turn commits.
struct PendingEvent {
    event_type: String,
    payload: serde_json::Value,
}

struct TurnGuard<'a> {
    in_flight: &'a Mutex<HashSet<Uuid>>,
    session_id: Uuid,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.session_id);
        }
    }
}

impl<S: SessionStore> TriageEngine<S> {
    pub fn new(catalog: Arc<Catalog>, store: S) -> Self {
        Self {
            catalog,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle_turn(&self, req: &TurnRequest) -> Envelope {
        self.handle_turn_with_deadline(req, None)
    }

    /// Run one turn. Every failure surfaces as an `ERROR` envelope; nothing
    /// escapes as a Rust error.
    pub fn handle_turn_with_deadline(
        &self,
        req: &TurnRequest,
        deadline: Option<Instant>,
    ) -> Envelope {
        let locale = if req.locale.trim().is_empty() {
            crate::config::DEFAULT_LOCALE.to_string()
        } else {
            req.locale.trim().to_string()
        };
        let requested_id = req.session_id.clone().unwrap_or_else(|| "unknown".into());

        if deadline_passed(deadline) {
            return self.error(ErrorCode::Internal, &requested_id, 0, &locale, "TURN_FAILED", true);
        }

        let has_message = !req.user_message.trim().is_empty();
        let has_answer = req.answer.is_some();
        if !has_message && !has_answer {
            return self.error(
                ErrorCode::EmptyInput,
                &requested_id,
                0,
                &locale,
                "EMPTY_INPUT",
                true,
            );
        }

        if self.catalog.questions.bank_for(&locale).is_empty() {
            return self.error(
                ErrorCode::CatalogError,
                &requested_id,
                0,
                &locale,
                "CATALOG_ERROR",
                false,
            );
        }

        // ── Load or create ──
        let (mut session, is_new) = match &req.session_id {
            Some(raw) => {
                let Ok(id) = Uuid::parse_str(raw) else {
                    return self.error(
                        ErrorCode::BadSession,
                        raw,
                        0,
                        &locale,
                        "BAD_SESSION",
                        false,
                    );
                };
                match self.store.load(id) {
                    Ok(Some(session)) => (session, false),
                    Ok(None) => {
                        return self.error(
                            ErrorCode::BadSession,
                            raw,
                            0,
                            &locale,
                            "BAD_SESSION",
                            false,
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "session load failed");
                        return self.error(
                            ErrorCode::Internal,
                            raw,
                            0,
                            &locale,
                            "TURN_FAILED",
                            true,
                        );
                    }
                }
            }
            None => {
                let id = self.store.create_id();
                (Session::new(id, &locale, Utc::now()), true)
            }
        };

        if session.is_terminal() {
            return self.error(
                ErrorCode::BadState,
                &session.session_id.to_string(),
                session.turn_index,
                &locale,
                "SESSION_COMPLETE",
                false,
            );
        }

        // ── Per-session serialization ──
        let _guard = match self.try_acquire(session.session_id) {
            Some(guard) => guard,
            None => {
                return self.error(
                    ErrorCode::BadState,
                    &session.session_id.to_string(),
                    session.turn_index,
                    &locale,
                    "CONCURRENT_TURN",
                    false,
                );
            }
        };

        let next_turn = session.turn_index + 1;
        let mut events: Vec<PendingEvent> = Vec::new();
        if is_new {
            events.push(PendingEvent {
                event_type: "SESSION_CREATED".into(),
                payload: json!({ "locale": locale }),
            });
        }

        if let Some(profile) = &req.profile {
            session.profile.merge(profile);
        }

        // ── Ingest answer ──
        let mut escalation = None;
        if let Some(answer) = &req.answer {
            escalation = self.ingest_answer(&mut session, &answer.canonical, &answer.value);
            events.push(PendingEvent {
                event_type: "ANSWER_RECEIVED".into(),
                payload: json!({
                    "canonical": normalize(&answer.canonical),
                    "value": pii::redact(answer.value.trim()),
                }),
            });
        }

        // ── Ingest free text ──
        if has_message {
            let redacted = pii::redact(req.user_message.trim());
            session.raw_texts.push(redacted.clone());
            events.push(PendingEvent {
                event_type: "USER_MESSAGE".into(),
                payload: json!({ "text": redacted }),
            });

            let msg_norm = normalize(&redacted);
            let msg_interp = interpret(&msg_norm, &self.catalog.synonyms);
            specialty::score_text(
                &msg_norm,
                &msg_interp,
                &self.catalog.specialties,
                &mut session.rules_scores,
            );
        }

        let all_norm = normalize(&session.joined_text());
        let all_interp = interpret(&all_norm, &self.catalog.synonyms);
        for canonical in &all_interp.canonicals {
            if !session.denied_symptoms.contains(canonical) {
                session.known_symptoms.insert(canonical.clone());
            }
        }

        // ── Candidate / scoring pipelines ──
        let candidates = candidates::generate(
            &session.known_symptoms,
            &self.catalog.matrix,
            &self.catalog.rules.generator,
        );
        let final_scores = decision::merge(
            &session.rules_scores,
            &candidates,
            &self.catalog.matrix,
            &self.catalog.specialties,
        );
        // A non-positive winner means nothing actually scored; route to the
        // catalog's fallback specialty instead of the alphabetical first.
        let top = decision::top(&final_scores)
            .filter(|(_, score)| score.final_score > 0.0)
            .map(|(id, score)| (id.clone(), score.clone()));
        let (top_specialty_id, top_specialty_name) = match &top {
            Some((id, score)) => (id.clone(), score.name_tr.clone()),
            None => {
                let id = self.catalog.matrix.fallback_specialty_id().to_string();
                let name = self
                    .catalog
                    .specialties
                    .name_of(&id)
                    .unwrap_or(id.as_str())
                    .to_string();
                (id, name)
            }
        };
        let top_disease = candidates.first().map(|c| c.disease_label.clone());

        let selector_trace: Vec<_> = selector::rank_discriminative(&session, &candidates, &self.catalog)
            .into_iter()
            .take(5)
            .collect();
        session.debug = json!({
            "candidates": candidates,
            "final_scores": final_scores,
            "top_specialty": top_specialty_id,
            "rules_tied": specialty::top_is_tied(&session.rules_scores),
            "selector": selector_trace,
        });
        debug_assert!(session.known_symptoms.is_disjoint(&session.denied_symptoms));

        // ── Safety: emergency short-circuits everything ──
        let emergency = safety::check_emergency(
            &all_norm,
            &session.known_symptoms,
            &session.parsed_answers,
            &self.catalog.rules.emergency,
        )
        .or(escalation);
        if let Some(em) = emergency {
            return self.emit_emergency(session, em, &locale, next_turn, events, deadline);
        }

        let same_day = safety::check_same_day(
            &all_norm,
            &session.known_symptoms,
            &session.parsed_answers,
            &self.catalog.rules.sameday,
        );

        // ── Stop policy ──
        let budget = stop::question_budget(
            &self.catalog.rules.stop,
            Some(top_specialty_id.as_str()),
            top_disease.as_deref(),
        );
        if session.turn_index >= budget {
            return self.emit_result(
                session,
                StopReason::MaxQuestions,
                &candidates,
                &top_specialty_id,
                &top_specialty_name,
                same_day,
                req,
                &locale,
                next_turn,
                events,
                deadline,
            );
        }

        // ── Next question ──
        match selector::select_next(&session, &candidates, &self.catalog) {
            None => self.emit_result(
                session,
                StopReason::NoQuestionAvailable,
                &candidates,
                &top_specialty_id,
                &top_specialty_name,
                same_day,
                req,
                &locale,
                next_turn,
                events,
                deadline,
            ),
            Some(SelectedQuestion::Bank { disc, .. })
                if disc < self.catalog.rules.stop.min_expected_gain =>
            {
                self.emit_result(
                    session,
                    StopReason::MinExpectedGain,
                    &candidates,
                    &top_specialty_id,
                    &top_specialty_name,
                    same_day,
                    req,
                    &locale,
                    next_turn,
                    events,
                    deadline,
                )
            }
            Some(question) => {
                self.emit_question(session, question, same_day, &locale, next_turn, events, deadline)
            }
        }
    }

    fn try_acquire(&self, session_id: Uuid) -> Option<TurnGuard<'_>> {
        let mut set = self.in_flight.lock().ok()?;
        if !set.insert(session_id) {
            return None;
        }
        Some(TurnGuard {
            in_flight: &self.in_flight,
            session_id,
        })
    }

    /// Apply a structured answer to the session. Returns a synthetic
    /// emergency match when an escalating red-flag question was confirmed.
    fn ingest_answer(
        &self,
        session: &mut Session,
        raw_canonical: &str,
        raw_value: &str,
    ) -> Option<EmergencyMatch> {
        let canonical = normalize(raw_canonical);
        let value = raw_value.trim();
        if canonical.is_empty() || value.is_empty() {
            return None;
        }
        let retract = self.catalog.rules.stop.policy.retract_known_on_deny;

        // Context answers are keyed by the pending context question id.
        if session.last_context_id.as_deref() == Some(canonical.as_str()) {
            self.ingest_context_answer(session, &canonical, value);
            return None;
        }

        let answer_type = self
            .catalog
            .questions
            .bank_for(&session.locale)
            .get(&canonical)
            .map(|entry| entry.answer_type)
            .unwrap_or(AnswerType::YesNo);

        let mut escalation = None;
        if answer_type == AnswerType::YesNo {
            if explain::is_yes(value) {
                session.confirm_symptom(&canonical, retract);
                // A confirmed symptom contributes to Layer B like text.
                let norm = normalize(&canonical);
                let interp = interpret(&norm, &self.catalog.synonyms);
                specialty::score_text(
                    &norm,
                    &interp,
                    &self.catalog.specialties,
                    &mut session.rules_scores,
                );
                escalation = self.red_flag_escalation(session, &canonical);
            } else if explain::is_no(value) {
                session.deny_symptom(&canonical, retract);
            }
        }

        session.answers.insert(canonical.clone(), pii::redact(value));
        let parsed = free_text::parse_free_text(&canonical, value, &self.catalog.parser);
        if !parsed.is_empty() {
            session.parsed_answers.insert(canonical.clone(), parsed);
        }
        session.mark_asked(&canonical);
        session.last_context_id = None;
        escalation
    }

    fn ingest_context_answer(&self, session: &mut Session, context_id: &str, value: &str) {
        if let Some(question) = self.catalog.questions.context_by_id(context_id) {
            match question.profile_field.as_str() {
                "age" => {
                    if let Some(age) = parse_age(value) {
                        session.profile.age = Some(age);
                    }
                }
                "sex" => {
                    if let Some(sex) = parse_sex(value) {
                        session.profile.sex = Some(sex);
                    }
                }
                "pregnant" => {
                    session.profile.pregnant = Some(explain::is_yes(value));
                }
                "chronic" => {
                    session.profile.chronic = Some(if explain::is_no(value) {
                        vec![]
                    } else if explain::is_yes(value) {
                        vec!["Var".to_string()]
                    } else {
                        vec![pii::redact(value)]
                    });
                }
                _ => {}
            }
        }
        session.asked_context_ids.insert(context_id.to_string());
        session.last_context_id = None;
    }

    /// A "yes" to an escalating red-flag question forces the emergency path
    /// even when no emergency rule covers the canonical.
    fn red_flag_escalation(&self, session: &Session, canonical: &str) -> Option<EmergencyMatch> {
        let rf = self
            .catalog
            .questions
            .red_flags
            .iter()
            .find(|rf| rf.canonical == canonical && rf.if_yes_escalate)?;
        if !session.was_asked(&rf.id) {
            return None;
        }
        Some(EmergencyMatch {
            rule_id: rf.id.clone(),
            severity: 3,
            reason_tr: crate::catalog::questions::localized(&rf.reason, &session.locale)
                .to_string(),
            instructions_tr: vec![
                self.catalog
                    .messages
                    .text(&session.locale, "emergency_instruction_1"),
                self.catalog
                    .messages
                    .text(&session.locale, "emergency_instruction_2"),
            ],
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_question(
        &self,
        mut session: Session,
        question: SelectedQuestion,
        same_day: Option<SameDayMatch>,
        locale: &str,
        next_turn: u32,
        mut events: Vec<PendingEvent>,
        deadline: Option<Instant>,
    ) -> Envelope {
        match &question {
            SelectedQuestion::Context { id, .. } => {
                session.asked_context_ids.insert(id.clone());
                session.last_context_id = Some(id.clone());
            }
            SelectedQuestion::RedFlag { id, canonical, .. } => {
                session.mark_asked(id);
                session.mark_asked(canonical);
                session.last_context_id = None;
            }
            SelectedQuestion::Bank { canonical, .. } => {
                session.mark_asked(canonical);
                session.last_context_id = None;
            }
        }

        let payload = question.payload().clone();
        session.last_question = Some(payload.clone());
        session.turn_index = next_turn;
        session.envelope_type = Some(EnvelopeType::Question);

        let envelope = Envelope {
            envelope_type: EnvelopeType::Question,
            session_id: session.session_id.to_string(),
            turn_index: next_turn,
            payload: EnvelopePayload::Question(payload),
            meta: Some(self.meta(locale, same_day, None)),
        };
        events.push(PendingEvent {
            event_type: "ENVELOPE_QUESTION".into(),
            payload: envelope.payload_json(),
        });
        self.commit(session, envelope, next_turn, events, deadline, locale)
    }

    fn emit_emergency(
        &self,
        mut session: Session,
        em: EmergencyMatch,
        locale: &str,
        next_turn: u32,
        mut events: Vec<PendingEvent>,
        deadline: Option<Instant>,
    ) -> Envelope {
        session.turn_index = next_turn;
        session.envelope_type = Some(EnvelopeType::Emergency);
        session.stop_reason = Some(StopReason::EmergencyDetected);
        session.last_question = None;
        session.last_context_id = None;

        let envelope = Envelope {
            envelope_type: EnvelopeType::Emergency,
            session_id: session.session_id.to_string(),
            turn_index: next_turn,
            payload: EnvelopePayload::Emergency(EmergencyPayload {
                urgency: Urgency::Emergency,
                reason_tr: em.reason_tr,
                instructions_tr: em.instructions_tr,
            }),
            meta: Some(self.meta(locale, None, None)),
        };
        events.push(PendingEvent {
            event_type: "ENVELOPE_EMERGENCY".into(),
            payload: envelope.payload_json(),
        });
        self.commit(session, envelope, next_turn, events, deadline, locale)
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_result(
        &self,
        mut session: Session,
        reason: StopReason,
        candidates: &[Candidate],
        top_specialty_id: &str,
        top_specialty_name: &str,
        same_day: Option<SameDayMatch>,
        req: &TurnRequest,
        locale: &str,
        next_turn: u32,
        mut events: Vec<PendingEvent>,
        deadline: Option<Instant>,
    ) -> Envelope {
        let confidence = stop::compute_confidence(candidates, &self.catalog.messages, locale);
        let risk = explain::compute_risk(
            &session,
            &confidence,
            same_day.as_ref(),
            &self.catalog.rules.risk,
        );
        let urgency = explain::result_urgency(
            top_specialty_id,
            candidates.first().map(|c| c.disease_label.as_str()),
            same_day.as_ref(),
            &confidence,
            &self.catalog,
        );
        let why = explain::why_specialty_lines(
            &session,
            top_specialty_id,
            top_specialty_name,
            candidates,
            &self.catalog,
        );
        let summary = explain::doctor_summary(&session, &risk, &self.catalog);
        let notes = explain::safety_notes(&self.catalog, locale, top_specialty_id);
        let top_conditions: Vec<ConditionOut> = candidates
            .iter()
            .take(3)
            .map(|c| ConditionOut {
                disease_label: c.disease_label.clone(),
                score_0_1: (c.score_0_1 * 100.0).round() / 100.0,
            })
            .collect();

        let facility = match (req.lat, req.lon) {
            (Some(lat), Some(lon)) => {
                let directory =
                    FacilityDirectory::new(&self.catalog.facilities, &self.catalog.messages);
                Some(directory.lookup(top_specialty_id, locale, None, Some(lat), Some(lon), 5))
            }
            _ => None,
        };

        session.turn_index = next_turn;
        session.envelope_type = Some(EnvelopeType::Result);
        session.stop_reason = Some(reason);
        session.last_question = None;
        session.last_context_id = None;

        let envelope = Envelope {
            envelope_type: EnvelopeType::Result,
            session_id: session.session_id.to_string(),
            turn_index: next_turn,
            payload: EnvelopePayload::Result(ResultPayload {
                urgency,
                recommended_specialty: SpecialtyRef {
                    id: top_specialty_id.to_string(),
                    name_tr: top_specialty_name.to_string(),
                },
                top_conditions,
                doctor_ready_summary_tr: summary,
                safety_notes_tr: notes,
                confidence_0_1: confidence.value,
                confidence_label_tr: confidence.label_tr.clone(),
                confidence_explain_tr: confidence.explain_tr.clone(),
                why_specialty_tr: why,
                stop_reason: reason,
            }),
            meta: Some(self.meta(locale, same_day, facility)),
        };
        events.push(PendingEvent {
            event_type: "ENVELOPE_RESULT".into(),
            payload: envelope.payload_json(),
        });
        self.commit(session, envelope, next_turn, events, deadline, locale)
    }

    /// Persist the session and its events, honoring the deadline. On any
    /// failure the committed state is unchanged and an `ERROR` is returned.
    fn commit(
        &self,
        mut session: Session,
        envelope: Envelope,
        next_turn: u32,
        events: Vec<PendingEvent>,
        deadline: Option<Instant>,
        locale: &str,
    ) -> Envelope {
        if deadline_passed(deadline) {
            tracing::warn!(
                session_id = %session.session_id,
                "deadline expired; abandoning turn without persisting"
            );
            return self.error(
                ErrorCode::Internal,
                &session.session_id.to_string(),
                next_turn.saturating_sub(1),
                locale,
                "TURN_FAILED",
                true,
            );
        }

        session.updated_at = Utc::now();
        if let Err(e) = self.store.save(&session) {
            tracing::error!(error = %e, "session save failed");
            return self.error(
                ErrorCode::Internal,
                &session.session_id.to_string(),
                next_turn.saturating_sub(1),
                locale,
                "TURN_FAILED",
                true,
            );
        }
        for event in events {
            if let Err(e) =
                self.store
                    .append_event(session.session_id, next_turn, &event.event_type, &event.payload)
            {
                tracing::error!(error = %e, event = %event.event_type, "event append failed");
            }
        }
        envelope
    }

    fn meta(
        &self,
        locale: &str,
        same_day: Option<SameDayMatch>,
        facility: Option<crate::facility::FacilityHint>,
    ) -> Meta {
        Meta {
            disclaimer_tr: self.catalog.messages.text(locale, "disclaimer"),
            same_day: same_day.map(|sd| crate::models::SameDayNotice {
                rule_id: sd.rule_id,
                message_tr: sd.message_tr,
            }),
            facility,
        }
    }

    fn error(
        &self,
        code: ErrorCode,
        session_id: &str,
        turn_index: u32,
        locale: &str,
        message_key: &str,
        retryable: bool,
    ) -> Envelope {
        Envelope {
            envelope_type: EnvelopeType::Error,
            session_id: session_id.to_string(),
            turn_index,
            payload: EnvelopePayload::Error(ErrorPayload {
                code,
                message_tr: self.catalog.messages.text(locale, message_key),
                retryable,
            }),
            meta: Some(self.meta(locale, None, None)),
        }
    }
}

fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.is_some_and(|d| Instant::now() >= d)
}

fn parse_age(value: &str) -> Option<u32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let age: u32 = digits.parse().ok()?;
    (age <= 120).then_some(age)
}

fn parse_sex(value: &str) -> Option<String> {
    let v = value.trim().to_lowercase();
    if v.is_empty() {
        return None;
    }
    if ["erkek", "e", "male", "m"].contains(&v.as_str()) {
        return Some("Erkek".to_string());
    }
    if ["kadın", "kadin", "k", "female", "f"].contains(&v.as_str()) {
        return Some("Kadın".to_string());
    }
    Some(value.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::catalog_dir;
    use crate::store::MemoryStore;

    fn engine() -> TriageEngine<MemoryStore> {
        let catalog = Arc::new(Catalog::load_dir(&catalog_dir()).unwrap());
        TriageEngine::new(catalog, MemoryStore::new())
    }

    fn request(message: &str) -> TurnRequest {
        TurnRequest {
            locale: "tr-TR".into(),
            user_message: message.into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_is_retryable_error() {
        let e = engine();
        let env = e.handle_turn(&request("  "));
        assert_eq!(env.envelope_type, EnvelopeType::Error);
        match env.payload {
            EnvelopePayload::Error(err) => {
                assert_eq!(err.code, ErrorCode::EmptyInput);
                assert!(err.retryable);
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_session_is_bad_session() {
        let e = engine();
        let mut req = request("başım ağrıyor");
        req.session_id = Some(Uuid::new_v4().to_string());
        let env = e.handle_turn(&req);
        match env.payload {
            EnvelopePayload::Error(err) => assert_eq!(err.code, ErrorCode::BadSession),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_session_id_is_bad_session() {
        let e = engine();
        let mut req = request("başım ağrıyor");
        req.session_id = Some("not-a-uuid".into());
        let env = e.handle_turn(&req);
        match env.payload {
            EnvelopePayload::Error(err) => assert_eq!(err.code, ErrorCode::BadSession),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn expired_deadline_abandons_without_persisting() {
        let e = engine();
        let env = e.handle_turn_with_deadline(
            &request("başım ağrıyor"),
            Some(Instant::now() - std::time::Duration::from_millis(1)),
        );
        assert_eq!(env.envelope_type, EnvelopeType::Error);
        // Nothing was created.
        if let EnvelopePayload::Error(err) = env.payload {
            assert_eq!(err.code, ErrorCode::Internal);
            assert!(err.retryable);
        } else {
            panic!("expected error payload");
        }
    }

    #[test]
    fn age_parsing() {
        assert_eq!(parse_age("34"), Some(34));
        assert_eq!(parse_age("34 yaşındayım"), Some(34));
        assert_eq!(parse_age("yüz yirmi beş 125"), None);
        assert_eq!(parse_age("bilmem"), None);
    }

    #[test]
    fn sex_parsing() {
        assert_eq!(parse_sex("erkek").as_deref(), Some("Erkek"));
        assert_eq!(parse_sex("K").as_deref(), Some("Kadın"));
        assert_eq!(parse_sex("female").as_deref(), Some("Kadın"));
        assert_eq!(parse_sex("başka").as_deref(), Some("başka"));
    }
}
