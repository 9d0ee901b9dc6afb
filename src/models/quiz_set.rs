// src/models/quiz_set.rs

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

use crate::{
    config::{DEFAULT_PLACEHOLDER, DEFAULT_TIMER_DURATION},
    timer::StepGate,
    utils::html::clean_html,
};

/// Represents the 'quiz_sets' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizSet {
    pub id: i64,

    pub quiz_name: String,

    /// Public step identifiers. Only these ever appear in visitor-facing URLs.
    pub step_1_id: String,
    pub step_2_id: String,
    pub step_3_id: String,
    pub result_id: String,

    pub question_1_text: String,
    pub question_1_placeholder: String,
    /// Reference answer kept for the author. Visitor input is never checked against it.
    pub question_1_answer: Option<String>,

    pub question_2_text: String,
    pub question_2_placeholder: String,
    pub question_2_answer: Option<String>,

    pub question_3_text: String,
    pub question_3_placeholder: String,
    pub question_3_answer: Option<String>,

    pub result_message: String,
    pub reward_link: String,

    /// Countdown per question step, in seconds.
    pub timer_duration: i64,
    pub require_answer: bool,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

/// Position of a step identifier within its quiz set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepRole {
    Slot1,
    Slot2,
    Slot3,
    Result,
}

impl StepRole {
    /// Fixed resolution order.
    pub const ALL: [StepRole; 4] = [
        StepRole::Slot1,
        StepRole::Slot2,
        StepRole::Slot3,
        StepRole::Result,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            StepRole::Slot1 => "q1_emi",
            StepRole::Slot2 => "q2_sip",
            StepRole::Slot3 => "q3_swp",
            StepRole::Result => "res",
        }
    }

    pub fn page_type(self) -> &'static str {
        match self {
            StepRole::Slot1 => "emi",
            StepRole::Slot2 => "sip",
            StepRole::Slot3 => "swp",
            StepRole::Result => "results",
        }
    }

    /// Page hosting this step.
    pub fn page_route(self) -> &'static str {
        match self {
            StepRole::Slot1 => "/emi-calculator.html",
            StepRole::Slot2 => "/sip-calculator.html",
            StepRole::Slot3 => "/swp-calculator.html",
            StepRole::Result => "/quiz-results.html",
        }
    }
}

/// The four public identifiers minted for a new quiz set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepIds {
    pub step_1_id: String,
    pub step_2_id: String,
    pub step_3_id: String,
    pub result_id: String,
}

impl StepIds {
    const SUFFIX_LEN: usize = 8;

    /// Mints identifiers from the current time and a random base-36 suffix.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..Self::SUFFIX_LEN)
            .filter_map(|_| char::from_digit(rng.gen_range(0..36), 36))
            .collect();
        Self::from_parts(Utc::now().timestamp_millis(), &suffix)
    }

    pub fn from_parts(timestamp_millis: i64, suffix: &str) -> Self {
        let make = |role: StepRole| format!("{}_{}_{}", role.prefix(), timestamp_millis, suffix);
        Self {
            step_1_id: make(StepRole::Slot1),
            step_2_id: make(StepRole::Slot2),
            step_3_id: make(StepRole::Slot3),
            result_id: make(StepRole::Result),
        }
    }

    /// Link a visitor follows to start the quiz.
    pub fn entry_link(&self) -> String {
        format!("{}?quizid={}", StepRole::Slot1.page_route(), self.step_1_id)
    }
}

impl QuizSet {
    pub fn step_id(&self, role: StepRole) -> &str {
        match role {
            StepRole::Slot1 => &self.step_1_id,
            StepRole::Slot2 => &self.step_2_id,
            StepRole::Slot3 => &self.step_3_id,
            StepRole::Result => &self.result_id,
        }
    }

    /// Exact-match lookup of a step identifier, first match wins.
    pub fn role_of(&self, step_id: &str) -> Option<StepRole> {
        StepRole::ALL
            .into_iter()
            .find(|role| self.step_id(*role) == step_id)
    }

    fn question_step(&self, text: &str, placeholder: &str, next: StepRole) -> QuestionStep {
        QuestionStep {
            question_text: text.to_string(),
            question_html: clean_html(text),
            placeholder: placeholder.to_string(),
            next_step_id: self.step_id(next).to_string(),
            next_page_route: next.page_route().to_string(),
        }
    }

    /// Builds what a visitor sees on the page for `step_id`.
    pub fn resolve(&self, step_id: &str) -> Option<StepView> {
        let content = match self.role_of(step_id)? {
            StepRole::Slot1 => StepContent::Emi(self.question_step(
                &self.question_1_text,
                &self.question_1_placeholder,
                StepRole::Slot2,
            )),
            StepRole::Slot2 => StepContent::Sip(self.question_step(
                &self.question_2_text,
                &self.question_2_placeholder,
                StepRole::Slot3,
            )),
            StepRole::Slot3 => StepContent::Swp(self.question_step(
                &self.question_3_text,
                &self.question_3_placeholder,
                StepRole::Result,
            )),
            StepRole::Result => StepContent::Results(ResultStep {
                result_message: self.result_message.clone(),
                result_html: clean_html(&self.result_message),
                reward_link: self.reward_link.clone(),
            }),
        };

        Some(StepView {
            quiz_name: self.quiz_name.clone(),
            timer_duration: self.timer_duration.clamp(0, i64::from(u32::MAX)) as u32,
            require_answer: self.require_answer,
            content,
        })
    }

    pub fn step_ids(&self) -> StepIds {
        StepIds {
            step_1_id: self.step_1_id.clone(),
            step_2_id: self.step_2_id.clone(),
            step_3_id: self.step_3_id.clone(),
            result_id: self.result_id.clone(),
        }
    }
}

/// Public payload for a single quiz step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub quiz_name: String,
    pub timer_duration: u32,
    pub require_answer: bool,
    #[serde(flatten)]
    pub content: StepContent,
}

impl StepView {
    pub fn role(&self) -> StepRole {
        self.content.role()
    }

    /// Countdown gate configured for this step.
    pub fn gate(&self) -> StepGate {
        StepGate::new(self.timer_duration, self.require_answer)
    }
}

/// Role-specific part of a step, tagged by the calculator page it lives on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pageType", rename_all = "lowercase")]
pub enum StepContent {
    Emi(QuestionStep),
    Sip(QuestionStep),
    Swp(QuestionStep),
    Results(ResultStep),
}

impl StepContent {
    pub fn role(&self) -> StepRole {
        match self {
            StepContent::Emi(_) => StepRole::Slot1,
            StepContent::Sip(_) => StepRole::Slot2,
            StepContent::Swp(_) => StepRole::Slot3,
            StepContent::Results(_) => StepRole::Result,
        }
    }

    pub fn question(&self) -> Option<&QuestionStep> {
        match self {
            StepContent::Emi(q) | StepContent::Sip(q) | StepContent::Swp(q) => Some(q),
            StepContent::Results(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStep {
    /// Text exactly as the admin wrote it.
    pub question_text: String,
    /// The same text cleaned for insertion as HTML.
    pub question_html: String,
    pub placeholder: String,
    pub next_step_id: String,
    pub next_page_route: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultStep {
    pub result_message: String,
    pub result_html: String,
    pub reward_link: String,
}

/// Row shape for the public listing of active quiz sets.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: i64,
    pub quiz_name: String,
    pub step_1_id: String,
    pub step_2_id: String,
    pub step_3_id: String,
    pub result_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// DTO for creating or fully replacing a quiz set.
///
/// Missing text fields deserialize as empty strings so that they fail
/// validation with a 400 instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct QuizSetRequest {
    #[validate(length(min = 1, max = 255), custom(function = not_blank))]
    pub quiz_name: String,

    #[validate(length(min = 1, max = 1000), custom(function = not_blank))]
    pub question_1_text: String,
    #[validate(length(max = 255))]
    pub question_1_placeholder: Option<String>,
    #[validate(length(max = 500))]
    pub question_1_answer: Option<String>,

    #[validate(length(min = 1, max = 1000), custom(function = not_blank))]
    pub question_2_text: String,
    #[validate(length(max = 255))]
    pub question_2_placeholder: Option<String>,
    #[validate(length(max = 500))]
    pub question_2_answer: Option<String>,

    #[validate(length(min = 1, max = 1000), custom(function = not_blank))]
    pub question_3_text: String,
    #[validate(length(max = 255))]
    pub question_3_placeholder: Option<String>,
    #[validate(length(max = 500))]
    pub question_3_answer: Option<String>,

    #[validate(length(min = 1, max = 2000), custom(function = not_blank))]
    pub result_message: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub reward_link: String,

    #[validate(range(min = 1, max = 3600))]
    pub timer_duration: Option<i64>,
    pub require_answer: Option<bool>,
    /// Only honoured on update; new quiz sets always start active.
    pub is_active: Option<bool>,
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Validates that a string is a correctly formatted absolute URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

/// Validated and defaulted quiz content ready to be stored.
///
/// Texts are kept as written; HTML cleaning happens when a step is served.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    pub quiz_name: String,
    pub questions: [QuestionDraft; 3],
    pub result_message: String,
    pub reward_link: String,
    pub timer_duration: i64,
    pub require_answer: bool,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub text: String,
    pub placeholder: String,
    pub answer: Option<String>,
}

impl QuestionDraft {
    fn new(text: String, placeholder: Option<String>, answer: Option<String>) -> Self {
        Self {
            text: text.trim().to_string(),
            placeholder: placeholder
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            answer: answer.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        }
    }
}

impl From<QuizSetRequest> for QuizDraft {
    fn from(req: QuizSetRequest) -> Self {
        Self {
            quiz_name: req.quiz_name.trim().to_string(),
            questions: [
                QuestionDraft::new(req.question_1_text, req.question_1_placeholder, req.question_1_answer),
                QuestionDraft::new(req.question_2_text, req.question_2_placeholder, req.question_2_answer),
                QuestionDraft::new(req.question_3_text, req.question_3_placeholder, req.question_3_answer),
            ],
            result_message: req.result_message.trim().to_string(),
            reward_link: req.reward_link.trim().to_string(),
            timer_duration: req.timer_duration.unwrap_or(DEFAULT_TIMER_DURATION),
            require_answer: req.require_answer.unwrap_or(false),
            is_active: req.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuizSet {
        let ids = StepIds::from_parts(1_700_000_000_000, "abc123");
        QuizSet {
            id: 7,
            quiz_name: "Diwali Bonanza".to_string(),
            step_1_id: ids.step_1_id,
            step_2_id: ids.step_2_id,
            step_3_id: ids.step_3_id,
            result_id: ids.result_id,
            question_1_text: "First question".to_string(),
            question_1_placeholder: "one".to_string(),
            question_1_answer: Some("a".to_string()),
            question_2_text: "Second question".to_string(),
            question_2_placeholder: "two".to_string(),
            question_2_answer: None,
            question_3_text: "Third question".to_string(),
            question_3_placeholder: "three".to_string(),
            question_3_answer: None,
            result_message: "You made it".to_string(),
            reward_link: "https://example.com/reward".to_string(),
            timer_duration: 20,
            require_answer: true,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn valid_request() -> QuizSetRequest {
        QuizSetRequest {
            quiz_name: "Quiz".to_string(),
            question_1_text: "Q1".to_string(),
            question_2_text: "Q2".to_string(),
            question_3_text: "Q3".to_string(),
            result_message: "Done".to_string(),
            reward_link: "https://example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn step_ids_carry_role_prefixes() {
        let ids = StepIds::from_parts(1_700_000_000_000, "xyz");
        assert_eq!(ids.step_1_id, "q1_emi_1700000000000_xyz");
        assert_eq!(ids.step_2_id, "q2_sip_1700000000000_xyz");
        assert_eq!(ids.step_3_id, "q3_swp_1700000000000_xyz");
        assert_eq!(ids.result_id, "res_1700000000000_xyz");
        assert_eq!(ids.entry_link(), "/emi-calculator.html?quizid=q1_emi_1700000000000_xyz");
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = StepIds::generate();
        let b = StepIds::generate();
        let all = [
            &a.step_1_id, &a.step_2_id, &a.step_3_id, &a.result_id,
            &b.step_1_id, &b.step_2_id, &b.step_3_id, &b.result_id,
        ];
        for (i, x) in all.iter().enumerate() {
            for y in &all[i + 1..] {
                assert_ne!(x, y);
            }
        }
    }

    #[test]
    fn every_identifier_maps_to_exactly_one_role() {
        let quiz = sample();
        for role in StepRole::ALL {
            let id = quiz.step_id(role).to_string();
            assert_eq!(quiz.role_of(&id), Some(role));
            let matches = StepRole::ALL
                .iter()
                .filter(|r| quiz.step_id(**r) == id)
                .count();
            assert_eq!(matches, 1);
            assert_eq!(quiz.resolve(&id).map(|v| v.role()), Some(role));
        }
    }

    #[test]
    fn prefix_of_an_identifier_does_not_match() {
        let quiz = sample();
        let truncated = &quiz.step_1_id[..quiz.step_1_id.len() - 1];
        assert_eq!(quiz.role_of(truncated), None);
        assert!(quiz.resolve("q1_emi").is_none());
    }

    #[test]
    fn question_steps_chain_forward() {
        let quiz = sample();

        let first = quiz.resolve(&quiz.step_1_id).unwrap();
        let q = first.content.question().unwrap();
        assert_eq!(q.question_text, "First question");
        assert_eq!(q.placeholder, "one");
        assert_eq!(q.next_step_id, quiz.step_2_id);
        assert_eq!(q.next_page_route, "/sip-calculator.html");

        let second = quiz.resolve(&quiz.step_2_id).unwrap();
        assert_eq!(second.content.question().unwrap().next_step_id, quiz.step_3_id);

        let third = quiz.resolve(&quiz.step_3_id).unwrap();
        assert!(matches!(third.content, StepContent::Swp(_)));
        let q = third.content.question().unwrap();
        assert_eq!(q.next_step_id, quiz.result_id);
        assert_eq!(q.next_page_route, "/quiz-results.html");
    }

    #[test]
    fn step_view_serializes_with_page_type() {
        let quiz = sample();
        let json = serde_json::to_value(quiz.resolve(&quiz.step_2_id).unwrap()).unwrap();
        assert_eq!(json["pageType"], "sip");
        assert_eq!(json["quizName"], "Diwali Bonanza");
        assert_eq!(json["timerDuration"], 20);
        assert_eq!(json["requireAnswer"], true);
        assert_eq!(json["questionText"], "Second question");
        assert_eq!(json["nextStepId"], quiz.step_3_id);
        assert_eq!(json["nextPageRoute"], "/swp-calculator.html");
        assert!(json.get("answer").is_none());
    }

    #[test]
    fn result_step_has_no_next() {
        let quiz = sample();
        let view = quiz.resolve(&quiz.result_id).unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["pageType"], "results");
        assert_eq!(json["resultMessage"], "You made it");
        assert_eq!(json["rewardLink"], "https://example.com/reward");
        assert!(json.get("nextStepId").is_none());

        let back: StepView = serde_json::from_value(json).unwrap();
        assert_eq!(back, view);
    }

    #[test]
    fn step_view_builds_gate() {
        let quiz = sample();
        let view = quiz.resolve(&quiz.step_1_id).unwrap();
        let mut gate = view.gate();
        assert_eq!(gate.timer().remaining(), 20);
        for _ in 0..20 {
            gate.tick();
        }
        assert!(!gate.can_advance());
        gate.set_answer("yes");
        assert!(gate.can_advance());
    }

    #[test]
    fn request_validation_rejects_missing_fields() {
        assert!(valid_request().validate().is_ok());

        let missing_name = QuizSetRequest {
            quiz_name: String::new(),
            ..valid_request()
        };
        assert!(missing_name.validate().is_err());

        let blank_question = QuizSetRequest {
            question_2_text: "   ".to_string(),
            ..valid_request()
        };
        assert!(blank_question.validate().is_err());

        let bad_link = QuizSetRequest {
            reward_link: "not a url".to_string(),
            ..valid_request()
        };
        assert!(bad_link.validate().is_err());

        let zero_timer = QuizSetRequest {
            timer_duration: Some(0),
            ..valid_request()
        };
        assert!(zero_timer.validate().is_err());
    }

    #[test]
    fn draft_applies_defaults() {
        let req = QuizSetRequest {
            question_1_text: "  Pick one  ".to_string(),
            question_2_placeholder: Some("  ".to_string()),
            question_3_answer: Some(" 42 ".to_string()),
            ..valid_request()
        };
        let draft = QuizDraft::from(req);
        assert_eq!(draft.questions[0].text, "Pick one");
        assert_eq!(draft.questions[1].placeholder, DEFAULT_PLACEHOLDER);
        assert_eq!(draft.questions[2].answer.as_deref(), Some("42"));
        assert_eq!(draft.timer_duration, DEFAULT_TIMER_DURATION);
        assert!(!draft.require_answer);
    }

    #[test]
    fn authored_text_reaches_visitors_unchanged() {
        let draft = QuizDraft::from(QuizSetRequest {
            question_1_text: "Is 5 < 10 & EMI > 0?".to_string(),
            result_message: "Tom & Jerry win".to_string(),
            ..valid_request()
        });
        assert_eq!(draft.questions[0].text, "Is 5 < 10 & EMI > 0?");
        assert_eq!(draft.result_message, "Tom & Jerry win");

        let mut quiz = sample();
        quiz.question_1_text = draft.questions[0].text.clone();
        quiz.result_message = draft.result_message.clone();

        let first = quiz.resolve(&quiz.step_1_id).unwrap();
        let q = first.content.question().unwrap();
        assert_eq!(q.question_text, "Is 5 < 10 & EMI > 0?");
        assert_eq!(q.question_html, "Is 5 &lt; 10 &amp; EMI &gt; 0?");

        let json = serde_json::to_value(quiz.resolve(&quiz.result_id).unwrap()).unwrap();
        assert_eq!(json["resultMessage"], "Tom & Jerry win");
        assert_eq!(json["resultHtml"], "Tom &amp; Jerry win");
    }

    #[test]
    fn html_rendering_drops_scripts() {
        let mut quiz = sample();
        quiz.question_2_text = "Pick <b>one</b><script>alert(1)</script>".to_string();

        let view = quiz.resolve(&quiz.step_2_id).unwrap();
        let q = view.content.question().unwrap();
        assert_eq!(q.question_text, "Pick <b>one</b><script>alert(1)</script>");
        assert_eq!(q.question_html, "Pick <b>one</b>");
    }
}
