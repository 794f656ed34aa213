use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mti::prelude::{MagicTypeId, MagicTypeIdExt, V7};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, info};

use crate::reconcile::NewRoute;
use crate::types::{Exposure, RouteIdentity, RouteSet};

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors raised while applying answers to an open session.
///
/// Any of these aborts the whole apply; no decision is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    /// A question has no answer.
    MissingAnswer { question: String },
    /// An answer refers to a question the session never asked.
    UnknownQuestion { id: String },
    /// The answer is not one of the question's options.
    InvalidChoice { question: String, value: String },
    /// The question id no longer parses as a route identity.
    CorruptQuestionId { id: String, reason: String },
    /// A session id failed TypeID validation.
    InvalidSessionId(String),
    /// An `id=choice` assignment could not be split.
    MalformedAssignment(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAnswer { question } => write!(f, "no answer for question '{question}'"),
            Self::UnknownQuestion { id } => write!(f, "answer for unknown question '{id}'"),
            Self::InvalidChoice { question, value } => {
                write!(
                    f,
                    "invalid answer '{value}' for question '{question}': expected one of {}",
                    Choice::ALL.map(|c| c.as_str()).join(", ")
                )
            }
            Self::CorruptQuestionId { id, reason } => {
                write!(f, "corrupt question id '{id}': {reason}")
            }
            Self::InvalidSessionId(s) => write!(f, "invalid session id: {s}"),
            Self::MalformedAssignment(s) => {
                write!(f, "malformed answer '{s}': expected '<question>=<choice>'")
            }
        }
    }
}

impl std::error::Error for SessionError {}

// ---------------------------------------------------------------------------
// Choice
// ---------------------------------------------------------------------------

/// One of the three answers a route question accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Choice {
    ExposeWithAuth,
    ExposeWithoutAuth,
    Hidden,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Self::ExposeWithAuth, Self::ExposeWithoutAuth, Self::Hidden];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExposeWithAuth => "expose-with-auth",
            Self::ExposeWithoutAuth => "expose-without-auth",
            Self::Hidden => "hidden",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ExposeWithAuth => "Expose with authentication",
            Self::ExposeWithoutAuth => "Expose without authentication",
            Self::Hidden => "Keep hidden",
        }
    }

    pub fn exposure(&self) -> Exposure {
        match self {
            Self::ExposeWithAuth => Exposure::Protected,
            Self::ExposeWithoutAuth => Exposure::Public,
            Self::Hidden => Exposure::Hidden,
        }
    }

    /// Option key for this choice on the question `question_id`.
    pub fn option_key(&self, question_id: &str) -> String {
        format!("{}-{question_id}", self.as_str())
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|c| c.as_str() == s).ok_or(())
    }
}

// ---------------------------------------------------------------------------
// Question
// ---------------------------------------------------------------------------

/// A selectable answer of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub key: String,
    pub label: String,
    pub choice: Choice,
}

/// One question per new route.
///
/// The id is the route's canonical identity text, so applying answers never
/// depends on question order or on in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub message: String,
    pub description: String,
    pub options: Vec<QuestionOption>,
}

impl Question {
    pub fn for_route(route: &NewRoute) -> Self {
        let identity = &route.identity;
        let id = identity.to_string();
        let options = Choice::ALL
            .into_iter()
            .map(|choice| QuestionOption {
                key: choice.option_key(&id),
                label: choice.label().to_string(),
                choice,
            })
            .collect();
        Self {
            message: format!(
                "Expose REST route {} {} of service {} from module {}?",
                identity.path,
                identity.method,
                identity.key.service(),
                identity.key.module()
            ),
            description: format!("Gateway route will be {}", identity.gateway_target()),
            id,
            options,
        }
    }

    /// Matches an answer against this question's options.
    ///
    /// Accepts either a full option key or a bare choice name.
    pub fn resolve(&self, answer: &str) -> Option<Choice> {
        self.options
            .iter()
            .find(|o| o.key == answer || o.choice.as_str() == answer)
            .map(|o| o.choice)
    }

    pub fn identity(&self) -> Result<RouteIdentity, SessionError> {
        self.id
            .parse()
            .map_err(|e: crate::error::RouteError| SessionError::CorruptQuestionId {
                id: self.id.clone(),
                reason: e.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

const SESSION_PREFIX: &str = "session";

/// A TypeID-based identifier with prefix "session".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(MagicTypeId);

impl SessionId {
    pub fn new() -> Self {
        Self(SESSION_PREFIX.create_type_id::<V7>())
    }

    pub fn parse(s: &str) -> Result<Self, SessionError> {
        let id =
            MagicTypeId::from_str(s).map_err(|e| SessionError::InvalidSessionId(format!("{e}")))?;
        if id.prefix().as_str() != SESSION_PREFIX {
            return Err(SessionError::InvalidSessionId(format!(
                "expected prefix '{SESSION_PREFIX}', got '{}'",
                id.prefix().as_str()
            )));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// Question id to answer (option key or bare choice name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<String, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.0.insert(question.into(), answer.into());
    }

    /// Parses `"<question id>=<choice>"`, splitting on the last `=`.
    pub fn parse_assignment(s: &str) -> Result<(String, String), SessionError> {
        match s.rsplit_once('=') {
            Some((q, a)) if !q.trim().is_empty() && !a.trim().is_empty() => {
                Ok((q.trim().to_string(), a.trim().to_string()))
            }
            _ => Err(SessionError::MalformedAssignment(s.to_string())),
        }
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Answers {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A resolved answer for one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub identity: RouteIdentity,
    pub choice: Choice,
}

impl Decision {
    pub fn exposure(&self) -> Exposure {
        self.choice.exposure()
    }
}

/// The persisted record of an open question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub opened_at: DateTime<Utc>,
    pub questions: Vec<Question>,
}

impl Session {
    /// Opens a session with one question per new route, or `None` when there
    /// is nothing to ask.
    pub fn open(new_routes: &[NewRoute]) -> Option<Self> {
        if new_routes.is_empty() {
            return None;
        }
        let session = Self {
            id: SessionId::new(),
            opened_at: Utc::now(),
            questions: new_routes.iter().map(Question::for_route).collect(),
        };
        info!(session = %session.id, questions = session.questions.len(), "session opened");
        Some(session)
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Checks the answers and turns them into decisions, in question order.
    ///
    /// Every question must be answered with one of its options, and every
    /// answer must belong to a question.
    pub fn resolve(&self, answers: &Answers) -> Result<Vec<Decision>, SessionError> {
        if let Some((unknown, _)) = answers.iter().find(|(id, _)| self.question(id).is_none()) {
            return Err(SessionError::UnknownQuestion {
                id: unknown.to_string(),
            });
        }

        self.questions
            .iter()
            .map(|q| {
                let identity = q.identity()?;
                let answer = answers.get(&q.id).ok_or_else(|| SessionError::MissingAnswer {
                    question: q.id.clone(),
                })?;
                let choice = q.resolve(answer).ok_or_else(|| SessionError::InvalidChoice {
                    question: q.id.clone(),
                    value: answer.to_string(),
                })?;
                Ok(Decision { identity, choice })
            })
            .collect()
    }

    /// Resolves the answers and records every decision in `set`.
    ///
    /// Nothing is inserted unless all answers resolve.
    pub fn apply(
        &self,
        answers: &Answers,
        set: &mut RouteSet,
    ) -> Result<Vec<Decision>, SessionError> {
        let decisions = self.resolve(answers)?;
        for decision in &decisions {
            set.insert_route(&decision.identity, decision.exposure());
            debug!(route = %decision.identity, choice = %decision.choice, "decision recorded");
        }
        Ok(decisions)
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// `NoSession -> AwaitingAnswers -> Applied`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    NoSession,
    AwaitingAnswers(Session),
    Applied,
}

impl SessionState {
    /// State after reconciliation produced `new_routes`.
    pub fn open(new_routes: &[NewRoute]) -> Self {
        match Session::open(new_routes) {
            Some(session) => Self::AwaitingAnswers(session),
            None => Self::NoSession,
        }
    }

    /// State recovered from a persisted record.
    pub fn from_record(record: Option<Session>) -> Self {
        record.map_or(Self::NoSession, Self::AwaitingAnswers)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::AwaitingAnswers(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self, Self::AwaitingAnswers(_))
    }

    /// Applies the answers. Without an open session this is a no-op.
    ///
    /// On error the state is left untouched.
    pub fn apply(
        &mut self,
        answers: &Answers,
        set: &mut RouteSet,
    ) -> Result<Vec<Decision>, SessionError> {
        let Self::AwaitingAnswers(session) = self else {
            debug!("no open session, nothing to apply");
            return Ok(Vec::new());
        };
        let decisions = session.apply(answers, set)?;
        *self = Self::Applied;
        Ok(decisions)
    }
}
