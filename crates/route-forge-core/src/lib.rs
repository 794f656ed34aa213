pub mod error;
pub mod reconcile;
pub mod session;
pub mod types;

pub use error::RouteError;
pub use reconcile::{NewRoute, ReconcileEngine, ReconcilePlan, ReconcileStep, RetiredLedger};
pub use session::{
    Answers, Choice, Decision, Question, QuestionOption, Session, SessionError, SessionId,
    SessionState,
};
