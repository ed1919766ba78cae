//! Appointment scheduling: the rule set, the pure validator that applies it
//! to a same-day snapshot, and the service that wraps validation and the
//! write in one transaction.

pub mod rules;
pub mod service;
pub mod validator;

pub use rules::{SchedulingRules, Violation};
pub use service::{AppointmentService, ScheduleOutcome, ServiceError};
pub use validator::{validate, AppointmentValidator, Candidate, InputError};
