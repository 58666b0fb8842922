pub mod number;
pub mod payload;
pub mod submitter;

pub use number::{TicketClock, ticket_number};
pub use submitter::{ItemOutcome, SubmissionResult, SubmitRequest, submit_tickets};
