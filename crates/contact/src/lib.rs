//! `devmart-contact` — custom-project contact requests and their triage.
//!
//! Visitors submit a request through the public form; admins triage it by
//! moving status and priority. Nothing else happens to a submission.

pub mod submission;

pub use submission::{
    ContactRepository, ContactSubmission, Priority, SubmissionDraft, SubmissionStatus,
};
