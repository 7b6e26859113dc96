//! Validation and the submit pipeline.
//!
//! A submission walks a fixed sequence: validate the form against its
//! schema, build the document strictly, post it over the page's encoding,
//! then record the success in history. The first validation failure stops
//! the run with a field-addressed error the UI can point at.

use thiserror::Error;
use uuid::Uuid;

use crate::client::{BackendReply, ClientError, Transport};
use crate::form::FormState;
use crate::pages::{BodyEncoding, PageSpec};
use crate::payload::{BuildContext, BuildError, BuildMode};
use crate::schema::{FieldDescriptor, InputType};
use crate::storage::{HistoryRecord, Storage};

/// A single field failure, addressed to the field (and line) that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    /// Displayed line number, already shifted by the page's index origin.
    pub line: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(ValidationError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Client(#[from] ClientError),

    /// The backend accepted the request but rejected the submission.
    #[error("backend rejected the submission: {0}")]
    Rejected(String),
}

pub type Result<T> = core::result::Result<T, SubmitError>;

fn check_field(
    field: &FieldDescriptor,
    value: &str,
    line: Option<usize>,
) -> core::result::Result<(), ValidationError> {
    let value = value.trim();
    let fail = |message: String| ValidationError {
        field: field.key.to_string(),
        line,
        message,
    };

    if value.is_empty() {
        if field.required {
            return Err(fail(format!("{} is required", field.label)));
        }
        return Ok(());
    }
    match field.input {
        InputType::Text | InputType::Date => Ok(()),
        InputType::Number { min } => match value.parse::<i64>() {
            Ok(n) if n >= min => Ok(()),
            Ok(_) => Err(fail(format!("{} must be at least {min}", field.label))),
            Err(_) => Err(fail(format!("{} must be a whole number", field.label))),
        },
        InputType::Select { options } => {
            if options.iter().any(|(v, _)| *v == value) {
                Ok(())
            } else {
                Err(fail(format!("{} has no option {value}", field.label)))
            }
        }
    }
}

/// Validates base fields first, then each line in order. Stops at the
/// first failure.
pub fn validate(
    page: &PageSpec,
    state: &FormState,
) -> core::result::Result<(), ValidationError> {
    for field in page.base_fields {
        check_field(field, state.base(field.key), None)?;
    }
    for (index, _) in state.items.iter().enumerate() {
        let line = Some(page.index_origin + index);
        for field in page.item_fields {
            check_field(field, state.item(index, field.key), line)?;
        }
    }
    Ok(())
}

/// Runs the full submit pipeline against the page's embedded preset.
pub fn submit(
    page: &PageSpec,
    state: &FormState,
    storage: &Storage,
    transport: &dyn Transport,
) -> Result<BackendReply> {
    submit_with(&(page.preset)(), page, state, storage, transport)
}

/// Runs the full submit pipeline and returns the backend's message. The
/// preset may be a remotely fetched one.
///
/// History is best-effort: a failed write is logged, not surfaced, since
/// the submission itself already went through.
pub fn submit_with(
    preset: &serde_json::Value,
    page: &PageSpec,
    state: &FormState,
    storage: &Storage,
    transport: &dyn Transport,
) -> Result<BackendReply> {
    validate(page, state).map_err(SubmitError::Validation)?;

    let ctx = BuildContext::capture();
    let doc = (page.build)(preset, state, BuildMode::Submit, &ctx)?;

    let reply = match page.encoding {
        BodyEncoding::Json => transport.post_json(page.submit_path, &doc)?,
        BodyEncoding::Form => transport.post_form(page.submit_path, &page.flatten(state))?,
    };
    if !reply.ok {
        return Err(SubmitError::Rejected(reply.message));
    }

    let record = HistoryRecord {
        id: Uuid::new_v4(),
        submitted_at: jiff::Timestamp::now(),
        base: state.base.clone(),
        line_count: state.items.len(),
        message: reply.message.clone(),
    };
    if let Err(e) = storage.append_history(page.name, &record) {
        log::warn!("could not record history for {}: {e}", page.name);
    }

    Ok(reply)
}
