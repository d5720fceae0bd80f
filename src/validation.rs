//! Field checks shared by the TUI forms and the CLI.
//!
//! Every check is a pure function of its input; "today" is passed in so
//! callers and tests agree on the clock.

use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

use crate::utils::{format_date, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    DueDate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::DueDate => "Due date",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    RequiredField(Field),
    #[error("Due date must be in dd/mm/yyyy format")]
    InvalidDate,
    #[error("Due date cannot be earlier than today")]
    PastDate,
}

fn require(value: &str, field: Field) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::RequiredField(field))
    } else {
        Ok(())
    }
}

pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    require(title, Field::Title)
}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    require(description, Field::Description)
}

/// Returns the parsed date when it is set, well formed and not before `today`
pub fn validate_due_date(due_date: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    require(due_date, Field::DueDate)?;
    let date = parse_date(due_date).map_err(|_| ValidationError::InvalidDate)?;
    if date < today {
        return Err(ValidationError::PastDate);
    }
    Ok(date)
}

/// Run every check and return the due date in canonical dd/mm/yyyy form,
/// or every field error in field order
pub fn validate_task_fields(
    title: &str,
    description: &str,
    due_date: &str,
    today: NaiveDate,
) -> Result<String, Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = [validate_title(title), validate_description(description)]
        .into_iter()
        .filter_map(Result::err)
        .collect();
    match validate_due_date(due_date, today) {
        Ok(date) if errors.is_empty() => Ok(format_date(date)),
        Ok(_) => Err(errors),
        Err(e) => {
            errors.push(e);
            Err(errors)
        }
    }
}
