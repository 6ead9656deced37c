//! Submission validation with typed field errors. Out-of-range values are
//! rejected, never clamped; the host boundary decides how to render the
//! field/code pairs.

use serde::Serialize;

use super::domain::{ResponseSubmission, SurveyRecord};

/// One rejected field with a stable machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: &'static str,
}

/// All field errors found in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid submission:")?;
        for error in &self.0 {
            write!(f, " {}={}", error.field, error.code)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

const SCORE_MIN: i64 = 0;
const SCORE_MAX: i64 = 10;

/// Validate a submission against the survey it targets. Checks shape only;
/// survey status and scoping are the coordinator's concern.
pub fn validate_submission(
    survey: &SurveyRecord,
    submission: &ResponseSubmission,
) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if let Some(score) = submission.score {
        if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            errors.push(FieldError {
                field: "score".to_string(),
                code: "out_of_range",
            });
        }
    }

    let nps_question_id = survey.nps_question().map(|question| question.id.clone());

    for (index, answer) in submission.answers.iter().enumerate() {
        if answer.question_id.0.trim().is_empty() {
            errors.push(FieldError {
                field: format!("answers[{index}].question_id"),
                code: "required",
            });
            continue;
        }

        // The NPS answer becomes the canonical score, so it gets the same
        // range rule as a top-level score.
        if Some(&answer.question_id) == nps_question_id.as_ref() {
            if let Some(numeric) = answer.numeric_value {
                if !(SCORE_MIN..=SCORE_MAX).contains(&numeric) {
                    errors.push(FieldError {
                        field: format!("answers[{index}].numeric_value"),
                        code: "out_of_range",
                    });
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}
