//! # Document Validation
//!
//! Pure, total checks applied to every recognized document before it is
//! signed. No I/O; `now` is always supplied by the caller.
//!
//! ## Freshness
//!
//! A document is fresh iff `created_at + window > now`, where the window is
//! counted in calendar months with day-of-month clamping (January 31st plus
//! one month is the last day of February). A document created exactly one
//! window before `now` is stale.

use super::entities::Document;
use super::errors::PipelineError;
use chrono::{DateTime, Months, Utc};

/// Format versions accepted by default.
pub const ACCEPTED_FORMATS: [&str; 2] = ["4.0", "3.1"];

/// Default freshness window in calendar months.
pub const FRESHNESS_WINDOW_MONTHS: u32 = 1;

/// Whether the document declares one of [`ACCEPTED_FORMATS`], compared literally.
pub fn is_acceptable_format(document: &Document) -> bool {
    ACCEPTED_FORMATS.contains(&document.format_version.as_str())
}

/// Whether the document was created less than one calendar month before `now`.
pub fn is_fresh(document: &Document, now: DateTime<Utc>) -> bool {
    within_window(document.created_at, FRESHNESS_WINDOW_MONTHS, now)
}

fn within_window(created_at: DateTime<Utc>, months: u32, now: DateTime<Utc>) -> bool {
    match created_at.checked_add_months(Months::new(months)) {
        Some(expires_at) => expires_at > now,
        // Expiry lies past the representable range, so after any `now`
        None => true,
    }
}

/// Configurable validation rules.
///
/// `Validators::default()` applies exactly [`is_acceptable_format`] and
/// [`is_fresh`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validators {
    accepted_formats: Vec<String>,
    window_months: u32,
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            accepted_formats: ACCEPTED_FORMATS.iter().map(|v| v.to_string()).collect(),
            window_months: FRESHNESS_WINDOW_MONTHS,
        }
    }
}

impl Validators {
    /// Build validators accepting `accepted_formats` within `window_months`.
    pub fn new(accepted_formats: Vec<String>, window_months: u32) -> Self {
        Self {
            accepted_formats,
            window_months,
        }
    }

    /// Reject documents whose version is not accepted.
    pub fn check_format(&self, document: &Document) -> Result<(), PipelineError> {
        if self
            .accepted_formats
            .iter()
            .any(|accepted| *accepted == document.format_version)
        {
            Ok(())
        } else {
            Err(PipelineError::UnsupportedFormat {
                version: document.format_version.clone(),
            })
        }
    }

    /// Reject documents whose window has closed at `now`.
    pub fn check_freshness(
        &self,
        document: &Document,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        if within_window(document.created_at, self.window_months, now) {
            Ok(())
        } else {
            Err(PipelineError::Stale {
                created_at: document.created_at,
            })
        }
    }
}
