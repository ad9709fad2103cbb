// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! User-facing diagnostics accumulated by resource handlers.
//!
//! Handlers never panic or bail out on the first problem they see. Validation
//! issues, WAPI failures and extensible-attribute conversion errors are collected
//! into a [`Diagnostics`] value and returned to the caller, which decides whether
//! to halt (in practice, any error halts the current operation).
//!
//! Summaries are stable, programmatic strings defined as constants below so that
//! callers and tests can match on them without parsing details.
//!
//! # Example
//!
//! ```rust
//! use nios_dns::diagnostics::{Diagnostics, SUMMARY_CLIENT_ERROR};
//!
//! let mut diags = Diagnostics::new();
//! diags.add_warning("Deprecated attribute", "use_ttl is ignored when ttl is unset");
//! assert!(!diags.has_error());
//!
//! diags.add_error(SUMMARY_CLIENT_ERROR, "Unable to create record:cname");
//! assert!(diags.has_error());
//! assert_eq!(diags.errors().count(), 1);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Diagnostic Summaries
// ============================================================================

/// The WAPI rejected or failed a request.
pub const SUMMARY_CLIENT_ERROR: &str = "Client Error";

/// Extensible attributes returned by the WAPI could not be converted.
pub const SUMMARY_EXTATTR_CONVERSION: &str = "Extensible Attribute Conversion Error";

/// A configured attribute failed schema validation.
pub const SUMMARY_INVALID_ATTRIBUTE: &str = "Invalid Attribute Value";

/// A required attribute was not configured.
pub const SUMMARY_MISSING_ATTRIBUTE: &str = "Missing Required Attribute";

/// Managed attributes could not be decoded into the resource model.
pub const SUMMARY_INVALID_CONFIGURATION: &str = "Invalid Resource Configuration";

/// The resource type is not served by this provider.
pub const SUMMARY_UNKNOWN_RESOURCE: &str = "Unknown Resource Type";

/// State is missing the object reference needed for the operation.
pub const SUMMARY_MISSING_REFERENCE: &str = "Missing Object Reference";

/// Severity of a single diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation cannot proceed
    Error,
    /// The operation proceeds but the user should know
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
        }
    }
}

/// One user-visible message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is
    pub severity: Severity,
    /// Short stable summary (one of the `SUMMARY_*` constants for errors)
    pub summary: String,
    /// Full explanation, including upstream error text
    pub detail: String,
    /// Attribute path the diagnostic refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    /// Create a warning diagnostic.
    pub fn warning(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        }
    }

    /// Attach the attribute path this diagnostic refers to.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some(attr) => write!(
                f,
                "{}: {} [{}]: {}",
                self.severity, self.summary, attr, self.detail
            ),
            None => write!(f, "{}: {}: {}", self.severity, self.summary, self.detail),
        }
    }
}

/// Ordered collection of diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection holding a single error.
    pub fn from_error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut diags = Self::new();
        diags.add_error(summary, detail);
        diags
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn add_error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::error(summary, detail));
    }

    pub fn add_warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic::warning(summary, detail));
    }

    /// Add an error tied to an attribute path.
    pub fn add_attribute_error(
        &mut self,
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic::error(summary, detail).with_attribute(attribute));
    }

    /// Append every diagnostic from `other`.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Warning)
    }

    /// `Ok(value)` when no error was accumulated, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collection itself when it contains at least one error.
    pub fn into_result<T>(self, value: T) -> Result<T, Diagnostics> {
        if self.has_error() {
            Err(self)
        } else {
            Ok(value)
        }
    }
}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self(vec![diagnostic])
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for diagnostic in &self.0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
#[path = "diagnostics_tests.rs"]
mod diagnostics_tests;
