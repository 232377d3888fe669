// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::operation::Location;
use crate::rules::{RuleDescriptor, Severity, ANALYSIS_FAULT};

use core::fmt;
use serde::Serialize;

/// A reported rule violation or analysis fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub rule_id: &'static str,
    pub severity: Severity,
    pub message: String,
    pub location: Location,
    /// Message arguments. Only fault records carry any.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

impl Diagnostic {
    pub fn new(rule: &RuleDescriptor, severity: Severity, location: Location) -> Self {
        Self {
            rule_id: rule.id,
            severity,
            message: rule.format_message::<&str>(&[]),
            location,
            arguments: Vec::new(),
        }
    }

    /// Fault record for `analyzer` failing with `description`.
    pub fn fault(analyzer: &str, description: &str, trace: &str, location: Location) -> Self {
        let arguments = vec![
            analyzer.to_string(),
            description.to_string(),
            trace.to_string(),
        ];
        Self {
            rule_id: ANALYSIS_FAULT.id,
            severity: ANALYSIS_FAULT.default_severity,
            message: ANALYSIS_FAULT.format_message(&arguments),
            location,
            arguments,
        }
    }

    pub fn is_fault(&self) -> bool {
        self.rule_id == ANALYSIS_FAULT.id
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}: {}",
            self.location, self.severity, self.rule_id, self.message
        )
    }
}
