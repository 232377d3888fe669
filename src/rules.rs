// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Descriptors of the rules this crate reports.

use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hidden,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hidden => "hidden",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Static description of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    /// Message text with positional `{0}`, `{1}`, ... placeholders.
    pub message_format: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub enabled_by_default: bool,
}

impl RuleDescriptor {
    /// Substitute `args` for the positional placeholders of the message.
    ///
    /// Placeholders without a matching argument are left as written.
    pub fn format_message<S: AsRef<str>>(&self, args: &[S]) -> String {
        let mut message = String::with_capacity(self.message_format.len());
        let mut rest = self.message_format;
        while let Some(open) = rest.find('{') {
            message.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let arg = after.find('}').and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                Some((close, args.get(index)?))
            });
            match arg {
                Some((close, arg)) => {
                    message.push_str(arg.as_ref());
                    rest = &after[close + 1..];
                }
                None => {
                    message.push('{');
                    rest = after;
                }
            }
        }
        message.push_str(rest);
        message
    }
}

/// String comparison inside a provider-translated lambda without explicit case handling.
pub const IMPLICIT_CASE_SENSITIVITY: RuleDescriptor = RuleDescriptor {
    id: "INV1000",
    title: "Use of implicit SQL collation behavior in Linq statement.",
    message_format: "A string comparison in a linq statement that does not explicitly specify case handling may result in unexpected behavior. However it may be necessary for performance optimization.",
    category: "Linq",
    default_severity: Severity::Info,
    enabled_by_default: true,
};

/// A check failed internally.
pub const ANALYSIS_FAULT: RuleDescriptor = RuleDescriptor {
    id: "INV9999",
    title: "An Error occurred during code analysis.",
    message_format: "An error occurred in analyzer {0}: {1} Stack Trace: {2}",
    category: "CodeAnalysis",
    default_severity: Severity::Error,
    enabled_by_default: true,
};

pub const SUPPORTED_RULES: [RuleDescriptor; 2] = [IMPLICIT_CASE_SENSITIVITY, ANALYSIS_FAULT];
