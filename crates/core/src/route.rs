// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Route derivation for outbound submissions.
//!
//! A record's `target_ref` names a logical destination; the route table maps
//! it onto the server endpoint, falling back to the default route when the
//! target is not recognized.

/// Maps target references onto server endpoint paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    targets: Vec<String>,
    default_target: String,
}

impl RouteTable {
    /// Creates a table with the given known targets and default.
    pub fn new(targets: Vec<String>, default_target: String) -> Self {
        RouteTable { targets, default_target }
    }

    /// The known target references.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// True if the target is a known destination.
    pub fn is_known(&self, target_ref: &str) -> bool {
        self.targets.iter().any(|t| t == target_ref)
    }

    /// Endpoint path for a target, falling back to the default route for
    /// unrecognized targets.
    pub fn path_for(&self, target_ref: &str) -> String {
        if self.is_known(target_ref) {
            format!("/plan/{}", target_ref)
        } else {
            format!("/plan/{}", self.default_target)
        }
    }
}

impl Default for RouteTable {
    /// The weekday plans the server exposes, with `today` as the fallback.
    fn default() -> Self {
        RouteTable {
            targets: ["sunday", "monday", "tuesday", "wednesday", "thursday"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_target: "today".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "route_tests.rs"]
mod tests;
