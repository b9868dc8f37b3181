//! Structural call matching over the reduced tree.

use crate::syntax::SyntaxNode;

/// A method invocation shape: `receiver.name(...)` or an unqualified `name(...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPattern {
    /// `None` matches unqualified calls and calls on `this`.
    pub receiver: Option<&'static str>,
    pub name: &'static str,
}

pub const WAIT_FOR_START: CallPattern = CallPattern::unqualified("waitForStart");
pub const TELEMETRY_ADD_DATA: CallPattern = CallPattern::on("telemetry", "addData");
pub const TELEMETRY_UPDATE: CallPattern = CallPattern::on("telemetry", "update");
pub const HARDWARE_MAP_GET: CallPattern = CallPattern::on("hardwareMap", "get");

impl CallPattern {
    pub const fn on(receiver: &'static str, name: &'static str) -> Self {
        Self {
            receiver: Some(receiver),
            name,
        }
    }

    pub const fn unqualified(name: &'static str) -> Self {
        Self {
            receiver: None,
            name,
        }
    }

    pub fn matches(&self, node: &SyntaxNode<'_>) -> bool {
        if node.grammar != "method_invocation" || node.name_text() != Some(self.name) {
            return false;
        }
        match self.receiver {
            None => matches!(node.qualifier, None | Some("this")),
            Some(receiver) => node.receiver() == Some(receiver),
        }
    }

    /// Whether `node` or any of its descendants is a matching call.
    pub fn occurs_in(&self, node: &SyntaxNode<'_>) -> bool {
        node.descendants().any(|n| self.matches(n))
    }
}
