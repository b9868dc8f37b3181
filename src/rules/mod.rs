//! Pattern matchers and the rule catalog.
//!
//! Every rule is a stateless [`Rule`] that inspects the [`SyntaxView`] and
//! returns [`Finding`]s, each optionally carrying a pre-computed [`Fix`].
//! Gated rules only see classes that pass the OpMode gate
//! ([`gate::is_in_scope`]); document rules see the whole document.
//!
//! [`Fix`]: crate::fix::Fix

mod calls;
mod catalog;
pub mod gate;
pub mod hardware;
mod input_poll;
mod runner;
mod start_signal;
mod suppress;
mod telemetry;
mod types;

pub use calls::CallPattern;
pub use catalog::RuleCatalog;
pub use hardware::{UnboundField, HARDWARE_TYPES};
pub use input_poll::UnguardedInputPoll;
pub use runner::Runner;
pub use start_signal::{MissingStartSignal, ENTRY_METHOD};
pub use suppress::{filter_suppressed, parse_suppressions, Suppression, SuppressionType};
pub use telemetry::MissingTelemetryFlush;
pub use types::{AnalysisResult, FileAnalysis, Finding, RuleId, Severity};

pub use hardware::UninitializedHardwareField;

use crate::syntax::{SourceDocument, Span, SyntaxNode, SyntaxView};

/// Which part of the document a rule is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Called once per in-scope class, with [`RuleContext::class`] set.
    Gated,
    /// Called once per document.
    Document,
}

/// Everything a rule may look at.
pub struct RuleContext<'a, 'src> {
    pub document: &'a SourceDocument,
    pub view: &'a SyntaxView<'src>,
    pub class: Option<&'a SyntaxNode<'src>>,
    /// Only patterns wholly inside this span should be reported.
    pub selection: Option<Span>,
}

impl RuleContext<'_, '_> {
    /// Whether `span` is inside the selection (always true without one).
    pub fn in_selection(&self, span: Span) -> bool {
        self.selection.map_or(true, |s| s.contains(span))
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> RuleId;

    fn scope(&self) -> Scope;

    /// Inspect the context and report findings in document order.
    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding>;
}
