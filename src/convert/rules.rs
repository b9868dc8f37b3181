//! Conversion rules: pose constructions and angle literals.

use super::geometry::{format_number, Angle, AngleUnit, CoordinatePair};
use super::Direction;
use crate::fix::{Edit, Fix};
use crate::rules::gate::short_name;
use crate::rules::{Finding, Rule, RuleContext, RuleId, Scope};
use crate::syntax::{Span, SyntaxNode};

const TO_RADIANS: &str = "toRadians";

/// Rewrites `Pose(x, y[, h])` <-> `Pose2d(x, y[, h])`, shifting x and y.
pub struct PoseRule {
    pub direction: Direction,
    pub half_extent: f64,
}

/// A matched pose construction.
struct PoseMatch<'a, 'src> {
    node: &'a SyntaxNode<'src>,
    /// Span of the last segment of the type name.
    type_span: Span,
    x: (Span, f64),
    y: (Span, f64),
}

impl Rule for PoseRule {
    fn id(&self) -> RuleId {
        match self.direction {
            Direction::Forward => RuleId::CornerToCenterPose,
            Direction::Inverse => RuleId::CenterToCornerPose,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Document
    }

    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        let source_type = self.direction.source_type();
        let target_type = self.direction.target_type();

        ctx.view
            .nodes()
            .filter(|node| ctx.in_selection(node.span))
            .filter_map(|node| match_pose(node, source_type))
            .map(|pose| {
                let shifted = CoordinatePair::new(pose.x.1, pose.y.1, self.direction.source())
                    .to_convention(self.direction.target(), self.half_extent);
                let (x, y) = (format_number(shifted.x), format_number(shifted.y));

                let fix = Fix::new(
                    format!("Convert {} to {}", source_type, target_type),
                    vec![
                        Edit::replace(pose.type_span, target_type),
                        Edit::replace(pose.x.0, x.clone()),
                        Edit::replace(pose.y.0, y.clone()),
                    ],
                )
                .ok();
                Finding::new(
                    self.id(),
                    ctx.document,
                    pose.node.span,
                    format!(
                        "{}({}, {}) -> {}({}, {})",
                        source_type,
                        ctx.document.slice(pose.x.0).unwrap_or_default(),
                        ctx.document.slice(pose.y.0).unwrap_or_default(),
                        target_type,
                        x,
                        y
                    ),
                )
                .with_fix(fix)
            })
            .collect()
    }
}

/// `new <type>(x, y[, h])` or a bare `<type>(x, y[, h])` with numeric x and y.
fn match_pose<'a, 'src>(node: &'a SyntaxNode<'src>, type_name: &str) -> Option<PoseMatch<'a, 'src>> {
    let name = node.name?;
    let is_construction = match node.grammar {
        "object_creation_expression" => short_name(name.text) == type_name,
        "method_invocation" => node.qualifier.is_none() && name.text == type_name,
        _ => false,
    };
    if !is_construction {
        return None;
    }

    let args = node.arguments.as_deref()?;
    if !(2..=3).contains(&args.len()) {
        return None;
    }
    let x = numeric_argument(node, args[0])?;
    let y = numeric_argument(node, args[1])?;

    // Qualified types keep their package prefix.
    let segment = name.text.rsplit('.').next().unwrap_or(name.text);
    let type_span = Span::new(name.span.end - segment.len(), name.span.end);

    Some(PoseMatch {
        node,
        type_span,
        x: (args[0], x),
        y: (args[1], y),
    })
}

fn numeric_argument(call: &SyntaxNode<'_>, span: Span) -> Option<f64> {
    call.children
        .iter()
        .find(|c| c.span == span)
        .and_then(|c| c.numeric_value())
}

/// Forward: collapses `Math.toRadians(<deg>)`. Inverse: wraps bare radian
/// literals as `Math.toRadians(<deg>)`.
pub struct AngleRule {
    pub direction: Direction,
}

impl Rule for AngleRule {
    fn id(&self) -> RuleId {
        match self.direction {
            Direction::Forward => RuleId::CollapseDegreesToRadians,
            Direction::Inverse => RuleId::WrapRadiansAsDegrees,
        }
    }

    fn scope(&self) -> Scope {
        Scope::Document
    }

    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        match self.direction {
            Direction::Forward => self.collapse(ctx),
            Direction::Inverse => self.wrap(ctx),
        }
    }
}

impl AngleRule {
    fn collapse(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        ctx.view
            .nodes()
            .filter(|node| ctx.in_selection(node.span) && is_to_radians(node))
            .filter_map(|node| {
                let [arg] = node.arguments.as_deref()? else {
                    return None;
                };
                let degrees = numeric_argument(node, *arg)?;
                let radians = format_number(Angle::degrees(degrees).to_unit(AngleUnit::Radians).value);

                let fix = Fix::single("Collapse Math.toRadians", Edit::replace(node.span, radians.clone()));
                Some(
                    Finding::new(
                        self.id(),
                        ctx.document,
                        node.span,
                        format!("{} -> {}", node.text, radians),
                    )
                    .with_fix(Some(fix)),
                )
            })
            .collect()
    }

    fn wrap(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        let mut findings = Vec::new();
        for root in ctx.view.roots() {
            root.walk_with_path(&mut |node, path| {
                let Some(radians) = node.numeric_value() else {
                    return;
                };
                let Some(parent) = path.last() else {
                    return;
                };
                if !ctx.in_selection(node.span) || !in_angle_position(node, parent) {
                    return;
                }

                let degrees = format_number(Angle::radians(radians).to_unit(AngleUnit::Degrees).value);
                let replacement = format!("Math.toRadians({})", degrees);
                findings.push(
                    Finding::new(
                        self.id(),
                        ctx.document,
                        node.span,
                        format!("{} -> {}", node.text, replacement),
                    )
                    .with_fix(Some(Fix::single(
                        "Wrap radians in Math.toRadians",
                        Edit::replace(node.span, replacement),
                    ))),
                );
            });
        }
        findings
    }
}

fn is_to_radians(node: &SyntaxNode<'_>) -> bool {
    node.grammar == "method_invocation"
        && node.name_text() == Some(TO_RADIANS)
        && node.qualifier.is_some_and(|q| short_name(q) == "Math")
}

/// A lone literal in parentheses, the only argument of a call that is not
/// already `toRadians`, or the heading of a `Pose2d`.
fn in_angle_position(node: &SyntaxNode<'_>, parent: &SyntaxNode<'_>) -> bool {
    match parent.grammar {
        "parenthesized_expression" => parent.children.len() == 1,
        "method_invocation" | "object_creation_expression" => {
            if parent.name_text() == Some(TO_RADIANS) {
                return false;
            }
            let Some(args) = parent.arguments.as_deref() else {
                return false;
            };
            let heading = parent.grammar == "object_creation_expression"
                && parent
                    .name_text()
                    .is_some_and(|t| short_name(t) == Direction::Inverse.source_type())
                && args.len() == 3
                && args[2] == node.span;
            heading || args == [node.span]
        }
        _ => false,
    }
}
