//! Hardware fields never bound through `hardwareMap.get`.

use phf::phf_set;

use super::calls::HARDWARE_MAP_GET;
use super::gate::short_name;
use super::start_signal::ENTRY_METHOD;
use super::{Finding, Rule, RuleContext, RuleId, Scope};
use crate::fix::generate;
use crate::syntax::{Ident, SyntaxNode, SyntaxView};

/// Device types that must be looked up in the hardware map.
pub static HARDWARE_TYPES: phf::Set<&'static str> = phf_set! {
    "DcMotor",
    "DcMotorEx",
    "Servo",
    "CRServo",
    "IMU",
    "BNO055IMU",
    "ColorSensor",
    "DistanceSensor",
};

/// Fallback when a class has no `runOpMode()`.
pub const INIT_METHOD: &str = "init";

/// A hardware field declarator lacking a binding.
#[derive(Debug, Clone, Copy)]
pub struct UnboundField<'src> {
    pub name: Ident<'src>,
    /// Short device type name (`DcMotor`).
    pub device: &'src str,
}

impl UnboundField<'_> {
    /// `left = hardwareMap.get(DcMotor.class, "left");`
    pub fn binding(&self) -> String {
        format!(
            "{name} = hardwareMap.get({device}.class, \"{name}\");",
            name = self.name.text,
            device = self.device
        )
    }
}

/// Whether `type_name` is a known device type or one of `extra`.
pub fn is_hardware_type(type_name: &str, extra: &[String]) -> bool {
    let name = short_name(type_name);
    HARDWARE_TYPES.contains(name) || extra.iter().any(|e| e == name)
}

/// Hardware fields of `class` with neither an initializer nor an assignment
/// from `hardwareMap.get` anywhere in the class.
pub fn unbound_fields<'a, 'src>(
    view: &SyntaxView<'src>,
    class: &'a SyntaxNode<'src>,
    extra: &[String],
) -> Vec<UnboundField<'src>> {
    let assigned: Vec<&str> = class
        .descendants()
        .filter(|n| n.grammar == "assignment_expression" && HARDWARE_MAP_GET.occurs_in(n))
        .filter_map(|n| n.name_text())
        .map(|target| target.strip_prefix("this.").unwrap_or(target).trim())
        .collect();

    let mut unbound = Vec::new();
    for field in view.fields(class) {
        let Some(type_name) = field.qualifier else {
            continue;
        };
        if !is_hardware_type(type_name, extra) {
            continue;
        }
        for declarator in &field.declarators {
            let initialized = field
                .descendants()
                .any(|n| declarator.span.contains(n.span) && HARDWARE_MAP_GET.matches(n));
            if initialized || assigned.contains(&declarator.name.text) {
                continue;
            }
            unbound.push(UnboundField {
                name: declarator.name,
                device: short_name(type_name),
            });
        }
    }
    unbound
}

/// Body where bindings go: `runOpMode()`, else `init()`.
pub fn binding_body<'a, 'src>(
    view: &SyntaxView<'src>,
    class: &'a SyntaxNode<'src>,
) -> Option<&'a SyntaxNode<'src>> {
    [ENTRY_METHOD, INIT_METHOD]
        .iter()
        .find_map(|name| view.find_method(class, name).and_then(|m| view.body(m)))
}

pub struct UninitializedHardwareField {
    extra_types: Vec<String>,
}

impl UninitializedHardwareField {
    pub fn new(extra_types: Vec<String>) -> Self {
        Self { extra_types }
    }
}

impl Rule for UninitializedHardwareField {
    fn id(&self) -> RuleId {
        RuleId::UninitializedHardwareField
    }

    fn scope(&self) -> Scope {
        Scope::Gated
    }

    fn check(&self, ctx: &RuleContext<'_, '_>) -> Vec<Finding> {
        let Some(class) = ctx.class else {
            return Vec::new();
        };

        let body = binding_body(ctx.view, class);
        unbound_fields(ctx.view, class, &self.extra_types)
            .into_iter()
            .map(|field| {
                let fix = body.and_then(|body| {
                    generate::insert_first_statement(
                        ctx.document,
                        body,
                        &field.binding(),
                        &format!("Bind {} from hardwareMap", field.name.text),
                    )
                    .ok()
                });
                Finding::new(
                    self.id(),
                    ctx.document,
                    field.name.span,
                    format!(
                        "{} field '{}' is never assigned from hardwareMap.get()",
                        field.device, field.name.text
                    ),
                )
                .with_fix(fix)
            })
            .collect()
    }
}
