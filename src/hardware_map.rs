//! Hardware map generation.
//!
//! [`generate_bindings`] binds every unbound hardware field of every OpMode
//! in one fix. [`declare_device`] adds a new device field together with its
//! binding.

use tracing::debug;

use crate::fix::{generate, Edit, Fix, FixError};
use crate::rules::gate::{is_in_scope, short_name};
use crate::rules::hardware::{binding_body, is_hardware_type, unbound_fields};
use crate::syntax::{SourceDocument, Span, SyntaxNode, SyntaxView};

/// Marks the block of bindings written by [`generate_bindings`].
pub const GENERATED_COMMENT: &str = "// Auto-generated HardwareMap";

/// One fix binding every unbound hardware field, or `None` when nothing is
/// missing.
///
/// Bindings go to the top of `runOpMode()` (or `init()`), below a
/// [`GENERATED_COMMENT`] line. Fails with [`FixError::NotApplicable`] when
/// fields are missing but no class has a method to put them in.
pub fn generate_bindings(
    document: &SourceDocument,
    extra_types: &[String],
) -> Result<Option<Fix>, FixError> {
    let view = document.view();
    let mut fixes = Vec::new();
    let mut homeless = Vec::new();

    for class in view.classes() {
        if !is_in_scope(&view, class) {
            continue;
        }
        let fields = unbound_fields(&view, class, extra_types);
        if fields.is_empty() {
            continue;
        }
        let Some(body) = binding_body(&view, class) else {
            homeless.extend(fields.iter().map(|f| f.name.text.to_string()));
            continue;
        };

        let lines: Vec<String> = std::iter::once(GENERATED_COMMENT.to_string())
            .chain(fields.iter().map(|f| f.binding()))
            .collect();
        debug!(
            class = class.name_text().unwrap_or_default(),
            fields = fields.len(),
            "generating hardware bindings"
        );
        fixes.push(generate::insert_first_statements(
            document,
            body,
            &lines,
            "Generate HardwareMap",
        )?);
    }

    if fixes.is_empty() {
        if homeless.is_empty() {
            return Ok(None);
        }
        return Err(FixError::NotApplicable(format!(
            "no runOpMode() or init() to bind {} in",
            homeless.join(", ")
        )));
    }
    Fix::merge("Generate HardwareMap", &fixes).map(Some)
}

/// A device to declare with [`declare_device`].
#[derive(Debug, Clone, Copy)]
pub struct DeviceSpec<'a> {
    /// Device type, e.g. `DcMotor`.
    pub device: &'a str,
    /// Field name.
    pub name: &'a str,
    /// Name in the robot configuration; defaults to the field name.
    pub config_name: Option<&'a str>,
}

impl DeviceSpec<'_> {
    fn binding(&self) -> String {
        format!(
            "{} = hardwareMap.get({}.class, \"{}\");",
            self.name,
            short_name(self.device),
            self.config_name.unwrap_or(self.name)
        )
    }
}

/// Declare a device field at the top of the first OpMode class and bind it
/// in its `runOpMode()` (or `init()`).
pub fn declare_device(
    document: &SourceDocument,
    spec: &DeviceSpec<'_>,
    extra_types: &[String],
) -> Result<Fix, FixError> {
    if !is_hardware_type(spec.device, extra_types) {
        return Err(FixError::NotApplicable(format!(
            "{} is not a known hardware type",
            spec.device
        )));
    }

    let view = document.view();
    let class = target_class(&view)
        .ok_or_else(|| FixError::NotApplicable("no class to add the device to".to_string()))?;

    let declared = view
        .fields(class)
        .iter()
        .flat_map(|f| f.declarators.iter())
        .any(|d| d.name.text == spec.name);
    if declared {
        return Err(FixError::NotApplicable(format!(
            "field '{}' is already declared",
            spec.name
        )));
    }

    let body = binding_body(&view, class).ok_or_else(|| {
        FixError::NotApplicable(format!(
            "no runOpMode() or init() to bind '{}' in",
            spec.name
        ))
    })?;

    let open = class_body_open(document, class)?;
    let indent = format!("{}    ", document.line_indent(class.span.start));
    let field = Fix::single(
        "Declare device",
        Edit::insert(open + 1, format!("\n{}{} {};", indent, spec.device, spec.name)),
    );
    let binding = generate::insert_first_statement(document, body, &spec.binding(), "Bind device")?;

    Fix::merge(format!("Add {} {}", spec.device, spec.name), [&field, &binding])
}

fn target_class<'a, 'src>(view: &'a SyntaxView<'src>) -> Option<&'a SyntaxNode<'src>> {
    let classes = view.classes();
    classes
        .iter()
        .find(|c| is_in_scope(view, c))
        .or_else(|| classes.first())
        .copied()
}

/// Offset of the `{` opening the class body.
fn class_body_open(document: &SourceDocument, class: &SyntaxNode<'_>) -> Result<usize, FixError> {
    let after_name = class.name.map_or(class.span.start, |n| n.span.end);
    document
        .slice(Span::new(after_name, class.span.end))
        .and_then(|rest| rest.find('{'))
        .map(|i| after_name + i)
        .ok_or_else(|| FixError::NotApplicable("class body not found".to_string()))
}
