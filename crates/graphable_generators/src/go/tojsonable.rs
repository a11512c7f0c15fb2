//! Emission of `to_jsonable.go` serializing the object graph to JSONables.

use std::collections::BTreeSet;

use graphable_core::indention::reindent;
use graphable_core::{Go, Graph, Property, ValueType, naming};
use indexmap::IndexMap;

use super::common::{self, WARNING, escaped_str};
use super::timeformat;
use crate::common::{AutoId, indent};

/// Generate the import declaration.
fn imports(graph: &Graph) -> String {
    let mut import_set: BTreeSet<&str> = BTreeSet::new();

    if !graph.classes.is_empty() {
        import_set.insert("fmt");
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        import_set.insert("fmt");
        import_set.insert("strings");
        import_set.insert("time");
    }

    common::import_declarations(&import_set)
}

/// The generated helper rendering durations in the ISO 8601 form.
fn duration_to_string() -> String {
    r#"// durationToString represents the duration as a string in ISO 8601 format.
//
// Since time.Duration stores intervals as nanoseconds and excludes longer
// intervals such as minutes, days or months, durationToString
// infers the integral number of these longer intervals and
// produces a compact representation.
func durationToString(d time.Duration) string {
    parts := make([]string, 0, 7)

    ////
    // Interprete
    ////

    sign := 1
    if d < 0 {
        d = -d
        sign = -1
    }

    days := d / (24 * time.Hour)
    rest := d % (24 * time.Hour)

    hours := rest / time.Hour
    rest = rest % time.Hour

    minutes := rest / time.Minute
    rest = rest % time.Minute

    seconds := rest / time.Second
    rest = rest % time.Second

    nanoseconds := rest

    ////
    // Represent
    ////

    if sign < 0 {
        parts = append(parts, "-")
    }

    parts = append(parts, "P")

    if days > 0 {
        parts = append(
            parts,
            fmt.Sprintf("%dD", days))
    }

    if hours > 0 || minutes > 0 || seconds > 0 || nanoseconds > 0 {
        parts = append(parts, "T")

        if hours > 0 {
            parts = append(
                parts,
                fmt.Sprintf("%dH", hours))
        }

        if minutes > 0 {
            parts = append(
                parts,
                fmt.Sprintf("%dM", minutes))
        }

        if nanoseconds == 0 {
            if seconds > 0 {
                parts = append(
                    parts,
                    fmt.Sprintf("%dS", seconds))
            }
        } else {
            parts = append(
                parts,
                strings.TrimRight(
                    fmt.Sprintf("%d.%09d", seconds, nanoseconds),
                    "0"))
            parts = append(parts, "S")
        }
    }

    return strings.Join(parts, "")
}"#
    .to_string()
}

/// Generate the code serializing `value_expr` into `target_expr`.
fn serialize_value(
    target_expr: &str,
    value_expr: &str,
    value_type: &ValueType,
    auto_id: &mut AutoId,
) -> String {
    match value_type {
        ValueType::Boolean
        | ValueType::Integer { .. }
        | ValueType::Float { .. }
        | ValueType::String { .. }
        | ValueType::Path { .. } => format!("{target_expr} = {value_expr}"),
        ValueType::Date { format }
        | ValueType::Time { format }
        | ValueType::Datetime { format } => format!(
            "{target_expr} = {value_expr}.Format(\n    {})",
            escaped_str(&timeformat::convert(format))
        ),
        ValueType::TimeZone => format!("{target_expr} = {value_expr}.String()"),
        ValueType::Duration => {
            format!("{target_expr} = durationToString(\n    {value_expr})")
        }
        ValueType::Array { values, .. } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target{uid}[i{uid}]"),
                &format!("slice{uid}[i{uid}]"),
                values,
                auto_id,
            );

            format!(
                r#"count{uid} := len({value_expr})
slice{uid} := {value_expr}
target{uid} := make([]interface{{}}, count{uid})
for i{uid} := 0; i{uid} < count{uid}; i{uid}++ {{
{item_serialization}
}}
{target_expr} = target{uid}"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        ValueType::Map { values } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target{uid}[k{uid}]"),
                &format!("v{uid}"),
                values,
                auto_id,
            );

            format!(
                r#"target{uid} := make(map[string]interface{{}})
map{uid} := {value_expr}
for k{uid}, v{uid} := range map{uid} {{
{item_serialization}
}}
{target_expr} = target{uid}"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        ValueType::ClassRef { .. } => format!("{target_expr} = {value_expr}.ID"),
        ValueType::EmbedRef { name } => format!(
            "{target_expr} = {}ToJSONable(\n    &{value_expr})",
            naming::upper_camel(name)
        ),
    }
}

/// Generate the code serializing one property of a composite.
fn serialize_property(
    target_expr: &str,
    value_expr: &str,
    property: &Property,
    auto_id: &mut AutoId,
) -> String {
    let field = naming::upper_camel(&property.name);
    let mut code = format!("////\n// Serialize {field}\n////\n\n");

    if property.optional {
        // Optional non-pointer fields are stored behind a pointer and
        // need a dereference before serialization.
        let value_expr = if common::is_pointer_type(&property.value_type) {
            value_expr.to_string()
        } else {
            format!("(*{value_expr})")
        };

        let serialization =
            serialize_value(target_expr, &value_expr, &property.value_type, auto_id);

        code.push_str(&format!(
            "if instance.{field} != nil {{\n{}\n}}",
            indent(&serialization, 1)
        ));
    } else {
        code.push_str(&serialize_value(
            target_expr,
            value_expr,
            &property.value_type,
            auto_id,
        ));
    }

    code
}

/// Render the serializations of all the properties of a composite.
fn serialize_properties_body(
    properties: &IndexMap<String, Property>,
    instance_expr: &str,
) -> String {
    let mut auto_id = AutoId::new();
    let mut body = String::new();

    for property in properties.values() {
        let serialization = serialize_property(
            &format!("target[{}]", escaped_str(&property.json)),
            &format!("{instance_expr}.{}", naming::upper_camel(&property.name)),
            property,
            &mut auto_id,
        );

        body.push('\n');
        body.push_str(&indent(&serialization, 1));
        body.push('\n');
    }

    body
}

/// Generate the function serializing a class or an embeddable structure.
fn serialize_class_or_embed(
    name: &str,
    properties: &IndexMap<String, Property>,
) -> String {
    let composite = naming::upper_camel(name);

    let mut code = format!(
        r#"// {composite}ToJSONable converts the instance to
// a JSONable representation.
//
// {composite}ToJSONable requires:
//  * instance != nil
//
// {composite}ToJSONable ensures:
//  * target != nil
func {composite}ToJSONable(
    instance *{composite}) (
    target map[string]interface{{}}) {{

    if instance == nil {{
        panic("unexpected nil instance")
    }}

    target = make(map[string]interface{{}})
"#
    );
    code.push_str(&serialize_properties_body(properties, "instance"));
    code.push_str("\n    return\n}");

    code
}

/// Generate the function serializing the object graph.
fn serialize_graph(graph: &Graph) -> String {
    let composite = naming::upper_camel(&graph.name);

    let mut code = format!(
        r#"// {composite}ToJSONable converts the instance to a JSONable representation.
//
// {composite}ToJSONable requires:
//  * instance != nil
//
// {composite}ToJSONable ensures:
//  * (err == nil && target != nil) || (err != nil && target == nil)
func {composite}ToJSONable(
    instance *{composite}) (
    target map[string]interface{{}}, err error) {{

    if instance == nil {{
        panic("unexpected nil instance")
    }}

    target = make(map[string]interface{{}})
    defer func() {{
        if err != nil {{
            target = nil
        }}
    }}()
"#
    );

    code.push_str(&serialize_properties_body(&graph.properties, "instance"));

    for cls in graph.classes.values() {
        let plural_field = naming::upper_camel(&cls.plural);
        let class_composite = naming::upper_camel(&cls.name);
        let class_variable = naming::lower_camel(&cls.name);
        let json_plural =
            graphable_core::naming::json_plural(&cls.plural);
        let mismatch_literal = escaped_str(&format!(
            "expected the instance of {class_composite} to have the ID %s \
             according to the registry, but got: %s"
        ));

        let block = format!(
            r#"////
// Serialize instance registry of {class_composite}
////

if len(instance.{plural_field}) > 0 {{
    target{plural_field} := make(map[string]interface{{}})
    for id := range instance.{plural_field} {{
        {class_variable}Instance := instance.{plural_field}[id]

        if id != {class_variable}Instance.ID {{
            err = fmt.Errorf(
                {mismatch_literal},
                id, {class_variable}Instance.ID)
            return
        }}

        target{plural_field}[id] = {class_composite}ToJSONable(
            {class_variable}Instance)
    }}

    target[{json_plural_literal}] = target{plural_field}
}}"#,
            json_plural_literal = escaped_str(&json_plural),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    code.push_str("\n    return\n}");

    code
}

/// Generate the source file serializing the object graph to a JSONable.
pub(crate) fn generate(graph: &Graph, go: &Go) -> String {
    let mut blocks = vec![format!("package {}", go.package), WARNING.to_string()];

    let import_block = imports(graph);
    if !import_block.is_empty() {
        blocks.push(import_block);
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(duration_to_string());
    }

    for cls in graph.classes.values() {
        blocks.push(serialize_class_or_embed(&cls.name, &cls.properties));
    }

    for embed in graph.embeds.values() {
        blocks.push(serialize_class_or_embed(&embed.name, &embed.properties));
    }

    blocks.push(serialize_graph(graph));

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, "\t")
}
