//! Emission of `tojsonable.py` serializing the object graph to JSONables.

use graphable_core::indention::reindent;
use graphable_core::{Graph, Property, Py, PyPathAs, PyTimezoneAs, ValueType};
use indexmap::IndexMap;

use super::common::{WARNING, docstring, string_literal};
use super::naming;
use crate::common::{AutoId, indent};

/// Generate the import statements.
fn imports(graph: &Graph, py: &Py) -> String {
    let mut stdlib_block = vec!["import typing", "import collections"];

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        stdlib_block.push("import datetime");
    }

    stdlib_block.sort_unstable();

    format!(
        "{}\n\nimport {}",
        stdlib_block.join("\n"),
        py.module_name
    )
}

/// The generated helper rendering `timedelta`s in the ISO 8601 form.
///
/// Trailing zeros of the fractional seconds are trimmed so that the
/// serialization is compact and round-trips to the same duration.
fn duration_to_string() -> String {
    r#"_ZERO_TIMEDELTA = datetime.timedelta(0)


def _duration_to_string(
        duration: datetime.timedelta) -> str:
    """
    serializes the duration to a string in ISO 8601 format.

    Since ``datetime.timedelta`` stores intervals only up to days and
    excludes longer intervals such as weeks, months and years,
    the serialized representation defines the duration only
    in terms of days and shorter intervals.

    :param duration: duration to be serialized
    :return: text representation

    >>> _duration_to_string(
    ...     datetime.timedelta(days=1, hours=2, minutes=3,
    ...     seconds=4, microseconds=5))
    'P1DT2H3M4.000005S'

    >>> _duration_to_string(
    ...     datetime.timedelta(seconds=1))
    'PT1S'

    >>> _duration_to_string(
    ...     -datetime.timedelta(days=1))
    '-P1D'
    """
    parts = []  # type: typing.List[str]

    absduration = duration
    if duration < _ZERO_TIMEDELTA:
        parts.append('-')
        absduration = -duration

    parts.append('P')
    if absduration.days > 0:
        parts.append('{}D'.format(absduration.days))

    if absduration.seconds > 0 or absduration.microseconds > 0:
        parts.append('T')

        rest = absduration.seconds
        hours = rest // 3600
        rest = rest % 3600

        minutes = rest // 60
        seconds = rest % 60

        if hours > 0:
            parts.append('{}H'.format(hours))

        if minutes > 0:
            parts.append('{}M'.format(minutes))

        if seconds > 0 or absduration.microseconds > 0:
            if absduration.microseconds > 0:
                fraction = '{:.6f}'.format(
                    seconds + absduration.microseconds / 1e6).rstrip('0')
                parts.append('{}S'.format(fraction))
            else:
                parts.append('{}S'.format(seconds))

    if len(parts) == 1 or (len(parts) == 2 and parts[0] == '-'):
        parts.append('T0S')

    return ''.join(parts)"#
        .to_string()
}

/// Generate the expression serializing the given value, if the type has a
/// direct expression form.
///
/// Arrays and maps serialize through loops, so they return `None` here
/// and are handled by [`serialize_value`].
fn serialization_expr(value_expr: &str, value_type: &ValueType, py: &Py) -> Option<String> {
    match value_type {
        ValueType::Boolean
        | ValueType::Integer { .. }
        | ValueType::Float { .. }
        | ValueType::String { .. } => Some(value_expr.to_string()),
        ValueType::Path { .. } => match py.path_as {
            PyPathAs::Str => Some(value_expr.to_string()),
            PyPathAs::PathlibPath => Some(format!("str({value_expr})")),
        },
        ValueType::Date { format }
        | ValueType::Time { format }
        | ValueType::Datetime { format } => Some(format!(
            "{value_expr}.strftime({})",
            string_literal(format)
        )),
        ValueType::TimeZone => match py.timezone_as {
            PyTimezoneAs::Str => Some(value_expr.to_string()),
            PyTimezoneAs::PytzTimezone => Some(format!("str({value_expr})")),
        },
        ValueType::Duration => Some(format!("_duration_to_string({value_expr})")),
        ValueType::Array { .. } | ValueType::Map { .. } => None,
        ValueType::ClassRef { .. } => Some(format!("{value_expr}.id")),
        ValueType::EmbedRef { name } => Some(format!(
            "serialize_{}({value_expr})",
            naming::as_variable(name)
        )),
    }
}

/// Generate the code serializing `value_expr` into `target_expr`.
fn serialize_value(
    target_expr: &str,
    value_expr: &str,
    value_type: &ValueType,
    auto_id: &mut AutoId,
    py: &Py,
) -> String {
    if let Some(expression) = serialization_expr(value_expr, value_type, py) {
        return format!("{target_expr} = {expression}");
    }

    match value_type {
        ValueType::Array { values, .. } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target_item_{uid}"),
                &format!("item_{uid}"),
                values,
                auto_id,
                py,
            );

            format!(
                r#"target_{uid} = []  # type: typing.List[typing.Any]
for item_{uid} in {value_expr}:
{item_serialization}
    target_{uid}.append(target_item_{uid})
{target_expr} = target_{uid}"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        ValueType::Map { values } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target_item_{uid}"),
                &format!("value_{uid}"),
                values,
                auto_id,
                py,
            );

            format!(
                r#"if isinstance({value_expr}, collections.OrderedDict):
    target_{uid} = (
        collections.OrderedDict()
    )  # type: typing.MutableMapping[str, typing.Any]
else:
    target_{uid} = dict()

for key_{uid}, value_{uid} in {value_expr}.items():
{item_serialization}
    target_{uid}[key_{uid}] = target_item_{uid}
{target_expr} = target_{uid}"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        _ => unreachable!("Unhandled serialization of a type with an expression form"),
    }
}

/// Generate the code serializing one property of a composite.
fn serialize_property(
    target_expr: &str,
    value_expr: &str,
    property: &Property,
    auto_id: &mut AutoId,
    py: &Py,
) -> String {
    let serialization =
        serialize_value(target_expr, value_expr, &property.value_type, auto_id, py);

    let attribute = naming::as_attribute(&property.name);
    let mut code = format!("##\n# Serialize {attribute}\n##\n\n");

    if property.optional {
        code.push_str(&format!("if {value_expr} is not None:\n"));
        code.push_str(&indent(&serialization, 1));
    } else {
        code.push_str(&serialization);
    }

    code
}

/// Render the shared body of a composite serializer.
fn serialize_properties_body(
    properties: &IndexMap<String, Property>,
    py: &Py,
) -> String {
    let mut auto_id = AutoId::new();
    let mut body = String::new();

    for property in properties.values() {
        let serialization = serialize_property(
            &format!("target[{}]", string_literal(&property.json)),
            &format!("instance.{}", naming::as_attribute(&property.name)),
            property,
            &mut auto_id,
            py,
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
    py: &Py,
) -> String {
    let variable = naming::as_variable(name);
    let composite = naming::as_composite(name);
    let module = &py.module_name;

    let doctext = format!(
        "serializes an instance of {composite} to a JSONable representation.\n\n\
         :param instance: the instance of {composite} to be serialized\n\
         :param ordered:\n    \
         If set, represents the instance as a ``collections.OrderedDict``.\n    \
         Otherwise, it is represented as a ``dict``.\n\
         :return: a JSONable"
    );

    let mut code = format!(
        "def serialize_{variable}(\n        instance: {module}.{composite},\n        ordered: bool = False\n) -> typing.MutableMapping[str, typing.Any]:\n"
    );
    code.push_str(&indent(&docstring(&doctext), 1));
    code.push('\n');
    code.push_str(
        "    if ordered:\n        target = (\n            collections.OrderedDict()\n        )  # type: typing.MutableMapping[str, typing.Any]\n    else:\n        target = dict()\n",
    );
    code.push_str(&serialize_properties_body(properties, py));
    code.push_str("\n    return target");

    code
}

/// Generate the function serializing the object graph.
///
/// Every class registry is emitted as a nested object keyed by the JSON
/// plural of the class; an instance whose in-registry key differs from its
/// own id is a fatal error.
fn serialize_graph(graph: &Graph, py: &Py) -> String {
    let variable = naming::as_variable(&graph.name);
    let composite = naming::as_composite(&graph.name);
    let module = &py.module_name;

    let registries_doc = if graph.classes.is_empty() {
        "If set, represents the instance properties as a ``collections.OrderedDict``."
    } else {
        "If set, represents the instance properties and class registries\n    \
         as a ``collections.OrderedDict``."
    };

    let doctext = format!(
        "serializes an instance of {composite} to a JSONable.\n\n\
         :param instance: the instance of {composite} to be serialized\n\
         :param ordered:\n    {registries_doc}\n    \
         Otherwise, they are represented as a ``dict``.\n\
         :return: JSONable representation"
    );

    let mut code = format!(
        "def serialize_{variable}(\n        instance: {module}.{composite},\n        ordered: bool = False\n) -> typing.MutableMapping[str, typing.Any]:\n"
    );
    code.push_str(&indent(&docstring(&doctext), 1));
    code.push('\n');
    code.push_str(
        "    if ordered:\n        target = (\n            collections.OrderedDict()\n        )  # type: typing.MutableMapping[str, typing.Any]\n    else:\n        target = dict()\n",
    );
    code.push_str(&serialize_properties_body(&graph.properties, py));

    for cls in graph.classes.values() {
        let class_variable = naming::as_variable(&cls.name);
        let plural_variable = naming::as_variable(&cls.plural);
        let plural_attribute = naming::as_attribute(&cls.plural);
        let json_plural =
            string_literal(&graphable_core::naming::json_plural(&cls.plural));
        let mismatch_message = string_literal(&format!(
            "Expected ID {{!r}} of the instance of {}, but got: {{!r}}",
            naming::as_composite(&cls.name)
        ));

        let block = format!(
            r#"##
# Serialize instance registry of {class_composite}
##

if len(instance.{plural_attribute}) > 0:
    if ordered:
        target_{plural_variable} = (
            collections.OrderedDict()
        )  # type: typing.MutableMapping[str, typing.Any]
    else:
        target_{plural_variable} = dict()

    for id, {class_variable}_instance in instance.{plural_attribute}.items():
        if id != {class_variable}_instance.id:
            raise ValueError(
                {mismatch_message}.format(
                    id, {class_variable}_instance.id))

        target_{plural_variable}[id] = serialize_{class_variable}(
            instance={class_variable}_instance,
            ordered=ordered)

    target[{json_plural}] = target_{plural_variable}"#,
            class_composite = naming::as_composite(&cls.name),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    code.push_str("\n    return target");

    code
}

/// Generate the source file serializing the object graph to a JSONable.
pub(crate) fn generate(graph: &Graph, py: &Py) -> String {
    let mut blocks = vec![
        WARNING.to_string(),
        docstring("serializes to JSONable objects."),
        imports(graph, py),
    ];

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(duration_to_string());
    }

    for cls in graph.classes.values() {
        blocks.push(serialize_class_or_embed(&cls.name, &cls.properties, py));
    }

    for embed in graph.embeds.values() {
        blocks.push(serialize_class_or_embed(&embed.name, &embed.properties, py));
    }

    blocks.push(serialize_graph(graph, py));

    reindent(&(blocks.join("\n\n\n") + "\n"), 0, &py.indention)
}
