//! Emission of `fromjsonable.py` parsing the object graph from JSONables.

use std::collections::BTreeMap;

use graphable_core::indention::reindent;
use graphable_core::schema::referenced_classes;
use graphable_core::{Class, Embed, Graph, Property, Py, PyPathAs, PyTimezoneAs, ValueType};

use super::common::{self, WARNING, docstring, string_literal};
use super::{expr, naming};
use crate::common::{AutoId, indent};

/// Generate the import statements.
fn imports(graph: &Graph, py: &Py) -> String {
    let mut stdlib_block = vec!["import typing"];
    let mut third_party_block: Vec<&str> = Vec::new();

    if graph.has_type(|t| matches!(t, ValueType::Path { .. }))
        && py.path_as == PyPathAs::PathlibPath
    {
        stdlib_block.push("import pathlib");
    }

    if graph.has_type(|t| matches!(t, ValueType::TimeZone))
        && py.timezone_as == PyTimezoneAs::PytzTimezone
    {
        third_party_block.push("import pytz");
        third_party_block.push("import pytz.exceptions  # type: ignore");
    }

    if graph.has_type(|t| {
        matches!(
            t,
            ValueType::Date { .. }
                | ValueType::Time { .. }
                | ValueType::Datetime { .. }
                | ValueType::Duration
        )
    }) {
        stdlib_block.push("import datetime");
    }

    if graph.has_type(|t| matches!(t, ValueType::Map { .. })) || !graph.classes.is_empty()
    {
        stdlib_block.push("import collections");
    }

    let needs_re = graph.has_type(|t| {
        matches!(
            t,
            ValueType::String { pattern: Some(_) }
                | ValueType::Path { pattern: Some(_) }
                | ValueType::Duration
        )
    }) || graph.classes.values().any(|cls| cls.id_pattern.is_some());

    if needs_re {
        stdlib_block.push("import re");
    }

    let first_party_block = vec![
        format!("import {}", py.module_name),
        format!("import {}.parse", py.module_name),
    ];

    stdlib_block.sort_unstable();
    stdlib_block.dedup();
    third_party_block.sort_unstable();

    let mut blocks = vec![stdlib_block.join("\n")];
    if !third_party_block.is_empty() {
        blocks.push(third_party_block.join("\n"));
    }
    blocks.push(first_party_block.join("\n"));

    blocks.join("\n\n")
}

/// The generated helper parsing ISO 8601 durations into `timedelta`s.
///
/// `datetime.timedelta` resolves to microseconds, so the fraction of the
/// seconds is capped at six digits for this target.
fn duration_from_string() -> String {
    r#"_DURATION_RE = re.compile(
    r'^(?P<sign>\+|-)?P'
    r'((?P<years>(0|[1-9][0-9]*)(\.[0-9]+)?)Y)?'
    r'((?P<months>(0|[1-9][0-9]*)(\.[0-9]+)?)M)?'
    r'((?P<weeks>(0|[1-9][0-9]*)(\.[0-9]+)?)W)?'
    r'((?P<days>(0|[1-9][0-9]*)(\.[0-9]+)?)D)?'
    r'(T'
    r'((?P<hours>(0|[1-9][0-9]*)(\.[0-9]+)?)H)?'
    r'((?P<minutes>(0|[1-9][0-9]*)(\.[0-9]+)?)M)?'
    r'(((?P<seconds>0|[1-9][0-9]*)(\.(?P<fraction>[0-9]+))?)S)?'
    r')?$')


def _duration_from_string(text: str) -> datetime.timedelta:
    """
    parses the duration from the string in ISO 8601 format.

    Following C++ chrono library, the following units are counted as:

    * years as 365.2425 days (the average length of a Gregorian year),
    * months as 30.436875 days (exactly 1/12 of years) and
    * weeks as 7 days.

    :param text: string to be parsed
    :return: duration
    :raise:
        ValueError if the string could not be parsed,
        ValueError if the fraction precision is higher than microseconds,
        OverflowError if the duration does not fit into datetime.timedelta

    >>> _duration_from_string('P1DT2H3M4.5S')
    datetime.timedelta(days=1, seconds=7384, microseconds=500000)

    >>> _duration_from_string('PT0.000001S')
    datetime.timedelta(microseconds=1)

    >>> _duration_from_string('-P1D')
    datetime.timedelta(days=-1)
    """
    match = _DURATION_RE.match(text)

    if not match:
        raise ValueError(
            'Failed to match the duration: {!r}'.format(
                text))

    sign_grp = match.group('sign')
    if not sign_grp or sign_grp == '+':
        sign = 1
    else:
        sign = -1

    years_grp = match.group('years')
    years = float(years_grp) if years_grp else 0.0

    months_grp = match.group('months')
    months = float(months_grp) if months_grp else 0.0

    weeks_grp = match.group('weeks')
    weeks = float(weeks_grp) if weeks_grp else 0.0

    days_grp = match.group('days')
    days = float(days_grp) if days_grp else 0.0

    hours_grp = match.group('hours')
    hours = float(hours_grp) if hours_grp else 0.0

    minutes_grp = match.group('minutes')
    minutes = float(minutes_grp) if minutes_grp else 0.0

    seconds_grp = match.group('seconds')
    seconds = int(seconds_grp) if seconds_grp else 0

    fraction_grp = match.group('fraction')
    if not fraction_grp:
        microseconds = 0

    elif len(fraction_grp) > 6:
        raise ValueError(
            ('Precision only up to microseconds supported, '
             'but got: {}').format(text))

    else:
        stripped = fraction_grp.lstrip('0')
        if stripped:
            count = int(stripped)
            order = 6 - len(fraction_grp)
            microseconds = count * (10 ** order)
        else:
            microseconds = 0

    try:
        return sign * datetime.timedelta(
            days=years * 365.2425 + months * 30.436875 + weeks * 7 + days,
            seconds=seconds,
            minutes=minutes,
            hours=hours,
            microseconds=microseconds)

    except OverflowError as err:
        raise OverflowError(
            'Creating a timedelta overflowed from: {!r}'.format(
                text)) from err"#
        .to_string()
}

/// Short-circuit the value expression as the bound value if it already is
/// a variable, so that the generated code avoids `variable1 = variable2`.
fn bind_value(value_expr: &str, uid: &str) -> (String, String) {
    if expr::is_variable(value_expr) {
        (String::new(), value_expr.to_string())
    } else {
        (
            format!("value_{uid} = {value_expr}\n"),
            format!("value_{uid}"),
        )
    }
}

/// Render the reference-path expression from its parts.
///
/// `parts_indent` gives the column of the continuation line holding the
/// joined parts, relative to the start of the emitted fragment.
fn ref_join(parts: &[String], parts_indent: usize) -> String {
    if parts.len() == 1 {
        return parts[0].clone();
    }

    format!(
        "'/'.join((\n{}{}))",
        " ".repeat(parts_indent),
        parts.join(", ")
    )
}

/// Render a type-check failure prologue shared by the scalar parsers.
///
/// `expected` names the expected Python type in the error message.
fn type_check(value: &str, ref_parts: &[String], isinstance_expr: &str, expected: &str) -> String {
    format!(
        r#"if not isinstance({value}, {isinstance_expr}):
    errors.add(
        {ref_expr},
        "Expected {expected}, but got: {{}}".format(
            type({value})))
"#,
        ref_expr = ref_join(ref_parts, 12),
    )
}

fn parse_boolean(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "bool", "a bool"));
    code.push_str(&format!("else:\n    {target_expr} = {value}"));

    code
}

/// Render the bound checks of a numeric parser as an if/elif cascade.
fn bound_checks(
    value: &str,
    target_assignment: &str,
    ref_parts: &[String],
    minimum: Option<(String, &str)>,
    maximum: Option<(String, &str)>,
) -> String {
    let mut code = String::new();
    let mut got_condition = false;

    for (bound, op) in [minimum, maximum].into_iter().flatten() {
        let keyword = if got_condition { "elif" } else { "if" };
        let message = string_literal(&format!("Expected {op} {bound}, but got: {{}}"));

        code.push_str(&format!(
            r#"{keyword} not ({value} {op} {bound}):
    errors.add(
        {ref_expr},
        {message}.format(
            {value}))
"#,
            ref_expr = ref_join(ref_parts, 12),
        ));
        got_condition = true;
    }

    code.push_str(&format!("else:\n    {target_assignment}"));

    code
}

#[allow(clippy::too_many_arguments)]
fn parse_integer(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    minimum: Option<i64>,
    exclusive_minimum: bool,
    maximum: Option<i64>,
    exclusive_maximum: bool,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "int", "an integer"));
    code.push_str("else:\n");

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = {value}"));
        return code;
    }

    let checks = bound_checks(
        &value,
        &format!("{target_expr} = {value}"),
        ref_parts,
        minimum.map(|bound| {
            (
                bound.to_string(),
                if exclusive_minimum { ">" } else { ">=" },
            )
        }),
        maximum.map(|bound| {
            (
                bound.to_string(),
                if exclusive_maximum { "<" } else { "<=" },
            )
        }),
    );
    code.push_str(&indent(&checks, 1));

    code
}

#[allow(clippy::too_many_arguments)]
fn parse_float(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    minimum: Option<f64>,
    exclusive_minimum: bool,
    maximum: Option<f64>,
    exclusive_maximum: bool,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "(int, float)", "a number"));
    code.push_str("else:\n");

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = float({value})"));
        return code;
    }

    let checks = bound_checks(
        &value,
        &format!("{target_expr} = float({value})"),
        ref_parts,
        minimum.map(|bound| {
            (
                bound.to_string(),
                if exclusive_minimum { ">" } else { ">=" },
            )
        }),
        maximum.map(|bound| {
            (
                bound.to_string(),
                if exclusive_maximum { "<" } else { "<=" },
            )
        }),
    );
    code.push_str(&indent(&checks, 1));

    code
}

/// Render the pattern guard around the given target assignment.
fn pattern_guard(
    value: &str,
    pattern: &str,
    set_target: &str,
    ref_parts: &[String],
) -> String {
    let message = string_literal(&format!("Expected to match {pattern}, but got: {{}}"));

    format!(
        r#"if not re.match(
        r'{pattern}',
        {value}):
    errors.add(
        {ref_expr},
        {message}.format(
            {value}))
else:
{set_target}"#,
        ref_expr = ref_join(ref_parts, 12),
        set_target = indent(set_target, 1),
    )
}

fn parse_string(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    pattern: Option<&str>,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a string"));
    code.push_str("else:\n");

    let set_target = format!("{target_expr} = {value}");
    match pattern {
        None => code.push_str(&indent(&set_target, 1)),
        Some(pattern) => code.push_str(&indent(
            &pattern_guard(&value, pattern, &set_target, ref_parts),
            1,
        )),
    }

    code
}

fn parse_path(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    pattern: Option<&str>,
    auto_id: &mut AutoId,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let set_target = match py.path_as {
        PyPathAs::Str => format!("{target_expr} = {value}"),
        PyPathAs::PathlibPath => {
            format!("{target_expr} = pathlib.Path(\n    {value})")
        }
    };

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a string"));
    code.push_str("else:\n");

    match pattern {
        None => code.push_str(&indent(&set_target, 1)),
        Some(pattern) => code.push_str(&indent(
            &pattern_guard(&value, pattern, &set_target, ref_parts),
            1,
        )),
    }

    code
}

/// Which temporal value a strptime-based parser produces.
enum Strptime {
    Date,
    Time,
    Datetime,
}

fn parse_strptime(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    format: &str,
    which: Strptime,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let strptime = match which {
        Strptime::Date => format!(
            "{target_expr} = datetime.datetime.strptime(\n    {value},\n    {format_literal}\n).date()",
            format_literal = string_literal(format),
        ),
        Strptime::Time => format!(
            "{target_expr} = datetime.datetime.strptime(\n    {value},\n    {format_literal}\n).time()",
            format_literal = string_literal(format),
        ),
        Strptime::Datetime => format!(
            "{target_expr} = datetime.datetime.strptime(\n    {value},\n    {format_literal})",
            format_literal = string_literal(format),
        ),
    };

    let message = string_literal(&format!("Expected to strptime {format}, but got: {{}}"));

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a string"));
    code.push_str(&format!(
        r#"else:
    try:
{strptime}
    except ValueError:
        errors.add(
            {ref_expr},
            {message}.format(
                {value}))"#,
        strptime = indent(&strptime, 2),
        ref_expr = ref_join(ref_parts, 16),
    ));

    code
}

fn parse_time_zone(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a string"));

    match py.timezone_as {
        PyTimezoneAs::Str => {
            code.push_str(&format!("else:\n    {target_expr} = {value}"));
        }
        PyTimezoneAs::PytzTimezone => {
            code.push_str(&format!(
                r#"else:
    try:
        {target_expr} = pytz.timezone(
            {value})
    except pytz.exceptions.UnknownTimeZoneError:
        errors.add(
            {ref_expr},
            "Expected a valid IANA time zone, but got: {{}}".format(
                {value}))"#,
                ref_expr = ref_join(ref_parts, 16),
            ));
        }
    }

    code
}

fn parse_duration(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a string"));
    code.push_str(&format!(
        r#"else:
    try:
        {target_expr} = _duration_from_string(
            {value})
    except (ValueError, OverflowError) as err:
        errors.add(
            {ref_expr},
            str(err))"#,
        ref_expr = ref_join(ref_parts, 16),
    ));

    code
}

#[allow(clippy::too_many_arguments)]
fn parse_array(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    values: &ValueType,
    minimum_size: Option<usize>,
    maximum_size: Option<usize>,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push(format!("str(i_{uid})"));

    let item_parsing = parse_value(
        &format!("item_{uid}"),
        &format!("target_item_{uid}"),
        &item_ref_parts,
        values,
        registry_exprs,
        auto_id,
        graph,
        py,
    );

    let value_py_type = common::type_repr(values, py);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "list", "a list"));

    if let Some(minimum) = minimum_size {
        code.push_str(&format!(
            r#"elif len({value}) < {minimum}:
    errors.add(
        {ref_expr},
        "Expected a list of minimum size {minimum}, but got size: {{}}".format(
            len({value})))
"#,
            ref_expr = ref_join(ref_parts, 12),
        ));
    }

    if let Some(maximum) = maximum_size {
        code.push_str(&format!(
            r#"elif len({value}) > {maximum}:
    errors.add(
        {ref_expr},
        "Expected a list of maximum size {maximum}, but got size: {{}}".format(
            len({value})))
"#,
            ref_expr = ref_join(ref_parts, 12),
        ));
    }

    let body = format!(
        r#"target_{uid} = (
    []
)  # type: typing.List[{value_py_type}]
for i_{uid}, item_{uid} in enumerate(
        {value}):
    target_item_{uid} = (
        None
    )  # type: typing.Optional[{value_py_type}]
{item_parsing}

    if target_item_{uid} is not None:
        target_{uid}.append(
            target_item_{uid})

    if errors.full():
        break

{target_expr} = target_{uid}"#,
        item_parsing = indent(&item_parsing, 1),
    );

    code.push_str("else:\n");
    code.push_str(&indent(&body, 1));

    code
}

fn parse_map(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    values: &ValueType,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push(format!("repr(key_{uid})"));

    let item_parsing = parse_value(
        &format!("value_{uid}"),
        &format!("target_item_{uid}"),
        &item_ref_parts,
        values,
        registry_exprs,
        auto_id,
        graph,
        py,
    );

    let value_py_type = common::type_repr(values, py);

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "dict", "a dict"));

    let body = format!(
        r#"if isinstance({value}, collections.OrderedDict):
    target_{uid} = (
        collections.OrderedDict()
    )  # type: typing.MutableMapping[str, {value_py_type}]
else:
    target_{uid} = (
        dict()
    )

for key_{uid}, value_{uid} in {value}.items():
    if not isinstance(key_{uid}, str):
        errors.add(
            {ref_expr},
            "Expected the key to be a str, but got: {{}}".format(
                type(key_{uid})))

        if errors.full():
            break
        else:
            continue

    target_item_{uid} = (
        None
    )  # type: typing.Optional[{value_py_type}]
{item_parsing}

    if target_item_{uid} is not None:
        target_{uid}[key_{uid}] = target_item_{uid}

    if errors.full():
        break

{target_expr} = target_{uid}"#,
        ref_expr = ref_join(ref_parts, 16),
        item_parsing = indent(&item_parsing, 1),
    );

    code.push_str("else:\n");
    code.push_str(&indent(&body, 1));

    code
}

fn parse_class_ref(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    class_name: &str,
    registry_expr: &str,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let message = string_literal(&format!(
        "Reference to an instance of class {class_name} not found: {{}}"
    ));

    let mut code = prelude;
    code.push_str(&type_check(&value, ref_parts, "str", "a str"));
    code.push_str(&format!(
        r#"else:
    target_{uid} = {registry_expr}.get(
        {value},
        None)
    if target_{uid} is None:
        errors.add(
            {ref_expr},
            {message}.format(
                {value}))
    else:
        {target_expr} = target_{uid}"#,
        ref_expr = ref_join(ref_parts, 16),
    ));

    code
}

fn parse_embed(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    embed: &Embed,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let variable = naming::as_variable(&embed.name);
    let module = &py.module_name;

    let mut registry_arguments = String::new();
    for reference in referenced_classes(graph, &embed.properties) {
        registry_arguments.push_str(&format!(
            "    {},\n",
            registry_exprs[&reference.name]
        ));
    }

    format!(
        r#"{prelude}target_{uid} = (
    {module}.parse.placeholder_{variable}()
)
_{variable}_from(
    {value},
{registry_arguments}    {ref_expr},
    target_{uid},
    errors)
{target_expr} = target_{uid}"#,
        ref_expr = ref_join(ref_parts, 8),
    )
}

/// Generate the code parsing a JSONable `value_expr` into `target_expr`.
///
/// The dispatch is exhaustive over the value types; each arm emits code
/// which either writes the parsed value into the target or records errors
/// in the in-scope `errors` container, never both.
#[allow(clippy::too_many_arguments)]
fn parse_value(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    value_type: &ValueType,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
    py: &Py,
) -> String {
    match value_type {
        ValueType::Boolean => parse_boolean(value_expr, target_expr, ref_parts, auto_id),
        ValueType::Integer {
            minimum,
            exclusive_minimum,
            maximum,
            exclusive_maximum,
        } => parse_integer(
            value_expr,
            target_expr,
            ref_parts,
            *minimum,
            *exclusive_minimum,
            *maximum,
            *exclusive_maximum,
            auto_id,
        ),
        ValueType::Float {
            minimum,
            exclusive_minimum,
            maximum,
            exclusive_maximum,
        } => parse_float(
            value_expr,
            target_expr,
            ref_parts,
            *minimum,
            *exclusive_minimum,
            *maximum,
            *exclusive_maximum,
            auto_id,
        ),
        ValueType::String { pattern } => parse_string(
            value_expr,
            target_expr,
            ref_parts,
            pattern.as_ref().map(|p| p.as_str()),
            auto_id,
        ),
        ValueType::Path { pattern } => parse_path(
            value_expr,
            target_expr,
            ref_parts,
            pattern.as_ref().map(|p| p.as_str()),
            auto_id,
            py,
        ),
        ValueType::Date { format } => parse_strptime(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Strptime::Date,
            auto_id,
        ),
        ValueType::Time { format } => parse_strptime(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Strptime::Time,
            auto_id,
        ),
        ValueType::Datetime { format } => parse_strptime(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Strptime::Datetime,
            auto_id,
        ),
        ValueType::TimeZone => {
            parse_time_zone(value_expr, target_expr, ref_parts, auto_id, py)
        }
        ValueType::Duration => {
            parse_duration(value_expr, target_expr, ref_parts, auto_id)
        }
        ValueType::Array {
            values,
            minimum_size,
            maximum_size,
        } => parse_array(
            value_expr,
            target_expr,
            ref_parts,
            values,
            *minimum_size,
            *maximum_size,
            registry_exprs,
            auto_id,
            graph,
            py,
        ),
        ValueType::Map { values } => parse_map(
            value_expr,
            target_expr,
            ref_parts,
            values,
            registry_exprs,
            auto_id,
            graph,
            py,
        ),
        ValueType::ClassRef { name } => parse_class_ref(
            value_expr,
            target_expr,
            ref_parts,
            name,
            &registry_exprs[name],
            auto_id,
        ),
        ValueType::EmbedRef { name } => parse_embed(
            value_expr,
            target_expr,
            ref_parts,
            &graph.embeds[name],
            registry_exprs,
            auto_id,
            graph,
            py,
        ),
    }
}

/// Generate the code parsing one property of a composite.
#[allow(clippy::too_many_arguments)]
fn parse_property(
    target_obj_expr: &str,
    value_obj_expr: &str,
    ref_obj_parts: &[String],
    property: &Property,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
    py: &Py,
) -> String {
    let uid = auto_id.next_identifier();

    let attribute = naming::as_attribute(&property.name);
    let target_expr = format!("{target_obj_expr}.{attribute}");

    let mut property_ref_parts = ref_obj_parts.to_vec();
    property_ref_parts.push(string_literal(&property.json));

    let parsing = parse_value(
        &format!("value_{uid}"),
        &target_expr,
        &property_ref_parts,
        &property.value_type,
        registry_exprs,
        auto_id,
        graph,
        py,
    );

    let json_literal = string_literal(&property.json);

    let mut code = format!(
        "##\n# Parse {attribute}\n##\n\nvalue_{uid} = {value_obj_expr}.get(\n    {json_literal},\n    None)\n\n"
    );

    if property.optional {
        code.push_str(&format!("if value_{uid} is not None:\n"));
        code.push_str(&indent(&parsing, 1));
    } else {
        let missing = string_literal(&format!("Property is missing: {}", property.json));
        code.push_str(&format!(
            "if value_{uid} is None:\n    errors.add(\n        {ref_expr},\n        {missing})\nelse:\n",
            ref_expr = ref_join(ref_obj_parts, 12),
        ));
        code.push_str(&indent(&parsing, 1));
    }

    code
}

/// The two kinds of non-graph composites.
enum ClassOrEmbed<'a> {
    Class(&'a Class),
    Embed(&'a Embed),
}

impl<'a> ClassOrEmbed<'a> {
    fn name(&self) -> &'a str {
        match self {
            ClassOrEmbed::Class(cls) => &cls.name,
            ClassOrEmbed::Embed(embed) => &embed.name,
        }
    }

    fn properties(&self) -> &'a indexmap::IndexMap<String, Property> {
        match self {
            ClassOrEmbed::Class(cls) => &cls.properties,
            ClassOrEmbed::Embed(embed) => &embed.properties,
        }
    }
}

/// Generate the pair of functions parsing a class or an embed.
fn parse_composite(composite: &ClassOrEmbed, graph: &Graph, py: &Py) -> String {
    let name = composite.name();
    let properties = composite.properties();
    let is_class = matches!(composite, ClassOrEmbed::Class(_));

    let variable = naming::as_variable(name);
    let composite_name = naming::as_composite(name);
    let module = &py.module_name;

    let references = referenced_classes(graph, properties);
    let registry_exprs: BTreeMap<String, String> = references
        .iter()
        .map(|reference| {
            (
                reference.name.clone(),
                format!("{}_registry", naming::as_variable(&reference.plural)),
            )
        })
        .collect();

    // Signature parameters for the registries of the referenced classes
    let mut registry_parameters = String::new();
    let mut registry_docs = String::new();
    let mut registry_arguments = String::new();
    for reference in &references {
        let registry = format!("{}_registry", naming::as_variable(&reference.plural));
        registry_parameters.push_str(&format!(
            "        {registry}: typing.Mapping[\n            str,\n            {module}.{}],\n",
            naming::as_composite(&reference.name)
        ));
        registry_docs.push_str(&format!(
            "\n:param {registry}: registry of the {} instances",
            naming::as_composite(&reference.name)
        ));
        registry_arguments.push_str(&format!("        {registry}={registry},\n"));
    }

    let mut auto_id = AutoId::new();
    let mut property_parsing = String::new();
    for property in properties.values() {
        let parsing = parse_property(
            "target",
            "value",
            &["ref".to_string()],
            property,
            &registry_exprs,
            &mut auto_id,
            graph,
            py,
        );
        property_parsing.push_str("\n");
        property_parsing.push_str(&indent(&parsing, 1));
        property_parsing.push_str("\n    if errors.full():\n        return\n");
    }

    let inner_doctext = format!(
        "parses {composite_name} from a JSONable value.\n\n\
         If ``errors``, the attributes of ``target`` have undefined values.\n\n\
         :param value: JSONable value{registry_docs}\n\
         :param ref:\n    reference to the value (e.g., a reference path)\n\
         :param target: parsed ``value`` as {composite_name}\n\
         :param errors: errors encountered during parsing\n\
         :return:"
    );

    let mut inner = format!(
        "def _{variable}_from(\n        value: typing.Any,\n{registry_parameters}        ref: str,\n        target: {module}.{composite_name},\n        errors: {module}.parse.Errors\n) -> None:\n"
    );
    inner.push_str(&indent(&docstring(&inner_doctext), 1));
    inner.push('\n');
    inner.push_str(
        "    if not isinstance(value, dict):\n        errors.add(\n            ref,\n            \"Expected a dictionary, but got: {}\".format(\n                type(value)))\n        return\n",
    );
    inner.push_str(&property_parsing);

    let (id_parameter, id_doc, placeholder_call) = if is_class {
        (
            "        id: str,\n",
            "\n:param id: identifier of the instance",
            format!("target = {module}.parse.placeholder_{variable}(id=id)"),
        )
    } else {
        (
            "",
            "",
            format!("target = {module}.parse.placeholder_{variable}()"),
        )
    };

    let outer_doctext = format!(
        "parses {composite_name} from a JSONable value.\n\n\
         :param value: JSONable value{id_doc}{registry_docs}\n\
         :param ref:\n    reference to the value (e.g., a reference path)\n\
         :param errors: errors encountered during parsing\n\
         :return: parsed instance, or None if ``errors``"
    );

    let mut outer = format!(
        "def {variable}_from(\n        value: typing.Any,\n{id_parameter}{registry_parameters}        ref: str,\n        errors: {module}.parse.Errors\n) -> typing.Optional[{module}.{composite_name}]:\n"
    );
    outer.push_str(&indent(&docstring(&outer_doctext), 1));
    outer.push('\n');
    outer.push_str(&format!(
        "    {placeholder_call}\n\n    _{variable}_from(\n        value=value,\n{registry_arguments}        ref=ref,\n        target=target,\n        errors=errors)\n\n    if not errors.empty():\n        return None\n\n    return target"
    ));

    format!("{inner}\n\n{outer}")
}

/// Generate the function parsing the whole object graph.
///
/// The function pre-allocates the registry of every class before any
/// instance is parsed, so that forward references between instances
/// resolve without any ordering constraint on the input.
fn parse_graph(graph: &Graph, py: &Py) -> String {
    let module = &py.module_name;
    let graph_variable = naming::as_variable(&graph.name);
    let graph_composite = naming::as_composite(&graph.name);

    let registry_exprs: BTreeMap<String, String> = graph
        .classes
        .values()
        .map(|cls| {
            (
                cls.name.clone(),
                format!("graph.{}", naming::as_attribute(&cls.plural)),
            )
        })
        .collect();

    let doctext = format!(
        "parses {graph_composite} from a JSONable value.\n\n\
         :param value: JSONable value\n\
         :param ref: reference to the value (e.g., a reference path)\n\
         :param errors: errors encountered during parsing\n\
         :return: parsed {graph_composite}, or None if ``errors``"
    );

    let mut code = format!(
        "def {graph_variable}_from(\n        value: typing.Any,\n        ref: str,\n        errors: {module}.parse.Errors\n) -> typing.Optional[{module}.{graph_composite}]:\n"
    );
    code.push_str(&indent(&docstring(&doctext), 1));
    code.push('\n');
    code.push_str(
        "    if errors.full():\n        return None\n\n    if not isinstance(value, dict):\n        errors.add(\n            ref,\n            \"Expected a dictionary, but got: {}\".format(type(value)))\n        return None\n",
    );
    code.push_str(&format!(
        "\n    graph = {module}.parse.placeholder_{graph_variable}()\n"
    ));

    // Pre-allocate the instance registries
    for cls in graph.classes.values() {
        let plural_attribute = naming::as_attribute(&cls.plural);
        let class_variable = naming::as_variable(&cls.name);
        let json_plural = string_literal(&graphable_core::naming::json_plural(&cls.plural));

        let placeholder_assignment = format!(
            "graph.{plural_attribute}[id] = {module}.parse.placeholder_{class_variable}(id=id)"
        );

        let id_loop_body = match &cls.id_pattern {
            Some(id_pattern) => {
                let message = string_literal(&format!(
                    "Expected ID to match {}, but got: ",
                    id_pattern.as_str()
                ));
                format!(
                    r#"if not re.match(
        r'{pattern}',
        id):
    errors.add(
        '/'.join((
            ref, {json_plural})),
        {message} + id)

    if errors.full():
        break
else:
    {placeholder_assignment}"#,
                    pattern = id_pattern.as_str(),
                )
            }
            None => placeholder_assignment,
        };

        let block = format!(
            r#"##
# Pre-allocate {plural_attribute}
##

registry_value = value.get({json_plural}, None)

if registry_value is not None:
    if not isinstance(registry_value, dict):
        errors.add(
            '/'.join((
                ref, {json_plural})),
            "Expected a dictionary, but got: {{}}".format(
                type(registry_value)))
    else:
        if isinstance(registry_value, collections.OrderedDict):
            graph.{plural_attribute} = collections.OrderedDict()
        else:
            graph.{plural_attribute} = dict()

        for id in registry_value:
{id_loop_body}

if errors.full():
    return None"#,
            id_loop_body = indent(&id_loop_body, 3),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    if !graph.classes.is_empty() {
        code.push_str(
            "\n    # Errors from pre-allocation are considered critical.\n    if not errors.empty():\n        return None\n",
        );
    }

    // Parse the pre-allocated instances
    for cls in graph.classes.values() {
        let plural_attribute = naming::as_attribute(&cls.plural);
        let class_variable = naming::as_variable(&cls.name);
        let json_plural = string_literal(&graphable_core::naming::json_plural(&cls.plural));

        let mut registry_arguments = String::new();
        for reference in referenced_classes(graph, &cls.properties) {
            registry_arguments.push_str(&format!(
                "            graph.{},\n",
                naming::as_attribute(&reference.plural)
            ));
        }

        let block = format!(
            r#"##
# Parse {plural_attribute}
##

if {json_plural} in value:
    registry_value = value[{json_plural}]
    for id, instance_value in registry_value.items():
        target_{class_variable} = graph.{plural_attribute}[id]
        target_{class_variable}.id = id

        _{class_variable}_from(
            instance_value,
{registry_arguments}            '/'.join((
                ref, {json_plural}, repr(id))),
            target_{class_variable},
            errors)

        if errors.full():
            return None"#,
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    // Parse the graph properties
    let mut auto_id = AutoId::new();
    for property in graph.properties.values() {
        let parsing = parse_property(
            "graph",
            "value",
            &["ref".to_string()],
            property,
            &registry_exprs,
            &mut auto_id,
            graph,
            py,
        );

        code.push('\n');
        code.push_str(&indent(&parsing, 1));
        code.push_str("\n\n    if errors.full():\n        return None\n");
    }

    code.push_str("\n    if not errors.empty():\n        return None\n\n    return graph");

    code
}

/// Generate the source file parsing the object graph from a JSONable.
pub(crate) fn generate(graph: &Graph, py: &Py) -> String {
    let mut blocks = vec![
        WARNING.to_string(),
        docstring("parses JSONable objects."),
        imports(graph, py),
    ];

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(duration_from_string());
    }

    for cls in graph.classes.values() {
        blocks.push(parse_composite(&ClassOrEmbed::Class(cls), graph, py));
    }

    for embed in graph.embeds.values() {
        blocks.push(parse_composite(&ClassOrEmbed::Embed(embed), graph, py));
    }

    blocks.push(parse_graph(graph, py));

    reindent(&(blocks.join("\n\n\n") + "\n"), 0, &py.indention)
}
