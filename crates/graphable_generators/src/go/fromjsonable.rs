//! Emission of `from_jsonable.go` parsing the object graph from JSONables.

use std::collections::{BTreeMap, BTreeSet};

use graphable_core::indention::reindent;
use graphable_core::schema::referenced_classes;
use graphable_core::{Class, Embed, Go, Graph, Property, ValueType, naming};
use indexmap::IndexMap;

use super::common::{self, WARNING, escaped_str, ticked_str};
use super::timeformat;
use crate::common::{AutoId, indent};

/// Generate the import declaration.
fn imports(graph: &Graph) -> String {
    let mut import_set: BTreeSet<&str> = BTreeSet::from(["strings", "fmt"]);

    if graph.has_type(|t| matches!(t, ValueType::Integer { .. })) {
        import_set.insert("math");
    }

    if graph.has_type(|t| {
        matches!(
            t,
            ValueType::Date { .. }
                | ValueType::Time { .. }
                | ValueType::Datetime { .. }
                | ValueType::TimeZone
        )
    }) {
        import_set.insert("time");
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        import_set.insert("math");
        import_set.insert("time");
        import_set.insert("regexp");
        import_set.insert("strconv");
    }

    if !enumerate_patterns(graph).is_empty() {
        import_set.insert("regexp");
    }

    if graph.has_type(|t| matches!(t, ValueType::Array { .. })) {
        // Needed to convert indices to strings in error messages
        import_set.insert("strconv");
    }

    common::import_declarations(&import_set)
}

/// The generated helpers parsing ISO 8601 durations into nanoseconds.
fn duration_from_string() -> String {
    r#"var durationRe = regexp.MustCompile(
    `^(-|\+)?P` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)Y)?` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)M)?` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)W)?` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)D)?` +
        `(T` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)H)?` +
        `(((0|[1-9][0-9]*)(\.[0-9]+)?)M)?` +
        `(((0|[1-9][0-9]*)(\.([0-9]+))?)S)?` +
        `)?$`)

// addDuration adds right nanoseconds to the left duration.
//
// addDuration requires:
//  * left >= 0
//  * right >= 0
func addDuration(
    left time.Duration,
    right float64) (result time.Duration, overflow bool) {

    if !(left >= 0) {
        panic("expected left >= 0")
    }

    if !(right >= 0) {
        panic("expected right >= 0")
    }

    // 9223372036854775808.0 == 2^63 is the first float > MaxInt64.
    if right >= 9223372036854775808.0 {
        overflow = true
        return
    }

    rightAsNs := time.Duration(right)
    if rightAsNs > math.MaxInt64-left {
        overflow = true
        return
    }

    result = left + rightAsNs
    return
}

// durationFromString parses the duration given in the ISO 8601 format.
//
// Following C++ chrono library, the following units are counted as:
//  * years as 365.2425 days (the average length of a Gregorian year),
//  * months as 30.436875 days (exactly 1/12 of years) and
//  * weeks as 7 days.
//
// Since time.Duration is measured in nanoseconds, beware of overflow
// issues due to the finite representation of integers.
func durationFromString(s string) (d time.Duration, err error) {
    m := durationRe.FindStringSubmatch(s)

    if len(m) == 0 {
        err = fmt.Errorf("failed to match the duration pattern on: %s", s)
        return
    }

    ////
    // Interprete
    ////

    var years, months, weeks, days, hours, minutes float64
    var seconds, nanoseconds int64

    sign := int64(1)
    if len(m[1]) > 0 && m[1][0] == '-' {
        sign = -1
    }

    if len(m[3]) > 0 {
        years, err = strconv.ParseFloat(m[3], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the years: %s", err.Error())
            return
        }
    }

    if len(m[7]) > 0 {
        months, err = strconv.ParseFloat(m[7], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the months: %s", err.Error())
            return
        }
    }

    if len(m[11]) > 0 {
        weeks, err = strconv.ParseFloat(m[11], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the weeks: %s", err.Error())
            return
        }
    }

    if len(m[15]) > 0 {
        days, err = strconv.ParseFloat(m[15], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the days: %s", err.Error())
            return
        }
    }

    if len(m[20]) > 0 {
        hours, err = strconv.ParseFloat(m[20], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the hours: %s", err.Error())
            return
        }
    }

    if len(m[24]) > 0 {
        minutes, err = strconv.ParseFloat(m[24], 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the minutes: %s", err.Error())
            return
        }
    }

    if len(m[29]) > 0 {
        seconds, err = strconv.ParseInt(m[29], 10, 64)
        if err != nil {
            err = fmt.Errorf("failed to parse the seconds: %s", err.Error())
            return
        }
    }

    switch {
    case len(m[31]) == 0:
        // pass
    case len(m[31]) <= 9:
        trimmed := strings.TrimLeft(m[31], "0")
        if len(trimmed) > 0 {
            nanoseconds, err = strconv.ParseInt(trimmed, 10, 64)
            if err != nil {
                err = fmt.Errorf(
                    "failed to parse nanoseconds from: %s",
                    err.Error())
                return
            }

            order := 9 - len(m[31])
            for i := 0; i < order; i++ {
                nanoseconds *= 10
            }
        }
    default:
        err = fmt.Errorf(
            "precision only up to nanoseconds supported, but got: %s", s)
        return
    }

    ////
    // Sum
    ////

    d = time.Duration(nanoseconds)

    if seconds > (math.MaxInt64 / (1000 * 1000 * 1000)) {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    secondsAsNs := time.Duration(seconds * 1000 * 1000 * 1000)
    if secondsAsNs > math.MaxInt64-d {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }
    d += secondsAsNs

    var overflow bool
    d, overflow = addDuration(d, minutes*6e10)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    d, overflow = addDuration(d, hours*3.6e12)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    d, overflow = addDuration(d, days*24.0*3.6e12)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    d, overflow = addDuration(d, weeks*7.0*24.0*3.6e12)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    d, overflow = addDuration(d, months*30.436875*24.0*3.6e12)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    d, overflow = addDuration(d, years*365.2425*24.0*3.6e12)
    if overflow {
        err = fmt.Errorf("overflows in nanoseconds: %s", s)
        return
    }

    // d is always positive here, so the multiplication by -1 can not
    // overflow since |math.MaxInt64| < |math.MinInt64|
    d *= time.Duration(sign)

    return
}"#
    .to_string()
}

/// Map every pattern of the graph to a unique identifier.
///
/// The identifiers name the package-level compiled regexps; identical
/// pattern texts share the identifier.
fn enumerate_patterns(graph: &Graph) -> IndexMap<String, usize> {
    let mut mapping = IndexMap::new();

    for cls in graph.classes.values() {
        if let Some(id_pattern) = &cls.id_pattern {
            let next_id = mapping.len();
            mapping.entry(id_pattern.as_str().to_string()).or_insert(next_id);
        }
    }

    for (value_type, _) in graphable_core::schema::iter_types(graph) {
        if let ValueType::String { pattern: Some(pattern) }
        | ValueType::Path { pattern: Some(pattern) } = value_type
        {
            let next_id = mapping.len();
            mapping.entry(pattern.as_str().to_string()).or_insert(next_id);
        }
    }

    mapping
}

/// Generate the package-level compiled regular expressions.
fn compile_regexes(pattern_uids: &IndexMap<String, usize>) -> String {
    let mut lines = Vec::new();

    for (pattern, uid) in pattern_uids {
        lines.push(format!(
            "var pattern{uid} = regexp.MustCompile(\n    {})",
            ticked_str(pattern)
        ));
    }

    lines.join("\n")
}

/// Render an `errors.Add(...)` call as a canonical fragment.
///
/// `args` are the `fmt.Sprintf` arguments following the format literal;
/// with no args the literal is passed to `Add` directly.
fn errors_add(ref_parts: &[String], format_literal: &str, args: &[String]) -> String {
    let mut lines = vec!["errors.Add(".to_string()];

    if ref_parts.len() == 1 {
        lines.push(format!("    {},", ref_parts[0]));
    } else {
        lines.push("    strings.Join(".to_string());
        lines.push("        []string{".to_string());
        lines.push(format!("            {}}},", ref_parts.join(", ")));
        lines.push("        \"/\"),".to_string());
    }

    if args.is_empty() {
        lines.push(format!("    {format_literal})"));
    } else {
        lines.push("    fmt.Sprintf(".to_string());
        lines.push(format!("        {format_literal},"));
        for (i, arg) in args.iter().enumerate() {
            if i + 1 == args.len() {
                lines.push(format!("        {arg}))"));
            } else {
                lines.push(format!("        {arg},"));
            }
        }
    }

    lines.join("\n")
}

/// Render the type assertion prologue.
///
/// Non-variable expressions are parenthesized so that the assertion binds
/// to the whole expression.
fn cast_assertion(cast_var: &str, ok_var: &str, value_expr: &str, go_type: &str) -> String {
    if super::expr::is_variable(value_expr) {
        format!("{cast_var}, {ok_var} := {value_expr}.({go_type})\n")
    } else {
        format!("{cast_var}, {ok_var} := ({value_expr}).({go_type})\n")
    }
}

fn parse_boolean(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();

    let mut code = cast_assertion(&format!("cast{uid}"), &format!("ok{uid}"), value_expr, "bool");
    code.push_str(&format!(
        "if !ok{uid} {{\n{}\n}} else {{\n    {target_expr} = cast{uid}\n}}",
        indent(
            &errors_add(
                ref_parts,
                "\"expected a bool, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
    ));

    code
}

/// Render the if/else-if cascade checking numeric bounds.
fn bound_checks(
    cast_var: &str,
    target_assignment: &str,
    ref_parts: &[String],
    verb: &str,
    minimum: Option<(String, &str)>,
    maximum: Option<(String, &str)>,
) -> String {
    let mut code = String::new();
    let mut got_condition = false;

    for (bound, op) in [minimum, maximum].into_iter().flatten() {
        let keyword = if got_condition { "} else if" } else { "if" };
        let literal = escaped_str(&format!("expected {op} {bound}, but got: {verb}"));

        code.push_str(&format!(
            "{keyword} !({cast_var} {op} {bound}) {{\n{}\n",
            indent(&errors_add(ref_parts, &literal, &[cast_var.to_string()]), 1),
        ));
        got_condition = true;
    }

    code.push_str(&format!("}} else {{\n    {target_assignment}\n}}"));

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

    let mut code = cast_assertion(
        &format!("fcast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "float64",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else if fcast{uid} != math.Trunc(fcast{uid}) {{
{whole_error}
// 9223372036854775808.0 == 2^63 is the first float > MaxInt64.
// -9223372036854775808.0 == -(2^63) is the last float >= MinInt64.
}} else if fcast{uid} >= 9223372036854775808.0 ||
    fcast{uid} < -9223372036854775808.0 {{

{overflow_error}
}} else {{
"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a float64, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        whole_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a whole number, but got: %f\"",
                &[format!("fcast{uid}")]
            ),
            1
        ),
        overflow_error = indent(
            &errors_add(
                ref_parts,
                "\"expected the value to fit into int64, but got an overflow: %f\"",
                &[format!("fcast{uid}")]
            ),
            1
        ),
    ));

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = int64(fcast{uid})\n}}"));
        return code;
    }

    let checks = bound_checks(
        &format!("cast{uid}"),
        &format!("{target_expr} = cast{uid}"),
        ref_parts,
        "%d",
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

    code.push_str(&format!("    cast{uid} := int64(fcast{uid})\n\n"));
    code.push_str(&indent(&checks, 1));
    code.push_str("\n}");

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

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "float64",
    );
    code.push_str(&format!(
        "if !ok{uid} {{\n{}\n}} else {{\n",
        indent(
            &errors_add(
                ref_parts,
                "\"expected a float64, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
    ));

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = cast{uid}\n}}"));
        return code;
    }

    let checks = bound_checks(
        &format!("cast{uid}"),
        &format!("{target_expr} = cast{uid}"),
        ref_parts,
        "%f",
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
    code.push_str("\n}");

    code
}

/// Parse a string or a path (paths are plain strings in Go).
fn parse_string(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    pattern: Option<&str>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "string",
    );
    code.push_str(&format!(
        "if !ok{uid} {{\n{}\n}} else {{\n",
        indent(
            &errors_add(
                ref_parts,
                "\"expected a string, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
    ));

    match pattern {
        None => code.push_str(&format!("    {target_expr} = cast{uid}\n}}")),
        Some(pattern) => {
            let pattern_uid = pattern_uids[pattern];
            let literal =
                escaped_str(&format!("expected to match {pattern}, but got: %s"));

            let guard = format!(
                "if !pattern{pattern_uid}.MatchString(cast{uid}) {{\n{}\n}} else {{\n    {target_expr} = cast{uid}\n}}",
                indent(
                    &errors_add(ref_parts, &literal, &[format!("cast{uid}")]),
                    1
                ),
            );
            code.push_str(&indent(&guard, 1));
            code.push_str("\n}");
        }
    }

    code
}

fn parse_date_time(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    format: &str,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let layout = timeformat::convert(format);

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "string",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else {{
    target{uid}, err{uid} := time.Parse(
        {layout_literal},
        cast{uid})
    if err{uid} != nil {{
{layout_error}
    }} else {{
        {target_expr} = target{uid}
    }}
}}"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a string, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        layout_literal = escaped_str(&layout),
        layout_error = indent(
            &errors_add(
                ref_parts,
                &escaped_str(&format!("expected layout {layout}, got: %s")),
                &[format!("cast{uid}")]
            ),
            2
        ),
    ));

    code
}

fn parse_time_zone(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "string",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else {{
    target{uid}, err{uid} := time.LoadLocation(cast{uid})
    if err{uid} != nil {{
{load_error}
    }} else {{
        {target_expr} = target{uid}
    }}
}}"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a string, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        load_error = indent(
            &errors_add(
                ref_parts,
                "\"failed to load location from %#v: %s\"",
                &[format!("cast{uid}"), format!("err{uid}.Error()")]
            ),
            2
        ),
    ));

    code
}

fn parse_duration(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "string",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else {{
    target{uid}, err{uid} := durationFromString(cast{uid})
    if err{uid} != nil {{
{parse_error}
    }} else {{
        {target_expr} = target{uid}
    }}
}}"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a string, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        parse_error = indent(
            &errors_add(
                ref_parts,
                "\"failed to parse duration from %#v: %s\"",
                &[format!("cast{uid}"), format!("err{uid}.Error()")]
            ),
            2
        ),
    ));

    code
}

#[allow(clippy::too_many_arguments)]
fn parse_array(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    array_type: &ValueType,
    values: &ValueType,
    minimum_size: Option<usize>,
    maximum_size: Option<usize>,
    registry_exprs: &BTreeMap<String, String>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
) -> String {
    let uid = auto_id.next_identifier();

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push(format!("strconv.Itoa(i{uid})"));

    let item_parsing = parse_value(
        &format!("cast{uid}[i{uid}]"),
        &format!("target{uid}[i{uid}]"),
        &item_ref_parts,
        values,
        registry_exprs,
        pattern_uids,
        auto_id,
        graph,
    );

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "[]interface{}",
    );
    code.push_str(&format!(
        "if !ok{uid} {{\n{}\n",
        indent(
            &errors_add(
                ref_parts,
                "\"expected a []interface{}, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
    ));

    if let Some(minimum) = minimum_size {
        let literal = escaped_str(&format!(
            "expected an array of minimum size {minimum}, but got: %d"
        ));
        code.push_str(&format!(
            "}} else if len(cast{uid}) < {minimum} {{\n{}\n",
            indent(
                &errors_add(ref_parts, &literal, &[format!("len(cast{uid})")]),
                1
            ),
        ));
    }

    if let Some(maximum) = maximum_size {
        let literal = escaped_str(&format!(
            "expected an array of maximum size {maximum}, but got: %d"
        ));
        code.push_str(&format!(
            "}} else if len(cast{uid}) > {maximum} {{\n{}\n",
            indent(
                &errors_add(ref_parts, &literal, &[format!("len(cast{uid})")]),
                1
            ),
        ));
    }

    let set_target = format!(
        r#"target{uid} := make(
    {go_type},
    len(cast{uid}))
for i{uid} := range cast{uid} {{
{item_parsing}

    if errors.Full() {{
        break
    }}
}}

{target_expr} = target{uid}"#,
        go_type = common::type_repr(array_type),
        item_parsing = indent(&item_parsing, 1),
    );

    code.push_str("} else {\n");
    code.push_str(&indent(&set_target, 1));
    code.push_str("\n}");

    code
}

#[allow(clippy::too_many_arguments)]
fn parse_map(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    map_type: &ValueType,
    values: &ValueType,
    registry_exprs: &BTreeMap<String, String>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
) -> String {
    let uid = auto_id.next_identifier();

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push(format!("k{uid}"));

    let item_parsing = parse_value(
        &format!("cast{uid}[k{uid}]"),
        &format!("target{uid}[k{uid}]"),
        &item_ref_parts,
        values,
        registry_exprs,
        pattern_uids,
        auto_id,
        graph,
    );

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "map[string]interface{}",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else {{
    target{uid} := make({go_type})
    for k{uid} := range cast{uid} {{
{item_parsing}

        if errors.Full() {{
            break
        }}
    }}

    {target_expr} = target{uid}
}}"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a map[string]interface{}, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        go_type = common::type_repr(map_type),
        item_parsing = indent(&item_parsing, 2),
    ));

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

    let literal = escaped_str(&format!(
        "reference to an instance of class {} not found: %s",
        naming::upper_camel(class_name)
    ));

    let mut code = cast_assertion(
        &format!("cast{uid}"),
        &format!("ok{uid}"),
        value_expr,
        "string",
    );
    code.push_str(&format!(
        r#"if !ok{uid} {{
{type_error}
}} else {{
    target{uid}, ok{uid} := {registry_expr}[cast{uid}]
    if !ok{uid} {{
{not_found_error}
    }} else {{
        {target_expr} = target{uid}
    }}
}}"#,
        type_error = indent(
            &errors_add(
                ref_parts,
                "\"expected a string, but got: %T\"",
                &[value_expr.to_string()]
            ),
            1
        ),
        not_found_error = indent(
            &errors_add(ref_parts, &literal, &[value_expr.to_string()]),
            2
        ),
    ));

    code
}

fn parse_embed(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    embed: &Embed,
    registry_exprs: &BTreeMap<String, String>,
    graph: &Graph,
) -> String {
    let mut registry_arguments = String::new();
    for reference in referenced_classes(graph, &embed.properties) {
        registry_arguments.push_str(&format!("    {},\n", registry_exprs[&reference.name]));
    }

    format!(
        r#"{composite}FromJSONable(
    {value_expr},
{registry_arguments}    strings.Join(
        []string{{
            {ref_parts}}},
        "/"),
    &({target_expr}),
    errors)"#,
        composite = naming::upper_camel(&embed.name),
        ref_parts = ref_parts.join(", "),
    )
}

/// Generate the code parsing a JSONable `value_expr` into `target_expr`.
#[allow(clippy::too_many_arguments)]
fn parse_value(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    value_type: &ValueType,
    registry_exprs: &BTreeMap<String, String>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
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
        ValueType::String { pattern } | ValueType::Path { pattern } => parse_string(
            value_expr,
            target_expr,
            ref_parts,
            pattern.as_ref().map(|p| p.as_str()),
            pattern_uids,
            auto_id,
        ),
        ValueType::Date { format }
        | ValueType::Time { format }
        | ValueType::Datetime { format } => {
            parse_date_time(value_expr, target_expr, ref_parts, format, auto_id)
        }
        ValueType::TimeZone => {
            parse_time_zone(value_expr, target_expr, ref_parts, auto_id)
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
            value_type,
            values,
            *minimum_size,
            *maximum_size,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
        ),
        ValueType::Map { values } => parse_map(
            value_expr,
            target_expr,
            ref_parts,
            value_type,
            values,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
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
            graph,
        ),
    }
}

/// Generate the code parsing one property of a composite.
#[allow(clippy::too_many_arguments)]
fn parse_property(
    target_obj_expr: &str,
    value_map_expr: &str,
    ref_obj_parts: &[String],
    property: &Property,
    registry_exprs: &BTreeMap<String, String>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
) -> String {
    let uid = auto_id.next_identifier();

    let field = naming::upper_camel(&property.name);
    let property_target_expr = format!("{target_obj_expr}.{field}");

    let mut property_ref_parts = ref_obj_parts.to_vec();
    property_ref_parts.push(escaped_str(&property.json));

    let mut code = format!(
        "////\n// Parse {field}\n////\n\nvalue{uid}, ok{uid} := {value_map_expr}[\n    {json_literal}]\n\n",
        json_literal = escaped_str(&property.json),
    );

    if !property.optional {
        let parsing = parse_value(
            &format!("value{uid}"),
            &property_target_expr,
            &property_ref_parts,
            &property.value_type,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
        );

        code.push_str(&format!(
            "if !ok{uid} {{\n{missing_error}\n}} else {{\n{parsing}\n}}",
            missing_error = indent(
                &errors_add(
                    ref_obj_parts,
                    &escaped_str(&format!("property is missing: {}", property.json)),
                    &[]
                ),
                1
            ),
            parsing = indent(&parsing, 1),
        ));
    } else if common::is_pointer_type(&property.value_type) {
        let parsing = parse_value(
            &format!("value{uid}"),
            &property_target_expr,
            &property_ref_parts,
            &property.value_type,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
        );

        code.push_str(&format!(
            "if ok{uid} {{\n{parsing}\n}}",
            parsing = indent(&parsing, 1),
        ));
    } else {
        // The target field is a pointer, so the parsed value goes through
        // an intermediate binding.
        let parsing = parse_value(
            &format!("value{uid}"),
            &format!("target{uid}"),
            &property_ref_parts,
            &property.value_type,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
        );

        code.push_str(&format!(
            "if ok{uid} {{\n    var target{uid} {target_type}\n{parsing}\n\n    {property_target_expr} = &target{uid}\n}}",
            target_type = common::type_repr(&property.value_type),
            parsing = indent(&parsing, 1),
        ));
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

    fn properties(&self) -> &'a IndexMap<String, Property> {
        match self {
            ClassOrEmbed::Class(cls) => &cls.properties,
            ClassOrEmbed::Embed(embed) => &embed.properties,
        }
    }
}

/// Generate the function parsing a class or an embed.
fn parse_composite(
    composite: &ClassOrEmbed,
    pattern_uids: &IndexMap<String, usize>,
    graph: &Graph,
) -> String {
    let name = composite.name();
    let properties = composite.properties();
    let is_class = matches!(composite, ClassOrEmbed::Class(_));

    let composite_name = naming::upper_camel(name);

    let references = referenced_classes(graph, properties);
    let registry_exprs: BTreeMap<String, String> = references
        .iter()
        .map(|reference| {
            (
                reference.name.clone(),
                format!("{}Registry", naming::lower_camel(&reference.plural)),
            )
        })
        .collect();

    let mut registry_parameters = String::new();
    for reference in &references {
        registry_parameters.push_str(&format!(
            "    {}Registry map[string]*{},\n",
            naming::lower_camel(&reference.plural),
            naming::upper_camel(&reference.name)
        ));
    }

    let id_parameter = if is_class { "    id string,\n" } else { "" };

    let mut auto_id = AutoId::new();
    let mut property_parsings = String::new();
    for property in properties.values() {
        let parsing = parse_property(
            "target",
            "cast",
            &["ref".to_string()],
            property,
            &registry_exprs,
            pattern_uids,
            &mut auto_id,
            graph,
        );

        property_parsings.push('\n');
        property_parsings.push_str(&indent(&parsing, 1));
        property_parsings.push_str("\n\n    if errors.Full() {\n        return\n    }\n");
    }

    let cast_binding = if properties.is_empty() {
        "_, ok := value.(map[string]interface{})"
    } else {
        "cast, ok := value.(map[string]interface{})"
    };

    let id_assignment = if is_class {
        "\n    target.ID = id\n"
    } else {
        ""
    };

    format!(
        r#"// {composite_name}FromJSONable parses {composite_name} from a JSONable value.
//
// If there are any errors, the state of the target is undefined.
//
// {composite_name}FromJSONable requires:
//  * target != nil
//  * errors != nil
//  * errors.Empty()
func {composite_name}FromJSONable(
    value interface{{}},
{id_parameter}{registry_parameters}    ref string,
    target *{composite_name},
    errors *Errors) {{

    if target == nil {{
        panic("unexpected nil target")
    }}

    if errors == nil {{
        panic("unexpected nil errors")
    }}

    if !errors.Empty() {{
        panic("unexpected non-empty errors")
    }}

    {cast_binding}
    if !ok {{
        errors.Add(
            ref,
            fmt.Sprintf(
                "expected a map[string]interface{{}}, but got: %T",
                value))
        return
    }}
{id_assignment}{property_parsings}
    return
}}"#
    )
}

/// Generate the function parsing the whole object graph.
fn parse_graph(graph: &Graph, pattern_uids: &IndexMap<String, usize>) -> String {
    let composite_name = naming::upper_camel(&graph.name);

    let registry_exprs: BTreeMap<String, String> = graph
        .classes
        .values()
        .map(|cls| {
            (
                cls.name.clone(),
                format!("target.{}", naming::upper_camel(&cls.plural)),
            )
        })
        .collect();

    let mut code = format!(
        r#"// {composite_name}FromJSONable parses {composite_name} from a JSONable value.
//
// If there are any errors, the state of target is undefined.
//
// {composite_name}FromJSONable requires:
//  * target != nil
//  * errors != nil
//  * errors.Empty()
func {composite_name}FromJSONable(
    value interface{{}},
    ref string,
    target *{composite_name},
    errors *Errors) {{

    if target == nil {{
        panic("unexpected nil target")
    }}

    if errors == nil {{
        panic("unexpected nil errors")
    }}

    if !errors.Empty() {{
        panic("unexpected non-empty errors")
    }}

    cast, ok := value.(map[string]interface{{}})
    if !ok {{
        errors.Add(
            ref,
            fmt.Sprintf(
                "expected a map[string]interface{{}}, but got: %T",
                value))
        return
    }}
"#
    );

    // Pre-allocate the instance registries
    for cls in graph.classes.values() {
        let plural_field = naming::upper_camel(&cls.plural);
        let plural_variable = naming::lower_camel(&cls.plural);
        let class_composite = naming::upper_camel(&cls.name);
        let json_plural = graphable_core::naming::json_plural(&cls.plural);

        let preallocate =
            format!("target.{plural_field}[id] = &{class_composite}{{}}");

        let id_loop_body = match &cls.id_pattern {
            Some(id_pattern) => {
                let pattern_uid = pattern_uids[id_pattern.as_str()];
                let literal = escaped_str(&format!(
                    "expected ID to match {}, but got: %s",
                    id_pattern.as_str()
                ));
                format!(
                    "if !pattern{pattern_uid}.MatchString(id) {{\n{id_error}\n}} else {{\n    {preallocate}\n}}",
                    id_error = indent(
                        &errors_add(
                            &[format!("{plural_variable}Ref")],
                            &literal,
                            &["id".to_string()]
                        ),
                        1
                    ),
                )
            }
            None => preallocate,
        };

        let block = format!(
            r#"////
// Pre-allocate {plural_field}
////

{plural_variable}Ref := ref + {ref_suffix}
var {plural_variable}Ok bool
var {plural_variable}Value interface{{}}
var {plural_variable}Map map[string]interface{{}}

{plural_variable}Value, {plural_variable}Ok = cast[
    {json_plural_literal}]
if {plural_variable}Ok {{
    {plural_variable}Map, ok = {plural_variable}Value.(map[string]interface{{}})
    if !ok {{
        errors.Add(
            {plural_variable}Ref,
            fmt.Sprintf(
                "expected a map[string]interface{{}}, but got: %T",
                {plural_variable}Value))
    }} else {{
        target.{plural_field} = make(
            map[string]*{class_composite})

        for id := range {plural_variable}Map {{
{id_loop_body}
        }}
    }}
}}"#,
            ref_suffix = escaped_str(&format!("/{json_plural}")),
            json_plural_literal = escaped_str(&json_plural),
            id_loop_body = indent(&id_loop_body, 3),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    if !graph.classes.is_empty() {
        code.push_str(
            "\n    // Pre-allocating class instances is critical.\n    \
             // If the pre-allocation failed, we can not continue to parse the instances.\n    \
             if !errors.Empty() {\n        return\n    }\n",
        );
    }

    // Parse the pre-allocated instances
    for cls in graph.classes.values() {
        let plural_field = naming::upper_camel(&cls.plural);
        let plural_variable = naming::lower_camel(&cls.plural);
        let class_composite = naming::upper_camel(&cls.name);

        let mut registry_arguments = String::new();
        for reference in referenced_classes(graph, &cls.properties) {
            registry_arguments.push_str(&format!(
                "            target.{},\n",
                naming::upper_camel(&reference.plural)
            ));
        }

        let block = format!(
            r#"////
// Parse {plural_field}
////

if {plural_variable}Ok {{
    for id, value := range {plural_variable}Map {{
        {class_composite}FromJSONable(
            value,
            id,
{registry_arguments}            strings.Join([]string{{
                {plural_variable}Ref, id}}, "/"),
            target.{plural_field}[id],
            errors)

        if errors.Full() {{
            break
        }}
    }}
}}

if errors.Full() {{
    return
}}"#,
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    // Parse the graph properties
    let mut auto_id = AutoId::new();
    for property in graph.properties.values() {
        let parsing = parse_property(
            "target",
            "cast",
            &["ref".to_string()],
            property,
            &registry_exprs,
            pattern_uids,
            &mut auto_id,
            graph,
        );

        code.push('\n');
        code.push_str(&indent(&parsing, 1));
        code.push_str("\n\n    if errors.Full() {\n        return\n    }\n");
    }

    code.push_str("\n    return\n}");

    code
}

/// Generate the source file parsing the object graph from a JSONable.
pub(crate) fn generate(graph: &Graph, go: &Go) -> String {
    let mut blocks = vec![
        format!("package {}", go.package),
        WARNING.to_string(),
        imports(graph),
    ];

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(duration_from_string());
    }

    let pattern_uids = enumerate_patterns(graph);
    if !pattern_uids.is_empty() {
        blocks.push(compile_regexes(&pattern_uids));
    }

    for cls in graph.classes.values() {
        blocks.push(parse_composite(
            &ClassOrEmbed::Class(cls),
            &pattern_uids,
            graph,
        ));
    }

    for embed in graph.embeds.values() {
        blocks.push(parse_composite(
            &ClassOrEmbed::Embed(embed),
            &pattern_uids,
            graph,
        ));
    }

    blocks.push(parse_graph(graph, &pattern_uids));

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, "\t")
}
