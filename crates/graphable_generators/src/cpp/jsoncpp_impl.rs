//! Emission of `jsoncpp.cpp` implementing the de/serialization from/to
//! Jsoncpp values.

use std::collections::{BTreeMap, BTreeSet};

use graphable_core::indention::reindent;
use graphable_core::schema::{iter_types, referenced_classes};
use graphable_core::{
    Class, Cpp, CppDatetimeLibrary, CppPathAs, Embed, Graph, Property, ValueType,
};
use indexmap::IndexMap;

use super::common::{self, WARNING, escaped_str, raw_string_literal};
use super::{expr, naming};
use crate::common::{AutoId, indent};

/// Generate the include directives of the implementation file.
fn includes(
    graph: &Graph,
    cpp: &Cpp,
    types_header_path: &str,
    parse_header_path: &str,
    jsoncpp_header_path: &str,
) -> String {
    let mut stl_block: BTreeSet<&str> =
        BTreeSet::from(["#include <string>", "#include <cstring>", "#include <sstream>"]);
    let mut third_party_block: BTreeSet<String> =
        BTreeSet::from(["#include <json/json.h>  // jsoncpp".to_string()]);

    let first_party_block: BTreeSet<String> = BTreeSet::from([
        format!("#include \"{types_header_path}\""),
        format!("#include \"{parse_header_path}\""),
        format!("#include \"{jsoncpp_header_path}\""),
    ]);

    if graph.has_type(|t| matches!(t, ValueType::Integer { .. })) {
        stl_block.insert("#include <cstdint>");
    }

    if !enumerate_patterns(graph).is_empty()
        || graph.has_type(|t| matches!(t, ValueType::Duration))
    {
        stl_block.insert("#include <regex>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        stl_block.insert("#include <chrono>");
        stl_block.insert("#include <limits>");
        stl_block.insert("#include <cstdlib>");
    }

    match cpp.datetime_library {
        CppDatetimeLibrary::Ctime => {
            if graph.has_type(|t| {
                matches!(
                    t,
                    ValueType::Date { .. }
                        | ValueType::Time { .. }
                        | ValueType::Datetime { .. }
                )
            }) {
                stl_block.insert("#include <ctime>");
            }
        }
        CppDatetimeLibrary::DateH => {
            if graph.has_type(|t| {
                matches!(
                    t,
                    ValueType::Date { .. }
                        | ValueType::Time { .. }
                        | ValueType::Datetime { .. }
                )
            }) {
                third_party_block.insert("#include <date/date.h>".to_string());
            }
            if graph.has_type(|t| matches!(t, ValueType::TimeZone)) {
                third_party_block.insert("#include <date/tz.h>".to_string());
            }
        }
    }

    if graph.has_type(|t| matches!(t, ValueType::Path { .. }))
        && cpp.path_as == CppPathAs::BoostFilesystemPath
    {
        third_party_block.insert("#include <boost/filesystem/path.hpp>".to_string());
    }

    if graph.has_type(|t| matches!(t, ValueType::Array { .. })) {
        stl_block.insert("#include <vector>");
    }

    if graph.has_type(|t| matches!(t, ValueType::Map { .. })) || !graph.classes.is_empty()
    {
        stl_block.insert("#include <map>");
    }

    if !graph.classes.is_empty() {
        stl_block.insert("#include <memory>");
        stl_block.insert("#include <stdexcept>");
    }

    let block_strs = vec![
        third_party_block.iter().cloned().collect::<Vec<_>>().join("\n"),
        stl_block.iter().copied().collect::<Vec<_>>().join("\n"),
        first_party_block.iter().cloned().collect::<Vec<_>>().join("\n"),
    ];

    block_strs.join("\n\n")
}

/// The generated helper concatenating error messages.
const MESSAGE_FUNCTION: &str = r#"/**
 * generates an error message.
 *
 * @param cc char array as the description part of the message
 * @param cc_size size of the char array
 * @param s string as the detail part of the message
 * @return concatenated string
 */
std::string message(const char* cc, size_t cc_size, std::string s) {
    std::string result;
    result.reserve(cc_size + s.size());
    result.append(cc, cc_size);
    result.append(s);
    return result;
}"#;

/// The generated helper converting a JSON value type to a string.
const VALUE_TYPE_TO_STRING: &str = r#"/**
 * converts a JSON value type to a human-readable string representation.
 *
 * @param value_type to be converted
 * @return string representation of the JSON value type
 */
std::string value_type_to_string(Json::ValueType value_type) {
    switch (value_type) {
        case Json::ValueType::nullValue: return "null";
        case Json::ValueType::intValue: return "int";
        case Json::ValueType::uintValue: return "uint";
        case Json::ValueType::realValue: return "real";
        case Json::ValueType::stringValue: return "string";
        case Json::ValueType::booleanValue: return "bool";
        case Json::ValueType::arrayValue: return "array";
        case Json::ValueType::objectValue: return "object";
        default:
            std::stringstream ss;
            ss << "Unhandled value type in value_to_string: "
                << value_type;
            throw std::domain_error(ss.str());
    }
}"#;

/// Map every string/path pattern of the graph to a unique identifier.
fn enumerate_patterns(graph: &Graph) -> IndexMap<String, usize> {
    let mut mapping = IndexMap::new();

    for (value_type, _) in iter_types(graph) {
        if let ValueType::String { pattern: Some(pattern) }
        | ValueType::Path { pattern: Some(pattern) } = value_type
        {
            let next_id = mapping.len();
            mapping.entry(pattern.as_str().to_string()).or_insert(next_id);
        }
    }

    mapping
}

/// Generate the constants holding the compiled regular expressions.
fn regex_constants(graph: &Graph, pattern_uids: &IndexMap<String, usize>) -> String {
    let mut blocks = Vec::new();

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(
            r#"namespace re {
const std::regex kDuration(
    "^(\\+|-)?P(((0|[1-9][0-9]*)(\\.[0-9]+)?)Y)?"
    "(((0|[1-9][0-9]*)(\\.[0-9]+)?)M)?"
    "(((0|[1-9][0-9]*)(\\.[0-9]+)?)W)?"
    "(((0|[1-9][0-9]*)(\\.[0-9]+)?)D)?"
    "(T"
    "(((0|[1-9][0-9]*)(\\.[0-9]+)?)H)?"
    "(((0|[1-9][0-9]*)(\\.[0-9]+)?)M)?"
    "(((0|[1-9][0-9]*)(\\.([0-9]+))?)S)?"
    ")?$");
}  // namespace re"#
                .to_string(),
        );
    }

    for (pattern, uid) in pattern_uids {
        blocks.push(format!(
            "namespace re {{\nconst std::regex kPattern{uid}(\n    {});\n}}  // namespace re",
            raw_string_literal(pattern)
        ));
    }

    for cls in graph.classes.values() {
        let Some(id_pattern) = &cls.id_pattern else {
            continue;
        };

        blocks.push(format!(
            "namespace {variable}_re {{\nconst std::regex kID(\n    {});\n}}  // namespace {variable}_re",
            raw_string_literal(id_pattern.as_str()),
            variable = naming::as_variable(&cls.name),
        ));
    }

    blocks.join("\n\n")
}

/// The generated helpers parsing ISO 8601 durations into nanoseconds.
fn duration_from_string() -> String {
    r#"/**
 * adds the left and the right and checks for the overflow.
 *
 * left and right are expected to be non-negative.
 *
 * @param[in] left summand
 * @param[in] right summand
 * @param[out] overflows true if the addition overflows
 * @return sum
 */
template <typename rep_t>
rep_t add_rep_double(rep_t left, double right, bool* overflows) {
    if (left < 0) {
        throw std::invalid_argument("Expected left >= 0");
    }

    if (right < 0) {
        throw std::invalid_argument("Expected right >= 0");
    }

    // 9223372036854775808 == 2^63, the first double that is
    // greater than max int64 (max int64 is 2^63 - 1).
    if (right >= 9223372036854775808.0) {
        *overflows = true;
        return 0;
    }

    const rep_t rightRep = right;

    if (rightRep > std::numeric_limits<rep_t>::max() - left) {
        *overflows = true;
        return 0;
    }

    return rightRep + left;
}

/**
 * parses the duration from a string.
 *
 * Following STL chrono library, the following units are counted as:
 *  - years as 365.2425 days (the average length of a Gregorian year),
 *  - months as 30.436875 days (exactly 1/12 of years) and
 *  - weeks as 7 days.
 *
 * See https://en.cppreference.com/w/cpp/chrono/duration for details.
 *
 * @param[in] s string to parse
 * @param[out] error error message, if any
 * @return parsed duration
 */
std::chrono::nanoseconds duration_from_string(
        const std::string& s,
        std::string* error) {
    std::smatch mtch;
    const bool matched = std::regex_match(s, mtch, re::kDuration);

    if (!matched) {
        std::stringstream sserr;
        sserr << "failed to match the duration: " << s;
        *error = sserr.str();
        return std::chrono::nanoseconds();
    }

    typedef std::chrono::nanoseconds::rep rep_t;

    ////
    // Extract nanoseconds
    ////

    const std::string nanoseconds_str = mtch[31];
    rep_t nanoseconds;
    if (nanoseconds_str.size() == 0) {
        // No nanoseconds specified
        nanoseconds = 0;
    } else if (nanoseconds_str.size() <= 9) {
        size_t first_nonzero = 0;
        for (; first_nonzero < nanoseconds_str.size();
                ++first_nonzero) {
            if (nanoseconds_str[first_nonzero] != '0') {
                break;
            }
        }

        if (first_nonzero == nanoseconds_str.size()) {
            // No non-zero numbers, all zeros behind the seconds comma
            nanoseconds = 0;
        } else {
            const rep_t fraction_as_integer(
                std::atol(&nanoseconds_str[first_nonzero]));

            const size_t order = 9 - nanoseconds_str.size();
            rep_t multiplier = 1;
            for (size_t i = 0; i < order; ++i) {
                multiplier *= 10;
            }

            nanoseconds = fraction_as_integer * multiplier;
        }
    } else {
        // Signal that the precision is lost
        std::stringstream sserr;
        sserr << "converting the duration to nanoseconds "
            "results in loss of precision: " << s;
        *error = sserr.str();
        return std::chrono::nanoseconds();
    }

    ////
    // Extract all the other interval counts
    ////

    const std::string sign_str = mtch[1];
    const rep_t sign = (sign_str.empty() or sign_str == "+") ? 1 : -1;

    const double years(
        (mtch[3].length() == 0) ? 0.0 : std::stod(mtch[3]));
    const double months(
        (mtch[7].length() == 0) ? 0.0 : std::stod(mtch[7]));
    const double weeks(
        (mtch[11].length() == 0) ? 0.0 : std::stod(mtch[11]));
    const double days(
        (mtch[15].length() == 0) ? 0.0 : std::stod(mtch[15]));
    const double hours(
        (mtch[20].length() == 0) ? 0.0 : std::stod(mtch[20]));
    const double minutes(
        (mtch[24].length() == 0) ? 0.0 : std::stod(mtch[24]));
    const rep_t seconds(
        (mtch[29].length() == 0) ? 0 : std::stol(mtch[29]));

    ////
    // Sum
    ////

    rep_t sum = nanoseconds;

    const rep_t max_seconds(
        std::numeric_limits<rep_t>::max() / (1000L * 1000L * 1000L));
    if (seconds > max_seconds) {
        std::stringstream sserr;
        sserr << "seconds in duration overflow as nanoseconds: " << s;
        *error = sserr.str();
        return std::chrono::nanoseconds();
    }

    const rep_t seconds_as_ns = seconds * 1000L * 1000L * 1000L;
    if (sum > std::numeric_limits<rep_t>::max() - seconds_as_ns) {
        std::stringstream sserr;
        sserr << "duration overflows as nanoseconds: " << s;
        *error = sserr.str();
        return std::chrono::nanoseconds();
    }
    sum += seconds_as_ns;

    bool overflows = false;

    const double factors[] = {
        6e10,
        3.6e12,
        24.0 * 3.6e12,
        7.0 * 24.0 * 3.6e12,
        30.436875 * 24.0 * 3.6e12,
        365.2425 * 24.0 * 3.6e12};
    const double counts[] = {
        minutes, hours, days, weeks, months, years};

    for (int i = 0; i < 6; ++i) {
        sum = add_rep_double(
            sum, counts[i] * factors[i], &overflows);
        if (overflows) {
            std::stringstream sserr;
            sserr << "duration overflows as nanoseconds: " << s;
            *error = sserr.str();
            return std::chrono::nanoseconds();
        }
    }

    // sum is always positive, so the multiplication by -1 can not
    // overflow since |max rep_t| < |min rep_t|
    if (sign < 0) {
        sum = -sum;
    }

    return std::chrono::nanoseconds(sum);
}"#
    .to_string()
}

/// The generated helper formatting a `struct tm` with `strftime`.
const TM_TO_STRING: &str = r#"/**
 * serializes the date/time/datetime to a string.
 *
 * @param[in] t time structure
 * @param[in] fmt format
 * @return time structure serialized to a string according to the format
 */
std::string tm_to_string(const struct tm& t, const char* fmt) {
    if (fmt == nullptr or fmt[0] == '\0') {
        return "";
    }

    const size_t fmt_size = strlen(fmt);

    std::string buf;
    buf.resize(fmt_size * 4);
    size_t len = strftime(&buf[0], buf.size(), fmt, &t);

    while (len == 0) {
        buf.resize(buf.size() * 2);
        len = strftime(&buf[0], buf.size(), fmt, &t);
    }
    buf.resize(len);
    return buf;
}"#;

/// The generated helper rendering durations in the ISO 8601 form.
const DURATION_TO_STRING: &str = r#"/**
 * serializes the duration to a string.
 *
 * @param[in] d duration to be serialized
 * @return duration as string
 */
std::string duration_to_string(const std::chrono::nanoseconds& d) {
    typedef std::chrono::nanoseconds::rep rep_t;

    const rep_t abscount = (d.count() < 0) ? -d.count() : d.count();
    if (abscount < 0) {
        std::stringstream sserr;
        sserr
            << "Computing the absolute number of nanoseconds "
                "in the duration underflowed: "
            << d.count();
        throw std::overflow_error(sserr.str());
    }

    const rep_t nanoseconds_in_day = 86400L * 1000L * 1000L * 1000L;
    const rep_t days = abscount / nanoseconds_in_day;
    rep_t rest = abscount % nanoseconds_in_day;

    const rep_t nanoseconds_in_hour = 3600L * 1000L * 1000L * 1000L;
    const rep_t hours = rest / nanoseconds_in_hour;
    rest = rest % nanoseconds_in_hour;

    const rep_t nanoseconds_in_minute = 60L * 1000L * 1000L * 1000L;
    const rep_t minutes = rest / nanoseconds_in_minute;
    rest = rest % nanoseconds_in_minute;

    const rep_t nanoseconds_in_second = 1000L * 1000L * 1000L;
    const rep_t seconds = rest / nanoseconds_in_second;
    rest = rest % nanoseconds_in_second;

    const rep_t nanoseconds = rest;

    std::stringstream ss;
    if (d.count() < 0) {
        ss << "-";
    }
    ss << "P";

    if (days > 0) {
        ss << days << "D";
    }

    if (hours > 0 or minutes > 0 or seconds > 0 or nanoseconds > 0) {
        ss << "T";

        if (hours > 0) {
            ss << hours << "H";
        }

        if (minutes > 0) {
            ss << minutes << "M";
        }

        if (nanoseconds == 0) {
            if (seconds > 0) {
                ss << seconds << "S";
            }
        } else {
            char buf[32];
            snprintf(
                buf, sizeof(buf), "%lld.%09lld",
                static_cast<long long>(seconds),
                static_cast<long long>(nanoseconds));

            std::string fraction(buf);
            const size_t last_nonzero = fraction.find_last_not_of('0');
            fraction.resize(last_nonzero + 1);

            ss << fraction << "S";
        }
    }

    return ss.str();
}"#;

/// Indent the continuation lines of a multi-line expression by `level`
/// canonical units, leaving the first line as-is.
fn embed(code: &str, level: usize) -> String {
    let prefix = "    ".repeat(level);
    let mut lines = code.lines();
    let mut result = lines.next().unwrap_or_default().to_string();

    for line in lines {
        result.push('\n');
        if !line.is_empty() {
            result.push_str(&prefix);
        }
        result.push_str(line);
    }

    result
}

/// Render the standard `errors->add(...)` block with the `message` helper.
///
/// `expected_literal` may span multiple lines (as chained string literals)
/// and `detail` is the expression producing the detail part.
fn add_error(ref_parts: &[String], expected_literal: &str, detail: &str) -> String {
    let ref_expr = expr::append_strings(ref_parts);

    format!(
        r#"constexpr auto expected_but_got(
    {expected});

errors->add(
    {reference},
    message(
        expected_but_got,
        strlen(expected_but_got),
        {detail}));"#,
        expected = embed(expected_literal, 1),
        reference = embed(&ref_expr, 1),
        detail = embed(detail, 2),
    )
}

/// The `value_type_to_string` detail for an unexpected JSON value type.
fn type_detail(value: &str) -> String {
    format!("value_type_to_string(\n    {value}.type())")
}

/// Short-circuit the value expression if it already is a variable.
fn bind_value(value_expr: &str, uid: &str) -> (String, String) {
    if expr::is_variable(value_expr) {
        (String::new(), value_expr.to_string())
    } else {
        (
            format!("const Json::Value& value_{uid} = {value_expr};\n"),
            format!("value_{uid}"),
        )
    }
}

fn parse_boolean(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    format!(
        "{prelude}if (!{value}.isBool()) {{\n{error}\n}} else {{\n    {target_expr} = {value}.asBool();\n}}",
        error = indent(
            &add_error(ref_parts, "\"Expected a bool, but got: \"", &type_detail(&value)),
            1
        ),
    )
}

/// Render the bound checks of a numeric parser.
fn bound_checks(
    cast: &str,
    uid: &str,
    target_assignment: &str,
    ref_parts: &[String],
    minimum: Option<(String, &str)>,
    maximum: Option<(String, &str)>,
) -> String {
    let mut code = String::new();

    for (bound, op) in [minimum, maximum].into_iter().flatten() {
        let literal = format!("\"Expected \"\n{}\n\", but got: \"", escaped_str(&format!("{op} {bound}")));
        code.push_str(&format!(
            "\nif (!({cast} {op} {bound})) {{\n{error}\n    ok_{uid} = false;\n}}\n",
            error = indent(
                &add_error(ref_parts, &literal, &format!("std::to_string({cast})")),
                1
            ),
        ));
    }

    code.push_str(&format!("\nif (ok_{uid}) {{\n    {target_assignment}\n}}"));

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

    let mut code = format!(
        "{prelude}if (!{value}.isInt64()) {{\n{error}\n}} else {{\n",
        error = indent(
            &add_error(
                ref_parts,
                "\"Expected an int64, but got: \"",
                &type_detail(&value)
            ),
            1
        ),
    );

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = {value}.asInt64();\n}}"));
        return code;
    }

    let checks = bound_checks(
        &format!("cast_{uid}"),
        &uid,
        &format!("{target_expr} = cast_{uid};"),
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

    code.push_str(&format!(
        "    const auto cast_{uid} = {value}.asInt64();\n    bool ok_{uid} = true;\n"
    ));
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
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = format!(
        "{prelude}if (!{value}.isDouble()) {{\n{error}\n}} else {{\n",
        error = indent(
            &add_error(
                ref_parts,
                "\"Expected a double, but got: \"",
                &type_detail(&value)
            ),
            1
        ),
    );

    if minimum.is_none() && maximum.is_none() {
        code.push_str(&format!("    {target_expr} = {value}.asDouble();\n}}"));
        return code;
    }

    let checks = bound_checks(
        &format!("cast_{uid}"),
        &uid,
        &format!("{target_expr} = cast_{uid};"),
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

    code.push_str(&format!(
        "    const auto cast_{uid} = {value}.asDouble();\n    bool ok_{uid} = true;\n"
    ));
    code.push_str(&indent(&checks, 1));
    code.push_str("\n}");

    code
}

/// Render the type check shared by all the string-based parsers.
fn string_check(value: &str, ref_parts: &[String]) -> String {
    format!(
        "if (!{value}.isString()) {{\n{error}\n}} else {{\n",
        error = indent(
            &add_error(
                ref_parts,
                "\"Expected a string, but got: \"",
                &type_detail(value)
            ),
            1
        ),
    )
}

fn parse_string(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    pattern: Option<&str>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    match pattern {
        None => code.push_str(&format!("    {target_expr} = {value}.asString();\n}}")),
        Some(pattern) => {
            let pattern_uid = pattern_uids[pattern];
            let literal = format!(
                "\"Expected to match \"\n{}\n\", but got: \"",
                escaped_str(pattern)
            );

            let guard = format!(
                "const std::string cast_{uid} = {value}.asString();\nif (!std::regex_match(cast_{uid}, re::kPattern{pattern_uid})) {{\n{error}\n}} else {{\n    {target_expr} = cast_{uid};\n}}",
                error = indent(&add_error(ref_parts, &literal, &format!("cast_{uid}")), 1),
            );
            code.push_str(&indent(&guard, 1));
            code.push_str("\n}");
        }
    }

    code
}

fn parse_path(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    pattern: Option<&str>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    cpp: &Cpp,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let path_type = common::path_type(cpp);
    let set_target =
        format!("{target_expr} = {path_type}(\n    {value}.asString());");

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    match pattern {
        None => {
            code.push_str(&indent(&set_target, 1));
            code.push_str("\n}");
        }
        Some(pattern) => {
            let pattern_uid = pattern_uids[pattern];
            let literal = format!(
                "\"Expected to match \"\n{}\n\", but got: \"",
                escaped_str(pattern)
            );

            let guard = format!(
                "const std::string cast_{uid} = {value}.asString();\nif (!std::regex_match(cast_{uid}, re::kPattern{pattern_uid})) {{\n{error}\n}} else {{\n    {target_expr} = {path_type}(\n        cast_{uid});\n}}",
                error = indent(&add_error(ref_parts, &literal, &format!("cast_{uid}")), 1),
            );
            code.push_str(&indent(&guard, 1));
            code.push_str("\n}");
        }
    }

    code
}

/// Which temporal value a string parse produces.
enum Temporal {
    Date,
    Time,
    Datetime,
}

fn parse_temporal(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    format: &str,
    which: Temporal,
    auto_id: &mut AutoId,
    cpp: &Cpp,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    let body = match cpp.datetime_library {
        CppDatetimeLibrary::Ctime => {
            let literal = format!(
                "\"Expected to strptime \"\n{}\n\", but got: \"",
                escaped_str(format)
            );

            format!(
                "const std::string cast_{uid} = {value}.asString();\nstruct tm tm_{uid} = tm{{0}};\nchar* ret_{uid} = strptime(\n    cast_{uid}.c_str(),\n    {format_literal},\n    &tm_{uid});\nif (ret_{uid} == nullptr or *ret_{uid} != '\\0') {{\n{error}\n}} else {{\n    {target_expr} = tm_{uid};\n}}",
                format_literal = escaped_str(format),
                error = indent(&add_error(ref_parts, &literal, &format!("cast_{uid}")), 1),
            )
        }
        CppDatetimeLibrary::DateH => {
            let literal = format!(
                "\"Expected to date::parse \"\n{}\n\", but got: \"",
                escaped_str(format)
            );

            let (target_type, result_expr) = match which {
                Temporal::Date => (
                    "date::local_days".to_string(),
                    format!("target_{uid}"),
                ),
                Temporal::Time => (
                    "std::chrono::seconds".to_string(),
                    format!("date::time_of_day<std::chrono::seconds>(\n        target_{uid})"),
                ),
                Temporal::Datetime => (
                    "date::local_seconds".to_string(),
                    format!("target_{uid}"),
                ),
            };

            format!(
                "const std::string cast_{uid} = {value}.asString();\nstd::istringstream iss_{uid}(cast_{uid});\n{target_type} target_{uid};\niss_{uid} >> date::parse({format_literal}, target_{uid});\nif (iss_{uid}.fail()) {{\n{error}\n}} else {{\n    {target_expr} = {result_expr};\n}}",
                format_literal = escaped_str(format),
                error = indent(&add_error(ref_parts, &literal, &format!("cast_{uid}")), 1),
            )
        }
    };

    code.push_str(&indent(&body, 1));
    code.push_str("\n}");

    code
}

fn parse_time_zone(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    auto_id: &mut AutoId,
    cpp: &Cpp,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    match cpp.datetime_library {
        CppDatetimeLibrary::Ctime => {
            code.push_str(&format!("    {target_expr} = {value}.asString();\n}}"));
        }
        CppDatetimeLibrary::DateH => {
            let body = format!(
                "const std::string cast_{uid} = {value}.asString();\ntry {{\n    {target_expr} = date::locate_zone(cast_{uid});\n}} catch (const std::runtime_error&) {{\n{error}\n}}",
                error = indent(
                    &add_error(
                        ref_parts,
                        "\"Expected a valid IANA time zone, but got: \"",
                        &format!("cast_{uid}")
                    ),
                    1
                ),
            );
            code.push_str(&indent(&body, 1));
            code.push_str("\n}");
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

    let ref_expr = expr::append_strings(ref_parts);

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    let body = format!(
        "const std::string cast_{uid} = {value}.asString();\nstd::string error_{uid};\nconst std::chrono::nanoseconds target_{uid} = duration_from_string(\n    cast_{uid},\n    &error_{uid});\nif (!error_{uid}.empty()) {{\n    errors->add(\n        {reference},\n        error_{uid});\n}} else {{\n    {target_expr} = target_{uid};\n}}",
        reference = embed(&ref_expr, 2),
    );
    code.push_str(&indent(&body, 1));
    code.push_str("\n}");

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
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
    cpp: &Cpp,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push("\"/\"".to_string());
    item_ref_parts.push(format!("std::to_string(i_{uid})"));

    let item_parsing = parse_value(
        &format!("{value}[i_{uid}]"),
        &format!("target_{uid}[i_{uid}]"),
        &item_ref_parts,
        values,
        registry_exprs,
        pattern_uids,
        auto_id,
        graph,
        cpp,
    );

    let mut code = format!(
        "{prelude}if (!{value}.isArray()) {{\n{error}\n",
        error = indent(
            &add_error(
                ref_parts,
                "\"Expected an array, but got: \"",
                &type_detail(&value)
            ),
            1
        ),
    );

    if let Some(minimum) = minimum_size {
        let literal = format!(
            "\"Expected an array of minimum size {minimum}, but got: \""
        );
        code.push_str(&format!(
            "}} else if ({value}.size() < {minimum}) {{\n{error}\n",
            error = indent(
                &add_error(ref_parts, &literal, &format!("std::to_string({value}.size())")),
                1
            ),
        ));
    }

    if let Some(maximum) = maximum_size {
        let literal = format!(
            "\"Expected an array of maximum size {maximum}, but got: \""
        );
        code.push_str(&format!(
            "}} else if ({value}.size() > {maximum}) {{\n{error}\n",
            error = indent(
                &add_error(ref_parts, &literal, &format!("std::to_string({value}.size())")),
                1
            ),
        ));
    }

    let set_target = format!(
        r#"std::vector<{item_type}> target_{uid};
target_{uid}.resize({value}.size());
for (Json::ArrayIndex i_{uid} = 0;
        i_{uid} < {value}.size();
        ++i_{uid}) {{
{item_parsing}

    if (errors->full()) {{
        break;
    }}
}}

{target_expr} = std::move(target_{uid});"#,
        item_type = common::type_repr(values, cpp),
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
    values: &ValueType,
    registry_exprs: &BTreeMap<String, String>,
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
    cpp: &Cpp,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut item_ref_parts = ref_parts.to_vec();
    item_ref_parts.push("\"/\"".to_string());
    item_ref_parts.push(format!("it_{uid}.name()"));

    let item_parsing = parse_value(
        &format!("*it_{uid}"),
        &format!("target_{uid}[it_{uid}.name()]"),
        &item_ref_parts,
        values,
        registry_exprs,
        pattern_uids,
        auto_id,
        graph,
        cpp,
    );

    let set_target = format!(
        r#"std::map<std::string, {item_type}> target_{uid};
for (Json::ValueConstIterator it_{uid} = {value}.begin();
        it_{uid} != {value}.end(); ++it_{uid}) {{
{item_parsing}

    if (errors->full()) {{
        break;
    }}
}}

{target_expr} = std::move(target_{uid});"#,
        item_type = common::type_repr(values, cpp),
        item_parsing = indent(&item_parsing, 1),
    );

    let mut code = format!(
        "{prelude}if (!{value}.isObject()) {{\n{error}\n}} else {{\n",
        error = indent(
            &add_error(
                ref_parts,
                "\"Expected an object, but got: \"",
                &type_detail(&value)
            ),
            1
        ),
    );
    code.push_str(&indent(&set_target, 1));
    code.push_str("\n}");

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

    let literal = format!(
        "\"Reference to an instance of class \"\n{}\n\" not found: \"",
        escaped_str(&naming::as_composite(class_name))
    );

    let mut code = prelude;
    code.push_str(&string_check(&value, ref_parts));

    let body = format!(
        "const std::string& cast_{uid} = {value}.asString();\nauto it_{uid} = {registry_expr}.find(cast_{uid});\nif (it_{uid} == {registry_expr}.end()) {{\n{error}\n}} else {{\n    {target_expr} = it_{uid}->second.get();\n}}",
        error = indent(&add_error(ref_parts, &literal, &format!("cast_{uid}")), 1),
    );
    code.push_str(&indent(&body, 1));
    code.push_str("\n}");

    code
}

fn parse_embed(
    value_expr: &str,
    target_expr: &str,
    ref_parts: &[String],
    embed_type: &Embed,
    registry_exprs: &BTreeMap<String, String>,
    auto_id: &mut AutoId,
    graph: &Graph,
) -> String {
    let uid = auto_id.next_identifier();
    let (prelude, value) = bind_value(value_expr, &uid);

    let mut registry_arguments = String::new();
    for reference in referenced_classes(graph, &embed_type.properties) {
        registry_arguments.push_str(&format!(
            "    {},\n",
            registry_exprs[&reference.name]
        ));
    }

    let ref_expr = expr::append_strings(ref_parts);

    format!(
        "{prelude}{variable}_from(\n    {value},\n{registry_arguments}    {reference},\n    &{target_expr},\n    errors);",
        variable = naming::as_variable(&embed_type.name),
        reference = embed(&ref_expr, 1),
    )
}

/// Generate the code parsing a JSON `value_expr` into `target_expr`.
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
    cpp: &Cpp,
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
            pattern_uids,
            auto_id,
        ),
        ValueType::Path { pattern } => parse_path(
            value_expr,
            target_expr,
            ref_parts,
            pattern.as_ref().map(|p| p.as_str()),
            pattern_uids,
            auto_id,
            cpp,
        ),
        ValueType::Date { format } => parse_temporal(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Temporal::Date,
            auto_id,
            cpp,
        ),
        ValueType::Time { format } => parse_temporal(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Temporal::Time,
            auto_id,
            cpp,
        ),
        ValueType::Datetime { format } => parse_temporal(
            value_expr,
            target_expr,
            ref_parts,
            format,
            Temporal::Datetime,
            auto_id,
            cpp,
        ),
        ValueType::TimeZone => {
            parse_time_zone(value_expr, target_expr, ref_parts, auto_id, cpp)
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
            pattern_uids,
            auto_id,
            graph,
            cpp,
        ),
        ValueType::Map { values } => parse_map(
            value_expr,
            target_expr,
            ref_parts,
            values,
            registry_exprs,
            pattern_uids,
            auto_id,
            graph,
            cpp,
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
    pattern_uids: &IndexMap<String, usize>,
    auto_id: &mut AutoId,
    graph: &Graph,
    cpp: &Cpp,
) -> String {
    let field = naming::as_field(&property.name);
    let property_target_expr = format!("{target_obj_expr}->{field}");
    let property_value_expr =
        format!("{value_obj_expr}[{}]", escaped_str(&property.json));

    let mut property_ref_parts = ref_obj_parts.to_vec();
    property_ref_parts.push(escaped_str(&format!("/{}", property.json)));

    // Optional containers and embeds need the optional emplaced before the
    // parsed value is written through the dereference.
    let needs_emplace = matches!(
        property.value_type,
        ValueType::Array { .. } | ValueType::Map { .. } | ValueType::EmbedRef { .. }
    );

    let parsing_target_expr = if property.optional {
        match property.value_type {
            ValueType::Array { .. } | ValueType::Map { .. } => {
                format!("*{property_target_expr}")
            }
            ValueType::EmbedRef { .. } => format!("(*{property_target_expr})"),
            _ => property_target_expr.clone(),
        }
    } else {
        property_target_expr.clone()
    };

    let parsing = parse_value(
        &property_value_expr,
        &parsing_target_expr,
        &property_ref_parts,
        &property.value_type,
        registry_exprs,
        pattern_uids,
        auto_id,
        graph,
        cpp,
    );

    let mut code = format!("////\n// Parse {field}\n////\n\n");

    if !property.optional {
        let ref_expr = expr::append_strings(ref_obj_parts);
        code.push_str(&format!(
            "if (!{value_obj_expr}.isMember({json_literal})) {{\n    errors->add(\n        {reference},\n        {missing_literal});\n}} else {{\n{parsing}\n}}",
            json_literal = escaped_str(&property.json),
            reference = embed(&ref_expr, 2),
            missing_literal =
                escaped_str(&format!("Property is missing: {}", property.json)),
            parsing = indent(&parsing, 1),
        ));
    } else {
        let emplace = if needs_emplace {
            format!("    {property_target_expr}.emplace();\n")
        } else {
            String::new()
        };

        code.push_str(&format!(
            "if ({value_obj_expr}.isMember({json_literal})) {{\n{emplace}{parsing}\n}}",
            json_literal = escaped_str(&property.json),
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
    cpp: &Cpp,
) -> String {
    let name = composite.name();
    let properties = composite.properties();

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

    let mut registry_parameters = String::new();
    for reference in &references {
        registry_parameters.push_str(&format!(
            "        const std::map<std::string, std::unique_ptr<{}>>& {}_registry,\n",
            naming::as_composite(&reference.name),
            naming::as_variable(&reference.plural)
        ));
    }

    let mut auto_id = AutoId::new();
    let mut property_parsings = String::new();
    for property in properties.values() {
        let parsing = parse_property(
            "target",
            "value",
            &["ref".to_string()],
            property,
            &registry_exprs,
            pattern_uids,
            &mut auto_id,
            graph,
            cpp,
        );

        property_parsings.push('\n');
        property_parsings.push_str(&indent(&parsing, 1));
        property_parsings.push_str("\n    if (errors->full()) {\n        return;\n    }\n");
    }

    format!(
        r#"void {variable}_from(
        const Json::Value& value,
{registry_parameters}        std::string ref,
        {composite}* target,
        parse::Errors* errors) {{
    if (!value.isObject()) {{
        constexpr auto expected_but_got(
            "Expected an object, but got: ");

        errors->add(
            ref,
            message(
                expected_but_got,
                strlen(expected_but_got),
                value_type_to_string(
                    value.type())));
        return;
    }}
{property_parsings}}}"#,
        variable = naming::as_variable(name),
        composite = naming::as_composite(name),
    )
}

/// Generate the function parsing the whole object graph.
fn parse_graph(
    graph: &Graph,
    pattern_uids: &IndexMap<String, usize>,
    cpp: &Cpp,
) -> String {
    let registry_exprs: BTreeMap<String, String> = graph
        .classes
        .values()
        .map(|cls| {
            (
                cls.name.clone(),
                format!("target->{}", naming::as_field(&cls.plural)),
            )
        })
        .collect();

    let mut code = format!(
        r#"void {variable}_from(
        const Json::Value& value,
        std::string ref,
        {composite}* target,
        parse::Errors* errors) {{
    if (errors == nullptr) {{
        throw std::invalid_argument("Unexpected null errors");
    }}

    if (!errors->empty()) {{
        throw std::invalid_argument("Unexpected non-empty errors");
    }}

    if (!value.isObject()) {{
        constexpr auto expected_but_got(
            "Expected an object, but got: ");

        errors->add(
            ref,
            message(
                expected_but_got,
                strlen(expected_but_got),
                value_type_to_string(
                    value.type())));
        return;
    }}
"#,
        variable = naming::as_variable(&graph.name),
        composite = naming::as_composite(&graph.name),
    );

    // Pre-allocate the instance registries
    for cls in graph.classes.values() {
        let plural_field = naming::as_field(&cls.plural);
        let plural_variable = naming::as_variable(&cls.plural);
        let class_composite = naming::as_composite(&cls.name);
        let json_plural = graphable_core::naming::json_plural(&cls.plural);
        let ref_suffix = format!("/{json_plural}");

        let set_instance = format!(
            "auto instance = std::make_unique<{class_composite}>();\ninstance->id = it.name();\ntarget->{plural_field}[it.name()] = std::move(instance);"
        );

        let loop_body = match &cls.id_pattern {
            Some(id_pattern) => {
                let literal = format!(
                    "\"Expected ID to match \"\n{}\n\", but got: \"",
                    escaped_str(id_pattern.as_str())
                );
                let id_error = add_error(
                    &[format!("{plural_variable}_ref")],
                    &literal,
                    "it.name()",
                );

                format!(
                    "if (!std::regex_match(\n        it.name(),\n        {class_variable}_re::kID)) {{\n{id_error}\n\n    if (errors->full()) {{\n        break;\n    }}\n}} else {{\n{set_instance}\n}}",
                    class_variable = naming::as_variable(&cls.name),
                    id_error = indent(&id_error, 1),
                    set_instance = indent(&set_instance, 1),
                )
            }
            None => set_instance,
        };

        let block = format!(
            r#"////
// Pre-allocate {plural_field}
////

std::string {plural_variable}_ref;
{plural_variable}_ref.reserve(ref.size() + {ref_suffix_len});
{plural_variable}_ref += ref;
{plural_variable}_ref += {ref_suffix_literal};

if (value.isMember({json_plural_literal})) {{
    const Json::Value& obj = value[{json_plural_literal}];
    if (!obj.isObject()) {{
        constexpr auto expected_but_got(
            "Expected an object, but got: ");

        errors->add(
            {plural_variable}_ref,
            message(
                expected_but_got,
                strlen(expected_but_got),
                value_type_to_string(
                    obj.type())));
    }} else {{
        for (Json::ValueConstIterator it = obj.begin();
                it != obj.end(); ++it) {{
{loop_body}
        }}
    }}
}}"#,
            ref_suffix_len = ref_suffix.len(),
            ref_suffix_literal = escaped_str(&ref_suffix),
            json_plural_literal = escaped_str(&json_plural),
            loop_body = indent(&loop_body, 3),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    if !graph.classes.is_empty() {
        code.push_str(
            "\n    // Pre-allocating class instances is critical.\n    \
             // If the pre-allocation failed, we can not continue to parse the instances.\n    \
             if (!errors->empty()) {\n        return;\n    }\n\n    \
             // Keep the prefix fixed in this buffer so that\n    \
             // it is copied as little as possible\n    \
             std::string instance_ref;\n",
        );
    }

    // Parse the pre-allocated instances
    for cls in graph.classes.values() {
        let plural_field = naming::as_field(&cls.plural);
        let plural_variable = naming::as_variable(&cls.plural);
        let class_composite = naming::as_composite(&cls.name);
        let class_variable = naming::as_variable(&cls.name);
        let json_plural = graphable_core::naming::json_plural(&cls.plural);

        let mut registry_arguments = String::new();
        for reference in referenced_classes(graph, &cls.properties) {
            registry_arguments.push_str(&format!(
                "            target->{},\n",
                naming::as_field(&reference.plural)
            ));
        }

        let block = format!(
            r#"////
// Parse {plural_field}
////

// clear() does not shrink the reserved memory,
// see https://en.cppreference.com/w/cpp/string/basic_string/clear
instance_ref.clear();
instance_ref += {plural_variable}_ref;
instance_ref += '/';

if (value.isMember({json_plural_literal})) {{
    const Json::Value& obj = value[{json_plural_literal}];

    for (Json::ValueConstIterator it = obj.begin(); it != obj.end(); ++it) {{
        instance_ref.reserve(
            {plural_variable}_ref.size() + 1 + it.name().size());
        instance_ref.resize(
            {plural_variable}_ref.size() + 1);
        instance_ref.append(
            it.name());

        {class_composite}* instance(
            target->{plural_field}.at(it.name()).get());
        {class_variable}_from(
            *it,
{registry_arguments}            instance_ref,
            instance,
            errors);

        if (errors->full()) {{
            break;
        }}
    }}
}}
if (errors->full()) {{
    return;
}}"#,
            json_plural_literal = escaped_str(&json_plural),
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
            "value",
            &["ref".to_string()],
            property,
            &registry_exprs,
            pattern_uids,
            &mut auto_id,
            graph,
            cpp,
        );

        code.push('\n');
        code.push_str(&indent(&parsing, 1));
        code.push_str("\n    if (errors->full()) {\n        return;\n    }\n");
    }

    code.push('}');

    code
}

/// Generate the expression or block serializing `value_expr` into
/// `target_expr`.
fn serialize_value(
    target_expr: &str,
    value_expr: &str,
    value_type: &ValueType,
    auto_id: &mut AutoId,
    cpp: &Cpp,
) -> String {
    match value_type {
        ValueType::Boolean
        | ValueType::Integer { .. }
        | ValueType::Float { .. }
        | ValueType::String { .. } => format!("{target_expr} = {value_expr};"),
        ValueType::Path { .. } => format!("{target_expr} = {value_expr}.string();"),
        ValueType::Date { format } | ValueType::Datetime { format } => {
            match cpp.datetime_library {
                CppDatetimeLibrary::Ctime => format!(
                    "{target_expr} = tm_to_string(\n    {value_expr},\n    {});",
                    escaped_str(format)
                ),
                CppDatetimeLibrary::DateH => format!(
                    "{target_expr} = date::format(\n    {},\n    {value_expr});",
                    escaped_str(format)
                ),
            }
        }
        ValueType::Time { format } => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => format!(
                "{target_expr} = tm_to_string(\n    {value_expr},\n    {});",
                escaped_str(format)
            ),
            CppDatetimeLibrary::DateH => format!(
                "{target_expr} = date::format(\n    {},\n    {value_expr}.to_duration());",
                escaped_str(format)
            ),
        },
        ValueType::TimeZone => match cpp.datetime_library {
            CppDatetimeLibrary::Ctime => format!("{target_expr} = {value_expr};"),
            CppDatetimeLibrary::DateH => {
                format!("{target_expr} = {value_expr}->name();")
            }
        },
        ValueType::Duration => {
            format!("{target_expr} = duration_to_string({value_expr});")
        }
        ValueType::Array { values, .. } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target_{uid}[i_{uid}]"),
                &format!("vector_{uid}[i_{uid}]"),
                values,
                auto_id,
                cpp,
            );

            format!(
                r#"Json::Value target_{uid}(Json::arrayValue);
const auto& vector_{uid} = {value_expr};
for (Json::ArrayIndex i_{uid} = 0;
        i_{uid} < vector_{uid}.size();
        ++i_{uid}) {{
{item_serialization}
}}
{target_expr} = std::move(target_{uid});"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        ValueType::Map { values } => {
            let uid = auto_id.next_identifier();
            let item_serialization = serialize_value(
                &format!("target_{uid}[kv_{uid}.first]"),
                &format!("kv_{uid}.second"),
                values,
                auto_id,
                cpp,
            );

            format!(
                r#"Json::Value target_{uid}(Json::objectValue);
const auto& map_{uid} = {value_expr};
for (const auto& kv_{uid} : map_{uid}) {{
{item_serialization}
}}
{target_expr} = std::move(target_{uid});"#,
                item_serialization = indent(&item_serialization, 1),
            )
        }
        ValueType::ClassRef { .. } => format!("{target_expr} = {value_expr}->id;"),
        ValueType::EmbedRef { name } => format!(
            "{target_expr} = serialize_{}({value_expr});",
            naming::as_variable(name)
        ),
    }
}

/// Generate the code serializing one property of a composite.
fn serialize_property(
    target_expr: &str,
    value_expr: &str,
    property: &Property,
    auto_id: &mut AutoId,
    cpp: &Cpp,
) -> String {
    if !property.optional {
        return serialize_value(target_expr, value_expr, &property.value_type, auto_id, cpp);
    }

    let serialization = serialize_value(
        target_expr,
        &format!("(*{value_expr})"),
        &property.value_type,
        auto_id,
        cpp,
    );

    format!(
        "if ({value_expr}) {{\n{serialization}\n}}",
        serialization = indent(&serialization, 1)
    )
}

/// Generate the function serializing a class or an embed.
fn serialize_class_or_embed(
    name: &str,
    properties: &IndexMap<String, Property>,
    cpp: &Cpp,
) -> String {
    let variable = naming::as_variable(name);
    let composite = naming::as_composite(name);

    if properties.is_empty() {
        return format!(
            "Json::Value serialize_{variable}(\n        const {composite}& {variable}) {{\n    return Json::objectValue;\n}}"
        );
    }

    let mut auto_id = AutoId::new();
    let mut code = format!(
        "Json::Value serialize_{variable}(\n        const {composite}& {variable}) {{\n    Json::Value {variable}_as_value;\n"
    );

    for property in properties.values() {
        let serialization = serialize_property(
            &format!("{variable}_as_value[{}]", escaped_str(&property.json)),
            &format!("{variable}.{}", naming::as_field(&property.name)),
            property,
            &mut auto_id,
            cpp,
        );

        code.push('\n');
        code.push_str(&indent(&serialization, 1));
        code.push('\n');
    }

    code.push_str(&format!("\n    return {variable}_as_value;\n}}"));

    code
}

/// Generate the function serializing the object graph.
fn serialize_graph(graph: &Graph, cpp: &Cpp) -> String {
    let variable = naming::as_variable(&graph.name);
    let composite = naming::as_composite(&graph.name);

    if graph.properties.is_empty() && graph.classes.is_empty() {
        return format!(
            "Json::Value serialize_{variable}(\n        const {composite}& {variable}) {{\n    return Json::objectValue;\n}}"
        );
    }

    let mut auto_id = AutoId::new();
    let mut code = format!(
        "Json::Value serialize_{variable}(\n        const {composite}& {variable}) {{\n    Json::Value {variable}_as_value;\n"
    );

    for property in graph.properties.values() {
        let serialization = serialize_property(
            &format!("{variable}_as_value[{}]", escaped_str(&property.json)),
            &format!("{variable}.{}", naming::as_field(&property.name)),
            property,
            &mut auto_id,
            cpp,
        );

        code.push('\n');
        code.push_str(&indent(&serialization, 1));
        code.push('\n');
    }

    for cls in graph.classes.values() {
        let plural_variable = naming::as_variable(&cls.plural);
        let class_composite = naming::as_composite(&cls.name);
        let class_variable = naming::as_variable(&cls.name);
        let json_plural = graphable_core::naming::json_plural(&cls.plural);

        let block = format!(
            r#"if (!{variable}.{plural_field}.empty()) {{
    Json::Value {plural_variable}_as_value;
    for (const auto& kv : {variable}.{plural_field}) {{
        const std::string& id = kv.first;
        const {class_composite}* instance = kv.second.get();

        if (id != instance->id) {{
            constexpr auto expected(
                "Expected the class instance of "
                {class_literal}
                " to have the ID ");
            constexpr auto but_got(", but got: ");

            std::string msg;
            msg.reserve(
                strlen(expected) + id.size() +
                strlen(but_got) + instance->id.size());
            msg += expected;
            msg += id;
            msg += but_got;
            msg += instance->id;

            throw std::invalid_argument(msg);
        }}

        {plural_variable}_as_value[instance->id] = serialize_{class_variable}(*instance);
    }}
    {variable}_as_value[{json_plural_literal}] = {plural_variable}_as_value;
}}"#,
            plural_field = naming::as_field(&cls.plural),
            class_literal = escaped_str(&class_composite),
            json_plural_literal = escaped_str(&json_plural),
        );

        code.push('\n');
        code.push_str(&indent(&block, 1));
        code.push('\n');
    }

    code.push_str(&format!("\n    return {variable}_as_value;\n}}"));

    code
}

/// Generate the implementation file for de/serialization from/to Jsoncpp.
pub(crate) fn generate(
    graph: &Graph,
    cpp: &Cpp,
    types_header_path: &str,
    parse_header_path: &str,
    jsoncpp_header_path: &str,
) -> String {
    let pattern_uids = enumerate_patterns(graph);

    let mut blocks = vec![
        WARNING.to_string(),
        includes(
            graph,
            cpp,
            types_header_path,
            parse_header_path,
            jsoncpp_header_path,
        ),
        common::namespace_opening(cpp),
        "namespace jsoncpp {".to_string(),
        MESSAGE_FUNCTION.to_string(),
    ];

    let regex_block = regex_constants(graph, &pattern_uids);
    if !regex_block.is_empty() {
        blocks.push(regex_block);
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(duration_from_string());
    }

    blocks.push(VALUE_TYPE_TO_STRING.to_string());

    blocks.push(parse_graph(graph, &pattern_uids, cpp));

    if cpp.datetime_library == CppDatetimeLibrary::Ctime
        && graph.has_type(|t| {
            matches!(
                t,
                ValueType::Date { .. } | ValueType::Time { .. } | ValueType::Datetime { .. }
            )
        })
    {
        blocks.push(TM_TO_STRING.to_string());
    }

    if graph.has_type(|t| matches!(t, ValueType::Duration)) {
        blocks.push(DURATION_TO_STRING.to_string());
    }

    for cls in graph.classes.values() {
        blocks.push(parse_composite(
            &ClassOrEmbed::Class(cls),
            &pattern_uids,
            graph,
            cpp,
        ));
    }

    for embed in graph.embeds.values() {
        blocks.push(parse_composite(
            &ClassOrEmbed::Embed(embed),
            &pattern_uids,
            graph,
            cpp,
        ));
    }

    for cls in graph.classes.values() {
        blocks.push(serialize_class_or_embed(&cls.name, &cls.properties, cpp));
    }

    for embed in graph.embeds.values() {
        blocks.push(serialize_class_or_embed(&embed.name, &embed.properties, cpp));
    }

    blocks.push(serialize_graph(graph, cpp));

    blocks.push("}  // namespace jsoncpp".to_string());
    blocks.push(common::namespace_closing(cpp));
    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, &cpp.indention)
}
