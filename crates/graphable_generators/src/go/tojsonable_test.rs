//! Emission of `to_jsonable_test.go` exercising the duration serialization.

use std::collections::BTreeSet;

use graphable_core::indention::reindent;
use graphable_core::{Go, Graph, ValueType};

use super::common::{self, WARNING};

const EXAMPLE_DURATION_TO_STRING: &str = r#"func ExampleDurationToString_oneYear() {
    d := 365 * 24 * time.Hour
    s := durationToString(d)
    fmt.Println(s)
    // Output: P365D
}

func ExampleDurationToString_negativeYear() {
    d := -365 * 24 * time.Hour
    s := durationToString(d)
    fmt.Println(s)
    // Output: -P365D
}

func ExampleDurationToString_hoursMinutesSeconds() {
    d := time.Hour + 2*time.Minute + 3*time.Second
    s := durationToString(d)
    fmt.Println(s)
    // Output: PT1H2M3S
}

func ExampleDurationToString_daysHoursMinutesSeconds() {
    d := 24*time.Hour + 2*time.Hour + 3*time.Minute + 4*time.Second
    s := durationToString(d)
    fmt.Println(s)
    // Output: P1DT2H3M4S
}

func ExampleDurationToString_secondsNanoseconds() {
    d := 1*time.Second + time.Nanosecond
    s := durationToString(d)
    fmt.Println(s)
    // Output: PT1.000000001S
}

func ExampleDurationToString_secondsManyNanoseconds() {
    d := 1*time.Second + 1000*time.Nanosecond
    s := durationToString(d)
    fmt.Println(s)
    // Output: PT1.000001S
}

func ExampleDurationToString_nanoseconds() {
    d := 1 * time.Nanosecond
    s := durationToString(d)
    fmt.Println(s)
    // Output: PT0.000000001S
}"#;

/// Generate the source file testing the serialization to a JSONable.
pub(crate) fn generate(graph: &Graph, go: &Go) -> String {
    let mut blocks = vec![format!("package {}", go.package), WARNING.to_string()];

    let has_duration = graph.has_type(|t| matches!(t, ValueType::Duration));

    if has_duration {
        blocks.push(common::import_declarations(&BTreeSet::from([
            "fmt", "time",
        ])));
        blocks.push(EXAMPLE_DURATION_TO_STRING.to_string());
    }

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, "\t")
}
