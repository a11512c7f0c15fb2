//! Emission of `from_jsonable_test.go` exercising the duration parsing.

use std::collections::BTreeSet;

use graphable_core::indention::reindent;
use graphable_core::{Go, Graph, ValueType};

use super::common::{self, WARNING};

const EXAMPLE_DURATION_FROM_STRING: &str = r#"func ExampleDurationFromString_invalid() {
    _, err := durationFromString("some wrong text")
    if err == nil {
        panic("unexpected nil error")
    }
    fmt.Println(err.Error())
    // Output: failed to match the duration pattern on: some wrong text
}

func ExampleDurationFromString_oneYear() {
    d, err := durationFromString("P1Y")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 8765h49m12s
}

func ExampleDurationFromString_oneMonth() {
    d, err := durationFromString("P1M")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 730h29m6s
}

func ExampleDurationFromString_oneWeek() {
    d, err := durationFromString("P1W")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 168h0m0s
}

func ExampleDurationFromString_oneDay() {
    d, err := durationFromString("P1D")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 24h0m0s
}

func ExampleDurationFromString_hoursMinutesSeconds() {
    d, err := durationFromString("PT1.1H2.2M3.3S")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 1h8m15.3s
}

func ExampleDurationFromString_preciseNanoseconds() {
    d, err := durationFromString("PT0.000000001S")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 1ns
}

func ExampleDurationFromString_secondsWithTrailingZeros() {
    d, err := durationFromString("PT1.000S")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: 1s
}

func ExampleDurationFromString_negative() {
    d, err := durationFromString("-P1D")
    if err != nil {
        panic(fmt.Sprintf("unexpected error: %s", err.Error()))
    }
    fmt.Println(fmt.Sprintf("%s", d))
    // Output: -24h0m0s
}

func ExampleDurationFromString_overflow() {
    _, err := durationFromString("P300Y")
    fmt.Println(err.Error())
    // Output: overflows in nanoseconds: P300Y
}"#;

/// Generate the source file testing the parsing from a JSONable.
pub(crate) fn generate(graph: &Graph, go: &Go) -> String {
    let mut blocks = vec![format!("package {}", go.package), WARNING.to_string()];

    let has_duration = graph.has_type(|t| matches!(t, ValueType::Duration));

    if has_duration {
        blocks.push(common::import_declarations(&BTreeSet::from(["fmt"])));
        blocks.push(EXAMPLE_DURATION_FROM_STRING.to_string());
    }

    blocks.push(WARNING.to_string());

    reindent(&(blocks.join("\n\n") + "\n"), 0, "\t")
}
