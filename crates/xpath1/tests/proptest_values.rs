use proptest::prelude::*;
use xpath1::value::{number_to_string, string_to_number};
use xpath1::{EvalOptions, SimpleNode, Value, VariableMap, parse};

fn normalize(input: &str) -> String {
    let vars = VariableMap::new().bind("s", Value::String(input.to_string()));
    parse("normalize-space($s)")
        .unwrap()
        .evaluate_string(&EvalOptions::<SimpleNode>::new().with_variables(vars))
        .unwrap()
}

proptest! {
    // Finite numbers survive the string round trip exactly.
    #[test]
    fn number_string_round_trip(n in proptest::num::f64::NORMAL | proptest::num::f64::SUBNORMAL | proptest::num::f64::ZERO) {
        let s = number_to_string(n);
        let back = string_to_number(&s);
        prop_assert!(back == n || (n == 0.0 && back == 0.0), "{n} -> {s} -> {back}");
    }

    #[test]
    fn formatted_numbers_never_use_exponents(n in proptest::num::f64::ANY) {
        let s = number_to_string(n);
        prop_assert!(!s.contains('e') && !s.contains('E'), "{s}");
    }

    #[test]
    fn normalize_space_is_idempotent(s in "[ \\t\\r\\na-z]{0,40}") {
        let once = normalize(&s);
        let twice = normalize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_output_has_no_runs(s in "[ \\t\\r\\na-z]{0,40}") {
        let out = normalize(&s);
        prop_assert!(!out.contains("  "));
        prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
        prop_assert!(!out.contains('\t') && !out.contains('\n') && !out.contains('\r'));
    }

    // The strict number grammar: anything the grammar rejects is NaN.
    #[test]
    fn string_to_number_rejects_exponents(mantissa in -1000i32..1000, exp in 1u32..5) {
        let s = format!("{mantissa}e{exp}");
        prop_assert!(string_to_number(&s).is_nan(), "{s}");
    }
}
