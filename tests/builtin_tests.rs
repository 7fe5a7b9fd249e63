// ABOUTME: Coverage for the built-in method tables and free functions

use elang::builtins;
use elang::error::ElangError;
use elang::eval::Evaluator;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

fn run(source: &str) -> String {
    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(".", out.clone(), reader);
    evaluator
        .run_program(source, &env)
        .expect("program should succeed");
    let bytes = out.borrow().clone();
    String::from_utf8(bytes).expect("output should be UTF-8")
}

fn run_err(source: &str) -> ElangError {
    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(".", out, reader);
    evaluator
        .run_program(source, &env)
        .expect_err("program should fail")
}

// ---------------------------------------------------------------------
// String methods
// ---------------------------------------------------------------------

#[test]
fn test_string_case_methods() {
    assert_eq!(run("say(\"hey\".upper()).newl"), "HEY\n");
    assert_eq!(run("say(\"HEY\".lower()).newl"), "hey\n");
}

#[test]
fn test_string_trim_and_contains() {
    assert_eq!(run("say(\"  pad  \".trim()).newl"), "pad\n");
    assert_eq!(run("say(\"hello\".contains(\"ell\")).newl"), "true\n");
    assert_eq!(run("say(\"hello\".contains(\"xyz\")).newl"), "false\n");
}

#[test]
fn test_string_split_variants() {
    assert_eq!(run("say(\"a b  c\".split()).newl"), "[a, b, c]\n");
    assert_eq!(run("say(\"a,b,c\".split(\",\")).newl"), "[a, b, c]\n");
}

#[test]
fn test_string_replace() {
    assert_eq!(run("say(\"ababa\".replace(\"b\", \"-\")).newl"), "a-a-a\n");
}

#[test]
fn test_string_conversions() {
    assert_eq!(run("say(\"42\".to_int() + 1).newl"), "43\n");
    assert_eq!(run("say(\"2.5\".to_float()).newl"), "2.5\n");
    assert_eq!(run("say((42).to_str() + \"!\").newl"), "42!\n");
}

#[test]
fn test_string_to_int_failure() {
    let err = run_err("say(\"abc\".to_int()).newl");
    assert!(err.message().contains("abc"));
}

#[test]
fn test_string_methods_work_without_parens() {
    // Zero-argument methods double as field reads
    assert_eq!(run("say(\"hey\".length).newl"), "3\n");
    assert_eq!(run("say(\"hey\".upper).newl"), "HEY\n");
}

// ---------------------------------------------------------------------
// List methods
// ---------------------------------------------------------------------

#[test]
fn test_list_push_returns_the_list() {
    assert_eq!(run("say([1].push(2).push(3)).newl"), "[1, 2, 3]\n");
}

#[test]
fn test_list_pop_empty_is_an_error() {
    let err = run_err("[].pop()");
    assert!(err.message().contains("empty"));
}

#[test]
fn test_list_sort_numbers_in_place() {
    let source = "xs = [3, 1.5, 2]\nxs.sort\nsay(xs).newl";
    assert_eq!(run(source), "[1.5, 2, 3]\n");
}

#[test]
fn test_list_sort_strings() {
    assert_eq!(run("say([\"b\", \"a\"].sort()).newl"), "[a, b]\n");
}

#[test]
fn test_list_sort_mixed_is_an_error() {
    let err = run_err("[1, \"a\"].sort()");
    assert!(err.message().contains("sort"));
}

#[test]
fn test_list_reverse_in_place() {
    let source = "xs = [1, 2, 3]\nxs.reverse\nsay(xs).newl";
    assert_eq!(run(source), "[3, 2, 1]\n");
}

#[test]
fn test_list_sum_min_max() {
    assert_eq!(run("say([1, 2, 3].sum).newl"), "6\n");
    assert_eq!(run("say([1, 2.5].sum).newl"), "3.5\n");
    assert_eq!(run("say([3, 1, 2].min).newl"), "1\n");
    assert_eq!(run("say([3, 1, 2].max).newl"), "3\n");
    assert_eq!(run("say([\"pear\", \"apple\"].min).newl"), "apple\n");
}

#[test]
fn test_list_min_empty_is_an_error() {
    let err = run_err("[].min");
    assert!(err.message().contains("empty"));
}

#[test]
fn test_list_map_with_named_function() {
    let source = r#"
fn square(x) { return x * x }
say([1, 2, 3].map(square)).newl
"#;
    assert_eq!(run(source), "[1, 4, 9]\n");
}

#[test]
fn test_list_filter_truthiness() {
    assert_eq!(
        run("say([0, 1, \"\", \"x\", none].filter(v => v)).newl"),
        "[1, x]\n"
    );
}

#[test]
fn test_list_map_requires_a_callable() {
    let err = run_err("[1].map(2)");
    assert!(err.message().contains("function"));
}

// ---------------------------------------------------------------------
// Map methods
// ---------------------------------------------------------------------

#[test]
fn test_map_has() {
    let source = "m = {\"a\": 1}\nsay(m.has(\"a\"), m.has(\"b\")).newl";
    assert_eq!(run(source), "true false\n");
}

#[test]
fn test_map_non_string_keys() {
    let source = "m = {1: \"one\", true: \"yes\"}\nsay(m[1], m[true]).newl";
    assert_eq!(run(source), "one yes\n");
}

#[test]
fn test_map_field_get_prefers_entries_over_methods() {
    // An entry named like a method wins on field access
    let source = "m = {\"length\": 99}\nsay(m.length).newl";
    assert_eq!(run(source), "99\n");
}

// ---------------------------------------------------------------------
// Conversions on any value
// ---------------------------------------------------------------------

#[test]
fn test_float_to_int_truncates() {
    assert_eq!(run("say((2.9).to_int()).newl"), "2\n");
}

#[test]
fn test_int_to_float() {
    assert_eq!(run("say((2).to_float() + 0.5).newl"), "2.5\n");
}

#[test]
fn test_list_to_str() {
    assert_eq!(run("say([1, 2].to_str() + \"!\").newl"), "[1, 2]!\n");
}

// ---------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------

#[test]
fn test_len_on_strings_and_lists() {
    assert_eq!(run("say(len(\"hello\")).newl"), "5\n");
    assert_eq!(run("say(len([1, 2, 3])).newl"), "3\n");
}

#[test]
fn test_len_on_other_types_is_an_error() {
    let err = run_err("len(42)");
    assert!(err.message().contains("len"));
}

#[test]
fn test_len_arity() {
    let err = run_err("len()");
    assert!(err.message().contains("argument"));
}

// ---------------------------------------------------------------------
// Built-in modules
// ---------------------------------------------------------------------

#[test]
fn test_math_constants() {
    assert_eq!(run("use math\nsay(math.pi > 3.14 and math.pi < 3.15).newl"), "true\n");
    assert_eq!(run("use math\nsay(math.e > 2.71 and math.e < 2.72).newl"), "true\n");
}

#[test]
fn test_math_functions() {
    assert_eq!(run("use math\nsay(math.ceil(1.2)).newl"), "2\n");
    assert_eq!(run("use math\nsay(math.round(2.5)).newl"), "3\n");
    assert_eq!(run("use math\nsay(math.pow(2, 10)).newl"), "1024\n");
    assert_eq!(run("use math\nsay(math.sin(0)).newl"), "0\n");
}

#[test]
fn test_math_log_rejects_non_positive() {
    let err = run_err("use math\nmath.log(0)");
    assert!(err.message().contains("positive"));
}

#[test]
fn test_random_choice_and_shuffle() {
    let source = r#"
use random
xs = [1, 2, 3]
c = random.choice(xs)
say(c >= 1 and c <= 3).newl
shuffled = random.shuffle(xs)
say(shuffled.length).newl
say(shuffled.sort()).newl
"#;
    assert_eq!(run(source), "true\n3\n[1, 2, 3]\n");
}

#[test]
fn test_random_choice_empty_is_an_error() {
    let err = run_err("use random\nrandom.choice([])");
    assert!(err.message().contains("empty"));
}

#[test]
fn test_random_uniform_range() {
    let source = "use random\nx = random.uniform(1, 2)\nsay(x >= 1 and x < 2).newl";
    assert_eq!(run(source), "true\n");
}

#[test]
fn test_randint_rejects_empty_range() {
    let err = run_err("use random\nrandom.randint(5, 1)");
    assert!(err.message().contains("range"));
}

#[test]
fn test_module_member_missing() {
    let err = run_err("use math\nsay(math.nope).newl");
    assert!(err.message().contains("nope"));
}
