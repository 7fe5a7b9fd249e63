// ABOUTME: End-to-end tests running whole programs and checking their output

use elang::builtins;
use elang::error::ElangError;
use elang::eval::Evaluator;
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

/// Run a program with captured output and no input
fn run(source: &str) -> String {
    run_with_input(source, "")
}

fn run_with_input(source: &str, input: &str) -> String {
    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(input.as_bytes().to_vec())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(".", out.clone(), reader);
    evaluator
        .run_program(source, &env)
        .expect("program should succeed");
    let bytes = out.borrow().clone();
    String::from_utf8(bytes).expect("output should be UTF-8")
}

/// Run a program expected to fail and return the error
fn run_err(source: &str) -> ElangError {
    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(".", out, reader);
    evaluator
        .run_program(source, &env)
        .expect_err("program should fail")
}

#[test]
fn test_hello_world() {
    assert_eq!(run(r#"say("Hello, world!").newl"#), "Hello, world!\n");
}

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(run("say(2 + 3 * 4).newl"), "14\n");
    assert_eq!(run("say(2 ** 3 ** 2).newl"), "512\n");
}

#[test]
fn test_integer_division_promotes_when_inexact() {
    assert_eq!(run("say(6 / 2).newl"), "3\n");
    assert_eq!(run("say(1 / 2).newl"), "0.5\n");
}

#[test]
fn test_closure_capture() {
    let source = r#"
fn make_counter(start) { return () => start + 1 }
c = make_counter(10)
say(c()).newl
"#;
    assert_eq!(run(source), "11\n");
}

#[test]
fn test_closure_outlives_its_function() {
    let source = r#"
fn outer() {
    x = 1
    fn inner() { return x }
    return inner
}
f = outer()
say(f()).newl
"#;
    assert_eq!(run(source), "1\n");
}

#[test]
fn test_assignment_does_not_rebind_outer() {
    // '=' writes the current frame, so the closure cannot overwrite
    // the captured variable.
    let source = r#"
x = 1
fn clobber() { x = 99 }
clobber()
say(x).newl
"#;
    assert_eq!(run(source), "1\n");
}

#[test]
fn test_for_range_with_step() {
    assert_eq!(run("for (i in 1..10 step 3) { say(i).space }"), "1 4 7 10 ");
}

#[test]
fn test_for_range_reverse() {
    assert_eq!(
        run("for (i in 10..1 step 3 reverse) { say(i).space }"),
        "10 7 4 1 "
    );
}

#[test]
fn test_for_range_single_and_empty() {
    assert_eq!(run("for (i in 5..5) { say(i).space }"), "5 ");
    assert_eq!(run("for (i in 5..5 reverse) { say(i).space }"), "5 ");
    assert_eq!(run("for (i in 3..1) { say(i).space }"), "");
    assert_eq!(run("for (i in 3..1 reverse) { say(i).space }"), "3 2 1 ");
}

#[test]
fn test_map_filter_with_lambda() {
    assert_eq!(
        run("say([1,2,3,4].filter(x => x > 2).map(x => x * 10)).newl"),
        "[30, 40]\n"
    );
}

#[test]
fn test_interpolated_string() {
    let source = "name = \"Ada\"\nsay(\"Hello, {name}! 1+1={1+1}\").newl";
    assert_eq!(run(source), "Hello, Ada! 1+1=2\n");
}

#[test]
fn test_division_by_zero_reports_position() {
    let err = run_err("say(1/0).newl");
    assert_eq!(err.kind_name(), "runtime error");
    assert_eq!(err.message(), "Division by zero");
    assert_eq!(err.position().0, 1);
}

#[test]
fn test_say_multiple_values_join_with_spaces() {
    assert_eq!(run("say(1, 2, 3).newl"), "1 2 3\n");
    assert_eq!(run(r#"say("x =", 42).newl"#), "x = 42\n");
}

#[test]
fn test_empty_say_honors_modifiers() {
    assert_eq!(run("say().newl.tab"), "\n\t");
}

#[test]
fn test_say_modifier_order() {
    assert_eq!(run("say(1).tab.newl"), "1\t\n");
}

#[test]
fn test_take_with_prompt() {
    let output = run_with_input(
        "name = take(\"Who? \")\nsay(\"Hi, \" + name).newl",
        "Ada\n",
    );
    assert_eq!(output, "Who? Hi, Ada\n");
}

#[test]
fn test_take_at_end_of_input_returns_empty_string() {
    assert_eq!(run_with_input("say(len(take())).newl", ""), "0\n");
}

#[test]
fn test_truthiness_of_empty_collections() {
    assert_eq!(run("if [] { say(1).newl } else { say(2).newl }"), "2\n");
    assert_eq!(run("if {} { say(1).newl } else { say(2).newl }"), "2\n");
    assert_eq!(run("if \"\" { say(1).newl } else { say(2).newl }"), "2\n");
    assert_eq!(run("if 0 { say(1).newl } else { say(2).newl }"), "2\n");
}

#[test]
fn test_and_or_return_booleans() {
    assert_eq!(run("say(1 and 2).newl"), "true\n");
    assert_eq!(run("say(0 or \"x\").newl"), "true\n");
    assert_eq!(run("say(0 and 1).newl"), "false\n");
    assert_eq!(run("say(not 0).newl"), "true\n");
}

#[test]
fn test_while_with_break_and_continue() {
    let source = r#"
n = 0
while true {
    n += 1
    if n == 3 { continue }
    if n > 5 { break }
    say(n).space
}
"#;
    assert_eq!(run(source), "1 2 4 5 ");
}

#[test]
fn test_break_outside_loop_is_an_error() {
    let err = run_err("break");
    assert_eq!(err.kind_name(), "runtime error");
    assert!(err.message().contains("break"));
}

#[test]
fn test_for_each_over_string_list_and_map() {
    assert_eq!(run("for (c in \"abc\") { say(c).space }"), "a b c ");
    assert_eq!(run("for (x in [10, 20]) { say(x).space }"), "10 20 ");
    assert_eq!(
        run("for (k in {\"b\": 1, \"a\": 2}) { say(k).space }"),
        "b a "
    );
}

#[test]
fn test_map_iteration_preserves_insertion_order() {
    let source = r#"
m = {"z": 1, "a": 2}
m["m"] = 3
say(m).newl
say(m.keys).newl
say(m.values).newl
"#;
    assert_eq!(run(source), "{z: 1, a: 2, m: 3}\n[z, a, m]\n[1, 2, 3]\n");
}

#[test]
fn test_map_field_access() {
    let source = r#"
user = {"name": "Ada", "age": 36}
say(user.name).newl
say(user.length).newl
"#;
    assert_eq!(run(source), "Ada\n2\n");
}

#[test]
fn test_list_aliasing_is_visible_to_the_caller() {
    let source = r#"
fn grow(xs) { xs.push(4) }
nums = [1, 2, 3]
grow(nums)
say(nums).newl
"#;
    assert_eq!(run(source), "[1, 2, 3, 4]\n");
}

#[test]
fn test_index_get_and_set() {
    let source = r#"
xs = [1, 2, 3]
xs[1] = 20
say(xs[1]).newl
m = {"a": 1}
m["b"] = 2
say(m["b"]).newl
"#;
    assert_eq!(run(source), "20\n2\n");
}

#[test]
fn test_index_out_of_range() {
    let err = run_err("xs = [1]\nsay(xs[3]).newl");
    assert!(err.message().contains("out of range"));
    assert_eq!(err.position().0, 2);
}

#[test]
fn test_missing_map_key_is_an_error() {
    let err = run_err("m = {\"a\": 1}\nsay(m[\"b\"]).newl");
    assert!(err.message().contains("no key"));
}

#[test]
fn test_undefined_variable() {
    let err = run_err("say(ghost).newl");
    assert!(err.message().contains("ghost"));
}

#[test]
fn test_arity_mismatch() {
    let err = run_err("fn f(a, b) { return a }\nf(1)");
    assert!(err.message().contains("2 arguments"));
}

#[test]
fn test_function_without_return_yields_none() {
    assert_eq!(run("fn f() { }\nsay(f()).newl"), "none\n");
}

#[test]
fn test_compound_assignment_reads_through_the_chain() {
    let source = r#"
total = 0
for (i in 1..4) { total += i }
say(total).newl
"#;
    assert_eq!(run(source), "10\n");
}

#[test]
fn test_string_concat_coerces_display_form() {
    assert_eq!(run("say(\"n=\" + 3).newl"), "n=3\n");
    assert_eq!(run("say(1 + \"x\").newl"), "1x\n");
    assert_eq!(run("s = \"v\"\ns += 2\nsay(s).newl"), "v2\n");
}

#[test]
fn test_length_method_agrees_with_len() {
    assert_eq!(run("s = \"hello\"\nsay(s.length == len(s)).newl"), "true\n");
    assert_eq!(run("l = [1, 2]\nsay(l.length == len(l)).newl"), "true\n");
}

#[test]
fn test_push_then_pop_restores_the_list() {
    let source = r#"
l = [1, 2]
l.push(9)
v = l.pop()
say(v).newl
say(l).newl
"#;
    assert_eq!(run(source), "9\n[1, 2]\n");
}

#[test]
fn test_step_zero_is_an_error() {
    let err = run_err("for (i in 1..3 step 0) { }");
    assert!(err.message().contains("step"));
}

#[test]
fn test_recursion_limit_is_a_clean_error() {
    let err = run_err("fn loop_forever() { return loop_forever() }\nloop_forever()");
    assert_eq!(err.message(), "Maximum recursion depth exceeded");
}

#[test]
fn test_recursive_function_within_the_limit() {
    let source = r#"
fn fib(n) {
    if n < 2 { return n }
    return fib(n - 1) + fib(n - 2)
}
say(fib(10)).newl
"#;
    assert_eq!(run(source), "55\n");
}

#[test]
fn test_builtin_math_module() {
    let source = r#"
use math
say(math.sqrt(16)).newl
say(math.floor(2.7)).newl
say(math.abs(-3)).newl
"#;
    assert_eq!(run(source), "4\n2\n3\n");
}

#[test]
fn test_builtin_random_module_stays_in_range() {
    let source = r#"
use random
n = random.randint(1, 6)
say(n >= 1 and n <= 6).newl
x = random.random()
say(x >= 0 and x < 1).newl
"#;
    assert_eq!(run(source), "true\ntrue\n");
}

#[test]
fn test_module_loading_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("util.elang"),
        "fn double(x) { return x * 2 }\n",
    )
    .expect("write module");

    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(dir.path(), out.clone(), reader);
    evaluator
        .run_program("use util\nsay(util.double(21)).newl", &env)
        .expect("program should succeed");
    assert_eq!(
        String::from_utf8(out.borrow().clone()).unwrap(),
        "42\n"
    );
}

#[test]
fn test_module_resolved_from_modules_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir(dir.path().join("modules")).expect("mkdir");
    std::fs::write(
        dir.path().join("modules/extra.elang"),
        "greeting = \"hey\"\n",
    )
    .expect("write module");

    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(dir.path(), out.clone(), reader);
    evaluator
        .run_program("use extra\nsay(extra.greeting).newl", &env)
        .expect("program should succeed");
    assert_eq!(String::from_utf8(out.borrow().clone()).unwrap(), "hey\n");
}

#[test]
fn test_missing_module_is_a_runtime_error() {
    let err = run_err("use nothing_here");
    assert_eq!(err.kind_name(), "runtime error");
    assert!(err.message().contains("nothing_here"));
}

#[test]
fn test_command_catalog() {
    let output = run("&&who.is.eusha");
    assert!(output.contains("Eusha"));
}

#[test]
fn test_unknown_command_warns_and_continues() {
    let output = run("&&no.such.thing\nsay(1).newl");
    assert!(output.contains("Unknown command 'no.such.thing'"));
    assert!(output.ends_with("1\n"));
}

#[test]
fn test_unknown_method_is_an_error() {
    let err = run_err("say([1].explode()).newl");
    assert!(err.message().contains("explode"));
}

#[test]
fn test_shared_environment_across_programs() {
    // The REPL runs each line as its own program over one environment
    let out = Rc::new(RefCell::new(Vec::<u8>::new()));
    let reader = Rc::new(RefCell::new(Cursor::new(Vec::new())));
    let env = builtins::global_env();
    let mut evaluator = Evaluator::with_io(".", out.clone(), reader);

    evaluator.run_program("x = 41", &env).expect("assign");
    evaluator
        .run_program("say(x + 1).newl", &env)
        .expect("read back");
    assert_eq!(String::from_utf8(out.borrow().clone()).unwrap(), "42\n");
}

#[test]
fn test_nested_if_else_chain() {
    let source = r#"
fn grade(n) {
    if n >= 90 { return "A" } else if n >= 80 { return "B" } else { return "C" }
}
say(grade(95), grade(85), grade(10)).newl
"#;
    assert_eq!(run(source), "A B C\n");
}

#[test]
fn test_lambda_with_multiple_params() {
    assert_eq!(run("add = (a, b) => a + b\nsay(add(2, 3)).newl"), "5\n");
}

#[test]
fn test_help_lists_topics() {
    let output = run("help()");
    for topic in ["say", "take", "for", "len", "help"] {
        assert!(output.contains(topic), "help() should list {}", topic);
    }
}

#[test]
fn test_help_topic_and_unknown_topic() {
    assert!(run("help(\"for\")").contains("reverse"));
    assert!(run("help(\"nonsense\")").contains("No help available"));
}

#[test]
fn test_comments_are_ignored() {
    let source = "$$ leading comment\nsay(1).newl $$ trailing\n$$ done\n";
    assert_eq!(run(source), "1\n");
}
