// ABOUTME: Help topic catalog backing the help() free function

/// Topics in listing order. Each entry pairs a topic name with a short
/// usage text ending in an example line.
const TOPICS: &[(&str, &str)] = &[
    (
        "say",
        "say(expr) prints a value. Chain .newl, .space or .tab to append\n\
         a newline, space or tab. Multiple values join with spaces.\n\
         Example: say(\"total:\", 42).newl",
    ),
    (
        "take",
        "take() reads one line of input as a string. An optional prompt\n\
         is printed first without a newline.\n\
         Example: name = take(\"Your name: \")",
    ),
    (
        "if",
        "if runs a block when a condition is true, with optional else\n\
         and else if branches.\n\
         Example: if x > 3 { say(\"big\").newl } else { say(\"small\").newl }",
    ),
    (
        "for",
        "for iterates a range or a value. Ranges include both ends and\n\
         accept step and reverse; strings, lists and maps are iterable.\n\
         Example: for (i in 1..5 step 2) { say(i).space }",
    ),
    (
        "while",
        "while repeats a block as long as its condition stays true.\n\
         Example: while n > 0 { n -= 1 }",
    ),
    (
        "fn",
        "fn defines a function. Functions capture the scope they were\n\
         defined in and return none when no return runs.\n\
         Example: fn double(x) { return x * 2 }",
    ),
    (
        "return",
        "return leaves the current function with a value, or none when\n\
         the value is omitted.\n\
         Example: return x + 1",
    ),
    (
        "use",
        "use loads a module: built-in math or random, or NAME.elang\n\
         found next to the script or under modules/.\n\
         Example: use math",
    ),
    (
        "break",
        "break leaves the innermost loop immediately.\n\
         Example: while true { break }",
    ),
    (
        "continue",
        "continue skips to the next iteration of the innermost loop.\n\
         Example: for (i in 1..5) { if i == 3 { continue } say(i).space }",
    ),
    (
        "len",
        "len(x) returns the length of a string or list.\n\
         Example: len(\"hello\")",
    ),
    (
        "help",
        "help() lists topics; help(\"topic\") shows one of them.\n\
         Example: help(\"for\")",
    ),
];

/// The text printed by a bare help() call
pub fn overview() -> String {
    let mut text = String::from("Help topics:\n");
    for (name, _) in TOPICS {
        text.push_str("  ");
        text.push_str(name);
        text.push('\n');
    }
    text.push_str("Call help(\"topic\") for details.\n");
    text
}

pub fn topic(name: &str) -> Option<&'static str> {
    TOPICS
        .iter()
        .find(|(topic, _)| *topic == name)
        .map(|(_, text)| *text)
}
