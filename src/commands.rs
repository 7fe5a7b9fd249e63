// ABOUTME: Catalog of canned texts behind the `&&` command form

/// Fixed command catalog; the dotted path is matched exactly
const COMMANDS: &[(&str, &str)] = &[(
    "who.is.eusha",
    "Eusha is the creator of the Eusha language, built to make a first\n\
     programming language feel friendly: say what you mean, take what\n\
     you need, and keep going.",
)];

pub fn lookup(path: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, text)| *text)
}
