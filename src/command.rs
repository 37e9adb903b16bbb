/// A recognised chat command: the text after the trigger prefix, trimmed,
/// with the configured greeting substituted when nothing follows the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub body: String,
}

/// Parse `raw` against the trigger `prefix` (case-sensitive). Returns `None`
/// when the message does not carry the prefix; such messages never enter
/// the pipeline. The prefix must be the whole leading token: "/devopsx" is
/// not a "/devops" command.
pub fn parse(raw: &str, prefix: &str, greeting: &str) -> Option<Command> {
    let rest = raw.strip_prefix(prefix)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let body = rest.trim();
    let body = if body.is_empty() { greeting } else { body };
    Some(Command {
        body: body.to_string(),
    })
}
