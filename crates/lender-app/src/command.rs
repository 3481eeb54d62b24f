//! Input line parsing.

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the assistant.
    Send(String),
    /// Empty line: send the seeded draft, if any.
    SendDraft,
    Select(String),
    Section(String),
    Requests,
    Details(String),
    Refresh,
    Summary,
    New,
    Session,
    Help,
    Quit,
    /// A known command given without its required argument.
    Usage(&'static str),
    Unknown(String),
}

pub fn parse(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::SendDraft;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Send(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let required = |usage: &'static str, build: fn(String) -> Command| {
        if arg.is_empty() {
            Command::Usage(usage)
        } else {
            build(arg.to_string())
        }
    };

    match name.to_ascii_lowercase().as_str() {
        "select" => required("/select <request-id>", Command::Select),
        "section" => required("/section <section name>", Command::Section),
        "details" => required("/details <request-id>", Command::Details),
        "requests" => Command::Requests,
        "refresh" => Command::Refresh,
        "summary" => Command::Summary,
        "new" => Command::New,
        "session" => Command::Session,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}
