use std::fmt;

/// Machine-readable error codes shown next to user-facing notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigReadError,
    ConfigParseError,
    EmptyTitle,
    DuplicateTitle,
    InvalidReplayLine,
    TerminalIo,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigReadError => "E1001",
            Self::ConfigParseError => "E1002",
            Self::EmptyTitle => "E2001",
            Self::DuplicateTitle => "E2002",
            Self::InvalidReplayLine => "E3001",
            Self::TerminalIo => "E5001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigReadError => "Config file could not be read",
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyTitle => "Task title is empty",
            Self::DuplicateTitle => "Task already registered",
            Self::InvalidReplayLine => "Invalid replay line",
            Self::TerminalIo => "Terminal I/O failed",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigReadError => Some("Check the path passed with --config and its permissions."),
            Self::ConfigParseError => Some("Fix syntax in tasklist/config.toml and retry."),
            Self::EmptyTitle => None,
            Self::DuplicateTitle => Some("You cannot register a task with the same name"),
            Self::InvalidReplayLine => Some(
                "Use one of: add <title>, toggle <id>, remove <id>, edit <id>, draft <id> <text>, cancel <id>, commit <id> [title].",
            ),
            Self::TerminalIo => Some("Run inside an interactive terminal."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;
    use std::collections::HashSet;

    #[test]
    fn all_codes_are_unique() {
        let all = [
            ErrorCode::ConfigReadError,
            ErrorCode::ConfigParseError,
            ErrorCode::EmptyTitle,
            ErrorCode::DuplicateTitle,
            ErrorCode::InvalidReplayLine,
            ErrorCode::TerminalIo,
        ];

        let mut seen = HashSet::new();
        for code in all {
            assert!(seen.insert(code.code()), "duplicate code {}", code.code());
        }
    }

    #[test]
    fn code_format_is_machine_friendly() {
        let code = ErrorCode::DuplicateTitle.code();
        assert_eq!(code.len(), 5);
        assert!(code.starts_with('E'));
        assert!(code.chars().skip(1).all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn duplicate_title_carries_notice_text() {
        assert_eq!(ErrorCode::DuplicateTitle.message(), "Task already registered");
        assert_eq!(
            ErrorCode::DuplicateTitle.hint(),
            Some("You cannot register a task with the same name")
        );
    }
}
