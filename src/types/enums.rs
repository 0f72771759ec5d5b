use std::fmt;

/// Name used when printing a value outside the formatter's range
pub const INVALID_ENUM_NAME: &str = "Invalid";

/// Maps a closed set of names onto consecutive integers
///
/// The first name maps to `first`, the next to `first + 1`, and so on.
/// Aliases add extra spellings that parse to an existing value but are never
/// printed. Formatters are built in `const` context and live in `static`s.
#[derive(Debug, Clone, Copy)]
pub struct EnumFormatter {
    names: &'static [&'static str],
    first: i64,
    aliases: &'static [(&'static str, i64)],
}

impl EnumFormatter {
    pub const fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            first: 0,
            aliases: &[],
        }
    }

    pub const fn starting_at(self, first: i64) -> Self {
        Self { first, ..self }
    }

    pub const fn with_aliases(self, aliases: &'static [(&'static str, i64)]) -> Self {
        Self { aliases, ..self }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn aliases(&self) -> &'static [(&'static str, i64)] {
        self.aliases
    }

    fn contains(&self, value: i64) -> bool {
        value >= self.first && value < self.first + self.names.len() as i64
    }

    /// Canonical name for `value`, or `"Invalid"`
    pub fn print(&self, value: i64) -> &'static str {
        if self.contains(value) {
            self.names[(value - self.first) as usize]
        } else {
            INVALID_ENUM_NAME
        }
    }

    /// Case-insensitive lookup by name or alias; in-range integers are accepted too
    pub fn parse(&self, input: &str) -> Option<i64> {
        let input = input.trim();
        if let Some(index) = self
            .names
            .iter()
            .position(|name| name.eq_ignore_ascii_case(input))
        {
            return Some(self.first + index as i64);
        }
        if let Some((_, value)) = self
            .aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(input))
        {
            return Some(*value);
        }
        input.parse::<i64>().ok().filter(|v| self.contains(*v))
    }
}

/// Severity attached to a message item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLevel {
    #[default]
    Unknown = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
}

pub static MESSAGE_LEVELS: EnumFormatter =
    EnumFormatter::new(&["Unknown", "Error", "Warning", "Info", "Debug"]);

impl MessageLevel {
    pub const COUNT: usize = 5;

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Error),
            2 => Some(Self::Warning),
            3 => Some(Self::Info),
            4 => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        MESSAGE_LEVELS.parse(input).and_then(Self::from_value)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MESSAGE_LEVELS.print(*self as i64))
    }
}

/// One unit of a message after splitting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageItem {
    pub text: String,
    pub level: MessageLevel,
}

impl MessageItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: MessageLevel::Unknown,
        }
    }

    pub fn with_level(mut self, level: MessageLevel) -> Self {
        self.level = level;
        self
    }
}
