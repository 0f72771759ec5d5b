//! Static field descriptors
//!
//! Each config type publishes an ordered table of `ConfigField`s. A field
//! knows its query keys, its default, how to read and write the value on the
//! config, and how to parse and print that value as a string.

use crate::errors::{NotifyError, NotifyResult};
use crate::types::EnumFormatter;

/// URL component a field is bound to instead of (or in addition to) a query key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UrlPart {
    User,
    Password,
    Host,
    Port,
    Path,
}

impl UrlPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Password => "password",
            Self::Host => "host",
            Self::Port => "port",
            Self::Path => "path",
        }
    }
}

/// Typed accessor pair for one field
pub enum FieldKind<C> {
    Text {
        get: fn(&C) -> String,
        set: fn(&mut C, String),
    },
    Flag {
        get: fn(&C) -> bool,
        set: fn(&mut C, bool),
    },
    Unsigned {
        get: fn(&C) -> u64,
        set: fn(&mut C, u64),
        base: u32,
        max: u64,
    },
    Signed {
        get: fn(&C) -> i64,
        set: fn(&mut C, i64),
        min: i64,
        max: i64,
    },
    Enum {
        get: fn(&C) -> i64,
        set: fn(&mut C, i64),
        formatter: &'static EnumFormatter,
    },
    List {
        get: fn(&C) -> Vec<String>,
        set: fn(&mut C, Vec<String>),
        separator: char,
    },
}

enum FieldValue {
    Text(String),
    Flag(bool),
    Unsigned(u64),
    Signed(i64),
    Enum(i64),
    List(Vec<String>),
}

/// Descriptor for one configurable field of `C`
pub struct ConfigField<C> {
    name: &'static str,
    keys: &'static [&'static str],
    url_part: Option<UrlPart>,
    default: Option<&'static str>,
    description: &'static str,
    required: bool,
    kind: FieldKind<C>,
}

impl<C> ConfigField<C> {
    fn with_kind(name: &'static str, kind: FieldKind<C>) -> Self {
        Self {
            name,
            keys: &[],
            url_part: None,
            default: None,
            description: "",
            required: false,
            kind,
        }
    }

    pub fn text(name: &'static str, get: fn(&C) -> String, set: fn(&mut C, String)) -> Self {
        Self::with_kind(name, FieldKind::Text { get, set })
    }

    pub fn flag(name: &'static str, get: fn(&C) -> bool, set: fn(&mut C, bool)) -> Self {
        Self::with_kind(name, FieldKind::Flag { get, set })
    }

    pub fn unsigned(name: &'static str, get: fn(&C) -> u64, set: fn(&mut C, u64)) -> Self {
        Self::with_kind(
            name,
            FieldKind::Unsigned {
                get,
                set,
                base: 10,
                max: u64::MAX,
            },
        )
    }

    pub fn signed(name: &'static str, get: fn(&C) -> i64, set: fn(&mut C, i64)) -> Self {
        Self::with_kind(
            name,
            FieldKind::Signed {
                get,
                set,
                min: i64::MIN,
                max: i64::MAX,
            },
        )
    }

    pub fn enumeration(
        name: &'static str,
        formatter: &'static EnumFormatter,
        get: fn(&C) -> i64,
        set: fn(&mut C, i64),
    ) -> Self {
        Self::with_kind(name, FieldKind::Enum { get, set, formatter })
    }

    pub fn list(
        name: &'static str,
        separator: char,
        get: fn(&C) -> Vec<String>,
        set: fn(&mut C, Vec<String>),
    ) -> Self {
        Self::with_kind(name, FieldKind::List { get, set, separator })
    }

    /// Query keys; the first one is used when building URLs
    pub fn keys(mut self, keys: &'static [&'static str]) -> Self {
        self.keys = keys;
        self
    }

    pub fn url(mut self, part: UrlPart) -> Self {
        self.url_part = Some(part);
        self
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Numeric base for unsigned fields; 16 prints with a `0x` prefix
    pub fn base(mut self, radix: u32) -> Self {
        if let FieldKind::Unsigned { base, .. } = &mut self.kind {
            *base = radix;
        }
        self
    }

    /// Upper bound for unsigned fields
    pub fn max(mut self, limit: u64) -> Self {
        if let FieldKind::Unsigned { max, .. } = &mut self.kind {
            *max = limit;
        }
        self
    }

    /// Inclusive bounds for signed fields
    pub fn range(mut self, lower: i64, upper: i64) -> Self {
        if let FieldKind::Signed { min, max, .. } = &mut self.kind {
            *min = lower;
            *max = upper;
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn key_names(&self) -> &'static [&'static str] {
        self.keys
    }

    pub fn primary_key(&self) -> Option<&'static str> {
        self.keys.first().copied()
    }

    pub fn url_part(&self) -> Option<UrlPart> {
        self.url_part
    }

    pub fn default(&self) -> Option<&'static str> {
        self.default
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_query(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn matches_key(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k.eq_ignore_ascii_case(key))
    }

    pub fn enum_formatter(&self) -> Option<&'static EnumFormatter> {
        match self.kind {
            FieldKind::Enum { formatter, .. } => Some(formatter),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            FieldKind::Text { .. } => "string",
            FieldKind::Flag { .. } => "bool",
            FieldKind::Unsigned { .. } => "uint",
            FieldKind::Signed { .. } => "int",
            FieldKind::Enum { .. } => "option",
            FieldKind::List { .. } => "list",
        }
    }

    /// String form of the field's current value on `config`
    pub fn print(&self, config: &C) -> String {
        let value = match &self.kind {
            FieldKind::Text { get, .. } => FieldValue::Text(get(config)),
            FieldKind::Flag { get, .. } => FieldValue::Flag(get(config)),
            FieldKind::Unsigned { get, .. } => FieldValue::Unsigned(get(config)),
            FieldKind::Signed { get, .. } => FieldValue::Signed(get(config)),
            FieldKind::Enum { get, .. } => FieldValue::Enum(get(config)),
            FieldKind::List { get, .. } => FieldValue::List(get(config)),
        };
        self.format_value(&value)
    }

    /// Parse `value` and assign it; `key` is only used for error text
    pub fn parse_into(&self, config: &mut C, key: &str, value: &str) -> NotifyResult<()> {
        match (&self.kind, self.parse_value(key, value)?) {
            (FieldKind::Text { set, .. }, FieldValue::Text(v)) => set(config, v),
            (FieldKind::Flag { set, .. }, FieldValue::Flag(v)) => set(config, v),
            (FieldKind::Unsigned { set, .. }, FieldValue::Unsigned(v)) => set(config, v),
            (FieldKind::Signed { set, .. }, FieldValue::Signed(v)) => set(config, v),
            (FieldKind::Enum { set, .. }, FieldValue::Enum(v)) => set(config, v),
            (FieldKind::List { set, .. }, FieldValue::List(v)) => set(config, v),
            _ => {
                return Err(NotifyError::internal(format!(
                    "field kind mismatch for '{}'",
                    self.name
                )))
            }
        }
        Ok(())
    }

    /// Canonical string form of the declared default, or of the zero value
    pub fn canonical_default(&self) -> NotifyResult<String> {
        match self.default {
            Some(raw) => {
                let value = self.parse_value(self.name, raw)?;
                Ok(self.format_value(&value))
            }
            None => Ok(self.format_value(&self.zero_value())),
        }
    }

    fn zero_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Text { .. } => FieldValue::Text(String::new()),
            FieldKind::Flag { .. } => FieldValue::Flag(false),
            FieldKind::Unsigned { .. } => FieldValue::Unsigned(0),
            FieldKind::Signed { .. } => FieldValue::Signed(0),
            FieldKind::Enum { .. } => FieldValue::Enum(0),
            FieldKind::List { .. } => FieldValue::List(Vec::new()),
        }
    }

    fn parse_value(&self, key: &str, raw: &str) -> NotifyResult<FieldValue> {
        match &self.kind {
            FieldKind::Text { .. } => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Flag { .. } => parse_bool(raw)
                .map(FieldValue::Flag)
                .ok_or_else(|| {
                    NotifyError::invalid_value(key, raw, "expected yes/no, true/false or 1/0")
                }),
            FieldKind::Unsigned { base, max, .. } => {
                let parsed = parse_unsigned(raw, *base).ok_or_else(|| {
                    NotifyError::invalid_value(key, raw, format!("expected a base {base} number"))
                })?;
                if parsed > *max {
                    return Err(NotifyError::invalid_value(
                        key,
                        raw,
                        format!("must not exceed {max}"),
                    ));
                }
                Ok(FieldValue::Unsigned(parsed))
            }
            FieldKind::Signed { min, max, .. } => {
                let parsed = raw
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| NotifyError::invalid_value(key, raw, "expected an integer"))?;
                if parsed < *min || parsed > *max {
                    return Err(NotifyError::invalid_value(
                        key,
                        raw,
                        format!("must be between {min} and {max}"),
                    ));
                }
                Ok(FieldValue::Signed(parsed))
            }
            FieldKind::Enum { formatter, .. } => formatter
                .parse(raw)
                .map(FieldValue::Enum)
                .ok_or_else(|| {
                    NotifyError::invalid_value(
                        key,
                        raw,
                        format!("expected one of: {}", formatter.names().join(", ")),
                    )
                }),
            FieldKind::List { separator, .. } => Ok(FieldValue::List(
                raw.split(*separator)
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
        }
    }

    fn format_value(&self, value: &FieldValue) -> String {
        match (&self.kind, value) {
            (FieldKind::Unsigned { base: 16, .. }, FieldValue::Unsigned(v)) => format!("0x{v:x}"),
            (FieldKind::List { separator, .. }, FieldValue::List(items)) => {
                items.join(&separator.to_string())
            }
            (FieldKind::Enum { formatter, .. }, FieldValue::Enum(v)) => {
                formatter.print(*v).to_string()
            }
            (_, FieldValue::Text(v)) => v.clone(),
            (_, FieldValue::Flag(v)) => print_bool(*v).to_string(),
            (_, FieldValue::Unsigned(v)) => v.to_string(),
            (_, FieldValue::Signed(v)) => v.to_string(),
            (_, FieldValue::Enum(v)) => v.to_string(),
            (_, FieldValue::List(items)) => items.join(","),
        }
    }
}

/// Parse one of the accepted boolean spellings
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Canonical boolean spelling used in URLs
pub fn print_bool(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn parse_unsigned(raw: &str, base: u32) -> Option<u64> {
    let raw = raw.trim();
    if base == 16 {
        let digits = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .or_else(|| raw.strip_prefix('#'))
            .unwrap_or(raw);
        u64::from_str_radix(digits, 16).ok()
    } else {
        u64::from_str_radix(raw, base).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        color: u64,
        enabled: bool,
        tags: Vec<String>,
        offset: i64,
    }

    type F = ConfigField<Sample>;

    #[test]
    fn test_hex_field_parses_prefixes_and_prints_lowercase() {
        let field = F::unsigned("Color", |c| c.color, |c, v| c.color = v)
            .keys(&["color"])
            .base(16);
        let mut sample = Sample::default();
        for input in ["0x50D9ff", "0X50d9FF", "#50d9ff", "50d9ff"] {
            field.parse_into(&mut sample, "color", input).unwrap();
            assert_eq!(field.print(&sample), "0x50d9ff");
        }
    }

    #[test]
    fn test_flag_accepts_only_known_spellings() {
        let field = F::flag("Enabled", |c| c.enabled, |c, v| c.enabled = v);
        let mut sample = Sample::default();
        field.parse_into(&mut sample, "enabled", "TRUE").unwrap();
        assert_eq!(field.print(&sample), "Yes");
        field.parse_into(&mut sample, "enabled", "0").unwrap();
        assert_eq!(field.print(&sample), "No");
        let err = field.parse_into(&mut sample, "enabled", "maybe").unwrap_err();
        assert!(matches!(err, NotifyError::InvalidValue { .. }));
    }

    #[test]
    fn test_signed_range_is_enforced() {
        let field = F::signed("Offset", |c| c.offset, |c, v| c.offset = v).range(-2, 10);
        let mut sample = Sample::default();
        assert!(field.parse_into(&mut sample, "offset", "-2").is_ok());
        assert!(field.parse_into(&mut sample, "offset", "11").is_err());
        assert!(field.parse_into(&mut sample, "offset", "ten").is_err());
        assert_eq!(sample.offset, -2);
    }

    #[test]
    fn test_list_trims_and_drops_empty_items() {
        let field = F::list("Tags", ',', |c| c.tags.clone(), |c, v| c.tags = v);
        let mut sample = Sample::default();
        field.parse_into(&mut sample, "tags", " a, b,,c ").unwrap();
        assert_eq!(sample.tags, vec!["a", "b", "c"]);
        assert_eq!(field.print(&sample), "a,b,c");
    }

    #[test]
    fn test_canonical_default() {
        let hex = F::unsigned("Color", |c| c.color, |c, v| c.color = v)
            .base(16)
            .default_value("0x50D9ff");
        assert_eq!(hex.canonical_default().unwrap(), "0x50d9ff");

        let flag = F::flag("Enabled", |c| c.enabled, |c, v| c.enabled = v);
        assert_eq!(flag.canonical_default().unwrap(), "No");
    }
}
