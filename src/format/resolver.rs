use std::collections::BTreeMap;

use super::field::ConfigField;
use crate::errors::{NotifyError, NotifyResult};
use crate::types::EnumFormatter;

/// Implemented by every config type that publishes a field table
pub trait ConfigFields: Sized + 'static {
    fn fields() -> &'static [ConfigField<Self>];

    fn field(key: &str) -> Option<&'static ConfigField<Self>> {
        Self::fields().iter().find(|f| f.matches_key(key))
    }
}

/// Uniform string-keyed access to a config's queryable surface
pub trait ConfigQueryResolver {
    /// String form of the field bound to `key`
    fn get(&self, key: &str) -> NotifyResult<String>;

    /// Parse `value` into the field bound to `key`
    fn set(&mut self, key: &str, value: &str) -> NotifyResult<()>;

    /// Primary query keys in declaration order, excluding URL-bound-only fields
    fn query_fields(&self) -> Vec<&'static str>;

    /// Assign every declared default in field order
    fn set_default_props(&mut self) -> NotifyResult<()>;

    /// Enum formatters keyed by primary query key (or field name)
    fn enums(&self) -> BTreeMap<&'static str, &'static EnumFormatter>;

    /// Canonical default string for `key`
    fn default_for(&self, key: &str) -> NotifyResult<String>;

    fn has_key(&self, key: &str) -> bool;
}

impl<C: ConfigFields> ConfigQueryResolver for C {
    fn get(&self, key: &str) -> NotifyResult<String> {
        C::field(key)
            .map(|field| field.print(self))
            .ok_or_else(|| NotifyError::unknown_key(key))
    }

    fn set(&mut self, key: &str, value: &str) -> NotifyResult<()> {
        let field = C::field(key).ok_or_else(|| NotifyError::unknown_key(key))?;
        field.parse_into(self, key, value)
    }

    fn query_fields(&self) -> Vec<&'static str> {
        C::fields().iter().filter_map(|f| f.primary_key()).collect()
    }

    fn set_default_props(&mut self) -> NotifyResult<()> {
        for field in C::fields() {
            if let Some(default) = field.default() {
                field.parse_into(self, field.name(), default).map_err(|e| {
                    NotifyError::config_with_source(
                        format!("invalid default for field '{}'", field.name()),
                        e,
                    )
                })?;
            }
        }
        Ok(())
    }

    fn enums(&self) -> BTreeMap<&'static str, &'static EnumFormatter> {
        C::fields()
            .iter()
            .filter_map(|f| {
                f.enum_formatter()
                    .map(|fmt| (f.primary_key().unwrap_or(f.name()), fmt))
            })
            .collect()
    }

    fn default_for(&self, key: &str) -> NotifyResult<String> {
        C::field(key)
            .ok_or_else(|| NotifyError::unknown_key(key))?
            .canonical_default()
    }

    fn has_key(&self, key: &str) -> bool {
        C::field(key).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::field::UrlPart;
    use crate::types::EnumFormatter;
    use once_cell::sync::Lazy;

    static LEVELS: EnumFormatter = EnumFormatter::new(&["Low", "High"]);

    #[derive(Default, Clone, Debug, PartialEq)]
    struct Demo {
        host: String,
        title: String,
        level: i64,
        loud: bool,
    }

    type F = ConfigField<Demo>;

    static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
        vec![
            F::text("Host", |c| c.host.clone(), |c, v| c.host = v).url(UrlPart::Host),
            F::text("Title", |c| c.title.clone(), |c, v| c.title = v)
                .keys(&["title", "subject"])
                .default_value("hello"),
            F::enumeration("Level", &LEVELS, |c| c.level, |c, v| c.level = v)
                .keys(&["level"])
                .default_value("High"),
            F::flag("Loud", |c| c.loud, |c, v| c.loud = v).keys(&["loud"]),
        ]
    });

    impl ConfigFields for Demo {
        fn fields() -> &'static [ConfigField<Self>] {
            &FIELDS
        }
    }

    #[test]
    fn test_query_fields_exclude_url_bound() {
        assert_eq!(Demo::default().query_fields(), vec!["title", "level", "loud"]);
    }

    #[test]
    fn test_defaults_applied_in_order() {
        let mut demo = Demo::default();
        demo.set_default_props().unwrap();
        assert_eq!(demo.title, "hello");
        assert_eq!(demo.level, 1);
        assert!(!demo.loud);
    }

    #[test]
    fn test_set_matches_aliases_case_insensitively() {
        let mut demo = Demo::default();
        demo.set("SUBJECT", "Release").unwrap();
        assert_eq!(demo.get("title").unwrap(), "Release");
        demo.set("Level", "low").unwrap();
        assert_eq!(demo.get("level").unwrap(), "Low");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let mut demo = Demo::default();
        let err = demo.set("doesnotexist", "v").unwrap_err();
        assert!(matches!(err, NotifyError::UnknownKey { .. }));
        assert!(err.is_config_error());
        assert!(demo.get("host").is_err());
    }

    #[test]
    fn test_enum_rejects_non_members() {
        let mut demo = Demo::default();
        let err = demo.set("level", "medium").unwrap_err();
        assert!(err.to_string().contains("Low, High"));
    }

    #[test]
    fn test_enums_listing() {
        let enums = Demo::default().enums();
        assert_eq!(enums.len(), 1);
        assert_eq!(enums["level"].names(), &["Low", "High"]);
    }
}
