use std::collections::HashSet;

use url::form_urlencoded;
use url::Url;

use super::resolver::ConfigQueryResolver;
use crate::errors::NotifyResult;

/// Prefix used to carry custom query keys that collide with config keys
pub const KEY_PREFIX: &str = "__";

/// Encode the non-default query fields of `resolver` in declaration order
pub fn build_query<R: ConfigQueryResolver + ?Sized>(resolver: &R) -> NotifyResult<String> {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for key in resolver.query_fields() {
        let value = resolver.get(key)?;
        if value == resolver.default_for(key)? {
            continue;
        }
        serializer.append_pair(key, &value);
    }
    Ok(serializer.finish())
}

/// Like `build_query`, followed by custom pairs whose keys are escaped when
/// they collide with a config key
pub fn build_query_with_custom_fields<R: ConfigQueryResolver + ?Sized>(
    resolver: &R,
    custom: &[(String, String)],
) -> NotifyResult<String> {
    let base = build_query(resolver)?;
    let mut serializer = form_urlencoded::Serializer::new(base);
    for (key, value) in custom {
        serializer.append_pair(&escape_key(resolver, key), value);
    }
    Ok(serializer.finish())
}

/// Decoded query pairs; the first occurrence of a key wins, compared case-insensitively
pub fn query_pairs(url: &Url) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    url.query_pairs()
        .filter(|(key, _)| seen.insert(key.to_ascii_lowercase()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Apply every query pair through `resolver.set`
///
/// Pairs whose key appears in `passthrough` are not set; they are returned to
/// the caller instead. The first `set` failure is returned as-is.
pub fn set_config_props_from_query<R: ConfigQueryResolver + ?Sized>(
    resolver: &mut R,
    url: &Url,
    passthrough: &[&str],
) -> NotifyResult<Vec<(String, String)>> {
    let mut remaining = Vec::new();
    for (key, value) in query_pairs(url) {
        if passthrough.iter().any(|p| p.eq_ignore_ascii_case(&key)) {
            remaining.push((key, value));
        } else {
            resolver.set(&key, &value)?;
        }
    }
    Ok(remaining)
}

/// Set the URL's query, leaving no dangling `?` when empty
pub fn apply_query(url: &mut Url, query: &str) {
    if query.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(query));
    }
}

/// Prefix `key` when it would be read back as a config key
pub fn escape_key<R: ConfigQueryResolver + ?Sized>(resolver: &R, key: &str) -> String {
    if resolver.has_key(key) || key.starts_with(KEY_PREFIX) {
        format!("{KEY_PREFIX}{key}")
    } else {
        key.to_string()
    }
}

pub fn unescape_key(key: &str) -> &str {
    key.strip_prefix(KEY_PREFIX).unwrap_or(key)
}

/// Percent-decode a URL component such as a username or path segment
pub fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::field::ConfigField;
    use crate::format::resolver::ConfigFields;
    use once_cell::sync::Lazy;

    #[derive(Default, Clone)]
    struct Hook {
        title: String,
        method: String,
        retries: u64,
    }

    type F = ConfigField<Hook>;

    static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
        vec![
            F::text("Title", |c| c.title.clone(), |c, v| c.title = v).keys(&["title"]),
            F::text("Method", |c| c.method.clone(), |c, v| c.method = v)
                .keys(&["method"])
                .default_value("POST"),
            F::unsigned("Retries", |c| c.retries, |c, v| c.retries = v).keys(&["retries"]),
        ]
    });

    impl ConfigFields for Hook {
        fn fields() -> &'static [ConfigField<Self>] {
            &FIELDS
        }
    }

    fn defaulted() -> Hook {
        let mut hook = Hook::default();
        hook.set_default_props().unwrap();
        hook
    }

    #[test]
    fn test_build_query_skips_defaults() {
        assert_eq!(build_query(&defaulted()).unwrap(), "");

        let mut hook = defaulted();
        hook.set("retries", "3").unwrap();
        hook.set("title", "a b&c").unwrap();
        assert_eq!(build_query(&hook).unwrap(), "title=a+b%26c&retries=3");
    }

    #[test]
    fn test_first_value_wins() {
        let url = Url::parse("generic://host/?Title=one&title=two&x=1").unwrap();
        let pairs = query_pairs(&url);
        assert_eq!(
            pairs,
            vec![
                ("Title".to_string(), "one".to_string()),
                ("x".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn test_passthrough_keys_are_returned() {
        let url = Url::parse("x://h/?title=t&extras=%7B%7D").unwrap();
        let mut hook = defaulted();
        let rest = set_config_props_from_query(&mut hook, &url, &["extras"]).unwrap();
        assert_eq!(hook.title, "t");
        assert_eq!(rest, vec![("extras".to_string(), "{}".to_string())]);
    }

    #[test]
    fn test_set_error_surfaces() {
        let url = Url::parse("x://h/?retries=many").unwrap();
        let mut hook = defaulted();
        assert!(set_config_props_from_query(&mut hook, &url, &[]).is_err());
    }

    #[test]
    fn test_key_escaping() {
        let hook = defaulted();
        assert_eq!(escape_key(&hook, "method"), "__method");
        assert_eq!(escape_key(&hook, "foo"), "foo");
        assert_eq!(unescape_key("__method"), "method");
        let query =
            build_query_with_custom_fields(&hook, &[("title".into(), "x".into())]).unwrap();
        assert_eq!(query, "__title=x");
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("p%40ss"), "p@ss");
        assert_eq!(decode_component("plain"), "plain");
    }
}
