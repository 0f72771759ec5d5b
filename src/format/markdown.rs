use std::fmt::Write;

use super::field::ConfigField;
use super::resolver::ConfigFields;

const PROPS_DESCRIPTION: &str = "Props can be either supplied using the params argument, \
or through the URL using `?key=value&key=value` etc.";
const PROPS_EMPTY: &str = "There are no query/param props for this service.";

/// Render the field table of `C` as markdown documentation
pub fn render_markdown<C: ConfigFields>(scheme: &str) -> String {
    let mut url_fields: Vec<&ConfigField<C>> =
        C::fields().iter().filter(|f| f.url_part().is_some()).collect();
    url_fields.sort_by_key(|f| f.url_part());

    let mut query_fields: Vec<&ConfigField<C>> =
        C::fields().iter().filter(|f| f.is_query()).collect();
    query_fields.sort_by_key(|f| !f.is_required());

    let mut out = String::new();
    if !url_fields.is_empty() {
        out.push_str("### URL Fields\n\n");
        for field in &url_fields {
            let part = field.url_part().map(|p| p.as_str()).unwrap_or_default();
            let _ = write!(out, "* __{}__", field.name());
            if !field.description().is_empty() {
                let _ = write!(out, " - {}", field.description());
            }
            if field.is_required() {
                out.push_str(" (**Required**)");
            }
            let _ = writeln!(out, "\n  URL part: `{scheme}://` {part}");
        }
        out.push('\n');
    }

    out.push_str("### Query/Param Props\n\n");
    if query_fields.is_empty() {
        let _ = writeln!(out, "{PROPS_EMPTY}");
        return out;
    }
    let _ = writeln!(out, "{PROPS_DESCRIPTION}\n");

    for (i, field) in query_fields.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(
            out,
            "* __{}__ ({})",
            field.primary_key().unwrap_or(field.name()),
            field.type_name()
        );
        if !field.description().is_empty() {
            let _ = write!(out, " - {}", field.description());
        }
        if field.is_required() {
            out.push_str(" (**Required**)");
        } else {
            match field.canonical_default() {
                Ok(value) if value.is_empty() => out.push_str(" Default: *empty*"),
                Ok(value) => {
                    let _ = write!(out, " Default: `{value}`");
                }
                Err(_) => {}
            }
        }
        out.push('\n');

        if field.key_names().len() > 1 {
            let aliases = field.key_names()[1..].join("`, `");
            let _ = writeln!(out, "  Aliases: `{aliases}`");
        }
        if let Some(formatter) = field.enum_formatter() {
            let _ = writeln!(out, "  Possible values: `{}`", formatter.names().join("`, `"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::field::UrlPart;
    use crate::types::EnumFormatter;
    use once_cell::sync::Lazy;

    static MODES: EnumFormatter = EnumFormatter::new(&["Quiet", "Loud"]);

    #[derive(Default)]
    struct Doc {
        token: String,
        avatar: String,
        mode: i64,
    }

    type F = ConfigField<Doc>;

    static FIELDS: Lazy<Vec<F>> = Lazy::new(|| {
        vec![
            F::text("Token", |c| c.token.clone(), |c, v| c.token = v)
                .url(UrlPart::User)
                .describe("Webhook token")
                .required(),
            F::text("Avatar", |c| c.avatar.clone(), |c, v| c.avatar = v)
                .keys(&["avatar", "avatarurl"])
                .describe("Avatar override"),
            F::enumeration("Mode", &MODES, |c| c.mode, |c, v| c.mode = v)
                .keys(&["mode"])
                .default_value("Loud"),
        ]
    });

    impl ConfigFields for Doc {
        fn fields() -> &'static [ConfigField<Self>] {
            &FIELDS
        }
    }

    #[test]
    fn test_render_sections() {
        let doc = render_markdown::<Doc>("demo");
        assert!(doc.contains("### URL Fields"));
        assert!(doc.contains("* __Token__ - Webhook token (**Required**)"));
        assert!(doc.contains("* __avatar__ (string) - Avatar override Default: *empty*"));
        assert!(doc.contains("  Aliases: `avatarurl`"));
        assert!(doc.contains("* __mode__ (option) Default: `Loud`"));
        assert!(doc.contains("  Possible values: `Quiet`, `Loud`"));
    }
}
