//! Config field tables and the string-keyed resolver built on them
//!
//! Config types describe their fields once in a static table. The resolver,
//! query-string building and markdown docs are all driven from that table so
//! backends never hand-write per-field get/set code.

pub mod field;
pub mod markdown;
pub mod query;
pub mod resolver;

pub use field::{parse_bool, print_bool, ConfigField, FieldKind, UrlPart};
pub use markdown::render_markdown;
pub use query::{
    apply_query, build_query, build_query_with_custom_fields, decode_component, escape_key,
    query_pairs, set_config_props_from_query, unescape_key, KEY_PREFIX,
};
pub use resolver::{ConfigFields, ConfigQueryResolver};
