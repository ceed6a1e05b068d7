//! Name transformations shared by helper aliases, asset directories and
//! scoped CSS identifiers.

use regex::Regex;
use std::sync::LazyLock;

static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z\d]+)([A-Z][a-z])").expect("static regex"));
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("static regex"));

/// Convert a CamelCase, possibly namespaced, name to snake_case.
///
/// `::` becomes `/` and hyphens become underscores:
///
/// ```
/// use tilekit::helpers::naming::underscore;
///
/// assert_eq!(underscore("Navigation::DropdownMenu"), "navigation/dropdown_menu");
/// assert_eq!(underscore("HTMLBadge"), "html_badge");
/// assert_eq!(underscore("list-item"), "list_item");
/// ```
pub fn underscore(name: &str) -> String {
    let word = name.replace("::", "/");
    let word = ACRONYM_BOUNDARY.replace_all(&word, "${1}_${2}");
    let word = WORD_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// CSS prefix for a component: its underscored name with `/` replaced by `-`.
pub fn css_prefix(full_name: &str) -> String {
    underscore(full_name).replace('/', "-")
}

pub fn scoped_css_identifier(prefix: &str, name: &str) -> String {
    format!("{prefix}--{}", underscore(name))
}

/// A CSS class or id scoped to a component.
///
/// ```
/// use tilekit::helpers::naming::css_identifier;
///
/// assert_eq!(
///     css_identifier("Navigation::DropdownMenuComponent", "list_item"),
///     "navigation-dropdown_menu_component--list_item"
/// );
/// ```
pub fn css_identifier(full_name: &str, name: &str) -> String {
    scoped_css_identifier(&css_prefix(full_name), name)
}

/// Split `Namespace::Name` into its namespace and short name.
pub fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.rsplit_once("::") {
        Some((namespace, short)) => (Some(namespace), short),
        None => (None, name),
    }
}

/// Whether `name` can serve as a component or namespace name.
pub fn is_valid_component_name(name: &str) -> bool {
    !name.is_empty()
        && name.split("::").all(|segment| {
            let mut chars = segment.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
