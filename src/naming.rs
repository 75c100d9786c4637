//! Physical resource naming
//!
//! Derives the environment-and-system-qualified table/collection/index
//! names used at the storage engines. Names are lower-kebab-cased and
//! deterministic, so the same {system, environment, model} triple always
//! maps to the same physical resource.

use std::sync::Arc;

/// Per-model naming function, closed over {system_name, environment}
///
/// Adapters call this with a model name and use the result verbatim as the
/// physical table/collection/index name. A caller-supplied custom function
/// fully replaces the default derivation.
pub type TableNameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Derive a canonical physical resource name
///
/// Produces `system[-component]-environment`, lower-kebab-cased, with the
/// component inserted only when present. Pure and total for any string
/// inputs.
///
/// # Examples
/// ```rust
/// use polystore::naming::resolve_name;
///
/// assert_eq!(resolve_name("sys", "dev", Some("MyModel")), "sys-my-model-dev");
/// assert_eq!(resolve_name("sys", "dev", None), "sys-dev");
/// ```
pub fn resolve_name(system_name: &str, environment: &str, component: Option<&str>) -> String {
    let mut parts = vec![to_kebab_case(system_name)];
    if let Some(component) = component {
        parts.push(to_kebab_case(component));
    }
    parts.push(to_kebab_case(environment));

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Build the default per-model naming function for one logical database
///
/// Captures {system_name, environment} and applies [`resolve_name`] with
/// the model name as the component.
pub fn default_table_name_fn(system_name: &str, environment: &str) -> TableNameFn {
    let system_name = system_name.to_string();
    let environment = environment.to_string();
    Arc::new(move |model| resolve_name(&system_name, &environment, Some(model)))
}

/// Convert a token to lower-kebab-case
///
/// Splits on case boundaries (`MyModel` -> `my-model`) and collapses any
/// run of non-alphanumeric separators into a single hyphen.
pub fn to_kebab_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev_is_separator = true;
    let mut prev_is_lower_or_digit = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() {
                if prev_is_lower_or_digit {
                    out.push('-');
                }
                out.extend(c.to_lowercase());
                prev_is_lower_or_digit = false;
            } else {
                out.push(c);
                prev_is_lower_or_digit = true;
            }
            prev_is_separator = false;
        } else if !prev_is_separator {
            out.push('-');
            prev_is_separator = true;
            prev_is_lower_or_digit = false;
        }
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_name_with_component() {
        assert_eq!(resolve_name("sys", "dev", Some("MyModel")), "sys-my-model-dev");
        assert_eq!(resolve_name("billing", "prod", Some("invoices")), "billing-invoices-prod");
    }

    #[test]
    fn test_resolve_name_without_component() {
        assert_eq!(resolve_name("sys", "dev", None), "sys-dev");
    }

    #[test]
    fn test_resolve_name_is_deterministic() {
        let first = resolve_name("My System", "Staging", Some("UserProfile"));
        let second = resolve_name("My System", "Staging", Some("UserProfile"));
        assert_eq!(first, second);
        assert_eq!(first, "my-system-user-profile-staging");
    }

    #[test]
    fn test_kebab_case_collapses_separators() {
        assert_eq!(to_kebab_case("my__odd  name"), "my-odd-name");
        assert_eq!(to_kebab_case("--edge--"), "edge");
        assert_eq!(to_kebab_case("HTTPServer"), "httpserver");
        assert_eq!(to_kebab_case("v2Model"), "v2-model");
    }

    #[test]
    fn test_default_table_name_fn_captures_context() {
        let names = default_table_name_fn("sys", "dev");
        assert_eq!(names("MyModel"), "sys-my-model-dev");
        assert_eq!(names("orders"), "sys-orders-dev");
    }
}
