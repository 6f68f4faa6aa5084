//! Path prefix derivation for service types.
//!
//! # Rules
//! - An explicit name is used as given.
//! - Otherwise the last segment of the type name (split on `\` or `::`)
//!   has a trailing `Service` removed and is converted to snake_case.
//! - The result always starts with `/`. Inner slashes are left alone.
//!
//! `App\Service\UserService` → `/user`, `OrderItemService` → `/order_item`.

/// Suffix stripped from service type names.
const SERVICE_SUFFIX: &str = "Service";

/// Derive the route prefix for a service type.
pub fn derive_prefix(type_name: &str, explicit: &str) -> String {
    let prefix = if explicit.is_empty() {
        let segment = last_segment(type_name);
        let stem = segment.strip_suffix(SERVICE_SUFFIX).unwrap_or(segment);
        snake_case(stem)
    } else {
        explicit.to_string()
    };

    if prefix.starts_with('/') {
        prefix
    } else {
        format!("/{prefix}")
    }
}

/// Last namespace segment of a type name.
fn last_segment(type_name: &str) -> &str {
    // `::` splits into an empty piece between the colons, which rsplit skips past.
    type_name
        .rsplit(['\\', ':'])
        .next()
        .unwrap_or(type_name)
}

/// Convert an identifier to lowercase words joined by `_`.
///
/// A boundary is placed before an uppercase letter that follows a lowercase
/// letter or digit, and before the last capital of an acronym run
/// (`HTTPClient` → `http_client`). Any other character that is not
/// alphanumeric (`.`, `-`, `+`, whitespace) becomes `_`. Existing `_` and
/// `/` are kept, so snake_case input comes back unchanged.
pub fn snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() && c != '_' && c != '/' {
            push_separator(&mut out);
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                push_separator(&mut out);
            }
        }

        out.extend(c.to_lowercase());
    }

    out
}

fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with(['_', '/']) {
        out.push('_');
    }
}
