use heck::{ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};

use crate::config::GenerationPolicy;
use crate::ir::NormalizedName;

/// Create a `NormalizedName` from an arbitrary string, computing all casing variants.
pub fn normalize_name(name: &str) -> NormalizedName {
    let sanitized = sanitize_identifier(name);

    NormalizedName {
        original: name.to_string(),
        pascal_case: sanitized.to_pascal_case(),
        camel_case: sanitized.to_lower_camel_case(),
        snake_case: sanitized.to_snake_case(),
        screaming_snake: sanitized.to_shouty_snake_case(),
    }
}

/// Interface name for the group that `raw_path` belongs to.
///
/// - `apiName` set → returned verbatim
/// - `/pets/{id}` → `PetsApi`
/// - `/` → `DefaultApi`
/// - `/api/v1/pets` with `pathPrefix = /api/v1` → `PetsApi`
pub fn group_name(raw_path: &str, policy: &GenerationPolicy) -> String {
    if let Some(ref name) = policy.api_name {
        return name.clone();
    }
    let base = base_path(raw_path, policy.path_prefix.as_deref());
    let candidate = first_segment(&base);
    if candidate.is_empty() {
        return format!("Default{}", policy.api_suffix);
    }
    format!("{}{}", type_name(candidate), policy.api_suffix)
}

/// Type name of the synthetic parameter bundle for an operation.
///
/// An empty operation id yields the bare suffix.
pub fn bean_param_name(operation_id: &str, policy: &GenerationPolicy) -> String {
    format!(
        "{}{}",
        operation_id.to_upper_camel_case(),
        policy.bean_param_suffix
    )
}

/// Remove the first literal occurrence of `prefix`, then one leading `/`.
pub(crate) fn base_path(path: &str, prefix: Option<&str>) -> String {
    let stripped = match prefix {
        Some(p) if !p.is_empty() => path.replacen(p, "", 1),
        _ => path.to_string(),
    };
    match stripped.strip_prefix('/') {
        Some(rest) => rest.to_string(),
        None => stripped,
    }
}

/// Everything before the next `/`. A separator at position 0 does not truncate.
pub(crate) fn first_segment(path: &str) -> &str {
    match path.find('/') {
        Some(pos) if pos > 0 => &path[..pos],
        _ => path,
    }
}

/// UpperCamelCase identifier for a raw path segment; never starts with a digit.
fn type_name(raw: &str) -> String {
    let name = sanitize_identifier(raw).to_upper_camel_case();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `DELETE /users/{userId}` → `deleteUser`
pub fn route_to_name(method: &str, path: &str) -> String {
    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in path.split('/').filter(|s| !s.is_empty()) {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let prefix = match method.to_uppercase().as_str() {
        "GET" if ends_with_param => "get".to_string(),
        "GET" => "list".to_string(),
        "POST" => "create".to_string(),
        "PUT" => "update".to_string(),
        "DELETE" => "delete".to_string(),
        other => other.to_lowercase(),
    };

    let last = resource_parts.len().saturating_sub(1);
    let resource: String = resource_parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i == last && ends_with_param {
                singularize(part).to_pascal_case()
            } else {
                part.to_pascal_case()
            }
        })
        .collect();

    format!("{prefix}{resource}")
}

/// Naive singularization: strips trailing 's' if present.
fn singularize(word: &str) -> String {
    if word.ends_with("ies") && word.len() > 3 {
        format!("{}y", &word[..word.len() - 3])
    } else if word.ends_with("ses") || word.ends_with("xes") || word.ends_with("zes") {
        word[..word.len() - 2].to_string()
    } else if word.ends_with('s') && !word.ends_with("ss") && word.len() > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Sanitize a string to be a valid identifier.
fn sanitize_identifier(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut prev_was_separator = false;

    for (i, ch) in name.chars().enumerate() {
        if ch.is_alphanumeric() {
            if i == 0 && ch.is_ascii_digit() {
                result.push('_');
            }
            if prev_was_separator && !result.is_empty() {
                result.push('_');
            }
            result.push(ch);
            prev_was_separator = false;
        } else {
            prev_was_separator = true;
        }
    }

    if result.is_empty() {
        return "unnamed".to_string();
    }

    result
}
