use minijinja::Environment;
use mprest_core::error::GeneratorError;

use crate::type_mapper::package_dir;

pub mod api;
pub mod bean_param;
pub mod client;
pub mod model;

const TEMPLATES: &[(&str, &str)] = &[
    ("api.java.j2", include_str!("../../templates/api.java.j2")),
    ("class.java.j2", include_str!("../../templates/class.java.j2")),
    ("enum.java.j2", include_str!("../../templates/enum.java.j2")),
    ("client.java.j2", include_str!("../../templates/client.java.j2")),
];

/// Escape `*/` so descriptions cannot close a Javadoc block early.
fn escape_javadoc(value: String) -> String {
    value.replace("*/", "*&#47;")
}

fn escape_java_string(value: String) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn template_error(template: &str, err: minijinja::Error) -> GeneratorError {
    GeneratorError::Render {
        template: template.to_string(),
        message: err.to_string(),
    }
}

/// Template environment with every Java template loaded.
pub fn environment() -> Result<Environment<'static>, GeneratorError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_filter("javadoc", escape_javadoc);
    env.add_filter("java_string", escape_java_string);
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)
            .map_err(|e| template_error(name, e))?;
    }
    Ok(env)
}

pub fn render(
    env: &Environment<'_>,
    template: &str,
    ctx: minijinja::Value,
) -> Result<String, GeneratorError> {
    env.get_template(template)
        .and_then(|tmpl| tmpl.render(ctx))
        .map_err(|e| template_error(template, e))
}

/// Output path of a Java type inside its package directory.
///
/// - `("api", "PetsApi")` → `"api/PetsApi.java"`
/// - `("org.acme.model", "Pet")` → `"org/acme/model/Pet.java"`
/// - `("", "Pet")` → `"Pet.java"`
pub fn java_path(package: &str, class: &str) -> String {
    if package.is_empty() {
        format!("{class}.java")
    } else {
        format!("{}/{class}.java", package_dir(package))
    }
}

/// Javadoc lines from an optional summary and description, blank line between.
pub fn doc_lines(summary: Option<&str>, description: Option<&str>) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for text in [summary, description].into_iter().flatten() {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.extend(text.lines().map(|l| l.trim_end().to_string()));
    }
    lines
}

/// Extra annotations as written in the options, `@` added when missing.
pub fn annotation_lines(entries: &[String]) -> Vec<String> {
    entries
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(|a| {
            if a.starts_with('@') {
                a.to_string()
            } else {
                format!("@{a}")
            }
        })
        .collect()
}
