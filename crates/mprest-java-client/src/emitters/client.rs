use minijinja::context;
use mprest_core::config::GenerationPolicy;
use mprest_core::error::GeneratorError;

use super::render;

/// Suffix of the builder-backed holder generated next to each interface.
pub const CLIENT_SUFFIX: &str = "Client";

/// Render `{api}Client.java`, a static factory over `RestClientBuilder` for use
/// outside a CDI container.
pub fn emit_client(
    env: &minijinja::Environment<'_>,
    api: &str,
    policy: &GenerationPolicy,
) -> Result<String, GeneratorError> {
    render(
        env,
        "client.java.j2",
        context! {
            package => policy.api_package.clone(),
            api => api,
            name => format!("{api}{CLIENT_SUFFIX}"),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitters::environment;

    #[test]
    fn test_client_holder() {
        let out = emit_client(&environment().unwrap(), "PetsApi", &GenerationPolicy::default())
            .unwrap();
        assert!(out.starts_with("package api;\n"));
        assert!(out.contains("public final class PetsApiClient {"));
        assert!(out.contains("    public static PetsApi create(URI baseUri) {"));
        assert!(out.contains(".build(PetsApi.class);"));
        assert!(out.contains("Builds {@link PetsApi} instances"));
    }
}
