pub mod codegen;
pub mod config;
pub mod error;
pub mod format;
pub mod ir;
pub mod parse;
pub mod postprocess;
pub mod transform;

pub use codegen::{ClientCodegen, RestClientCodegen};

/// A generated file, `path` relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
}

/// Renders source files for a target language from the IR and the grouped operations.
pub trait CodeGenerator {
    fn generate(
        &self,
        ir: &ir::IrSpec,
        codegen: &dyn ClientCodegen,
    ) -> Result<Vec<GeneratedFile>, error::GeneratorError>;
}
