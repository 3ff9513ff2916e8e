use log::info;

use crate::config::{GenerationPolicy, OptionBag, resolve};
use crate::format::SourceFormatter;
use crate::ir::grouping::assign;
use crate::ir::{GroupAssignment, IrOperation, IrSpec};
use crate::postprocess::{ArtifactPostProcessor, SweepReport};
use crate::transform::name_normalizer::group_name;

/// Hooks a renderer needs from the generation policy: where operations go, what the
/// resulting interfaces are called, and how written files are finished off.
pub trait ClientCodegen {
    fn policy(&self) -> &GenerationPolicy;

    fn resolve_group(&self, operation: IrOperation, resource_path: &str, groups: &mut GroupAssignment);

    fn resolve_name(&self, base_name: &str) -> String;

    fn post_process(
        &self,
        artifacts: &ArtifactPostProcessor,
        formatter: &dyn SourceFormatter,
    ) -> SweepReport;

    /// Group all operations in document order by their declared path.
    fn group_operations(&self, ir: &IrSpec) -> GroupAssignment {
        let mut groups = GroupAssignment::new();
        for op in &ir.operations {
            let resource_path = op.path.clone();
            self.resolve_group(op.clone(), &resource_path, &mut groups);
        }
        groups
    }
}

/// MicroProfile REST client flavour of [`ClientCodegen`].
#[derive(Debug, Clone, Default)]
pub struct RestClientCodegen {
    policy: GenerationPolicy,
}

impl RestClientCodegen {
    pub fn new(policy: GenerationPolicy) -> Self {
        Self { policy }
    }

    pub fn from_options(raw: &OptionBag) -> Self {
        Self::new(resolve(raw))
    }
}

impl ClientCodegen for RestClientCodegen {
    fn policy(&self) -> &GenerationPolicy {
        &self.policy
    }

    fn resolve_group(&self, operation: IrOperation, resource_path: &str, groups: &mut GroupAssignment) {
        assign(operation, resource_path, &self.policy, groups);
    }

    fn resolve_name(&self, base_name: &str) -> String {
        group_name(base_name, &self.policy)
    }

    fn post_process(
        &self,
        artifacts: &ArtifactPostProcessor,
        formatter: &dyn SourceFormatter,
    ) -> SweepReport {
        let report = artifacts.run_sweep(&self.policy, formatter);
        if !report.skipped {
            info!(
                "formatted {} of {} files",
                report.formatted_count(),
                report.outcomes.len()
            );
        }
        report
    }
}
