use indexmap::IndexMap;
use log::debug;

use super::operations::IrOperation;
use crate::config::GenerationPolicy;
use crate::transform::name_normalizer::{base_path, bean_param_name, first_segment};

/// Group key used when the resource path has no first segment.
pub const ROOT_GROUP: &str = "default";

/// An operation together with the values derived while grouping it.
#[derive(Debug, Clone)]
pub struct GroupedOperation {
    pub operation: IrOperation,
    /// Key of the group the operation belongs to.
    pub base_name: String,
    /// First resource segment the group was derived from; empty for the root group.
    pub base_path: String,
    /// Declared path after the group's base path was removed.
    pub path: String,
    pub sub_resource: bool,
    pub has_bean_param: bool,
    pub bean_param_name: String,
}

impl GroupedOperation {
    /// Wrap an operation with its bean-parameter decision applied and its path untouched.
    pub fn new(operation: IrOperation, policy: &GenerationPolicy) -> Self {
        let bean_param_name = bean_param_name(&operation.operation_id, policy);
        let has_bean_param = eligible_parameter_count(&operation) >= policy.bean_param_count;
        let path = operation.path.clone();
        Self {
            operation,
            base_name: String::new(),
            base_path: String::new(),
            path,
            sub_resource: false,
            has_bean_param,
            bean_param_name,
        }
    }

    pub fn is_root(&self) -> bool {
        self.base_path.is_empty()
    }
}

/// Parameters that may be bundled into a bean parameter. The request body never is.
pub fn eligible_parameter_count(operation: &IrOperation) -> usize {
    operation.parameters.len()
}

/// Operations keyed by group name, groups in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct GroupAssignment {
    groups: IndexMap<String, Vec<GroupedOperation>>,
}

impl GroupAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation to `key`, creating the group on first use.
    pub fn push(&mut self, key: String, operation: GroupedOperation) -> &GroupedOperation {
        let ops = self.groups.entry(key).or_default();
        ops.push(operation);
        &ops[ops.len() - 1]
    }

    pub fn get(&self, key: &str) -> Option<&[GroupedOperation]> {
        self.groups.get(key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[GroupedOperation])> {
        self.groups
            .iter()
            .map(|(name, ops)| (name.as_str(), ops.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of operations across all groups.
    pub fn operation_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

/// Assign one operation to its group, rewriting its residual path.
///
/// 1. Remove the first occurrence of the path prefix from `resource_path` and one leading `/`.
/// 2. Truncate at the next `/`; an empty result is the root group `default`.
/// 3. Outside the root group, strip `/{base}` from the declared path; the operation is a
///    sub-resource when anything remains.
/// 4. With a prefix configured the group key is `prefix + base`, and the first literal
///    occurrence of that key is removed from the remaining path (after one leading `/`).
///    A key that recurs later in the path is removed there too.
/// 5. Append to the group.
pub fn assign<'a>(
    operation: IrOperation,
    resource_path: &str,
    policy: &GenerationPolicy,
    groups: &'a mut GroupAssignment,
) -> &'a GroupedOperation {
    let mut grouped = GroupedOperation::new(operation, policy);
    let prefix = policy.path_prefix.as_deref().filter(|p| !p.is_empty());

    let mut base = base_path(resource_path, prefix);
    base.truncate(first_segment(&base).len());
    grouped.base_path = base.clone();

    if base.is_empty() {
        base = ROOT_GROUP.to_string();
    } else {
        let declared = format!("/{base}");
        if let Some(rest) = grouped.path.strip_prefix(declared.as_str()) {
            grouped.path = rest.to_string();
        }
        grouped.sub_resource = !grouped.path.is_empty();
    }

    let base_name = match prefix {
        Some(prefix) => {
            let base_name = format!("{prefix}{base}");
            let remaining = grouped.path.strip_prefix('/').unwrap_or(&grouped.path);
            grouped.path = remaining.replacen(&base_name, "", 1);
            base_name
        }
        None => base,
    };

    debug!(
        "{} {} -> group `{}` path `{}`",
        grouped.operation.method.as_str(),
        grouped.operation.path,
        base_name,
        grouped.path
    );
    grouped.base_name = base_name.clone();
    groups.push(base_name, grouped)
}
