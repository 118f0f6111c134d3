//! Builds the aggregator operation batch for a set of modules.
//!
//! The aggregator file is expected to carry these coarse landmarks:
//! a `// ===== Module Imports =====` line, per-type field-resolver blocks
//! keyed by capitalized module name, a `...TagResolvers.Query,` spread in
//! the Query section, and the `signup:` resolver opening the auth block of
//! the Mutation section.

use modwire_types::ops::{Anchor, RewriteOp};
use modwire_types::spec::{ModuleRegistry, ModuleSpec};

pub const IMPORTS_ANCHOR: &str = "// ===== Module Imports =====";
pub const QUERY_ANCHOR: &str = "...TagResolvers.Query,";
pub const MUTATION_ANCHOR: &str = "signup:";

/// The four registration edits for one module.
///
/// The field-resolver edit is a span replacement: the inline
/// `<Cap>: { ... }` block collapses to a reference to the module's
/// resolvers. The query/mutation edits spread the module's resolver maps
/// into the existing sections.
pub fn module_ops(spec: &ModuleSpec) -> Vec<RewriteOp> {
    let cap = spec.capitalized();
    let name = &spec.name;

    vec![
        RewriteOp {
            id: format!("{name}/import"),
            anchor: Anchor::InsertAfter {
                pattern: IMPORTS_ANCHOR.to_string(),
            },
            payload: format!(
                "import {{ {cap}FieldResolvers, {cap}QueryResolvers, {cap}MutationResolvers }} from '../../modules/{name}';"
            ),
        },
        RewriteOp {
            id: format!("{name}/fields"),
            anchor: Anchor::ReplaceSpan {
                start: format!("{cap}: {{"),
            },
            payload: format!("{cap}: {cap}FieldResolvers,"),
        },
        RewriteOp {
            id: format!("{name}/queries"),
            anchor: Anchor::InsertAfter {
                pattern: QUERY_ANCHOR.to_string(),
            },
            payload: format!("    ...{cap}QueryResolvers,"),
        },
        RewriteOp {
            id: format!("{name}/mutations"),
            anchor: Anchor::InsertBefore {
                pattern: MUTATION_ANCHOR.to_string(),
            },
            payload: format!("    ...{cap}MutationResolvers,"),
        },
    ]
}

/// One ordered batch covering every module in the registry. The whole batch
/// is applied in a single rewrite run.
pub fn registry_ops(registry: &ModuleRegistry) -> Vec<RewriteOp> {
    registry.iter().flat_map(module_ops).collect()
}
