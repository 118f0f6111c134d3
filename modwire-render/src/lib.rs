//! Pure template rendering for per-module artifacts.
//!
//! Rendering is a total function over a validated [`ModuleSpec`]: no I/O,
//! no failure modes. Writing the artifacts to disk is the caller's job.

use modwire_types::spec::ModuleSpec;

/// Generated text for one module's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    pub types_file: String,
    pub barrel_file: String,
}

pub fn render_module(spec: &ModuleSpec) -> RenderedModule {
    RenderedModule {
        types_file: render_types(spec),
        barrel_file: render_barrel(spec),
    }
}

/// The module's TypeScript type declarations.
///
/// The connection/edge block is wholly absent (not emitted as empty) unless
/// the module supports paged connections.
pub fn render_types(spec: &ModuleSpec) -> String {
    let cap = spec.capitalized();
    let mut out = String::new();

    out.push_str(&format!(
        "/**\n * {cap} Module Types\n *\n * TypeScript interfaces and types for the {cap} domain.\n */\n\n"
    ));

    out.push_str("// ===== Input Types =====\n\n");
    out.push_str(&format!(
        "export interface {cap}CreateInput {{\n  name: string;\n  description?: string;\n  customAttrs?: Record<string, any>;\n}}\n\n"
    ));
    out.push_str(&format!(
        "export interface {cap}UpdateInput {{\n  name?: string;\n  description?: string;\n  customAttrs?: Record<string, any>;\n}}\n\n"
    ));

    out.push_str("// ===== Service Response Types =====\n\n");
    out.push_str(&format!(
        "export interface {cap} {{\n  id: string;\n  name: string;\n  description?: string | null;\n  customAttrs?: Record<string, any> | null;\n  createdAt?: Date;\n  updatedAt?: Date;\n  deletedAt?: Date | null;\n}}\n\n"
    ));
    out.push_str(&format!(
        "export interface {cap}WithRelations extends {cap} {{\n  // Add relations as needed\n}}\n\n"
    ));

    if spec.supports_paged_connection {
        out.push_str("// ===== Connection Types (Relay) =====\n\n");
        out.push_str(&format!(
            "export interface {cap}Edge {{\n  cursor: string;\n  node: {cap};\n}}\n\n"
        ));
        out.push_str(&format!(
            "export interface {cap}Connection {{\n  edges: {cap}Edge[];\n  pageInfo: {{\n    hasNextPage: boolean;\n    hasPreviousPage: boolean;\n    startCursor?: string;\n    endCursor?: string;\n  }};\n  totalCount: number;\n}}\n\n"
        ));
    }

    out.push_str("// ===== Operation Result Types =====\n\n");
    out.push_str(&format!(
        "export interface {cap}DeleteResult {{\n  success: boolean;\n  deletedCount?: number;\n  message?: string;\n}}\n"
    ));

    out
}

/// The barrel export (`index.ts`).
///
/// Re-exports the types file, the resolver triad, and the service module
/// only when the module has a migrated service.
pub fn render_barrel(spec: &ModuleSpec) -> String {
    let cap = spec.capitalized();
    let name = &spec.name;
    let mut out = String::new();

    out.push_str(&format!(
        "/**\n * {cap} Module\n *\n * Barrel export for {cap} domain module.\n */\n\n"
    ));
    out.push_str(&format!("export * from './{name}.types';\n"));
    if spec.legacy_source.is_some() {
        out.push_str(&format!("export * from './{name}.service';\n"));
    }
    out.push_str(&format!(
        "export {{ {cap}FieldResolvers, {cap}QueryResolvers, {cap}MutationResolvers }} from './{name}.resolver';\n"
    ));

    out
}
