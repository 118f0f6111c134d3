//! Legacy service file migration.
//!
//! Copies a module's pre-existing service implementation into the new module
//! directory and rewrites a fixed set of relative import paths inside the
//! copy. The original file is never touched.

use anyhow::Context;
use fs_err as fs;
use modwire_types::layout::ProjectLayout;
use modwire_types::outcome::MigrationResult;
use modwire_types::spec::ModuleSpec;
use tracing::{debug, warn};

/// Ordered table of literal import-path substitutions.
///
/// Entries are applied longest-old-path first, so an old path that is a
/// proper prefix of another entry's old path never fires before the more
/// specific one and double-rewrites it.
#[derive(Debug, Clone)]
pub struct SubstitutionTable {
    entries: Vec<(String, String)>,
}

impl SubstitutionTable {
    pub fn new(mut entries: Vec<(String, String)>) -> Self {
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        Self { entries }
    }

    /// The substitutions for moving a flat service file into
    /// `src/modules/<name>/`, one directory deeper than it used to live.
    pub fn service_defaults() -> Self {
        Self::new(vec![
            (
                "from '../context'".to_string(),
                "from '../../shared/graphql/context'".to_string(),
            ),
            (
                "from '../lib/audit'".to_string(),
                "from '../../shared/utils/audit'".to_string(),
            ),
            (
                "from '../lib/changes'".to_string(),
                "from '../../shared/utils/changes'".to_string(),
            ),
            (
                "from '../validation/schemas'".to_string(),
                "from '../../validation/schemas'".to_string(),
            ),
        ])
    }

    /// Apply every substitution, returning the rewritten text and the total
    /// number of replacements performed.
    pub fn apply(&self, content: &str) -> (String, u64) {
        let mut out = content.to_string();
        let mut count = 0u64;
        for (old, new) in &self.entries {
            let hits = out.matches(old.as_str()).count() as u64;
            if hits > 0 {
                out = out.replace(old.as_str(), new);
                count += hits;
            }
        }
        (out, count)
    }
}

impl Default for SubstitutionTable {
    fn default() -> Self {
        Self::service_defaults()
    }
}

/// Migrate one module's legacy service file into its module directory.
///
/// Returns `copied = false` without error when the module has no legacy
/// source or the source file does not exist; both are reported, not fatal.
/// I/O failure is an error for this module only.
pub fn migrate(
    spec: &ModuleSpec,
    layout: &ProjectLayout,
    table: &SubstitutionTable,
) -> anyhow::Result<MigrationResult> {
    let Some(source) = layout.legacy_service_file(spec) else {
        debug!(module = %spec.name, "no dedicated service file, skipping migration");
        return Ok(MigrationResult::default());
    };

    if !source.exists() {
        warn!(module = %spec.name, %source, "legacy service file not found, skipping");
        return Ok(MigrationResult::default());
    }

    let dest = layout.service_file(spec);
    let content = fs::read_to_string(&source).with_context(|| format!("read {source}"))?;

    let (rewritten, rewritten_imports) = table.apply(&content);

    fs::create_dir_all(layout.module_dir(spec))
        .with_context(|| format!("create {}", layout.module_dir(spec)))?;
    fs::write(&dest, rewritten).with_context(|| format!("write {dest}"))?;

    debug!(module = %spec.name, %dest, rewritten_imports, "service migrated");
    Ok(MigrationResult {
        copied: true,
        rewritten_imports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_layout() -> (TempDir, ProjectLayout) {
        let td = tempfile::tempdir().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8 path");
        (td, ProjectLayout::new(root))
    }

    fn customer_spec() -> ModuleSpec {
        ModuleSpec {
            name: "customer".to_string(),
            legacy_source: Some("CustomerService.ts".to_string()),
            supports_paged_connection: false,
            fields: vec![],
        }
    }

    #[test]
    fn rewrites_known_imports_in_the_copy() {
        let (_td, layout) = temp_layout();
        let spec = customer_spec();

        let source_text = "import { Context } from '../context';\n\
                           import { audit } from '../lib/audit';\n\
                           import { diff } from '../lib/changes';\n\
                           export const x = 1;\n";
        fs::create_dir_all(layout.services_dir()).unwrap();
        fs::write(layout.legacy_service_file(&spec).unwrap(), source_text).unwrap();

        let result = migrate(&spec, &layout, &SubstitutionTable::service_defaults()).unwrap();
        assert!(result.copied);
        assert_eq!(result.rewritten_imports, 3);

        let migrated = fs::read_to_string(layout.service_file(&spec)).unwrap();
        assert!(migrated.contains("from '../../shared/graphql/context'"));
        assert!(migrated.contains("from '../../shared/utils/audit'"));
        assert!(migrated.contains("from '../../shared/utils/changes'"));
        assert!(!migrated.contains("from '../context'"));

        // Original untouched.
        let original = fs::read_to_string(layout.legacy_service_file(&spec).unwrap()).unwrap();
        assert_eq!(original, source_text);
    }

    #[test]
    fn missing_source_is_reported_not_fatal() {
        let (_td, layout) = temp_layout();
        let result =
            migrate(&customer_spec(), &layout, &SubstitutionTable::default()).unwrap();
        assert!(!result.copied);
        assert_eq!(result.rewritten_imports, 0);
    }

    #[test]
    fn module_without_service_noops() {
        let (_td, layout) = temp_layout();
        let spec = ModuleSpec {
            legacy_source: None,
            ..customer_spec()
        };
        let result = migrate(&spec, &layout, &SubstitutionTable::default()).unwrap();
        assert!(!result.copied);
    }

    #[test]
    fn longer_old_path_wins_over_its_prefix() {
        // "from '../lib'" is a proper prefix of "from '../lib/audit'"; the
        // specific entry must fire first so the text never ends up half-mapped.
        let table = SubstitutionTable::new(vec![
            ("from '../lib'".to_string(), "from '../../shared/lib'".to_string()),
            (
                "from '../lib/audit'".to_string(),
                "from '../../shared/utils/audit'".to_string(),
            ),
        ]);

        let (out, count) = table.apply("import { audit } from '../lib/audit';\n");
        assert_eq!(count, 1);
        assert_eq!(out, "import { audit } from '../../shared/utils/audit';\n");
    }

    #[test]
    fn substitutions_count_every_occurrence() {
        let table = SubstitutionTable::service_defaults();
        let (_, count) =
            table.apply("from '../context'; from '../context'; from '../lib/audit';");
        assert_eq!(count, 3);
    }
}
