//! All-or-nothing semantics when a span anchor is ambiguous.

use camino::Utf8PathBuf;
use fs_err as fs;
use modwire_rewrite::{backup_path, rewrite, BackupMode, RewriteError, RewriteOptions};
use modwire_types::ops::{Anchor, RewriteOp};
use pretty_assertions::assert_eq;

const DUPLICATED_SPAN: &str = "\
// imports
const resolvers = {
  Product: {
    a: 1,
  },
  Legacy: {
    Product: {
      b: 2,
    },
  },
};
";

fn ops() -> Vec<RewriteOp> {
    vec![
        RewriteOp {
            id: "product/import".to_string(),
            anchor: Anchor::InsertAfter {
                pattern: "// imports".to_string(),
            },
            payload: "import { ProductFieldResolvers } from '../../modules/product';"
                .to_string(),
        },
        RewriteOp {
            id: "product/fields".to_string(),
            anchor: Anchor::ReplaceSpan {
                start: "Product: {".to_string(),
            },
            payload: "Product: ProductFieldResolvers,".to_string(),
        },
    ]
}

fn write_target(td: &tempfile::TempDir) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(td.path().join("index.ts")).expect("utf8 path");
    fs::write(&path, DUPLICATED_SPAN).expect("write target");
    path
}

#[test]
fn ambiguous_span_rejects_the_whole_run() {
    let td = tempfile::tempdir().unwrap();
    let target = write_target(&td);

    let err = rewrite(&target, &ops(), &RewriteOptions::default()).unwrap_err();
    match &err {
        RewriteError::AmbiguousAnchor {
            op_id,
            pattern,
            matches,
        } => {
            assert_eq!(op_id, "product/fields");
            assert_eq!(pattern, "Product: {");
            assert_eq!(*matches, 2);
        }
        other => panic!("expected AmbiguousAnchor, got {other:?}"),
    }
    assert_eq!(err.exit_code(), 2);

    // The first op had already applied to the working text, but nothing
    // reached the real target; the backup is the recovery path.
    assert_eq!(fs::read_to_string(&target).unwrap(), DUPLICATED_SPAN);
    let backup = backup_path(&target, BackupMode::Fixed);
    assert_eq!(fs::read_to_string(&backup).unwrap(), DUPLICATED_SPAN);
}

#[test]
fn allow_partial_keeps_unambiguous_edits() {
    let td = tempfile::tempdir().unwrap();
    let target = write_target(&td);

    let opts = RewriteOptions {
        allow_partial: true,
        ..Default::default()
    };
    let (outcome, _) = rewrite(&target, &ops(), &opts).unwrap();

    assert_eq!(outcome.summary.applied, 1);
    assert_eq!(outcome.summary.skipped, 1);

    let after = fs::read_to_string(&target).unwrap();
    assert!(after.contains("import { ProductFieldResolvers }"));
    // The ambiguous span itself was never guessed at.
    assert_eq!(after.matches("Product: {").count(), 2);
}

#[test]
fn dry_run_ambiguity_reports_without_backup() {
    let td = tempfile::tempdir().unwrap();
    let target = write_target(&td);

    let opts = RewriteOptions {
        dry_run: true,
        ..Default::default()
    };
    let err = rewrite(&target, &ops(), &opts).unwrap_err();
    assert!(err.is_anchor_conflict());
    assert!(!backup_path(&target, BackupMode::Fixed).exists());
    assert_eq!(fs::read_to_string(&target).unwrap(), DUPLICATED_SPAN);
}
