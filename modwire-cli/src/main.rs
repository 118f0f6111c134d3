mod config;
mod wiring;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fs_err as fs;
use modwire_migrate::SubstitutionTable;
use modwire_render::render_module;
use modwire_rewrite::{rewrite, RewriteError, RewriteOptions};
use modwire_types::layout::ProjectLayout;
use modwire_types::outcome::{MigrationResult, OpStatus, RewriteOutcome};
use modwire_types::spec::ModuleSpec;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "modwire",
    version,
    about = "Module scaffolding and resolver aggregator wiring."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate module artifacts and migrate legacy service files.
    Scaffold(ScaffoldArgs),
    /// Register all modules in the shared resolver aggregator file.
    Wire(WireArgs),
}

#[derive(Debug, Parser)]
struct ScaffoldArgs {
    /// Backend root directory.
    #[arg(long, default_value = "backend")]
    backend_root: Utf8PathBuf,
}

#[derive(Debug, Parser)]
struct WireArgs {
    /// Backend root directory.
    #[arg(long, default_value = "backend")]
    backend_root: Utf8PathBuf,

    /// Evaluate the batch and print the patch without writing anything.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Record ambiguous span anchors as skipped instead of rejecting the run.
    #[arg(long, default_value_t = false)]
    allow_partial: bool,

    /// Output directory for run artifacts (default: <backend_root>/artifacts/modwire).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        let code = e
            .downcast_ref::<RewriteError>()
            .map(RewriteError::exit_code)
            .unwrap_or(1);
        return ExitCode::from(code);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Scaffold(args) => cmd_scaffold(args),
        Command::Wire(args) => cmd_wire(args),
    }
}

fn cmd_scaffold(args: ScaffoldArgs) -> anyhow::Result<()> {
    let layout = ProjectLayout::new(args.backend_root.clone());
    let cfg = config::load_or_default(&args.backend_root).context("load modwire.toml config")?;

    // Registry validation is fatal before any file I/O.
    let registry = cfg.registry()?;
    let table = SubstitutionTable::service_defaults();

    let mut failed = 0u64;
    for spec in registry.iter() {
        match scaffold_module(spec, &layout, &table) {
            Ok(migration) => {
                let service = if migration.copied {
                    format!(
                        "service migrated ({} imports rewritten)",
                        migration.rewritten_imports
                    )
                } else {
                    "no service migration".to_string()
                };
                println!("  {:<12} types + barrel written, {}", spec.name, service);
            }
            Err(e) => {
                error!(module = %spec.name, "scaffold failed: {:?}", e);
                println!("  {:<12} FAILED: {:#}", spec.name, e);
                failed += 1;
            }
        }
    }

    println!();
    println!(
        "{} of {} modules scaffolded under {}",
        registry.len() as u64 - failed,
        registry.len(),
        layout.modules_dir()
    );

    if failed > 0 {
        anyhow::bail!("{failed} module(s) failed to scaffold");
    }
    Ok(())
}

fn scaffold_module(
    spec: &ModuleSpec,
    layout: &ProjectLayout,
    table: &SubstitutionTable,
) -> anyhow::Result<MigrationResult> {
    let rendered = render_module(spec);

    let dir = layout.module_dir(spec);
    fs::create_dir_all(&dir).with_context(|| format!("create {dir}"))?;

    let types_path = layout.types_file(spec);
    fs::write(&types_path, rendered.types_file).with_context(|| format!("write {types_path}"))?;

    let barrel_path = layout.barrel_file(spec);
    fs::write(&barrel_path, rendered.barrel_file)
        .with_context(|| format!("write {barrel_path}"))?;

    debug!(module = %spec.name, %dir, "artifacts written");
    modwire_migrate::migrate(spec, layout, table)
}

#[derive(Debug, Serialize)]
struct WireSummary {
    schema: String,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    dry_run: bool,
    outcome: RewriteOutcome,
}

fn cmd_wire(args: WireArgs) -> anyhow::Result<()> {
    let layout = ProjectLayout::new(args.backend_root.clone());
    let cfg = config::load_or_default(&args.backend_root).context("load modwire.toml config")?;
    let registry = cfg.registry()?;

    let ops = wiring::registry_ops(&registry);
    let aggregator = layout.aggregator_file();
    let opts = RewriteOptions {
        dry_run: args.dry_run,
        allow_partial: args.allow_partial,
        backup: cfg.backups.mode,
    };

    let started_at = Utc::now();
    let (outcome, patch) = rewrite(&aggregator, &ops, &opts)
        .with_context(|| format!("rewrite aggregator {aggregator}"))?;

    if args.dry_run {
        if patch.is_empty() {
            println!("nothing to do: aggregator already wired");
        } else {
            print!("{patch}");
        }
    } else {
        for r in &outcome.results {
            let status = match r.status {
                OpStatus::Applied => "applied",
                OpStatus::Skipped => "skipped",
            };
            match &r.message {
                Some(msg) => println!("  {:<24} {status} ({msg})", r.op_id),
                None => println!("  {:<24} {status}", r.op_id),
            }
        }
        println!();
        println!(
            "{} applied, {} skipped",
            outcome.summary.applied, outcome.summary.skipped
        );
        if let Some(backup) = &outcome.backup_path {
            println!("backup: {backup}");
        }
    }

    let out_dir = args
        .out_dir
        .unwrap_or_else(|| args.backend_root.join("artifacts").join("modwire"));
    fs::create_dir_all(&out_dir).with_context(|| format!("create {out_dir}"))?;

    let summary = WireSummary {
        schema: modwire_types::schema::MODWIRE_WIRE_SUMMARY_V1.to_string(),
        run_id: Uuid::new_v4(),
        started_at,
        ended_at: Utc::now(),
        dry_run: args.dry_run,
        outcome,
    };
    write_json(&out_dir.join("wire-summary.json"), &summary)?;
    fs::write(out_dir.join("patch.diff"), &patch)
        .with_context(|| format!("write {}", out_dir.join("patch.diff")))?;

    info!("wrote wire artifacts to {}", out_dir);
    Ok(())
}

fn write_json<T: Serialize>(path: &Utf8Path, v: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(v).context("serialize json")?;
    fs::write(path, s).with_context(|| format!("write {}", path))?;
    Ok(())
}
