//! `modmig` command-line driver

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use modmig_manifest::FsManifestTools;
use modmig_rewrite::RewriteConfig;
use modmig_steps::{MigrationContext, MigrationRegistry};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("modmig")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate application modules between framework versions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log discovered and modified files"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Apply every migration step between two versions")
                .arg(
                    Arg::new("module")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Module directory"),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .required(true)
                        .help("Current module version, e.g. 14.0"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .help("Target version, e.g. 16.0"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML rewrite configuration"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Report changes without writing anything"),
                ),
        )
        .subcommand(Command::new("steps").about("List registered version transitions"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> Result<RewriteConfig> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => RewriteConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => RewriteConfig::default(),
    };
    let dry_run = config.dry_run || args.get_flag("dry-run");
    Ok(config.with_dry_run(dry_run))
}

fn migrate(registry: &MigrationRegistry, args: &ArgMatches) -> Result<()> {
    let module = args
        .get_one::<PathBuf>("module")
        .context("module directory is required")?;
    let from = args.get_one::<String>("from").context("--from is required")?;
    let to = args.get_one::<String>("to").context("--to is required")?;
    let config = load_config(args)?;
    let dry_run = config.dry_run;

    let mut ctx = MigrationContext::new(module, &FsManifestTools).with_config(config);
    let report = registry
        .migrate(&mut ctx, from, to)
        .with_context(|| format!("migrating {} from {from} to {to}", module.display()))?;

    let prefix = if dry_run { "would modify" } else { "modified" };
    for path in &report.modified {
        println!("{prefix} {}", ctx.relative_path(path));
    }
    let prefix = if dry_run { "would delete" } else { "deleted" };
    for path in &report.deleted {
        println!("{prefix} {}", ctx.relative_path(path));
    }
    println!(
        "{}: {} step(s) applied, {} file(s) modified, {} deleted",
        ctx.module_name(),
        ctx.steps_applied().len(),
        report.modified.len(),
        report.deleted.len()
    );
    Ok(())
}

fn list_steps(registry: &MigrationRegistry) {
    for step in registry.iter() {
        println!("{}", step.name());
        for operation in step.operation_names() {
            println!("  {operation}");
        }
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let registry = MigrationRegistry::with_defaults()?;
    match matches.subcommand() {
        Some(("migrate", args)) => migrate(&registry, args),
        Some(("steps", _)) => {
            list_steps(&registry);
            Ok(())
        }
        _ => Ok(()),
    }
}
