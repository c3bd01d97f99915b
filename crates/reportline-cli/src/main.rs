// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::SnapshotRuntime;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `reportline --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(&config.log_level());
    debug!(config = %options.config_path.display(), "config loaded");

    let snapshot_path = options
        .snapshot_path
        .clone()
        .or_else(|| config.snapshot_path())
        .ok_or_else(|| {
            anyhow!(
                "no snapshot to evaluate; pass --snapshot <path> or set [snapshot].path in {}",
                options.config_path.display()
            )
        })?;

    let mut runtime = SnapshotRuntime::new();
    runtime.load_file(&snapshot_path)?;
    let evaluation = runtime.evaluate()?;
    if options.check_only {
        info!(
            keys = runtime.store().keys().len(),
            actions = evaluation.actions.len(),
            "snapshot check passed"
        );
        return Ok(());
    }

    print!("{}", evaluation.render()?);
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    snapshot_path: Option<PathBuf>,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        snapshot_path: None,
        print_config_path: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--snapshot" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--snapshot requires a JSON file path"))?;
                options.snapshot_path = Some(PathBuf::from(value.as_ref()));
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("reportline");
    println!("  --config <path>          Use a specific config path");
    println!("  --snapshot <path>        Evaluate this JSON snapshot");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config + snapshot without printing");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/reportline-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                snapshot_path: None,
                print_config_path: false,
                print_example: false,
                check_only: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_reads_config_and_snapshot_paths() -> Result<()> {
        let options = parse_cli_args(
            [
                "--config",
                "/tmp/custom.toml",
                "--snapshot",
                "/tmp/snapshot.json",
                "--check",
            ],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/tmp/custom.toml"));
        assert_eq!(
            options.snapshot_path,
            Some(PathBuf::from("/tmp/snapshot.json"))
        );
        assert!(options.check_only);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_print_flags() -> Result<()> {
        let options = parse_cli_args(
            ["--print-config-path", "--print-example-config", "-h"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_requires_snapshot_value() {
        let error = parse_cli_args(["--snapshot"], default_options_path())
            .expect_err("missing snapshot path should fail");
        assert!(error.to_string().contains("--snapshot requires"));
    }

    #[test]
    fn parse_cli_args_rejects_unknown_flag() {
        let error = parse_cli_args(["--demo"], default_options_path())
            .expect_err("unknown flag should fail");
        assert!(error.to_string().contains("unknown argument \"--demo\""));
    }
}
