//! Static client release CLI entrypoint.
//!
//! This binary builds, packages, and publishes a statically linked client
//! binary. Progress is logged to stderr; summaries go to stdout.

use clap::Parser;
use client_release::cli::{Cli, Command};
use client_release::config::{FileConfig, ReleaseConfig};
use client_release::error::Result;
use client_release::exec::{CommandExecutor, SystemCommandExecutor};
use client_release::logging;
use client_release::output::{
    format_build_human, format_build_json, format_plan, format_publish, format_verification,
    write_output,
};
use client_release::pipeline::{
    ReleaseContext, ensure_verified, plan_build, plan_publish, run_build, run_publish, run_verify,
};
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbosity, cli.global.quiet);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemCommandExecutor, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn load_context(cli: &Cli) -> Result<ReleaseContext> {
    let file = FileConfig::load(cli.global.config.as_deref())?;
    let config = ReleaseConfig::resolve(file, cli.overrides())?;
    let version = config.resolve_version(cli.command.release_version())?;
    Ok(ReleaseContext::new(config, version, cli.global.verbosity))
}

fn run(cli: &Cli, executor: &dyn CommandExecutor, stdout: &mut dyn Write) -> Result<()> {
    let ctx = load_context(cli)?;
    let dry_run = cli.global.dry_run;

    match &cli.command {
        Command::Build(args) => {
            if dry_run {
                let plan = plan_build(&ctx, args.options());
                return write_output(stdout, &format_plan(&format!("build {}", ctx.tag()), &plan));
            }
            let report = run_build(executor, &ctx, args.options())?;
            let text = if args.json {
                format_build_json(&ctx, &report)?
            } else {
                format_build_human(&ctx, &report)
            };
            write_output(stdout, &text)
        }
        Command::Publish(args) => {
            let options = args.options();
            if dry_run {
                let plan = plan_publish(&ctx, &options);
                return write_output(stdout, &format_plan(&format!("publish {}", ctx.tag()), &plan));
            }
            let report = run_publish(executor, &ctx, &options)?;
            write_output(stdout, &format_publish(&report))
        }
        Command::Verify(_) => {
            let checksums = ctx.artefacts().checksums;
            if dry_run {
                return write_output(
                    stdout,
                    &format!("Dry run - would verify {}", checksums.display()),
                );
            }
            let report = run_verify(&ctx)?;
            write_output(stdout, &format_verification(&report))?;
            ensure_verified(&report, &checksums)
        }
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

fn write_stderr_line(stderr: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}
