//! Workspace automation for Listify.
//!
//! Invoke as `cargo run -p xtask -- <task>`. Output goes straight to the
//! terminal; this binary is not part of the application and does not set up
//! tracing.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::env;
use std::process::{Command, ExitCode};

use anyhow::{bail, Context, Result};

mod features;

/// A named task and the one-line summary shown by `help`.
struct Task {
    name: &'static str,
    about: &'static str,
    run: fn() -> Result<()>,
}

const TASKS: &[Task] = &[
    Task { name: "ci", about: "fmt, clippy, feature tiers, then tests", run: ci },
    Task { name: "fmt", about: "Fail if any crate is not rustfmt-clean", run: fmt },
    Task { name: "clippy", about: "Lint every target with all features", run: clippy },
    Task { name: "test", about: "Run the workspace tests, test-utils suites included", run: test },
    Task {
        name: "test-features",
        about: "Compile listify-common once per feature tier",
        run: features::check_tiers,
    },
    Task { name: "audit", about: "Scan Cargo.lock with cargo-audit", run: audit },
];

fn main() -> ExitCode {
    let requested = env::args().nth(1);

    let outcome = match requested.as_deref() {
        None | Some("help" | "-h" | "--help") => {
            usage();
            return ExitCode::SUCCESS;
        }
        Some(name) => match TASKS.iter().find(|task| task.name == name) {
            Some(task) => (task.run)(),
            None => {
                eprintln!("no such task: {name}\n");
                usage();
                return ExitCode::FAILURE;
            }
        },
    };

    if let Err(err) = outcome {
        eprintln!("xtask failed: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn usage() {
    println!("cargo run -p xtask -- <task>\n");
    println!("tasks:");
    for task in TASKS {
        println!("  {:<14} {}", task.name, task.about);
    }
}

fn ci() -> Result<()> {
    let steps: [(&str, fn() -> Result<()>); 4] = [
        ("format", fmt),
        ("clippy", clippy),
        ("feature tiers", features::check_tiers),
        ("tests", test),
    ];
    for (index, (label, step)) in steps.iter().enumerate() {
        println!("==> [{}/{}] {label}", index + 1, steps.len());
        step().with_context(|| format!("ci step `{label}`"))?;
    }
    println!("ci passed");
    Ok(())
}

fn fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"]).context("run `cargo fmt --all` and retry")
}

fn clippy() -> Result<()> {
    cargo(&["clippy", "--workspace", "--all-targets", "--all-features", "--", "-D", "warnings"])
}

fn test() -> Result<()> {
    cargo(&["test", "--workspace", "--all-features"])
}

fn audit() -> Result<()> {
    let probe = Command::new("cargo").args(["audit", "--version"]).output();
    if !probe.is_ok_and(|out| out.status.success()) {
        bail!("cargo-audit is missing; install it with `cargo install cargo-audit`");
    }
    cargo(&["audit"])
}

/// Run cargo with `args`, failing on a non-zero exit.
pub(crate) fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("could not spawn `cargo {}`", args.join(" ")))?;
    if !status.success() {
        bail!("`cargo {}` exited with {status}", args.join(" "));
    }
    Ok(())
}
