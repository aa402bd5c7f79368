use crate::error::{BrewupError, Result};
use crate::package::PackageType;
use crate::package::info::InfoResponse;
use std::cell::OnceCell;
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};

/// Runs external programs on behalf of the agents.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Run to completion and return stdout.
    fn capture(&self, program: &str, args: &[String]) -> Result<String>;

    /// Run while echoing stdout to the terminal.
    fn stream(&self, program: &str, args: &[String]) -> Result<()>;
}

pub fn render_command(program: &str, args: &[String]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// CommandRunner backed by `std::process`.
#[derive(Debug, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn capture(&self, program: &str, args: &[String]) -> Result<String> {
        let command = render_command(program, args);
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| BrewupError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BrewupError::HomebrewExecution {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn stream(&self, program: &str, args: &[String]) -> Result<()> {
        let command = render_command(program, args);
        let mut child = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| BrewupError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Keep draining past invalid UTF-8; closing the pipe early kills brew with SIGPIPE
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut line = Vec::new();
            loop {
                line.clear();
                match reader.read_until(b'\n', &mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&line);
                        println!("{}", text.trim_end_matches(['\r', '\n']));
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        tracing::debug!("Stopped reading output of `{}`: {}", command, e);
                        break;
                    }
                }
            }
        }

        let status = child.wait().map_err(|source| BrewupError::Spawn {
            command: command.clone(),
            source,
        })?;

        if !status.success() {
            tracing::debug!(
                "`{}` exited with code {}",
                command,
                status.code().unwrap_or(-1)
            );
            // stderr went straight to the terminal
            return Err(BrewupError::HomebrewExecution {
                command,
                stderr: String::new(),
            });
        }

        Ok(())
    }
}

/// Wraps the Homebrew subcommands brewup relies on
pub struct HomebrewAgent<'a> {
    runner: &'a dyn CommandRunner,
    command: String,
    leaves: OnceCell<Vec<String>>,
}

impl<'a> HomebrewAgent<'a> {
    pub fn new(runner: &'a dyn CommandRunner, command: impl Into<String>) -> Self {
        Self {
            runner,
            command: command.into(),
            leaves: OnceCell::new(),
        }
    }

    fn capture(&self, args: &[&str]) -> Result<String> {
        let args = to_owned(args);
        tracing::debug!("Running: {}", render_command(&self.command, &args));
        self.runner.capture(&self.command, &args)
    }

    fn stream(&self, args: &[&str]) -> Result<()> {
        let args = to_owned(args);
        tracing::debug!("Running: {}", render_command(&self.command, &args));
        self.runner.stream(&self.command, &args)
    }

    /// `brew update`
    pub fn update(&self) -> Result<()> {
        self.stream(&["update"])
    }

    /// `brew outdated --json=v2`, raw JSON
    pub fn outdated(&self, greedy: bool) -> Result<String> {
        let mut args = vec!["outdated", "--json=v2"];
        if greedy {
            args.push("--greedy");
        }
        self.capture(&args)
    }

    /// `brew info --json=v2` for a single formula or cask
    pub fn info(&self, name: &str, package_type: PackageType) -> Result<InfoResponse> {
        let mut args = vec!["info", "--json=v2"];
        if let Some(flag) = package_type.flag() {
            args.push(flag);
        }
        args.push(name);

        let output = self.capture(&args).map_err(|err| match err {
            BrewupError::HomebrewExecution { stderr, .. } => BrewupError::HomebrewInfo(
                stderr.trim().trim_start_matches("Error: ").to_string(),
            ),
            other => other,
        })?;

        tracing::trace!("brew info response for {}: {}", name, output);
        serde_json::from_str(&output).map_err(|source| BrewupError::UnexpectedOutput {
            command: render_command(&self.command, &to_owned(&args)),
            source,
        })
    }

    /// Run `brew upgrade` with prepared arguments
    pub fn upgrade(&self, args: &[String]) -> Result<()> {
        let args: Vec<&str> = std::iter::once("upgrade")
            .chain(args.iter().map(String::as_str))
            .collect();
        self.stream(&args)
    }

    pub fn autoremove(&self, dry_run: bool) -> Result<()> {
        self.stream(&with_dry_run("autoremove", dry_run))
    }

    pub fn cleanup(&self, dry_run: bool) -> Result<()> {
        self.stream(&with_dry_run("cleanup", dry_run))
    }

    /// Installed packages that nothing else depends on, computed once per run.
    pub fn leaves(&self) -> Result<&[String]> {
        if let Some(leaves) = self.leaves.get() {
            return Ok(leaves);
        }

        let output = self.capture(&["leaves", "-r"])?;
        let leaves = split_names(&output);
        Ok(self.leaves.get_or_init(|| leaves))
    }

    /// Installed packages that depend on `name`
    pub fn used_by(&self, name: &str) -> Result<Vec<String>> {
        let output = self.capture(&["uses", "--installed", name])?;
        Ok(split_names(&output))
    }

    /// Run a helper program such as `open` or `xattr`; failures are logged, never fatal.
    pub fn run_auxiliary(&self, program: &str, args: &[&str]) -> bool {
        let args = to_owned(args);
        let command = render_command(program, &args);
        tracing::debug!("Running: {}", command);

        match self.runner.capture(program, &args) {
            Ok(_) => true,
            Err(err) => {
                tracing::error!("{}", err);
                false
            }
        }
    }
}

fn to_owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

fn with_dry_run(subcommand: &str, dry_run: bool) -> Vec<&str> {
    let mut args = vec![subcommand];
    if dry_run {
        args.push("--dry-run");
    }
    args
}

fn split_names(output: &str) -> Vec<String> {
    output.split_whitespace().map(str::to_string).collect()
}
