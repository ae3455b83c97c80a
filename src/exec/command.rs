// src/exec/command.rs

//! Building the external tool's command line.
//!
//! The operation text always travels as one argument in the argv; there is no
//! shell in between, so metacharacters in user input are inert. The working
//! directory is applied through `Command::current_dir`.

use std::process::Stdio;

use tokio::process::Command;

use crate::config::SupervisorConfig;

use super::invocation::Invocation;

/// How to invoke the external tool: `program [leading_args..] <operation>
/// [unattended_flag]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
    leading_args: Vec<String>,
    unattended_flag: Option<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            unattended_flag: None,
        }
    }

    pub fn from_config(cfg: &SupervisorConfig) -> Self {
        let unattended_flag = cfg
            .unattended
            .then(|| cfg.unattended_flag.clone());
        Self {
            program: cfg.cli_path.clone(),
            leading_args: cfg.tool_args.clone(),
            unattended_flag,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Grant the tool unattended authority by appending its
    /// prompt-suppression flag.
    pub fn with_unattended_flag(mut self, flag: impl Into<String>) -> Self {
        self.unattended_flag = Some(flag.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn is_unattended(&self) -> bool {
        self.unattended_flag.is_some()
    }

    /// Arguments passed after the program name.
    pub fn argv(&self, operation: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.leading_args.len() + 2);
        argv.extend(self.leading_args.iter().cloned());
        argv.push(operation.to_string());
        if let Some(flag) = &self.unattended_flag {
            argv.push(flag.clone());
        }
        argv
    }

    /// A ready-to-spawn command for the invocation.
    ///
    /// - stdin is null, stdout/stderr are piped,
    /// - the child is killed if its handle is dropped,
    /// - on unix the child leads a fresh process group so that termination
    ///   also reaches anything it spawned.
    pub fn build(&self, invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.argv(&invocation.operation))
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_is_a_single_argument() {
        let tool = ToolCommand::new("claude").with_args(["-p"]);
        let argv = tool.argv("rm -rf / ; echo $(whoami)");
        assert_eq!(argv, vec!["-p", "rm -rf / ; echo $(whoami)"]);
    }

    #[test]
    fn unattended_flag_goes_last() {
        let tool = ToolCommand::new("claude")
            .with_args(["-p"])
            .with_unattended_flag("--dangerously-skip-permissions");
        assert!(tool.is_unattended());
        assert_eq!(
            tool.argv("list files"),
            vec!["-p", "list files", "--dangerously-skip-permissions"]
        );
    }

    #[test]
    fn empty_operation_is_passed_through() {
        let tool = ToolCommand::new("tool");
        assert_eq!(tool.argv(""), vec![String::new()]);
    }

    #[test]
    fn from_config_respects_unattended_switch() {
        let mut cfg = SupervisorConfig::default();
        cfg.cli_path = "mytool".to_string();
        cfg.unattended = false;
        let tool = ToolCommand::from_config(&cfg);
        assert_eq!(tool.program(), "mytool");
        assert!(!tool.is_unattended());

        cfg.unattended = true;
        let tool = ToolCommand::from_config(&cfg);
        assert_eq!(tool.argv("x").last().map(String::as_str), Some(cfg.unattended_flag.as_str()));
    }
}
