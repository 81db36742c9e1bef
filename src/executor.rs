use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use crate::error::LaunchError;
use crate::model::ApplicationRecord;
use log::{debug, info};

/// Argument vector for `record`: the Exec template split with shell quoting,
/// minus `%` field codes. Falls back to the record name when nothing is left.
pub fn resolve_launch_command(record: &ApplicationRecord) -> Vec<String> {
    let tokens = match shell_words::split(&record.exec) {
        Ok(tokens) => tokens,
        Err(err) => {
            debug!("Exec of {:?} is not shell-quotable ({}), splitting on whitespace", record.name, err);
            record.exec.split_whitespace().map(String::from).collect()
        }
    };

    let argv: Vec<String> = tokens.into_iter().filter(|t| !t.starts_with('%')).collect();
    if argv.is_empty() {
        vec![record.name.clone()]
    } else {
        argv
    }
}

/// Command for `argv` in a process group of its own, with null stdio.
fn detached_command(argv: &[String]) -> Result<Command, LaunchError> {
    let (program, args) = argv.split_first().ok_or(LaunchError::EmptyCommand)?;

    let mut command = Command::new(program);
    command.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0);
    Ok(command)
}

/// Starts `argv` detached from the launcher's process group and returns
/// without waiting. The child is not tracked afterwards.
pub fn launch(argv: &[String]) -> Result<(), LaunchError> {
    let mut command = detached_command(argv)?;
    let program = &argv[0];

    let child = command.spawn().map_err(|source| LaunchError::Spawn {
        program: program.clone(),
        source,
    })?;
    info!("Launched {:?} (pid {})", argv, child.id());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, exec: &str) -> ApplicationRecord {
        ApplicationRecord::new(name.to_string(), exec.to_string())
    }

    #[test]
    fn test_field_codes_are_stripped() {
        assert_eq!(resolve_launch_command(&record("App", "app %U --flag")), vec!["app", "--flag"]);
        assert_eq!(resolve_launch_command(&record("Viewer", "viewer %f %i %c %k")), vec!["viewer"]);
    }

    #[test]
    fn test_only_field_codes_falls_back_to_name() {
        assert_eq!(resolve_launch_command(&record("My App", "%f")), vec!["My App"]);
        assert_eq!(resolve_launch_command(&record("Blank", "")), vec!["Blank"]);
    }

    #[test]
    fn test_quoted_arguments_survive() {
        assert_eq!(
            resolve_launch_command(&record("Shell", "sh -c \"echo hello world\" %u")),
            vec!["sh", "-c", "echo hello world"]
        );
        assert_eq!(
            resolve_launch_command(&record("Spaced", "'/opt/My Apps/run' --x")),
            vec!["/opt/My Apps/run", "--x"]
        );
    }

    #[test]
    fn test_unbalanced_quotes_fall_back_to_whitespace() {
        assert_eq!(
            resolve_launch_command(&record("Broken", "run \"oops %F")),
            vec!["run", "\"oops"]
        );
    }

    #[test]
    fn test_launch_empty_command() {
        assert!(matches!(launch(&[]), Err(LaunchError::EmptyCommand)));
    }

    #[test]
    fn test_launch_missing_executable() {
        let result = launch(&["/nonexistent/appdex-test-binary".to_string()]);
        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
    }

    #[test]
    fn test_child_gets_its_own_process_group() {
        let argv = vec!["cat".to_string(), "/proc/self/stat".to_string()];
        let output = detached_command(&argv)
            .unwrap()
            .stdout(Stdio::piped())
            .output()
            .unwrap();
        let stat = String::from_utf8(output.stdout).unwrap();
        let pid = stat.split_whitespace().next().unwrap();
        // Fields after the parenthesised command name: state, ppid, pgrp.
        let pgrp = stat.rsplit_once(')').unwrap().1.split_whitespace().nth(2).unwrap();
        assert_eq!(pid, pgrp);
    }

    #[test]
    fn test_launch_detached() {
        assert!(launch(&["true".to_string()]).is_ok());
    }
}
