use assert_cmd::Command;

/// The ansledger binary, isolated from the caller's workspace and log settings
pub fn ansledger_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ansledger").unwrap();
    cmd.env_remove("ANSLEDGER_ROOT");
    cmd.env_remove("ANSLEDGER_LOG");
    cmd
}
