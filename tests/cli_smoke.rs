use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn tasktrail_help_works() {
    Command::cargo_bin("tasktrail")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("transition-history search"));
}

#[test]
fn subcommand_help_works() {
    for cmd in ["search", "edit"] {
        Command::cargo_bin("tasktrail")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success()
            .stdout(contains("--snapshot"));
    }
}
