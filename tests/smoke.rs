use assert_cmd::Command;

const NAF: &str = include_str!("fixtures/obama.naf");
const MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/toy-en.json");

fn pipes() -> Command {
    let mut cmd = Command::cargo_bin("pipes-sample").expect("binary exists");
    cmd.env("RUST_LOG", "warn").env_remove("PIPES_LOG");
    cmd
}

#[test]
fn logs_go_to_stderr_and_honour_pipes_log() {
    let output = pipes()
        .env("PIPES_LOG", "debug")
        .arg("pos")
        .assert()
        .success()
        .stdout("")
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("tracing initialised"), "{stderr}");
}

#[test]
fn cli_help_runs() {
    pipes().arg("--help").assert().success();
}

#[test]
fn stub_stages_write_nothing() {
    for stage in ["pos", "chunk", "parse", "doc"] {
        pipes().arg(stage).assert().success().stdout("");
    }
}

#[test]
fn tok_reads_document_and_writes_nothing() {
    pipes()
        .arg("tok")
        .write_stdin(NAF)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn tok_rejects_malformed_input() {
    pipes()
        .arg("tok")
        .write_stdin("this is not NAF")
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn missing_subcommand_is_an_argument_error() {
    pipes().assert().code(1).stdout("");
}

#[test]
fn unknown_subcommand_is_an_argument_error() {
    pipes().arg("lemmatize").assert().code(1).stdout("");
}

#[test]
fn ner_requires_model() {
    let output = pipes()
        .arg("ner")
        .write_stdin(NAF)
        .assert()
        .code(1)
        .stdout("")
        .get_output()
        .clone();
    let stderr = String::from_utf8(output.stderr).expect("utf-8 stderr");
    assert!(stderr.contains("--model"), "stderr: {stderr}");
    assert!(stderr.contains("--help for details"), "stderr: {stderr}");
}

#[test]
fn ner_rejects_unknown_output_format() {
    pipes()
        .args(["ner", "-m", MODEL, "-o", "xyz"])
        .write_stdin(NAF)
        .assert()
        .code(1)
        .stdout("");
}
