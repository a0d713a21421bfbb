use assert_cmd::Command;
use chrono::DateTime;
use pipes_sample::naf::Document;

const NAF: &str = include_str!("fixtures/obama.naf");
const MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/toy-en.json");

fn run_ner(extra: &[&str]) -> String {
    let output = Command::cargo_bin("pipes-sample")
        .expect("binary exists")
        .env("RUST_LOG", "warn")
        .env("PIPES_COMMIT", "abc123")
        .args(["ner", "--model", MODEL])
        .args(extra)
        .write_stdin(NAF)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(output).expect("utf-8 output")
}

#[test]
fn naf_is_the_default_output() {
    let out = run_ner(&[]);
    assert!(out.starts_with("<?xml"));

    let doc: Document = out.parse().expect("output parses as NAF");
    let kinds: Vec<&str> = doc.entities.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, ["PERSON", "LOCATION", "PERSON"]);
    assert_eq!(doc.entity_text(&doc.entities[0]), "Barack Obama");
    assert_eq!(doc.entity_text(&doc.entities[1]), "Paris");

    let lps: Vec<_> = doc.processors("entities").collect();
    assert_eq!(lps.len(), 1);
    assert_eq!(lps[0].name, "pipes-nerc-toy-en");
    assert_eq!(lps[0].version, format!("{}-abc123", env!("CARGO_PKG_VERSION")));
    let begin = DateTime::parse_from_rfc3339(lps[0].begin_timestamp.as_deref().expect("begin"))
        .expect("rfc3339 begin");
    let end = DateTime::parse_from_rfc3339(lps[0].end_timestamp.as_deref().expect("end"))
        .expect("rfc3339 end");
    assert!(begin <= end);

    // Layers the tool does not model survive the round trip.
    assert_eq!(doc.extra_layers.len(), 1);
    assert_eq!(doc.extra_layers[0].name, "deps");
}

#[test]
fn explicit_naf_matches_default() {
    let default = strip_timestamps(&run_ner(&[]));
    let explicit = strip_timestamps(&run_ner(&["-o", "naf"]));
    assert_eq!(default, explicit);
}

#[test]
fn conll02_has_one_begin_tag_per_entity() {
    let out = run_ner(&["--outputFormat", "conll02"]);
    assert!(!out.contains('<'));
    let begins = out.lines().filter(|l| l.ends_with(" B-PERSON") || l.ends_with(" B-LOCATION"));
    assert_eq!(begins.count(), 3);
    assert!(out.starts_with("Barack B-PERSON\nObama I-PERSON\n"));
}

#[test]
fn conll03_has_four_columns() {
    let out = run_ner(&["-o", "conll03"]);
    assert!(!out.contains('<'));
    for line in out.lines().filter(|l| !l.is_empty()) {
        assert_eq!(line.split(' ').count(), 4, "line: {line}");
    }
    assert!(out.contains("Paris NNP O B-LOCATION\n"));
    assert_eq!(out.lines().filter(|l| l.contains(" B-")).count(), 3);
}

#[test]
fn missing_model_file_is_fatal() {
    Command::cargo_bin("pipes-sample")
        .expect("binary exists")
        .env("RUST_LOG", "off")
        .args(["ner", "-m", "/nonexistent/model.json"])
        .write_stdin(NAF)
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn empty_input_is_fatal() {
    Command::cargo_bin("pipes-sample")
        .expect("binary exists")
        .env("RUST_LOG", "off")
        .args(["ner", "-m", MODEL])
        .write_stdin("")
        .assert()
        .failure()
        .stdout("");
}

fn strip_timestamps(naf: &str) -> String {
    naf.lines()
        .filter(|l| !l.contains("pipes-nerc-"))
        .collect::<Vec<_>>()
        .join("\n")
}
