use std::{fs, path::Path};

use pipes_sample::{
    cli::ner::ner_properties,
    naf::Document,
    nlp::{numeric, Annotate, NerError, Properties, Span},
};

const NAF: &str = include_str!("fixtures/obama.naf");
const MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/toy-en.json");

fn properties() -> Properties {
    ner_properties(Path::new(MODEL))
}

fn labels(spans: &[Span]) -> Vec<(usize, usize, &str)> {
    spans
        .iter()
        .map(|s| (s.start, s.end, s.label.as_str()))
        .collect()
}

#[test]
fn default_properties_are_fixed() {
    let props = properties();
    let pairs: Vec<_> = props.iter().collect();
    assert_eq!(
        pairs,
        [
            ("model", MODEL),
            ("language", "en"),
            ("ruleBasedOption", "off"),
            ("dictTag", "off"),
            ("dictPath", "off"),
            ("clearFeatures", "no"),
        ]
    );
}

#[test]
fn annotates_fixture_document() {
    let mut doc: Document = NAF.parse().expect("fixture parses");
    let mut annotator = Annotate::new(&properties()).expect("annotator loads");
    assert_eq!(annotator.annotate_nes(&mut doc), 3);
    assert_eq!(doc.entities[0].id, "e1");
    assert_eq!(doc.entities[0].span, ["t1", "t2"]);
    assert_eq!(doc.entities[1].kind, "LOCATION");
    assert_eq!(doc.entities[2].span, ["t6"]);
}

#[test]
fn annotating_twice_appends_new_ids() {
    let mut doc: Document = NAF.parse().expect("fixture parses");
    let mut annotator = Annotate::new(&properties()).expect("annotator loads");
    annotator.annotate_nes(&mut doc);
    annotator.annotate_nes(&mut doc);
    assert_eq!(doc.entities.len(), 6);
    assert_eq!(doc.entities[5].id, "e6");
}

#[test]
fn missing_model_property_is_rejected() {
    let mut props = Properties::new();
    props.set_property("language", "en");
    let err = Annotate::new(&props).unwrap_err();
    assert!(matches!(err, NerError::MissingProperty("model")));
}

#[test]
fn invalid_flag_values_are_rejected() {
    for (key, value) in [
        ("dictTag", "always"),
        ("ruleBasedOption", "lexer"),
        ("clearFeatures", "maybe"),
    ] {
        let mut props = properties();
        props.set_property(key, value);
        match Annotate::new(&props) {
            Err(NerError::InvalidProperty { key: got, .. }) => assert_eq!(got, key),
            other => panic!("{key}={value} gave {other:?}"),
        }
    }
}

#[test]
fn dictionary_tagging_needs_a_path() {
    let mut props = properties();
    props.set_property("dictTag", "tag");
    let err = Annotate::new(&props).unwrap_err();
    assert!(matches!(err, NerError::InvalidProperty { key: "dictPath", .. }));

    props.set_property("dictPath", "/nonexistent/dictionaries");
    let err = Annotate::new(&props).unwrap_err();
    assert!(matches!(err, NerError::MissingDictionaries(_)));
}

#[test]
fn model_errors_are_typed() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json").expect("write");
    let empty = dir.path().join("empty.json");
    fs::write(&empty, r#"{"language": "en", "labels": []}"#).expect("write");

    let load = |path: &Path| Annotate::new(&ner_properties(path)).unwrap_err();
    assert!(matches!(load(&broken), NerError::ModelFormat { .. }));
    assert!(matches!(load(&empty), NerError::EmptyModel(_)));
    assert!(matches!(
        load(&dir.path().join("absent.json")),
        NerError::ModelIo { .. }
    ));
}

#[test]
fn language_mismatch_is_not_fatal() {
    let mut props = properties();
    props.set_property("language", "es");
    assert!(Annotate::new(&props).is_ok());
}

fn dictionary_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("places");
    fs::create_dir(&nested).expect("mkdir");
    fs::write(
        dir.path().join("people.txt"),
        "# people\nBarack Obama\tPERSON\n",
    )
    .expect("write");
    fs::write(
        nested.join("cities.tsv"),
        "New York\tLOCATION\nNew York City\tLOCATION\nvisited Paris\tEVENT\nbroken line\n",
    )
    .expect("write");
    dir
}

#[test]
fn dictionary_tagging_uses_longest_match() {
    let dir = dictionary_dir();
    let mut props = properties();
    props.set_property("dictTag", "tag");
    props.set_property("dictPath", dir.path().to_string_lossy());
    let mut annotator = Annotate::new(&props).expect("annotator loads");

    let names = annotator.find_names(&["I", "love", "New", "York", "City", "and", "Paris"]);
    assert_eq!(labels(&names), [(2, 5, "LOCATION")]);

    // Lookups are case-sensitive.
    assert!(annotator.find_names(&["barack", "obama"]).is_empty());
}

#[test]
fn dictionary_post_processing_wins_overlaps() {
    let dir = dictionary_dir();
    let mut props = properties();
    props.set_property("dictTag", "post");
    props.set_property("dictPath", dir.path().to_string_lossy());
    let mut annotator = Annotate::new(&props).expect("annotator loads");

    let names = annotator.find_names(&["Barack", "Obama", "visited", "Paris", "."]);
    assert_eq!(labels(&names), [(0, 2, "PERSON"), (2, 4, "EVENT")]);
}

#[test]
fn dictionary_post_processing_replaces_enclosing_statistical_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("orgs.txt"), "Obama\tORGANIZATION\n").expect("write");
    let mut props = properties();
    props.set_property("dictTag", "post");
    props.set_property("dictPath", dir.path().to_string_lossy());
    let mut annotator = Annotate::new(&props).expect("annotator loads");

    // The model alone tags `Barack Obama` as one PERSON.
    let names = annotator.find_names(&["Barack", "Obama", "spoke", "in", "Paris"]);
    assert_eq!(labels(&names), [(1, 2, "ORGANIZATION"), (4, 5, "LOCATION")]);
}

#[test]
fn numeric_rules_add_dates() {
    let mut props = properties();
    props.set_property("ruleBasedOption", "numeric");
    let mut annotator = Annotate::new(&props).expect("annotator loads");

    let names = annotator.find_names(&["Obama", "spoke", "on", "March", "3", ",", "2011", "."]);
    assert_eq!(labels(&names), [(0, 1, "PERSON"), (3, 7, "DATE")]);
}

#[test]
fn numeric_expressions() {
    let cases: &[(&[&str], (usize, usize, &str))] = &[
        (&["$", "5", "million"], (0, 3, "MONEY")),
        (&["€12.50"], (0, 1, "MONEY")),
        (&["20", "dollars"], (0, 2, "MONEY")),
        (&["45", "percent"], (0, 2, "PERCENT")),
        (&["12%"], (0, 1, "PERCENT")),
        (&["10:30", "pm"], (0, 2, "TIME")),
        (&["3", "March", "2011"], (0, 3, "DATE")),
        (&["2011-03-03"], (0, 1, "DATE")),
        (&["in", "1984"], (1, 2, "DATE")),
    ];
    for (tokens, expected) in cases {
        assert_eq!(labels(&numeric::find(tokens)), [*expected], "{tokens:?}");
    }
    assert!(numeric::find(&["you", "may", "go"]).is_empty());
    assert!(numeric::find(&["March", "on"]).is_empty());
}

fn adaptive_model(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("adaptive.json");
    fs::write(
        &path,
        r#"{
            "language": "en",
            "labels": ["PERSON"],
            "weights": {
                "bias": { "O": 0.5 },
                "pw=mr.": { "B-PERSON": 2.0 },
                "pd=B-PERSON": { "B-PERSON": 1.0 }
            }
        }"#,
    )
    .expect("write model");
    path
}

fn smith_document(with_docstart: bool) -> Document {
    let mut sentences = vec![vec!["Mr.", "Smith", "arrived"]];
    if with_docstart {
        sentences.push(vec!["-DOCSTART-"]);
    }
    sentences.push(vec!["Smith", "left"]);
    let mut xml = String::from("<NAF><text>");
    let mut id = 0;
    for (sent, words) in sentences.iter().enumerate() {
        for word in words {
            id += 1;
            xml.push_str(&format!(r#"<wf id="w{id}" sent="{}">{word}</wf>"#, sent + 1));
        }
    }
    xml.push_str("</text></NAF>");
    xml.parse().expect("document parses")
}

#[test]
fn clear_features_controls_adaptive_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let model = adaptive_model(dir.path());

    let count = |flag: &str, with_docstart: bool| {
        let mut props = ner_properties(&model);
        props.set_property("clearFeatures", flag);
        let mut annotator = Annotate::new(&props).expect("annotator loads");
        annotator.annotate_nes(&mut smith_document(with_docstart))
    };

    assert_eq!(count("no", false), 2);
    assert_eq!(count("yes", false), 1);
    assert_eq!(count("docstart", false), 2);
    assert_eq!(count("docstart", true), 1);
}
