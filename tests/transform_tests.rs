use quizgen::error::TransformError;
use quizgen::transform::transform_mapping;
use quizgen::{transform, FieldMapping, Question, TransformInput};

fn fields(n: char, text: &str, answer: &str) -> Vec<(String, String)> {
    vec![
        (format!("question{n}"), text.to_string()),
        (format!("A_{n}"), "a".to_string()),
        (format!("B_{n}"), "b".to_string()),
        (format!("C_{n}"), "c".to_string()),
        (format!("D_{n}"), "d".to_string()),
        (format!("reponse{n}"), answer.to_string()),
    ]
}

#[test]
fn canonical_input_passes_through_unchanged() {
    let batch = vec![
        Question::new(" untrimmed ", ["a", "b", "c", "d"], "A"),
        Question::new("Q2", ["e", "f", "g", "h"], "Z"),
    ];
    let out = transform(TransformInput::Canonical(batch.clone())).unwrap();
    assert_eq!(out, batch);

    // Transforming an already-transformed batch is the identity
    let again = transform(out.clone()).unwrap();
    assert_eq!(again, out);
}

#[test]
fn questions_are_ordered_by_index_not_insertion() {
    let mapping: FieldMapping = fields('3', "third", "C")
        .into_iter()
        .chain(fields('1', "first", "A"))
        .chain(fields('2', "second", "B"))
        .collect();

    let questions = transform(mapping).unwrap();
    let texts: Vec<&str> = questions.iter().map(|q| q.question.as_str()).collect();
    assert_eq!(texts, ["first", "second", "third"]);
}

#[test]
fn mappings_keep_their_order() {
    let first: FieldMapping = fields('1', "m1", "A").into_iter().collect();
    let second: FieldMapping = fields('1', "m2", "B").into_iter().collect();
    let questions = transform(vec![first, second]).unwrap();
    assert_eq!(questions[0].question, "m1");
    assert_eq!(questions[1].question, "m2");
}

#[test]
fn explanation_is_carried_when_present() {
    let mut mapping: FieldMapping = fields('1', "Q1", "A")
        .into_iter()
        .chain(fields('2', "Q2", "B"))
        .collect();
    mapping.insert("explanation2", " porque ");

    let questions = transform(mapping).unwrap();
    assert_eq!(questions[0].explanation, None);
    assert_eq!(questions[1].explanation.as_deref(), Some("porque"));
}

#[test]
fn missing_option_fails_whole_mapping() {
    let mapping: FieldMapping = fields('1', "Q1", "A")
        .into_iter()
        .chain(fields('2', "Q2", "B"))
        .filter(|(key, _)| key != "C_2")
        .collect();

    assert_eq!(
        transform_mapping(&mapping),
        Err(TransformError::MissingField { field: "C_2".into(), index: '2' })
    );
}

#[test]
fn unrelated_keys_are_ignored() {
    let mut mapping: FieldMapping = fields('1', "Q1", "A").into_iter().collect();
    mapping.insert("notes", "ignored");
    mapping.insert("question", "no index");
    assert_eq!(transform(mapping).unwrap().len(), 1);
}

#[test]
fn empty_values_survive_for_the_validator() {
    let mapping: FieldMapping = fields('1', "Q1", "   ").into_iter().collect();
    let questions = transform(mapping).unwrap();
    assert_eq!(questions[0].reponse, "");
}
