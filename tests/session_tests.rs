use quizgen::error::SessionError;
use quizgen::session::{
    Difficulty, GameLibrary, GameSession, GameState, UserProgress, POINTS_PER_CORRECT_ANSWER,
};
use quizgen::{AnswerLetter, Question};

fn library_with_quiz() -> GameLibrary {
    let mut library = GameLibrary::new();
    library.add(
        "Geografía",
        "Europa",
        vec![
            Question::new("¿Capital de Francia?", ["París", "Roma", "Madrid", "Berlín"], "A")
                .with_explanation("París es la capital de Francia."),
            Question::new("¿Capital de Italia?", ["París", "Roma", "Madrid", "Berlín"], "B"),
            Question::new("¿Capital de España?", ["París", "Roma", "Madrid", "Berlín"], "C"),
        ],
    );
    library
}

#[test]
fn library_assigns_sequential_ids() {
    let mut library = library_with_quiz();
    let second = library.add("Otro", "Varios", Vec::new());
    assert_eq!(second.id, 2);
    assert_eq!(second.difficulty, Difficulty::Easy);
    assert_eq!(library.len(), 2);
    assert_eq!(library.get(1).map(|g| g.title.as_str()), Some("Geografía"));
    assert!(library.get(3).is_none());
}

#[test]
fn full_game_flow() {
    let mut library = library_with_quiz();
    let game = library.get(1).unwrap();
    let mut session = GameSession::start(game).unwrap();

    assert_eq!(session.state(), GameState::Playing);
    assert_eq!(session.total_questions(), 3);

    let first = session.answer(AnswerLetter::A).unwrap();
    assert!(first.is_correct);
    assert_eq!(first.points_awarded, POINTS_PER_CORRECT_ANSWER);
    assert_eq!(first.explanation.as_deref(), Some("París es la capital de Francia."));
    assert!(session.advance());

    let second = session.answer(AnswerLetter::D).unwrap();
    assert!(!second.is_correct);
    assert_eq!(second.correct, Some(AnswerLetter::B));
    assert_eq!(second.points_awarded, 0);
    assert!(session.advance());

    session.answer(AnswerLetter::C).unwrap();
    assert!(!session.advance());
    assert_eq!(session.state(), GameState::Results);
    assert!(session.current_question().is_none());
    assert_eq!(session.answer(AnswerLetter::A), Err(SessionError::GameOver));

    let summary = session.finish();
    assert_eq!(summary.game_id, 1);
    assert_eq!(summary.correct, 2);
    assert_eq!(summary.answered, 3);
    assert_eq!(summary.score, 2 * POINTS_PER_CORRECT_ANSWER);
    assert!((summary.accuracy - 200.0 / 3.0).abs() < 1e-9);

    let game = library.get_mut(1).unwrap();
    assert!(game.record_result(&summary));
    assert!(!game.record_result(&summary));
    assert_eq!(game.times_played, 2);
    assert_eq!(game.best_score, summary.score);
}

#[test]
fn skipped_questions_are_not_counted_as_answered() {
    let library = library_with_quiz();
    let mut session = GameSession::start(library.get(1).unwrap()).unwrap();
    session.advance();
    session.answer(AnswerLetter::B).unwrap();

    let summary = session.finish();
    assert_eq!(summary.answered, 1);
    assert_eq!(summary.total_questions, 3);
    assert_eq!(summary.accuracy, 100.0);
}

#[test]
fn progress_levels_up_across_games() {
    let library = library_with_quiz();
    let mut progress = UserProgress::default();
    assert_eq!(progress.level, 1);

    let mut level_ups = 0;
    for _ in 0..4 {
        let mut session = GameSession::start(library.get(1).unwrap()).unwrap();
        for letter in [AnswerLetter::A, AnswerLetter::B, AnswerLetter::C] {
            session.answer(letter).unwrap();
            session.advance();
        }
        if progress.record_game(&session.finish()) {
            level_ups += 1;
        }
    }

    assert_eq!(progress.points, 120);
    assert_eq!(progress.level, 2);
    assert_eq!(level_ups, 1);
    assert_eq!(progress.total_games, 4);
    assert_eq!(progress.accuracy(), 100.0);
    assert_eq!(progress.points_to_next_level(), 80);
}

#[tokio::test]
async fn progress_round_trips_through_disk() {
    let path = std::env::temp_dir()
        .join(format!("quizgen-progress-{}", std::process::id()))
        .join("progress.json");

    let fresh = UserProgress::load(&path).await.unwrap();
    assert_eq!(fresh, UserProgress::default());

    let progress = UserProgress {
        level: 3,
        points: 250,
        total_games: 9,
        correct_answers: 25,
        total_questions: 30,
        achievements: vec!["primer_quiz".into()],
    };
    progress.save(&path).await.unwrap();
    assert_eq!(UserProgress::load(&path).await.unwrap(), progress);

    if let Some(dir) = path.parent() {
        tokio::fs::remove_dir_all(dir).await.unwrap();
    }
}
