use std::sync::Arc;

use quiz_core::model::{
    ContinuePolicy, Level, LevelNumber, Player, PlayerError, Question, QuizConfig, ResumeState,
};
use quiz_core::{Feedback, LevelOutcome, Performance, SessionPhase};
use services::{
    ControllerError, ControllerState, Intent, QuestionView, QuizController, Renderer, ResultView,
    StaticLevelSource, SummaryView,
};
use storage::{InMemoryStore, KeyValueStore, ProgressStore, keys};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    NamePrompt { rejected: bool },
    WelcomeBack(String),
    Loading(u32),
    Summary(u32),
    Question { level: u32, index: usize, selected: Option<usize> },
    Result(ResultView),
    LoadError(u32),
    Volunteer,
    Saved(u32),
}

#[derive(Debug, Default)]
struct RecordingRenderer {
    events: Vec<Event>,
}

impl RecordingRenderer {
    fn last_result(&self) -> Option<&ResultView> {
        self.events.iter().rev().find_map(|event| match event {
            Event::Result(view) => Some(view),
            _ => None,
        })
    }

    fn count(&self, wanted: fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|event| wanted(event)).count()
    }
}

impl Renderer for RecordingRenderer {
    fn name_prompt(&mut self, rejected: Option<&PlayerError>) {
        self.events.push(Event::NamePrompt {
            rejected: rejected.is_some(),
        });
    }

    fn welcome_back(&mut self, player: &Player) {
        self.events.push(Event::WelcomeBack(player.name().to_owned()));
    }

    fn loading(&mut self, level: LevelNumber) {
        self.events.push(Event::Loading(level.value()));
    }

    fn summary(&mut self, view: &SummaryView<'_>) {
        self.events.push(Event::Summary(view.level.value()));
    }

    fn question(&mut self, view: &QuestionView<'_>) {
        self.events.push(Event::Question {
            level: view.level.value(),
            index: view.index,
            selected: view.selected,
        });
    }

    fn result(&mut self, view: &ResultView) {
        self.events.push(Event::Result(view.clone()));
    }

    fn load_error(&mut self, level: LevelNumber) {
        self.events.push(Event::LoadError(level.value()));
    }

    fn volunteer_prompt(&mut self) {
        self.events.push(Event::Volunteer);
    }

    fn progress_saved(&mut self, level: LevelNumber) {
        self.events.push(Event::Saved(level.value()));
    }
}

fn n(value: u32) -> LevelNumber {
    LevelNumber::new(value).unwrap()
}

/// A level of `questions` three-option questions whose answer is always option 0.
fn level(number: u32, questions: usize) -> Level {
    let questions = (0..questions)
        .map(|i| {
            Question::new(
                format!("L{number} Q{i}"),
                vec!["right".into(), "wrong".into(), "also wrong".into()],
                0,
            )
            .unwrap()
        })
        .collect();
    Level::new(
        n(number),
        format!("Level {number}"),
        Some(format!("What level {number} covers")),
        questions,
    )
    .unwrap()
}

struct Harness {
    kv: InMemoryStore,
    progress: ProgressStore,
    source: StaticLevelSource,
}

impl Harness {
    fn new(levels: &[(u32, usize)]) -> Self {
        let kv = InMemoryStore::new();
        let progress = ProgressStore::new(Arc::new(kv.clone()));
        let source = StaticLevelSource::new();
        for &(number, questions) in levels {
            source.insert(level(number, questions));
        }
        Self {
            kv,
            progress,
            source,
        }
    }

    fn controller(&self, config: QuizConfig) -> QuizController<RecordingRenderer> {
        QuizController::new(
            config,
            self.progress.clone(),
            Arc::new(self.source.clone()),
            RecordingRenderer::default(),
        )
    }

    async fn returning_player(&self, name: &str) {
        self.progress
            .save_player(&Player::new(name).unwrap())
            .await
            .unwrap();
    }
}

/// Boot a brand-new player and get past the level summary.
async fn start_new_player(ctl: &mut QuizController<RecordingRenderer>) {
    ctl.boot().await.unwrap();
    ctl.submit_name("Thandi").await.unwrap();
    ctl.begin_level().unwrap();
}

/// Answer every remaining question, getting the first `correct` of them right.
async fn answer_rest(ctl: &mut QuizController<RecordingRenderer>, correct: usize) {
    let mut answered = 0;
    while let Some(session) = ctl.session().filter(|s| !s.is_finished()) {
        let index = session.current_index();
        let option = usize::from(answered >= correct);
        ctl.select_answer(index, option).await.unwrap();
        ctl.next().await.unwrap();
        answered += 1;
    }
}

fn assert_unavailable(result: Result<(), ControllerError>, expected: Intent) {
    match result {
        Err(ControllerError::Unavailable { intent, .. }) => assert_eq!(intent, expected),
        other => panic!("expected {expected} to be unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn new_player_is_prompted_and_short_names_are_rejected() {
    let h = Harness::new(&[(1, 3)]);
    let mut ctl = h.controller(QuizConfig::default());

    ctl.boot().await.unwrap();
    assert!(matches!(ctl.state(), ControllerState::NamePrompt));

    let err = ctl.submit_name(" a ").await.unwrap_err();
    assert!(matches!(err, ControllerError::InvalidName(_)));
    assert!(matches!(ctl.state(), ControllerState::NamePrompt));
    assert_eq!(h.kv.get(keys::PLAYER_NAME).await.unwrap(), None);

    ctl.submit_name("  Thandi ").await.unwrap();
    assert_eq!(ctl.player().map(Player::name), Some("Thandi"));
    assert_eq!(
        h.kv.get(keys::PLAYER_NAME).await.unwrap().as_deref(),
        Some("Thandi")
    );

    assert_eq!(
        ctl.renderer().events,
        vec![
            Event::NamePrompt { rejected: false },
            Event::NamePrompt { rejected: true },
            Event::Loading(1),
            Event::Summary(1),
        ]
    );

    ctl.begin_level().unwrap();
    assert_eq!(
        ctl.renderer().events.last(),
        Some(&Event::Question {
            level: 1,
            index: 0,
            selected: None
        })
    );
}

#[tokio::test]
async fn answers_are_persisted_as_they_are_picked() {
    let h = Harness::new(&[(1, 3)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;

    let err = ctl.next().await.unwrap_err();
    assert!(matches!(err, ControllerError::Session(_)));

    ctl.select_answer(0, 2).await.unwrap();
    ctl.select_answer(0, 0).await.unwrap();
    let saved = h.progress.resume_state(n(1)).await.unwrap().unwrap();
    assert_eq!(saved.selections, vec![Some(0), None, None]);
    assert_eq!(saved.question_index, 0);

    ctl.next().await.unwrap();
    let saved = h.progress.resume_state(n(1)).await.unwrap().unwrap();
    assert_eq!(saved.question_index, 1);
    assert_eq!(saved.score, 1);

    let err = ctl.select_answer(0, 1).await.unwrap_err();
    assert!(matches!(err, ControllerError::Session(_)));
}

#[tokio::test]
async fn seventy_percent_passes_and_unlocks_the_next_level() {
    let h = Harness::new(&[(1, 10), (2, 4)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 7).await;

    let view = ctl.renderer().last_result().unwrap().clone();
    assert_eq!(view.player_name.as_deref(), Some("Thandi"));
    assert_eq!(view.result.score, 7);
    assert_eq!(view.result.total, 10);
    assert!((view.result.percent - 70.0).abs() < f64::EPSILON);
    assert_eq!(view.result.outcome, LevelOutcome::Passed);
    assert_eq!(view.result.feedback, Feedback::Passed);
    assert!(view.next_level_available);
    assert!(!view.campaign_complete);
    assert_eq!(view.progress.levels_completed, 1);
    assert_eq!(view.performance, Some(Performance::Solid));
    assert_eq!(ctl.renderer().count(|e| *e == Event::Volunteer), 0);

    assert_eq!(h.progress.resume_state(n(1)).await.unwrap(), None);
    assert_eq!(h.progress.score_history().await.unwrap().get(n(1)), Some(70.0));

    ctl.next_level().await.unwrap();
    assert_eq!(h.progress.current_level().await.unwrap(), n(2));
    let session = ctl.session().unwrap();
    assert_eq!(session.level_number(), n(2));
    assert_eq!(*session.phase(), SessionPhase::Summary);
}

#[tokio::test]
async fn sixty_percent_fails_and_only_allows_a_restart() {
    let h = Harness::new(&[(1, 10), (2, 4)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 6).await;

    let view = ctl.renderer().last_result().unwrap();
    assert_eq!(view.result.outcome, LevelOutcome::Failed);
    assert_eq!(view.result.feedback, Feedback::KeepPracticing);
    assert!(!view.next_level_available);

    assert_unavailable(ctl.next_level().await, Intent::NextLevel);
    assert_eq!(h.progress.current_level().await.unwrap(), n(1));

    ctl.restart_level().await.unwrap();
    let session = ctl.session().unwrap();
    assert_eq!(session.level_number(), n(1));
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.score(), 0);
    assert!(session.level().questions().iter().all(|q| !q.is_answered()));
}

#[tokio::test]
async fn eighty_percent_invites_volunteering() {
    let h = Harness::new(&[(1, 5)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 4).await;

    let view = ctl.renderer().last_result().unwrap();
    assert!(view.result.volunteer_eligible);
    assert_eq!(view.result.feedback, Feedback::Passed);
    assert_eq!(ctl.renderer().events.last(), Some(&Event::Volunteer));
}

#[tokio::test]
async fn scores_stay_within_bounds() {
    let h = Harness::new(&[(1, 4)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 0).await;

    let result = &ctl.renderer().last_result().unwrap().result;
    assert_eq!(result.score, 0);
    assert!(result.score <= result.total);
    assert!(result.percent.abs() < f64::EPSILON);
}

#[tokio::test]
async fn finishing_a_level_again_overwrites_its_score() {
    let h = Harness::new(&[(1, 5)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 2).await;

    ctl.restart_level().await.unwrap();
    ctl.begin_level().unwrap();
    answer_rest(&mut ctl, 5).await;

    let history = h.progress.score_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history.get(n(1)), Some(100.0));
    let view = ctl.renderer().last_result().unwrap();
    assert_eq!(view.progress.levels_completed, 1);
    assert_eq!(view.result.feedback, Feedback::Mastered);
}

#[tokio::test]
async fn save_and_exit_then_continue_resumes_without_the_summary() {
    let h = Harness::new(&[(1, 4)]);
    {
        let mut ctl = h.controller(QuizConfig::default());
        start_new_player(&mut ctl).await;
        ctl.select_answer(0, 0).await.unwrap();
        ctl.next().await.unwrap();
        ctl.select_answer(1, 2).await.unwrap();

        ctl.save_and_exit().await.unwrap();
        assert!(matches!(ctl.state(), ControllerState::Saved));
        assert_eq!(ctl.renderer().events.last(), Some(&Event::Saved(1)));

        assert_unavailable(ctl.next().await, Intent::Next);
        assert_unavailable(ctl.select_answer(1, 0).await, Intent::SelectAnswer);
        assert_unavailable(ctl.restart_level().await, Intent::RestartLevel);
    }

    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();
    assert_eq!(
        ctl.renderer().events,
        vec![Event::WelcomeBack("Thandi".into())]
    );

    ctl.continue_session().await.unwrap();
    let session = ctl.session().unwrap();
    assert_eq!(*session.phase(), SessionPhase::Answering);
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.score(), 1);
    assert_eq!(session.level().selections(), vec![Some(0), Some(2), None, None]);
    assert_eq!(ctl.renderer().count(|e| matches!(e, Event::Summary(_))), 0);
    assert_eq!(
        ctl.renderer().events.last(),
        Some(&Event::Question {
            level: 1,
            index: 1,
            selected: Some(2)
        })
    );

    ctl.next().await.unwrap();
    answer_rest(&mut ctl, 2).await;
    assert_eq!(ctl.renderer().last_result().unwrap().result.score, 3);
}

#[tokio::test]
async fn continue_without_saved_answers_skips_the_summary() {
    let h = Harness::new(&[(2, 3)]);
    h.returning_player("Kagiso").await;
    h.progress.set_current_level(n(2)).await.unwrap();

    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();
    ctl.continue_session().await.unwrap();

    let session = ctl.session().unwrap();
    assert_eq!(session.level_number(), n(2));
    assert_eq!(*session.phase(), SessionPhase::Answering);
    assert_eq!(session.current_index(), 0);
}

#[tokio::test]
async fn inconsistent_saved_position_starts_the_level_fresh() {
    let h = Harness::new(&[(1, 3)]);
    h.returning_player("Kagiso").await;
    h.progress
        .save_resume(&ResumeState {
            level: n(1),
            question_index: 1,
            score: 3,
            selections: vec![Some(0), None, None],
        })
        .await
        .unwrap();

    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();
    ctl.continue_session().await.unwrap();

    let session = ctl.session().unwrap();
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.score(), 0);
    assert!(session.level().questions().iter().all(|q| !q.is_answered()));
}

#[tokio::test]
async fn restart_level_policy_ignores_saved_answers_on_continue() {
    let h = Harness::new(&[(1, 3)]);
    h.returning_player("Kagiso").await;
    h.progress
        .save_resume(&ResumeState {
            level: n(1),
            question_index: 1,
            score: 1,
            selections: vec![Some(0), None, None],
        })
        .await
        .unwrap();

    let config = QuizConfig::default().with_continue_policy(ContinuePolicy::RestartLevel);
    let mut ctl = h.controller(config);
    ctl.boot().await.unwrap();
    ctl.continue_session().await.unwrap();

    let session = ctl.session().unwrap();
    assert_eq!(*session.phase(), SessionPhase::Summary);
    assert_eq!(session.current_index(), 0);
    assert_eq!(h.progress.resume_state(n(1)).await.unwrap(), None);
}

#[tokio::test]
async fn restart_from_beginning_clears_everything_but_the_player() {
    let h = Harness::new(&[(1, 3), (4, 3)]);
    h.returning_player("Kagiso").await;
    h.progress.set_current_level(n(4)).await.unwrap();
    h.progress.record_score(n(1), 100.0).await.unwrap();
    h.kv.set(&keys::selections(n(4)), "[0,null,null]").await.unwrap();
    h.kv.set("legacy_flag", "1").await.unwrap();

    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();
    ctl.restart_from_beginning().await.unwrap();

    assert_eq!(h.kv.get(&keys::selections(n(4))).await.unwrap(), None);
    assert_eq!(h.kv.get("legacy_flag").await.unwrap(), None);

    assert_eq!(ctl.session().unwrap().level_number(), n(1));
    assert_eq!(h.progress.current_level().await.unwrap(), n(1));
    assert!(h.progress.score_history().await.unwrap().is_empty());
    assert_eq!(
        h.progress.player().await.unwrap().map(|p| p.name().to_owned()),
        Some("Kagiso".to_owned())
    );
}

#[tokio::test]
async fn load_failure_keeps_progress_and_can_be_retried() {
    let h = Harness::new(&[(1, 3), (2, 3)]);
    h.returning_player("Kagiso").await;
    h.progress.record_score(n(1), 80.0).await.unwrap();
    h.progress.record_score(n(2), 90.0).await.unwrap();
    h.progress.set_current_level(n(3)).await.unwrap();

    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();
    ctl.continue_session().await.unwrap();

    assert!(matches!(
        ctl.state(),
        ControllerState::LoadError { level, resume: true } if *level == n(3)
    ));
    assert_eq!(ctl.renderer().events.last(), Some(&Event::LoadError(3)));
    assert_eq!(h.progress.current_level().await.unwrap(), n(3));
    let history = h.progress.score_history().await.unwrap();
    assert_eq!(history.get(n(1)), Some(80.0));
    assert_eq!(history.get(n(2)), Some(90.0));

    assert_unavailable(ctl.next().await, Intent::Next);
    assert_unavailable(ctl.next_level().await, Intent::NextLevel);

    ctl.retry().await.unwrap();
    assert_eq!(ctl.renderer().count(|e| *e == Event::LoadError(3)), 2);

    h.source.insert(level(3, 2));
    ctl.retry().await.unwrap();
    assert_eq!(ctl.session().unwrap().level_number(), n(3));
}

#[tokio::test]
async fn stale_level_responses_are_discarded() {
    let h = Harness::new(&[]);
    h.returning_player("Kagiso").await;
    let mut ctl = h.controller(QuizConfig::default());
    ctl.boot().await.unwrap();

    let first = ctl.request_level(n(1), false).await.unwrap();
    let second = ctl.request_level(n(2), false).await.unwrap();
    assert_ne!(first, second);

    assert_unavailable(ctl.select_answer(0, 0).await, Intent::SelectAnswer);
    assert_unavailable(ctl.begin_level(), Intent::Begin);
    assert_unavailable(ctl.save_and_exit().await, Intent::SaveAndExit);
    assert_unavailable(ctl.reset_all(true).await, Intent::ResetAll);

    ctl.complete_load(first, Ok(level(1, 3))).await.unwrap();
    assert!(matches!(ctl.state(), ControllerState::Loading(t) if *t == second));

    ctl.complete_load(second, Ok(level(2, 3))).await.unwrap();
    assert_eq!(ctl.session().unwrap().level_number(), n(2));

    ctl.complete_load(second, Ok(level(2, 5))).await.unwrap();
    assert_eq!(ctl.session().unwrap().total(), 3);
}

#[tokio::test]
async fn reset_all_needs_confirmation_and_forgets_the_player() {
    let h = Harness::new(&[(1, 3)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    ctl.select_answer(0, 0).await.unwrap();
    h.progress.record_score(n(1), 50.0).await.unwrap();

    let err = ctl.reset_all(false).await.unwrap_err();
    assert!(matches!(err, ControllerError::ResetNotConfirmed));
    assert!(!h.kv.keys().await.unwrap().is_empty());

    ctl.reset_all(true).await.unwrap();
    assert!(h.kv.keys().await.unwrap().is_empty());
    assert!(ctl.player().is_none());
    assert!(matches!(ctl.state(), ControllerState::NamePrompt));
    assert_eq!(
        ctl.renderer().events.last(),
        Some(&Event::NamePrompt { rejected: false })
    );

    ctl.submit_name("Naledi").await.unwrap();
    assert_eq!(ctl.session().unwrap().level_number(), n(1));
}

#[tokio::test]
async fn finishing_the_final_level_completes_the_campaign() {
    let h = Harness::new(&[(1, 2), (2, 2)]);
    h.returning_player("Kagiso").await;
    h.progress.record_score(n(1), 100.0).await.unwrap();
    h.progress.set_current_level(n(2)).await.unwrap();

    let config = QuizConfig::default().with_total_levels(2).unwrap();
    let mut ctl = h.controller(config);
    ctl.boot().await.unwrap();
    ctl.continue_session().await.unwrap();
    answer_rest(&mut ctl, 2).await;

    let view = ctl.renderer().last_result().unwrap();
    assert!(view.campaign_complete);
    assert!(!view.next_level_available);
    assert_eq!(view.progress.levels_completed, 2);
    assert_eq!(view.performance, Some(Performance::Excellent));
    assert_unavailable(ctl.next_level().await, Intent::NextLevel);

    ctl.start_over().await.unwrap();
    assert_eq!(ctl.session().unwrap().level_number(), n(1));
    assert!(h.progress.score_history().await.unwrap().is_empty());
    assert!(h.progress.player().await.unwrap().is_some());
}

#[tokio::test]
async fn start_over_is_refused_before_the_final_level() {
    let h = Harness::new(&[(1, 2)]);
    let mut ctl = h.controller(QuizConfig::default());
    start_new_player(&mut ctl).await;
    answer_rest(&mut ctl, 2).await;

    assert_unavailable(ctl.start_over().await, Intent::StartOver);
}
