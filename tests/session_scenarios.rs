use assert_matches::assert_matches;

use keytempo::paragraph::SourceUnavailable;
use keytempo::scoring::{evaluate, CharacterStatus, TargetText};
use keytempo::session::{LoadState, Metrics, SessionState, TestSession, Update};
use keytempo::timer::TimerConfig;

fn ready(text: &str, timer: TimerConfig) -> TestSession {
    let mut session = TestSession::new(timer);
    let ticket = session.restart();
    session.on_paragraph_loaded(ticket, Ok(TargetText::new(text)));
    session
}

#[test]
fn one_substitution_in_a_minute() {
    let input: Vec<char> = "abXde".chars().collect();
    let eval = evaluate(&TargetText::new("abcde"), &input, 60.0);

    use CharacterStatus::*;
    assert_eq!(
        eval.statuses,
        vec![Correct, Correct, Incorrect, Correct, Correct]
    );
    assert_eq!(eval.errors, 1);
    assert_eq!(eval.accuracy, 80);
    assert_eq!(eval.wpm, 1);
}

#[test]
fn same_scenario_through_the_session_clock() {
    let mut session = ready("abcde", TimerConfig::Secs120);
    session.set_input("abXde");
    for _ in 0..60 {
        session.on_tick();
    }

    let metrics = session.metrics();
    assert_eq!(metrics.errors, 1);
    assert_eq!(metrics.accuracy, 80);
    assert_eq!(metrics.wpm, 1);
    assert_eq!(metrics.time_secs, 60);
}

#[test]
fn thirty_second_countdown_runs_out() {
    let mut session = ready("the quick brown fox", TimerConfig::Secs30);
    session.set_input("the q");

    let updates: Vec<Update> = (0..30).map(|_| session.on_tick()).collect();

    let finishes = updates
        .iter()
        .filter(|u| matches!(u, Update::Finished(_)))
        .count();
    assert_eq!(finishes, 1);
    assert_matches!(updates.last(), Some(Update::Finished(m)) if m.time_secs == 0);

    let frozen = session.metrics();
    assert_eq!(session.state(), SessionState::Finished);
    assert!(!session.input_enabled());
    assert!(!session.timer_active());

    // nothing moves once finished
    assert_eq!(session.on_tick(), Update::Ignored);
    assert_eq!(session.type_char('u'), Update::Ignored);
    assert_eq!(session.metrics(), frozen);
}

#[test]
fn restart_resets_metrics_from_every_state() {
    for timer in TimerConfig::ALL {
        let mut idle = ready("abc", timer);
        idle.restart();
        assert_eq!(idle.metrics(), Metrics::initial(timer));
        assert_eq!(idle.state(), SessionState::Idle);

        let mut running = ready("abc", timer);
        running.set_input("ax");
        running.on_tick();
        running.restart();
        assert_eq!(running.metrics(), Metrics::initial(timer));
        assert_eq!(running.state(), SessionState::Idle);

        let mut finished = ready("abc", timer);
        finished.set_input("ax");
        finished.stop();
        finished.restart();
        assert_eq!(finished.metrics(), Metrics::initial(timer));
        assert_eq!(finished.state(), SessionState::Idle);
    }
}

#[test]
fn run_starts_exactly_once() {
    let mut session = ready("hello", TimerConfig::Secs60);

    session.type_char('h');
    assert_eq!(session.state(), SessionState::Running);
    session.on_tick();
    session.on_tick();

    // further keystrokes do not restart the clock
    session.type_char('e');
    assert_eq!(session.elapsed_secs(), 2);

    assert!(!session.select_timer(TimerConfig::Secs15));
    assert_eq!(session.timer_config(), TimerConfig::Secs60);
}

#[test]
fn failed_source_leaves_idle_and_disabled() {
    let mut session = TestSession::new(TimerConfig::Secs30);
    let ticket = session.restart();

    session.on_paragraph_loaded(ticket, Err(SourceUnavailable::Malformed("missing field".into())));

    assert_eq!(session.state(), SessionState::Idle);
    assert_matches!(session.load_state(), LoadState::Failed(_));
    assert!(!session.input_enabled());
    assert!(!session.timer_active());
    assert_eq!(session.on_tick(), Update::Ignored);
}
