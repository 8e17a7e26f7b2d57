mod common;

use billsum::app::{App, LOGIN_FAILED_MESSAGE};
use billsum::summarize::SummarizeError;
use billsum::{Error, NOT_YET_SUMMARIZED};
use common::{credentials, ReadOnlyRepository, ScriptedFrontend, StubSummarizer, TestEnv};

#[test]
fn summarize_unsummarized_bill_and_persist() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("A one-sentence summary.");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1001")
        .confirm(true);

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    assert_eq!(stub.calls.get(), 1);
    assert_eq!(env.stored_summary("HB 1001"), "A one-sentence summary.");
    assert_eq!(env.stored_summary("HB 1002"), "Already summarized text");

    insta::assert_snapshot!(app.frontend().transcript(), @r###"
    login form
    title: Bill Summaries
    select: Select a House bill from 2023-24 -> HB 1001
    header: HB 1001
    confirm: Summarize this bill -> yes
    progress: Summarizing...
    notice: Saved data
    summary: A one-sentence summary.
    select: Select a House bill from 2023-24 -> (cancel)
    "###);
}

#[test]
fn existing_summary_shown_without_calling_api() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("should not be used");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1002");

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    assert_eq!(stub.calls.get(), 0);
    let frontend = app.into_frontend();
    assert!(frontend
        .events
        .contains(&"summary: Already summarized text".to_string()));
    assert!(!frontend.saw("confirm:"));
}

#[test]
fn summarized_bill_is_shown_as_stored_on_next_selection() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("Funds schools.");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1001")
        .confirm(true)
        .select("HB 1001");

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    assert_eq!(stub.calls.get(), 1);
    let frontend = app.into_frontend();
    let shown = frontend
        .events
        .iter()
        .filter(|e| *e == "summary: Funds schools.")
        .count();
    assert_eq!(shown, 2);
}

#[test]
fn remote_error_leaves_bill_unsummarized() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::failing(SummarizeError::RateLimited(
        "You exceeded your current quota".to_string(),
    ));
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1001")
        .confirm(true)
        .select("HB 1001")
        .confirm(true);

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    // The user may retry after a failure
    assert_eq!(stub.calls.get(), 2);
    assert_eq!(env.stored_summary("HB 1001"), NOT_YET_SUMMARIZED);

    let frontend = app.into_frontend();
    assert!(frontend.saw("error: Summarization failed: rate limit or quota exceeded"));
    assert!(!frontend.saw("notice: Saved data"));
}

#[test]
fn declining_the_trigger_does_not_call_api() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1001")
        .confirm(false);

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    assert_eq!(stub.calls.get(), 0);
    assert_eq!(env.stored_summary("HB 1001"), NOT_YET_SUMMARIZED);
}

#[test]
fn write_failure_still_shows_summary_once() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("Transient summary.");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "wonderland")
        .select("HB 1001")
        .confirm(true)
        .select("HB 1001");

    let mut app = App::new(&store, frontend);
    app.browse(ReadOnlyRepository(env.repo()), &stub).unwrap();

    assert_eq!(env.stored_summary("HB 1001"), NOT_YET_SUMMARIZED);

    let frontend = app.into_frontend();
    assert!(frontend.saw("error: Summary could not be saved"));
    assert!(frontend
        .events
        .contains(&"summary: Transient summary.".to_string()));
    // Second selection finds the bill unsummarized again
    let confirms = frontend.events.iter().filter(|e| e.starts_with("confirm:")).count();
    assert_eq!(confirms, 2);
}

#[test]
fn gate_blocks_dataset_and_api_until_login() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "Wonderland")
        .login_as("mallory", "wonderland");

    // Pointing at a missing file proves the dataset is never opened
    let missing = billsum::CsvRepository::new(env.data.with_file_name("absent.csv"));
    let mut app = App::new(&store, frontend);
    app.browse(missing, &stub).unwrap();

    assert_eq!(stub.calls.get(), 0);
    let frontend = app.into_frontend();
    assert!(!frontend.saw("title:"));
    assert!(!frontend.saw("select:"));

    insta::assert_snapshot!(frontend.transcript(), @r###"
    login form
    error: 😕 User not known or password incorrect
    login form
    error: 😕 User not known or password incorrect
    login form
    "###);
}

#[test]
fn login_succeeds_after_failed_attempt() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new()
        .login_as("alice", "nope")
        .login_as("alice", "wonderland");

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();

    let frontend = app.into_frontend();
    let errors = frontend
        .events
        .iter()
        .filter(|e| **e == format!("error: {}", LOGIN_FAILED_MESSAGE))
        .count();
    assert_eq!(errors, 1);
    assert!(frontend.saw("title: Bill Summaries"));
}

#[test]
fn missing_dataset_after_login_is_fatal() {
    let env = TestEnv::new();
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new().login_as("alice", "wonderland");

    let missing = billsum::CsvRepository::new(env.data.with_file_name("absent.csv"));
    let mut app = App::new(&store, frontend);
    let err = app.browse(missing, &stub).unwrap_err();
    assert!(matches!(err, Error::Dataset(_)));
}

#[test]
fn malformed_dataset_after_login_is_fatal() {
    let env = TestEnv::with_dataset("Bill ID,Text\nHB 1,x\n");
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new().login_as("alice", "wonderland");

    let mut app = App::new(&store, frontend);
    assert!(app.browse(env.repo(), &stub).is_err());
}

#[test]
fn empty_dataset_ends_session() {
    let env = TestEnv::with_dataset("Bill ID,Bill Text,Summary\n");
    let store = credentials();
    let stub = StubSummarizer::ok("unused");
    let frontend = ScriptedFrontend::new().login_as("alice", "wonderland");

    let mut app = App::new(&store, frontend);
    app.browse(env.repo(), &stub).unwrap();
    assert!(app.frontend().saw("notice: The dataset has no bills"));
}
