//! Integration tests for placeholder substitution and failure policies

use std::sync::{Arc, Mutex};

use gst_template::parser::{parse, PlaceholderData};
use gst_template::terminator::{
    Declaration, HandlerError, OptionalPolicy, Terminator, TerminatorConfig, TerminatorError,
};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;

fn needs_argument(data: &PlaceholderData) -> Result<String, HandlerError> {
    let argument = data.argument().ok_or("placeholder has no argument")?;
    Ok(argument.to_string())
}

/// Warning terminator recording the kind of every reported anomaly
fn recording_warning() -> (Terminator, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let config = TerminatorConfig::warning_with(Arc::new(move |err: &TerminatorError| {
        sink_seen
            .lock()
            .expect("sink lock")
            .push(err.kind().to_string());
    }));
    (Terminator::new(config), seen)
}

fn reported(seen: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    seen.lock().expect("sink lock").clone()
}

#[test]
fn test_simple() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("first declaration");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_snapshot!(output, @"foobuzzbaz");
}

#[test]
fn test_argument() {
    let mut terminator = Terminator::strict();
    terminator.declare_fn("bar", needs_argument).expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar:buzz}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzzbaz");
}

#[test]
fn test_original_part() {
    let mut terminator = Terminator::strict();
    terminator
        .declare_fn("bar", |data: &PlaceholderData| -> Result<String, HandlerError> {
            Ok(format!("{}{}", data.original.index, data.original.content))
        })
        .expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_snapshot!(output, @r"foo3\{bar}baz");
}

#[test]
fn test_declare_a_lot() {
    let mut terminator = Terminator::strict();
    for (key, value) in [("bar", "buzz"), ("bar2", "buzz2"), ("bar3", "buzz3"), ("bar4", "buzz4")] {
        terminator.declare(key, value).expect("distinct keys");
    }
    let output = terminator
        .terminate(&parse("foo\\{bar}baz\\{bar2}\\{bar3}\\{bar4}").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzzbazbuzz2buzz3buzz4");
}

#[test]
fn test_use_multiple_times() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz\\{bar}\\{bar}\\{bar}").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzzbazbuzzbuzzbuzz");
}

#[test]
fn test_unhandled_placeholder_strict() {
    let terminator = Terminator::strict();
    let err = terminator
        .terminate(&parse("foo\\{bar}baz\\{bar2}").expect("Should parse"))
        .expect_err("Should fail");
    assert!(matches!(
        err,
        TerminatorError::UnhandledPlaceholder { ref key, index: 3, ref original }
            if key == "bar" && original == "\\{bar}"
    ));
}

#[test]
fn test_unhandled_placeholder_lenient() {
    let template = "foo\\{bar}baz\\{bar2}\\{bar3}\\{bar4}";
    let output = Terminator::lenient()
        .terminate(&parse(template).expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, template);
}

#[test]
fn test_unhandled_placeholder_warning() {
    let (terminator, seen) = recording_warning();
    let output = terminator
        .terminate(&parse("foo\\{bar}").expect("Should parse"))
        .expect("warning never fails");
    assert_eq!(output, "foo\\{bar}");
    assert_eq!(reported(&seen), vec!["unhandled_placeholder"]);
}

#[test]
fn test_unhandled_fallback_goes_through_safer() {
    let config = TerminatorConfig::lenient().with_insertion_safer(|value| value.replace('\\', "/"));
    let output = Terminator::new(config)
        .terminate(&parse("a\\{b}").expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, "a/{b}");
}

#[test]
fn test_processing_fallback_skips_safer() {
    let config = TerminatorConfig::lenient().with_insertion_safer(|value| value.replace('\\', "/"));
    let mut terminator = Terminator::new(config);
    terminator.declare_fn("b", needs_argument).expect("declare");
    let output = terminator
        .terminate(&parse("a\\{b}").expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, "a\\{b}");
}

#[test]
fn test_setup_to_nowhere_strict() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let err = terminator
        .terminate(&parse("foobaz").expect("Should parse"))
        .expect_err("Should fail");
    assert!(matches!(err, TerminatorError::SetupToNowhere { ref key } if key == "bar"));
}

#[test]
fn test_setup_to_nowhere_reports_smallest_key_first() {
    let mut terminator = Terminator::strict();
    for key in ["zeta", "alpha", "mid"] {
        terminator.declare(key, "x").expect("declare");
    }
    let err = terminator
        .terminate(&parse("nothing").expect("Should parse"))
        .expect_err("Should fail");
    assert_eq!(err.key(), "alpha");
}

#[test]
fn test_setup_to_nowhere_lenient() {
    let mut terminator = Terminator::lenient();
    terminator.declare("bar", "buzz").expect("declare");
    let output = terminator
        .terminate(&parse("foobaz").expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, "foobaz");
}

#[test]
fn test_setup_to_nowhere_warning() {
    let (mut terminator, seen) = recording_warning();
    terminator.declare("bar", "buzz").expect("declare");
    terminator.declare("other", "x").expect("declare");
    let output = terminator
        .terminate(&parse("foobaz").expect("Should parse"))
        .expect("warning never fails");
    assert_eq!(output, "foobaz");
    assert_eq!(reported(&seen), vec!["setup_to_nowhere", "setup_to_nowhere"]);
}

#[test]
fn test_setup_to_exclusion() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{!bar}baz").expect("Should parse"))
        .expect("excluded key counts as used");
    assert_eq!(output, "foobaz");
}

#[test]
fn test_exclusion_of_undeclared_key() {
    let output = Terminator::strict()
        .terminate(&parse("foo\\{!nobody}baz").expect("Should parse"))
        .expect("excluded placeholders need no declaration");
    assert_eq!(output, "foobaz");
}

#[test]
fn test_external_excluded_keys() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let output = terminator
        .terminate_excluding(&parse("foobaz").expect("Should parse"), &["bar"])
        .expect("excluded from the unused check");
    assert_eq!(output, "foobaz");
}

#[test]
fn test_external_exclusion_of_several_keys() {
    let mut terminator = Terminator::strict();
    for (key, value) in [("bar", "buzz"), ("bar2", "buzz2"), ("bar3", "buzz3"), ("bar4", "buzz4")] {
        terminator.declare(key, value).expect("distinct keys");
    }
    let output = terminator
        .terminate_excluding(
            &parse("foo\\{bar}baz").expect("Should parse"),
            &["bar2", "bar3", "bar4"],
        )
        .expect("Should terminate");
    assert_eq!(output, "foobuzzbaz");
}

#[test]
fn test_override_strict() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let err = terminator.declare("bar", "buzz2").expect_err("Should fail");
    assert!(matches!(err, TerminatorError::Override { ref key } if key == "bar"));

    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("first declaration kept");
    assert_eq!(output, "foobuzzbaz");
}

#[test]
fn test_override_lenient() {
    let mut terminator = Terminator::lenient();
    terminator.declare("bar", "buzz").expect("declare");
    terminator.declare("bar", "buzz2").expect("lenient allows override");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzz2baz");
}

#[test]
fn test_override_warning() {
    let (mut terminator, seen) = recording_warning();
    terminator.declare("bar", "buzz").expect("declare");
    terminator.declare("bar", "buzz2").expect("warning allows override");
    assert_eq!(reported(&seen), vec!["override"]);

    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzz2baz");
}

#[test]
fn test_declined_override_does_not_fail() {
    let config = TerminatorConfig::lenient().with_override_policy(OptionalPolicy::Enabled(Arc::new(
        |_: &str, _: &Declaration, _: &Declaration| -> Result<bool, TerminatorError> { Ok(false) },
    )));
    let mut terminator = Terminator::new(config);
    terminator.declare("bar", "buzz").expect("declare");
    terminator.declare("bar", "buzz2").expect("declined, not failed");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("Should terminate");
    assert_eq!(output, "foobuzzbaz");
}

#[test]
fn test_processing_error_strict() {
    let mut terminator = Terminator::strict();
    terminator.declare_fn("bar", needs_argument).expect("declare");
    let err = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect_err("Should fail");
    assert_eq!(err.kind(), "processing");
    assert_eq!(
        std::error::Error::source(&err).map(|s| s.to_string()),
        Some("placeholder has no argument".to_string())
    );
}

#[test]
fn test_processing_error_lenient() {
    let mut terminator = Terminator::lenient();
    terminator.declare_fn("bar", needs_argument).expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, "foo\\{bar}baz");
}

#[test]
fn test_processing_error_warning() {
    let (mut terminator, seen) = recording_warning();
    terminator.declare_fn("bar", needs_argument).expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar}baz").expect("Should parse"))
        .expect("warning never fails");
    assert_eq!(output, "foo\\{bar}baz");
    assert_eq!(reported(&seen), vec!["processing"]);
}

#[test]
fn test_unexpected_end_strict() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let err = terminator
        .terminate(&parse("foo\\{bar:arg").expect("Should parse"))
        .expect_err("Should fail");
    assert!(matches!(
        err,
        TerminatorError::UnexpectedEndOfInput { ref key, index: 3, .. } if key == "bar"
    ));
}

#[test]
fn test_unexpected_end_lenient_still_substitutes() {
    let mut terminator = Terminator::lenient();
    terminator.declare_fn("bar", needs_argument).expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar:arg").expect("Should parse"))
        .expect("lenient never fails");
    assert_eq!(output, "fooarg");
}

#[test]
fn test_unexpected_end_warning() {
    let (mut terminator, seen) = recording_warning();
    terminator
        .declare_fn("bar", |data: &PlaceholderData| -> Result<String, HandlerError> {
            assert_eq!(data.argument(), Some("arg"));
            Ok("buzz".to_string())
        })
        .expect("declare");
    let output = terminator
        .terminate(&parse("foo\\{bar:arg").expect("Should parse"))
        .expect("warning never fails");
    assert_eq!(output, "foobuzz");
    assert_eq!(reported(&seen), vec!["unexpected_end_of_input"]);
}

#[test]
fn test_empty_template_skips_every_check() {
    let mut terminator = Terminator::strict();
    terminator.declare("bar", "buzz").expect("declare");
    let output = terminator
        .terminate_excluding(&parse("").expect("Should parse"), &["bar"])
        .expect("Should terminate");
    assert_eq!(output, "");

    let output = terminator
        .terminate(&parse("").expect("Should parse"))
        .expect("empty input is never checked");
    assert_eq!(output, "");
}

#[test]
fn test_raw_declaration_sees_whole_placeholder() {
    let config = TerminatorConfig::strict().with_insertion_safer(|value| value.to_uppercase());
    let mut terminator = Terminator::new(config);
    terminator
        .declare_raw("raw", |placeholder| {
            format!("<{}|{}>", placeholder.original().content, placeholder.end_expected)
        })
        .expect("declare");
    terminator.declare("safe", "quiet").expect("declare");

    let output = terminator
        .terminate(&parse("\\{raw:x} \\{safe}").expect("Should parse"))
        .expect("Should terminate");
    assert_snapshot!(output, @r"<\{raw:x}|true> QUIET");
}

#[test]
fn test_find_declaration_invokes_without_policies() {
    let mut terminator = Terminator::strict();
    terminator.declare_fn("bar", needs_argument).expect("declare");

    let declaration = terminator.find_declaration("bar").expect("declared");
    let err = declaration
        .invoke(&gst_template::Placeholder::dummy())
        .expect_err("dummy has no argument");
    assert_eq!(err.to_string(), "placeholder has no argument");
    assert!(terminator.find_declaration("baz").is_none());
}

#[test]
fn test_concurrent_termination() {
    let mut terminator = Terminator::strict();
    terminator.declare_fn("n", needs_argument).expect("declare");

    let outputs: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let terminator = &terminator;
                scope.spawn(move || {
                    let template = format!("n=\\{{n:{}}}", i);
                    terminator
                        .terminate(&parse(&template).expect("Should parse"))
                        .expect("Should terminate")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread finished"))
            .collect()
    });

    let expected: Vec<String> = (0..8).map(|i| format!("n={}", i)).collect();
    assert_eq!(outputs, expected);
}

#[test]
fn test_plain_text_round_trips_under_every_bundle() {
    let templates = ["", "plain", "braces {stay} text", "ünïcödé: 👲🏿", "a:b!c}d"];
    for template in templates {
        let tokens = parse(template).expect("Should parse");
        for terminator in [Terminator::strict(), Terminator::lenient(), Terminator::warning()] {
            assert_eq!(
                terminator.terminate(&tokens).expect("nothing to resolve"),
                template
            );
        }
    }
}
