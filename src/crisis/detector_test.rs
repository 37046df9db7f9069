use super::*;

#[test]
fn test_detect_crisis_phrases() {
    let detector = CrisisDetector::default();

    let phrases = [
        "I want to die",
        "I can't go on",
        "I cant go on like this anymore",
        "I'm suicidal",
        "I've been thinking about suicide",
        "I want to kill myself",
        "sometimes I hurt my self",
        "I'm thinking of ending it all",
        "I just want to end my life",
        "there is no reason to live",
        "everyone would be better off dead without me",
    ];

    for phrase in phrases {
        assert!(detector.detect(phrase), "expected crisis for {:?}", phrase);
    }
}

#[test]
fn test_detect_is_case_insensitive() {
    let detector = CrisisDetector::default();
    assert!(detector.detect("I WANT TO DIE"));
    assert!(detector.detect("Suicidal thoughts again"));
}

#[test]
fn test_detect_neutral_text() {
    let detector = CrisisDetector::default();

    let phrases = [
        "I had a rough day at work",
        "My manager keeps ending meetings late",
        "I feel anxious before exams",
        "",
        "diehard fan of the show",
    ];

    for phrase in phrases {
        assert!(!detector.detect(phrase), "expected no crisis for {:?}", phrase);
    }
}

#[test]
fn test_detect_has_no_negation_handling() {
    let detector = CrisisDetector::default();
    assert!(detector.detect("I don't want to kill myself"));
}

#[test]
fn test_first_match_follows_pattern_order() {
    let detector = CrisisDetector::default();

    let matched = detector
        .first_match("I'm suicidal and I want to die")
        .expect("should match");
    assert_eq!(matched.intent(), "suicidal");

    let matched = detector.first_match("no reason to live").expect("should match");
    assert_eq!(matched.intent(), "no_reason_to_live");

    assert!(detector.first_match("just tired").is_none());
}

#[test]
fn test_order_does_not_change_result() {
    let mut reversed = CrisisDetector::default().patterns().to_vec();
    reversed.reverse();
    let reversed = CrisisDetector::new(reversed);
    let detector = CrisisDetector::default();

    for text in ["I want to die", "I had a rough day", "better off dead", "hello"] {
        assert_eq!(detector.detect(text), reversed.detect(text));
    }
}

#[test]
fn test_from_config() {
    let detector = CrisisDetector::from_config(&[]).expect("default detector");
    assert_eq!(detector.patterns().len(), 7);

    let detector = CrisisDetector::from_config(&[CrisisPatternConfig {
        intent: "hopelessness".to_string(),
        pattern: r"\bno\s+way\s+out\b".to_string(),
    }])
    .expect("custom detector");
    assert_eq!(detector.patterns().len(), 1);
    assert!(detector.detect("There's NO way out"));
    assert!(!detector.detect("I want to die"));
}

#[test]
fn test_from_config_invalid_pattern() {
    let err = CrisisDetector::from_config(&[CrisisPatternConfig {
        intent: "broken".to_string(),
        pattern: r"(unclosed".to_string(),
    }])
    .unwrap_err();
    assert_eq!(err.to_string(), "compiling crisis pattern broken");
}
