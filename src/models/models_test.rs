use super::*;

#[test]
fn test_sender_round_trip_str() {
    assert_eq!("user".parse::<Sender>().unwrap(), Sender::User);
    assert_eq!("assistant".parse::<Sender>().unwrap(), Sender::Assistant);
    assert_eq!(Sender::Assistant.to_string(), "assistant");

    let err = "system".parse::<Sender>().unwrap_err();
    assert_eq!(err.to_string(), "unknown sender system");
}

#[test]
fn test_transcript_from_message() {
    let user = Message::new_user("c1", "I had a rough day");
    let assistant = Message::new_assistant("c1", "That sounds hard.");

    assert_eq!(
        TranscriptMessage::from(&user),
        TranscriptMessage::user("I had a rough day")
    );
    assert_eq!(
        TranscriptMessage::from(&assistant),
        TranscriptMessage::assistant("That sounds hard.")
    );
}

#[test]
fn test_crisis_flag_pattern_match_metadata() {
    let flag = CrisisFlag::pattern_match("c1", Some("desire_to_die"));
    assert_eq!(flag.conversation_id(), "c1");
    assert_eq!(flag.flag_type(), "crisis_language_detected");
    assert_eq!(
        flag.metadata(),
        &serde_json::json!({ "trigger": "pattern_match", "intent": "desire_to_die" })
    );

    let flag = CrisisFlag::pattern_match("c1", None);
    assert_eq!(
        flag.metadata(),
        &serde_json::json!({ "trigger": "pattern_match" })
    );
}

#[test]
fn test_chat_wire_format() {
    let req: ChatRequest =
        serde_json::from_str(r#"{"message":"hi","conversationId":null}"#).unwrap();
    assert_eq!(req.message, "hi");
    assert!(req.conversation_id.is_none());

    let req: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
    assert!(req.conversation_id.is_none());

    let resp = ChatResponse {
        response: "hello".to_string(),
        is_crisis: false,
        conversation_id: None,
    };
    assert_eq!(
        serde_json::to_value(&resp).unwrap(),
        serde_json::json!({ "response": "hello", "isCrisis": false })
    );
}

#[test]
fn test_transcript_role_serialization() {
    let value = serde_json::to_value(TranscriptMessage::system("be kind")).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "role": "system", "content": "be kind" })
    );
}
