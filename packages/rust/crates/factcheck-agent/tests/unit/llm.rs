use super::*;

#[test]
fn request_body_carries_contract_and_search_filter() {
    let client = LlmClient::new(FactCheckConfig {
        temperature: Some(0.2),
        ..FactCheckConfig::with_api_key("pplx-test")
    });
    let body = serde_json::to_value(client.request_body("The earth is flat")).unwrap();
    assert_eq!(body["model"], "sonar-pro");
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(
        body["messages"][0]["content"]
            .as_str()
            .is_some_and(|text| text.contains("overall_rating") && text.contains("MISLEADING"))
    );
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(
        body["messages"][1]["content"]
            .as_str()
            .is_some_and(|text| text.ends_with("\n\nThe earth is flat"))
    );
    assert_eq!(
        body["options"]["search_domain_filter"],
        serde_json::json!(["NEWS", "ACADEMIC", "GOVERNMENT"])
    );
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    assert!(body.get("max_tokens").is_none());
}

#[test]
fn status_error_maps_rate_limit_and_upstream_message() {
    let limited = status_error(429, "{}");
    assert!(limited.is_rate_limited());
    assert_eq!(limited.user_message(), RATE_LIMIT_MESSAGE);

    let invalid = status_error(401, r#"{"error":{"message":"Invalid API key"}}"#);
    assert_eq!(invalid, FactCheckError::upstream(401, "Invalid API key"));

    let opaque = status_error(500, "<html>oops</html>");
    assert_eq!(opaque, FactCheckError::upstream(500, GENERIC_FAILURE_MESSAGE));
}

#[test]
fn envelope_extracts_content_and_mixed_citations() {
    let body = r#"{
        "choices": [{"message": {"role": "assistant", "content": "{\"overall_rating\":\"TRUE\"}"}}],
        "citations": ["https://a.example", {"title": "B", "url": "https://b.example"}]
    }"#;
    let envelope = parse_envelope(body).unwrap();
    assert_eq!(envelope.content, r#"{"overall_rating":"TRUE"}"#);
    assert_eq!(envelope.citations.len(), 2);
    assert_eq!(envelope.citations[1].title.as_deref(), Some("B"));
}

#[test]
fn envelope_without_choices_is_bad_gateway() {
    let error = parse_envelope(r#"{"choices": []}"#).unwrap_err();
    assert!(matches!(error, FactCheckError::Upstream { status: Some(502), .. }));
    let error = parse_envelope("not json").unwrap_err();
    assert!(matches!(error, FactCheckError::Upstream { status: Some(502), .. }));
}

#[tokio::test]
async fn missing_or_placeholder_key_is_configuration_error() {
    for api_key in [None, Some(String::new()), Some("pplx-...".to_string())] {
        let client = LlmClient::new(FactCheckConfig {
            api_key,
            api_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..FactCheckConfig::default()
        });
        let error = client.complete("claim").await.unwrap_err();
        assert_eq!(
            error,
            FactCheckError::Configuration("API key not configured".to_string())
        );
    }
}

#[test]
fn envelope_skips_malformed_citation_entries() {
    let body = r#"{
        "choices": [{"message": {"content": "Overall rating: TRUE"}}],
        "citations": ["https://a.example", null, {"title": "no url"}, 42, {"url": "https://b.example"}]
    }"#;
    let envelope = parse_envelope(body).unwrap();
    assert_eq!(envelope.content, "Overall rating: TRUE");
    assert_eq!(
        envelope.citations,
        vec![
            Citation::from_url("https://a.example"),
            Citation::from_url("https://b.example"),
        ]
    );

    let body = r#"{"choices": [{"message": {"content": "x"}}], "citations": null}"#;
    assert!(parse_envelope(body).unwrap().citations.is_empty());
}
