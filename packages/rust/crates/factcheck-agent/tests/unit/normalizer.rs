use super::*;

fn side_channel() -> Vec<Citation> {
    vec![
        Citation::from_url("https://news.example/a"),
        Citation {
            title: Some("Agency report".to_string()),
            url: "https://gov.example/b".to_string(),
        },
    ]
}

#[test]
fn fenced_json_block_is_parsed() {
    let raw = "Here is my analysis:\n```json\n{\"overall_rating\":\"MOSTLY_TRUE\",\"summary\":\"ok\",\"claims\":[]}\n```\nThanks.";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::MostlyTrue);
    assert_eq!(verdict.summary, "ok");
    assert!(verdict.claims.is_empty());
    assert_eq!(verdict.raw_response, raw);
}

#[test]
fn bare_json_object_is_parsed() {
    let raw = r#"{"overall_rating":"FALSE","summary":"no","claims":[{"claim":"X","rating":"FALSE","explanation":"E","sources":[]}]}"#;
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::False);
    assert_eq!(verdict.summary, "no");
    assert_eq!(verdict.claims.len(), 1);
    assert_eq!(verdict.claims[0].claim_text, "X");
    assert_eq!(verdict.claims[0].rating, ClaimRating::False);
    assert_eq!(verdict.claims[0].explanation, "E");
}

#[test]
fn garbage_text_degrades_to_unverifiable() {
    let raw = "the model refused to answer";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.summary, FALLBACK_SUMMARY);
    assert!(verdict.claims.is_empty());
    assert_eq!(verdict.raw_response, raw);
}

#[test]
fn normalize_is_total_over_hostile_inputs() {
    let inputs = [
        "",
        "   \n\t",
        "{",
        "{\"overall_rating\": ",
        "[1, 2, 3]",
        "{}",
        "{\"claims\": \"not a list\"}",
        "```json\n{broken\n```",
        "```json\n```",
        "rating: FALSE",
        "Overall rating:",
        "null",
        "\u{0}\u{ffff}",
    ];
    for raw in inputs {
        let verdict = normalize(raw, &[]);
        assert!(Rating::ALL.contains(&verdict.overall_rating), "input {raw:?}");
        assert_eq!(verdict.raw_response, raw);
    }
}

#[test]
fn empty_json_object_defaults_fields() {
    let verdict = normalize("{}", &[]);
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.summary, "");
    assert!(verdict.claims.is_empty());
}

#[test]
fn out_of_enum_ratings_are_coerced() {
    let raw = r#"{"overall_rating":"pants on fire","summary":"s","claims":[{"claim":"A","rating":"half true"},{"claim":"B","rating":"misleading"}]}"#;
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.claims[0].rating, ClaimRating::Unverifiable);
    assert_eq!(verdict.claims[1].rating, ClaimRating::Misleading);
}

#[test]
fn lowercase_ratings_are_upper_cased() {
    let raw = r#"{"overall_rating":"mostly_false","claims":[]}"#;
    assert_eq!(normalize(raw, &[]).overall_rating, Rating::MostlyFalse);
}

#[test]
fn claim_fields_missing_from_json_get_defaults() {
    let raw = r#"{"overall_rating":"MIXED","claims":[{"rating":"TRUE"}, {"claim":"C","sources":["https://x.example", {"url":"https://y.example"}, 7]}]}"#;
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.claims[0].claim_text, "Unspecified claim");
    assert_eq!(verdict.claims[0].explanation, "");
    assert!(verdict.claims[0].sources.is_empty());
    assert_eq!(verdict.claims[1].rating, ClaimRating::Unverifiable);
    assert_eq!(
        verdict.claims[1].sources,
        vec!["https://x.example".to_string(), "https://y.example".to_string()]
    );
}

#[test]
fn malformed_fence_falls_through_to_labeled_fields() {
    let raw = "```json\n{\"overall_rating\": TRUE,\n```\nOverall rating: TRUE\nSummary: checked";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::True);
    assert_eq!(verdict.summary, "checked");
}

#[test]
fn side_channel_citations_attached_when_model_embeds_none() {
    let raw = r#"{"overall_rating":"TRUE","summary":"s","claims":[]}"#;
    let verdict = normalize(raw, &side_channel());
    assert_eq!(verdict.citations, side_channel());
}

#[test]
fn embedded_citations_win_over_side_channel() {
    let raw = r#"{"overall_rating":"TRUE","summary":"s","claims":[],"citations":["https://model.example"]}"#;
    let verdict = normalize(raw, &side_channel());
    assert_eq!(
        verdict.citations,
        vec![Citation::from_url("https://model.example")]
    );
}

#[test]
fn fallback_keeps_side_channel_citations() {
    let verdict = normalize("no structure here", &side_channel());
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.citations, side_channel());
}

#[test]
fn labeled_text_is_extracted() {
    let raw = "\
**Overall Rating:** Mostly False

Summary: The post exaggerates the figures.
Most numbers are from 2019.

Claim: Unemployment doubled last year.
Rating: FALSE
Explanation: Official data shows a 0.4 point rise.
Sources:
- https://stats.example/unemployment
* Labour force survey, table 3

Claim: The survey was published in March
Rating: misleading - it was a preliminary release
Explanation: Final numbers came in June.
Source: https://stats.example/release
";
    let verdict = normalize(raw, &side_channel());
    assert_eq!(verdict.overall_rating, Rating::MostlyFalse);
    assert_eq!(
        verdict.summary,
        "The post exaggerates the figures.\nMost numbers are from 2019."
    );
    assert_eq!(verdict.claims.len(), 2);

    let first = &verdict.claims[0];
    assert_eq!(first.claim_text, "Unemployment doubled last year.");
    assert_eq!(first.rating, ClaimRating::False);
    assert_eq!(first.explanation, "Official data shows a 0.4 point rise.");
    assert_eq!(
        first.sources,
        vec![
            "https://stats.example/unemployment".to_string(),
            "Labour force survey, table 3".to_string(),
        ]
    );

    let second = &verdict.claims[1];
    assert_eq!(second.rating, ClaimRating::Misleading);
    assert_eq!(second.sources, vec!["https://stats.example/release".to_string()]);

    assert_eq!(verdict.citations, side_channel());
}

#[test]
fn labeled_text_accepts_overall_rating_spellings() {
    for label in ["overall rating", "OVERALL_RATING", "Overall-Rating"] {
        let raw = format!("{label}: TRUE\nsummary: fine");
        let verdict = normalize(&raw, &[]);
        assert_eq!(verdict.overall_rating, Rating::True, "label {label}");
        assert_eq!(verdict.summary, "fine");
    }
}

#[test]
fn labeled_text_without_overall_rating_falls_back() {
    let raw = "Claim: something\nRating: TRUE\nExplanation: because";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.summary, FALLBACK_SUMMARY);
    assert!(verdict.claims.is_empty());
}

#[test]
fn overall_rating_inside_a_sentence_is_found() {
    let raw = "Based on my research, the overall rating: MOSTLY_FALSE.\n\nSummary: stuff";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::MostlyFalse);
    assert_eq!(verdict.summary, "stuff");

    let prose = "After reviewing sources I would give this an overall rating of... no, overall rating FALSE overall.";
    assert_eq!(normalize(prose, &[]).overall_rating, Rating::False);
}

#[test]
fn prose_without_a_known_rating_still_falls_back() {
    let raw = "The overall rating is hard to determine here.";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::Unverifiable);
    assert_eq!(verdict.summary, FALLBACK_SUMMARY);
}

#[test]
fn numbered_claim_labels_are_recognized() {
    let raw = "Overall Rating: FALSE\nSummary: Mixed bag.\n\n\
               Claim 1: The moon is cheese\nRating: FALSE\nExplanation: It is rock.\n\n\
               **Claim #2:** Sky is blue\nRating: TRUE\nSources:\n- https://sky.example";
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.overall_rating, Rating::False);
    assert_eq!(verdict.claims.len(), 2);
    assert_eq!(verdict.claims[0].claim_text, "The moon is cheese");
    assert_eq!(verdict.claims[0].rating, ClaimRating::False);
    assert_eq!(verdict.claims[0].explanation, "It is rock.");
    assert_eq!(verdict.claims[1].claim_text, "Sky is blue");
    assert_eq!(verdict.claims[1].rating, ClaimRating::True);
    assert_eq!(verdict.claims[1].sources, vec!["https://sky.example"]);
}

#[test]
fn wrongly_typed_json_fields_keep_the_rating() {
    let raw = r#"{"overall_rating":"FALSE","summary":"no","claims":"none"}"#;
    let verdict = normalize(raw, &side_channel());
    assert_eq!(verdict.overall_rating, Rating::False);
    assert_eq!(verdict.summary, "no");
    assert!(verdict.claims.is_empty());

    let raw = r#"{"overall_rating":"TRUE","summary":"yes","claims":[],"citations":"x"}"#;
    let verdict = normalize(raw, &side_channel());
    assert_eq!(verdict.overall_rating, Rating::True);
    assert_eq!(verdict.citations, side_channel());
}

#[test]
fn malformed_citation_entries_are_skipped() {
    let raw = r#"{"overall_rating":"TRUE","claims":[],"citations":[null,{"title":"no url"},"https://ok.example",{"url":"https://b.example","title":"B"}]}"#;
    let verdict = normalize(raw, &[]);
    assert_eq!(verdict.citations.len(), 2);
    assert_eq!(verdict.citations[0].url, "https://ok.example");
    assert_eq!(verdict.citations[1].title.as_deref(), Some("B"));
}

#[test]
fn parser_patterns_compile() {
    LazyLock::force(&FENCED_JSON);
    LazyLock::force(&LABELED_LINE);
    LazyLock::force(&OVERALL_RATING_ANYWHERE);
}
