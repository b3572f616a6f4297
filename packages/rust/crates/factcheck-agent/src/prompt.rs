//! Outbound prompt: the fixed verdict contract and the per-claim user message.

/// System instruction pinning the exact JSON verdict schema and rating sets.
pub const SYSTEM_INSTRUCTION: &str = "You are a professional fact-checker with extensive research \
capabilities. Evaluate social media posts for factual accuracy and identify false, misleading or \
unsubstantiated claims. Respond with a single valid JSON object and nothing else, in exactly this \
format: {\"overall_rating\": \"TRUE|MOSTLY_TRUE|MIXED|MOSTLY_FALSE|FALSE|UNVERIFIABLE\", \
\"summary\": \"Summary of findings\", \"claims\": [{\"claim\": \"Specific claim\", \
\"rating\": \"TRUE|MOSTLY_TRUE|MIXED|MOSTLY_FALSE|FALSE|MISLEADING|UNVERIFIABLE\", \
\"explanation\": \"Detailed explanation\", \"sources\": [\"Source URL or reference\"]}]}. \
Every field is required; use an empty list when there are no claims or sources.";

const USER_PREFIX: &str =
    "Fact check the following social media post and identify any false or misleading claims:";

/// User message carrying the claim text.
pub fn user_message(claim_text: &str) -> String {
    format!("{USER_PREFIX}\n\n{claim_text}")
}
