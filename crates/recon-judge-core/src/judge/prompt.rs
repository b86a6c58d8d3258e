use crate::model::{Claim, ReconstructionRecord};

pub const SYSTEM_PROMPT: &str = r#"You are evaluating a document reconstruction exercise.

An analyst was given research questions (but NOT the original document or claims) and a set of related documents. They attempted to answer the questions and synthesize what they learned.

Your task: For each original claim, determine how well it was reconstructed from the analyst's answers and synthesis.

SCORING RUBRIC (0-10):
- 10: Perfect - all details exactly correct, fully reconstructed
- 8-9: Substantially correct - minor omissions or slight imprecision
- 6-7: Mostly correct - main point captured but some inaccuracies or gaps
- 4-5: Partial - gist is correct but significant details missing or wrong
- 2-3: Weak - vaguely related content but largely missed the point
- 1: Minimal - topic barely touched, almost nothing correct
- 0: Not reconstructed - no relevant information found

IMPORTANT:
- Be strict and objective
- A claim is only "fully reconstructed" (8+) if the SPECIFIC information is present
- General discussion of the topic does NOT count as reconstruction
- Partial credit is for when specific details are partially captured

OUTPUT FORMAT (JSON):
{
  "evaluations": [
    {
      "claim_id": "c1",
      "score": 7,
      "justification": "The reconstruction captured X and Y but missed Z",
      "evidence_refs": ["t3", "q2", "synthesis"]
    }
  ]
}"#;

pub const UNANSWERED_PLACEHOLDER: &str = "(Unable to answer)";

const RULE_WIDTH: usize = 60;

/// Render the user prompt for one document. Claims and answers keep their
/// source order and text.
pub fn build_user_prompt(claims: &[Claim], reconstruction: &ReconstructionRecord) -> String {
    let claims_text = claims
        .iter()
        .map(|c| {
            format!(
                "[{}] ({}, importance: {})\n{}",
                c.claim_id, c.claim_type, c.importance, c.claim_text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let answers_text = reconstruction
        .answered_questions
        .iter()
        .map(|q| {
            format!(
                "[{}] {}\nAnswer ({}): {}",
                q.question_id,
                q.question_text,
                q.confidence,
                q.answer_text().unwrap_or(UNANSWERED_PLACEHOLDER)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let rule = "═".repeat(RULE_WIDTH);

    format!(
        "ORIGINAL CLAIMS (Ground Truth - these are what the analyst should have reconstructed):\n\n\
         {claims_text}\n\n\
         {rule}\n\n\
         RECONSTRUCTION ATTEMPT (what the analyst produced from related documents):\n\n\
         QUESTION ANSWERS:\n\
         {answers_text}\n\n\
         SYNTHESIS:\n\
         {synthesis}\n\n\
         {rule}\n\n\
         For each claim above, evaluate how well it was reconstructed. Output as JSON.",
        synthesis = reconstruction.synthesis,
    )
}
