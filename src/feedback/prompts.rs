//! Prompt and email templates for editorial feedback.

/// Label opening the strengths section of a generation completion.
pub const STRENGTHS_MARKER: &str = "Strengths:";

/// Label separating strengths from suggestions in a generation completion.
pub const IMPROVEMENTS_MARKER: &str = "Improvement Areas:";

/// Name the feedback email is signed with.
pub const SENDER_PERSONA: &str = "The Ghost Editorial Team";

/// Build the feedback generation prompt.
///
/// `previous_post_topic` is bound to the title of the post being reviewed.
pub fn feedback_generation_prompt(
    author_name: &str,
    article_content: &str,
    previous_post_topic: &str,
) -> String {
    format!(
        "Analyze the following article by {author_name} on the topic '{previous_post_topic}'.\n\n\
         Article content:\n{article_content}\n\n\
         Identify 2-3 specific strengths of the article and list them. Then, suggest 2-3 \
         improvements for the author to consider in future posts. \
         Format the response as:\n\
         {STRENGTHS_MARKER}\n- (Point 1)\n- (Point 2)\n\n\
         {IMPROVEMENTS_MARKER}\n- (Point 1)\n- (Point 2)"
    )
}

/// System preamble for the evaluation request.
pub const EVALUATOR_PREAMBLE: &str = "You are an editorial assistant.";

/// Build the prompt asking the model to grade a feedback email.
pub fn feedback_evaluation_prompt(feedback_email: &str) -> String {
    format!(
        "Please evaluate the following feedback email for \
         tone, formatting, and helpfulness.\n\n\
         Feedback Email:\n{feedback_email}\n\n\
         Analyze the email on these points:\n\
         1. Is the tone constructive and polite?\n\
         2. Are the strengths and improvements balanced?\n\
         3. Is the formatting clear and easy to read?\n\
         4. Give an overall rating (Excellent, Good, Fair, Poor) and provide a brief reason.\n\n\
         Format your response as:\n\n\
         Evaluation:\n\
         - Tone: (Constructive/Neutral/Negative)\n\
         - Balance: (Balanced/Too Positive/Too Negative)\n\
         - Formatting: (Clear/Unclear)\n\
         - Overall Rating: (Excellent/Good/Fair/Poor)\n\
         - Summary: (Brief explanation of your assessment)"
    )
}

pub fn feedback_subject(post_title: &str) -> String {
    format!("Feedback on Your Recent Post on {post_title}")
}

/// Render the plain-text feedback email body.
pub fn feedback_email_body(
    author_name: &str,
    post_title: &str,
    highlights: &str,
    recommendations: &str,
) -> String {
    format!(
        "Hi {author_name},\n\n\
         Thank you for contributing such insightful content on {post_title} to our platform! \
         We truly appreciate your expertise and the effort you put into your writing.\n\n\
         Here are a few highlights we loved about your recent post:\n\
         {highlights}\n\n\
         To help you make future posts even more engaging and impactful, here are some \
         recommendations:\n\
         {recommendations}\n\n\
         We look forward to seeing your next piece!\n\n\
         Best regards,\n\
         {SENDER_PERSONA}\n"
    )
}
