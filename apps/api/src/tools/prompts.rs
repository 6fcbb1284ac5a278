// All LLM prompt constants for the Resume Tools module.
// Cross-cutting fragments live in llm_client::prompts.

/// Skill extraction prompt template. Replace `{text}` before sending.
pub const SKILLS_PROMPT_TEMPLATE: &str = r#"Extract all technical skills, soft skills, and tools from the following text.
Return ONLY a JSON list of strings, e.g. ["Python", "Leadership", "Excel"].
Do not output markdown or explanations.

TEXT:
{text}"#;

/// Gap analysis prompt template. Replace `{resume_text}` and
/// `{job_description}` before sending.
pub const GAP_PROMPT_TEMPLATE: &str = r#"Compare the Resume and Job Description below.
Identify matched skills and missing skills.
Return ONLY valid JSON with this EXACT schema:
{
  "matched_skills": ["skill1", "skill2"],
  "missing_skills": ["skill3", "skill4"],
  "score": 85
}
"score" is the overall resume/job fit from 0 to 100.

RESUME:
{resume_text}

JOB DESCRIPTION:
{job_description}"#;

/// System prompt for section rewriting — prose output, no invention.
pub const REWRITE_SYSTEM: &str = "You are an expert resume writer. \
    Rewrite resume sections for impact without inventing facts. \
    Respond with the rewritten text only.";

/// Section rewrite prompt template. Replace `{keywords}` and `{text}`.
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"Rewrite this resume section to naturally include the following keywords: {keywords}.
Preserve the original meaning and facts. Keep it professional.
Return ONLY the rewritten section, no commentary.

ORIGINAL:
{text}"#;

/// Role suggestion prompt template. Replace `{resume_text}`.
pub const ROLES_PROMPT_TEMPLATE: &str = r#"Suggest 5 job titles that fit this resume.
Return ONLY a JSON list of strings, e.g. ["Software Engineer", "Data Analyst"].
No markdown.

RESUME:
{resume_text}"#;

/// System prompt for extractive question answering.
pub const QA_SYSTEM: &str = "You are an extractive question-answering assistant. \
    Answer using ONLY the provided resume text. \
    If the resume does not contain the answer, say so plainly. \
    Keep answers short and factual.";

/// Extractive QA prompt template. Replace `{resume_text}` and `{question}`.
pub const QA_PROMPT_TEMPLATE: &str = r#"RESUME:
{resume_text}

QUESTION: {question}

Answer the question using only the resume above."#;
