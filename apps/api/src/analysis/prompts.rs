// Prompt for resume-vs-JD assessment. The field list here must stay in sync
// with the checks in `parser.rs`.

/// Fixed instruction header. Enumerates every field the parser requires.
pub const ASSESSMENT_INSTRUCTIONS: &str = "\
Compare this resume against our job requirements and output ONLY a JSON object containing:
- candidate_name: string
- education: object (degree, field, school)
- years_experience: string
- relevant_skills: array of strings
- experience_highlights: array of strings
- match_score: number (0-100)
- match_rationale: string";

/// Renders the job description and resume text into one prompt.
///
/// Pure and deterministic. Both inputs are embedded verbatim, empty or not;
/// rejecting empty uploads is the caller's job.
pub fn build_prompt(job_description: &str, resume_text: &str) -> String {
    format!(
        "{ASSESSMENT_INSTRUCTIONS}\n\nJob Description:\n{job_description}\n\nResume Text:\n{resume_text}"
    )
}
