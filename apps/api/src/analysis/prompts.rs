// Analysis prompt shared by every provider. Providers differ only in transport.

pub const ANALYSIS_PROMPT: &str = r#"You are a professional resume reviewer and ATS (Applicant Tracking System) expert. Analyze the following resume text and provide a comprehensive JSON response.

IMPORTANT: Return ONLY valid JSON without any markdown formatting, code blocks, or additional text.

Return exactly this shape:
{
  "resumeScore": <integer 0-100>,
  "grammarIssues": [<string>],
  "formattingTips": [<string>],
  "keywordsMatched": [<string>],
  "keywordsMissing": [<string>],
  "atsCompatibility": "Good" | "Average" | "Poor"
}

Analysis Guidelines:
- resumeScore (0-100): Consider content quality, relevance, and completeness
- grammarIssues: List specific grammar, spelling, or punctuation errors
- formattingTips: Provide actionable formatting and structure suggestions
- keywordsMatched: Identify relevant skills, technologies, and keywords found
- keywordsMissing: Suggest important industry-relevant skills that are missing
- atsCompatibility: Assess how well the resume will perform in ATS systems

For PDF content: If the text appears to be extracted from a PDF, focus on the actual content rather than formatting issues that may be due to extraction.

Resume Text:
"""{resume_text}""""#;

pub fn build_analysis_prompt(resume_text: &str) -> String {
    ANALYSIS_PROMPT.replace("{resume_text}", resume_text)
}
