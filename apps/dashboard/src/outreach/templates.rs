// Per-channel outreach templates. Placeholders are filled by `generator::fill_template`:
// `{name}`, `{experience_phrase}`, `{project_clause}`, `{skills}`.

/// LinkedIn message template: short and informal.
pub const LINKEDIN_TEMPLATE: &str = "Hi {name},

I came across your profile and was particularly impressed by {experience_phrase}.{project_clause}

Would you be interested in discussing an exciting opportunity at our company?

Best regards,
[Recruiter Name]";

/// Email template: longer, includes a skills summary.
pub const EMAIL_TEMPLATE: &str = "Dear {name},

I hope this email finds you well. I'm reaching out because {experience_phrase} aligns closely with what we're looking for.{project_clause}

I'd love to schedule a call to discuss how your expertise in {skills} could be a great fit for our team.

Looking forward to your response.

Best regards,
[Recruiter Name]
[Company Name]";

pub const EXPERIENCE_PHRASE_FALLBACK: &str = "your professional background";
