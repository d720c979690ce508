//! Prompt composition for drafted customer replies.
//!
//! A request is always two messages: the fixed [`POLICY_PROMPT`] followed by
//! a tone fragment as the system message, then the enquiry verbatim as the
//! user message. Nothing the customer writes reaches the system message.

use crate::providers::Message;

/// Behavioural constraints and required output structure for every draft.
pub const POLICY_PROMPT: &str = r#"You are a customer response assistant for a property inspection company.

Your task is to generate a polite, professional, and human-sounding reply to a customer enquiry.

STRICT RULES (must follow):
- Do NOT assume or guess the cause of the issue
- Do NOT diagnose the problem
- Do NOT mention specific causes (roof, leakage, walls, cracks, mold, inspection, repair, pricing, services) unless the customer explicitly mentions them
- Do NOT offer inspections, callbacks, site visits, or estimates
- Do NOT make promises or guarantees
- Do NOT use emojis or overly casual language

RESPONSE GUIDELINES:
- Acknowledge the customer's concern empathetically
- Ask only neutral, relevant clarifying questions
- Suggest only safe and general next steps (observation, keeping area clear, normal ventilation)
- Avoid technical jargon
- Keep the tone calm, supportive, and professional
- Keep the response concise and clear
- Reply in the same language the customer used

CRITICAL — Response Formatting Rules (YOU MUST FOLLOW):
You MUST format your entire response using Markdown with clear section headers. Do NOT write plain paragraphs without structure.

Use this exact template:

---

**Acknowledgement**

(1-2 sentences acknowledging the customer's concern empathetically)

---

**Clarifying Questions**

To understand your situation better, could you share:

1. (First neutral clarifying question)
2. (Second neutral clarifying question)
3. (Third neutral clarifying question)

---

**Suggested Next Steps**

In the meantime, here are a few things you can do:

- (First safe, general step)
- (Second safe, general step)
- (Third safe, general step)

---

**Closing**

(A warm, professional closing — let them know someone will get back once they share more details)

---
"#;

/// Section headers the policy asks the model to emit, in order.
pub const REQUIRED_SECTIONS: [&str; 4] = [
    "Acknowledgement",
    "Clarifying Questions",
    "Suggested Next Steps",
    "Closing",
];

/// Reply register selected by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Friendly and casual.
    #[default]
    FriendlyCasual,
    /// Formal and professional.
    FormalProfessional,
    /// Empathetic and supportive.
    EmpatheticSupportive,
}

impl Tone {
    /// Every tone, in display order.
    pub const ALL: [Tone; 3] = [
        Tone::FriendlyCasual,
        Tone::FormalProfessional,
        Tone::EmpatheticSupportive,
    ];

    /// Label shown in the tone selector.
    pub fn label(self) -> &'static str {
        match self {
            Self::FriendlyCasual => "Friendly & Casual",
            Self::FormalProfessional => "Formal & Professional",
            Self::EmpatheticSupportive => "Empathetic & Supportive",
        }
    }

    /// Instruction appended to the policy prompt for this tone.
    pub fn fragment(self) -> &'static str {
        match self {
            Self::FriendlyCasual => "Use a friendly, casual tone — like talking to a neighbour.",
            Self::FormalProfessional => {
                "Use a formal, professional tone suitable for corporate communication."
            }
            Self::EmpatheticSupportive => {
                "Use an extra empathetic and supportive tone — the customer may be stressed."
            }
        }
    }

    /// Look up a tone by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tone| tone.label() == label)
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A tone as submitted by a surface: either a known tone or a label that
/// matched nothing.
///
/// Unrecognised labels are carried rather than rejected and contribute an
/// empty fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ToneSelection {
    /// One of the enumerated tones.
    Known(Tone),
    /// A label that is not in [`Tone::ALL`].
    Unrecognised(String),
}

impl ToneSelection {
    /// Classify a raw label.
    pub fn from_label(label: &str) -> Self {
        match Tone::from_label(label) {
            Some(tone) => Self::Known(tone),
            None => Self::Unrecognised(label.to_owned()),
        }
    }

    /// Instruction fragment, empty for unrecognised labels.
    pub fn fragment(&self) -> &'static str {
        match self {
            Self::Known(tone) => tone.fragment(),
            Self::Unrecognised(_) => "",
        }
    }

    /// Label as submitted.
    pub fn label(&self) -> &str {
        match self {
            Self::Known(tone) => tone.label(),
            Self::Unrecognised(label) => label,
        }
    }
}

impl Default for ToneSelection {
    fn default() -> Self {
        Self::Known(Tone::default())
    }
}

impl From<Tone> for ToneSelection {
    fn from(tone: Tone) -> Self {
        Self::Known(tone)
    }
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Enquiry is empty or whitespace only.
    #[error("please enter a customer enquiry first")]
    EmptyEnquiry,
}

/// Check that an enquiry has content after trimming.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyEnquiry`] for empty or whitespace-only input.
pub fn validate_enquiry(enquiry: &str) -> Result<(), ValidationError> {
    if enquiry.trim().is_empty() {
        return Err(ValidationError::EmptyEnquiry);
    }
    Ok(())
}

/// System message content: policy, blank line, tone fragment.
pub fn system_prompt(tone: &ToneSelection) -> String {
    format!("{POLICY_PROMPT}\n\n{}", tone.fragment())
}

/// Compose the two-message request for an enquiry.
///
/// The enquiry is passed through verbatim; trimming is only used for the
/// emptiness check.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyEnquiry`] when the enquiry has no content.
pub fn compose(enquiry: &str, tone: &ToneSelection) -> Result<Vec<Message>, ValidationError> {
    validate_enquiry(enquiry)?;
    Ok(vec![
        Message::system(system_prompt(tone)),
        Message::user(enquiry),
    ])
}

/// Required section headers absent from a draft.
pub fn missing_sections(draft: &str) -> Vec<&'static str> {
    REQUIRED_SECTIONS
        .into_iter()
        .filter(|section| !draft.contains(section))
        .collect()
}
