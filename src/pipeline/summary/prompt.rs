//! Role-specific prompts for the running patient summaries.
//!
//! Both roles share one prompt skeleton; the role supplies the voice, the
//! section outline and the wording for a first-ever summary.

use crate::models::Role;

const DOCTOR_SECTIONS: [&str; 9] = [
    "Patient Demographics",
    "Medical History Timeline (chronological, with dates)",
    "Current Active Medications (what they're taking NOW)",
    "Past Medications (discontinued or completed)",
    "Chronic Conditions",
    "Recent Symptoms/Complaints",
    "Test Results & Findings",
    "Treatment Response & Progress",
    "Clinical Notes & Observations",
];

const PATIENT_SECTIONS: [&str; 8] = [
    "Your Basic Information",
    "Health History (what you've been treated for, with dates)",
    "Current Medications (what you're taking now and why)",
    "Past Treatments",
    "Health Conditions",
    "Recent Visits & Symptoms",
    "Test Results (in simple terms)",
    "Doctor's Advice & Next Steps",
];

pub const NO_PREVIOUS_SUMMARY: &str = "No previous summary available";

impl Role {
    pub fn summary_sections(&self) -> &'static [&'static str] {
        match self {
            Role::Doctor => &DOCTOR_SECTIONS,
            Role::Patient => &PATIENT_SECTIONS,
        }
    }

    fn summary_voice(&self) -> &'static str {
        match self {
            Role::Doctor => {
                "You are a medical assistant helping doctors. Create a comprehensive medical summary.\n\
                 Write in the third person, clinically, e.g. 'This patient is ...'."
            }
            Role::Patient => {
                "You are a medical assistant helping patients understand their health record.\n\
                 Speak directly to the patient in the second person, e.g. 'You are ...'."
            }
        }
    }

    fn first_summary_note(&self) -> &'static str {
        match self {
            Role::Doctor => "This is the first prescription.",
            Role::Patient => "This is your first prescription.",
        }
    }

    fn style_guidance(&self) -> &'static str {
        match self {
            Role::Doctor => {
                "Keep medical terminology. Be precise and clinical.\n\
                 If this is an update, show the progression/changes over time."
            }
            Role::Patient => {
                "Use simple, non-medical language. Explain medical terms in brackets.\n\
                 Be reassuring and clear.\n\
                 If this is an update, explain what has changed in your treatment."
            }
        }
    }
}

/// Build the merge prompt for one role.
///
/// `previous` is that role's current summary; `extracted_json` is the new
/// prescription data, already serialized.
pub fn build_summary_prompt(role: Role, previous: Option<&str>, extracted_json: &str) -> String {
    let previous = match previous {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => format!("{NO_PREVIOUS_SUMMARY}. {}", role.first_summary_note()),
    };

    let outline = role
        .summary_sections()
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let language = match role {
        Role::Doctor => "",
        Role::Patient => " in simple language",
    };

    format!(
        "{voice}\n\n\
         Existing Summary (if any):\n{previous}\n\n\
         New Prescription Data:\n{extracted_json}\n\n\
         Generate an UPDATED summary{language} including:\n{outline}\n\n\
         {style}\n\
         Format clearly with sections using numbers for points.\n\
         Merge with existing information intelligently - don't duplicate entries.\n\
         Do not use # or markdown headers, use numbered points instead.",
        voice = role.summary_voice(),
        style = role.style_guidance(),
    )
}
