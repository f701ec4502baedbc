//! Prompt templates for the generation gateway.
//!
//! Each builder embeds a fixed-length prefix of the policy text; the prefix
//! lengths are part of the contract so results stay comparable across runs.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Characters of policy text embedded in a summary prompt.
pub const SUMMARY_PREFIX_CHARS: usize = 1000;
/// Characters of policy text embedded in a question prompt.
pub const QA_PREFIX_CHARS: usize = 500;
/// Characters of each policy embedded in a comparison prompt.
pub const COMPARISON_PREFIX_CHARS: usize = 1200;

/// Canned questions offered next to the free-form question box.
pub const EXAMPLE_QUESTIONS: [&str; 5] = [
    "What is the total coverage amount provided by this policy?",
    "What exclusions apply to this policy?",
    "What is the deductible amount?",
    "What is the policy period?",
    "Is accidental damage covered?",
];

/// First `max_chars` characters of `text`, never splitting a character.
pub fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn summary_prompt(policy_text: &str) -> String {
    format!(
        "Summarize the following insurance policy in detail. \n\
         Focus on coverages, exclusions, risk factors, and important information:\n\n{}",
        prefix(policy_text, SUMMARY_PREFIX_CHARS)
    )
}

pub fn question_prompt(policy_text: &str, question: &str) -> String {
    format!(
        "Based on this insurance policy document:\n\n{}\n\nAnswer this question:\n{}",
        prefix(policy_text, QA_PREFIX_CHARS),
        question
    )
}

pub fn claim_letter_prompt(incident: &str) -> String {
    format!(
        r#"
You are an AI assistant helping users write simple insurance claim letters.

Write a concise claim letter based on this incident:
"""{incident}"""

Include:
- Greeting
- Summary of incident
- Damages/losses
- Request for reimbursement
- Polite closing

Use a polite, clear, and professional tone.
Keep it short.
"#
    )
}

pub fn comparison_prompt(first: &str, second: &str) -> String {
    format!(
        r#"
You are an insurance policy comparison assistant.

Here are two policies:

Policy 1:
{}

Policy 2:
{}

Compare both policies in detail, considering:
- Coverage breadth and limits
- Exclusions and risky terms
- Policyholder benefits
- Risk exposure
- Any fine print red flags

Provide a side-by-side comparison, then clearly state which one is better and why.
Be fair, factual, and detailed in your reasoning.
"#,
        prefix(first, COMPARISON_PREFIX_CHARS),
        prefix(second, COMPARISON_PREFIX_CHARS)
    )
}

/// Household details used to ask for a plan recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorProfile {
    pub age: u8,
    /// Monthly income as entered by the user, in rupees.
    pub monthly_income: String,
    pub family_members: u32,
    pub goals: String,
}

impl AdvisorProfile {
    pub const MIN_AGE: u8 = 18;
    pub const MAX_AGE: u8 = 70;

    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(Self::MIN_AGE..=Self::MAX_AGE).contains(&self.age) {
            return Err(PolicyError::InvalidProfile(format!(
                "age must be within {}..={} (got {})",
                Self::MIN_AGE,
                Self::MAX_AGE,
                self.age
            )));
        }
        if self.family_members == 0 {
            return Err(PolicyError::InvalidProfile(
                "at least one family member must be covered".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn recommendation_prompt(profile: &AdvisorProfile) -> String {
    format!(
        "\nI am {} years old, earning ₹{}/month with {} family members.\n\
         I want insurance for: {}\n\
         Recommend the best type of insurance policy (Health / Life / Vehicle / Term etc.) with reasons.\n",
        profile.age, profile.monthly_income, profile.family_members, profile.goals
    )
}
