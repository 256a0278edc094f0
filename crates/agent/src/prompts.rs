//! Prompt construction for the language-model collaborator
//!
//! All prompts are generated from the product definition so that a new
//! product needs no prompt writing of its own.

use loan_agent_config::ProductDefinition;
use loan_agent_core::{Profile, Turn};

/// System prompt seeding a new conversation.
pub fn system_prompt(product: &ProductDefinition) -> String {
    let mut field_lines = String::new();
    for (i, field) in product.fields.iter().enumerate() {
        field_lines.push_str(&format!("{}. {}: {}\n", i + 1, field.name, field.description));
    }

    format!(
        "You are a friendly and professional {} advisor chatbot.\n\n\
         Your task is to systematically collect the following information from users through natural conversation:\n\n\
         Required fields (collect in this order):\n{}\n\
         Guidelines:\n\
         1) Always start by asking for their name, email, and phone number first.\n\
         2) Be conversational and friendly, not robotic.\n\
         3) Ask 1-2 related questions at a time, don't overwhelm.\n\
         4) Validate each response and ask for clarification if unclear.\n\
         5) For categorical fields, ensure an exact match with the allowed options.\n\
         6) Do NOT provide loan predictions - only collect information.\n\n\
         Start by introducing yourself and asking for their name first.",
        product.display_name.to_lowercase(),
        field_lines
    )
}

/// Extraction prompt: pull any clearly-stated fields from the latest user
/// message into a JSON object.
pub fn extraction_prompt(product: &ProductDefinition, user_text: &str, recent: &[Turn]) -> String {
    let mut history = String::new();
    for turn in recent {
        history.push_str(&format!("{}: {}\n", turn.role, turn.content));
    }

    let mut field_lines = String::new();
    for field in &product.fields {
        field_lines.push_str(&format!("- {}: {}\n", field.name, field.description));
    }

    format!(
        "Based on the conversation history and the user's latest response, extract any {}-related information.\n\n\
         Conversation so far:\n{}\n\
         User's latest response: \"{}\"\n\n\
         Extract information for these fields (only if clearly mentioned):\n{}\n\
         Important:\n\
         - For categorical fields, map variations to the exact allowed options.\n\
         - Convert lakhs/crores to actual numbers (e.g., \"12 lakhs\" = 1200000).\n\
         - Extract only information that is clearly stated.\n\n\
         Return ONLY a JSON object with the extracted fields. If no information is found, return empty JSON {{}}.",
        product.display_name.to_lowercase(),
        history,
        user_text,
        field_lines
    )
}

/// Instruction constraining the follow-up to exactly the next missing
/// field. Keeping the model on one field per turn bounds ambiguity.
pub fn followup_instruction(product: &ProductDefinition, profile: &Profile, missing: &[String]) -> String {
    let next_field = missing.first().map(String::as_str).unwrap_or_default();
    let collected: Vec<&str> = product
        .fields
        .iter()
        .filter(|f| profile.contains_key(&f.name))
        .map(|f| f.name.as_str())
        .collect();

    format!(
        "You are completing a structured form step-by-step.\n\
         Collected fields: {}\n\
         Remaining fields (in order): {}\n\
         Your task: Ask ONE short question to collect ONLY the next field: {}.\n\
         Requirements:\n\
         - Ask for {} only, do not ask about other fields.\n\
         - Provide a brief input format hint and one example value.\n\
         - Output just the question, nothing else.",
        collected.join(", "),
        missing.join(", "),
        next_field,
        next_field
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_agent_config::ProductRegistry;
    use loan_agent_core::LoanType;

    #[test]
    fn test_system_prompt_lists_fields_in_order() {
        let registry = ProductRegistry::builtin();
        let personal = registry.get(LoanType::Personal).unwrap();
        let prompt = system_prompt(&personal);

        let name_pos = prompt.find("Customer_Name").unwrap();
        let amount_pos = prompt.find("Expected_Loan_Amount").unwrap();
        assert!(name_pos < amount_pos);
    }

    #[test]
    fn test_extraction_prompt_mentions_user_text() {
        let registry = ProductRegistry::builtin();
        let gold = registry.get(LoanType::Gold).unwrap();
        let prompt = extraction_prompt(&gold, "I have gold worth 3 lakh", &[]);
        assert!(prompt.contains("I have gold worth 3 lakh"));
        assert!(prompt.contains("Gold_Value"));
        assert!(prompt.contains("Return ONLY a JSON object"));
    }

    #[test]
    fn test_followup_targets_next_field() {
        let registry = ProductRegistry::builtin();
        let personal = registry.get(LoanType::Personal).unwrap();
        let missing = vec!["Age".to_string(), "CIBIL_Score".to_string()];
        let instruction = followup_instruction(&personal, &Profile::new(), &missing);
        assert!(instruction.contains("ONLY the next field: Age"));
    }
}
