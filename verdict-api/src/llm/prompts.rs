//! Prompt builders
//!
//! Plain string assembly; every builder is pure so prompts can be checked
//! in unit tests without a model.

use verdict_common::models::{ChatMessage, ChatRole, Idea};

use crate::services::suggest::IdeaSketch;

/// Transcript characters kept in suggestion prompts
pub const SUGGESTION_TRANSCRIPT_CHARS: usize = 1000;

/// Cut `text` to `max_chars` characters, marking the cut with `...`
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head)
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn bulleted(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        return format!("- {}", empty);
    }
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn sketch_lines(ideas: &[IdeaSketch]) -> Vec<String> {
    ideas
        .iter()
        .map(|idea| match idea.description.as_deref().filter(|d| !d.is_empty()) {
            Some(description) => format!("{}: {}", idea.name, description),
            None => idea.name.clone(),
        })
        .collect()
}

/// Final judgment over all ideas
///
/// The meeting discussion, when present, comes first and outweighs the
/// per-axis evaluations.
pub fn judge(axes: &[String], ideas: &[Idea], transcript: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are an expert in meeting decision support. Give the most weight to what was \
         said in the meeting and reflect the participants' opinions and how consensus formed.\n\n",
    );

    if let Some(transcript) = transcript {
        prompt.push_str(&format!(
            "[MOST IMPORTANT] Meeting discussion\n{}\n\n\
             The discussion above is the core of the judgment. Analyse which ideas the \
             participants supported and which concerns or endorsements they raised.\n\n",
            transcript
        ));
    }

    prompt.push_str("[Ideas to judge]\n");
    for (i, idea) in ideas.iter().enumerate() {
        prompt.push_str(&format!(
            "{}. **{}** (id: {})\n   Description: {}\n   Evaluations:\n",
            i + 1,
            idea.name,
            idea.id,
            idea.description.as_deref().unwrap_or("none")
        ));
        for axis in axes {
            prompt.push_str(&format!(
                "   - {}: {}\n",
                axis,
                idea.evaluation(axis).unwrap_or("not evaluated")
            ));
        }
    }

    prompt.push_str(&format!(
        "\n[Axes to use]\n{}\n\n\
         [Priorities]\n\
         1. Support and opposition voiced in the discussion (most important)\n\
         2. Degree of agreement among participants\n\
         3. Concrete concerns raised in the discussion\n\
         4. Frequency and intensity of remarks\n\
         5. Individual evaluations per axis\n\n\
         Answer only with JSON in this form:\n\
         {{\n\
           \"winner\": {{\"id\": \"idea id\", \"name\": \"idea name\"}},\n\
           \"ranking\": [{{\"ideaId\": \"idea id\", \"ideaName\": \"idea name\", \"score\": 0-100}}],\n\
           \"axisWinners\": {{\"axis name\": {{\"id\": \"idea id\", \"name\": \"idea name\", \"reason\": \"why\"}}}},\n\
           \"reasoning\": \"explanation citing the discussion\",\n\
           \"transcriptSummary\": \"{}\"\n\
         }}\n",
        numbered(axes),
        if transcript.is_some() {
            "key points of the discussion and how the decision was reached"
        } else {
            ""
        }
    ));

    prompt
}

/// Per-axis evaluations for one idea
pub fn auto_evaluate(
    idea_name: &str,
    description: Option<&str>,
    axes: &[String],
    topic_name: Option<&str>,
    topic_goal: Option<&str>,
) -> String {
    let mut prompt = format!(
        "You are an expert at evaluating ideas. Evaluate the idea below along each axis.\n\n\
         [Topic]: {}\n",
        topic_name.unwrap_or("not set")
    );
    if let Some(goal) = topic_goal {
        prompt.push_str(&format!("[Goal of the discussion]: {}\n", goal));
    }

    prompt.push_str(&format!("\n[Idea]\nName: {}\n", idea_name));
    if let Some(description) = description {
        prompt.push_str(&format!("Description: {}\n", description));
    }

    prompt.push_str(&format!(
        "\n[Axes]\n{}\n\n\
         Write one evaluation per axis:\n\
         1. 50-150 characters, concrete\n\
         2. Relate the idea's characteristics to the axis\n\
         3. Practical and constructive\n\
         4. Mention both strengths and caveats\n\
         5. Keep the topic's goal in mind\n\n\
         Answer with a JSON object mapping each axis name to its evaluation:\n\
         {{\"axis name\": \"evaluation\", ...}}\n",
        numbered(axes)
    ));

    prompt
}

/// First turn of an evaluation dialogue
pub fn chat_opening(idea_name: &str, current_axis: &str, axes: &[String]) -> String {
    format!(
        "You are an expert at evaluating ideas.\n\n\
         [Idea]: {idea}\n\
         [Axis under discussion]: {axis}\n\
         [All axes]: {all}\n\n\
         This is the opening reply of the evaluation. Analyse \"{idea}\" from the \
         perspective of \"{axis}\", present an initial evaluation, briefly explain its \
         basis, and ask the user whether they agree or want changes.\n\n\
         Answer with JSON: {{\"done\": false, \"message\": \"at most 300 characters\"}}\n",
        idea = idea_name,
        axis = current_axis,
        all = axes.join(", ")
    )
}

/// Later turn of an evaluation dialogue
pub fn chat_followup(
    idea_name: &str,
    current_axis: &str,
    axes: &[String],
    messages: &[ChatMessage],
) -> String {
    let user_turns: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == ChatRole::User)
        .map(|m| m.content.as_str())
        .collect();
    let history = user_turns
        .iter()
        .map(|content| format!("User: {}", content))
        .collect::<Vec<_>>()
        .join("\n");
    let latest = user_turns.last().copied().unwrap_or_default();

    format!(
        "You are an expert at evaluating ideas.\n\n\
         [Idea]: {idea}\n\
         [Axis under discussion]: {axis}\n\
         [All axes]: {all}\n\
         [Conversation so far]:\n{history}\n\n\
         [Latest user message]: {latest}\n\n\
         Answer with JSON {{\"done\", \"message\", \"evaluation\", \"ideaSummary\"}}:\n\
         1. done: true when the evaluation on this axis is settled, otherwise false\n\
         2. message: a reply of at most 200 characters\n\
         3. when done, evaluation holds the concise final evaluation\n\
         4. when done, ideaSummary summarises the idea\n\n\
         The evaluation is settled when the user agreed, when a requested change was \
         applied and accepted, when the user signalled they are finished, or after two \
         or more exchanges once the evaluation is firm.\n",
        idea = idea_name,
        axis = current_axis,
        all = axes.join(", "),
        history = history,
        latest = latest
    )
}

fn transcript_block(transcript: Option<&str>) -> String {
    match transcript.filter(|t| !t.trim().is_empty()) {
        Some(t) => format!(
            "[Meeting notes]:\n{}\n\n",
            truncate_chars(t, SUGGESTION_TRANSCRIPT_CHARS)
        ),
        None => String::new(),
    }
}

fn goal_line(goal: Option<&str>) -> String {
    goal.filter(|g| !g.is_empty())
        .map(|g| format!("[Goal of the discussion]: {}\n", g))
        .unwrap_or_default()
}

/// Three new evaluation axes
pub fn suggest_axes(
    topic_name: &str,
    goal: Option<&str>,
    existing_axes: &[String],
    ideas: &[IdeaSketch],
    transcript: Option<&str>,
) -> String {
    format!(
        "You are a decision-support expert. Propose three new evaluation axes for this \
         discussion.\n\n\
         [Topic]: {topic}\n{goal}\
         [Existing axes]:\n{axes}\n\
         [Ideas under consideration]:\n{ideas}\n\n{transcript}\
         The axes must not duplicate existing ones, must suit the topic, be concrete and \
         measurable, reflect the discussion, and help the actual decision.\n\n\
         Answer with a JSON array: [{{\"name\": \"axis name\", \"reason\": \"why, at most 100 characters\"}}]\n",
        topic = topic_name,
        goal = goal_line(goal),
        axes = bulleted(existing_axes, "none yet"),
        ideas = bulleted(&sketch_lines(ideas), "none yet"),
        transcript = transcript_block(transcript)
    )
}

/// Three new ideas
pub fn suggest_ideas(
    topic_name: &str,
    goal: Option<&str>,
    axes: &[String],
    existing_ideas: &[IdeaSketch],
    transcript: Option<&str>,
) -> String {
    format!(
        "You are a decision-support expert. Propose three new ideas for this discussion.\n\n\
         [Topic]: {topic}\n{goal}\
         [Evaluation axes]:\n{axes}\n\
         [Existing ideas]:\n{ideas}\n\n{transcript}\
         The ideas must not duplicate existing ones, must serve the goal, be concrete and \
         actionable, score well on the axes, and reflect the discussion.\n\n\
         Answer with a JSON array: [{{\"name\": \"idea name\", \"description\": \"what it is\", \"reason\": \"why\"}}]\n",
        topic = topic_name,
        goal = goal_line(goal),
        axes = bulleted(axes, "none yet"),
        ideas = bulleted(&sketch_lines(existing_ideas), "none yet"),
        transcript = transcript_block(transcript)
    )
}

/// Speech transcription with speaker labels
pub fn transcription() -> String {
    "Transcribe this audio. If there are several speakers, identify them as far as \
     possible.\n\
     Output format:\n\
     - Return only the transcript\n\
     - Prefix each utterance with a speaker label such as \"Speaker A:\" or \"Speaker B:\"\n\
     - Write [inaudible] for parts that cannot be made out"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn axes(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abcd", 3), "abc...");
        assert_eq!(truncate_chars("日本語です", 2), "日本...");
    }

    #[test]
    fn test_judge_prompt_marks_missing_evaluations() {
        let ideas = vec![Idea {
            id: "a".to_string(),
            name: "Alpha".to_string(),
            description: None,
            evaluations: BTreeMap::from([("cost".to_string(), "cheap".to_string())]),
        }];
        let prompt = judge(&axes(&["cost", "speed"]), &ideas, None);

        assert!(prompt.contains("   - cost: cheap"));
        assert!(prompt.contains("   - speed: not evaluated"));
        assert!(!prompt.contains("Meeting discussion"));
    }

    #[test]
    fn test_judge_prompt_puts_transcript_first() {
        let prompt = judge(&axes(&["cost"]), &[], Some("We all like Alpha."));
        let transcript_at = prompt.find("We all like Alpha.").unwrap();
        let ideas_at = prompt.find("[Ideas to judge]").unwrap();
        assert!(transcript_at < ideas_at);
    }

    #[test]
    fn test_suggest_prompt_truncates_transcript() {
        let transcript = "x".repeat(1500);
        let prompt = suggest_axes("Offsite", None, &[], &[], Some(&transcript));
        assert!(prompt.contains(&format!("{}...", "x".repeat(1000))));
        assert!(!prompt.contains(&"x".repeat(1001)));
    }

    #[test]
    fn test_followup_uses_latest_user_message() {
        let messages = vec![
            ChatMessage {
                role: ChatRole::Assistant,
                content: "Initial take".to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: "Too optimistic".to_string(),
            },
        ];
        let prompt = chat_followup("Alpha", "cost", &axes(&["cost"]), &messages);
        assert!(prompt.contains("User: Too optimistic"));
        assert!(prompt.contains("[Latest user message]: Too optimistic"));
        assert!(!prompt.contains("Initial take"));
    }
}
