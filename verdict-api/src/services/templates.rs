//! Canned text used when the language model is unavailable
//!
//! Axis-specific tables are keyed by well-known axis names; an axis matches
//! a table when either name contains the other, ignoring case.

use verdict_common::models::{SuggestedAxis, SuggestedIdea};

/// Initial evaluation with its justification, index-aligned
pub struct AxisTemplate {
    pub axis: &'static str,
    pub evaluations: [&'static str; 3],
    pub reasonings: [&'static str; 3],
}

pub static CHAT_TEMPLATES: [AxisTemplate; 4] = [
    AxisTemplate {
        axis: "cost",
        evaluations: ["Low cost", "Moderate cost", "High cost but worth it"],
        reasonings: [
            "Existing infrastructure and tools can be reused, keeping extra investment minimal",
            "Some upfront investment is needed, but a long-term return is expected",
            "The upfront investment is large, but justified by the value it delivers",
        ],
    },
    AxisTemplate {
        axis: "feasibility",
        evaluations: ["Easy to realise", "Feasible", "Difficult but possible"],
        reasonings: [
            "Existing technology and resources cover it with no major technical hurdles",
            "There are some technical issues, but planning and resourcing make it feasible",
            "It needs advanced skills, but a staged approach makes it achievable",
        ],
    },
    AxisTemplate {
        axis: "impact",
        evaluations: ["Large impact", "Moderate impact", "Limited but useful"],
        reasonings: [
            "Broad improvements are expected with a large effect across the organisation",
            "Clear improvements are expected in a specific area, worth the investment",
            "The effect is limited, but reliable in its area and a base for later work",
        ],
    },
    AxisTemplate {
        axis: "implementation difficulty",
        evaluations: ["Easy to implement", "Standard implementation", "Requires advanced implementation"],
        reasonings: [
            "Integrates easily with existing systems using a standard process",
            "Common techniques suffice, with sound design and quality control",
            "Needs strong skills and careful planning, but can be delivered in stages",
        ],
    },
];

/// Generic evaluations for axes without a table
pub const DEFAULT_EVALUATIONS: [&str; 3] = ["Good", "Average", "Needs improvement"];

/// Generic justifications, index-aligned with [`DEFAULT_EVALUATIONS`]
pub fn default_reasonings(idea_name: &str, axis: &str) -> [String; 3] {
    [
        format!("Analysed from the perspective of {}, {} comes out positive", axis, idea_name),
        format!("From the perspective of {}, {} sits at a standard level", axis, idea_name),
        format!("From the perspective of {}, {} has room for improvement", axis, idea_name),
    ]
}

/// Follow-up questions; chosen by user message count
pub fn continuation_messages(axis: &str) -> [String; 2] {
    [
        format!(
            "Thank you for your input. Is there anything else to consider for the {} evaluation?",
            axis
        ),
        "I see. I will adjust the evaluation to reflect that. Any other comments?".to_string(),
    ]
}

pub fn chat_opening_message(idea_name: &str, axis: &str, evaluation: &str, reasoning: &str) -> String {
    format!(
        "Here is an initial AI evaluation of \"{idea}\" on {axis}.\n\n\
         [Initial evaluation]: {evaluation}\n\n\
         [Basis]: {reasoning}\n\n\
         What do you think? Let me know if anything should change.",
        idea = idea_name,
        axis = axis,
        evaluation = evaluation,
        reasoning = reasoning
    )
}

pub fn chat_closing_message(axis: &str) -> String {
    format!(
        "Thank you for your views on {}. I will wrap up the evaluation.",
        axis
    )
}

pub fn chat_idea_summary(idea_name: &str, axis: &str) -> String {
    format!("{} was considered from the perspective of {}.", idea_name, axis)
}

pub fn chat_clarifying_question(idea_name: &str, axis: &str) -> String {
    format!("Could you tell me more about {} of \"{}\"?", axis, idea_name)
}

/// One-line evaluations per axis for auto-evaluation
pub struct EvaluationTemplate {
    pub axis: &'static str,
    pub lines: [&'static str; 3],
}

/// `{idea}` is replaced with the idea name
pub static AUTO_EVALUATION_TEMPLATES: [EvaluationTemplate; 3] = [
    EvaluationTemplate {
        axis: "feasibility",
        lines: [
            "\"{idea}\" is technically feasible but needs proper planning and execution.",
            "\"{idea}\" needs time and resources, but a staged approach makes it achievable.",
            "\"{idea}\" is rated highly feasible with current technology.",
        ],
    },
    EvaluationTemplate {
        axis: "cost efficiency",
        lines: [
            "\"{idea}\" needs upfront investment but promises long-term savings.",
            "\"{idea}\" offers good value for money with a visible return.",
            "\"{idea}\" needs a careful cost-benefit review but delivers fair value.",
        ],
    },
    EvaluationTemplate {
        axis: "implementation difficulty",
        lines: [
            "\"{idea}\" is of standard difficulty and manageable with the right skills.",
            "\"{idea}\" includes technical challenges but can be built with a planned approach.",
            "\"{idea}\" is complex to implement but achievable through staged development.",
        ],
    },
];

/// Case-insensitive containment in either direction
pub fn names_overlap(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

pub fn find_chat_template(axis: &str) -> Option<&'static AxisTemplate> {
    CHAT_TEMPLATES.iter().find(|t| names_overlap(axis, t.axis))
}

/// Auto-evaluation lines for `axis`; feasibility when nothing matches
pub fn auto_evaluation_lines(axis: &str) -> &'static [&'static str; 3] {
    AUTO_EVALUATION_TEMPLATES
        .iter()
        .find(|t| names_overlap(axis, t.axis))
        .map(|t| &t.lines)
        .unwrap_or(&AUTO_EVALUATION_TEMPLATES[0].lines)
}

const AXIS_CATALOGUE: [(&str, &str); 8] = [
    ("Cost efficiency", "Weighs value for money to find the best option within budget"),
    ("Feasibility", "Judges whether it can be carried out technically and organisationally"),
    ("Impact", "Assesses the size of the expected outcome"),
    ("Low risk", "Evaluates potential risks and problems up front"),
    ("Urgency", "Accounts for priority and time constraints"),
    ("Sustainability", "Assesses long-term effect and continuity"),
    ("Usability", "Puts ease of use and user satisfaction first"),
    ("Scalability", "Assesses readiness for future growth and change"),
];

const IDEA_CATALOGUE: [(&str, &str, &str); 5] = [
    (
        "Process improvement",
        "Review current workflows and make them more efficient",
        "Optimising what already exists gives dependable results",
    ),
    (
        "Technology adoption",
        "Solve the problem by introducing new technology or tools",
        "Technical innovation can bring a large improvement",
    ),
    (
        "Organisational change",
        "Change team structure or ways of working to address the issue",
        "Reassigning people allows a flexible response",
    ),
    (
        "External partnership",
        "Work with outside partners or specialist services",
        "Uses outside expertise and resources to deliver efficiently",
    ),
    (
        "Phased rollout",
        "Roll out a large change in stages to reduce risk",
        "A realistic approach that reaches the goal while containing risk",
    ),
];

pub fn axis_catalogue() -> Vec<SuggestedAxis> {
    AXIS_CATALOGUE
        .iter()
        .map(|(name, reason)| SuggestedAxis {
            name: name.to_string(),
            reason: reason.to_string(),
        })
        .collect()
}

pub fn idea_catalogue() -> Vec<SuggestedIdea> {
    IDEA_CATALOGUE
        .iter()
        .map(|(name, description, reason)| SuggestedIdea {
            name: name.to_string(),
            description: description.to_string(),
            reason: reason.to_string(),
        })
        .collect()
}
