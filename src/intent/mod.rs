//! Intent classification.
//!
//! Messages are tested against an ordered rule list; the first rule whose
//! pattern matches anywhere in the text (case-insensitive) wins. Protocol
//! rules come before tool rules, and a message no rule matches is left for the
//! generative AI fallback.

mod rules;

pub use rules::Target;

use crate::models::{CapabilityDescriptor, Params};
use crate::tools::CapabilityRegistry;
use rules::{default_rules, Rule};

/// The classifier's decision for one message
#[derive(Debug, Clone, PartialEq)]
pub struct IntentMatch {
    pub capability: CapabilityDescriptor,
    pub target: Target,
    pub params: Params,
}

impl IntentMatch {
    /// Protocol operation to run, for protocol intents
    pub fn operation(&self) -> Option<&'static str> {
        match self.target {
            Target::Protocol { operation, .. } => Some(operation),
            Target::Tool(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct IntentClassifier {
    rules: Vec<(Rule, CapabilityDescriptor)>,
}

impl IntentClassifier {
    /// Build the rule list, keeping only rules whose capability is registered
    pub fn new(registry: &CapabilityRegistry) -> Self {
        let rules = default_rules()
            .into_iter()
            .filter_map(|rule| {
                let descriptor = registry.descriptor(rule.target.name());
                if descriptor.is_none() {
                    tracing::debug!("Skipping intent rule '{}': not registered", rule.name);
                }
                descriptor.map(|d| (rule, d))
            })
            .collect();

        Self { rules }
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(rule, _)| rule.name).collect()
    }

    /// First matching rule wins; `None` means "ask the AI"
    pub fn classify(&self, text: &str) -> Option<IntentMatch> {
        self.rules.iter().find_map(|(rule, descriptor)| {
            rule.pattern.captures(text).map(|caps| IntentMatch {
                capability: descriptor.clone(),
                target: rule.target,
                params: (rule.extract)(&caps, text),
            })
        })
    }
}
