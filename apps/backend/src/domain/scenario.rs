//! Scenario templates: the persona the AI plays and the secret it guards.
//!
//! A template is chosen at random when a session is created; the secret slot
//! is filled with a randomly drawn codeword so two sessions from the same
//! template never share a secret.

use rand::prelude::IndexedRandom;

pub struct ScenarioTemplate {
    pub name: &'static str,
    pub character: &'static str,
    pub secret_template: &'static str,
}

/// Built-in scenario set. Content is intentionally short: persona quality is
/// out of scope, but every session needs a concrete character and secret.
pub const TEMPLATES: &[ScenarioTemplate] = &[
    ScenarioTemplate {
        name: "night-guard",
        character: "A suspicious night-shift guard at a research facility who answers curtly \
                    and distrusts strangers.",
        secret_template: "The vault passphrase is {secret}",
    },
    ScenarioTemplate {
        name: "teen-gossip",
        character: "A teenager who loves gossiping but was sworn to keep one friend's secret.",
        secret_template: "The secret crush codename is {secret}",
    },
    ScenarioTemplate {
        name: "butler",
        character: "A loyal old butler of a manor, polite to a fault, protective of the family.",
        secret_template: "The family safe combination is {secret}",
    },
    ScenarioTemplate {
        name: "sysadmin",
        character: "A grumpy sysadmin on call at 3am who wants the conversation to end.",
        secret_template: "The root password is {secret}",
    },
];

const CODEWORDS: &[&str] = &[
    "blue42", "ember-fox", "quartz99", "velvet-owl", "delta-rain", "copper7", "lilac-moth",
    "granite3", "saffron-elk", "nimbus88",
];

/// Render a random (character, secret) pair for a new session.
pub fn generate() -> (String, String) {
    let mut rng = rand::rng();
    // Both slices are non-empty consts, so choose() cannot return None.
    let template = TEMPLATES.choose(&mut rng).unwrap_or(&TEMPLATES[0]);
    let codeword = CODEWORDS.choose(&mut rng).unwrap_or(&CODEWORDS[0]);
    let secret = template.secret_template.replace("{secret}", codeword);
    (template.character.to_string(), secret)
}
