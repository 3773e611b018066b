//! Voice command vocabulary
//!
//! A transcript counts as a glucose request when it contains one of these
//! phrases after lowercasing and dropping punctuation.

const GLUCOSE_PHRASES: &[&str] = &[
    // en
    "glucose",
    "blood sugar",
    "sugar level",
    "show sugar",
    // es
    "glucosa",
    "azucar",
    "azúcar",
    // fr
    "glycemie",
    "glycémie",
    // de
    "blutzucker",
    "zucker",
    // pt
    "glicose",
    "glicemia",
];

fn normalize(transcript: &str) -> String {
    transcript
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a voice transcript asks for the current reading
pub fn is_glucose_request(transcript: &str) -> bool {
    let text = normalize(transcript);
    !text.is_empty() && GLUCOSE_PHRASES.iter().any(|phrase| text.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multilingual_phrases() {
        assert!(is_glucose_request("Hey, show my GLUCOSE please!"));
        assert!(is_glucose_request("¿Cuál es mi azúcar?"));
        assert!(is_glucose_request("Mostrar glucosa"));
        assert!(is_glucose_request("quelle est ma glycémie"));
        assert!(is_glucose_request("Blutzucker anzeigen"));
        assert!(is_glucose_request("qual é a minha glicemia"));
    }

    #[test]
    fn test_unrelated_speech_is_ignored() {
        assert!(!is_glucose_request("what's the weather like"));
        assert!(!is_glucose_request("   "));
    }
}
