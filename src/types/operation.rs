//! Operation types and the name canonicalization used to derive them.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A named kind of model invocation (`chat`, `embeddings`, ...).
///
/// Always stored in snake_case. Built-in kinds are available as constants;
/// providers may declare additional kinds through their interface descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationType(Cow<'static, str>);

impl OperationType {
    pub const CHAT: Self = Self(Cow::Borrowed("chat"));
    pub const EMBEDDINGS: Self = Self(Cow::Borrowed("embeddings"));
    pub const IMAGE_CLASSIFICATION: Self = Self(Cow::Borrowed("image_classification"));
    pub const SPEECH_TO_TEXT: Self = Self(Cow::Borrowed("speech_to_text"));
    pub const TEXT_TO_SPEECH: Self = Self(Cow::Borrowed("text_to_speech"));
    pub const MODERATION: Self = Self(Cow::Borrowed("moderation"));

    /// Built-in operation types, in declaration order.
    pub const BUILTIN: [Self; 6] = [
        Self::CHAT,
        Self::EMBEDDINGS,
        Self::IMAGE_CLASSIFICATION,
        Self::SPEECH_TO_TEXT,
        Self::TEXT_TO_SPEECH,
        Self::MODERATION,
    ];

    /// Derive an operation type from a trigger method name (`speechToText` -> `speech_to_text`).
    pub fn from_method_name(method: &str) -> Self {
        Self(Cow::Owned(camel_to_snake(method)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_builtin(&self) -> bool {
        Self::BUILTIN.iter().any(|op| op == self)
    }

    /// Name of the capability interface declaring this operation (`ChatInterface`).
    pub fn interface_name(&self) -> String {
        let mut name = String::with_capacity(self.0.len() + 9);
        for part in self.0.split('_').filter(|p| !p.is_empty()) {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
        name.push_str("Interface");
        name
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationType {
    fn from(value: &str) -> Self {
        Self::from_method_name(value)
    }
}

impl From<String> for OperationType {
    fn from(value: String) -> Self {
        Self::from_method_name(&value)
    }
}

impl AsRef<str> for OperationType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert camelCase (or PascalCase) to snake_case.
///
/// An underscore is inserted before every uppercase letter that follows a
/// letter or digit, and between a lowercase letter and a digit.
pub fn camel_to_snake(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev: Option<char> = None;
    for c in input.chars() {
        if let Some(p) = prev {
            let upper_boundary = c.is_uppercase() && p.is_alphanumeric();
            let digit_boundary = c.is_ascii_digit() && p.is_lowercase();
            if upper_boundary || digit_boundary {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
        prev = Some(c);
    }
    out
}

/// Case-normalized form used when comparing method and interface names.
pub fn canonical_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strip the generic `Interface` (or Rust-style `Capability`) suffix from an interface name.
pub fn strip_interface_suffix(name: &str) -> &str {
    name.strip_suffix("Interface")
        .or_else(|| name.strip_suffix("Capability"))
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_to_snake_handles_common_shapes() {
        assert_eq!(camel_to_snake("chat"), "chat");
        assert_eq!(camel_to_snake("speechToText"), "speech_to_text");
        assert_eq!(camel_to_snake("ImageClassification"), "image_classification");
        assert_eq!(camel_to_snake("textToImage2"), "text_to_image_2");
        assert_eq!(camel_to_snake("speech_to_text"), "speech_to_text");
    }

    #[test]
    fn interface_name_round_trips_through_canonical_form() {
        let op = OperationType::SPEECH_TO_TEXT;
        assert_eq!(op.interface_name(), "SpeechToTextInterface");
        assert_eq!(
            canonical_name(strip_interface_suffix(&op.interface_name())),
            canonical_name("speechToText")
        );
    }

    #[test]
    fn builtin_constants_are_snake_case() {
        for op in OperationType::BUILTIN {
            assert_eq!(camel_to_snake(op.as_str()), op.as_str());
            assert!(op.is_builtin());
        }
        assert!(!OperationType::from("translateText").is_builtin());
    }
}
