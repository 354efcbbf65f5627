use std::borrow::Cow;

use crate::types::{OperationType, canonical_name, strip_interface_suffix};

/// An interface a provider declares, as seen by the introspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: Cow<'static, str>,
    /// Whether the interface extends the operation-type marker.
    pub extends_operation_type: bool,
}

impl InterfaceDescriptor {
    /// Interface declaring an operation type (`ChatInterface`, `TranslateTextInterface`).
    pub fn operation(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            extends_operation_type: true,
        }
    }

    /// Plumbing interface that never produces trigger methods.
    pub fn plain(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            extends_operation_type: false,
        }
    }

    pub fn for_operation(operation_type: &OperationType) -> Self {
        Self::operation(operation_type.interface_name())
    }

    /// Name with the suffix removed, lowercased and without underscores.
    pub fn canonical_key(&self) -> String {
        canonical_name(strip_interface_suffix(&self.name))
    }

    /// Operation type declared by this interface, if it is an operation interface.
    pub fn operation_type(&self) -> Option<OperationType> {
        self.extends_operation_type
            .then(|| OperationType::from_method_name(strip_interface_suffix(&self.name)))
    }
}
