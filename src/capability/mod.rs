//! Capability introspection
//!
//! Decides which provider methods are trigger methods (real backend
//! invocations) and which operation type each one maps to.
//!
//! A method is a trigger when the provider declares an interface whose name,
//! with the `Interface`/`Capability` suffix removed, equals the method name
//! under case-insensitive comparison, and that interface extends the
//! operation-type marker. Tables are computed once per provider type and
//! shared through a frozen [`CapabilityRegistry`].

mod descriptor;
mod introspector;
mod registry;

pub use descriptor::InterfaceDescriptor;
pub use introspector::{CapabilityTable, is_trigger_method};
pub use registry::{
    CapabilityRegistry, CapabilityRegistryBuilder, global_registry, install_global_registry,
};
