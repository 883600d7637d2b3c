#![forbid(unsafe_code)]

//! Public facade crate.
//!
//! Re-exports the reactive primitives and the hooks layer under one name.

pub use frp_core::{
    Atom, Emitter, EmitterConfig, Observer, PanicPolicy, Property, Subscription, Time, now,
};
pub use frp_hooks::{
    HookError, Instance, InstanceConfig, Ref, RenderCx, use_property, use_property_from_props,
    use_property_from_props_with,
};

pub mod prelude {
    pub use frp_core as core;
    pub use frp_hooks as hooks;

    pub use frp_core::{Property, now};
    pub use frp_hooks::{Instance, RenderCx, use_property, use_property_from_props};
}
