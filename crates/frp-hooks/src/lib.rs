#![forbid(unsafe_code)]

//! Hooks: render/commit lifecycle and the props → property bridge.
//!
//! # Role in the workspace
//! `frp-hooks` is the UI-binding layer on top of `frp-core`. It owns
//! per-instance storage ([`Instance`]) and exposes it to stateless render
//! functions through [`RenderCx`] hooks, then builds two composite hooks on
//! top:
//!
//! - [`use_property_from_props`]: turns a value re-supplied on every render
//!   into one stable [`Property`](frp_core::Property) that notifies once per
//!   committed change and never on mount.
//! - [`use_property`]: subscribes a consumer instance to a property and
//!   returns the value to display.
//!
//! # Lifecycle
//!
//! ```text
//! parent.render(value) ─► cell = value, property memoized, effect queued
//! child.render(&property) ─► reads property.get()
//! child.commit() ─► subscribes
//! parent.commit() ─► first time: mark mounted; later: emitter.next(now())
//!                      └─► child flagged for re-render
//! ```
//!
//! Everything is single-threaded and synchronous; the caller drives render
//! and commit.

pub mod cell;
pub mod consumer;
pub mod deps;
pub mod error;
pub mod instance;
pub mod props;

pub use cell::Ref;
pub use consumer::use_property;
pub use deps::{changed_always, changed_by_eq};
pub use error::HookError;
pub use instance::{Cleanup, CommitReport, Instance, InstanceConfig, RenderCx, StateSetter};
pub use props::{MountState, use_property_from_props, use_property_from_props_with};
