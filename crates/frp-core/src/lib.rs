#![forbid(unsafe_code)]

//! Core: reactive primitives for props-driven UI state.
//!
//! # Role in the workspace
//! `frp-core` supplies the two leaf abstractions every higher layer builds on:
//!
//! - [`Emitter`]: a synchronous, unbuffered, multi-subscriber push channel
//!   that carries only an opaque [`Time`] token ("something may have
//!   changed, re-read now").
//! - [`Property`]: a pure pull accessor (`get`) paired with the subscribe
//!   capability of some emitter, behind one cheap-clone handle with a stable
//!   identity.
//!
//! [`Atom`] is the settable property built from the two, and [`now`]
//! produces the event tokens passed to [`Emitter::next`].
//!
//! # Architecture
//!
//! Everything is single-threaded: shared state lives in `Rc<RefCell<..>>`,
//! observers are stored as `Rc<dyn Observer<Time>>`, and subscriptions hold
//! only a `Weak` back-reference so they never keep an emitter alive.
//!
//! # Invariants
//!
//! 1. `Emitter::next` calls every observer registered when the pass started
//!    exactly once, skipping only those unsubscribed earlier in that pass.
//! 2. Events are never buffered; emitting with no subscribers drops them.
//! 3. `Property::get` never notifies and never mutates channel state.
//! 4. Whatever a property's accessor reads is updated before its emitter
//!    fires ("write before notify").

pub mod atom;
pub mod emitter;
pub mod observer;
pub mod property;
pub mod time;

pub use atom::Atom;
pub use emitter::{Emitter, EmitterConfig, PanicPolicy};
pub use observer::{Observer, Subscription};
pub use property::Property;
pub use time::{Time, now};
