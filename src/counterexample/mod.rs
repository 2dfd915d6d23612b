//! C6: shift/reduce and reduce/reduce counterexample search.
//!
//! This is the largest single component, roughly half the core's relative
//! size, and is split across submodules
//! the way `hermes_gen/counterexample/` splits its Python equivalent:
//! `stateitem` (the search substrate), `configuration` (search-frontier
//! state and the priority queue), `derivation` (the result shape),
//! `costs` (complexity weights and the time budget), `conflict` (pairing a
//! table conflict with its rendered counterexample), and `generator` (the
//! search itself).

pub mod conflict;
pub mod configuration;
pub mod costs;
pub mod derivation;
pub mod generator;
pub mod stateitem;

pub use conflict::CounterExample;
pub use generator::generate_all;
