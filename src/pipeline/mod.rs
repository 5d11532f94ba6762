//! Pure, deterministic pipeline stages. Everything here is CPU-only and
//! side-effect free; the turn handler wires the stages together.

pub mod candidates;
pub mod decision;
pub mod explain;
pub mod free_text;
pub mod interpret;
pub mod normalize;
pub mod safety;
pub mod selector;
pub mod specialty;
pub mod stop;
