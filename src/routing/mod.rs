pub mod resolver;

pub use resolver::{ResolveError, RoutingHints, TerminalResolver};
