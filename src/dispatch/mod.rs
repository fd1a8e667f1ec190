//! Command dispatch: one validated intent in, coordinated collaborator
//! calls and session updates out.

mod dispatcher;

pub use dispatcher::CommandDispatcher;
