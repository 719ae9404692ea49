// Hardware side: the reactive peer. Single-threaded and strictly
// sequential; the Simulator is the pacemaker, so every read may block
// indefinitely.

pub mod responder;
