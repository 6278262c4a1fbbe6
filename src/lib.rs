pub mod cli;
pub mod environment;
pub mod error;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod system;
pub mod tokenizer;

use environment::ScopeStack;
use error::ScriptError;
use runtime::Value;
use system::OutputSink;

/// Parses and runs `source` against `env`. Syntax errors are reported to
/// `system` the same way evaluation errors are.
pub fn run(
    source: &str,
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    match parser::parse_str(source) {
        Ok(module) => runtime::interpret(&module, env, system),
        Err(err) => {
            system.fail(err.clone());
            Err(err)
        }
    }
}
