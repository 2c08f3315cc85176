// library crate for ruleop
// exposes the operator engine plus the config and CLI layers used by the binary

pub mod cli;
pub mod config;
pub mod op;
pub mod rule;
