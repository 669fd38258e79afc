use thiserror::Error;

/// Errors surfaced by the diff engine and the snapshot loader.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The dependency-ordered emitter completed a full pass without emitting
    /// anything while work was still pending. The listed identities form at
    /// least one dependency cycle.
    #[error("cannot resolve dependency ordering; unresolved objects: {}", pending.join(", "))]
    DependencyCycle { pending: Vec<String> },

    /// Destructive statements were generated while the safety flag was on.
    #[error("refusing to render destructive statements while safety is enabled: {}", statements.join(" | "))]
    UnsafeChange { statements: Vec<String> },

    /// The snapshot violated the introspection contract (malformed input,
    /// duplicate identities). Never produced by the diff engine itself.
    #[error("schema introspection failed: {0}")]
    Introspection(String),
}
