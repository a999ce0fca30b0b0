use crate::entity::EntityId;

/// Alias for `Result<T, LjError>`.
pub type LjResult<T> = Result<T, LjError>;

/// Errors that can occur when manipulating a scene.
#[derive(Debug, thiserror::Error)]
pub enum LjError {
    /// The requested entity ID does not exist in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// An entity with the same ID is already spawned.
    #[error("entity already spawned: {0}")]
    DuplicateId(EntityId),

    /// The entity exists but lacks a component the operation needs.
    #[error("entity {entity} has no {component} component")]
    MissingComponent {
        /// The entity that was inspected.
        entity: EntityId,
        /// Name of the missing component.
        component: &'static str,
    },

    /// A generic validation error with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}
