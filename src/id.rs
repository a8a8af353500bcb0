use uuid::Uuid;

/// Produces collision-resistant identifiers for new states.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random v4 UUID rendered as 32 lowercase hex digits, no hyphens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl IdGenerator for UuidV4Generator {
    fn generate(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}
