use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Army not found: {0:?}")]
    ArmyNotFound(crate::core::types::ArmyId),

    #[error("Army already engaged: {0:?}")]
    ArmyAlreadyEngaged(crate::core::types::ArmyId),

    #[error("No eligible attackers for stack combat at {0:?}")]
    NoAttackers(crate::hex::HexCoord),

    #[error("Combat not found: {0:?}")]
    CombatNotFound(crate::core::types::CombatId),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
