//! Clients of the character and narration services.
//!
//! Calls are blocking and run on the IO task pool; systems poll the
//! resulting tasks once per frame.

pub mod http;

pub use http::HttpCreatureService;

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};
use protocol::{
    BattleEvent, CharacterDefinition, FusionRequest, GenerateRequest, NarrationRequest,
    PayloadError,
};
use thiserror::Error;

use crate::character::CharacterFactory;
use crate::session::PreparedCharacter;
use crate::settings::ServiceSettings;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service answered HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("service reported: {0}")]
    Remote(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Character generation, fusion and battle narration.
pub trait CreatureService: Send + Sync + 'static {
    fn generate(&self, request: &GenerateRequest) -> Result<CharacterDefinition, ServiceError>;
    fn fuse(&self, request: &FusionRequest) -> Result<CharacterDefinition, ServiceError>;
    fn narrate(&self, request: &NarrationRequest) -> Result<Vec<BattleEvent>, ServiceError>;
}

#[derive(Resource, Clone)]
pub struct Services(pub Arc<dyn CreatureService>);

pub type CharacterTask = Task<Result<PreparedCharacter, ServiceError>>;
pub type NarrationTask = Task<Result<Vec<BattleEvent>, ServiceError>>;

/// Requests in flight. One of each kind at a time.
#[derive(Resource, Default)]
pub struct ServiceTasks {
    pub generate: Option<CharacterTask>,
    pub fusion: Option<CharacterTask>,
    pub narration: Option<NarrationTask>,
}

impl Services {
    /// HTTP client for the configured service, or the offline stub when the
    /// client cannot be built.
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        match HttpCreatureService::new(settings) {
            Ok(service) => {
                info!("Creature service at {}", settings.base_url);
                Self(Arc::new(service))
            }
            Err(error) => {
                warn!("Creature service unavailable, running offline: {error}");
                Self(Arc::new(OfflineService))
            }
        }
    }

    /// Generates and compiles a character off the main thread.
    pub fn spawn_generate(&self, prompt: String) -> CharacterTask {
        let service = self.0.clone();
        IoTaskPool::get().spawn(async move {
            let definition = service.generate(&GenerateRequest { prompt })?;
            let compiled = CharacterFactory::compile(&definition);
            Ok(PreparedCharacter {
                definition,
                compiled,
            })
        })
    }

    pub fn spawn_fusion(&self, request: FusionRequest) -> CharacterTask {
        let service = self.0.clone();
        IoTaskPool::get().spawn(async move {
            let definition = service.fuse(&request)?;
            let compiled = CharacterFactory::compile(&definition);
            Ok(PreparedCharacter {
                definition,
                compiled,
            })
        })
    }

    pub fn spawn_narration(&self, request: NarrationRequest) -> NarrationTask {
        let service = self.0.clone();
        IoTaskPool::get().spawn(async move { service.narrate(&request) })
    }
}

/// Takes the task's output once it has finished, emptying the slot.
pub fn poll_task<T>(slot: &mut Option<Task<T>>) -> Option<T> {
    let task = slot.as_mut()?;
    let output = block_on(future::poll_once(task))?;
    *slot = None;
    Some(output)
}

/// Used by offline builds and tests: every call fails.
pub struct OfflineService;

impl CreatureService for OfflineService {
    fn generate(&self, _: &GenerateRequest) -> Result<CharacterDefinition, ServiceError> {
        Err(ServiceError::Remote("character service is offline".to_string()))
    }

    fn fuse(&self, _: &FusionRequest) -> Result<CharacterDefinition, ServiceError> {
        Err(ServiceError::Remote("fusion service is offline".to_string()))
    }

    fn narrate(&self, _: &NarrationRequest) -> Result<Vec<BattleEvent>, ServiceError> {
        Err(ServiceError::Remote("narration service is offline".to_string()))
    }
}
