//! Injectable delay capability.
//!
//! The pipeline suspends only at explicit delay points. Production wiring
//! sleeps on a real timer; tests pass [`NoDelay`] so a whole run completes
//! without waiting.

use std::time::Duration;

use async_trait::async_trait;

/// Something that can pause the current task.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {}
}
