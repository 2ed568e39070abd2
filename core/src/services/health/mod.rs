//! Dependency probes reported by the health endpoint

use async_trait::async_trait;

/// A single dependency check, such as the database
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Short name shown in the health report
    fn name(&self) -> &'static str;

    /// `Err` carries a message safe to expose publicly
    async fn check(&self) -> Result<(), String>;
}

/// Probe that always passes, for in-memory deployments
pub struct StaticProbe {
    name: &'static str,
}

impl StaticProbe {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl HealthProbe for StaticProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn check(&self) -> Result<(), String> {
        Ok(())
    }
}
