use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// Borrowed view of process state handed to lifecycle hooks
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A schema change owned by a module, applied once and recorded by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A mountable unit of the application.
///
/// Startup runs, in order: every module's migrations, `init`, `start`, then the
/// HTTP server serves `routes`. Shutdown calls `stop` in reverse registration
/// order.
#[async_trait]
pub trait Module: Sync + Send {
    /// Stable identifier, also the path segment routes are mounted under
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes relative to `{base_path}/{name}`
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the mount point and
    /// `components.schemas`
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Ordered by id when collected
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
