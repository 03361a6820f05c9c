use super::context::ExecutionContext;
use super::executor::{Executor, Outcome};
use super::response::{Entity, Response};
use crate::metadata::PayloadType;

pub const OPTIONS_EXECUTOR_NAME: &str = "options";

/// Answers `OPTIONS` with the resource descriptor and an `Allow` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsExecutor;

impl Executor for OptionsExecutor {
    fn execute(&self, ctx: &mut ExecutionContext) -> anyhow::Result<Outcome> {
        let resource = ctx.resource();
        let descriptor = serde_json::to_value(resource.describe())?;
        let allow = resource.allowed_methods().join(", ");
        Ok(Outcome::Response(
            Response::new(200, Entity::value(PayloadType::any(), descriptor)).with_header("Allow", allow),
        ))
    }
}
