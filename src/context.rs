use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::engine::DEFAULT_BASE_URL;

/// A named execution-service endpoint the user can switch between, e.g. a
/// local sandbox and the shared staging service.
#[derive(Serialize, Deserialize)]
pub struct Context {
    pub name: ContextName,
    pub gateway: GatewayParams,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayParams {
    pub base_url: String,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContextName(String);

impl Context {
    /// The context the current-context pointer names, or a default pointed at
    /// the local sandbox address when the user never configured one.
    pub fn current_or_default() -> Result<Context, crate::Error> {
        let Ok(name) = ContextName::current() else {
            return Ok(Context {
                name: "default".to_string().into(),
                gateway: GatewayParams {
                    base_url: DEFAULT_BASE_URL.to_string(),
                },
            });
        };

        crate::cache::read(&name)
    }
}

impl ContextName {
    /// Reads the current-context pointer.
    pub fn current() -> Result<ContextName, crate::Error> {
        crate::cache::read(&crate::cache::SharedCacheKey::for_current_context())
    }
}

impl From<String> for ContextName {
    fn from(value: String) -> Self {
        ContextName(value)
    }
}

impl From<ContextName> for String {
    fn from(value: ContextName) -> Self {
        value.0
    }
}

impl Display for ContextName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for GatewayParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.base_url)
    }
}
