use serde::Serialize;
use serde_json::Value as JsonValue;

/// Inertia-style page object: the front end renders `component` with `props`.
#[derive(Debug, Serialize)]
pub struct PageDto {
    pub component: String,
    pub props: JsonValue,
    pub url: String,
}

impl PageDto {
    pub fn new(component: impl Into<String>, props: JsonValue, url: impl Into<String>) -> Self {
        PageDto {
            component: component.into(),
            props,
            url: url.into(),
        }
    }
}
