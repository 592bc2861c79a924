use anyhow::Result;

use crate::domain::ModelEndpoint;

use super::super::Container;

pub struct ModelsController<'a> {
    container: &'a Container,
}

impl<'a> ModelsController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn list(&self) -> Result<String> {
        Ok(self.format_chain(self.container.endpoints()))
    }

    fn format_chain(&self, endpoints: &[ModelEndpoint]) -> String {
        let mut output = String::from("Fallback chain (tried in order):\n\n");

        for (i, endpoint) in endpoints.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, endpoint.model_id()));
            output.push_str(&format!("     URL: {}\n", endpoint.url()));
        }

        let key_status = if self.container.has_api_key() {
            "set"
        } else {
            "missing"
        };
        let dispatcher = if self.container.mock() { "mock" } else { "gemini" };

        output.push_str(&format!(
            "\nAPI key:    {}\nDispatcher: {}\nOverlap:    {}",
            key_status,
            dispatcher,
            self.container.overlap_policy().as_str()
        ));
        output
    }
}
