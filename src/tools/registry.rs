//! Tool registry: explicit name-to-handler dispatch.

use std::collections::HashMap;

use super::schema::ToolDefinition;

/// Registry mapping tool ids to their definitions.
///
/// The tool set is fixed at startup; duplicate registration is a programming
/// error and panics.
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Panics if a tool with the same ID already exists.
    pub fn register(&mut self, tool: ToolDefinition) {
        if self.tools.contains_key(&tool.tool_id) {
            panic!("duplicate tool: {}", tool.tool_id);
        }
        self.tools.insert(tool.tool_id.clone(), tool);
    }

    /// Look up a tool by id.
    pub fn lookup(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.get(tool_id)
    }

    /// Returns the sorted list of registered tool IDs.
    pub fn tool_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        ids.sort();
        ids
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
