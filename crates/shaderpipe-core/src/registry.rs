//! Tool registry.
//!
//! Tools are registered once at startup; afterwards the registry is shared
//! read-only as `Arc<ToolRegistry>` by every pipeline run.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::parameter::bind;
use crate::tool::{ShaderTool, ToolDescriptor};

/// Name → tool lookup.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ShaderTool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool.
    ///
    /// The descriptor is validated first; a duplicate name is rejected rather
    /// than replacing the existing tool.
    pub fn register<T: ShaderTool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a tool from an Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn ShaderTool>) -> Result<()> {
        let descriptor = tool.descriptor();
        validate_descriptor(descriptor)?;

        if self.tools.contains_key(&descriptor.name) {
            return Err(PipelineError::InvalidToolDefinition(format!(
                "tool '{}' is already registered",
                descriptor.name
            )));
        }

        debug!(
            tool = %descriptor.name,
            inputs = ?descriptor.input_languages,
            outputs = ?descriptor.output_languages,
            "Registered tool"
        );
        self.tools.insert(descriptor.name.clone(), tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ShaderTool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// All descriptors, sorted by tool name.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        let mut descriptors: Vec<&ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    /// Get the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

fn validate_descriptor(descriptor: &ToolDescriptor) -> Result<()> {
    let invalid = |msg: String| Err(PipelineError::InvalidToolDefinition(msg));

    if descriptor.name.trim().is_empty() {
        return invalid("tool name is required".into());
    }
    if descriptor.input_languages.is_empty() {
        return invalid(format!(
            "tool '{}' must accept at least one input language",
            descriptor.name
        ));
    }

    let mut seen = HashSet::new();
    for param in &descriptor.parameters {
        if !seen.insert(param.name.as_str()) {
            return invalid(format!(
                "tool '{}' declares parameter '{}' twice",
                descriptor.name, param.name
            ));
        }
        if let Some(choices) = param.output_languages()
            && let Some(unknown) = choices
                .iter()
                .find(|c| !descriptor.output_languages.contains(c))
        {
            return invalid(format!(
                "tool '{}' can select output language '{}' which it does not declare",
                descriptor.name, unknown
            ));
        }
    }

    if let Err(e) = bind(&descriptor.parameters, &HashMap::new()) {
        return invalid(format!("tool '{}' has a bad default: {}", descriptor.name, e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ParameterSpec;
    use crate::tool::MockTool;

    #[test]
    fn test_registry_empty() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = ToolRegistry::new();
        registry
            .register(MockTool::new("fxc", &["HLSL"], Some("DXBC")))
            .unwrap();

        assert!(registry.contains("fxc"));
        assert!(!registry.contains("dxc"));
        assert_eq!(registry.len(), 1);

        let tool = registry.get("fxc").unwrap();
        assert_eq!(tool.name(), "fxc");
        assert!(tool.descriptor().accepts("HLSL"));
    }

    #[test]
    fn test_registry_names_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("mali", &["SPIR-V"], None)).unwrap();
        registry.register(MockTool::new("dxc", &["HLSL"], Some("SPIR-V"))).unwrap();
        registry.register(MockTool::new("glslang", &["GLSL"], Some("SPIR-V"))).unwrap();

        assert_eq!(registry.names(), vec!["dxc", "glslang", "mali"]);
        let names: Vec<&str> = registry.descriptors().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["dxc", "glslang", "mali"]);
    }

    #[test]
    fn test_get_missing_tool() {
        let registry = ToolRegistry::new();
        assert!(registry.get("nope").is_none());
        assert!(!registry.contains("nope"));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("fxc", &["HLSL"], Some("DXBC"))).unwrap();
        let err = registry
            .register(MockTool::new("fxc", &["HLSL"], Some("DXBC")))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_no_input_languages_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry.register(MockTool::new("x", &[], None)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidToolDefinition(_)));
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(MockTool::new("  ", &["HLSL"], None)).is_err());
    }

    #[test]
    fn test_bad_default_rejected() {
        let mut registry = ToolRegistry::new();
        let tool = MockTool::new("fxc", &["HLSL"], Some("DXBC"))
            .with_parameter(ParameterSpec::choice("TargetProfile", ["ps_5_0"], "ps_6_0"));
        let err = registry.register(tool).unwrap_err();
        assert!(err.to_string().contains("bad default"));
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let mut registry = ToolRegistry::new();
        let tool = MockTool::new("fxc", &["HLSL"], Some("DXBC"))
            .with_parameter(ParameterSpec::string("EntryPoint", "main"))
            .with_parameter(ParameterSpec::string("EntryPoint", "PSMain"));
        assert!(registry.register(tool).is_err());
    }

    #[test]
    fn test_undeclared_output_language_rejected() {
        let mut registry = ToolRegistry::new();
        let tool = MockTool::new("dxc", &["HLSL"], Some("DXIL"))
            .with_parameter(ParameterSpec::output_language(["DXIL", "SPIR-V"], "DXIL"));
        let err = registry.register(tool).unwrap_err();
        assert!(err.to_string().contains("SPIR-V"));
    }

    #[test]
    fn test_registry_debug_lists_names() {
        let mut registry = ToolRegistry::new();
        registry.register(MockTool::new("fxc", &["HLSL"], Some("DXBC"))).unwrap();
        assert!(format!("{registry:?}").contains("fxc"));
    }
}
