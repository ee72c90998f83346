//! Parameters shared by several adapters.

use shaderpipe_core::{BoundArguments, ParameterSpec, ToolError};

pub const ENTRY_POINT: &str = "EntryPoint";
pub const SHADER_STAGE: &str = "ShaderStage";
pub const TARGET_PROFILE: &str = "TargetProfile";
pub const DISABLE_OPTIMIZATIONS: &str = "DisableOptimizations";
pub const OPTIMIZATION_LEVEL: &str = "OptimizationLevel";
pub const EXTRA_OPTIONS: &str = "ExtraOptions";
pub const VERSION: &str = "Version";

/// The version every tool has: whatever `[tools]` resolves without a version.
pub const TRUNK: &str = "trunk";

/// Pipeline stages, named as glslang names them.
pub const SHADER_STAGES: [&str; 6] = ["vert", "tesc", "tese", "geom", "frag", "comp"];

pub fn entry_point(default: &str) -> ParameterSpec {
    ParameterSpec::string(ENTRY_POINT, default).with_description("Entry point function name")
}

pub fn shader_stage() -> ParameterSpec {
    ParameterSpec::choice(SHADER_STAGE, SHADER_STAGES, "frag").with_description("Shader stage")
}

pub fn disable_optimizations() -> ParameterSpec {
    ParameterSpec::boolean(DISABLE_OPTIMIZATIONS, false)
        .with_description("Compile without optimizations")
}

pub fn optimization_level(default: i64) -> ParameterSpec {
    ParameterSpec::integer_in(OPTIMIZATION_LEVEL, 0, 3, default)
        .with_description("Optimization level (ignored when optimizations are disabled)")
}

pub fn extra_options() -> ParameterSpec {
    ParameterSpec::string(EXTRA_OPTIONS, "")
        .with_description("Additional command-line options, separated by whitespace")
}

/// Tool version selector; `allowed` must contain [`TRUNK`].
pub fn version<I, S>(allowed: I) -> ParameterSpec
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ParameterSpec::choice(VERSION, allowed, TRUNK).with_description("Tool version to run")
}

/// The `ExtraOptions` argument split into individual options.
pub fn split_extra_options(args: &BoundArguments) -> Result<Vec<String>, ToolError> {
    Ok(args
        .string(EXTRA_OPTIONS)?
        .split_whitespace()
        .map(String::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use shaderpipe_core::bind;

    use super::*;

    #[test]
    fn test_split_extra_options() {
        let schema = [extra_options()];
        let raw = HashMap::from([(
            EXTRA_OPTIONS.to_string(),
            "  -Zpr   -Gis\t-WX ".to_string(),
        )]);
        let args = bind(&schema, &raw).unwrap();
        assert_eq!(split_extra_options(&args).unwrap(), vec!["-Zpr", "-Gis", "-WX"]);

        let args = bind(&schema, &HashMap::new()).unwrap();
        assert!(split_extra_options(&args).unwrap().is_empty());
    }

    #[test]
    fn test_version_defaults_to_trunk() {
        let schema = [version([TRUNK, "6.2.0"])];
        let args = bind(&schema, &HashMap::new()).unwrap();
        assert_eq!(args.string(VERSION).unwrap(), TRUNK);

        let raw = HashMap::from([(VERSION.to_string(), "6.2.0".to_string())]);
        assert_eq!(bind(&schema, &raw).unwrap().string(VERSION).unwrap(), "6.2.0");

        let raw = HashMap::from([(VERSION.to_string(), "7.0.0".to_string())]);
        let err = bind(&schema, &raw).unwrap_err();
        assert_eq!(err.name, VERSION);
        assert_eq!(err.raw_value, "7.0.0");
    }

    #[test]
    fn test_stage_default_is_fragment() {
        assert_eq!(shader_stage().default, "frag");
    }
}
