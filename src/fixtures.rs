#[cfg(test)]
pub mod test {
    use std::path::PathBuf;

    use crate::model::Configuration;
    use crate::profile::{BuildProfile, ResolvedConfig, resolve_profile};
    use crate::resolve::{ResolveInput, resolve_configuration};

    /// Merge a config file body over defaults for a project named `demo`.
    pub fn config_from_toml(content: &str) -> Configuration {
        let input = ResolveInput {
            file: Some((PathBuf::from("vcplan.toml"), content.to_string())),
            ..ResolveInput::empty("demo")
        };
        resolve_configuration(input).unwrap()
    }

    /// Fully-resolved configuration: merge, then apply the profile policy.
    pub fn resolved_from_toml(content: &str, profile: BuildProfile) -> ResolvedConfig {
        resolve_profile(config_from_toml(content), profile)
    }
}
