//! Service definition record
//!
//! Mirrors the parts of `serverless.yml` the pipeline reads and writes.
//! Function order follows the order of the `functions:` mapping.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

use crate::constants::{AWS_PROVIDER, SWIFT_RUNTIME};
use crate::domain::custom::CustomSection;
use crate::domain::function::Function;
use crate::error::{ConfigError, Result};

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_STAGE: &str = "dev";

/// A deployable service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Service name
    #[serde(default)]
    pub service: String,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default, with = "function_map")]
    pub functions: Vec<Function>,

    #[serde(default, skip_serializing_if = "CustomSection::is_empty")]
    pub custom: CustomSection,

    #[serde(flatten)]
    pub extra: Mapping,
}

/// The `provider:` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,

    /// Service-level default runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(flatten)]
    pub extra: Mapping,
}

impl Provider {
    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    pub fn stage(&self) -> &str {
        self.stage.as_deref().unwrap_or(DEFAULT_STAGE)
    }

    pub fn is_aws(&self) -> bool {
        self.name == AWS_PROVIDER
    }
}

impl Service {
    /// Parses a `serverless.yml` document
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Renders the service back to YAML
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }

    /// Function runtime, else the provider runtime
    pub fn effective_runtime<'a>(&'a self, function: &'a Function) -> Option<&'a str> {
        function.effective_runtime(self.provider.runtime.as_deref())
    }

    /// Names of the functions the Swift pipeline should build
    ///
    /// With `target` set only that function is considered. Either way a
    /// function qualifies only if its effective runtime is `swift`. The
    /// result may be empty; each stage decides how to report that.
    pub fn swift_functions(&self, target: Option<&str>) -> Result<Vec<String>> {
        let candidates: Vec<&Function> = match target {
            Some(name) => vec![
                self.function(name)
                    .ok_or_else(|| ConfigError::UnknownFunction(name.to_string()))?,
            ],
            None => self.functions.iter().collect(),
        };

        Ok(candidates
            .into_iter()
            .filter(|f| self.effective_runtime(f) == Some(SWIFT_RUNTIME))
            .map(|f| f.name.clone())
            .collect())
    }
}

/// Serializes `Vec<Function>` as the `name -> definition` mapping used on disk
mod function_map {
    use serde::de::{MapAccess, Visitor};
    use serde::{Deserializer, Serializer};
    use std::fmt;

    use crate::domain::function::Function;

    pub fn serialize<S: Serializer>(
        functions: &[Function],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(functions.iter().map(|f| (f.name.as_str(), f)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Function>, D::Error> {
        deserializer.deserialize_any(FunctionMapVisitor)
    }

    struct FunctionMapVisitor;

    impl<'de> Visitor<'de> for FunctionMapVisitor {
        type Value = Vec<Function>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a mapping of function names to definitions")
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut functions = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, mut function)) = map.next_entry::<String, Function>()? {
                function.name = name;
                functions.push(function);
            }
            Ok(functions)
        }
    }
}
