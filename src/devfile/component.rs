//! Devfile components
//!
//! Containers, images, Kubernetes resources and volumes are typed because
//! commands point at them by name. Custom and plugin components are kept as
//! raw mappings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevfileComponent {
    #[serde(flatten)]
    pub body: ComponentBody,

    pub name: String,

    /// Component-level keys besides the union (`attributes`...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The component union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentBody {
    Container(ContainerComponent),
    Custom(serde_yaml::Mapping),
    Image(ImageComponent),
    Kubernetes(KubernetesComponent),
    Openshift(KubernetesComponent),
    Plugin(serde_yaml::Mapping),
    Volume(VolumeComponent),
}

impl ComponentBody {
    /// Name of the union key
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentBody::Container(_) => "container",
            ComponentBody::Custom(_) => "custom",
            ComponentBody::Image(_) => "image",
            ComponentBody::Kubernetes(_) => "kubernetes",
            ComponentBody::Openshift(_) => "openshift",
            ComponentBody::Plugin(_) => "plugin",
            ComponentBody::Volume(_) => "volume",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerComponent {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_limit: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_request: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    pub image: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_limit: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_request: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount_sources: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_mapping: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,

    /// Endpoints, annotations and the like
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_build: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<DockerfileImage>,

    pub image_name: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DockerfileImage {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_context: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_required: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// `git` and `devfileRegistry` sources
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// A Kubernetes or OpenShift resource, inlined or by uri
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_by_default: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inlined: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeral: Option<bool>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub size: String,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid policy {0:?} (expected never, always or undefined)")]
pub struct PolicyParseError(String);

/// When a component is built or deployed without an explicit command
///
/// Parsed from `never`, `always` or `undefined`; the last leaves the flag out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoPolicy {
    Never,
    Always,
    #[default]
    Undefined,
}

impl AutoPolicy {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            AutoPolicy::Never => Some(false),
            AutoPolicy::Always => Some(true),
            AutoPolicy::Undefined => None,
        }
    }
}

impl std::str::FromStr for AutoPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "never" => Ok(AutoPolicy::Never),
            "always" => Ok(AutoPolicy::Always),
            "" | "undefined" => Ok(AutoPolicy::Undefined),
            other => Err(PolicyParseError(other.to_string())),
        }
    }
}

impl DevfileComponent {
    pub fn new(name: impl Into<String>, body: ComponentBody) -> Self {
        Self {
            body,
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Container volume mounts, empty for other kinds
    pub fn volume_mounts(&self) -> &[VolumeMount] {
        match &self.body {
            ComponentBody::Container(container) => &container.volume_mounts,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_layout_matches_devfile_schema() {
        let component = DevfileComponent::new(
            "a-name",
            ComponentBody::Container(ContainerComponent {
                args: vec!["arg1".to_string()],
                cpu_limit: "200m".to_string(),
                cpu_request: "100m".to_string(),
                image: "an-image".to_string(),
                memory_limit: "2Gi".to_string(),
                memory_request: "1Gi".to_string(),
                mount_sources: Some(false),
                volume_mounts: vec![VolumeMount {
                    name: "vol1".to_string(),
                    path: "/mnt/volume1".to_string(),
                }],
                ..Default::default()
            }),
        );

        assert_eq!(
            serde_yaml::to_string(&component).unwrap(),
            concat!(
                "container:\n",
                "  args:\n",
                "  - arg1\n",
                "  cpuLimit: 200m\n",
                "  cpuRequest: 100m\n",
                "  image: an-image\n",
                "  memoryLimit: 2Gi\n",
                "  memoryRequest: 1Gi\n",
                "  mountSources: false\n",
                "  volumeMounts:\n",
                "  - name: vol1\n",
                "    path: /mnt/volume1\n",
                "name: a-name\n",
            )
        );
    }

    #[test]
    fn unmodelled_keys_are_kept() {
        let text = r#"
name: runtime
attributes:
  tier: backend
container:
  image: golang:1.21
  endpoints:
  - name: http
    targetPort: 8080
"#;
        let component: DevfileComponent = serde_yaml::from_str(text).unwrap();
        assert_eq!(component.body.kind(), "container");
        assert!(component.extra.contains_key("attributes"));

        let yaml = serde_yaml::to_string(&component).unwrap();
        assert!(yaml.contains("targetPort: 8080"));
        assert!(yaml.contains("tier: backend"));
        assert_eq!(serde_yaml::from_str::<DevfileComponent>(&yaml).unwrap(), component);
    }

    #[test]
    fn auto_policy_parsing() {
        assert_eq!("never".parse::<AutoPolicy>().unwrap().as_flag(), Some(false));
        assert_eq!("always".parse::<AutoPolicy>().unwrap().as_flag(), Some(true));
        assert_eq!("".parse::<AutoPolicy>().unwrap().as_flag(), None);
        assert!("sometimes".parse::<AutoPolicy>().is_err());
    }
}
