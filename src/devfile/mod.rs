//! # Devfile Document
//!
//! Typed access to the parts of a devfile the command engine edits. The
//! engine never validates the devfile schema; it only needs to read commands
//! and events and to write them back without losing anything else.
//!
//! | Key | Typed as |
//! |-----|----------|
//! | `commands` | [`DevfileCommand`] (`exec`, `apply` or `composite`) |
//! | `events` | [`Events`] |
//! | `components` | [`DevfileComponent`] (`container`, `image`, `kubernetes`, `volume`...) |
//! | `metadata`, others | raw YAML values |

mod component;
mod document;

pub use component::{
    AutoPolicy, ComponentBody, ContainerComponent, DevfileComponent, DockerfileImage, EnvVar,
    ImageComponent, KubernetesComponent, PolicyParseError, VolumeComponent, VolumeMount,
};
pub use document::{
    ApplyCommand, CommandBody, CommandGroup, CompositeCommand, Devfile, DevfileCommand, Events,
    ExecCommand, DEFAULT_DEVFILE,
};
