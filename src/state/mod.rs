//! # Devfile State
//!
//! The façade the CLI talks to. A [`DevfileState`] holds one serialized
//! devfile and exposes every edit as a single operation that either fully
//! applies or leaves the text untouched. Each successful operation returns a
//! [`DevfileContent`]: the new text plus a flat view of its commands and
//! components.

mod content;
mod devstate;

pub use content::{
    ApplyView, CommandView, CompositeView, ContainerView, DevfileContent, ExecView, ImageView,
    ResourceView, VolumeView,
};
pub use devstate::{ContainerSpec, DevfileState, ImageSpec, LabelStyle, StateError};
