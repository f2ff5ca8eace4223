#![doc = include_str!("../README.md")]

mod config;
mod error;
pub mod logging;
mod root;

pub use config::RootConfig;
pub use error::Error;
pub use root::{Pass, RenderRoot};

#[doc(inline)]
pub use reactk_core::*;
#[doc(inline)]
pub use reactk_props as props;
pub use reactk_props::{Value, ValueMap, values};

pub mod prelude {
    //! The types needed to declare node kinds and write components.
    //!
    //! ```
    //! use reactk::prelude::*;
    //! ```
    pub use crate::{
        Component, Context, NodeKind, RenderError, RenderRoot, RenderSink, RootConfig,
        ShadowNode,
    };
    pub use reactk_props::{DiffMode, Prop, PropSection, Value, ValueType, values};
}
