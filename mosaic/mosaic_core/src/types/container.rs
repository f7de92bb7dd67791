//! Containers and their structural locators.
//!
//! A [`Container`] describes where an app renders as a chain of ancestor
//! segments, each a tag name with its 1-based position among same-tag
//! siblings. The [`ContainerLocator`] rendered from that chain identifies the
//! position independently of whatever is later rendered into it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of a container path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerSegment {
    /// Lowercased tag name
    pub tag: String,

    /// 1-based position among siblings with the same tag
    pub index: usize,
}

/// A render target identified by its structural path.
///
/// ```
/// use mosaic_core::types::Container;
///
/// let container = Container::root("html").child("body", 1).child("div", 3);
/// assert_eq!(container.locator().unwrap().as_str(), "/html[1]/body[1]/div[3]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Container {
    segments: Vec<ContainerSegment>,
}

impl Container {
    /// A container that is not attached to any document.
    pub fn detached() -> Self {
        Self::default()
    }

    /// A container at the document root.
    pub fn root(tag: impl AsRef<str>) -> Self {
        Self::detached().child(tag, 1)
    }

    /// Descend into the `index`-th child with the given tag.
    pub fn child(mut self, tag: impl AsRef<str>, index: usize) -> Self {
        self.segments.push(ContainerSegment {
            tag: tag.as_ref().to_ascii_lowercase(),
            index,
        });
        self
    }

    pub fn segments(&self) -> &[ContainerSegment] {
        &self.segments
    }

    pub fn is_attached(&self) -> bool {
        !self.segments.is_empty()
    }

    /// Compute the structural locator. Detached containers have none.
    pub fn locator(&self) -> Option<ContainerLocator> {
        if !self.is_attached() {
            return None;
        }

        let path = self
            .segments
            .iter()
            .map(|segment| format!("/{}[{}]", segment.tag, segment.index))
            .collect::<String>();
        Some(ContainerLocator(path))
    }
}

/// Stable textual identity of a container position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerLocator(String);

impl ContainerLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
