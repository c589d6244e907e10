use glam::Vec3;

use crate::layout::ElementLayout;

/// Opaque handle to an externally owned visual asset (e.g. a photo texture).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u32);

/// One photo panel. Layout positions are fixed for the element's lifetime.
#[derive(Clone, Debug)]
pub struct Element {
    id: u32,
    chaos: Vec3,
    target: Vec3,
    /// `None` renders as a placeholder panel.
    pub asset: Option<AssetHandle>,
}

impl Element {
    pub fn new(id: u32, layout: ElementLayout) -> Self {
        Self {
            id,
            chaos: layout.chaos,
            target: layout.target,
            asset: None,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn chaos_position(&self) -> Vec3 {
        self.chaos
    }

    pub fn target_position(&self) -> Vec3 {
        self.target
    }
}

/// At most one selected element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    current: Option<usize>,
}

impl Selection {
    /// Select `index`, deselecting any other element. Selecting the
    /// currently selected element clears the selection.
    pub fn toggle(&mut self, index: usize) -> Option<usize> {
        self.current = if self.current == Some(index) {
            None
        } else {
            Some(index)
        };
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.current == Some(index)
    }
}
