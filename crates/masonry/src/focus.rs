//! Roving tab stop across the grid.
//!
//! Only the first cell stays in the sequential tab order. Blur on any other
//! cell hands focus to its neighbour in input order, so tabbing walks the grid
//! in authored order even though columns reorder cells visually.

use crate::TEMPLATE_CLASS;
use anyhow::Result;
use html::{Document, FocusEvent, FocusEventKind, NodeKey};
use log::trace;
use std::collections::HashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FocusRole {
    /// The single tab stop (first cell in input order).
    Anchor,
    /// Removed from the tab order; relays focus on blur.
    Member,
}

#[derive(Clone, Debug, Default)]
pub struct RovingFocus {
    order: Vec<NodeKey>,
    bound: HashMap<NodeKey, FocusRole>,
}

impl RovingFocus {
    pub fn new(order: Vec<NodeKey>) -> Self {
        Self {
            order,
            bound: HashMap::new(),
        }
    }

    /// Forget every binding; cells get re-bound as they are placed again.
    pub fn reset(&mut self) {
        self.bound.clear();
    }

    pub fn role(&self, cell: NodeKey) -> Option<FocusRole> {
        self.bound.get(&cell).copied()
    }

    /// Attach focus handling to a freshly placed cell.
    ///
    /// # Errors
    /// Propagates document failures.
    pub fn bind<D: Document + ?Sized>(&mut self, doc: &mut D, cell: NodeKey) -> Result<()> {
        let role = if self.order.first() == Some(&cell) {
            FocusRole::Anchor
        } else {
            doc.set_attribute(cell, "tabindex", "-1")?;
            FocusRole::Member
        };
        self.bound.insert(cell, role);
        Ok(())
    }

    /// React to a focus change on a bound cell. Returns the cell focus was
    /// moved to, if any.
    ///
    /// # Errors
    /// Propagates document failures.
    pub fn handle<D: Document + ?Sized>(
        &self,
        doc: &mut D,
        event: FocusEvent,
    ) -> Result<Option<NodeKey>> {
        let Some(role) = self.role(event.target) else {
            return Ok(None);
        };
        let Some(related) = event.related_target else {
            return Ok(None);
        };
        // On blur this means focus moved forward; on focus, that it came back
        // from further down the page.
        let related_after = doc.precedes(event.target, related);

        let destination = match (role, event.kind) {
            (FocusRole::Anchor, FocusEventKind::Focus) if related_after => {
                self.order.last().copied()
            }
            (FocusRole::Anchor, FocusEventKind::Blur)
                if related_after && !doc.has_class(related, TEMPLATE_CLASS) =>
            {
                self.order.get(1).copied()
            }
            (FocusRole::Member, FocusEventKind::Blur) => {
                let index = self.order.iter().position(|cell| *cell == event.target);
                match index {
                    Some(index) if related_after => self.order.get(index + 1).copied(),
                    Some(index) => index
                        .checked_sub(1)
                        .and_then(|prev| self.order.get(prev).copied()),
                    None => None,
                }
            }
            _ => None,
        };

        match destination {
            Some(cell) if cell != event.target => {
                trace!("roving focus {:?} -> {cell:?}", event.target);
                doc.focus(cell)?;
                Ok(Some(cell))
            }
            _ => Ok(None),
        }
    }
}
