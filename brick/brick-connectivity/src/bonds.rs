//! Bond state mutators.
//!
//! Every public mutator keeps bonds mutual: when it returns, `a` points at
//! `b` exactly when `b` points at `a`. Duplication briefly holds one-sided
//! references while it remaps them and reconciles them before returning.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::error::{ConnectivityError, ConnectivityResult};
use crate::ids::{BrickId, ConnectionRef, FieldId};
use crate::placement::{BrickSet, Placement};
use crate::scene::Scene;
use crate::tolerance::Tolerances;
use crate::types::ConnectionMatch;

impl Scene {
    // ========================================================================
    // Connecting
    // ========================================================================

    /// Moves bricks so `source` lands on `target`, then bonds every coincident pair.
    ///
    /// `moving` defaults to `source`'s brick. The bricks are rotated about
    /// `pivot` and translated by the connected transformation, `source` and
    /// `target` are bonded, and then every other free, connecting pair
    /// between the moved bricks and the rest of the scene is bonded too.
    /// Bonds of the moved bricks that no longer coincide after the move are
    /// broken first.
    ///
    /// Returns the number of new bonds; re-connecting a pair that is already
    /// bonded to each other changes nothing and returns `Ok(0)`.
    ///
    /// # Errors
    ///
    /// - [`ConnectivityError::AlreadyConnected`] if either side is bonded elsewhere
    /// - [`ConnectivityError::SameKind`] or [`ConnectivityError::SameBrick`] for impossible pairs
    /// - [`ConnectivityError::TargetIsMoving`] if the target's brick is in `moving`
    /// - [`ConnectivityError::NoAlignment`] if the fields cannot be aligned
    ///
    /// Nothing is modified on error.
    pub fn connect(
        &mut self,
        source: ConnectionRef,
        target: ConnectionRef,
        pivot: &Point3<f64>,
        moving: Option<&BrickSet>,
        tolerance: &Tolerances,
    ) -> ConnectivityResult<usize> {
        if self.connected_to(source) == Some(target) && self.connected_to(target) == Some(source) {
            return Ok(0);
        }
        let (source_brick, target_brick) = self.check_bondable(source, target)?;

        let default_moving: BrickSet;
        let moving = if let Some(set) = moving {
            set
        } else {
            default_moving = [source_brick].into_iter().collect();
            &default_moving
        };
        if moving.contains(&target_brick) {
            return Err(ConnectivityError::TargetIsMoving { brick: target_brick });
        }

        let motion = self
            .get_connected_transformation(source, target, pivot, &Placement::at_rest())
            .ok_or(ConnectivityError::NoAlignment {
                first: source,
                second: target,
            })?;
        self.move_bricks(moving, &motion.to_isometry())?;

        // Bonds to bricks left behind no longer line up
        let mut broken = 0;
        let moved_fields: Vec<FieldId> = moving.iter().flat_map(|b| self.brick_fields(*b)).collect();
        for field in moved_fields {
            broken += self.disconnect_all_invalid(field, tolerance)?;
        }

        self.bond(source, target);
        let extra = self.connect_coincident(moving, tolerance);
        info!(%source, %target, bonds = extra + 1, broken, "connected");
        Ok(extra + 1)
    }

    /// Bonds two connections where they are, without moving anything.
    ///
    /// Returns `false` if they were already bonded to each other.
    ///
    /// # Errors
    ///
    /// Same conditions as [`connect`](Self::connect), except alignment.
    pub fn connect_in_place(&mut self, a: ConnectionRef, b: ConnectionRef) -> ConnectivityResult<bool> {
        if self.connected_to(a) == Some(b) && self.connected_to(b) == Some(a) {
            return Ok(false);
        }
        self.check_bondable(a, b)?;
        self.bond(a, b);
        debug!(%a, %b, "bonded in place");
        Ok(true)
    }

    /// Bonds every free, coincident, connecting pair between the fields of
    /// `moved` and the other bricks. Returns the number of new bonds.
    pub fn connect_coincident(&mut self, moved: &BrickSet, tolerance: &Tolerances) -> usize {
        let placement = Placement::new(moved, nalgebra::Isometry3::identity());
        let fields: Vec<FieldId> = moved.iter().flat_map(|b| self.brick_fields(*b)).collect();

        let mut pairs = Vec::new();
        for field in fields {
            for contact in self.query_connections(field, &placement, tolerance) {
                if contact.matched == ConnectionMatch::Connect {
                    pairs.push((contact.source, contact.target));
                }
            }
        }

        let mut bonded = 0;
        for (a, b) in pairs {
            // A connection may coincide with several others; the first bond wins.
            if !self.is_bonded(a) && !self.is_bonded(b) {
                self.bond(a, b);
                bonded += 1;
            }
        }
        bonded
    }

    // ========================================================================
    // Disconnecting
    // ========================================================================

    /// Breaks the bond of one connection, returning its former counterpart.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::ConnectionNotFound`] if `c` does not exist.
    pub fn disconnect(&mut self, c: ConnectionRef) -> ConnectivityResult<Option<ConnectionRef>> {
        if self.connection(c).is_none() {
            return Err(ConnectivityError::ConnectionNotFound { connection: c });
        }
        let other = self.connected_to(c);
        if let Some(other) = other {
            self.unbond(c, other);
        }
        Ok(other)
    }

    /// Breaks every bond of a field. Returns how many bonds were broken.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::FieldNotFound`] for an unknown field.
    pub fn disconnect_all(&mut self, field: FieldId) -> ConnectivityResult<usize> {
        self.disconnect_where(field, |_, _, _| true)
    }

    /// Breaks every bond of a field whose counterpart's brick is not in `keep`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::FieldNotFound`] for an unknown field.
    pub fn disconnect_inverse(&mut self, field: FieldId, keep: &BrickSet) -> ConnectivityResult<usize> {
        self.disconnect_where(field, |scene, _, other| {
            !scene.field_owner(other.field).is_some_and(|b| keep.contains(&b))
        })
    }

    /// Breaks every bond of a field whose two connections no longer coincide.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::FieldNotFound`] for an unknown field.
    pub fn disconnect_all_invalid(&mut self, field: FieldId, tolerance: &Tolerances) -> ConnectivityResult<usize> {
        let rest = Placement::at_rest();
        self.disconnect_where(field, |scene, this, other| {
            !scene.is_connection_aligned(this, other, &rest, tolerance)
        })
    }

    fn disconnect_where(
        &mut self,
        field: FieldId,
        should_break: impl Fn(&Self, ConnectionRef, ConnectionRef) -> bool,
    ) -> ConnectivityResult<usize> {
        let bonds: Vec<(u32, ConnectionRef)> = self
            .field(field)
            .ok_or(ConnectivityError::FieldNotFound { id: field })?
            .bonds()
            .collect();
        let mut broken = 0;
        for (index, other) in bonds {
            let this = ConnectionRef::new(field, index);
            if should_break(self, this, other) {
                self.unbond(this, other);
                broken += 1;
            }
        }
        if broken > 0 {
            debug!(%field, broken, "disconnected");
        }
        Ok(broken)
    }

    // ========================================================================
    // Duplication
    // ========================================================================

    /// Copies bricks with their parts and fields, keeping bonds inside the set.
    ///
    /// Copies share the originals' transforms. A bond between two duplicated
    /// bricks is recreated between their copies; a bond leaving the set is
    /// dropped on the copy. Originals are unchanged. A handle listed more
    /// than once is copied once. Returns the new handles in the order each
    /// brick first appears in `ids`.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectivityError::BrickNotFound`] before copying anything if
    /// any handle is unknown.
    pub fn duplicate_bricks(&mut self, ids: &[BrickId]) -> ConnectivityResult<Vec<BrickId>> {
        if let Some(&id) = ids.iter().find(|id| self.brick(**id).is_none()) {
            return Err(ConnectivityError::BrickNotFound { id });
        }

        // Phase one: copy everything, bonds still pointing at the originals.
        let mut field_map: HashMap<FieldId, FieldId> = HashMap::new();
        let mut copies = Vec::with_capacity(ids.len());
        let mut seen = BrickSet::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            let Some((copy, fields)) = self.clone_brick(id) else {
                continue;
            };
            field_map.extend(fields);
            copies.push(copy);
        }
        let copied_fields: Vec<FieldId> = field_map.values().copied().collect();

        // Phase two: remap bonds inside the set, drop the ones leaving it.
        let mut kept = 0;
        let mut dropped = 0;
        for field_id in copied_fields {
            let Some(field) = self.field(field_id) else {
                continue;
            };
            let bonds: Vec<(u32, ConnectionRef)> = field.bonds().collect();
            for (index, other) in bonds {
                let remapped = field_map
                    .get(&other.field)
                    .map(|copy| ConnectionRef::new(*copy, other.index));
                if remapped.is_some() {
                    kept += 1;
                } else {
                    dropped += 1;
                }
                if let Some(field) = self.field_mut(field_id) {
                    field.set_bond(index, remapped);
                }
            }
        }
        info!(bricks = copies.len(), bonds_kept = kept / 2, bonds_dropped = dropped, "duplicated bricks");
        Ok(copies)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_bondable(&self, a: ConnectionRef, b: ConnectionRef) -> ConnectivityResult<(BrickId, BrickId)> {
        for c in [a, b] {
            if self.connection(c).is_none() {
                return Err(ConnectivityError::ConnectionNotFound { connection: c });
            }
            if let Some(other) = self.connected_to(c) {
                return Err(ConnectivityError::AlreadyConnected { connection: c, other });
            }
        }
        let (Some(fa), Some(fb)) = (self.field(a.field), self.field(b.field)) else {
            return Err(ConnectivityError::FieldNotFound { id: a.field });
        };
        if fa.kind() == fb.kind() {
            return Err(ConnectivityError::SameKind { first: a, second: b });
        }
        let (Some(ba), Some(bb)) = (self.field_owner(a.field), self.field_owner(b.field)) else {
            return Err(ConnectivityError::FieldNotFound { id: a.field });
        };
        if ba == bb {
            return Err(ConnectivityError::SameBrick { brick: ba });
        }
        Ok((ba, bb))
    }

    fn bond(&mut self, a: ConnectionRef, b: ConnectionRef) {
        if let Some(field) = self.field_mut(a.field) {
            field.set_bond(a.index, Some(b));
        }
        if let Some(field) = self.field_mut(b.field) {
            field.set_bond(b.index, Some(a));
        }
    }

    fn unbond(&mut self, a: ConnectionRef, b: ConnectionRef) {
        if let Some(field) = self.field_mut(a.field) {
            field.set_bond(a.index, None);
        }
        if self.connected_to(b) == Some(a) {
            if let Some(field) = self.field_mut(b.field) {
                field.set_bond(b.index, None);
            }
        } else {
            warn!(%a, %b, "bond was one-sided");
        }
    }
}
