use crate::math::Plane;

/// Default slot count. Each portal hop of a trace borrows one slot, so
/// this caps how many frustum plane lists can be alive at once.
pub const PLANE_POOL_SIZE: usize = 32;

/// Handle to a borrowed plane list.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PoolSlot(u32);

/// Fixed-capacity arena of reusable plane lists. Bounds the memory of
/// recursive portal traversal: a trace requests a slot per hop, fills
/// it, recurses, and frees it before unwinding. Exhaustion is reported
/// to the caller, which prunes the branch rather than failing the
/// conversion.
#[derive(Debug)]
pub struct PlanePool {
    slots: Vec<Vec<Plane>>,
    in_use: Vec<bool>,
}

impl Default for PlanePool {
    fn default() -> Self {
        Self::with_capacity(PLANE_POOL_SIZE)
    }
}

impl PlanePool {
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0);

        Self {
            slots: vec![Vec::new(); capacity],
            in_use: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns all slots, keeping their allocations for reuse.
    pub fn reset(&mut self) {
        self.in_use.fill(false);
    }

    pub fn request(&mut self) -> Option<PoolSlot> {
        let free = self.in_use.iter().position(|used| !used)?;

        self.in_use[free] = true;
        self.slots[free].clear();
        Some(PoolSlot(free as u32))
    }

    pub fn free(&mut self, slot: PoolSlot) {
        debug_assert!(self.in_use[slot.0 as usize]);
        self.in_use[slot.0 as usize] = false;
    }

    pub fn planes(&self, slot: PoolSlot) -> &[Plane] {
        &self.slots[slot.0 as usize]
    }

    pub fn planes_mut(&mut self, slot: PoolSlot) -> &mut Vec<Plane> {
        &mut self.slots[slot.0 as usize]
    }

    /// Copies one slot's planes into another without releasing either.
    pub fn copy_from(&mut self, dst: PoolSlot, src: PoolSlot) {
        let (di, si) = (dst.0 as usize, src.0 as usize);
        assert_ne!(di, si);

        if di < si {
            let (left, right) = self.slots.split_at_mut(si);
            left[di].clear();
            left[di].extend_from_slice(&right[0]);
        } else {
            let (left, right) = self.slots.split_at_mut(di);
            right[0].clear();
            right[0].extend_from_slice(&left[si]);
        }
    }
}
