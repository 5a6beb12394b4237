//! Dictionary from structural hash to share, plus the preemptive table.

use crate::error::{DiffError, DiffResult};
use crate::heap::{DiffHeap, DiffHeapStore};
use crate::share::{ShareId, SubtreeShare};
use std::collections::{BTreeMap, HashMap};
use treediff_tree::{NodeId, SubtreeId, SubtreePool};

/// One diff invocation's index of reuse candidates.
///
/// Owns every share created during the diff (they die with the registry) and
/// the `incremental` table that lets preemptive pairings carried across
/// reparses find their counterpart.
#[derive(Debug, Default)]
pub(crate) struct SubtreeRegistry {
    shares: Vec<SubtreeShare>,
    by_struct_hash: HashMap<[u8; 32], ShareId>,
    incremental: HashMap<NodeId, SubtreeId>,
}

fn heap_of<'h>(pool: &SubtreePool, heaps: &'h DiffHeapStore, subtree: SubtreeId) -> DiffResult<&'h DiffHeap> {
    pool.get(subtree)
        .diff_heap()
        .and_then(|id| heaps.get(id))
        .ok_or(DiffError::Uninitialized(subtree))
}

fn heap_of_mut<'h>(
    pool: &SubtreePool,
    heaps: &'h mut DiffHeapStore,
    subtree: SubtreeId,
) -> DiffResult<&'h mut DiffHeap> {
    pool.get(subtree)
        .diff_heap()
        .and_then(|id| heaps.get_mut(id))
        .ok_or(DiffError::Uninitialized(subtree))
}

impl SubtreeRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn share_mut(&mut self, id: ShareId) -> &mut SubtreeShare {
        &mut self.shares[id.index()]
    }

    /// Finds or creates the share for `subtree`'s structural hash, points
    /// the node at it and clears any stale pairing.
    pub(crate) fn assign_share(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        subtree: SubtreeId,
    ) -> DiffResult<ShareId> {
        let structural_hash = heap_of(pool, heaps, subtree)?.structural_hash;
        let share_id = match self.by_struct_hash.get(&structural_hash) {
            Some(&existing) => existing,
            None => {
                let share_id = ShareId::new(self.shares.len() as u32);
                self.shares.push(SubtreeShare::new());
                self.by_struct_hash.insert(structural_hash, share_id);
                share_id
            }
        };
        let counterpart = {
            let heap = heap_of_mut(pool, heaps, subtree)?;
            heap.share = Some(share_id);
            heap.assigned.take()
        };
        // A stale pairing is broken on both ends so symmetry never tears.
        if let Some(counterpart) = counterpart {
            heap_of_mut(pool, heaps, counterpart)?.assigned = None;
        }
        Ok(share_id)
    }

    /// As [`assign_share`](Self::assign_share), then registers the node as
    /// an available candidate.
    pub(crate) fn assign_share_and_register(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        subtree: SubtreeId,
    ) -> DiffResult<ShareId> {
        let share_id = self.assign_share(pool, heaps, subtree)?;
        self.register_available(pool, heaps, share_id, subtree)?;
        Ok(share_id)
    }

    /// Registers `subtree` as available in `share`.
    pub(crate) fn register_available(
        &mut self,
        pool: &SubtreePool,
        heaps: &DiffHeapStore,
        share: ShareId,
        subtree: SubtreeId,
    ) -> DiffResult<()> {
        let heap = heap_of(pool, heaps, subtree)?;
        let (node_id, literal_hash) = (heap.id, heap.literal_hash);
        self.share_mut(share).register(node_id, literal_hash, subtree);
        Ok(())
    }

    /// Commits a mutual pairing, removing both endpoints from their shares.
    pub(crate) fn bind_pair(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<()> {
        self.withdraw(pool, heaps, this)?;
        self.withdraw(pool, heaps, that)?;
        {
            let heap = heap_of_mut(pool, heaps, this)?;
            heap.assigned = Some(that);
            heap.preemptive_assignment = None;
        }
        {
            let heap = heap_of_mut(pool, heaps, that)?;
            heap.assigned = Some(this);
            heap.preemptive_assignment = None;
        }
        Ok(())
    }

    /// Pulls `subtree` out of its share (maps and pointer), if it is in one.
    fn withdraw(&mut self, pool: &SubtreePool, heaps: &mut DiffHeapStore, subtree: SubtreeId) -> DiffResult<()> {
        let heap = heap_of(pool, heaps, subtree)?;
        let Some(share_id) = heap.share else {
            return Ok(());
        };
        let (node_id, literal_hash) = (heap.id, heap.literal_hash);
        self.share_mut(share_id).unregister(node_id, literal_hash, subtree);
        heap_of_mut(pool, heaps, subtree)?.share = None;
        Ok(())
    }

    /// Looks for a reusable original subtree matching `query` in `share`.
    ///
    /// `preferred` selects by literal hash (building the index on first
    /// use); otherwise any available candidate is taken. On a hit, the
    /// candidate and its whole subtree leave the candidate pool, and any
    /// pairings displaced by the wholesale take are re-pooled.
    pub(crate) fn take_available(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        share: ShareId,
        query: SubtreeId,
        preferred: bool,
    ) -> DiffResult<Option<SubtreeId>> {
        let candidate = if preferred {
            if !self.shares[share.index()].preferred_built() {
                let entries: Vec<SubtreeId> = self.shares[share.index()].available().collect();
                let mut index = BTreeMap::new();
                for entry in entries {
                    let heap = heap_of(pool, heaps, entry)?;
                    index.insert(heap.literal_hash, entry);
                }
                self.share_mut(share).set_preferred(index);
            }
            let literal_hash = heap_of(pool, heaps, query)?.literal_hash;
            self.shares[share.index()].preferred_get(&literal_hash)
        } else {
            self.shares[share.index()].first_available()
        };
        let Some(candidate) = candidate else {
            return Ok(None);
        };
        self.take_tree(pool, heaps, candidate, query)?;
        Ok(Some(candidate))
    }

    /// Consumes `this` (an original-tree candidate): removes it and every
    /// descendant from the candidate pool, and re-registers original
    /// subtrees whose provisional pairings the take displaces.
    fn take_tree(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        this: SubtreeId,
        that: SubtreeId,
    ) -> DiffResult<()> {
        self.withdraw(pool, heaps, this)?;
        for child in pool.children(this).to_vec() {
            self.deregister_available(pool, heaps, child)?;
        }
        self.repool_displaced(pool, heaps, that)?;
        Ok(())
    }

    /// Removes an original subtree (and its descendants) from the candidate
    /// pool.
    ///
    /// A descendant that was already provisionally paired gives its pairing
    /// up: the changed-tree counterpart walks back into share assignment so
    /// lower-level reuse stays possible.
    pub(crate) fn deregister_available(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        subtree: SubtreeId,
    ) -> DiffResult<()> {
        let (in_share, assigned) = {
            let heap = heap_of(pool, heaps, subtree)?;
            (heap.share.is_some(), heap.assigned)
        };
        if in_share {
            self.withdraw(pool, heaps, subtree)?;
            for child in pool.children(subtree).to_vec() {
                self.deregister_available(pool, heaps, child)?;
            }
        } else if let Some(counterpart) = assigned {
            heap_of_mut(pool, heaps, subtree)?.assigned = None;
            heap_of_mut(pool, heaps, counterpart)?.assigned = None;
            self.assign_share_deep(pool, heaps, counterpart)?;
        }
        Ok(())
    }

    /// Re-assigns shares for a whole changed-tree subtree (no registering).
    fn assign_share_deep(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        subtree: SubtreeId,
    ) -> DiffResult<()> {
        let mut pending = vec![subtree];
        while let Some(current) = pending.pop() {
            self.assign_share(pool, heaps, current)?;
            pending.extend_from_slice(pool.children(current));
        }
        Ok(())
    }

    /// After a wholesale take of an original subtree for `that`, descendants
    /// of `that` may hold provisional pairings to other original subtrees;
    /// those originals return to the candidate pool.
    fn repool_displaced(
        &mut self,
        pool: &SubtreePool,
        heaps: &mut DiffHeapStore,
        that: SubtreeId,
    ) -> DiffResult<()> {
        let mut pending = vec![that];
        while let Some(current) = pending.pop() {
            let heap = heap_of(pool, heaps, current)?;
            if let Some(counterpart) = heap.assigned {
                heap_of_mut(pool, heaps, current)?.assigned = None;
                heap_of_mut(pool, heaps, counterpart)?.assigned = None;
                self.assign_share_and_register(pool, heaps, counterpart)?;
            }
            pending.extend_from_slice(pool.children(current));
        }
        Ok(())
    }

    /// Resolves a preemptive hint through the `incremental` table.
    ///
    /// If the hinted counterpart already announced itself, both entries
    /// leave the table and the counterpart is returned; otherwise `subtree`
    /// announces itself for the counterpart to find later.
    pub(crate) fn find_incremental_assignment(
        &mut self,
        pool: &SubtreePool,
        heaps: &DiffHeapStore,
        subtree: SubtreeId,
    ) -> DiffResult<Option<SubtreeId>> {
        let heap = heap_of(pool, heaps, subtree)?;
        let Some(counterpart_ref) = heap.preemptive_assignment else {
            return Ok(None);
        };
        let own_id = heap.id;
        let Ok(counterpart_heap) = heap_of(pool, heaps, counterpart_ref) else {
            // The hinted node no longer carries metadata; the hint is stale.
            return Ok(None);
        };
        let counterpart_id = counterpart_heap.id;
        if let Some(found) = self.incremental.remove(&counterpart_id) {
            self.incremental.remove(&own_id);
            Ok(Some(found))
        } else {
            self.incremental.insert(own_id, subtree);
            Ok(None)
        }
    }
}
